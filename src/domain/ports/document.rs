//! Minimal view of an editor document.

/// Zero-based cursor position; `character` counts chars, not bytes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Position {
    pub line: usize,
    pub character: usize,
}

impl Position {
    pub const fn new(line: usize, character: usize) -> Self {
        Self { line, character }
    }
}

/// Read access to the document being edited.
pub trait TextDocument: Send + Sync {
    fn line_text(&self, line: usize) -> Option<String>;
}

impl TextDocument for String {
    fn line_text(&self, line: usize) -> Option<String> {
        self.lines().nth(line).map(str::to_string)
    }
}

/// Text of `position`'s line from column 0 up to the cursor.
pub fn prompt_text(document: &dyn TextDocument, position: Position) -> String {
    document
        .line_text(position.line)
        .map(|line| line.chars().take(position.character).collect())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_text_up_to_cursor() {
        let doc = "fn main() {\n    let total = add(".to_string();
        assert_eq!(prompt_text(&doc, Position::new(1, 15)), "    let total =");
        assert_eq!(prompt_text(&doc, Position::new(0, 100)), "fn main() {");
    }

    #[test]
    fn test_prompt_text_missing_line() {
        let doc = "one line".to_string();
        assert_eq!(prompt_text(&doc, Position::new(3, 2)), "");
    }

    #[test]
    fn test_prompt_text_counts_chars() {
        let doc = "let s = \"héllo\"".to_string();
        assert_eq!(prompt_text(&doc, Position::new(0, 11)), "let s = \"hé");
    }
}
