//! Output formatting utilities for the CLI.

use comfy_table::{presets, Cell, Table};
use serde::Serialize;

/// Command result printable as text or JSON.
pub trait CommandOutput: Serialize {
    fn to_human(&self) -> String;

    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

pub fn output<T: CommandOutput>(result: &T, json_mode: bool) {
    if json_mode {
        println!("{}", serde_json::to_string_pretty(&result.to_json()).unwrap_or_default());
    } else {
        println!("{}", result.to_human());
    }
}

/// Two-column key/value table.
pub fn detail_table<'a>(rows: impl IntoIterator<Item = (&'a str, String)>) -> Table {
    let mut table = Table::new();
    table.load_preset(presets::NOTHING);
    for (key, value) in rows {
        table.add_row(vec![Cell::new(key), Cell::new(value)]);
    }
    table
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detail_table_renders_rows() {
        let rendered = detail_table([("Accepted", "20".to_string())]).to_string();
        assert!(rendered.contains("Accepted"));
        assert!(rendered.contains("20"));
    }
}
