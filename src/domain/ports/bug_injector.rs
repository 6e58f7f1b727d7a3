/// Strategy deciding whether a request takes the flawed generation path.
///
/// Each call is independent of every previous one.
pub trait BugInjector: Send + Sync {
    fn decide(&self) -> bool;
}

/// Always returns the same answer.
#[derive(Debug, Clone, Copy)]
pub struct FixedBugInjector(pub bool);

impl BugInjector for FixedBugInjector {
    fn decide(&self) -> bool {
        self.0
    }
}
