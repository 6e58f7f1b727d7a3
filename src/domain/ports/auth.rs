use crate::domain::models::AuthContext;

/// Port for the authentication collaborator.
///
/// Sign-in itself is handled elsewhere; the engine only reads the outcome.
pub trait AuthProvider: Send + Sync {
    fn current(&self) -> AuthContext;
}

/// Fixed authentication state, used by the developer driver and in tests.
#[derive(Debug, Clone, Default)]
pub struct StaticAuth(pub AuthContext);

impl AuthProvider for StaticAuth {
    fn current(&self) -> AuthContext {
        self.0.clone()
    }
}
