use serde::{Deserialize, Serialize};

/// Signed-in user as seen by the engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    #[serde(default)]
    pub email: Option<String>,
}

/// Authentication state of the editor session.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthContext {
    pub user: Option<User>,
    pub is_authenticated: bool,
}

impl AuthContext {
    pub fn signed_in(user: User) -> Self {
        Self {
            user: Some(user),
            is_authenticated: true,
        }
    }

    pub fn anonymous() -> Self {
        Self::default()
    }

    /// Id of the authenticated user, if any.
    pub fn user_id(&self) -> Option<&str> {
        if self.is_authenticated {
            self.user.as_ref().map(|u| u.id.as_str())
        } else {
            None
        }
    }
}

/// Per-user record kept by the user store.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRecord {
    pub id: String,
    #[serde(default)]
    pub is_locked: bool,
    #[serde(default)]
    pub code_context_id: Option<String>,
}
