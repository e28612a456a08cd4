//! Account roles checked by the route gate.

use serde::{Deserialize, Serialize};

/// Role attached to an authenticated session.
///
/// The shop has a single customer role. A session persisted without a role
/// is treated as [`Role::User`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// A signed-in shopper.
    #[default]
    User,
}

impl Role {
    /// The wire name of the role, as stored in the session.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
