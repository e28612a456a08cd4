//! The persisted authentication session.
//!
//! Stored under the `"auth"` key as `{user, role, isAuthenticated}`.

use serde::{Deserialize, Serialize};

use crate::types::{AccountId, Email, Role};

/// Identity of the signed-in account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionUser {
    /// Account database ID.
    pub id: AccountId,
    /// Account email address.
    pub email: Email,
}

/// Authentication state of one browser session.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthSession {
    #[serde(default)]
    pub user: Option<SessionUser>,
    #[serde(default)]
    pub role: Option<Role>,
    #[serde(default)]
    pub is_authenticated: bool,
}

impl AuthSession {
    /// A signed-in session. A missing role is recorded as [`Role::User`].
    #[must_use]
    pub fn signed_in(user: SessionUser, role: Option<Role>) -> Self {
        Self {
            user: Some(user),
            role: Some(role.unwrap_or_default()),
            is_authenticated: true,
        }
    }

    /// A signed-out session.
    #[must_use]
    pub fn signed_out() -> Self {
        Self::default()
    }

    /// True only when the session is flagged authenticated and names a user.
    #[must_use]
    pub const fn is_authenticated(&self) -> bool {
        self.is_authenticated && self.user.is_some()
    }

    /// The role of an authenticated session, defaulting to [`Role::User`].
    #[must_use]
    pub fn current_role(&self) -> Option<Role> {
        self.is_authenticated()
            .then(|| self.role.unwrap_or_default())
    }

    /// The signed-in user, if any.
    #[must_use]
    pub fn user(&self) -> Option<&SessionUser> {
        if self.is_authenticated {
            self.user.as_ref()
        } else {
            None
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn shopper() -> SessionUser {
        SessionUser {
            id: AccountId::new(7),
            email: Email::parse("shopper@shop.ph").unwrap(),
        }
    }

    #[test]
    fn test_signed_in_defaults_role() {
        let session = AuthSession::signed_in(shopper(), None);
        assert!(session.is_authenticated());
        assert_eq!(session.current_role(), Some(Role::User));
    }

    #[test]
    fn test_missing_role_reads_as_user() {
        let json = r#"{"user":{"id":7,"email":"shopper@shop.ph"},"isAuthenticated":true}"#;
        let session: AuthSession = serde_json::from_str(json).unwrap();
        assert_eq!(session.current_role(), Some(Role::User));
        assert_eq!(session.user().unwrap().id, AccountId::new(7));
    }

    #[test]
    fn test_flag_without_user_is_not_authenticated() {
        let json = r#"{"isAuthenticated":true,"role":"user"}"#;
        let session: AuthSession = serde_json::from_str(json).unwrap();
        assert!(!session.is_authenticated());
        assert_eq!(session.current_role(), None);
    }

    #[test]
    fn test_wire_format() {
        let session = AuthSession::signed_in(shopper(), Some(Role::User));
        let json = serde_json::to_value(&session).unwrap();
        assert_eq!(json["isAuthenticated"], serde_json::json!(true));
        assert_eq!(json["role"], serde_json::json!("user"));
        assert_eq!(json["user"]["email"], serde_json::json!("shopper@shop.ph"));
    }
}
