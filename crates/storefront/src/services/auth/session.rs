//! The `"auth"` key: reading and writing a browser's signed-in state.

use teeshirt_core::{AuthSession, Role, SessionUser};

use super::AuthError;
use crate::models::session_keys;
use crate::storage::KeyValueStore;

/// Read the auth session persisted in `store`.
///
/// A missing key, an unreadable backend or malformed content all read as
/// signed out.
pub async fn load_session<S: KeyValueStore>(store: &S) -> AuthSession {
    match store.get(session_keys::AUTH).await {
        Ok(Some(raw)) => serde_json::from_str(&raw).unwrap_or_else(|e| {
            tracing::warn!(error = %e, "Discarding malformed auth session");
            AuthSession::signed_out()
        }),
        Ok(None) => AuthSession::signed_out(),
        Err(e) => {
            tracing::warn!(error = %e, "Failed to read auth session");
            AuthSession::signed_out()
        }
    }
}

/// Establish and persist a signed-in session for `user`.
///
/// A missing role is recorded as [`Role::User`]. The caller is responsible
/// for sending the browser on to the dashboard.
///
/// # Errors
///
/// Returns `AuthError::Storage` if the session cannot be persisted.
pub async fn on_login_success<S: KeyValueStore>(
    store: &S,
    user: SessionUser,
    role: Option<Role>,
) -> Result<AuthSession, AuthError> {
    let session = AuthSession::signed_in(user, role);
    let json = serde_json::to_string(&session).map_err(crate::storage::StorageError::from)?;
    store.set(session_keys::AUTH, json).await?;
    Ok(session)
}

/// Persist a signed-out session. The cart is left alone.
///
/// # Errors
///
/// Returns `AuthError::Storage` if the session cannot be persisted.
pub async fn sign_out<S: KeyValueStore>(store: &S) -> Result<(), AuthError> {
    let json = serde_json::to_string(&AuthSession::signed_out())
        .map_err(crate::storage::StorageError::from)?;
    store.set(session_keys::AUTH, json).await?;
    Ok(())
}
