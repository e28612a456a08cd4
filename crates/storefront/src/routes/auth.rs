//! Authentication route handlers.
//!
//! Handles signup, login and logout against the local account table. A
//! successful signup or login establishes the `"auth"` session and sends the
//! browser to the dashboard.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Query, State},
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use teeshirt_core::Role;

use crate::error::{Result, clear_sentry_user, set_sentry_user};
use crate::filters;
use crate::middleware::OptionalUser;
use crate::models::Account;
use crate::services::auth::{AuthError, AuthService, on_login_success, sign_out};
use crate::state::AppState;
use crate::storage::{SessionStore, StorageError};

/// Where a successful login lands.
pub const DASHBOARD_PATH: &str = "/dashboard";

// =============================================================================
// Form Types
// =============================================================================

/// Login form data.
#[derive(Deserialize)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

/// Signup form data.
#[derive(Deserialize)]
pub struct SignupForm {
    pub email: String,
    pub password: String,
    pub password_confirm: String,
}

// =============================================================================
// Query Types
// =============================================================================

/// Query parameters for error display.
#[derive(Debug, Deserialize)]
pub struct MessageQuery {
    pub error: Option<String>,
}

/// Human-readable text for an error code carried in the query string.
fn error_message(code: &str) -> &'static str {
    match code {
        "credentials" => "Incorrect email or password.",
        "email" => "Please enter a valid email address.",
        "password" => "Password must be at least 8 characters.",
        "mismatch" => "Passwords do not match.",
        "exists" => "An account with this email already exists.",
        _ => "Something went wrong. Please try again.",
    }
}

// =============================================================================
// Templates
// =============================================================================

/// Login page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/login.html")]
pub struct LoginTemplate {
    pub error: Option<&'static str>,
}

/// Signup page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/signup.html")]
pub struct SignupTemplate {
    pub error: Option<&'static str>,
}

// =============================================================================
// Session Helpers
// =============================================================================

/// Persist the signed-in session for `account` and go to the dashboard.
async fn complete_login(session: Session, account: &Account) -> Result<Response> {
    // New session id on privilege change
    session.cycle_id().await.map_err(StorageError::from)?;

    let store = SessionStore::new(session);
    on_login_success(&store, account.session_user(), Some(Role::User)).await?;
    set_sentry_user(&account.id, Some(account.email.as_str()));

    tracing::info!(account_id = %account.id, "Signed in");
    Ok(Redirect::to(DASHBOARD_PATH).into_response())
}

// =============================================================================
// Login Routes
// =============================================================================

/// Display the login page.
pub async fn login_page(
    OptionalUser(user): OptionalUser,
    Query(query): Query<MessageQuery>,
) -> Response {
    if user.is_some() {
        return Redirect::to(DASHBOARD_PATH).into_response();
    }

    LoginTemplate {
        error: query.error.as_deref().map(error_message),
    }
    .into_response()
}

/// Handle login form submission.
#[instrument(skip_all)]
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<LoginForm>,
) -> Result<Response> {
    let auth = AuthService::new(state.pool());

    match auth.login(&form.email, &form.password).await {
        Ok(account) => complete_login(session, &account).await,
        Err(AuthError::InvalidCredentials) => {
            tracing::warn!("Login failed: invalid credentials");
            Ok(Redirect::to("/login?error=credentials").into_response())
        }
        Err(e) => Err(e.into()),
    }
}

// =============================================================================
// Signup Routes
// =============================================================================

/// Display the signup page.
pub async fn signup_page(
    OptionalUser(user): OptionalUser,
    Query(query): Query<MessageQuery>,
) -> Response {
    if user.is_some() {
        return Redirect::to(DASHBOARD_PATH).into_response();
    }

    SignupTemplate {
        error: query.error.as_deref().map(error_message),
    }
    .into_response()
}

/// Handle signup form submission.
#[instrument(skip_all)]
pub async fn signup(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<SignupForm>,
) -> Result<Response> {
    let auth = AuthService::new(state.pool());

    let code = match auth
        .register(&form.email, &form.password, &form.password_confirm)
        .await
    {
        Ok(account) => return complete_login(session, &account).await,
        Err(AuthError::InvalidEmail(_)) => "email",
        Err(AuthError::WeakPassword(_)) => "password",
        Err(AuthError::PasswordMismatch) => "mismatch",
        Err(AuthError::AccountAlreadyExists) => "exists",
        Err(e) => return Err(e.into()),
    };

    tracing::info!(reason = code, "Signup rejected");
    Ok(Redirect::to(&format!("/signup?error={code}")).into_response())
}

// =============================================================================
// Logout
// =============================================================================

/// Sign out. The cart stays in the session.
#[instrument(skip_all)]
pub async fn logout(session: Session) -> Result<Redirect> {
    sign_out(&SessionStore::new(session)).await?;
    clear_sentry_user();
    Ok(Redirect::to("/"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        assert_eq!(error_message("credentials"), "Incorrect email or password.");
        assert_eq!(error_message("mismatch"), "Passwords do not match.");
        assert_eq!(
            error_message("<script>"),
            "Something went wrong. Please try again."
        );
    }
}
