//! Route gating.
//!
//! [`session_context_middleware`] reads the `"auth"` key once per request and
//! stores the result as a [`SessionContext`] in the request extensions. The
//! extractors below consult only that context, never the session itself.
//!
//! Protected pages take [`RequireUser`]; without a signed-in session carrying
//! the `user` role the request is redirected to the landing page.

use axum::{
    extract::{FromRequestParts, Request},
    http::request::Parts,
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use tower_sessions::Session;
use tracing::Span;

use teeshirt_core::{AuthSession, Role, SessionUser};

use crate::services::auth::load_session;
use crate::storage::SessionStore;

/// Where rejected requests are sent.
pub const LANDING_PATH: &str = "/";

/// Authentication state of the current request.
#[derive(Debug, Clone, Default)]
pub struct SessionContext {
    auth: AuthSession,
}

impl SessionContext {
    #[must_use]
    pub const fn new(auth: AuthSession) -> Self {
        Self { auth }
    }

    #[must_use]
    pub const fn is_authenticated(&self) -> bool {
        self.auth.is_authenticated()
    }

    #[must_use]
    pub fn current_role(&self) -> Option<Role> {
        self.auth.current_role()
    }

    #[must_use]
    pub fn user(&self) -> Option<&SessionUser> {
        self.auth.user()
    }

    /// The signed-in user, if the session grants `role`.
    #[must_use]
    pub fn user_with_role(&self, role: Role) -> Option<&SessionUser> {
        (self.current_role() == Some(role))
            .then(|| self.user())
            .flatten()
    }
}

/// Middleware that loads the auth session into a [`SessionContext`].
///
/// Must run inside the session layer. Requests without a session are treated
/// as signed out.
pub async fn session_context_middleware(mut request: Request, next: Next) -> Response {
    let auth = match request.extensions().get::<Session>().cloned() {
        Some(session) => load_session(&SessionStore::new(session)).await,
        None => AuthSession::signed_out(),
    };

    if let Some(user) = auth.user() {
        Span::current().record("account_id", user.id.as_i32());
    }

    request.extensions_mut().insert(SessionContext::new(auth));
    next.run(request).await
}

/// Extractor that requires a signed-in user with the `user` role.
///
/// # Example
///
/// ```rust,ignore
/// async fn protected_handler(RequireUser(user): RequireUser) -> impl IntoResponse {
///     format!("Hello, {}!", user.email)
/// }
/// ```
pub struct RequireUser(pub SessionUser);

/// Rejection for [`RequireUser`]: a redirect to the landing page.
#[derive(Debug)]
pub struct GateRejection;

impl IntoResponse for GateRejection {
    fn into_response(self) -> Response {
        Redirect::to(LANDING_PATH).into_response()
    }
}

impl<S> FromRequestParts<S> for RequireUser
where
    S: Send + Sync,
{
    type Rejection = GateRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user = parts
            .extensions
            .get::<SessionContext>()
            .and_then(|ctx| ctx.user_with_role(Role::User))
            .cloned();

        user.map(Self).ok_or_else(|| {
            tracing::debug!(path = %parts.uri.path(), "Redirecting signed-out request");
            GateRejection
        })
    }
}

/// Extractor that optionally gets the signed-in user.
///
/// Unlike `RequireUser`, this does not reject the request.
pub struct OptionalUser(pub Option<SessionUser>);

impl<S> FromRequestParts<S> for OptionalUser
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user = parts
            .extensions
            .get::<SessionContext>()
            .and_then(SessionContext::user)
            .cloned();

        Ok(Self(user))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use axum::http::{Request as HttpRequest, StatusCode, header};
    use teeshirt_core::{AccountId, Email};

    use super::*;

    fn shopper() -> SessionUser {
        SessionUser {
            id: AccountId::new(1),
            email: Email::parse("shopper@shop.ph").unwrap(),
        }
    }

    fn parts_with(ctx: Option<SessionContext>) -> Parts {
        let mut request = HttpRequest::builder().uri("/cart").body(()).unwrap();
        if let Some(ctx) = ctx {
            request.extensions_mut().insert(ctx);
        }
        request.into_parts().0
    }

    #[tokio::test]
    async fn test_require_user_without_context_redirects() {
        let mut parts = parts_with(None);
        let rejection = RequireUser::from_request_parts(&mut parts, &())
            .await
            .err()
            .unwrap();
        let response = rejection.into_response();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(response.headers()[header::LOCATION], "/");
    }

    #[tokio::test]
    async fn test_require_user_signed_out_rejected() {
        let mut parts = parts_with(Some(SessionContext::default()));
        assert!(RequireUser::from_request_parts(&mut parts, &()).await.is_err());
    }

    #[tokio::test]
    async fn test_require_user_signed_in() {
        let ctx = SessionContext::new(AuthSession::signed_in(shopper(), None));
        let mut parts = parts_with(Some(ctx));
        let RequireUser(user) = RequireUser::from_request_parts(&mut parts, &())
            .await
            .ok()
            .unwrap();
        assert_eq!(user, shopper());
    }

    #[tokio::test]
    async fn test_optional_user() {
        let mut parts = parts_with(None);
        let OptionalUser(user) = OptionalUser::from_request_parts(&mut parts, &())
            .await
            .unwrap();
        assert!(user.is_none());
    }

    #[test]
    fn test_flag_without_user_is_signed_out() {
        let auth = AuthSession {
            user: None,
            role: Some(Role::User),
            is_authenticated: true,
        };
        let ctx = SessionContext::new(auth);
        assert!(!ctx.is_authenticated());
        assert!(ctx.user_with_role(Role::User).is_none());
    }
}
