//! HTTP route handlers for storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                       - Landing page (signed-in browsers go to /dashboard)
//! GET  /health                 - Liveness check
//! GET  /health/ready           - Readiness check (database)
//!
//! # Auth
//! GET  /login                  - Login page
//! POST /login                  - Login action (rate limited)
//! GET  /signup                 - Signup page
//! POST /signup                 - Signup action (rate limited)
//! POST /logout                 - Logout action
//!
//! # Signed in
//! GET  /dashboard              - Product grid
//! GET  /profile                - Account details
//!
//! # Cart (signed in)
//! GET  /cart                   - Cart page (?edit=<id>&color=..&size=.. opens the edit modal)
//! POST /cart/add               - Add a product variant (back to /dashboard)
//! POST /cart/remove            - Remove a line
//! POST /cart/quantity          - Step a line's quantity
//! POST /cart/select            - Tick/untick a line
//! POST /cart/select-all        - Tick/untick every line
//! POST /cart/clear             - Delete every line
//! POST /cart/edit              - Save the edit modal
//!
//! *                            - Redirect to /
//! ```

pub mod auth;
pub mod cart;
pub mod dashboard;
pub mod health;
pub mod home;
pub mod profile;

use axum::{
    Router,
    response::Redirect,
    routing::{get, post},
};

use crate::middleware::auth::LANDING_PATH;
use crate::middleware::auth_rate_limiter;
use crate::state::AppState;

/// Create the auth routes router.
///
/// Login and signup submissions share one per-IP rate limit.
pub fn auth_routes() -> Router<AppState> {
    let limiter = auth_rate_limiter();

    Router::new()
        .route(
            "/login",
            get(auth::login_page).merge(post(auth::login).layer(limiter.clone())),
        )
        .route(
            "/signup",
            get(auth::signup_page).merge(post(auth::signup).layer(limiter)),
        )
        .route("/logout", post(auth::logout))
}

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/cart", get(cart::show))
        .route("/cart/add", post(cart::add))
        .route("/cart/remove", post(cart::remove))
        .route("/cart/quantity", post(cart::quantity))
        .route("/cart/select", post(cart::select))
        .route("/cart/select-all", post(cart::select_all))
        .route("/cart/clear", post(cart::clear))
        .route("/cart/edit", post(cart::edit))
}

/// Create all routes for the storefront.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(home::landing))
        .route("/health", get(health::health))
        .route("/health/ready", get(health::readiness))
        .merge(auth_routes())
        .route("/dashboard", get(dashboard::show))
        .route("/profile", get(profile::show))
        .merge(cart_routes())
        // Unknown paths go to the landing page
        .fallback(|| async { Redirect::to(LANDING_PATH) })
}
