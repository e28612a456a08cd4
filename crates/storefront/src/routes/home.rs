//! Landing page route handler.

use askama::Template;
use askama_web::WebTemplate;
use axum::response::{IntoResponse, Redirect, Response};

use crate::filters;
use crate::middleware::OptionalUser;
use crate::routes::auth::DASHBOARD_PATH;

/// Landing page template.
#[derive(Template, WebTemplate)]
#[template(path = "landing.html")]
pub struct LandingTemplate;

/// Display the landing page, or the dashboard for a signed-in browser.
pub async fn landing(OptionalUser(user): OptionalUser) -> Response {
    if user.is_some() {
        return Redirect::to(DASHBOARD_PATH).into_response();
    }
    LandingTemplate.into_response()
}
