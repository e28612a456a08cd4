//! Profile page route handler.

use askama::Template;
use askama_web::WebTemplate;
use axum::{Extension, response::IntoResponse};

use crate::filters;
use crate::middleware::{RequireUser, SessionContext};

/// Profile page template.
#[derive(Template, WebTemplate)]
#[template(path = "profile.html")]
pub struct ProfileTemplate {
    pub email: String,
    pub role: &'static str,
}

/// Display the signed-in account.
pub async fn show(
    RequireUser(user): RequireUser,
    Extension(ctx): Extension<SessionContext>,
) -> impl IntoResponse {
    ProfileTemplate {
        email: user.email.to_string(),
        role: ctx.current_role().unwrap_or_default().as_str(),
    }
}
