//! Dashboard route handler: the product grid.

use askama::Template;
use askama_web::WebTemplate;
use axum::{extract::State, response::IntoResponse};
use tower_sessions::Session;
use tracing::instrument;

use teeshirt_core::VariantCatalog;

use crate::filters;
use crate::middleware::RequireUser;
use crate::services::{CartStore, Product};
use crate::state::AppState;
use crate::storage::SessionStore;

/// Product card display data for templates.
#[derive(Debug, Clone)]
pub struct ProductCard {
    pub id: String,
    pub name: String,
    pub image: String,
    pub price: String,
}

impl From<&Product> for ProductCard {
    fn from(product: &Product) -> Self {
        Self {
            id: product.id.to_string(),
            name: product.name.clone(),
            image: product.image.clone(),
            price: product.unit_price().display(),
        }
    }
}

/// One option of a variant picker.
#[derive(Debug, Clone)]
pub struct PickerOption {
    pub value: &'static str,
    pub preselected: bool,
}

/// Options for the color picker, then the size picker.
fn picker_options(catalog: &VariantCatalog) -> (Vec<PickerOption>, Vec<PickerOption>) {
    let default_color = catalog.default_color();
    let default_size = catalog.default_size();
    let colors = catalog
        .colors()
        .iter()
        .map(|&c| PickerOption {
            value: c.name(),
            preselected: c == default_color,
        })
        .collect();
    let sizes = catalog
        .sizes()
        .iter()
        .map(|&s| PickerOption {
            value: s.label(),
            preselected: s == default_size,
        })
        .collect();
    (colors, sizes)
}

/// Dashboard page template.
#[derive(Template, WebTemplate)]
#[template(path = "dashboard.html")]
pub struct DashboardTemplate {
    pub email: String,
    pub products: Vec<ProductCard>,
    pub colors: Vec<PickerOption>,
    pub sizes: Vec<PickerOption>,
    pub cart_count: u64,
}

/// Display the product grid.
#[instrument(skip_all, fields(account_id = %user.id))]
pub async fn show(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    session: Session,
) -> impl IntoResponse {
    let cart = CartStore::load(SessionStore::new(session)).await;
    let (colors, sizes) = picker_options(state.variants());

    DashboardTemplate {
        email: user.email.to_string(),
        products: state.products().products().iter().map(ProductCard::from).collect(),
        colors,
        sizes,
        cart_count: cart.item_count(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_picker_preselects_defaults() {
        let (colors, sizes) = picker_options(&VariantCatalog::compact());
        let color: Vec<_> = colors.iter().filter(|o| o.preselected).map(|o| o.value).collect();
        let size: Vec<_> = sizes.iter().filter(|o| o.preselected).map(|o| o.value).collect();
        assert_eq!(color, ["Red"]);
        assert_eq!(size, ["M"]);
        assert_eq!(sizes.last().map(|o| o.value), Some("2XL"));
    }
}
