//! Cart route handlers.
//!
//! Every handler loads the browser's cart from its session, applies at most
//! one [`CartStore`] operation and answers `303 See Other`, so a reload never
//! replays a mutation. The variant edit modal is driven by query parameters
//! on `GET /cart` and committed by `POST /cart/edit`.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Query, State},
    response::{IntoResponse, Redirect},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;
use url::form_urlencoded;

use teeshirt_core::{Color, LineItem, LineItemId, NewLineItem, Price, ProductId, Size, VariantCatalog};

use crate::error::{AppError, Result, add_breadcrumb};
use crate::filters;
use crate::middleware::RequireUser;
use crate::routes::auth::DASHBOARD_PATH;
use crate::services::{CartStore, VariantEditor};
use crate::state::AppState;
use crate::storage::{KeyValueStore, SessionStore};

/// Cart page path.
pub const CART_PATH: &str = "/cart";

// =============================================================================
// View Models
// =============================================================================

/// Line item display data for templates.
#[derive(Debug, Clone)]
pub struct LineItemView {
    pub cart_id: String,
    pub name: String,
    pub image: String,
    pub color: &'static str,
    pub size: &'static str,
    pub unit_price: String,
    pub line_total: String,
    pub quantity: u32,
    pub selected: bool,
    pub edit_href: String,
}

impl From<&LineItem> for LineItemView {
    fn from(item: &LineItem) -> Self {
        Self {
            cart_id: item.cart_id.to_string(),
            name: item.name.clone(),
            image: item.image.clone(),
            color: item.color.name(),
            size: item.size.label(),
            unit_price: Price::local(item.price).display(),
            line_total: Price::local(item.line_total()).display(),
            quantity: item.quantity,
            selected: item.selected,
            edit_href: editor_href(&item.cart_id, None, None),
        }
    }
}

/// Cart display data for templates.
#[derive(Debug, Clone)]
pub struct CartView {
    pub items: Vec<LineItemView>,
    pub subtotal: String,
    pub all_selected: bool,
    pub is_empty: bool,
    pub selected_count: usize,
    pub item_count: u64,
}

impl CartView {
    #[must_use]
    pub fn from_store<S: KeyValueStore>(store: &CartStore<S>) -> Self {
        let cart = store.cart();
        Self {
            items: cart.items().iter().map(LineItemView::from).collect(),
            subtotal: Price::local(store.subtotal()).display(),
            all_selected: store.all_selected(),
            is_empty: cart.is_empty(),
            selected_count: cart.selected_count(),
            item_count: store.item_count(),
        }
    }
}

/// One color swatch in the edit modal.
#[derive(Debug, Clone)]
pub struct SwatchView {
    pub name: &'static str,
    pub hex: &'static str,
    pub bordered: bool,
    pub active: bool,
    pub href: String,
}

/// One size button in the edit modal.
#[derive(Debug, Clone)]
pub struct SizeView {
    pub label: &'static str,
    pub active: bool,
    pub href: String,
}

/// Edit modal display data, built from the staged draft.
#[derive(Debug, Clone)]
pub struct EditorView {
    pub cart_id: String,
    pub name: String,
    pub image: String,
    pub unit_price: String,
    pub color: &'static str,
    pub size: &'static str,
    pub swatches: Vec<SwatchView>,
    pub sizes: Vec<SizeView>,
}

impl EditorView {
    /// Build the modal for `draft`, offering the variants in `catalog`.
    ///
    /// Each swatch and size links to the same modal with that one choice
    /// changed, so picking never touches the cart.
    #[must_use]
    pub fn new(draft: &LineItem, catalog: &VariantCatalog) -> Self {
        let id = &draft.cart_id;
        let swatches = catalog
            .colors()
            .iter()
            .map(|&color| SwatchView {
                name: color.name(),
                hex: color.hex(),
                bordered: color.needs_border(),
                active: color == draft.color,
                href: editor_href(id, Some(color), Some(draft.size)),
            })
            .collect();
        let sizes = catalog
            .sizes()
            .iter()
            .map(|&size| SizeView {
                label: size.label(),
                active: size == draft.size,
                href: editor_href(id, Some(draft.color), Some(size)),
            })
            .collect();

        Self {
            cart_id: id.to_string(),
            name: draft.name.clone(),
            image: draft.image.clone(),
            unit_price: Price::local(draft.price).display(),
            color: draft.color.name(),
            size: draft.size.label(),
            swatches,
            sizes,
        }
    }
}

/// `/cart?edit=<id>[&color=..][&size=..]`
fn editor_href(id: &LineItemId, color: Option<Color>, size: Option<Size>) -> String {
    let mut query = form_urlencoded::Serializer::new(String::new());
    query.append_pair("edit", id.as_str());
    if let Some(color) = color {
        query.append_pair("color", color.name());
    }
    if let Some(size) = size {
        query.append_pair("size", size.label());
    }
    format!("{CART_PATH}?{}", query.finish())
}

// =============================================================================
// Form & Query Types
// =============================================================================

/// Query parameters of the cart page.
///
/// Unknown colors or sizes are ignored rather than rejected.
#[derive(Debug, Default, Deserialize)]
pub struct ShowQuery {
    pub edit: Option<LineItemId>,
    pub color: Option<String>,
    pub size: Option<String>,
}

/// Add to cart form data.
#[derive(Debug, Deserialize)]
pub struct AddForm {
    pub product_id: ProductId,
    pub color: Color,
    pub size: Size,
    pub quantity: Option<u32>,
}

/// Form naming a single line.
#[derive(Debug, Deserialize)]
pub struct LineForm {
    pub cart_id: LineItemId,
}

/// Quantity step form data.
#[derive(Debug, Deserialize)]
pub struct QuantityForm {
    pub cart_id: LineItemId,
    pub delta: i64,
}

/// Per-line selection form data.
#[derive(Debug, Deserialize)]
pub struct SelectForm {
    pub cart_id: LineItemId,
    pub selected: bool,
}

/// Select-all form data.
#[derive(Debug, Deserialize)]
pub struct SelectAllForm {
    pub selected: bool,
}

/// Edit modal "Save" form data.
#[derive(Debug, Deserialize)]
pub struct EditForm {
    pub cart_id: LineItemId,
    pub color: Color,
    pub size: Size,
}

// =============================================================================
// Templates
// =============================================================================

/// Cart page template.
#[derive(Template, WebTemplate)]
#[template(path = "cart/show.html")]
pub struct CartShowTemplate {
    pub cart: CartView,
    pub editor: Option<EditorView>,
}

// =============================================================================
// Handlers
// =============================================================================

async fn load(session: Session) -> CartStore<SessionStore> {
    CartStore::load(SessionStore::new(session)).await
}

fn cart_breadcrumb(message: &str, id: &LineItemId) {
    add_breadcrumb("cart", message, Some(&[("cart_id", id.as_str())]));
}

/// Display the cart page, with the edit modal when `edit` names a line.
#[instrument(skip_all, fields(edit = ?query.edit))]
pub async fn show(
    State(state): State<AppState>,
    RequireUser(_user): RequireUser,
    session: Session,
    Query(query): Query<ShowQuery>,
) -> impl IntoResponse {
    let store = load(session).await;

    let mut editor = VariantEditor::new();
    if query.edit.as_ref().is_some_and(|id| editor.open_line(&store, id)) {
        if let Some(color) = query.color.as_deref().and_then(|c| c.parse().ok()) {
            editor.set_color(color);
        }
        if let Some(size) = query.size.as_deref().and_then(|s| s.parse().ok()) {
            editor.set_size(size);
        }
    }

    CartShowTemplate {
        cart: CartView::from_store(&store),
        editor: editor
            .draft()
            .map(|draft| EditorView::new(draft, state.variants())),
    }
}

/// Add a product variant to the cart and return to the dashboard.
#[instrument(skip_all, fields(product_id = %form.product_id, color = %form.color, size = %form.size))]
pub async fn add(
    State(state): State<AppState>,
    RequireUser(_user): RequireUser,
    session: Session,
    Form(form): Form<AddForm>,
) -> Result<Redirect> {
    let product = state
        .products()
        .get(&form.product_id)
        .ok_or_else(|| AppError::NotFound(format!("product {}", form.product_id)))?;

    let mut store = load(session).await;
    let id = store
        .add(NewLineItem {
            name: product.name.clone(),
            image: product.image.clone(),
            price: product.price,
            color: form.color,
            size: form.size,
            quantity: form.quantity.unwrap_or(1),
        })
        .await?;
    cart_breadcrumb("Added line", &id);

    Ok(Redirect::to(DASHBOARD_PATH))
}

/// Remove a line.
#[instrument(skip_all, fields(cart_id = %form.cart_id))]
pub async fn remove(
    RequireUser(_user): RequireUser,
    session: Session,
    Form(form): Form<LineForm>,
) -> Result<Redirect> {
    let mut store = load(session).await;
    if store.remove(&form.cart_id).await? {
        cart_breadcrumb("Removed line", &form.cart_id);
    }
    Ok(Redirect::to(CART_PATH))
}

/// Step a line's quantity up or down.
#[instrument(skip_all, fields(cart_id = %form.cart_id, delta = form.delta))]
pub async fn quantity(
    RequireUser(_user): RequireUser,
    session: Session,
    Form(form): Form<QuantityForm>,
) -> Result<Redirect> {
    let mut store = load(session).await;
    store.set_quantity(&form.cart_id, form.delta).await?;
    Ok(Redirect::to(CART_PATH))
}

/// Tick or untick one line.
#[instrument(skip_all, fields(cart_id = %form.cart_id, selected = form.selected))]
pub async fn select(
    RequireUser(_user): RequireUser,
    session: Session,
    Form(form): Form<SelectForm>,
) -> Result<Redirect> {
    let mut store = load(session).await;
    store.set_selected(&form.cart_id, form.selected).await?;
    Ok(Redirect::to(CART_PATH))
}

/// Tick or untick every line.
#[instrument(skip_all, fields(selected = form.selected))]
pub async fn select_all(
    RequireUser(_user): RequireUser,
    session: Session,
    Form(form): Form<SelectAllForm>,
) -> Result<Redirect> {
    let mut store = load(session).await;
    store.set_all_selected(form.selected).await?;
    Ok(Redirect::to(CART_PATH))
}

/// Delete every line.
#[instrument(skip_all)]
pub async fn clear(RequireUser(_user): RequireUser, session: Session) -> Result<Redirect> {
    let mut store = load(session).await;
    store.clear().await?;
    add_breadcrumb("cart", "Cleared cart", None);
    Ok(Redirect::to(CART_PATH))
}

/// Save the edit modal: replay open, color, size and save on the editor.
#[instrument(skip_all, fields(cart_id = %form.cart_id, color = %form.color, size = %form.size))]
pub async fn edit(
    RequireUser(_user): RequireUser,
    session: Session,
    Form(form): Form<EditForm>,
) -> Result<Redirect> {
    let mut store = load(session).await;

    let mut editor = VariantEditor::new();
    if editor.open_line(&store, &form.cart_id) {
        editor.set_color(form.color);
        editor.set_size(form.size);
    }
    if editor.save(&mut store).await? {
        cart_breadcrumb("Edited variant", &form.cart_id);
    }

    Ok(Redirect::to(CART_PATH))
}
