//! Line items and the ordered cart.
//!
//! [`Cart`] owns the invariants of the cart state:
//!
//! - every line has `quantity >= 1`
//! - `cart_id` values are unique
//! - the subtotal counts selected lines only
//!
//! Every operation that targets a line by id is a silent no-op when the id is
//! not present; callers learn whether anything matched from the returned
//! `bool`, never from an error.

use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

use crate::types::{Color, LineItemId, Size};

/// Error returned when a persisted cart cannot be decoded.
#[derive(Debug, Error)]
pub enum CartDecodeError {
    #[error("malformed cart: {0}")]
    Json(#[from] serde_json::Error),
}

const fn default_selected() -> bool {
    true
}

/// Only an explicit `false` deselects a line; `null` reads as selected.
fn selected_unless_false<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<bool>::deserialize(deserializer)?.unwrap_or(true))
}

/// One product + variant + quantity entry in the cart.
///
/// The serialized form is the persisted `"cart"` entry:
/// `{cartId, name, image, price, color, size, quantity, selected}`.
/// A missing or `null` `selected` field deserializes as `true`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineItem {
    /// Identity of the line within the cart; stable across edits.
    pub cart_id: LineItemId,
    /// Product display name.
    pub name: String,
    /// Product image URL.
    #[serde(default)]
    pub image: String,
    /// Unit price in the shop currency.
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    pub color: Color,
    pub size: Size,
    pub quantity: u32,
    /// Whether the line counts towards the subtotal.
    #[serde(default = "default_selected", deserialize_with = "selected_unless_false")]
    pub selected: bool,
}

impl LineItem {
    /// `price * quantity` for this line, saturating at `Decimal::MAX`.
    #[must_use]
    pub fn line_total(&self) -> Decimal {
        self.price.saturating_mul(Decimal::from(self.quantity))
    }
}

/// Data for a line about to be added; the cart assigns the id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewLineItem {
    pub name: String,
    pub image: String,
    pub price: Decimal,
    pub color: Color,
    pub size: Size,
    pub quantity: u32,
}

/// What [`Cart::from_items`] had to fix in a persisted list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadRepairs {
    /// Lines whose quantity was raised to 1.
    pub clamped_quantities: usize,
    /// Lines dropped because an earlier line had the same id.
    pub dropped_duplicates: usize,
    /// Lines dropped because their price was negative.
    pub dropped_negative_prices: usize,
}

impl LoadRepairs {
    /// True when the list was already valid.
    #[must_use]
    pub const fn is_clean(&self) -> bool {
        self.clamped_quantities == 0
            && self.dropped_duplicates == 0
            && self.dropped_negative_prices == 0
    }
}

/// Ordered sequence of line items keyed by `cart_id`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Cart {
    items: Vec<LineItem>,
}

impl Cart {
    /// An empty cart.
    #[must_use]
    pub const fn new() -> Self {
        Self { items: Vec::new() }
    }

    /// Build a cart from an arbitrary list, restoring the invariants.
    ///
    /// Quantities below 1 are raised to 1. Lines with a negative price and
    /// lines repeating an earlier id are dropped. Order is otherwise
    /// preserved.
    #[must_use]
    pub fn from_items(items: Vec<LineItem>) -> (Self, LoadRepairs) {
        let mut repairs = LoadRepairs::default();
        let mut kept: Vec<LineItem> = Vec::with_capacity(items.len());

        for mut item in items {
            if item.price.is_sign_negative() && !item.price.is_zero() {
                repairs.dropped_negative_prices += 1;
                continue;
            }
            if kept.iter().any(|k| k.cart_id == item.cart_id) {
                repairs.dropped_duplicates += 1;
                continue;
            }
            if item.quantity == 0 {
                item.quantity = 1;
                repairs.clamped_quantities += 1;
            }
            kept.push(item);
        }

        (Self { items: kept }, repairs)
    }

    /// Decode the persisted JSON form.
    ///
    /// # Errors
    ///
    /// Returns [`CartDecodeError`] if the input is not a JSON array of line
    /// items (including unknown colors/sizes or negative quantities).
    pub fn from_json(json: &str) -> Result<(Self, LoadRepairs), CartDecodeError> {
        let items: Vec<LineItem> = serde_json::from_str(json)?;
        Ok(Self::from_items(items))
    }

    /// Encode to the persisted JSON form.
    ///
    /// # Errors
    ///
    /// Returns `serde_json::Error` if serialization fails.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(&self.items)
    }

    /// Lines in cart order.
    #[must_use]
    pub fn items(&self) -> &[LineItem] {
        &self.items
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Look up a line by id.
    #[must_use]
    pub fn get(&self, id: &LineItemId) -> Option<&LineItem> {
        self.items.iter().find(|item| &item.cart_id == id)
    }

    #[must_use]
    pub fn contains(&self, id: &LineItemId) -> bool {
        self.get(id).is_some()
    }

    fn get_mut(&mut self, id: &LineItemId) -> Option<&mut LineItem> {
        self.items.iter_mut().find(|item| &item.cart_id == id)
    }

    /// Append a new, selected line with a fresh id.
    pub fn add(&mut self, new: NewLineItem) -> LineItemId {
        let mut id = LineItemId::generate();
        while self.contains(&id) {
            id = LineItemId::generate();
        }

        self.items.push(LineItem {
            cart_id: id.clone(),
            name: new.name,
            image: new.image,
            price: new.price,
            color: new.color,
            size: new.size,
            quantity: new.quantity.max(1),
            selected: true,
        });
        id
    }

    /// Remove the line with `id`. Returns whether a line was removed.
    pub fn remove(&mut self, id: &LineItemId) -> bool {
        let before = self.items.len();
        self.items.retain(|item| &item.cart_id != id);
        self.items.len() != before
    }

    /// Adjust a line's quantity by `delta`, never going below 1.
    pub fn set_quantity(&mut self, id: &LineItemId, delta: i64) -> bool {
        let Some(item) = self.get_mut(id) else {
            return false;
        };
        let next = i64::from(item.quantity)
            .saturating_add(delta)
            .clamp(1, i64::from(u32::MAX));
        item.quantity = u32::try_from(next).unwrap_or(u32::MAX);
        true
    }

    /// Set one line's selection flag.
    pub fn set_selected(&mut self, id: &LineItemId, selected: bool) -> bool {
        let Some(item) = self.get_mut(id) else {
            return false;
        };
        item.selected = selected;
        true
    }

    /// Set every line's selection flag.
    pub fn set_all_selected(&mut self, selected: bool) {
        for item in &mut self.items {
            item.selected = selected;
        }
    }

    /// Remove every line.
    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Replace the line with `id` by `patch`.
    ///
    /// The replacement keeps `id` whatever `patch.cart_id` says, and its
    /// quantity is raised to 1 if needed.
    pub fn apply_edit(&mut self, id: &LineItemId, mut patch: LineItem) -> bool {
        let Some(item) = self.get_mut(id) else {
            return false;
        };
        patch.cart_id = id.clone();
        patch.quantity = patch.quantity.max(1);
        *item = patch;
        true
    }

    /// Sum of `price * quantity` over selected lines, saturating at
    /// `Decimal::MAX`.
    #[must_use]
    pub fn subtotal(&self) -> Decimal {
        self.items
            .iter()
            .filter(|item| item.selected)
            .map(LineItem::line_total)
            .fold(Decimal::ZERO, Decimal::saturating_add)
    }

    /// True when every line is selected (and for an empty cart).
    #[must_use]
    pub fn all_selected(&self) -> bool {
        self.items.iter().all(|item| item.selected)
    }

    /// Number of selected lines.
    #[must_use]
    pub fn selected_count(&self) -> usize {
        self.items.iter().filter(|item| item.selected).count()
    }

    /// Total number of units across all lines.
    #[must_use]
    pub fn item_count(&self) -> u64 {
        self.items.iter().map(|item| u64::from(item.quantity)).sum()
    }
}
