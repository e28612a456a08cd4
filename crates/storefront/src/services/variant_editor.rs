//! Variant edit modal state.
//!
//! The editor is either closed or holds one staged copy of a line item (the
//! draft). Color and size changes touch only the draft; the cart changes only
//! when the draft is saved, and only through [`CartStore::apply_edit`].

use teeshirt_core::{Color, LineItem, LineItemId, Size};

use crate::services::cart::CartStore;
use crate::storage::{KeyValueStore, StorageError};

/// Staged variant edit for at most one line item.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VariantEditor {
    draft: Option<LineItem>,
}

impl VariantEditor {
    /// A closed editor.
    #[must_use]
    pub const fn new() -> Self {
        Self { draft: None }
    }

    /// Open the editor on a copy of `item`, replacing any previous draft.
    pub fn open(&mut self, item: &LineItem) {
        self.draft = Some(item.clone());
    }

    /// Open the editor on the line `id` of `store`.
    ///
    /// Returns `false` and stays closed when the line is not in the cart.
    pub fn open_line<S: KeyValueStore>(&mut self, store: &CartStore<S>, id: &LineItemId) -> bool {
        match store.get(id) {
            Some(item) => {
                self.open(item);
                true
            }
            None => false,
        }
    }

    #[must_use]
    pub const fn is_open(&self) -> bool {
        self.draft.is_some()
    }

    /// The staged copy, while open.
    #[must_use]
    pub const fn draft(&self) -> Option<&LineItem> {
        self.draft.as_ref()
    }

    /// Stage a color change. Ignored while closed.
    pub fn set_color(&mut self, color: Color) {
        if let Some(draft) = self.draft.as_mut() {
            draft.color = color;
        }
    }

    /// Stage a size change. Ignored while closed.
    pub fn set_size(&mut self, size: Size) {
        if let Some(draft) = self.draft.as_mut() {
            draft.size = size;
        }
    }

    /// Close and discard the draft; the cart is untouched.
    pub fn cancel(&mut self) {
        self.draft = None;
    }

    /// Close and write the draft over its line in `store`.
    ///
    /// Returns whether a line was updated. If the line was removed while the
    /// editor was open the draft is dropped and `Ok(false)` is returned.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the updated cart cannot be persisted. The
    /// editor is closed either way.
    pub async fn save<S: KeyValueStore>(
        &mut self,
        store: &mut CartStore<S>,
    ) -> Result<bool, StorageError> {
        let Some(draft) = self.draft.take() else {
            return Ok(false);
        };
        let id = draft.cart_id.clone();
        let applied = store.apply_edit(&id, draft).await?;
        if !applied {
            tracing::debug!(cart_id = %id, "Dropped edit for a line no longer in the cart");
        }
        Ok(applied)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rust_decimal::Decimal;

    use super::*;
    use crate::models::session_keys;
    use crate::storage::MemoryStore;

    async fn store_with_x() -> CartStore<MemoryStore> {
        let storage = MemoryStore::new();
        let items = vec![LineItem {
            cart_id: LineItemId::new("x"),
            name: "Graphic Tee".to_owned(),
            image: String::new(),
            price: Decimal::from(399),
            color: Color::Black,
            size: Size::M,
            quantity: 2,
            selected: true,
        }];
        storage
            .insert(session_keys::CART, serde_json::to_string(&items).unwrap())
            .await;
        CartStore::load(storage).await
    }

    #[tokio::test]
    async fn test_cancel_discards_draft() {
        let store = store_with_x().await;
        let id = LineItemId::new("x");
        let mut editor = VariantEditor::new();

        assert!(editor.open_line(&store, &id));
        editor.set_color(Color::Red);
        assert_eq!(editor.draft().unwrap().color, Color::Red);
        editor.cancel();

        assert!(!editor.is_open());
        assert_eq!(store.get(&id).unwrap().color, Color::Black);
    }

    #[tokio::test]
    async fn test_save_applies_draft() {
        let mut store = store_with_x().await;
        let id = LineItemId::new("x");
        let mut editor = VariantEditor::new();

        editor.open_line(&store, &id);
        editor.set_color(Color::Navy);
        editor.set_size(Size::Xl);
        assert_eq!(store.get(&id).unwrap().size, Size::M);

        assert!(editor.save(&mut store).await.unwrap());
        assert!(!editor.is_open());
        let saved = store.get(&id).unwrap();
        assert_eq!((saved.color, saved.size, saved.quantity), (Color::Navy, Size::Xl, 2));

        let reloaded = CartStore::load(store.storage().clone()).await;
        assert_eq!(reloaded.get(&id).unwrap().color, Color::Navy);
    }

    #[tokio::test]
    async fn test_save_after_remove_is_dropped() {
        let mut store = store_with_x().await;
        let id = LineItemId::new("x");
        let mut editor = VariantEditor::new();

        editor.open_line(&store, &id);
        editor.set_size(Size::L);
        store.remove(&id).await.unwrap();

        assert!(!editor.save(&mut store).await.unwrap());
        assert!(store.cart().is_empty());
        assert!(!editor.is_open());
    }

    #[tokio::test]
    async fn test_open_missing_line_stays_closed() {
        let store = store_with_x().await;
        let mut editor = VariantEditor::new();
        assert!(!editor.open_line(&store, &LineItemId::new("gone")));
        assert!(!editor.is_open());
    }

    #[tokio::test]
    async fn test_closed_editor_ignores_edits() {
        let mut store = store_with_x().await;
        let mut editor = VariantEditor::new();
        editor.set_color(Color::Pink);
        editor.set_size(Size::Xs);
        assert_eq!(editor, VariantEditor::new());
        assert!(!editor.save(&mut store).await.unwrap());
    }

    #[test]
    fn test_reopen_replaces_draft() {
        let mut editor = VariantEditor::new();
        let mut first = LineItem {
            cart_id: LineItemId::new("a"),
            name: "A".to_owned(),
            image: String::new(),
            price: Decimal::ONE,
            color: Color::Gray,
            size: Size::S,
            quantity: 1,
            selected: true,
        };
        editor.open(&first);
        first.cart_id = LineItemId::new("b");
        editor.open(&first);
        assert_eq!(editor.draft().unwrap().cart_id.as_str(), "b");
    }
}
