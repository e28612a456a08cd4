//! Session-backed key-value store.

use async_trait::async_trait;
use tower_sessions::Session;

use super::{KeyValueStore, StorageError};

/// A [`KeyValueStore`] over the current request's `tower-sessions` session.
///
/// Values are stored as JSON strings inside the session record. `set` saves
/// the record to the session backend (Postgres in production) before it
/// returns instead of waiting for the response to be sent.
#[derive(Debug, Clone)]
pub struct SessionStore {
    session: Session,
}

impl SessionStore {
    #[must_use]
    pub const fn new(session: Session) -> Self {
        Self { session }
    }
}

#[async_trait]
impl KeyValueStore for SessionStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.session.get::<String>(key).await?)
    }

    async fn set(&self, key: &str, value: String) -> Result<(), StorageError> {
        self.session.insert(key, value).await?;
        self.session.save().await?;
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use super::*;

    fn session() -> Session {
        Session::new(None, Arc::new(tower_sessions::MemoryStore::default()), None)
    }

    #[tokio::test]
    async fn test_set_then_get() {
        let store = SessionStore::new(session());
        assert_eq!(store.get("cart").await.unwrap(), None);

        store.set("cart", "[]".to_owned()).await.unwrap();
        assert_eq!(store.get("cart").await.unwrap().as_deref(), Some("[]"));
    }

    #[tokio::test]
    async fn test_set_assigns_session_id() {
        let session = session();
        let store = SessionStore::new(session.clone());
        store.set("auth", "{}".to_owned()).await.unwrap();
        assert!(session.id().is_some());
    }
}
