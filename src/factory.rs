//! Collection factory with explicit dependency injection
//!
//! A [`Collections`] value owns the backend and codec handles and opens
//! collection instances against them. There is no process-wide storage
//! singleton: whoever builds the factory decides which backend every
//! collection opened through it uses.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::codec::{Codec, MsgpackCodec};
use crate::collection::Collection;
use crate::error::Result;
use crate::storage::{KeyValueStore, MemoryStore};
use crate::types::{OrderDirection, OwnerKey};

/// Static configuration of a collection kind
///
/// One config describes every collection of a kind: which element type it
/// indexes and how it is ordered. The owner varies per
/// [`open`](Collections::open) call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectionConfig {
    /// Type tag of the indexed elements
    pub element_type: String,
    /// Name of the ordering attribute
    pub order_by: String,
    /// Sort direction
    pub order: OrderDirection,
}

impl CollectionConfig {
    /// Create a configuration record
    pub fn new(
        element_type: impl Into<String>,
        order_by: impl Into<String>,
        order: OrderDirection,
    ) -> Self {
        Self {
            element_type: element_type.into(),
            order_by: order_by.into(),
            order,
        }
    }
}

/// Factory for opening collections against one backend and codec
#[derive(Debug)]
pub struct Collections<S, C> {
    store: Arc<S>,
    codec: Arc<C>,
}

impl<S, C> Clone for Collections<S, C> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            codec: Arc::clone(&self.codec),
        }
    }
}

impl Collections<MemoryStore, MsgpackCodec> {
    /// Factory over a fresh in-process store with the default codec
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStore::new()), Arc::new(MsgpackCodec))
    }
}

impl<S: KeyValueStore, C: Codec> Collections<S, C> {
    /// Create a factory over the given backend and codec
    pub fn new(store: Arc<S>, codec: Arc<C>) -> Self {
        Self { store, codec }
    }

    /// The backend shared by every collection opened here
    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    /// Load the collection for (config, owner), or create it empty
    ///
    /// # Errors
    ///
    /// Propagates backend and decode failures from the load.
    pub fn open(&self, config: &CollectionConfig, owner: OwnerKey) -> Result<Collection<S, C>> {
        Collection::load_or_create(
            Arc::clone(&self.store),
            Arc::clone(&self.codec),
            &config.element_type,
            owner,
            &config.order_by,
            config.order,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collection::Persist;
    use crate::element::ElementRef;
    use crate::types::{ElementId, SortValue};

    struct Note {
        id: i64,
        pinned_at: i64,
    }

    impl ElementRef for Note {
        fn id(&self) -> Option<ElementId> {
            Some(ElementId::from(self.id))
        }

        fn sort_value(&self, attribute: &str) -> Option<SortValue> {
            (attribute == "pinned_at").then(|| SortValue::Int(self.pinned_at))
        }
    }

    #[test]
    fn test_open_creates_empty_collection() {
        let collections = Collections::in_memory();
        let config = CollectionConfig::new("note", "pinned_at", OrderDirection::Ascending);
        let c = collections.open(&config, OwnerKey::scalar(1)).unwrap();
        assert!(c.is_empty());
        assert_eq!(c.key(), "filtered_collections/note_1");
    }

    #[test]
    fn test_open_twice_sees_persisted_state() {
        let collections = Collections::in_memory();
        let config = CollectionConfig::new("note", "pinned_at", OrderDirection::Ascending);

        let mut first = collections.open(&config, OwnerKey::scalar(1)).unwrap();
        first
            .store_element(&Note { id: 7, pinned_at: 3 }, Persist::Now)
            .unwrap();

        let second = collections.open(&config, OwnerKey::scalar(1)).unwrap();
        assert_eq!(second.total(), 1);
        assert!(second.contains(&ElementId::from(7i64)));
    }

    #[test]
    fn test_owners_are_isolated() {
        let collections = Collections::in_memory();
        let config = CollectionConfig::new("note", "pinned_at", OrderDirection::Ascending);

        let mut mine = collections.open(&config, OwnerKey::scalar(1)).unwrap();
        mine.store_element(&Note { id: 7, pinned_at: 3 }, Persist::Now)
            .unwrap();

        let theirs = collections.open(&config, OwnerKey::scalar(2)).unwrap();
        assert!(theirs.is_empty());
    }

    #[test]
    fn test_store_exposes_shared_backend() {
        let collections = Collections::in_memory();
        let config = CollectionConfig::new("note", "pinned_at", OrderDirection::Ascending);
        assert!(collections.store().is_empty());

        let mut c = collections.open(&config, OwnerKey::scalar(1)).unwrap();
        c.store_element(&Note { id: 7, pinned_at: 3 }, Persist::Now)
            .unwrap();
        assert_eq!(collections.store().len(), 1);
    }

    #[test]
    fn test_config_serializes_as_plain_record() {
        let config = CollectionConfig::new("note", "pinned_at", OrderDirection::Descending);
        let json = serde_json::to_value(&config).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "element_type": "note",
                "order_by": "pinned_at",
                "order": "Descending",
            })
        );
    }

    #[test]
    fn test_factories_do_not_share_hidden_state() {
        let config = CollectionConfig::new("note", "pinned_at", OrderDirection::Ascending);

        let mut a = Collections::in_memory()
            .open(&config, OwnerKey::scalar(1))
            .unwrap();
        a.store_element(&Note { id: 7, pinned_at: 3 }, Persist::Now)
            .unwrap();

        // a separate factory owns a separate backend
        let b = Collections::in_memory()
            .open(&config, OwnerKey::scalar(1))
            .unwrap();
        assert!(b.is_empty());
    }
}
