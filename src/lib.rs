//! Filtered collections: ordered, deduplicated element-id indexes
//! persisted in a key-value store.
//!
//! A [`Collection`] maintains, for one (element type, owner) pair, the ids
//! of the owner's elements pre-sorted by a configured attribute. It exists
//! to avoid re-running "all children of X sorted by Y" queries: the index
//! is updated incrementally as elements are stored, changed, or removed,
//! and persisted as a single value under a deterministic key.
//!
//! # Quick Start
//!
//! ```
//! use std::sync::Arc;
//! use filtered_collections::{
//!     CollectionConfig, Collections, ElementId, ElementRef, FindKind, FindOptions,
//!     MemoryStore, MsgpackCodec, OrderDirection, OwnerKey, SortValue,
//! };
//!
//! struct Photo {
//!     id: u64,
//!     rating: i64,
//! }
//!
//! impl ElementRef for Photo {
//!     fn id(&self) -> Option<ElementId> {
//!         Some(ElementId::from(self.id))
//!     }
//!
//!     fn sort_value(&self, attribute: &str) -> Option<SortValue> {
//!         (attribute == "rating").then(|| SortValue::Int(self.rating))
//!     }
//! }
//!
//! # fn main() -> filtered_collections::Result<()> {
//! let collections = Collections::new(Arc::new(MemoryStore::new()), Arc::new(MsgpackCodec));
//! let config = CollectionConfig::new("photo", "rating", OrderDirection::Descending);
//! let mut best_rated = collections.open(&config, OwnerKey::scalar(7))?;
//!
//! best_rated.store_elements([&Photo { id: 1, rating: 4 }, &Photo { id: 2, rating: 9 }])?;
//!
//! let ids = best_rated.find(FindKind::All, &FindOptions::default())?;
//! assert_eq!(ids, vec![ElementId::from(2u64), ElementId::from(1u64)]);
//! # Ok(())
//! # }
//! ```
//!
//! # Concurrency
//!
//! Mutations are synchronous read-modify-write cycles with no locking or
//! compare-and-swap: concurrent writers to the same collection key follow
//! LAST-WRITER-WINS and the losing write is overwritten. This is a stated
//! property of the engine, not an accident; callers needing stronger
//! guarantees must serialize writers per key externally. The
//! [`KeyValueStore`] contract is deliberately frozen at get/set/delete,
//! so no version stamp can ride the backend.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod codec;
pub mod collection;
pub mod element;
pub mod error;
pub mod factory;
pub mod key;
pub mod paginate;
pub mod storage;
pub mod types;

pub use codec::{Codec, MsgpackCodec};
pub use collection::{Collection, CollectionState, DeleteTarget, FindKind, FindOptions, Persist};
pub use element::{CachedHydrator, ElementRef, Hydrator};
pub use error::{Error, Result};
pub use factory::{CollectionConfig, Collections};
pub use key::{key_for, COLLECTION_TAG};
pub use paginate::{Page, PageRequest, DEFAULT_PER_PAGE};
pub use storage::{KeyValueStore, MemoryStore};
pub use types::{ElementId, Entry, OrderDirection, OwnerKey, SortValue};
