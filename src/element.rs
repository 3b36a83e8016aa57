//! Element reference and hydration contracts
//!
//! A collection never holds whole elements, only ids and sort values.
//! [`ElementRef`] is the contract a value must satisfy to be stored;
//! [`Hydrator`] is the external capability that turns an id sequence back
//! into full elements on the read paths.

use std::marker::PhantomData;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

use crate::error::{Error, Result};
use crate::storage::KeyValueStore;
use crate::types::{ElementId, SortValue};

/// Contract for values passed to `store_element`/`store_elements`
///
/// A reference must expose a stable id and the value of whatever field
/// the collection is ordered by. Both accessors return `Option` so a
/// deficient reference can be rejected with a precise error before any
/// state is touched.
pub trait ElementRef {
    /// The element's identifier, if it has one
    fn id(&self) -> Option<ElementId>;

    /// The value of the named attribute, if the element carries it
    fn sort_value(&self, attribute: &str) -> Option<SortValue>;
}

impl<T: ElementRef + ?Sized> ElementRef for &T {
    fn id(&self) -> Option<ElementId> {
        (**self).id()
    }

    fn sort_value(&self, attribute: &str) -> Option<SortValue> {
        (**self).sort_value(attribute)
    }
}

/// Resolves identifiers into full elements for the hydrated read paths
///
/// `load_many` must preserve the order of the input id sequence. What
/// happens to ids that resolve to nothing is the implementation's choice
/// (omit them or return a slot type), but it must be documented; the
/// collection engine assumes nothing about it.
pub trait Hydrator {
    /// The hydrated element type
    type Element;

    /// Resolve a sequence of ids, preserving input order
    ///
    /// # Errors
    ///
    /// Implementation-defined; typically [`Error::Storage`] or
    /// [`Error::Codec`] for backend-backed hydrators.
    fn load_many(&self, ids: &[ElementId]) -> Result<Vec<Self::Element>>;
}

/// Write-through element cache over a [`KeyValueStore`]
///
/// Stores each element serialized (MessagePack, named fields) at
/// `"<element_type>/<id>"`. Callers write through on every element change
/// via [`store`](CachedHydrator::store) and drop entries via
/// [`evict`](CachedHydrator::evict); `load_many` then serves the hydrated
/// read paths. Ids with no cached value are OMITTED from the result, so
/// the output may be shorter than the input.
pub struct CachedHydrator<S, T> {
    store: Arc<S>,
    element_type: String,
    _marker: PhantomData<fn() -> T>,
}

impl<S: KeyValueStore, T> CachedHydrator<S, T> {
    /// Create a hydrator for one element type over the given backend
    pub fn new(store: Arc<S>, element_type: impl Into<String>) -> Self {
        Self {
            store,
            element_type: element_type.into(),
            _marker: PhantomData,
        }
    }

    fn cache_key(&self, id: &ElementId) -> String {
        format!("{}/{id}", self.element_type)
    }

    /// Drop an element from the cache; absent ids are not an error
    ///
    /// # Errors
    ///
    /// Propagates backend delete failures.
    pub fn evict(&self, id: &ElementId) -> Result<()> {
        self.store.delete(&self.cache_key(id))
    }
}

impl<S: KeyValueStore, T: Serialize + ElementRef> CachedHydrator<S, T> {
    /// Write an element through to the cache
    ///
    /// # Errors
    ///
    /// [`Error::MissingIdentifier`] if the element has no id, plus any
    /// backend or serialization failure.
    pub fn store(&self, element: &T) -> Result<()> {
        let id = element.id().ok_or(Error::MissingIdentifier)?;
        let bytes = rmp_serde::to_vec_named(element)?;
        self.store.set(&self.cache_key(&id), &bytes)?;
        debug!(
            target: "filtered_collections::hydrate",
            element_type = %self.element_type,
            id = %id,
            "cached element"
        );
        Ok(())
    }
}

impl<S: KeyValueStore, T: DeserializeOwned> Hydrator for CachedHydrator<S, T> {
    type Element = T;

    fn load_many(&self, ids: &[ElementId]) -> Result<Vec<T>> {
        let mut elements = Vec::with_capacity(ids.len());
        for id in ids {
            if let Some(bytes) = self.store.get(&self.cache_key(id))? {
                elements.push(rmp_serde::from_slice(&bytes)?);
            }
        }
        Ok(elements)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;
    use serde::Deserialize;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Photo {
        id: String,
        rating: i64,
    }

    impl ElementRef for Photo {
        fn id(&self) -> Option<ElementId> {
            Some(ElementId::from(self.id.as_str()))
        }

        fn sort_value(&self, attribute: &str) -> Option<SortValue> {
            (attribute == "rating").then(|| SortValue::Int(self.rating))
        }
    }

    fn photo(id: &str, rating: i64) -> Photo {
        Photo {
            id: id.to_string(),
            rating,
        }
    }

    fn hydrator() -> CachedHydrator<MemoryStore, Photo> {
        CachedHydrator::new(Arc::new(MemoryStore::new()), "photo")
    }

    #[test]
    fn test_element_ref_through_reference() {
        let p = photo("a", 3);
        let r = &p;
        assert_eq!(r.id(), Some(ElementId::from("a")));
        assert_eq!(r.sort_value("rating"), Some(SortValue::Int(3)));
        assert_eq!(r.sort_value("taken_at"), None);
    }

    #[test]
    fn test_store_then_load_many() {
        let h = hydrator();
        h.store(&photo("a", 1)).unwrap();
        h.store(&photo("b", 2)).unwrap();

        let loaded = h
            .load_many(&[ElementId::from("b"), ElementId::from("a")])
            .unwrap();
        assert_eq!(loaded, vec![photo("b", 2), photo("a", 1)]);
    }

    #[test]
    fn test_load_many_omits_absent_ids() {
        let h = hydrator();
        h.store(&photo("a", 1)).unwrap();

        let loaded = h
            .load_many(&[
                ElementId::from("missing"),
                ElementId::from("a"),
                ElementId::from("gone"),
            ])
            .unwrap();
        assert_eq!(loaded, vec![photo("a", 1)]);
    }

    #[test]
    fn test_load_many_preserves_order() {
        let h = hydrator();
        for (id, rating) in [("x", 1), ("y", 2), ("z", 3)] {
            h.store(&photo(id, rating)).unwrap();
        }
        let loaded = h
            .load_many(&[
                ElementId::from("z"),
                ElementId::from("x"),
                ElementId::from("y"),
            ])
            .unwrap();
        let ids: Vec<&str> = loaded.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["z", "x", "y"]);
    }

    #[test]
    fn test_evict() {
        let h = hydrator();
        h.store(&photo("a", 1)).unwrap();
        h.evict(&ElementId::from("a")).unwrap();
        assert!(h.load_many(&[ElementId::from("a")]).unwrap().is_empty());
        // evicting again is fine
        h.evict(&ElementId::from("a")).unwrap();
    }

    #[test]
    fn test_cache_key_format() {
        let h = hydrator();
        assert_eq!(h.cache_key(&ElementId::from("42")), "photo/42");
    }
}
