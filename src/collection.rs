//! The collection engine
//!
//! A [`Collection`] is an ordered, deduplicated list of element ids for one
//! (element type, owner) pair, kept sorted by a configured attribute and
//! persisted as a single value in a [`KeyValueStore`].
//!
//! ## Invariants
//!
//! After every public mutation returns:
//! 1. Element ids in `entries` are pairwise distinct.
//! 2. `entries` is sorted by sort value per the configured direction;
//!    ties keep their previous relative order (stable sort).
//! 3. `id_index[i] == entries[i].id` for all `i`.
//! 4. `total == entries.len()`.
//!
//! ## Write semantics
//!
//! Every mutating call ends in a full-state overwrite of the persisted
//! value (unless the caller defers persistence for a batch). There is no
//! locking or compare-and-swap: two writers racing on the same key follow
//! LAST-WRITER-WINS, and the loser's update is silently overwritten.
//! Callers that mutate the same collection from several processes must
//! serialize those writers externally.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::codec::Codec;
use crate::element::{ElementRef, Hydrator};
use crate::error::{Error, Result};
use crate::key::key_for;
use crate::paginate::{self, Page, PageRequest};
use crate::storage::KeyValueStore;
use crate::types::{ElementId, Entry, OrderDirection, OwnerKey, SortValue};

/// Whether a mutation should persist the collection before returning
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Persist {
    /// Write the full state to the backend at the end of the call
    Now,
    /// Leave persistence to the caller (batch use)
    Defer,
}

/// Shape of a `find` result
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FindKind {
    /// Every id in the requested window
    All,
    /// At most the single id at the requested offset
    First,
}

/// Window options for [`Collection::find`]
///
/// An omitted option falls back to its default (`limit` = collection size,
/// `offset` = 0). An explicit `offset` of zero is valid and equivalent to
/// omitting it; an explicit `limit` of zero is rejected.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FindOptions {
    /// Maximum number of ids to return; clamped to the collection size
    pub limit: Option<usize>,
    /// Number of leading ids to skip; clamped to the collection size
    pub offset: Option<usize>,
}

impl FindOptions {
    /// Options with only a limit set
    pub fn with_limit(limit: usize) -> Self {
        Self {
            limit: Some(limit),
            offset: None,
        }
    }

    /// Options with only an offset set
    pub fn with_offset(offset: usize) -> Self {
        Self {
            limit: None,
            offset: Some(offset),
        }
    }
}

/// What to delete: a raw id or anything exposing one
pub enum DeleteTarget<'a> {
    /// Delete by raw identifier
    Id(ElementId),
    /// Delete by element reference; its id is resolved at call time
    Ref(&'a dyn ElementRef),
}

impl From<ElementId> for DeleteTarget<'static> {
    fn from(id: ElementId) -> Self {
        DeleteTarget::Id(id)
    }
}

impl From<&ElementId> for DeleteTarget<'static> {
    fn from(id: &ElementId) -> Self {
        DeleteTarget::Id(id.clone())
    }
}

impl From<&str> for DeleteTarget<'static> {
    fn from(id: &str) -> Self {
        DeleteTarget::Id(ElementId::from(id))
    }
}

impl From<i64> for DeleteTarget<'static> {
    fn from(id: i64) -> Self {
        DeleteTarget::Id(ElementId::from(id))
    }
}

impl<'a> From<&'a dyn ElementRef> for DeleteTarget<'a> {
    fn from(element: &'a dyn ElementRef) -> Self {
        DeleteTarget::Ref(element)
    }
}

/// Persisted state of a collection
///
/// This is the unit the [`Codec`] serializes: identity (element type +
/// owner), ordering configuration, the entry sequence, and the entry
/// count. The id index is a derived cache and is not serialized; it is
/// rebuilt after decoding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollectionState {
    element_type: String,
    owner: OwnerKey,
    order_by: String,
    direction: OrderDirection,
    entries: Vec<Entry>,
    total: usize,
    #[serde(skip)]
    id_index: Vec<ElementId>,
}

impl CollectionState {
    /// Create an empty state with the given identity and ordering
    pub fn new(
        element_type: impl Into<String>,
        owner: OwnerKey,
        order_by: impl Into<String>,
        direction: OrderDirection,
    ) -> Self {
        Self {
            element_type: element_type.into(),
            owner,
            order_by: order_by.into(),
            direction,
            entries: Vec::new(),
            total: 0,
            id_index: Vec::new(),
        }
    }

    /// The backing-store key this state persists under
    pub fn key(&self) -> String {
        key_for(&self.element_type, &self.owner)
    }

    /// Element type tag
    pub fn element_type(&self) -> &str {
        &self.element_type
    }

    /// Owner of the collection
    pub fn owner(&self) -> &OwnerKey {
        &self.owner
    }

    /// Name of the ordering attribute
    pub fn order_by(&self) -> &str {
        &self.order_by
    }

    /// Sort direction
    pub fn direction(&self) -> OrderDirection {
        self.direction
    }

    /// Number of entries
    pub fn total(&self) -> usize {
        self.total
    }

    /// Whether the collection holds no entries
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The entry sequence, sorted per the configured direction
    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    /// The ordered id projection of `entries`
    pub fn id_index(&self) -> &[ElementId] {
        &self.id_index
    }

    /// Whether the given id is present
    pub fn contains(&self, id: &ElementId) -> bool {
        self.position_of(id).is_some()
    }

    /// Position of the given id in the current order, if present
    pub fn position_of(&self, id: &ElementId) -> Option<usize> {
        self.entries.iter().position(|e| &e.id == id)
    }

    /// Rebuild the derived id index from `entries`
    ///
    /// Must be called after constructing a state from decoded bytes; the
    /// index is a cache and is never serialized.
    pub fn reindex(&mut self) {
        self.id_index = self.entries.iter().map(|e| e.id.clone()).collect();
    }

    /// Stable re-sort per the configured direction, then reindex
    pub(crate) fn reorder(&mut self) {
        match self.direction {
            OrderDirection::Ascending => self.entries.sort_by(|a, b| a.sort.cmp(&b.sort)),
            OrderDirection::Descending => self.entries.sort_by(|a, b| b.sort.cmp(&a.sort)),
        }
        self.reindex();
    }

    /// Insert or update an entry; returns whether a reorder is required
    pub(crate) fn upsert(&mut self, id: ElementId, sort: SortValue) -> bool {
        if let Some(pos) = self.position_of(&id) {
            if self.entries[pos].sort == sort {
                return false;
            }
            self.entries[pos].sort = sort;
            true
        } else {
            self.entries.push(Entry { id, sort });
            self.total += 1;
            true
        }
    }

    /// Remove an entry if present; returns whether anything was removed
    ///
    /// The count changes only on an actual removal. Removing a sorted
    /// entry preserves the order of the rest, so only the index is
    /// rebuilt.
    fn remove(&mut self, id: &ElementId) -> bool {
        match self.position_of(id) {
            Some(pos) => {
                self.entries.remove(pos);
                self.total -= 1;
                self.reindex();
                true
            }
            None => false,
        }
    }

    /// Ids in `[offset, offset + limit)`, both ends clamped to the size
    pub(crate) fn window(&self, offset: usize, limit: usize) -> &[ElementId] {
        let len = self.id_index.len();
        let start = offset.min(len);
        let end = start.saturating_add(limit).min(len);
        &self.id_index[start..end]
    }
}

/// Ordered, deduplicated, persisted index of element ids
///
/// Obtained via [`Collection::load_or_create`] (or the
/// [`Collections`](crate::factory::Collections) factory), mutated through
/// [`store_element`](Collection::store_element),
/// [`store_elements`](Collection::store_elements) and
/// [`delete_element`](Collection::delete_element), and read through
/// [`find`](Collection::find) and [`paginate`](Collection::paginate).
///
/// Mutations follow a read-modify-write cycle with last-writer-wins
/// semantics; see the module docs.
pub struct Collection<S, C> {
    store: Arc<S>,
    codec: Arc<C>,
    state: CollectionState,
}

impl<S: KeyValueStore, C: Codec> Collection<S, C> {
    /// Load the persisted collection for (element type, owner), or create
    /// an empty one with the supplied ordering configuration
    ///
    /// The ordering configuration of a persisted collection wins over the
    /// one supplied here; the arguments only seed a newly created state.
    ///
    /// # Errors
    ///
    /// A backend read failure or a decode failure propagates; a missing
    /// key does not (it means "create").
    pub fn load_or_create(
        store: Arc<S>,
        codec: Arc<C>,
        element_type: &str,
        owner: OwnerKey,
        order_by: &str,
        direction: OrderDirection,
    ) -> Result<Self> {
        let key = key_for(element_type, &owner);
        let state = match store.get(&key)? {
            Some(bytes) => {
                let state = codec.decode(&bytes)?;
                debug!(
                    target: "filtered_collections::engine",
                    key = %key,
                    total = state.total(),
                    "loaded persisted collection"
                );
                state
            }
            None => {
                debug!(target: "filtered_collections::engine", key = %key, "initialized empty collection");
                CollectionState::new(element_type, owner, order_by, direction)
            }
        };
        Ok(Self {
            store,
            codec,
            state,
        })
    }

    /// The in-memory state
    pub fn state(&self) -> &CollectionState {
        &self.state
    }

    /// The backing-store key
    pub fn key(&self) -> String {
        self.state.key()
    }

    /// Number of entries
    pub fn total(&self) -> usize {
        self.state.total()
    }

    /// Whether the collection holds no entries
    pub fn is_empty(&self) -> bool {
        self.state.is_empty()
    }

    /// Whether the given id is present
    pub fn contains(&self, id: &ElementId) -> bool {
        self.state.contains(id)
    }

    /// Position of the given id in the current order, if present
    pub fn position_of(&self, id: &ElementId) -> Option<usize> {
        self.state.position_of(id)
    }

    /// Insert or update one element
    ///
    /// Validates the reference before touching any state. An element whose
    /// id is already present with an equal sort value is a complete no-op:
    /// no reorder and no persistence happen on its account. Otherwise the
    /// entry is inserted or updated in place, the collection is re-sorted
    /// (stable), and, when `persist` is [`Persist::Now`], the full state is
    /// written through to the backend.
    ///
    /// # Errors
    ///
    /// [`Error::MissingIdentifier`] or [`Error::MissingSortAttribute`] on a
    /// deficient reference (state untouched); [`Error::Storage`] /
    /// [`Error::Codec`] from the write-through.
    pub fn store_element<E: ElementRef + ?Sized>(
        &mut self,
        element: &E,
        persist: Persist,
    ) -> Result<()> {
        let id = element.id().ok_or(Error::MissingIdentifier)?;
        let sort = element
            .sort_value(self.state.order_by())
            .ok_or_else(|| Error::MissingSortAttribute {
                attribute: self.state.order_by().to_string(),
            })?;

        if self.state.upsert(id, sort) {
            self.state.reorder();
            if persist == Persist::Now {
                self.save()?;
            }
        }
        Ok(())
    }

    /// Insert or update a batch of elements, persisting once at the end
    ///
    /// Applies [`store_element`](Collection::store_element) with deferred
    /// persistence to each reference in order, then writes the full state
    /// in a single backend round trip. This is the only way to add many
    /// elements without paying one serialization per element.
    ///
    /// # Errors
    ///
    /// A validation error on the n-th reference aborts the batch before
    /// the save: earlier references remain applied in memory but nothing
    /// reaches the backend.
    pub fn store_elements<E, I>(&mut self, elements: I) -> Result<()>
    where
        E: ElementRef,
        I: IntoIterator<Item = E>,
    {
        for element in elements {
            self.store_element(&element, Persist::Defer)?;
        }
        self.save()
    }

    /// Remove one element by id or by reference
    ///
    /// When the id is present it is removed and the count decremented by
    /// exactly one; when absent, entries and count are untouched. The
    /// state is written through unconditionally, so even a no-op delete
    /// costs one backend round trip (observable write-through semantics).
    ///
    /// # Errors
    ///
    /// [`Error::MissingIdentifier`] when a reference without an id is
    /// passed; [`Error::Storage`] / [`Error::Codec`] from the
    /// write-through.
    pub fn delete_element<'a>(&mut self, target: impl Into<DeleteTarget<'a>>) -> Result<()> {
        let id = match target.into() {
            DeleteTarget::Id(id) => id,
            DeleteTarget::Ref(element) => element.id().ok_or(Error::MissingIdentifier)?,
        };
        if self.state.remove(&id) {
            debug!(
                target: "filtered_collections::engine",
                key = %self.state.key(),
                id = %id,
                "removed element"
            );
        }
        self.save()
    }

    /// Read a window of element ids
    ///
    /// - [`FindKind::All`] returns `id_index[offset..offset + limit]`.
    /// - [`FindKind::First`] returns at most the single id at `offset`
    ///   (an empty vector when out of range).
    ///
    /// Both bounds are clamped to the collection size. An explicit
    /// `offset` of zero is accepted and equivalent to omitting it.
    ///
    /// # Errors
    ///
    /// [`Error::BadArguments`] when an explicit `limit` of zero is
    /// supplied; raised before any read executes.
    pub fn find(&self, kind: FindKind, options: &FindOptions) -> Result<Vec<ElementId>> {
        let total = self.state.total();
        let limit = match options.limit {
            Some(0) => {
                return Err(Error::BadArguments(
                    "limit must be a positive integer".to_string(),
                ))
            }
            Some(n) => n.min(total),
            None => total,
        };
        let offset = options.offset.unwrap_or(0).min(total);
        let ids = match kind {
            FindKind::All => self.state.window(offset, limit),
            FindKind::First => self.state.window(offset, 1),
        };
        Ok(ids.to_vec())
    }

    /// [`find`](Collection::find), with results passed through a hydrator
    ///
    /// The hydrator receives the id window in collection order and must
    /// preserve it; whether absent elements are omitted or returned as
    /// empty slots is the hydrator's documented choice.
    pub fn find_hydrated<H: Hydrator>(
        &self,
        kind: FindKind,
        options: &FindOptions,
        hydrator: &H,
    ) -> Result<Vec<H::Element>> {
        let ids = self.find(kind, options)?;
        hydrator.load_many(&ids)
    }

    /// Read one page of element ids with page metadata
    ///
    /// `page` defaults to 1 and is clamped to `[1, total]` (1 when empty);
    /// `per_page` defaults to 50 and is clamped to at least 1. Requests
    /// are clamped rather than rejected, so this never fails:
    /// `paginate` on page `p` with `n` per page returns exactly the ids of
    /// `find(All, limit: n, offset: (p - 1) * n)`.
    pub fn paginate(&self, request: &PageRequest) -> Page<ElementId> {
        let total = self.state.total();
        let window = paginate::resolve(request, total);
        Page {
            items: self.state.window(window.offset, window.per_page).to_vec(),
            page_number: window.page,
            per_page: window.per_page,
            page_count: window.page_count,
            total_entries: total,
        }
    }

    /// [`paginate`](Collection::paginate), with items passed through a hydrator
    pub fn paginate_hydrated<H: Hydrator>(
        &self,
        request: &PageRequest,
        hydrator: &H,
    ) -> Result<Page<H::Element>> {
        let page = self.paginate(request);
        let items = hydrator.load_many(&page.items)?;
        Ok(page.map_items(items))
    }

    /// Persist the full state at the collection key
    ///
    /// One codec pass, one backend write, overwrite semantics. Under
    /// concurrent writers this is where last-writer-wins bites: the write
    /// replaces whatever the backend holds, including updates this
    /// process never saw.
    pub fn save(&self) -> Result<()> {
        let key = self.state.key();
        let bytes = self.codec.encode(&self.state)?;
        self.store.set(&key, &bytes)?;
        debug!(
            target: "filtered_collections::engine",
            key = %key,
            total = self.state.total(),
            bytes = bytes.len(),
            "persisted collection"
        );
        Ok(())
    }
}
