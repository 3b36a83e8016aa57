//! Collection key derivation
//!
//! Every collection is persisted under a single deterministic key derived
//! from its element type and owner. Derivation is pure: no I/O, no state.
//!
//! ## Contract
//!
//! Key format is frozen as `"<COLLECTION_TAG>/<element_type>_<owner>"`,
//! where `<owner>` is the canonical rendering of the owner key (see
//! [`OwnerKey::canonical`]). Composite owners canonicalize to the same
//! string regardless of field order, so the derived key is stable.

use crate::types::OwnerKey;

/// Namespace prefix shared by all persisted collection keys
pub const COLLECTION_TAG: &str = "filtered_collections";

/// Derive the backing-store key for a collection
///
/// # Examples
///
/// ```
/// use filtered_collections::{key_for, OwnerKey};
///
/// let key = key_for("photo", &OwnerKey::scalar(17));
/// assert_eq!(key, "filtered_collections/photo_17");
/// ```
pub fn key_for(element_type: &str, owner: &OwnerKey) -> String {
    format!("{COLLECTION_TAG}/{element_type}_{}", owner.canonical())
}
