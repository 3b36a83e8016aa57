//! Core types for filtered collections
//!
//! This module defines the foundational types:
//! - ElementId: Identifier of a stored element
//! - OwnerKey: Scalar or composite identifier of the owning entity
//! - OrderDirection: Sort direction for a collection
//! - SortValue: Comparable value of the configured ordering attribute
//! - Entry: An (id, sort value) pair held inside a collection

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;

/// Identifier of an element held in a collection
///
/// Stored as a string so that numeric and non-numeric id schemes both fit;
/// numeric ids render in decimal. ElementIds are supplied by callers, never
/// generated here.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ElementId(String);

impl ElementId {
    /// Create an ElementId from anything string-like
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The identifier as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ElementId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for ElementId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<i64> for ElementId {
    fn from(n: i64) -> Self {
        Self(n.to_string())
    }
}

impl From<u64> for ElementId {
    fn from(n: u64) -> Self {
        Self(n.to_string())
    }
}

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier of the entity that owns a collection
///
/// Either a single scalar value or a composite mapping of field names to
/// values. The canonical rendering of a composite owner is independent of
/// the order in which fields were supplied.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OwnerKey {
    /// A single identifying value, e.g. an owner row id
    Scalar(String),
    /// A set of identifying fields, e.g. `{user_id: 7, album_id: 3}`
    Composite(BTreeMap<String, String>),
}

impl OwnerKey {
    /// Create a scalar owner key
    pub fn scalar(value: impl fmt::Display) -> Self {
        Self::Scalar(value.to_string())
    }

    /// Create a composite owner key from (field, value) pairs
    ///
    /// Duplicate fields keep the last value supplied.
    pub fn composite<K, V, I>(fields: I) -> Self
    where
        K: Into<String>,
        V: fmt::Display,
        I: IntoIterator<Item = (K, V)>,
    {
        Self::Composite(
            fields
                .into_iter()
                .map(|(k, v)| (k.into(), v.to_string()))
                .collect(),
        )
    }

    /// Canonical string rendering, stable under field-order permutation
    ///
    /// A scalar renders as-is. A composite renders each field as a
    /// `field_value` token; tokens are sorted lexicographically and joined
    /// with `/`, so the same mapping always yields the same string.
    pub fn canonical(&self) -> String {
        match self {
            OwnerKey::Scalar(value) => value.clone(),
            OwnerKey::Composite(fields) => {
                let mut tokens: Vec<String> = fields
                    .iter()
                    .map(|(field, value)| format!("{field}_{value}"))
                    .collect();
                tokens.sort();
                tokens.join("/")
            }
        }
    }
}

impl From<&str> for OwnerKey {
    fn from(s: &str) -> Self {
        Self::Scalar(s.to_string())
    }
}

impl From<String> for OwnerKey {
    fn from(s: String) -> Self {
        Self::Scalar(s)
    }
}

impl From<i64> for OwnerKey {
    fn from(n: i64) -> Self {
        Self::Scalar(n.to_string())
    }
}

impl fmt::Display for OwnerKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.canonical())
    }
}

/// Sort direction of a collection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OrderDirection {
    /// Smallest sort value first
    Ascending,
    /// Largest sort value first
    Descending,
}

/// Value of the configured ordering attribute
///
/// Unlike a general value model, SortValue carries a total order so that
/// any two values stored in the same collection compare deterministically:
/// - `Int` and `Float` compare numerically against each other
/// - `Float` uses `f64::total_cmp` (NaN sorts after all other floats)
/// - across unrelated variants, `Bool` < numeric < `Text`
///
/// Equality follows the total order, so `Int(1) == Float(1.0)` here. This
/// is deliberate: an element re-stored with a numerically equal sort value
/// must be a no-op, not a reorder.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum SortValue {
    /// Boolean sort attribute (false before true)
    Bool(bool),
    /// 64-bit signed integer
    Int(i64),
    /// 64-bit floating point
    Float(f64),
    /// UTF-8 string, compared bytewise
    Text(String),
}

impl SortValue {
    /// Rank used to order unrelated variants
    fn rank(&self) -> u8 {
        match self {
            SortValue::Bool(_) => 0,
            SortValue::Int(_) | SortValue::Float(_) => 1,
            SortValue::Text(_) => 2,
        }
    }
}

impl Ord for SortValue {
    fn cmp(&self, other: &Self) -> Ordering {
        use SortValue::*;
        match (self, other) {
            (Bool(a), Bool(b)) => a.cmp(b),
            (Int(a), Int(b)) => a.cmp(b),
            (Float(a), Float(b)) => a.total_cmp(b),
            (Int(a), Float(b)) => (*a as f64).total_cmp(b),
            (Float(a), Int(b)) => a.total_cmp(&(*b as f64)),
            (Text(a), Text(b)) => a.cmp(b),
            _ => self.rank().cmp(&other.rank()),
        }
    }
}

impl PartialOrd for SortValue {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for SortValue {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for SortValue {}

impl From<bool> for SortValue {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<i64> for SortValue {
    fn from(n: i64) -> Self {
        Self::Int(n)
    }
}

impl From<f64> for SortValue {
    fn from(x: f64) -> Self {
        Self::Float(x)
    }
}

impl From<&str> for SortValue {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for SortValue {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

/// One (id, sort value) pair held inside a collection
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    /// Identifier of the element
    pub id: ElementId,
    /// Value of the ordering attribute at the time the element was stored
    pub sort: SortValue,
}

impl Entry {
    /// Create a new entry
    pub fn new(id: impl Into<ElementId>, sort: impl Into<SortValue>) -> Self {
        Self {
            id: id.into(),
            sort: sort.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_element_id_from_str_and_int() {
        assert_eq!(ElementId::from("42"), ElementId::from(42i64));
        assert_eq!(ElementId::from(42u64).as_str(), "42");
    }

    #[test]
    fn test_element_id_new_matches_from() {
        assert_eq!(ElementId::new("photo-9"), ElementId::from("photo-9"));
        assert_eq!(ElementId::new(String::from("x")).as_str(), "x");
    }

    #[test]
    fn test_element_id_display() {
        assert_eq!(ElementId::from("photo-9").to_string(), "photo-9");
    }

    #[test]
    fn test_owner_key_scalar_canonical() {
        assert_eq!(OwnerKey::scalar(17).canonical(), "17");
        assert_eq!(OwnerKey::from("alice").canonical(), "alice");
    }

    #[test]
    fn test_owner_key_composite_canonical_sorted() {
        let owner = OwnerKey::composite([("user_id", 7), ("album_id", 3)]);
        assert_eq!(owner.canonical(), "album_id_3/user_id_7");
    }

    #[test]
    fn test_owner_key_composite_permutation_stable() {
        let a = OwnerKey::composite([("user_id", 7), ("album_id", 3)]);
        let b = OwnerKey::composite([("album_id", 3), ("user_id", 7)]);
        assert_eq!(a.canonical(), b.canonical());
        assert_eq!(a, b);
    }

    #[test]
    fn test_sort_value_int_order() {
        assert!(SortValue::Int(1) < SortValue::Int(2));
        assert!(SortValue::Int(-5) < SortValue::Int(0));
    }

    #[test]
    fn test_sort_value_cross_numeric_order() {
        assert!(SortValue::Int(1) < SortValue::Float(1.5));
        assert!(SortValue::Float(0.5) < SortValue::Int(1));
        assert_eq!(SortValue::Int(1), SortValue::Float(1.0));
    }

    #[test]
    fn test_sort_value_variant_rank() {
        assert!(SortValue::Bool(true) < SortValue::Int(i64::MIN));
        assert!(SortValue::Int(i64::MAX) < SortValue::Text(String::new()));
    }

    #[test]
    fn test_sort_value_nan_sorts_last_among_floats() {
        assert!(SortValue::Float(f64::MAX) < SortValue::Float(f64::NAN));
    }

    #[test]
    fn test_sort_value_text_order() {
        assert!(SortValue::from("apple") < SortValue::from("banana"));
    }

    #[test]
    fn test_entry_new() {
        let e = Entry::new("a", 2i64);
        assert_eq!(e.id, ElementId::from("a"));
        assert_eq!(e.sort, SortValue::Int(2));
    }
}
