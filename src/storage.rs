//! Key-value backend abstraction
//!
//! The engine talks to its backend through exactly three operations:
//! get, set, delete. Backend-specific behaviors (connection handling,
//! value wrapping, retries) belong inside an adapter implementing this
//! trait and are never exposed to callers.
//!
//! # Thread Safety
//!
//! Implementations must be `Send + Sync`; a single store instance is
//! shared across every collection opened against it.

use std::collections::BTreeMap;

use parking_lot::RwLock;

use crate::error::Result;

/// Minimal byte-oriented key-value backend
///
/// Any call may block on I/O and may fail; failures propagate to the
/// collection operation that triggered them. The engine never retries.
pub trait KeyValueStore: Send + Sync {
    /// Read the value stored at `key`, if any
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Storage`] if the backend read fails.
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>>;

    /// Write `value` at `key`, overwriting any previous value
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Storage`] if the backend write fails.
    fn set(&self, key: &str, value: &[u8]) -> Result<()>;

    /// Remove the value stored at `key`; removing an absent key is not an error
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Storage`] if the backend delete fails.
    fn delete(&self, key: &str) -> Result<()>;
}

/// In-process backend: a `BTreeMap` under `parking_lot::RwLock`
///
/// Suitable for tests and single-process deployments. Values are cloned
/// on read so callers never observe interior mutation.
#[derive(Debug, Default)]
pub struct MemoryStore {
    data: RwLock<BTreeMap<String, Vec<u8>>>,
}

impl MemoryStore {
    /// Create a new empty MemoryStore
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of keys currently stored
    pub fn len(&self) -> usize {
        self.data.read().len()
    }

    /// Whether the store holds no keys
    pub fn is_empty(&self) -> bool {
        self.data.read().is_empty()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        Ok(self.data.read().get(key).cloned())
    }

    fn set(&self, key: &str, value: &[u8]) -> Result<()> {
        self.data.write().insert(key.to_string(), value.to_vec());
        Ok(())
    }

    fn delete(&self, key: &str) -> Result<()> {
        self.data.write().remove(key);
        Ok(())
    }
}
