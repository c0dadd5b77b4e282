//! Test stores — in-memory and failing `KeyValueStore` implementations.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use questline_core::error::DomainError;
use questline_core::store::KeyValueStore;

/// An in-memory key-value store with the same prefix-scan semantics as the
/// SQLite backend.
#[derive(Debug, Default)]
pub struct MemoryKeyValueStore {
    fields: Mutex<BTreeMap<String, HashMap<String, Vec<u8>>>>,
    lists: Mutex<BTreeMap<String, Vec<String>>>,
}

impl MemoryKeyValueStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns every key currently held, in lexical order.
    ///
    /// # Panics
    ///
    /// Panics if an internal mutex is poisoned.
    pub fn keys(&self) -> Vec<String> {
        let mut keys: BTreeSet<String> = self.fields.lock().unwrap().keys().cloned().collect();
        keys.extend(self.lists.lock().unwrap().keys().cloned());
        keys.into_iter().collect()
    }
}

#[async_trait]
impl KeyValueStore for MemoryKeyValueStore {
    async fn set_field(&self, key: &str, field: &str, value: &[u8]) -> Result<(), DomainError> {
        self.fields
            .lock()
            .unwrap()
            .entry(key.to_owned())
            .or_default()
            .insert(field.to_owned(), value.to_vec());
        Ok(())
    }

    async fn remove_field(&self, key: &str, field: &str) -> Result<(), DomainError> {
        let mut fields = self.fields.lock().unwrap();
        if let Some(record) = fields.get_mut(key) {
            record.remove(field);
            if record.is_empty() {
                fields.remove(key);
            }
        }
        Ok(())
    }

    async fn fields(&self, key: &str) -> Result<HashMap<String, Vec<u8>>, DomainError> {
        Ok(self
            .fields
            .lock()
            .unwrap()
            .get(key)
            .cloned()
            .unwrap_or_default())
    }

    async fn replace_list(&self, key: &str, values: &[String]) -> Result<(), DomainError> {
        let mut lists = self.lists.lock().unwrap();
        if values.is_empty() {
            lists.remove(key);
        } else {
            lists.insert(key.to_owned(), values.to_vec());
        }
        Ok(())
    }

    async fn list(&self, key: &str) -> Result<Vec<String>, DomainError> {
        Ok(self
            .lists
            .lock()
            .unwrap()
            .get(key)
            .cloned()
            .unwrap_or_default())
    }

    async fn scan_prefix(&self, prefix: &str) -> Result<Vec<String>, DomainError> {
        Ok(self
            .keys()
            .into_iter()
            .filter(|k| k.starts_with(prefix))
            .collect())
    }

    async fn delete(&self, key: &str) -> Result<bool, DomainError> {
        let removed_fields = self.fields.lock().unwrap().remove(key).is_some();
        let removed_list = self.lists.lock().unwrap().remove(key).is_some();
        Ok(removed_fields || removed_list)
    }
}

/// A store that fails every call with `BackendUnavailable`. Useful for
/// testing error-handling paths.
#[derive(Debug)]
pub struct FailingKeyValueStore;

fn unavailable() -> DomainError {
    DomainError::BackendUnavailable("connection refused".into())
}

#[async_trait]
impl KeyValueStore for FailingKeyValueStore {
    async fn set_field(&self, _key: &str, _field: &str, _value: &[u8]) -> Result<(), DomainError> {
        Err(unavailable())
    }

    async fn remove_field(&self, _key: &str, _field: &str) -> Result<(), DomainError> {
        Err(unavailable())
    }

    async fn fields(&self, _key: &str) -> Result<HashMap<String, Vec<u8>>, DomainError> {
        Err(unavailable())
    }

    async fn replace_list(&self, _key: &str, _values: &[String]) -> Result<(), DomainError> {
        Err(unavailable())
    }

    async fn list(&self, _key: &str) -> Result<Vec<String>, DomainError> {
        Err(unavailable())
    }

    async fn scan_prefix(&self, _prefix: &str) -> Result<Vec<String>, DomainError> {
        Err(unavailable())
    }

    async fn delete(&self, _key: &str) -> Result<bool, DomainError> {
        Err(unavailable())
    }
}

/// An in-memory store whose writes start failing after a fixed number of
/// successful writes. Reads always succeed. Used to exercise partial writes.
#[derive(Debug)]
pub struct FlakyKeyValueStore {
    inner: MemoryKeyValueStore,
    writes_allowed: usize,
    writes: AtomicUsize,
}

impl FlakyKeyValueStore {
    /// Creates a store that accepts `writes_allowed` writes, then fails.
    #[must_use]
    pub fn new(writes_allowed: usize) -> Self {
        Self {
            inner: MemoryKeyValueStore::new(),
            writes_allowed,
            writes: AtomicUsize::new(0),
        }
    }

    /// The backing in-memory store, for inspecting what was written.
    #[must_use]
    pub fn inner(&self) -> &MemoryKeyValueStore {
        &self.inner
    }

    fn admit_write(&self) -> Result<(), DomainError> {
        if self.writes.fetch_add(1, Ordering::SeqCst) < self.writes_allowed {
            Ok(())
        } else {
            Err(unavailable())
        }
    }
}

#[async_trait]
impl KeyValueStore for FlakyKeyValueStore {
    async fn set_field(&self, key: &str, field: &str, value: &[u8]) -> Result<(), DomainError> {
        self.admit_write()?;
        self.inner.set_field(key, field, value).await
    }

    async fn remove_field(&self, key: &str, field: &str) -> Result<(), DomainError> {
        self.admit_write()?;
        self.inner.remove_field(key, field).await
    }

    async fn fields(&self, key: &str) -> Result<HashMap<String, Vec<u8>>, DomainError> {
        self.inner.fields(key).await
    }

    async fn replace_list(&self, key: &str, values: &[String]) -> Result<(), DomainError> {
        self.admit_write()?;
        self.inner.replace_list(key, values).await
    }

    async fn list(&self, key: &str) -> Result<Vec<String>, DomainError> {
        self.inner.list(key).await
    }

    async fn scan_prefix(&self, prefix: &str) -> Result<Vec<String>, DomainError> {
        self.inner.scan_prefix(prefix).await
    }

    async fn delete(&self, key: &str) -> Result<bool, DomainError> {
        self.admit_write()?;
        self.inner.delete(key).await
    }
}
