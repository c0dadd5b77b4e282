//! Key-value backend abstraction used by the persistence codec.

use std::collections::HashMap;

use async_trait::async_trait;

use crate::error::DomainError;

/// A flat key-value store with two record shapes: field records
/// (key → field → bytes) and list records (key → ordered strings).
///
/// Every failure is reported as `DomainError::BackendUnavailable`.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Sets one field of a field record, creating the record if needed.
    async fn set_field(&self, key: &str, field: &str, value: &[u8]) -> Result<(), DomainError>;

    /// Removes one field of a field record. Missing fields are not an error.
    async fn remove_field(&self, key: &str, field: &str) -> Result<(), DomainError>;

    /// Returns every field of a field record; empty if the key is absent.
    async fn fields(&self, key: &str) -> Result<HashMap<String, Vec<u8>>, DomainError>;

    /// Replaces a list record with `values`.
    async fn replace_list(&self, key: &str, values: &[String]) -> Result<(), DomainError>;

    /// Returns a list record; empty if the key is absent.
    async fn list(&self, key: &str) -> Result<Vec<String>, DomainError>;

    /// Returns all keys (of either shape) starting with `prefix`, in lexical
    /// order and without duplicates.
    async fn scan_prefix(&self, prefix: &str) -> Result<Vec<String>, DomainError>;

    /// Deletes a key of either shape. Returns whether anything was removed.
    async fn delete(&self, key: &str) -> Result<bool, DomainError>;
}
