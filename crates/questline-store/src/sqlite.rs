//! SQLite implementation of the `KeyValueStore` trait.

use std::collections::HashMap;

use async_trait::async_trait;
use sqlx::Row;
use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};

use questline_core::error::DomainError;
use questline_core::store::KeyValueStore;

use crate::schema;

/// SQLite-backed key-value store.
#[derive(Debug, Clone)]
pub struct SqliteKeyValueStore {
    pool: SqlitePool,
}

fn backend(err: sqlx::Error) -> DomainError {
    DomainError::BackendUnavailable(err.to_string())
}

impl SqliteKeyValueStore {
    /// Wraps an existing pool. Call [`Self::migrate`] before first use.
    #[must_use]
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Connects to `database_url` and creates the schema if needed.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::BackendUnavailable` if the database cannot be
    /// opened or the schema cannot be created.
    pub async fn connect(database_url: &str) -> Result<Self, DomainError> {
        // Every connection to an in-memory database opens a fresh one.
        let max_connections = if database_url.contains(":memory:") { 1 } else { 5 };
        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await
            .map_err(backend)?;
        let store = Self::new(pool);
        store.migrate().await?;
        Ok(store)
    }

    /// Creates the key-value tables if they do not exist.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::BackendUnavailable` on database failure.
    pub async fn migrate(&self) -> Result<(), DomainError> {
        for statement in [schema::CREATE_FIELDS_TABLE, schema::CREATE_LISTS_TABLE] {
            sqlx::query(statement)
                .execute(&self.pool)
                .await
                .map_err(backend)?;
        }
        tracing::info!("key-value schema ready");
        Ok(())
    }
}

#[async_trait]
impl KeyValueStore for SqliteKeyValueStore {
    async fn set_field(&self, key: &str, field: &str, value: &[u8]) -> Result<(), DomainError> {
        sqlx::query(
            r"INSERT INTO kv_fields (key, field, value) VALUES (?, ?, ?)
              ON CONFLICT (key, field) DO UPDATE SET value = excluded.value",
        )
        .bind(key)
        .bind(field)
        .bind(value)
        .execute(&self.pool)
        .await
        .map_err(backend)?;
        Ok(())
    }

    async fn remove_field(&self, key: &str, field: &str) -> Result<(), DomainError> {
        sqlx::query("DELETE FROM kv_fields WHERE key = ? AND field = ?")
            .bind(key)
            .bind(field)
            .execute(&self.pool)
            .await
            .map_err(backend)?;
        Ok(())
    }

    async fn fields(&self, key: &str) -> Result<HashMap<String, Vec<u8>>, DomainError> {
        let rows = sqlx::query("SELECT field, value FROM kv_fields WHERE key = ?")
            .bind(key)
            .fetch_all(&self.pool)
            .await
            .map_err(backend)?;

        rows.iter()
            .map(|row| {
                let field: String = row.try_get("field").map_err(backend)?;
                let value: Vec<u8> = row.try_get("value").map_err(backend)?;
                Ok((field, value))
            })
            .collect()
    }

    async fn replace_list(&self, key: &str, values: &[String]) -> Result<(), DomainError> {
        let mut tx = self.pool.begin().await.map_err(backend)?;

        sqlx::query("DELETE FROM kv_lists WHERE key = ?")
            .bind(key)
            .execute(&mut *tx)
            .await
            .map_err(backend)?;

        for (position, value) in (0_i64..).zip(values) {
            sqlx::query("INSERT INTO kv_lists (key, position, value) VALUES (?, ?, ?)")
                .bind(key)
                .bind(position)
                .bind(value)
                .execute(&mut *tx)
                .await
                .map_err(backend)?;
        }

        tx.commit().await.map_err(backend)
    }

    async fn list(&self, key: &str) -> Result<Vec<String>, DomainError> {
        let rows = sqlx::query("SELECT value FROM kv_lists WHERE key = ? ORDER BY position")
            .bind(key)
            .fetch_all(&self.pool)
            .await
            .map_err(backend)?;

        rows.iter()
            .map(|row| row.try_get("value").map_err(backend))
            .collect()
    }

    async fn scan_prefix(&self, prefix: &str) -> Result<Vec<String>, DomainError> {
        // substr() counts characters, not bytes.
        let prefix_len = i64::try_from(prefix.chars().count())
            .map_err(|e| DomainError::Validation(format!("prefix too long: {e}")))?;

        let rows = sqlx::query(
            r"SELECT key FROM kv_fields WHERE substr(key, 1, ?) = ?
              UNION
              SELECT key FROM kv_lists WHERE substr(key, 1, ?) = ?
              ORDER BY key",
        )
        .bind(prefix_len)
        .bind(prefix)
        .bind(prefix_len)
        .bind(prefix)
        .fetch_all(&self.pool)
        .await
        .map_err(backend)?;

        rows.iter()
            .map(|row| row.try_get("key").map_err(backend))
            .collect()
    }

    async fn delete(&self, key: &str) -> Result<bool, DomainError> {
        let fields = sqlx::query("DELETE FROM kv_fields WHERE key = ?")
            .bind(key)
            .execute(&self.pool)
            .await
            .map_err(backend)?;
        let lists = sqlx::query("DELETE FROM kv_lists WHERE key = ?")
            .bind(key)
            .execute(&self.pool)
            .await
            .map_err(backend)?;
        Ok(fields.rows_affected() + lists.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use questline_core::ids::QuestId;
    use questline_core::quest::{Quest, Stage};
    use questline_core::store::KeyValueStore;

    use super::SqliteKeyValueStore;
    use crate::codec::QuestStorage;
    use crate::record::QuestRecord;

    async fn memory_store() -> SqliteKeyValueStore {
        SqliteKeyValueStore::connect("sqlite::memory:").await.unwrap()
    }

    #[tokio::test]
    async fn test_fields_upsert_and_remove() {
        // Arrange
        let store = memory_store().await;

        // Act
        store.set_field("k", "text", b"one").await.unwrap();
        store.set_field("k", "text", b"two").await.unwrap();
        store.set_field("k", "media", &[0, 255]).await.unwrap();
        store.remove_field("k", "media").await.unwrap();
        let fields = store.fields("k").await.unwrap();

        // Assert
        assert_eq!(fields.len(), 1);
        assert_eq!(fields["text"], b"two".to_vec());
        assert!(store.fields("missing").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_replace_list_keeps_order_and_replaces() {
        let store = memory_store().await;

        store
            .replace_list("l", &["b".to_owned(), "a".to_owned()])
            .await
            .unwrap();
        assert_eq!(store.list("l").await.unwrap(), vec!["b", "a"]);

        store.replace_list("l", &["c".to_owned()]).await.unwrap();
        assert_eq!(store.list("l").await.unwrap(), vec!["c"]);
    }

    #[tokio::test]
    async fn test_scan_prefix_is_lexical_and_deduplicated() {
        // Arrange
        let store = memory_store().await;
        store.set_field("quest:b:1:question", "text", b"x").await.unwrap();
        store.set_field("quest:a:1:question", "text", b"x").await.unwrap();
        store
            .replace_list("quest:a:1:answers", &["y".to_owned()])
            .await
            .unwrap();
        store.set_field("other:a", "text", b"x").await.unwrap();

        // Act
        let keys = store.scan_prefix("quest:").await.unwrap();

        // Assert
        assert_eq!(
            keys,
            vec!["quest:a:1:answers", "quest:a:1:question", "quest:b:1:question"]
        );
    }

    #[tokio::test]
    async fn test_delete_reports_whether_anything_was_removed() {
        let store = memory_store().await;
        store.set_field("k", "text", b"x").await.unwrap();

        assert!(store.delete("k").await.unwrap());
        assert!(!store.delete("k").await.unwrap());
    }

    #[tokio::test]
    async fn test_codec_round_trip_through_sqlite() {
        // Arrange
        let storage = QuestStorage::new(Arc::new(memory_store().await));
        let quest = Quest::new(vec![
            Stage::new("Как зовут моего хозяина?", ["Илья", "ilya"]).unwrap(),
            Stage::new("What year is it?", ["2018"])
                .unwrap()
                .with_media(vec![0x89, b'P', b'N', b'G']),
        ]);
        let record = QuestRecord::from_quest(QuestId::parse("test").unwrap(), &quest);

        // Act
        storage.store_quest(&record).await.unwrap();
        let loaded = storage.load_all().await.unwrap();

        // Assert
        assert_eq!(loaded, vec![record]);
        assert!(loaded[0].to_quest().stage(0).unwrap().accepts("ИЛЬЯ"));
    }
}
