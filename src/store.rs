use crate::db;
use anyhow::{anyhow, Result};
use async_trait::async_trait;
use chrono::Utc;
use log::debug;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Mutex;

/// A stored value and when it was last written (epoch seconds).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredEntry {
    pub value: String,
    pub updated_at: i64,
}

impl StoredEntry {
    /// Seconds since the entry was written, never negative.
    pub fn age_secs(&self, now: i64) -> i64 {
        (now - self.updated_at).max(0)
    }

    pub fn is_older_than(&self, max_age_secs: u64, now: i64) -> bool {
        self.age_secs(now) > i64::try_from(max_age_secs).unwrap_or(i64::MAX)
    }
}

/// Persistent client-side key/value storage, the stand-in for browser
/// localStorage. The authorization flow writes the code verifier here and the
/// callback side reads it back.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Store value under key, overwriting any prior value.
    async fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Value plus its write time.
    async fn entry(&self, key: &str) -> Result<Option<StoredEntry>>;

    async fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entry(key).await?.map(|e| e.value))
    }

    /// Remove key. Returns true if something was removed.
    async fn remove(&self, key: &str) -> Result<bool>;
}

/// SQLite file store. Each call opens its own connection on the blocking pool.
pub struct SqliteStore {
    db_path: PathBuf,
}

impl SqliteStore {
    /// Open (creating if needed) the database and run migrations.
    pub fn open(db_path: PathBuf) -> Result<Self> {
        db::open_or_create(&db_path)?;
        Ok(Self { db_path })
    }

    pub fn path(&self) -> &std::path::Path {
        &self.db_path
    }
}

#[async_trait]
impl KeyValueStore for SqliteStore {
    async fn set(&self, key: &str, value: &str) -> Result<()> {
        let db_path = self.db_path.clone();
        let key = key.to_string();
        let value = value.to_string();
        debug!("sqlite store: set {} in {}", key, db_path.display());
        tokio::task::spawn_blocking(move || -> Result<()> {
            let conn = db::open_or_create(&db_path)?;
            db::save_value(&conn, &key, &value)
        })
        .await??;
        Ok(())
    }

    async fn entry(&self, key: &str) -> Result<Option<StoredEntry>> {
        let db_path = self.db_path.clone();
        let key = key.to_string();
        let row = tokio::task::spawn_blocking(move || -> Result<Option<(String, i64)>> {
            let conn = db::open_or_create(&db_path)?;
            db::load_entry(&conn, &key)
        })
        .await??;
        Ok(row.map(|(value, updated_at)| StoredEntry { value, updated_at }))
    }

    async fn remove(&self, key: &str) -> Result<bool> {
        let db_path = self.db_path.clone();
        let key = key.to_string();
        debug!("sqlite store: remove {} from {}", key, db_path.display());
        tokio::task::spawn_blocking(move || -> Result<bool> {
            let conn = db::open_or_create(&db_path)?;
            db::delete_value(&conn, &key)
        })
        .await?
    }
}

/// In-memory store for tests and embedding.
#[derive(Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, StoredEntry>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an entry with an explicit write time.
    pub fn set_at(&self, key: &str, value: &str, updated_at: i64) -> Result<()> {
        self.entries()?.insert(
            key.to_string(),
            StoredEntry {
                value: value.to_string(),
                updated_at,
            },
        );
        Ok(())
    }

    fn entries(&self) -> Result<std::sync::MutexGuard<'_, HashMap<String, StoredEntry>>> {
        self.entries.lock().map_err(|_| anyhow!("memory store lock poisoned"))
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn set(&self, key: &str, value: &str) -> Result<()> {
        self.set_at(key, value, Utc::now().timestamp())
    }

    async fn entry(&self, key: &str) -> Result<Option<StoredEntry>> {
        Ok(self.entries()?.get(key).cloned())
    }

    async fn remove(&self, key: &str) -> Result<bool> {
        Ok(self.entries()?.remove(key).is_some())
    }
}
