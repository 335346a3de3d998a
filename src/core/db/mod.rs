mod state;

use std::{
    collections::HashMap,
    future::Future,
    path::Path,
    sync::{
        Arc, Mutex,
        atomic::{AtomicU64, Ordering},
    },
};

use state::PortalState;
use time::{OffsetDateTime, format_description::well_known::Rfc3339};
use tracing::debug;

/// Named blobs with silent overwrite. No transactions, no versioning.
pub trait KeyValueStore: Clone + Send + Sync + 'static {
    fn load(&self, key: &str) -> impl Future<Output = anyhow::Result<Option<String>>> + Send;
    fn store(&self, key: &str, value: &str) -> impl Future<Output = anyhow::Result<()>> + Send;
    fn remove(&self, key: &str) -> impl Future<Output = anyhow::Result<()>> + Send;
}

/// SQLite-backed store, one row per key.
#[derive(Debug, Clone)]
pub struct PortalDb {
    state: Arc<PortalState>,
}

impl PortalDb {
    pub async fn open<P: AsRef<Path>>(db_file: P) -> anyhow::Result<Self> {
        Ok(Self {
            state: Arc::new(PortalState::new(db_file).await?),
        })
    }

    pub fn path(&self) -> &Path {
        self.state.db_file()
    }

    /// Checkpoint and close the pool. Further use of this handle fails.
    pub async fn close(&self) -> anyhow::Result<()> {
        self.state.close().await
    }
}

impl KeyValueStore for PortalDb {
    async fn load(&self, key: &str) -> anyhow::Result<Option<String>> {
        let row: Option<(String,)> = sqlx::query_as("SELECT value FROM kv_store WHERE key = ?")
            .bind(key)
            .fetch_optional(self.state.pool())
            .await?;
        debug!(key, found = row.is_some(), "Loaded record");
        Ok(row.map(|(value,)| value))
    }

    async fn store(&self, key: &str, value: &str) -> anyhow::Result<()> {
        let updated_at = OffsetDateTime::now_utc().format(&Rfc3339)?;
        sqlx::query(
            r#"INSERT INTO kv_store (key, value, updated_at) VALUES (?, ?, ?)
            ON CONFLICT (key) DO UPDATE SET value = EXCLUDED.value, updated_at = EXCLUDED.updated_at"#,
        )
        .bind(key)
        .bind(value)
        .bind(updated_at)
        .execute(self.state.pool())
        .await?;
        debug!(key, bytes = value.len(), "Stored record");
        Ok(())
    }

    async fn remove(&self, key: &str) -> anyhow::Result<()> {
        sqlx::query("DELETE FROM kv_store WHERE key = ?")
            .bind(key)
            .execute(self.state.pool())
            .await?;
        debug!(key, "Removed record");
        Ok(())
    }
}

/// Process-local store. Clones share the same map.
#[derive(Debug, Clone, Default)]
pub struct MemoryDb {
    entries: Arc<Mutex<HashMap<String, String>>>,
}

impl MemoryDb {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, String>> {
        self.entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl KeyValueStore for MemoryDb {
    async fn load(&self, key: &str) -> anyhow::Result<Option<String>> {
        Ok(self.lock().get(key).cloned())
    }

    async fn store(&self, key: &str, value: &str) -> anyhow::Result<()> {
        self.lock().insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn remove(&self, key: &str) -> anyhow::Result<()> {
        self.lock().remove(key);
        Ok(())
    }
}

/// Keeps background writes to one key in issue order.
///
/// Take a ticket when the write is decided, then run the write through
/// [`WriteOrder::commit`]. A write whose ticket is older than the last
/// committed one is dropped, so the newest decision is what ends up stored
/// no matter in which order the tasks get scheduled.
#[derive(Debug, Clone, Default)]
pub struct WriteOrder {
    issued: Arc<AtomicU64>,
    committed: Arc<tokio::sync::Mutex<u64>>,
}

impl WriteOrder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ticket(&self) -> u64 {
        self.issued.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Runs `write` unless a newer ticket already committed. Returns whether
    /// the write ran.
    pub async fn commit<F>(&self, ticket: u64, write: F) -> anyhow::Result<bool>
    where
        F: Future<Output = anyhow::Result<()>>,
    {
        let mut last = self.committed.lock().await;
        if ticket <= *last {
            debug!(ticket, last = *last, "Skipping superseded write");
            return Ok(false);
        }
        write.await?;
        *last = ticket;
        Ok(true)
    }
}
