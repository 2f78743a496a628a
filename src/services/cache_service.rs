//! Local response cache keyed by a semantic hash of the user input.
//!
//! Storage is an injected [`CacheStore`] capability rather than an ambient
//! global, so non-interactive contexts (tests, server-side use) can supply an
//! in-memory store without environment sniffing in the business logic.

use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, Mutex};

use chrono::{Duration, Utc};
use rusqlite::{Connection, OptionalExtension};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{AppError, AppResult};
use crate::models::ScheduleResponse;
use crate::utils::semantic::semantic_hash;

const CACHE_PREFIX: &str = "flowweek_cache_";
const LAST_INPUT_KEY: &str = "flowweek_last_input";

/// Entries older than this are treated as absent.
pub const CACHE_RETENTION: Duration = Duration::days(7);

/// Minimal key-value capability the cache is built on.
pub trait CacheStore: Send + Sync {
    fn get(&self, key: &str) -> AppResult<Option<String>>;
    fn set(&self, key: &str, value: &str) -> AppResult<()>;
    fn remove(&self, key: &str) -> AppResult<()>;
    fn list_keys(&self) -> AppResult<Vec<String>>;
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CacheEntry {
    data: ScheduleResponse,
    /// Milliseconds since the Unix epoch.
    timestamp: i64,
    input: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheStats {
    pub count: usize,
    pub total_size: usize,
}

#[derive(Clone)]
pub struct CacheService {
    store: Arc<dyn CacheStore>,
    retention: Duration,
}

impl CacheService {
    pub fn new(store: Arc<dyn CacheStore>) -> Self {
        Self {
            store,
            retention: CACHE_RETENTION,
        }
    }

    pub fn with_retention(store: Arc<dyn CacheStore>, retention: Duration) -> Self {
        Self { store, retention }
    }

    /// Look up a cached schedule for the given input. Expired entries and
    /// entries whose recorded input no longer matches are removed and treated
    /// as absent.
    pub fn get_schedule(&self, input: &str) -> AppResult<Option<ScheduleResponse>> {
        let key = cache_key(input);
        let Some(payload) = self.store.get(&key)? else {
            return Ok(None);
        };

        let entry: CacheEntry = match serde_json::from_str(&payload) {
            Ok(entry) => entry,
            Err(err) => {
                debug!(target: "app::ai::cache", error = %err, "discarding unreadable cache entry");
                self.store.remove(&key)?;
                return Ok(None);
            }
        };

        // The hash already normalizes case and whitespace; the recorded input
        // guards against hash collisions, so compare it normalized too.
        let age = Duration::milliseconds(Utc::now().timestamp_millis() - entry.timestamp);
        if age >= self.retention || entry.input.trim().to_lowercase() != input.trim().to_lowercase()
        {
            debug!(target: "app::ai::cache", key = %key, "cache entry expired or mismatched");
            self.store.remove(&key)?;
            return Ok(None);
        }

        debug!(target: "app::ai::cache", key = %key, "cache hit");
        Ok(Some(entry.data))
    }

    /// Store a validated schedule. Callers must only write after validation
    /// succeeded; the cache never holds partially-typed data.
    pub fn put_schedule(&self, input: &str, data: &ScheduleResponse) -> AppResult<()> {
        let key = cache_key(input);
        let entry = CacheEntry {
            data: data.clone(),
            timestamp: Utc::now().timestamp_millis(),
            input: input.trim().to_string(),
        };

        self.store.set(&key, &serde_json::to_string(&entry)?)?;
        debug!(target: "app::ai::cache", key = %key, "cached schedule response");
        Ok(())
    }

    /// Remove all cached schedule responses; returns the number cleared.
    pub fn clear(&self) -> AppResult<usize> {
        let mut cleared = 0;
        for key in self.store.list_keys()? {
            if key.starts_with(CACHE_PREFIX) {
                self.store.remove(&key)?;
                cleared += 1;
            }
        }
        debug!(target: "app::ai::cache", cleared, "cleared cache");
        Ok(cleared)
    }

    pub fn stats(&self) -> AppResult<CacheStats> {
        let mut count = 0;
        let mut total_size = 0;
        for key in self.store.list_keys()? {
            if key.starts_with(CACHE_PREFIX) {
                count += 1;
                if let Some(value) = self.store.get(&key)? {
                    total_size += value.len();
                }
            }
        }
        Ok(CacheStats { count, total_size })
    }

    /// Persist the user's raw input text across sessions.
    pub fn save_last_input(&self, input: &str) -> AppResult<()> {
        self.store.set(LAST_INPUT_KEY, input)
    }

    pub fn last_input(&self) -> AppResult<Option<String>> {
        self.store.get(LAST_INPUT_KEY)
    }
}

fn cache_key(input: &str) -> String {
    format!("{CACHE_PREFIX}{}", semantic_hash(input))
}

/// SQLite-backed store for persistent caching.
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

const STORE_SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS kv_cache (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL,
    updated_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
);
CREATE INDEX IF NOT EXISTS idx_kv_cache_updated_at
    ON kv_cache(updated_at);
"#;

impl SqliteStore {
    pub fn open(path: &Path) -> AppResult<Self> {
        let conn = Connection::open(path)?;
        conn.execute_batch(STORE_SCHEMA)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    pub fn open_in_memory() -> AppResult<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch(STORE_SCHEMA)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn lock(&self) -> AppResult<std::sync::MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| AppError::storage("cache store lock poisoned"))
    }
}

impl CacheStore for SqliteStore {
    fn get(&self, key: &str) -> AppResult<Option<String>> {
        let conn = self.lock()?;
        let value = conn
            .query_row("SELECT value FROM kv_cache WHERE key = ?1", [key], |row| {
                row.get::<_, String>(0)
            })
            .optional()?;
        Ok(value)
    }

    fn set(&self, key: &str, value: &str) -> AppResult<()> {
        let conn = self.lock()?;
        conn.execute(
            r#"
            INSERT INTO kv_cache (key, value, updated_at)
            VALUES (?1, ?2, ?3)
            ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                updated_at = excluded.updated_at
            "#,
            (key, value, Utc::now().to_rfc3339()),
        )?;
        Ok(())
    }

    fn remove(&self, key: &str) -> AppResult<()> {
        let conn = self.lock()?;
        conn.execute("DELETE FROM kv_cache WHERE key = ?1", [key])?;
        Ok(())
    }

    fn list_keys(&self) -> AppResult<Vec<String>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare("SELECT key FROM kv_cache ORDER BY key")?;
        let keys = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(keys)
    }
}

/// In-memory store for tests and non-persistent contexts.
#[derive(Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> AppResult<std::sync::MutexGuard<'_, HashMap<String, String>>> {
        self.entries
            .lock()
            .map_err(|_| AppError::storage("memory store lock poisoned"))
    }
}

impl CacheStore for MemoryStore {
    fn get(&self, key: &str) -> AppResult<Option<String>> {
        Ok(self.lock()?.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> AppResult<()> {
        self.lock()?.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> AppResult<()> {
        self.lock()?.remove(key);
        Ok(())
    }

    fn list_keys(&self) -> AppResult<Vec<String>> {
        let mut keys: Vec<String> = self.lock()?.keys().cloned().collect();
        keys.sort();
        Ok(keys)
    }
}
