#![deny(warnings)]

//! Persistence layer: wholesale snapshots of one simulation session.
//!
//! Only the durable subset of the simulation is stored. The current
//! scenario and transient flags are left out, so a restored session asks
//! for a fresh scenario.

use std::collections::HashMap;
use std::path::Path;
use std::str::FromStr;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;
use life_core::{LifeStats, TimelineEvent, UserProfile};
use serde::{Deserialize, Serialize};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use thiserror::Error;
use tracing::debug;

/// Save key used when none is configured.
pub const DEFAULT_SAVE_KEY: &str = "future-you-simulation";

/// Returns the default SQLite URL used for local saves.
pub fn default_sqlite_url() -> &'static str {
    "sqlite://./saves/life.db"
}

/// The stored shape of a session.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistedState {
    pub profile: Option<UserProfile>,
    pub timeline: Vec<TimelineEvent>,
    pub stats: LifeStats,
    pub current_age: u32,
    pub start_age: u32,
    pub target_age: u32,
    pub regret_meter: i32,
    pub reward_meter: i32,
    pub simulation_complete: bool,
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("migration error: {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),
    #[error("stored payload is corrupt: {0}")]
    Corrupt(#[from] serde_json::Error),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Load-at-start / save-after-mutation contract.
#[async_trait]
pub trait SaveStore: Send + Sync {
    async fn load(&self, key: &str) -> Result<Option<PersistedState>, StoreError>;
    /// Overwrite whatever is stored under `key`.
    async fn save(&self, key: &str, state: &PersistedState) -> Result<(), StoreError>;
    async fn clear(&self, key: &str) -> Result<(), StoreError>;
}

/// Process-local store. Payloads are kept serialized so the JSON shape is
/// exercised exactly as with SQLite.
#[derive(Debug, Default)]
pub struct MemorySaveStore {
    saves: Mutex<HashMap<String, String>>,
}

impl MemorySaveStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SaveStore for MemorySaveStore {
    async fn load(&self, key: &str) -> Result<Option<PersistedState>, StoreError> {
        let saves = self.saves.lock().unwrap_or_else(|e| e.into_inner());
        match saves.get(key) {
            Some(payload) => Ok(Some(serde_json::from_str(payload)?)),
            None => Ok(None),
        }
    }

    async fn save(&self, key: &str, state: &PersistedState) -> Result<(), StoreError> {
        let payload = serde_json::to_string(state)?;
        self.saves
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(key.to_string(), payload);
        Ok(())
    }

    async fn clear(&self, key: &str) -> Result<(), StoreError> {
        self.saves
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .remove(key);
        Ok(())
    }
}

/// Create the parent directory of a file-backed SQLite URL.
pub fn ensure_parent_dir(url: &str) -> Result<(), StoreError> {
    let path = url
        .strip_prefix("sqlite://")
        .or_else(|| url.strip_prefix("sqlite:"));
    if let Some(path) = path {
        if path.starts_with(':') {
            return Ok(());
        }
        if let Some(parent) = Path::new(path).parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
    }
    Ok(())
}

/// Open (creating if needed) the database at `url` and run migrations.
pub async fn init_db(url: &str) -> Result<SqlitePool, StoreError> {
    let opts = SqliteConnectOptions::from_str(url)?.create_if_missing(true);
    // A single long-lived connection keeps `sqlite::memory:` databases alive.
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect_with(opts)
        .await?;
    sqlx::migrate!("./migrations").run(&pool).await?;
    Ok(pool)
}

/// SQLite-backed store: one row per save key.
#[derive(Clone, Debug)]
pub struct SqliteSaveStore {
    pool: SqlitePool,
}

impl SqliteSaveStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn connect(url: &str) -> Result<Self, StoreError> {
        ensure_parent_dir(url)?;
        Ok(Self::new(init_db(url).await?))
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

#[async_trait]
impl SaveStore for SqliteSaveStore {
    async fn load(&self, key: &str) -> Result<Option<PersistedState>, StoreError> {
        let payload: Option<String> =
            sqlx::query_scalar("SELECT payload FROM saves WHERE key = ?1")
                .bind(key)
                .fetch_optional(&self.pool)
                .await?;
        debug!(key, found = payload.is_some(), "loaded save");
        match payload {
            Some(p) => Ok(Some(serde_json::from_str(&p)?)),
            None => Ok(None),
        }
    }

    async fn save(&self, key: &str, state: &PersistedState) -> Result<(), StoreError> {
        let payload = serde_json::to_string(state)?;
        sqlx::query(
            "INSERT INTO saves (key, payload, updated_at) VALUES (?1, ?2, ?3) \
             ON CONFLICT(key) DO UPDATE SET payload = excluded.payload, updated_at = excluded.updated_at",
        )
        .bind(key)
        .bind(payload)
        .bind(Utc::now().to_rfc3339())
        .execute(&self.pool)
        .await?;
        debug!(key, events = state.timeline.len(), "saved session");
        Ok(())
    }

    async fn clear(&self, key: &str) -> Result<(), StoreError> {
        sqlx::query("DELETE FROM saves WHERE key = ?1")
            .bind(key)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}
