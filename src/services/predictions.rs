//! Saved-predictions repository.
//!
//! The saved lists are an explicit repository interface with pluggable
//! backends rather than ambient global state. Two named lists exist, one per
//! strategy type; entries keep insertion order and are removed only by
//! explicit deletion. Concurrent writers are last-write-wins.

use crate::error::{AppError, Result};
use crate::types::{AnalysisResult, StrategyType};
use dashmap::DashMap;
use rusqlite::{params, Connection};
use std::path::Path;
use std::sync::Mutex;
use tracing::{debug, info, warn};

/// Repository for saved analysis results, keyed by strategy type.
pub trait PredictionStore: Send + Sync {
    /// Append a result to a strategy's list (newest last).
    fn append(&self, strategy: StrategyType, result: &AnalysisResult) -> Result<()>;

    /// List a strategy's saved results in insertion order.
    fn list(&self, strategy: StrategyType) -> Result<Vec<AnalysisResult>>;

    /// Delete a saved result by id. Returns true if something was removed.
    fn delete(&self, strategy: StrategyType, id: &str) -> Result<bool>;
}

/// In-memory prediction store.
pub struct MemoryPredictionStore {
    lists: DashMap<&'static str, Vec<AnalysisResult>>,
}

impl MemoryPredictionStore {
    pub fn new() -> Self {
        Self {
            lists: DashMap::new(),
        }
    }
}

impl Default for MemoryPredictionStore {
    fn default() -> Self {
        Self::new()
    }
}

impl PredictionStore for MemoryPredictionStore {
    fn append(&self, strategy: StrategyType, result: &AnalysisResult) -> Result<()> {
        self.lists
            .entry(strategy.key())
            .or_default()
            .push(result.clone());
        Ok(())
    }

    fn list(&self, strategy: StrategyType) -> Result<Vec<AnalysisResult>> {
        Ok(self
            .lists
            .get(strategy.key())
            .map(|entry| entry.clone())
            .unwrap_or_default())
    }

    fn delete(&self, strategy: StrategyType, id: &str) -> Result<bool> {
        let mut removed = false;
        if let Some(mut entry) = self.lists.get_mut(strategy.key()) {
            let before = entry.len();
            entry.retain(|r| r.id != id);
            removed = entry.len() != before;
        }
        Ok(removed)
    }
}

/// SQLite-backed prediction store. Results are stored as JSON payloads;
/// rowid order preserves insertion order.
pub struct SqlitePredictionStore {
    conn: Mutex<Connection>,
}

impl SqlitePredictionStore {
    /// Open (or create) a store at the given path.
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self> {
        let conn = Connection::open(path)
            .map_err(|e| AppError::Persistence(format!("cannot open database: {}", e)))?;
        let store = Self {
            conn: Mutex::new(conn),
        };
        store.init_schema()?;
        info!("Prediction store initialized");
        Ok(store)
    }

    /// Create an in-memory store (for testing).
    pub fn new_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()
            .map_err(|e| AppError::Persistence(format!("cannot open database: {}", e)))?;
        let store = Self {
            conn: Mutex::new(conn),
        };
        store.init_schema()?;
        debug!("In-memory prediction store initialized");
        Ok(store)
    }

    fn init_schema(&self) -> Result<()> {
        let conn = self.conn.lock().unwrap();

        conn.execute(
            "CREATE TABLE IF NOT EXISTS saved_predictions (
                seq INTEGER PRIMARY KEY AUTOINCREMENT,
                id TEXT NOT NULL,
                strategy TEXT NOT NULL,
                payload TEXT NOT NULL,
                created_at INTEGER NOT NULL
            )",
            [],
        )
        .map_err(|e| AppError::Persistence(format!("schema init failed: {}", e)))?;

        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_saved_predictions_strategy
             ON saved_predictions(strategy)",
            [],
        )
        .map_err(|e| AppError::Persistence(format!("schema init failed: {}", e)))?;

        Ok(())
    }
}

impl PredictionStore for SqlitePredictionStore {
    fn append(&self, strategy: StrategyType, result: &AnalysisResult) -> Result<()> {
        let payload = serde_json::to_string(result)?;
        let conn = self.conn.lock().unwrap();

        conn.execute(
            "INSERT INTO saved_predictions (id, strategy, payload, created_at)
             VALUES (?1, ?2, ?3, ?4)",
            params![result.id, strategy.key(), payload, result.timestamp],
        )
        .map_err(|e| AppError::Persistence(format!("append failed: {}", e)))?;

        debug!("Saved {} prediction {}", strategy.key(), result.id);
        Ok(())
    }

    fn list(&self, strategy: StrategyType) -> Result<Vec<AnalysisResult>> {
        let conn = self.conn.lock().unwrap();

        let mut stmt = conn
            .prepare(
                "SELECT payload FROM saved_predictions
                 WHERE strategy = ?1 ORDER BY seq ASC",
            )
            .map_err(|e| AppError::Persistence(format!("list failed: {}", e)))?;

        let rows = stmt
            .query_map(params![strategy.key()], |row| row.get::<_, String>(0))
            .map_err(|e| AppError::Persistence(format!("list failed: {}", e)))?;

        let mut results = Vec::new();
        for payload in rows {
            let payload =
                payload.map_err(|e| AppError::Persistence(format!("list failed: {}", e)))?;
            match serde_json::from_str::<AnalysisResult>(&payload) {
                Ok(result) => results.push(result),
                Err(e) => warn!("Skipping unreadable saved prediction: {}", e),
            }
        }

        Ok(results)
    }

    fn delete(&self, strategy: StrategyType, id: &str) -> Result<bool> {
        let conn = self.conn.lock().unwrap();

        let affected = conn
            .execute(
                "DELETE FROM saved_predictions WHERE strategy = ?1 AND id = ?2",
                params![strategy.key(), id],
            )
            .map_err(|e| AppError::Persistence(format!("delete failed: {}", e)))?;

        Ok(affected > 0)
    }
}
