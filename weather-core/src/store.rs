//! SQLite request log. Append-only: one row per weather request that reached the provider.

use chrono::{DateTime, Utc};
use rusqlite::{Connection, params};
use std::path::Path;
use std::sync::Mutex;

use crate::model::WeatherQuery;

/// Errors from log store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("request log lock poisoned")]
    Poisoned,
}

pub type Result<T> = std::result::Result<T, StoreError>;

/// A stored log row.
#[derive(Debug, Clone, PartialEq)]
pub struct WeatherRequestLog {
    pub id: i64,
    pub latitude: f64,
    pub longitude: f64,
    pub start_date: String,
    pub end_date: String,
    pub request_time: DateTime<Utc>,
    pub api_response_status: Option<String>,
}

/// Values for a row about to be inserted. `request_time` defaults to now.
#[derive(Debug, Clone)]
pub struct NewRequestLog {
    pub latitude: f64,
    pub longitude: f64,
    pub start_date: String,
    pub end_date: String,
    pub request_time: DateTime<Utc>,
    pub api_response_status: Option<String>,
}

impl NewRequestLog {
    pub fn new(query: &WeatherQuery, status: impl Into<String>) -> Self {
        Self {
            latitude: query.latitude,
            longitude: query.longitude,
            start_date: query.start_date.clone(),
            end_date: query.end_date.clone(),
            request_time: Utc::now(),
            api_response_status: Some(status.into()),
        }
    }
}

const SCHEMA: &str = "CREATE TABLE IF NOT EXISTS weather_request_log (
    id                  INTEGER PRIMARY KEY AUTOINCREMENT,
    latitude            REAL NOT NULL,
    longitude           REAL NOT NULL,
    start_date          TEXT NOT NULL,
    end_date            TEXT NOT NULL,
    request_time        TEXT NOT NULL,
    api_response_status TEXT
);";

/// SQLite-backed request log.
///
/// The connection is wrapped in a `Mutex` and locked only for a single statement.
pub struct RequestLogStore {
    conn: Mutex<Connection>,
}

impl std::fmt::Debug for RequestLogStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestLogStore").finish_non_exhaustive()
    }
}

impl RequestLogStore {
    /// Open (or create) the log database at `path` and make sure the table exists.
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(path)?;
        conn.pragma_update(None, "journal_mode", "WAL")?;
        Self::init(conn)
    }

    /// Private in-memory database, used by tests.
    pub fn open_in_memory() -> Result<Self> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self> {
        conn.execute_batch(SCHEMA)?;
        Ok(Self { conn: Mutex::new(conn) })
    }

    /// Insert one row and return its id.
    pub fn append(&self, entry: &NewRequestLog) -> Result<i64> {
        let conn = self.conn.lock().map_err(|_| StoreError::Poisoned)?;
        conn.execute(
            "INSERT INTO weather_request_log \
             (latitude, longitude, start_date, end_date, request_time, api_response_status) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                entry.latitude,
                entry.longitude,
                entry.start_date,
                entry.end_date,
                entry.request_time,
                entry.api_response_status,
            ],
        )?;
        Ok(conn.last_insert_rowid())
    }

    /// Most recent rows first.
    pub fn recent(&self, limit: usize) -> Result<Vec<WeatherRequestLog>> {
        let conn = self.conn.lock().map_err(|_| StoreError::Poisoned)?;
        let mut stmt = conn.prepare(
            "SELECT id, latitude, longitude, start_date, end_date, request_time, api_response_status \
             FROM weather_request_log ORDER BY id DESC LIMIT ?1",
        )?;
        let rows = stmt.query_map(params![limit as i64], |row| {
            Ok(WeatherRequestLog {
                id: row.get(0)?,
                latitude: row.get(1)?,
                longitude: row.get(2)?,
                start_date: row.get(3)?,
                end_date: row.get(4)?,
                request_time: row.get(5)?,
                api_response_status: row.get(6)?,
            })
        })?;
        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(StoreError::from)
    }

    pub fn count(&self) -> Result<u64> {
        let conn = self.conn.lock().map_err(|_| StoreError::Poisoned)?;
        let n: i64 =
            conn.query_row("SELECT COUNT(*) FROM weather_request_log", [], |row| row.get(0))?;
        Ok(n as u64)
    }

    #[cfg(test)]
    pub(crate) fn execute_batch(&self, sql: &str) -> Result<()> {
        let conn = self.conn.lock().map_err(|_| StoreError::Poisoned)?;
        conn.execute_batch(sql)?;
        Ok(())
    }
}
