//! SQLite report history.

use crate::domain::error::CotError;
use crate::domain::report::Report;
use crate::ports::config_port::ConfigPort;
use crate::ports::history_port::HistoryPort;
use r2d2::{Pool, PooledConnection};
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::{OptionalExtension, params};

pub struct SqliteHistoryAdapter {
    pool: Pool<SqliteConnectionManager>,
}

fn query_err(e: rusqlite::Error) -> CotError {
    CotError::DatabaseQuery {
        reason: e.to_string(),
    }
}

fn decode(payload: &str) -> Result<Report, CotError> {
    serde_json::from_str(payload).map_err(|e| CotError::History {
        reason: format!("corrupt stored report: {e}"),
    })
}

impl SqliteHistoryAdapter {
    pub fn from_config(config: &dyn ConfigPort) -> Result<Self, CotError> {
        let db_path =
            config
                .get_string("sqlite", "path")
                .ok_or_else(|| CotError::ConfigMissing {
                    section: "sqlite".into(),
                    key: "path".into(),
                })?;

        let raw_size = config.get_int("sqlite", "pool_size", 4);
        let pool_size = u32::try_from(raw_size)
            .ok()
            .filter(|n| *n >= 1)
            .ok_or_else(|| CotError::ConfigInvalid {
                section: "sqlite".into(),
                key: "pool_size".into(),
                reason: format!("pool_size must be between 1 and {}, got {raw_size}", u32::MAX),
            })?;

        let manager = SqliteConnectionManager::file(&db_path);
        let pool = Pool::builder()
            .max_size(pool_size)
            .build(manager)
            .map_err(|e: r2d2::Error| CotError::Database {
                reason: e.to_string(),
            })?;

        let adapter = Self { pool };
        adapter.initialize_schema()?;
        Ok(adapter)
    }

    pub fn in_memory() -> Result<Self, CotError> {
        let manager = SqliteConnectionManager::memory();
        let pool = Pool::builder()
            .max_size(1)
            .build(manager)
            .map_err(|e: r2d2::Error| CotError::Database {
                reason: e.to_string(),
            })?;

        let adapter = Self { pool };
        adapter.initialize_schema()?;
        Ok(adapter)
    }

    fn conn(&self) -> Result<PooledConnection<SqliteConnectionManager>, CotError> {
        self.pool.get().map_err(|e: r2d2::Error| CotError::Database {
            reason: e.to_string(),
        })
    }

    pub fn initialize_schema(&self) -> Result<(), CotError> {
        self.conn()?
            .execute_batch(
                "CREATE TABLE IF NOT EXISTS cot_reports (
                    date TEXT PRIMARY KEY NOT NULL,
                    payload TEXT NOT NULL
                );",
            )
            .map_err(query_err)
    }
}

impl HistoryPort for SqliteHistoryAdapter {
    fn put(&self, report: &Report) -> Result<(), CotError> {
        let payload = serde_json::to_string(report)?;
        self.conn()?
            .execute(
                "INSERT OR REPLACE INTO cot_reports (date, payload) VALUES (?1, ?2)",
                params![report.date, payload],
            )
            .map_err(query_err)?;
        tracing::debug!(date = %report.date, "stored report in sqlite");
        Ok(())
    }

    fn get(&self, date: &str) -> Result<Option<Report>, CotError> {
        let payload: Option<String> = self
            .conn()?
            .query_row(
                "SELECT payload FROM cot_reports WHERE date = ?1",
                params![date],
                |row| row.get(0),
            )
            .optional()
            .map_err(query_err)?;
        payload.as_deref().map(decode).transpose()
    }

    fn list_dates(&self) -> Result<Vec<String>, CotError> {
        let conn = self.conn()?;
        let mut stmt = conn
            .prepare("SELECT date FROM cot_reports ORDER BY date DESC")
            .map_err(query_err)?;
        let rows = stmt.query_map([], |row| row.get(0)).map_err(query_err)?;

        let mut dates = Vec::new();
        for row in rows {
            dates.push(row.map_err(query_err)?);
        }
        Ok(dates)
    }

    fn latest(&self) -> Result<Option<Report>, CotError> {
        Ok(self.recent(1)?.into_iter().next())
    }

    fn recent(&self, n: usize) -> Result<Vec<Report>, CotError> {
        let conn = self.conn()?;
        let mut stmt = conn
            .prepare("SELECT payload FROM cot_reports ORDER BY date DESC LIMIT ?1")
            .map_err(query_err)?;
        let limit = i64::try_from(n).unwrap_or(i64::MAX);
        let rows = stmt
            .query_map(params![limit], |row| row.get::<_, String>(0))
            .map_err(query_err)?;

        let mut reports = Vec::new();
        for row in rows {
            reports.push(decode(&row.map_err(query_err)?)?);
        }
        Ok(reports)
    }
}
