use std::fs;
use std::path::Path;
use std::sync::{Arc, Mutex};

use bugdesk_core::config::validate_table_name;
use bugdesk_core::error::{BugdeskError, Result};
use bugdesk_core::model::report::StoreSummary;
use duckdb::{Connection, params};

use crate::schema::schema_sql;

#[derive(Clone)]
pub struct Store {
    conn: Arc<Mutex<Connection>>,
    db_path: String,
    table: String,
}

impl Store {
    pub fn open(path: &Path, table: &str) -> Result<Self> {
        validate_table_name(table)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| BugdeskError::Io(format!("failed to create db dir: {e}")))?;
        }

        let conn = Connection::open(path)
            .map_err(|e| BugdeskError::Store(format!("failed to open duckdb: {e}")))?;
        conn.execute_batch(&schema_sql(table))
            .map_err(|e| BugdeskError::Store(format!("failed to initialize schema: {e}")))?;
        tracing::debug!(path = %path.display(), table, "store opened");

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
            db_path: path.display().to_string(),
            table: table.to_string(),
        })
    }

    pub fn open_in_memory(table: &str) -> Result<Self> {
        validate_table_name(table)?;
        let conn = Connection::open_in_memory()
            .map_err(|e| BugdeskError::Store(format!("failed to open in-memory db: {e}")))?;
        conn.execute_batch(&schema_sql(table))
            .map_err(|e| BugdeskError::Store(format!("failed to initialize schema: {e}")))?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
            db_path: ":memory:".to_string(),
            table: table.to_string(),
        })
    }

    pub(crate) fn conn(&self) -> std::sync::MutexGuard<'_, Connection> {
        self.conn.lock().expect("store mutex poisoned")
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    pub fn summary(&self) -> Result<StoreSummary> {
        let conn = self.conn();
        let t = &self.table;

        let reports = scalar_i64(&conn, &format!("SELECT COUNT(*) FROM {t}"))? as usize;
        let submissions = scalar_i64(
            &conn,
            &format!("SELECT CAST(COALESCE(SUM(count), 0) AS BIGINT) FROM {t}"),
        )?;
        let reopened = conn
            .query_row(
                &format!("SELECT COUNT(*) FROM {t} WHERE status = ?"),
                params![bugdesk_core::status::STATUS_REOPENED],
                |row| row.get::<_, i64>(0),
            )
            .map_err(|e| BugdeskError::Store(format!("query failed: {e}")))?
            as usize;

        Ok(StoreSummary {
            db_path: self.db_path.clone(),
            table: self.table.clone(),
            reports,
            submissions,
            reopened,
        })
    }
}

fn scalar_i64(conn: &Connection, sql: &str) -> Result<i64> {
    conn.query_row(sql, [], |row| row.get::<_, i64>(0))
        .map_err(|e| BugdeskError::Store(format!("query failed: {e}")))
}
