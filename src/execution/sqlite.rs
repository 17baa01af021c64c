//! SQLite adapter over the provisioned analytics views

use std::collections::HashSet;
use std::path::Path;
use std::sync::Mutex;

use async_trait::async_trait;
use rusqlite::types::ValueRef;
use rusqlite::Connection;
use tracing::{debug, info};

use super::engine::{QueryEngine, Table};
use crate::error::Result;

/// Engine backed by a local SQLite database. The connection sits behind a
/// mutex because rusqlite connections are not Sync.
pub struct SqliteEngine {
    conn: Mutex<Connection>,
}

impl SqliteEngine {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let conn = Connection::open(path.as_ref())?;
        info!("🗄️ Opened SQLite database at {}", path.as_ref().display());
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    pub fn open_in_memory() -> Result<Self> {
        Ok(Self {
            conn: Mutex::new(Connection::open_in_memory()?),
        })
    }

    /// Run arbitrary statements, for provisioning fixtures and local setups.
    pub fn execute_batch(&self, sql: &str) -> Result<()> {
        self.conn.lock().unwrap().execute_batch(sql)?;
        Ok(())
    }

    /// Catalog views absent from the database, preserving the order asked.
    pub fn missing_views(&self, views: &[&str]) -> Result<Vec<String>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare("SELECT name FROM sqlite_master WHERE type = 'view'")?;
        let existing = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<rusqlite::Result<HashSet<String>>>()?;
        Ok(views
            .iter()
            .filter(|view| !existing.contains(**view))
            .map(|view| view.to_string())
            .collect())
    }

    fn run_query(&self, sql: &str) -> Result<Table> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(sql)?;
        let columns: Vec<String> = stmt.column_names().iter().map(|c| c.to_string()).collect();
        let column_count = columns.len();

        let rows = stmt
            .query_map([], |row| {
                let mut cells = Vec::with_capacity(column_count);
                for index in 0..column_count {
                    cells.push(json_cell(row.get_ref(index)?));
                }
                Ok(cells)
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(Table::new(columns, rows))
    }
}

fn json_cell(value: ValueRef<'_>) -> serde_json::Value {
    match value {
        ValueRef::Null => serde_json::Value::Null,
        ValueRef::Integer(i) => serde_json::Value::Number(i.into()),
        ValueRef::Real(f) => serde_json::Number::from_f64(f)
            .map(serde_json::Value::Number)
            .unwrap_or(serde_json::Value::Null),
        ValueRef::Text(t) => serde_json::Value::String(String::from_utf8_lossy(t).to_string()),
        ValueRef::Blob(b) => serde_json::Value::String(format!("<blob {} bytes>", b.len())),
    }
}

#[async_trait]
impl QueryEngine for SqliteEngine {
    fn name(&self) -> &'static str {
        "sqlite"
    }

    async fn execute(&self, sql: &str) -> Result<Table> {
        debug!("🗄️ Executing SQL: {}", sql);
        self.run_query(sql)
    }
}
