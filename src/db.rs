use crate::config::DatabaseConfig;
use crate::error::GatewayError;
use anyhow::Result;
use libsql::params::IntoParams;
use libsql::{Builder, Connection, Database as LibsqlDatabase, Row};
use std::path::Path;
use std::time::Duration;
use tokio::sync::Mutex;

const SCHEMA: &[(&str, &str)] = &[("001_schema.sql", include_str!("migrations/001_schema.sql"))];

const WRITE_PROBE: &str = r#"
CREATE TABLE IF NOT EXISTS connection_test (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    test_message TEXT,
    created_at TEXT DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now'))
);
"#;

/// Access layer over the relational store. One instance is built at startup
/// and shared by every handler.
pub struct Database {
    db: LibsqlDatabase,
    conn: Connection,
    stmt_lock: Mutex<()>,
    replica: bool,
    user: String,
}

impl Database {
    pub async fn new(cfg: &DatabaseConfig, data_dir: &Path) -> Result<Self> {
        let path = if cfg.name == ":memory:" {
            cfg.name.clone()
        } else {
            data_dir.join(&cfg.name).to_string_lossy().into_owned()
        };

        let db = match cfg.replica() {
            Some((url, token)) => {
                tracing::info!("[db] running in synced replica mode");
                let sync_interval = Duration::from_secs(cfg.sync_interval_seconds);
                Builder::new_synced_database(&path, url.to_string(), token.to_string())
                    .sync_interval(sync_interval)
                    .build()
                    .await?
            }
            None => Builder::new_local(&path).build().await?,
        };

        let conn = db.connect()?;
        conn.execute_batch("PRAGMA foreign_keys = ON;").await?;
        let database = Database {
            db,
            conn,
            stmt_lock: Mutex::new(()),
            replica: cfg.replica().is_some(),
            user: cfg.user.clone(),
        };

        database.sync().await?;
        database.ping().await?;
        database.ensure_schema().await?;

        Ok(database)
    }

    /// Label reported as the session user; SQLite has no users of its own.
    pub fn user(&self) -> &str {
        &self.user
    }

    pub async fn sync(&self) -> Result<()> {
        if self.replica {
            self.db
                .sync()
                .await
                .map_err(|e| anyhow::anyhow!("sync failed: {}", e))?;
        }
        Ok(())
    }

    /// Runs every schema file. Statements are all `IF NOT EXISTS`, so this is
    /// safe on every start.
    pub async fn ensure_schema(&self) -> Result<()> {
        for (name, sql) in SCHEMA {
            tracing::info!("applying schema: {}", name);
            self.conn
                .execute_batch(sql)
                .await
                .map_err(|e| anyhow::anyhow!("failed to execute schema {name}: {e}"))?;
        }
        Ok(())
    }

    /// Creates a scratch table and writes one row to it, proving the store
    /// accepts writes.
    pub async fn probe_write(&self) -> Result<(), GatewayError> {
        {
            let _guard = self.stmt_lock.lock().await;
            self.conn.execute_batch(WRITE_PROBE).await?;
        }
        self.execute(
            "INSERT INTO connection_test (test_message) VALUES (?)",
            libsql::params!["Connection successful!"],
        )
        .await?;
        Ok(())
    }

    pub async fn ping(&self) -> Result<(), GatewayError> {
        let _guard = self.stmt_lock.lock().await;
        let mut rows = self.conn.query("SELECT 1", ()).await?;
        rows.next().await?;
        Ok(())
    }

    /// Executes an insert/update/delete, returning the number of rows affected.
    ///
    /// Statements share one connection, so each one holds `stmt_lock` until its
    /// row count or rows have been read.
    pub async fn execute(&self, sql: &str, params: impl IntoParams) -> Result<u64, GatewayError> {
        let _guard = self.stmt_lock.lock().await;
        Ok(self.conn.execute(sql, params).await?)
    }

    /// Scans the first row of the result; an empty result is `GatewayError::NotFound`.
    pub async fn query_row<T>(
        &self,
        sql: &str,
        params: impl IntoParams,
        scan: impl FnOnce(&Row) -> libsql::Result<T>,
    ) -> Result<T, GatewayError> {
        let _guard = self.stmt_lock.lock().await;
        let mut rows = self.conn.query(sql, params).await?;
        match rows.next().await? {
            Some(row) => Ok(scan(&row)?),
            None => Err(GatewayError::NotFound),
        }
    }

    pub async fn query_set<T>(
        &self,
        sql: &str,
        params: impl IntoParams,
        scan: impl Fn(&Row) -> libsql::Result<T>,
    ) -> Result<Vec<T>, GatewayError> {
        let _guard = self.stmt_lock.lock().await;
        let mut rows = self.conn.query(sql, params).await?;
        let mut out = Vec::new();
        while let Some(row) = rows.next().await? {
            out.push(scan(&row)?);
        }
        Ok(out)
    }
}

#[cfg(test)]
pub(crate) async fn seed_user(db: &Database, username: &str) -> i64 {
    db.query_row(
        "INSERT INTO users (username, email, password_hash) VALUES (?, ?, ?) RETURNING id",
        libsql::params![username, format!("{username}@example.org"), "hash"],
        |row| row.get::<i64>(0),
    )
    .await
    .unwrap()
}
