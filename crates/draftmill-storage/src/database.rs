// SPDX-FileCopyrightText: 2026 Draftmill Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Database connection management with PRAGMA setup, WAL mode, and lifecycle.
//!
//! All writes are serialized through tokio-rusqlite's single background thread.
//! Do NOT create additional Connection instances for writes.

use draftmill_config::StorageConfig;
use draftmill_core::DraftmillError;
use tokio_rusqlite::Connection;
use tracing::{debug, info, warn};

use crate::migrations;

/// Helper to convert tokio_rusqlite errors into DraftmillError::Storage.
fn storage_err(e: tokio_rusqlite::Error) -> DraftmillError {
    DraftmillError::Storage {
        source: Box::new(e),
    }
}

fn rusqlite_err(e: rusqlite::Error) -> DraftmillError {
    DraftmillError::Storage {
        source: Box::new(e),
    }
}

/// Register the sqlite-vec extension for all subsequently opened connections.
///
/// Idempotent; guarded by `std::sync::Once`. When registration or loading
/// fails on a given platform, vector search degrades to the client-side
/// path, so callers never treat the extension as mandatory.
pub fn register_vector_extension() {
    static INIT: std::sync::Once = std::sync::Once::new();
    INIT.call_once(|| unsafe {
        let entry = sqlite_vec::sqlite3_vec_init as *const ();
        rusqlite::ffi::sqlite3_auto_extension(Some(std::mem::transmute::<
            *const (),
            unsafe extern "C" fn(
                *mut rusqlite::ffi::sqlite3,
                *mut *mut std::os::raw::c_char,
                *const rusqlite::ffi::sqlite3_api_routines,
            ) -> std::os::raw::c_int,
        >(entry)));
    });
}

/// An open Draftmill database: WAL-mode SQLite with migrations applied.
///
/// Cloning is cheap; clones share the same background connection thread.
#[derive(Clone)]
pub struct Database {
    conn: Connection,
    vec_available: bool,
}

impl Database {
    /// Open (or create) the database at `path` with default settings.
    pub async fn open(path: &str) -> Result<Self, DraftmillError> {
        let config = StorageConfig {
            database_path: path.to_string(),
            ..StorageConfig::default()
        };
        Self::open_with(&config).await
    }

    /// Open (or create) the database described by `config`.
    ///
    /// Creates parent directories as needed, applies PRAGMAs, runs all
    /// pending migrations, and probes for the sqlite-vec extension.
    pub async fn open_with(config: &StorageConfig) -> Result<Self, DraftmillError> {
        register_vector_extension();

        let path = std::path::Path::new(&config.database_path);
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent).map_err(|e| DraftmillError::Storage {
                source: Box::new(e),
            })?;
        }

        let conn = Connection::open(&config.database_path)
            .await
            .map_err(rusqlite_err)?;
        let db = Self::initialize(conn, config.wal_mode, config.busy_timeout_ms).await?;
        info!(
            path = %config.database_path,
            vector_search = if db.vec_available { "native" } else { "fallback" },
            "database opened"
        );
        Ok(db)
    }

    /// Open a fresh in-memory database with migrations applied. Test use.
    pub async fn open_in_memory() -> Result<Self, DraftmillError> {
        register_vector_extension();
        let conn = Connection::open_in_memory().await.map_err(rusqlite_err)?;
        Self::initialize(conn, false, 5000).await
    }

    async fn initialize(
        conn: Connection,
        wal_mode: bool,
        busy_timeout_ms: u64,
    ) -> Result<Self, DraftmillError> {
        let setup: Result<bool, DraftmillError> = conn
            .call(
                move |conn| -> Result<Result<bool, DraftmillError>, rusqlite::Error> {
                    Ok(setup_connection(conn, wal_mode, busy_timeout_ms))
                },
            )
            .await
            .map_err(storage_err)?;
        let vec_available = setup?;

        if !vec_available {
            warn!("sqlite-vec unavailable; similarity search uses the client-side path");
        }

        Ok(Self {
            conn,
            vec_available,
        })
    }

    /// The shared async connection. All workspace stores run their
    /// queries through this handle.
    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Whether the sqlite-vec extension answered the `vec_version()` probe.
    pub fn vec_available(&self) -> bool {
        self.vec_available
    }
}

/// Apply PRAGMAs, run migrations, and probe sqlite-vec on the raw connection.
fn setup_connection(
    conn: &mut rusqlite::Connection,
    wal_mode: bool,
    busy_timeout_ms: u64,
) -> Result<bool, DraftmillError> {
    if wal_mode {
        // journal_mode returns the resulting mode as a row; pragma_update
        // tolerates that.
        conn.pragma_update(None, "journal_mode", "WAL")
            .map_err(rusqlite_err)?;
    }
    conn.pragma_update(None, "busy_timeout", busy_timeout_ms as i64)
        .map_err(rusqlite_err)?;
    conn.pragma_update(None, "foreign_keys", "ON")
        .map_err(rusqlite_err)?;

    migrations::run_migrations(conn)?;

    let vec_available = conn
        .query_row("SELECT vec_version()", [], |row| row.get::<_, String>(0))
        .map(|version| {
            debug!(version = %version, "sqlite-vec extension loaded");
            true
        })
        .unwrap_or(false);

    Ok(vec_available)
}
