//! Ownership of the single live store connection.
//!
//! # Responsibility
//! - Keep the store path and the one open connection together.
//! - Quiesce (close) and reopen the connection around file-level operations.
//!
//! # Invariants
//! - Quiesce/reopen take `&mut self`, so no repository borrow can be alive
//!   while the connection is closed.
//! - A handle is either open against `path` or explicitly closed; it never
//!   points at a different file.

use super::{open_db, DbResult};
use log::{info, warn};
use rusqlite::Connection;
use std::path::{Path, PathBuf};

/// File-backed store handle.
#[derive(Debug)]
pub struct StoreHandle {
    path: PathBuf,
    conn: Option<Connection>,
}

impl StoreHandle {
    /// Opens (or creates) the store at `path`, running migrations.
    pub fn open(path: impl Into<PathBuf>) -> DbResult<Self> {
        let path = path.into();
        let conn = open_db(&path)?;
        Ok(Self {
            path,
            conn: Some(conn),
        })
    }

    /// Location of the live store file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the open connection, or `None` after a failed reopen.
    pub fn connection(&self) -> Option<&Connection> {
        self.conn.as_ref()
    }

    pub fn is_open(&self) -> bool {
        self.conn.is_some()
    }

    /// Closes the connection so the store file is safe to copy.
    ///
    /// Closing an already-closed handle is a no-op.
    pub fn quiesce(&mut self) -> DbResult<()> {
        let Some(conn) = self.conn.take() else {
            return Ok(());
        };

        match conn.close() {
            Ok(()) => {
                info!("event=store_quiesce module=db status=ok");
                Ok(())
            }
            Err((conn, err)) => {
                warn!("event=store_quiesce module=db status=error error={err}");
                self.conn = Some(conn);
                Err(err.into())
            }
        }
    }

    /// Reopens the connection against the stored path.
    ///
    /// Any previously open connection is dropped first.
    pub fn reopen(&mut self) -> DbResult<()> {
        self.conn = None;
        let conn = open_db(&self.path)?;
        self.conn = Some(conn);
        info!("event=store_reopen module=db status=ok");
        Ok(())
    }
}
