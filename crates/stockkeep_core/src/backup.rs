//! Whole-file backup and restore of the inventory store.
//!
//! # Responsibility
//! - Snapshot the live store file to an external path.
//! - Replace the live store file with a previously taken snapshot.
//!
//! # Invariants
//! - The connection is closed before any byte is copied and reopened
//!   afterwards on every path, including copy failures.
//! - Copies land in a temporary sibling file first and are renamed into
//!   place, so a partially written destination is never visible.
//! - A restore source is verified as a readable store that this build can
//!   open and migrate before the live file is touched.

use crate::db::migrations::{column_exists, latest_version};
use crate::db::{DbError, StoreHandle};
use log::{error, info};
use rusqlite::{Connection, OpenFlags};
use std::error::Error;
use std::ffi::OsString;
use std::fmt::{Display, Formatter};
use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};
use std::time::Instant;
use uuid::Uuid;

const SQLITE_SIDECAR_SUFFIXES: &[&str] = &["-journal", "-wal", "-shm"];
/// Columns a restore source must already have; `reorder_threshold` is
/// added by migration on reopen.
const SOURCE_REQUIRED_COLUMNS: &[&str] = &["id", "name", "quantity", "unit_price"];

pub type BackupResult<T> = Result<T, BackupError>;

#[derive(Debug)]
pub enum BackupError {
    Io {
        path: PathBuf,
        source: io::Error,
    },
    /// Closing the connection before the copy failed; nothing was copied.
    Db(DbError),
    InvalidSource {
        path: PathBuf,
        reason: String,
    },
    /// Source and destination are the same file.
    SameFile(PathBuf),
    /// The connection could not be reopened; the handle is left closed.
    Reopen(DbError),
}

impl Display for BackupError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { path, source } => write!(f, "I/O error on `{}`: {source}", path.display()),
            Self::Db(err) => write!(f, "{err}"),
            Self::InvalidSource { path, reason } => write!(
                f,
                "`{}` is not a usable inventory store: {reason}",
                path.display()
            ),
            Self::SameFile(path) => write!(
                f,
                "`{}` is the live store file; choose a different path",
                path.display()
            ),
            Self::Reopen(err) => write!(f, "failed to reopen store after copy: {err}"),
        }
    }
}

impl Error for BackupError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Db(err) | Self::Reopen(err) => Some(err),
            Self::InvalidSource { .. } | Self::SameFile(_) => None,
        }
    }
}

impl From<DbError> for BackupError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

/// Outcome of a successful backup or restore.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackupReport {
    /// File that was written.
    pub path: PathBuf,
    pub bytes: u64,
}

/// Copies the live store to `destination`.
///
/// # Side effects
/// - Closes and reopens the store connection.
/// - Creates missing parent directories of `destination`.
/// - Emits `backup_create` logging events.
pub fn backup_store(
    handle: &mut StoreHandle,
    destination: impl AsRef<Path>,
) -> BackupResult<BackupReport> {
    let destination = destination.as_ref();
    let started_at = Instant::now();
    info!("event=backup_create module=backup status=start");

    let store_path = handle.path().to_path_buf();
    let result = ensure_distinct(&store_path, destination).and_then(|()| {
        with_quiesced(handle, || atomic_copy(&store_path, destination))
    });

    log_outcome("backup_create", started_at, &result);
    result.map(|bytes| BackupReport {
        path: destination.to_path_buf(),
        bytes,
    })
}

/// Overwrites the live store with the snapshot at `source`.
///
/// The snapshot is migrated on reopen, so backups taken by older versions
/// gain any missing columns.
///
/// # Side effects
/// - Closes and reopens the store connection.
/// - Removes stale SQLite journal files next to the live store.
/// - Emits `backup_restore` logging events.
pub fn restore_store(
    handle: &mut StoreHandle,
    source: impl AsRef<Path>,
) -> BackupResult<BackupReport> {
    let source = source.as_ref();
    let started_at = Instant::now();
    info!("event=backup_restore module=backup status=start");

    let store_path = handle.path().to_path_buf();
    let result = ensure_distinct(&store_path, source)
        .and_then(|()| verify_source(source))
        .and_then(|()| {
            with_quiesced(handle, || {
                remove_sidecars(&store_path)?;
                atomic_copy(source, &store_path)
            })
        });

    log_outcome("backup_restore", started_at, &result);
    result.map(|bytes| BackupReport {
        path: store_path,
        bytes,
    })
}

fn with_quiesced<T>(
    handle: &mut StoreHandle,
    op: impl FnOnce() -> BackupResult<T>,
) -> BackupResult<T> {
    handle.quiesce()?;
    let outcome = op();

    match handle.reopen() {
        Ok(()) => outcome,
        Err(reopen_err) => {
            if let Err(op_err) = &outcome {
                error!(
                    "event=store_reopen module=backup status=error error_code=copy_failed error={}",
                    op_err
                );
            }
            error!(
                "event=store_reopen module=backup status=error error_code=reopen_failed error={}",
                reopen_err
            );
            Err(BackupError::Reopen(reopen_err))
        }
    }
}

fn ensure_distinct(store_path: &Path, other: &Path) -> BackupResult<()> {
    if store_path == other {
        return Err(BackupError::SameFile(other.to_path_buf()));
    }
    if let (Ok(store), Ok(other_canonical)) = (fs::canonicalize(store_path), fs::canonicalize(other))
    {
        if store == other_canonical {
            return Err(BackupError::SameFile(other.to_path_buf()));
        }
    }
    Ok(())
}

fn verify_source(source: &Path) -> BackupResult<()> {
    let invalid = |reason: String| BackupError::InvalidSource {
        path: source.to_path_buf(),
        reason,
    };

    let metadata = fs::metadata(source).map_err(|err| invalid(err.to_string()))?;
    if !metadata.is_file() {
        return Err(invalid("not a regular file".to_string()));
    }

    let conn = Connection::open_with_flags(source, OpenFlags::SQLITE_OPEN_READ_ONLY)
        .map_err(|err| invalid(err.to_string()))?;
    let integrity: String = conn
        .query_row("PRAGMA quick_check;", [], |row| row.get(0))
        .map_err(|err| invalid(err.to_string()))?;
    if integrity != "ok" {
        return Err(invalid(format!("integrity check reported `{integrity}`")));
    }

    let has_products: i64 = conn
        .query_row(
            "SELECT EXISTS(
                SELECT 1
                FROM sqlite_master
                WHERE type = 'table' AND name = 'products'
            );",
            [],
            |row| row.get(0),
        )
        .map_err(|err| invalid(err.to_string()))?;
    if has_products != 1 {
        return Err(invalid("missing `products` table".to_string()));
    }

    let version: u32 = conn
        .query_row("PRAGMA user_version;", [], |row| row.get(0))
        .map_err(|err| invalid(err.to_string()))?;
    if version > latest_version() {
        return Err(invalid(format!(
            "schema version {version} is newer than supported {}",
            latest_version()
        )));
    }

    for &column in SOURCE_REQUIRED_COLUMNS {
        if !column_exists(&conn, "products", column).map_err(|err| invalid(err.to_string()))? {
            return Err(invalid(format!("missing column `products.{column}`")));
        }
    }

    Ok(())
}

/// Copies `from` to `to` through a synced temporary sibling and a rename.
fn atomic_copy(from: &Path, to: &Path) -> BackupResult<u64> {
    let parent = match to.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    fs::create_dir_all(&parent).map_err(|source| BackupError::Io {
        path: parent.clone(),
        source,
    })?;

    let file_name = to
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "inventory".to_string());
    let temp_path = parent.join(format!(".{file_name}.{}.tmp", Uuid::new_v4().simple()));

    let copied = fs::copy(from, &temp_path)
        .and_then(|bytes| File::open(&temp_path)?.sync_all().map(|()| bytes));
    let bytes = match copied {
        Ok(bytes) => bytes,
        Err(source) => {
            let _ = fs::remove_file(&temp_path);
            return Err(BackupError::Io {
                path: from.to_path_buf(),
                source,
            });
        }
    };

    if let Err(source) = fs::rename(&temp_path, to) {
        let _ = fs::remove_file(&temp_path);
        return Err(BackupError::Io {
            path: to.to_path_buf(),
            source,
        });
    }

    Ok(bytes)
}

fn remove_sidecars(store_path: &Path) -> BackupResult<()> {
    for suffix in SQLITE_SIDECAR_SUFFIXES {
        let mut sidecar = OsString::from(store_path.as_os_str());
        sidecar.push(suffix);
        let sidecar = PathBuf::from(sidecar);
        match fs::remove_file(&sidecar) {
            Ok(()) => {}
            Err(err) if err.kind() == io::ErrorKind::NotFound => {}
            Err(source) => {
                return Err(BackupError::Io {
                    path: sidecar,
                    source,
                })
            }
        }
    }
    Ok(())
}

fn log_outcome(event: &str, started_at: Instant, result: &BackupResult<u64>) {
    match result {
        Ok(bytes) => info!(
            "event={} module=backup status=ok duration_ms={} bytes={}",
            event,
            started_at.elapsed().as_millis(),
            bytes
        ),
        Err(err) => error!(
            "event={} module=backup status=error duration_ms={} error={}",
            event,
            started_at.elapsed().as_millis(),
            err
        ),
    }
}
