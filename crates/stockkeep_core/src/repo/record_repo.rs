//! Stock record repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Provide durable CRUD over the `products` table.
//! - Keep SQL details inside the core persistence boundary.
//!
//! # Invariants
//! - Callers validate input and check name uniqueness before writing; the
//!   repository does not re-check either.
//! - Every statement runs in autocommit mode, so a returned write is durable.
//! - Read paths reject invalid persisted state instead of masking it.
//! - Scans are returned in natural (`id`) order.

use crate::db::migrations::{column_exists, latest_version};
use crate::db::{DbError, StoreHandle};
use crate::model::record::{RecordDraft, RecordId, StockRecord};
use rusqlite::{params, Connection, Row};
use std::error::Error;
use std::fmt::{Display, Formatter};

const PRODUCTS_TABLE: &str = "products";
const REQUIRED_COLUMNS: &[&str] = &["id", "name", "quantity", "unit_price", "reorder_threshold"];

const RECORD_SELECT_SQL: &str = "SELECT
    id,
    name,
    quantity,
    unit_price,
    reorder_threshold
FROM products";

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for record persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    Db(DbError),
    /// The store handle is closed (a reopen after backup/restore failed).
    StoreClosed,
    InvalidData(String),
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    MissingRequiredTable(&'static str),
    MissingRequiredColumn {
        table: &'static str,
        column: &'static str,
    },
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::StoreClosed => write!(f, "store connection is closed"),
            Self::InvalidData(message) => write!(f, "invalid persisted record data: {message}"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "connection schema version {actual_version} is behind required {expected_version}"
            ),
            Self::MissingRequiredTable(table) => write!(f, "missing required table `{table}`"),
            Self::MissingRequiredColumn { table, column } => {
                write!(f, "missing required column `{table}.{column}`")
            }
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Result of an update against a possibly missing id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateOutcome {
    Updated,
    /// No row matched; nothing was written.
    Missing,
}

/// Repository interface for stock record operations.
pub trait RecordRepository {
    /// Inserts a record; a missing threshold is stored as the default.
    fn create_record(&self, draft: &RecordDraft) -> RepoResult<RecordId>;
    fn get_record(&self, id: RecordId) -> RepoResult<Option<StockRecord>>;
    fn list_records(&self) -> RepoResult<Vec<StockRecord>>;
    /// Exact-string name lookup, optionally ignoring one id.
    fn record_exists_by_name(&self, name: &str, exclude_id: Option<RecordId>)
        -> RepoResult<bool>;
    /// Overwrites name, quantity and price; the threshold only when `Some`.
    fn update_record(&self, id: RecordId, draft: &RecordDraft) -> RepoResult<UpdateOutcome>;
    /// Returns whether a row was removed.
    fn delete_record(&self, id: RecordId) -> RepoResult<bool>;
    /// Records with `quantity <= reorder_threshold`.
    fn list_low_stock(&self) -> RepoResult<Vec<StockRecord>>;
    /// Case-insensitive substring match on name; empty filter returns all.
    fn search_by_name(&self, filter: &str) -> RepoResult<Vec<StockRecord>>;
}

/// SQLite-backed record repository.
pub struct SqliteRecordRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteRecordRepository<'conn> {
    /// Constructs a repository from a migrated/ready connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn)?;
        Ok(Self { conn })
    }

    /// Borrows the live connection of a store handle.
    pub fn from_handle(handle: &'conn StoreHandle) -> RepoResult<Self> {
        let conn = handle.connection().ok_or(RepoError::StoreClosed)?;
        Self::try_new(conn)
    }
}

impl RecordRepository for SqliteRecordRepository<'_> {
    fn create_record(&self, draft: &RecordDraft) -> RepoResult<RecordId> {
        self.conn.execute(
            "INSERT INTO products (
                name,
                quantity,
                unit_price,
                reorder_threshold
            ) VALUES (?1, ?2, ?3, ?4);",
            params![
                draft.name.as_str(),
                draft.quantity,
                draft.unit_price,
                draft.resolved_threshold(),
            ],
        )?;

        Ok(self.conn.last_insert_rowid())
    }

    fn get_record(&self, id: RecordId) -> RepoResult<Option<StockRecord>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{RECORD_SELECT_SQL} WHERE id = ?1;"))?;

        let mut rows = stmt.query([id])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_record_row(row)?));
        }

        Ok(None)
    }

    fn list_records(&self) -> RepoResult<Vec<StockRecord>> {
        self.query_records(&format!("{RECORD_SELECT_SQL} ORDER BY id ASC;"))
    }

    fn record_exists_by_name(
        &self,
        name: &str,
        exclude_id: Option<RecordId>,
    ) -> RepoResult<bool> {
        let exists: i64 = match exclude_id {
            Some(exclude_id) => self.conn.query_row(
                "SELECT EXISTS(SELECT 1 FROM products WHERE name = ?1 AND id != ?2);",
                params![name, exclude_id],
                |row| row.get(0),
            )?,
            None => self.conn.query_row(
                "SELECT EXISTS(SELECT 1 FROM products WHERE name = ?1);",
                [name],
                |row| row.get(0),
            )?,
        };

        Ok(exists == 1)
    }

    fn update_record(&self, id: RecordId, draft: &RecordDraft) -> RepoResult<UpdateOutcome> {
        let changed = match draft.reorder_threshold {
            Some(threshold) => self.conn.execute(
                "UPDATE products
                 SET
                    name = ?1,
                    quantity = ?2,
                    unit_price = ?3,
                    reorder_threshold = ?4
                 WHERE id = ?5;",
                params![
                    draft.name.as_str(),
                    draft.quantity,
                    draft.unit_price,
                    threshold,
                    id,
                ],
            )?,
            None => self.conn.execute(
                "UPDATE products
                 SET
                    name = ?1,
                    quantity = ?2,
                    unit_price = ?3
                 WHERE id = ?4;",
                params![draft.name.as_str(), draft.quantity, draft.unit_price, id],
            )?,
        };

        if changed == 0 {
            return Ok(UpdateOutcome::Missing);
        }

        Ok(UpdateOutcome::Updated)
    }

    fn delete_record(&self, id: RecordId) -> RepoResult<bool> {
        let changed = self
            .conn
            .execute("DELETE FROM products WHERE id = ?1;", [id])?;
        Ok(changed > 0)
    }

    fn list_low_stock(&self) -> RepoResult<Vec<StockRecord>> {
        self.query_records(&format!(
            "{RECORD_SELECT_SQL}
             WHERE quantity <= reorder_threshold
             ORDER BY id ASC;"
        ))
    }

    fn search_by_name(&self, filter: &str) -> RepoResult<Vec<StockRecord>> {
        let needle = filter.trim().to_lowercase();
        let records = self.list_records()?;
        if needle.is_empty() {
            return Ok(records);
        }

        Ok(records
            .into_iter()
            .filter(|record| record.name.to_lowercase().contains(&needle))
            .collect())
    }
}

impl SqliteRecordRepository<'_> {
    fn query_records(&self, sql: &str) -> RepoResult<Vec<StockRecord>> {
        let mut stmt = self.conn.prepare(sql)?;
        let mut rows = stmt.query([])?;
        let mut records = Vec::new();

        while let Some(row) = rows.next()? {
            records.push(parse_record_row(row)?);
        }

        Ok(records)
    }
}

fn ensure_connection_ready(conn: &Connection) -> RepoResult<()> {
    let expected_version = latest_version();
    let actual_version: u32 = conn.query_row("PRAGMA user_version;", [], |row| row.get(0))?;
    if actual_version < expected_version {
        return Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version,
        });
    }

    let table_exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = ?1
        );",
        [PRODUCTS_TABLE],
        |row| row.get(0),
    )?;
    if table_exists != 1 {
        return Err(RepoError::MissingRequiredTable(PRODUCTS_TABLE));
    }

    for &column in REQUIRED_COLUMNS {
        if !column_exists(conn, PRODUCTS_TABLE, column)? {
            return Err(RepoError::MissingRequiredColumn {
                table: PRODUCTS_TABLE,
                column,
            });
        }
    }

    Ok(())
}

fn parse_record_row(row: &Row<'_>) -> RepoResult<StockRecord> {
    let id: RecordId = row.get("id")?;
    let reorder_threshold = row
        .get::<_, Option<i64>>("reorder_threshold")?
        .ok_or_else(|| {
            RepoError::InvalidData(format!(
                "missing reorder_threshold for record {id} in products.reorder_threshold"
            ))
        })?;

    Ok(StockRecord {
        id,
        name: row.get("name")?,
        quantity: row.get("quantity")?,
        unit_price: row.get("unit_price")?,
        reorder_threshold,
    })
}
