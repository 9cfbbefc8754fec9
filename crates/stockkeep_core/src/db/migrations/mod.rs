//! SQLite migration registry and executor.
//!
//! # Responsibility
//! - Register schema migrations in strictly increasing order.
//! - Apply pending migrations atomically.
//! - Bring legacy stores (created before `reorder_threshold` existed) up to
//!   the current `products` shape without touching existing rows.
//!
//! # Invariants
//! - `version` values must remain monotonic.
//! - Applied migration version is mirrored to `PRAGMA user_version`.
//! - Column additions check `PRAGMA table_info` first, so a store that
//!   already has the column is never altered twice.

use crate::db::{DbError, DbResult};
use log::info;
use rusqlite::{Connection, Transaction};

#[derive(Debug, Clone, Copy)]
enum Step {
    Sql(&'static str),
    AddColumnIfMissing {
        table: &'static str,
        column: &'static str,
        definition: &'static str,
    },
}

#[derive(Debug, Clone, Copy)]
struct Migration {
    version: u32,
    step: Step,
}

const MIGRATIONS: &[Migration] = &[
    Migration {
        version: 1,
        step: Step::Sql(include_str!("0001_products.sql")),
    },
    Migration {
        version: 2,
        step: Step::AddColumnIfMissing {
            table: "products",
            column: "reorder_threshold",
            definition: "INTEGER DEFAULT 10",
        },
    },
    Migration {
        version: 3,
        step: Step::Sql(include_str!("0003_backfill_reorder_threshold.sql")),
    },
];

/// Returns the latest migration version known by this binary.
pub fn latest_version() -> u32 {
    MIGRATIONS.last().map_or(0, |migration| migration.version)
}

/// Applies all pending migrations on the provided connection.
pub fn apply_migrations(conn: &mut Connection) -> DbResult<()> {
    let current_version = current_user_version(conn)?;
    let latest = latest_version();

    if current_version > latest {
        return Err(DbError::UnsupportedSchemaVersion {
            db_version: current_version,
            latest_supported: latest,
        });
    }

    if current_version == latest {
        return Ok(());
    }

    let tx = conn.transaction()?;
    for migration in MIGRATIONS {
        if migration.version <= current_version {
            continue;
        }

        apply_step(&tx, migration.step)?;
        tx.execute_batch(&format!("PRAGMA user_version = {};", migration.version))?;
    }
    tx.commit()?;

    info!(
        "event=db_migrate module=db status=ok from_version={} to_version={}",
        current_version, latest
    );
    Ok(())
}

/// Returns whether `table` currently has a column named `column`.
pub fn column_exists(conn: &Connection, table: &str, column: &str) -> DbResult<bool> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({table});"))?;
    let mut rows = stmt.query([])?;
    while let Some(row) = rows.next()? {
        let name: String = row.get("name")?;
        if name == column {
            return Ok(true);
        }
    }
    Ok(false)
}

fn apply_step(tx: &Transaction<'_>, step: Step) -> DbResult<()> {
    match step {
        Step::Sql(sql) => tx.execute_batch(sql)?,
        Step::AddColumnIfMissing {
            table,
            column,
            definition,
        } => {
            if !column_exists(tx, table, column)? {
                tx.execute_batch(&format!(
                    "ALTER TABLE {table} ADD COLUMN {column} {definition};"
                ))?;
                info!("event=db_migrate module=db status=column_added table={table} column={column}");
            }
        }
    }
    Ok(())
}

fn current_user_version(conn: &Connection) -> DbResult<u32> {
    let version = conn.query_row("PRAGMA user_version;", [], |row| row.get::<_, u32>(0))?;
    Ok(version)
}
