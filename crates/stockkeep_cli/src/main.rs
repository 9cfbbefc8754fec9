//! CLI smoke entry point.
//!
//! # Responsibility
//! - Provide a minimal executable to verify `stockkeep_core` linkage.
//! - Open a store (from args or config) and print a stock health summary.
//! - Optionally snapshot the store into the configured backup directory.
//!
//! Usage: `stockkeep_cli [store.db] [--config config.json] [--backup name.bak]`

use stockkeep_core::{
    backup_store, validate_backup_path, InventoryConfig, InventoryService,
    SqliteRecordRepository, StoreHandle,
};
use std::path::{Component, Path, PathBuf};
use std::process::ExitCode;

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            eprintln!("error: {message}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<(), String> {
    let mut store_arg: Option<PathBuf> = None;
    let mut config_path = PathBuf::from("config.json");
    let mut backup_name: Option<String> = None;
    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        if arg == "--config" {
            config_path = args
                .next()
                .map(PathBuf::from)
                .ok_or("--config expects a path")?;
        } else if arg == "--backup" {
            backup_name = Some(args.next().ok_or("--backup expects a file name")?);
        } else {
            store_arg = Some(PathBuf::from(arg));
        }
    }

    let config = InventoryConfig::load_or_default(&config_path).map_err(|err| err.to_string())?;
    stockkeep_core::init_logging_from_config(&config.logging).map_err(|err| err.to_string())?;

    println!("stockkeep_core version={}", stockkeep_core::core_version());

    let store_path = store_arg.unwrap_or_else(|| config.database.path.clone());
    let mut handle = StoreHandle::open(&store_path).map_err(|err| err.to_string())?;

    if let Some(name) = backup_name {
        let destination = backup_destination(&config.database.backup_dir, &name)?;
        let backup = backup_store(&mut handle, &destination).map_err(|err| err.to_string())?;
        println!("backup={} bytes={}", backup.path.display(), backup.bytes);
    }

    let repo = SqliteRecordRepository::from_handle(&handle).map_err(|err| err.to_string())?;
    let service = InventoryService::new(repo, &config);

    let stats = service.statistics().map_err(|err| err.to_string())?;
    println!("store={}", store_path.display());
    println!(
        "records={} total_value={:.2} average_value={:.2} total_quantity={}",
        stats.total_count, stats.total_value, stats.average_value, stats.total_quantity
    );
    println!(
        "low_stock={} zero_stock={} critical={}",
        stats.low_stock_count, stats.zero_stock_count, stats.critical_count
    );
    match stats.coverage_percent() {
        Some(coverage) => println!("coverage={coverage:.1}%"),
        None => println!("coverage=n/a"),
    }

    for record in service.low_stock_records().map_err(|err| err.to_string())? {
        println!(
            "low id={} name={} quantity={} threshold={}",
            record.id, record.name, record.quantity, record.reorder_threshold
        );
    }

    Ok(())
}

/// Resolves a user-supplied backup name strictly inside `backup_dir`.
fn backup_destination(backup_dir: &Path, name: &str) -> Result<PathBuf, String> {
    let report = validate_backup_path(name);
    if !report.is_accepted() {
        return Err(report.to_string());
    }

    let relative = Path::new(name.trim());
    if !relative
        .components()
        .all(|component| matches!(component, Component::Normal(_)))
    {
        return Err(format!(
            "backup name `{}` must stay inside `{}`",
            relative.display(),
            backup_dir.display()
        ));
    }
    Ok(backup_dir.join(relative))
}
