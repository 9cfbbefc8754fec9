use rusqlite::Connection;
use std::fs;
use stockkeep_core::{
    backup_store, restore_store, BackupError, RecordDraft, RecordRepository,
    SqliteRecordRepository, StockRecord, StoreHandle,
};

fn insert(handle: &StoreHandle, draft: &RecordDraft) -> StockRecord {
    let repo = SqliteRecordRepository::from_handle(handle).unwrap();
    let id = repo.create_record(draft).unwrap();
    repo.get_record(id).unwrap().unwrap()
}

fn all_records(handle: &StoreHandle) -> Vec<StockRecord> {
    SqliteRecordRepository::from_handle(handle)
        .unwrap()
        .list_records()
        .unwrap()
}

#[test]
fn backup_then_restore_brings_back_deleted_record() {
    let dir = tempfile::tempdir().unwrap();
    let mut handle = StoreHandle::open(dir.path().join("inventory.db")).unwrap();
    let record = insert(
        &handle,
        &RecordDraft::new("Laptop", 5, 1000.0).with_reorder_threshold(3),
    );

    let backup_path = dir.path().join("backups").join("inventory.bak");
    let report = backup_store(&mut handle, &backup_path).unwrap();
    assert_eq!(report.path, backup_path);
    assert!(report.bytes > 0);
    assert_eq!(fs::metadata(&backup_path).unwrap().len(), report.bytes);
    assert!(handle.is_open());

    {
        let repo = SqliteRecordRepository::from_handle(&handle).unwrap();
        assert!(repo.delete_record(record.id).unwrap());
    }
    assert!(all_records(&handle).is_empty());

    let report = restore_store(&mut handle, &backup_path).unwrap();
    assert_eq!(report.path, handle.path());
    assert!(handle.is_open());

    assert_eq!(all_records(&handle), vec![record]);
}

#[test]
fn backup_leaves_no_temporary_files_behind() {
    let dir = tempfile::tempdir().unwrap();
    let mut handle = StoreHandle::open(dir.path().join("inventory.db")).unwrap();
    insert(&handle, &RecordDraft::new("Mouse", 10, 25.0));

    let backup_dir = dir.path().join("snapshots");
    backup_store(&mut handle, backup_dir.join("first.bak")).unwrap();
    backup_store(&mut handle, backup_dir.join("first.bak")).unwrap();

    let entries: Vec<String> = fs::read_dir(&backup_dir)
        .unwrap()
        .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    assert_eq!(entries, vec!["first.bak"]);
}

#[test]
fn backup_onto_live_store_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let store_path = dir.path().join("inventory.db");
    let mut handle = StoreHandle::open(&store_path).unwrap();
    insert(&handle, &RecordDraft::new("Desk", 1, 150.0));

    let err = backup_store(&mut handle, &store_path).unwrap_err();

    assert!(matches!(err, BackupError::SameFile(_)));
    assert!(handle.is_open());
    assert_eq!(all_records(&handle).len(), 1);
}

#[test]
fn restore_from_missing_file_keeps_live_data() {
    let dir = tempfile::tempdir().unwrap();
    let mut handle = StoreHandle::open(dir.path().join("inventory.db")).unwrap();
    insert(&handle, &RecordDraft::new("Chair", 4, 40.0));

    let err = restore_store(&mut handle, dir.path().join("nope.bak")).unwrap_err();

    assert!(matches!(err, BackupError::InvalidSource { .. }));
    assert!(handle.is_open());
    assert_eq!(all_records(&handle).len(), 1);
}

#[test]
fn restore_from_non_database_file_keeps_live_data() {
    let dir = tempfile::tempdir().unwrap();
    let mut handle = StoreHandle::open(dir.path().join("inventory.db")).unwrap();
    let record = insert(&handle, &RecordDraft::new("Lamp", 6, 19.9));

    let bogus = dir.path().join("notes.bak");
    fs::write(&bogus, "this is not an inventory store, just some text\n".repeat(50)).unwrap();

    let err = restore_store(&mut handle, &bogus).unwrap_err();

    assert!(matches!(err, BackupError::InvalidSource { .. }));
    assert!(handle.is_open());
    assert_eq!(all_records(&handle), vec![record]);
}

#[test]
fn restore_from_database_without_products_table_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let mut handle = StoreHandle::open(dir.path().join("inventory.db")).unwrap();
    insert(&handle, &RecordDraft::new("Shelf", 2, 70.0));

    let foreign = dir.path().join("foreign.db");
    let conn = Connection::open(&foreign).unwrap();
    conn.execute_batch("CREATE TABLE customers (id INTEGER PRIMARY KEY);")
        .unwrap();
    drop(conn);

    let err = restore_store(&mut handle, &foreign).unwrap_err();

    assert!(matches!(err, BackupError::InvalidSource { .. }));
    assert_eq!(all_records(&handle).len(), 1);
}

#[test]
fn restore_of_legacy_backup_migrates_threshold_column() {
    let dir = tempfile::tempdir().unwrap();
    let mut handle = StoreHandle::open(dir.path().join("inventory.db")).unwrap();
    insert(&handle, &RecordDraft::new("Current", 1, 1.0));

    let legacy = dir.path().join("legacy.bak");
    let conn = Connection::open(&legacy).unwrap();
    conn.execute_batch(
        "CREATE TABLE products (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            quantity INTEGER NOT NULL,
            unit_price REAL NOT NULL
        );
        INSERT INTO products (name, quantity, unit_price) VALUES ('Old Bolt', 3, 0.5);",
    )
    .unwrap();
    drop(conn);

    restore_store(&mut handle, &legacy).unwrap();

    let records = all_records(&handle);
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].name, "Old Bolt");
    assert_eq!(records[0].reorder_threshold, 10);
}

#[test]
fn restore_from_newer_schema_backup_is_rejected_before_live_store_changes() {
    let dir = tempfile::tempdir().unwrap();
    let mut handle = StoreHandle::open(dir.path().join("inventory.db")).unwrap();
    let record = insert(&handle, &RecordDraft::new("Keyboard", 4, 45.0));

    let future = dir.path().join("future.bak");
    let conn = Connection::open(&future).unwrap();
    conn.execute_batch(
        "CREATE TABLE products (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            quantity INTEGER NOT NULL,
            unit_price REAL NOT NULL,
            reorder_threshold INTEGER DEFAULT 10
        );
        PRAGMA user_version = 99;",
    )
    .unwrap();
    drop(conn);

    let err = restore_store(&mut handle, &future).unwrap_err();

    match err {
        BackupError::InvalidSource { reason, .. } => assert!(reason.contains("99")),
        other => panic!("unexpected error: {other}"),
    }
    assert!(handle.is_open());
    assert_eq!(all_records(&handle), vec![record]);
}

#[test]
fn restore_from_products_table_missing_columns_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let mut handle = StoreHandle::open(dir.path().join("inventory.db")).unwrap();
    let record = insert(&handle, &RecordDraft::new("Monitor", 2, 300.0));

    let partial = dir.path().join("partial.bak");
    let conn = Connection::open(&partial).unwrap();
    conn.execute_batch(
        "CREATE TABLE products (id INTEGER PRIMARY KEY AUTOINCREMENT, name TEXT NOT NULL);
        INSERT INTO products (name) VALUES ('Half Row');",
    )
    .unwrap();
    drop(conn);

    let err = restore_store(&mut handle, &partial).unwrap_err();

    match err {
        BackupError::InvalidSource { reason, .. } => assert!(reason.contains("quantity")),
        other => panic!("unexpected error: {other}"),
    }
    assert!(handle.is_open());
    assert_eq!(all_records(&handle), vec![record]);
}

#[test]
fn failed_backup_copy_still_reopens_the_store() {
    let dir = tempfile::tempdir().unwrap();
    let mut handle = StoreHandle::open(dir.path().join("inventory.db")).unwrap();
    let record = insert(&handle, &RecordDraft::new("Router", 3, 80.0));

    let blocker = dir.path().join("not_a_dir");
    fs::write(&blocker, "plain file").unwrap();

    let err = backup_store(&mut handle, blocker.join("inventory.bak")).unwrap_err();

    assert!(matches!(err, BackupError::Io { .. }));
    assert!(handle.is_open());
    assert_eq!(all_records(&handle), vec![record]);
}
