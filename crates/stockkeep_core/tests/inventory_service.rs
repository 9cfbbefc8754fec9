use stockkeep_core::db::open_db_in_memory;
use stockkeep_core::{
    Field, InventoryConfig, InventoryService, MissingRecordPolicy, RecordInput, ServiceError,
    SqliteRecordRepository, ViolationKind,
};

fn input<'a>(
    name: &'a str,
    quantity: &'a str,
    unit_price: &'a str,
    reorder_threshold: Option<&'a str>,
) -> RecordInput<'a> {
    RecordInput {
        name,
        quantity,
        unit_price,
        reorder_threshold,
    }
}

#[test]
fn add_record_persists_trimmed_name_and_default_threshold() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteRecordRepository::try_new(&conn).unwrap();
    let service = InventoryService::with_defaults(repo);

    let record = service
        .add_record(&input("  Mouse  ", "10", "25.5", None))
        .unwrap();

    assert_eq!(record.name, "Mouse");
    assert_eq!(record.quantity, 10);
    assert_eq!(record.unit_price, 25.5);
    assert_eq!(record.reorder_threshold, 10);
    assert_eq!(service.get_record(record.id).unwrap(), Some(record));
}

#[test]
fn add_record_uses_configured_default_threshold() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteRecordRepository::try_new(&conn).unwrap();
    let mut config = InventoryConfig::default();
    config.validation.default_reorder_threshold = 4;
    let service = InventoryService::new(repo, &config);

    let record = service
        .add_record(&input("Stapler", "2", "7", Some("   ")))
        .unwrap();

    assert_eq!(record.reorder_threshold, 4);
}

#[test]
fn add_record_rejects_invalid_input_with_every_violation() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteRecordRepository::try_new(&conn).unwrap();
    let service = InventoryService::with_defaults(repo);

    let err = service
        .add_record(&input("", "-5", "bad", None))
        .unwrap_err();

    match &err {
        ServiceError::Validation(report) => {
            assert_eq!(report.violations.len(), 3);
            assert!(report.has_field(Field::Name));
            assert!(report.has_field(Field::Quantity));
            assert!(report.has_field(Field::UnitPrice));
        }
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(err.messages().len(), 3);
    assert_eq!(service.statistics().unwrap().total_count, 0);
}

#[test]
fn add_record_rejects_out_of_range_threshold() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteRecordRepository::try_new(&conn).unwrap();
    let service = InventoryService::with_defaults(repo);

    let err = service
        .add_record(&input("Toner", "1", "60", Some("-1")))
        .unwrap_err();

    match err {
        ServiceError::Validation(report) => {
            assert_eq!(report.violations.len(), 1);
            assert_eq!(report.violations[0].field, Field::ReorderThreshold);
            assert!(matches!(
                report.violations[0].kind,
                ViolationKind::BelowMinimum { .. }
            ));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn add_record_rejects_duplicate_name() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteRecordRepository::try_new(&conn).unwrap();
    let service = InventoryService::with_defaults(repo);

    service
        .add_record(&input("Laptop", "5", "1000", Some("3")))
        .unwrap();
    let err = service
        .add_record(&input("Laptop", "1", "900", None))
        .unwrap_err();

    assert!(matches!(err, ServiceError::DuplicateName(ref name) if name == "Laptop"));
    assert_eq!(service.statistics().unwrap().total_count, 1);
}

#[test]
fn update_record_keeps_own_name_and_stored_threshold() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteRecordRepository::try_new(&conn).unwrap();
    let service = InventoryService::with_defaults(repo);

    let created = service
        .add_record(&input("Router", "3", "80", Some("7")))
        .unwrap();

    let updated = service
        .update_record(created.id, &input("Router", "12", "85.25", None))
        .unwrap()
        .unwrap();

    assert_eq!(updated.id, created.id);
    assert_eq!(updated.quantity, 12);
    assert_eq!(updated.unit_price, 85.25);
    assert_eq!(updated.reorder_threshold, 7);
}

#[test]
fn update_record_rejects_name_of_another_record() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteRecordRepository::try_new(&conn).unwrap();
    let service = InventoryService::with_defaults(repo);

    service.add_record(&input("Chair", "4", "40", None)).unwrap();
    let desk = service.add_record(&input("Desk", "2", "150", None)).unwrap();

    let err = service
        .update_record(desk.id, &input("Chair", "2", "150", None))
        .unwrap_err();

    assert!(matches!(err, ServiceError::DuplicateName(_)));
    assert_eq!(service.get_record(desk.id).unwrap().unwrap().name, "Desk");
}

#[test]
fn update_missing_record_is_ignored_by_default() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteRecordRepository::try_new(&conn).unwrap();
    let service = InventoryService::with_defaults(repo);

    let outcome = service
        .update_record(404, &input("Ghost", "1", "1", None))
        .unwrap();

    assert!(outcome.is_none());
    assert_eq!(service.statistics().unwrap().total_count, 0);
}

#[test]
fn update_missing_record_is_reported_when_configured() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteRecordRepository::try_new(&conn).unwrap();
    let mut config = InventoryConfig::default();
    config.service.missing_record_policy = MissingRecordPolicy::Report;
    let service = InventoryService::new(repo, &config);

    let err = service
        .update_record(404, &input("Ghost", "1", "1", None))
        .unwrap_err();

    assert!(matches!(err, ServiceError::NotFound(404)));
}

#[test]
fn delete_record_returns_removed_record_and_frees_name() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteRecordRepository::try_new(&conn).unwrap();
    let service = InventoryService::with_defaults(repo);

    let created = service.add_record(&input("Lamp", "6", "19.9", None)).unwrap();
    let removed = service.delete_record(created.id).unwrap();
    assert_eq!(removed, created);
    assert!(service.get_record(created.id).unwrap().is_none());

    let recreated = service.add_record(&input("Lamp", "1", "19.9", None)).unwrap();
    assert!(recreated.id > created.id);
}

#[test]
fn delete_missing_record_reports_not_found() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteRecordRepository::try_new(&conn).unwrap();
    let service = InventoryService::with_defaults(repo);

    let err = service.delete_record(9).unwrap_err();

    assert!(matches!(err, ServiceError::NotFound(9)));
}

#[test]
fn list_records_filters_and_validates_filter() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteRecordRepository::try_new(&conn).unwrap();
    let service = InventoryService::with_defaults(repo);

    for name in ["Blue Pen", "Red Pencil", "Stapler"] {
        service.add_record(&input(name, "1", "1", None)).unwrap();
    }

    assert_eq!(service.list_records("").unwrap().len(), 3);
    assert_eq!(service.list_records("pen").unwrap().len(), 2);

    let too_long = "x".repeat(101);
    let err = service.list_records(&too_long).unwrap_err();
    match err {
        ServiceError::Validation(report) => assert!(report.has_field(Field::SearchFilter)),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn statistics_and_low_stock_reflect_current_records() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteRecordRepository::try_new(&conn).unwrap();
    let service = InventoryService::with_defaults(repo);

    service
        .add_record(&input("Product 1", "10", "100", Some("5")))
        .unwrap();
    service
        .add_record(&input("Product 2", "20", "200", Some("15")))
        .unwrap();
    let third = service
        .add_record(&input("Product 3", "5", "50", Some("10")))
        .unwrap();

    let stats = service.statistics().unwrap();
    assert_eq!(stats.total_count, 3);
    assert_eq!(stats.total_value, 5250.0);
    assert_eq!(stats.low_stock_count, 1);
    assert_eq!(stats.total_quantity, 35);
    assert_eq!(stats.coverage_percent(), Some(35.0 / 30.0 * 100.0));

    let low = service.low_stock_records().unwrap();
    assert_eq!(low.len(), 1);
    assert_eq!(low[0].id, third.id);

    service
        .update_record(third.id, &input("Product 3", "0", "50", None))
        .unwrap();
    let stats = service.statistics().unwrap();
    assert_eq!(stats.zero_stock_count, 1);
    assert_eq!(stats.critical_count, 2);
    assert!(stats.needs_attention());
}
