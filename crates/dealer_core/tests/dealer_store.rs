use dealer_core::{
    Dealer, DealerStore, ErrorKind, SqlDealerStore, SqlSettings, SqlStore,
};
use rusqlite::Connection;

fn memory_store() -> SqlStore {
    SqlStore::open(&SqlSettings::in_memory()).unwrap()
}

fn new_dealer(name: &str) -> Dealer {
    Dealer {
        name: name.to_string(),
        phone_number: "+1-555-0100".to_string(),
        address: "1 Main St".to_string(),
        city: "Toronto".to_string(),
        province: "ON".to_string(),
        country: "CA".to_string(),
        postal_code: "M5V 2T6".to_string(),
        brands: vec!["audi".to_string(), "vw".to_string()],
        ..Dealer::default()
    }
}

fn dealer_count(store: &SqlStore) -> i64 {
    store
        .get_master()
        .query_row("SELECT COUNT(*) FROM Dealer;", [], |row| row.get(0))
        .unwrap()
}

fn corrupt_brands(store: &SqlStore, id: &str) {
    store
        .get_master()
        .execute("UPDATE Dealer SET Brands = 'not json' WHERE Id = ?1;", [id])
        .unwrap();
}

#[test]
fn save_assigns_id_and_get_returns_saved_dealer() {
    let store = memory_store();
    let dealers = SqlDealerStore::try_new(&store).unwrap();

    let mut input = new_dealer("Acme");
    input.brands = vec!["audi".to_string(), "audi".to_string(), "vw".to_string()];
    let saved = dealers.save(input).unwrap();

    assert_eq!(saved.id.len(), 26);
    assert!(saved.create_at > 0);
    assert_eq!(saved.create_at, saved.update_at);
    assert_eq!(saved.brands, vec!["audi", "vw"]);

    let loaded = dealers.get(&saved.id).unwrap();
    assert_eq!(loaded, saved);
}

#[test]
fn save_rejects_dealer_with_existing_id_without_insert() {
    let store = memory_store();
    let dealers = SqlDealerStore::try_new(&store).unwrap();

    let mut dealer = new_dealer("Acme");
    dealer.id = "ybndrfg8ejkmcpqxot1uwisza3".to_string();

    let err = dealers.save(dealer).unwrap_err();
    assert_eq!(err.kind, ErrorKind::BadRequest);
    assert_eq!(err.status_code, 400);
    assert_eq!(err.id, "store.sql_dealer.save.existing.app_error");
    assert_eq!(err.detailed_error, "dealer_id=ybndrfg8ejkmcpqxot1uwisza3");
    assert_eq!(dealer_count(&store), 0);
}

#[test]
fn save_rejects_invalid_dealer_without_insert() {
    let store = memory_store();
    let dealers = SqlDealerStore::try_new(&store).unwrap();

    let mut dealer = new_dealer("Acme");
    dealer.brands.clear();

    let err = dealers.save(dealer).unwrap_err();
    assert_eq!(err.kind, ErrorKind::Validation);
    assert_eq!(err.id, "model.dealer.is_valid.brands.app_error");
    assert_eq!(dealer_count(&store), 0);
}

#[test]
fn save_surfaces_column_limit_violation_as_internal_error() {
    let store = memory_store();
    let dealers = SqlDealerStore::try_new(&store).unwrap();

    let mut dealer = new_dealer("Acme");
    dealer.country = "CANADA".to_string();

    let err = dealers.save(dealer).unwrap_err();
    assert_eq!(err.kind, ErrorKind::Internal);
    assert_eq!(err.status_code, 500);
    assert_eq!(err.id, "store.sql_dealer.save.app_error");
    assert!(err.detailed_error.starts_with("dealer_id="));
    assert_eq!(dealer_count(&store), 0);
}

#[test]
fn get_unknown_id_returns_not_found() {
    let store = memory_store();
    let dealers = SqlDealerStore::try_new(&store).unwrap();

    let err = dealers.get("ybndrfg8ejkmcpqxot1uwisza3").unwrap_err();
    assert!(err.is_not_found());
    assert_eq!(err.status_code, 404);
    assert_eq!(err.location, "SqlDealerStore.Get");
    assert_eq!(err.id, "store.sql_dealer.missing.app_error");
}

#[test]
fn get_rejects_corrupted_brands_column() {
    let store = memory_store();
    let dealers = SqlDealerStore::try_new(&store).unwrap();
    let saved = dealers.save(new_dealer("Acme")).unwrap();

    corrupt_brands(&store, &saved.id);

    let err = dealers.get(&saved.id).unwrap_err();
    assert_eq!(err.kind, ErrorKind::Internal);
    assert_eq!(err.id, "store.sql_dealer.get.app_error");
}

#[test]
fn get_all_surfaces_unreadable_row_as_internal_error() {
    let store = memory_store();
    let dealers = SqlDealerStore::try_new(&store).unwrap();
    dealers.save(new_dealer("Acme")).unwrap();
    let broken = dealers.save(new_dealer("Bolt")).unwrap();
    corrupt_brands(&store, &broken.id);

    let err = dealers.get_all().unwrap_err();
    assert_eq!(err.kind, ErrorKind::Internal);
    assert_eq!(err.location, "SqlDealerStore.GetAll");
    assert_eq!(err.id, "store.sql_dealer.get.app_error");
}

#[test]
fn get_all_orders_by_name_ascending() {
    let store = memory_store();
    let dealers = SqlDealerStore::try_new(&store).unwrap();
    assert!(dealers.get_all().unwrap().is_empty());

    for name in ["Zed", "acme", "Bolt", "Acme"] {
        dealers.save(new_dealer(name)).unwrap();
    }

    let names: Vec<_> = dealers
        .get_all()
        .unwrap()
        .into_iter()
        .map(|dealer| dealer.name)
        .collect();
    assert_eq!(names, vec!["Acme", "Bolt", "Zed", "acme"]);
}

#[test]
fn update_unknown_id_returns_bad_request() {
    let store = memory_store();
    let dealers = SqlDealerStore::try_new(&store).unwrap();

    let mut dealer = new_dealer("Ghost");
    dealer.pre_save();

    let err = dealers.update(dealer, false).unwrap_err();
    assert_eq!(err.kind, ErrorKind::BadRequest);
    assert_eq!(err.id, "store.sql_dealer.update.find.app_error");
}

#[test]
fn update_with_unreadable_stored_row_is_internal_error() {
    let store = memory_store();
    let dealers = SqlDealerStore::try_new(&store).unwrap();
    let saved = dealers.save(new_dealer("Acme")).unwrap();
    corrupt_brands(&store, &saved.id);

    let err = dealers.update(saved.clone(), true).unwrap_err();
    assert_eq!(err.kind, ErrorKind::Internal);
    assert_eq!(err.status_code, 500);
    assert_eq!(err.location, "SqlDealerStore.Update");
    assert_eq!(err.id, "store.sql_dealer.update.finding.app_error");

    let stored: String = store
        .get_master()
        .query_row(
            "SELECT Brands FROM Dealer WHERE Id = ?1;",
            [saved.id.as_str()],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(stored, "not json");
}

#[test]
fn untrusted_update_only_changes_brands_and_delete_at() {
    let store = memory_store();
    let dealers = SqlDealerStore::try_new(&store).unwrap();
    let saved = dealers.save(new_dealer("Acme")).unwrap();

    let mut changed = saved.clone();
    changed.create_at = 1;
    changed.name = "Renamed".to_string();
    changed.city = "Ottawa".to_string();
    changed.delete_at = 1_800_000_000_000;
    changed.brands = vec!["kia".to_string(), "kia".to_string()];

    let update = dealers.update(changed, false).unwrap();

    assert_eq!(update.old, saved);
    assert_eq!(update.new.create_at, saved.create_at);
    assert!(update.new.update_at >= saved.update_at);
    assert_eq!(update.new.name, "Acme");
    assert_eq!(update.new.city, "Toronto");
    assert_eq!(update.new.delete_at, 1_800_000_000_000);
    assert_eq!(update.new.brands, vec!["kia"]);
    assert_eq!(dealers.get(&saved.id).unwrap(), update.new);
}

#[test]
fn trusted_update_keeps_caller_fields_but_not_create_at() {
    let store = memory_store();
    let dealers = SqlDealerStore::try_new(&store).unwrap();
    let saved = dealers.save(new_dealer("Acme")).unwrap();

    let mut changed = saved.clone();
    changed.create_at = 1;
    changed.name = "Renamed".to_string();
    changed.phone_number = "+1-555-0199".to_string();

    let update = dealers.update(changed, true).unwrap();

    assert_eq!(update.old, saved);
    assert_eq!(update.new.create_at, saved.create_at);
    assert_eq!(update.new.name, "Renamed");
    assert_eq!(update.new.phone_number, "+1-555-0199");
    assert_eq!(dealers.get(&saved.id).unwrap(), update.new);
}

#[test]
fn update_validation_failure_leaves_row_untouched() {
    let store = memory_store();
    let dealers = SqlDealerStore::try_new(&store).unwrap();
    let saved = dealers.save(new_dealer("Acme")).unwrap();

    let mut changed = saved.clone();
    changed.brands.clear();

    let err = dealers.update(changed, true).unwrap_err();
    assert_eq!(err.kind, ErrorKind::Validation);
    assert_eq!(dealers.get(&saved.id).unwrap(), saved);
}

#[test]
fn update_touching_no_row_is_internal_error() {
    let store = memory_store();
    let dealers = SqlDealerStore::try_new(&store).unwrap();
    let saved = dealers.save(new_dealer("Acme")).unwrap();

    store
        .get_master()
        .execute_batch(
            "CREATE TRIGGER skip_dealer_update BEFORE UPDATE ON Dealer
             BEGIN
                SELECT RAISE(IGNORE);
             END;",
        )
        .unwrap();

    let err = dealers.update(saved.clone(), true).unwrap_err();
    assert_eq!(err.kind, ErrorKind::Internal);
    assert_eq!(err.id, "store.sql_dealer.update.app_error");
    assert_eq!(err.detailed_error, format!("dealer_id={}, count=0", saved.id));
}

#[test]
fn file_store_reads_through_read_only_replicas() {
    let dir = tempfile::tempdir().unwrap();
    let settings = SqlSettings {
        replica_count: 2,
        ..SqlSettings::file(dir.path().join("dealers.db"))
    };
    let store = SqlStore::open(&settings).unwrap();
    assert_eq!(store.replica_count(), 2);

    let dealers = SqlDealerStore::try_new(&store).unwrap();
    let saved = dealers.save(new_dealer("Acme")).unwrap();

    assert_eq!(dealers.get(&saved.id).unwrap(), saved);
    assert_eq!(dealers.get(&saved.id).unwrap(), saved);
    assert_eq!(dealers.get_all().unwrap(), vec![saved]);

    let write_err = store.get_replica().execute("DELETE FROM Dealer;", []);
    assert!(write_err.is_err());
    assert_eq!(dealer_count(&store), 1);
}

#[test]
fn memory_store_reads_from_master() {
    let store = SqlStore::open(&SqlSettings {
        replica_count: 3,
        ..SqlSettings::in_memory()
    })
    .unwrap();
    assert_eq!(store.replica_count(), 0);
    assert!(std::ptr::eq(store.get_replica(), store.get_master()));
}

#[test]
fn store_rejects_connection_without_dealer_table() {
    let store = SqlStore::from_connections(Connection::open_in_memory().unwrap(), Vec::new());

    let err = match SqlDealerStore::try_new(&store) {
        Ok(_) => panic!("expected missing table error"),
        Err(err) => err,
    };
    assert_eq!(err.kind, ErrorKind::Internal);
    assert_eq!(err.id, "store.sql_dealer.missing_table.app_error");
}
