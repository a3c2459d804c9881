#[cfg(test)]
mod tests {
    use crate::config::StorageKeys;
    use crate::product::ProductData;
    use crate::storage::{FileStorage, MemoryStorage, Storage};
    use crate::store::{CartError, CartStore, MigrationOutcome};

    const MAIN: &str = "ambertruck_cart";
    const LEGACY: &str = "ambertruck_cart_v1";

    fn gasket() -> ProductData {
        ProductData::new("Gasket", "Gasket_1500", 1500.0)
    }

    #[test]
    fn test_same_sku_aggregates() {
        let mut store = CartStore::new(MemoryStorage::new());
        for _ in 0..4 {
            store.add(&gasket()).unwrap();
        }
        store.add(&ProductData::new("Bolt", "B-1", 10.0)).unwrap();

        let cart = store.get_cart();
        assert_eq!(cart.len(), 2);
        assert_eq!(cart.items().iter().filter(|i| i.sku() == "Gasket_1500").count(), 1);
        assert_eq!(cart.find("Gasket_1500").unwrap().qty(), 4);
        assert_eq!(cart.find("B-1").unwrap().qty(), 1);
    }

    #[test]
    fn test_add_visible_to_fresh_store() {
        let mut storage = MemoryStorage::new();
        {
            let mut store = CartStore::new(&mut storage);
            store.load().unwrap();
            store.add(&gasket()).unwrap();
        }

        let mut store = CartStore::new(&mut storage);
        let cart = store.load().unwrap();
        let item = cart.find("Gasket_1500").unwrap();
        assert_eq!(item.name(), "Gasket");
        assert_eq!(item.price(), 1500.0);
        assert_eq!(item.qty(), 1);
    }

    #[test]
    fn test_rejected_add_leaves_storage_untouched() {
        let storage = MemoryStorage::new()
            .with_item(MAIN, r#"[{"name":"Bolt","sku":"B-1","price":10,"qty":1}]"#);
        let mut store = CartStore::new(storage);
        let before = store.storage().get_item(MAIN);

        let err = store
            .add(&ProductData::new("", "x", 100.0))
            .unwrap_err();
        assert!(matches!(err, CartError::MissingProductData(ref p) if p.price == 100.0));

        let err = store
            .add(&ProductData::new("Nut", "N-1", f64::NAN))
            .unwrap_err();
        assert!(matches!(err, CartError::MissingProductData(_)));

        assert_eq!(store.storage().get_item(MAIN), before);
    }

    #[test]
    fn test_existing_bad_qty_counts_as_one() {
        let storage = MemoryStorage::new()
            .with_item(MAIN, r#"[{"name":"Bolt","sku":"B-1","price":10,"qty":"lots"}]"#);
        let mut store = CartStore::new(storage);
        store.add(&ProductData::new("Bolt", "B-1", 10.0)).unwrap();
        assert_eq!(store.get_cart().find("B-1").unwrap().qty(), 2);
    }

    #[test]
    fn test_extra_fields_survive_add() {
        let storage = MemoryStorage::new().with_item(
            MAIN,
            r#"[{"name":"Bolt","sku":"B-1","price":10,"qty":1,"img":"bolt.png"}]"#,
        );
        let mut store = CartStore::new(storage);
        store.add(&gasket()).unwrap();

        let raw = store.storage().get_item(MAIN).unwrap();
        assert!(raw.contains(r#""img":"bolt.png""#));
        assert_eq!(store.get_cart().len(), 2);
    }

    #[test]
    fn test_add_keeps_other_lines_verbatim() {
        let storage = MemoryStorage::new().with_item(
            MAIN,
            r#"[{"name":"Pump","sku":"P","price":"6 720 ₽","qty":1},{"name":"Cap","sku":"C","qty":"2"}]"#,
        );
        let mut store = CartStore::new(storage);
        store.add(&ProductData::new("Bolt", "B", 10.0)).unwrap();

        let raw = store.storage().get_item(MAIN).unwrap();
        let stored: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(
            stored,
            serde_json::json!([
                {"name":"Pump","sku":"P","price":"6 720 ₽","qty":1},
                {"name":"Cap","sku":"C","qty":"2"},
                {"name":"Bolt","sku":"B","price":10.0,"qty":1}
            ])
        );

        let cart = store.get_cart();
        assert_eq!(cart.find("P").unwrap().line_total(), 6720.0);
        assert_eq!(cart.grand_total(), 6730.0);
    }

    #[test]
    fn test_legacy_migration() {
        let storage = MemoryStorage::new()
            .with_item(LEGACY, r#"{"a":{"name":"Bolt","price":"10","qty":"2"}}"#);
        let mut store = CartStore::new(storage);

        let outcome = store.migrate_if_needed().unwrap();
        assert_eq!(outcome, MigrationOutcome::Migrated { items: 1, dropped: 0 });

        let cart = store.get_cart();
        assert_eq!(cart.len(), 1);
        let bolt = &cart.items()[0];
        assert_eq!(bolt.name(), "Bolt");
        assert_eq!(bolt.sku(), "Bolt__10");
        assert_eq!(bolt.price(), 10.0);
        assert_eq!(bolt.qty(), 2);

        // the legacy record stays where it was
        assert!(store.storage().get_item(LEGACY).is_some());
    }

    #[test]
    fn test_migration_is_idempotent() {
        let storage = MemoryStorage::new().with_item(
            LEGACY,
            r#"{"x":{"name":"Bolt","price":10},"y":{"sku":"S-9","price":"abc"},"z":{"price":5}}"#,
        );
        let mut store = CartStore::new(storage);

        let first = store.migrate_if_needed().unwrap();
        let after_first = store.storage().get_item(MAIN);
        let second = store.migrate_if_needed().unwrap();

        assert_eq!(first, MigrationOutcome::Migrated { items: 2, dropped: 1 });
        assert_eq!(second, MigrationOutcome::AlreadyCanonical);
        assert_eq!(store.storage().get_item(MAIN), after_first);
    }

    #[test]
    fn test_migration_field_defaults() {
        let storage = MemoryStorage::new().with_item(
            LEGACY,
            r#"{"y":{"sku":"S-9","price":"abc"},"z":{"price":5},"w":null,"v":{"name":"Cap","price":7.5,"qty":0}}"#,
        );
        let mut store = CartStore::new(storage);
        let cart = store.load().unwrap();

        let s9 = cart.find("S-9").unwrap();
        assert_eq!(s9.name(), "S-9");
        assert_eq!(s9.price(), 0.0);
        assert_eq!(s9.qty(), 1);

        let cap = cart.find("Cap__7.5").unwrap();
        assert_eq!(cap.price(), 7.5);
        assert_eq!(cap.qty(), 1);

        assert_eq!(cart.len(), 2);
    }

    #[test]
    fn test_initializes_empty_cart() {
        let mut store = CartStore::new(MemoryStorage::new());
        assert_eq!(store.migrate_if_needed().unwrap(), MigrationOutcome::Initialized);
        assert_eq!(store.storage().get_item(MAIN).as_deref(), Some("[]"));
        assert_eq!(store.migrate_if_needed().unwrap(), MigrationOutcome::AlreadyCanonical);
    }

    #[test]
    fn test_malformed_data_is_absent() {
        let storage = MemoryStorage::new()
            .with_item(MAIN, "{not json")
            .with_item(LEGACY, "[broken");
        let mut store = CartStore::new(storage);

        assert!(store.get_cart().is_empty());
        assert_eq!(store.migrate_if_needed().unwrap(), MigrationOutcome::Initialized);
        assert!(store.load().unwrap().is_empty());
    }

    #[test]
    fn test_canonical_object_is_not_canonical() {
        let storage = MemoryStorage::new()
            .with_item(MAIN, r#"{"oops":true}"#)
            .with_item(LEGACY, r#"{"a":{"name":"Bolt","price":10}}"#);
        let mut store = CartStore::new(storage);
        let cart = store.load().unwrap();
        assert_eq!(cart.items()[0].sku(), "Bolt__10");
    }

    #[test]
    fn test_custom_keys() {
        let keys = StorageKeys {
            main: "shop_cart".to_string(),
            legacy: "shop_cart_old".to_string(),
        };
        let mut store = CartStore::with_keys(MemoryStorage::new(), keys);
        store.add(&gasket()).unwrap();
        assert!(store.storage().get_item("shop_cart").is_some());
        assert!(store.storage().get_item(MAIN).is_none());
    }

    #[test]
    fn test_file_backed_store_persists() {
        let dir = tempfile::tempdir().unwrap();
        {
            let mut store = CartStore::new(FileStorage::open(dir.path()).unwrap());
            store.load().unwrap();
            store.add(&gasket()).unwrap();
            store.add(&gasket()).unwrap();
        }

        let mut store = CartStore::new(FileStorage::open(dir.path()).unwrap());
        let cart = store.load().unwrap();
        assert_eq!(cart.find("Gasket_1500").unwrap().qty(), 2);
    }
}
