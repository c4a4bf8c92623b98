mod common;

use asset_db::{OperationError, ProductFilter};
use asset_db_types::*;
use common::{count, coverage};
use uuid::Uuid;

#[test]
fn product_round_trip() {
    let c = coverage();
    let stored = c.db.get_product_by_id(c.product1.product_id).unwrap();
    assert_eq!(stored, Some(c.product1.clone()));
    assert_eq!(
        c.db.get_product_by_job_id_sub_id(c.job2.job_id, 4).unwrap(),
        Some(c.product4.clone())
    );
    assert_eq!(
        c.db.get_product_by_source_guid_sub_id(c.source1.source_guid, 2).unwrap(),
        Some(c.product2.clone())
    );
    assert!(c.db.get_product_by_id(9999).unwrap().is_none());
}

#[test]
fn resubmitting_job_and_sub_id_updates_in_place() {
    let c = coverage();
    let mut again = ProductEntry::new(c.job1.job_id, 1, "renamed.dds", Uuid::new_v4());
    again.hash = 0xDEAD_BEEF;
    again.flags = ProductOutputFlags::INTERMEDIATE_ASSET;
    c.db.set_product(&mut again).unwrap();

    assert_eq!(again.product_id, c.product1.product_id);
    assert_eq!(count(&c.db, "Products"), 4);
    let stored = c.db.get_product_by_id(again.product_id).unwrap().unwrap();
    assert_eq!(stored, again);
}

#[test]
fn setting_same_product_twice_is_idempotent() {
    let c = coverage();
    let mut same = c.product2.clone();
    c.db.set_product(&mut same).unwrap();
    assert_eq!(same, c.product2);
    assert_eq!(count(&c.db, "Products"), 4);
}

#[test]
fn product_with_missing_job_is_rejected() {
    let db = common::empty_db();
    let mut product = ProductEntry::new(1234, 1, "orphan.dds", Uuid::new_v4());
    let err = db.set_product(&mut product).unwrap_err();
    assert!(matches!(err, OperationError::ForeignKey { .. }));
    assert_eq!(product.product_id, INVALID_ENTRY_ID);
    assert_eq!(count(&db, "Products"), 0);
}

#[test]
fn explicit_missing_product_id_is_not_found() {
    let c = coverage();
    let mut product = ProductEntry {
        product_id: 9999,
        ..c.product1.clone()
    };
    let err = c.db.set_product(&mut product).unwrap_err();
    assert!(matches!(err, OperationError::NotFound { id: 9999, .. }));
}

#[test]
fn filters_narrow_independently() {
    let c = coverage();
    let db = &c.db;
    let source = c.source1.source_id;

    let exact = ProductFilter::any()
        .builder_guid(c.job1.builder_guid)
        .job_key("some job key")
        .platform("pc")
        .status(JobStatus::Completed);
    let products = db.get_products_by_source_id(source, &exact).unwrap();
    assert_eq!(products, vec![c.product1.clone(), c.product2.clone()]);

    let wrong_builder = exact.clone().builder_guid(Uuid::new_v4());
    assert!(db.get_products_by_source_id(source, &wrong_builder).unwrap().is_empty());

    let wrong_key = exact.clone().job_key("other key");
    assert!(db.get_products_by_source_id(source, &wrong_key).unwrap().is_empty());

    let wrong_platform = exact.clone().platform("osx");
    assert!(db.get_products_by_source_id(source, &wrong_platform).unwrap().is_empty());

    let wrong_status = exact.clone().status(JobStatus::Failed);
    assert!(db.get_products_by_source_id(source, &wrong_status).unwrap().is_empty());

    // A nil builder guid does not filter
    let nil_builder = exact.builder_guid(Uuid::nil());
    assert_eq!(db.get_products_by_source_id(source, &nil_builder).unwrap().len(), 2);
}

#[test]
fn product_queries_by_name() {
    let c = coverage();
    let db = &c.db;
    let any = ProductFilter::any();

    assert_eq!(db.get_products(&any).unwrap().len(), 4);
    assert_eq!(
        db.get_products(&ProductFilter::any().platform("osx")).unwrap(),
        vec![c.product3.clone(), c.product4.clone()]
    );
    assert_eq!(
        db.get_products_by_job_id(c.job1.job_id).unwrap(),
        vec![c.product1.clone(), c.product2.clone()]
    );
    assert_eq!(
        db.get_products_by_source_name("otherfile.tif", &any).unwrap(),
        vec![c.product3.clone(), c.product4.clone()]
    );
    assert_eq!(
        db.get_products_by_product_name("someproduct3.dds", &any).unwrap(),
        vec![c.product3.clone()]
    );
    assert_eq!(
        db.get_products_like_product_name("someproduct", LikeType::StartsWith, &any)
            .unwrap()
            .len(),
        4
    );
    assert_eq!(
        db.get_products_like_product_name("4.dds", LikeType::EndsWith, &any)
            .unwrap(),
        vec![c.product4.clone()]
    );
    assert_eq!(
        db.get_products_like_source_name("some", LikeType::StartsWith, &any)
            .unwrap(),
        vec![c.product1.clone(), c.product2.clone()]
    );
    assert!(db
        .get_products_like_source_name("some", LikeType::StartsWith, &ProductFilter::any().platform("osx"))
        .unwrap()
        .is_empty());
}

#[test]
fn set_products_is_all_or_nothing() {
    let c = coverage();
    let mut batch = vec![
        ProductEntry::new(c.job1.job_id, 10, "a.dds", Uuid::new_v4()),
        ProductEntry::new(5555, 11, "b.dds", Uuid::new_v4()),
    ];
    let err = c.db.set_products(&mut batch).unwrap_err();
    assert!(matches!(err, OperationError::ForeignKey { .. }));
    assert_eq!(count(&c.db, "Products"), 4);
    assert!(batch.iter().all(|p| !p.is_persisted()));

    batch[1].job_pk = c.job2.job_id;
    c.db.set_products(&mut batch).unwrap();
    assert!(batch.iter().all(|p| p.is_persisted()));
    assert_eq!(count(&c.db, "Products"), 6);
}

#[test]
fn empty_batches_are_rejected() {
    let c = coverage();
    assert!(matches!(
        c.db.set_products(&mut []).unwrap_err(),
        OperationError::EmptyInput { .. }
    ));
    assert!(matches!(
        c.db.remove_products(&mut []).unwrap_err(),
        OperationError::EmptyInput { .. }
    ));
}

#[test]
fn remove_products_clears_ids() {
    let c = coverage();
    let mut batch = vec![c.product1.clone(), c.product3.clone()];
    c.db.remove_products(&mut batch).unwrap();
    assert!(batch.iter().all(|p| p.product_id == INVALID_ENTRY_ID));
    assert_eq!(count(&c.db, "Products"), 2);
}

#[test]
fn remove_products_rejects_invalid_and_missing_ids() {
    let c = coverage();

    let mut invalid = vec![c.product1.clone(), ProductEntry::default()];
    let err = c.db.remove_products(&mut invalid).unwrap_err();
    assert!(matches!(err, OperationError::InvalidId { .. }));
    assert_eq!(count(&c.db, "Products"), 4);

    let mut missing = vec![
        c.product1.clone(),
        ProductEntry {
            product_id: 9999,
            ..c.product2.clone()
        },
    ];
    let err = c.db.remove_products(&mut missing).unwrap_err();
    assert!(matches!(err, OperationError::NotFound { id: 9999, .. }));
    assert_eq!(count(&c.db, "Products"), 4);
    assert_eq!(missing[0].product_id, c.product1.product_id);
}

#[test]
fn remove_products_by_job_id() {
    let c = coverage();
    assert!(c.db.remove_products_by_job_id(c.job1.job_id).unwrap());
    assert_eq!(
        c.db.get_products(&ProductFilter::any()).unwrap(),
        vec![c.product3.clone(), c.product4.clone()]
    );
    assert!(!c.db.remove_products_by_job_id(c.job1.job_id).unwrap());
}

#[test]
fn remove_products_by_source_id_honors_filters() {
    let c = coverage();
    let db = &c.db;

    let wrong_platform = ProductFilter::any().platform("osx");
    assert!(!db.remove_products_by_source_id(c.source1.source_id, &wrong_platform).unwrap());
    assert_eq!(count(db, "Products"), 4);

    assert!(db
        .remove_products_by_source_id(c.source1.source_id, &ProductFilter::any())
        .unwrap());
    assert_eq!(count(db, "Products"), 2);
    assert!(db.get_product_by_id(c.product3.product_id).unwrap().is_some());
}

#[test]
fn remove_single_product() {
    let c = coverage();
    assert!(c.db.remove_product(c.product4.product_id).unwrap());
    assert!(!c.db.remove_product(c.product4.product_id).unwrap());
    assert_eq!(count(&c.db, "Products"), 3);
}

#[test]
fn legacy_sub_ids_create_update_remove() {
    let c = coverage();
    let db = &c.db;

    let mut legacy = LegacySubIdEntry::new(c.product1.product_id, 100);
    db.create_or_update_legacy_sub_id(&mut legacy).unwrap();
    assert_ne!(legacy.sub_ids_entry_id, INVALID_ENTRY_ID);

    legacy.sub_id = 200;
    db.create_or_update_legacy_sub_id(&mut legacy).unwrap();
    assert_eq!(
        db.get_legacy_sub_ids_by_product_id(c.product1.product_id).unwrap(),
        vec![legacy.clone()]
    );

    let mut ghost = LegacySubIdEntry {
        sub_ids_entry_id: 9999,
        ..legacy.clone()
    };
    let err = db.create_or_update_legacy_sub_id(&mut ghost).unwrap_err();
    assert!(matches!(err, OperationError::NotFound { .. }));

    let mut orphan = LegacySubIdEntry::new(9999, 1);
    let err = db.create_or_update_legacy_sub_id(&mut orphan).unwrap_err();
    assert!(matches!(err, OperationError::ForeignKey { .. }));

    assert!(db.remove_legacy_sub_ids_by_product_id(c.product1.product_id).unwrap());
    assert!(db
        .get_legacy_sub_ids_by_product_id(c.product1.product_id)
        .unwrap()
        .is_empty());
}
