mod common;

use std::ops::ControlFlow;

use asset_db::OperationError;
use asset_db_types::*;
use common::{count, coverage};
use uuid::Uuid;

const FLAGS: u64 = 0xFAA0_FEEE;

fn dependency(product_pk: i64, guid: Uuid, sub_id: u32) -> ProductDependencyEntry {
    ProductDependencyEntry::new(
        product_pk,
        guid,
        sub_id,
        DependencyFlags::from_bits(FLAGS),
        "somePlatform",
        true,
    )
    .with_unresolved_path("unresolved/dependency.txt")
}

#[test]
fn single_dependency_round_trip() {
    let c = coverage();
    let mut dep = dependency(c.product1.product_id, c.source2.source_guid, 3);
    c.db.set_product_dependency(&mut dep).unwrap();
    assert_ne!(dep.product_dependency_id, INVALID_ENTRY_ID);

    let stored = c.db.get_product_dependency_by_id(dep.product_dependency_id).unwrap();
    assert_eq!(stored, Some(dep.clone()));
    assert_eq!(stored.unwrap().dependency_flags.bits(), FLAGS);
}

#[test]
fn equal_dependency_is_reused() {
    let c = coverage();
    let mut first = dependency(c.product1.product_id, c.source2.source_guid, 3);
    c.db.set_product_dependency(&mut first).unwrap();

    let mut second = dependency(c.product1.product_id, c.source2.source_guid, 3);
    c.db.set_product_dependency(&mut second).unwrap();

    assert_eq!(second.product_dependency_id, first.product_dependency_id);
    assert_eq!(count(&c.db, "ProductDependencies"), 1);
}

#[test]
fn explicit_id_updates_that_row() {
    let c = coverage();
    let mut dep = dependency(c.product1.product_id, c.source2.source_guid, 3);
    c.db.set_product_dependency(&mut dep).unwrap();

    dep.dependency_sub_id = 4;
    dep.unresolved_path.clear();
    c.db.set_product_dependency(&mut dep).unwrap();

    let stored = c
        .db
        .get_product_dependency_by_id(dep.product_dependency_id)
        .unwrap()
        .unwrap();
    assert_eq!(stored, dep);
    assert_eq!(count(&c.db, "ProductDependencies"), 1);

    let mut ghost = ProductDependencyEntry {
        product_dependency_id: 9999,
        ..dep
    };
    let err = c.db.set_product_dependency(&mut ghost).unwrap_err();
    assert!(matches!(err, OperationError::NotFound { id: 9999, .. }));
}

#[test]
fn all_dependencies_across_products() {
    let c = coverage();
    assert!(c.db.get_product_dependencies().unwrap().is_empty());

    let mut a = dependency(c.product1.product_id, c.source2.source_guid, 1);
    let mut b = dependency(c.product3.product_id, c.source1.source_guid, 2);
    c.db.set_product_dependency(&mut a).unwrap();
    c.db.set_product_dependency(&mut b).unwrap();

    assert_eq!(c.db.get_product_dependencies().unwrap(), vec![a, b]);
}

#[test]
fn dependency_with_missing_product_is_rejected() {
    let c = coverage();
    let mut dep = dependency(9999, c.source2.source_guid, 3);
    let err = c.db.set_product_dependency(&mut dep).unwrap_err();
    assert!(matches!(err, OperationError::ForeignKey { .. }));
    assert_eq!(count(&c.db, "ProductDependencies"), 0);
}

#[test]
fn bulk_replace_shrinks_to_new_set() {
    let c = coverage();
    let guid = Uuid::new_v4();

    let mut original: Vec<_> = (0..100)
        .map(|i| dependency(c.product1.product_id, guid, i))
        .chain((0..100).map(|i| dependency(c.product2.product_id, guid, i)))
        .collect();
    c.db.set_product_dependencies(&mut original).unwrap();
    assert!(original.iter().all(|d| d.product_dependency_id != INVALID_ENTRY_ID));
    assert_eq!(
        c.db.get_product_dependencies_by_product_id(c.product1.product_id)
            .unwrap()
            .len(),
        100
    );

    let changed = Uuid::new_v4();
    let mut replacement: Vec<_> = (0..50)
        .map(|i| {
            ProductDependencyEntry::new(
                c.product1.product_id,
                changed,
                i,
                DependencyFlags::from_bits(FLAGS),
                "somePlatform",
                true,
            )
        })
        .collect();
    c.db.set_product_dependencies(&mut replacement).unwrap();

    let stored = c
        .db
        .get_product_dependencies_by_product_id(c.product1.product_id)
        .unwrap();
    assert_eq!(stored.len(), 50);
    assert!(stored.iter().all(|d| d.dependency_source_guid == changed));
    assert!(stored.iter().all(|d| d.unresolved_path.is_empty()));
    assert_eq!(stored, replacement);

    // The other product's rows are untouched
    assert_eq!(
        c.db.get_product_dependencies_by_product_id(c.product2.product_id)
            .unwrap()
            .len(),
        100
    );
}

#[test]
fn bulk_replace_handles_twenty_thousand_rows() {
    let c = coverage();
    let guid = Uuid::new_v4();
    let mut batch: Vec<_> = (0..20_000)
        .map(|i| dependency(c.product1.product_id, guid, i))
        .collect();
    c.db.set_product_dependencies(&mut batch).unwrap();

    let stored = c
        .db
        .get_product_dependencies_by_product_id(c.product1.product_id)
        .unwrap();
    assert_eq!(stored.len(), 20_000);
    assert_eq!(stored, batch);
}

#[test]
fn bulk_replace_rejects_empty_batch_and_rolls_back() {
    let c = coverage();
    assert!(matches!(
        c.db.set_product_dependencies(&mut []).unwrap_err(),
        OperationError::EmptyInput { .. }
    ));

    let mut existing = vec![dependency(c.product1.product_id, Uuid::new_v4(), 1)];
    c.db.set_product_dependencies(&mut existing).unwrap();

    let mut bad = vec![
        dependency(c.product1.product_id, Uuid::new_v4(), 2),
        dependency(9999, Uuid::new_v4(), 3),
    ];
    assert!(c.db.set_product_dependencies(&mut bad).is_err());
    assert_eq!(
        c.db.get_product_dependencies_by_product_id(c.product1.product_id)
            .unwrap(),
        existing
    );
}

#[test]
fn update_product_dependencies_keeps_siblings() {
    let c = coverage();
    let mut first = vec![dependency(c.product1.product_id, Uuid::new_v4(), 1)];
    c.db.set_product_dependencies(&mut first).unwrap();

    let mut more = vec![
        dependency(c.product1.product_id, Uuid::new_v4(), 2),
        first[0].clone(),
    ];
    c.db.update_product_dependencies(&mut more).unwrap();
    assert_eq!(more[1].product_dependency_id, first[0].product_dependency_id);
    assert_eq!(count(&c.db, "ProductDependencies"), 2);
}

#[test]
fn remove_by_product_id() {
    let c = coverage();
    let mut deps = vec![
        dependency(c.product1.product_id, Uuid::new_v4(), 1),
        dependency(c.product2.product_id, Uuid::new_v4(), 1),
    ];
    c.db.set_product_dependencies(&mut deps).unwrap();

    assert!(c.db.remove_product_dependency_by_product_id(c.product1.product_id).unwrap());
    assert!(!c.db.remove_product_dependency_by_product_id(c.product1.product_id).unwrap());
    assert_eq!(count(&c.db, "ProductDependencies"), 1);

    assert!(c.db.remove_product_dependency(deps[1].product_dependency_id).unwrap());
    assert_eq!(count(&c.db, "ProductDependencies"), 0);
}

#[test]
fn removing_product_cascades_to_dependencies() {
    let c = coverage();
    let mut dep = dependency(c.product1.product_id, Uuid::new_v4(), 1);
    c.db.set_product_dependency(&mut dep).unwrap();
    c.db.remove_product(c.product1.product_id).unwrap();
    assert_eq!(count(&c.db, "ProductDependencies"), 0);
}

// ── Graph Queries ───────────────────────────────────────────────────────────

/// product1 -> product3 -> product4, product2 -> product1.
fn chain(c: &common::Coverage) {
    let mut deps = vec![
        ProductDependencyEntry::new(
            c.product1.product_id,
            c.source2.source_guid,
            3,
            DependencyFlags::default(),
            "pc",
            false,
        ),
        ProductDependencyEntry::new(
            c.product3.product_id,
            c.source2.source_guid,
            4,
            DependencyFlags::default(),
            "pc",
            false,
        ),
        ProductDependencyEntry::new(
            c.product2.product_id,
            c.source1.source_guid,
            1,
            DependencyFlags::default(),
            "pc",
            false,
        ),
    ];
    c.db.set_product_dependencies(&mut deps).unwrap();
}

#[test]
fn direct_product_dependencies() {
    let c = coverage();
    chain(&c);
    assert_eq!(
        c.db.get_direct_product_dependencies(c.product1.product_id).unwrap(),
        vec![c.product3.clone()]
    );
    assert!(c
        .db
        .get_direct_product_dependencies(c.product4.product_id)
        .unwrap()
        .is_empty());
}

#[test]
fn direct_reverse_product_dependencies() {
    let c = coverage();
    chain(&c);
    assert_eq!(
        c.db.get_direct_reverse_product_dependencies_by_source_guid_sub_id(
            c.source2.source_guid,
            3
        )
        .unwrap(),
        vec![c.product1.clone()]
    );
}

#[test]
fn all_product_dependencies_are_transitive() {
    let c = coverage();
    chain(&c);
    assert_eq!(
        c.db.get_all_product_dependencies(c.product2.product_id).unwrap(),
        vec![c.product1.clone(), c.product3.clone(), c.product4.clone()]
    );
    assert!(c
        .db
        .get_all_product_dependencies(c.product4.product_id)
        .unwrap()
        .is_empty());
}

#[test]
fn all_product_dependencies_tolerates_cycles() {
    let c = coverage();
    chain(&c);
    // product4 -> product2 closes the loop
    let mut back = ProductDependencyEntry::new(
        c.product4.product_id,
        c.source1.source_guid,
        2,
        DependencyFlags::default(),
        "pc",
        false,
    );
    c.db.set_product_dependency(&mut back).unwrap();

    let all = c.db.get_all_product_dependencies(c.product1.product_id).unwrap();
    assert_eq!(
        all,
        vec![c.product2.clone(), c.product3.clone(), c.product4.clone()]
    );
}

#[test]
fn dependencies_on_source() {
    let c = coverage();
    chain(&c);
    let deps = c
        .db
        .get_product_dependencies_that_depend_on_source_id(c.source2.source_id)
        .unwrap();
    assert_eq!(deps.len(), 2);
    assert!(deps.iter().all(|d| d.dependency_source_guid == c.source2.source_guid));
}

// ── Unresolved Dependencies ─────────────────────────────────────────────────

#[test]
fn unresolved_dependencies_are_listed() {
    let c = coverage();
    let mut deps = vec![
        dependency(c.product1.product_id, Uuid::nil(), 0),
        ProductDependencyEntry::new(
            c.product1.product_id,
            c.source2.source_guid,
            3,
            DependencyFlags::default(),
            "pc",
            false,
        ),
    ];
    c.db.set_product_dependencies(&mut deps).unwrap();

    let unresolved = c.db.get_unresolved_product_dependencies().unwrap();
    assert_eq!(unresolved, vec![deps[0].clone()]);
}

#[test]
fn unresolved_advanced_matches_wildcards_in_search_order() {
    let c = coverage();
    let mut deps = vec![
        ProductDependencyEntry::new(
            c.product1.product_id,
            Uuid::nil(),
            0,
            DependencyFlags::default(),
            "pc",
            false,
        )
        .with_unresolved_path("*.txt"),
        ProductDependencyEntry::new(
            c.product1.product_id,
            Uuid::nil(),
            0,
            DependencyFlags::default(),
            "pc",
            false,
        )
        .with_unresolved_path("default.xml"),
    ];
    c.db.set_product_dependencies(&mut deps).unwrap();

    let search: Vec<String> = (0..10_000).map(|i| format!("{i}.txt")).collect();
    let mut matched = Vec::new();
    c.db.query_product_dependencies_unresolved_advanced(&search, |entry, path| {
        assert_eq!(entry.unresolved_path, "*.txt");
        matched.push(path.to_string());
        ControlFlow::Continue(())
    })
    .unwrap();
    assert_eq!(matched, search);

    let mut exact = Vec::new();
    c.db.query_product_dependencies_unresolved_advanced(&["DEFAULT.xml", "other.bin"], |entry, path| {
        exact.push((entry.product_dependency_id, path.to_string()));
        ControlFlow::Continue(())
    })
    .unwrap();
    assert_eq!(exact, vec![(deps[1].product_dependency_id, "DEFAULT.xml".to_string())]);
}

#[test]
fn unresolved_advanced_escapes_like_metacharacters() {
    let c = coverage();
    let mut dep = ProductDependencyEntry::new(
        c.product1.product_id,
        Uuid::nil(),
        0,
        DependencyFlags::default(),
        "pc",
        false,
    )
    .with_unresolved_path("textures/*_n.dds");
    c.db.set_product_dependency(&mut dep).unwrap();

    let mut matched = Vec::new();
    c.db.query_product_dependencies_unresolved_advanced(
        &["textures/rock_n.dds", "textures/rockxn.dds"],
        |_, path| {
            matched.push(path.to_string());
            ControlFlow::Continue(())
        },
    )
    .unwrap();
    assert_eq!(matched, vec!["textures/rock_n.dds".to_string()]);
}

#[test]
fn unresolved_advanced_stops_on_break() {
    let c = coverage();
    let mut dep = dependency(c.product1.product_id, Uuid::nil(), 0).with_unresolved_path("*.txt");
    c.db.set_product_dependency(&mut dep).unwrap();

    let mut visits = 0;
    c.db.query_product_dependencies_unresolved_advanced(&["a.txt", "b.txt", "c.txt"], |_, _| {
        visits += 1;
        ControlFlow::Break(())
    })
    .unwrap();
    assert_eq!(visits, 1);

    // The temporary search table is gone and the query can run again
    let mut again = 0;
    c.db.query_product_dependencies_unresolved_advanced(&["a.txt"], |_, _| {
        again += 1;
        ControlFlow::Continue(())
    })
    .unwrap();
    assert_eq!(again, 1);
}
