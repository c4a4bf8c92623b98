mod common;

use asset_db::OperationError;
use asset_db_types::*;
use common::{count, empty_db};
use uuid::Uuid;

struct Fixture {
    db: asset_db::AssetDatabaseConnection,
    builder1: Uuid,
    builder2: Uuid,
    file1: Uuid,
    file2: Uuid,
}

/// builder1 records that file1 depends on two files; builder2 records one
/// dependency for file1 and one job dependency for file2.
fn fixture() -> Fixture {
    let db = empty_db();
    let builder1 = Uuid::new_v4();
    let builder2 = Uuid::new_v4();
    let file1 = Uuid::new_v4();
    let file2 = Uuid::new_v4();

    let mut entries = vec![
        SourceFileDependencyEntry::new(
            builder1,
            file1,
            "file1dependson1.txt",
            SourceDependencyType::SOURCE_TO_SOURCE,
            false,
            "",
        ),
        SourceFileDependencyEntry::new(
            builder1,
            file1,
            "file1dependson2.txt",
            SourceDependencyType::SOURCE_TO_SOURCE,
            false,
            "",
        ),
        SourceFileDependencyEntry::new(
            builder2,
            file1,
            "file1dependson1builder2.txt",
            SourceDependencyType::SOURCE_TO_SOURCE,
            false,
            "",
        ),
        SourceFileDependencyEntry::new(
            builder2,
            file2,
            "file2dependson1.txt",
            SourceDependencyType::JOB_TO_JOB,
            false,
            "1,2",
        ),
    ];
    db.set_source_file_dependencies(&mut entries).unwrap();

    Fixture {
        db,
        builder1,
        builder2,
        file1,
        file2,
    }
}

fn names(entries: &[SourceFileDependencyEntry]) -> Vec<String> {
    entries.iter().map(|e| e.depends_on_source.to_string()).collect()
}

#[test]
fn forward_lookup_by_builder() {
    let f = fixture();
    let deps = f
        .db
        .get_source_file_dependencies_by_builder_guid_and_source(
            f.builder1,
            f.file1,
            SourceDependencyType::SOURCE_TO_SOURCE,
        )
        .unwrap();
    assert_eq!(names(&deps), vec!["file1dependson1.txt", "file1dependson2.txt"]);

    let deps = f
        .db
        .get_source_file_dependencies_by_builder_guid_and_source(
            f.builder2,
            f.file1,
            SourceDependencyType::ANY,
        )
        .unwrap();
    assert_eq!(names(&deps), vec!["file1dependson1builder2.txt"]);

    assert!(f
        .db
        .get_source_file_dependencies_by_builder_guid_and_source(
            f.builder1,
            f.file1,
            SourceDependencyType::JOB_TO_JOB,
        )
        .unwrap()
        .is_empty());
}

#[test]
fn forward_lookup_any_builder() {
    let f = fixture();
    let deps = f
        .db
        .get_depends_on_source_by_source(f.file1, SourceDependencyType::ANY)
        .unwrap();
    assert_eq!(deps.len(), 3);

    let deps = f
        .db
        .get_depends_on_source_by_source(f.file2, SourceDependencyType::SOURCE_OR_JOB)
        .unwrap();
    assert_eq!(names(&deps), vec!["file2dependson1.txt"]);
    assert_eq!(deps[0].sub_ids, "1,2");
    assert_eq!(deps[0].builder_guid, f.builder2);
}

#[test]
fn reverse_lookup_by_path_or_uuid() {
    let f = fixture();
    let deps = f
        .db
        .get_source_file_dependencies_by_depends_on_source(
            Uuid::new_v4(),
            "file1dependson1.txt",
            "c:/dev/file1dependson1.txt",
            SourceDependencyType::SOURCE_TO_SOURCE,
        )
        .unwrap();
    assert_eq!(deps.len(), 1);
    assert_eq!(deps[0].source_guid, f.file1);
    assert_eq!(deps[0].builder_guid, f.builder1);

    // The job dependency on file2dependson1.txt is not a source dependency
    assert!(f
        .db
        .get_source_file_dependencies_by_depends_on_source(
            Uuid::new_v4(),
            "file2dependson1.txt",
            "",
            SourceDependencyType::SOURCE_TO_SOURCE,
        )
        .unwrap()
        .is_empty());
    // and nothing depends on file1dependson1.txt by job
    assert!(f
        .db
        .get_source_file_dependencies_by_depends_on_source(
            Uuid::new_v4(),
            "file1dependson1.txt",
            "",
            SourceDependencyType::JOB_TO_JOB,
        )
        .unwrap()
        .is_empty());
}

#[test]
fn reverse_lookup_matches_uuid_dependencies() {
    let f = fixture();
    let target = Uuid::new_v4();
    let mut by_uuid = SourceFileDependencyEntry::new(
        f.builder1,
        f.file2,
        target,
        SourceDependencyType::SOURCE_TO_SOURCE,
        true,
        "",
    );
    f.db.set_source_file_dependency(&mut by_uuid).unwrap();

    let deps = f
        .db
        .get_source_file_dependencies_by_depends_on_source(
            target,
            "unrelated.txt",
            "c:/unrelated.txt",
            SourceDependencyType::ANY,
        )
        .unwrap();
    assert_eq!(deps, vec![by_uuid]);
    assert_eq!(deps[0].depends_on_source.uuid(), Some(target));
}

#[test]
fn wildcard_reverse_lookup() {
    let f = fixture();
    let mut wildcard = SourceFileDependencyEntry::new(
        f.builder1,
        f.file2,
        "%.png",
        SourceDependencyType::SOURCE_LIKE_MATCH,
        false,
        "",
    );
    f.db.set_source_file_dependency(&mut wildcard).unwrap();

    let plain = f
        .db
        .get_source_file_dependencies_by_depends_on_source(
            Uuid::new_v4(),
            "textures/rock.png",
            "c:/dev/textures/rock.png",
            SourceDependencyType::ANY,
        )
        .unwrap();
    assert!(plain.iter().all(|d| d.source_dependency_id != wildcard.source_dependency_id));

    let matched = f
        .db
        .get_source_file_dependencies_by_depends_on_source_wildcard(
            Uuid::new_v4(),
            "textures/rock.png",
            "c:/dev/textures/rock.png",
            SourceDependencyType::SOURCE_TO_SOURCE,
        )
        .unwrap();
    assert_eq!(matched, vec![wildcard]);

    let unmatched = f
        .db
        .get_source_file_dependencies_by_depends_on_source_wildcard(
            Uuid::new_v4(),
            "textures/rock.tga",
            "c:/dev/textures/rock.tga",
            SourceDependencyType::SOURCE_TO_SOURCE,
        )
        .unwrap();
    assert!(unmatched.is_empty());
}

#[test]
fn removal_by_id() {
    let f = fixture();
    let deps = f
        .db
        .get_depends_on_source_by_source(f.file1, SourceDependencyType::ANY)
        .unwrap();

    assert!(f.db.remove_source_file_dependency(deps[0].source_dependency_id).unwrap());
    assert!(!f.db.remove_source_file_dependency(deps[0].source_dependency_id).unwrap());
    assert!(f
        .db
        .get_source_file_dependency_by_id(deps[0].source_dependency_id)
        .unwrap()
        .is_none());

    f.db.remove_source_file_dependencies(&deps[1..]).unwrap();
    assert!(f
        .db
        .get_depends_on_source_by_source(f.file1, SourceDependencyType::ANY)
        .unwrap()
        .is_empty());

    // Already removed: nothing is deleted
    let remaining = count(&f.db, "SourceDependency");
    let err = f.db.remove_source_file_dependencies(&deps).unwrap_err();
    assert!(matches!(err, OperationError::NotFound { .. }));
    assert_eq!(count(&f.db, "SourceDependency"), remaining);
}

#[test]
fn batch_insert_scales() {
    let db = empty_db();
    let builder = Uuid::new_v4();
    let source = Uuid::new_v4();
    let mut entries: Vec<_> = (0..20_000)
        .map(|i| {
            SourceFileDependencyEntry::new(
                builder,
                source,
                format!("dependency{i}.txt").as_str(),
                SourceDependencyType::SOURCE_TO_SOURCE,
                false,
                "",
            )
        })
        .collect();
    db.set_source_file_dependencies(&mut entries).unwrap();

    assert!(entries.iter().all(|e| e.source_dependency_id != INVALID_ENTRY_ID));
    assert_eq!(count(&db, "SourceDependency"), 20_000);
    let stored = db
        .get_source_file_dependency_by_id(entries[19_999].source_dependency_id)
        .unwrap();
    assert_eq!(stored, Some(entries[19_999].clone()));
}
