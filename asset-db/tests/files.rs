mod common;

use asset_db::OperationError;
use asset_db_types::*;
use common::{count, coverage};

fn file(scan_folder_pk: i64, name: &str, mod_time: u64, hash: u64) -> FileEntry {
    FileEntry {
        mod_time,
        hash,
        ..FileEntry::new(scan_folder_pk, name)
    }
}

#[test]
fn insert_file_reports_unchanged_rows() {
    let c = coverage();
    let folder = c.scan_folder.scan_folder_id;

    let mut first = file(folder, "textures/rock.tif", 10, 100);
    assert!(!c.db.insert_file(&mut first).unwrap());
    assert!(first.is_persisted());

    let mut same = file(folder, "textures/rock.tif", 10, 100);
    assert!(c.db.insert_file(&mut same).unwrap());
    assert_eq!(same, first);
    assert_eq!(count(&c.db, "Files"), 1);
}

#[test]
fn insert_file_updates_existing_row_by_name() {
    let c = coverage();
    let folder = c.scan_folder.scan_folder_id;

    let mut first = file(folder, "textures/rock.tif", 10, 100);
    c.db.insert_file(&mut first).unwrap();

    let mut changed = file(folder, "textures/rock.tif", 99, 999);
    assert!(!c.db.insert_file(&mut changed).unwrap());
    assert_eq!(changed.file_id, first.file_id);
    assert_eq!(count(&c.db, "Files"), 1);

    let stored = c.db.get_file_by_id(first.file_id).unwrap().unwrap();
    assert_eq!(stored.mod_time, 99);
    assert_eq!(stored.hash, 999);
}

#[test]
fn insert_file_with_id_renames_that_row() {
    let c = coverage();
    let folder = c.scan_folder.scan_folder_id;

    let mut original = file(folder, "old.txt", 1, 1);
    c.db.insert_file(&mut original).unwrap();

    let mut renamed = FileEntry {
        file_name: "new.txt".to_string(),
        ..original.clone()
    };
    assert!(!c.db.insert_file(&mut renamed).unwrap());
    assert_eq!(renamed.file_id, original.file_id);
    assert_eq!(count(&c.db, "Files"), 1);
    assert_eq!(c.db.get_file_by_id(original.file_id).unwrap(), Some(renamed));
    assert!(c
        .db
        .get_file_by_file_name_and_scan_folder_id("old.txt", folder)
        .unwrap()
        .is_none());
}

#[test]
fn insert_file_with_unknown_id_is_not_found() {
    let c = coverage();
    let mut ghost = FileEntry {
        file_id: 9999,
        ..file(c.scan_folder.scan_folder_id, "ghost.txt", 0, 0)
    };
    let err = c.db.insert_file(&mut ghost).unwrap_err();
    assert!(matches!(err, OperationError::NotFound { id: 9999, .. }));
    assert_eq!(ghost.file_id, 9999);
    assert_eq!(count(&c.db, "Files"), 0);
}

#[test]
fn insert_file_needs_a_scan_folder() {
    let c = coverage();
    let mut orphan = file(9999, "a.txt", 0, 0);
    let err = c.db.insert_file(&mut orphan).unwrap_err();
    assert!(matches!(err, OperationError::ForeignKey { .. }));
    assert!(!orphan.is_persisted());
}

#[test]
fn insert_files_batch() {
    let c = coverage();
    let folder = c.scan_folder.scan_folder_id;
    let mut existing = file(folder, "b.txt", 1, 1);
    c.db.insert_file(&mut existing).unwrap();

    let mut batch = vec![
        file(folder, "a.txt", 2, 2),
        file(folder, "b.txt", 3, 3),
        FileEntry {
            is_folder: true,
            ..file(folder, "dir", 0, 0)
        },
    ];
    c.db.insert_files(&mut batch).unwrap();
    assert!(batch.iter().all(|f| f.is_persisted()));
    assert_eq!(batch[1].file_id, existing.file_id);
    assert_eq!(count(&c.db, "Files"), 3);
    assert_eq!(c.db.get_file_by_id(existing.file_id).unwrap(), Some(batch[1].clone()));
    assert_eq!(c.db.get_files_by_scan_folder_id(folder).unwrap().len(), 3);

    assert!(matches!(
        c.db.insert_files(&mut []).unwrap_err(),
        OperationError::EmptyInput { .. }
    ));
}

#[test]
fn insert_files_rolls_back_on_failure() {
    let c = coverage();
    let mut batch = vec![
        file(c.scan_folder.scan_folder_id, "a.txt", 0, 0),
        file(9999, "b.txt", 0, 0),
    ];
    assert!(c.db.insert_files(&mut batch).is_err());
    assert!(batch.iter().all(|f| !f.is_persisted()));
    assert_eq!(count(&c.db, "Files"), 0);
}

#[test]
fn update_file_by_id_or_name() {
    let c = coverage();
    let folder = c.scan_folder.scan_folder_id;
    let mut stored = file(folder, "a.txt", 1, 1);
    c.db.insert_file(&mut stored).unwrap();

    let mut by_id = FileEntry {
        hash: 42,
        ..stored.clone()
    };
    assert!(c.db.update_file(&mut by_id).unwrap());
    assert_eq!(c.db.get_file_by_id(stored.file_id).unwrap(), Some(by_id.clone()));

    let mut by_name = file(folder, "a.txt", 7, 8);
    assert!(c.db.update_file(&mut by_name).unwrap());
    assert_eq!(by_name.file_id, stored.file_id);
    assert_eq!(c.db.get_file_by_id(stored.file_id).unwrap(), Some(by_name));

    let mut unknown = file(folder, "nope.txt", 0, 0);
    assert!(!c.db.update_file(&mut unknown).unwrap());
    assert!(!unknown.is_persisted());
}

#[test]
fn update_mod_time_and_hash_by_name() {
    let c = coverage();
    let folder = c.scan_folder.scan_folder_id;
    let mut stored = file(folder, "a.txt", 1, 1);
    c.db.insert_file(&mut stored).unwrap();

    assert!(c
        .db
        .update_file_mod_time_and_hash_by_file_name_and_scan_folder_id("a.txt", folder, 50, u64::MAX)
        .unwrap());
    let updated = c
        .db
        .get_file_by_file_name_and_scan_folder_id("a.txt", folder)
        .unwrap()
        .unwrap();
    assert_eq!(updated.mod_time, 50);
    assert_eq!(updated.hash, u64::MAX);

    assert!(!c
        .db
        .update_file_mod_time_and_hash_by_file_name_and_scan_folder_id("b.txt", folder, 1, 1)
        .unwrap());
}

#[test]
fn file_lookups() {
    let c = coverage();
    let folder = c.scan_folder.scan_folder_id;
    let mut other = ScanFolderEntry::new("c:/O3DE/other", "other", "otherkey", false);
    c.db.set_scan_folder(&mut other).unwrap();

    let mut entries = vec![
        file(folder, "textures/rock.tif", 0, 0),
        file(folder, "textures/grass.tif", 0, 0),
        file(folder, "models/rock.fbx", 0, 0),
        file(other.scan_folder_id, "textures/rock.tif", 0, 0),
    ];
    c.db.insert_files(&mut entries).unwrap();

    assert_eq!(c.db.get_files().unwrap(), entries);
    assert_eq!(
        c.db.get_files_by_file_name("textures/rock.tif").unwrap(),
        vec![entries[0].clone(), entries[3].clone()]
    );
    assert_eq!(
        c.db.get_files_like_file_name_and_scan_folder_id("textures/", LikeType::StartsWith, folder)
            .unwrap(),
        vec![entries[0].clone(), entries[1].clone()]
    );
    assert_eq!(
        c.db.get_files_like_file_name_and_scan_folder_id("rock", LikeType::Matches, folder)
            .unwrap(),
        vec![entries[0].clone(), entries[2].clone()]
    );
    assert_eq!(
        c.db.get_files_by_scan_folder_id(other.scan_folder_id).unwrap(),
        vec![entries[3].clone()]
    );
    assert!(c
        .db
        .get_file_by_file_name_and_scan_folder_id("models/rock.fbx", other.scan_folder_id)
        .unwrap()
        .is_none());
}

#[test]
fn remove_file_and_cascade() {
    let c = coverage();
    let folder = c.scan_folder.scan_folder_id;
    let mut a = file(folder, "a.txt", 0, 0);
    let mut b = file(folder, "b.txt", 0, 0);
    c.db.insert_file(&mut a).unwrap();
    c.db.insert_file(&mut b).unwrap();

    assert!(c.db.remove_file(a.file_id).unwrap());
    assert!(!c.db.remove_file(a.file_id).unwrap());
    assert_eq!(count(&c.db, "Files"), 1);

    c.db.remove_scan_folder(folder).unwrap();
    assert_eq!(count(&c.db, "Files"), 0);
}
