#![allow(dead_code)]

use asset_db::AssetDatabaseConnection;
use asset_db_types::*;
use uuid::Uuid;

/// The coverage data set: one scan folder, two sources with one job each,
/// and two products per job.
pub struct Coverage {
    pub db: AssetDatabaseConnection,
    pub scan_folder: ScanFolderEntry,
    pub source1: SourceEntry,
    pub source2: SourceEntry,
    pub job1: JobEntry,
    pub job2: JobEntry,
    pub product1: ProductEntry,
    pub product2: ProductEntry,
    pub product3: ProductEntry,
    pub product4: ProductEntry,
}

pub fn empty_db() -> AssetDatabaseConnection {
    AssetDatabaseConnection::open_in_memory().unwrap()
}

pub fn coverage() -> Coverage {
    let db = empty_db();

    let mut scan_folder = ScanFolderEntry::new("c:/O3DE/dev", "dev", "rootportkey", false);
    db.set_scan_folder(&mut scan_folder).unwrap();

    let mut source1 = SourceEntry::new(
        scan_folder.scan_folder_id,
        "somefile.tif",
        Uuid::new_v4(),
        "AnalysisFingerprint1",
    );
    let mut source2 = SourceEntry::new(
        scan_folder.scan_folder_id,
        "otherfile.tif",
        Uuid::new_v4(),
        "AnalysisFingerprint2",
    );
    db.set_source(&mut source1).unwrap();
    db.set_source(&mut source2).unwrap();

    let mut job1 = JobEntry::new(
        source1.source_id,
        "some job key",
        123,
        "pc",
        Uuid::new_v4(),
        JobStatus::Completed,
        1,
    );
    let mut job2 = JobEntry::new(
        source2.source_id,
        "some other job key",
        345,
        "osx",
        Uuid::new_v4(),
        JobStatus::Failed,
        2,
    );
    db.set_job(&mut job1).unwrap();
    db.set_job(&mut job2).unwrap();

    let mut product1 = ProductEntry::new(job1.job_id, 1, "someproduct1.dds", Uuid::new_v4());
    let mut product2 = ProductEntry::new(job1.job_id, 2, "someproduct2.dds", Uuid::new_v4());
    let mut product3 = ProductEntry::new(job2.job_id, 3, "someproduct3.dds", Uuid::new_v4());
    let mut product4 = ProductEntry::new(job2.job_id, 4, "someproduct4.dds", Uuid::new_v4());
    db.set_product(&mut product1).unwrap();
    db.set_product(&mut product2).unwrap();
    db.set_product(&mut product3).unwrap();
    db.set_product(&mut product4).unwrap();

    Coverage {
        db,
        scan_folder,
        source1,
        source2,
        job1,
        job2,
        product1,
        product2,
        product3,
        product4,
    }
}

pub fn count(db: &AssetDatabaseConnection, table: &str) -> i64 {
    db.raw_connection()
        .query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |row| {
            row.get(0)
        })
        .unwrap()
}
