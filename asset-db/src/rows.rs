//! Row to entry mapping.
//!
//! Queries select whole tables (`Products.*`, `Jobs.*`, ...) and the mappers
//! read columns by position starting at `base`, so joined rows can be split
//! into several entries. Column order is the table order in `schema.rs`.

use asset_db_types::*;
use rusqlite::Row;

pub(crate) const SCAN_FOLDER_WIDTH: usize = 5;
pub(crate) const SOURCE_WIDTH: usize = 5;
pub(crate) const JOB_WIDTH: usize = 18;

pub(crate) fn scan_folder_from_row(row: &Row<'_>, base: usize) -> rusqlite::Result<ScanFolderEntry> {
    Ok(ScanFolderEntry {
        scan_folder_id: row.get(base)?,
        scan_folder: row.get(base + 1)?,
        display_name: row.get(base + 2)?,
        portable_key: row.get(base + 3)?,
        is_root: row.get(base + 4)?,
    })
}

pub(crate) fn source_from_row(row: &Row<'_>, base: usize) -> rusqlite::Result<SourceEntry> {
    Ok(SourceEntry {
        source_id: row.get(base)?,
        scan_folder_pk: row.get(base + 1)?,
        source_name: row.get(base + 2)?,
        source_guid: row.get(base + 3)?,
        analysis_fingerprint: row.get(base + 4)?,
    })
}

pub(crate) fn job_from_row(row: &Row<'_>, base: usize) -> rusqlite::Result<JobEntry> {
    let status_idx = base + 6;
    let raw_status: i32 = row.get(status_idx)?;
    let status = JobStatus::from_i32(raw_status).ok_or(
        rusqlite::Error::IntegralValueOutOfRange(status_idx, i64::from(raw_status)),
    )?;
    Ok(JobEntry {
        job_id: row.get(base)?,
        source_pk: row.get(base + 1)?,
        job_key: row.get(base + 2)?,
        fingerprint: row.get(base + 3)?,
        platform: row.get(base + 4)?,
        builder_guid: row.get(base + 5)?,
        status,
        job_run_key: row.get::<_, i64>(base + 7)? as u64,
        first_fail_log_time: row.get(base + 8)?,
        first_fail_log_file: row.get(base + 9)?,
        last_fail_log_time: row.get(base + 10)?,
        last_fail_log_file: row.get(base + 11)?,
        last_log_time: row.get(base + 12)?,
        last_log_file: row.get(base + 13)?,
        error_count: row.get(base + 14)?,
        warning_count: row.get(base + 15)?,
        failure_cause_source_pk: row.get(base + 16)?,
        failure_cause_fingerprint: row.get(base + 17)?,
    })
}

pub(crate) fn product_from_row(row: &Row<'_>, base: usize) -> rusqlite::Result<ProductEntry> {
    Ok(ProductEntry {
        product_id: row.get(base)?,
        job_pk: row.get(base + 1)?,
        sub_id: row.get(base + 2)?,
        product_name: row.get(base + 3)?,
        asset_type: row.get(base + 4)?,
        legacy_guid: row.get(base + 5)?,
        hash: row.get::<_, i64>(base + 6)? as u64,
        flags: ProductOutputFlags::from_bits(row.get::<_, i64>(base + 7)? as u64),
    })
}

pub(crate) fn legacy_sub_id_from_row(row: &Row<'_>) -> rusqlite::Result<LegacySubIdEntry> {
    Ok(LegacySubIdEntry {
        sub_ids_entry_id: row.get(0)?,
        product_pk: row.get(1)?,
        sub_id: row.get(2)?,
    })
}

pub(crate) fn product_dependency_from_row(
    row: &Row<'_>,
) -> rusqlite::Result<ProductDependencyEntry> {
    let type_idx = 7;
    let raw_type: i32 = row.get(type_idx)?;
    let unresolved_dependency_type = UnresolvedDependencyType::from_i32(raw_type).ok_or(
        rusqlite::Error::IntegralValueOutOfRange(type_idx, i64::from(raw_type)),
    )?;
    Ok(ProductDependencyEntry {
        product_dependency_id: row.get(0)?,
        product_pk: row.get(1)?,
        dependency_source_guid: row.get(2)?,
        dependency_sub_id: row.get(3)?,
        platform: row.get(4)?,
        dependency_flags: DependencyFlags::from_bits(row.get::<_, i64>(5)? as u64),
        unresolved_path: row.get(6)?,
        unresolved_dependency_type,
        from_asset_id: row.get(8)?,
    })
}

pub(crate) fn missing_product_dependency_from_row(
    row: &Row<'_>,
) -> rusqlite::Result<MissingProductDependencyEntry> {
    Ok(MissingProductDependencyEntry {
        missing_product_dependency_id: row.get(0)?,
        product_pk: row.get(1)?,
        scanner_id: row.get(2)?,
        scanner_version: row.get(3)?,
        source_file_fingerprint: row.get(4)?,
        dependency_source_guid: row.get(5)?,
        dependency_sub_id: row.get(6)?,
        missing_dependency_string: row.get(7)?,
        last_scan_time: row.get(8)?,
        scan_time_seconds_since_epoch: row.get::<_, i64>(9)? as u64,
    })
}

pub(crate) fn source_dependency_from_row(
    row: &Row<'_>,
) -> rusqlite::Result<SourceFileDependencyEntry> {
    let depends_on: String = row.get(3)?;
    Ok(SourceFileDependencyEntry {
        source_dependency_id: row.get(0)?,
        builder_guid: row.get(1)?,
        source_guid: row.get(2)?,
        depends_on_source: PathOrUuid::parse(&depends_on),
        type_of_dependency: SourceDependencyType::from_bits(row.get::<_, i64>(4)? as u64),
        from_asset_id: row.get(5)?,
        sub_ids: row.get(6)?,
    })
}

pub(crate) fn file_from_row(row: &Row<'_>) -> rusqlite::Result<FileEntry> {
    Ok(FileEntry {
        file_id: row.get(0)?,
        scan_folder_pk: row.get(1)?,
        file_name: row.get(2)?,
        is_folder: row.get(3)?,
        mod_time: row.get::<_, i64>(4)? as u64,
        hash: row.get::<_, i64>(5)? as u64,
    })
}

pub(crate) fn stat_from_row(row: &Row<'_>) -> rusqlite::Result<StatEntry> {
    Ok(StatEntry {
        stat_name: row.get(0)?,
        stat_value: row.get(1)?,
        last_log_time: row.get(2)?,
    })
}

pub(crate) fn builder_info_from_row(row: &Row<'_>) -> rusqlite::Result<BuilderInfoEntry> {
    Ok(BuilderInfoEntry {
        builder_info_id: row.get(0)?,
        builder_uuid: row.get(1)?,
        analysis_fingerprint: row.get(2)?,
    })
}

/// Map a `ScanFolders.*, Sources.*, Jobs.*, Products.*` row.
pub(crate) fn combined_from_row(row: &Row<'_>) -> rusqlite::Result<CombinedEntry> {
    let source_base = SCAN_FOLDER_WIDTH;
    let job_base = source_base + SOURCE_WIDTH;
    let product_base = job_base + JOB_WIDTH;
    Ok(CombinedEntry {
        scan_folder: scan_folder_from_row(row, 0)?,
        source: source_from_row(row, source_base)?,
        job: job_from_row(row, job_base)?,
        product: product_from_row(row, product_base)?,
        legacy_sub_ids: Vec::new(),
    })
}
