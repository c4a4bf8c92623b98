//! Data model types for the asset database.
//!
//! These types mirror the persistent schema: scan folders, sources, jobs,
//! products, their dependencies, and the ancillary tracking tables.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::flags::{DependencyFlags, ProductOutputFlags, SourceDependencyType};

/// Primary key value of an entry that has not been written yet.
pub const INVALID_ENTRY_ID: i64 = -1;

// ── Scan Folder ─────────────────────────────────────────────────────────────

/// A watched root directory that sources are discovered under.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanFolderEntry {
    pub scan_folder_id: i64,
    /// Absolute path of the folder.
    pub scan_folder: String,
    pub display_name: String,
    /// Stable logical identifier; survives the folder moving on disk.
    pub portable_key: String,
    pub is_root: bool,
}

impl Default for ScanFolderEntry {
    fn default() -> Self {
        Self {
            scan_folder_id: INVALID_ENTRY_ID,
            scan_folder: String::new(),
            display_name: String::new(),
            portable_key: String::new(),
            is_root: false,
        }
    }
}

impl ScanFolderEntry {
    pub fn new(
        scan_folder: impl Into<String>,
        display_name: impl Into<String>,
        portable_key: impl Into<String>,
        is_root: bool,
    ) -> Self {
        Self {
            scan_folder: scan_folder.into(),
            display_name: display_name.into(),
            portable_key: portable_key.into(),
            is_root,
            ..Self::default()
        }
    }

    pub fn is_persisted(&self) -> bool {
        self.scan_folder_id != INVALID_ENTRY_ID
    }
}

// ── Source ──────────────────────────────────────────────────────────────────

/// A source file, relative to its scan folder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceEntry {
    pub source_id: i64,
    pub scan_folder_pk: i64,
    pub source_name: String,
    pub source_guid: Uuid,
    pub analysis_fingerprint: String,
}

impl Default for SourceEntry {
    fn default() -> Self {
        Self {
            source_id: INVALID_ENTRY_ID,
            scan_folder_pk: INVALID_ENTRY_ID,
            source_name: String::new(),
            source_guid: Uuid::nil(),
            analysis_fingerprint: String::new(),
        }
    }
}

impl SourceEntry {
    pub fn new(
        scan_folder_pk: i64,
        source_name: impl Into<String>,
        source_guid: Uuid,
        analysis_fingerprint: impl Into<String>,
    ) -> Self {
        Self {
            scan_folder_pk,
            source_name: source_name.into(),
            source_guid,
            analysis_fingerprint: analysis_fingerprint.into(),
            ..Self::default()
        }
    }

    pub fn is_persisted(&self) -> bool {
        self.source_id != INVALID_ENTRY_ID
    }
}

/// A source row joined with the scan folder it lives under.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SourceAndScanFolderEntry {
    pub source: SourceEntry,
    pub scan_folder: ScanFolderEntry,
}

// ── Job ─────────────────────────────────────────────────────────────────────

/// Processing state of a job.
///
/// `Any` never appears in a stored row; it is the "don't filter" value for
/// queries that accept a status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    Any,
    #[default]
    Queued,
    InProgress,
    Failed,
    FailedInvalidSourceNameExceedsMaxLimit,
    Completed,
    Missing,
}

impl JobStatus {
    /// Integer form stored in the `Jobs.Status` column.
    pub fn as_i32(self) -> i32 {
        match self {
            Self::Any => -1,
            Self::Queued => 0,
            Self::InProgress => 1,
            Self::Failed => 2,
            Self::FailedInvalidSourceNameExceedsMaxLimit => 3,
            Self::Completed => 4,
            Self::Missing => 5,
        }
    }

    pub fn from_i32(value: i32) -> Option<Self> {
        match value {
            -1 => Some(Self::Any),
            0 => Some(Self::Queued),
            1 => Some(Self::InProgress),
            2 => Some(Self::Failed),
            3 => Some(Self::FailedInvalidSourceNameExceedsMaxLimit),
            4 => Some(Self::Completed),
            5 => Some(Self::Missing),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Any => "any",
            Self::Queued => "queued",
            Self::InProgress => "in_progress",
            Self::Failed => "failed",
            Self::FailedInvalidSourceNameExceedsMaxLimit => "failed_invalid_source_name",
            Self::Completed => "completed",
            Self::Missing => "missing",
        }
    }

    pub fn is_failure(self) -> bool {
        matches!(
            self,
            Self::Failed | Self::FailedInvalidSourceNameExceedsMaxLimit
        )
    }
}

impl std::fmt::Display for JobStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One builder's processing of one source for one platform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobEntry {
    pub job_id: i64,
    pub source_pk: i64,
    pub job_key: String,
    pub fingerprint: u32,
    pub platform: String,
    pub builder_guid: Uuid,
    pub status: JobStatus,
    /// Identifies a single run of the job. Must be positive.
    pub job_run_key: u64,
    pub first_fail_log_time: i64,
    pub first_fail_log_file: String,
    pub last_fail_log_time: i64,
    pub last_fail_log_file: String,
    pub last_log_time: i64,
    pub last_log_file: String,
    pub error_count: u32,
    pub warning_count: u32,
    pub failure_cause_source_pk: i64,
    pub failure_cause_fingerprint: u32,
}

impl Default for JobEntry {
    fn default() -> Self {
        Self {
            job_id: INVALID_ENTRY_ID,
            source_pk: INVALID_ENTRY_ID,
            job_key: String::new(),
            fingerprint: 0,
            platform: String::new(),
            builder_guid: Uuid::nil(),
            status: JobStatus::Queued,
            job_run_key: 0,
            first_fail_log_time: 0,
            first_fail_log_file: String::new(),
            last_fail_log_time: 0,
            last_fail_log_file: String::new(),
            last_log_time: 0,
            last_log_file: String::new(),
            error_count: 0,
            warning_count: 0,
            failure_cause_source_pk: INVALID_ENTRY_ID,
            failure_cause_fingerprint: 0,
        }
    }
}

impl JobEntry {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        source_pk: i64,
        job_key: impl Into<String>,
        fingerprint: u32,
        platform: impl Into<String>,
        builder_guid: Uuid,
        status: JobStatus,
        job_run_key: u64,
    ) -> Self {
        Self {
            source_pk,
            job_key: job_key.into(),
            fingerprint,
            platform: platform.into(),
            builder_guid,
            status,
            job_run_key,
            ..Self::default()
        }
    }

    pub fn is_persisted(&self) -> bool {
        self.job_id != INVALID_ENTRY_ID
    }
}

// ── Product ─────────────────────────────────────────────────────────────────

/// An output file emitted by a job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductEntry {
    pub product_id: i64,
    pub job_pk: i64,
    /// Distinguishes the outputs of a single job.
    pub sub_id: u32,
    pub product_name: String,
    pub asset_type: Uuid,
    pub legacy_guid: Uuid,
    pub hash: u64,
    pub flags: ProductOutputFlags,
}

impl Default for ProductEntry {
    fn default() -> Self {
        Self {
            product_id: INVALID_ENTRY_ID,
            job_pk: INVALID_ENTRY_ID,
            sub_id: 0,
            product_name: String::new(),
            asset_type: Uuid::nil(),
            legacy_guid: Uuid::nil(),
            hash: 0,
            flags: ProductOutputFlags::PRODUCT_ASSET,
        }
    }
}

impl ProductEntry {
    pub fn new(job_pk: i64, sub_id: u32, product_name: impl Into<String>, asset_type: Uuid) -> Self {
        Self {
            job_pk,
            sub_id,
            product_name: product_name.into(),
            asset_type,
            ..Self::default()
        }
    }

    pub fn is_persisted(&self) -> bool {
        self.product_id != INVALID_ENTRY_ID
    }
}

/// A legacy numeric sub id kept for products whose sub id scheme changed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LegacySubIdEntry {
    pub sub_ids_entry_id: i64,
    pub product_pk: i64,
    pub sub_id: u32,
}

impl Default for LegacySubIdEntry {
    fn default() -> Self {
        Self {
            sub_ids_entry_id: INVALID_ENTRY_ID,
            product_pk: INVALID_ENTRY_ID,
            sub_id: 0,
        }
    }
}

impl LegacySubIdEntry {
    pub fn new(product_pk: i64, sub_id: u32) -> Self {
        Self {
            product_pk,
            sub_id,
            ..Self::default()
        }
    }
}

// ── Dependencies ────────────────────────────────────────────────────────────

/// What an unresolved product dependency path refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnresolvedDependencyType {
    #[default]
    SourceFile,
    ProductFile,
}

impl UnresolvedDependencyType {
    pub fn as_i32(self) -> i32 {
        match self {
            Self::SourceFile => 0,
            Self::ProductFile => 1,
        }
    }

    pub fn from_i32(value: i32) -> Option<Self> {
        match value {
            0 => Some(Self::SourceFile),
            1 => Some(Self::ProductFile),
            _ => None,
        }
    }
}

/// A product's dependency on another product.
///
/// The target is either resolved (`dependency_source_guid` +
/// `dependency_sub_id`) or only known by `unresolved_path`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductDependencyEntry {
    pub product_dependency_id: i64,
    pub product_pk: i64,
    pub dependency_source_guid: Uuid,
    pub dependency_sub_id: u32,
    pub dependency_flags: DependencyFlags,
    pub platform: String,
    /// Set when the dependency was declared by asset id rather than by a
    /// source file reference.
    pub from_asset_id: bool,
    pub unresolved_path: String,
    pub unresolved_dependency_type: UnresolvedDependencyType,
}

impl Default for ProductDependencyEntry {
    fn default() -> Self {
        Self {
            product_dependency_id: INVALID_ENTRY_ID,
            product_pk: INVALID_ENTRY_ID,
            dependency_source_guid: Uuid::nil(),
            dependency_sub_id: 0,
            dependency_flags: DependencyFlags::default(),
            platform: String::new(),
            from_asset_id: false,
            unresolved_path: String::new(),
            unresolved_dependency_type: UnresolvedDependencyType::SourceFile,
        }
    }
}

impl ProductDependencyEntry {
    pub fn new(
        product_pk: i64,
        dependency_source_guid: Uuid,
        dependency_sub_id: u32,
        dependency_flags: DependencyFlags,
        platform: impl Into<String>,
        from_asset_id: bool,
    ) -> Self {
        Self {
            product_pk,
            dependency_source_guid,
            dependency_sub_id,
            dependency_flags,
            platform: platform.into(),
            from_asset_id,
            ..Self::default()
        }
    }

    /// Same as [`ProductDependencyEntry::new`] with an unresolved path.
    pub fn with_unresolved_path(mut self, path: impl Into<String>) -> Self {
        self.unresolved_path = path.into();
        self
    }

    pub fn is_unresolved(&self) -> bool {
        !self.unresolved_path.is_empty()
    }
}

/// A dependency that a scanner found referenced but could not resolve.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MissingProductDependencyEntry {
    pub missing_product_dependency_id: i64,
    pub product_pk: i64,
    pub scanner_id: String,
    pub scanner_version: String,
    pub source_file_fingerprint: String,
    pub dependency_source_guid: Uuid,
    pub dependency_sub_id: u32,
    pub missing_dependency_string: String,
    pub last_scan_time: String,
    pub scan_time_seconds_since_epoch: u64,
}

impl Default for MissingProductDependencyEntry {
    fn default() -> Self {
        Self {
            missing_product_dependency_id: INVALID_ENTRY_ID,
            product_pk: INVALID_ENTRY_ID,
            scanner_id: String::new(),
            scanner_version: String::new(),
            source_file_fingerprint: String::new(),
            dependency_source_guid: Uuid::nil(),
            dependency_sub_id: 0,
            missing_dependency_string: String::new(),
            last_scan_time: String::new(),
            scan_time_seconds_since_epoch: 0,
        }
    }
}

/// Either a file path or the uuid of a source.
///
/// Stored as text: uuids in braced form (`{xxxxxxxx-...}`), paths as-is.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PathOrUuid {
    Path(String),
    Uuid(Uuid),
}

impl Default for PathOrUuid {
    fn default() -> Self {
        Self::Path(String::new())
    }
}

impl PathOrUuid {
    /// Parse the stored text form.
    pub fn parse(text: &str) -> Self {
        if text.starts_with('{') && text.ends_with('}') {
            if let Ok(uuid) = Uuid::parse_str(text) {
                return Self::Uuid(uuid);
            }
        }
        Self::Path(text.to_string())
    }

    pub fn path(&self) -> Option<&str> {
        match self {
            Self::Path(p) => Some(p),
            Self::Uuid(_) => None,
        }
    }

    pub fn uuid(&self) -> Option<Uuid> {
        match self {
            Self::Path(_) => None,
            Self::Uuid(u) => Some(*u),
        }
    }
}

impl std::fmt::Display for PathOrUuid {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Path(p) => f.write_str(p),
            Self::Uuid(u) => write!(f, "{}", u.braced()),
        }
    }
}

impl From<&str> for PathOrUuid {
    fn from(path: &str) -> Self {
        Self::Path(path.to_string())
    }
}

impl From<Uuid> for PathOrUuid {
    fn from(uuid: Uuid) -> Self {
        Self::Uuid(uuid)
    }
}

/// A builder-scoped dependency of one source on another.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceFileDependencyEntry {
    pub source_dependency_id: i64,
    pub builder_guid: Uuid,
    pub source_guid: Uuid,
    pub depends_on_source: PathOrUuid,
    pub type_of_dependency: SourceDependencyType,
    pub from_asset_id: bool,
    /// Comma separated sub ids the dependency is restricted to, if any.
    pub sub_ids: String,
}

impl Default for SourceFileDependencyEntry {
    fn default() -> Self {
        Self {
            source_dependency_id: INVALID_ENTRY_ID,
            builder_guid: Uuid::nil(),
            source_guid: Uuid::nil(),
            depends_on_source: PathOrUuid::default(),
            type_of_dependency: SourceDependencyType::SOURCE_TO_SOURCE,
            from_asset_id: false,
            sub_ids: String::new(),
        }
    }
}

impl SourceFileDependencyEntry {
    pub fn new(
        builder_guid: Uuid,
        source_guid: Uuid,
        depends_on_source: impl Into<PathOrUuid>,
        type_of_dependency: SourceDependencyType,
        from_asset_id: bool,
        sub_ids: impl Into<String>,
    ) -> Self {
        Self {
            builder_guid,
            source_guid,
            depends_on_source: depends_on_source.into(),
            type_of_dependency,
            from_asset_id,
            sub_ids: sub_ids.into(),
            ..Self::default()
        }
    }
}

// ── Files ───────────────────────────────────────────────────────────────────

/// Modification-time and hash tracking for a file under a scan folder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileEntry {
    pub file_id: i64,
    pub scan_folder_pk: i64,
    pub file_name: String,
    pub is_folder: bool,
    pub mod_time: u64,
    pub hash: u64,
}

impl Default for FileEntry {
    fn default() -> Self {
        Self {
            file_id: INVALID_ENTRY_ID,
            scan_folder_pk: INVALID_ENTRY_ID,
            file_name: String::new(),
            is_folder: false,
            mod_time: 0,
            hash: 0,
        }
    }
}

impl FileEntry {
    pub fn new(scan_folder_pk: i64, file_name: impl Into<String>) -> Self {
        Self {
            scan_folder_pk,
            file_name: file_name.into(),
            ..Self::default()
        }
    }
}

// ── Stats & Builders ────────────────────────────────────────────────────────

/// A named counter, replaced wholesale on every write.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StatEntry {
    pub stat_name: String,
    pub stat_value: i64,
    pub last_log_time: i64,
}

impl StatEntry {
    pub fn new(stat_name: impl Into<String>, stat_value: i64, last_log_time: i64) -> Self {
        Self {
            stat_name: stat_name.into(),
            stat_value,
            last_log_time,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuilderInfoEntry {
    pub builder_info_id: i64,
    pub builder_uuid: Uuid,
    pub analysis_fingerprint: String,
}

impl Default for BuilderInfoEntry {
    fn default() -> Self {
        Self {
            builder_info_id: INVALID_ENTRY_ID,
            builder_uuid: Uuid::nil(),
            analysis_fingerprint: String::new(),
        }
    }
}

// ── Combined ────────────────────────────────────────────────────────────────

/// A product together with the job, source and scan folder that own it.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CombinedEntry {
    pub scan_folder: ScanFolderEntry,
    pub source: SourceEntry,
    pub job: JobEntry,
    pub product: ProductEntry,
    /// Only populated when requested by the query.
    pub legacy_sub_ids: Vec<LegacySubIdEntry>,
}
