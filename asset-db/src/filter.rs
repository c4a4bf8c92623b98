//! Job-level filters shared by the product, job and combined queries.

use asset_db_types::JobStatus;
use rusqlite::ToSql;
use uuid::Uuid;

use crate::exec::Params;

/// Narrows a query to jobs matching every field that is set.
///
/// `None` (and a nil builder guid) means "don't filter on this field";
/// `JobStatus::Any` disables the status filter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductFilter {
    pub builder_guid: Option<Uuid>,
    pub job_key: Option<String>,
    pub platform: Option<String>,
    pub status: JobStatus,
}

impl Default for ProductFilter {
    fn default() -> Self {
        Self {
            builder_guid: None,
            job_key: None,
            platform: None,
            status: JobStatus::Any,
        }
    }
}

impl ProductFilter {
    /// A filter that matches every job.
    pub fn any() -> Self {
        Self::default()
    }

    pub fn builder_guid(mut self, guid: Uuid) -> Self {
        self.builder_guid = Some(guid);
        self
    }

    pub fn job_key(mut self, job_key: impl Into<String>) -> Self {
        self.job_key = Some(job_key.into());
        self
    }

    pub fn platform(mut self, platform: impl Into<String>) -> Self {
        self.platform = Some(platform.into());
        self
    }

    pub fn status(mut self, status: JobStatus) -> Self {
        self.status = status;
        self
    }

    pub(crate) fn bind(&self) -> BoundFilter<'_> {
        BoundFilter {
            builder_guid: self.builder_guid.filter(|g| !g.is_nil()),
            job_key: self.job_key.as_deref(),
            platform: self.platform.as_deref(),
            status: self.status.as_i32(),
        }
    }
}

/// Predicate over the `Jobs` table, bound by [`BoundFilter::params`].
pub(crate) const JOB_FILTER_SQL: &str = "(:builderguid IS NULL OR Jobs.BuilderGuid = :builderguid) \
     AND (:jobkey IS NULL OR Jobs.JobKey = :jobkey) \
     AND (:platform IS NULL OR Jobs.Platform = :platform) \
     AND (:status = -1 OR Jobs.Status = :status)";

/// Filter values in the form the statement binds them.
pub(crate) struct BoundFilter<'f> {
    builder_guid: Option<Uuid>,
    job_key: Option<&'f str>,
    platform: Option<&'f str>,
    status: i32,
}

impl<'f> BoundFilter<'f> {
    /// `extra` followed by the four filter parameters.
    pub(crate) fn params<'a>(&'a self, extra: Params<'a>) -> Vec<(&'a str, &'a dyn ToSql)> {
        let mut out = extra.to_vec();
        out.push((":builderguid", &self.builder_guid));
        out.push((":jobkey", &self.job_key));
        out.push((":platform", &self.platform));
        out.push((":status", &self.status));
        out
    }
}
