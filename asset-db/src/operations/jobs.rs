use asset_db_types::{INVALID_ENTRY_ID, JobEntry, LikeType, like_search_term};
use rusqlite::named_params;

use super::{OperationError, write_error};
use crate::AssetDatabaseConnection;
use crate::exec::Db;
use crate::filter::{JOB_FILTER_SQL, ProductFilter};
use crate::rows::job_from_row;

const ENTITY: &str = "job";

impl AssetDatabaseConnection {
    /// Insert or update a job.
    ///
    /// Without an id the job is matched by (source, builder, job key,
    /// platform). The run key must be positive.
    pub fn set_job(&self, entry: &mut JobEntry) -> Result<(), OperationError> {
        if entry.job_run_key == 0 {
            return Err(OperationError::invalid_entry(
                ENTITY,
                format!("job '{}' has no run key", entry.job_key),
            ));
        }
        let id = self.write(|db| write_job(db, entry))?;
        entry.job_id = id;
        Ok(())
    }

    /// Remove a job and, by cascade, its products.
    pub fn remove_job(&self, job_id: i64) -> Result<bool, OperationError> {
        self.write(|db| Ok(delete_by_id(db, job_id)? > 0))
    }

    /// Remove every listed job, or none of them.
    pub fn remove_jobs(&self, entries: &mut [JobEntry]) -> Result<(), OperationError> {
        if entries.is_empty() {
            return Err(OperationError::empty_input("remove_jobs"));
        }
        if let Some(bad) = entries.iter().find(|e| e.job_id == INVALID_ENTRY_ID) {
            return Err(OperationError::invalid_id(ENTITY, bad.job_id));
        }
        self.write(|db| {
            for entry in entries.iter() {
                if delete_by_id(db, entry.job_id)? == 0 {
                    return Err(OperationError::not_found(ENTITY, entry.job_id));
                }
            }
            Ok(())
        })?;
        for entry in entries.iter_mut() {
            entry.job_id = INVALID_ENTRY_ID;
        }
        Ok(())
    }

    /// Remove the job that emitted a product, taking its sibling products
    /// with it. `false` if the product is unknown.
    pub fn remove_job_by_product_id(&self, product_id: i64) -> Result<bool, OperationError> {
        self.write(|db| {
            let removed = db.execute(
                "DELETE FROM Jobs WHERE JobID IN
                     (SELECT JobPK FROM Products WHERE ProductID = :productid);",
                named_params! { ":productid": product_id },
            )?;
            Ok(removed > 0)
        })
    }

    pub fn get_job_by_id(&self, job_id: i64) -> Result<Option<JobEntry>, OperationError> {
        Ok(select_by_id(&self.db(), job_id)?)
    }

    pub fn get_job_by_job_run_key(&self, job_run_key: u64) -> Result<Option<JobEntry>, OperationError> {
        Ok(self.db().query_opt(
            "SELECT * FROM Jobs WHERE JobRunKey = :jobrunkey;",
            named_params! { ":jobrunkey": job_run_key as i64 },
            |row| job_from_row(row, 0),
        )?)
    }

    /// The job that emitted a product.
    pub fn get_job_by_product_id(&self, product_id: i64) -> Result<Option<JobEntry>, OperationError> {
        Ok(self.db().query_opt(
            "SELECT Jobs.* FROM Jobs
             INNER JOIN Products ON Products.JobPK = Jobs.JobID
             WHERE Products.ProductID = :productid;",
            named_params! { ":productid": product_id },
            |row| job_from_row(row, 0),
        )?)
    }

    pub fn get_jobs(&self, filter: &ProductFilter) -> Result<Vec<JobEntry>, OperationError> {
        let bound = filter.bind();
        let sql = format!("SELECT * FROM Jobs WHERE {JOB_FILTER_SQL} ORDER BY JobID;");
        Ok(self
            .db()
            .query_vec(&sql, &bound.params(&[]), |row| job_from_row(row, 0))?)
    }

    pub fn get_jobs_by_source_id(
        &self,
        source_id: i64,
        filter: &ProductFilter,
    ) -> Result<Vec<JobEntry>, OperationError> {
        let bound = filter.bind();
        let sql = format!(
            "SELECT * FROM Jobs WHERE SourcePK = :sourceid AND {JOB_FILTER_SQL} ORDER BY JobID;"
        );
        Ok(self.db().query_vec(
            &sql,
            &bound.params(named_params! { ":sourceid": source_id }),
            |row| job_from_row(row, 0),
        )?)
    }

    /// Jobs of every source with exactly this name, in any scan folder.
    pub fn get_jobs_by_source_name(
        &self,
        source_name: &str,
        filter: &ProductFilter,
    ) -> Result<Vec<JobEntry>, OperationError> {
        self.jobs_matching("Sources.SourceName = :name", source_name, filter)
    }

    pub fn get_jobs_like_source_name(
        &self,
        term: &str,
        like_type: LikeType,
        filter: &ProductFilter,
    ) -> Result<Vec<JobEntry>, OperationError> {
        let pattern = like_search_term(term, like_type);
        self.jobs_matching("Sources.SourceName LIKE :name ESCAPE '|'", &pattern, filter)
    }

    /// Jobs that emitted a product with exactly this name.
    pub fn get_jobs_by_product_name(
        &self,
        product_name: &str,
        filter: &ProductFilter,
    ) -> Result<Vec<JobEntry>, OperationError> {
        self.jobs_matching("Products.ProductName = :name", product_name, filter)
    }

    pub fn get_jobs_like_product_name(
        &self,
        term: &str,
        like_type: LikeType,
        filter: &ProductFilter,
    ) -> Result<Vec<JobEntry>, OperationError> {
        let pattern = like_search_term(term, like_type);
        self.jobs_matching("Products.ProductName LIKE :name ESCAPE '|'", &pattern, filter)
    }

    /// Filtered jobs whose source or products satisfy `predicate`, which
    /// binds `:name`.
    fn jobs_matching(
        &self,
        predicate: &str,
        name: &str,
        filter: &ProductFilter,
    ) -> Result<Vec<JobEntry>, OperationError> {
        let bound = filter.bind();
        let sql = format!(
            "SELECT DISTINCT Jobs.* FROM Jobs
             INNER JOIN Sources ON Sources.SourceID = Jobs.SourcePK
             LEFT JOIN Products ON Products.JobPK = Jobs.JobID
             WHERE {predicate} AND {JOB_FILTER_SQL}
             ORDER BY Jobs.JobID;"
        );
        Ok(self.db().query_vec(
            &sql,
            &bound.params(named_params! { ":name": name }),
            |row| job_from_row(row, 0),
        )?)
    }

    pub fn get_jobs_by_job_key(&self, job_key: &str) -> Result<Vec<JobEntry>, OperationError> {
        Ok(self.db().query_vec(
            "SELECT * FROM Jobs WHERE JobKey = :jobkey ORDER BY JobID;",
            named_params! { ":jobkey": job_key },
            |row| job_from_row(row, 0),
        )?)
    }

    /// Jobs whose last failure was blamed on the given source.
    pub fn get_jobs_by_failure_cause_source_id(
        &self,
        source_id: i64,
    ) -> Result<Vec<JobEntry>, OperationError> {
        Ok(self.db().query_vec(
            "SELECT * FROM Jobs WHERE FailureCauseSourcePK = :sourceid ORDER BY JobID;",
            named_params! { ":sourceid": source_id },
            |row| job_from_row(row, 0),
        )?)
    }
}

fn select_by_id(db: &Db<'_>, job_id: i64) -> rusqlite::Result<Option<JobEntry>> {
    db.query_opt(
        "SELECT * FROM Jobs WHERE JobID = :jobid;",
        named_params! { ":jobid": job_id },
        |row| job_from_row(row, 0),
    )
}

fn delete_by_id(db: &Db<'_>, job_id: i64) -> rusqlite::Result<usize> {
    db.execute(
        "DELETE FROM Jobs WHERE JobID = :jobid;",
        named_params! { ":jobid": job_id },
    )
}

fn select_by_natural_key(db: &Db<'_>, entry: &JobEntry) -> rusqlite::Result<Option<JobEntry>> {
    db.query_opt(
        "SELECT * FROM Jobs
         WHERE SourcePK = :sourcepk AND BuilderGuid = :builderguid
             AND JobKey = :jobkey AND Platform = :platform;",
        named_params! {
            ":sourcepk": entry.source_pk,
            ":builderguid": entry.builder_guid,
            ":jobkey": entry.job_key,
            ":platform": entry.platform,
        },
        |row| job_from_row(row, 0),
    )
}

fn write_job(db: &Db<'_>, entry: &JobEntry) -> Result<i64, OperationError> {
    let existing = if entry.job_id == INVALID_ENTRY_ID {
        select_by_natural_key(db, entry)?
    } else {
        Some(
            select_by_id(db, entry.job_id)?
                .ok_or_else(|| OperationError::not_found(ENTITY, entry.job_id))?,
        )
    };

    let Some(existing) = existing else {
        return db
            .insert(
                "INSERT INTO Jobs (SourcePK, JobKey, Fingerprint, Platform, BuilderGuid, Status,
                     JobRunKey, FirstFailLogTime, FirstFailLogFile, LastFailLogTime,
                     LastFailLogFile, LastLogTime, LastLogFile, ErrorCount, WarningCount,
                     FailureCauseSourcePK, FailureCauseFingerprint)
                 VALUES (:sourcepk, :jobkey, :fingerprint, :platform, :builderguid, :status,
                     :jobrunkey, :firstfaillogtime, :firstfaillogfile, :lastfaillogtime,
                     :lastfaillogfile, :lastlogtime, :lastlogfile, :errorcount, :warningcount,
                     :failurecausesourcepk, :failurecausefingerprint);",
                named_params! {
                    ":sourcepk": entry.source_pk,
                    ":jobkey": entry.job_key,
                    ":fingerprint": entry.fingerprint,
                    ":platform": entry.platform,
                    ":builderguid": entry.builder_guid,
                    ":status": entry.status.as_i32(),
                    ":jobrunkey": entry.job_run_key as i64,
                    ":firstfaillogtime": entry.first_fail_log_time,
                    ":firstfaillogfile": entry.first_fail_log_file,
                    ":lastfaillogtime": entry.last_fail_log_time,
                    ":lastfaillogfile": entry.last_fail_log_file,
                    ":lastlogtime": entry.last_log_time,
                    ":lastlogfile": entry.last_log_file,
                    ":errorcount": entry.error_count,
                    ":warningcount": entry.warning_count,
                    ":failurecausesourcepk": entry.failure_cause_source_pk,
                    ":failurecausefingerprint": entry.failure_cause_fingerprint,
                },
            )
            .map_err(|e| write_error(e, ENTITY));
    };

    let id = existing.job_id;
    let updated = JobEntry {
        job_id: id,
        ..entry.clone()
    };
    if updated != existing {
        db.execute(
            "UPDATE Jobs SET SourcePK = :sourcepk, JobKey = :jobkey, Fingerprint = :fingerprint,
                 Platform = :platform, BuilderGuid = :builderguid, Status = :status,
                 JobRunKey = :jobrunkey, FirstFailLogTime = :firstfaillogtime,
                 FirstFailLogFile = :firstfaillogfile, LastFailLogTime = :lastfaillogtime,
                 LastFailLogFile = :lastfaillogfile, LastLogTime = :lastlogtime,
                 LastLogFile = :lastlogfile, ErrorCount = :errorcount,
                 WarningCount = :warningcount, FailureCauseSourcePK = :failurecausesourcepk,
                 FailureCauseFingerprint = :failurecausefingerprint
             WHERE JobID = :jobid;",
            named_params! {
                ":sourcepk": updated.source_pk,
                ":jobkey": updated.job_key,
                ":fingerprint": updated.fingerprint,
                ":platform": updated.platform,
                ":builderguid": updated.builder_guid,
                ":status": updated.status.as_i32(),
                ":jobrunkey": updated.job_run_key as i64,
                ":firstfaillogtime": updated.first_fail_log_time,
                ":firstfaillogfile": updated.first_fail_log_file,
                ":lastfaillogtime": updated.last_fail_log_time,
                ":lastfaillogfile": updated.last_fail_log_file,
                ":lastlogtime": updated.last_log_time,
                ":lastlogfile": updated.last_log_file,
                ":errorcount": updated.error_count,
                ":warningcount": updated.warning_count,
                ":failurecausesourcepk": updated.failure_cause_source_pk,
                ":failurecausefingerprint": updated.failure_cause_fingerprint,
                ":jobid": id,
            },
        )
        .map_err(|e| write_error(e, ENTITY))?;
    }
    Ok(id)
}
