use std::ops::ControlFlow;

use asset_db_types::{
    INVALID_ENTRY_ID, LikeType, SourceAndScanFolderEntry, SourceEntry, like_search_term,
};
use rusqlite::named_params;
use uuid::Uuid;

use super::{OperationError, write_error};
use crate::AssetDatabaseConnection;
use crate::exec::Db;
use crate::rows::{SCAN_FOLDER_WIDTH, scan_folder_from_row, source_from_row};

const ENTITY: &str = "source";

impl AssetDatabaseConnection {
    /// Insert or update a source.
    ///
    /// Without an id the source is matched by guid first, then by name
    /// within its scan folder.
    pub fn set_source(&self, entry: &mut SourceEntry) -> Result<(), OperationError> {
        let id = self.write(|db| write_source(db, entry))?;
        entry.source_id = id;
        Ok(())
    }

    /// Remove a source along with its jobs and their products.
    pub fn remove_source(&self, source_id: i64) -> Result<bool, OperationError> {
        self.write(|db| Ok(delete_by_id(db, source_id)? > 0))
    }

    /// Remove every listed source, or none of them.
    pub fn remove_sources(&self, entries: &mut [SourceEntry]) -> Result<(), OperationError> {
        if entries.is_empty() {
            return Err(OperationError::empty_input("remove_sources"));
        }
        if let Some(bad) = entries.iter().find(|e| e.source_id == INVALID_ENTRY_ID) {
            return Err(OperationError::invalid_id(ENTITY, bad.source_id));
        }
        self.write(|db| {
            for entry in entries.iter() {
                if delete_by_id(db, entry.source_id)? == 0 {
                    return Err(OperationError::not_found(ENTITY, entry.source_id));
                }
            }
            Ok(())
        })?;
        for entry in entries.iter_mut() {
            entry.source_id = INVALID_ENTRY_ID;
        }
        Ok(())
    }

    /// Remove every source of a scan folder. `false` if it had none.
    pub fn remove_sources_by_scan_folder_id(
        &self,
        scan_folder_id: i64,
    ) -> Result<bool, OperationError> {
        self.write(|db| {
            let removed = db.execute(
                "DELETE FROM Sources WHERE ScanFolderPK = :scanfolderid;",
                named_params! { ":scanfolderid": scan_folder_id },
            )?;
            Ok(removed > 0)
        })
    }

    /// Blank every analysis fingerprint so all sources get analyzed again.
    pub fn invalidate_source_analysis_fingerprints(&self) -> Result<(), OperationError> {
        self.write(|db| {
            db.execute("UPDATE Sources SET AnalysisFingerprint = '';", &[])?;
            Ok(())
        })
    }

    pub fn get_source_by_id(&self, source_id: i64) -> Result<Option<SourceEntry>, OperationError> {
        Ok(select_by_id(&self.db(), source_id)?)
    }

    pub fn get_source_by_guid(&self, guid: Uuid) -> Result<Option<SourceEntry>, OperationError> {
        Ok(select_by_guid(&self.db(), guid)?)
    }

    /// The source a job was created for.
    pub fn get_source_by_job_id(&self, job_id: i64) -> Result<Option<SourceEntry>, OperationError> {
        Ok(self.db().query_opt(
            "SELECT Sources.* FROM Sources
             INNER JOIN Jobs ON Jobs.SourcePK = Sources.SourceID
             WHERE Jobs.JobID = :jobid;",
            named_params! { ":jobid": job_id },
            |row| source_from_row(row, 0),
        )?)
    }

    pub fn get_source_by_product_id(
        &self,
        product_id: i64,
    ) -> Result<Option<SourceEntry>, OperationError> {
        Ok(self.db().query_opt(
            "SELECT Sources.* FROM Sources
             INNER JOIN Jobs ON Jobs.SourcePK = Sources.SourceID
             INNER JOIN Products ON Products.JobPK = Jobs.JobID
             WHERE Products.ProductID = :productid;",
            named_params! { ":productid": product_id },
            |row| source_from_row(row, 0),
        )?)
    }

    pub fn get_sources(&self) -> Result<Vec<SourceEntry>, OperationError> {
        Ok(self
            .db()
            .query_vec("SELECT * FROM Sources ORDER BY SourceID;", &[], |row| {
                source_from_row(row, 0)
            })?)
    }

    pub fn get_sources_by_scan_folder_id(
        &self,
        scan_folder_id: i64,
    ) -> Result<Vec<SourceEntry>, OperationError> {
        Ok(self.db().query_vec(
            "SELECT * FROM Sources WHERE ScanFolderPK = :scanfolderid ORDER BY SourceID;",
            named_params! { ":scanfolderid": scan_folder_id },
            |row| source_from_row(row, 0),
        )?)
    }

    /// Exact, case-insensitive match on the relative source name across all
    /// scan folders.
    pub fn get_sources_by_source_name(
        &self,
        source_name: &str,
    ) -> Result<Vec<SourceEntry>, OperationError> {
        Ok(self.db().query_vec(
            "SELECT * FROM Sources WHERE SourceName = :sourcename ORDER BY SourceID;",
            named_params! { ":sourcename": source_name },
            |row| source_from_row(row, 0),
        )?)
    }

    pub fn get_source_by_source_name_scan_folder_id(
        &self,
        source_name: &str,
        scan_folder_id: i64,
    ) -> Result<Option<SourceEntry>, OperationError> {
        Ok(select_by_name(&self.db(), source_name, scan_folder_id)?)
    }

    pub fn get_sources_like_source_name(
        &self,
        term: &str,
        like_type: LikeType,
    ) -> Result<Vec<SourceEntry>, OperationError> {
        let pattern = like_search_term(term, like_type);
        Ok(self.db().query_vec(
            "SELECT * FROM Sources WHERE SourceName LIKE :sourcename ESCAPE '|' ORDER BY SourceID;",
            named_params! { ":sourcename": pattern },
            |row| source_from_row(row, 0),
        )?)
    }

    /// Sources that emitted a product with exactly this name.
    pub fn get_sources_by_product_name(
        &self,
        product_name: &str,
    ) -> Result<Vec<SourceEntry>, OperationError> {
        Ok(self.db().query_vec(
            "SELECT DISTINCT Sources.* FROM Sources
             INNER JOIN Jobs ON Jobs.SourcePK = Sources.SourceID
             INNER JOIN Products ON Products.JobPK = Jobs.JobID
             WHERE Products.ProductName = :productname
             ORDER BY Sources.SourceID;",
            named_params! { ":productname": product_name },
            |row| source_from_row(row, 0),
        )?)
    }

    pub fn get_sources_like_product_name(
        &self,
        term: &str,
        like_type: LikeType,
    ) -> Result<Vec<SourceEntry>, OperationError> {
        let pattern = like_search_term(term, like_type);
        Ok(self.db().query_vec(
            "SELECT DISTINCT Sources.* FROM Sources
             INNER JOIN Jobs ON Jobs.SourcePK = Sources.SourceID
             INNER JOIN Products ON Products.JobPK = Jobs.JobID
             WHERE Products.ProductName LIKE :productname ESCAPE '|'
             ORDER BY Sources.SourceID;",
            named_params! { ":productname": pattern },
            |row| source_from_row(row, 0),
        )?)
    }

    /// The stored analysis fingerprint, or `None` if the source is unknown.
    pub fn get_source_analysis_fingerprint(
        &self,
        source_name: &str,
        scan_folder_id: i64,
    ) -> Result<Option<String>, OperationError> {
        Ok(self.db().query_opt(
            "SELECT AnalysisFingerprint FROM Sources
             WHERE SourceName = :sourcename AND ScanFolderPK = :scanfolderid;",
            named_params! { ":sourcename": source_name, ":scanfolderid": scan_folder_id },
            |row| row.get(0),
        )?)
    }

    /// Visit every source joined with its scan folder.
    pub fn query_source_and_scan_folder<F>(&self, mut visit: F) -> Result<(), OperationError>
    where
        F: FnMut(&SourceAndScanFolderEntry) -> ControlFlow<()>,
    {
        self.db().query_each(
            "SELECT ScanFolders.*, Sources.* FROM Sources
             INNER JOIN ScanFolders ON ScanFolders.ScanFolderID = Sources.ScanFolderPK
             ORDER BY Sources.SourceID;",
            &[],
            |row| {
                Ok(SourceAndScanFolderEntry {
                    scan_folder: scan_folder_from_row(row, 0)?,
                    source: source_from_row(row, SCAN_FOLDER_WIDTH)?,
                })
            },
            |entry| visit(&entry),
        )?;
        Ok(())
    }
}

pub(crate) fn select_by_id(db: &Db<'_>, source_id: i64) -> rusqlite::Result<Option<SourceEntry>> {
    db.query_opt(
        "SELECT * FROM Sources WHERE SourceID = :sourceid;",
        named_params! { ":sourceid": source_id },
        |row| source_from_row(row, 0),
    )
}

fn delete_by_id(db: &Db<'_>, source_id: i64) -> rusqlite::Result<usize> {
    db.execute(
        "DELETE FROM Sources WHERE SourceID = :sourceid;",
        named_params! { ":sourceid": source_id },
    )
}

fn select_by_guid(db: &Db<'_>, guid: Uuid) -> rusqlite::Result<Option<SourceEntry>> {
    db.query_opt(
        "SELECT * FROM Sources WHERE SourceGuid = :sourceguid;",
        named_params! { ":sourceguid": guid },
        |row| source_from_row(row, 0),
    )
}

fn select_by_name(
    db: &Db<'_>,
    source_name: &str,
    scan_folder_id: i64,
) -> rusqlite::Result<Option<SourceEntry>> {
    db.query_opt(
        "SELECT * FROM Sources WHERE SourceName = :sourcename AND ScanFolderPK = :scanfolderid;",
        named_params! { ":sourcename": source_name, ":scanfolderid": scan_folder_id },
        |row| source_from_row(row, 0),
    )
}

fn write_source(db: &Db<'_>, entry: &SourceEntry) -> Result<i64, OperationError> {
    let existing = if entry.source_id == INVALID_ENTRY_ID {
        match select_by_guid(db, entry.source_guid)? {
            Some(found) => Some(found),
            None => select_by_name(db, &entry.source_name, entry.scan_folder_pk)?,
        }
    } else {
        Some(
            select_by_id(db, entry.source_id)?
                .ok_or_else(|| OperationError::not_found(ENTITY, entry.source_id))?,
        )
    };

    let Some(existing) = existing else {
        return db
            .insert(
                "INSERT INTO Sources (ScanFolderPK, SourceName, SourceGuid, AnalysisFingerprint)
                 VALUES (:scanfolderpk, :sourcename, :sourceguid, :analysisfingerprint);",
                named_params! {
                    ":scanfolderpk": entry.scan_folder_pk,
                    ":sourcename": entry.source_name,
                    ":sourceguid": entry.source_guid,
                    ":analysisfingerprint": entry.analysis_fingerprint,
                },
            )
            .map_err(|e| write_error(e, ENTITY));
    };

    let id = existing.source_id;
    let updated = SourceEntry {
        source_id: id,
        ..entry.clone()
    };
    if updated != existing {
        db.execute(
            "UPDATE Sources SET ScanFolderPK = :scanfolderpk, SourceName = :sourcename,
                 SourceGuid = :sourceguid, AnalysisFingerprint = :analysisfingerprint
             WHERE SourceID = :sourceid;",
            named_params! {
                ":scanfolderpk": updated.scan_folder_pk,
                ":sourcename": updated.source_name,
                ":sourceguid": updated.source_guid,
                ":analysisfingerprint": updated.analysis_fingerprint,
                ":sourceid": id,
            },
        )
        .map_err(|e| write_error(e, ENTITY))?;
    }
    Ok(id)
}
