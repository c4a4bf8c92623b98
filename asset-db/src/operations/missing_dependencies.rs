use std::ops::ControlFlow;

use asset_db_types::{INVALID_ENTRY_ID, MissingProductDependencyEntry};
use rusqlite::named_params;

use super::{OperationError, write_error};
use crate::AssetDatabaseConnection;
use crate::exec::Db;
use crate::rows::missing_product_dependency_from_row;

const ENTITY: &str = "missing product dependency";

impl AssetDatabaseConnection {
    /// Record a dependency a scanner could not resolve.
    ///
    /// An explicit id must exist and is overwritten. Without one, an equal
    /// record for the same product is reused, otherwise a row is inserted.
    pub fn set_missing_product_dependency(
        &self,
        entry: &mut MissingProductDependencyEntry,
    ) -> Result<(), OperationError> {
        let id = self.write(|db| write_missing_dependency(db, entry))?;
        entry.missing_product_dependency_id = id;
        Ok(())
    }

    pub fn get_missing_product_dependency_by_id(
        &self,
        missing_product_dependency_id: i64,
    ) -> Result<Option<MissingProductDependencyEntry>, OperationError> {
        Ok(select_by_id(&self.db(), missing_product_dependency_id)?)
    }

    /// Visit the missing dependencies of a product until `visit` breaks.
    pub fn query_missing_product_dependencies_by_product_id<F>(
        &self,
        product_id: i64,
        mut visit: F,
    ) -> Result<(), OperationError>
    where
        F: FnMut(&MissingProductDependencyEntry) -> ControlFlow<()>,
    {
        self.db().query_each(
            SELECT_BY_PRODUCT,
            named_params! { ":productpk": product_id },
            missing_product_dependency_from_row,
            |entry| visit(&entry),
        )?;
        Ok(())
    }

    pub fn get_missing_product_dependencies_by_product_id(
        &self,
        product_id: i64,
    ) -> Result<Vec<MissingProductDependencyEntry>, OperationError> {
        Ok(select_by_product_id(&self.db(), product_id)?)
    }

    pub fn delete_missing_product_dependency_by_product_id(
        &self,
        product_id: i64,
    ) -> Result<bool, OperationError> {
        self.write(|db| {
            let removed = db.execute(
                "DELETE FROM MissingProductDependencies WHERE ProductPK = :productpk;",
                named_params! { ":productpk": product_id },
            )?;
            Ok(removed > 0)
        })
    }

    pub fn delete_missing_product_dependency_by_id(
        &self,
        missing_product_dependency_id: i64,
    ) -> Result<bool, OperationError> {
        self.write(|db| {
            let removed = db.execute(
                "DELETE FROM MissingProductDependencies
                 WHERE MissingProductDependencyId = :missingproductdependencyid;",
                named_params! { ":missingproductdependencyid": missing_product_dependency_id },
            )?;
            Ok(removed > 0)
        })
    }
}

const SELECT_BY_PRODUCT: &str = "SELECT * FROM MissingProductDependencies
     WHERE ProductPK = :productpk ORDER BY MissingProductDependencyId;";

fn select_by_id(
    db: &Db<'_>,
    missing_product_dependency_id: i64,
) -> rusqlite::Result<Option<MissingProductDependencyEntry>> {
    db.query_opt(
        "SELECT * FROM MissingProductDependencies
         WHERE MissingProductDependencyId = :missingproductdependencyid;",
        named_params! { ":missingproductdependencyid": missing_product_dependency_id },
        missing_product_dependency_from_row,
    )
}

fn select_by_product_id(
    db: &Db<'_>,
    product_id: i64,
) -> rusqlite::Result<Vec<MissingProductDependencyEntry>> {
    db.query_vec(
        SELECT_BY_PRODUCT,
        named_params! { ":productpk": product_id },
        missing_product_dependency_from_row,
    )
}

fn write_missing_dependency(
    db: &Db<'_>,
    entry: &MissingProductDependencyEntry,
) -> Result<i64, OperationError> {
    if entry.missing_product_dependency_id == INVALID_ENTRY_ID {
        let siblings = select_by_product_id(db, entry.product_pk)?;
        let same = siblings.iter().find(|existing| {
            **existing
                == MissingProductDependencyEntry {
                    missing_product_dependency_id: existing.missing_product_dependency_id,
                    ..entry.clone()
                }
        });
        if let Some(existing) = same {
            return Ok(existing.missing_product_dependency_id);
        }
        return db
            .insert(
                "INSERT INTO MissingProductDependencies (ProductPK, ScannerId, ScannerVersion,
                     SourceFileFingerprint, DependencySourceGuid, DependencySubId,
                     MissingDependencyString, LastScanTime, ScanTimeSecondsSinceEpoch)
                 VALUES (:productpk, :scannerid, :scannerversion, :sourcefilefingerprint,
                     :dependencysourceguid, :dependencysubid, :missingdependencystring,
                     :lastscantime, :scantimesecondssinceepoch);",
                named_params! {
                    ":productpk": entry.product_pk,
                    ":scannerid": entry.scanner_id,
                    ":scannerversion": entry.scanner_version,
                    ":sourcefilefingerprint": entry.source_file_fingerprint,
                    ":dependencysourceguid": entry.dependency_source_guid,
                    ":dependencysubid": entry.dependency_sub_id,
                    ":missingdependencystring": entry.missing_dependency_string,
                    ":lastscantime": entry.last_scan_time,
                    ":scantimesecondssinceepoch": entry.scan_time_seconds_since_epoch as i64,
                },
            )
            .map_err(|e| write_error(e, ENTITY));
    }

    let id = entry.missing_product_dependency_id;
    let existing = select_by_id(db, id)?.ok_or_else(|| OperationError::not_found(ENTITY, id))?;
    if existing == *entry {
        return Ok(id);
    }
    db.execute(
        "UPDATE MissingProductDependencies SET ProductPK = :productpk, ScannerId = :scannerid,
             ScannerVersion = :scannerversion, SourceFileFingerprint = :sourcefilefingerprint,
             DependencySourceGuid = :dependencysourceguid, DependencySubId = :dependencysubid,
             MissingDependencyString = :missingdependencystring, LastScanTime = :lastscantime,
             ScanTimeSecondsSinceEpoch = :scantimesecondssinceepoch
         WHERE MissingProductDependencyId = :missingproductdependencyid;",
        named_params! {
            ":productpk": entry.product_pk,
            ":scannerid": entry.scanner_id,
            ":scannerversion": entry.scanner_version,
            ":sourcefilefingerprint": entry.source_file_fingerprint,
            ":dependencysourceguid": entry.dependency_source_guid,
            ":dependencysubid": entry.dependency_sub_id,
            ":missingdependencystring": entry.missing_dependency_string,
            ":lastscantime": entry.last_scan_time,
            ":scantimesecondssinceepoch": entry.scan_time_seconds_since_epoch as i64,
            ":missingproductdependencyid": id,
        },
    )
    .map_err(|e| write_error(e, ENTITY))?;
    Ok(id)
}
