use asset_db_types::{INVALID_ENTRY_ID, ScanFolderEntry};
use rusqlite::named_params;

use super::{OperationError, write_error};
use crate::AssetDatabaseConnection;
use crate::exec::Db;
use crate::rows::scan_folder_from_row;

const ENTITY: &str = "scan folder";

impl AssetDatabaseConnection {
    /// Insert or update a scan folder.
    ///
    /// Without an id the folder is matched by portable key, so re-adding a
    /// folder that moved on disk updates its path in place.
    pub fn set_scan_folder(&self, entry: &mut ScanFolderEntry) -> Result<(), OperationError> {
        let id = self.write(|db| write_scan_folder(db, entry))?;
        entry.scan_folder_id = id;
        Ok(())
    }

    /// Remove a scan folder and, by cascade, everything beneath it.
    pub fn remove_scan_folder(&self, scan_folder_id: i64) -> Result<bool, OperationError> {
        self.write(|db| Ok(delete_by_id(db, scan_folder_id)? > 0))
    }

    /// Remove every listed scan folder, or none of them.
    pub fn remove_scan_folders(&self, entries: &mut [ScanFolderEntry]) -> Result<(), OperationError> {
        if entries.is_empty() {
            return Err(OperationError::empty_input("remove_scan_folders"));
        }
        if let Some(bad) = entries.iter().find(|e| e.scan_folder_id == INVALID_ENTRY_ID) {
            return Err(OperationError::invalid_id(ENTITY, bad.scan_folder_id));
        }
        self.write(|db| {
            for entry in entries.iter() {
                if delete_by_id(db, entry.scan_folder_id)? == 0 {
                    return Err(OperationError::not_found(ENTITY, entry.scan_folder_id));
                }
            }
            Ok(())
        })?;
        for entry in entries.iter_mut() {
            entry.scan_folder_id = INVALID_ENTRY_ID;
        }
        Ok(())
    }

    pub fn get_scan_folder_by_id(
        &self,
        scan_folder_id: i64,
    ) -> Result<Option<ScanFolderEntry>, OperationError> {
        Ok(select_by_id(&self.db(), scan_folder_id)?)
    }

    pub fn get_scan_folder_by_portable_key(
        &self,
        portable_key: &str,
    ) -> Result<Option<ScanFolderEntry>, OperationError> {
        Ok(select_by_portable_key(&self.db(), portable_key)?)
    }

    pub fn get_scan_folder_by_display_name(
        &self,
        display_name: &str,
    ) -> Result<Option<ScanFolderEntry>, OperationError> {
        Ok(self.db().query_opt(
            "SELECT * FROM ScanFolders WHERE DisplayName = :displayname;",
            named_params! { ":displayname": display_name },
            |row| scan_folder_from_row(row, 0),
        )?)
    }

    /// The scan folder a source lives in.
    pub fn get_scan_folder_by_source_id(
        &self,
        source_id: i64,
    ) -> Result<Option<ScanFolderEntry>, OperationError> {
        Ok(self.db().query_opt(
            "SELECT ScanFolders.* FROM ScanFolders
             INNER JOIN Sources ON Sources.ScanFolderPK = ScanFolders.ScanFolderID
             WHERE Sources.SourceID = :sourceid;",
            named_params! { ":sourceid": source_id },
            |row| scan_folder_from_row(row, 0),
        )?)
    }

    pub fn get_scan_folder_by_job_id(
        &self,
        job_id: i64,
    ) -> Result<Option<ScanFolderEntry>, OperationError> {
        Ok(self.db().query_opt(
            "SELECT ScanFolders.* FROM ScanFolders
             INNER JOIN Sources ON Sources.ScanFolderPK = ScanFolders.ScanFolderID
             INNER JOIN Jobs ON Jobs.SourcePK = Sources.SourceID
             WHERE Jobs.JobID = :jobid;",
            named_params! { ":jobid": job_id },
            |row| scan_folder_from_row(row, 0),
        )?)
    }

    pub fn get_scan_folder_by_product_id(
        &self,
        product_id: i64,
    ) -> Result<Option<ScanFolderEntry>, OperationError> {
        Ok(self.db().query_opt(
            "SELECT ScanFolders.* FROM ScanFolders
             INNER JOIN Sources ON Sources.ScanFolderPK = ScanFolders.ScanFolderID
             INNER JOIN Jobs ON Jobs.SourcePK = Sources.SourceID
             INNER JOIN Products ON Products.JobPK = Jobs.JobID
             WHERE Products.ProductID = :productid;",
            named_params! { ":productid": product_id },
            |row| scan_folder_from_row(row, 0),
        )?)
    }

    pub fn get_scan_folders(&self) -> Result<Vec<ScanFolderEntry>, OperationError> {
        Ok(self.db().query_vec(
            "SELECT * FROM ScanFolders ORDER BY ScanFolderID;",
            &[],
            |row| scan_folder_from_row(row, 0),
        )?)
    }
}

fn select_by_id(db: &Db<'_>, scan_folder_id: i64) -> rusqlite::Result<Option<ScanFolderEntry>> {
    db.query_opt(
        "SELECT * FROM ScanFolders WHERE ScanFolderID = :scanfolderid;",
        named_params! { ":scanfolderid": scan_folder_id },
        |row| scan_folder_from_row(row, 0),
    )
}

fn delete_by_id(db: &Db<'_>, scan_folder_id: i64) -> rusqlite::Result<usize> {
    db.execute(
        "DELETE FROM ScanFolders WHERE ScanFolderID = :scanfolderid;",
        named_params! { ":scanfolderid": scan_folder_id },
    )
}

fn select_by_portable_key(
    db: &Db<'_>,
    portable_key: &str,
) -> rusqlite::Result<Option<ScanFolderEntry>> {
    db.query_opt(
        "SELECT * FROM ScanFolders WHERE PortableKey = :portablekey;",
        named_params! { ":portablekey": portable_key },
        |row| scan_folder_from_row(row, 0),
    )
}

fn write_scan_folder(db: &Db<'_>, entry: &ScanFolderEntry) -> Result<i64, OperationError> {
    let existing = if entry.scan_folder_id == INVALID_ENTRY_ID {
        select_by_portable_key(db, &entry.portable_key)?
    } else {
        Some(
            select_by_id(db, entry.scan_folder_id)?
                .ok_or_else(|| OperationError::not_found(ENTITY, entry.scan_folder_id))?,
        )
    };

    let Some(existing) = existing else {
        return db
            .insert(
                "INSERT INTO ScanFolders (ScanFolder, DisplayName, PortableKey, IsRoot)
                 VALUES (:scanfolder, :displayname, :portablekey, :isroot);",
                named_params! {
                    ":scanfolder": entry.scan_folder,
                    ":displayname": entry.display_name,
                    ":portablekey": entry.portable_key,
                    ":isroot": entry.is_root,
                },
            )
            .map_err(|e| write_error(e, ENTITY));
    };

    let id = existing.scan_folder_id;
    let updated = ScanFolderEntry {
        scan_folder_id: id,
        ..entry.clone()
    };
    if updated != existing {
        db.execute(
            "UPDATE ScanFolders SET ScanFolder = :scanfolder, DisplayName = :displayname,
                 PortableKey = :portablekey, IsRoot = :isroot
             WHERE ScanFolderID = :scanfolderid;",
            named_params! {
                ":scanfolder": updated.scan_folder,
                ":displayname": updated.display_name,
                ":portablekey": updated.portable_key,
                ":isroot": updated.is_root,
                ":scanfolderid": id,
            },
        )
        .map_err(|e| write_error(e, ENTITY))?;
    }
    Ok(id)
}
