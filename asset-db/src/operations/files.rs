use asset_db_types::{FileEntry, INVALID_ENTRY_ID, LikeType, like_search_term};
use rusqlite::named_params;

use super::{OperationError, write_error};
use crate::AssetDatabaseConnection;
use crate::exec::Db;
use crate::rows::file_from_row;

const ENTITY: &str = "file";

impl AssetDatabaseConnection {
    /// Insert a file, or update the stored row it refers to.
    ///
    /// With an id the file must already exist. Without one, a file with the
    /// same name in the same scan folder is updated in place. Returns `true`
    /// when the stored row already held these exact values and nothing was
    /// written.
    pub fn insert_file(&self, entry: &mut FileEntry) -> Result<bool, OperationError> {
        let (id, unchanged) = self.write(|db| write_file(db, entry))?;
        entry.file_id = id;
        Ok(unchanged)
    }

    /// Insert or update a batch of files in one transaction, matching each
    /// the way [`insert_file`](Self::insert_file) does.
    pub fn insert_files(&self, entries: &mut [FileEntry]) -> Result<(), OperationError> {
        if entries.is_empty() {
            return Err(OperationError::empty_input("insert_files"));
        }
        let ids = self.write(|db| {
            entries
                .iter()
                .map(|entry| write_file(db, entry).map(|(id, _)| id))
                .collect::<Result<Vec<_>, _>>()
        })?;
        for (entry, id) in entries.iter_mut().zip(ids) {
            entry.file_id = id;
        }
        Ok(())
    }

    /// Overwrite a stored file. Returns `false` if there is no such file.
    ///
    /// The file is found by id, or by scan folder and name when the entry
    /// has no id yet.
    pub fn update_file(&self, entry: &mut FileEntry) -> Result<bool, OperationError> {
        let id = self.write(|db| {
            let existing = if entry.file_id == INVALID_ENTRY_ID {
                select_by_name(db, &entry.file_name, entry.scan_folder_pk)?
            } else {
                select_by_id(db, entry.file_id)?
            };
            let Some(existing) = existing else {
                return Ok(None);
            };
            update_if_changed(db, &existing, entry)?;
            Ok(Some(existing.file_id))
        })?;
        match id {
            Some(id) => {
                entry.file_id = id;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Update the modification time and hash of a file found by name.
    /// Returns `false` when no file matches.
    pub fn update_file_mod_time_and_hash_by_file_name_and_scan_folder_id(
        &self,
        file_name: &str,
        scan_folder_id: i64,
        mod_time: u64,
        hash: u64,
    ) -> Result<bool, OperationError> {
        self.write(|db| {
            let updated = db.execute(
                "UPDATE Files SET ModTime = :modtime, Hash = :hash
                 WHERE ScanFolderPK = :scanfolderpk AND FileName = :filename;",
                named_params! {
                    ":modtime": mod_time as i64,
                    ":hash": hash as i64,
                    ":scanfolderpk": scan_folder_id,
                    ":filename": file_name,
                },
            )?;
            Ok(updated > 0)
        })
    }

    pub fn remove_file(&self, file_id: i64) -> Result<bool, OperationError> {
        self.write(|db| {
            let removed = db.execute(
                "DELETE FROM Files WHERE FileID = :fileid;",
                named_params! { ":fileid": file_id },
            )?;
            Ok(removed > 0)
        })
    }

    pub fn get_file_by_id(&self, file_id: i64) -> Result<Option<FileEntry>, OperationError> {
        Ok(select_by_id(&self.db(), file_id)?)
    }

    pub fn get_file_by_file_name_and_scan_folder_id(
        &self,
        file_name: &str,
        scan_folder_id: i64,
    ) -> Result<Option<FileEntry>, OperationError> {
        Ok(select_by_name(&self.db(), file_name, scan_folder_id)?)
    }

    /// Files with this name in any scan folder.
    pub fn get_files_by_file_name(&self, file_name: &str) -> Result<Vec<FileEntry>, OperationError> {
        Ok(self.db().query_vec(
            "SELECT * FROM Files WHERE FileName = :filename ORDER BY FileID;",
            named_params! { ":filename": file_name },
            file_from_row,
        )?)
    }

    pub fn get_files_like_file_name_and_scan_folder_id(
        &self,
        term: &str,
        like_type: LikeType,
        scan_folder_id: i64,
    ) -> Result<Vec<FileEntry>, OperationError> {
        let pattern = like_search_term(term, like_type);
        Ok(self.db().query_vec(
            "SELECT * FROM Files
             WHERE ScanFolderPK = :scanfolderpk AND FileName LIKE :filename ESCAPE '|'
             ORDER BY FileID;",
            named_params! { ":scanfolderpk": scan_folder_id, ":filename": pattern },
            file_from_row,
        )?)
    }

    pub fn get_files_by_scan_folder_id(
        &self,
        scan_folder_id: i64,
    ) -> Result<Vec<FileEntry>, OperationError> {
        Ok(self.db().query_vec(
            "SELECT * FROM Files WHERE ScanFolderPK = :scanfolderpk ORDER BY FileID;",
            named_params! { ":scanfolderpk": scan_folder_id },
            file_from_row,
        )?)
    }

    pub fn get_files(&self) -> Result<Vec<FileEntry>, OperationError> {
        Ok(self
            .db()
            .query_vec("SELECT * FROM Files ORDER BY FileID;", &[], file_from_row)?)
    }
}

fn select_by_id(db: &Db<'_>, file_id: i64) -> rusqlite::Result<Option<FileEntry>> {
    db.query_opt(
        "SELECT * FROM Files WHERE FileID = :fileid;",
        named_params! { ":fileid": file_id },
        file_from_row,
    )
}

fn select_by_name(
    db: &Db<'_>,
    file_name: &str,
    scan_folder_id: i64,
) -> rusqlite::Result<Option<FileEntry>> {
    db.query_opt(
        "SELECT * FROM Files WHERE ScanFolderPK = :scanfolderpk AND FileName = :filename;",
        named_params! { ":scanfolderpk": scan_folder_id, ":filename": file_name },
        file_from_row,
    )
}

/// Write `entry` and return its id, plus whether the stored row was left
/// untouched because it already matched.
fn write_file(db: &Db<'_>, entry: &FileEntry) -> Result<(i64, bool), OperationError> {
    let existing = if entry.file_id == INVALID_ENTRY_ID {
        select_by_name(db, &entry.file_name, entry.scan_folder_pk)?
    } else {
        Some(
            select_by_id(db, entry.file_id)?
                .ok_or_else(|| OperationError::not_found(ENTITY, entry.file_id))?,
        )
    };

    let Some(existing) = existing else {
        let id = db
            .insert(
                "INSERT INTO Files (ScanFolderPK, FileName, IsFolder, ModTime, Hash)
                 VALUES (:scanfolderpk, :filename, :isfolder, :modtime, :hash);",
                named_params! {
                    ":scanfolderpk": entry.scan_folder_pk,
                    ":filename": entry.file_name,
                    ":isfolder": entry.is_folder,
                    ":modtime": entry.mod_time as i64,
                    ":hash": entry.hash as i64,
                },
            )
            .map_err(|e| write_error(e, ENTITY))?;
        return Ok((id, false));
    };

    let changed = update_if_changed(db, &existing, entry)?;
    Ok((existing.file_id, !changed))
}

/// Store `entry`'s fields on the `existing` row. Returns `false` when they
/// already match.
fn update_if_changed(
    db: &Db<'_>,
    existing: &FileEntry,
    entry: &FileEntry,
) -> Result<bool, OperationError> {
    let updated = FileEntry {
        file_id: existing.file_id,
        ..entry.clone()
    };
    if &updated == existing {
        return Ok(false);
    }
    db.execute(
        "UPDATE Files SET ScanFolderPK = :scanfolderpk, FileName = :filename,
             IsFolder = :isfolder, ModTime = :modtime, Hash = :hash
         WHERE FileID = :fileid;",
        named_params! {
            ":scanfolderpk": updated.scan_folder_pk,
            ":filename": updated.file_name,
            ":isfolder": updated.is_folder,
            ":modtime": updated.mod_time as i64,
            ":hash": updated.hash as i64,
            ":fileid": updated.file_id,
        },
    )
    .map_err(|e| write_error(e, ENTITY))?;
    Ok(true)
}
