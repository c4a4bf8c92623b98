use asset_db_types::{INVALID_ENTRY_ID, SourceDependencyType, SourceFileDependencyEntry};
use rusqlite::named_params;
use uuid::Uuid;

use super::{OperationError, write_error};
use crate::AssetDatabaseConnection;
use crate::exec::Db;
use crate::rows::source_dependency_from_row;

const ENTITY: &str = "source file dependency";

impl AssetDatabaseConnection {
    /// Insert a source dependency. Source dependencies are never updated in
    /// place; callers remove and re-add them.
    pub fn set_source_file_dependency(
        &self,
        entry: &mut SourceFileDependencyEntry,
    ) -> Result<(), OperationError> {
        let id = self.write(|db| insert(db, entry))?;
        entry.source_dependency_id = id;
        Ok(())
    }

    /// Insert a batch of source dependencies in one transaction.
    pub fn set_source_file_dependencies(
        &self,
        entries: &mut [SourceFileDependencyEntry],
    ) -> Result<(), OperationError> {
        if entries.is_empty() {
            return Err(OperationError::empty_input("set_source_file_dependencies"));
        }
        let ids = self.write(|db| {
            entries
                .iter()
                .map(|entry| insert(db, entry))
                .collect::<Result<Vec<_>, _>>()
        })?;
        for (entry, id) in entries.iter_mut().zip(ids) {
            entry.source_dependency_id = id;
        }
        Ok(())
    }

    pub fn remove_source_file_dependency(
        &self,
        source_dependency_id: i64,
    ) -> Result<bool, OperationError> {
        self.write(|db| Ok(delete_by_id(db, source_dependency_id)? > 0))
    }

    /// Remove a batch by id in one transaction. Fails without removing
    /// anything if an entry was never stored or is already gone.
    pub fn remove_source_file_dependencies(
        &self,
        entries: &[SourceFileDependencyEntry],
    ) -> Result<(), OperationError> {
        if entries.is_empty() {
            return Err(OperationError::empty_input("remove_source_file_dependencies"));
        }
        if let Some(bad) = entries
            .iter()
            .find(|e| e.source_dependency_id == INVALID_ENTRY_ID)
        {
            return Err(OperationError::invalid_id(ENTITY, bad.source_dependency_id));
        }
        self.write(|db| {
            for entry in entries {
                if delete_by_id(db, entry.source_dependency_id)? == 0 {
                    return Err(OperationError::not_found(ENTITY, entry.source_dependency_id));
                }
            }
            Ok(())
        })
    }

    pub fn get_source_file_dependency_by_id(
        &self,
        source_dependency_id: i64,
    ) -> Result<Option<SourceFileDependencyEntry>, OperationError> {
        Ok(self.db().query_opt(
            "SELECT * FROM SourceDependency WHERE SourceDependencyID = :sourcedependencyid;",
            named_params! { ":sourcedependencyid": source_dependency_id },
            source_dependency_from_row,
        )?)
    }

    /// Dependencies one builder recorded for a source, of any kind in
    /// `dependency_type`.
    pub fn get_source_file_dependencies_by_builder_guid_and_source(
        &self,
        builder_guid: Uuid,
        source_guid: Uuid,
        dependency_type: SourceDependencyType,
    ) -> Result<Vec<SourceFileDependencyEntry>, OperationError> {
        Ok(self.db().query_vec(
            "SELECT * FROM SourceDependency
             WHERE Source = :source AND TypeOfDependency & :typeofdependency
                 AND BuilderGuid = :builderguid
             ORDER BY SourceDependencyID;",
            named_params! {
                ":source": source_guid,
                ":typeofdependency": dependency_type.bits() as i64,
                ":builderguid": builder_guid,
            },
            source_dependency_from_row,
        )?)
    }

    /// What a source depends on, as recorded by any builder.
    pub fn get_depends_on_source_by_source(
        &self,
        source_guid: Uuid,
        dependency_type: SourceDependencyType,
    ) -> Result<Vec<SourceFileDependencyEntry>, OperationError> {
        Ok(self.db().query_vec(
            "SELECT * FROM SourceDependency
             WHERE Source = :source AND TypeOfDependency & :typeofdependency
             ORDER BY SourceDependencyID;",
            named_params! {
                ":source": source_guid,
                ":typeofdependency": dependency_type.bits() as i64,
            },
            source_dependency_from_row,
        )?)
    }

    /// Reverse lookup: dependencies that name the given source, by uuid,
    /// relative path or absolute path.
    pub fn get_source_file_dependencies_by_depends_on_source(
        &self,
        source_guid: Uuid,
        relative_path: &str,
        absolute_path: &str,
        dependency_type: SourceDependencyType,
    ) -> Result<Vec<SourceFileDependencyEntry>, OperationError> {
        let uuid = source_guid.braced().to_string();
        Ok(self.db().query_vec(
            "SELECT * FROM SourceDependency
             WHERE DependsOnSource IN (:relativepath, :absolutepath, :uuid)
                 AND TypeOfDependency & :typeofdependency
             ORDER BY SourceDependencyID;",
            named_params! {
                ":relativepath": relative_path,
                ":absolutepath": absolute_path,
                ":uuid": uuid,
                ":typeofdependency": dependency_type.bits() as i64,
            },
            source_dependency_from_row,
        )?)
    }

    /// Like [`get_source_file_dependencies_by_depends_on_source`], plus
    /// wildcard dependencies whose stored pattern matches either path.
    ///
    /// [`get_source_file_dependencies_by_depends_on_source`]: Self::get_source_file_dependencies_by_depends_on_source
    pub fn get_source_file_dependencies_by_depends_on_source_wildcard(
        &self,
        source_guid: Uuid,
        relative_path: &str,
        absolute_path: &str,
        dependency_type: SourceDependencyType,
    ) -> Result<Vec<SourceFileDependencyEntry>, OperationError> {
        let uuid = source_guid.braced().to_string();
        Ok(self.db().query_vec(
            "SELECT * FROM SourceDependency
             WHERE (DependsOnSource IN (:relativepath, :absolutepath, :uuid)
                     AND TypeOfDependency & :typeofdependency)
                 OR (TypeOfDependency = :likematch
                     AND (:relativepath LIKE DependsOnSource ESCAPE '|'
                         OR :absolutepath LIKE DependsOnSource ESCAPE '|'))
             ORDER BY SourceDependencyID;",
            named_params! {
                ":relativepath": relative_path,
                ":absolutepath": absolute_path,
                ":uuid": uuid,
                ":typeofdependency": dependency_type.bits() as i64,
                ":likematch": SourceDependencyType::SOURCE_LIKE_MATCH.bits() as i64,
            },
            source_dependency_from_row,
        )?)
    }
}

fn delete_by_id(db: &Db<'_>, source_dependency_id: i64) -> rusqlite::Result<usize> {
    db.execute(
        "DELETE FROM SourceDependency WHERE SourceDependencyID = :sourcedependencyid;",
        named_params! { ":sourcedependencyid": source_dependency_id },
    )
}

fn insert(db: &Db<'_>, entry: &SourceFileDependencyEntry) -> Result<i64, OperationError> {
    db.insert(
        "INSERT INTO SourceDependency (BuilderGuid, Source, DependsOnSource, TypeOfDependency,
             FromAssetId, SubIds)
         VALUES (:builderguid, :source, :dependsonsource, :typeofdependency, :fromassetid,
             :subids);",
        named_params! {
            ":builderguid": entry.builder_guid,
            ":source": entry.source_guid,
            ":dependsonsource": entry.depends_on_source.to_string(),
            ":typeofdependency": entry.type_of_dependency.bits() as i64,
            ":fromassetid": entry.from_asset_id,
            ":subids": entry.sub_ids,
        },
    )
    .map_err(|e| write_error(e, ENTITY))
}
