use std::collections::BTreeSet;

use asset_db_types::{INVALID_ENTRY_ID, ProductDependencyEntry};
use rusqlite::named_params;

use super::{OperationError, write_error};
use crate::AssetDatabaseConnection;
use crate::exec::Db;
use crate::rows::product_dependency_from_row;

const ENTITY: &str = "product dependency";

impl AssetDatabaseConnection {
    /// Insert or update a single dependency.
    ///
    /// Without an id, an existing row of the same product that is equal in
    /// every other field is reused instead of inserting a duplicate.
    pub fn set_product_dependency(
        &self,
        entry: &mut ProductDependencyEntry,
    ) -> Result<(), OperationError> {
        let id = self.write(|db| upsert(db, entry))?;
        entry.product_dependency_id = id;
        Ok(())
    }

    /// Upsert each entry in one transaction, leaving other dependencies of
    /// the same products untouched.
    pub fn update_product_dependencies(
        &self,
        entries: &mut [ProductDependencyEntry],
    ) -> Result<(), OperationError> {
        if entries.is_empty() {
            return Err(OperationError::empty_input("update_product_dependencies"));
        }
        let ids = self.write(|db| {
            entries
                .iter()
                .map(|entry| upsert(db, entry))
                .collect::<Result<Vec<_>, _>>()
        })?;
        for (entry, id) in entries.iter_mut().zip(ids) {
            entry.product_dependency_id = id;
        }
        Ok(())
    }

    /// Replace all dependencies of every product in the batch with the batch.
    pub fn set_product_dependencies(
        &self,
        entries: &mut [ProductDependencyEntry],
    ) -> Result<(), OperationError> {
        if entries.is_empty() {
            return Err(OperationError::empty_input("set_product_dependencies"));
        }
        let products: BTreeSet<i64> = entries.iter().map(|e| e.product_pk).collect();
        let ids = self.write(|db| {
            for product_id in &products {
                delete_by_product_id(db, *product_id)?;
            }
            entries
                .iter()
                .map(|entry| insert(db, entry))
                .collect::<Result<Vec<_>, _>>()
        })?;
        for (entry, id) in entries.iter_mut().zip(ids) {
            entry.product_dependency_id = id;
        }
        log::debug!(
            "Replaced dependencies of {} product(s) with {} row(s)",
            products.len(),
            entries.len()
        );
        Ok(())
    }

    pub fn remove_product_dependency(
        &self,
        product_dependency_id: i64,
    ) -> Result<bool, OperationError> {
        self.write(|db| {
            let removed = db.execute(
                "DELETE FROM ProductDependencies WHERE ProductDependencyID = :productdependencyid;",
                named_params! { ":productdependencyid": product_dependency_id },
            )?;
            Ok(removed > 0)
        })
    }

    pub fn remove_product_dependency_by_product_id(
        &self,
        product_id: i64,
    ) -> Result<bool, OperationError> {
        self.write(|db| Ok(delete_by_product_id(db, product_id)? > 0))
    }

    pub fn get_product_dependency_by_id(
        &self,
        product_dependency_id: i64,
    ) -> Result<Option<ProductDependencyEntry>, OperationError> {
        Ok(select_by_id(&self.db(), product_dependency_id)?)
    }

    pub fn get_product_dependencies_by_product_id(
        &self,
        product_id: i64,
    ) -> Result<Vec<ProductDependencyEntry>, OperationError> {
        Ok(select_by_product_id(&self.db(), product_id)?)
    }

    pub fn get_product_dependencies(&self) -> Result<Vec<ProductDependencyEntry>, OperationError> {
        Ok(self.db().query_vec(
            "SELECT * FROM ProductDependencies ORDER BY ProductDependencyID;",
            &[],
            product_dependency_from_row,
        )?)
    }
}

fn select_by_id(
    db: &Db<'_>,
    product_dependency_id: i64,
) -> rusqlite::Result<Option<ProductDependencyEntry>> {
    db.query_opt(
        "SELECT * FROM ProductDependencies WHERE ProductDependencyID = :productdependencyid;",
        named_params! { ":productdependencyid": product_dependency_id },
        product_dependency_from_row,
    )
}

fn select_by_product_id(
    db: &Db<'_>,
    product_id: i64,
) -> rusqlite::Result<Vec<ProductDependencyEntry>> {
    db.query_vec(
        "SELECT * FROM ProductDependencies WHERE ProductPK = :productpk
         ORDER BY ProductDependencyID;",
        named_params! { ":productpk": product_id },
        product_dependency_from_row,
    )
}

fn delete_by_product_id(db: &Db<'_>, product_id: i64) -> rusqlite::Result<usize> {
    db.execute(
        "DELETE FROM ProductDependencies WHERE ProductPK = :productpk;",
        named_params! { ":productpk": product_id },
    )
}

fn insert(db: &Db<'_>, entry: &ProductDependencyEntry) -> Result<i64, OperationError> {
    db.insert(
        "INSERT INTO ProductDependencies (ProductPK, DependencySourceGuid, DependencySubID,
             Platform, DependencyFlags, UnresolvedPath, UnresolvedDependencyType, FromAssetId)
         VALUES (:productpk, :dependencysourceguid, :dependencysubid, :platform,
             :dependencyflags, :unresolvedpath, :unresolveddependencytype, :fromassetid);",
        named_params! {
            ":productpk": entry.product_pk,
            ":dependencysourceguid": entry.dependency_source_guid,
            ":dependencysubid": entry.dependency_sub_id,
            ":platform": entry.platform,
            ":dependencyflags": entry.dependency_flags.bits() as i64,
            ":unresolvedpath": entry.unresolved_path,
            ":unresolveddependencytype": entry.unresolved_dependency_type.as_i32(),
            ":fromassetid": entry.from_asset_id,
        },
    )
    .map_err(|e| write_error(e, ENTITY))
}

fn upsert(db: &Db<'_>, entry: &ProductDependencyEntry) -> Result<i64, OperationError> {
    if entry.product_dependency_id == INVALID_ENTRY_ID {
        let siblings = select_by_product_id(db, entry.product_pk)?;
        let same = siblings.iter().find(|existing| {
            **existing
                == ProductDependencyEntry {
                    product_dependency_id: existing.product_dependency_id,
                    ..entry.clone()
                }
        });
        return match same {
            Some(existing) => Ok(existing.product_dependency_id),
            None => insert(db, entry),
        };
    }

    let id = entry.product_dependency_id;
    let existing =
        select_by_id(db, id)?.ok_or_else(|| OperationError::not_found(ENTITY, id))?;
    if existing == *entry {
        return Ok(id);
    }
    db.execute(
        "UPDATE ProductDependencies SET ProductPK = :productpk,
             DependencySourceGuid = :dependencysourceguid, DependencySubID = :dependencysubid,
             Platform = :platform, DependencyFlags = :dependencyflags,
             UnresolvedPath = :unresolvedpath,
             UnresolvedDependencyType = :unresolveddependencytype, FromAssetId = :fromassetid
         WHERE ProductDependencyID = :productdependencyid;",
        named_params! {
            ":productpk": entry.product_pk,
            ":dependencysourceguid": entry.dependency_source_guid,
            ":dependencysubid": entry.dependency_sub_id,
            ":platform": entry.platform,
            ":dependencyflags": entry.dependency_flags.bits() as i64,
            ":unresolvedpath": entry.unresolved_path,
            ":unresolveddependencytype": entry.unresolved_dependency_type.as_i32(),
            ":fromassetid": entry.from_asset_id,
            ":productdependencyid": id,
        },
    )
    .map_err(|e| write_error(e, ENTITY))?;
    Ok(id)
}
