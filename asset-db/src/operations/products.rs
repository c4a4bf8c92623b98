use asset_db_types::{INVALID_ENTRY_ID, LikeType, ProductEntry, like_search_term};
use rusqlite::named_params;
use uuid::Uuid;

use super::{OperationError, write_error};
use crate::AssetDatabaseConnection;
use crate::exec::Db;
use crate::filter::{JOB_FILTER_SQL, ProductFilter};
use crate::rows::product_from_row;

const ENTITY: &str = "product";

impl AssetDatabaseConnection {
    /// Insert or update a product.
    ///
    /// Without an id the product is matched by (job, sub id); re-submitting
    /// the same output of a job updates it in place.
    pub fn set_product(&self, entry: &mut ProductEntry) -> Result<(), OperationError> {
        let id = self.write(|db| write_product(db, entry))?;
        entry.product_id = id;
        Ok(())
    }

    /// Set every product in one transaction. Nothing is written if any
    /// entry fails.
    pub fn set_products(&self, entries: &mut [ProductEntry]) -> Result<(), OperationError> {
        if entries.is_empty() {
            return Err(OperationError::empty_input("set_products"));
        }
        let ids = self.write(|db| {
            entries
                .iter()
                .map(|entry| write_product(db, entry))
                .collect::<Result<Vec<_>, _>>()
        })?;
        for (entry, id) in entries.iter_mut().zip(ids) {
            entry.product_id = id;
        }
        Ok(())
    }

    pub fn remove_product(&self, product_id: i64) -> Result<bool, OperationError> {
        self.write(|db| Ok(delete_by_id(db, product_id)? > 0))
    }

    /// Remove every listed product, or none of them.
    ///
    /// On success each entry's id is reset so it reads as unpersisted.
    pub fn remove_products(&self, entries: &mut [ProductEntry]) -> Result<(), OperationError> {
        if entries.is_empty() {
            return Err(OperationError::empty_input("remove_products"));
        }
        if let Some(bad) = entries.iter().find(|e| e.product_id == INVALID_ENTRY_ID) {
            return Err(OperationError::invalid_id(ENTITY, bad.product_id));
        }
        self.write(|db| {
            for entry in entries.iter() {
                if delete_by_id(db, entry.product_id)? == 0 {
                    return Err(OperationError::not_found(ENTITY, entry.product_id));
                }
            }
            Ok(())
        })?;
        for entry in entries.iter_mut() {
            entry.product_id = INVALID_ENTRY_ID;
        }
        Ok(())
    }

    pub fn remove_products_by_job_id(&self, job_id: i64) -> Result<bool, OperationError> {
        self.write(|db| {
            let removed = db.execute(
                "DELETE FROM Products WHERE JobPK = :jobid;",
                named_params! { ":jobid": job_id },
            )?;
            Ok(removed > 0)
        })
    }

    /// Remove the products of every job of a source that passes `filter`.
    pub fn remove_products_by_source_id(
        &self,
        source_id: i64,
        filter: &ProductFilter,
    ) -> Result<bool, OperationError> {
        let bound = filter.bind();
        let sql = format!(
            "DELETE FROM Products WHERE JobPK IN (
                 SELECT JobID FROM Jobs WHERE Jobs.SourcePK = :sourceid AND {JOB_FILTER_SQL});"
        );
        self.write(|db| {
            let removed = db.execute(
                &sql,
                &bound.params(named_params! { ":sourceid": source_id }),
            )?;
            Ok(removed > 0)
        })
    }

    pub fn get_product_by_id(&self, product_id: i64) -> Result<Option<ProductEntry>, OperationError> {
        Ok(select_by_id(&self.db(), product_id)?)
    }

    pub fn get_product_by_job_id_sub_id(
        &self,
        job_id: i64,
        sub_id: u32,
    ) -> Result<Option<ProductEntry>, OperationError> {
        Ok(select_by_job_sub_id(&self.db(), job_id, sub_id)?)
    }

    /// Products of any job of the source with the given guid and sub id.
    /// Each platform has its own product, so several can match.
    pub fn get_products_by_source_guid_sub_id(
        &self,
        source_guid: Uuid,
        sub_id: u32,
    ) -> Result<Vec<ProductEntry>, OperationError> {
        Ok(self.db().query_vec(
            "SELECT Products.* FROM Products
             INNER JOIN Jobs ON Jobs.JobID = Products.JobPK
             INNER JOIN Sources ON Sources.SourceID = Jobs.SourcePK
             WHERE Sources.SourceGuid = :sourceguid AND Products.SubID = :subid
             ORDER BY Products.ProductID;",
            named_params! { ":sourceguid": source_guid, ":subid": sub_id },
            |row| product_from_row(row, 0),
        )?)
    }

    /// The first product matching a source guid and sub id.
    pub fn get_product_by_source_guid_sub_id(
        &self,
        source_guid: Uuid,
        sub_id: u32,
    ) -> Result<Option<ProductEntry>, OperationError> {
        Ok(self
            .get_products_by_source_guid_sub_id(source_guid, sub_id)?
            .into_iter()
            .next())
    }

    pub fn get_products(&self, filter: &ProductFilter) -> Result<Vec<ProductEntry>, OperationError> {
        self.products_where("1 = 1", &[], filter)
    }

    pub fn get_products_by_job_id(&self, job_id: i64) -> Result<Vec<ProductEntry>, OperationError> {
        Ok(self.db().query_vec(
            "SELECT * FROM Products WHERE JobPK = :jobid ORDER BY ProductID;",
            named_params! { ":jobid": job_id },
            |row| product_from_row(row, 0),
        )?)
    }

    pub fn get_products_by_source_id(
        &self,
        source_id: i64,
        filter: &ProductFilter,
    ) -> Result<Vec<ProductEntry>, OperationError> {
        self.products_where(
            "Jobs.SourcePK = :sourceid",
            named_params! { ":sourceid": source_id },
            filter,
        )
    }

    /// Products of sources with exactly this relative name, in any scan
    /// folder.
    pub fn get_products_by_source_name(
        &self,
        source_name: &str,
        filter: &ProductFilter,
    ) -> Result<Vec<ProductEntry>, OperationError> {
        self.products_where(
            "Sources.SourceName = :sourcename",
            named_params! { ":sourcename": source_name },
            filter,
        )
    }

    pub fn get_products_like_source_name(
        &self,
        term: &str,
        like_type: LikeType,
        filter: &ProductFilter,
    ) -> Result<Vec<ProductEntry>, OperationError> {
        let pattern = like_search_term(term, like_type);
        self.products_where(
            "Sources.SourceName LIKE :sourcename ESCAPE '|'",
            named_params! { ":sourcename": pattern },
            filter,
        )
    }

    pub fn get_products_by_product_name(
        &self,
        product_name: &str,
        filter: &ProductFilter,
    ) -> Result<Vec<ProductEntry>, OperationError> {
        self.products_where(
            "Products.ProductName = :productname",
            named_params! { ":productname": product_name },
            filter,
        )
    }

    pub fn get_products_like_product_name(
        &self,
        term: &str,
        like_type: LikeType,
        filter: &ProductFilter,
    ) -> Result<Vec<ProductEntry>, OperationError> {
        let pattern = like_search_term(term, like_type);
        self.products_where(
            "Products.ProductName LIKE :productname ESCAPE '|'",
            named_params! { ":productname": pattern },
            filter,
        )
    }

    /// Products joined up to their source, narrowed by `predicate` and the
    /// job filter.
    fn products_where(
        &self,
        predicate: &str,
        params: crate::exec::Params<'_>,
        filter: &ProductFilter,
    ) -> Result<Vec<ProductEntry>, OperationError> {
        let bound = filter.bind();
        let sql = format!(
            "SELECT Products.* FROM Products
             INNER JOIN Jobs ON Jobs.JobID = Products.JobPK
             INNER JOIN Sources ON Sources.SourceID = Jobs.SourcePK
             WHERE {predicate} AND {JOB_FILTER_SQL}
             ORDER BY Products.ProductID;"
        );
        Ok(self
            .db()
            .query_vec(&sql, &bound.params(params), |row| product_from_row(row, 0))?)
    }
}

fn select_by_id(db: &Db<'_>, product_id: i64) -> rusqlite::Result<Option<ProductEntry>> {
    db.query_opt(
        "SELECT * FROM Products WHERE ProductID = :productid;",
        named_params! { ":productid": product_id },
        |row| product_from_row(row, 0),
    )
}

fn select_by_job_sub_id(
    db: &Db<'_>,
    job_id: i64,
    sub_id: u32,
) -> rusqlite::Result<Option<ProductEntry>> {
    db.query_opt(
        "SELECT * FROM Products WHERE JobPK = :jobpk AND SubID = :subid;",
        named_params! { ":jobpk": job_id, ":subid": sub_id },
        |row| product_from_row(row, 0),
    )
}

fn delete_by_id(db: &Db<'_>, product_id: i64) -> rusqlite::Result<usize> {
    db.execute(
        "DELETE FROM Products WHERE ProductID = :productid;",
        named_params! { ":productid": product_id },
    )
}

pub(crate) fn write_product(db: &Db<'_>, entry: &ProductEntry) -> Result<i64, OperationError> {
    let existing = if entry.product_id == INVALID_ENTRY_ID {
        select_by_job_sub_id(db, entry.job_pk, entry.sub_id)?
    } else {
        Some(
            select_by_id(db, entry.product_id)?
                .ok_or_else(|| OperationError::not_found(ENTITY, entry.product_id))?,
        )
    };

    let Some(existing) = existing else {
        return db
            .insert(
                "INSERT INTO Products (JobPK, SubID, ProductName, AssetType, LegacyGuid, Hash, Flags)
                 VALUES (:jobpk, :subid, :productname, :assettype, :legacyguid, :hash, :flags);",
                named_params! {
                    ":jobpk": entry.job_pk,
                    ":subid": entry.sub_id,
                    ":productname": entry.product_name,
                    ":assettype": entry.asset_type,
                    ":legacyguid": entry.legacy_guid,
                    ":hash": entry.hash as i64,
                    ":flags": entry.flags.bits() as i64,
                },
            )
            .map_err(|e| write_error(e, ENTITY));
    };

    let id = existing.product_id;
    let updated = ProductEntry {
        product_id: id,
        ..entry.clone()
    };
    if updated != existing {
        db.execute(
            "UPDATE Products SET JobPK = :jobpk, SubID = :subid, ProductName = :productname,
                 AssetType = :assettype, LegacyGuid = :legacyguid, Hash = :hash, Flags = :flags
             WHERE ProductID = :productid;",
            named_params! {
                ":jobpk": updated.job_pk,
                ":subid": updated.sub_id,
                ":productname": updated.product_name,
                ":assettype": updated.asset_type,
                ":legacyguid": updated.legacy_guid,
                ":hash": updated.hash as i64,
                ":flags": updated.flags.bits() as i64,
                ":productid": id,
            },
        )
        .map_err(|e| write_error(e, ENTITY))?;
    }
    Ok(id)
}
