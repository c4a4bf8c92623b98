use asset_db_types::{INVALID_ENTRY_ID, LegacySubIdEntry};
use rusqlite::named_params;

use super::{OperationError, write_error};
use crate::AssetDatabaseConnection;
use crate::rows::legacy_sub_id_from_row;

const ENTITY: &str = "legacy sub id";

impl AssetDatabaseConnection {
    /// Insert a new legacy sub id, or overwrite the row with the entry's id.
    pub fn create_or_update_legacy_sub_id(
        &self,
        entry: &mut LegacySubIdEntry,
    ) -> Result<(), OperationError> {
        let id = self.write(|db| {
            if entry.sub_ids_entry_id == INVALID_ENTRY_ID {
                return db
                    .insert(
                        "INSERT INTO LegacySubIDs (ProductPK, SubID) VALUES (:productpk, :subid);",
                        named_params! { ":productpk": entry.product_pk, ":subid": entry.sub_id },
                    )
                    .map_err(|e| write_error(e, ENTITY));
            }
            let updated = db
                .execute(
                    "UPDATE LegacySubIDs SET ProductPK = :productpk, SubID = :subid
                     WHERE LegacySubID = :legacysubid;",
                    named_params! {
                        ":productpk": entry.product_pk,
                        ":subid": entry.sub_id,
                        ":legacysubid": entry.sub_ids_entry_id,
                    },
                )
                .map_err(|e| write_error(e, ENTITY))?;
            if updated == 0 {
                return Err(OperationError::not_found(ENTITY, entry.sub_ids_entry_id));
            }
            Ok(entry.sub_ids_entry_id)
        })?;
        entry.sub_ids_entry_id = id;
        Ok(())
    }

    pub fn remove_legacy_sub_id(&self, sub_ids_entry_id: i64) -> Result<bool, OperationError> {
        self.write(|db| {
            let removed = db.execute(
                "DELETE FROM LegacySubIDs WHERE LegacySubID = :legacysubid;",
                named_params! { ":legacysubid": sub_ids_entry_id },
            )?;
            Ok(removed > 0)
        })
    }

    pub fn remove_legacy_sub_ids_by_product_id(&self, product_id: i64) -> Result<bool, OperationError> {
        self.write(|db| {
            let removed = db.execute(
                "DELETE FROM LegacySubIDs WHERE ProductPK = :productpk;",
                named_params! { ":productpk": product_id },
            )?;
            Ok(removed > 0)
        })
    }

    pub fn get_legacy_sub_ids_by_product_id(
        &self,
        product_id: i64,
    ) -> Result<Vec<LegacySubIdEntry>, OperationError> {
        Ok(self.db().query_vec(
            "SELECT * FROM LegacySubIDs WHERE ProductPK = :productpk ORDER BY LegacySubID;",
            named_params! { ":productpk": product_id },
            legacy_sub_id_from_row,
        )?)
    }
}
