use asset_db_types::BuilderInfoEntry;
use rusqlite::named_params;

use super::OperationError;
use crate::AssetDatabaseConnection;
use crate::rows::builder_info_from_row;

impl AssetDatabaseConnection {
    /// Replace the whole builder table with `entries`, assigning ids.
    pub fn set_builder_info_table(
        &self,
        entries: &mut [BuilderInfoEntry],
    ) -> Result<(), OperationError> {
        let ids = self.write(|db| {
            db.execute("DELETE FROM BuilderInfo;", &[])?;
            let mut ids = Vec::with_capacity(entries.len());
            for entry in entries.iter() {
                ids.push(db.insert(
                    "INSERT INTO BuilderInfo (Guid, AnalysisFingerprint)
                     VALUES (:guid, :analysisfingerprint);",
                    named_params! {
                        ":guid": entry.builder_uuid,
                        ":analysisfingerprint": entry.analysis_fingerprint,
                    },
                )?);
            }
            Ok(ids)
        })?;
        for (entry, id) in entries.iter_mut().zip(ids) {
            entry.builder_info_id = id;
        }
        Ok(())
    }

    pub fn get_builder_info_table(&self) -> Result<Vec<BuilderInfoEntry>, OperationError> {
        Ok(self.db().query_vec(
            "SELECT * FROM BuilderInfo ORDER BY BuilderID;",
            &[],
            builder_info_from_row,
        )?)
    }
}
