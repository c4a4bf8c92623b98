use std::ops::ControlFlow;

use asset_db_types::StatEntry;
use rusqlite::named_params;

use super::OperationError;
use crate::AssetDatabaseConnection;
use crate::rows::stat_from_row;

impl AssetDatabaseConnection {
    /// Insert or fully replace a stat by name.
    pub fn replace_stat(&self, stat: &StatEntry) -> Result<(), OperationError> {
        self.write(|db| {
            db.execute(
                "INSERT INTO Stats (StatName, StatValue, LastLogTime)
                 VALUES (:statname, :statvalue, :lastlogtime)
                 ON CONFLICT(StatName) DO UPDATE SET
                     StatValue = excluded.StatValue,
                     LastLogTime = excluded.LastLogTime;",
                named_params! {
                    ":statname": stat.stat_name,
                    ":statvalue": stat.stat_value,
                    ":lastlogtime": stat.last_log_time,
                },
            )?;
            Ok(())
        })
    }

    pub fn get_stat_by_stat_name(&self, stat_name: &str) -> Result<Option<StatEntry>, OperationError> {
        Ok(self.db().query_opt(
            "SELECT * FROM Stats WHERE StatName = :statname;",
            named_params! { ":statname": stat_name },
            stat_from_row,
        )?)
    }

    /// Stats whose name matches a raw LIKE pattern, e.g. `"Apple_%"`.
    ///
    /// The pattern is used as given; `|` escapes a literal `%` or `_`.
    pub fn get_stat_like_stat_name(&self, pattern: &str) -> Result<Vec<StatEntry>, OperationError> {
        Ok(self.db().query_vec(
            "SELECT * FROM Stats WHERE StatName LIKE :statname ESCAPE '|' ORDER BY StatName;",
            named_params! { ":statname": pattern },
            stat_from_row,
        )?)
    }

    /// Visit every stat until `visit` breaks.
    pub fn query_stats_table<F>(&self, mut visit: F) -> Result<(), OperationError>
    where
        F: FnMut(&StatEntry) -> ControlFlow<()>,
    {
        self.db().query_each(
            "SELECT * FROM Stats ORDER BY StatName;",
            &[],
            stat_from_row,
            |stat| visit(&stat),
        )?;
        Ok(())
    }
}
