//! Statement execution with optional tracing.
//!
//! Every statement goes through [`Db`], which caches the prepared statement
//! on the connection and emits it on the query log target when tracing is on.

use std::ops::ControlFlow;

use rusqlite::{Connection, OptionalExtension, Row, ToSql};

use crate::query_log::{QUERY_LOG_TARGET, format_query};

pub(crate) type Params<'a> = &'a [(&'a str, &'a dyn ToSql)];

/// A borrowed connection (or open transaction) plus the tracing switch.
pub(crate) struct Db<'c> {
    conn: &'c Connection,
    log_queries: bool,
}

impl<'c> Db<'c> {
    pub(crate) fn new(conn: &'c Connection, log_queries: bool) -> Self {
        Self { conn, log_queries }
    }

    fn trace(&self, sql: &str, params: Params<'_>) {
        if self.log_queries {
            log::info!(target: QUERY_LOG_TARGET, "{}", format_query(sql, params));
        }
    }

    /// Run a statement, returning the number of changed rows.
    pub(crate) fn execute(&self, sql: &str, params: Params<'_>) -> rusqlite::Result<usize> {
        self.trace(sql, params);
        let mut stmt = self.conn.prepare_cached(sql)?;
        stmt.execute(params)
    }

    /// Run an INSERT and return the new row id.
    pub(crate) fn insert(&self, sql: &str, params: Params<'_>) -> rusqlite::Result<i64> {
        self.execute(sql, params)?;
        Ok(self.conn.last_insert_rowid())
    }

    /// Run a batch of parameterless statements.
    pub(crate) fn execute_batch(&self, sql: &str) -> rusqlite::Result<()> {
        self.trace(sql, &[]);
        self.conn.execute_batch(sql)
    }

    /// Fetch the first row, or `None` when nothing matches.
    pub(crate) fn query_opt<T, F>(
        &self,
        sql: &str,
        params: Params<'_>,
        map: F,
    ) -> rusqlite::Result<Option<T>>
    where
        F: FnOnce(&Row<'_>) -> rusqlite::Result<T>,
    {
        self.trace(sql, params);
        let mut stmt = self.conn.prepare_cached(sql)?;
        stmt.query_row(params, map).optional()
    }

    /// Step through rows, handing each mapped value to `visit` until it
    /// breaks. Returns the number of rows visited.
    pub(crate) fn query_each<T, M, V>(
        &self,
        sql: &str,
        params: Params<'_>,
        mut map: M,
        mut visit: V,
    ) -> rusqlite::Result<usize>
    where
        M: FnMut(&Row<'_>) -> rusqlite::Result<T>,
        V: FnMut(T) -> ControlFlow<()>,
    {
        self.trace(sql, params);
        let mut stmt = self.conn.prepare_cached(sql)?;
        let mut rows = stmt.query(params)?;
        let mut visited = 0;
        while let Some(row) = rows.next()? {
            visited += 1;
            if visit(map(row)?).is_break() {
                break;
            }
        }
        Ok(visited)
    }

    /// Collect every matching row.
    pub(crate) fn query_vec<T, M>(
        &self,
        sql: &str,
        params: Params<'_>,
        map: M,
    ) -> rusqlite::Result<Vec<T>>
    where
        M: FnMut(&Row<'_>) -> rusqlite::Result<T>,
    {
        let mut out = Vec::new();
        self.query_each(sql, params, map, |item| {
            out.push(item);
            ControlFlow::Continue(())
        })?;
        Ok(out)
    }

    pub(crate) fn count(&self, sql: &str, params: Params<'_>) -> rusqlite::Result<i64> {
        self.trace(sql, params);
        let mut stmt = self.conn.prepare_cached(sql)?;
        stmt.query_row(params, |row| row.get(0))
    }
}
