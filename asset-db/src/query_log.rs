//! Statement tracing for debugging.
//!
//! When query logging is enabled on a connection, every statement it runs is
//! emitted on [`QUERY_LOG_TARGET`] in the form
//! ``<statement> = Params :name = `value`, ...``.

use rusqlite::ToSql;
use rusqlite::types::{ToSqlOutput, ValueRef};
use uuid::Uuid;

/// `log` target used for traced statements.
pub const QUERY_LOG_TARGET: &str = "asset_db::query";

/// Render a statement and its bound parameters as a single line.
///
/// Runs of whitespace in the statement collapse to one space so multi-line
/// SQL reads the same as it would in a shell.
pub fn format_query(sql: &str, params: &[(&str, &dyn ToSql)]) -> String {
    let statement = sql.split_whitespace().collect::<Vec<_>>().join(" ");
    if params.is_empty() {
        return statement;
    }

    let rendered: Vec<String> = params
        .iter()
        .map(|(name, value)| format!("{name} = `{}`", render_value(*value)))
        .collect();
    format!("{statement} = Params {}", rendered.join(", "))
}

fn render_value(value: &dyn ToSql) -> String {
    match value.to_sql() {
        Ok(ToSqlOutput::Borrowed(v)) => render_ref(v),
        Ok(ToSqlOutput::Owned(v)) => render_ref(ValueRef::from(&v)),
        Ok(_) => "?".to_string(),
        Err(e) => format!("<{e}>"),
    }
}

fn render_ref(value: ValueRef<'_>) -> String {
    match value {
        ValueRef::Null => "NULL".to_string(),
        ValueRef::Integer(i) => i.to_string(),
        ValueRef::Real(f) => f.to_string(),
        ValueRef::Text(t) => String::from_utf8_lossy(t).into_owned(),
        ValueRef::Blob(b) => match Uuid::from_slice(b) {
            Ok(uuid) => uuid.braced().to_string(),
            Err(_) => b.iter().map(|byte| format!("{byte:02x}")).collect(),
        },
    }
}
