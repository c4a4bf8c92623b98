//! Building SQL `LIKE` search terms.
//!
//! Every LIKE statement in the database uses `ESCAPE '|'`; the pipe is not
//! a valid path character, so it never collides with a real file name.

use serde::{Deserialize, Serialize};

/// Escape character used by every LIKE statement.
pub const LIKE_ESCAPE: char = '|';

/// How a search term is turned into a LIKE pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LikeType {
    /// The term is already a LIKE pattern and is passed through untouched.
    Raw,
    StartsWith,
    EndsWith,
    #[default]
    Matches,
}

/// Escape LIKE wildcards so `term` only matches itself.
pub fn escape_like(term: &str) -> String {
    let mut out = String::with_capacity(term.len());
    for c in term.chars() {
        if c == '%' || c == '_' || c == LIKE_ESCAPE {
            out.push(LIKE_ESCAPE);
        }
        out.push(c);
    }
    out
}

/// Build the pattern bound to a `LIKE :term ESCAPE '|'` parameter.
pub fn like_search_term(term: &str, like_type: LikeType) -> String {
    match like_type {
        LikeType::Raw => term.to_string(),
        LikeType::StartsWith => format!("{}%", escape_like(term)),
        LikeType::EndsWith => format!("%{}", escape_like(term)),
        LikeType::Matches => format!("%{}%", escape_like(term)),
    }
}

/// Convert a `*` wildcard path (as stored in unresolved dependency paths)
/// into a LIKE pattern.
///
/// The unresolved dependency search applies the same conversion in SQL with
/// a `REPLACE` chain, since the pattern lives in the stored row rather than
/// the bound parameter. Keep the two in step.
pub fn wildcard_to_like(pattern: &str) -> String {
    escape_like(pattern).replace('*', "%")
}
