//! Asset database entry types, bitset flags, and LIKE helpers.
//!
//! This crate defines the persistent data model without any database
//! dependencies. Consumers build these value types and hand them to
//! `asset-db` for persistence.

pub mod flags;
pub mod like;
pub mod types;

pub use flags::{DependencyFlags, ProductOutputFlags, SourceDependencyType};
pub use like::{LikeType, escape_like, like_search_term, wildcard_to_like};
pub use types::*;
