//! iq-core - Core library for inline-query
//!
//! Loads the inline comments a viewer may see on a revision or commit:
//! visibility filtering, reply resolution, draft overlay, hidden flags and
//! source context. Storage is reached only through the traits in [`store`].

pub mod comment;
pub mod config;
pub mod diff;
pub mod error;
pub mod query;
pub mod store;
pub mod types;

pub use error::{InlineQueryError, Result};
pub use query::{InlineQuery, InlineQueryBuilder, QueryEngine, QueryResult};
pub use types::*;
