//! Inline comment module
//!
//! Persisted comment model, the viewer-scoped view used while applying
//! drafts, and a builder for constructing comments.

pub mod builder;
pub mod model;
pub mod view;

pub use builder::InlineCommentBuilder;
pub use model::*;
pub use view::InlineCommentView;
