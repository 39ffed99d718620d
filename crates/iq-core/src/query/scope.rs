//! Comment kinds the query pipeline can run over

use super::visibility::Clause;
use crate::comment::InlineComment;
use crate::error::Result;
use crate::store::HiddenStore;
use crate::types::{CommentId, Phid};
use std::collections::{BTreeSet, HashSet};
use std::sync::Arc;

/// What differs between kinds of inline comments
pub trait InlineCommentScope: Send + Sync {
    /// Clauses restricting rows to this kind of comment
    fn where_clauses(&self) -> Vec<Clause>;

    /// Clause restricting rows to the given owning objects
    fn object_phid_clause(&self, object_phids: &BTreeSet<Phid>) -> Clause {
        Clause::ObjectPhidIn(object_phids.clone())
    }

    /// IDs among `comments` the viewer has hidden
    fn load_hidden_comment_ids(
        &self,
        viewer: &Phid,
        comments: &[InlineComment],
    ) -> Result<HashSet<CommentId>>;
}

/// Inline comments on revisions
pub struct DiffInlineScope {
    hidden: Arc<dyn HiddenStore>,
}

impl DiffInlineScope {
    /// PHID type tag of revisions
    pub const OBJECT_TYPE: &'static str = "DREV";

    /// Create a scope reading hidden state from `hidden`
    pub fn new(hidden: Arc<dyn HiddenStore>) -> Self {
        Self { hidden }
    }
}

impl InlineCommentScope for DiffInlineScope {
    fn where_clauses(&self) -> Vec<Clause> {
        vec![Clause::ObjectTypeIs(Self::OBJECT_TYPE.to_string())]
    }

    fn load_hidden_comment_ids(
        &self,
        viewer: &Phid,
        comments: &[InlineComment],
    ) -> Result<HashSet<CommentId>> {
        self.hidden.load_hidden(viewer, comments)
    }
}

/// Inline comments on audited commits; these cannot be hidden
#[derive(Debug, Default)]
pub struct AuditInlineScope;

impl AuditInlineScope {
    /// PHID type tag of commits
    pub const OBJECT_TYPE: &'static str = "CMIT";

    /// Create the scope
    pub fn new() -> Self {
        Self
    }
}

impl InlineCommentScope for AuditInlineScope {
    fn where_clauses(&self) -> Vec<Clause> {
        vec![Clause::ObjectTypeIs(Self::OBJECT_TYPE.to_string())]
    }

    fn load_hidden_comment_ids(
        &self,
        _viewer: &Phid,
        _comments: &[InlineComment],
    ) -> Result<HashSet<CommentId>> {
        Ok(HashSet::new())
    }
}
