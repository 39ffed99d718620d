//! Query configuration
//!
//! [`InlineQueryBuilder`] collects filters and toggles; [`InlineQuery`] is
//! the validated, immutable result handed to the pipeline.

use crate::comment::FixedState;
use crate::config::QueryDefaults;
use crate::error::{InlineQueryError, Result};
use crate::types::{CommentId, Phid, Viewer};
use std::collections::BTreeSet;

/// Validated query configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InlineQuery {
    viewer: Viewer,
    ids: Option<BTreeSet<CommentId>>,
    phids: Option<BTreeSet<Phid>>,
    object_phids: Option<BTreeSet<Phid>>,
    author_phids: Option<BTreeSet<Phid>>,
    fixed_states: Option<BTreeSet<FixedState>>,
    published_comments: bool,
    publishable_comments: bool,
    need_reply_to_comments: bool,
    need_hidden: bool,
    need_applied_drafts: bool,
    need_inline_context: bool,
    limit: Option<usize>,
}

impl InlineQuery {
    pub fn viewer(&self) -> &Viewer {
        &self.viewer
    }

    pub fn ids(&self) -> Option<&BTreeSet<CommentId>> {
        self.ids.as_ref()
    }

    pub fn phids(&self) -> Option<&BTreeSet<Phid>> {
        self.phids.as_ref()
    }

    pub fn object_phids(&self) -> Option<&BTreeSet<Phid>> {
        self.object_phids.as_ref()
    }

    pub fn author_phids(&self) -> Option<&BTreeSet<Phid>> {
        self.author_phids.as_ref()
    }

    pub fn fixed_states(&self) -> Option<&BTreeSet<FixedState>> {
        self.fixed_states.as_ref()
    }

    pub fn published_comments(&self) -> bool {
        self.published_comments
    }

    pub fn publishable_comments(&self) -> bool {
        self.publishable_comments
    }

    pub fn need_reply_to_comments(&self) -> bool {
        self.need_reply_to_comments
    }

    pub fn need_hidden(&self) -> bool {
        self.need_hidden
    }

    pub fn need_applied_drafts(&self) -> bool {
        self.need_applied_drafts
    }

    pub fn need_inline_context(&self) -> bool {
        self.need_inline_context
    }

    pub fn limit(&self) -> Option<usize> {
        self.limit
    }

    /// Query loading the parents of a page's replies
    ///
    /// Keeps the viewer and visibility scope and targets `phids`. Parents
    /// may have any author. Every `need_*` toggle is off, so running it can
    /// never trigger another reply lookup.
    pub fn for_reply_lookup(&self, phids: BTreeSet<Phid>) -> InlineQuery {
        InlineQuery {
            viewer: self.viewer.clone(),
            ids: None,
            phids: Some(phids),
            object_phids: self.object_phids.clone(),
            author_phids: None,
            fixed_states: None,
            published_comments: self.published_comments,
            publishable_comments: self.publishable_comments,
            need_reply_to_comments: false,
            need_hidden: false,
            need_applied_drafts: false,
            need_inline_context: false,
            limit: None,
        }
    }
}

/// Builder for [`InlineQuery`] with fluent API
#[derive(Debug, Clone)]
pub struct InlineQueryBuilder {
    viewer: Viewer,
    ids: Option<BTreeSet<CommentId>>,
    phids: Option<BTreeSet<Phid>>,
    object_phids: Option<BTreeSet<Phid>>,
    author_phids: Option<BTreeSet<Phid>>,
    fixed_states: Option<BTreeSet<FixedState>>,
    published_comments: Option<bool>,
    publishable_comments: Option<bool>,
    need_reply_to_comments: bool,
    need_hidden: bool,
    need_applied_drafts: bool,
    need_inline_context: bool,
    limit: Option<usize>,
}

impl InlineQueryBuilder {
    /// Create a builder with every toggle off
    pub fn new(viewer: Viewer) -> Self {
        Self {
            viewer,
            ids: None,
            phids: None,
            object_phids: None,
            author_phids: None,
            fixed_states: None,
            published_comments: None,
            publishable_comments: None,
            need_reply_to_comments: false,
            need_hidden: false,
            need_applied_drafts: false,
            need_inline_context: false,
            limit: None,
        }
    }

    /// Create a builder with toggles taken from configuration
    pub fn from_defaults(viewer: Viewer, defaults: &QueryDefaults) -> Self {
        Self::new(viewer)
            .need_reply_to_comments(defaults.need_reply_to_comments)
            .need_hidden(defaults.need_hidden)
            .need_applied_drafts(defaults.need_applied_drafts)
            .need_inline_context(defaults.need_inline_context)
    }

    /// Restrict to these comment IDs
    pub fn with_ids(mut self, ids: impl IntoIterator<Item = CommentId>) -> Self {
        self.ids = Some(ids.into_iter().collect());
        self
    }

    /// Restrict to these comment PHIDs
    pub fn with_phids(mut self, phids: impl IntoIterator<Item = Phid>) -> Self {
        self.phids = Some(phids.into_iter().collect());
        self
    }

    /// Restrict to comments on these revisions/commits
    pub fn with_object_phids(mut self, phids: impl IntoIterator<Item = Phid>) -> Self {
        self.object_phids = Some(phids.into_iter().collect());
        self
    }

    /// Restrict to comments by these authors
    pub fn with_author_phids(mut self, phids: impl IntoIterator<Item = Phid>) -> Self {
        self.author_phids = Some(phids.into_iter().collect());
        self
    }

    /// Restrict to comments whose fixed state is one of `states`
    pub fn with_fixed_states(mut self, states: impl IntoIterator<Item = FixedState>) -> Self {
        self.fixed_states = Some(states.into_iter().collect());
        self
    }

    /// Include published comments; only `true` is supported
    pub fn with_published_comments(mut self, flag: bool) -> Self {
        self.published_comments = Some(flag);
        self
    }

    /// Include the viewer's publishable drafts; only `true` is supported
    pub fn with_publishable_comments(mut self, flag: bool) -> Self {
        self.publishable_comments = Some(flag);
        self
    }

    /// Resolve each reply's parent comment
    pub fn need_reply_to_comments(mut self, need: bool) -> Self {
        self.need_reply_to_comments = need;
        self
    }

    /// Attach the viewer's hidden flags
    pub fn need_hidden(mut self, need: bool) -> Self {
        self.need_hidden = need;
        self
    }

    /// Show the viewer's unsaved drafts as the comment content
    pub fn need_applied_drafts(mut self, need: bool) -> Self {
        self.need_applied_drafts = need;
        self
    }

    /// Attach surrounding source lines
    pub fn need_inline_context(mut self, need: bool) -> Self {
        self.need_inline_context = need;
        self
    }

    /// Fetch at most `limit` rows
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Validate and build the query
    pub fn build(self) -> Result<InlineQuery> {
        if self.publishable_comments == Some(false) {
            return Err(InlineQueryError::UnsupportedFilter(
                "Querying for comments that are \"not publishable\" is not supported".to_string(),
            ));
        }
        if self.published_comments == Some(false) {
            return Err(InlineQueryError::UnsupportedFilter(
                "Querying for comments that are \"not published\" is not supported".to_string(),
            ));
        }

        Ok(InlineQuery {
            viewer: self.viewer,
            ids: self.ids,
            phids: self.phids,
            object_phids: self.object_phids,
            author_phids: self.author_phids,
            fixed_states: self.fixed_states,
            published_comments: self.published_comments.unwrap_or(false),
            publishable_comments: self.publishable_comments.unwrap_or(false),
            need_reply_to_comments: self.need_reply_to_comments,
            need_hidden: self.need_hidden,
            need_applied_drafts: self.need_applied_drafts,
            need_inline_context: self.need_inline_context,
            limit: self.limit,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn alice() -> Viewer {
        Viewer::user(Phid::from_string("PHID-USER-alice"))
    }

    #[test]
    fn test_negated_filters_are_unsupported() {
        for viewer in [Viewer::anonymous(), alice()] {
            let err = InlineQueryBuilder::new(viewer.clone())
                .with_published_comments(false)
                .build()
                .unwrap_err();
            assert!(matches!(err, InlineQueryError::UnsupportedFilter(_)));

            let err = InlineQueryBuilder::new(viewer)
                .with_publishable_comments(false)
                .build()
                .unwrap_err();
            assert!(matches!(err, InlineQueryError::UnsupportedFilter(_)));
        }
    }

    #[test]
    fn test_builder_defaults() {
        let query = InlineQueryBuilder::new(alice()).build().unwrap();
        assert!(!query.published_comments());
        assert!(!query.publishable_comments());
        assert!(!query.need_reply_to_comments());
        assert!(query.ids().is_none());
        assert!(query.limit().is_none());
    }

    #[test]
    fn test_from_defaults() {
        let defaults = QueryDefaults {
            need_inline_context: true,
            ..QueryDefaults::default()
        };
        let query = InlineQueryBuilder::from_defaults(alice(), &defaults)
            .build()
            .unwrap();
        assert!(query.need_reply_to_comments());
        assert!(query.need_hidden());
        assert!(query.need_inline_context());
        assert!(!query.need_applied_drafts());
    }

    #[test]
    fn test_reply_lookup_turns_every_toggle_off() {
        let query = InlineQueryBuilder::new(alice())
            .with_ids([CommentId(1)])
            .with_object_phids([Phid::from_string("PHID-DREV-1")])
            .with_author_phids([Phid::from_string("PHID-USER-alice")])
            .with_fixed_states([FixedState::Done])
            .with_published_comments(true)
            .with_publishable_comments(true)
            .need_reply_to_comments(true)
            .need_hidden(true)
            .need_applied_drafts(true)
            .need_inline_context(true)
            .with_limit(10)
            .build()
            .unwrap();

        let target = Phid::from_string("PHID-XCMT-parent");
        let lookup = query.for_reply_lookup([target.clone()].into_iter().collect());

        assert_eq!(lookup.viewer(), query.viewer());
        assert_eq!(lookup.phids().map(|p| p.contains(&target)), Some(true));
        assert_eq!(lookup.object_phids(), query.object_phids());
        assert!(lookup.published_comments());
        assert!(lookup.publishable_comments());
        assert!(lookup.ids().is_none());
        assert!(lookup.author_phids().is_none());
        assert!(lookup.fixed_states().is_none());
        assert!(lookup.limit().is_none());
        assert!(!lookup.need_reply_to_comments());
        assert!(!lookup.need_hidden());
        assert!(!lookup.need_applied_drafts());
        assert!(!lookup.need_inline_context());
    }
}
