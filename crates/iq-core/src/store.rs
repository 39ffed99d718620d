//! Collaborator traits the query pipeline reads from
//!
//! None of these are written to by the pipeline.

use crate::comment::{ContentState, InlineComment};
use crate::diff::Changeset;
use crate::error::Result;
use crate::query::Predicate;
use crate::types::{ChangesetId, CommentId, Phid};
use std::collections::{HashMap, HashSet};

/// Row fetch for inline comments
pub trait CommentSource: Send + Sync {
    /// Comments matching `predicate`, in storage order, at most `limit`
    fn fetch(&self, predicate: &Predicate, limit: Option<usize>) -> Result<Vec<InlineComment>>;
}

/// Saved, unsubmitted edits
pub trait DraftStore: Send + Sync {
    /// The viewer's drafts for `comments`, keyed by comment PHID
    fn load_drafts(
        &self,
        viewer: &Phid,
        comments: &[InlineComment],
    ) -> Result<HashMap<Phid, ContentState>>;
}

/// Per-viewer collapsed comments
pub trait HiddenStore: Send + Sync {
    /// IDs among `comments` the viewer has hidden
    fn load_hidden(&self, viewer: &Phid, comments: &[InlineComment]) -> Result<HashSet<CommentId>>;
}

/// Changesets with their hunks
pub trait ChangesetStore: Send + Sync {
    /// Load a changeset; `None` when it does not exist
    fn load_changeset(&self, id: ChangesetId) -> Result<Option<Changeset>>;
}

/// In-memory collaborators for testing
#[cfg(test)]
pub mod memory {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// In-memory implementation of every store, counting calls
    #[derive(Default)]
    pub struct MemoryStore {
        pub comments: Vec<InlineComment>,
        pub drafts: HashMap<(Phid, Phid), ContentState>,
        pub hidden: HashMap<Phid, HashSet<CommentId>>,
        pub changesets: HashMap<ChangesetId, Changeset>,
        pub fetch_calls: AtomicUsize,
        pub draft_calls: AtomicUsize,
        pub hidden_calls: AtomicUsize,
        pub changeset_calls: AtomicUsize,
    }

    impl MemoryStore {
        /// Create a store holding `comments`
        pub fn with_comments(comments: Vec<InlineComment>) -> Self {
            Self {
                comments,
                ..Self::default()
            }
        }

        /// Save a draft for `viewer` on `comment`
        pub fn add_draft(&mut self, viewer: &Phid, comment: &Phid, state: ContentState) {
            self.drafts.insert((viewer.clone(), comment.clone()), state);
        }

        /// Hide `comment` for `viewer`
        pub fn hide(&mut self, viewer: &Phid, comment: CommentId) {
            self.hidden.entry(viewer.clone()).or_default().insert(comment);
        }

        /// Add a changeset
        pub fn add_changeset(&mut self, changeset: Changeset) {
            self.changesets.insert(changeset.id, changeset);
        }

        /// Total calls to any store
        pub fn total_calls(&self) -> usize {
            self.fetch_calls.load(Ordering::SeqCst)
                + self.draft_calls.load(Ordering::SeqCst)
                + self.hidden_calls.load(Ordering::SeqCst)
                + self.changeset_calls.load(Ordering::SeqCst)
        }
    }

    impl CommentSource for MemoryStore {
        fn fetch(&self, predicate: &Predicate, limit: Option<usize>) -> Result<Vec<InlineComment>> {
            self.fetch_calls.fetch_add(1, Ordering::SeqCst);
            Ok(self
                .comments
                .iter()
                .filter(|c| predicate.matches(c))
                .take(limit.unwrap_or(usize::MAX))
                .cloned()
                .collect())
        }
    }

    impl DraftStore for MemoryStore {
        fn load_drafts(
            &self,
            viewer: &Phid,
            comments: &[InlineComment],
        ) -> Result<HashMap<Phid, ContentState>> {
            self.draft_calls.fetch_add(1, Ordering::SeqCst);
            Ok(comments
                .iter()
                .filter_map(|c| {
                    self.drafts
                        .get(&(viewer.clone(), c.phid.clone()))
                        .map(|state| (c.phid.clone(), state.clone()))
                })
                .collect())
        }
    }

    impl HiddenStore for MemoryStore {
        fn load_hidden(
            &self,
            viewer: &Phid,
            comments: &[InlineComment],
        ) -> Result<HashSet<CommentId>> {
            self.hidden_calls.fetch_add(1, Ordering::SeqCst);
            let hidden = self.hidden.get(viewer);
            Ok(comments
                .iter()
                .map(|c| c.id)
                .filter(|id| hidden.map_or(false, |set| set.contains(id)))
                .collect())
        }
    }

    impl ChangesetStore for MemoryStore {
        fn load_changeset(&self, id: ChangesetId) -> Result<Option<Changeset>> {
            self.changeset_calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.changesets.get(&id).cloned())
        }
    }
}
