//! Draft overlay
//!
//! Shows the viewer's unsaved edits in place of stored content and removes
//! comments that have nothing left to show.

use super::filter::InlineQuery;
use super::outcome::{FilterOutcome, RejectReason};
use crate::comment::{InlineComment, InlineCommentView};
use crate::error::Result;
use crate::store::DraftStore;
use crate::types::Viewer;
use std::collections::HashMap;
use tracing::{debug, trace};

/// What the overlay does to a page
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DraftOverlay {
    /// Replace displayed content with the viewer's drafts, dropping void comments
    pub apply_drafts: bool,
    /// Drop unpublished comments that are void
    pub drop_void_unpublished: bool,
}

impl DraftOverlay {
    /// Overlay requested by `query`
    pub fn from_query(query: &InlineQuery) -> Self {
        Self {
            apply_drafts: query.need_applied_drafts(),
            drop_void_unpublished: query.publishable_comments(),
        }
    }

    /// Check if the overlay changes anything
    pub fn is_active(&self) -> bool {
        self.apply_drafts || self.drop_void_unpublished
    }

    /// Run the overlay over a page
    pub fn apply(
        &self,
        viewer: &Viewer,
        page: Vec<InlineComment>,
        drafts: &dyn DraftStore,
    ) -> Result<FilterOutcome> {
        if !self.is_active() || page.is_empty() {
            return Ok(FilterOutcome::accept_all(page));
        }

        let mut loaded = match viewer.phid() {
            Some(phid) => drafts.load_drafts(phid, &page)?,
            None => HashMap::new(),
        };
        debug!("Loaded {} draft(s) for {}", loaded.len(), viewer);

        let mut outcome = FilterOutcome::default();
        for comment in page {
            let draft = loaded.remove(&comment.phid);
            let mut view = InlineCommentView::new(comment);
            view.attach_draft(draft);

            if self.apply_drafts {
                if view.is_void() {
                    trace!("Dropping void inline {}", view.storage().id);
                    outcome.reject(view.into_storage(), RejectReason::VoidDraft);
                    continue;
                }

                let edit = view.content_state_for_edit();
                if edit != view.content_state() {
                    let edit = edit.clone();
                    view.set_content_state(edit);
                }
            }

            if self.drop_void_unpublished && !view.is_published() && view.is_void() {
                trace!("Dropping void unpublished inline {}", view.storage().id);
                outcome.reject(view.into_storage(), RejectReason::VoidUnpublished);
                continue;
            }

            outcome.accept(view.into_storage());
        }

        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::comment::{ContentState, InlineCommentBuilder};
    use crate::store::memory::MemoryStore;
    use crate::types::{CommentId, Phid};
    use pretty_assertions::assert_eq;
    use std::sync::atomic::Ordering;

    fn alice() -> Phid {
        Phid::from_string("PHID-USER-alice")
    }

    fn comment(id: u64, text: &str) -> InlineCommentBuilder {
        InlineCommentBuilder::new(CommentId(id), alice(), Phid::from_string("PHID-DREV-1"))
            .phid(Phid::from_string(format!("PHID-XCMT-{}", id)))
            .content(text)
    }

    fn ids(comments: &[InlineComment]) -> Vec<CommentId> {
        comments.iter().map(|c| c.id).collect()
    }

    #[test]
    fn test_inactive_overlay_touches_nothing() {
        let store = MemoryStore::default();
        let page = vec![comment(1, "").build()];
        let outcome = DraftOverlay::default()
            .apply(&Viewer::user(alice()), page, &store)
            .unwrap();

        assert_eq!(ids(&outcome.survivors), vec![CommentId(1)]);
        assert_eq!(store.draft_calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_applies_draft_and_drops_void() {
        let mut store = MemoryStore::default();
        let edited = comment(1, "stored").build();
        store.add_draft(&alice(), &edited.phid, ContentState::new("edited"));

        let page = vec![
            edited,
            comment(2, "").build(),
            comment(3, "untouched").published(Phid::generate(Phid::TRANSACTION_TYPE)).build(),
        ];
        let overlay = DraftOverlay {
            apply_drafts: true,
            drop_void_unpublished: false,
        };
        let outcome = overlay.apply(&Viewer::user(alice()), page, &store).unwrap();

        assert_eq!(ids(&outcome.survivors), vec![CommentId(1), CommentId(3)]);
        assert_eq!(outcome.survivors[0].content.text, "edited");
        assert_eq!(outcome.survivors[1].content.text, "untouched");
        assert_eq!(outcome.rejects.len(), 1);
        assert_eq!(outcome.rejects[0].reason, RejectReason::VoidDraft);
        assert_eq!(store.draft_calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_empty_draft_keeps_stored_content() {
        let mut store = MemoryStore::default();
        let stored = comment(1, "stored").build();
        store.add_draft(&alice(), &stored.phid, ContentState::default());

        let overlay = DraftOverlay {
            apply_drafts: true,
            drop_void_unpublished: false,
        };
        let outcome = overlay
            .apply(&Viewer::user(alice()), vec![stored], &store)
            .unwrap();

        assert_eq!(outcome.survivors[0].content.text, "stored");
    }

    #[test]
    fn test_publishable_filtering_keeps_published_void() {
        let store = MemoryStore::default();
        let page = vec![
            comment(1, "").build(),
            comment(2, "").published(Phid::generate(Phid::TRANSACTION_TYPE)).build(),
            comment(3, "draft").build(),
        ];
        let overlay = DraftOverlay {
            apply_drafts: false,
            drop_void_unpublished: true,
        };
        let outcome = overlay.apply(&Viewer::user(alice()), page, &store).unwrap();

        assert_eq!(ids(&outcome.survivors), vec![CommentId(2), CommentId(3)]);
        assert_eq!(outcome.rejects.len(), 1);
        assert_eq!(outcome.rejects[0].comment.id, CommentId(1));
        assert_eq!(outcome.rejects[0].reason, RejectReason::VoidUnpublished);
    }

    #[test]
    fn test_draft_rescues_empty_unpublished_comment() {
        let mut store = MemoryStore::default();
        let empty = comment(1, "").build();
        store.add_draft(&alice(), &empty.phid, ContentState::new("typed"));

        let overlay = DraftOverlay {
            apply_drafts: false,
            drop_void_unpublished: true,
        };
        let outcome = overlay
            .apply(&Viewer::user(alice()), vec![empty], &store)
            .unwrap();

        assert_eq!(ids(&outcome.survivors), vec![CommentId(1)]);
        // Content is only replaced when drafts are applied
        assert_eq!(outcome.survivors[0].content.text, "");
    }

    #[test]
    fn test_rejected_at_most_once() {
        let store = MemoryStore::default();
        let overlay = DraftOverlay {
            apply_drafts: true,
            drop_void_unpublished: true,
        };
        let outcome = overlay
            .apply(&Viewer::user(alice()), vec![comment(1, "").build()], &store)
            .unwrap();

        assert!(outcome.survivors.is_empty());
        assert_eq!(outcome.rejects.len(), 1);
        assert_eq!(outcome.rejects[0].reason, RejectReason::VoidDraft);
    }

    #[test]
    fn test_anonymous_viewer_loads_no_drafts() {
        let store = MemoryStore::default();
        let overlay = DraftOverlay {
            apply_drafts: true,
            drop_void_unpublished: false,
        };
        let outcome = overlay
            .apply(&Viewer::anonymous(), vec![comment(1, "text").build()], &store)
            .unwrap();

        assert_eq!(ids(&outcome.survivors), vec![CommentId(1)]);
        assert_eq!(store.draft_calls.load(Ordering::SeqCst), 0);
    }
}
