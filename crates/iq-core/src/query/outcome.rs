//! Results of the filtering stage

use crate::comment::InlineComment;
use serde::Serialize;
use std::fmt;

/// Why a fetched comment was left out of the page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RejectReason {
    /// Its reply target is not visible under the same filters
    DanglingReply,
    /// Void once the viewer's drafts are applied
    VoidDraft,
    /// An unpublished comment with nothing to publish
    VoidUnpublished,
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RejectReason::DanglingReply => write!(f, "dangling reply"),
            RejectReason::VoidDraft => write!(f, "void draft"),
            RejectReason::VoidUnpublished => write!(f, "void unpublished comment"),
        }
    }
}

/// A comment removed during filtering
#[derive(Debug, Clone, PartialEq)]
pub struct Rejection {
    pub comment: InlineComment,
    pub reason: RejectReason,
}

/// Survivors and rejects of a filtering step, both in fetch order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterOutcome {
    pub survivors: Vec<InlineComment>,
    pub rejects: Vec<Rejection>,
}

impl FilterOutcome {
    /// Every comment survives
    pub fn accept_all(page: Vec<InlineComment>) -> Self {
        Self {
            survivors: page,
            rejects: Vec::new(),
        }
    }

    /// Keep a comment
    pub fn accept(&mut self, comment: InlineComment) {
        self.survivors.push(comment);
    }

    /// Drop a comment
    pub fn reject(&mut self, comment: InlineComment, reason: RejectReason) {
        self.rejects.push(Rejection { comment, reason });
    }

    /// Feed the survivors through another step, accumulating rejects
    pub fn and_then<F>(mut self, step: F) -> crate::error::Result<Self>
    where
        F: FnOnce(Vec<InlineComment>) -> crate::error::Result<FilterOutcome>,
    {
        let next = step(std::mem::take(&mut self.survivors))?;
        self.survivors = next.survivors;
        self.rejects.extend(next.rejects);
        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::comment::InlineCommentBuilder;
    use crate::types::{CommentId, Phid};

    fn comment(id: u64) -> InlineComment {
        InlineCommentBuilder::new(
            CommentId(id),
            Phid::from_string("PHID-USER-alice"),
            Phid::from_string("PHID-DREV-1"),
        )
        .build()
    }

    #[test]
    fn test_and_then_accumulates_rejects() {
        let mut first = FilterOutcome::default();
        first.accept(comment(1));
        first.reject(comment(2), RejectReason::DanglingReply);
        first.accept(comment(3));

        let outcome = first
            .and_then(|page| {
                let mut next = FilterOutcome::default();
                for c in page {
                    if c.id == CommentId(1) {
                        next.reject(c, RejectReason::VoidDraft);
                    } else {
                        next.accept(c);
                    }
                }
                Ok(next)
            })
            .unwrap();

        let survivors: Vec<CommentId> = outcome.survivors.iter().map(|c| c.id).collect();
        let rejects: Vec<(CommentId, RejectReason)> = outcome
            .rejects
            .iter()
            .map(|r| (r.comment.id, r.reason))
            .collect();
        assert_eq!(survivors, vec![CommentId(3)]);
        assert_eq!(
            rejects,
            vec![
                (CommentId(2), RejectReason::DanglingReply),
                (CommentId(1), RejectReason::VoidDraft),
            ]
        );
    }

    #[test]
    fn test_reason_display() {
        assert_eq!(RejectReason::DanglingReply.to_string(), "dangling reply");
    }
}
