//! Reply-chain resolution
//!
//! Only a reply's immediate parent is resolved.

use super::outcome::{FilterOutcome, RejectReason};
use crate::comment::InlineComment;
use crate::error::Result;
use crate::types::Phid;
use std::collections::{BTreeSet, HashMap};
use tracing::debug;

/// Attach each comment's parent, dropping replies whose parent is not visible
///
/// `lookup` is called at most once, with the distinct parent PHIDs of the
/// page, and must return the parents visible under the page's own filters.
pub fn resolve_reply_targets<F>(page: Vec<InlineComment>, lookup: F) -> Result<FilterOutcome>
where
    F: FnOnce(BTreeSet<Phid>) -> Result<Vec<InlineComment>>,
{
    let targets: BTreeSet<Phid> = page
        .iter()
        .filter_map(|c| c.reply_to_comment_phid.clone())
        .collect();

    let parents: HashMap<Phid, InlineComment> = if targets.is_empty() {
        HashMap::new()
    } else {
        debug!("Loading {} reply target(s)", targets.len());
        lookup(targets)?
            .into_iter()
            .map(|parent| (parent.phid.clone(), parent))
            .collect()
    };

    let mut outcome = FilterOutcome::default();
    for mut comment in page {
        let target = match comment.reply_to_comment_phid.clone() {
            None => {
                comment.attach_reply_to_comment(None);
                outcome.accept(comment);
                continue;
            }
            Some(target) => target,
        };

        match parents.get(&target) {
            Some(parent) => {
                let parent = parent.clone();
                comment.attach_reply_to_comment(Some(parent));
                outcome.accept(comment);
            }
            None => {
                debug!(
                    "Dropping inline {}: reply target {} is not visible",
                    comment.id, target
                );
                outcome.reject(comment, RejectReason::DanglingReply);
            }
        }
    }

    Ok(outcome)
}
