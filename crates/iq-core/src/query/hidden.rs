//! Per-viewer hidden flags

use super::scope::InlineCommentScope;
use crate::comment::InlineComment;
use crate::error::Result;
use crate::types::Viewer;
use tracing::debug;

/// Attach `is_hidden` to every comment in the page; never removes entries
pub fn attach_hidden_flags(
    viewer: &Viewer,
    page: &mut [InlineComment],
    scope: &dyn InlineCommentScope,
) -> Result<()> {
    let phid = match viewer.phid() {
        Some(phid) if !page.is_empty() => phid,
        _ => {
            for comment in page.iter_mut() {
                comment.attach_is_hidden(false);
            }
            return Ok(());
        }
    };

    let hidden = scope.load_hidden_comment_ids(phid, page)?;
    debug!("{} of {} inline(s) hidden for {}", hidden.len(), page.len(), viewer);

    for comment in page.iter_mut() {
        let is_hidden = hidden.contains(&comment.id);
        comment.attach_is_hidden(is_hidden);
    }
    Ok(())
}
