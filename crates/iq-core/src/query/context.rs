//! Source lines around an inline comment

use crate::comment::{InlineComment, InlineContext};
use crate::config::ContextConfig;
use crate::diff::model::{Changeset, DiffSide};
use crate::error::Result;
use crate::store::ChangesetStore;
use crate::types::ChangesetId;
use std::collections::{BTreeMap, HashMap};
use tracing::{debug, trace};

/// Direction a context block is read in, starting next to the body
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Scan {
    /// Head lines, nearest line last
    Backward,
    /// Tail lines, nearest line first
    Forward,
}

/// Computes the lines shown around a comment
#[derive(Debug, Clone, Default)]
pub struct ContextExtractor {
    config: ContextConfig,
}

impl ContextExtractor {
    pub fn new(config: ContextConfig) -> Self {
        Self { config }
    }

    /// Attach context to every comment in the page
    ///
    /// Each changeset is loaded at most once.
    pub fn attach_contexts(
        &self,
        page: &mut [InlineComment],
        changesets: &dyn ChangesetStore,
    ) -> Result<()> {
        let mut cache: HashMap<ChangesetId, Option<Changeset>> = HashMap::new();

        for comment in page.iter_mut() {
            if comment.document_engine_key.is_some() {
                comment.attach_inline_context(None);
                continue;
            }

            if !cache.contains_key(&comment.changeset_id) {
                let loaded = changesets.load_changeset(comment.changeset_id)?;
                if loaded.is_none() {
                    debug!("Changeset {} not found", comment.changeset_id);
                }
                cache.insert(comment.changeset_id, loaded);
            }

            let context = cache
                .get(&comment.changeset_id)
                .and_then(Option::as_ref)
                .and_then(|changeset| self.extract(comment, changeset));
            comment.attach_inline_context(context);
        }

        Ok(())
    }

    /// Context for one comment, `None` when the changeset does not show the
    /// whole file from the top
    pub fn extract(&self, comment: &InlineComment, changeset: &Changeset) -> Option<InlineContext> {
        if !changeset.is_top_anchored(self.config.max_hunk_offset) {
            trace!("Changeset {} is not a simple diff", changeset.id);
            return None;
        }

        let corpus = changeset.make_file(DiffSide::from_is_new_file(comment.is_new_file));
        let lines: Vec<&str> = corpus.split_inclusive('\n').collect();

        let offset = (comment.line_number as usize).checked_sub(1)?;
        let length = comment.line_length as usize + 1;
        let body_end = offset + length;

        let head = window(
            &lines,
            offset.saturating_sub(self.config.head_lines),
            offset,
        );
        let body = window(&lines, offset, body_end);
        let tail = window(&lines, body_end, body_end + self.config.tail_lines);

        Some(InlineContext {
            head_lines: self.simplify(head, Scan::Backward),
            body_lines: body,
            tail_lines: self.simplify(tail, Scan::Forward),
        })
    }

    /// Keep lines up to and including the first one with real content,
    /// reading away from the body
    fn simplify(&self, lines: BTreeMap<usize, String>, scan: Scan) -> BTreeMap<usize, String> {
        let mut kept = BTreeMap::new();
        let ordered: Box<dyn Iterator<Item = (usize, String)>> = match scan {
            Scan::Forward => Box::new(lines.into_iter()),
            Scan::Backward => Box::new(lines.into_iter().rev()),
        };

        for (index, line) in ordered {
            let anchor = trim_blank(&line).len() > self.config.anchor_min_length;
            kept.insert(index, line);
            if anchor {
                break;
            }
        }
        kept
    }
}

/// Strip ASCII whitespace and NUL only; other Unicode spaces count as content
fn trim_blank(line: &str) -> &str {
    line.trim_matches(|c| matches!(c, ' ' | '\t' | '\n' | '\r' | '\0' | '\x0B'))
}

/// Lines `start..end`, clamped to the file, keyed by index
fn window(lines: &[&str], start: usize, end: usize) -> BTreeMap<usize, String> {
    let end = end.min(lines.len());
    if start >= end {
        return BTreeMap::new();
    }
    (start..end).map(|i| (i, lines[i].to_string())).collect()
}
