//! Inline comment query pipeline
//!
//! A query runs in a fixed order: the visibility predicate is built and the
//! page fetched, then the page is filtered (reply resolution, draft overlay)
//! and finally decorated (hidden flags, context). Filtering may shrink the
//! page; decoration never does.

pub mod context;
pub mod draft;
pub mod filter;
pub mod hidden;
pub mod outcome;
pub mod reply;
pub mod scope;
pub mod visibility;

pub use context::ContextExtractor;
pub use draft::DraftOverlay;
pub use filter::{InlineQuery, InlineQueryBuilder};
pub use hidden::attach_hidden_flags;
pub use outcome::{FilterOutcome, RejectReason, Rejection};
pub use reply::resolve_reply_targets;
pub use scope::{AuditInlineScope, DiffInlineScope, InlineCommentScope};
pub use visibility::{build_predicate, Clause, Predicate, VisibilityClause};

use crate::comment::InlineComment;
use crate::config::ContextConfig;
use crate::error::Result;
use crate::store::{ChangesetStore, CommentSource, DraftStore};
use std::sync::Arc;
use tracing::{debug, info};

/// Comments returned by a query, plus what filtering removed
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryResult {
    pub comments: Vec<InlineComment>,
    pub rejects: Vec<Rejection>,
}

/// Runs [`InlineQuery`]s against a set of stores
///
/// The engine holds no per-query state, so one engine can serve any number
/// of queries.
pub struct QueryEngine {
    scope: Arc<dyn InlineCommentScope>,
    comments: Arc<dyn CommentSource>,
    drafts: Arc<dyn DraftStore>,
    changesets: Arc<dyn ChangesetStore>,
    context: ContextExtractor,
}

impl QueryEngine {
    /// Create an engine with default context settings
    pub fn new(
        scope: Arc<dyn InlineCommentScope>,
        comments: Arc<dyn CommentSource>,
        drafts: Arc<dyn DraftStore>,
        changesets: Arc<dyn ChangesetStore>,
    ) -> Self {
        Self {
            scope,
            comments,
            drafts,
            changesets,
            context: ContextExtractor::default(),
        }
    }

    /// Create an engine reading everything from one store
    pub fn from_store<S>(scope: Arc<dyn InlineCommentScope>, store: Arc<S>) -> Self
    where
        S: CommentSource + DraftStore + ChangesetStore + 'static,
    {
        Self::new(scope, store.clone(), store.clone(), store)
    }

    /// Use custom context settings
    pub fn with_context_config(mut self, config: ContextConfig) -> Self {
        self.context = ContextExtractor::new(config);
        self
    }

    /// Run a query
    pub fn execute(&self, query: &InlineQuery) -> Result<QueryResult> {
        let predicate = match build_predicate(query, self.scope.as_ref()) {
            Ok(predicate) => predicate,
            Err(e) if e.is_empty_query() => {
                debug!("Query for {} can match nothing", query.viewer());
                return Ok(QueryResult::default());
            }
            Err(e) => return Err(e),
        };

        debug!("Fetching inlines where {}", predicate);
        let page = self.comments.fetch(&predicate, query.limit())?;
        let fetched = page.len();

        let outcome = self.filter_page(query, page)?;
        let mut comments = outcome.survivors;
        self.decorate_page(query, &mut comments)?;

        info!(
            "Loaded {} inline(s), {} filtered out",
            comments.len(),
            fetched - comments.len()
        );
        Ok(QueryResult {
            comments,
            rejects: outcome.rejects,
        })
    }

    /// Stages that may remove comments from the page
    pub fn filter_page(&self, query: &InlineQuery, page: Vec<InlineComment>) -> Result<FilterOutcome> {
        let mut outcome = FilterOutcome::accept_all(page);

        if query.need_reply_to_comments() {
            outcome = outcome.and_then(|page| {
                resolve_reply_targets(page, |phids| {
                    Ok(self.execute(&query.for_reply_lookup(phids))?.comments)
                })
            })?;
        }

        let overlay = DraftOverlay::from_query(query);
        outcome.and_then(|page| overlay.apply(query.viewer(), page, self.drafts.as_ref()))
    }

    /// Stages that only annotate the page
    pub fn decorate_page(&self, query: &InlineQuery, page: &mut [InlineComment]) -> Result<()> {
        if query.need_hidden() {
            attach_hidden_flags(query.viewer(), page, self.scope.as_ref())?;
        }
        if query.need_inline_context() {
            self.context
                .attach_contexts(page, self.changesets.as_ref())?;
        }
        Ok(())
    }
}
