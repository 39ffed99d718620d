//! Visibility predicate construction
//!
//! A [`Predicate`] is an AND-list of [`Clause`]s. The "published" and
//! "publishable" filters share one OR-group so that a caller can ask for
//! "everything I can see": published comments plus my own drafts.

use super::filter::InlineQuery;
use super::scope::InlineCommentScope;
use crate::comment::{FixedState, InlineComment};
use crate::error::{InlineQueryError, Result};
use crate::types::{CommentId, Phid};
use std::collections::BTreeSet;
use std::fmt;
use tracing::{debug, trace};

/// A single AND-ed constraint
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Clause {
    /// `id IN (...)`
    IdIn(BTreeSet<CommentId>),
    /// `phid IN (...)`
    PhidIn(BTreeSet<Phid>),
    /// `objectPHID IN (...)`
    ObjectPhidIn(BTreeSet<Phid>),
    /// The owning object's PHID carries this type tag
    ObjectTypeIs(String),
    /// `authorPHID IN (...)`
    AuthorPhidIn(BTreeSet<Phid>),
    /// `fixedState IN (...)`
    FixedStateIn(BTreeSet<FixedState>),
    /// OR-group of visibility rules
    AnyOf(Vec<VisibilityClause>),
}

/// One member of the visibility OR-group
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VisibilityClause {
    /// `transactionPHID IS NOT NULL`
    Published,
    /// `authorPHID = viewer AND isDeleted = 0 AND transactionPHID IS NULL`
    PublishableBy(Phid),
}

impl VisibilityClause {
    /// Evaluate against a comment
    pub fn matches(&self, comment: &InlineComment) -> bool {
        match self {
            VisibilityClause::Published => comment.is_published(),
            VisibilityClause::PublishableBy(viewer) => comment.is_publishable_by(viewer),
        }
    }
}

impl Clause {
    /// Evaluate against a comment
    pub fn matches(&self, comment: &InlineComment) -> bool {
        match self {
            Clause::IdIn(ids) => ids.contains(&comment.id),
            Clause::PhidIn(phids) => phids.contains(&comment.phid),
            Clause::ObjectPhidIn(phids) => phids.contains(&comment.object_phid),
            Clause::ObjectTypeIs(tag) => comment.object_phid.type_tag() == Some(tag.as_str()),
            Clause::AuthorPhidIn(phids) => phids.contains(&comment.author_phid),
            Clause::FixedStateIn(states) => comment
                .fixed_state
                .map_or(false, |state| states.contains(&state)),
            Clause::AnyOf(group) => group.iter().any(|clause| clause.matches(comment)),
        }
    }
}

/// AND-combination of clauses
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Predicate {
    clauses: Vec<Clause>,
}

impl Predicate {
    /// Create a predicate from clauses
    pub fn new(clauses: Vec<Clause>) -> Self {
        Self { clauses }
    }

    /// The AND-ed clauses
    pub fn clauses(&self) -> &[Clause] {
        &self.clauses
    }

    /// Check if the predicate has no constraint at all
    pub fn is_unconstrained(&self) -> bool {
        self.clauses.is_empty()
    }

    /// Evaluate against a comment
    pub fn matches(&self, comment: &InlineComment) -> bool {
        self.clauses.iter().all(|clause| clause.matches(comment))
    }
}

/// Build the inclusion predicate for a query
///
/// Fails with [`InlineQueryError::EmptyQuery`] when the query can be seen to
/// match nothing, most notably "publishable" for a logged-out viewer.
pub fn build_predicate(query: &InlineQuery, scope: &dyn InlineCommentScope) -> Result<Predicate> {
    let mut clauses = scope.where_clauses();

    if let Some(ids) = query.ids() {
        clauses.push(Clause::IdIn(non_empty(ids, "ids")?.clone()));
    }
    if let Some(phids) = query.phids() {
        clauses.push(Clause::PhidIn(non_empty(phids, "phids")?.clone()));
    }
    if let Some(object_phids) = query.object_phids() {
        clauses.push(scope.object_phid_clause(non_empty(object_phids, "object phids")?));
    }
    if let Some(author_phids) = query.author_phids() {
        clauses.push(Clause::AuthorPhidIn(
            non_empty(author_phids, "author phids")?.clone(),
        ));
    }
    if let Some(states) = query.fixed_states() {
        clauses.push(Clause::FixedStateIn(
            non_empty(states, "fixed states")?.clone(),
        ));
    }

    if query.published_comments() || query.publishable_comments() {
        let mut group = Vec::new();

        if query.published_comments() {
            group.push(VisibilityClause::Published);
        }

        if query.publishable_comments() {
            // Logged-out viewers have no drafts
            if let Some(viewer) = query.viewer().phid() {
                group.push(VisibilityClause::PublishableBy(viewer.clone()));
            }
        }

        if group.is_empty() {
            debug!(
                "Visibility group is empty for viewer {}, query is known-empty",
                query.viewer()
            );
            return Err(InlineQueryError::EmptyQuery);
        }

        clauses.push(Clause::AnyOf(group));
    }

    let predicate = Predicate::new(clauses);
    trace!("Built predicate: {}", predicate);
    Ok(predicate)
}

fn non_empty<'a, T>(set: &'a BTreeSet<T>, what: &str) -> Result<&'a BTreeSet<T>> {
    if set.is_empty() {
        debug!("Empty {} filter, query is known-empty", what);
        return Err(InlineQueryError::EmptyQuery);
    }
    Ok(set)
}

fn join<T: fmt::Display>(items: impl IntoIterator<Item = T>) -> String {
    items
        .into_iter()
        .map(|item| format!("'{}'", item))
        .collect::<Vec<_>>()
        .join(", ")
}

impl fmt::Display for VisibilityClause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VisibilityClause::Published => write!(f, "transactionPHID IS NOT NULL"),
            VisibilityClause::PublishableBy(viewer) => write!(
                f,
                "authorPHID = '{}' AND isDeleted = 0 AND transactionPHID IS NULL",
                viewer
            ),
        }
    }
}

impl fmt::Display for Clause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Clause::IdIn(ids) => write!(f, "id IN ({})", join(ids)),
            Clause::PhidIn(phids) => write!(f, "phid IN ({})", join(phids)),
            Clause::ObjectPhidIn(phids) => write!(f, "objectPHID IN ({})", join(phids)),
            Clause::ObjectTypeIs(tag) => write!(f, "objectPHID LIKE 'PHID-{}-%'", tag),
            Clause::AuthorPhidIn(phids) => write!(f, "authorPHID IN ({})", join(phids)),
            Clause::FixedStateIn(states) => write!(f, "fixedState IN ({})", join(states)),
            Clause::AnyOf(group) => {
                let parts: Vec<String> = group.iter().map(|c| format!("({})", c)).collect();
                write!(f, "{}", parts.join(" OR "))
            }
        }
    }
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_unconstrained() {
            return write!(f, "TRUE");
        }
        let parts: Vec<String> = self.clauses.iter().map(|c| format!("({})", c)).collect();
        write!(f, "{}", parts.join(" AND "))
    }
}
