//! Inline comment data models

use crate::error::{InlineQueryError, Result};
use crate::types::{ChangesetId, CommentId, Phid};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// A review comment attached to one or more lines of a changeset
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InlineComment {
    /// Storage identifier
    pub id: CommentId,
    /// Globally unique identifier
    pub phid: Phid,
    /// Author of the comment
    pub author_phid: Phid,
    /// Revision or commit the comment belongs to
    pub object_phid: Phid,
    /// Set once the comment is published; `None` for drafts
    #[serde(default)]
    pub transaction_phid: Option<Phid>,
    /// Soft-delete marker
    #[serde(default)]
    pub is_deleted: bool,
    /// Resolution status
    #[serde(default)]
    pub fixed_state: Option<FixedState>,
    /// Changeset (file) the comment is anchored to
    pub changeset_id: ChangesetId,
    /// First annotated line, 1-based
    pub line_number: u32,
    /// Number of extra lines covered (0 = single line)
    #[serde(default)]
    pub line_length: u32,
    /// Whether the comment is on the new side of the diff
    #[serde(default = "default_true")]
    pub is_new_file: bool,
    /// Parent comment when this is a reply
    #[serde(default)]
    pub reply_to_comment_phid: Option<Phid>,
    /// Set for comments on rendered documents rather than diff text
    #[serde(default)]
    pub document_engine_key: Option<String>,
    /// Stored content
    #[serde(default)]
    pub content: ContentState,
    /// When the comment was created
    pub created_at: DateTime<Utc>,
    /// When the comment was last updated
    pub updated_at: DateTime<Utc>,
    /// Data attached while a query runs; never persisted
    #[serde(skip)]
    pub attachments: InlineAttachments,
}

fn default_true() -> bool {
    true
}

impl InlineComment {
    /// Published comments have a transaction
    pub fn is_published(&self) -> bool {
        self.transaction_phid.is_some()
    }

    /// Unpublished, authored by `viewer`, and not deleted
    pub fn is_publishable_by(&self, viewer: &Phid) -> bool {
        !self.is_published() && !self.is_deleted && &self.author_phid == viewer
    }

    /// Attach the resolved parent comment (or the absence of one)
    pub fn attach_reply_to_comment(&mut self, parent: Option<InlineComment>) {
        self.attachments.reply_to_comment = Attachment::Loaded(parent.map(Box::new));
    }

    /// Resolved parent comment
    pub fn reply_to_comment(&self) -> Result<Option<&InlineComment>> {
        self.attachments
            .reply_to_comment
            .get()
            .map(|parent| parent.as_deref())
            .ok_or(InlineQueryError::AttachmentNotLoaded("reply_to_comment"))
    }

    /// Attach the viewer's hidden flag
    pub fn attach_is_hidden(&mut self, hidden: bool) {
        self.attachments.is_hidden = Attachment::Loaded(hidden);
    }

    /// Whether the viewer has collapsed this comment
    pub fn is_hidden(&self) -> Result<bool> {
        self.attachments
            .is_hidden
            .get()
            .copied()
            .ok_or(InlineQueryError::AttachmentNotLoaded("is_hidden"))
    }

    /// Attach the surrounding source lines
    pub fn attach_inline_context(&mut self, context: Option<InlineContext>) {
        self.attachments.inline_context = Attachment::Loaded(context);
    }

    /// Surrounding source lines, `None` when they could not be computed
    pub fn inline_context(&self) -> Result<Option<&InlineContext>> {
        self.attachments
            .inline_context
            .get()
            .map(Option::as_ref)
            .ok_or(InlineQueryError::AttachmentNotLoaded("inline_context"))
    }
}

/// Resolution status of an inline comment
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FixedState {
    /// Marked done
    Done,
    /// Explicitly marked not done
    Undone,
    /// Marked done, not yet submitted
    Draft,
    /// Marked not done, not yet submitted
    Undraft,
}

impl FixedState {
    /// Wire name
    pub fn as_str(&self) -> &'static str {
        match self {
            FixedState::Done => "done",
            FixedState::Undone => "undone",
            FixedState::Draft => "draft",
            FixedState::Undraft => "undraft",
        }
    }
}

impl fmt::Display for FixedState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FixedState {
    type Err = InlineQueryError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "done" => Ok(FixedState::Done),
            "undone" => Ok(FixedState::Undone),
            "draft" => Ok(FixedState::Draft),
            "undraft" => Ok(FixedState::Undraft),
            other => Err(InlineQueryError::Config(format!(
                "Unknown fixed state: {}",
                other
            ))),
        }
    }
}

/// Displayable content of a comment or draft
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentState {
    /// Comment text
    #[serde(default)]
    pub text: String,
    /// Suggested replacement code
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
}

impl ContentState {
    /// Create a text-only content state
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            suggestion: None,
        }
    }

    /// Add a code suggestion
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    /// No text and no non-empty suggestion
    pub fn is_empty(&self) -> bool {
        self.text.is_empty() && self.suggestion.as_deref().map_or(true, str::is_empty)
    }

    /// Read a persisted draft map
    pub fn from_storage_map(map: serde_json::Value) -> Result<Self> {
        Ok(serde_json::from_value(map)?)
    }

    /// Persisted draft map
    pub fn to_storage_map(&self) -> serde_json::Value {
        serde_json::json!({
            "text": self.text,
            "suggestion": self.suggestion,
        })
    }
}

/// Source lines shown next to a comment, keyed by 0-based line index
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InlineContext {
    /// Lines before the annotated range
    pub head_lines: BTreeMap<usize, String>,
    /// The annotated lines
    pub body_lines: BTreeMap<usize, String>,
    /// Lines after the annotated range
    pub tail_lines: BTreeMap<usize, String>,
}

impl InlineContext {
    /// All lines in file order
    pub fn lines(&self) -> impl Iterator<Item = (&usize, &String)> {
        self.head_lines
            .iter()
            .chain(self.body_lines.iter())
            .chain(self.tail_lines.iter())
    }
}

/// A value a query stage may or may not have loaded
#[derive(Debug, Clone, PartialEq)]
pub enum Attachment<T> {
    /// The stage did not run
    NotLoaded,
    /// The stage ran and produced this value
    Loaded(T),
}

impl<T> Attachment<T> {
    /// The loaded value
    pub fn get(&self) -> Option<&T> {
        match self {
            Attachment::NotLoaded => None,
            Attachment::Loaded(value) => Some(value),
        }
    }

    /// Check if the value was loaded
    pub fn is_loaded(&self) -> bool {
        matches!(self, Attachment::Loaded(_))
    }
}

impl<T> Default for Attachment<T> {
    fn default() -> Self {
        Attachment::NotLoaded
    }
}

/// Decorations added by the query pipeline
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InlineAttachments {
    pub reply_to_comment: Attachment<Option<Box<InlineComment>>>,
    pub is_hidden: Attachment<bool>,
    pub inline_context: Attachment<Option<InlineContext>>,
}
