//! Inline comment builder for fluent API

use super::model::{ContentState, FixedState, InlineAttachments, InlineComment};
use crate::types::{ChangesetId, CommentId, Phid};
use chrono::Utc;

/// Builder for creating inline comments with fluent API
pub struct InlineCommentBuilder {
    id: CommentId,
    phid: Option<Phid>,
    author_phid: Phid,
    object_phid: Phid,
    transaction_phid: Option<Phid>,
    is_deleted: bool,
    fixed_state: Option<FixedState>,
    changeset_id: ChangesetId,
    line_number: u32,
    line_length: u32,
    is_new_file: bool,
    reply_to_comment_phid: Option<Phid>,
    document_engine_key: Option<String>,
    content: ContentState,
}

impl InlineCommentBuilder {
    /// Create a new builder for an unpublished, single-line draft on line 1
    pub fn new(id: CommentId, author_phid: Phid, object_phid: Phid) -> Self {
        Self {
            id,
            phid: None,
            author_phid,
            object_phid,
            transaction_phid: None,
            is_deleted: false,
            fixed_state: None,
            changeset_id: ChangesetId(1),
            line_number: 1,
            line_length: 0,
            is_new_file: true,
            reply_to_comment_phid: None,
            document_engine_key: None,
            content: ContentState::default(),
        }
    }

    /// Use a fixed PHID instead of a generated one
    pub fn phid(mut self, phid: Phid) -> Self {
        self.phid = Some(phid);
        self
    }

    /// Set the comment text
    pub fn content(mut self, text: impl Into<String>) -> Self {
        self.content.text = text.into();
        self
    }

    /// Set the full content state
    pub fn content_state(mut self, state: ContentState) -> Self {
        self.content = state;
        self
    }

    /// Mark as published by the given transaction
    pub fn published(mut self, transaction_phid: Phid) -> Self {
        self.transaction_phid = Some(transaction_phid);
        self
    }

    /// Mark as deleted
    pub fn deleted(mut self) -> Self {
        self.is_deleted = true;
        self
    }

    /// Set the resolution status
    pub fn fixed_state(mut self, state: FixedState) -> Self {
        self.fixed_state = Some(state);
        self
    }

    /// Anchor to a changeset
    pub fn changeset(mut self, changeset_id: ChangesetId) -> Self {
        self.changeset_id = changeset_id;
        self
    }

    /// Set the 1-based line and the number of extra lines covered
    pub fn lines(mut self, line_number: u32, line_length: u32) -> Self {
        self.line_number = line_number;
        self.line_length = line_length;
        self
    }

    /// Put the comment on the old side of the diff
    pub fn old_side(mut self) -> Self {
        self.is_new_file = false;
        self
    }

    /// Reply to another comment
    pub fn reply_to(mut self, parent_phid: Phid) -> Self {
        self.reply_to_comment_phid = Some(parent_phid);
        self
    }

    /// Anchor to a rendered document instead of diff text
    pub fn document_engine(mut self, key: impl Into<String>) -> Self {
        self.document_engine_key = Some(key.into());
        self
    }

    /// Build the comment
    pub fn build(self) -> InlineComment {
        let now = Utc::now();

        InlineComment {
            id: self.id,
            phid: self
                .phid
                .unwrap_or_else(|| Phid::generate(Phid::INLINE_TYPE)),
            author_phid: self.author_phid,
            object_phid: self.object_phid,
            transaction_phid: self.transaction_phid,
            is_deleted: self.is_deleted,
            fixed_state: self.fixed_state,
            changeset_id: self.changeset_id,
            line_number: self.line_number,
            line_length: self.line_length,
            is_new_file: self.is_new_file,
            reply_to_comment_phid: self.reply_to_comment_phid,
            document_engine_key: self.document_engine_key,
            content: self.content,
            created_at: now,
            updated_at: now,
            attachments: InlineAttachments::default(),
        }
    }
}
