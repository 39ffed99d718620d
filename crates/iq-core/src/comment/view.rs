//! Viewer-scoped view of an inline comment

use super::model::{ContentState, InlineComment};

/// An inline comment as one viewer sees it, with their draft loaded
#[derive(Debug, Clone)]
pub struct InlineCommentView {
    storage: InlineComment,
    draft: Option<ContentState>,
}

impl InlineCommentView {
    /// Wrap a stored comment
    pub fn new(storage: InlineComment) -> Self {
        Self {
            storage,
            draft: None,
        }
    }

    /// Attach the viewer's saved draft, if any
    pub fn attach_draft(&mut self, draft: Option<ContentState>) {
        self.draft = draft;
    }

    /// Currently displayed content
    pub fn content_state(&self) -> &ContentState {
        &self.storage.content
    }

    /// Replace the displayed content
    pub fn set_content_state(&mut self, state: ContentState) {
        self.storage.content = state;
    }

    /// What an editor would open with: a non-empty draft wins over stored content
    pub fn content_state_for_edit(&self) -> &ContentState {
        match &self.draft {
            Some(draft) if !draft.is_empty() => draft,
            _ => &self.storage.content,
        }
    }

    /// Nothing to show once drafts are taken into account
    pub fn is_void(&self) -> bool {
        self.content_state_for_edit().is_empty()
    }

    /// Check if the wrapped comment is published
    pub fn is_published(&self) -> bool {
        self.storage.is_published()
    }

    /// The wrapped comment
    pub fn storage(&self) -> &InlineComment {
        &self.storage
    }

    /// Unwrap back into the storage representation
    pub fn into_storage(self) -> InlineComment {
        self.storage
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::comment::builder::InlineCommentBuilder;
    use crate::types::{CommentId, Phid};

    fn view(text: &str) -> InlineCommentView {
        InlineCommentView::new(
            InlineCommentBuilder::new(
                CommentId(1),
                Phid::from_string("PHID-USER-alice"),
                Phid::from_string("PHID-DREV-1"),
            )
            .content(text)
            .build(),
        )
    }

    #[test]
    fn test_edit_state_without_draft() {
        let view = view("stored");
        assert_eq!(view.content_state_for_edit().text, "stored");
        assert!(!view.is_void());
    }

    #[test]
    fn test_non_empty_draft_wins() {
        let mut view = view("stored");
        view.attach_draft(Some(ContentState::new("edited")));
        assert_eq!(view.content_state_for_edit().text, "edited");
        assert_eq!(view.content_state().text, "stored");
    }

    #[test]
    fn test_empty_draft_falls_back_to_stored() {
        let mut view = view("stored");
        view.attach_draft(Some(ContentState::default()));
        assert_eq!(view.content_state_for_edit().text, "stored");
        assert!(!view.is_void());
    }

    #[test]
    fn test_void() {
        let mut empty = view("");
        assert!(empty.is_void());

        empty.attach_draft(Some(ContentState::new("").with_suggestion("x")));
        assert!(!empty.is_void());
    }

    #[test]
    fn test_set_content_round_trips_to_storage() {
        let mut view = view("stored");
        view.set_content_state(ContentState::new("shown"));
        assert_eq!(view.into_storage().content.text, "shown");
    }
}
