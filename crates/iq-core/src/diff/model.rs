//! Changeset and hunk models

use crate::types::ChangesetId;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// One file's worth of a diff
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Changeset {
    /// Storage identifier
    pub id: ChangesetId,
    /// Original file path (None if new file)
    #[serde(default)]
    pub old_path: Option<PathBuf>,
    /// New file path (None if deleted)
    #[serde(default)]
    pub new_path: Option<PathBuf>,
    /// List of hunks
    pub hunks: Vec<Hunk>,
}

impl Changeset {
    /// Create a changeset from hunks
    pub fn new(id: ChangesetId, hunks: Vec<Hunk>) -> Self {
        Self {
            id,
            old_path: None,
            new_path: None,
            hunks,
        }
    }

    /// A changeset adding `content` as a brand new file
    pub fn for_added_file(id: ChangesetId, content: &str) -> Self {
        let lines: Vec<Line> = content
            .lines()
            .map(|l| Line::new(LineType::Added, l))
            .collect();
        let count = lines.len();

        let mut hunk = Hunk {
            old_range: Range::new(0, 0),
            new_range: Range::new(1, count),
            lines,
        };
        if !content.is_empty() && !content.ends_with('\n') {
            hunk.lines.push(Line::new(LineType::NoNewline, ""));
        }

        Self::new(id, vec![hunk])
    }

    /// Get the display path (prefer new_path)
    pub fn display_path(&self) -> Option<&PathBuf> {
        self.new_path.as_ref().or(self.old_path.as_ref())
    }

    /// Reassemble the old side of the file from the hunks
    pub fn make_old_file(&self) -> String {
        self.make_file(DiffSide::Old)
    }

    /// Reassemble the new side of the file from the hunks
    pub fn make_new_file(&self) -> String {
        self.make_file(DiffSide::New)
    }

    /// Reassemble one side of the file from the hunks
    ///
    /// Only lines covered by hunks are present, so the result is the full
    /// file only when the hunks cover it.
    pub fn make_file(&self, side: DiffSide) -> String {
        let mut output = String::new();
        for hunk in &self.hunks {
            let mut last_included = false;
            for line in &hunk.lines {
                if line.line_type == LineType::NoNewline {
                    if last_included && output.ends_with('\n') {
                        output.pop();
                    }
                    continue;
                }

                last_included = line.line_type.is_on(side);
                if last_included {
                    output.push_str(&line.content);
                    output.push('\n');
                }
            }
        }
        output
    }

    /// Single hunk starting at or before `max_offset` on both sides
    pub fn is_top_anchored(&self, max_offset: usize) -> bool {
        match self.hunks.as_slice() {
            [hunk] => hunk.old_offset() <= max_offset && hunk.new_offset() <= max_offset,
            _ => false,
        }
    }
}

/// Side of the diff (old/left or new/right)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DiffSide {
    /// Old/left side (deleted code)
    Old,
    /// New/right side (added code)
    New,
}

impl DiffSide {
    /// Side selected by an inline comment's `is_new_file` flag
    pub fn from_is_new_file(is_new_file: bool) -> Self {
        if is_new_file {
            DiffSide::New
        } else {
            DiffSide::Old
        }
    }
}

/// A hunk in a diff
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Hunk {
    /// Old file line range
    pub old_range: Range,
    /// New file line range
    pub new_range: Range,
    /// Lines in this hunk
    pub lines: Vec<Line>,
}

impl Hunk {
    /// First old-side line number
    pub fn old_offset(&self) -> usize {
        self.old_range.start
    }

    /// First new-side line number
    pub fn new_offset(&self) -> usize {
        self.new_range.start
    }
}

/// Line range in a hunk
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Range {
    /// Starting line number
    pub start: usize,
    /// Number of lines
    pub count: usize,
}

impl Range {
    /// Create a new range
    pub fn new(start: usize, count: usize) -> Self {
        Self { start, count }
    }
}

/// A single line in a hunk
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Line {
    /// Line type
    pub line_type: LineType,
    /// Line content (without prefix or terminator)
    pub content: String,
}

impl Line {
    /// Create a line
    pub fn new(line_type: LineType, content: impl Into<String>) -> Self {
        Self {
            line_type,
            content: content.into(),
        }
    }
}

/// Type of line change
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LineType {
    /// Line was added
    Added,
    /// Line was deleted
    Deleted,
    /// Context line (unchanged)
    Context,
    /// No newline at end of file marker
    NoNewline,
}

impl LineType {
    /// Line type for a unified diff prefix character
    pub fn from_prefix(prefix: char) -> Option<Self> {
        match prefix {
            '+' => Some(LineType::Added),
            '-' => Some(LineType::Deleted),
            ' ' => Some(LineType::Context),
            '\\' => Some(LineType::NoNewline),
            _ => None,
        }
    }

    /// Whether the line exists on the given side
    pub fn is_on(&self, side: DiffSide) -> bool {
        match (self, side) {
            (LineType::Context, _) => true,
            (LineType::Added, DiffSide::New) => true,
            (LineType::Deleted, DiffSide::Old) => true,
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn modified() -> Changeset {
        Changeset::new(
            ChangesetId(1),
            vec![Hunk {
                old_range: Range::new(1, 3),
                new_range: Range::new(1, 3),
                lines: vec![
                    Line::new(LineType::Context, "fn main() {"),
                    Line::new(LineType::Deleted, "    old();"),
                    Line::new(LineType::Added, "    new();"),
                    Line::new(LineType::Context, "}"),
                ],
            }],
        )
    }

    #[test]
    fn test_make_files() {
        let changeset = modified();
        assert_eq!(changeset.make_old_file(), "fn main() {\n    old();\n}\n");
        assert_eq!(changeset.make_new_file(), "fn main() {\n    new();\n}\n");
    }

    #[test]
    fn test_no_newline_marker() {
        let changeset = Changeset::new(
            ChangesetId(1),
            vec![Hunk {
                old_range: Range::new(1, 1),
                new_range: Range::new(1, 1),
                lines: vec![
                    Line::new(LineType::Deleted, "a"),
                    Line::new(LineType::NoNewline, ""),
                    Line::new(LineType::Added, "b"),
                ],
            }],
        );
        assert_eq!(changeset.make_old_file(), "a");
        assert_eq!(changeset.make_new_file(), "b\n");
    }

    #[test]
    fn test_for_added_file() {
        let changeset = Changeset::for_added_file(ChangesetId(2), "one\ntwo\n");
        assert_eq!(changeset.hunks.len(), 1);
        assert_eq!(changeset.hunks[0].old_offset(), 0);
        assert_eq!(changeset.hunks[0].new_offset(), 1);
        assert_eq!(changeset.make_new_file(), "one\ntwo\n");
        assert_eq!(changeset.make_old_file(), "");

        let unterminated = Changeset::for_added_file(ChangesetId(3), "one\ntwo");
        assert_eq!(unterminated.make_new_file(), "one\ntwo");
    }

    #[test]
    fn test_top_anchored() {
        assert!(modified().is_top_anchored(1));

        let mut later = modified();
        later.hunks[0].new_range.start = 20;
        assert!(!later.is_top_anchored(1));

        let mut two = modified();
        two.hunks.push(two.hunks[0].clone());
        assert!(!two.is_top_anchored(1));

        assert!(!Changeset::new(ChangesetId(1), vec![]).is_top_anchored(1));
    }

    #[test]
    fn test_line_type_sides() {
        assert!(LineType::Context.is_on(DiffSide::Old));
        assert!(LineType::Added.is_on(DiffSide::New));
        assert!(!LineType::Added.is_on(DiffSide::Old));
        assert!(!LineType::NoNewline.is_on(DiffSide::New));
        assert_eq!(DiffSide::from_is_new_file(false), DiffSide::Old);
    }

    #[test]
    fn test_line_type_from_prefix() {
        assert_eq!(LineType::from_prefix('+'), Some(LineType::Added));
        assert_eq!(LineType::from_prefix('-'), Some(LineType::Deleted));
        assert_eq!(LineType::from_prefix(' '), Some(LineType::Context));
        assert_eq!(LineType::from_prefix('@'), None);
    }
}
