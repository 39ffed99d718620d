//! Unified diff parser

use crate::diff::model::*;
use crate::error::{InlineQueryError, Result};
use crate::types::ChangesetId;
use std::path::PathBuf;

/// Configuration for the diff parser
#[derive(Debug, Clone)]
pub struct ParserConfig {
    /// Maximum diff size to parse (in bytes)
    pub max_diff_size: Option<usize>,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            max_diff_size: Some(10 * 1024 * 1024), // 10MB
        }
    }
}

/// Parser turning the unified diff of a single file into a [`Changeset`]
pub struct DiffParser {
    config: ParserConfig,
}

impl DiffParser {
    /// Create a new parser with default config
    pub fn new() -> Self {
        Self {
            config: ParserConfig::default(),
        }
    }

    /// Create a new parser with custom config
    pub fn with_config(config: ParserConfig) -> Self {
        Self { config }
    }

    /// Parse a diff string
    ///
    /// The `diff --git` and `---`/`+++` headers are optional; a bare list of
    /// hunks is accepted. A diff touching more than one file is rejected.
    pub fn parse(&self, id: ChangesetId, input: &str) -> Result<Changeset> {
        if let Some(max) = self.config.max_diff_size {
            if input.len() > max {
                return Err(InlineQueryError::InvalidDiff(format!(
                    "Diff for changeset {} is {} bytes, limit is {}",
                    id,
                    input.len(),
                    max
                )));
            }
        }

        let mut changeset = Changeset::new(id, Vec::new());
        let mut current_hunk: Option<HunkBuilder> = None;
        let mut seen_file_header = false;

        for line in input.lines() {
            // New file header
            if line.starts_with("diff --git ") {
                if seen_file_header {
                    return Err(InlineQueryError::InvalidDiff(format!(
                        "Diff for changeset {} touches more than one file",
                        id
                    )));
                }
                seen_file_header = true;

                let (old_path, new_path) = self.parse_diff_header(line)?;
                changeset.old_path = old_path;
                changeset.new_path = new_path;
            }
            // Hunk header
            else if line.starts_with("@@ ") {
                if let Some(hunk) = current_hunk.take() {
                    changeset.hunks.push(hunk.build());
                }

                let (old_range, new_range) = self.parse_hunk_header(line)?;
                current_hunk = Some(HunkBuilder::new(old_range, new_range));
            }
            // Diff lines
            else if let Some(ref mut hunk) = current_hunk {
                if let Some(line_data) = self.parse_line(line, hunk) {
                    hunk.push(line_data);
                }
            }
        }

        if let Some(hunk) = current_hunk.take() {
            changeset.hunks.push(hunk.build());
        }

        Ok(changeset)
    }

    /// Parse diff --git header to extract paths
    fn parse_diff_header(&self, line: &str) -> Result<(Option<PathBuf>, Option<PathBuf>)> {
        // Format: "diff --git a/path b/path"
        let parts: Vec<&str> = line.split(' ').collect();
        if parts.len() < 4 {
            return Err(InlineQueryError::InvalidDiff(format!(
                "Invalid diff header: {}",
                line
            )));
        }

        let old_path = parts[2].strip_prefix("a/").map(PathBuf::from);
        let new_path = parts[3].strip_prefix("b/").map(PathBuf::from);

        Ok((old_path, new_path))
    }

    /// Parse hunk header to extract ranges
    fn parse_hunk_header(&self, line: &str) -> Result<(Range, Range)> {
        // Format: "@@ -10,5 +10,7 @@" or "@@ -10 +10 @@"
        let parts: Vec<&str> = line.split_whitespace().collect();
        if parts.len() < 4 {
            return Err(InlineQueryError::InvalidDiff(format!(
                "Invalid hunk header: {}",
                line
            )));
        }

        let old_range = self.parse_range(parts[1].trim_start_matches('-'))?;
        let new_range = self.parse_range(parts[2].trim_start_matches('+'))?;

        Ok((old_range, new_range))
    }

    /// Parse a range string like "10,5" or "10"
    fn parse_range(&self, s: &str) -> Result<Range> {
        let parts: Vec<&str> = s.split(',').collect();
        let start = parts[0]
            .parse::<usize>()
            .map_err(|_| InlineQueryError::InvalidDiff(format!("Invalid range: {}", s)))?;
        let count = if parts.len() > 1 {
            parts[1]
                .parse::<usize>()
                .map_err(|_| InlineQueryError::InvalidDiff(format!("Invalid range: {}", s)))?
        } else {
            1
        };

        Ok(Range::new(start, count))
    }

    /// Parse a diff line inside a hunk
    fn parse_line(&self, line: &str, hunk: &HunkBuilder) -> Option<Line> {
        // Editors often strip the single space of an empty context line
        if line.is_empty() {
            return hunk.expects_more().then(|| Line::new(LineType::Context, ""));
        }

        let first_char = line.chars().next()?;
        let line_type = LineType::from_prefix(first_char)?;
        let content = match line_type {
            LineType::NoNewline => "",
            _ => &line[first_char.len_utf8()..],
        };

        Some(Line::new(line_type, content))
    }
}

impl Default for DiffParser {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for Hunk
struct HunkBuilder {
    old_range: Range,
    new_range: Range,
    old_seen: usize,
    new_seen: usize,
    lines: Vec<Line>,
}

impl HunkBuilder {
    fn new(old_range: Range, new_range: Range) -> Self {
        Self {
            old_range,
            new_range,
            old_seen: 0,
            new_seen: 0,
            lines: Vec::new(),
        }
    }

    fn expects_more(&self) -> bool {
        self.old_seen < self.old_range.count || self.new_seen < self.new_range.count
    }

    fn push(&mut self, line: Line) {
        if line.line_type.is_on(DiffSide::Old) {
            self.old_seen += 1;
        }
        if line.line_type.is_on(DiffSide::New) {
            self.new_seen += 1;
        }
        self.lines.push(line);
    }

    fn build(self) -> Hunk {
        Hunk {
            old_range: self.old_range,
            new_range: self.new_range,
            lines: self.lines,
        }
    }
}
