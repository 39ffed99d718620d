//! Directory-backed stores

use iq_core::comment::{ContentState, InlineComment};
use iq_core::diff::{Changeset, DiffParser};
use iq_core::error::{InlineQueryError, Result};
use iq_core::query::Predicate;
use iq_core::store::{ChangesetStore, CommentSource, DraftStore, HiddenStore};
use iq_core::types::{ChangesetId, CommentId, Phid};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use std::fs;
use std::io::{BufReader, BufWriter, ErrorKind, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Stores backed by a directory:
///
/// ```text
/// <root>/comments.json           all inline comments
/// <root>/drafts/<viewer>.json    { comment phid: content state }
/// <root>/hidden/<viewer>.json    [comment id, ...]
/// <root>/changesets/<id>.diff    unified diff of one file
/// ```
pub struct FileSystemStore {
    root: PathBuf,
    parser: DiffParser,
}

impl FileSystemStore {
    const COMMENTS_FILE: &'static str = "comments.json";
    const DRAFTS_DIR: &'static str = "drafts";
    const HIDDEN_DIR: &'static str = "hidden";
    const CHANGESETS_DIR: &'static str = "changesets";

    /// Open a store rooted at `root`, creating its directories
    pub fn new(root: impl Into<PathBuf>) -> Result<Self> {
        let store = Self {
            root: root.into(),
            parser: DiffParser::new(),
        };
        store.ensure_dirs()?;
        Ok(store)
    }

    /// Open the store in the platform data directory
    pub fn default_location() -> Result<Self> {
        Self::new(Self::default_root())
    }

    /// Platform data directory (~/.inline-query when none is known)
    pub fn default_root() -> PathBuf {
        directories::ProjectDirs::from("com", "inline-query", "inline-query")
            .map(|dirs| dirs.data_dir().to_path_buf())
            .unwrap_or_else(|| {
                dirs::home_dir()
                    .unwrap_or_else(|| PathBuf::from("."))
                    .join(".inline-query")
            })
    }

    /// Root directory
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn ensure_dirs(&self) -> Result<()> {
        for dir in [Self::DRAFTS_DIR, Self::HIDDEN_DIR, Self::CHANGESETS_DIR] {
            let path = self.root.join(dir);
            if !path.exists() {
                fs::create_dir_all(&path).map_err(|e| {
                    InlineQueryError::Io(e).with_context(format!("Failed to create {:?}", path))
                })?;
                debug!("Created store directory: {:?}", path);
            }
        }
        Ok(())
    }

    fn comments_path(&self) -> PathBuf {
        self.root.join(Self::COMMENTS_FILE)
    }

    fn drafts_path(&self, viewer: &Phid) -> PathBuf {
        self.root
            .join(Self::DRAFTS_DIR)
            .join(format!("{}.json", viewer))
    }

    fn hidden_path(&self, viewer: &Phid) -> PathBuf {
        self.root
            .join(Self::HIDDEN_DIR)
            .join(format!("{}.json", viewer))
    }

    fn changeset_path(&self, id: ChangesetId) -> PathBuf {
        self.root
            .join(Self::CHANGESETS_DIR)
            .join(format!("{}.diff", id))
    }

    /// Read a JSON file; `None` when it does not exist
    fn read_json<T: DeserializeOwned>(&self, path: &Path) -> Result<Option<T>> {
        let file = match fs::File::open(path) {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(InlineQueryError::Io(e).with_context(format!("Failed to open {:?}", path)))
            }
        };

        let value = serde_json::from_reader(BufReader::new(file)).map_err(|e| {
            InlineQueryError::Serde(e).with_context(format!("Malformed store file {:?}", path))
        })?;
        Ok(Some(value))
    }

    /// Write a file atomically (write to temp, then rename)
    fn atomic_write(&self, path: &Path, contents: &[u8]) -> Result<()> {
        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("store");
        let temp_path = path.with_file_name(format!(".{}.tmp", file_name));

        let temp_file = fs::File::create(&temp_path).map_err(|e| {
            InlineQueryError::Io(e).with_context(format!("Failed to create {:?}", temp_path))
        })?;
        let mut writer = BufWriter::new(temp_file);
        writer.write_all(contents)?;
        writer.flush()?;

        fs::rename(&temp_path, path).map_err(|e| {
            let _ = fs::remove_file(&temp_path);
            InlineQueryError::Io(e).with_context(format!("Failed to write {:?}", path))
        })?;

        debug!("Wrote {:?}", path);
        Ok(())
    }

    fn write_json<T: Serialize>(&self, path: &Path, value: &T) -> Result<()> {
        let contents = serde_json::to_vec_pretty(value)?;
        self.atomic_write(path, &contents)
    }

    /// Every stored comment, in file order
    pub fn load_comments(&self) -> Result<Vec<InlineComment>> {
        Ok(self.read_json(&self.comments_path())?.unwrap_or_default())
    }

    /// Replace the stored comments
    pub fn save_comments(&self, comments: &[InlineComment]) -> Result<()> {
        self.write_json(&self.comments_path(), &comments)?;
        info!("Saved {} inline comment(s)", comments.len());
        Ok(())
    }

    /// Save `viewer`'s draft of `comment`
    pub fn save_draft(&self, viewer: &Phid, comment: &Phid, state: &ContentState) -> Result<()> {
        let path = self.drafts_path(viewer);
        let mut drafts: HashMap<String, serde_json::Value> =
            self.read_json(&path)?.unwrap_or_default();
        drafts.insert(comment.to_string(), state.to_storage_map());
        self.write_json(&path, &drafts)
    }

    /// Hide `comment` for `viewer`
    pub fn hide_comment(&self, viewer: &Phid, comment: CommentId) -> Result<()> {
        let path = self.hidden_path(viewer);
        let mut hidden: Vec<CommentId> = self.read_json(&path)?.unwrap_or_default();
        if !hidden.contains(&comment) {
            hidden.push(comment);
        }
        self.write_json(&path, &hidden)
    }

    /// Store the unified diff of a changeset
    pub fn save_changeset_diff(&self, id: ChangesetId, diff: &str) -> Result<()> {
        self.atomic_write(&self.changeset_path(id), diff.as_bytes())
    }
}

impl CommentSource for FileSystemStore {
    fn fetch(&self, predicate: &Predicate, limit: Option<usize>) -> Result<Vec<InlineComment>> {
        let all = self.load_comments()?;
        let total = all.len();

        let page: Vec<InlineComment> = all
            .into_iter()
            .filter(|c| predicate.matches(c))
            .take(limit.unwrap_or(usize::MAX))
            .collect();

        debug!("Fetched {} of {} stored inline(s)", page.len(), total);
        Ok(page)
    }
}

impl DraftStore for FileSystemStore {
    fn load_drafts(
        &self,
        viewer: &Phid,
        comments: &[InlineComment],
    ) -> Result<HashMap<Phid, ContentState>> {
        let stored: HashMap<String, serde_json::Value> =
            match self.read_json(&self.drafts_path(viewer))? {
                Some(stored) => stored,
                None => return Ok(HashMap::new()),
            };

        let mut drafts = HashMap::new();
        for comment in comments {
            if let Some(map) = stored.get(comment.phid.as_str()) {
                let state = ContentState::from_storage_map(map.clone()).map_err(|e| {
                    e.with_context(format!("Malformed draft for {}", comment.phid))
                })?;
                drafts.insert(comment.phid.clone(), state);
            }
        }
        Ok(drafts)
    }
}

impl HiddenStore for FileSystemStore {
    fn load_hidden(&self, viewer: &Phid, comments: &[InlineComment]) -> Result<HashSet<CommentId>> {
        let stored: HashSet<CommentId> = self
            .read_json::<Vec<CommentId>>(&self.hidden_path(viewer))?
            .unwrap_or_default()
            .into_iter()
            .collect();

        Ok(comments
            .iter()
            .map(|c| c.id)
            .filter(|id| stored.contains(id))
            .collect())
    }
}

impl ChangesetStore for FileSystemStore {
    fn load_changeset(&self, id: ChangesetId) -> Result<Option<Changeset>> {
        let path = self.changeset_path(id);
        let diff = match fs::read_to_string(&path) {
            Ok(diff) => diff,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(InlineQueryError::Io(e).with_context(format!("Failed to read {:?}", path)))
            }
        };

        let changeset = self.parser.parse(id, &diff)?;
        debug!("Loaded changeset {} with {} hunk(s)", id, changeset.hunks.len());
        Ok(Some(changeset))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use iq_core::comment::InlineCommentBuilder;
    use iq_core::query::{Clause, DiffInlineScope, InlineQueryBuilder};
    use iq_core::types::Viewer;
    use iq_core::QueryEngine;
    use pretty_assertions::assert_eq;
    use std::sync::Arc;
    use tempfile::TempDir;

    fn create_test_store() -> (FileSystemStore, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let store = FileSystemStore::new(temp_dir.path()).unwrap();
        (store, temp_dir)
    }

    fn alice() -> Phid {
        Phid::from_string("PHID-USER-alice")
    }

    fn comment(id: u64) -> InlineComment {
        InlineCommentBuilder::new(CommentId(id), alice(), Phid::from_string("PHID-DREV-1"))
            .phid(Phid::from_string(format!("PHID-XCMT-{}", id)))
            .content(format!("comment {}", id))
            .build()
    }

    #[test]
    fn test_store_creation() {
        let (store, _temp) = create_test_store();
        assert!(store.root().join("drafts").is_dir());
        assert!(store.root().join("hidden").is_dir());
        assert!(store.root().join("changesets").is_dir());
    }

    #[test]
    fn test_missing_files_mean_nothing_stored() {
        let (store, _temp) = create_test_store();
        let page = vec![comment(1)];

        assert!(store.load_comments().unwrap().is_empty());
        assert!(store.load_drafts(&alice(), &page).unwrap().is_empty());
        assert!(store.load_hidden(&alice(), &page).unwrap().is_empty());
        assert!(store.load_changeset(ChangesetId(1)).unwrap().is_none());
    }

    #[test]
    fn test_comments_round_trip_through_fetch() {
        let (store, _temp) = create_test_store();
        store.save_comments(&[comment(1), comment(2), comment(3)]).unwrap();

        let predicate = Predicate::new(vec![Clause::IdIn(
            [CommentId(1), CommentId(3)].into_iter().collect(),
        )]);

        let fetched = store.fetch(&predicate, None).unwrap();
        let ids: Vec<CommentId> = fetched.iter().map(|c| c.id).collect();
        assert_eq!(ids, vec![CommentId(1), CommentId(3)]);

        let limited = store.fetch(&predicate, Some(1)).unwrap();
        assert_eq!(limited.len(), 1);
    }

    #[test]
    fn test_drafts_scoped_to_viewer_and_page() {
        let (store, _temp) = create_test_store();
        let first = comment(1);
        let second = comment(2);
        store
            .save_draft(&alice(), &first.phid, &ContentState::new("edited"))
            .unwrap();
        store
            .save_draft(&alice(), &second.phid, &ContentState::new("other"))
            .unwrap();

        let drafts = store.load_drafts(&alice(), &[first.clone()]).unwrap();
        assert_eq!(drafts.len(), 1);
        assert_eq!(drafts[&first.phid].text, "edited");

        let bob = Phid::from_string("PHID-USER-bob");
        assert!(store.load_drafts(&bob, &[first]).unwrap().is_empty());
    }

    #[test]
    fn test_hidden_ids() {
        let (store, _temp) = create_test_store();
        store.hide_comment(&alice(), CommentId(42)).unwrap();
        store.hide_comment(&alice(), CommentId(42)).unwrap();

        let hidden = store.load_hidden(&alice(), &[comment(42), comment(43)]).unwrap();
        assert_eq!(hidden, HashSet::from([CommentId(42)]));

        let content = fs::read_to_string(store.hidden_path(&alice())).unwrap();
        let stored: Vec<u64> = serde_json::from_str(&content).unwrap();
        assert_eq!(stored, vec![42]);
    }

    #[test]
    fn test_load_changeset_parses_diff() {
        let (store, _temp) = create_test_store();
        let diff = "diff --git a/src/lib.rs b/src/lib.rs\n\
                    --- a/src/lib.rs\n\
                    +++ b/src/lib.rs\n\
                    @@ -1,2 +1,2 @@\n\
                    \x20fn main() {\n\
                    -    old();\n\
                    +    new();\n";
        store.save_changeset_diff(ChangesetId(5), diff).unwrap();

        let changeset = store.load_changeset(ChangesetId(5)).unwrap().unwrap();
        assert_eq!(changeset.id, ChangesetId(5));
        assert_eq!(changeset.hunks.len(), 1);
        assert_eq!(changeset.make_new_file(), "fn main() {\n    new();\n");
    }

    #[test]
    fn test_malformed_file_is_an_error() {
        let (store, _temp) = create_test_store();
        fs::write(store.hidden_path(&alice()), "not json").unwrap();

        let err = store.load_hidden(&alice(), &[comment(1)]).unwrap_err();
        assert!(err.to_string().contains("Malformed store file"));
    }

    #[test]
    fn test_atomic_write_leaves_no_temp_file() {
        let (store, _temp) = create_test_store();
        store.save_comments(&[comment(1)]).unwrap();

        assert!(store.comments_path().exists());
        assert!(!store.root().join(".comments.json.tmp").exists());
    }

    #[test]
    fn test_engine_over_file_store() {
        let (store, _temp) = create_test_store();
        let published = InlineCommentBuilder::new(
            CommentId(7),
            Phid::from_string("PHID-USER-bob"),
            Phid::from_string("PHID-DREV-1"),
        )
        .content("looks good")
        .published(Phid::generate(Phid::TRANSACTION_TYPE))
        .build();
        store.save_comments(&[published, comment(8)]).unwrap();
        store.hide_comment(&alice(), CommentId(7)).unwrap();

        let store = Arc::new(store);
        let engine = QueryEngine::from_store(Arc::new(DiffInlineScope::new(store.clone())), store);
        let query = InlineQueryBuilder::new(Viewer::user(alice()))
            .with_published_comments(true)
            .with_publishable_comments(true)
            .need_hidden(true)
            .build()
            .unwrap();

        let result = engine.execute(&query).unwrap();
        assert_eq!(result.comments.len(), 2);
        assert!(result.comments[0].is_hidden().unwrap());
        assert!(!result.comments[1].is_hidden().unwrap());
    }
}
