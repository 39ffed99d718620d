//! Query command
//!
//! Run an inline comment query against a file-system store.

use anyhow::{Context, Result};
use clap::{Args, ValueEnum};
use iq_core::comment::{FixedState, InlineComment, InlineContext};
use iq_core::config::Config;
use iq_core::query::{
    AuditInlineScope, DiffInlineScope, InlineCommentScope, InlineQuery, InlineQueryBuilder,
    RejectReason,
};
use iq_core::types::{CommentId, Phid, Viewer};
use iq_core::{QueryEngine, QueryResult};
use iq_storage::FileSystemStore;
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

/// Output format options
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable listing
    Text,
    /// JSON document with comments and rejects
    Json,
}

/// Arguments for the query command
#[derive(Debug, Args)]
pub struct QueryArgs {
    /// Store directory (defaults to the configured or platform location)
    #[arg(long)]
    pub store: Option<PathBuf>,

    /// Viewer PHID; anonymous when omitted
    #[arg(long)]
    pub viewer: Option<String>,

    /// Only comments on this revision or commit (repeatable)
    #[arg(long = "object")]
    pub objects: Vec<String>,

    /// Only comments with this ID (repeatable)
    #[arg(long = "id")]
    pub ids: Vec<u64>,

    /// Only comments by this author (repeatable)
    #[arg(long = "author")]
    pub authors: Vec<String>,

    /// Only comments in this fixed state (repeatable)
    #[arg(long = "fixed-state")]
    pub fixed_states: Vec<FixedState>,

    /// Include published comments
    #[arg(long)]
    pub published: bool,

    /// Include the viewer's unpublished drafts
    #[arg(long)]
    pub publishable: bool,

    /// Resolve reply parents
    #[arg(long)]
    pub replies: bool,

    /// Attach hidden flags
    #[arg(long)]
    pub hidden: bool,

    /// Show the viewer's unsaved drafts
    #[arg(long)]
    pub drafts: bool,

    /// Attach surrounding source lines
    #[arg(long)]
    pub context: bool,

    /// Query audit (commit) comments instead of revision comments
    #[arg(long)]
    pub audit: bool,

    /// Fetch at most this many comments
    #[arg(long, short)]
    pub limit: Option<usize>,

    /// Output format
    #[arg(long, short, value_enum, default_value = "text")]
    pub format: OutputFormat,
}

impl QueryArgs {
    fn viewer(&self) -> Viewer {
        match &self.viewer {
            Some(phid) => Viewer::user(Phid::from_string(phid.as_str())),
            None => Viewer::anonymous(),
        }
    }

    /// Build the query; flags switch toggles on over the configured defaults
    fn to_query(&self, config: &Config) -> Result<InlineQuery> {
        let mut builder = InlineQueryBuilder::from_defaults(self.viewer(), &config.query);

        if self.replies {
            builder = builder.need_reply_to_comments(true);
        }
        if self.hidden {
            builder = builder.need_hidden(true);
        }
        if self.drafts {
            builder = builder.need_applied_drafts(true);
        }
        if self.context {
            builder = builder.need_inline_context(true);
        }

        if !self.objects.is_empty() {
            builder = builder.with_object_phids(to_phids(&self.objects));
        }
        if !self.ids.is_empty() {
            builder = builder.with_ids(self.ids.iter().copied().map(CommentId));
        }
        if !self.authors.is_empty() {
            builder = builder.with_author_phids(to_phids(&self.authors));
        }
        if !self.fixed_states.is_empty() {
            builder = builder.with_fixed_states(self.fixed_states.iter().copied());
        }
        if self.published {
            builder = builder.with_published_comments(true);
        }
        if self.publishable {
            builder = builder.with_publishable_comments(true);
        }
        if let Some(limit) = self.limit {
            builder = builder.with_limit(limit);
        }

        Ok(builder.build()?)
    }
}

fn to_phids(values: &[String]) -> Vec<Phid> {
    values.iter().map(|p| Phid::from_string(p.as_str())).collect()
}

/// Execute the query command
pub fn execute(args: QueryArgs, config: &Config) -> Result<()> {
    let root = args
        .store
        .clone()
        .or_else(|| config.storage.root.clone())
        .unwrap_or_else(FileSystemStore::default_root);
    let store = Arc::new(
        FileSystemStore::new(&root)
            .with_context(|| format!("Failed to open store at {}", root.display()))?,
    );

    let scope: Arc<dyn InlineCommentScope> = if args.audit {
        Arc::new(AuditInlineScope::new())
    } else {
        Arc::new(DiffInlineScope::new(store.clone()))
    };
    let engine =
        QueryEngine::from_store(scope, store).with_context_config(config.context.clone());

    let query = args.to_query(config)?;
    info!("Querying inline comments for {}", query.viewer());
    let result = engine.execute(&query)?;

    match args.format {
        OutputFormat::Json => {
            let report = QueryReport::from_result(&result);
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        OutputFormat::Text => print_text(&result),
    }

    Ok(())
}

/// One comment with whatever the pipeline attached to it
#[derive(Debug, Serialize)]
struct CommentReport<'a> {
    #[serde(flatten)]
    comment: &'a InlineComment,
    #[serde(skip_serializing_if = "Option::is_none")]
    reply_to_comment: Option<Option<CommentId>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    is_hidden: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    inline_context: Option<Option<&'a InlineContext>>,
}

#[derive(Debug, Serialize)]
struct RejectReport<'a> {
    id: CommentId,
    phid: &'a Phid,
    reason: RejectReason,
}

#[derive(Debug, Serialize)]
struct QueryReport<'a> {
    comments: Vec<CommentReport<'a>>,
    rejects: Vec<RejectReport<'a>>,
}

impl<'a> QueryReport<'a> {
    fn from_result(result: &'a QueryResult) -> Self {
        let comments = result
            .comments
            .iter()
            .map(|comment| CommentReport {
                comment,
                reply_to_comment: comment.reply_to_comment().ok().map(|p| p.map(|p| p.id)),
                is_hidden: comment.is_hidden().ok(),
                inline_context: comment.inline_context().ok(),
            })
            .collect();
        let rejects = result
            .rejects
            .iter()
            .map(|r| RejectReport {
                id: r.comment.id,
                phid: &r.comment.phid,
                reason: r.reason,
            })
            .collect();

        Self { comments, rejects }
    }
}

fn line_span(comment: &InlineComment) -> String {
    if comment.line_length == 0 {
        format!("line {}", comment.line_number)
    } else {
        format!(
            "lines {}-{}",
            comment.line_number,
            comment.line_number.saturating_add(comment.line_length)
        )
    }
}

fn print_text(result: &QueryResult) {
    use colored::Colorize;

    if result.comments.is_empty() {
        println!("No inline comments found.");
    }

    for comment in &result.comments {
        let lines = line_span(comment);
        let status = if comment.is_published() {
            "published".green()
        } else {
            "draft".yellow()
        };

        print!(
            "{} {} {} {} [{}]",
            format!("#{}", comment.id).cyan(),
            comment.author_phid.to_string().dimmed(),
            format!("changeset {}", comment.changeset_id).dimmed(),
            lines,
            status
        );
        if let Some(state) = comment.fixed_state {
            print!(" [{}]", state);
        }
        if matches!(comment.is_hidden(), Ok(true)) {
            print!(" {}", "[hidden]".dimmed());
        }
        println!();

        if let Ok(Some(parent)) = comment.reply_to_comment() {
            println!("  {} #{}", "in reply to".dimmed(), parent.id);
        }
        for line in comment.content.text.lines() {
            println!("  {}", line);
        }
        if let Some(suggestion) = &comment.content.suggestion {
            println!("  {}", "suggestion:".dimmed());
            for line in suggestion.lines() {
                println!("  {} {}", "+".green(), line);
            }
        }

        if let Ok(Some(context)) = comment.inline_context() {
            for (index, line) in context.lines() {
                let text = format!("{:>5} | {}", index + 1, line.trim_end_matches('\n'));
                if context.body_lines.contains_key(index) {
                    println!("  {}", text.bold());
                } else {
                    println!("  {}", text.dimmed());
                }
            }
        }
        println!();
    }

    if !result.rejects.is_empty() {
        eprintln!(
            "{} {} comment(s) filtered out",
            "⚠".yellow(),
            result.rejects.len()
        );
        for reject in &result.rejects {
            eprintln!("  #{}: {}", reject.comment.id, reject.reason);
        }
    }
}
