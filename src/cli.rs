use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::query::{parse_expression, QueryRow};
use crate::sections::Grouping;
use crate::summarize::DEFAULT_MODEL;

#[derive(Parser)]
#[command(name = "tocmark")]
#[command(about = "Map PDF table of contents entries to page ranges and markdown summaries")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run as MCP server
    Mcp,

    /// List the sections whose entries match the query
    Sections {
        #[command(flatten)]
        toc: TocArgs,

        /// Which ancestor of a matching entry names its section
        #[arg(short, long, value_enum, default_value_t = Grouping::Outermost)]
        grouping: Grouping,

        /// Print sections as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show the table of contents lines the query matches
    Grep {
        #[command(flatten)]
        toc: TocArgs,

        /// Match query terms case-sensitively
        #[arg(short = 's', long)]
        case_sensitive: bool,
    },

    /// Summarize each matching section into <output-dir>/<section>.md
    Markdown(MarkdownArgs),

    /// Extract text from specific pages
    ReadPages {
        /// PDF file to read
        path: PathBuf,

        /// Page ranges (e.g., "1-5,10")
        pages: String,
    },

    /// Show how a query is grouped before it is evaluated
    QueryPreview {
        #[command(flatten)]
        query: QueryArgs,
    },
}

#[derive(Args, Debug, Clone)]
pub struct QueryArgs {
    /// Query expression, e.g. "L1 or L2 and Automated"
    #[arg(short, long)]
    pub query: Option<String>,

    /// JSON file with query rows, e.g. [{"op": "initial", "text": "L1"}]
    #[arg(long, conflicts_with = "query")]
    pub query_file: Option<PathBuf>,
}

impl QueryArgs {
    /// Query rows from whichever source was given; no query matches every entry
    pub fn rows(&self) -> Result<Vec<QueryRow>> {
        if let Some(path) = &self.query_file {
            let json = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read query file: {}", path.display()))?;
            return serde_json::from_str(&json)
                .with_context(|| format!("Invalid query file: {}", path.display()));
        }
        let rows = match &self.query {
            Some(expr) => parse_expression(expr),
            None => Vec::new(),
        };
        Ok(rows)
    }
}

#[derive(Args, Debug, Clone)]
pub struct TocArgs {
    /// PDF file to read
    pub path: PathBuf,

    /// Table of contents pages, 1-based and inclusive (e.g. "2-25")
    ///
    /// "2-25" reads the 2nd through the 25th page of the PDF. A zero-based
    /// page slice 2:25 starts one page later and corresponds to "3-25".
    #[arg(short, long)]
    pub toc: String,

    #[command(flatten)]
    pub query: QueryArgs,
}

#[derive(Args, Debug, Clone)]
pub struct MarkdownArgs {
    #[command(flatten)]
    pub toc: TocArgs,

    /// Which ancestor of a matching entry names its section
    #[arg(short, long, value_enum, default_value_t = Grouping::Outermost)]
    pub grouping: Grouping,

    /// Directory for the generated markdown files
    #[arg(short, long)]
    pub output_dir: PathBuf,

    /// API key for the chat completions endpoint
    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
    pub api_key: String,

    /// Base URL of an OpenAI-compatible API
    #[arg(long, env = "OPENAI_BASE_URL")]
    pub base_url: Option<String>,

    /// Model used for summaries
    #[arg(short, long, env = "TOCMARK_MODEL", default_value = DEFAULT_MODEL)]
    pub model: String,

    /// File with a system prompt replacing the built-in one
    #[arg(long)]
    pub prompt_file: Option<PathBuf>,

    /// Number of sections summarized concurrently
    #[arg(short, long, default_value = "4")]
    pub jobs: usize,
}
