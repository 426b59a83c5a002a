use anyhow::Result;
use clap::ValueEnum;
use rmcp::{
    ServerHandler, ServiceExt,
    handler::server::{router::tool::ToolRouter, wrapper::Parameters},
    model::{ServerCapabilities, ServerInfo},
    schemars, tool, tool_router,
};
use serde::{Deserialize, Serialize};

use crate::commands::{attach_contents, toc_sections};
use crate::page_range::expand_page_ranges;
use crate::pdf::{PageSource, PdfPages};
use crate::query::{build_groups, combined_preview, evaluate, Operator, QueryRow};
use crate::sections::{Grouping, Section};

// Request structs for tools

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct QueryRowParam {
    #[schemars(description = "How this term joins the ones before it: 'initial', 'and' or 'or'")]
    #[serde(default)]
    pub op: String,
    #[schemars(description = "Text that must appear in the line; blank rows are ignored")]
    #[serde(default)]
    pub text: String,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct TocSectionsRequest {
    #[schemars(description = "Path to the PDF file")]
    pub path: String,
    #[schemars(description = "TOC pages, 1-based and inclusive ('2-25' reads pages 2 to 25)")]
    pub toc_pages: String,
    #[schemars(description = "'Outermost' (default) or 'Innermost'")]
    #[serde(default)]
    pub grouping: Option<String>,
    #[schemars(description = "Query rows selecting leaf entries; empty matches every entry")]
    #[serde(default)]
    pub query: Vec<QueryRowParam>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct QueryMatchRequest {
    #[schemars(description = "Line of text to test")]
    pub line: String,
    #[schemars(description = "Query rows; AND binds tighter than OR")]
    pub query: Vec<QueryRowParam>,
    #[schemars(description = "Case sensitive matching (default: false)")]
    #[serde(default)]
    pub case_sensitive: bool,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct ReadPagesRequest {
    #[schemars(description = "Path to the PDF file")]
    pub path: String,
    #[schemars(description = "Page ranges (e.g., '1-5,10,15-end')")]
    pub pages: String,
}

fn query_rows(params: Vec<QueryRowParam>) -> Vec<QueryRow> {
    params
        .into_iter()
        .map(|p| QueryRow::new(Operator::parse(&p.op), p.text))
        .collect()
}

fn parse_grouping(grouping: Option<&str>) -> Result<Grouping> {
    match grouping {
        None => Ok(Grouping::default()),
        Some(s) => Grouping::from_str(s, true).map_err(anyhow::Error::msg),
    }
}

#[derive(Debug, Clone)]
pub struct TocServer {
    #[allow(dead_code)]
    tool_router: ToolRouter<Self>,
}

impl TocServer {
    pub fn new() -> Self {
        Self {
            tool_router: Self::tool_router(),
        }
    }

    fn sections(&self, req: TocSectionsRequest, with_content: bool) -> Result<Vec<Section>> {
        let grouping = parse_grouping(req.grouping.as_deref())?;
        let rows = query_rows(req.query);
        let pages = PdfPages::open(&req.path)?;
        let sections = toc_sections(&pages, &req.toc_pages, grouping, &rows)?;
        if with_content {
            Ok(attach_contents(&pages, sections)?)
        } else {
            Ok(sections)
        }
    }
}

impl Default for TocServer {
    fn default() -> Self {
        Self::new()
    }
}

#[tool_router]
impl TocServer {
    #[tool(description = "Parse the table of contents pages of a PDF into sections (name, start page, end page) named after the entries whose sub-entries match the query")]
    fn toc_sections(&self, Parameters(req): Parameters<TocSectionsRequest>) -> String {
        match self.sections(req, false) {
            Ok(sections) => {
                serde_json::to_string_pretty(&sections).unwrap_or_else(|e| format!("Error: {}", e))
            }
            Err(e) => format!("Error: {:#}", e),
        }
    }

    #[tool(description = "Like toc_sections, but also returns the extracted text of every section's pages")]
    fn section_contents(&self, Parameters(req): Parameters<TocSectionsRequest>) -> String {
        match self.sections(req, true) {
            Ok(sections) => {
                serde_json::to_string_pretty(&sections).unwrap_or_else(|e| format!("Error: {}", e))
            }
            Err(e) => format!("Error: {:#}", e),
        }
    }

    #[tool(description = "Check whether a line of text matches a query, and show how the query is grouped")]
    fn query_match(&self, Parameters(req): Parameters<QueryMatchRequest>) -> String {
        let rows = query_rows(req.query);
        let result = QueryMatchResult {
            matched: evaluate(&req.line, &rows, req.case_sensitive),
            expression: combined_preview(&rows),
            groups: build_groups(&rows, req.case_sensitive),
        };
        serde_json::to_string_pretty(&result).unwrap_or_else(|e| format!("Error: {}", e))
    }

    #[tool(description = "Extract text content from specific pages of a PDF. Use page range syntax like '1-5,10,15-end'.")]
    fn read_pages(&self, Parameters(req): Parameters<ReadPagesRequest>) -> String {
        let pages = match PdfPages::open(&req.path) {
            Ok(p) => p,
            Err(e) => return format!("Error: {:#}", e),
        };

        let page_list = match expand_page_ranges(&req.pages, pages.page_count() as u32) {
            Ok(p) => p,
            Err(e) => return format!("Error: {}", e),
        };

        let result: Vec<PageTextResult> = pages
            .pages_text(&page_list)
            .into_iter()
            .map(|t| PageTextResult {
                page: t.page,
                text: t.text,
            })
            .collect();
        serde_json::to_string_pretty(&result).unwrap_or_else(|e| format!("Error: {}", e))
    }
}

// Result types for MCP tools

#[derive(Debug, Serialize, Deserialize, schemars::JsonSchema)]
pub struct QueryMatchResult {
    pub matched: bool,
    pub expression: String,
    pub groups: Vec<Vec<String>>,
}

#[derive(Debug, Serialize, Deserialize, schemars::JsonSchema)]
pub struct PageTextResult {
    pub page: u32,
    pub text: String,
}

impl ServerHandler for TocServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            instructions: Some(
                "Table of contents section mapping. Use toc_sections to map matching TOC entries \
                 to page ranges, section_contents to also fetch their text, query_match to test \
                 a query against a line, and read_pages to read raw page text."
                    .to_string(),
            ),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            ..Default::default()
        }
    }
}

pub async fn run_server() -> Result<()> {
    let server = TocServer::new();

    tracing::info!("serving MCP over stdio");
    let service = server.serve((tokio::io::stdin(), tokio::io::stdout())).await?;

    service.waiting().await?;

    Ok(())
}
