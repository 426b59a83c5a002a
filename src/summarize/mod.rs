pub mod openai;

use anyhow::Result;
use std::future::Future;

pub use openai::OpenAiSummarizer;

pub const DEFAULT_MODEL: &str = "gpt-4o";

pub const MARKDOWN_PROMPT: &str = "\
You convert sections of security benchmark documents into markdown. \
You are given the name of a section and the extracted text of its recommendations. \
Return one markdown table with a row per recommendation and the columns \
Number, Title, Profile, Assessment, Description, Rationale, Audit, Remediation and Default Value. \
Keep recommendation numbers and titles exactly as written. Return only the markdown.";

/// Turns the text of one section into markdown.
pub trait Summarizer {
    fn summarize(&self, name: &str, content: &str) -> impl Future<Output = Result<String>> + Send;
}

/// Remove literal markdown code fences around model output.
pub fn strip_markdown_fences(markdown: &str) -> String {
    markdown.replace("```markdown", "").replace("```", "")
}
