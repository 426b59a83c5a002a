pub mod loader;
pub mod parser;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

pub use loader::load_contents;
pub use parser::parse_toc;

/// A run of pages in the document body belonging to one TOC entry.
///
/// `start` and `end` hold page numbers as they appear in the TOC text. A
/// section without a `name` is still being assembled and is never returned
/// from [`parse_toc`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Section {
    pub name: String,
    pub start: String,
    pub end: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub content: String,
}

impl Section {
    pub fn starting_at(start: impl Into<String>) -> Self {
        Section {
            start: start.into(),
            ..Default::default()
        }
    }
}

/// Which level of a nested numbering names the section a matched leaf belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Serialize, Deserialize)]
pub enum Grouping {
    /// Group leaves under their top-level (undotted) ancestor
    #[default]
    Outermost,
    /// Group leaves under their closest numbered ancestor
    Innermost,
}
