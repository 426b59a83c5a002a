use anyhow::Result;

use crate::cli::TocArgs;
use crate::page_range::expand_page_ranges;
use crate::pdf::text::PageText;
use crate::pdf::{PageSource, PdfPages};
use crate::query::{evaluate, QueryRow};

/// A TOC line selected by the query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineMatch {
    pub page: u32,
    pub line_number: u32,
    pub text: String,
}

pub fn run(args: &TocArgs, case_sensitive: bool) -> Result<()> {
    let rows = args.query.rows()?;
    let pages = PdfPages::open(&args.path)?;
    let page_list = expand_page_ranges(&args.toc, pages.page_count() as u32)?;

    let matches = matching_lines(&pages.pages_text(&page_list), &rows, case_sensitive);

    if matches.is_empty() {
        println!("No matches found.");
        return Ok(());
    }

    for m in &matches {
        println!("p{}:L{}: {}", m.page, m.line_number, m.text);
    }

    println!("\n{} match(es) found.", matches.len());

    Ok(())
}

/// Non-empty lines that satisfy the query, with their page and line numbers.
pub fn matching_lines(
    pages: &[PageText],
    rows: &[QueryRow],
    case_sensitive: bool,
) -> Vec<LineMatch> {
    let mut matches = Vec::new();

    for page in pages {
        for (line_num, line) in page.text.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || !evaluate(line, rows, case_sensitive) {
                continue;
            }
            matches.push(LineMatch {
                page: page.page,
                line_number: (line_num + 1) as u32,
                text: line.to_string(),
            });
        }
    }

    matches
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::parse_expression;

    #[test]
    fn test_matching_lines() {
        let pages = vec![
            PageText {
                page: 2,
                text: "Table of Contents\n1 Above Lock .... 34\n1.1 (L1) Ensure X .... 35\n".into(),
            },
            PageText {
                page: 3,
                text: "\n4.1.3.1 (L2) Ensure Y .... 38\n4.1.3.2 (BL) Ensure Z .... 40".into(),
            },
        ];

        let matches = matching_lines(&pages, &parse_expression("l1 or l2"), false);
        assert_eq!(
            matches,
            vec![
                LineMatch {
                    page: 2,
                    line_number: 3,
                    text: "1.1 (L1) Ensure X .... 35".into(),
                },
                LineMatch {
                    page: 3,
                    line_number: 2,
                    text: "4.1.3.1 (L2) Ensure Y .... 38".into(),
                },
            ]
        );

        assert!(matching_lines(&pages, &parse_expression("l1"), true).is_empty());
    }
}
