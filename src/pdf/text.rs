use anyhow::{Context, Result};
use std::path::Path;

use super::PdfDocument;

/// Zero-based access to the text of a paginated document.
pub trait PageSource {
    fn page_count(&self) -> usize;

    /// Text of one page, empty when `index` is past the last page
    fn page_text(&self, index: usize) -> &str;

    /// Concatenated text of pages `start..end`, clamped to the document
    fn text_range(&self, start: usize, end: usize) -> Result<String> {
        if start > end {
            anyhow::bail!("Invalid page slice {}..{}", start, end);
        }
        let end = end.min(self.page_count());
        Ok((start..end).map(|index| self.page_text(index)).collect())
    }
}

impl PageSource for Vec<String> {
    fn page_count(&self) -> usize {
        self.len()
    }

    fn page_text(&self, index: usize) -> &str {
        self.get(index).map(String::as_str).unwrap_or_default()
    }
}

/// Text of every page of a PDF, extracted once up front.
pub struct PdfPages {
    pub title: Option<String>,
    pages: Vec<String>,
}

impl PdfPages {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let bytes = std::fs::read(path)
            .with_context(|| format!("Failed to read PDF: {}", path.display()))?;

        let doc = PdfDocument::load_mem(&bytes, path)?;
        let total_pages = doc.page_count() as usize;

        let full_text = pdf_extract::extract_text_from_mem(&bytes)
            .with_context(|| format!("Failed to extract text from PDF: {}", path.display()))?;

        // pdf-extract separates pages with form feeds
        let mut pages: Vec<String> = full_text.split('\x0C').map(str::to_string).collect();
        if pages.len() > total_pages && pages.last().is_some_and(|p| p.trim().is_empty()) {
            pages.pop();
        }
        if pages.len() != total_pages {
            tracing::warn!(
                path = %path.display(),
                extracted = pages.len(),
                expected = total_pages,
                "page breaks in extracted text do not line up with the page tree"
            );
        }

        Ok(PdfPages {
            title: doc.title(),
            pages,
        })
    }

    /// Text of the given 1-based pages, one entry per page
    pub fn pages_text(&self, pages: &[u32]) -> Vec<PageText> {
        pages
            .iter()
            .map(|&page| PageText {
                page,
                text: self.page_text(page.saturating_sub(1) as usize).to_string(),
            })
            .collect()
    }

    /// Text of the given 1-based pages joined into one block, as fed to the TOC parser
    pub fn toc_text(&self, pages: &[u32]) -> String {
        self.pages_text(pages)
            .into_iter()
            .map(|p| p.text)
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl PageSource for PdfPages {
    fn page_count(&self) -> usize {
        self.pages.len()
    }

    fn page_text(&self, index: usize) -> &str {
        self.pages.page_text(index)
    }
}

#[derive(Debug, Clone)]
pub struct PageText {
    pub page: u32,
    pub text: String,
}
