pub mod grep;
pub mod markdown;
pub mod sections;

use anyhow::Result;
use tracing::{debug, info};

use crate::error::SectionError;
use crate::page_range::expand_page_ranges;
use crate::pdf::{PageSource, PdfPages};
use crate::query::QueryRow;
use crate::sections::{load_contents, parse_toc, Grouping, Section};

/// Parse the sections listed on the `toc_pages` of an already extracted document
pub fn toc_sections(
    pages: &PdfPages,
    toc_pages: &str,
    grouping: Grouping,
    rows: &[QueryRow],
) -> Result<Vec<Section>> {
    let page_list = expand_page_ranges(toc_pages, pages.page_count() as u32)?;
    let toc_text = pages.toc_text(&page_list);
    debug!(
        pages = page_list.len(),
        chars = toc_text.len(),
        "extracted table of contents"
    );

    let sections = parse_toc(&toc_text, grouping, rows);
    info!(count = sections.len(), ?grouping, "parsed table of contents");
    Ok(sections)
}

/// Fill in the body text of each section from the document
pub fn attach_contents(
    pages: &PdfPages,
    sections: Vec<Section>,
) -> std::result::Result<Vec<Section>, SectionError> {
    load_contents(sections, |start, end| pages.text_range(start, end))
}
