use anyhow::Result;

use super::toc_sections;
use crate::cli::TocArgs;
use crate::pdf::PdfPages;
use crate::sections::{Grouping, Section};

pub fn run(args: &TocArgs, grouping: Grouping, json: bool) -> Result<()> {
    let rows = args.query.rows()?;
    let pages = PdfPages::open(&args.path)?;
    let sections = toc_sections(&pages, &args.toc, grouping, &rows)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&sections)?);
        return Ok(());
    }

    if sections.is_empty() {
        println!("No matching sections found.");
        return Ok(());
    }

    print!("{}", format_table(&sections));
    println!("\n{} section(s) found.", sections.len());

    Ok(())
}

fn format_table(sections: &[Section]) -> String {
    let width = sections
        .iter()
        .map(|s| s.name.len())
        .max()
        .unwrap_or(0)
        .max("Section".len());

    let mut out = format!("{:<width$}  Pages\n", "Section", width = width);
    for section in sections {
        out.push_str(&format!(
            "{:<width$}  {}-{}\n",
            section.name,
            section.start,
            section.end,
            width = width
        ));
    }
    out
}
