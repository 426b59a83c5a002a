mod cli;
mod commands;
mod error;
mod mcp;
mod page_range;
mod pdf;
mod query;
mod sections;
mod summarize;

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Commands};
use pdf::{PageSource, PdfPages};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    let cli = Cli::parse();

    match cli.command {
        Commands::Mcp => {
            mcp::run_server().await?;
        }
        Commands::Sections {
            toc,
            grouping,
            json,
        } => {
            commands::sections::run(&toc, grouping, json)?;
        }
        Commands::Grep {
            toc,
            case_sensitive,
        } => {
            commands::grep::run(&toc, case_sensitive)?;
        }
        Commands::Markdown(args) => {
            commands::markdown::run(args).await?;
        }
        Commands::ReadPages { path, pages } => {
            let doc = PdfPages::open(&path)?;
            let total = doc.page_count() as u32;
            let page_list = page_range::expand_page_ranges(&pages, total)?;

            for page_text in doc.pages_text(&page_list) {
                println!("--- Page {} ---", page_text.page);
                println!("{}", page_text.text);
                println!();
            }
        }
        Commands::QueryPreview { query: args } => {
            let rows = args.rows()?;
            println!("Query: {}", query::combined_preview(&rows));
            let groups = query::build_groups(&rows, false);
            if groups.is_empty() {
                println!("No terms; every line matches.");
            }
            for (i, group) in groups.iter().enumerate() {
                let prefix = if i == 0 { "   " } else { "or " };
                println!("{}({})", prefix, group.join(" and "));
            }
        }
    }

    Ok(())
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}
