use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::info;

use super::{attach_contents, toc_sections};
use crate::cli::MarkdownArgs;
use crate::pdf::PdfPages;
use crate::sections::Section;
use crate::summarize::{strip_markdown_fences, OpenAiSummarizer, Summarizer, MARKDOWN_PROMPT};

pub async fn run(args: MarkdownArgs) -> Result<()> {
    let rows = args.toc.query.rows()?;
    let pages = PdfPages::open(&args.toc.path)?;
    if let Some(title) = &pages.title {
        info!(%title, "opened document");
    }

    let sections = toc_sections(&pages, &args.toc.toc, args.grouping, &rows)?;
    if sections.is_empty() {
        println!("No matching sections found.");
        return Ok(());
    }
    let sections = attach_contents(&pages, sections)?;

    let system_prompt = match &args.prompt_file {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read prompt: {}", path.display()))?,
        None => MARKDOWN_PROMPT.to_string(),
    };

    let mut summarizer = OpenAiSummarizer::new(args.api_key, args.model, system_prompt);
    if let Some(base_url) = args.base_url {
        summarizer = summarizer.with_base_url(base_url);
    }

    let total = sections.len();
    let written = generate(summarizer, sections, &args.output_dir, args.jobs).await?;

    for path in &written {
        println!("{}", path.display());
    }
    println!(
        "\nWrote {} of {} markdown file(s) to {}",
        written.len(),
        total,
        args.output_dir.display()
    );

    Ok(())
}

/// Summarize every section and write `<output_dir>/<name>.md`.
///
/// At most `jobs` summaries are in flight at once. The returned paths follow
/// section order; the first failure aborts the remaining work.
pub async fn generate<S>(
    summarizer: S,
    sections: Vec<Section>,
    output_dir: &Path,
    jobs: usize,
) -> Result<Vec<PathBuf>>
where
    S: Summarizer + Clone + Send + Sync + 'static,
{
    tokio::fs::create_dir_all(output_dir)
        .await
        .with_context(|| format!("Failed to create directory: {}", output_dir.display()))?;

    let total = sections.len();
    let permits = Arc::new(Semaphore::new(jobs.max(1)));
    let mut tasks = JoinSet::new();

    for (index, section) in sections.into_iter().enumerate() {
        let summarizer = summarizer.clone();
        let permits = Arc::clone(&permits);
        let output_dir = output_dir.to_path_buf();

        tasks.spawn(async move {
            let _permit = permits.acquire_owned().await.context("Summarizer pool closed")?;
            let markdown = summarizer.summarize(&section.name, &section.content).await?;
            let path = write_markdown(&output_dir, &section.name, &markdown).await?;
            Ok::<_, anyhow::Error>((index, path))
        });
    }

    let mut written = Vec::with_capacity(total);
    while let Some(joined) = tasks.join_next().await {
        let (index, path) = joined.context("Summarization task failed")??;
        info!(done = written.len() + 1, total, path = %path.display(), "wrote markdown");
        written.push((index, path));
    }

    written.sort_by_key(|(index, _)| *index);
    Ok(written.into_iter().map(|(_, path)| path).collect())
}

async fn write_markdown(output_dir: &Path, name: &str, markdown: &str) -> Result<PathBuf> {
    let path = output_dir.join(format!("{}.md", name));
    tokio::fs::write(&path, strip_markdown_fences(markdown))
        .await
        .with_context(|| format!("Failed to write markdown: {}", path.display()))?;
    Ok(path)
}
