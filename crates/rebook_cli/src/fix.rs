//! The full post-processing pass over a built book.

use std::path::Path;

use anyhow::{Context, Result, bail};
use log::info;
use rebook_core::config::RetrofitConfig;
use rebook_core::model::RunSummary;
use rebook_core::page::{PageContext, process_page};
use rebook_core::snippets::render_snippets;
use rebook_core::syntax_highlight::SyntectHighlighter;

use crate::assets::{materialize_stylesheets, patch_bundle};
use crate::walk::for_each_html_file;

pub fn run_fix(book_dir: &Path, config: &RetrofitConfig, dry_run: bool) -> Result<RunSummary> {
    if !book_dir.is_dir() {
        bail!("Book directory {} does not exist.", book_dir.display());
    }
    let snippets = render_snippets(&config.site).context("failed to render snippets")?;
    let highlighter = SyntectHighlighter;
    let ctx = PageContext {
        config,
        snippets: &snippets,
        highlighter: &highlighter,
    };

    let write = !dry_run;
    let mut summary = RunSummary::default();
    let pages = for_each_html_file(book_dir, write, |rel, html| {
        let processed = process_page(html, rel, &ctx)?;
        summary.record(&processed.report);
        Ok(processed.html)
    })?;
    summary.pages_visited = pages.visited;
    summary.pages_written = pages.written;

    let stylesheets =
        materialize_stylesheets(book_dir, &config.stylesheets, &config.highlight.theme, write)?;
    let patched = patch_bundle(book_dir, &config.bundle, write)?;

    info!(
        "{} pages visited, {} rewritten, {} blocks highlighted, {} skipped",
        summary.pages_visited,
        summary.pages_written,
        summary.highlighted_blocks,
        summary.skipped_blocks
    );
    info!(
        "{} legacy stylesheets, {}/{} bundle replacements{}",
        stylesheets.len(),
        patched,
        config.bundle.replacements.len(),
        if dry_run { " (dry run)" } else { "" }
    );
    Ok(summary)
}
