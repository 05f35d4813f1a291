//! Build-time preview of the sidebar as a reader would see it on one page.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use rebook_core::toc::{
    InitialScroll, MemorySessionStorage, Sidebar, SidebarTree, page_location, path_to_root,
};

pub const TOC_SCRIPT_NAME: &str = "toc.js";

#[derive(Debug, Clone)]
pub struct SidebarPreview {
    pub html: String,
    pub active_href: Option<String>,
    pub initial_scroll: InitialScroll,
}

pub fn preview_sidebar(
    book_dir: &Path,
    page: &str,
    toc_script: Option<&Path>,
) -> Result<SidebarPreview> {
    let script_path = toc_script
        .map(Path::to_path_buf)
        .unwrap_or_else(|| book_dir.join(TOC_SCRIPT_NAME));
    let script = fs::read_to_string(&script_path)
        .with_context(|| format!("failed to read {}", script_path.display()))?;
    let tree = SidebarTree::from_toc_script(&script)
        .with_context(|| format!("failed to parse {}", script_path.display()))?;

    let book_dir = book_dir
        .canonicalize()
        .with_context(|| format!("failed to canonicalize book dir {}", book_dir.display()))?;
    let page = page.trim_start_matches("./").replace('\\', "/");
    let location = page_location(&book_dir, &page)?;
    let mut storage = MemorySessionStorage::default();
    let sidebar = Sidebar::connect(&tree, &location, &path_to_root(&page), &mut storage)
        .with_context(|| format!("failed to resolve sidebar for {page}"))?;

    Ok(SidebarPreview {
        html: sidebar.html(),
        active_href: sidebar.active_href(),
        initial_scroll: sidebar.initial_scroll(),
    })
}
