//! Stylesheet materialisation and client bundle patching.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use log::{debug, warn};
use rebook_core::config::{BundleConfig, StylesheetConfig};
use rebook_core::syntax_highlight::stylesheet_for_theme;

/// Writes the highlight stylesheet (generated from `theme` when enabled)
/// and copies it to every legacy filename. Returns the legacy paths.
pub fn materialize_stylesheets(
    book_dir: &Path,
    config: &StylesheetConfig,
    theme: &str,
    write: bool,
) -> Result<Vec<PathBuf>> {
    let source = book_dir.join(&config.source);
    let css = if config.generate {
        match stylesheet_for_theme(theme) {
            Some(css) => css,
            None => bail!("unknown highlight theme '{theme}'"),
        }
    } else {
        fs::read_to_string(&source)
            .with_context(|| format!("failed to read stylesheet {}", source.display()))?
    };

    if write && config.generate {
        fs::write(&source, &css)
            .with_context(|| format!("failed to write {}", source.display()))?;
    }

    let mut outputs = Vec::new();
    for name in &config.legacy {
        let target = book_dir.join(name);
        if write {
            fs::write(&target, &css)
                .with_context(|| format!("failed to write {}", target.display()))?;
        }
        debug!("stylesheet: {} -> {}", source.display(), target.display());
        outputs.push(target);
    }
    Ok(outputs)
}

/// Applies each literal replacement to the first occurrence in the client
/// bundle. Returns how many replacements matched.
pub fn patch_bundle(book_dir: &Path, config: &BundleConfig, write: bool) -> Result<usize> {
    let path = book_dir.join(&config.path);
    let mut bundle = fs::read_to_string(&path)
        .with_context(|| format!("failed to read client bundle {}", path.display()))?;
    let mut applied = 0usize;
    for replacement in &config.replacements {
        if !bundle.contains(&replacement.from) {
            warn!("{}: '{}' not found", path.display(), replacement.from);
            continue;
        }
        bundle = bundle.replacen(&replacement.from, &replacement.to, 1);
        applied += 1;
    }
    if write {
        fs::write(&path, bundle).with_context(|| format!("failed to write {}", path.display()))?;
    }
    Ok(applied)
}
