//! Per-line boring/ellipsis detection on a block's original markup.

use crate::config::HighlightConfig;
use crate::error::CodeBlockError;
use crate::model::{LineAnnotation, LineKind};

#[derive(Debug, Clone, Copy)]
pub struct LineMarkers<'a> {
    pub boring: &'a str,
    pub ellipsis: &'a str,
}

impl<'a> LineMarkers<'a> {
    pub fn from_config(config: &'a HighlightConfig) -> Self {
        Self {
            boring: &config.boring_marker,
            ellipsis: &config.ellipsis_marker,
        }
    }
}

/// Must run on the markup as the book generator emitted it, before any
/// re-highlighting: the markers are artifacts of that markup.
pub fn extract_annotations(
    raw_html: &str,
    markers: LineMarkers<'_>,
) -> Result<Vec<LineAnnotation>, CodeBlockError> {
    raw_html
        .split('\n')
        .enumerate()
        .map(|(index, line)| {
            let boring = line.contains(markers.boring);
            let ellipsis = line.contains(markers.ellipsis);
            let kind = match (boring, ellipsis) {
                (true, true) => return Err(CodeBlockError::AmbiguousAnnotation { line: index }),
                (true, false) => LineKind::Boring,
                (false, true) => LineKind::Ellipsis,
                (false, false) => LineKind::None,
            };
            Ok(LineAnnotation { index, kind })
        })
        .collect()
}
