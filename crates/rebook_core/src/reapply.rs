//! Re-applies line annotations to re-highlighted code.
//!
//! A run of consecutive lines with the same kind shares one wrapper span:
//! the opening tag is prepended to the first line of the run and the
//! closing tag is prepended to the line after it, or appended to the last
//! line of the block when the run reaches the end.

use kuchikiki::ElementData;

use crate::dom::{add_class, remove_class};
use crate::error::CodeBlockError;
use crate::model::{LineAnnotation, LineKind};

pub const HIGHLIGHTED_CLASS: &str = "hljs";
pub const HIDE_LINES_CLASSES: [&str; 2] = ["hidelines", "hide-boring"];

const CLOSE_WRAPPER: &str = "</span>";

pub fn reapply_annotations(
    lines: &[String],
    annotations: &[LineAnnotation],
) -> Result<String, CodeBlockError> {
    if lines.len() != annotations.len() {
        return Err(CodeBlockError::LineCountMismatch {
            expected: annotations.len(),
            actual: lines.len(),
        });
    }

    let mut out = String::new();
    let mut previous = LineKind::None;
    for (i, (line, annotation)) in lines.iter().zip(annotations).enumerate() {
        debug_assert_eq!(annotation.index, i);
        let kind = annotation.kind;
        if i > 0 {
            out.push('\n');
        }
        if previous.is_marked() && previous != kind {
            out.push_str(CLOSE_WRAPPER);
        }
        if let Some(class) = kind.class_name() {
            if previous != kind {
                out.push_str(&open_wrapper(class));
            }
        }
        out.push_str(line);
        previous = kind;
    }
    if previous.is_marked() {
        out.push_str(CLOSE_WRAPPER);
    }
    Ok(out)
}

fn open_wrapper(class: &str) -> String {
    format!("<span class=\"{class}\">")
}

/// Swaps the language class for the highlighted marker and, unless the
/// block keeps its per-line controls off, requests client-side line hiding.
pub fn retag_code_classes(code: &ElementData, language_class: &str, keep_lines: bool) {
    remove_class(code, language_class);
    add_class(code, HIGHLIGHTED_CLASS);
    if !keep_lines {
        for class in HIDE_LINES_CLASSES {
            add_class(code, class);
        }
    }
}
