//! Per-page rewrite: fixed substitutions, code block re-highlighting and
//! the bootstrap script check.

use kuchikiki::{ElementData, NodeDataRef};
use log::{debug, warn};

use crate::annotations::{LineMarkers, extract_annotations};
use crate::config::RetrofitConfig;
use crate::dom::{self, Document};
use crate::error::{CodeBlockError, PageError};
use crate::model::{BlockOutcome, CodeBlock, PageReport};
use crate::reapply::{HIGHLIGHTED_CLASS, reapply_annotations, retag_code_classes};
use crate::snippets::Snippets;
use crate::syntax_highlight::{Highlighter, rehighlight_lines};

const LANGUAGE_CLASS_PREFIX: &str = "language-";

pub struct PageContext<'a> {
    pub config: &'a RetrofitConfig,
    pub snippets: &'a Snippets,
    pub highlighter: &'a dyn Highlighter,
}

#[derive(Debug, Clone)]
pub struct ProcessedPage {
    pub html: String,
    pub report: PageReport,
}

/// `rel_path` is the page's path below the book root, `/`-separated; it is
/// matched against the bootstrap exemption list.
pub fn process_page(
    html: &str,
    rel_path: &str,
    ctx: &PageContext<'_>,
) -> Result<ProcessedPage, PageError> {
    let mut doc = Document::parse(html);
    let mut report = PageReport::default();

    for head in doc.select("head")? {
        doc.append_html(head.as_node(), &ctx.snippets.metadata);
    }
    for list in doc.select("nav#sidebar ol.chapter")? {
        doc.append_html(list.as_node(), &ctx.snippets.repository_link);
    }
    for link in doc.select("head link")? {
        let disabled = dom::get_attr(&link, "href")
            .map(|href| ctx.config.stylesheets.disable.iter().any(|name| *name == href))
            .unwrap_or(false);
        if disabled {
            dom::set_attr(&link, "disabled", "disabled");
        }
    }
    if ctx.config.hide_theme_toggle {
        for button in doc.select("button#theme-toggle")? {
            dom::set_attr(&button, "style", "display:none");
        }
    }

    for (index, code) in doc.select("pre code")?.into_iter().enumerate() {
        let Some(block) = read_code_block(&code, ctx) else {
            continue;
        };
        match rewrite_code_block(&mut doc, &code, &block, ctx) {
            Ok(BlockOutcome::Highlighted { lines, annotated }) => {
                debug!(
                    "{rel_path}: block #{index} ({}) {lines} lines, {annotated} annotated",
                    block.language
                );
                report.highlighted_blocks += 1;
            }
            Ok(BlockOutcome::Skipped { language }) => {
                warn!("{rel_path}: block #{index} left as is, no grammar for '{language}'");
                report.skipped_blocks += 1;
            }
            Err(source) => {
                return Err(PageError::CodeBlock {
                    index,
                    language: block.language,
                    source,
                });
            }
        }
    }
    for code in doc.select("code")? {
        dom::add_class(&code, HIGHLIGHTED_CLASS);
    }

    let script_found = replace_bootstrap_script(&doc, ctx.config)?;
    if !script_found && !is_exempt(rel_path, &ctx.config.bootstrap.exempt) {
        return Err(PageError::MissingBootstrapScript {
            path: rel_path.to_string(),
        });
    }

    Ok(ProcessedPage {
        html: doc.serialize(),
        report,
    })
}

fn read_code_block(code: &NodeDataRef<ElementData>, ctx: &PageContext<'_>) -> Option<CodeBlock> {
    let classes = dom::class_tokens(code);
    let language = classes.first()?.strip_prefix(LANGUAGE_CLASS_PREFIX)?;
    if language.is_empty() {
        return None;
    }
    Some(CodeBlock {
        language: language.to_string(),
        raw_html: dom::inner_html(code.as_node()),
        plain_text: code.as_node().text_contents(),
        keep_lines: classes
            .iter()
            .any(|class| *class == ctx.config.highlight.keep_lines_class),
    })
}

fn rewrite_code_block(
    doc: &mut Document,
    code: &NodeDataRef<ElementData>,
    block: &CodeBlock,
    ctx: &PageContext<'_>,
) -> Result<BlockOutcome, CodeBlockError> {
    let markers = LineMarkers::from_config(&ctx.config.highlight);
    let annotations = extract_annotations(&block.raw_html, markers)?;
    let lines = match rehighlight_lines(ctx.highlighter, &block.language, &block.plain_text) {
        Ok(lines) => lines,
        Err(CodeBlockError::UnsupportedLanguage { language })
            if !ctx.config.highlight.fatal_unsupported =>
        {
            return Ok(BlockOutcome::Skipped { language });
        }
        Err(err) => return Err(err),
    };
    let markup = reapply_annotations(&lines, &annotations)?;

    doc.set_inner_html(code.as_node(), &markup);
    let language_class = format!("{LANGUAGE_CLASS_PREFIX}{}", block.language);
    retag_code_classes(code, &language_class, block.keep_lines);

    Ok(BlockOutcome::Highlighted {
        lines: lines.len(),
        annotated: annotations.iter().filter(|a| a.kind.is_marked()).count(),
    })
}

fn replace_bootstrap_script(doc: &Document, config: &RetrofitConfig) -> Result<bool, PageError> {
    let expected = strip_whitespace(&config.bootstrap.expected);
    let mut found = false;
    for script in doc.select("body script")? {
        if strip_whitespace(&script.as_node().text_contents()) == expected {
            dom::set_text(script.as_node(), &config.bootstrap.replacement);
            found = true;
        }
    }
    Ok(found)
}

fn strip_whitespace(text: &str) -> String {
    text.chars().filter(|ch| !ch.is_whitespace()).collect()
}

fn is_exempt(rel_path: &str, exempt: &[String]) -> bool {
    let normalized = rel_path.trim_start_matches("./").replace('\\', "/");
    exempt.iter().any(|path| *path == normalized)
}
