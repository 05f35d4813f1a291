use std::cell::RefCell;

use syntect::html::{ClassStyle, css_for_theme_with_class_style, line_tokens_to_classed_spans};
use syntect::parsing::{ParseState, ScopeStack, ScopeStackOp, SyntaxReference, SyntaxSet};
use syntect::util::LinesWithEndings;
use syntect_assets::assets::HighlightingAssets;

use crate::error::CodeBlockError;

const CLASS_STYLE: ClassStyle = ClassStyle::Spaced;

thread_local! {
    static ASSETS: RefCell<HighlightingAssets> = RefCell::new(HighlightingAssets::from_binary());
}

/// Turns decoded source text into highlighted markup. Line breaks in the
/// source must come out at the same positions in the markup.
pub trait Highlighter {
    fn highlight(&self, language: &str, source: &str) -> Result<String, CodeBlockError>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SyntectHighlighter;

impl Highlighter for SyntectHighlighter {
    fn highlight(&self, language: &str, source: &str) -> Result<String, CodeBlockError> {
        highlight_code_html_classed(source, language).ok_or_else(|| {
            CodeBlockError::UnsupportedLanguage {
                language: language.to_string(),
            }
        })
    }
}

/// Re-highlights a block and splits the result on the line breaks of the
/// highlighted output.
pub fn rehighlight_lines(
    highlighter: &dyn Highlighter,
    language: &str,
    plain_text: &str,
) -> Result<Vec<String>, CodeBlockError> {
    let markup = highlighter.highlight(language, plain_text)?;
    let lines: Vec<String> = markup.split('\n').map(str::to_string).collect();
    let expected = plain_text.split('\n').count();
    if lines.len() != expected {
        return Err(CodeBlockError::LineCountMismatch {
            expected,
            actual: lines.len(),
        });
    }
    Ok(lines)
}

fn find_syntax<'a>(syntax_set: &'a SyntaxSet, language: &str) -> Option<&'a SyntaxReference> {
    let token = language.trim().to_lowercase();
    if token.is_empty() {
        return None;
    }
    syntax_set.find_syntax_by_token(map_language_alias(&token))
}

fn map_language_alias(token: &str) -> &str {
    match token {
        "c++" | "cxx" | "cc" | "hpp" => "cpp",
        "sh" | "shell" | "console" => "bash",
        _ => token,
    }
}

fn find_theme_name<'a>(theme: &str, mut themes: impl Iterator<Item = &'a str>) -> Option<String> {
    let wanted = theme.trim();
    themes
        .find(|name| name.eq_ignore_ascii_case(wanted))
        .map(str::to_string)
}

/// Classed markup in which every line is balanced: scopes still open at a
/// line break are closed before it and reopened after it.
pub fn highlight_code_html_classed(code: &str, language: &str) -> Option<String> {
    ASSETS.with(|cell| {
        let assets = cell.borrow();
        let syntax_set = assets.get_syntax_set().ok()?;
        let syntax = find_syntax(syntax_set, language)?;

        let mut parse_state = ParseState::new(syntax);
        let mut stack = ScopeStack::new();
        let mut out = String::with_capacity(code.len() * 2);
        for line in LinesWithEndings::from(code) {
            let ops = parse_state.parse_line(line, syntax_set).ok()?;
            out.push_str(&reopen_scopes(&stack)?);
            let (html, _) =
                line_tokens_to_classed_spans(line, &ops, CLASS_STYLE, &mut stack).ok()?;
            out.push_str(&html.replacen('\n', "", 1));
            out.push_str(&"</span>".repeat(stack.len()));
            if line.ends_with('\n') {
                out.push('\n');
            }
        }
        Some(out)
    })
}

fn reopen_scopes(stack: &ScopeStack) -> Option<String> {
    let ops: Vec<(usize, ScopeStackOp)> = stack
        .as_slice()
        .iter()
        .map(|scope| (0, ScopeStackOp::Push(*scope)))
        .collect();
    line_tokens_to_classed_spans("", &ops, CLASS_STYLE, &mut ScopeStack::new())
        .ok()
        .map(|(html, _)| html)
}

/// Stylesheet matching the class names emitted by the highlighter.
pub fn stylesheet_for_theme(theme: &str) -> Option<String> {
    ASSETS.with(|cell| {
        let assets = cell.borrow();
        let theme_name = find_theme_name(theme, assets.themes())?;
        let theme = assets.get_theme(&theme_name);
        css_for_theme_with_class_style(theme, CLASS_STYLE).ok()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fixed(&'static str);

    impl Highlighter for Fixed {
        fn highlight(&self, _language: &str, _source: &str) -> Result<String, CodeBlockError> {
            Ok(self.0.to_string())
        }
    }

    #[test]
    fn highlights_rust_code() {
        let html = highlight_code_html_classed("fn main() {}\n", "rs").expect("expected highlight");
        assert!(html.contains("fn"));
        assert!(html.contains("<span"));
    }

    #[test]
    fn alias_maps_to_cpp() {
        let html = highlight_code_html_classed("int x = 1;\n", "c++").expect("expected highlight");
        assert!(html.contains("int"));
    }

    #[test]
    fn missing_language_is_unsupported() {
        assert_eq!(
            SyntectHighlighter.highlight("no-such-lang-xyz", "fn main() {}"),
            Err(CodeBlockError::UnsupportedLanguage {
                language: "no-such-lang-xyz".to_string()
            })
        );
    }

    #[test]
    fn multi_line_comment_keeps_line_positions() {
        let source = "/* one\n   two */\nfn main() {}\n";
        let lines = rehighlight_lines(&SyntectHighlighter, "rust", source).expect("lines");
        assert_eq!(lines.len(), 4);
        assert!(lines[1].contains("two"));
        assert!(lines[2].contains("main"));
    }

    #[test]
    fn every_highlighted_line_is_balanced() {
        let source = "/* one\n   two */\nfn main() {\n    let s = \"a\n b\";\n}\n";
        let lines = rehighlight_lines(&SyntectHighlighter, "rust", source).expect("lines");
        for line in &lines {
            assert_eq!(
                line.matches("<span").count(),
                line.matches("</span>").count(),
                "unbalanced line {line:?}"
            );
        }
        assert!(lines[1].starts_with("<span class=\"source rust\">"));
        assert!(lines[1].contains("comment"));
    }

    #[test]
    fn line_count_mismatch_is_rejected() {
        let err = rehighlight_lines(&Fixed("a\nb"), "rust", "a\nb\nc").expect_err("mismatch");
        assert_eq!(
            err,
            CodeBlockError::LineCountMismatch {
                expected: 3,
                actual: 2
            }
        );
    }

    #[test]
    fn missing_theme_has_no_stylesheet() {
        assert!(stylesheet_for_theme("NoSuchTheme").is_none());
    }

    #[test]
    fn known_theme_produces_stylesheet() {
        let css = stylesheet_for_theme("github").expect("stylesheet");
        assert!(css.contains('{'));
    }
}
