//! Code block and run models

/// Semantic marker carried by one physical line of a code block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LineKind {
    #[default]
    None,
    Boring,
    Ellipsis,
}

impl LineKind {
    pub fn is_marked(self) -> bool {
        !matches!(self, LineKind::None)
    }

    /// Class name used by the wrapper span for this kind.
    pub fn class_name(self) -> Option<&'static str> {
        match self {
            LineKind::None => None,
            LineKind::Boring => Some("boring"),
            LineKind::Ellipsis => Some("ellipsis"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineAnnotation {
    pub index: usize,
    pub kind: LineKind,
}

/// One `<pre><code>` block as read from a page, before any rewriting.
#[derive(Debug, Clone)]
pub struct CodeBlock {
    pub language: String,
    pub raw_html: String,
    pub plain_text: String,
    pub keep_lines: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BlockOutcome {
    Highlighted { lines: usize, annotated: usize },
    Skipped { language: String },
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageReport {
    pub highlighted_blocks: usize,
    pub skipped_blocks: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub pages_visited: usize,
    pub pages_written: usize,
    pub highlighted_blocks: usize,
    pub skipped_blocks: usize,
}

impl RunSummary {
    pub fn record(&mut self, report: &PageReport) {
        self.highlighted_blocks += report.highlighted_blocks;
        self.skipped_blocks += report.skipped_blocks;
    }
}
