use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CodeBlockError {
    #[error("no grammar for language '{language}'")]
    UnsupportedLanguage { language: String },
    #[error("highlighted output has {actual} lines, source has {expected}")]
    LineCountMismatch { expected: usize, actual: usize },
    #[error("line {line} carries both boring and ellipsis markers")]
    AmbiguousAnnotation { line: usize },
}

#[derive(Debug, Error)]
pub enum PageError {
    #[error("bootstrap script not found in {path}")]
    MissingBootstrapScript { path: String },
    #[error("code block #{index} ({language}): {source}")]
    CodeBlock {
        index: usize,
        language: String,
        #[source]
        source: CodeBlockError,
    },
    #[error("invalid selector: {selector}")]
    InvalidSelector { selector: String },
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TocError {
    #[error("invalid page location '{0}'")]
    InvalidLocation(String),
    #[error("sidebar markup not found in client script")]
    MissingSidebarMarkup,
}
