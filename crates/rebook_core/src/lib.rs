pub mod annotations;
pub mod config;
pub mod dom;
pub mod error;
pub mod model;
pub mod page;
pub mod reapply;
pub mod snippets;
pub mod syntax_highlight;
pub mod toc;
