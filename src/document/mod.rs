//! Rich-text document model.
//!
//! This module handles:
//! - The document tree ([`Node`], [`NodeKind`], [`Document`])
//! - Parsing structured markup (editor HTML) into a tree
//! - Rendering a tree back to structured markup

mod parser;
mod render;
mod tokenizer;
mod types;

pub use parser::parse_html;
pub use tokenizer::{Token, tokenize};
pub use types::{Document, Node, NodeKind};

/// Source dialect of a loaded byte stream, chosen by file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    /// Markdown-subset markup (`.md`, `.markdown`, `.txt`).
    Markup,
    /// Structured markup (`.html`, `.htm`).
    Html,
    /// Anything else: inserted verbatim as plain text.
    PlainText,
}

/// Markup file extensions.
const MARKUP_EXTENSIONS: &[&str] = &["md", "markdown", "txt"];

/// Structured markup file extensions.
const HTML_EXTENSIONS: &[&str] = &["html", "htm"];

impl SourceFormat {
    /// Pick the dialect for a file name from its extension (case-insensitive).
    pub fn from_file_name(name: impl AsRef<std::path::Path>) -> Self {
        let Some(ext) = name
            .as_ref()
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase)
        else {
            return Self::PlainText;
        };
        if MARKUP_EXTENSIONS.contains(&ext.as_str()) {
            Self::Markup
        } else if HTML_EXTENSIONS.contains(&ext.as_str()) {
            Self::Html
        } else {
            Self::PlainText
        }
    }
}
