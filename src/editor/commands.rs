//! Formatting commands applied to the selected structured markup.

use html_escape::{encode_double_quoted_attribute, encode_text};

use crate::document::{Document, Node, NodeKind};

/// Text inserted by [`FormatCommand::CodeBlock`] when nothing is selected.
pub const CODE_PLACEHOLDER: &str = "Your code here";

/// A toolbar-style formatting action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormatCommand {
    Bold,
    Italic,
    Underline,
    Strikethrough,
    InlineCode,
    /// Heading level, clamped to `1..=6`.
    Heading(u8),
    CodeBlock,
    BlockQuote,
    UnorderedList,
    OrderedList,
    Link { href: String },
    Image { src: String, alt: String },
    HorizontalRule,
    /// Replace the selection with its plain text.
    ClearFormatting,
}

impl FormatCommand {
    /// Structured markup that replaces `selection`.
    ///
    /// Returns `None` when the command has nothing to act on: inline and
    /// block wrappers need a non-empty selection, and links and images need
    /// a target.
    pub fn render(&self, selection: Option<&str>) -> Option<String> {
        let selection = selection.filter(|s| !s.is_empty());
        match self {
            Self::Bold => wrap("strong", selection),
            Self::Italic => wrap("em", selection),
            Self::Underline => wrap("u", selection),
            Self::Strikethrough => wrap("del", selection),
            Self::InlineCode => {
                selection.map(|s| format!("<code>{}</code>", encode_text(&plain_text(s))))
            }
            Self::Heading(level) => {
                let level = (*level).clamp(1, 6);
                selection.map(|s| format!("<h{level}>{s}</h{level}>"))
            }
            Self::CodeBlock => {
                let code = selection.map_or_else(|| CODE_PLACEHOLDER.to_string(), plain_text);
                Some(format!("<pre><code>{}</code></pre>", encode_text(&code)))
            }
            Self::BlockQuote => wrap("blockquote", selection),
            Self::UnorderedList => Some(list("ul", selection)),
            Self::OrderedList => Some(list("ol", selection)),
            Self::Link { href } => {
                if href.is_empty() {
                    return None;
                }
                let label = selection.map_or_else(|| encode_text(href).into_owned(), str::to_string);
                Some(format!(
                    "<a href=\"{}\">{label}</a>",
                    encode_double_quoted_attribute(href)
                ))
            }
            Self::Image { src, alt } => {
                if src.is_empty() {
                    return None;
                }
                Some(format!(
                    "<img src=\"{}\" alt=\"{}\">",
                    encode_double_quoted_attribute(src),
                    encode_double_quoted_attribute(alt)
                ))
            }
            Self::HorizontalRule => Some("<hr>".to_string()),
            Self::ClearFormatting => selection.map(|s| encode_text(&plain_text(s)).into_owned()),
        }
    }

    /// Short name used in logs.
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Bold => "bold",
            Self::Italic => "italic",
            Self::Underline => "underline",
            Self::Strikethrough => "strikethrough",
            Self::InlineCode => "inline-code",
            Self::Heading(_) => "heading",
            Self::CodeBlock => "code-block",
            Self::BlockQuote => "block-quote",
            Self::UnorderedList => "unordered-list",
            Self::OrderedList => "ordered-list",
            Self::Link { .. } => "link",
            Self::Image { .. } => "image",
            Self::HorizontalRule => "horizontal-rule",
            Self::ClearFormatting => "clear-formatting",
        }
    }
}

fn wrap(tag: &str, selection: Option<&str>) -> Option<String> {
    selection.map(|s| format!("<{tag}>{s}</{tag}>"))
}

/// One item per non-empty line of the selection's plain text.
fn list(tag: &str, selection: Option<&str>) -> String {
    let items: String = selection
        .map(plain_lines)
        .unwrap_or_default()
        .iter()
        .map(|line| format!("<li>{}</li>", encode_text(line.trim())))
        .collect();
    if items.is_empty() {
        format!("<{tag}><li>&nbsp;</li></{tag}>")
    } else {
        format!("<{tag}>{items}</{tag}>")
    }
}

fn plain_text(html: &str) -> String {
    plain_lines(html).join("\n")
}

/// Plain-text lines of a markup fragment. Block elements and line breaks
/// end a line; whitespace-only lines are dropped.
pub(super) fn plain_lines(html: &str) -> Vec<String> {
    let mut text = String::new();
    for block in Document::parse_html(html).blocks() {
        push_lines(block, &mut text);
    }
    text.split('\n')
        .filter(|line| !line.trim().is_empty())
        .map(str::to_string)
        .collect()
}

fn push_lines(node: &Node, out: &mut String) {
    match node.kind() {
        NodeKind::Text(text) => out.push_str(text),
        NodeKind::LineBreak => out.push('\n'),
        kind => {
            let block = is_block(kind);
            if block && !out.is_empty() && !out.ends_with('\n') {
                out.push('\n');
            }
            for child in node.children() {
                push_lines(child, out);
            }
            if block {
                out.push('\n');
            }
        }
    }
}

const fn is_block(kind: &NodeKind) -> bool {
    matches!(
        kind,
        NodeKind::Paragraph
            | NodeKind::Heading(_)
            | NodeKind::CodeBlock { .. }
            | NodeKind::OrderedList
            | NodeKind::UnorderedList
            | NodeKind::ListItem
            | NodeKind::BlockQuote
            | NodeKind::Division
            | NodeKind::HorizontalRule
    )
}
