//! Document tree to Markdown-subset markup.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::document::{Document, Node, NodeKind};

static EXCESS_NEWLINES: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n{3,}").expect("valid regex"));

/// Serialize a document to markup.
///
/// Post-order walk: each node's markup is its children's markup wrapped by
/// the node's rule. Unknown structure passes its children through. Runs of
/// three or more newlines collapse to two and the result is trimmed.
pub fn to_markup(document: &Document) -> String {
    let mut raw = String::new();
    for node in document.blocks() {
        raw.push_str(&convert(node));
    }
    tidy(&raw)
}

/// Collapse excess blank lines and trim.
pub(crate) fn tidy(raw: &str) -> String {
    EXCESS_NEWLINES.replace_all(raw, "\n\n").trim().to_string()
}

fn convert(node: &Node) -> String {
    match node.kind() {
        NodeKind::Text(text) => text.clone(),
        NodeKind::Heading(level) => {
            format!(
                "{} {}\n\n",
                "#".repeat(usize::from(*level)),
                children(node)
            )
        }
        NodeKind::Paragraph => format!("{}\n\n", children(node)),
        NodeKind::Bold => format!("**{}**", children(node)),
        NodeKind::Italic => format!("*{}*", children(node)),
        NodeKind::Underline => format!("<u>{}</u>", children(node)),
        NodeKind::Strikethrough => format!("~~{}~~", children(node)),
        NodeKind::InlineCode => format!("`{}`", children(node)),
        NodeKind::CodeBlock { language } => {
            let code = node.text_content();
            // The closing fence supplies the final newline.
            let code = code.strip_suffix('\n').unwrap_or(&code);
            format!(
                "```{}\n{code}\n```\n\n",
                language.as_deref().unwrap_or_default()
            )
        }
        NodeKind::OrderedList | NodeKind::UnorderedList => {
            let ordered = *node.kind() == NodeKind::OrderedList;
            let items: String = node
                .children()
                .iter()
                .enumerate()
                .map(|(idx, item)| list_item(item, ordered, idx + 1))
                .collect();
            format!("{items}\n")
        }
        NodeKind::Link { href } => format!("[{}]({href})", children(node)),
        NodeKind::Image { src, alt } => format!("![{alt}]({src})"),
        NodeKind::LineBreak => "\n".to_string(),
        NodeKind::HorizontalRule => "\n---\n\n".to_string(),
        NodeKind::BlockQuote => {
            let inner = tidy(&children(node));
            let quoted: Vec<String> = inner
                .split('\n')
                .map(|line| format!("> {line}").trim_end().to_string())
                .collect();
            format!("{}\n\n", quoted.join("\n"))
        }
        NodeKind::Division => format!("{}\n", children(node)),
        NodeKind::ListItem | NodeKind::Container(_) => children(node),
    }
}

fn children(node: &Node) -> String {
    node.children().iter().map(convert).collect()
}

/// One list line; a nested list starts on its own line and the item never
/// ends in a blank line so the list stays tight. Line breaks and paragraph
/// ends inside the item become spaces, since items are read line by line.
fn list_item(item: &Node, ordered: bool, index: usize) -> String {
    let mut body = String::new();
    let mut line = String::new();
    for child in item.children() {
        if child.kind().is_list() {
            body.push_str(&single_line(&std::mem::take(&mut line)));
            if !body.is_empty() && !body.ends_with('\n') {
                body.push('\n');
            }
            body.push_str(&convert(child));
        } else {
            line.push_str(&convert(child));
        }
    }
    body.push_str(&single_line(&line));
    let body = body.trim_end_matches('\n');
    if ordered {
        format!("{index}. {body}\n")
    } else {
        format!("- {body}\n")
    }
}

fn single_line(text: &str) -> String {
    text.split('\n')
        .map(|part| part.trim_matches(|c: char| c.is_ascii_whitespace()))
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn markup(blocks: Vec<Node>) -> String {
        to_markup(&Document::new(blocks))
    }

    #[test]
    fn test_headings_of_every_level() {
        for level in 1..=6u8 {
            let out = markup(vec![Node::heading(level, vec![Node::text("T")])]);
            assert_eq!(out, format!("{} T", "#".repeat(level as usize)));
        }
    }

    #[test]
    fn test_paragraphs_are_separated_by_one_blank_line() {
        let out = markup(vec![
            Node::paragraph(vec![Node::text("a")]),
            Node::text("\n\n\n"),
            Node::paragraph(vec![Node::text("b")]),
        ]);
        assert_eq!(out, "a\n\nb");
    }

    #[test]
    fn test_inline_wrappers() {
        let out = markup(vec![Node::paragraph(vec![
            Node::bold(vec![Node::text("b")]),
            Node::text(" "),
            Node::italic(vec![Node::text("i")]),
            Node::text(" "),
            Node::new(NodeKind::Underline, vec![Node::text("u")]),
            Node::text(" "),
            Node::new(NodeKind::Strikethrough, vec![Node::text("s")]),
            Node::text(" "),
            Node::inline_code("c"),
        ])]);
        assert_eq!(out, "**b** *i* <u>u</u> ~~s~~ `c`");
    }

    #[test]
    fn test_code_block_fence() {
        let out = markup(vec![
            Node::code_block(Some("rust".to_string()), "let x = 1;"),
            Node::code_block(None, "plain"),
        ]);
        assert_eq!(out, "```rust\nlet x = 1;\n```\n\n```\nplain\n```");
    }

    #[test]
    fn test_code_block_trailing_newline_is_not_doubled() {
        let out = markup(vec![Node::code_block(None, "a\n")]);
        assert_eq!(out, "```\na\n```");
    }

    #[test]
    fn test_unordered_and_ordered_lists() {
        let out = markup(vec![
            Node::list(false, vec![vec![Node::text("a")], vec![Node::text("b")]]),
            Node::list(true, vec![vec![Node::text("c")], vec![Node::text("d")]]),
        ]);
        assert_eq!(out, "- a\n- b\n\n1. c\n2. d");
    }

    #[test]
    fn test_ordered_index_counts_siblings() {
        let list = Node::new(
            NodeKind::OrderedList,
            vec![
                Node::new(NodeKind::ListItem, vec![Node::text("x")]),
                Node::text("\n"),
                Node::new(NodeKind::ListItem, vec![Node::text("y")]),
            ],
        );
        assert_eq!(markup(vec![list]), "1. x\n2. y");
    }

    #[test]
    fn test_nested_list_starts_on_new_line() {
        let nested = Node::list(false, vec![vec![Node::text("b")]]);
        let out = markup(vec![Node::list(
            false,
            vec![vec![Node::text("a"), nested], vec![Node::text("c")]],
        )]);
        assert_eq!(out, "- a\n- b\n- c");
    }

    #[test]
    fn test_line_break_inside_item_keeps_one_line() {
        let out = markup(vec![Node::list(
            false,
            vec![
                vec![Node::text("a"), Node::line_break(), Node::text("b")],
                vec![Node::text("c")],
            ],
        )]);
        assert_eq!(out, "- a b\n- c");
        assert_eq!(Document::from_markup(&out).to_markup(), out);
    }

    #[test]
    fn test_paragraphs_inside_item_join() {
        let out = markup(vec![Node::list(
            true,
            vec![vec![
                Node::paragraph(vec![Node::text("a")]),
                Node::paragraph(vec![Node::text("b")]),
            ]],
        )]);
        assert_eq!(out, "1. a b");
    }

    #[test]
    fn test_link_and_image() {
        let out = markup(vec![Node::paragraph(vec![
            Node::link("https://x.dev", vec![Node::bold(vec![Node::text("x")])]),
            Node::text(" "),
            Node::image("a.png", "alt text"),
        ])]);
        assert_eq!(out, "[**x**](https://x.dev) ![alt text](a.png)");
    }

    #[test]
    fn test_line_break_and_rule() {
        let out = markup(vec![
            Node::paragraph(vec![Node::text("a"), Node::line_break(), Node::text("b")]),
            Node::horizontal_rule(),
            Node::paragraph(vec![Node::text("c")]),
        ]);
        assert_eq!(out, "a\nb\n\n---\n\nc");
    }

    #[test]
    fn test_block_quote_prefixes_every_line() {
        let out = markup(vec![Node::block_quote(vec![
            Node::text("a"),
            Node::line_break(),
            Node::line_break(),
            Node::text("b"),
        ])]);
        assert_eq!(out, "> a\n>\n> b");
    }

    #[test]
    fn test_division_and_container_pass_through() {
        let out = markup(vec![
            Node::new(NodeKind::Division, vec![Node::text("line one")]),
            Node::new(NodeKind::Division, vec![Node::text("line two")]),
            Node::new(
                NodeKind::Container("font".to_string()),
                vec![Node::text("kept")],
            ),
        ]);
        assert_eq!(out, "line one\nline two\nkept");
    }

    #[test]
    fn test_text_is_emitted_raw() {
        let out = markup(vec![Node::paragraph(vec![Node::text("a < b & *c*")])]);
        assert_eq!(out, "a < b & *c*");
    }

    #[test]
    fn test_empty_document_is_empty_string() {
        assert_eq!(to_markup(&Document::empty()), "");
    }
}
