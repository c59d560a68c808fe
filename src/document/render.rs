//! Document tree back to structured markup.

use html_escape::{encode_double_quoted_attribute, encode_text};

use super::types::{Document, Node, NodeKind};

impl Document {
    /// Render the tree as structured markup suitable for an editable surface.
    pub fn to_html(&self) -> String {
        let mut out = String::new();
        for node in self.blocks() {
            render_node(node, &mut out);
        }
        out
    }
}

fn render_node(node: &Node, out: &mut String) {
    let tag = match node.kind() {
        NodeKind::Text(text) => {
            out.push_str(&encode_text(text));
            return;
        }
        NodeKind::LineBreak => {
            out.push_str("<br>");
            return;
        }
        NodeKind::HorizontalRule => {
            out.push_str("<hr>");
            return;
        }
        NodeKind::Image { src, alt } => {
            out.push_str(&format!(
                "<img src=\"{}\" alt=\"{}\">",
                encode_double_quoted_attribute(src),
                encode_double_quoted_attribute(alt)
            ));
            return;
        }
        NodeKind::CodeBlock { language } => {
            match language {
                Some(language) => out.push_str(&format!(
                    "<pre><code class=\"language-{}\">",
                    encode_double_quoted_attribute(language)
                )),
                None => out.push_str("<pre><code>"),
            }
            out.push_str(&encode_text(&node.text_content()));
            out.push_str("</code></pre>");
            return;
        }
        NodeKind::Link { href } => {
            out.push_str(&format!(
                "<a href=\"{}\">",
                encode_double_quoted_attribute(href)
            ));
            render_children(node, out);
            out.push_str("</a>");
            return;
        }
        NodeKind::Heading(level) => {
            out.push_str(&format!("<h{level}>"));
            render_children(node, out);
            out.push_str(&format!("</h{level}>"));
            return;
        }
        NodeKind::Container(tag) => {
            if tag.is_empty() {
                render_children(node, out);
                return;
            }
            tag.as_str()
        }
        NodeKind::Paragraph => "p",
        NodeKind::Bold => "strong",
        NodeKind::Italic => "em",
        NodeKind::Underline => "u",
        NodeKind::Strikethrough => "del",
        NodeKind::InlineCode => "code",
        NodeKind::OrderedList => "ol",
        NodeKind::UnorderedList => "ul",
        NodeKind::ListItem => "li",
        NodeKind::BlockQuote => "blockquote",
        NodeKind::Division => "div",
    };
    out.push('<');
    out.push_str(tag);
    out.push('>');
    render_children(node, out);
    out.push_str("</");
    out.push_str(tag);
    out.push('>');
}

fn render_children(node: &Node, out: &mut String) {
    for child in node.children() {
        render_node(child, out);
    }
}
