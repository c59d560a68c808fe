//! Structured markup (editor HTML) to document tree.

use tracing::trace;

use super::tokenizer::{Token, tokenize};
use super::types::{Document, Node, NodeKind};

/// Elements that never take children.
const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param", "source",
    "track", "wbr",
];

/// Elements whose content is dropped entirely.
const SKIPPED_ELEMENTS: &[&str] = &["head", "script", "style", "template", "title"];

/// Start tags that implicitly close an open paragraph.
const BLOCK_ELEMENTS: &[&str] = &[
    "blockquote", "div", "h1", "h2", "h3", "h4", "h5", "h6", "hr", "ol", "p", "pre", "ul",
];

/// Attribute used to hand a code element's language up to its `pre`.
const LANGUAGE_ATTR: &str = "data-richmark-language";

impl Document {
    /// Parse structured markup into a document tree.
    ///
    /// # Example
    ///
    /// ```
    /// use richmark::document::{Document, NodeKind};
    ///
    /// let doc = Document::parse_html("<h2>Title</h2><p>Body</p>");
    /// assert_eq!(*doc.blocks()[0].kind(), NodeKind::Heading(2));
    /// ```
    pub fn parse_html(html: &str) -> Self {
        parse_html(html)
    }
}

/// Parse structured markup into a document tree. Never fails.
pub fn parse_html(html: &str) -> Document {
    let mut builder = TreeBuilder::new();
    for token in tokenize(html) {
        match token {
            Token::Text(text) => builder.text(text),
            Token::Start {
                name,
                attrs,
                self_closing,
            } => builder.start(name, attrs, self_closing),
            Token::End { name } => builder.end(&name),
        }
    }
    let doc = Document::new(builder.finish());
    trace!(blocks = doc.blocks().len(), "parsed structured markup");
    doc
}

#[derive(Debug)]
struct Frame {
    tag: String,
    attrs: Vec<(String, String)>,
    children: Vec<Node>,
}

impl Frame {
    fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }
}

/// Stack of open elements; closing a frame folds it into its parent.
struct TreeBuilder {
    stack: Vec<Frame>,
    /// Depth of open skipped elements (`script`, `style`, ...).
    skipping: usize,
}

impl TreeBuilder {
    fn new() -> Self {
        Self {
            stack: vec![Frame {
                tag: String::new(),
                attrs: Vec::new(),
                children: Vec::new(),
            }],
            skipping: 0,
        }
    }

    fn top(&mut self) -> &mut Frame {
        let last = self.stack.len() - 1;
        &mut self.stack[last]
    }

    fn text(&mut self, raw: &str) {
        if self.skipping > 0 {
            return;
        }
        let decoded = html_escape::decode_html_entities(raw);
        let children = &mut self.top().children;
        if let Some(previous) = children.last().and_then(Node::as_text) {
            let merged = format!("{previous}{decoded}");
            children.pop();
            children.push(Node::text(merged));
        } else {
            children.push(Node::text(decoded.into_owned()));
        }
    }

    fn start(&mut self, tag: String, attrs: Vec<(String, String)>, self_closing: bool) {
        if SKIPPED_ELEMENTS.contains(&tag.as_str()) {
            if !self_closing {
                self.skipping += 1;
            }
            return;
        }
        if self.skipping > 0 {
            return;
        }

        if BLOCK_ELEMENTS.contains(&tag.as_str()) && self.stack.len() > 1 && self.top().tag == "p"
        {
            self.close_top();
        }
        if tag == "li" {
            self.close_open_item();
        }

        if VOID_ELEMENTS.contains(&tag.as_str()) {
            let frame = Frame {
                tag,
                attrs,
                children: Vec::new(),
            };
            let nodes = element_nodes(frame, "");
            self.top().children.extend(nodes);
            return;
        }

        self.stack.push(Frame {
            tag,
            attrs,
            children: Vec::new(),
        });
        if self_closing {
            self.close_top();
        }
    }

    fn end(&mut self, tag: &str) {
        if SKIPPED_ELEMENTS.contains(&tag) {
            self.skipping = self.skipping.saturating_sub(1);
            return;
        }
        if self.skipping > 0 {
            return;
        }
        let Some(depth) = self.stack.iter().skip(1).rposition(|frame| frame.tag == tag) else {
            return;
        };
        // rposition over the skipped iterator is relative to index 1.
        let target = depth + 1;
        while self.stack.len() > target {
            self.close_top();
        }
    }

    /// A new `<li>` closes an open `<li>` of the same list.
    fn close_open_item(&mut self) {
        let Some(item) = self
            .stack
            .iter()
            .rposition(|frame| frame.tag == "li" || frame.tag == "ul" || frame.tag == "ol")
        else {
            return;
        };
        if self.stack[item].tag != "li" {
            return;
        }
        while self.stack.len() > item {
            self.close_top();
        }
    }

    fn close_top(&mut self) {
        if self.stack.len() <= 1 {
            return;
        }
        let Some(frame) = self.stack.pop() else {
            return;
        };
        let parent = self.top();
        if frame.tag == "code"
            && parent.tag == "pre"
            && let Some(language) = code_language(&frame)
        {
            parent.attrs.push((LANGUAGE_ATTR.to_string(), language));
        }
        let parent_tag = parent.tag.clone();
        let nodes = element_nodes(frame, &parent_tag);
        self.top().children.extend(nodes);
    }

    fn finish(mut self) -> Vec<Node> {
        while self.stack.len() > 1 {
            self.close_top();
        }
        self.stack.pop().map(|root| root.children).unwrap_or_default()
    }
}

fn code_language(frame: &Frame) -> Option<String> {
    frame
        .attr("class")?
        .split_whitespace()
        .find_map(|class| class.strip_prefix("language-"))
        .filter(|language| !language.is_empty())
        .map(ToString::to_string)
}

/// Map a closed element to the nodes it contributes to its parent.
fn element_nodes(frame: Frame, parent_tag: &str) -> Vec<Node> {
    let kind = match frame.tag.as_str() {
        "h1" | "h2" | "h3" | "h4" | "h5" | "h6" => {
            let level = frame.tag[1..].parse().unwrap_or(1);
            NodeKind::Heading(level)
        }
        "p" => NodeKind::Paragraph,
        "strong" | "b" => NodeKind::Bold,
        "em" | "i" => NodeKind::Italic,
        "u" => NodeKind::Underline,
        "s" | "del" | "strike" => NodeKind::Strikethrough,
        "code" if parent_tag == "pre" => return frame.children,
        "code" => NodeKind::InlineCode,
        "pre" => {
            let language = frame
                .attr(LANGUAGE_ATTR)
                .map(ToString::to_string)
                .or_else(|| code_language(&frame));
            let code: String = frame.children.iter().map(Node::text_content).collect();
            return vec![Node::code_block(language, code)];
        }
        "ul" => NodeKind::UnorderedList,
        "ol" => NodeKind::OrderedList,
        "li" => NodeKind::ListItem,
        "a" => match frame.attr("href") {
            Some(href) => NodeKind::Link {
                href: html_escape::decode_html_entities(href).into_owned(),
            },
            None => NodeKind::Container(frame.tag.clone()),
        },
        "img" => {
            let src = frame.attr("src").unwrap_or_default();
            let alt = frame.attr("alt").unwrap_or_default();
            return vec![Node::image(
                html_escape::decode_html_entities(src),
                html_escape::decode_html_entities(alt),
            )];
        }
        "br" => NodeKind::LineBreak,
        "hr" => NodeKind::HorizontalRule,
        "blockquote" => NodeKind::BlockQuote,
        "div" => NodeKind::Division,
        "span" => return styled_span(&frame),
        _ if VOID_ELEMENTS.contains(&frame.tag.as_str()) => return Vec::new(),
        _ => NodeKind::Container(frame.tag.clone()),
    };
    vec![Node::new(kind, frame.children)]
}

/// Spans carry formatting through inline styles on content-editable
/// surfaces; bold is applied inside italic.
fn styled_span(frame: &Frame) -> Vec<Node> {
    let style: String = frame
        .attr("style")
        .unwrap_or_default()
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>()
        .to_ascii_lowercase();
    let bold = style.contains("font-weight:bold");
    let italic = style.contains("font-style:italic");

    let mut children = frame.children.clone();
    if !bold && !italic {
        return vec![Node::new(NodeKind::Container("span".to_string()), children)];
    }
    if bold {
        children = vec![Node::bold(children)];
    }
    if italic {
        children = vec![Node::italic(children)];
    }
    children
}
