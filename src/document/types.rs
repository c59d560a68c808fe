//! Core document types.

/// What a [`Node`] represents in the document tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    Paragraph,
    /// Heading level, always in `1..=6`.
    Heading(u8),
    Bold,
    Italic,
    Underline,
    Strikethrough,
    InlineCode,
    /// Fenced code; the code itself is the node's single text child.
    CodeBlock {
        language: Option<String>,
    },
    OrderedList,
    UnorderedList,
    ListItem,
    /// Link target; the link text is carried by the children.
    Link {
        href: String,
    },
    Image {
        src: String,
        alt: String,
    },
    LineBreak,
    HorizontalRule,
    BlockQuote,
    /// A run of plain text (entities already decoded).
    Text(String),
    /// A `<div>` line container as produced by content-editable surfaces.
    Division,
    /// Any element we have no rule for, kept by tag name.
    Container(String),
}

impl NodeKind {
    /// Returns true for ordered and unordered lists.
    pub const fn is_list(&self) -> bool {
        matches!(self, Self::OrderedList | Self::UnorderedList)
    }

    /// Leaf kinds never carry children.
    pub const fn is_leaf(&self) -> bool {
        matches!(
            self,
            Self::Text(_) | Self::LineBreak | Self::HorizontalRule | Self::Image { .. }
        )
    }
}

/// One structural unit of a document.
///
/// Nodes are immutable once built. The constructor normalizes children so
/// that list items only ever sit directly inside a list, and lists only ever
/// contain list items.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    kind: NodeKind,
    children: Vec<Node>,
}

impl Node {
    /// Build a node, normalizing its children for the list invariant.
    pub fn new(kind: NodeKind, children: Vec<Self>) -> Self {
        let children = if kind.is_leaf() {
            Vec::new()
        } else if kind.is_list() {
            into_list_items(children)
        } else {
            splice_stray_items(children)
        };
        Self { kind, children }
    }

    /// A plain-text run.
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            kind: NodeKind::Text(text.into()),
            children: Vec::new(),
        }
    }

    pub fn paragraph(children: Vec<Self>) -> Self {
        Self::new(NodeKind::Paragraph, children)
    }

    /// A heading; `level` is clamped into `1..=6`.
    pub fn heading(level: u8, children: Vec<Self>) -> Self {
        Self::new(NodeKind::Heading(level.clamp(1, 6)), children)
    }

    pub fn bold(children: Vec<Self>) -> Self {
        Self::new(NodeKind::Bold, children)
    }

    pub fn italic(children: Vec<Self>) -> Self {
        Self::new(NodeKind::Italic, children)
    }

    pub fn inline_code(code: impl Into<String>) -> Self {
        Self::new(NodeKind::InlineCode, vec![Self::text(code)])
    }

    pub fn code_block(language: Option<String>, code: impl Into<String>) -> Self {
        let code = code.into();
        let children = if code.is_empty() {
            Vec::new()
        } else {
            vec![Self::text(code)]
        };
        Self::new(NodeKind::CodeBlock { language }, children)
    }

    pub fn link(href: impl Into<String>, children: Vec<Self>) -> Self {
        Self::new(NodeKind::Link { href: href.into() }, children)
    }

    pub fn image(src: impl Into<String>, alt: impl Into<String>) -> Self {
        Self::new(
            NodeKind::Image {
                src: src.into(),
                alt: alt.into(),
            },
            Vec::new(),
        )
    }

    /// A list of `items`; each item is a list item's children.
    pub fn list(ordered: bool, items: Vec<Vec<Self>>) -> Self {
        let kind = if ordered {
            NodeKind::OrderedList
        } else {
            NodeKind::UnorderedList
        };
        let items = items
            .into_iter()
            .map(|children| Self {
                kind: NodeKind::ListItem,
                children: splice_stray_items(children),
            })
            .collect();
        Self::new(kind, items)
    }

    pub fn block_quote(children: Vec<Self>) -> Self {
        Self::new(NodeKind::BlockQuote, children)
    }

    pub fn line_break() -> Self {
        Self::new(NodeKind::LineBreak, Vec::new())
    }

    pub fn horizontal_rule() -> Self {
        Self::new(NodeKind::HorizontalRule, Vec::new())
    }

    pub const fn kind(&self) -> &NodeKind {
        &self.kind
    }

    pub fn children(&self) -> &[Self] {
        &self.children
    }

    /// The text of a plain-text run, `None` for every other kind.
    pub fn as_text(&self) -> Option<&str> {
        match &self.kind {
            NodeKind::Text(text) => Some(text),
            _ => None,
        }
    }

    /// Concatenated text of this node and its descendants.
    ///
    /// Line breaks contribute a newline; images contribute nothing.
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        self.push_text(&mut out);
        out
    }

    fn push_text(&self, out: &mut String) {
        match &self.kind {
            NodeKind::Text(text) => out.push_str(text),
            NodeKind::LineBreak => out.push('\n'),
            _ => {
                for child in &self.children {
                    child.push_text(out);
                }
            }
        }
    }
}

/// Children of a list: keep items, drop whitespace, wrap anything else.
fn into_list_items(children: Vec<Node>) -> Vec<Node> {
    children
        .into_iter()
        .filter_map(|child| match &child.kind {
            NodeKind::ListItem => Some(child),
            NodeKind::Text(text) if text.trim().is_empty() => None,
            _ => Some(Node {
                kind: NodeKind::ListItem,
                children: vec![child],
            }),
        })
        .collect()
}

/// Children of a non-list: a stray list item is replaced by its children.
fn splice_stray_items(children: Vec<Node>) -> Vec<Node> {
    let mut out = Vec::with_capacity(children.len());
    for child in children {
        if child.kind == NodeKind::ListItem {
            out.extend(child.children);
        } else {
            out.push(child);
        }
    }
    out
}

/// A parsed rich-text document: an ordered sequence of top-level nodes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Document {
    blocks: Vec<Node>,
}

impl Document {
    /// Create an empty document.
    pub const fn empty() -> Self {
        Self { blocks: Vec::new() }
    }

    /// Create a document from top-level nodes.
    pub fn new(blocks: Vec<Node>) -> Self {
        Self {
            blocks: splice_stray_items(blocks),
        }
    }

    /// Top-level nodes in document order.
    pub fn blocks(&self) -> &[Node] {
        &self.blocks
    }

    /// True when the document has no nodes or only whitespace text.
    pub fn is_blank(&self) -> bool {
        self.blocks
            .iter()
            .all(|node| node.as_text().is_some_and(|text| text.trim().is_empty()))
    }

    /// Plain text of the whole document.
    pub fn text_content(&self) -> String {
        self.blocks.iter().map(Node::text_content).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_wraps_non_item_children() {
        let list = Node::new(
            NodeKind::UnorderedList,
            vec![Node::text("a"), Node::bold(vec![Node::text("b")])],
        );
        assert_eq!(list.children().len(), 2);
        assert!(
            list.children()
                .iter()
                .all(|child| *child.kind() == NodeKind::ListItem)
        );
    }

    #[test]
    fn test_list_drops_whitespace_between_items() {
        let list = Node::new(
            NodeKind::OrderedList,
            vec![
                Node::text("\n"),
                Node::new(NodeKind::ListItem, vec![Node::text("a")]),
                Node::text("\n  "),
            ],
        );
        assert_eq!(list.children().len(), 1);
        assert_eq!(list.children()[0].text_content(), "a");
    }

    #[test]
    fn test_stray_list_item_is_spliced_into_parent() {
        let paragraph = Node::paragraph(vec![
            Node::text("x "),
            Node::new(NodeKind::ListItem, vec![Node::text("y")]),
        ]);
        assert_eq!(paragraph.children(), &[Node::text("x "), Node::text("y")]);
    }

    #[test]
    fn test_document_splices_top_level_items() {
        let doc = Document::new(vec![Node::new(
            NodeKind::ListItem,
            vec![Node::text("loose")],
        )]);
        assert_eq!(doc.blocks(), &[Node::text("loose")]);
    }

    #[test]
    fn test_leaf_kinds_discard_children() {
        let image = Node::new(
            NodeKind::Image {
                src: "a.png".to_string(),
                alt: "a".to_string(),
            },
            vec![Node::text("ignored")],
        );
        assert!(image.children().is_empty());
    }

    #[test]
    fn test_heading_level_is_clamped() {
        assert_eq!(*Node::heading(9, Vec::new()).kind(), NodeKind::Heading(6));
        assert_eq!(*Node::heading(0, Vec::new()).kind(), NodeKind::Heading(1));
    }

    #[test]
    fn test_text_content_includes_line_breaks() {
        let node = Node::paragraph(vec![
            Node::text("one"),
            Node::line_break(),
            Node::italic(vec![Node::text("two")]),
        ]);
        assert_eq!(node.text_content(), "one\ntwo");
    }

    #[test]
    fn test_empty_code_block_has_no_children() {
        assert!(Node::code_block(None, "").children().is_empty());
        assert_eq!(Node::code_block(None, "x").text_content(), "x");
    }

    #[test]
    fn test_blank_document() {
        assert!(Document::empty().is_blank());
        assert!(Document::new(vec![Node::text("\n\n")]).is_blank());
        assert!(!Document::new(vec![Node::paragraph(Vec::new())]).is_blank());
    }
}
