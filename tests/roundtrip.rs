//! Markup produced from a tree is stable after one round trip.

use proptest::prelude::*;

use richmark::document::{Document, Node, NodeKind};
use richmark::markup::{from_markup, to_markup};

fn word() -> impl Strategy<Value = String> {
    "[a-z]{1,8}"
}

fn words() -> impl Strategy<Value = String> {
    prop::collection::vec(word(), 1..4).prop_map(|w| w.join(" "))
}

fn emphasis(bold: bool, children: Vec<Node>) -> Node {
    if bold {
        Node::bold(children)
    } else {
        Node::italic(children)
    }
}

/// Bold or italic holding another bold or italic at its start or end.
fn nested_emphasis() -> impl Strategy<Value = Node> {
    (any::<bool>(), any::<bool>(), any::<bool>(), words(), words()).prop_map(
        |(outer_bold, inner_bold, inner_first, inner, rest)| {
            let inner = emphasis(inner_bold, vec![Node::text(inner)]);
            let children = if inner_first {
                vec![inner, Node::text(format!(" {rest}"))]
            } else {
                vec![Node::text(format!("{rest} ")), inner]
            };
            emphasis(outer_bold, children)
        },
    )
}

fn inline() -> impl Strategy<Value = Node> {
    prop_oneof![
        3 => words().prop_map(Node::text),
        1 => nested_emphasis(),
        1 => words().prop_map(|w| Node::bold(vec![Node::text(w)])),
        1 => words().prop_map(|w| Node::italic(vec![Node::text(w)])),
        1 => words().prop_map(|w| Node::new(NodeKind::Underline, vec![Node::text(w)])),
        1 => words().prop_map(|w| Node::new(NodeKind::Strikethrough, vec![Node::text(w)])),
        1 => words().prop_map(Node::inline_code),
        1 => (words(), word()).prop_map(|(label, path)| {
            Node::link(format!("https://example.com/{path}"), vec![Node::text(label)])
        }),
    ]
}

/// Inline pieces separated by single spaces.
fn inline_run() -> impl Strategy<Value = Vec<Node>> {
    prop::collection::vec(inline(), 1..5).prop_map(|pieces| {
        let mut run = Vec::new();
        for (idx, piece) in pieces.into_iter().enumerate() {
            if idx > 0 {
                run.push(Node::text(" "));
            }
            run.push(piece);
        }
        run
    })
}

fn block() -> impl Strategy<Value = Node> {
    prop_oneof![
        4 => inline_run().prop_map(Node::paragraph),
        2 => (1u8..=6, inline_run()).prop_map(|(level, run)| Node::heading(level, run)),
        1 => (
            prop::option::of("[a-z]{1,5}"),
            prop::collection::vec(words(), 1..4),
        )
            .prop_map(|(language, lines)| Node::code_block(language, lines.join("\n"))),
        2 => (any::<bool>(), prop::collection::vec(inline_run(), 1..4))
            .prop_map(|(ordered, items)| Node::list(ordered, items)),
        1 => inline_run().prop_map(Node::block_quote),
        1 => Just(Node::horizontal_rule()),
    ]
}

fn document() -> impl Strategy<Value = Document> {
    prop::collection::vec(block(), 0..6).prop_map(Document::new)
}

proptest! {
    #[test]
    fn markup_is_stable_after_one_round_trip(doc in document()) {
        let first = to_markup(&doc);
        let second = to_markup(&Document::parse_html(&from_markup(&first)));
        prop_assert_eq!(second, first);
    }

    #[test]
    fn structured_markup_render_is_stable(doc in document()) {
        let html = doc.to_html();
        let reparsed = Document::parse_html(&html);
        prop_assert_eq!(reparsed.to_html(), html);
    }

    #[test]
    fn conversion_is_total(text in "\\PC{0,200}") {
        let html = from_markup(&text);
        let _ = to_markup(&Document::parse_html(&html));
    }
}

#[test]
fn test_emphasis_precedence() {
    assert_eq!(from_markup("***x***"), "<p><strong><em>x</em></strong></p>");
    assert_eq!(from_markup("**x**"), "<p><strong>x</strong></p>");
    assert_eq!(from_markup("*x*"), "<p><em>x</em></p>");
}

#[test]
fn test_nested_emphasis_markup_is_stable() {
    let doc = Document::new(vec![Node::paragraph(vec![Node::bold(vec![
        Node::italic(vec![Node::text("a")]),
        Node::text(" b"),
    ])])]);
    let first = to_markup(&doc);
    assert_eq!(first, "***a* b**");
    let html = from_markup(&first);
    assert_eq!(html, "<p><strong><em>a</em> b</strong></p>");
    assert_eq!(to_markup(&Document::parse_html(&html)), first);
}

#[test]
fn test_list_segmentation() {
    let html = from_markup("- a\n- b\n1. c");
    assert_eq!(html, "<ul>\n<li>a</li>\n<li>b</li>\n</ul>\n<ol>\n<li>c</li>\n</ol>");
}

#[test]
fn test_bold_inside_link_text() {
    let doc = Document::from_markup("[**bold** link](https://x.dev)");
    assert_eq!(doc.to_markup(), "[**bold** link](https://x.dev)");
    assert_eq!(
        doc.to_html(),
        "<p><a href=\"https://x.dev\"><strong>bold</strong> link</a></p>"
    );
}

#[test]
fn test_code_fence_is_shielded_from_inline_rules() {
    let source = "```md\n# not a heading\n**not bold** [x](y)\n```";
    let doc = Document::from_markup(source);
    assert_eq!(doc.to_markup(), source);
}

#[test]
fn test_sample_markup_fixture_survives_round_trip() {
    let source = include_str!("fixtures/sample.md").trim_end();
    assert_eq!(Document::from_markup(source).to_markup(), source);
}

#[test]
fn test_sample_html_fixture_is_stable() {
    let first = Document::parse_html(include_str!("fixtures/sample.html")).to_markup();
    assert!(first.starts_with("# Release Notes\n\n"));
    assert!(first.contains("**Bold span** and *italic span*"));
    assert!(first.contains("- Undo history survives ~~crashes~~ restarts"));
    assert!(first.contains("```sh\nrichmark --to html notes.md\n```"));
    assert_eq!(Document::from_markup(&first).to_markup(), first);
}
