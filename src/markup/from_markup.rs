//! Markdown-subset markup to structured markup.
//!
//! A sequence of rewriting passes over the text. Pass order matters: each
//! pass sees the output of the previous one, so fenced code is set aside
//! before any inline rule runs and emphasis is paired before links. No pass
//! fails; syntax that does not match is left as literal text.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use tracing::trace;

/// Marks a fenced code block set aside until the final pass.
const STASH_MARK: char = '\u{E000}';

static FENCE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)```(?:([^\n`]*)\n)?(.*?)\n?```").expect("valid regex")
});
static STASHED: Lazy<Regex> =
    Lazy::new(|| Regex::new("\u{E000}(\\d+)\u{E000}").expect("valid regex"));
static HEADING: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^(#{1,6})[ \t]+(.*)$").expect("valid regex"));
static INLINE_CODE: Lazy<Regex> = Lazy::new(|| Regex::new(r"`([^`\n]+)`").expect("valid regex"));
static IMAGE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"!\[([^\]]*)\]\(([^)]+)\)").expect("valid regex"));
static LINK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\[([^\]]+)\]\(([^)]+)\)").expect("valid regex"));
static STRIKETHROUGH: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"~~([^~\n]+)~~").expect("valid regex"));
static RULE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?m)^---$").expect("valid regex"));
static UNORDERED_ITEM: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*[-*+]\s+(.*)$").expect("valid regex"));
static ORDERED_ITEM: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*\d+\.\s+(.*)$").expect("valid regex"));
static QUOTE_LINE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^&gt;[ \t]?(.*)$").expect("valid regex"));
static BLOCK_START: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^<(?:h[1-6]|ul|ol|pre|blockquote|hr)\b").expect("valid regex")
});
static EXCESS_NEWLINES: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n{3,}").expect("valid regex"));

/// Convert markup text to structured markup.
pub fn from_markup(text: &str) -> String {
    let mut stash = Vec::new();

    let html = escape(text);
    let html = set_aside_fences(&html, &mut stash);
    let html = HEADING.replace_all(&html, |caps: &Captures<'_>| {
        let level = caps[1].len();
        format!("<h{level}>{}</h{level}>", caps[2].trim_end())
    });
    let html = emphasis(&html);
    let html = INLINE_CODE.replace_all(&html, "<code>$1</code>");
    let html = IMAGE.replace_all(&html, |caps: &Captures<'_>| {
        format!(
            "<img src=\"{}\" alt=\"{}\">",
            quote_attr(&caps[2]),
            quote_attr(&caps[1])
        )
    });
    let html = LINK.replace_all(&html, |caps: &Captures<'_>| {
        format!("<a href=\"{}\">{}</a>", quote_attr(&caps[2]), &caps[1])
    });
    let html = STRIKETHROUGH.replace_all(&html, "<del>$1</del>");
    let html = RULE.replace_all(&html, "<hr>");
    let html = group_lists(&html);
    let html = group_quotes(&html);
    let html = wrap_paragraphs(&html);
    let html = restore_fences(&html, &stash);
    let html = EXCESS_NEWLINES.replace_all(&html, "\n\n");
    let html = html.replace("<p></p>", "");

    trace!(
        input_len = text.len(),
        output_len = html.len(),
        code_blocks = stash.len(),
        "converted markup to structured markup"
    );
    html
}

/// Escape `&`, `<` and `>`; normalize line endings and strip the stash mark.
fn escape(text: &str) -> String {
    let normalized: String = text
        .replace("\r\n", "\n")
        .chars()
        .filter(|c| *c != STASH_MARK)
        .collect();
    html_escape::encode_text(&normalized).into_owned()
}

fn quote_attr(value: &str) -> String {
    value.replace('"', "&quot;")
}

/// Replace fenced code with placeholders so later passes cannot touch it.
fn set_aside_fences(html: &str, stash: &mut Vec<String>) -> String {
    FENCE
        .replace_all(html, |caps: &Captures<'_>| {
            let language = caps
                .get(1)
                .and_then(|info| info.as_str().split_whitespace().next())
                .map(quote_attr);
            let open = match language {
                Some(language) => format!("<pre><code class=\"language-{language}\">"),
                None => "<pre><code>".to_string(),
            };
            stash.push(format!("{open}{}</code></pre>", &caps[2]));
            format!("{STASH_MARK}{}{STASH_MARK}", stash.len() - 1)
        })
        .into_owned()
}

fn restore_fences(html: &str, stash: &[String]) -> String {
    STASHED
        .replace_all(html, |caps: &Captures<'_>| {
            caps[1]
                .parse::<usize>()
                .ok()
                .and_then(|idx| stash.get(idx))
                .cloned()
                .unwrap_or_default()
        })
        .into_owned()
}

/// A run of `*` and the emphasis tags it opens or closes.
#[derive(Debug, Default)]
struct DelimiterRun {
    /// Stars not paired with another run; they stay literal.
    remaining: usize,
    /// Closed tags, innermost first.
    closes: Vec<&'static str>,
    /// Opened tags, innermost first.
    opens: Vec<&'static str>,
}

enum Piece<'a> {
    Text(&'a str),
    Run(usize),
}

/// Pair `*` runs into `<strong>` and `<em>`, one line at a time.
fn emphasis(html: &str) -> String {
    html.split('\n')
        .map(emphasis_line)
        .collect::<Vec<_>>()
        .join("\n")
}

/// A run followed by non-whitespace may open; a run preceded by
/// non-whitespace may close. A closer pairs with the nearest open run, two
/// stars at a time when both sides have them. When both sides hold three or
/// more, one star pairs first so `***x***` reads as bold around italic.
fn emphasis_line(line: &str) -> String {
    let mut pieces = Vec::new();
    let mut runs: Vec<DelimiterRun> = Vec::new();
    let mut openers: Vec<usize> = Vec::new();
    let mut prev: Option<char> = None;
    let mut rest = line;

    while let Some(start) = rest.find('*') {
        let text = &rest[..start];
        if !text.is_empty() {
            pieces.push(Piece::Text(text));
            prev = text.chars().next_back();
        }
        let from_run = &rest[start..];
        let after = from_run.trim_start_matches('*');
        let mut run = DelimiterRun {
            remaining: from_run.len() - after.len(),
            ..DelimiterRun::default()
        };
        rest = after;

        let can_open = rest.chars().next().is_some_and(|c| !c.is_whitespace());
        let can_close = prev.is_some_and(|c| !c.is_whitespace());
        if can_close {
            while run.remaining > 0 {
                let Some(&top) = openers.last() else {
                    break;
                };
                let opener = &mut runs[top];
                let both_triple = run.remaining >= 3 && opener.remaining >= 3;
                let (width, tag) = if run.remaining >= 2 && opener.remaining >= 2 && !both_triple {
                    (2, "strong")
                } else {
                    (1, "em")
                };
                opener.remaining -= width;
                opener.opens.push(tag);
                run.remaining -= width;
                run.closes.push(tag);
                if opener.remaining == 0 {
                    openers.pop();
                }
            }
        }
        if can_open && run.remaining > 0 {
            openers.push(runs.len());
        }
        pieces.push(Piece::Run(runs.len()));
        runs.push(run);
    }
    if !rest.is_empty() {
        pieces.push(Piece::Text(rest));
    }

    let mut out = String::with_capacity(line.len());
    for piece in pieces {
        match piece {
            Piece::Text(text) => out.push_str(text),
            Piece::Run(idx) => {
                let run = &runs[idx];
                for tag in &run.closes {
                    out.push_str(&format!("</{tag}>"));
                }
                out.push_str(&"*".repeat(run.remaining));
                for tag in run.opens.iter().rev() {
                    out.push_str(&format!("<{tag}>"));
                }
            }
        }
    }
    out
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ListType {
    Unordered,
    Ordered,
}

impl ListType {
    const fn tag(self) -> &'static str {
        match self {
            Self::Unordered => "ul",
            Self::Ordered => "ol",
        }
    }
}

/// One pass over lines: runs of same-type items become one list; a
/// non-item line or a change of type closes the open list.
fn group_lists(html: &str) -> String {
    let mut out: Vec<String> = Vec::new();
    let mut open: Option<ListType> = None;

    for line in html.split('\n') {
        let item = UNORDERED_ITEM
            .captures(line)
            .map(|caps| (ListType::Unordered, caps))
            .or_else(|| {
                ORDERED_ITEM
                    .captures(line)
                    .map(|caps| (ListType::Ordered, caps))
            });

        match item {
            Some((list_type, caps)) => {
                if open != Some(list_type) {
                    if let Some(previous) = open {
                        out.push(format!("</{}>", previous.tag()));
                    }
                    out.push(format!("<{}>", list_type.tag()));
                    open = Some(list_type);
                }
                out.push(format!("<li>{}</li>", &caps[1]));
            }
            None => {
                if let Some(previous) = open.take() {
                    out.push(format!("</{}>", previous.tag()));
                }
                out.push(line.to_string());
            }
        }
    }
    if let Some(previous) = open {
        out.push(format!("</{}>", previous.tag()));
    }
    out.join("\n")
}

/// Consecutive quote lines become one block quote joined by line breaks.
fn group_quotes(html: &str) -> String {
    let mut out: Vec<String> = Vec::new();
    let mut quote: Option<Vec<String>> = None;

    for line in html.split('\n') {
        if let Some(caps) = QUOTE_LINE.captures(line) {
            quote.get_or_insert_with(Vec::new).push(caps[1].to_string());
            continue;
        }
        if let Some(lines) = quote.take() {
            out.push(format!("<blockquote>{}</blockquote>", lines.join("<br>")));
        }
        out.push(line.to_string());
    }
    if let Some(lines) = quote {
        out.push(format!("<blockquote>{}</blockquote>", lines.join("<br>")));
    }
    out.join("\n")
}

/// Wrap blank-line separated chunks that are not already blocks.
fn wrap_paragraphs(html: &str) -> String {
    html.split("\n\n")
        .map(str::trim)
        .filter(|chunk| !chunk.is_empty())
        .map(|chunk| {
            if BLOCK_START.is_match(chunk) || chunk.starts_with(STASH_MARK) || chunk.contains("<li>")
            {
                chunk.to_string()
            } else {
                format!("<p>{}</p>", chunk.replace('\n', "<br>"))
            }
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}
