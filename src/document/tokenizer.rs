//! Tolerant tokenizer for editor HTML.
//!
//! Never fails: anything that does not form a tag is returned as text.

/// A lexical unit of structured markup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token<'a> {
    /// Raw text, entities still encoded.
    Text(&'a str),
    Start {
        name: String,
        attrs: Vec<(String, String)>,
        self_closing: bool,
    },
    End {
        name: String,
    },
}

/// Split `input` into tokens. Comments, doctypes and processing
/// instructions are dropped.
pub fn tokenize(input: &str) -> Vec<Token<'_>> {
    let mut tokens = Vec::new();
    let bytes = input.as_bytes();
    let mut pos = 0;
    let mut text_start = 0;

    while pos < bytes.len() {
        if bytes[pos] != b'<' {
            pos += 1;
            continue;
        }
        let Some((token, next)) = lex_markup(input, pos) else {
            pos += 1;
            continue;
        };
        if text_start < pos {
            tokens.push(Token::Text(&input[text_start..pos]));
        }
        if let Some(token) = token {
            tokens.push(token);
        }
        pos = next;
        text_start = next;
    }

    if text_start < input.len() {
        tokens.push(Token::Text(&input[text_start..]));
    }
    tokens
}

/// Lex the construct starting at the `<` at `start`.
///
/// Returns `None` when it is not markup (the `<` is literal text), otherwise
/// the token (or `None` for skipped constructs) and the position after it.
fn lex_markup(input: &str, start: usize) -> Option<(Option<Token<'_>>, usize)> {
    let rest = &input[start..];
    if let Some(body) = rest.strip_prefix("<!--") {
        let end = body.find("-->").map_or(input.len(), |i| start + 4 + i + 3);
        return Some((None, end));
    }
    if rest.starts_with("<!") || rest.starts_with("<?") {
        let end = rest.find('>').map_or(input.len(), |i| start + i + 1);
        return Some((None, end));
    }
    if let Some(after) = rest.strip_prefix("</") {
        if !after.starts_with(|c: char| c.is_ascii_alphabetic()) {
            return None;
        }
        let close = after.find('>')?;
        let name = tag_name(&after[..close]);
        return Some((Some(Token::End { name }), start + 2 + close + 1));
    }
    if !rest[1..].starts_with(|c: char| c.is_ascii_alphabetic()) {
        return None;
    }

    let close = find_tag_end(rest)?;
    let inner = &rest[1..close];
    let (inner, self_closing) = match inner.trim_end().strip_suffix('/') {
        Some(stripped) => (stripped, true),
        None => (inner, false),
    };
    let name = tag_name(inner);
    let attrs = parse_attributes(&inner[name.len()..]);
    Some((
        Some(Token::Start {
            name,
            attrs,
            self_closing,
        }),
        start + close + 1,
    ))
}

/// Index of the `>` ending the tag at the start of `rest`, skipping quoted
/// attribute values.
fn find_tag_end(rest: &str) -> Option<usize> {
    let mut quote: Option<char> = None;
    for (idx, ch) in rest.char_indices().skip(1) {
        match quote {
            Some(q) if ch == q => quote = None,
            Some(_) => {}
            None if ch == '"' || ch == '\'' => quote = Some(ch),
            None if ch == '>' => return Some(idx),
            None => {}
        }
    }
    None
}

fn tag_name(raw: &str) -> String {
    raw.chars()
        .take_while(|c| c.is_ascii_alphanumeric() || *c == '-')
        .collect::<String>()
        .to_ascii_lowercase()
}

fn parse_attributes(mut rest: &str) -> Vec<(String, String)> {
    let mut attrs = Vec::new();
    loop {
        rest = rest.trim_start_matches(|c: char| c.is_whitespace() || c == '/');
        if rest.is_empty() {
            return attrs;
        }

        let name_len = rest
            .find(|c: char| c.is_whitespace() || c == '=' || c == '/')
            .unwrap_or(rest.len());
        let name = rest[..name_len].to_ascii_lowercase();
        rest = rest[name_len..].trim_start();

        let mut value = String::new();
        if let Some(after_eq) = rest.strip_prefix('=') {
            let after_eq = after_eq.trim_start();
            match after_eq.chars().next() {
                Some(q @ ('"' | '\'')) => {
                    let body = &after_eq[1..];
                    let end = body.find(q).unwrap_or(body.len());
                    value = body[..end].to_string();
                    rest = body.get(end + 1..).unwrap_or("");
                }
                _ => {
                    let end = after_eq
                        .find(char::is_whitespace)
                        .unwrap_or(after_eq.len());
                    value = after_eq[..end].to_string();
                    rest = &after_eq[end..];
                }
            }
        }

        if !name.is_empty() {
            attrs.push((name, value));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn start(name: &str, attrs: &[(&str, &str)], self_closing: bool) -> Token<'static> {
        Token::Start {
            name: name.to_string(),
            attrs: attrs
                .iter()
                .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
                .collect(),
            self_closing,
        }
    }

    #[test]
    fn test_text_and_tags() {
        let tokens = tokenize("a<b>c</b>");
        assert_eq!(
            tokens,
            vec![
                Token::Text("a"),
                start("b", &[], false),
                Token::Text("c"),
                Token::End {
                    name: "b".to_string()
                },
            ]
        );
    }

    #[test]
    fn test_attributes_quoted_and_unquoted() {
        let tokens = tokenize(r#"<img src="a b.png" alt='x > y' width=10>"#);
        assert_eq!(
            tokens,
            vec![start(
                "img",
                &[("src", "a b.png"), ("alt", "x > y"), ("width", "10")],
                false
            )]
        );
    }

    #[test]
    fn test_self_closing_and_uppercase() {
        let tokens = tokenize("<BR/><Hr />");
        assert_eq!(tokens, vec![start("br", &[], true), start("hr", &[], true)]);
    }

    #[test]
    fn test_comments_and_doctype_are_skipped() {
        let tokens = tokenize("<!DOCTYPE html><!-- note -->x");
        assert_eq!(tokens, vec![Token::Text("x")]);
    }

    #[test]
    fn test_stray_angle_brackets_are_text() {
        let tokens = tokenize("1 < 2 and 3 <= 4");
        assert_eq!(tokens, vec![Token::Text("1 < 2 and 3 <= 4")]);
    }

    #[test]
    fn test_unterminated_tag_is_text() {
        let tokens = tokenize("x <b class=\"y");
        assert_eq!(tokens, vec![Token::Text("x <b class=\"y")]);
    }

    #[test]
    fn test_boolean_attribute() {
        let tokens = tokenize("<input disabled>");
        assert_eq!(tokens, vec![start("input", &[("disabled", "")], false)]);
    }
}
