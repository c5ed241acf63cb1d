//! Inline markup for agent message bodies
//!
//! Supports `**strong**`, `*emphasis*` and line breaks. Parsing is a single
//! left-to-right pass: a `**` pair is tried before a single `*`, and spans
//! never cross a newline. Marker characters inside a matched span are kept
//! verbatim. Unmatched markers stay literal.

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Span {
    Text(String),
    Strong(String),
    Emphasis(String),
    LineBreak,
}

pub fn parse(input: &str) -> Vec<Span> {
    let chars: Vec<char> = input.chars().collect();
    let mut spans = Vec::new();
    let mut text = String::new();
    let mut i = 0;

    while i < chars.len() {
        match chars[i] {
            '\n' => {
                flush(&mut text, &mut spans);
                spans.push(Span::LineBreak);
                i += 1;
            }
            '*' if chars.get(i + 1) == Some(&'*') => {
                match find_closing(&chars, i + 2, &['*', '*']) {
                    Some(end) => {
                        flush(&mut text, &mut spans);
                        spans.push(Span::Strong(chars[i + 2..end].iter().collect()));
                        i = end + 2;
                    }
                    None => {
                        text.push_str("**");
                        i += 2;
                    }
                }
            }
            '*' => match find_closing(&chars, i + 1, &['*']) {
                Some(end) => {
                    flush(&mut text, &mut spans);
                    spans.push(Span::Emphasis(chars[i + 1..end].iter().collect()));
                    i = end + 1;
                }
                None => {
                    text.push('*');
                    i += 1;
                }
            },
            c => {
                text.push(c);
                i += 1;
            }
        }
    }

    flush(&mut text, &mut spans);
    spans
}

/// Index of the first `marker` at or after `start` on the same line,
/// requiring non-empty content between opener and closer.
fn find_closing(chars: &[char], start: usize, marker: &[char]) -> Option<usize> {
    let mut j = start;
    while j + marker.len() <= chars.len() {
        if chars[j] == '\n' {
            return None;
        }
        if chars[j..j + marker.len()] == *marker {
            return (j > start).then_some(j);
        }
        j += 1;
    }
    None
}

fn flush(text: &mut String, spans: &mut Vec<Span>) {
    if !text.is_empty() {
        spans.push(Span::Text(std::mem::take(text)));
    }
}

pub fn to_html(spans: &[Span]) -> String {
    let mut out = String::new();
    for span in spans {
        match span {
            Span::Text(t) => out.push_str(&escape_html(t)),
            Span::Strong(t) => {
                out.push_str("<strong>");
                out.push_str(&escape_html(t));
                out.push_str("</strong>");
            }
            Span::Emphasis(t) => {
                out.push_str("<em>");
                out.push_str(&escape_html(t));
                out.push_str("</em>");
            }
            Span::LineBreak => out.push_str("<br>"),
        }
    }
    out
}

/// Parse and render agent markup in one step
pub fn render(input: &str) -> String {
    to_html(&parse(input))
}

pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
