// Copyright 2026 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! A small Markdown subset rendered to HTML for native text.
//!
//! Supported: `*em*`/`_em_`, `**strong**`/`__strong__`, `~~strike~~`,
//! `# headings` (1–6), `[links](href)`, `![images](src)`, `` `code` ``,
//! `> blockquotes`, `-`/`*`/`+` and `1.` lists, `---` rules, and blank-line
//! or two-space line breaks.
//!
//! # Trust boundary
//!
//! Text outside code spans and attribute values is passed through without
//! HTML escaping, so markup embedded in content reaches the DOM as markup.
//! Content must come from a trusted core.

use alloc::string::String;
use alloc::vec::Vec;

/// Renders `markdown` to HTML.
#[must_use]
pub fn render(markdown: &str) -> String {
    let lines: Vec<&str> = markdown.trim_matches('\n').split('\n').collect();
    let mut out = String::with_capacity(markdown.len() + 16);
    let mut after_text = false;
    let mut i = 0;
    while i < lines.len() {
        let line = lines[i];

        if line.trim().is_empty() {
            while i < lines.len() && lines[i].trim().is_empty() {
                i += 1;
            }
            if after_text && i < lines.len() {
                out.push_str("<br />");
            }
            after_text = false;
            continue;
        }

        if is_rule(line) {
            out.push_str("<hr />");
            after_text = false;
            i += 1;
            continue;
        }

        if let Some((level, title)) = heading(line) {
            out.push_str(&alloc::format!("<h{level}>{}</h{level}>", inline(title)));
            after_text = false;
            i += 1;
            continue;
        }

        if quote_body(line).is_some() {
            let mut inner = String::new();
            while let Some(body) = lines.get(i).and_then(|l| quote_body(l)) {
                if !inner.is_empty() {
                    inner.push('\n');
                }
                inner.push_str(body);
                i += 1;
            }
            out.push_str("<blockquote>");
            out.push_str(&render(&inner));
            out.push_str("</blockquote>");
            after_text = false;
            continue;
        }

        if let Some((ordered, _)) = list_item(line) {
            let tag = if ordered { "ol" } else { "ul" };
            out.push('<');
            out.push_str(tag);
            out.push('>');
            while let Some((item_ordered, body)) = lines.get(i).and_then(|l| list_item(l)) {
                if item_ordered != ordered {
                    break;
                }
                out.push_str("<li>");
                out.push_str(&inline(body));
                out.push_str("</li>");
                i += 1;
            }
            out.push_str("</");
            out.push_str(tag);
            out.push('>');
            after_text = false;
            continue;
        }

        if after_text {
            out.push('\n');
        }
        match line.strip_suffix("  ") {
            Some(body) => {
                out.push_str(&inline(body));
                out.push_str("<br />");
            }
            None => out.push_str(&inline(line)),
        }
        after_text = true;
        i += 1;
    }
    out
}

/// Converts the HTML of a `contenteditable` element back to plain text.
///
/// `<br>` becomes a newline, a newline is inserted before each `<p…>` and
/// `<div…>`, and every other tag is dropped. Entities are left alone.
#[must_use]
pub fn sanitize_editable(html: &str) -> String {
    let mut out = String::with_capacity(html.len());
    let mut rest = html;
    while let Some(open) = rest.find('<') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        let Some(close) = after.find('>').filter(|&c| c > 0) else {
            out.push('<');
            rest = after;
            continue;
        };
        let tag = &after[..close];
        if is_break_tag(tag) {
            out.push('\n');
        } else if starts_with_ignore_case(tag, "p") || starts_with_ignore_case(tag, "div") {
            out.push('\n');
        }
        rest = &after[close + 1..];
    }
    out.push_str(rest);
    out
}

fn is_break_tag(tag: &str) -> bool {
    starts_with_ignore_case(tag, "br")
        && tag[2..]
            .chars()
            .all(|c| c.is_ascii_whitespace() || c == '/')
}

fn starts_with_ignore_case(s: &str, prefix: &str) -> bool {
    s.len() >= prefix.len()
        && s.as_bytes()[..prefix.len()].eq_ignore_ascii_case(prefix.as_bytes())
}

fn is_rule(line: &str) -> bool {
    let line = line.trim();
    line.len() >= 3 && line.bytes().all(|b| b == b'-')
}

fn heading(line: &str) -> Option<(usize, &str)> {
    let level = line.bytes().take_while(|&b| b == b'#').count();
    if !(1..=6).contains(&level) {
        return None;
    }
    let title = line[level..].strip_prefix(' ')?;
    Some((level, title.trim()))
}

fn quote_body(line: &str) -> Option<&str> {
    let body = line.trim_start().strip_prefix('>')?;
    Some(body.strip_prefix(' ').unwrap_or(body))
}

/// Returns `(ordered, body)` for a list item line.
fn list_item(line: &str) -> Option<(bool, &str)> {
    let line = line.trim_start();
    for marker in ["- ", "* ", "+ "] {
        if let Some(body) = line.strip_prefix(marker) {
            return Some((false, body.trim_start()));
        }
    }
    let digits = line.bytes().take_while(u8::is_ascii_digit).count();
    if digits > 0 {
        if let Some(body) = line[digits..].strip_prefix(". ") {
            return Some((true, body.trim_start()));
        }
    }
    None
}

/// Renders inline markup on a single line.
fn inline(text: &str) -> String {
    let bytes = text.as_bytes();
    let mut out = String::with_capacity(text.len());
    let mut open: Vec<&'static str> = Vec::new();
    let mut plain_from = 0;
    let mut i = 0;
    while i < bytes.len() {
        let consumed = match bytes[i] {
            b'`' => text[i + 1..].find('`').filter(|&end| end > 0).map(|end| {
                out.push_str(&text[plain_from..i]);
                out.push_str("<code>");
                push_escaped(&mut out, &text[i + 1..i + 1 + end]);
                out.push_str("</code>");
                end + 2
            }),
            b'!' if bytes.get(i + 1) == Some(&b'[') => {
                link(&text[i + 1..]).map(|(alt, src, len)| {
                    out.push_str(&text[plain_from..i]);
                    out.push_str("<img src=\"");
                    push_escaped(&mut out, src);
                    out.push_str("\" alt=\"");
                    push_escaped(&mut out, alt);
                    out.push_str("\">");
                    len + 1
                })
            }
            b'[' => link(&text[i..]).map(|(label, href, len)| {
                out.push_str(&text[plain_from..i]);
                out.push_str("<a href=\"");
                push_escaped(&mut out, href);
                out.push_str("\">");
                out.push_str(&inline(label));
                out.push_str("</a>");
                len
            }),
            b'*' | b'_' | b'~' => emphasis_marker(&bytes[i..]).map(|marker| {
                out.push_str(&text[plain_from..i]);
                let tag = emphasis_tag(marker);
                if open.last() == Some(&marker) {
                    open.pop();
                    out.push_str("</");
                } else {
                    open.push(marker);
                    out.push('<');
                }
                out.push_str(tag);
                out.push('>');
                marker.len()
            }),
            _ => None,
        };
        match consumed {
            Some(len) => {
                i += len;
                plain_from = i;
            }
            None => i += 1,
        }
    }
    out.push_str(&text[plain_from..]);
    while let Some(marker) = open.pop() {
        out.push_str("</");
        out.push_str(emphasis_tag(marker));
        out.push('>');
    }
    out
}

fn emphasis_marker(bytes: &[u8]) -> Option<&'static str> {
    let doubled = bytes.get(1) == Some(&bytes[0]);
    match (bytes[0], doubled) {
        (b'*', true) => Some("**"),
        (b'_', true) => Some("__"),
        (b'~', true) => Some("~~"),
        (b'*', false) => Some("*"),
        (b'_', false) => Some("_"),
        _ => None,
    }
}

fn emphasis_tag(marker: &str) -> &'static str {
    match marker {
        "**" | "__" => "strong",
        "~~" => "s",
        _ => "em",
    }
}

/// Parses `[label](target)` at the start of `s`, returning the label, the
/// target and the number of bytes consumed.
fn link(s: &str) -> Option<(&str, &str, usize)> {
    let rest = s.strip_prefix('[')?;
    let label_end = rest.find(']')?;
    let after = rest[label_end + 1..].strip_prefix('(')?;
    let target_end = after.find(')')?;
    let consumed = 1 + label_end + 2 + target_end + 1;
    Some((&rest[..label_end], &after[..target_end], consumed))
}

fn push_escaped(out: &mut String, s: &str) {
    for c in s.chars() {
        match c {
            '"' => out.push_str("&quot;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            c => out.push(c),
        }
    }
}
