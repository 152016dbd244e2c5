//! HTML escaping and the heading anchor slug.

use std::sync::LazyLock;

use regex::Regex;

/// A well-formed inline tag, which [`escape_text`] lets through verbatim.
static INLINE_TAG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\A</?[A-Za-z][A-Za-z0-9-]*(?:\s[^<>]*)?/?>").unwrap()
});

/// A named, decimal, or hex character reference.
static ENTITY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\A&(?:[A-Za-z][A-Za-z0-9]{1,31}|#[0-9]{1,7}|#[xX][0-9a-fA-F]{1,6});").unwrap()
});

static NON_WORD: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\W+").unwrap());

/// Strict escaping for attribute values and code bodies.
pub fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
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

/// Prose escaping: like [`escape`], except that well-formed inline tags
/// and character references pass through untouched, so authors can mix
/// HTML into their text.
pub fn escape_text(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut i = 0;
    while i < s.len() {
        let rest = &s[i..];
        match rest.as_bytes()[0] {
            b'<' => {
                if let Some(m) = INLINE_TAG.find(rest) {
                    out.push_str(m.as_str());
                    i += m.end();
                } else {
                    out.push_str("&lt;");
                    i += 1;
                }
            }
            b'&' => {
                if let Some(m) = ENTITY.find(rest) {
                    out.push_str(m.as_str());
                    i += m.end();
                } else {
                    out.push_str("&amp;");
                    i += 1;
                }
            }
            b'>' => {
                out.push_str("&gt;");
                i += 1;
            }
            b'"' => {
                out.push_str("&quot;");
                i += 1;
            }
            b'\'' => {
                out.push_str("&#39;");
                i += 1;
            }
            _ => {
                let c = rest.chars().next().unwrap();
                out.push(c);
                i += c.len_utf8();
            }
        }
    }
    out
}

/// The `id` attribute for a heading: lowercased, with runs of non-word
/// characters collapsed to single dashes.
pub fn heading_id(text: &str) -> String {
    let lowered = text.to_lowercase();
    NON_WORD
        .replace_all(&lowered, "-")
        .trim_matches('-')
        .to_string()
}
