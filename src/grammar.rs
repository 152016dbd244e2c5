//! Grammar tables: one anchored matcher per block and span construct.
//!
//! Patterns are compiled once, on first use, into process-wide immutable
//! tables.  Block constructs are regex-based; the emphasis family and code
//! spans need one character of lookahead past the closing delimiter, which
//! an RE2-style engine cannot express, so those are matched by hand.
//!
//! Matchers come in two shapes: `fn(&str) -> Option<usize>` returning the
//! matched length at the start of the input (used by the lexer), and
//! `*_parts` helpers that re-extract captures from an already-matched token
//! text (used by the parser).

use std::sync::LazyLock;

use regex::Regex;

static BLANK_LINE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\A[ \t]*(?:\n|$)").unwrap());

static THEMATIC_BREAK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\A {0,3}(?:\*(?: *\*){2,}|-(?: *-){2,}|_(?: *_){2,}) *(?:\n|$)").unwrap()
});

static ATX_HEADING: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)\A {0,3}(#{1,6}) *([^\n]*?) *#* *$").unwrap());

static SETEXT_UNDERLINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\A(=+|-+) *(?:\n|$)").unwrap());

static INDENTED_CODE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\A(?: {4}[^\n]*(?:\n|$))+").unwrap());

static FENCE_OPEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\A {0,3}(`{3,}|~{3,}) *(\S*)[^\n]*(?:\n|$)").unwrap());

static FENCE_CLOSE_BACKTICK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^ {0,3}(`{3,}) *$").unwrap());

static FENCE_CLOSE_TILDE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^ {0,3}(~{3,}) *$").unwrap());

static FENCE_TRAILING_BACKTICK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"`{3,}[ \t]*\z").unwrap());

static FENCE_TRAILING_TILDE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"~{3,}[ \t]*\z").unwrap());

static LIST_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\A( *)([*+-]|\d+\.)( +)").unwrap());

static BLOCK_QUOTE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\A(?: {0,3}>[^\n]*(?:\n|$))+").unwrap());

static BLOCK_QUOTE_STRIP: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?m)^ {0,3}> ?").unwrap());

static LINK_DEFINITION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"\A {0,3}\[([^\]]+)\]: *<?([^\s>]+)>?(?: +["(]([^\n]*)[")])? *(?:\n+|$)"#).unwrap()
});

static HTML_TAG_OPEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\A<(/?)([A-Za-z][A-Za-z0-9-]*)([^\n>]*)>").unwrap());

static HTML_COMMENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)\A<!--.*?(?:-->|\z)").unwrap());

static LEADING_PIPE_TABLE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\A *\|(.+)\n *\|( *[-:]+[-| :]*)(?:\n|$)").unwrap());

static BARE_TABLE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\A *(\S[^\n]*\|[^\n]*)\n *([-:]+ *\|[-| :]*)(?:\n|$)").unwrap());

static LINK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"\A(!?)\[([^\[\]]*)\]\( *<?([^\s()<>]*)>? *(?:["']([^\n]*?)["'])? *\)"#).unwrap()
});

static REF_LINK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\A(!?)\[([^\[\]]*)\] ?\[([^\]]*)\]").unwrap());

static NO_LINK: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\A(!?)\[([^\[\]]*)\]").unwrap());

static AUTO_LINK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\A<([^ <>]+(?:@|:/)[^ <>]+)>").unwrap());

static BARE_URL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"\Ahttps?://[^\s<]+[^\s<.,:;"')\]]"#).unwrap());

static HARD_BREAK: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\A(?: {2,}|\\)\n").unwrap());

/// ASCII punctuation that a backslash escapes in inline text.
const ESCAPABLE: &[u8] = br"\`*{}[]()#+-.!_>~|";

/// Tag names that never open a raw HTML block; they stay inline and pass
/// through the text escaper instead.
const SPAN_LEVEL_TAGS: &[&str] = &[
    "a", "em", "strong", "small", "s", "q", "data", "time", "code", "sub", "sup", "i", "b", "u",
    "span", "br", "del", "img",
];

fn match_len(re: &Regex, s: &str) -> Option<usize> {
    re.find(s).map(|m| m.end())
}

pub fn blank_line(s: &str) -> Option<usize> {
    match_len(&BLANK_LINE, s)
}

pub fn thematic_break(s: &str) -> Option<usize> {
    match_len(&THEMATIC_BREAK, s)
}

pub fn atx_heading(s: &str) -> Option<usize> {
    match_len(&ATX_HEADING, s)
}

/// Level and trimmed text of a matched ATX heading token.
pub fn atx_heading_parts(s: &str) -> (u8, &str) {
    match ATX_HEADING.captures(s) {
        Some(caps) => {
            let level = caps.get(1).map_or(1, |m| m.as_str().len()) as u8;
            (level, caps.get(2).map_or("", |m| m.as_str()))
        }
        None => (1, s.trim()),
    }
}

/// Matches the underline of a setext heading at the start of `s` (the line
/// following a paragraph line).  Returns the underline length, not
/// including its trailing newline.
pub fn setext_underline(s: &str) -> Option<usize> {
    SETEXT_UNDERLINE.find(s).map(|m| {
        let t = m.as_str();
        if t.ends_with('\n') {
            m.end() - 1
        } else {
            m.end()
        }
    })
}

/// Level and text of a setext heading token (`text\nunderline`).
pub fn setext_heading_parts(s: &str) -> (u8, &str) {
    match s.split_once('\n') {
        Some((text, underline)) => {
            let level = if underline.trim_start().starts_with('=') {
                1
            } else {
                2
            };
            (level, text.trim_end())
        }
        None => (1, s),
    }
}

pub fn indented_code(s: &str) -> Option<usize> {
    match_len(&INDENTED_CODE, s)
}

/// A matched fenced code block: total source length, language tag, and the
/// captured literal (close fence stripped, one trailing newline trimmed).
pub struct FencedBlock<'a> {
    pub len: usize,
    pub lang: Option<&'a str>,
    pub literal: &'a str,
}

pub fn fenced_block(s: &str) -> Option<FencedBlock<'_>> {
    let caps = FENCE_OPEN.captures(s)?;
    let open = caps.get(0).unwrap();
    let fence = caps.get(1).unwrap().as_str();
    let lang = caps.get(2).map(|m| m.as_str()).filter(|l| !l.is_empty());
    let rest = &s[open.end()..];

    let (close_line, close_trailing) = if fence.starts_with('`') {
        (&FENCE_CLOSE_BACKTICK, &FENCE_TRAILING_BACKTICK)
    } else {
        (&FENCE_CLOSE_TILDE, &FENCE_TRAILING_TILDE)
    };

    // A close fence must be at least as long as the opener.
    let mut content_end = rest.len();
    let mut end = rest.len();
    let mut found = false;
    for m in close_line.find_iter(rest) {
        if m.as_str().trim().len() >= fence.len() {
            content_end = m.start();
            end = m.end();
            found = true;
            break;
        }
    }
    if !found {
        if let Some(m) = close_trailing.find(rest) {
            if m.as_str().trim_end().len() >= fence.len() {
                content_end = m.start();
                end = rest.len();
            }
        }
    }

    let literal = rest[..content_end].strip_suffix('\n').unwrap_or(&rest[..content_end]);
    Some(FencedBlock {
        len: open.end() + end,
        lang,
        literal,
    })
}

pub fn list_marker(s: &str) -> Option<usize> {
    match_len(&LIST_MARKER, s)
}

/// Indent (leading space count) of a list item's marker line.
pub fn list_indent(s: &str) -> usize {
    LIST_MARKER
        .captures(s)
        .and_then(|c| c.get(1))
        .map_or(0, |m| m.as_str().len())
}

/// The marker symbol itself (`-`, `*`, `+`, or a number with its dot).
pub fn list_marker_symbol(s: &str) -> &str {
    LIST_MARKER
        .captures(s)
        .and_then(|c| c.get(2))
        .map_or("", |m| m.as_str())
}

/// Whether a list item's marker is ordered (`1.`) or a bullet.
pub fn list_ordered(s: &str) -> bool {
    LIST_MARKER
        .captures(s)
        .and_then(|c| c.get(2))
        .is_some_and(|m| m.as_str().ends_with('.'))
}

/// Strips the marker from the first line of a raw list item and up to
/// `width` columns of indentation from every continuation line, where
/// `width` is the column at which the item's own text starts.
pub fn strip_list_marker(s: &str) -> String {
    let (head_len, width) = match LIST_MARKER.captures(s) {
        Some(caps) => {
            let m = caps.get(0).unwrap();
            (m.end(), m.end())
        }
        None => (0, 0),
    };
    let mut out = String::with_capacity(s.len());
    for (i, line) in s[head_len..].split('\n').enumerate() {
        if i > 0 {
            out.push('\n');
            let strip = line
                .bytes()
                .take_while(|&b| b == b' ')
                .count()
                .min(width);
            out.push_str(&line[strip..]);
        } else {
            out.push_str(line);
        }
    }
    out
}

pub fn block_quote(s: &str) -> Option<usize> {
    match_len(&BLOCK_QUOTE, s)
}

/// Removes the `>` marker from every line of a blockquote region.
pub fn strip_block_quote(s: &str) -> String {
    BLOCK_QUOTE_STRIP.replace_all(s, "").into_owned()
}

pub fn link_definition(s: &str) -> Option<usize> {
    match_len(&LINK_DEFINITION, s)
}

pub fn link_definition_parts(s: &str) -> Option<(&str, &str, Option<&str>)> {
    let caps = LINK_DEFINITION.captures(s)?;
    Some((
        caps.get(1).unwrap().as_str(),
        caps.get(2).unwrap().as_str(),
        caps.get(3).map(|m| m.as_str()),
    ))
}

/// Start of a table: whether every row is pipe-delimited at both edges, and
/// the length of the header + alignment lines.
pub fn table_start(s: &str) -> Option<(bool, usize)> {
    if let Some(m) = LEADING_PIPE_TABLE.find(s) {
        return Some((true, m.end()));
    }
    BARE_TABLE.find(s).map(|m| (false, m.end()))
}

/// Matches a raw HTML block at the start of `s`: a comment, or an opening
/// tag whose name is not span-level, captured through the line holding the
/// matching close tag (or to the end of input if unterminated).
pub fn raw_html_block(s: &str) -> Option<usize> {
    if let Some(m) = HTML_COMMENT.find(s) {
        return Some(m.end());
    }
    // autolinks look like tags; they belong to the span grammar
    if AUTO_LINK.is_match(s) {
        return None;
    }
    let caps = HTML_TAG_OPEN.captures(s)?;
    if !caps.get(1).unwrap().as_str().is_empty() {
        return None; // stray closing tag; leave it to the text escaper
    }
    let name = caps.get(2).unwrap().as_str();
    if SPAN_LEVEL_TAGS.contains(&name.to_ascii_lowercase().as_str()) {
        return None;
    }
    let open = caps.get(0).unwrap();
    if caps.get(3).unwrap().as_str().ends_with('/') {
        return Some(open.end()); // self-closing
    }
    let close = format!("</{}>", name);
    match s[open.end()..].find(&close) {
        Some(at) => {
            let after = open.end() + at + close.len();
            let line_end = s[after..].find('\n').map_or(s.len(), |i| after + i);
            Some(line_end)
        }
        None => Some(s.len()),
    }
}

pub fn is_escapable(b: u8) -> bool {
    ESCAPABLE.contains(&b)
}

pub fn hard_break(s: &str) -> Option<usize> {
    match_len(&HARD_BREAK, s)
}

fn find_span_closer(s: &str, from: usize, delim: &[u8], ch: u8) -> Option<usize> {
    let bytes = s.as_bytes();
    let mut i = from + 1; // the span body is at least one character
    while i + delim.len() <= bytes.len() {
        if &bytes[i..i + delim.len()] == delim && bytes.get(i + delim.len()) != Some(&ch) {
            return Some(i);
        }
        i += 1;
    }
    None
}

/// `**strong**` / `__strong__`.  Returns the consumed length and the body.
pub fn strong(s: &str) -> Option<(usize, &str)> {
    let delim: &[u8] = if s.starts_with("**") {
        b"**"
    } else if s.starts_with("__") {
        b"__"
    } else {
        return None;
    };
    let at = find_span_closer(s, 2, delim, delim[0])?;
    Some((at + 2, &s[2..at]))
}

/// `*em*` / `_em_`.
pub fn emphasis(s: &str) -> Option<(usize, &str)> {
    let ch = *s.as_bytes().first()?;
    if ch != b'*' && ch != b'_' {
        return None;
    }
    let at = find_span_closer(s, 1, &[ch], ch)?;
    Some((at + 1, &s[1..at]))
}

/// `~~strike~~`.
pub fn strike(s: &str) -> Option<(usize, &str)> {
    if !s.starts_with("~~") {
        return None;
    }
    let at = find_span_closer(s, 2, b"~~", b'~')?;
    Some((at + 2, &s[2..at]))
}

/// A backtick-delimited code span; the closing run must have the same
/// length as the opener.  The body is trimmed of surrounding whitespace.
pub fn code_span(s: &str) -> Option<(usize, &str)> {
    let bytes = s.as_bytes();
    let open = bytes.iter().take_while(|&&b| b == b'`').count();
    if open == 0 {
        return None;
    }
    let mut i = open;
    while i < bytes.len() {
        if bytes[i] == b'`' {
            let run = bytes[i..].iter().take_while(|&&b| b == b'`').count();
            if run == open {
                return Some((i + run, s[open..i].trim()));
            }
            i += run;
        } else {
            i += 1;
        }
    }
    None
}

pub fn link(s: &str) -> Option<usize> {
    match_len(&LINK, s)
}

pub struct LinkParts<'a> {
    pub image: bool,
    pub text: &'a str,
    pub href: &'a str,
    pub title: Option<&'a str>,
}

pub fn link_parts(s: &str) -> Option<LinkParts<'_>> {
    let caps = LINK.captures(s)?;
    Some(LinkParts {
        image: !caps.get(1).unwrap().as_str().is_empty(),
        text: caps.get(2).unwrap().as_str(),
        href: caps.get(3).unwrap().as_str(),
        title: caps.get(4).map(|m| m.as_str()),
    })
}

pub fn ref_link(s: &str) -> Option<(usize, bool)> {
    REF_LINK
        .captures(s)
        .map(|c| (c.get(0).unwrap().end(), !c.get(1).unwrap().as_str().is_empty()))
}

pub fn no_link(s: &str) -> Option<(usize, bool)> {
    NO_LINK
        .captures(s)
        .map(|c| (c.get(0).unwrap().end(), !c.get(1).unwrap().as_str().is_empty()))
}

pub struct RefParts<'a> {
    pub text: &'a str,
    /// The bracketed reference label; empty for implicit references.
    pub label: &'a str,
}

pub fn ref_link_parts(s: &str) -> Option<RefParts<'_>> {
    if let Some(caps) = REF_LINK.captures(s) {
        return Some(RefParts {
            text: caps.get(2).unwrap().as_str(),
            label: caps.get(3).unwrap().as_str(),
        });
    }
    NO_LINK.captures(s).map(|caps| RefParts {
        text: caps.get(2).unwrap().as_str(),
        label: "",
    })
}

pub fn auto_link(s: &str) -> Option<usize> {
    match_len(&AUTO_LINK, s)
}

/// Destination and display text of an autolink token (`<...>`).
pub fn auto_link_parts(s: &str) -> Option<(String, &str)> {
    let caps = AUTO_LINK.captures(s)?;
    let inner = caps.get(1).unwrap().as_str();
    let href = if inner.contains('@') && !inner.contains("://") {
        format!("mailto:{}", inner)
    } else {
        inner.to_string()
    };
    Some((href, inner))
}

pub fn bare_url(s: &str) -> Option<usize> {
    match_len(&BARE_URL, s)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn thematic_break_consumes_newline() {
        assert_eq!(thematic_break("****\nbar"), Some(5));
        assert_eq!(thematic_break("- - -\n"), Some(6));
        assert_eq!(thematic_break("___"), Some(3));
        assert_eq!(thematic_break("- foo"), None);
    }

    #[test]
    fn thematic_break_rejects_mixed_markers() {
        assert_eq!(thematic_break("*-*\n"), None);
        assert_eq!(thematic_break("- - *\n"), None);
        assert_eq!(thematic_break("_*_\n"), None);
        assert_eq!(thematic_break("**\n"), None);
    }

    #[test]
    fn heading_leaves_newline() {
        assert_eq!(atx_heading("# 1\n## 2"), Some(3));
        assert_eq!(atx_heading_parts("## 2"), (2, "2"));
        assert_eq!(atx_heading_parts("### trailing ##"), (3, "trailing"));
    }

    #[test]
    fn strong_prefers_outermost_delimiter() {
        assert_eq!(strong("___foo___"), Some((9, "_foo_")));
        assert_eq!(strong("__foo _bar___"), Some((13, "foo _bar_")));
        assert_eq!(strong("**bar** foo"), Some((7, "bar")));
        assert_eq!(strong("**bar"), None);
    }

    #[test]
    fn emphasis_stops_at_first_bare_delimiter() {
        assert_eq!(emphasis("_bar_baz"), Some((5, "bar")));
        assert_eq!(emphasis("*mixim*"), Some((7, "mixim")));
        assert_eq!(emphasis("*foo"), None);
    }

    #[test]
    fn code_span_matches_runs() {
        assert_eq!(code_span("`bool` and"), Some((6, "bool")));
        assert_eq!(code_span("``a`b`` c"), Some((7, "a`b")));
        assert_eq!(code_span("`open"), None);
    }

    #[test]
    fn fenced_block_variants() {
        let fb = fenced_block("```js\nvar a;\n```").unwrap();
        assert_eq!(fb.lang, Some("js"));
        assert_eq!(fb.literal, "var a;");
        assert_eq!(fb.len, 16);

        let fb = fenced_block("~~~\nvar b;~~~").unwrap();
        assert_eq!(fb.lang, None);
        assert_eq!(fb.literal, "var b;");

        let fb = fenced_block("```\nunterminated").unwrap();
        assert_eq!(fb.literal, "unterminated");
    }

    #[test]
    fn list_item_stripping() {
        assert_eq!(strip_list_marker("- foo"), "foo");
        assert_eq!(strip_list_marker("1. one"), "one");
        assert_eq!(strip_list_marker("- foo\n  bar"), "foo\nbar");
        assert!(list_ordered("2. two"));
        assert!(!list_ordered("* foo"));
        assert_eq!(list_indent(" 1. one of one"), 1);
    }

    #[test]
    fn table_start_detection() {
        assert_eq!(
            table_start("| Id | Name |\n|:---:| :---: |\n| 1 | A |").map(|t| t.0),
            Some(true)
        );
        assert_eq!(table_start("Id | Name\n---|:---:\n1 | A").map(|t| t.0), Some(false));
        assert_eq!(table_start("foo|bar"), None);
    }

    #[test]
    fn raw_html_blocks() {
        assert_eq!(raw_html_block("<div>\nx\n</div>\nrest"), Some(14));
        assert_eq!(raw_html_block("<!-- note -->tail"), Some(13));
        assert_eq!(raw_html_block("<em>inline</em>"), None);
    }

    #[test]
    fn link_grammar() {
        let p = link_parts("[text](link \"title\")").unwrap();
        assert_eq!((p.text, p.href, p.title), ("text", "link", Some("title")));
        assert!(link("[not really").is_none());
        let r = ref_link_parts("[foo]").unwrap();
        assert_eq!((r.text, r.label), ("foo", ""));
        let r = ref_link_parts("[bar][foo]").unwrap();
        assert_eq!((r.text, r.label), ("bar", "foo"));
    }
}
