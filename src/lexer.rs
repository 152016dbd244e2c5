//! The scanner: a single-pass, stateful cursor over the input producing a
//! lazy, finite token stream.
//!
//! A state is a function from the lexer to the next state; the dispatch
//! loop runs the current state until one returns `None`, at which point the
//! stream is closed with a single [`TokenKind::EndOfInput`].  The original
//! design ran the scanner on its own goroutine behind a rendezvous channel;
//! here the builder pulls tokens through the `Iterator` impl instead, which
//! keeps the same one-token-in-flight behavior without threads.
//!
//! Two entry points: [`Lexer::block`] tokenizes document structure,
//! [`Lexer::inline`] re-tokenizes an isolated text blob for spans.  A lexer
//! is not restartable; nested regions get a fresh one.

use std::collections::VecDeque;

use crate::grammar;
use crate::Options;

/// The type of a lexed item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    // Block constructs.
    Heading,
    SetextHeading,
    ThematicBreak,
    BlockQuote,
    ListMarker,
    ListItemBody,
    LooseListItemBody,
    Indent,
    IndentedCode,
    FencedCode,
    Table,
    LeadingPipeTable,
    TableRow,
    TableCell,
    Pipe,
    NewLine,
    LinkDefinition,
    RawHtml,
    PlainText,
    EndOfInput,
    LexError,
    // Span constructs.
    Strong,
    Italic,
    Strike,
    CodeSpan,
    HardBreak,
    Link,
    ReferenceLink,
    AutoLink,
    BareLink,
    Image,
    ReferenceImage,
}

/// A token: kind, byte offset of its start, and its text.
///
/// Block tokens carry the raw matched source.  Emphasis and code-span
/// tokens carry their body (delimiters already stripped); the bracketed
/// link family carries the full source so the parser can re-extract the
/// parts with the grammar helpers.
#[derive(Debug, Clone)]
pub struct Token {
    pub kind: TokenKind,
    pub offset: usize,
    pub text: String,
}

struct State(fn(&mut Lexer<'_>) -> Option<State>);

pub struct Lexer<'a> {
    input: &'a str,
    /// Current cursor.
    pos: usize,
    /// Start of the pending (unemitted) text.
    start: usize,
    /// Width of the last rune consumed by `next_char`, for one-step backup.
    width: usize,
    /// End of the current table window; `|` is a cell delimiter only below
    /// this offset.
    table_end: Option<usize>,
    gfm: bool,
    tables: bool,
    queue: VecDeque<Token>,
    state: Option<State>,
    finished: bool,
}

impl<'a> Lexer<'a> {
    /// A lexer over document-level block structure.
    pub fn block(input: &'a str, options: &Options) -> Lexer<'a> {
        Lexer::new(input, options, State(lex_block))
    }

    /// A lexer over an isolated text blob, recognizing only span grammar.
    pub fn inline(input: &'a str, options: &Options) -> Lexer<'a> {
        Lexer::new(input, options, State(lex_inline))
    }

    fn new(input: &'a str, options: &Options, initial: State) -> Lexer<'a> {
        Lexer {
            input,
            pos: 0,
            start: 0,
            width: 0,
            table_end: None,
            gfm: options.gfm,
            tables: options.tables,
            queue: VecDeque::new(),
            state: Some(initial),
            finished: false,
        }
    }

    fn rest(&self) -> &'a str {
        &self.input[self.pos..]
    }

    fn next_char(&mut self) -> Option<char> {
        let c = self.input[self.pos..].chars().next()?;
        self.width = c.len_utf8();
        self.pos += self.width;
        Some(c)
    }

    /// Steps back over the last rune consumed by `next_char`.
    fn backup(&mut self) {
        self.pos -= self.width;
        self.width = 0;
    }

    fn emit(&mut self, kind: TokenKind, offset: usize, text: &str) {
        self.queue.push_back(Token {
            kind,
            offset,
            text: text.to_string(),
        });
    }

    /// Consumes `n` bytes from the cursor and emits them as one token.
    fn advance_emit(&mut self, n: usize, kind: TokenKind) {
        let offset = self.pos;
        let text = &self.input[self.pos..self.pos + n];
        self.pos += n;
        self.start = self.pos;
        self.emit(kind, offset, text);
    }

    /// Emits the pending text run, if any.
    fn emit_pending(&mut self, kind: TokenKind) {
        if self.pos > self.start {
            let offset = self.start;
            let text = &self.input[self.start..self.pos];
            self.start = self.pos;
            self.emit(kind, offset, text);
        }
    }

    /// Tries every span matcher at the cursor; emits and returns true on a
    /// match.
    fn try_span(&mut self) -> bool {
        let rest = self.rest();
        match rest.as_bytes()[0] {
            b'\\' => {
                if let Some(n) = grammar::hard_break(rest) {
                    self.advance_emit(n, TokenKind::HardBreak);
                    return true;
                }
                if let Some(&b) = rest.as_bytes().get(1) {
                    if grammar::is_escapable(b) {
                        // the backslash is consumed; only the escaped
                        // character survives as literal text
                        let offset = self.pos;
                        self.pos += 2;
                        self.start = self.pos;
                        self.emit(TokenKind::PlainText, offset, &rest[1..2]);
                        return true;
                    }
                }
                false
            }
            b' ' => {
                if let Some(n) = grammar::hard_break(rest) {
                    self.advance_emit(n, TokenKind::HardBreak);
                    return true;
                }
                false
            }
            b'`' => self.emit_span(grammar::code_span(rest), TokenKind::CodeSpan),
            b'*' | b'_' => {
                self.emit_span(grammar::strong(rest), TokenKind::Strong)
                    || self.emit_span(grammar::emphasis(rest), TokenKind::Italic)
            }
            b'~' if self.gfm => self.emit_span(grammar::strike(rest), TokenKind::Strike),
            b'[' | b'!' => {
                let image = rest.starts_with('!');
                if let Some(n) = grammar::link(rest) {
                    let kind = if image { TokenKind::Image } else { TokenKind::Link };
                    self.advance_emit(n, kind);
                    return true;
                }
                let matched = grammar::ref_link(rest).or_else(|| grammar::no_link(rest));
                if let Some((n, image)) = matched {
                    let kind = if image {
                        TokenKind::ReferenceImage
                    } else {
                        TokenKind::ReferenceLink
                    };
                    self.advance_emit(n, kind);
                    return true;
                }
                false
            }
            b'<' => {
                if let Some(n) = grammar::auto_link(rest) {
                    self.advance_emit(n, TokenKind::AutoLink);
                    return true;
                }
                false
            }
            b'h' if self.gfm => {
                if let Some(n) = grammar::bare_url(rest) {
                    self.advance_emit(n, TokenKind::BareLink);
                    return true;
                }
                false
            }
            _ => false,
        }
    }

    fn emit_span(&mut self, m: Option<(usize, &str)>, kind: TokenKind) -> bool {
        match m {
            Some((n, body)) => {
                let offset = self.pos;
                let text = body.to_string();
                self.pos += n;
                self.start = self.pos;
                self.queue.push_back(Token {
                    kind,
                    offset,
                    text,
                });
                true
            }
            None => false,
        }
    }

    /// Whether a span construct could start at the character just consumed.
    fn at_span_trigger(&self, c: char) -> bool {
        let here = &self.input[self.pos - self.width..];
        match c {
            '\\' | '`' | '*' | '_' | '[' | '!' | '<' => true,
            '~' => self.gfm,
            ' ' => grammar::hard_break(here).is_some(),
            'h' if self.gfm => {
                here.starts_with("http://") || here.starts_with("https://")
            }
            _ => false,
        }
    }

    fn begin_table(&mut self, leading: bool, header_len: usize) -> Option<State> {
        let rest = self.rest();
        let mut end = header_len;
        while end < rest.len() {
            let line_end = rest[end..]
                .find('\n')
                .map(|e| end + e + 1)
                .unwrap_or(rest.len());
            let line = rest[end..line_end].trim();
            if line.is_empty() || !line.contains('|') {
                break;
            }
            end = line_end;
        }
        let kind = if leading {
            TokenKind::LeadingPipeTable
        } else {
            TokenKind::Table
        };
        self.emit(kind, self.pos, "");
        self.table_end = Some(self.pos + end);
        Some(State(lex_table))
    }
}

impl Iterator for Lexer<'_> {
    type Item = Token;

    fn next(&mut self) -> Option<Token> {
        loop {
            if let Some(t) = self.queue.pop_front() {
                return Some(t);
            }
            match self.state.take() {
                Some(state) => self.state = (state.0)(self),
                None => {
                    if self.finished {
                        return None;
                    }
                    self.finished = true;
                    return Some(Token {
                        kind: TokenKind::EndOfInput,
                        offset: self.pos,
                        text: String::new(),
                    });
                }
            }
        }
    }
}

/// Block-mode dispatch: selects a grammar-table entry anchored at the
/// cursor, or falls through to paragraph text.
fn lex_block(l: &mut Lexer<'_>) -> Option<State> {
    if l.pos >= l.input.len() {
        return None;
    }
    let rest = l.rest();
    if let Some(n) = grammar::blank_line(rest) {
        l.advance_emit(n, TokenKind::NewLine);
        return Some(State(lex_block));
    }
    if let Some(n) = grammar::thematic_break(rest) {
        l.advance_emit(n, TokenKind::ThematicBreak);
        return Some(State(lex_block));
    }
    if let Some(n) = grammar::atx_heading(rest) {
        l.advance_emit(n, TokenKind::Heading);
        return Some(State(lex_block));
    }
    if l.gfm {
        if let Some(fb) = grammar::fenced_block(rest) {
            l.advance_emit(fb.len, TokenKind::FencedCode);
            return Some(State(lex_block));
        }
    }
    if l.tables {
        if let Some((leading, header_len)) = grammar::table_start(rest) {
            return l.begin_table(leading, header_len);
        }
    }
    if let Some(n) = grammar::block_quote(rest) {
        let offset = l.pos;
        let text = rest[..n].trim_end_matches('\n').to_string();
        l.pos += n;
        l.start = l.pos;
        l.queue.push_back(Token {
            kind: TokenKind::BlockQuote,
            offset,
            text,
        });
        return Some(State(lex_block));
    }
    if let Some(n) = grammar::link_definition(rest) {
        l.advance_emit(n, TokenKind::LinkDefinition);
        return Some(State(lex_block));
    }
    if grammar::list_marker(rest).is_some() {
        return Some(State(lex_list));
    }
    if rest.starts_with('<') {
        if let Some(n) = grammar::raw_html_block(rest) {
            l.advance_emit(n, TokenKind::RawHtml);
            return Some(State(lex_block));
        }
    }
    if let Some(n) = grammar::indented_code(rest) {
        let indent = rest.len() - rest.trim_start_matches(' ').len();
        l.emit(TokenKind::Indent, l.pos, &rest[..indent.min(4)]);
        l.advance_emit(n, TokenKind::IndentedCode);
        return Some(State(lex_block));
    }
    Some(State(lex_text))
}

/// Paragraph fallback: one line of text per token, with setext-underline
/// lookahead and the "indented code cannot interrupt a paragraph" rule.
fn lex_text(l: &mut Lexer<'_>) -> Option<State> {
    let rest = l.rest();
    let line_len = rest.find('\n').unwrap_or(rest.len());
    if line_len < rest.len() {
        let next = &rest[line_len + 1..];
        if let Some(u) = grammar::setext_underline(next) {
            l.advance_emit(line_len + 1 + u, TokenKind::SetextHeading);
            return Some(State(lex_block));
        }
    }
    l.advance_emit(line_len, TokenKind::PlainText);
    if l.pos >= l.input.len() {
        return Some(State(lex_block));
    }
    // The newline is swallowed into the paragraph when the next line would
    // otherwise open an indented code block.
    if grammar::indented_code(&l.input[l.pos + 1..]).is_some() {
        l.advance_emit(1, TokenKind::NewLine);
        return Some(State(lex_text));
    }
    Some(State(lex_block))
}

/// A contiguous list region: every marker line starts an item; indented
/// lines continue the current item; a blank line ends the region unless a
/// marker or continuation follows, in which case the preceding item is
/// loose.
fn lex_list(l: &mut Lexer<'_>) -> Option<State> {
    let rest = l.rest();
    let mut items: Vec<(usize, usize, bool)> = Vec::new();
    let mut cur: Option<(usize, usize)> = None;
    let mut pending_blank = false;
    let mut i = 0;
    while i < rest.len() {
        let line_end = rest[i..].find('\n').map(|e| i + e + 1).unwrap_or(rest.len());
        let line = &rest[i..line_end];
        if line.trim().is_empty() {
            let next = &rest[line_end..];
            let continues = grammar::list_marker(next).is_some()
                || (next.starts_with(' ') && grammar::blank_line(next).is_none());
            if !continues {
                break;
            }
            pending_blank = true;
        } else if grammar::list_marker(line).is_some() {
            if let Some((s, e)) = cur.take() {
                items.push((s, e, pending_blank));
                pending_blank = false;
            }
            cur = Some((i, line_end));
        } else if line.starts_with(' ') && cur.is_some() {
            pending_blank = false;
            if let Some(c) = cur.as_mut() {
                c.1 = line_end;
            }
        } else {
            break;
        }
        i = line_end;
    }
    if let Some((s, e)) = cur.take() {
        items.push((s, e, pending_blank));
    }
    if items.is_empty() {
        // cannot happen: lex_block saw a marker; degrade to text
        l.emit(TokenKind::LexError, l.pos, "list region without items");
        return Some(State(lex_text));
    }
    let symbol = grammar::list_marker_symbol(&rest[items[0].0..]);
    l.emit(TokenKind::ListMarker, l.pos, symbol);
    for &(s, e, loose) in &items {
        let kind = if loose {
            TokenKind::LooseListItemBody
        } else {
            TokenKind::ListItemBody
        };
        let text = rest[s..e].trim_end_matches('\n');
        l.emit(kind, l.pos + s, text);
    }
    l.pos += i;
    l.start = l.pos;
    Some(State(lex_block))
}

/// Inside a table window `|` delimits cells and a newline ends a row;
/// outside of one, neither is ever special.
fn lex_table(l: &mut Lexer<'_>) -> Option<State> {
    let end = match l.table_end {
        Some(e) => e,
        None => return Some(State(lex_block)),
    };
    if end < l.pos {
        l.table_end = None;
        l.emit(TokenKind::LexError, l.pos, "table window ends before cursor");
        return Some(State(lex_block));
    }
    if l.pos >= end {
        l.table_end = None;
        return Some(State(lex_block));
    }
    let rest = &l.input[l.pos..end];
    match rest.as_bytes()[0] {
        b'|' => l.advance_emit(1, TokenKind::Pipe),
        b'\n' => l.advance_emit(1, TokenKind::TableRow),
        _ => {
            let n = rest.find(['|', '\n']).unwrap_or(rest.len());
            l.advance_emit(n, TokenKind::TableCell);
        }
    }
    Some(State(lex_table))
}

/// Inline dispatch: try the span table at the cursor, else accumulate
/// plain text up to the next possible span start.
fn lex_inline(l: &mut Lexer<'_>) -> Option<State> {
    if l.pos >= l.input.len() {
        return None;
    }
    if l.try_span() {
        return Some(State(lex_inline));
    }
    Some(State(lex_inline_text))
}

fn lex_inline_text(l: &mut Lexer<'_>) -> Option<State> {
    // The char under the cursor failed span matching; it is text no matter
    // what.
    let _ = l.next_char();
    while let Some(c) = l.next_char() {
        if l.at_span_trigger(c) {
            l.backup();
            break;
        }
    }
    l.emit_pending(TokenKind::PlainText);
    Some(State(lex_inline))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(input: &str) -> Vec<TokenKind> {
        Lexer::block(input, &Options::default())
            .map(|t| t.kind)
            .collect()
    }

    fn inline_kinds(input: &str) -> Vec<TokenKind> {
        Lexer::inline(input, &Options::default())
            .map(|t| t.kind)
            .collect()
    }

    use super::TokenKind::*;

    #[test]
    fn block_stream_ends_with_eof() {
        assert_eq!(kinds(""), vec![EndOfInput]);
        assert_eq!(kinds("foobar"), vec![PlainText, EndOfInput]);
    }

    #[test]
    fn headings_and_rules() {
        assert_eq!(
            kinds("# 1\n## 2"),
            vec![Heading, NewLine, Heading, EndOfInput]
        );
        assert_eq!(
            kinds("foo\n****\nbar"),
            vec![PlainText, NewLine, ThematicBreak, PlainText, EndOfInput]
        );
        assert_eq!(kinds("Hello\n==="), vec![SetextHeading, EndOfInput]);
    }

    #[test]
    fn list_region_tokens() {
        assert_eq!(
            kinds("- foo\n- bar"),
            vec![ListMarker, ListItemBody, ListItemBody, EndOfInput]
        );
        assert_eq!(
            kinds("- foo\n\n- bar"),
            vec![ListMarker, LooseListItemBody, ListItemBody, EndOfInput]
        );
    }

    #[test]
    fn indented_code_cannot_interrupt_paragraph() {
        assert_eq!(
            kinds("p\n    code"),
            vec![PlainText, NewLine, PlainText, EndOfInput]
        );
        assert_eq!(kinds("    code"), vec![Indent, IndentedCode, EndOfInput]);
    }

    #[test]
    fn table_window_tokens() {
        assert_eq!(
            kinds("Id | Name\n---|:---:\n1 | A"),
            vec![
                Table, TableCell, Pipe, TableCell, TableRow, TableCell, Pipe, TableCell, TableRow,
                TableCell, Pipe, TableCell, EndOfInput
            ]
        );
        // a pipe outside any table window is ordinary prose
        assert_eq!(kinds("foo|bar"), vec![PlainText, EndOfInput]);
    }

    #[test]
    fn inline_spans() {
        assert_eq!(
            inline_kinds("1  \n2  \n3"),
            vec![PlainText, HardBreak, PlainText, HardBreak, PlainText, EndOfInput]
        );
        assert_eq!(
            inline_kinds("**bar** foo __bar__"),
            vec![Strong, PlainText, Strong, EndOfInput]
        );
        assert_eq!(
            inline_kinds(r"\*foo\*"),
            vec![PlainText, PlainText, PlainText, EndOfInput]
        );
        assert_eq!(inline_kinds("~~__*mixim*__~~"), vec![Strike, EndOfInput]);
        assert_eq!(
            inline_kinds("Link: [example](#)"),
            vec![PlainText, Link, EndOfInput]
        );
        assert_eq!(
            inline_kinds("Link: [not really"),
            vec![PlainText, PlainText, EndOfInput]
        );
    }
}
