//! The tree builder: pulls tokens from a [`Lexer`] and assembles the
//! document tree.
//!
//! Recursive-descent with two tokens of pushback.  Container constructs
//! (blockquotes, list item bodies) are re-scanned by a fresh lexer and a
//! fresh builder over the stripped region; the link definition registry is
//! shared down through every sub-parse so definitions resolve regardless
//! of where they appear.

use std::cell::RefCell;
use std::rc::Rc;

use rustc_hash::FxHashMap;
use smallvec::SmallVec;

use crate::grammar;
use crate::lexer::{Lexer, Token, TokenKind};
use crate::nodes::{Alignment, EmphKind, Node, NodeValue};
use crate::Options;

/// A registered link definition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkReference {
    pub href: String,
    pub title: Option<String>,
}

/// The definition registry, shared between the document and its
/// sub-parses.  Keys are case-folded labels; the first definition of a
/// label wins.
pub type LinkMap = Rc<RefCell<FxHashMap<String, LinkReference>>>;

/// Parses a full document, returning the block sequence and the registry
/// of link definitions it collected.
pub fn parse_document(input: &str, options: &Options) -> (Vec<Node>, LinkMap) {
    let links: LinkMap = Rc::new(RefCell::new(FxHashMap::default()));
    let mut parser = Parser::new(Lexer::block(input, options), Rc::clone(&links), *options);
    let nodes = parser.run();
    (nodes, links)
}

struct Parser<'a> {
    lexer: Lexer<'a>,
    /// Pushback stack; the top is the next token.
    lookahead: SmallVec<[Token; 2]>,
    links: LinkMap,
    options: Options,
}

/// A collected list item, before tree assembly.
struct ItemSource {
    pos: usize,
    raw: String,
    loose: bool,
    indent: usize,
    ordered: bool,
}

impl<'a> Parser<'a> {
    fn new(lexer: Lexer<'a>, links: LinkMap, options: Options) -> Parser<'a> {
        Parser {
            lexer,
            lookahead: SmallVec::new(),
            links,
            options,
        }
    }

    fn pull(&mut self) -> Token {
        self.lexer.next().unwrap_or(Token {
            kind: TokenKind::EndOfInput,
            offset: 0,
            text: String::new(),
        })
    }

    fn next(&mut self) -> Token {
        match self.lookahead.pop() {
            Some(t) => t,
            None => self.pull(),
        }
    }

    fn peek(&mut self) -> &Token {
        if self.lookahead.is_empty() {
            let t = self.pull();
            self.lookahead.push(t);
        }
        self.lookahead.last().unwrap()
    }

    fn backup(&mut self, token: Token) {
        self.lookahead.push(token);
    }

    fn run(&mut self) -> Vec<Node> {
        let mut nodes = Vec::new();
        loop {
            let token = self.next();
            if token.kind == TokenKind::EndOfInput {
                break;
            }
            self.parse_block(token, &mut nodes);
        }
        nodes
    }

    fn parse_block(&mut self, token: Token, nodes: &mut Vec<Node>) {
        match token.kind {
            TokenKind::NewLine => nodes.push(Node::new(token.offset, NodeValue::NewLine)),
            TokenKind::Heading => {
                let (level, text) = grammar::atx_heading_parts(&token.text);
                nodes.push(Node::new(
                    token.offset,
                    NodeValue::Heading {
                        level,
                        text: text.to_string(),
                    },
                ));
            }
            TokenKind::SetextHeading => {
                let (level, text) = grammar::setext_heading_parts(&token.text);
                nodes.push(Node::new(
                    token.offset,
                    NodeValue::Heading {
                        level,
                        text: text.to_string(),
                    },
                ));
            }
            TokenKind::ThematicBreak => {
                nodes.push(Node::new(token.offset, NodeValue::ThematicBreak));
            }
            TokenKind::FencedCode => {
                let value = match grammar::fenced_block(&token.text) {
                    Some(fb) => NodeValue::CodeBlock {
                        lang: fb.lang.map(str::to_string),
                        literal: fb.literal.to_string(),
                    },
                    None => NodeValue::CodeBlock {
                        lang: None,
                        literal: token.text.clone(),
                    },
                };
                nodes.push(Node::new(token.offset, value));
            }
            // The indent marker is informational; the code region that
            // follows carries the whole source.
            TokenKind::Indent => {}
            TokenKind::IndentedCode => {
                let mut literal = String::new();
                for line in token.text.split_inclusive('\n') {
                    let strip = line.bytes().take_while(|&b| b == b' ').count().min(4);
                    literal.push_str(&line[strip..]);
                }
                nodes.push(Node::new(
                    token.offset,
                    NodeValue::CodeBlock {
                        lang: None,
                        literal,
                    },
                ));
            }
            TokenKind::BlockQuote => {
                let inner = grammar::strip_block_quote(&token.text);
                let children = self.sub_parse(&inner);
                nodes.push(Node::new(token.offset, NodeValue::BlockQuote(children)));
            }
            TokenKind::LinkDefinition => {
                if let Some((label, href, title)) = grammar::link_definition_parts(&token.text) {
                    let key = caseless::default_case_fold_str(label);
                    self.links
                        .borrow_mut()
                        .entry(key)
                        .or_insert_with(|| LinkReference {
                            href: href.to_string(),
                            title: title.map(str::to_string),
                        });
                }
                nodes.push(Node::new(token.offset, NodeValue::LinkDefinition));
            }
            TokenKind::ListMarker => {
                let node = self.parse_list(token.offset);
                nodes.push(node);
            }
            TokenKind::Table | TokenKind::LeadingPipeTable => {
                let node = self.parse_table(token.offset);
                nodes.push(node);
            }
            TokenKind::RawHtml => {
                nodes.push(Node::new(token.offset, NodeValue::RawHtml(token.text)));
            }
            TokenKind::PlainText | TokenKind::LexError => {
                self.parse_paragraph(token, nodes);
            }
            TokenKind::EndOfInput => {}
            // Stray tokens outside their construct degrade to text.
            _ => self.parse_paragraph(token, nodes),
        }
    }

    /// Accumulates paragraph lines into one blob, then span-parses it.
    /// A newline stays inside the paragraph only when another text line
    /// follows it.
    fn parse_paragraph(&mut self, first: Token, nodes: &mut Vec<Node>) {
        let offset = first.offset;
        let mut blob = first.text;
        loop {
            let token = self.next();
            match token.kind {
                TokenKind::PlainText | TokenKind::LexError => blob.push_str(&token.text),
                TokenKind::NewLine => {
                    let continues = matches!(
                        self.peek().kind,
                        TokenKind::PlainText | TokenKind::LexError
                    );
                    if continues {
                        blob.push('\n');
                    } else {
                        self.backup(token);
                        break;
                    }
                }
                _ => {
                    self.backup(token);
                    break;
                }
            }
        }
        let children = self.parse_inline(&blob);
        nodes.push(Node::new(offset, NodeValue::Paragraph(children)));
    }

    /// Span-parses a text blob with a fresh inline-mode lexer.
    fn parse_inline(&self, blob: &str) -> Vec<Node> {
        let mut nodes: Vec<Node> = Vec::new();
        for token in Lexer::inline(blob, &self.options) {
            match token.kind {
                TokenKind::PlainText => push_text(&mut nodes, token),
                TokenKind::HardBreak => {
                    nodes.push(Node::new(token.offset, NodeValue::HardBreak));
                }
                TokenKind::Strong => nodes.push(Node::new(
                    token.offset,
                    NodeValue::Emphasis {
                        kind: EmphKind::Strong,
                        children: self.parse_inline(&token.text),
                    },
                )),
                TokenKind::Italic => nodes.push(Node::new(
                    token.offset,
                    NodeValue::Emphasis {
                        kind: EmphKind::Em,
                        children: self.parse_inline(&token.text),
                    },
                )),
                TokenKind::Strike => nodes.push(Node::new(
                    token.offset,
                    NodeValue::Emphasis {
                        kind: EmphKind::Strike,
                        children: self.parse_inline(&token.text),
                    },
                )),
                TokenKind::CodeSpan => {
                    nodes.push(Node::new(token.offset, NodeValue::CodeSpan(token.text)));
                }
                TokenKind::Link | TokenKind::Image => {
                    match grammar::link_parts(&token.text) {
                        Some(p) if p.image => nodes.push(Node::new(
                            token.offset,
                            NodeValue::Image {
                                src: p.href.to_string(),
                                alt: p.text.to_string(),
                                title: p.title.map(str::to_string),
                            },
                        )),
                        Some(p) => nodes.push(Node::new(
                            token.offset,
                            NodeValue::Link {
                                href: p.href.to_string(),
                                title: p.title.map(str::to_string),
                                children: self.parse_inline(p.text),
                            },
                        )),
                        None => push_text(&mut nodes, token),
                    }
                }
                TokenKind::ReferenceLink | TokenKind::ReferenceImage => {
                    match grammar::ref_link_parts(&token.text) {
                        Some(p) => {
                            let label = if p.label.is_empty() { p.text } else { p.label };
                            let key = caseless::default_case_fold_str(label);
                            let value = if token.kind == TokenKind::ReferenceImage {
                                NodeValue::ReferenceImage {
                                    raw: token.text.clone(),
                                    alt: p.text.to_string(),
                                    key,
                                }
                            } else {
                                NodeValue::ReferenceLink {
                                    raw: token.text.clone(),
                                    text: p.text.to_string(),
                                    key,
                                }
                            };
                            nodes.push(Node::new(token.offset, value));
                        }
                        None => push_text(&mut nodes, token),
                    }
                }
                TokenKind::AutoLink => match grammar::auto_link_parts(&token.text) {
                    Some((href, text)) => nodes.push(Node::new(
                        token.offset,
                        NodeValue::Link {
                            href,
                            title: None,
                            children: vec![Node::new(
                                token.offset,
                                NodeValue::Text(text.to_string()),
                            )],
                        },
                    )),
                    None => push_text(&mut nodes, token),
                },
                TokenKind::BareLink => nodes.push(Node::new(
                    token.offset,
                    NodeValue::Link {
                        href: token.text.clone(),
                        title: None,
                        children: vec![Node::new(token.offset, NodeValue::Text(token.text))],
                    },
                )),
                TokenKind::EndOfInput => {}
                _ => push_text(&mut nodes, token),
            }
        }
        nodes
    }

    /// Parses a nested region with a fresh lexer and builder sharing this
    /// builder's definition registry.
    fn sub_parse(&self, text: &str) -> Vec<Node> {
        let mut parser = Parser::new(
            Lexer::block(text, &self.options),
            Rc::clone(&self.links),
            self.options,
        );
        parser.run()
    }

    /// Collects the item bodies of a list region and assembles them into a
    /// list tree by marker indentation.
    fn parse_list(&mut self, offset: usize) -> Node {
        let mut items: Vec<ItemSource> = Vec::new();
        loop {
            match self.peek().kind {
                TokenKind::ListItemBody | TokenKind::LooseListItemBody => {
                    let token = self.next();
                    items.push(ItemSource {
                        pos: token.offset,
                        loose: token.kind == TokenKind::LooseListItemBody,
                        indent: grammar::list_indent(&token.text),
                        ordered: grammar::list_ordered(&token.text),
                        raw: token.text,
                    });
                }
                _ => break,
            }
        }
        if items.is_empty() {
            return Node::new(offset, NodeValue::NewLine);
        }
        self.build_list(&items, 1, offset)
    }

    fn build_list(&mut self, items: &[ItemSource], depth: usize, pos: usize) -> Node {
        let base = items[0].indent;
        let ordered = items[0].ordered;
        let mut list_items = Vec::new();
        let mut i = 0;
        while i < items.len() {
            // deeper-indented markers nest under the item before them
            let mut j = i + 1;
            while j < items.len() && items[j].indent > base {
                j += 1;
            }
            let mut children = self.parse_item(&items[i]);
            if j > i + 1 {
                children.push(self.build_list(&items[i + 1..j], depth + 1, items[i + 1].pos));
            }
            list_items.push(Node::new(items[i].pos, NodeValue::ListItem(children)));
            i = j;
        }
        Node::new(
            pos,
            NodeValue::List {
                ordered,
                depth,
                items: list_items,
            },
        )
    }

    /// The blocks of one list item.  A tight item holding exactly one
    /// paragraph is spliced down to its spans.
    fn parse_item(&mut self, item: &ItemSource) -> Vec<Node> {
        let body = grammar::strip_list_marker(&item.raw);
        let mut blocks = self.sub_parse(&body);
        if !item.loose && blocks.len() == 1 {
            if matches!(blocks[0].value, NodeValue::Paragraph(_)) {
                if let Some(Node {
                    value: NodeValue::Paragraph(children),
                    ..
                }) = blocks.pop()
                {
                    return children;
                }
            }
        }
        blocks
    }

    /// Assembles a table from the cell and row tokens of one window.  The
    /// first row is the header, the second the delimiter row; body rows
    /// are padded or truncated to the header's arity.
    fn parse_table(&mut self, offset: usize) -> Node {
        let mut rows: Vec<Vec<String>> = vec![Vec::new()];
        loop {
            match self.peek().kind {
                TokenKind::TableCell => {
                    let token = self.next();
                    rows.last_mut().unwrap().push(token.text.trim().to_string());
                }
                // pipes are pure delimiters; empty segments between them
                // contribute no cell
                TokenKind::Pipe => {
                    self.next();
                }
                TokenKind::TableRow => {
                    self.next();
                    rows.push(Vec::new());
                }
                _ => break,
            }
        }
        while rows.last().is_some_and(Vec::is_empty) {
            rows.pop();
        }
        if rows.len() < 2 {
            let blob = rows.into_iter().flatten().collect::<Vec<_>>().join(" ");
            return Node::new(offset, NodeValue::Paragraph(self.parse_inline(&blob)));
        }

        let header = &rows[0];
        let columns = header.len();
        let mut aligns: Vec<Alignment> = rows[1].iter().map(|s| cell_alignment(s)).collect();
        aligns.resize(columns, Alignment::None);

        let mut out_rows = Vec::new();
        out_rows.push(self.table_row(header, &aligns, true, offset));
        for row in &rows[2..] {
            let mut cells = row.clone();
            cells.resize(columns, String::new());
            cells.truncate(columns);
            out_rows.push(self.table_row(&cells, &aligns, false, offset));
        }
        Node::new(offset, NodeValue::Table(out_rows))
    }

    fn table_row(
        &mut self,
        cells: &[String],
        aligns: &[Alignment],
        header: bool,
        pos: usize,
    ) -> Node {
        let nodes = cells
            .iter()
            .enumerate()
            .map(|(i, cell)| {
                Node::new(
                    pos,
                    NodeValue::TableCell {
                        header,
                        align: aligns.get(i).copied().unwrap_or_default(),
                        children: self.parse_inline(cell),
                    },
                )
            })
            .collect();
        Node::new(pos, NodeValue::TableRow(nodes))
    }
}

/// Appends inline text, merging into a preceding text node.
fn push_text(nodes: &mut Vec<Node>, token: Token) {
    if let Some(Node {
        value: NodeValue::Text(prev),
        ..
    }) = nodes.last_mut()
    {
        prev.push_str(&token.text);
        return;
    }
    nodes.push(Node::new(token.offset, NodeValue::Text(token.text)));
}

/// Alignment from one delimiter-row cell (`:---`, `:---:`, `---:`).
fn cell_alignment(marker: &str) -> Alignment {
    match (marker.starts_with(':'), marker.ends_with(':')) {
        (true, true) => Alignment::Center,
        (true, false) => Alignment::Left,
        (false, true) => Alignment::Right,
        (false, false) => Alignment::None,
    }
}
