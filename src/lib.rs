//! A GitHub flavored Markdown renderer, built for embedding: no mandatory
//! configuration, no I/O of its own, and String-in/String-out conversion.
//!
//! ```
//! assert_eq!(mark::render("I am using **mark**"),
//!            "<p>I am using <strong>mark</strong></p>");
//! ```
//!
//! Conversion runs in three stages.  A scanner walks the source once and
//! produces a token stream; a tree builder assembles the tokens into a
//! document tree and registers link definitions along the way; the tree
//! then formats itself to HTML, with an optional per-node-kind override
//! hook:
//!
//! ```
//! use mark::{Document, NodeType, NodeValue, Options};
//!
//! let mut doc = Document::new("Hello", &Options::default());
//! doc.add_render_fn(NodeType::Paragraph, Box::new(|node| {
//!     match &node.value {
//!         NodeValue::Paragraph(..) => "<p class=\"msg\">Hello</p>".to_string(),
//!         _ => String::new(),
//!     }
//! }));
//! assert_eq!(doc.render(), "<p class=\"msg\">Hello</p>");
//! ```

use std::sync::LazyLock;

use regex::Regex;
use rustc_hash::FxHashMap;

mod grammar;
mod html;
mod lexer;
pub mod nodes;
mod parser;

#[cfg(test)]
mod tests;

pub use nodes::{Alignment, EmphKind, Node, NodeType, NodeValue, RenderFn};
pub use parser::LinkReference;

use nodes::RenderContext;
use parser::LinkMap;

/// Conversion options.  The default enables the GitHub extensions and
/// leaves typographic polish off.
#[derive(Debug, Clone, Copy)]
pub struct Options {
    /// Fenced code blocks, strikethrough, and bare URL linking.
    pub gfm: bool,
    /// Pipe tables.
    pub tables: bool,
    /// Typographic replacement of quotes, dashes, and ellipses, applied
    /// to the source text before scanning.
    pub smartypants: bool,
    /// Replacement of common fractions in the source text with their
    /// glyphs, applied before scanning.
    pub fractions: bool,
}

impl Default for Options {
    fn default() -> Options {
        Options {
            gfm: true,
            tables: true,
            smartypants: false,
            fractions: false,
        }
    }
}

/// A parsed document, ready to format.
///
/// Holds the block sequence, the link definition registry collected while
/// parsing, and any render overrides installed with
/// [`Document::add_render_fn`].
pub struct Document {
    nodes: Vec<Node>,
    links: LinkMap,
    overrides: FxHashMap<NodeType, RenderFn>,
}

impl Document {
    /// Parses `input` into a document tree.
    pub fn new(input: &str, options: &Options) -> Document {
        let source = preprocess(input, options);
        let (nodes, links) = parser::parse_document(&source, options);
        Document {
            nodes,
            links,
            overrides: FxHashMap::default(),
        }
    }

    /// Installs a render hook for one node kind, replacing that kind's
    /// built-in HTML.  The hook sees the node and returns its rendering.
    pub fn add_render_fn(&mut self, node_type: NodeType, f: RenderFn) {
        self.overrides.insert(node_type, f);
    }

    /// Formats the tree to HTML.  Repeated calls return identical output.
    pub fn render(&self) -> String {
        let links = self.links.borrow();
        let ctx = RenderContext {
            links: &links,
            overrides: &self.overrides,
        };
        let out = nodes::render_nodes(&self.nodes, &ctx);
        out.trim_matches('\n').to_string()
    }

    /// The parsed block sequence, for callers that inspect the tree.
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }
}

/// One-call conversion with default options.
pub fn render(input: &str) -> String {
    markdown_to_html(input, &Options::default())
}

/// One-call conversion.
pub fn markdown_to_html(input: &str, options: &Options) -> String {
    Document::new(input, options).render()
}

/// Line endings are normalized and tabs expand to four columns before the
/// scanner ever sees the source.  The typographic transforms, when enabled,
/// run here on the raw text, ahead of the scanner.
fn preprocess(input: &str, options: &Options) -> String {
    let mut source = input
        .replace("\r\n", "\n")
        .replace('\r', "\n")
        .replace('\t', "    ");
    if options.smartypants {
        source = smartypants(&source);
    }
    if options.fractions {
        source = fractions(&source);
    }
    source
}

static FRACTION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(1/2|1/4|3/4|1/3|2/3)\b").unwrap());

/// Replaces common ASCII fractions with their single glyphs.
pub(crate) fn fractions(s: &str) -> String {
    FRACTION
        .replace_all(s, |caps: &regex::Captures<'_>| {
            match &caps[1] {
                "1/2" => "\u{00bd}",
                "1/4" => "\u{00bc}",
                "3/4" => "\u{00be}",
                "1/3" => "\u{2153}",
                "2/3" => "\u{2154}",
                other => return other.to_string(),
            }
            .to_string()
        })
        .into_owned()
}

/// Typographic replacement: curly quotes by position, em and en dashes,
/// and the ellipsis.
pub(crate) fn smartypants(s: &str) -> String {
    let dashed = s
        .replace("---", "\u{2014}")
        .replace("--", "\u{2013}")
        .replace("...", "\u{2026}");
    let mut out = String::with_capacity(dashed.len());
    let mut prev: Option<char> = None;
    for c in dashed.chars() {
        let opening = match prev {
            None => true,
            Some(p) => p.is_whitespace() || p == '(' || p == '[',
        };
        match c {
            '"' => out.push(if opening { '\u{201c}' } else { '\u{201d}' }),
            '\'' => out.push(if opening { '\u{2018}' } else { '\u{2019}' }),
            _ => out.push(c),
        }
        prev = Some(c);
    }
    out
}
