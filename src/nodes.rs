//! The document tree built from the token stream, and the HTML formatting
//! rules for each node kind.

use rustc_hash::FxHashMap;

use crate::html;
use crate::parser::LinkReference;

/// A node in the document tree: a tag plus the byte offset of the source
/// text it was built from.
#[derive(Debug, Clone)]
pub struct Node {
    pub pos: usize,
    pub value: NodeValue,
}

impl Node {
    pub fn new(pos: usize, value: NodeValue) -> Node {
        Node { pos, value }
    }

    /// The discriminant-only tag, used to key render overrides.
    pub fn node_type(&self) -> NodeType {
        match self.value {
            NodeValue::Text(..) => NodeType::Text,
            NodeValue::NewLine => NodeType::NewLine,
            NodeValue::Paragraph(..) => NodeType::Paragraph,
            NodeValue::Heading { .. } => NodeType::Heading,
            NodeValue::ThematicBreak => NodeType::ThematicBreak,
            NodeValue::HardBreak => NodeType::HardBreak,
            NodeValue::Emphasis { .. } => NodeType::Emphasis,
            NodeValue::CodeSpan(..) => NodeType::CodeSpan,
            NodeValue::CodeBlock { .. } => NodeType::CodeBlock,
            NodeValue::Link { .. } => NodeType::Link,
            NodeValue::Image { .. } => NodeType::Image,
            NodeValue::ReferenceLink { .. } => NodeType::ReferenceLink,
            NodeValue::ReferenceImage { .. } => NodeType::ReferenceImage,
            NodeValue::LinkDefinition => NodeType::LinkDefinition,
            NodeValue::List { .. } => NodeType::List,
            NodeValue::ListItem(..) => NodeType::ListItem,
            NodeValue::Table(..) => NodeType::Table,
            NodeValue::TableRow(..) => NodeType::TableRow,
            NodeValue::TableCell { .. } => NodeType::TableCell,
            NodeValue::BlockQuote(..) => NodeType::BlockQuote,
            NodeValue::RawHtml(..) => NodeType::RawHtml,
        }
    }
}

/// The content of a node.  The set is closed; hooks customize rendering,
/// not the tree itself.
#[derive(Debug, Clone)]
pub enum NodeValue {
    /// Literal text.  Well-formed inline HTML tags and entities inside it
    /// pass through unescaped.
    Text(String),

    /// A blank-line separator between block constructs.  Any run of these
    /// formats as a single newline.
    NewLine,

    Paragraph(Vec<Node>),

    /// An ATX or setext heading.  The id attribute is derived from the
    /// text.
    Heading { level: u8, text: String },

    ThematicBreak,

    /// A forced line break inside a paragraph (`<br>`).
    HardBreak,

    /// Strong, emphasized, or struck-through spans, with parsed children.
    Emphasis { kind: EmphKind, children: Vec<Node> },

    /// Inline code; the body formats escaped and otherwise verbatim.
    CodeSpan(String),

    /// A fenced or indented code block.  `lang` is the fence info word,
    /// when present.
    CodeBlock { lang: Option<String>, literal: String },

    Link {
        href: String,
        title: Option<String>,
        children: Vec<Node>,
    },

    Image {
        src: String,
        alt: String,
        title: Option<String>,
    },

    /// A reference-style link, resolved against the definition registry at
    /// format time.  `raw` is the original source, kept for the
    /// unresolved case.
    ReferenceLink {
        raw: String,
        text: String,
        key: String,
    },

    ReferenceImage {
        raw: String,
        alt: String,
        key: String,
    },

    /// A consumed link definition line; contributes nothing to output.
    LinkDefinition,

    List {
        ordered: bool,
        depth: usize,
        items: Vec<Node>,
    },

    ListItem(Vec<Node>),

    Table(Vec<Node>),

    TableRow(Vec<Node>),

    TableCell {
        header: bool,
        align: Alignment,
        children: Vec<Node>,
    },

    BlockQuote(Vec<Node>),

    /// A raw HTML block, emitted verbatim.
    RawHtml(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmphKind {
    Strong,
    Em,
    Strike,
}

/// Table cell alignment, from the delimiter row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Alignment {
    #[default]
    None,
    Left,
    Center,
    Right,
}

impl Alignment {
    fn style(self) -> Option<&'static str> {
        match self {
            Alignment::None => None,
            Alignment::Left => Some("left"),
            Alignment::Center => Some("center"),
            Alignment::Right => Some("right"),
        }
    }
}

/// Discriminant tags for [`NodeValue`], used to key render overrides.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeType {
    Text,
    NewLine,
    Paragraph,
    Heading,
    ThematicBreak,
    HardBreak,
    Emphasis,
    CodeSpan,
    CodeBlock,
    Link,
    Image,
    ReferenceLink,
    ReferenceImage,
    LinkDefinition,
    List,
    ListItem,
    Table,
    TableRow,
    TableCell,
    BlockQuote,
    RawHtml,
}

/// A per-node-type render hook.
pub type RenderFn = Box<dyn Fn(&Node) -> String>;

/// Everything the formatter needs besides the tree itself.
pub struct RenderContext<'a> {
    pub links: &'a FxHashMap<String, LinkReference>,
    pub overrides: &'a FxHashMap<NodeType, RenderFn>,
}

/// Formats a node sequence, collapsing runs of separator nodes into a
/// single newline.
pub fn render_nodes(nodes: &[Node], ctx: &RenderContext<'_>) -> String {
    let mut out = String::new();
    let mut last_newline = false;
    for node in nodes {
        if matches!(node.value, NodeValue::NewLine) {
            if last_newline {
                continue;
            }
            last_newline = true;
        } else {
            last_newline = false;
        }
        out.push_str(&render_node(node, ctx));
    }
    out
}

pub fn render_node(node: &Node, ctx: &RenderContext<'_>) -> String {
    if let Some(f) = ctx.overrides.get(&node.node_type()) {
        return f(node);
    }
    match &node.value {
        NodeValue::Text(t) => html::escape_text(t),
        NodeValue::NewLine => "\n".to_string(),
        NodeValue::Paragraph(children) => {
            format!("<p>{}</p>", render_nodes(children, ctx))
        }
        NodeValue::Heading { level, text } => {
            format!(
                "<h{level} id=\"{}\">{}</h{level}>",
                html::heading_id(text),
                html::escape_text(text),
            )
        }
        NodeValue::ThematicBreak => "<hr>".to_string(),
        NodeValue::HardBreak => "<br>".to_string(),
        NodeValue::Emphasis { kind, children } => {
            let tag = match kind {
                EmphKind::Strong => "strong",
                EmphKind::Em => "em",
                EmphKind::Strike => "del",
            };
            format!("<{tag}>{}</{tag}>", render_nodes(children, ctx))
        }
        NodeValue::CodeSpan(body) => format!("<code>{}</code>", html::escape(body)),
        NodeValue::CodeBlock { lang, literal } => match lang {
            Some(lang) => format!(
                "<pre><code class=\"lang-{}\">{}</code></pre>",
                html::escape(lang),
                html::escape(literal),
            ),
            None => format!("<pre><code>{}</code></pre>", html::escape(literal)),
        },
        NodeValue::Link {
            href,
            title,
            children,
        } => {
            let mut out = format!("<a href=\"{}\"", html::escape(href));
            if let Some(title) = title {
                out.push_str(&format!(" title=\"{}\"", html::escape(title)));
            }
            out.push('>');
            out.push_str(&render_nodes(children, ctx));
            out.push_str("</a>");
            out
        }
        NodeValue::Image { src, alt, title } => {
            let mut out = format!(
                "<img src=\"{}\" alt=\"{}\"",
                html::escape(src),
                html::escape(alt),
            );
            if let Some(title) = title {
                out.push_str(&format!(" title=\"{}\"", html::escape(title)));
            }
            out.push('>');
            out
        }
        NodeValue::ReferenceLink { raw, text, key } => match ctx.links.get(key) {
            Some(def) => {
                let mut out = format!("<a href=\"{}\"", html::escape(&def.href));
                if let Some(title) = &def.title {
                    out.push_str(&format!(" title=\"{}\"", html::escape(title)));
                }
                out.push('>');
                out.push_str(&html::escape_text(text));
                out.push_str("</a>");
                out
            }
            None => html::escape_text(raw),
        },
        NodeValue::ReferenceImage { raw, alt, key } => match ctx.links.get(key) {
            Some(def) => {
                let mut out = format!(
                    "<img src=\"{}\" alt=\"{}\"",
                    html::escape(&def.href),
                    html::escape(alt),
                );
                if let Some(title) = &def.title {
                    out.push_str(&format!(" title=\"{}\"", html::escape(title)));
                }
                out.push('>');
                out
            }
            None => html::escape_text(raw),
        },
        NodeValue::LinkDefinition => String::new(),
        NodeValue::List { ordered, items, .. } => {
            let tag = if *ordered { "ol" } else { "ul" };
            format!("<{tag}>{}</{tag}>", render_nodes(items, ctx))
        }
        NodeValue::ListItem(children) => {
            let mut out = String::from("<li>");
            let mut last_newline = false;
            for child in children {
                if matches!(child.value, NodeValue::NewLine) {
                    if last_newline {
                        continue;
                    }
                    last_newline = true;
                } else {
                    last_newline = false;
                }
                if matches!(child.value, NodeValue::List { .. }) {
                    out.push('\n');
                }
                out.push_str(&render_node(child, ctx));
            }
            out.push_str("</li>");
            out
        }
        NodeValue::Table(rows) => {
            let mut out = String::from("<table>");
            let mut body = String::new();
            for row in rows {
                let header = matches!(
                    row.value,
                    NodeValue::TableRow(ref cells)
                        if cells.first().is_some_and(|c| matches!(
                            c.value,
                            NodeValue::TableCell { header: true, .. }
                        ))
                );
                if header {
                    out.push_str("<thead>");
                    out.push_str(&render_node(row, ctx));
                    out.push_str("</thead>");
                } else {
                    body.push_str(&render_node(row, ctx));
                }
            }
            if !body.is_empty() {
                out.push_str("<tbody>");
                out.push_str(&body);
                out.push_str("</tbody>");
            }
            out.push_str("</table>");
            out
        }
        NodeValue::TableRow(cells) => format!("<tr>{}</tr>", render_nodes(cells, ctx)),
        NodeValue::TableCell {
            header,
            align,
            children,
        } => {
            let tag = if *header { "th" } else { "td" };
            match align.style() {
                Some(dir) => format!(
                    "<{tag} style=\"text-align:{dir}\">{}</{tag}>",
                    render_nodes(children, ctx),
                ),
                None => format!("<{tag}>{}</{tag}>", render_nodes(children, ctx)),
            }
        }
        NodeValue::BlockQuote(children) => {
            format!("<blockquote>{}</blockquote>", render_nodes(children, ctx))
        }
        NodeValue::RawHtml(raw) => raw.clone(),
    }
}
