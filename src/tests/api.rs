use super::*;
use crate::{Document, NodeType, NodeValue};

#[test]
fn document_renders_repeatably() {
    let doc = Document::new("# T\n\ntext", &Options::default());
    assert_eq!(doc.render(), doc.render());
}

#[test]
fn nodes_are_inspectable() {
    let doc = Document::new("para", &Options::default());
    assert_eq!(doc.nodes().len(), 1);
    assert!(matches!(doc.nodes()[0].value, NodeValue::Paragraph(..)));
}

#[test]
fn render_overrides_replace_builtin_html() {
    let mut doc = Document::new("![logo](/l.png)", &Options::default());
    doc.add_render_fn(
        NodeType::Image,
        Box::new(|node| match &node.value {
            NodeValue::Image { src, alt, .. } => format!(
                "<figure><img src=\"{}\"><figcaption>{}</figcaption></figure>",
                src, alt
            ),
            _ => String::new(),
        }),
    );
    assert_eq!(
        doc.render(),
        "<p><figure><img src=\"/l.png\"><figcaption>logo</figcaption></figure></p>"
    );
}

#[test]
fn smartypants() {
    let opts = Options {
        smartypants: true,
        ..Options::default()
    };
    compare_opts(
        "\"quotes\" -- and...",
        "<p>\u{201c}quotes\u{201d} \u{2013} and\u{2026}</p>",
        &opts,
    );
    // the transform runs over the raw text, so code spans are not exempt
    compare_opts("`a -- b`", "<p><code>a \u{2013} b</code></p>", &opts);
}

#[test]
fn fractions() {
    let opts = Options {
        fractions: true,
        ..Options::default()
    };
    compare_opts(
        "1/2 and 3/4 done",
        "<p>\u{00bd} and \u{00be} done</p>",
        &opts,
    );
    compare_opts("v1/2000", "<p>v1/2000</p>", &opts);
}
