use super::*;

#[test]
fn indented_blocks() {
    compare("\tfoo\n\tbar", "<pre><code>foo\nbar</code></pre>");
    compare("\tfoo\nbar", "<pre><code>foo\n</code></pre><p>bar</p>");
    compare("    foo", "<pre><code>foo</code></pre>");
}

#[test]
fn indented_code_cannot_interrupt_a_paragraph() {
    compare("p\n    code", "<p>p\n    code</p>");
}

#[test]
fn fenced_blocks() {
    compare("```js\nvar a;\n```", "<pre><code class=\"lang-js\">var a;</code></pre>");
    compare("~~~\nvar b;~~~", "<pre><code>var b;</code></pre>");
    compare("```\nunterminated", "<pre><code>unterminated</code></pre>");
}

#[test]
fn code_is_escaped_strictly() {
    compare("\t<div>", "<pre><code>&lt;div&gt;</code></pre>");
    compare("`<div>`", "<p><code>&lt;div&gt;</code></p>");
}

#[test]
fn code_spans() {
    compare("use `bool` here", "<p>use <code>bool</code> here</p>");
    compare("``a`b``", "<p><code>a`b</code></p>");
    compare("`open", "<p>`open</p>");
}
