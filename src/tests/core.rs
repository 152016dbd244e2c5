use super::*;

#[test]
fn paragraphs() {
    compare("foobar", "<p>foobar</p>");
    compare("  foo bar", "<p>  foo bar</p>");
    compare("foo|bar", "<p>foo|bar</p>");
    compare("1\n\n2", "<p>1</p>\n<p>2</p>");
    compare("one\ntwo", "<p>one\ntwo</p>");
}

#[test]
fn hard_breaks() {
    compare("foo  \nbar", "<p>foo<br>bar</p>");
    compare("1  \n2  \n3", "<p>1<br>2<br>3</p>");
    compare("foo\\\nbar", "<p>foo<br>bar</p>");
}

#[test]
fn thematic_breaks() {
    compare("foo\n****\nbar", "<p>foo</p>\n<hr><p>bar</p>");
    compare("foo\n___", "<p>foo</p>\n<hr>");
    compare("- - -", "<hr>");
}

#[test]
fn backslash_escapes() {
    compare(r"\*foo\*", "<p>*foo*</p>");
    compare(r"\[not a link\]", "<p>[not a link]</p>");
}

#[test]
fn prose_quotes_become_entities() {
    compare(
        "He said \"hi\" and 'bye'",
        "<p>He said &quot;hi&quot; and &#39;bye&#39;</p>",
    );
}

#[test]
fn block_quotes() {
    compare("> foo\n> bar", "<blockquote><p>foo\nbar</p></blockquote>");
    compare(
        "> # head\n> text",
        "<blockquote><h1 id=\"head\">head</h1>\n<p>text</p></blockquote>",
    );
    compare(
        "> **strong** stuff",
        "<blockquote><p><strong>strong</strong> stuff</p></blockquote>",
    );
}

#[test]
fn blank_edges_are_trimmed() {
    compare("\n\nfoo\n\n", "<p>foo</p>");
    compare("", "");
}

#[test]
fn carriage_returns_are_normalized() {
    compare("1\r\n\r\n2", "<p>1</p>\n<p>2</p>");
}

#[test]
fn rendering_is_deterministic() {
    let input = "# T\n\n- a\n- b\n\n[r]\n\n[r]: /url";
    let first = markdown_to_html(input, &Options::default());
    let second = markdown_to_html(input, &Options::default());
    assert_eq!(first, second);
}
