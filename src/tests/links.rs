use super::*;

#[test]
fn inline_links() {
    compare(
        "[text](link \"title\")",
        "<p><a href=\"link\" title=\"title\">text</a></p>",
    );
    compare("[foo](/bar)", "<p><a href=\"/bar\">foo</a></p>");
    compare("Link: [not really", "<p>Link: [not really</p>");
}

#[test]
fn images() {
    compare("![name](url)", "<p><img src=\"url\" alt=\"name\"></p>");
    compare(
        "![a](b \"c\")",
        "<p><img src=\"b\" alt=\"a\" title=\"c\"></p>",
    );
}

#[test]
fn auto_links() {
    compare(
        "<http://foo.com>",
        "<p><a href=\"http://foo.com\">http://foo.com</a></p>",
    );
    compare(
        "<mail@example.com>",
        "<p><a href=\"mailto:mail@example.com\">mail@example.com</a></p>",
    );
    compare("Link: <not really", "<p>Link: &lt;not really</p>");
}

#[test]
fn bare_urls_require_gfm() {
    compare(
        "http://localhost:3000",
        "<p><a href=\"http://localhost:3000\">http://localhost:3000</a></p>",
    );
    let plain = Options {
        gfm: false,
        ..Options::default()
    };
    compare_opts(
        "see http://localhost:3000",
        "<p>see http://localhost:3000</p>",
        &plain,
    );
}

#[test]
fn reference_links_resolve_in_any_order() {
    compare(
        "[foo]\n\n[foo]: /url \"t\"",
        "<p><a href=\"/url\" title=\"t\">foo</a></p>",
    );
    compare(
        "[foo]: /url \"t\"\n\n[foo]",
        "<p><a href=\"/url\" title=\"t\">foo</a></p>",
    );
    compare(
        "[bar][foo]\n\n[foo]: /url",
        "<p><a href=\"/url\">bar</a></p>",
    );
}

#[test]
fn reference_labels_fold_case() {
    compare("[Foo]\n\n[FOO]: /url", "<p><a href=\"/url\">Foo</a></p>");
}

#[test]
fn first_definition_wins() {
    compare(
        "[r]\n\n[r]: /first\n[r]: /second",
        "<p><a href=\"/first\">r</a></p>",
    );
}

#[test]
fn unresolved_references_stay_literal() {
    compare("[text][nope]", "<p>[text][nope]</p>");
    compare("[alone]", "<p>[alone]</p>");
}

#[test]
fn reference_images() {
    compare(
        "![logo]\n\n[logo]: /img.png",
        "<p><img src=\"/img.png\" alt=\"logo\"></p>",
    );
}
