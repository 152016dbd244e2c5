use super::*;

#[test]
fn bare_tables() {
    compare(
        "Id | Name\n--- | ---\n1 | foo",
        concat!(
            "<table>",
            "<thead><tr><th>Id</th><th>Name</th></tr></thead>",
            "<tbody><tr><td>1</td><td>foo</td></tr></tbody>",
            "</table>"
        ),
    );
}

#[test]
fn leading_pipe_tables_with_alignment() {
    compare(
        "| Id | Name |\n| :--- | ---: |\n| 1 | foo |",
        concat!(
            "<table>",
            "<thead><tr>",
            "<th style=\"text-align:left\">Id</th>",
            "<th style=\"text-align:right\">Name</th>",
            "</tr></thead>",
            "<tbody><tr>",
            "<td style=\"text-align:left\">1</td>",
            "<td style=\"text-align:right\">foo</td>",
            "</tr></tbody>",
            "</table>"
        ),
    );
}

#[test]
fn centered_columns() {
    compare(
        "a | b\n:---: | ---\nx | y",
        concat!(
            "<table>",
            "<thead><tr><th style=\"text-align:center\">a</th><th>b</th></tr></thead>",
            "<tbody><tr><td style=\"text-align:center\">x</td><td>y</td></tr></tbody>",
            "</table>"
        ),
    );
}

#[test]
fn header_only_tables_have_no_body() {
    compare(
        "a | b\n--- | ---",
        "<table><thead><tr><th>a</th><th>b</th></tr></thead></table>",
    );
}

#[test]
fn short_rows_pad_and_long_rows_truncate() {
    compare(
        "a | b\n--- | ---\n1 |\nx | y | z",
        concat!(
            "<table>",
            "<thead><tr><th>a</th><th>b</th></tr></thead>",
            "<tbody>",
            "<tr><td>1</td><td></td></tr>",
            "<tr><td>x</td><td>y</td></tr>",
            "</tbody>",
            "</table>"
        ),
    );
}

#[test]
fn inline_markup_inside_cells() {
    compare(
        "a | b\n--- | ---\n*i* | `c`",
        concat!(
            "<table>",
            "<thead><tr><th>a</th><th>b</th></tr></thead>",
            "<tbody><tr><td><em>i</em></td><td><code>c</code></td></tr></tbody>",
            "</table>"
        ),
    );
}

#[test]
fn tables_can_be_disabled() {
    let plain = Options {
        tables: false,
        ..Options::default()
    };
    compare_opts(
        "foo | bar\n--- | ---",
        "<p>foo | bar\n--- | ---</p>",
        &plain,
    );
}
