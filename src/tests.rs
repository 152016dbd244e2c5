use crate::{markdown_to_html, Options};

mod api;
mod code;
mod core;
mod links;
mod table;

#[track_caller]
fn compare(input: &str, expected: &str) {
    compare_opts(input, expected, &Options::default());
}

#[track_caller]
fn compare_opts(input: &str, expected: &str, options: &Options) {
    let html = markdown_to_html(input, options);
    if html != expected {
        println!("Got:");
        println!("==============================");
        println!("{}", html);
        println!("==============================");
        println!();
        println!("Expected:");
        println!("==============================");
        println!("{}", expected);
        println!("==============================");
        println!();
    }
    pretty_assertions::assert_eq!(html, expected);
}
