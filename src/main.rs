//! The `mark` binary: Markdown in, HTML out.

use std::error::Error;
use std::fs;
use std::io::{self, Read, Write};
use std::path::PathBuf;
use std::process;

use clap::Parser;

use mark::Options;

#[derive(Debug, Parser)]
#[command(name = "mark", version, about = "A GitHub flavored Markdown renderer")]
struct Cli {
    /// The Markdown file to render; or standard input if none passed.
    #[arg(value_name = "FILE")]
    file: Option<PathBuf>,

    /// Write output to FILE instead of standard output.
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Disable the GitHub extensions (fenced code, strikethrough, bare
    /// URL links).
    #[arg(long)]
    no_gfm: bool,

    /// Disable pipe tables.
    #[arg(long)]
    no_tables: bool,

    /// Replace straight quotes, dashes, and ellipses typographically.
    #[arg(long)]
    smartypants: bool,

    /// Replace common fractions with their single glyphs.
    #[arg(long)]
    fractions: bool,
}

fn main() {
    env_logger::init();
    if let Err(e) = run() {
        eprintln!("mark: {}", e);
        process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    let input = match &cli.file {
        Some(path) => fs::read_to_string(path)?,
        None => {
            let mut buf = String::new();
            io::stdin().read_to_string(&mut buf)?;
            buf
        }
    };

    let options = Options {
        gfm: !cli.no_gfm,
        tables: !cli.no_tables,
        smartypants: cli.smartypants,
        fractions: cli.fractions,
    };
    log::debug!("rendering {} bytes of input", input.len());
    let html = mark::markdown_to_html(&input, &options);

    match &cli.output {
        Some(path) => fs::write(path, html.as_bytes())?,
        None => {
            let stdout = io::stdout();
            let mut out = stdout.lock();
            out.write_all(html.as_bytes())?;
            out.write_all(b"\n")?;
        }
    }
    Ok(())
}
