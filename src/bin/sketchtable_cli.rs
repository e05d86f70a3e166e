//! CLI tool for sketchtable - renders a grid JSON file as SVG or PNG
//!
//! Usage:
//!   sketchtable_cli                                   # Sample table, SVG to stdout
//!   sketchtable_cli <grid.json>                       # SVG to stdout
//!   sketchtable_cli <grid.json> -o out.png            # Format from extension
//!   sketchtable_cli <grid.json> --style style.json --seed 42
//!
//! Set `RUST_LOG=sketchtable=debug` for render diagnostics.

#![allow(clippy::exit)]
#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::indexing_slicing)]

use std::env;
use std::fs;
use std::io::{self, Write};
use std::path::Path;

use rand::rngs::StdRng;
use rand::SeedableRng;
use sketchtable::{Grid, StyleConfig, TableEditor};
use tracing_subscriber::EnvFilter;

const USAGE: &str =
    "Usage: sketchtable_cli [grid.json] [-o output.svg|output.png] [--style style.json] [--seed N]";

#[derive(Default)]
struct Args {
    grid_path: Option<String>,
    output_path: Option<String>,
    style_path: Option<String>,
    seed: Option<u64>,
}

fn fail(message: impl std::fmt::Display) -> ! {
    eprintln!("{message}");
    std::process::exit(1);
}

fn parse_args() -> Args {
    let mut args = Args::default();
    let mut iter = env::args().skip(1);
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "-o" | "--output" => args.output_path = iter.next(),
            "--style" => args.style_path = iter.next(),
            "--seed" => {
                let value = iter.next().unwrap_or_else(|| fail(USAGE));
                args.seed = Some(
                    value
                        .parse()
                        .unwrap_or_else(|e| fail(format!("Invalid seed {value}: {e}"))),
                );
            }
            "-h" | "--help" => {
                println!("{USAGE}");
                std::process::exit(0);
            }
            _ if arg.starts_with('-') => fail(USAGE),
            _ if args.grid_path.is_none() => args.grid_path = Some(arg),
            _ => fail(USAGE),
        }
    }
    args
}

fn read(path: &str) -> String {
    fs::read_to_string(path).unwrap_or_else(|e| fail(format!("Error reading {path}: {e}")))
}

fn render(editor: &TableEditor, rng: &mut dyn rand::RngCore, png: bool) -> Vec<u8> {
    if png {
        editor
            .export_png(rng)
            .unwrap_or_else(|e| fail(format!("Error rendering PNG: {e}")))
    } else {
        editor.export_svg(rng).into_bytes()
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("sketchtable=info")),
        )
        .with_writer(io::stderr)
        .init();

    let args = parse_args();

    let grid = match &args.grid_path {
        Some(path) => Grid::from_json(&read(path))
            .unwrap_or_else(|e| fail(format!("Error parsing {path}: {e}"))),
        None => Grid::sample(),
    };
    let mut editor = TableEditor::with_grid(grid);

    if let Some(path) = &args.style_path {
        let style: StyleConfig = serde_json::from_str(&read(path))
            .unwrap_or_else(|e| fail(format!("Error parsing {path}: {e}")));
        editor.set_style(style);
    }

    let png = args
        .output_path
        .as_deref()
        .and_then(|p| Path::new(p).extension())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("png"));

    let bytes = match args.seed {
        Some(seed) => render(&editor, &mut StdRng::seed_from_u64(seed), png),
        None => render(&editor, &mut rand::thread_rng(), png),
    };

    match &args.output_path {
        Some(path) => {
            if let Err(e) = fs::write(path, &bytes) {
                fail(format!("Error writing {path}: {e}"));
            }
            eprintln!("Written: {path}");
        }
        None => {
            io::stdout().write_all(&bytes).unwrap();
            if !png {
                println!();
            }
        }
    }
}
