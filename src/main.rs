//! panelplot CLI
//!
//! Usage:
//!   panelplot [OPTIONS] [FILE]
//!
//! Options:
//!   -s, --style <FILE>  Style file layered over the defaults (TOML format)
//!       --no-tight      Keep the configured margins instead of trimming
//!       --pad <INCHES>  Whitespace kept around the content by tight layout
//!   -d, --debug         Log the resolved geometry
//!   -h, --help          Print help

use std::fs;
use std::io::{self, IsTerminal, Read};
use std::path::PathBuf;

use clap::Parser;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use panelplot::{render_with_config, LayoutConfig, RenderConfig, RenderError, Style};

#[derive(Parser)]
#[command(name = "panelplot")]
#[command(about = "Lay out multi-panel figures from TOML descriptions and render them as SVG")]
struct Cli {
    /// Figure description file (reads from stdin if not provided)
    input: Option<PathBuf>,

    /// Style file layered over the defaults (TOML format)
    #[arg(short, long)]
    style: Option<PathBuf>,

    /// Keep the configured margins instead of trimming them to the content
    #[arg(long)]
    no_tight: bool,

    /// Whitespace kept around the content by tight layout, in inches
    #[arg(long, value_name = "INCHES")]
    pad: Option<f64>,

    /// Log the resolved geometry of every axes
    #[arg(short, long)]
    debug: bool,
}

fn init_tracing(debug: bool) {
    let filter = if debug {
        EnvFilter::new("panelplot=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(filter)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.debug);

    // If no input file and stdin is a terminal (interactive), show intro help
    if cli.input.is_none() && io::stdin().is_terminal() {
        print_intro();
        return;
    }

    let style = match &cli.style {
        Some(path) => match Style::from_file(path) {
            Ok(s) => s,
            Err(e) => {
                eprintln!("Error loading style '{}': {}", path.display(), e);
                std::process::exit(1);
            }
        },
        None => Style::default(),
    };

    let (source, filename) = match &cli.input {
        Some(path) => match fs::read_to_string(path) {
            Ok(content) => (content, path.display().to_string()),
            Err(e) => {
                eprintln!("Error reading file '{}': {}", path.display(), e);
                std::process::exit(1);
            }
        },
        None => {
            let mut buffer = String::new();
            match io::stdin().read_to_string(&mut buffer) {
                Ok(_) => (buffer, "<stdin>".to_string()),
                Err(e) => {
                    eprintln!("Error reading from stdin: {}", e);
                    std::process::exit(1);
                }
            }
        }
    };

    let mut layout = LayoutConfig::default().with_tight(!cli.no_tight);
    if let Some(pad) = cli.pad {
        layout = layout.with_tight_pad(pad);
    }
    let config = RenderConfig::new()
        .with_layout(layout)
        .with_style(style)
        .with_debug(cli.debug);

    info!("rendering {}", filename);
    match render_with_config(&source, config) {
        Ok(svg) => {
            println!("{}", svg);
        }
        Err(RenderError::Description(e)) => {
            eprint!("{}", e.format(&source, &filename));
            std::process::exit(1);
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}

fn print_intro() {
    println!(
        r#"panelplot - multi-panel figure layout

USAGE:
    panelplot [OPTIONS] [FILE]
    cat figure.toml | panelplot > figure.svg

OPTIONS:
    -s, --style <FILE>   Style overrides (TOML file)
        --no-tight       Keep the configured margins
        --pad <INCHES>   Whitespace kept by tight layout
    -d, --debug          Log the resolved geometry
    -h, --help           Print help

QUICK START:
    printf '[grid]\nncols = 2\n[[axes]]\n[[axes]]\ncol = 1\n' | panelplot > out.svg

This creates a figure with two side-by-side axes."#
    );
}
