//! Quoll Command-Line Interface
//!
//! Reads a JSON-serialised Quoll module, derives its functor variants,
//! hoists its measurements and writes the rewritten module back out.

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

use clap::{Parser, Subcommand};
use console::style;
use tracing_subscriber::EnvFilter;

mod commands;

use commands::{render, translate, version};

/// Quoll - functor synthesis and measurement batching for quantum modules
#[derive(Parser)]
#[command(name = "quoll")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Translate a module into runtime-ready form
    Translate {
        /// Input syntax tree (JSON)
        #[arg(short, long)]
        input: String,

        /// Output file (defaults to <stem>_translated.json)
        #[arg(short, long)]
        output: Option<String>,

        /// Translation options (YAML)
        #[arg(short, long, env = "QUOLL_CONFIG")]
        config: Option<String>,

        /// Pretty-print the output JSON
        #[arg(long)]
        pretty: bool,

        /// Also print the translated module as source text
        #[arg(long)]
        show: bool,
    },

    /// Print a serialised module as source text
    Render {
        /// Input syntax tree (JSON)
        #[arg(short, long)]
        input: String,
    },

    /// Show version information
    Version,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging
    let filter = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .with_target(false)
        .init();

    let result = match cli.command {
        Commands::Translate {
            input,
            output,
            config,
            pretty,
            show,
        } => translate::execute(&input, output.as_deref(), config.as_deref(), pretty, show),

        Commands::Render { input } => render::execute(&input),

        Commands::Version => {
            version::execute();
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("{} {:#}", style("Error:").red().bold(), e);
        std::process::exit(1);
    }

    Ok(())
}
