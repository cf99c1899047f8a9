//! Cabwalk CLI - Command-line utility for harvesting payload files from
//! Windows Update packages.

mod cli;
mod commands;
mod error;
mod output;
mod progress;

use anyhow::Result;
use clap::Parser;

fn main() -> Result<()> {
    let cli = cli::Cli::parse();

    init_tracing(cli.verbose, cli.quiet);

    let formatter = output::create_formatter(cli.json, cli.verbose, cli.quiet);

    match &cli.command {
        cli::Commands::Harvest(args) => commands::harvest::execute(args, &*formatter),
        cli::Commands::Fetch(args) => commands::fetch::execute(args, &*formatter, cli.verbose),
        cli::Commands::Crawl(args) => {
            commands::crawl::execute(args, &*formatter, cli.verbose, cli.quiet)
        }
        cli::Commands::Completion(args) => {
            commands::completion::execute(args.shell);
            Ok(())
        }
    }
}

/// Initializes the log subscriber; an explicit `RUST_LOG` always wins over
/// the verbosity flags.
fn init_tracing(verbose: bool, quiet: bool) {
    let default_level = if quiet {
        "error"
    } else if verbose {
        "debug"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();
}
