mod cli;
mod commands;
mod config;
mod error;
mod logging;

use crate::cli::{Cli, Commands};
use crate::error::Result;
use clap::Parser;
use tracing::{debug, error, info};

fn main() {
    if let Err(e) = run_app() {
        error!("command failed: {e}");
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

fn run_app() -> Result<()> {
    let cli = Cli::parse();
    logging::setup_logging(cli.verbose, cli.quiet, cli.log_file.as_deref())?;

    info!("molsel v{} starting up", env!("CARGO_PKG_VERSION"));
    debug!("parsed CLI arguments: {:?}", &cli);

    let config = config::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Info(args) => commands::info::run(args),
        Commands::Select(args) => commands::select::run(args, &config),
        Commands::Filter(args) => commands::filter::run(args, &config),
        Commands::Mutate(args) => commands::mutate::run(args, &config),
        Commands::Sequence(args) => commands::sequence::run(args),
        Commands::Append(args) => commands::append::run(args, &config),
        Commands::Transform(args) => commands::transform::run(args),
    }
}
