use clap::{Parser, Subcommand};
use std::error::Error;
use trainingdata::convert::{convert, ConvertCommand};
use trainingdata::info::{info, InfoCommand};

#[derive(Parser)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Converts PGN games annotated with engine evaluations into training chunks
    Convert(ConvertCommand),
    /// Prints the records of a training chunk
    Info(InfoCommand),
}

fn main() -> Result<(), Box<dyn Error>> {
    let args = Cli::parse();

    let verbose = matches!(&args.command, Commands::Convert(cmd) if cmd.verbose);
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(log_filter(verbose)),
    )
    .init();

    match args.command {
        Commands::Convert(cmd) => convert(cmd),
        Commands::Info(cmd) => info(cmd),
    }
}

/// Default filter when `RUST_LOG` is not set. Verbose mode only opens up this crate's logs.
fn log_filter(verbose: bool) -> &'static str {
    if verbose {
        "warn,trainingdata=debug"
    } else {
        "warn"
    }
}
