mod commands;
mod input;
mod output;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::process;
use tracing_subscriber::EnvFilter;

use commands::loan::{CompareExtraArgs, PayoffArgs};

/// Mortgage payoff calculations
#[derive(Parser)]
#[command(
    name = "mortcalc",
    version,
    about = "Mortgage payoff calculations",
    long_about = "Derives the base monthly payment of a fixed-rate mortgage from the \
                  original loan, then how many payments remain on the current balance \
                  and the payoff date, with or without an extra monthly payment."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, default_value = "json", global = true)]
    output: OutputFormat,

    /// Log recomputation details to stderr (RUST_LOG overrides)
    #[arg(long, short, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Base payment, remaining payments and payoff date for one loan
    Payoff(PayoffArgs),
    /// Payoff date for several extra monthly payments side by side
    CompareExtra(CompareExtraArgs),
    /// Print the default loan inputs
    Defaults,
    /// Print version information
    Version,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Csv,
    Minimal,
}

fn init_tracing(verbose: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if verbose {
            EnvFilter::new("mortgage_calc_core=debug,mortcalc=debug")
        } else {
            EnvFilter::new("warn")
        }
    });
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result: Result<serde_json::Value, Box<dyn std::error::Error>> = match cli.command {
        Commands::Payoff(args) => commands::loan::run_payoff(args),
        Commands::CompareExtra(args) => commands::loan::run_compare_extra(args),
        Commands::Defaults => commands::loan::run_defaults(),
        Commands::Version => {
            println!("mortcalc {}", env!("CARGO_PKG_VERSION"));
            return;
        }
    };

    match result {
        Ok(value) => {
            output::format_output(&cli.output, &value);
            process::exit(0);
        }
        Err(e) => {
            eprintln!("{}: {}", "error".red().bold(), e);
            process::exit(1);
        }
    }
}
