mod commands;
mod input;
mod output;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::process;

use commands::accountant::{AccrueArgs, AllocatePaymentArgs, WritedownArgs};
use commands::leverage::EstimateInvestmentArgs;
use commands::pool::SimulateArgs;

/// Deterministic tranched-credit calculations
#[derive(Parser)]
#[command(
    name = "tranche",
    version,
    about = "Deterministic tranched-credit calculations",
    long_about = "A CLI for the tranched credit engine: interest accrual, payment \
                  waterfalls, write-downs, senior investment sizing, and full pool \
                  lifecycle simulation. All arithmetic is decimal; all timestamps \
                  are injected epoch seconds."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, default_value = "json", global = true)]
    output: OutputFormat,
}

#[derive(Subcommand)]
enum Commands {
    /// Accrue interest and principal on a credit line up to a timestamp
    Accrue(AccrueArgs),
    /// Split a payment across the interest -> principal -> balance waterfall
    AllocatePayment(AllocatePaymentArgs),
    /// Compute the write-down percent and amount for a delinquent line
    Writedown(WritedownArgs),
    /// Replay a JSON event timeline against a tranched pool
    Simulate(SimulateArgs),
    /// Size a senior investment from committed junior capital
    EstimateInvestment(EstimateInvestmentArgs),
    /// Print version information
    Version,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Minimal,
}

fn main() {
    let cli = Cli::parse();

    let result: Result<serde_json::Value, Box<dyn std::error::Error>> = match cli.command {
        Commands::Accrue(args) => commands::accountant::run_accrue(args),
        Commands::AllocatePayment(args) => commands::accountant::run_allocate_payment(args),
        Commands::Writedown(args) => commands::accountant::run_writedown(args),
        Commands::Simulate(args) => commands::pool::run_simulate(args),
        Commands::EstimateInvestment(args) => commands::leverage::run_estimate_investment(args),
        Commands::Version => {
            println!("tranche {}", env!("CARGO_PKG_VERSION"));
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
