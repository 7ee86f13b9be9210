mod commands;
mod input;
mod output;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::process;

use commands::ledger::{MetricsArgs, PostArgs};
use commands::schedule::{OpenArgs, ScheduleArgs};

/// Seller-financing installment ledger tools
#[derive(Parser)]
#[command(
    name = "cledger",
    version,
    about = "Seller-financing amortisation schedules and installment ledgers",
    long_about = "Generate level-payment amortisation schedules, materialise \
                  installment ledgers, post payments against them, and derive \
                  portfolio metrics. All money maths uses decimal precision; \
                  ledgers are plain JSON files."
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
    /// Generate an amortisation schedule without persisting it
    Schedule(ScheduleArgs),
    /// Materialise a ledger file for a new contract
    Open(OpenArgs),
    /// Post a payment against one installment in a ledger file
    Post(PostArgs),
    /// Portfolio metrics over a ledger file
    Metrics(MetricsArgs),
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

fn main() {
    let cli = Cli::parse();

    let result: Result<serde_json::Value, Box<dyn std::error::Error>> = match cli.command {
        Commands::Schedule(args) => commands::schedule::run_schedule(args),
        Commands::Open(args) => commands::schedule::run_open(args),
        Commands::Post(args) => commands::ledger::run_post(args),
        Commands::Metrics(args) => commands::ledger::run_metrics(args),
        Commands::Version => {
            println!("cledger {}", env!("CARGO_PKG_VERSION"));
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
