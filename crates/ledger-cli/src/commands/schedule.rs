use chrono::NaiveDate;
use clap::Args;
use rust_decimal::Decimal;
use serde_json::Value;
use std::fs;

use contract_ledger_core::ledger::ContractLedger;
use contract_ledger_core::schedule::{build_schedule, ScheduleInput};
use contract_ledger_core::types::Currency;

use crate::input;

/// Arguments for schedule generation
#[derive(Args)]
pub struct ScheduleArgs {
    /// Path to JSON input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    /// Contract identifier
    #[arg(long)]
    pub contract_id: Option<String>,

    /// Financed principal
    #[arg(long)]
    pub amount: Option<Decimal>,

    /// Interest rate per period as a decimal (0.01 = 1% monthly)
    #[arg(long)]
    pub rate: Option<Decimal>,

    /// Number of installments
    #[arg(long)]
    pub term: Option<u32>,

    /// Day of month payments fall due (1-31)
    #[arg(long)]
    pub payment_day: Option<u32>,

    /// First payment date (YYYY-MM-DD)
    #[arg(long)]
    pub first_date: Option<NaiveDate>,
}

/// Arguments for materialising a new ledger file
#[derive(Args)]
pub struct OpenArgs {
    #[command(flatten)]
    pub schedule: ScheduleArgs,

    /// Where to write the ledger JSON
    #[arg(long)]
    pub out: String,
}

fn schedule_input(args: &ScheduleArgs) -> Result<ScheduleInput, Box<dyn std::error::Error>> {
    if let Some(ref path) = args.input {
        return input::file::read_json(path);
    }
    if let Some(data) = input::stdin::read_stdin()? {
        return Ok(serde_json::from_value(data)?);
    }

    Ok(ScheduleInput {
        contract_id: args
            .contract_id
            .clone()
            .unwrap_or_else(|| "unnamed".into()),
        financed_amount: args.amount.ok_or("--amount is required (or provide --input)")?,
        periodic_rate: args.rate.ok_or("--rate is required (or provide --input)")?,
        term_periods: args.term.ok_or("--term is required (or provide --input)")?,
        payment_day: args
            .payment_day
            .ok_or("--payment-day is required (or provide --input)")?,
        first_payment_date: args
            .first_date
            .ok_or("--first-date is required (or provide --input)")?,
        currency: Currency::default(),
    })
}

pub fn run_schedule(args: ScheduleArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let input = schedule_input(&args)?;
    let result = build_schedule(&input)?;
    Ok(serde_json::to_value(result)?)
}

pub fn run_open(args: OpenArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let input = schedule_input(&args.schedule)?;
    let ledger = ContractLedger::open(&input)?;

    fs::write(&args.out, serde_json::to_string_pretty(&ledger)?)
        .map_err(|e| format!("Failed to write '{}': {}", args.out, e))?;

    Ok(serde_json::json!({
        "result": {
            "ledger_file": args.out,
            "contract_id": ledger.contract.id,
            "level_payment": ledger.contract.level_payment,
            "installments": ledger.installments.len(),
            "first_due": ledger.installments.first().map(|i| i.due_date),
            "last_due": ledger.installments.last().map(|i| i.due_date),
        }
    }))
}
