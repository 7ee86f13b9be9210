use chrono::{NaiveDate, Utc};
use clap::Args;
use rust_decimal::Decimal;
use serde_json::Value;
use std::fs;

use contract_ledger_core::ledger::{ContractLedger, PaymentInput};
use contract_ledger_core::portfolio::portfolio_metrics;
use contract_ledger_core::types::PaymentMethod;

use crate::input;

/// Arguments for posting a payment
#[derive(Args)]
pub struct PostArgs {
    /// Path to the ledger JSON file
    #[arg(long)]
    pub ledger: String,

    /// Installment sequence number to pay against
    #[arg(long)]
    pub sequence: u32,

    /// Payment amount
    #[arg(long)]
    pub amount: Decimal,

    /// Payment method: transfer, cash, check, electronic, other
    #[arg(long, default_value = "transfer")]
    pub method: String,

    /// Payment date (YYYY-MM-DD, defaults to today)
    #[arg(long)]
    pub date: Option<NaiveDate>,

    /// Bank or transaction reference
    #[arg(long)]
    pub reference: Option<String>,

    /// Free-form notes
    #[arg(long)]
    pub notes: Option<String>,

    /// Who recorded the payment
    #[arg(long, default_value = "cli")]
    pub recorded_by: String,

    /// Date used for status classification (defaults to today)
    #[arg(long)]
    pub as_of: Option<NaiveDate>,

    /// Validate and print the receipt without rewriting the ledger file
    #[arg(long)]
    pub dry_run: bool,
}

/// Arguments for portfolio metrics
#[derive(Args)]
pub struct MetricsArgs {
    /// Path to the ledger JSON file
    #[arg(long)]
    pub ledger: String,

    /// Date used for overdue classification (defaults to today)
    #[arg(long)]
    pub as_of: Option<NaiveDate>,
}

fn parse_method(raw: &str) -> Result<PaymentMethod, Box<dyn std::error::Error>> {
    match raw.to_ascii_lowercase().as_str() {
        "transfer" => Ok(PaymentMethod::Transfer),
        "cash" => Ok(PaymentMethod::Cash),
        "check" | "cheque" => Ok(PaymentMethod::Check),
        "electronic" => Ok(PaymentMethod::Electronic),
        "other" => Ok(PaymentMethod::Other),
        _ => Err(format!(
            "Unknown payment method '{raw}' (expected transfer, cash, check, electronic, or other)"
        )
        .into()),
    }
}

fn today() -> NaiveDate {
    Utc::now().date_naive()
}

pub fn run_post(args: PostArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let mut ledger: ContractLedger = input::file::read_json(&args.ledger)?;

    let as_of = args.as_of.unwrap_or_else(today);
    ledger.refresh_statuses(as_of);

    let receipt = ledger.post_payment(
        args.sequence,
        PaymentInput {
            amount: args.amount,
            method: parse_method(&args.method)?,
            payment_date: args.date.unwrap_or_else(today),
            reference: args.reference,
            notes: args.notes,
            recorded_by: args.recorded_by,
        },
        as_of,
    )?;

    if !args.dry_run {
        fs::write(&args.ledger, serde_json::to_string_pretty(&ledger)?)
            .map_err(|e| format!("Failed to write '{}': {}", args.ledger, e))?;
    }

    Ok(serde_json::json!({
        "result": receipt,
        "dry_run": args.dry_run,
    }))
}

pub fn run_metrics(args: MetricsArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let ledger: ContractLedger = input::file::read_json(&args.ledger)?;
    let as_of = args.as_of.unwrap_or_else(today);

    let metrics = portfolio_metrics(&ledger.installments, as_of);
    Ok(serde_json::to_value(metrics)?)
}
