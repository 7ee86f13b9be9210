use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal::MathematicalOps;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::error::LedgerError;
use crate::schedule::calendar;
use crate::types::{with_metadata, ComputationOutput, Currency, InstallmentStatus, Money, Rate};
use crate::LedgerResult;

/// Smallest representable money difference (one minor currency unit)
const MINOR_UNIT: Decimal = dec!(0.01);

/// Contract terms for schedule generation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleInput {
    pub contract_id: String,
    /// Financed principal after any down payment
    pub financed_amount: Money,
    /// Interest rate per payment period (0.01 = 1% monthly)
    pub periodic_rate: Rate,
    /// Number of installments
    pub term_periods: u32,
    /// Day of month each installment falls due (1-31, clamped to short months)
    pub payment_day: u32,
    pub first_payment_date: NaiveDate,
    #[serde(default)]
    pub currency: Currency,
}

/// One scheduled obligation within a contract's amortisation ledger
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Installment {
    /// 1-based position within the schedule, order-significant
    pub sequence: u32,
    pub due_date: NaiveDate,
    pub principal: Money,
    pub interest: Money,
    pub total: Money,
    /// Contract balance outstanding after this installment is paid
    pub remaining_balance: Money,
    pub status: InstallmentStatus,
    pub paid_amount: Money,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub paid_at: Option<NaiveDate>,
}

impl Installment {
    /// Amount still owed on this installment.
    pub fn outstanding(&self) -> Money {
        (self.total - self.paid_amount).max(Decimal::ZERO)
    }
}

/// Full generated schedule for one contract
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleOutput {
    pub contract_id: String,
    pub level_payment: Money,
    pub total_interest: Money,
    pub currency: Currency,
    pub installments: Vec<Installment>,
}

/// Build a level-payment (French) amortisation schedule.
///
/// Pure and deterministic: identical inputs always produce an identical
/// installment sequence. The running balance is kept in two-decimal-place
/// arithmetic and the final installment repays it outright, so principal
/// telescopes exactly to the financed amount and the final balance is zero.
pub fn build_schedule(input: &ScheduleInput) -> LedgerResult<ComputationOutput<ScheduleOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    if input.financed_amount <= Decimal::ZERO {
        return Err(LedgerError::InvalidInput {
            field: "financed_amount".into(),
            reason: "Financed amount must be positive".into(),
        });
    }
    if input.term_periods == 0 {
        return Err(LedgerError::InvalidInput {
            field: "term_periods".into(),
            reason: "Term must be at least 1 period".into(),
        });
    }
    if input.periodic_rate < Decimal::ZERO {
        return Err(LedgerError::InvalidInput {
            field: "periodic_rate".into(),
            reason: "Periodic rate cannot be negative".into(),
        });
    }
    if input.payment_day == 0 || input.payment_day > 31 {
        return Err(LedgerError::InvalidInput {
            field: "payment_day".into(),
            reason: "Payment day must be between 1 and 31".into(),
        });
    }

    let financed = input.financed_amount.round_dp(2);
    if financed != input.financed_amount {
        warnings.push(format!(
            "financed_amount {} rounded to {} (2 decimal places)",
            input.financed_amount, financed
        ));
    }

    let term = Decimal::from(input.term_periods);
    let level_payment = if input.periodic_rate.is_zero() {
        // Straight-line: no interest, equal principal per period
        (financed / term).round_dp(2)
    } else {
        // Annuity: P * r(1+r)^n / ((1+r)^n - 1)
        let factor = (Decimal::ONE + input.periodic_rate).powi(input.term_periods as i64);
        (financed * input.periodic_rate * factor / (factor - Decimal::ONE)).round_dp(2)
    };

    let mut installments = Vec::with_capacity(input.term_periods as usize);
    let mut balance = financed;
    let mut total_interest = Decimal::ZERO;

    for sequence in 1..=input.term_periods {
        let interest = (balance * input.periodic_rate).round_dp(2);

        // Final period repays the remaining balance outright, absorbing
        // accumulated rounding residue
        let principal = if sequence == input.term_periods {
            balance
        } else {
            (level_payment - interest).max(Decimal::ZERO).min(balance)
        };

        balance -= principal;
        total_interest += interest;

        let total = principal + interest;
        if sequence == input.term_periods && (total - level_payment).abs() > MINOR_UNIT {
            warnings.push(format!(
                "Final installment total {total} differs from level payment {level_payment}; rounding residue absorbed in final period"
            ));
        }

        installments.push(Installment {
            sequence,
            due_date: calendar::due_date(
                input.first_payment_date,
                sequence - 1,
                input.payment_day,
            )?,
            principal,
            interest,
            total,
            remaining_balance: balance,
            status: InstallmentStatus::Pending,
            paid_amount: Decimal::ZERO,
            paid_at: None,
        });
    }

    let output = ScheduleOutput {
        contract_id: input.contract_id.clone(),
        level_payment,
        total_interest,
        currency: input.currency.clone(),
        installments,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Level-Payment Amortisation Schedule",
        warnings,
        elapsed,
        output,
    ))
}
