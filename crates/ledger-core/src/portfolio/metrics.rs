use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::ledger::derive_status;
use crate::schedule::Installment;
use crate::types::{with_metadata, ComputationOutput, InstallmentStatus, Money, Rate};

/// The earliest installment still awaiting payment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NextPending {
    pub sequence: u32,
    pub due_date: NaiveDate,
    pub outstanding: Money,
}

/// Portfolio-level aggregates over one ledger. Derived on every read,
/// never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortfolioMetrics {
    /// Sum of totals due across non-waived installments
    pub total_scheduled: Money,
    /// All money received, including against later-waived installments
    pub total_paid: Money,
    /// Outstanding across all unsettled installments, overdue included
    pub total_pending: Money,
    pub overdue_amount: Money,
    pub overdue_count: u32,
    pub paid_count: u32,
    pub waived_count: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_pending: Option<NextPending>,
    /// total_paid / total_scheduled, 4 decimal places
    pub collection_rate: Rate,
}

/// Fold an installment list into portfolio metrics as of a given date.
///
/// Statuses are re-derived from paid amounts and due dates rather than
/// trusting stored values, so a stale ledger still aggregates correctly;
/// only the waived flag is taken as stored.
pub fn portfolio_metrics(
    installments: &[Installment],
    as_of: NaiveDate,
) -> ComputationOutput<PortfolioMetrics> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    let mut total_scheduled = Decimal::ZERO;
    let mut total_paid = Decimal::ZERO;
    let mut total_pending = Decimal::ZERO;
    let mut overdue_amount = Decimal::ZERO;
    let mut overdue_count = 0u32;
    let mut paid_count = 0u32;
    let mut waived_count = 0u32;
    let mut next_pending: Option<NextPending> = None;

    for inst in installments {
        total_paid += inst.paid_amount;

        let status = derive_status(
            inst.paid_amount,
            inst.total,
            inst.due_date,
            as_of,
            inst.status,
        );

        if status == InstallmentStatus::Waived {
            waived_count += 1;
            continue;
        }

        total_scheduled += inst.total;

        if status == InstallmentStatus::Paid {
            paid_count += 1;
            continue;
        }

        let outstanding = inst.outstanding();
        total_pending += outstanding;

        if status == InstallmentStatus::Overdue {
            overdue_amount += outstanding;
            overdue_count += 1;
        }

        if next_pending.is_none() {
            next_pending = Some(NextPending {
                sequence: inst.sequence,
                due_date: inst.due_date,
                outstanding,
            });
        }
    }

    let collection_rate = if total_scheduled.is_zero() {
        if !installments.is_empty() {
            warnings.push("No collectable installments; collection rate reported as 0".into());
        }
        Decimal::ZERO
    } else {
        (total_paid / total_scheduled).round_dp(4)
    };

    let metrics = PortfolioMetrics {
        total_scheduled,
        total_paid,
        total_pending,
        overdue_amount,
        overdue_count,
        paid_count,
        waived_count,
        next_pending,
        collection_rate,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    with_metadata("Installment Ledger Aggregation", warnings, elapsed, metrics)
}
