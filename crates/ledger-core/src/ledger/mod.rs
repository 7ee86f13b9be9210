//! Installment ledger for a single seller-financing contract.
//!
//! The ledger is materialised once, at contract creation, from the
//! amortisation engine. After that only two things touch it: payment
//! postings (append a `Payment`, refresh one row) and the read-time
//! status sweep. Payment records are the source of truth for amounts
//! paid; `Installment::paid_amount` is refreshed from them on every
//! posting rather than incremented in place.

pub mod posting;
pub mod status;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::LedgerError;
use crate::schedule::{build_schedule, Installment, ScheduleInput};
use crate::types::{Currency, InstallmentStatus, Money, Rate};
use crate::LedgerResult;

pub use posting::{Payment, PaymentInput, PostingReceipt};
pub use status::derive_status;

/// Immutable terms of a seller-financed purchase agreement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Contract {
    pub id: String,
    pub financed_amount: Money,
    pub periodic_rate: Rate,
    pub term_periods: u32,
    pub payment_day: u32,
    pub first_payment_date: NaiveDate,
    pub level_payment: Money,
    pub currency: Currency,
}

/// A contract plus its full installment schedule and payment history
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContractLedger {
    pub contract: Contract,
    pub installments: Vec<Installment>,
    pub payments: Vec<Payment>,
}

impl ContractLedger {
    /// Materialise the ledger for a new contract: run the amortisation
    /// engine once and batch all installment rows together. No rows exist
    /// until the whole schedule validates.
    pub fn open(input: &ScheduleInput) -> LedgerResult<ContractLedger> {
        let schedule = build_schedule(input)?.result;

        Ok(ContractLedger {
            contract: Contract {
                id: input.contract_id.clone(),
                financed_amount: input.financed_amount,
                periodic_rate: input.periodic_rate,
                term_periods: input.term_periods,
                payment_day: input.payment_day,
                first_payment_date: input.first_payment_date,
                level_payment: schedule.level_payment,
                currency: input.currency.clone(),
            },
            installments: schedule.installments,
            payments: Vec::new(),
        })
    }

    /// Look up one installment by sequence number.
    pub fn installment(&self, sequence: u32) -> Option<&Installment> {
        self.installments.iter().find(|i| i.sequence == sequence)
    }

    /// Payment history for one installment, in posting order.
    pub fn payments_for(&self, sequence: u32) -> impl Iterator<Item = &Payment> {
        self.payments
            .iter()
            .filter(move |p| p.installment_sequence == sequence)
    }

    /// Opportunistic pending -> overdue sweep. Status is a read-time
    /// classification; call this whenever the ledger is loaded.
    pub fn refresh_statuses(&mut self, as_of: NaiveDate) {
        for inst in &mut self.installments {
            inst.status = derive_status(
                inst.paid_amount,
                inst.total,
                inst.due_date,
                as_of,
                inst.status,
            );
        }
    }

    /// Administrative waiver. Terminal: a waived installment accepts no
    /// further payments and is excluded from pending/overdue aggregation.
    pub fn waive(&mut self, sequence: u32) -> LedgerResult<&Installment> {
        let contract_id = self.contract.id.clone();
        let inst = self
            .installments
            .iter_mut()
            .find(|i| i.sequence == sequence)
            .ok_or_else(|| {
                LedgerError::NotFound(format!(
                    "Installment {sequence} on contract {contract_id}"
                ))
            })?;

        if inst.status == InstallmentStatus::Paid {
            return Err(LedgerError::BusinessRule(format!(
                "Installment {sequence} is already paid and cannot be waived"
            )));
        }

        inst.status = InstallmentStatus::Waived;
        Ok(inst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    fn standard_input() -> ScheduleInput {
        ScheduleInput {
            contract_id: "CT-2001".into(),
            financed_amount: dec!(60000),
            periodic_rate: dec!(0.015),
            term_periods: 6,
            payment_day: 10,
            first_payment_date: NaiveDate::from_ymd_opt(2025, 3, 10).unwrap(),
            currency: Currency::USD,
        }
    }

    #[test]
    fn test_open_materialises_full_schedule() {
        let ledger = ContractLedger::open(&standard_input()).unwrap();
        assert_eq!(ledger.installments.len(), 6);
        assert_eq!(ledger.payments.len(), 0);
        assert_eq!(ledger.contract.id, "CT-2001");
        assert!(ledger.contract.level_payment > Decimal::ZERO);
        assert!(ledger
            .installments
            .iter()
            .all(|i| i.status == InstallmentStatus::Pending));
    }

    #[test]
    fn test_open_rejects_invalid_terms_with_no_rows() {
        let mut input = standard_input();
        input.term_periods = 0;
        assert!(ContractLedger::open(&input).is_err());
    }

    #[test]
    fn test_refresh_marks_past_due_rows_overdue() {
        let mut ledger = ContractLedger::open(&standard_input()).unwrap();

        // Between the 2nd and 3rd due dates
        ledger.refresh_statuses(NaiveDate::from_ymd_opt(2025, 5, 1).unwrap());

        assert_eq!(ledger.installments[0].status, InstallmentStatus::Overdue);
        assert_eq!(ledger.installments[1].status, InstallmentStatus::Overdue);
        assert_eq!(ledger.installments[2].status, InstallmentStatus::Pending);
    }

    #[test]
    fn test_due_date_itself_is_not_overdue() {
        let mut ledger = ContractLedger::open(&standard_input()).unwrap();
        ledger.refresh_statuses(NaiveDate::from_ymd_opt(2025, 3, 10).unwrap());
        assert_eq!(ledger.installments[0].status, InstallmentStatus::Pending);
    }

    #[test]
    fn test_waive_is_terminal() {
        let mut ledger = ContractLedger::open(&standard_input()).unwrap();
        ledger.waive(3).unwrap();
        assert_eq!(ledger.installment(3).unwrap().status, InstallmentStatus::Waived);

        // A later sweep must not resurrect it
        ledger.refresh_statuses(NaiveDate::from_ymd_opt(2026, 1, 1).unwrap());
        assert_eq!(ledger.installment(3).unwrap().status, InstallmentStatus::Waived);
    }

    #[test]
    fn test_waive_unknown_sequence() {
        let mut ledger = ContractLedger::open(&standard_input()).unwrap();
        assert!(matches!(ledger.waive(99), Err(LedgerError::NotFound(_))));
    }

    #[test]
    fn test_ledger_round_trips_through_json() {
        let ledger = ContractLedger::open(&standard_input()).unwrap();
        let json = serde_json::to_string(&ledger).unwrap();
        let restored: ContractLedger = serde_json::from_str(&json).unwrap();
        assert_eq!(ledger, restored);
    }
}
