use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::LedgerError;
use crate::ledger::{derive_status, ContractLedger};
use crate::schedule::Installment;
use crate::types::{InstallmentStatus, Money, PaymentMethod};
use crate::LedgerResult;

/// Caller-supplied details for one payment event
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentInput {
    pub amount: Money,
    pub method: PaymentMethod,
    pub payment_date: NaiveDate,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub recorded_by: String,
}

/// Immutable record of a payment applied against one installment.
/// Never mutated or deleted; the audit trail and the source of truth
/// for amounts paid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Payment {
    pub installment_sequence: u32,
    pub amount: Money,
    pub method: PaymentMethod,
    pub payment_date: NaiveDate,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub recorded_by: String,
}

/// Result of a successful posting: the recorded payment and a snapshot
/// of the installment after the update
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostingReceipt {
    pub installment: Installment,
    pub payment: Payment,
}

impl ContractLedger {
    /// Apply a payment to one installment.
    ///
    /// The payment record is appended and the installment's paid amount is
    /// recomputed as the sum of its payment records, inside the same call,
    /// so `paid_amount == sum(payments)` holds after every posting.
    ///
    /// Postings against paid or waived installments are rejected, as are
    /// amounts exceeding the installment's outstanding balance; a payment
    /// never spans installments, so callers split oversized amounts.
    pub fn post_payment(
        &mut self,
        sequence: u32,
        input: PaymentInput,
        as_of: NaiveDate,
    ) -> LedgerResult<PostingReceipt> {
        if input.amount <= Decimal::ZERO {
            return Err(LedgerError::InvalidInput {
                field: "amount".into(),
                reason: "Payment amount must be positive".into(),
            });
        }

        let contract_id = self.contract.id.clone();
        let idx = self
            .installments
            .iter()
            .position(|i| i.sequence == sequence)
            .ok_or_else(|| {
                LedgerError::NotFound(format!(
                    "Installment {sequence} on contract {contract_id}"
                ))
            })?;

        let inst = &self.installments[idx];
        if inst.status.is_terminal() {
            return Err(LedgerError::BusinessRule(format!(
                "Installment {sequence} is {} and accepts no further payments",
                match inst.status {
                    InstallmentStatus::Waived => "waived",
                    _ => "already paid in full",
                }
            )));
        }

        let outstanding = inst.outstanding();
        if input.amount > outstanding {
            return Err(LedgerError::BusinessRule(format!(
                "Payment of {} exceeds outstanding balance {} on installment {sequence}",
                input.amount, outstanding
            )));
        }

        let payment = Payment {
            installment_sequence: sequence,
            amount: input.amount.round_dp(2),
            method: input.method,
            payment_date: input.payment_date,
            reference: input.reference,
            notes: input.notes,
            recorded_by: input.recorded_by,
        };
        self.payments.push(payment.clone());

        // Refresh the row from the payment records, not by incrementing
        let paid: Money = self
            .payments
            .iter()
            .filter(|p| p.installment_sequence == sequence)
            .map(|p| p.amount)
            .sum();

        let inst = &mut self.installments[idx];
        inst.paid_amount = paid;
        inst.paid_at = Some(payment.payment_date);
        inst.status = derive_status(paid, inst.total, inst.due_date, as_of, inst.status);

        Ok(PostingReceipt {
            installment: inst.clone(),
            payment,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schedule::ScheduleInput;
    use crate::types::{Currency, InstallmentStatus};
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn test_ledger() -> ContractLedger {
        ContractLedger::open(&ScheduleInput {
            contract_id: "CT-3001".into(),
            financed_amount: dec!(12000),
            periodic_rate: Decimal::ZERO,
            term_periods: 12,
            payment_day: 1,
            first_payment_date: d(2025, 1, 1),
            currency: Currency::USD,
        })
        .unwrap()
    }

    fn payment(amount: Decimal) -> PaymentInput {
        PaymentInput {
            amount,
            method: PaymentMethod::Transfer,
            payment_date: d(2025, 1, 2),
            reference: None,
            notes: None,
            recorded_by: "tester".into(),
        }
    }

    #[test]
    fn test_full_payment_settles_installment() {
        let mut ledger = test_ledger();
        let receipt = ledger.post_payment(1, payment(dec!(1000)), d(2025, 1, 2)).unwrap();

        assert_eq!(receipt.installment.status, InstallmentStatus::Paid);
        assert_eq!(receipt.installment.paid_amount, dec!(1000));
        assert_eq!(receipt.payment.amount, dec!(1000));
        assert_eq!(ledger.payments.len(), 1);
    }

    #[test]
    fn test_partial_then_full() {
        let mut ledger = test_ledger();
        let as_of = d(2025, 1, 2);

        let r1 = ledger.post_payment(1, payment(dec!(400)), as_of).unwrap();
        assert_eq!(r1.installment.status, InstallmentStatus::Partial);
        assert_eq!(r1.installment.paid_amount, dec!(400));

        let r2 = ledger.post_payment(1, payment(dec!(600)), as_of).unwrap();
        assert_eq!(r2.installment.status, InstallmentStatus::Paid);
        assert_eq!(r2.installment.paid_amount, dec!(1000));
    }

    #[test]
    fn test_paid_amount_equals_sum_of_payments() {
        let mut ledger = test_ledger();
        let as_of = d(2025, 1, 2);

        for amount in [dec!(150), dec!(275.50), dec!(74.50), dec!(200)] {
            ledger.post_payment(2, payment(amount), as_of).unwrap();
        }

        let recorded: Decimal = ledger.payments_for(2).map(|p| p.amount).sum();
        assert_eq!(ledger.installment(2).unwrap().paid_amount, recorded);
        assert_eq!(recorded, dec!(700));
    }

    #[test]
    fn test_overdue_installment_accepts_payment() {
        let mut ledger = test_ledger();
        let as_of = d(2025, 3, 15);
        ledger.refresh_statuses(as_of);
        assert_eq!(ledger.installment(1).unwrap().status, InstallmentStatus::Overdue);

        let receipt = ledger.post_payment(1, payment(dec!(300)), as_of).unwrap();
        assert_eq!(receipt.installment.status, InstallmentStatus::Partial);
    }

    #[test]
    fn test_rejects_non_positive_amount() {
        let mut ledger = test_ledger();
        let err = ledger.post_payment(1, payment(Decimal::ZERO), d(2025, 1, 2));
        assert!(matches!(err, Err(LedgerError::InvalidInput { .. })));
    }

    #[test]
    fn test_rejects_unknown_installment() {
        let mut ledger = test_ledger();
        let err = ledger.post_payment(99, payment(dec!(100)), d(2025, 1, 2));
        assert!(matches!(err, Err(LedgerError::NotFound(_))));
        assert!(ledger.payments.is_empty());
    }

    #[test]
    fn test_rejects_overpayment() {
        let mut ledger = test_ledger();
        let as_of = d(2025, 1, 2);
        ledger.post_payment(1, payment(dec!(900)), as_of).unwrap();

        let err = ledger.post_payment(1, payment(dec!(200)), as_of);
        assert!(matches!(err, Err(LedgerError::BusinessRule(_))));

        // Rejected posting leaves no trace
        assert_eq!(ledger.installment(1).unwrap().paid_amount, dec!(900));
        assert_eq!(ledger.payments_for(1).count(), 1);
    }

    #[test]
    fn test_rejects_posting_to_paid_installment() {
        let mut ledger = test_ledger();
        let as_of = d(2025, 1, 2);
        ledger.post_payment(1, payment(dec!(1000)), as_of).unwrap();

        let err = ledger.post_payment(1, payment(dec!(50)), as_of);
        assert!(matches!(err, Err(LedgerError::BusinessRule(_))));
    }

    #[test]
    fn test_rejects_posting_to_waived_installment() {
        let mut ledger = test_ledger();
        ledger.waive(4).unwrap();

        let err = ledger.post_payment(4, payment(dec!(100)), d(2025, 1, 2));
        assert!(matches!(err, Err(LedgerError::BusinessRule(_))));
    }

    #[test]
    fn test_payments_are_independent_across_installments() {
        let mut ledger = test_ledger();
        let as_of = d(2025, 1, 2);

        ledger.post_payment(1, payment(dec!(1000)), as_of).unwrap();
        ledger.post_payment(2, payment(dec!(250)), as_of).unwrap();

        assert_eq!(ledger.installment(1).unwrap().status, InstallmentStatus::Paid);
        assert_eq!(ledger.installment(2).unwrap().status, InstallmentStatus::Partial);
        assert_eq!(ledger.installment(3).unwrap().paid_amount, Decimal::ZERO);
    }
}
