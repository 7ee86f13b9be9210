use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::types::{InstallmentStatus, Money};

/// Classify an installment from its paid amount, total due, and due date.
///
/// `Waived` is sticky and never reclassified. An installment is overdue
/// only once its due date has passed; the due date itself still counts
/// as pending. Partial payments stay `Partial` regardless of due date.
pub fn derive_status(
    paid: Money,
    total: Money,
    due_date: NaiveDate,
    as_of: NaiveDate,
    current: InstallmentStatus,
) -> InstallmentStatus {
    if current == InstallmentStatus::Waived {
        return InstallmentStatus::Waived;
    }
    if paid >= total {
        return InstallmentStatus::Paid;
    }
    if paid > Decimal::ZERO {
        return InstallmentStatus::Partial;
    }
    if due_date < as_of {
        InstallmentStatus::Overdue
    } else {
        InstallmentStatus::Pending
    }
}
