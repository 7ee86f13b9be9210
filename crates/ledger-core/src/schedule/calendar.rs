use chrono::{Datelike, NaiveDate};

use crate::error::LedgerError;
use crate::LedgerResult;

/// Number of days in the given month.
pub fn last_day_of_month(year: i32, month: u32) -> LedgerResult<u32> {
    let (next_year, next_month) = if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    };

    NaiveDate::from_ymd_opt(next_year, next_month, 1)
        .and_then(|d| d.pred_opt())
        .map(|d| d.day())
        .ok_or_else(|| LedgerError::DateError(format!("Invalid month: {year}-{month:02}")))
}

/// Due date for the installment `periods_ahead` whole months after the first
/// payment date, with the day-of-month overridden to `payment_day`.
///
/// When `payment_day` exceeds the length of the target month the day is
/// clamped to the month's last day (day 31 in February yields Feb 28/29);
/// the date never rolls into the following month.
pub fn due_date(
    first_payment: NaiveDate,
    periods_ahead: u32,
    payment_day: u32,
) -> LedgerResult<NaiveDate> {
    let months = first_payment.year() * 12 + first_payment.month0() as i32 + periods_ahead as i32;
    let year = months.div_euclid(12);
    let month = months.rem_euclid(12) as u32 + 1;

    let day = payment_day.min(last_day_of_month(year, month)?);

    NaiveDate::from_ymd_opt(year, month, day).ok_or_else(|| {
        LedgerError::DateError(format!("Invalid due date: {year}-{month:02}-{day:02}"))
    })
}
