//! Amortisation schedule generation.
//!
//! The engine is a pure function: given contract terms it materialises the
//! full installment ledger in one pass. All maths uses `rust_decimal::Decimal`
//! at two decimal places so principal telescopes exactly to zero.

pub mod calendar;
pub mod engine;

pub use engine::{build_schedule, Installment, ScheduleInput, ScheduleOutput};
