pub mod ledger;
pub mod schedule;
