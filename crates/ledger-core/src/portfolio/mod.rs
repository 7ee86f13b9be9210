//! Read-only projections over an installment ledger.

pub mod metrics;

pub use metrics::{portfolio_metrics, NextPending, PortfolioMetrics};
