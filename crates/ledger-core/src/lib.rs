pub mod error;
pub mod types;

#[cfg(feature = "schedule")]
pub mod schedule;

#[cfg(feature = "payments")]
pub mod ledger;

#[cfg(feature = "portfolio")]
pub mod portfolio;

pub use error::LedgerError;
pub use types::*;

/// Standard result type for all ledger operations
pub type LedgerResult<T> = Result<T, LedgerError>;
