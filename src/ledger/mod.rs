//! Day ledger
//!
//! The ordered collection of tracked days plus the current-day cursor.

mod day_ledger;

pub use day_ledger::DayLedger;

use chrono::NaiveDate;
use thiserror::Error;

/// Rejected ledger operations. A rejected operation leaves the ledger unchanged.
#[derive(Debug, Error, PartialEq)]
pub enum LedgerError {
    #[error("Cannot delete the last remaining day")]
    LastDay,

    #[error("Day index {index} out of range (ledger holds {len} days)")]
    DayOutOfRange { index: usize, len: usize },

    #[error("Analysis failed: {0}")]
    AnalysisFailed(String),

    #[error("No day can follow {0}")]
    DateOverflow(NaiveDate),
}

/// Result type for ledger operations
pub type LedgerResult<T> = Result<T, LedgerError>;
