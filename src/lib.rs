//! Occupancy, revenue and performance-tier metrics for short-term-rental
//! reservation ledgers.
//!
//! The metric modules (`util`, `period`, `aggregate`, `ratio`, `tier`,
//! `cost`, `compare`, `reports`) are pure functions over an immutable
//! [`types::Snapshot`]; `loader` and `output` handle files.

pub mod aggregate;
pub mod compare;
pub mod config;
pub mod cost;
pub mod error;
pub mod filter;
pub mod loader;
pub mod logging;
pub mod output;
pub mod period;
pub mod ratio;
pub mod reports;
pub mod tier;
pub mod types;
pub mod util;

pub use error::{ReportError, Result};
pub use filter::{FilterCriteria, FilterOptions};
pub use period::Period;
pub use reports::{Dashboard, ReportContext};
pub use types::Snapshot;
