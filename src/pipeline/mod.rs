//! Pipeline building blocks and the harvest entry point.
//!
//! - `retry`: bounded retry with fixed delay
//! - `diff`: live archive index vs. known-weeks ledger
//! - `run`: full harvest orchestration

pub mod diff;
pub mod retry;
pub mod run;

pub use diff::{DiffResult, diff_against_ledger};
pub use retry::RetryPolicy;
pub use run::{RunSummary, run_harvest};
