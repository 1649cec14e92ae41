//! `arkdeposit-deposit` — staged-file classification and deposit execution.
//!
//! The classifier turns a staging directory into typed operations; the
//! executor drives them against the Repository Gateway and feeds confirmed
//! identifiers back into the SIP model via the completion protocol.

pub mod classify;
pub mod executor;

pub use classify::{DepositOp, UpdatePayload, scan_staging_dir};
pub use executor::{DepositReport, complete_fid, run_deposit};
