//! `arkdeposit-core` — deposit domain foundation building blocks.
//!
//! This crate contains **pure domain** primitives (no infrastructure concerns):
//! the identifier model and the deposit error taxonomy.

pub mod error;
pub mod id;

pub use error::{DepositError, DepositResult};
pub use id::{AsOf, DatastreamId, Fid, Pid};
