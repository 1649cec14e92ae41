//! Gateway infrastructure errors.

use thiserror::Error;

use arkdeposit_core::DepositError;

/// Transport-level gateway failure.
///
/// These are **infrastructure** failures (I/O, poisoned state), as opposed to
/// the repository answering with a non-success status — status codes travel
/// inside the response types so the caller can apply its own policy.
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("gateway I/O failure: {0}")]
    Io(#[from] std::io::Error),

    #[error("gateway state poisoned: {0}")]
    Poisoned(String),
}

impl From<GatewayError> for DepositError {
    fn from(err: GatewayError) -> Self {
        DepositError::gateway("talking to the repository", err)
    }
}
