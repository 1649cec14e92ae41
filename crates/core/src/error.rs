//! Deposit error model.
//!
//! Every failure in the core surfaces as a single [`DepositError`] so callers
//! see one consistent "deposit failed" signal. No partial-success code is
//! returned: identifier completions already applied to the SIP model before a
//! failing operation remain in place and are not rolled back.

use thiserror::Error;

use crate::id::Fid;

/// Result type used across the deposit core.
pub type DepositResult<T> = Result<T, DepositError>;

/// Top-level deposit failure.
#[derive(Debug, Error)]
pub enum DepositError {
    /// Malformed staged-file content or name-derived data. Raised before any
    /// repository call for the offending file.
    #[error("classification failed: {0}")]
    Classification(String),

    /// A gateway call returned a non-success status, including
    /// optimistic-concurrency precondition failures. Never silently retried.
    #[error("unexpected repository status [{status}] while {context}")]
    UnexpectedRepositoryStatus { status: u16, context: String },

    /// A collection's FID or PID could not be resolved in the repository.
    #[error("unknown collection: {0}")]
    UnknownCollection(String),

    /// The parent-collection graph re-entered a FID on the current branch.
    /// Carries the full path for diagnostics.
    #[error("collection cycle detected: {}", format_cycle(path))]
    CollectionCycle { path: Vec<Fid> },

    /// An identifier failed to parse.
    #[error("invalid identifier: {0}")]
    InvalidId(String),

    /// Transport-level gateway failure, preserving the original cause.
    #[error("gateway failure while {context}")]
    Gateway {
        context: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

fn format_cycle(path: &[Fid]) -> String {
    path.iter()
        .map(Fid::as_str)
        .collect::<Vec<_>>()
        .join(" -> ")
}

impl DepositError {
    pub fn classification(msg: impl Into<String>) -> Self {
        Self::Classification(msg.into())
    }

    pub fn unexpected_status(status: u16, context: impl Into<String>) -> Self {
        Self::UnexpectedRepositoryStatus {
            status,
            context: context.into(),
        }
    }

    pub fn unknown_collection(msg: impl Into<String>) -> Self {
        Self::UnknownCollection(msg.into())
    }

    pub fn invalid_id(msg: impl Into<String>) -> Self {
        Self::InvalidId(msg.into())
    }

    pub fn gateway(
        context: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Gateway {
            context: context.into(),
            source: Box::new(source),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cycle_error_reports_full_path() {
        let path: Vec<Fid> = ["lat:a", "lat:b", "lat:c", "lat:a"]
            .iter()
            .map(|s| s.parse().unwrap())
            .collect();
        let err = DepositError::CollectionCycle { path };
        assert_eq!(
            err.to_string(),
            "collection cycle detected: lat:a -> lat:b -> lat:c -> lat:a"
        );
    }

    #[test]
    fn unexpected_status_carries_status_and_context() {
        let err = DepositError::unexpected_status(409, "updating datastream lat:foo/OBJ");
        assert_eq!(
            err.to_string(),
            "unexpected repository status [409] while updating datastream lat:foo/OBJ"
        );
    }
}
