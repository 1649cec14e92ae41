//! Deposit execution: drive classified operations against the repository and
//! reconcile the resulting identifiers into the SIP model.

use serde::Serialize;

use arkdeposit_core::{AsOf, DatastreamId, DepositError, DepositResult, Fid};
use arkdeposit_gateway::{DatastreamMeta, RepositoryGateway};
use arkdeposit_sip::{DepositEntity, Sip};

use crate::classify::{DepositOp, UpdatePayload};

/// Summary of one executed deposit pass.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DepositReport {
    /// Objects created in the repository.
    pub created: usize,
    /// Datastreams revised.
    pub updated: usize,
    /// Identifier completions applied to the SIP model.
    pub completed: usize,
}

/// Apply every classified operation, fail-fast.
///
/// The first error aborts the pass; identifier completions already applied to
/// the SIP model stay in place (no rollback) so the caller can inspect the
/// model and decide whether to resume or discard the run.
pub fn run_deposit<G: RepositoryGateway>(
    gateway: &G,
    sip: &mut Sip,
    ops: Vec<DepositOp>,
) -> DepositResult<DepositReport> {
    let mut report = DepositReport::default();
    for op in ops {
        match op {
            DepositOp::CreateObject { fid, dsid, path } => {
                let receipt = gateway.create_object(&path)?;
                if !receipt.status.is_success() {
                    return Err(DepositError::unexpected_status(
                        receipt.status.code(),
                        format!("creating object {fid}"),
                    ));
                }
                // Re-read the datastream: the repository's own last-modified
                // timestamp is the authoritative completion state.
                let meta = gateway.get_datastream_meta(&fid, &dsid)?;
                let as_of =
                    success_timestamp(meta, || format!("verifying datastream {fid}/{dsid}"))?;
                tracing::info!(
                    fid = %fid, dsid = %dsid, pid = ?receipt.pid,
                    location = ?receipt.location, as_of = %as_of,
                    "created repository object"
                );
                if complete_fid(sip, &fid, &dsid, as_of) {
                    report.completed += 1;
                }
                report.created += 1;
            }
            DepositOp::UpdateDatastream {
                fid,
                dsid,
                as_of,
                payload,
            } => {
                let meta = match &payload {
                    UpdatePayload::Content(path) => {
                        gateway.update_datastream_content(&fid, &dsid, as_of, path)?
                    }
                    UpdatePayload::Location(location) => {
                        gateway.update_datastream_location(&fid, &dsid, as_of, location)?
                    }
                };
                let confirmed =
                    success_timestamp(meta, || format!("updating datastream {fid}/{dsid}"))?;
                tracing::info!(
                    fid = %fid, dsid = %dsid, as_of = %confirmed,
                    "updated repository datastream"
                );
                if dsid.is_identity_defining() && complete_fid(sip, &fid, &dsid, confirmed) {
                    report.completed += 1;
                }
                report.updated += 1;
            }
        }
    }
    Ok(report)
}

fn success_timestamp(
    meta: DatastreamMeta,
    context: impl FnOnce() -> String,
) -> DepositResult<AsOf> {
    if !meta.status.is_success() {
        return Err(DepositError::unexpected_status(meta.status.code(), context()));
    }
    meta.last_modified
        .ok_or_else(|| DepositError::unexpected_status(meta.status.code(), context()))
}

/// Completion protocol: record a confirmed repository write on the one entity
/// it belongs to.
///
/// Returns whether a target matched. A non-match is informational, not an
/// error: the datastream may belong to an object outside this SIP's concern.
pub fn complete_fid(sip: &mut Sip, fid: &Fid, dsid: &DatastreamId, as_of: AsOf) -> bool {
    match sip.find_completion_target(fid) {
        Some(target) => {
            target.set_fid(fid.clone());
            target.set_fid_stream(dsid.clone());
            target.set_fid_as_of(as_of);
            tracing::debug!(
                uri = %target.uri(), fid = %fid, dsid = %dsid, as_of = %as_of,
                "datastream completed"
            );
            true
        }
        None => {
            tracing::debug!(
                fid = %fid, dsid = %dsid,
                "datastream does not belong to this deposit"
            );
            false
        }
    }
}
