//! Repository Gateway: the create/read/update seam against the remote
//! object repository.
//!
//! Every call is synchronous and blocking; a call either returns a response
//! carrying a status, or fails outright with a [`GatewayError`]. The deposit
//! core never retries — policy lives with the caller.

use std::path::Path;
use std::sync::Arc;

use arkdeposit_core::{AsOf, DatastreamId, Fid, Pid};

use crate::error::GatewayError;

/// HTTP-shaped status returned by repository operations.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct RepoStatus(pub u16);

impl RepoStatus {
    pub const OK: RepoStatus = RepoStatus(200);
    pub const CREATED: RepoStatus = RepoStatus(201);
    pub const NOT_FOUND: RepoStatus = RepoStatus(404);
    pub const CONFLICT: RepoStatus = RepoStatus(409);

    pub fn is_success(self) -> bool {
        (200..300).contains(&self.0)
    }

    pub fn code(self) -> u16 {
        self.0
    }
}

impl core::fmt::Display for RepoStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

/// Outcome of creating one repository object from an encoded object file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateReceipt {
    pub status: RepoStatus,
    pub pid: Option<Pid>,
    pub location: Option<String>,
}

/// Datastream metadata as the repository reports it.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct DatastreamMeta {
    pub status: RepoStatus,
    /// Present on success; the authoritative last-modified timestamp.
    pub last_modified: Option<AsOf>,
}

/// Client seam to the object repository.
///
/// The `precondition` on the update operations is a first-class contract:
/// implementations MUST answer with a non-success status when the stored
/// last-modified timestamp differs from it at the moment of the call. That is
/// the only concurrency control between separate deposit processes.
pub trait RepositoryGateway: Send + Sync {
    /// Ingest one encoded object file, creating one repository object.
    fn create_object(&self, content: &Path) -> Result<CreateReceipt, GatewayError>;

    /// Read the current metadata of a datastream.
    fn get_datastream_meta(
        &self,
        fid: &Fid,
        dsid: &DatastreamId,
    ) -> Result<DatastreamMeta, GatewayError>;

    /// Replace a datastream's content, guarded by the as-of precondition.
    fn update_datastream_content(
        &self,
        fid: &Fid,
        dsid: &DatastreamId,
        precondition: AsOf,
        content: &Path,
    ) -> Result<DatastreamMeta, GatewayError>;

    /// Point a datastream at an external location, guarded by the as-of
    /// precondition. The repository dereferences the location; the pointer
    /// itself is opaque to this client.
    fn update_datastream_location(
        &self,
        fid: &Fid,
        dsid: &DatastreamId,
        precondition: AsOf,
        location: &str,
    ) -> Result<DatastreamMeta, GatewayError>;

    /// Resolve the persistent identifier paired with a FID.
    fn lookup_pid(&self, fid: &Fid) -> Result<Option<Pid>, GatewayError>;

    /// Resolve the repository-native identifier paired with a PID.
    fn lookup_fid(&self, pid: &Pid) -> Result<Option<Fid>, GatewayError>;
}

impl<G> RepositoryGateway for Arc<G>
where
    G: RepositoryGateway + ?Sized,
{
    fn create_object(&self, content: &Path) -> Result<CreateReceipt, GatewayError> {
        (**self).create_object(content)
    }

    fn get_datastream_meta(
        &self,
        fid: &Fid,
        dsid: &DatastreamId,
    ) -> Result<DatastreamMeta, GatewayError> {
        (**self).get_datastream_meta(fid, dsid)
    }

    fn update_datastream_content(
        &self,
        fid: &Fid,
        dsid: &DatastreamId,
        precondition: AsOf,
        content: &Path,
    ) -> Result<DatastreamMeta, GatewayError> {
        (**self).update_datastream_content(fid, dsid, precondition, content)
    }

    fn update_datastream_location(
        &self,
        fid: &Fid,
        dsid: &DatastreamId,
        precondition: AsOf,
        location: &str,
    ) -> Result<DatastreamMeta, GatewayError> {
        (**self).update_datastream_location(fid, dsid, precondition, location)
    }

    fn lookup_pid(&self, fid: &Fid) -> Result<Option<Pid>, GatewayError> {
        (**self).lookup_pid(fid)
    }

    fn lookup_fid(&self, pid: &Pid) -> Result<Option<Fid>, GatewayError> {
        (**self).lookup_fid(pid)
    }
}
