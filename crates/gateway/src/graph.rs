//! Graph Query Gateway: relationship queries against the repository's
//! resource index.

use std::sync::Arc;

use arkdeposit_core::Fid;

use crate::error::GatewayError;
use crate::repository::RepoStatus;

/// Relationship predicate understood by the resource index.
///
/// The deposit core only ever asks "which collections is this object a
/// constituent of", but the predicate travels explicitly so the query shape
/// stays honest.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Relation {
    IsConstituentOf,
}

impl core::fmt::Display for Relation {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Relation::IsConstituentOf => write!(f, "isConstituentOf"),
        }
    }
}

/// Result of one relationship query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelatedSet {
    pub status: RepoStatus,
    pub fids: Vec<Fid>,
}

/// Client seam to the repository's relationship index.
pub trait GraphGateway: Send + Sync {
    /// All objects related to `subject` under `predicate`.
    fn related(&self, subject: &Fid, predicate: Relation) -> Result<RelatedSet, GatewayError>;
}

impl<G> GraphGateway for Arc<G>
where
    G: GraphGateway + ?Sized,
{
    fn related(&self, subject: &Fid, predicate: Relation) -> Result<RelatedSet, GatewayError> {
        (**self).related(subject, predicate)
    }
}
