//! Collections: repository objects grouping others via "is constituent of".

use arkdeposit_core::{DepositError, DepositResult, Fid, Pid};

use crate::entity::{DepositEntity, IdentityState, impl_deposit_entity};

/// A collection the deposit belongs to, with its discovered parent chain.
///
/// Parents are back-references only: attaching never transfers ownership of
/// repository state, it records what the graph queries discovered. The parent
/// set is ordered and deduplicated by FID.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Collection {
    identity: IdentityState,
    parents: Vec<Collection>,
}

impl_deposit_entity!(Collection);

impl Collection {
    pub fn new(uri: impl Into<String>) -> Self {
        Self {
            identity: IdentityState::new(uri),
            parents: Vec::new(),
        }
    }

    /// Construct from whichever repository identifiers are known.
    ///
    /// The canonical URI is the PID when present, the FID otherwise. A
    /// collection with neither has no identity at all and cannot be built.
    pub fn from_ids(pid: Option<Pid>, fid: Option<Fid>) -> DepositResult<Self> {
        let uri = match (&pid, &fid) {
            (Some(p), _) => p.as_str().to_string(),
            (None, Some(f)) => f.as_str().to_string(),
            (None, None) => {
                return Err(DepositError::unknown_collection("no collection URI found"));
            }
        };
        let mut col = Self::new(uri);
        if let Some(f) = fid {
            col.set_fid(f);
        }
        if let Some(p) = pid {
            col.set_pid(p);
        }
        Ok(col)
    }

    pub fn parents(&self) -> &[Collection] {
        &self.parents
    }

    pub fn parents_mut(&mut self) -> &mut [Collection] {
        &mut self.parents
    }

    /// Attach a parent collection unless one with the same FID is already
    /// present. Returns whether the parent was attached.
    pub fn attach_parent(&mut self, parent: Collection) -> bool {
        if let Some(fid) = parent.fid()
            && self.parents.iter().any(|p| p.fid() == Some(fid))
        {
            return false;
        }
        self.parents.push(parent);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fid(s: &str) -> Fid {
        s.parse().unwrap()
    }

    #[test]
    fn from_ids_prefers_pid_as_uri() {
        let col = Collection::from_ids(
            Some("hdl:1839/a".parse().unwrap()),
            Some(fid("lat:a")),
        )
        .unwrap();
        assert_eq!(col.uri(), "hdl:1839/a");
        assert!(col.has_fid());
        assert!(col.has_pid());
    }

    #[test]
    fn from_ids_falls_back_to_fid_uri() {
        let col = Collection::from_ids(None, Some(fid("lat:a"))).unwrap();
        assert_eq!(col.uri(), "lat:a");
        assert!(!col.has_pid());
    }

    #[test]
    fn from_ids_rejects_anonymous_collections() {
        assert!(matches!(
            Collection::from_ids(None, None),
            Err(DepositError::UnknownCollection(_))
        ));
    }

    #[test]
    fn attach_parent_deduplicates_by_fid() {
        let mut col = Collection::from_ids(None, Some(fid("lat:a"))).unwrap();
        let b1 = Collection::from_ids(None, Some(fid("lat:b"))).unwrap();
        let b2 = Collection::from_ids(None, Some(fid("lat:b"))).unwrap();
        assert!(col.attach_parent(b1));
        assert!(!col.attach_parent(b2));
        assert_eq!(col.parents().len(), 1);
    }

    #[test]
    fn attach_parent_keeps_order() {
        let mut col = Collection::from_ids(None, Some(fid("lat:a"))).unwrap();
        col.attach_parent(Collection::from_ids(None, Some(fid("lat:b"))).unwrap());
        col.attach_parent(Collection::from_ids(None, Some(fid("lat:c"))).unwrap());
        let fids: Vec<_> = col
            .parents()
            .iter()
            .map(|p| p.fid().unwrap().as_str().to_string())
            .collect();
        assert_eq!(fids, vec!["lat:b", "lat:c"]);
    }
}
