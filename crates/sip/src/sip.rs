//! The staged deposit package and its completion-target lookup.

use arkdeposit_core::Fid;

use crate::collection::Collection;
use crate::entity::{DepositEntity, IdentityState, impl_deposit_entity};
use crate::resource::Resource;

/// The whole Submission Information Package: itself one repository object,
/// plus the collections it belongs to and the resources it carries.
///
/// Owned by one deposit run, read-write shared by the deposit executor and
/// the hierarchy resolver; never accessed concurrently. The core only mutates
/// identifier fields and extends collection parent sets — entities live for
/// the run and are discarded after (repository state is the permanent record).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sip {
    identity: IdentityState,
    is_update: bool,
    collections: Vec<Collection>,
    resources: Vec<Resource>,
}

impl_deposit_entity!(Sip);

impl Sip {
    pub fn new(uri: impl Into<String>) -> Self {
        Self {
            identity: IdentityState::new(uri),
            is_update: false,
            collections: Vec::new(),
            resources: Vec::new(),
        }
    }

    /// Mark this package as an update of an existing deposit.
    pub fn mark_update(&mut self) {
        self.is_update = true;
    }

    pub fn is_update(&self) -> bool {
        self.is_update
    }

    pub fn add_collection(&mut self, collection: Collection) {
        self.collections.push(collection);
    }

    pub fn add_resource(&mut self, resource: Resource) {
        self.resources.push(resource);
    }

    pub fn collections(&self) -> &[Collection] {
        &self.collections
    }

    pub fn collections_mut(&mut self) -> &mut [Collection] {
        &mut self.collections
    }

    pub fn resources(&self) -> &[Resource] {
        &self.resources
    }

    pub fn resources_mut(&mut self) -> &mut [Resource] {
        &mut self.resources
    }

    /// Locate the unique entity a confirmed repository write completes.
    ///
    /// Checked order is fixed: the SIP itself, then collections in document
    /// order, then resources. First match wins; at most one entity is ever
    /// returned per candidate FID.
    pub fn find_completion_target(&mut self, fid: &Fid) -> Option<&mut dyn DepositEntity> {
        if self.is_completion_target(fid) {
            return Some(self);
        }
        if let Some(i) = self
            .collections
            .iter()
            .position(|c| c.is_completion_target(fid))
        {
            return Some(&mut self.collections[i]);
        }
        if let Some(i) = self
            .resources
            .iter()
            .position(|r| r.is_completion_target(fid))
        {
            return Some(&mut self.resources[i]);
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use arkdeposit_core::{AsOf, DatastreamId};

    fn fid(s: &str) -> Fid {
        s.parse().unwrap()
    }

    fn sip_with_entities() -> Sip {
        let mut sip = Sip::new("lat:sip");
        sip.set_fid(fid("lat:sip"));

        let mut col = Collection::new("lat:col");
        col.set_fid(fid("lat:col"));
        sip.add_collection(col);

        let mut res = Resource::new("lat:res");
        res.set_fid(fid("lat:res"));
        sip.add_resource(res);

        sip
    }

    #[test]
    fn lookup_checks_sip_before_collections_before_resources() {
        // All three entities share a URI prefix; the SIP must win.
        let mut sip = Sip::new("lat:x");
        sip.set_fid(fid("lat:x"));
        let mut col = Collection::new("lat:x");
        col.set_fid(fid("lat:x"));
        sip.add_collection(col);
        let mut res = Resource::new("lat:x");
        res.set_fid(fid("lat:x"));
        sip.add_resource(res);

        let target = sip.find_completion_target(&fid("lat:x")).unwrap();
        target.set_fid_stream(DatastreamId::obj());
        drop(target);

        assert!(sip.fid_stream().is_some());
        assert!(sip.collections()[0].fid_stream().is_none());
        assert!(sip.resources()[0].fid_stream().is_none());
    }

    #[test]
    fn lookup_finds_collection_and_resource_by_prefix() {
        let mut sip = sip_with_entities();

        assert_eq!(
            sip.find_completion_target(&fid("lat:col")).unwrap().uri(),
            "lat:col"
        );
        assert_eq!(
            sip.find_completion_target(&fid("lat:res")).unwrap().uri(),
            "lat:res"
        );
        assert!(sip.find_completion_target(&fid("lat:elsewhere")).is_none());
    }

    #[test]
    fn entities_without_fid_are_skipped() {
        let mut sip = Sip::new("lat:sip");
        // FID never assigned: the SIP cannot be completed yet.
        assert!(sip.find_completion_target(&fid("lat:sip")).is_none());
    }

    #[test]
    fn completion_is_idempotent_on_identical_state() {
        let mut sip = sip_with_entities();
        let f = fid("lat:col");
        let as_of = AsOf::from_epoch_millis(1_700_000_000_000).unwrap();

        for _ in 0..2 {
            let target = sip.find_completion_target(&f).unwrap();
            target.set_fid(f.clone());
            target.set_fid_stream(DatastreamId::cmd());
            target.set_fid_as_of(as_of);
        }

        let col = &sip.collections()[0];
        assert_eq!(col.fid(), Some(&f));
        assert_eq!(col.fid_stream(), Some(&DatastreamId::cmd()));
        assert_eq!(col.fid_as_of(), Some(as_of));
    }
}
