//! Deposit entity capability surface shared by SIP, Collection and Resource.

use arkdeposit_core::{AsOf, DatastreamId, Fid, Pid};

/// Common capability set of everything the deposit can assign identifiers to.
///
/// Entities *hold* identifiers; they never own their lifecycle. The `uri` is
/// the canonical identity used before any repository identifier is known and
/// is set exactly once, at construction.
pub trait DepositEntity {
    /// Canonical identity of this entity within the staged package.
    fn uri(&self) -> &str;

    fn fid(&self) -> Option<&Fid>;

    /// Assign the repository-native identifier.
    ///
    /// A new FID means any previously recorded stream-completion state is
    /// stale, so this clears `fid_stream` and `fid_as_of`.
    fn set_fid(&mut self, fid: Fid);

    fn pid(&self) -> Option<&Pid>;

    fn set_pid(&mut self, pid: Pid);

    /// Which datastream most recently completed this entity's FID.
    fn fid_stream(&self) -> Option<&DatastreamId>;

    /// Last-modified state of that datastream at completion time.
    fn fid_as_of(&self) -> Option<AsOf>;

    fn set_fid_stream(&mut self, dsid: DatastreamId);

    fn set_fid_as_of(&mut self, as_of: AsOf);

    fn has_fid(&self) -> bool {
        self.fid().is_some()
    }

    fn has_pid(&self) -> bool {
        self.pid().is_some()
    }

    /// Whether a confirmed repository write to `fid` completes this entity.
    ///
    /// An entity whose FID is still unset cannot be a completion target; the
    /// match itself is the entity's `uri` being a prefix of the candidate FID.
    fn is_completion_target(&self, fid: &Fid) -> bool {
        self.has_fid() && fid.as_str().starts_with(self.uri())
    }
}

/// Identifier-completion state embedded in every entity variant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct IdentityState {
    uri: String,
    fid: Option<Fid>,
    fid_stream: Option<DatastreamId>,
    fid_as_of: Option<AsOf>,
    pid: Option<Pid>,
}

impl IdentityState {
    pub(crate) fn new(uri: impl Into<String>) -> Self {
        Self {
            uri: uri.into(),
            fid: None,
            fid_stream: None,
            fid_as_of: None,
            pid: None,
        }
    }

    pub(crate) fn uri(&self) -> &str {
        &self.uri
    }

    pub(crate) fn fid(&self) -> Option<&Fid> {
        self.fid.as_ref()
    }

    pub(crate) fn set_fid(&mut self, fid: Fid) {
        self.fid = Some(fid);
        self.fid_stream = None;
        self.fid_as_of = None;
    }

    pub(crate) fn pid(&self) -> Option<&Pid> {
        self.pid.as_ref()
    }

    pub(crate) fn set_pid(&mut self, pid: Pid) {
        self.pid = Some(pid);
    }

    pub(crate) fn fid_stream(&self) -> Option<&DatastreamId> {
        self.fid_stream.as_ref()
    }

    pub(crate) fn fid_as_of(&self) -> Option<AsOf> {
        self.fid_as_of
    }

    pub(crate) fn set_fid_stream(&mut self, dsid: DatastreamId) {
        self.fid_stream = Some(dsid);
    }

    pub(crate) fn set_fid_as_of(&mut self, as_of: AsOf) {
        self.fid_as_of = Some(as_of);
    }
}

macro_rules! impl_deposit_entity {
    ($t:ty) => {
        impl $crate::entity::DepositEntity for $t {
            fn uri(&self) -> &str {
                self.identity.uri()
            }

            fn fid(&self) -> Option<&arkdeposit_core::Fid> {
                self.identity.fid()
            }

            fn set_fid(&mut self, fid: arkdeposit_core::Fid) {
                self.identity.set_fid(fid);
            }

            fn pid(&self) -> Option<&arkdeposit_core::Pid> {
                self.identity.pid()
            }

            fn set_pid(&mut self, pid: arkdeposit_core::Pid) {
                self.identity.set_pid(pid);
            }

            fn fid_stream(&self) -> Option<&arkdeposit_core::DatastreamId> {
                self.identity.fid_stream()
            }

            fn fid_as_of(&self) -> Option<arkdeposit_core::AsOf> {
                self.identity.fid_as_of()
            }

            fn set_fid_stream(&mut self, dsid: arkdeposit_core::DatastreamId) {
                self.identity.set_fid_stream(dsid);
            }

            fn set_fid_as_of(&mut self, as_of: arkdeposit_core::AsOf) {
                self.identity.set_fid_as_of(as_of);
            }
        }
    };
}

pub(crate) use impl_deposit_entity;

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct Probe {
        identity: IdentityState,
    }

    impl_deposit_entity!(Probe);

    fn probe(uri: &str) -> Probe {
        Probe {
            identity: IdentityState::new(uri),
        }
    }

    #[test]
    fn set_fid_clears_stream_completion_state() {
        let mut p = probe("lat:foo");
        p.set_fid("lat:foo".parse().unwrap());
        p.set_fid_stream(DatastreamId::obj());
        p.set_fid_as_of(AsOf::from_epoch_millis(1_700_000_000_000).unwrap());

        p.set_fid("lat:foo2".parse().unwrap());
        assert!(p.fid_stream().is_none());
        assert!(p.fid_as_of().is_none());
        assert_eq!(p.fid().unwrap().as_str(), "lat:foo2");
    }

    #[test]
    fn entity_without_fid_is_never_a_completion_target() {
        let p = probe("lat:foo");
        let fid: Fid = "lat:foo".parse().unwrap();
        assert!(!p.is_completion_target(&fid));
    }

    #[test]
    fn completion_target_matches_on_uri_prefix() {
        let mut p = probe("lat:foo");
        p.set_fid("lat:foo".parse().unwrap());
        assert!(p.is_completion_target(&"lat:foo".parse().unwrap()));
        assert!(p.is_completion_target(&"lat:foo_extra".parse().unwrap()));
        assert!(!p.is_completion_target(&"lat:bar".parse().unwrap()));
    }
}
