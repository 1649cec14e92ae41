//! In-memory gateways.
//!
//! Intended for tests/dev. Not optimized for performance. The repository
//! variant enforces the same optimistic-concurrency contract a real backend
//! must: an update whose precondition no longer matches the stored
//! last-modified timestamp is answered with a conflict status.

use std::collections::HashMap;
use std::path::Path;
use std::sync::RwLock;
use std::sync::atomic::{AtomicI64, Ordering};

use arkdeposit_core::{AsOf, DatastreamId, Fid, Pid};

use crate::error::GatewayError;
use crate::graph::{GraphGateway, Relation, RelatedSet};
use crate::repository::{CreateReceipt, DatastreamMeta, RepoStatus, RepositoryGateway};

/// What an in-memory datastream currently holds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoredPayload {
    /// Seeded by a test/dev helper; no write has touched it yet.
    Seeded,
    Content(Vec<u8>),
    Location(String),
}

#[derive(Debug, Clone)]
struct StoredDatastream {
    last_modified: AsOf,
    payload: StoredPayload,
}

/// In-memory object repository.
#[derive(Debug)]
pub struct InMemoryRepository {
    datastreams: RwLock<HashMap<(Fid, DatastreamId), StoredDatastream>>,
    pid_by_fid: RwLock<HashMap<Fid, Pid>>,
    fid_by_pid: RwLock<HashMap<Pid, Fid>>,
    ingested: RwLock<Vec<Vec<u8>>>,
    clock_millis: AtomicI64,
}

impl Default for InMemoryRepository {
    fn default() -> Self {
        Self {
            datastreams: RwLock::new(HashMap::new()),
            pid_by_fid: RwLock::new(HashMap::new()),
            fid_by_pid: RwLock::new(HashMap::new()),
            ingested: RwLock::new(Vec::new()),
            clock_millis: AtomicI64::new(1_700_000_000_000),
        }
    }
}

fn poisoned<T>(_: T) -> GatewayError {
    GatewayError::Poisoned("lock poisoned".to_string())
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn next_as_of(&self) -> Result<AsOf, GatewayError> {
        let millis = self.clock_millis.fetch_add(1, Ordering::SeqCst);
        AsOf::from_epoch_millis(millis)
            .map_err(|e| GatewayError::Poisoned(format!("clock overflow: {e}")))
    }

    /// Seed a datastream so metadata reads and updates can find it.
    /// Returns the assigned last-modified timestamp.
    pub fn seed_datastream(
        &self,
        fid: &Fid,
        dsid: &DatastreamId,
    ) -> Result<AsOf, GatewayError> {
        let as_of = self.next_as_of()?;
        let mut streams = self.datastreams.write().map_err(poisoned)?;
        streams.insert(
            (fid.clone(), dsid.clone()),
            StoredDatastream {
                last_modified: as_of,
                payload: StoredPayload::Seeded,
            },
        );
        Ok(as_of)
    }

    /// Record a FID↔PID pair for the lookup operations.
    pub fn register_identifiers(&self, fid: &Fid, pid: &Pid) -> Result<(), GatewayError> {
        self.pid_by_fid
            .write()
            .map_err(poisoned)?
            .insert(fid.clone(), pid.clone());
        self.fid_by_pid
            .write()
            .map_err(poisoned)?
            .insert(pid.clone(), fid.clone());
        Ok(())
    }

    /// Advance a datastream's last-modified, as if another process wrote it.
    /// Staged updates computed against the old timestamp become stale.
    pub fn touch_datastream(
        &self,
        fid: &Fid,
        dsid: &DatastreamId,
    ) -> Result<Option<AsOf>, GatewayError> {
        let as_of = self.next_as_of()?;
        let mut streams = self.datastreams.write().map_err(poisoned)?;
        match streams.get_mut(&(fid.clone(), dsid.clone())) {
            Some(ds) => {
                ds.last_modified = as_of;
                Ok(Some(as_of))
            }
            None => Ok(None),
        }
    }

    /// Current payload and last-modified of a datastream, for assertions.
    pub fn datastream(
        &self,
        fid: &Fid,
        dsid: &DatastreamId,
    ) -> Result<Option<(AsOf, StoredPayload)>, GatewayError> {
        let streams = self.datastreams.read().map_err(poisoned)?;
        Ok(streams
            .get(&(fid.clone(), dsid.clone()))
            .map(|ds| (ds.last_modified, ds.payload.clone())))
    }

    /// How many object files have been ingested.
    pub fn ingested_count(&self) -> Result<usize, GatewayError> {
        Ok(self.ingested.read().map_err(poisoned)?.len())
    }

    fn update_datastream(
        &self,
        fid: &Fid,
        dsid: &DatastreamId,
        precondition: AsOf,
        payload: StoredPayload,
    ) -> Result<DatastreamMeta, GatewayError> {
        let mut streams = self.datastreams.write().map_err(poisoned)?;
        let Some(ds) = streams.get_mut(&(fid.clone(), dsid.clone())) else {
            return Ok(DatastreamMeta {
                status: RepoStatus::NOT_FOUND,
                last_modified: None,
            });
        };
        if ds.last_modified != precondition {
            // Remote state moved since staging: reject the lost update.
            return Ok(DatastreamMeta {
                status: RepoStatus::CONFLICT,
                last_modified: None,
            });
        }
        let as_of = self.next_as_of()?;
        ds.last_modified = as_of;
        ds.payload = payload;
        Ok(DatastreamMeta {
            status: RepoStatus::OK,
            last_modified: Some(as_of),
        })
    }
}

impl RepositoryGateway for InMemoryRepository {
    fn create_object(&self, content: &Path) -> Result<CreateReceipt, GatewayError> {
        let bytes = std::fs::read(content)?;
        let mut ingested = self.ingested.write().map_err(poisoned)?;
        ingested.push(bytes);
        let n = ingested.len();
        let pid = format!("hdl:0000/ingest-{n}")
            .parse()
            .map_err(|_| GatewayError::Poisoned("synthesized pid invalid".to_string()))?;
        Ok(CreateReceipt {
            status: RepoStatus::CREATED,
            pid: Some(pid),
            location: Some(format!("info:ingest/{n}")),
        })
    }

    fn get_datastream_meta(
        &self,
        fid: &Fid,
        dsid: &DatastreamId,
    ) -> Result<DatastreamMeta, GatewayError> {
        let streams = self.datastreams.read().map_err(poisoned)?;
        Ok(match streams.get(&(fid.clone(), dsid.clone())) {
            Some(ds) => DatastreamMeta {
                status: RepoStatus::OK,
                last_modified: Some(ds.last_modified),
            },
            None => DatastreamMeta {
                status: RepoStatus::NOT_FOUND,
                last_modified: None,
            },
        })
    }

    fn update_datastream_content(
        &self,
        fid: &Fid,
        dsid: &DatastreamId,
        precondition: AsOf,
        content: &Path,
    ) -> Result<DatastreamMeta, GatewayError> {
        let bytes = std::fs::read(content)?;
        self.update_datastream(fid, dsid, precondition, StoredPayload::Content(bytes))
    }

    fn update_datastream_location(
        &self,
        fid: &Fid,
        dsid: &DatastreamId,
        precondition: AsOf,
        location: &str,
    ) -> Result<DatastreamMeta, GatewayError> {
        self.update_datastream(
            fid,
            dsid,
            precondition,
            StoredPayload::Location(location.to_string()),
        )
    }

    fn lookup_pid(&self, fid: &Fid) -> Result<Option<Pid>, GatewayError> {
        Ok(self.pid_by_fid.read().map_err(poisoned)?.get(fid).cloned())
    }

    fn lookup_fid(&self, pid: &Pid) -> Result<Option<Fid>, GatewayError> {
        Ok(self.fid_by_pid.read().map_err(poisoned)?.get(pid).cloned())
    }
}

/// In-memory relationship index: adjacency from an object to the collections
/// it is a constituent of.
#[derive(Debug)]
pub struct InMemoryGraph {
    edges: RwLock<HashMap<Fid, Vec<Fid>>>,
    response_status: RwLock<RepoStatus>,
}

impl Default for InMemoryGraph {
    fn default() -> Self {
        Self {
            edges: RwLock::new(HashMap::new()),
            response_status: RwLock::new(RepoStatus::OK),
        }
    }
}

impl InMemoryGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `subject isConstituentOf parent`.
    pub fn relate(&self, subject: &Fid, parent: &Fid) -> Result<(), GatewayError> {
        self.edges
            .write()
            .map_err(poisoned)?
            .entry(subject.clone())
            .or_default()
            .push(parent.clone());
        Ok(())
    }

    /// Force every subsequent query to answer with the given status.
    pub fn set_response_status(&self, status: RepoStatus) -> Result<(), GatewayError> {
        *self.response_status.write().map_err(poisoned)? = status;
        Ok(())
    }
}

impl GraphGateway for InMemoryGraph {
    fn related(&self, subject: &Fid, predicate: Relation) -> Result<RelatedSet, GatewayError> {
        tracing::debug!(subject = %subject, predicate = %predicate, "graph query");
        let status = *self.response_status.read().map_err(poisoned)?;
        if !status.is_success() {
            return Ok(RelatedSet {
                status,
                fids: vec![],
            });
        }
        let edges = self.edges.read().map_err(poisoned)?;
        Ok(RelatedSet {
            status,
            fids: edges.get(subject).cloned().unwrap_or_default(),
        })
    }
}
