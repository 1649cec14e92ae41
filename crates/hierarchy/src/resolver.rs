//! Collection hierarchy resolution.
//!
//! For every collection the SIP belongs to, make sure both FID and PID are
//! known and populate the full parent-collection chain by walking the
//! repository's relationship index. The parent graph is not materialized
//! remotely; it is discovered lazily, one query per collection, with cycle
//! detection over an explicit per-branch history rather than recursion depth.

use std::collections::HashMap;

use arkdeposit_core::{DepositError, DepositResult, Fid};
use arkdeposit_gateway::{GraphGateway, Relation, RepositoryGateway};
use arkdeposit_sip::{Collection, DepositEntity, Sip};

/// Adjacency view of the discovered parent graph, child FID to parent FIDs.
/// Built incrementally as queries come back; useful for diagnostics and for
/// callers that want the shape of the hierarchy without re-walking the model.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HierarchyGraph {
    edges: HashMap<Fid, Vec<Fid>>,
}

impl HierarchyGraph {
    fn record(&mut self, child: &Fid, parent: &Fid) {
        let parents = self.edges.entry(child.clone()).or_default();
        if !parents.contains(parent) {
            parents.push(parent.clone());
        }
    }

    pub fn parents_of(&self, child: &Fid) -> &[Fid] {
        self.edges.get(child).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }
}

/// Resolve identifiers and parent chains for every collection of the SIP.
///
/// Fatal on the first unresolvable identifier, non-success gateway status or
/// cycle; nothing is retried. One top-level collection's resolution completes
/// in full (all recursive ancestors) before the next begins, so per-branch
/// cycle history never leaks across independent collections.
pub fn resolve_hierarchy<R, G>(
    repo: &R,
    graph: &G,
    sip: &mut Sip,
    namespace: &str,
) -> DepositResult<HierarchyGraph>
where
    R: RepositoryGateway,
    G: GraphGateway,
{
    // Declared collections must end up with both identifiers known.
    for col in sip.collections_mut() {
        match (col.fid().cloned(), col.pid().cloned()) {
            (None, None) => {
                return Err(DepositError::unknown_collection(format!(
                    "collection {} has no PID or FID",
                    col.uri()
                )));
            }
            (Some(fid), None) => match repo.lookup_pid(&fid)? {
                Some(pid) => col.set_pid(pid),
                None => {
                    return Err(DepositError::unknown_collection(format!(
                        "collection {} is not known in the repository",
                        col.uri()
                    )));
                }
            },
            (None, Some(pid)) => match repo.lookup_fid(&pid)? {
                Some(fid) => col.set_fid(fid),
                None => {
                    return Err(DepositError::unknown_collection(format!(
                        "collection {} is not known in the repository",
                        col.uri()
                    )));
                }
            },
            (Some(_), Some(_)) => {}
        }
    }

    // An update of an existing deposit that declares no collections inherits
    // the containing collections recorded in the repository.
    if sip.collections().is_empty() {
        if sip.is_update() {
            let sip_fid = sip.fid().cloned().ok_or_else(|| {
                DepositError::unknown_collection(
                    "update SIP has no FID to discover collections from",
                )
            })?;
            let set = graph.related(&sip_fid, Relation::IsConstituentOf)?;
            if !set.status.is_success() {
                return Err(DepositError::unexpected_status(
                    set.status.code(),
                    format!("discovering collections of {sip_fid}"),
                ));
            }
            for fid in set.fids {
                let pid = repo.lookup_pid(&fid)?;
                tracing::debug!(fid = %fid, pid = ?pid, "discovered containing collection");
                sip.add_collection(Collection::from_ids(pid, Some(fid))?);
            }
        } else {
            tracing::debug!(uri = %sip.uri(), "SIP declares no collections");
        }
    }

    let mut discovered = HierarchyGraph::default();
    for col in sip.collections_mut() {
        let start = col.fid().cloned().ok_or_else(|| {
            DepositError::unknown_collection(format!("collection {} has no FID", col.uri()))
        })?;
        let mut history = vec![start];
        load_parent_collections(repo, graph, namespace, &mut history, col, &mut discovered)?;
    }
    Ok(discovered)
}

fn load_parent_collections<R, G>(
    repo: &R,
    graph: &G,
    namespace: &str,
    history: &mut Vec<Fid>,
    col: &mut Collection,
    discovered: &mut HierarchyGraph,
) -> DepositResult<()>
where
    R: RepositoryGateway,
    G: GraphGateway,
{
    let fid = col.fid().cloned().ok_or_else(|| {
        DepositError::unknown_collection(format!("collection {} has no FID", col.uri()))
    })?;

    let set = graph.related(&fid, Relation::IsConstituentOf)?;
    if !set.status.is_success() {
        return Err(DepositError::unexpected_status(
            set.status.code(),
            format!("discovering parents of {fid}"),
        ));
    }
    for parent_fid in &set.fids {
        discovered.record(&fid, parent_fid);
        let pid = repo.lookup_pid(parent_fid)?;
        col.attach_parent(Collection::from_ids(pid, Some(parent_fid.clone()))?);
    }

    // Ancestors: only the reserved namespace is expanded; foreign collections
    // stay leaves. The history is per-branch — the same collection may be
    // reached via two independent branches, but re-entering it on the same
    // branch is always a cycle.
    for parent in col.parents_mut() {
        let Some(parent_fid) = parent.fid().cloned() else {
            continue;
        };
        if !parent_fid.in_namespace(namespace) {
            continue;
        }
        if history.contains(&parent_fid) {
            let mut path = history.clone();
            path.push(parent_fid);
            return Err(DepositError::CollectionCycle { path });
        }
        history.push(parent_fid);
        load_parent_collections(repo, graph, namespace, history, parent, discovered)?;
        history.pop();
    }
    Ok(())
}
