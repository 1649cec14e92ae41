//! `arkdeposit-gateway` — client seams to the object repository.
//!
//! The deposit core consumes two external collaborators: the Repository
//! Gateway (object/datastream writes and identifier lookups) and the Graph
//! Query Gateway (relationship queries). Both are trait seams with in-memory
//! implementations for tests/dev; real backends plug in behind the same
//! synchronous, blocking contract.

pub mod error;
pub mod graph;
pub mod in_memory;
pub mod repository;

pub use error::GatewayError;
pub use graph::{GraphGateway, RelatedSet, Relation};
pub use in_memory::{InMemoryGraph, InMemoryRepository, StoredPayload};
pub use repository::{CreateReceipt, DatastreamMeta, RepoStatus, RepositoryGateway};
