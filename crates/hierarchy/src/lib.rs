//! `arkdeposit-hierarchy` — collection hierarchy resolution.
//!
//! Discovers and validates the parent/child graph of collections a deposit
//! belongs to, via iterative relationship queries with per-branch cycle
//! detection, and reconciles FID↔PID pairs through the repository lookups.

pub mod resolver;

pub use resolver::{HierarchyGraph, resolve_hierarchy};
