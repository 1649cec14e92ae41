//! `arkdeposit-sip` — the shared deposit data model.
//!
//! One `Sip` per deposit run, holding the collections it belongs to and the
//! resources it carries. The deposit executor and the hierarchy resolver both
//! take the model as an explicit `&mut` context; there is no ambient state
//! and no concurrent access.

pub mod collection;
pub mod entity;
pub mod resource;
pub mod sip;

pub use collection::Collection;
pub use entity::DepositEntity;
pub use resource::Resource;
pub use sip::Sip;
