//! tribe-versions — Payloads submitted when saving gene sets and versions.
//!
//! Nothing here talks to the network: these are the request bodies the
//! version and gene set endpoints expect, plus the checks the editor runs
//! before sending them.

pub mod draft;
pub mod fork;

pub use draft::{FirstVersionDraft, GeneSetDraft, NewVersion};
pub use fork::ForkDraft;
