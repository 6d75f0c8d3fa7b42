//! tribe-common — Shared types and errors used across all Tribe crates.

pub mod error;
pub mod entities;

// Re-export commonly used types
pub use entities::{Gene, GeneId, Pmid, PriorAnnotation, PriorVersion, Publication};
pub use error::{Result, TribeError};
