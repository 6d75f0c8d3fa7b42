//! tribe-annotations — Working-set tracking for a gene set version being edited.
//!
//! The [`Annotations`] tracker holds the gene → publications annotations a
//! curator is building relative to a prior version, along with the derived
//! added/removed sets used for the "added" / "removed" / "current" badges.
//! [`AnnotationSession`] wraps one tracker per editing workflow.

pub mod command;
pub mod events;
pub mod session;
pub mod state;
pub mod tracker;

pub use command::{apply_all, EditCommand};
pub use events::AnnotationEvent;
pub use session::{AnnotationSession, Generation, SessionId};
pub use state::PubState;
pub use tracker::{AnnotationMap, AnnotationSnapshot, Annotations, TrackerPolicy};
