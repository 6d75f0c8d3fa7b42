//! Change notifications emitted by the tracker.

use serde::{Deserialize, Serialize};
use tribe_common::{GeneId, Pmid};

use crate::state::PubState;

/// Pushed to session subscribers after each successful mutation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AnnotationEvent {
    /// Baseline loaded from a prior version
    Initialized { genes: usize },
    /// Gene added (or re-added after a removal)
    GeneAdded { gene: GeneId },
    /// Gene removed from the working set
    GeneRemoved { gene: GeneId, parked_pubs: usize },
    /// Removed baseline gene brought back by undo
    GeneRestored { gene: GeneId, pubs: usize },
    /// Session-added gene dropped by undo
    GeneDiscarded { gene: GeneId },
    PublicationAdded { gene: GeneId, pmid: Pmid },
    /// Publication detached; `from` is the state it was removed from
    PublicationRemoved { gene: GeneId, pmid: Pmid, from: PubState },
    /// Previously removed publication put back
    PublicationRestored { gene: GeneId, pmid: Pmid },
    Cleared,
}
