use thiserror::Error;

use crate::entities::{GeneId, Pmid};

#[derive(Debug, Error)]
pub enum TribeError {
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Gene {0} is not part of this editing session")]
    GeneNotTracked(GeneId),

    #[error("Publication {pmid} not found in {list} for gene {gene}")]
    PublicationNotFound {
        gene: GeneId,
        pmid: Pmid,
        list: &'static str,
    },

    #[error("Nothing to undo for gene {0}")]
    NothingToUndo(GeneId),

    #[error("Invalid publication state: {0:?} (expected added, removed or current)")]
    InvalidPubState(String),

    #[error("Stale response: session generation {expected} is no longer current ({current})")]
    StaleGeneration { expected: u64, current: u64 },

    #[error("{0}")]
    Validation(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, TribeError>;
