//! Forking a gene set at a given version.

use serde::{Deserialize, Serialize};
use tribe_common::{PriorVersion, Result, TribeError};

/// Characters of the version hash quoted in a fork's default title.
const SHORT_HASH_LEN: usize = 12;

/// Body of the gene-set creation request that forks `fork_of` at
/// `fork_version`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForkDraft {
    pub title: String,
    pub organism: String,
    #[serde(default, rename = "abstract")]
    pub abstr: Option<String>,
    pub public: bool,
    /// Resource URI of the gene set being forked.
    pub fork_of: String,
    pub fork_version: String,
}

impl ForkDraft {
    pub fn from_version(version: &PriorVersion) -> Self {
        let short_hash: String = version.ver_hash.chars().take(SHORT_HASH_LEN).collect();
        Self {
            title: format!("Fork of {} at version {short_hash}", version.geneset.title),
            organism: version.geneset.organism.resource_uri.clone(),
            abstr: version.geneset.abstr.clone(),
            public: version.geneset.public,
            fork_of: version.geneset.resource_uri.clone(),
            fork_version: version.ver_hash.clone(),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.title.trim().is_empty() {
            return Err(TribeError::Validation("A fork needs a title.".to_string()));
        }
        Ok(())
    }
}
