//! New version and gene set payloads.

use serde::{Deserialize, Serialize};
use tracing::debug;
use tribe_annotations::{AnnotationMap, Annotations};
use tribe_common::{GeneId, Pmid, PriorVersion, Result, TribeError};

const MISSING_GENESET_TITLE: &str = "Your gene set does not have a title.  \
    Please go back and add a title to be able to save your gene set.";
const MISSING_ORGANISM: &str = "You must choose an organism for your gene set.  \
    Please go back and choose an organism.";
const MISSING_COLLECTION_TITLE: &str = "Your collection does not have a title.  \
    Please add a title to be able to create your collection.";

// ---------------------------------------------------------------------------
// Version
// ---------------------------------------------------------------------------

/// Body of a version-creation request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewVersion {
    /// Resource URI of the gene set this is a version of.
    pub geneset: String,
    /// Resource URI of the version edited from; `None` for a first version.
    pub parent: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub annotations: AnnotationMap,
    /// Publications are sent as full objects carrying their database ids.
    pub full_pubs: bool,
}

impl NewVersion {
    /// Next version of `prior`, from the tracker's working set.
    pub fn from_prior(prior: &PriorVersion, tracker: &Annotations) -> Self {
        debug!(
            "Building version of {} from parent {} ({} genes)",
            prior.geneset.resource_uri,
            prior.resource_uri,
            tracker.gene_count()
        );
        Self {
            geneset: prior.geneset.resource_uri.clone(),
            parent: Some(prior.resource_uri.clone()),
            description: None,
            annotations: tracker.all().clone(),
            full_pubs: true,
        }
    }

    /// First version of a freshly saved gene set.
    pub fn first(geneset_uri: &str, description: Option<String>, tracker: &Annotations) -> Self {
        Self {
            geneset: geneset_uri.to_string(),
            parent: None,
            description,
            annotations: tracker.all().clone(),
            full_pubs: true,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Distinct genes in the version.
    pub fn gene_count(&self) -> usize {
        self.annotations.len()
    }

    /// Flattened `(gene, publication)` pairs; a gene without publications
    /// appears once with `None`.
    pub fn pairs(&self) -> Vec<(GeneId, Option<Pmid>)> {
        let mut pairs = Vec::new();
        for (gid, pubs) in &self.annotations {
            if pubs.is_empty() {
                pairs.push((*gid, None));
            } else {
                pairs.extend(pubs.iter().map(|p| (*gid, Some(p.pmid))));
            }
        }
        pairs
    }

    /// Every publication must carry its database id when sent in full.
    pub fn validate(&self) -> Result<()> {
        if !self.full_pubs {
            return Ok(());
        }
        for (gid, pubs) in &self.annotations {
            if let Some(p) = pubs.iter().find(|p| p.id.is_none()) {
                return Err(TribeError::Validation(format!(
                    "Publication {} on gene {gid} has not been loaded yet.",
                    p.pmid
                )));
            }
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Gene set
// ---------------------------------------------------------------------------

/// Body of a gene-set creation request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GeneSetDraft {
    pub title: String,
    /// Organism resource URI.
    pub organism: Option<String>,
    #[serde(default, rename = "abstract", skip_serializing_if = "Option::is_none")]
    pub abstr: Option<String>,
    #[serde(default)]
    pub public: bool,
}

impl GeneSetDraft {
    pub fn validate(&self) -> Result<()> {
        if self.title.trim().is_empty() {
            return Err(TribeError::Validation(MISSING_GENESET_TITLE.to_string()));
        }
        if self.organism.as_deref().map_or(true, |o| o.trim().is_empty()) {
            return Err(TribeError::Validation(MISSING_ORGANISM.to_string()));
        }
        Ok(())
    }
}

/// Gene set plus its first version, created together from the
/// first-version editor. The organism is fixed by the page.
#[derive(Debug, Clone, PartialEq)]
pub struct FirstVersionDraft {
    pub geneset: GeneSetDraft,
}

impl FirstVersionDraft {
    pub fn new(organism_uri: &str) -> Self {
        Self {
            geneset: GeneSetDraft {
                organism: Some(organism_uri.to_string()),
                ..GeneSetDraft::default()
            },
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.geneset.title.trim().is_empty() {
            return Err(TribeError::Validation(MISSING_COLLECTION_TITLE.to_string()));
        }
        Ok(())
    }

    /// The version to submit once the gene set exists at `geneset_uri`.
    /// The gene set abstract doubles as the version description.
    pub fn version(&self, geneset_uri: &str, tracker: &Annotations) -> NewVersion {
        NewVersion::first(geneset_uri, self.geneset.abstr.clone(), tracker)
    }
}
