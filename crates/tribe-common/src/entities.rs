//! Entity types exchanged with the Tribe API.
//! The editing core only relies on the identifier fields; everything else
//! is carried through untouched so it can be rendered and re-submitted.

use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

// ---------------------------------------------------------------------------
// Identifiers
// ---------------------------------------------------------------------------

/// Primary key of a gene.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GeneId(pub i64);

impl fmt::Display for GeneId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for GeneId {
    fn from(id: i64) -> Self {
        GeneId(id)
    }
}

/// PubMed identifier of a publication.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Pmid(pub i64);

impl fmt::Display for Pmid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for Pmid {
    fn from(pmid: i64) -> Self {
        Pmid(pmid)
    }
}

// ---------------------------------------------------------------------------
// Gene
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Gene {
    pub id: GeneId,
    #[serde(default)]
    pub entrezid: Option<i64>,
    #[serde(default)]
    pub systematic_name: String,
    #[serde(default)]
    pub standard_name: Option<String>,
    #[serde(default)]
    pub description: String,
    /// Space-separated alias list, as stored server side.
    #[serde(default)]
    pub aliases: String,
    /// Remaining payload (organism, cross-references, ...).
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Gene {
    pub fn new(id: impl Into<GeneId>, standard_name: &str) -> Self {
        Self {
            id: id.into(),
            entrezid: None,
            systematic_name: String::new(),
            standard_name: Some(standard_name.to_string()),
            description: String::new(),
            aliases: String::new(),
            extra: Map::new(),
        }
    }

    /// Display symbol: the standard name, or the systematic name for
    /// organisms (like yeast) that have none.
    pub fn symbol(&self) -> &str {
        match self.standard_name.as_deref() {
            Some(name) if !name.is_empty() => name,
            _ => &self.systematic_name,
        }
    }

    pub fn alias_list(&self) -> impl Iterator<Item = &str> {
        self.aliases.split_whitespace()
    }
}

// ---------------------------------------------------------------------------
// Publication
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Publication {
    /// Database id; present once the publication has been loaded server side.
    #[serde(default)]
    pub id: Option<i64>,
    pub pmid: Pmid,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub authors: String,
    #[serde(default)]
    pub journal: String,
    #[serde(default)]
    pub date: Option<NaiveDate>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Publication {
    pub fn new(pmid: impl Into<Pmid>, title: &str) -> Self {
        Self {
            id: None,
            pmid: pmid.into(),
            title: title.to_string(),
            authors: String::new(),
            journal: String::new(),
            date: None,
            extra: Map::new(),
        }
    }

    /// Short citation used in annotation lists, e.g. "Smith J (2014)".
    pub fn short_citation(&self) -> String {
        let first_author = self
            .authors
            .split(',')
            .next()
            .map(str::trim)
            .filter(|a| !a.is_empty());
        match (first_author, self.date) {
            (Some(a), Some(d)) => format!("{a} ({})", d.format("%Y")),
            (Some(a), None) => a.to_string(),
            (None, Some(d)) => format!("PMID {} ({})", self.pmid, d.format("%Y")),
            (None, None) => format!("PMID {}", self.pmid),
        }
    }
}

// ---------------------------------------------------------------------------
// Prior version (baseline for an editing session)
// ---------------------------------------------------------------------------

/// One gene of a saved version together with its supporting publications.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriorAnnotation {
    pub gene: Gene,
    #[serde(default)]
    pub pubs: Vec<Publication>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrganismRef {
    pub resource_uri: String,
    #[serde(default)]
    pub scientific_name: Option<String>,
    #[serde(default)]
    pub slug: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneSetRef {
    pub resource_uri: String,
    pub title: String,
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default, rename = "abstract")]
    pub abstr: Option<String>,
    #[serde(default)]
    pub public: bool,
    pub organism: OrganismRef,
}

/// A saved version as returned by the version endpoint with
/// `xrids_requested=true`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriorVersion {
    pub resource_uri: String,
    /// 40-character sha1 identifying the version.
    pub ver_hash: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub commit_date: Option<DateTime<Utc>>,
    pub geneset: GeneSetRef,
    #[serde(default)]
    pub annotations: Vec<PriorAnnotation>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_symbol_falls_back_to_systematic_name() {
        let mut gene = Gene::new(1, "");
        gene.systematic_name = "YAL001C".to_string();
        assert_eq!(gene.symbol(), "YAL001C");

        gene.standard_name = Some("TFC3".to_string());
        assert_eq!(gene.symbol(), "TFC3");
    }

    #[test]
    fn test_gene_keeps_unknown_payload_fields() {
        let json = r#"{"id": 55, "standard_name": "KRAS", "organism": {"slug": "homo-sapiens"}}"#;
        let gene: Gene = serde_json::from_str(json).unwrap();
        assert_eq!(gene.id, GeneId(55));
        assert_eq!(gene.extra["organism"]["slug"], "homo-sapiens");

        let back = serde_json::to_value(&gene).unwrap();
        assert_eq!(back["organism"]["slug"], "homo-sapiens");
    }

    #[test]
    fn test_short_citation() {
        let mut publication = Publication::new(23193287, "Gene set curation");
        assert_eq!(publication.short_citation(), "PMID 23193287");

        publication.authors = "Greene CS, Troyanskaya OG".to_string();
        publication.date = NaiveDate::from_ymd_opt(2012, 11, 29);
        assert_eq!(publication.short_citation(), "Greene CS (2012)");
    }

    #[test]
    fn test_prior_version_parses_minimal_payload() {
        let json = r#"{
            "resource_uri": "/api/v1/version/1",
            "ver_hash": "0123456789abcdef0123456789abcdef01234567",
            "geneset": {
                "resource_uri": "/api/v1/geneset/3",
                "title": "DNA repair",
                "organism": {"resource_uri": "/api/v1/organism/1"}
            },
            "annotations": [
                {"gene": {"id": 10, "standard_name": "BRCA1"}, "pubs": [{"pmid": 111}]}
            ]
        }"#;
        let prior: PriorVersion = serde_json::from_str(json).unwrap();
        assert_eq!(prior.annotations.len(), 1);
        assert_eq!(prior.annotations[0].pubs[0].pmid, Pmid(111));
        assert!(!prior.geneset.public);
    }
}
