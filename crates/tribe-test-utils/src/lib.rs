//! tribe-test-utils — Fixtures shared by the Tribe test suites.

use chrono::{TimeZone, Utc};
use tribe_common::entities::{GeneSetRef, OrganismRef};
use tribe_common::{Gene, PriorAnnotation, PriorVersion, Publication};

/// A gene with the given primary key and standard name.
pub fn gene(id: i64, symbol: &str) -> Gene {
    let mut gene = Gene::new(id, symbol);
    gene.description = format!("{symbol} test gene");
    gene
}

/// A fully loaded publication (database id set, as with `full_pubs`).
pub fn publication(pmid: i64) -> Publication {
    let mut publication = Publication::new(pmid, &format!("Publication {pmid}"));
    publication.id = Some(pmid + 1_000_000);
    publication.authors = "Doe J, Roe R".to_string();
    publication.journal = "Test Journal".to_string();
    publication
}

/// Baseline annotations from `(gene id, [pmid, ...])` pairs.
/// Genes are named `G<id>`.
pub fn baseline(entries: &[(i64, &[i64])]) -> Vec<PriorAnnotation> {
    entries
        .iter()
        .map(|(gid, pmids)| PriorAnnotation {
            gene: gene(*gid, &format!("G{gid}")),
            pubs: pmids.iter().map(|p| publication(*p)).collect(),
        })
        .collect()
}

/// A saved version of a human gene set with the given annotations.
pub fn prior_version(title: &str, ver_hash: &str, annotations: Vec<PriorAnnotation>) -> PriorVersion {
    PriorVersion {
        resource_uri: "/api/v1/version/41".to_string(),
        ver_hash: ver_hash.to_string(),
        description: Some(format!("{title} description")),
        commit_date: Utc.with_ymd_and_hms(2017, 3, 16, 16, 46, 0).single(),
        geneset: GeneSetRef {
            resource_uri: "/api/v1/geneset/7".to_string(),
            title: title.to_string(),
            slug: Some(title.to_lowercase().replace(' ', "-")),
            abstr: Some(format!("{title} abstract")),
            public: true,
            organism: OrganismRef {
                resource_uri: "/api/v1/organism/1".to_string(),
                scientific_name: Some("Homo sapiens".to_string()),
                slug: Some("homo-sapiens".to_string()),
            },
        },
        annotations,
    }
}
