//! Search results keyed by query term, in the order the terms first came back.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::debug;
use tribe_annotations::Annotations;
use tribe_common::{Gene, GeneId};

use crate::paging::page_bounds;

/// One query term and the genes it matched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneSearchResult {
    pub search: String,
    #[serde(default)]
    pub found: Vec<Gene>,
}

impl GeneSearchResult {
    /// The single unambiguous hit, if there is exactly one.
    pub fn unique_hit(&self) -> Option<&Gene> {
        match self.found.as_slice() {
            [gene] => Some(gene),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.found.is_empty()
    }
}

#[derive(Debug, Default)]
pub struct SearchResults {
    queries: Vec<String>,
    results: HashMap<String, GeneSearchResult>,
}

impl SearchResults {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn queries(&self) -> &[String] {
        &self.queries
    }

    pub fn query_results(&self, query: &str) -> Option<&GeneSearchResult> {
        self.results.get(query)
    }

    pub fn results(&self) -> &HashMap<String, GeneSearchResult> {
        &self.results
    }

    pub fn len(&self) -> usize {
        self.queries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queries.is_empty()
    }

    /// Drop a query and its results.
    pub fn remove(&mut self, query: &str) -> Option<GeneSearchResult> {
        self.queries.retain(|q| q != query);
        self.results.remove(query)
    }

    pub fn clear(&mut self) {
        self.queries.clear();
        self.results.clear();
    }

    /// Fold a search response in. Terms already listed keep their original
    /// results. Returns true when at least one new term was added.
    pub fn merge<I>(&mut self, batch: I) -> bool
    where
        I: IntoIterator<Item = GeneSearchResult>,
    {
        let previous = self.queries.len();
        for result in batch {
            if self.results.contains_key(&result.search) {
                continue;
            }
            self.queries.push(result.search.clone());
            self.results.insert(result.search.clone(), result);
        }
        let added = self.queries.len() - previous;
        debug!("Merged search response: {added} new queries ({} total)", self.queries.len());
        added > 0
    }

    /// Queries shown on a 1-based page of the results table.
    pub fn page(&self, page: usize, per_page: usize) -> &[String] {
        let (begin, end) = page_bounds(page, per_page, self.queries.len());
        &self.queries[begin..end]
    }

    pub fn total_pages(&self, per_page: usize) -> usize {
        if per_page == 0 {
            return 0;
        }
        self.queries.len().div_ceil(per_page)
    }

    /// Add every gene that is the only hit for its query, dropping those
    /// queries. Returns the genes added, in query order.
    pub fn add_all_non_ambiguous(&mut self, tracker: &mut Annotations) -> Vec<GeneId> {
        let picks: Vec<(String, Gene)> = self
            .queries
            .iter()
            .filter_map(|q| {
                let hit = self.results.get(q)?.unique_hit()?;
                Some((q.clone(), hit.clone()))
            })
            .collect();

        let mut added = Vec::with_capacity(picks.len());
        for (query, gene) in picks {
            added.push(gene.id);
            tracker.add_gene(gene);
            self.remove(&query);
        }
        debug!("Added {} unambiguous genes", added.len());
        added
    }

    /// Drop every query that matched nothing. Returns how many were dropped.
    pub fn remove_not_found(&mut self) -> usize {
        let empty: Vec<String> = self
            .queries
            .iter()
            .filter(|q| self.results.get(*q).is_some_and(GeneSearchResult::is_not_found))
            .cloned()
            .collect();
        for query in &empty {
            self.remove(query);
        }
        empty.len()
    }

    /// The curator picked `gene` for `query`: add it and drop the query.
    /// Returns whether the query was still listed.
    pub fn select(&mut self, query: &str, gene: Gene, tracker: &mut Annotations) -> bool {
        tracker.add_gene(gene);
        self.remove(query).is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tribe_test_utils::gene;

    fn result(search: &str, found: Vec<Gene>) -> GeneSearchResult {
        GeneSearchResult { search: search.to_string(), found }
    }

    #[test]
    fn test_merge_keeps_first_results_and_order() {
        let mut results = SearchResults::new();
        assert!(results.merge(vec![
            result("BRCA1", vec![gene(1, "BRCA1")]),
            result("TP53", vec![]),
        ]));
        assert!(!results.merge(vec![result("BRCA1", vec![gene(9, "OTHER")])]));
        assert!(results.merge(vec![result("KRAS", vec![gene(3, "KRAS")])]));

        assert_eq!(results.queries(), ["BRCA1", "TP53", "KRAS"]);
        assert_eq!(results.query_results("BRCA1").unwrap().found[0].id, GeneId(1));
    }

    #[test]
    fn test_page_bounds() {
        let mut results = SearchResults::new();
        results.merge((0..23).map(|i| result(&format!("Q{i}"), vec![])));

        assert_eq!(results.page(1, 10).len(), 10);
        assert_eq!(results.page(3, 10), ["Q20", "Q21", "Q22"]);
        assert!(results.page(4, 10).is_empty());
        assert_eq!(results.total_pages(10), 3);
    }

    #[test]
    fn test_add_all_non_ambiguous() {
        let mut results = SearchResults::new();
        results.merge(vec![
            result("BRCA1", vec![gene(1, "BRCA1")]),
            result("ABC", vec![gene(2, "ABC1"), gene(3, "ABC2")]),
            result("NOPE", vec![]),
            result("KRAS", vec![gene(4, "KRAS")]),
        ]);
        let mut tracker = Annotations::new();

        let added = results.add_all_non_ambiguous(&mut tracker);
        assert_eq!(added, vec![GeneId(1), GeneId(4)]);
        assert_eq!(results.queries(), ["ABC", "NOPE"]);
        assert!(tracker.added_genes().contains(&GeneId(4)));
    }

    #[test]
    fn test_remove_not_found() {
        let mut results = SearchResults::new();
        results.merge(vec![
            result("NOPE", vec![]),
            result("KRAS", vec![gene(4, "KRAS")]),
            result("NADA", vec![]),
        ]);
        assert_eq!(results.remove_not_found(), 2);
        assert_eq!(results.queries(), ["KRAS"]);
    }

    #[test]
    fn test_select_adds_gene_and_drops_query() {
        let mut results = SearchResults::new();
        results.merge(vec![result("ABC", vec![gene(2, "ABC1"), gene(3, "ABC2")])]);
        let mut tracker = Annotations::new();

        assert!(results.select("ABC", gene(3, "ABC2"), &mut tracker));
        assert!(results.is_empty());
        assert!(tracker.all().contains_key(&GeneId(3)));
        assert!(!results.select("ABC", gene(2, "ABC1"), &mut tracker));
    }
}
