//! Pagination of search results.

use serde::Serialize;
use tribe_common::Gene;

use crate::results::GeneSearchResult;

/// Rows per page of the search results table.
pub const DEFAULT_RESULTS_PER_PAGE: usize = 10;
/// Candidate genes shown per query before "more results".
pub const DEFAULT_GENES_PER_PAGE: usize = 3;

/// `[begin, end)` of a 1-based page, clamped to `len`. Page 0 is page 1.
pub(crate) fn page_bounds(page: usize, per_page: usize, len: usize) -> (usize, usize) {
    let begin = page.saturating_sub(1).saturating_mul(per_page).min(len);
    let end = begin.saturating_add(per_page).min(len);
    (begin, end)
}

/// One page of candidate genes for a single query.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResultPage<'a> {
    pub query: &'a str,
    pub page: usize,
    pub genes: &'a [Gene],
    pub has_more: bool,
    pub has_previous: bool,
}

impl<'a> ResultPage<'a> {
    /// A `per_page` of 0 is treated as 1.
    pub fn for_query(result: &'a GeneSearchResult, page: usize, per_page: usize) -> Self {
        let page = page.max(1);
        let per_page = per_page.max(1);
        let (begin, end) = page_bounds(page, per_page, result.found.len());
        ResultPage {
            query: &result.search,
            page,
            genes: &result.found[begin..end],
            has_more: begin.saturating_add(per_page) < result.found.len(),
            has_previous: begin > 0,
        }
    }

    pub fn next(&self, result: &'a GeneSearchResult, per_page: usize) -> Option<Self> {
        self.has_more
            .then(|| ResultPage::for_query(result, self.page + 1, per_page))
    }

    pub fn previous(&self, result: &'a GeneSearchResult, per_page: usize) -> Option<Self> {
        self.has_previous
            .then(|| ResultPage::for_query(result, self.page - 1, per_page))
    }
}
