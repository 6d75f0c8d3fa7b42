//! tribe-search — Client-side bookkeeping of gene search results.
//!
//! A gene search sends one or more query terms and receives, per term, the
//! candidate genes found. Queries stay listed until the curator picks a gene
//! (which adds it to the version being edited) or dismisses the query.

pub mod paging;
pub mod results;

pub use paging::{ResultPage, DEFAULT_GENES_PER_PAGE, DEFAULT_RESULTS_PER_PAGE};
pub use results::{GeneSearchResult, SearchResults};
