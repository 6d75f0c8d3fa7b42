//! Scripted editing sessions.
//!
//! Loads a prior version (or starts a first version), optionally folds in a
//! gene search response the way the search table does, replays an edit
//! script, and builds the version payload.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::sync::broadcast::{self, error::RecvError};
use tracing::{debug, info, warn};
use tribe_annotations::{AnnotationEvent, AnnotationSession, AnnotationSnapshot, EditCommand};
use tribe_common::{GeneId, PriorVersion};
use tribe_search::{GeneSearchResult, ResultPage, SearchResults};
use tribe_versions::NewVersion;

use crate::config::Config;

#[derive(Debug, Clone)]
pub struct ReplayArgs {
    pub prior: Option<PathBuf>,
    pub edits: PathBuf,
    pub search: Option<PathBuf>,
    pub geneset: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ReplayReport {
    pub version: NewVersion,
    pub changes: AnnotationSnapshot,
    /// Search queries still waiting for the curator to pick a gene.
    pub pending_queries: Vec<String>,
    pub events: usize,
}

pub(crate) async fn read_json<T: DeserializeOwned>(path: &Path, what: &str) -> Result<T> {
    let content = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read {what} from {}", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse {what} in {}", path.display()))
}

/// Log session events until the session goes away; returns how many were seen.
async fn log_events(mut rx: broadcast::Receiver<AnnotationEvent>) -> usize {
    let mut seen = 0usize;
    loop {
        match rx.recv().await {
            Ok(event) => {
                seen += 1;
                debug!(?event, "annotation event");
            }
            Err(RecvError::Lagged(skipped)) => {
                warn!("Event log lagged; {skipped} events skipped");
                seen += skipped as usize;
            }
            Err(RecvError::Closed) => break,
        }
    }
    seen
}

fn fold_in_search(
    session: &mut AnnotationSession,
    results: &mut SearchResults,
    config: &Config,
) -> Result<Vec<GeneId>> {
    let token = session.generation();
    let added = session.apply(token, |tracker| Ok(results.add_all_non_ambiguous(tracker)))?;
    let dropped = results.remove_not_found();
    info!(
        "Search: {} genes added unambiguously, {dropped} queries without hits dropped",
        added.len()
    );

    let per_page = config.search.results_per_page;
    for page in 1..=results.total_pages(per_page) {
        for query in results.page(page, per_page) {
            let Some(result) = results.query_results(query) else { continue };
            let candidates = ResultPage::for_query(result, 1, config.search.genes_per_page);
            let symbols: Vec<&str> = candidates.genes.iter().map(|g| g.symbol()).collect();
            info!(
                "Ambiguous query {query:?} (page {page}): {}{}",
                symbols.join(", "),
                if candidates.has_more { ", ..." } else { "" }
            );
        }
    }
    Ok(added)
}

pub async fn run(config: &Config, args: &ReplayArgs) -> Result<ReplayReport> {
    let prior: Option<PriorVersion> = match &args.prior {
        Some(path) => Some(read_json(path, "prior version").await?),
        None => None,
    };
    let edits: Vec<EditCommand> = read_json(&args.edits, "edit script").await?;

    let mut session = AnnotationSession::new(config.session.policy(), config.session.event_capacity);
    let logger = tokio::spawn(log_events(session.subscribe()));

    match &prior {
        Some(p) => {
            info!(
                "Editing {:?} from version {} ({} genes)",
                p.geneset.title,
                p.ver_hash,
                p.annotations.len()
            );
            session.tracker_mut().init(p.annotations.clone());
        }
        None => info!("Building a first version"),
    }

    let mut results = SearchResults::new();
    if let Some(path) = &args.search {
        let batch: Vec<GeneSearchResult> = read_json(path, "gene search response").await?;
        results.merge(batch);
        fold_in_search(&mut session, &mut results, config)?;
    }

    for (i, command) in edits.iter().enumerate() {
        session
            .run(command)
            .with_context(|| format!("Edit #{i} ({}) failed", command.op_name()))?;
    }
    info!("Replayed {} edits in session {}", edits.len(), session.id());

    let version = match &prior {
        Some(p) => NewVersion::from_prior(p, session.tracker()),
        None => {
            let geneset = args
                .geneset
                .as_deref()
                .context("--geneset is required when no prior version is given")?;
            NewVersion::first(geneset, None, session.tracker())
        }
    };
    let version = match &args.description {
        Some(d) => version.with_description(d.clone()),
        None => version,
    };
    version.validate()?;

    let tracker = session.tracker();
    info!(
        "New version: {} genes (+{} / -{} genes, {} genes with added pubs, {} with removed pubs)",
        version.gene_count(),
        tracker.added_genes().len(),
        tracker.removed_genes().len(),
        tracker.added_pubs().len(),
        tracker.removed_pubs().len()
    );
    let changes = tracker.snapshot();

    session.dispose();
    let events = logger.await.context("Event logger task failed")?;

    Ok(ReplayReport {
        version,
        changes,
        pending_queries: results.queries().to_vec(),
        events,
    })
}
