//! Diff tracking of a version's annotations against its baseline.
//!
//! `annotations` is the working set that gets submitted. Everything else
//! is bookkeeping relative to `init_annotations` (the prior version):
//!
//! - a gene is *added* when it is not in the baseline but is in the working set,
//! - a gene is *removed* when it is in the baseline and currently excluded,
//! - `added_pubs` / `removed_pubs` hold per-gene publication deltas.
//!
//! Publication identity is the PubMed id.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tracing::{debug, warn};
use tribe_common::{Gene, GeneId, Pmid, PriorAnnotation, Publication, Result, TribeError};

use crate::events::AnnotationEvent;
use crate::state::PubState;

/// Gene id → ordered publications.
pub type AnnotationMap = BTreeMap<GeneId, Vec<Publication>>;

/// Behaviour switches for a tracker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackerPolicy {
    /// Ignore `add_publication` for a pmid already attached to the gene.
    pub dedupe_publications: bool,
}

impl Default for TrackerPolicy {
    fn default() -> Self {
        Self { dedupe_publications: true }
    }
}

/// Owned copy of the tracker's state, for rendering or comparison.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnnotationSnapshot {
    pub annotations: AnnotationMap,
    pub added_genes: BTreeSet<GeneId>,
    pub removed_genes: BTreeSet<GeneId>,
    pub added_pubs: AnnotationMap,
    pub removed_pubs: AnnotationMap,
}

#[derive(Debug, Default)]
pub struct Annotations {
    annotations: AnnotationMap,
    init_annotations: AnnotationMap,
    genes: BTreeMap<GeneId, Gene>,
    added_genes: BTreeSet<GeneId>,
    removed_genes: BTreeSet<GeneId>,
    added_pubs: AnnotationMap,
    removed_pubs: AnnotationMap,
    policy: TrackerPolicy,
    events: Option<broadcast::Sender<AnnotationEvent>>,
}

impl Annotations {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_policy(policy: TrackerPolicy) -> Self {
        Self { policy, ..Self::default() }
    }

    pub(crate) fn attach_events(&mut self, tx: broadcast::Sender<AnnotationEvent>) {
        self.events = Some(tx);
    }

    fn emit(&self, event: AnnotationEvent) {
        if let Some(tx) = &self.events {
            // No subscribers is fine.
            let _ = tx.send(event);
        }
    }

    pub fn policy(&self) -> TrackerPolicy {
        self.policy
    }

    // ── Lifecycle ─────────────────────────────────────────────────────────────

    /// Reset every mapping to empty.
    pub fn clear(&mut self) {
        self.annotations.clear();
        self.init_annotations.clear();
        self.genes.clear();
        self.added_genes.clear();
        self.removed_genes.clear();
        self.added_pubs.clear();
        self.removed_pubs.clear();
        debug!("Annotations cleared");
        self.emit(AnnotationEvent::Cleared);
    }

    /// Load the baseline from a prior version's annotations.
    ///
    /// Meant for an empty tracker. On a non-empty one entries are merged
    /// gene by gene, later entries winning.
    pub fn init<I>(&mut self, prior: I)
    where
        I: IntoIterator<Item = PriorAnnotation>,
    {
        if !self.is_empty() {
            warn!(
                "init called on a non-empty tracker ({} genes); merging baseline",
                self.gene_count()
            );
        }

        let mut count = 0usize;
        for PriorAnnotation { gene, pubs } in prior {
            let gid = gene.id;
            self.init_annotations.insert(gid, pubs.clone());
            self.annotations.insert(gid, pubs);
            self.genes.insert(gid, gene);
            count += 1;
        }

        debug!("Baseline initialised with {count} genes");
        self.emit(AnnotationEvent::Initialized { genes: count });
    }

    /// Consume the tracker, returning the working set.
    pub fn into_working_set(self) -> AnnotationMap {
        self.annotations
    }

    // ── Genes ─────────────────────────────────────────────────────────────────

    /// Add a gene to the working set with an empty publication list.
    ///
    /// For a removed baseline gene this clears the removal mark but does not
    /// bring back its parked publications; `undo_gene` does that.
    pub fn add_gene(&mut self, gene: Gene) {
        let gid = gene.id;
        self.genes.insert(gid, gene);

        if self.is_baseline_gene(gid) {
            self.removed_genes.remove(&gid);
        } else {
            self.added_genes.insert(gid);
        }

        if let Some(previous) = self.annotations.insert(gid, Vec::new()) {
            if !previous.is_empty() {
                debug!("add_gene({gid}) reset {} working publications", previous.len());
            }
        }

        debug!("Gene {gid} added");
        self.emit(AnnotationEvent::GeneAdded { gene: gid });
    }

    /// Remove a gene from the working set.
    ///
    /// A baseline gene is marked removed and its working publications are
    /// parked in `removed_pubs` so `undo_gene` can restore them exactly.
    /// A session-added gene simply loses its added marks.
    pub fn remove_gene(&mut self, gid: GeneId) -> Result<()> {
        let working = self.annotations.remove(&gid);
        let mut parked = 0usize;

        if self.is_baseline_gene(gid) {
            self.removed_genes.insert(gid);
            match working {
                Some(pubs) if !pubs.is_empty() => {
                    parked = pubs.len();
                    self.removed_pubs.insert(gid, pubs);
                }
                Some(_) => {
                    self.removed_pubs.remove(&gid);
                }
                // Already removed: keep what was parked the first time.
                None => {}
            }
        } else {
            let was_added = self.added_genes.remove(&gid);
            self.added_pubs.remove(&gid);
            if !was_added && working.is_none() {
                return Err(TribeError::GeneNotTracked(gid));
            }
        }

        debug!("Gene {gid} removed ({parked} publications parked)");
        self.emit(AnnotationEvent::GeneRemoved { gene: gid, parked_pubs: parked });
        Ok(())
    }

    /// Revert the last add or remove of a gene.
    pub fn undo_gene(&mut self, gid: GeneId) -> Result<()> {
        if self.added_genes.remove(&gid) {
            self.added_pubs.remove(&gid);
            self.annotations.remove(&gid);
            debug!("Undid addition of gene {gid}");
            self.emit(AnnotationEvent::GeneDiscarded { gene: gid });
            return Ok(());
        }

        if !self.is_baseline_gene(gid)
            || !(self.removed_genes.contains(&gid) || self.removed_pubs.contains_key(&gid))
        {
            warn!("undo_gene({gid}) with nothing to undo");
            return Err(TribeError::NothingToUndo(gid));
        }

        let parked = self.removed_pubs.remove(&gid).unwrap_or_default();
        let restored = parked.len();
        if self.removed_genes.remove(&gid) {
            self.annotations.insert(gid, parked);
        } else {
            // Gene still in the working set (re-added, or only some pubs
            // detached): parked pubs go back alongside what is there.
            let working = self.annotations.entry(gid).or_default();
            for publication in parked {
                if !working.iter().any(|p| p.pmid == publication.pmid) {
                    working.push(publication);
                }
            }
        }

        debug!("Restored gene {gid} with {restored} publications");
        self.emit(AnnotationEvent::GeneRestored { gene: gid, pubs: restored });
        Ok(())
    }

    // ── Publications ──────────────────────────────────────────────────────────

    /// Attach a publication to a gene, creating its working list if needed.
    ///
    /// A publication parked in `removed_pubs` for the gene is restored
    /// instead of being recorded as added.
    ///
    /// Returns `false` when deduplication is on and the pmid is already
    /// attached to the gene.
    pub fn add_publication(&mut self, publication: Publication, gid: GeneId) -> bool {
        let pmid = publication.pmid;
        let working = self.annotations.entry(gid).or_default();

        if self.policy.dedupe_publications && working.iter().any(|p| p.pmid == pmid) {
            debug!("Publication {pmid} already attached to gene {gid}; ignored");
            return false;
        }

        if let Some(parked) = take(&mut self.removed_pubs, gid, pmid, true) {
            working.push(parked);
            debug!("Publication {pmid} re-attached to gene {gid} from removed_pubs");
            self.emit(AnnotationEvent::PublicationRestored { gene: gid, pmid });
            return true;
        }

        working.push(publication.clone());
        self.added_pubs.entry(gid).or_default().push(publication);

        debug!("Publication {pmid} added to gene {gid}");
        self.emit(AnnotationEvent::PublicationAdded { gene: gid, pmid });
        true
    }

    /// Detach (or, for `Removed`, restore) a publication.
    ///
    /// `state` says where the publication currently sits. It is trusted, but
    /// every list it implies is checked before anything is touched: on error
    /// the tracker is unchanged.
    pub fn remove_publication(
        &mut self,
        pmid: Pmid,
        gid: GeneId,
        state: PubState,
    ) -> Result<Publication> {
        let not_found = |list: &'static str| TribeError::PublicationNotFound { gene: gid, pmid, list };

        match state {
            PubState::Added => {
                require(&self.added_pubs, gid, pmid).ok_or_else(|| not_found("added_pubs"))?;
                require(&self.annotations, gid, pmid).ok_or_else(|| not_found("annotations"))?;

                take(&mut self.added_pubs, gid, pmid, true);
                let publication = take(&mut self.annotations, gid, pmid, false)
                    .ok_or_else(|| not_found("annotations"))?;

                debug!("Publication {pmid} un-added from gene {gid}");
                self.emit(AnnotationEvent::PublicationRemoved { gene: gid, pmid, from: state });
                Ok(publication)
            }
            PubState::Removed => {
                let publication = take(&mut self.removed_pubs, gid, pmid, true)
                    .ok_or_else(|| not_found("removed_pubs"))?;
                self.annotations.entry(gid).or_default().push(publication.clone());

                debug!("Publication {pmid} restored to gene {gid}");
                self.emit(AnnotationEvent::PublicationRestored { gene: gid, pmid });
                Ok(publication)
            }
            PubState::Current => {
                require(&self.annotations, gid, pmid).ok_or_else(|| not_found("annotations"))?;
                let baseline = self.is_baseline_gene(gid);
                if !baseline {
                    require(&self.added_pubs, gid, pmid).ok_or_else(|| not_found("added_pubs"))?;
                }

                let publication = take(&mut self.annotations, gid, pmid, false)
                    .ok_or_else(|| not_found("annotations"))?;
                if baseline {
                    self.removed_pubs.entry(gid).or_default().push(publication.clone());
                } else {
                    take(&mut self.added_pubs, gid, pmid, true);
                }

                debug!("Publication {pmid} removed from gene {gid}");
                self.emit(AnnotationEvent::PublicationRemoved { gene: gid, pmid, from: state });
                Ok(publication)
            }
        }
    }

    /// Badge for a publication attached to (or parked for) a gene.
    pub fn publication_state(&self, gid: GeneId, pmid: Pmid) -> Option<PubState> {
        if require(&self.added_pubs, gid, pmid).is_some() {
            Some(PubState::Added)
        } else if require(&self.removed_pubs, gid, pmid).is_some() {
            Some(PubState::Removed)
        } else if require(&self.annotations, gid, pmid).is_some() {
            Some(PubState::Current)
        } else {
            None
        }
    }

    // ── Views ─────────────────────────────────────────────────────────────────

    /// The working set: what gets submitted as the new version.
    pub fn all(&self) -> &AnnotationMap {
        &self.annotations
    }

    pub fn baseline(&self) -> &AnnotationMap {
        &self.init_annotations
    }

    pub fn genes(&self) -> &BTreeMap<GeneId, Gene> {
        &self.genes
    }

    pub fn gene(&self, gid: GeneId) -> Option<&Gene> {
        self.genes.get(&gid)
    }

    pub fn added_genes(&self) -> &BTreeSet<GeneId> {
        &self.added_genes
    }

    pub fn removed_genes(&self) -> &BTreeSet<GeneId> {
        &self.removed_genes
    }

    pub fn added_pubs(&self) -> &AnnotationMap {
        &self.added_pubs
    }

    pub fn removed_pubs(&self) -> &AnnotationMap {
        &self.removed_pubs
    }

    pub fn is_baseline_gene(&self, gid: GeneId) -> bool {
        self.init_annotations.contains_key(&gid)
    }

    /// Genes currently in the working set.
    pub fn gene_count(&self) -> usize {
        self.annotations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.annotations.is_empty()
            && self.init_annotations.is_empty()
            && self.genes.is_empty()
            && self.added_genes.is_empty()
            && self.removed_genes.is_empty()
            && self.added_pubs.is_empty()
            && self.removed_pubs.is_empty()
    }

    /// True when genes or publications differ from the baseline.
    pub fn has_changes(&self) -> bool {
        !(self.added_genes.is_empty()
            && self.removed_genes.is_empty()
            && self.added_pubs.is_empty()
            && self.removed_pubs.is_empty())
    }

    pub fn snapshot(&self) -> AnnotationSnapshot {
        AnnotationSnapshot {
            annotations: self.annotations.clone(),
            added_genes: self.added_genes.clone(),
            removed_genes: self.removed_genes.clone(),
            added_pubs: self.added_pubs.clone(),
            removed_pubs: self.removed_pubs.clone(),
        }
    }
}

/// Index of `pmid` in `map[gid]`, if both exist.
fn require(map: &AnnotationMap, gid: GeneId, pmid: Pmid) -> Option<usize> {
    map.get(&gid)?.iter().position(|p| p.pmid == pmid)
}

/// Remove the first `pmid` entry from `map[gid]`, dropping the key when the
/// list empties and `prune` is set.
fn take(map: &mut AnnotationMap, gid: GeneId, pmid: Pmid, prune: bool) -> Option<Publication> {
    let list = map.get_mut(&gid)?;
    let idx = list.iter().position(|p| p.pmid == pmid)?;
    let publication = list.remove(idx);
    if prune && list.is_empty() {
        map.remove(&gid);
    }
    Some(publication)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tribe_test_utils::{baseline, gene, publication};

    fn tracker_with(entries: &[(i64, &[i64])]) -> Annotations {
        let mut t = Annotations::new();
        t.init(baseline(entries));
        t
    }

    fn pmids(list: Option<&Vec<Publication>>) -> Vec<i64> {
        list.map(|l| l.iter().map(|p| p.pmid.0).collect()).unwrap_or_default()
    }

    #[test]
    fn test_init_copies_baseline_into_working_set() {
        let t = tracker_with(&[(1, &[10, 11]), (2, &[])]);
        assert_eq!(t.gene_count(), 2);
        assert_eq!(t.all(), t.baseline());
        assert_eq!(t.gene(GeneId(1)).unwrap().symbol(), "G1");
        assert!(!t.has_changes());
    }

    #[test]
    fn test_baseline_does_not_alias_working_set() {
        let mut t = tracker_with(&[(1, &[10])]);
        t.remove_publication(Pmid(10), GeneId(1), PubState::Current).unwrap();
        assert_eq!(pmids(t.all().get(&GeneId(1))), Vec::<i64>::new());
        assert_eq!(pmids(t.baseline().get(&GeneId(1))), vec![10]);
    }

    #[test]
    fn test_add_gene_resets_working_publications() {
        let mut t = tracker_with(&[(1, &[10])]);
        t.add_gene(gene(1, "G1"));
        assert_eq!(t.all()[&GeneId(1)], Vec::<Publication>::new());
        assert!(t.added_genes().is_empty());
    }

    #[test]
    fn test_readd_removed_gene_keeps_pubs_parked() {
        let mut t = tracker_with(&[(1, &[10])]);
        t.remove_gene(GeneId(1)).unwrap();
        t.add_gene(gene(1, "G1"));

        assert!(t.removed_genes().is_empty());
        assert_eq!(t.all()[&GeneId(1)], Vec::<Publication>::new());
        assert_eq!(pmids(t.removed_pubs().get(&GeneId(1))), vec![10]);

        t.undo_gene(GeneId(1)).unwrap();
        assert_eq!(pmids(t.all().get(&GeneId(1))), vec![10]);
        assert!(t.removed_pubs().is_empty());
    }

    #[test]
    fn test_remove_gene_twice_keeps_first_parking() {
        let mut t = tracker_with(&[(1, &[10])]);
        t.remove_gene(GeneId(1)).unwrap();
        t.remove_gene(GeneId(1)).unwrap();
        assert_eq!(pmids(t.removed_pubs().get(&GeneId(1))), vec![10]);
    }

    #[test]
    fn test_remove_unknown_gene_is_an_error() {
        let mut t = Annotations::new();
        let err = t.remove_gene(GeneId(99)).unwrap_err();
        assert!(matches!(err, TribeError::GeneNotTracked(GeneId(99))));
        assert!(t.is_empty());
    }

    #[test]
    fn test_remove_baseline_gene_without_pubs_parks_nothing() {
        let mut t = tracker_with(&[(2, &[])]);
        t.remove_gene(GeneId(2)).unwrap();
        assert!(t.removed_genes().contains(&GeneId(2)));
        assert!(t.removed_pubs().is_empty());

        t.undo_gene(GeneId(2)).unwrap();
        assert_eq!(t.all()[&GeneId(2)], Vec::<Publication>::new());
    }

    #[test]
    fn test_remove_empty_baseline_gene_parks_added_pubs() {
        let mut t = tracker_with(&[(2, &[])]);
        t.add_publication(publication(20), GeneId(2));
        t.remove_gene(GeneId(2)).unwrap();
        assert_eq!(pmids(t.removed_pubs().get(&GeneId(2))), vec![20]);

        t.undo_gene(GeneId(2)).unwrap();
        assert_eq!(pmids(t.all().get(&GeneId(2))), vec![20]);
    }

    #[test]
    fn test_undo_untouched_gene_is_refused() {
        let mut t = tracker_with(&[(1, &[10])]);
        let before = t.snapshot();
        let err = t.undo_gene(GeneId(1)).unwrap_err();
        assert!(matches!(err, TribeError::NothingToUndo(GeneId(1))));
        assert_eq!(t.snapshot(), before);
    }

    #[test]
    fn test_undo_after_detaching_one_pub_keeps_the_rest() {
        let mut t = tracker_with(&[(1, &[10, 11])]);
        t.remove_publication(Pmid(10), GeneId(1), PubState::Current).unwrap();
        assert_eq!(pmids(t.all().get(&GeneId(1))), vec![11]);

        t.undo_gene(GeneId(1)).unwrap();
        assert_eq!(pmids(t.all().get(&GeneId(1))), vec![11, 10]);
        assert!(t.removed_pubs().is_empty());
        assert!(t.removed_genes().is_empty());
    }

    #[test]
    fn test_readding_parked_pub_restores_it() {
        let mut t = tracker_with(&[(1, &[10])]);
        t.remove_publication(Pmid(10), GeneId(1), PubState::Current).unwrap();

        assert!(t.add_publication(publication(10), GeneId(1)));
        assert_eq!(pmids(t.all().get(&GeneId(1))), vec![10]);
        assert!(t.added_pubs().is_empty());
        assert!(t.removed_pubs().is_empty());
        assert_eq!(t.publication_state(GeneId(1), Pmid(10)), Some(PubState::Current));
        assert!(!t.has_changes());

        let err = t.remove_publication(Pmid(10), GeneId(1), PubState::Removed).unwrap_err();
        assert!(matches!(err, TribeError::PublicationNotFound { list: "removed_pubs", .. }));
        assert_eq!(pmids(t.all().get(&GeneId(1))), vec![10]);
    }

    #[test]
    fn test_dedupe_ignores_repeated_pmid() {
        let mut t = Annotations::new();
        t.add_gene(gene(3, "G3"));
        assert!(t.add_publication(publication(30), GeneId(3)));
        assert!(!t.add_publication(publication(30), GeneId(3)));
        assert_eq!(pmids(t.all().get(&GeneId(3))), vec![30]);
        assert_eq!(pmids(t.added_pubs().get(&GeneId(3))), vec![30]);
    }

    #[test]
    fn test_without_dedupe_duplicates_are_kept() {
        let mut t = Annotations::with_policy(TrackerPolicy { dedupe_publications: false });
        t.add_gene(gene(3, "G3"));
        assert!(t.add_publication(publication(30), GeneId(3)));
        assert!(t.add_publication(publication(30), GeneId(3)));
        assert_eq!(pmids(t.all().get(&GeneId(3))), vec![30, 30]);

        t.remove_publication(Pmid(30), GeneId(3), PubState::Added).unwrap();
        assert_eq!(pmids(t.all().get(&GeneId(3))), vec![30]);
        assert_eq!(pmids(t.added_pubs().get(&GeneId(3))), vec![30]);
    }

    #[test]
    fn test_add_publication_creates_missing_list() {
        let mut t = Annotations::new();
        t.add_publication(publication(40), GeneId(4));
        assert_eq!(pmids(t.all().get(&GeneId(4))), vec![40]);
        assert_eq!(pmids(t.added_pubs().get(&GeneId(4))), vec![40]);
    }

    #[test]
    fn test_remove_current_baseline_pub_then_restore() {
        let mut t = tracker_with(&[(1, &[10, 11])]);
        t.remove_publication(Pmid(10), GeneId(1), PubState::Current).unwrap();
        assert_eq!(pmids(t.all().get(&GeneId(1))), vec![11]);
        assert_eq!(pmids(t.removed_pubs().get(&GeneId(1))), vec![10]);
        assert_eq!(t.publication_state(GeneId(1), Pmid(10)), Some(PubState::Removed));

        t.remove_publication(Pmid(10), GeneId(1), PubState::Removed).unwrap();
        assert_eq!(pmids(t.all().get(&GeneId(1))), vec![11, 10]);
        assert!(t.removed_pubs().is_empty());
        assert_eq!(t.publication_state(GeneId(1), Pmid(10)), Some(PubState::Current));
    }

    #[test]
    fn test_remove_current_pub_of_added_gene_prunes_added_pubs() {
        let mut t = Annotations::new();
        t.add_gene(gene(5, "G5"));
        t.add_publication(publication(50), GeneId(5));
        t.remove_publication(Pmid(50), GeneId(5), PubState::Current).unwrap();

        assert_eq!(t.all()[&GeneId(5)], Vec::<Publication>::new());
        assert!(t.added_pubs().is_empty());
        assert!(t.removed_pubs().is_empty());
    }

    #[test]
    fn test_remove_missing_publication_leaves_state_untouched() {
        let mut t = tracker_with(&[(1, &[10])]);
        t.add_publication(publication(12), GeneId(1));
        let before = t.snapshot();

        let err = t.remove_publication(Pmid(10), GeneId(1), PubState::Added).unwrap_err();
        assert!(matches!(
            err,
            TribeError::PublicationNotFound { list: "added_pubs", .. }
        ));
        let err = t.remove_publication(Pmid(99), GeneId(1), PubState::Removed).unwrap_err();
        assert!(matches!(
            err,
            TribeError::PublicationNotFound { list: "removed_pubs", .. }
        ));
        assert_eq!(t.snapshot(), before);
    }

    #[test]
    fn test_has_changes_tracks_deltas() {
        let mut t = tracker_with(&[(1, &[10])]);
        assert!(!t.has_changes());
        t.add_publication(publication(11), GeneId(1));
        assert!(t.has_changes());
        t.remove_publication(Pmid(11), GeneId(1), PubState::Added).unwrap();
        assert!(!t.has_changes());
    }
}
