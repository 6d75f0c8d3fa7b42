//! Scripted user actions, replayable against a tracker.

use anyhow::anyhow;
use serde::{Deserialize, Serialize};
use tracing::debug;
use tribe_common::{Gene, GeneId, Pmid, Publication, Result, TribeError};

use crate::state::PubState;
use crate::tracker::Annotations;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum EditCommand {
    AddGene { gene: Gene },
    RemoveGene { gene_id: GeneId },
    UndoGene { gene_id: GeneId },
    AddPublication { gene_id: GeneId, publication: Publication },
    RemovePublication { gene_id: GeneId, pmid: Pmid, state: PubState },
    Clear,
}

impl EditCommand {
    pub fn op_name(&self) -> &'static str {
        match self {
            EditCommand::AddGene { .. }           => "add_gene",
            EditCommand::RemoveGene { .. }        => "remove_gene",
            EditCommand::UndoGene { .. }          => "undo_gene",
            EditCommand::AddPublication { .. }    => "add_publication",
            EditCommand::RemovePublication { .. } => "remove_publication",
            EditCommand::Clear                    => "clear",
        }
    }

    pub fn apply(&self, tracker: &mut Annotations) -> Result<()> {
        match self {
            EditCommand::AddGene { gene } => tracker.add_gene(gene.clone()),
            EditCommand::RemoveGene { gene_id } => tracker.remove_gene(*gene_id)?,
            EditCommand::UndoGene { gene_id } => tracker.undo_gene(*gene_id)?,
            EditCommand::AddPublication { gene_id, publication } => {
                tracker.add_publication(publication.clone(), *gene_id);
            }
            EditCommand::RemovePublication { gene_id, pmid, state } => {
                tracker.remove_publication(*pmid, *gene_id, *state)?;
            }
            EditCommand::Clear => tracker.clear(),
        }
        Ok(())
    }
}

/// Apply commands in order, stopping at the first failure.
/// Returns the number of commands applied.
pub fn apply_all(commands: &[EditCommand], tracker: &mut Annotations) -> Result<usize> {
    for (i, command) in commands.iter().enumerate() {
        command.apply(tracker).map_err(|e| {
            TribeError::Other(anyhow!("edit #{i} ({}) failed: {e}", command.op_name()))
        })?;
        debug!("Applied edit #{i} ({})", command.op_name());
    }
    Ok(commands.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tribe_test_utils::baseline;

    #[test]
    fn test_parse_script() {
        let json = r#"[
            {"op": "add_gene", "gene": {"id": 3, "standard_name": "TP53"}},
            {"op": "add_publication", "gene_id": 3, "publication": {"pmid": 300}},
            {"op": "remove_publication", "gene_id": 3, "pmid": 300, "state": "added"},
            {"op": "clear"}
        ]"#;
        let commands: Vec<EditCommand> = serde_json::from_str(json).unwrap();
        assert_eq!(commands.len(), 4);
        assert_eq!(commands[2].op_name(), "remove_publication");
        assert_eq!(commands[3], EditCommand::Clear);
    }

    #[test]
    fn test_apply_all_reports_failing_index() {
        let mut tracker = Annotations::new();
        tracker.init(baseline(&[(1, &[10])]));
        let commands = vec![
            EditCommand::RemoveGene { gene_id: GeneId(1) },
            EditCommand::UndoGene { gene_id: GeneId(1) },
            EditCommand::UndoGene { gene_id: GeneId(1) },
        ];

        let err = apply_all(&commands, &mut tracker).unwrap_err();
        assert!(err.to_string().starts_with("edit #2 (undo_gene) failed"), "{err}");
        assert_eq!(tracker.all().len(), 1);
    }
}
