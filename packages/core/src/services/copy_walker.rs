//! Subtree Pair Walker
//!
//! Feeds every corresponding (original, copy) node pair of a copied subtree
//! to the [`ReferenceRemapper`]. Correspondence is positional: both subtrees
//! are flattened in document order and the i-th original descendant is
//! paired with the i-th copy descendant.
//!
//! ## Ordering precondition
//!
//! The copy step must create descendants in the same relative document order
//! as the originals. This is not enforced. Pairs whose paths relative to
//! their roots disagree are still remapped, but logged and counted as
//! `misaligned` so a broken copy step shows up in the report.

use crate::models::{ContentNode, CopyPair};
use crate::services::error::DeepCopyError;
use crate::services::reference_remapper::{ReferenceRemapper, RemapOutcome};
use crate::utils::{flatten_descendants, relative_path};

/// Totals for one copy operation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CopyReport {
    /// Node pairs handed to the remapper (roots included)
    pub pairs: usize,
    /// Nodes whose definition was written back
    pub nodes_written: usize,
    pub references_rewritten: usize,
    pub references_cleared: usize,
    /// Original descendants with no positional counterpart, or the reverse
    pub skipped_descendants: usize,
    /// Pairs whose relative paths differ
    pub misaligned: usize,
}

impl CopyReport {
    fn record(&mut self, outcome: RemapOutcome) {
        self.pairs += 1;
        self.references_rewritten += outcome.rewritten;
        self.references_cleared += outcome.cleared;
        if outcome.written {
            self.nodes_written += 1;
        }
    }
}

/// Walks copied subtrees pair by pair.
pub struct SubtreePairWalker {
    remapper: ReferenceRemapper,
}

impl SubtreePairWalker {
    pub fn new(remapper: ReferenceRemapper) -> Self {
        Self { remapper }
    }

    pub fn remapper(&self) -> &ReferenceRemapper {
        &self.remapper
    }

    /// Remap every pending root pair and its descendants, then clear the
    /// pending list.
    ///
    /// A store failure stops the walk; pairs already processed stay written
    /// and the pending list is left as it was.
    pub async fn remap_copied_tree(
        &self,
        pending: &mut Vec<CopyPair>,
    ) -> Result<CopyReport, DeepCopyError> {
        let mut report = CopyReport::default();
        for pair in pending.iter() {
            self.remap_pair(pair, &mut report).await?;
        }
        pending.clear();
        Ok(report)
    }

    /// Remap one root pair and its positionally paired descendants.
    pub async fn remap_pair(
        &self,
        pair: &CopyPair,
        report: &mut CopyReport,
    ) -> Result<(), DeepCopyError> {
        let CopyPair { original, copy } = pair;
        report.record(self.remapper.remap(original, copy).await?);

        let store = self.remapper.store().as_ref();
        let originals = flatten_descendants(store, original).await?;
        let copies = flatten_descendants(store, copy).await?;

        if originals.len() != copies.len() {
            tracing::debug!(
                "Subtree sizes differ for {} -> {} ({} vs {}); extra nodes are skipped",
                original.path,
                copy.path,
                originals.len(),
                copies.len()
            );
            report.skipped_descendants += originals.len().abs_diff(copies.len());
        }

        for (original_child, copy_child) in originals.iter().zip(copies.iter()) {
            if !aligned(original, original_child, copy, copy_child) {
                tracing::warn!(
                    "Positional pair {} -> {} does not match structurally; copy order may differ",
                    original_child.path,
                    copy_child.path
                );
                report.misaligned += 1;
            }
            report.record(self.remapper.remap(original_child, copy_child).await?);
        }

        Ok(())
    }
}

/// Whether both nodes sit at the same relative path below their roots
fn aligned(
    original_root: &ContentNode,
    original: &ContentNode,
    copy_root: &ContentNode,
    copy: &ContentNode,
) -> bool {
    match (
        relative_path(&original_root.path, &original.path),
        relative_path(&copy_root.path, &copy.path),
    ) {
        (Some(a), Some(b)) => a.eq_ignore_ascii_case(b),
        _ => false,
    }
}
