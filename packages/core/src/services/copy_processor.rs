//! Deep Copy Processor
//!
//! The reference repair step of the copy pipeline. By the time it runs the
//! pipeline's copy step has already duplicated the selected items under the
//! destination; this step pairs each original with its copy, records an
//! audit entry, and walks the pair.

use crate::config::DeepCopyConfig;
use crate::db::ContentStore;
use crate::models::CopyPair;
use crate::operations::CopyItemsArgs;
use crate::services::copy_walker::{CopyReport, SubtreePairWalker};
use crate::services::error::DeepCopyError;
use crate::services::reference_remapper::ReferenceRemapper;
use crate::utils::AUDIT_TARGET;
use std::sync::Arc;

pub struct DeepCopyProcessor {
    store: Arc<dyn ContentStore>,
    walker: SubtreePairWalker,
}

impl DeepCopyProcessor {
    pub fn new(store: Arc<dyn ContentStore>, config: &DeepCopyConfig) -> Self {
        let remapper = ReferenceRemapper::new(store.clone(), config);
        Self {
            store,
            walker: SubtreePairWalker::new(remapper),
        }
    }

    /// Repair the copies described by `args`.
    ///
    /// Preconditions are checked before anything is touched: a destination
    /// must be given and exist, and the request must target this store.
    /// Item identifiers that no longer resolve are dropped; originals and
    /// copies are then paired by position. `args.copies` is emptied on
    /// success.
    pub async fn execute(&self, args: &mut CopyItemsArgs) -> Result<CopyReport, DeepCopyError> {
        let params = &args.parameters;

        let destination = params
            .destination
            .as_deref()
            .filter(|d| !d.trim().is_empty())
            .ok_or_else(|| DeepCopyError::missing_parameter("destination"))?;
        let destination = self
            .store
            .get_node(destination)
            .await?
            .ok_or_else(|| DeepCopyError::destination_not_found(destination))?;

        if !params.database.eq_ignore_ascii_case(self.store.name()) {
            return Err(DeepCopyError::unknown_database(
                &params.database,
                self.store.name(),
            ));
        }

        let mut originals = Vec::with_capacity(params.items.len());
        for id in &params.items {
            match self.store.get_node(id).await? {
                Some(node) => originals.push(node),
                None => tracing::warn!("Copied item {} no longer exists; skipping", id),
            }
        }

        if originals.len() != args.copies.len() {
            tracing::warn!(
                "{} item(s) but {} copies; pairing the first {}",
                originals.len(),
                args.copies.len(),
                originals.len().min(args.copies.len())
            );
        }

        let mut pending: Vec<CopyPair> = originals
            .into_iter()
            .zip(args.copies.iter().cloned())
            .map(|(original, copy)| CopyPair::new(original, copy))
            .collect();

        for pair in &pending {
            tracing::info!(
                target: AUDIT_TARGET,
                item = %pair.original.path,
                destination = %destination.path,
                copy = %pair.copy.path,
                "Copy item"
            );
        }

        let report = self.walker.remap_copied_tree(&mut pending).await?;
        args.copies.clear();

        tracing::info!(
            "Deep copy to {} finished: {} pair(s), {} node(s) written",
            destination.path,
            report.pairs,
            report.nodes_written
        );
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::operations::{CopyParameters, CopyRequest};
    use crate::services::test_support::{datasources, Fixture};

    fn request(database: &str, items: Vec<String>) -> CopyRequest {
        CopyRequest {
            pipeline: "uiDeepCopyItems".into(),
            parameters: CopyParameters::new(database, items, "en"),
        }
    }

    #[tokio::test]
    async fn test_execute_remaps_and_clears_copies() {
        let fx = Fixture::new().await;
        fx.set_layout(&fx.page.id, &["/a/page/data1"]).await;
        let copy = fx.copy_page().await;
        let processor = DeepCopyProcessor::new(fx.store.clone(), &fx.config());

        let mut args = CopyItemsArgs::from_request(
            request("master", vec![fx.page.id.clone()]),
            fx.b.id.clone(),
            vec![copy.clone()],
        );
        let report = processor.execute(&mut args).await.unwrap();

        assert!(args.copies.is_empty());
        assert_eq!(report.references_rewritten, 1);
        assert_eq!(
            datasources(&fx.store, &copy.id).await,
            vec![fx.node("/b/page2/data1").await.id]
        );
    }

    #[tokio::test]
    async fn test_missing_destination_is_rejected_before_processing() {
        let fx = Fixture::new().await;
        fx.set_layout(&fx.page.id, &["/a/page/data1"]).await;
        let copy = fx.copy_page().await;
        let processor = DeepCopyProcessor::new(fx.store.clone(), &fx.config());

        let mut args = CopyItemsArgs {
            parameters: CopyParameters::new("master", vec![fx.page.id.clone()], "en"),
            copies: vec![copy.clone()],
        };
        let err = processor.execute(&mut args).await.unwrap_err();
        assert!(matches!(err, DeepCopyError::MissingParameter { .. }));

        args.parameters.destination = Some("/nowhere".into());
        let err = processor.execute(&mut args).await.unwrap_err();
        assert!(matches!(err, DeepCopyError::DestinationNotFound { .. }));

        // Nothing processed, nothing drained
        assert_eq!(args.copies.len(), 1);
        assert_eq!(
            datasources(&fx.store, &copy.id).await,
            vec!["/a/page/data1".to_string()]
        );
    }

    #[tokio::test]
    async fn test_foreign_database_is_rejected() {
        let fx = Fixture::new().await;
        let processor = DeepCopyProcessor::new(fx.store.clone(), &fx.config());

        let mut args = CopyItemsArgs::from_request(
            request("web", vec![fx.page.id.clone()]),
            fx.b.id.clone(),
            vec![],
        );
        let err = processor.execute(&mut args).await.unwrap_err();
        assert!(matches!(err, DeepCopyError::UnknownDatabase { .. }));
    }

    #[tokio::test]
    async fn test_unresolvable_items_are_dropped_before_pairing() {
        let fx = Fixture::new().await;
        fx.set_layout(&fx.page.id, &["/a/page/data1"]).await;
        let copy = fx.copy_page().await;
        let processor = DeepCopyProcessor::new(fx.store.clone(), &fx.config());

        let items = vec![
            "{00000000-0000-0000-0000-000000000000}".to_string(),
            fx.page.id.clone(),
        ];
        let mut args =
            CopyItemsArgs::from_request(request("master", items), "/b", vec![copy.clone()]);
        let report = processor.execute(&mut args).await.unwrap();

        // The page still pairs with its copy
        assert_eq!(report.references_rewritten, 1);
        assert_eq!(report.misaligned, 0);
    }
}
