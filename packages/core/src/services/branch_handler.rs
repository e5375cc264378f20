//! Branch Instantiation Handler
//!
//! Reacts to nodes created from a branch template. A branch template holds
//! exactly one child (the subtree that gets stamped out); the new node is
//! that child's structural twin. The handler remaps the new node's
//! datasources against the twin and, when the branch asks for it, fills the
//! new subtree's missing language versions from the template.
//!
//! The handler can be called directly with [`on_node_created`] or driven
//! from a store's event channel with [`run`] / [`spawn`].
//!
//! [`on_node_created`]: BranchInstantiationHandler::on_node_created
//! [`run`]: BranchInstantiationHandler::run
//! [`spawn`]: BranchInstantiationHandler::spawn

use crate::config::DeepCopyConfig;
use crate::db::{ContentStore, StoreEvent};
use crate::models::{BranchPair, ContentNode};
use crate::services::error::DeepCopyError;
use crate::services::reference_remapper::{ReferenceRemapper, RemapOutcome};
use crate::services::version_propagator::{PropagationReport, VersionPropagator};
use crate::utils::flatten_descendants;
use std::sync::Arc;
use tokio::sync::broadcast::{self, error::RecvError};
use tokio::task::JoinHandle;

/// Value of the propagation flag that enables it
const FLAG_ENABLED: &str = "1";

/// Why a creation event was not handled
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IgnoreReason {
    /// Created in a store other than the configured one
    ForeignDatabase { database: String },
    /// The node carries no branch identifier
    NotFromBranch,
    /// The branch identifier does not resolve
    BranchNotFound { branch_id: String },
    /// The branch template does not have exactly one child
    UnsupportedBranchShape { children: usize },
}

/// Result of handling one creation event
#[derive(Debug, Clone, PartialEq)]
pub enum BranchOutcome {
    Ignored(IgnoreReason),
    Handled {
        remap: RemapOutcome,
        /// `None` when propagation was not requested or not applicable
        propagation: Option<PropagationReport>,
    },
}

pub struct BranchInstantiationHandler {
    store: Arc<dyn ContentStore>,
    database: String,
    propagate_versions_field: String,
    remapper: ReferenceRemapper,
    propagator: VersionPropagator,
}

impl BranchInstantiationHandler {
    pub fn new(store: Arc<dyn ContentStore>, config: &DeepCopyConfig) -> Self {
        Self {
            remapper: ReferenceRemapper::new(store.clone(), config),
            propagator: VersionPropagator::new(store.clone()),
            database: config.database.clone(),
            propagate_versions_field: config.propagate_versions_field.clone(),
            store,
        }
    }

    /// Handle the creation of `node`.
    pub async fn on_node_created(&self, node: &ContentNode) -> Result<BranchOutcome, DeepCopyError> {
        if !node.database.eq_ignore_ascii_case(&self.database) {
            return Ok(BranchOutcome::Ignored(IgnoreReason::ForeignDatabase {
                database: node.database.clone(),
            }));
        }
        let Some(branch_id) = node.branch_id.as_deref() else {
            return Ok(BranchOutcome::Ignored(IgnoreReason::NotFromBranch));
        };
        let Some(branch) = self.store.get_node(branch_id).await? else {
            tracing::warn!("Branch {} of {} not found", branch_id, node.path);
            return Ok(BranchOutcome::Ignored(IgnoreReason::BranchNotFound {
                branch_id: branch_id.to_string(),
            }));
        };

        let mut children = self.store.get_children(&branch.id).await?;
        if children.len() != 1 {
            tracing::debug!(
                "Branch {} has {} children; only single-child branches are handled",
                branch.path,
                children.len()
            );
            return Ok(BranchOutcome::Ignored(IgnoreReason::UnsupportedBranchShape {
                children: children.len(),
            }));
        }
        let pair = BranchPair {
            template: children.remove(0),
            created: node.clone(),
        };

        let remap = self.remapper.remap(&pair.template, &pair.created).await?;

        let propagation = if self.should_propagate(&branch, &pair) {
            Some(self.propagator.propagate(&pair.template, &pair.created).await?)
        } else {
            None
        };

        Ok(BranchOutcome::Handled { remap, propagation })
    }

    /// Propagation runs when the branch enables it and the node kept the
    /// twin's template.
    fn should_propagate(&self, branch: &ContentNode, pair: &BranchPair) -> bool {
        branch.field(&self.propagate_versions_field) == Some(FLAG_ENABLED)
            && pair.created.template_id == pair.template.template_id
    }

    /// Handle every node of the instantiation `node` belongs to.
    ///
    /// Used after the listener dropped events: the oldest events of a burst,
    /// including the instance root, are the ones lost. The walk climbs to the
    /// outermost ancestor carrying the same branch and handles it and all its
    /// same-branch descendants in document order. Handling a node twice is a
    /// no-op, so nodes already handled before the lag are safe to revisit.
    ///
    /// # Returns
    ///
    /// Number of nodes handed to [`on_node_created`](Self::on_node_created)
    pub async fn recover_instance(&self, node: &ContentNode) -> Result<usize, DeepCopyError> {
        let Some(branch_id) = node.branch_id.as_deref() else {
            return Ok(0);
        };

        let mut root = node.clone();
        while let Some(parent_id) = root.parent_id.clone() {
            match self.store.get_node(&parent_id).await? {
                Some(parent) if parent.branch_id.as_deref() == Some(branch_id) => root = parent,
                _ => break,
            }
        }
        tracing::info!("Recovering branch instance {} after dropped events", root.path);

        let mut nodes = vec![root.clone()];
        nodes.extend(
            flatten_descendants(self.store.as_ref(), &root)
                .await?
                .into_iter()
                .filter(|n| n.branch_id.as_deref() == Some(branch_id)),
        );

        let mut handled = 0;
        for node in &nodes {
            self.handle_logged(node).await;
            handled += 1;
        }
        Ok(handled)
    }

    async fn handle_logged(&self, node: &ContentNode) {
        match self.on_node_created(node).await {
            Ok(BranchOutcome::Handled { remap, propagation }) => {
                tracing::debug!(
                    "Handled branch instance {}: {:?}, propagation {:?}",
                    node.path,
                    remap,
                    propagation
                );
            }
            Ok(BranchOutcome::Ignored(_)) => {}
            Err(e) => {
                tracing::error!("Failed to handle creation of {}: {}", node.path, e);
            }
        }
    }

    /// Handle creation events until the channel closes.
    ///
    /// Failures are logged and do not stop the loop. After the receiver
    /// lagged, the next creation event is treated as a survivor of a burst
    /// and its whole instantiation is handled again.
    pub async fn run(self: Arc<Self>, mut events: broadcast::Receiver<StoreEvent>) {
        tracing::info!("Branch instantiation handler listening for {}", self.database);
        let mut lagged = false;
        loop {
            match events.recv().await {
                Ok(StoreEvent::NodeCreated(node)) => {
                    if std::mem::take(&mut lagged) && node.branch_id.is_some() {
                        if let Err(e) = self.recover_instance(&node).await {
                            tracing::error!("Failed to recover instance of {}: {}", node.path, e);
                        }
                    } else {
                        self.handle_logged(&node).await;
                    }
                }
                Ok(_) => {}
                Err(RecvError::Lagged(missed)) => {
                    tracing::warn!("Branch handler lagged; {} event(s) dropped", missed);
                    lagged = true;
                }
                Err(RecvError::Closed) => {
                    tracing::info!("Event channel closed, branch handler stopping");
                    break;
                }
            }
        }
    }

    /// Run the handler on a background task
    pub fn spawn(self: Arc<Self>, events: broadcast::Receiver<StoreEvent>) -> JoinHandle<()> {
        tokio::spawn(self.run(events))
    }
}
