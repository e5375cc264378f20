//! Scoped edits
//!
//! Wraps the store's `begin_edit` / `end_edit` pair so an edit opened here is
//! closed on every path: committed on success, cancelled on failure. If the
//! target was already being edited when the scope was entered, the scope
//! joins that edit and leaves closing it to whoever opened it.

use crate::db::ContentStore;
use crate::models::EditTarget;
use anyhow::Result;

/// An open (or joined) edit on one target.
pub struct EditScope<'a> {
    store: &'a dyn ContentStore,
    target: EditTarget,
    owned: bool,
    closed: bool,
}

impl<'a> EditScope<'a> {
    /// Open an edit on `target`, or join the one already in progress.
    pub async fn enter(store: &'a dyn ContentStore, target: EditTarget) -> Result<Self> {
        let owned = if store.is_editing(&target).await? {
            tracing::debug!("Joining edit already in progress on {}", target);
            false
        } else {
            store.begin_edit(&target).await?;
            true
        };

        Ok(Self {
            store,
            target,
            owned,
            closed: false,
        })
    }

    /// Whether this scope opened the edit (and will close it)
    pub fn owns_edit(&self) -> bool {
        self.owned
    }

    pub fn target(&self) -> &EditTarget {
        &self.target
    }

    pub async fn set(&self, field: &str, value: &str) -> Result<()> {
        self.store.set_field(&self.target, field, value).await
    }

    /// Commit staged writes if this scope opened the edit
    pub async fn commit(mut self) -> Result<()> {
        self.closed = true;
        if self.owned {
            self.store.end_edit(&self.target).await?;
        }
        Ok(())
    }

    /// Discard staged writes if this scope opened the edit
    pub async fn abort(mut self) -> Result<()> {
        self.closed = true;
        if self.owned {
            self.store.cancel_edit(&self.target).await?;
        }
        Ok(())
    }
}

impl Drop for EditScope<'_> {
    fn drop(&mut self) {
        if self.owned && !self.closed {
            tracing::error!("Edit on {} dropped without commit or abort", self.target);
        }
    }
}

/// Write all `writes` to `target` inside one scoped edit.
///
/// On the first failing write the edit is aborted and that failure is
/// returned; a failing abort is only logged.
pub async fn apply_field_edits(
    store: &dyn ContentStore,
    target: EditTarget,
    writes: &[(String, String)],
) -> Result<()> {
    let scope = EditScope::enter(store, target).await?;

    for (field, value) in writes {
        if let Err(e) = scope.set(field, value).await {
            let target = scope.target().clone();
            if let Err(abort_err) = scope.abort().await {
                tracing::warn!("Failed to abort edit on {}: {}", target, abort_err);
            }
            return Err(e);
        }
    }

    scope.commit().await
}
