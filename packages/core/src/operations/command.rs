//! Deep Copy Command
//!
//! The user action that starts the copy pipeline for a selected item. It
//! only builds the request; the pipeline runs elsewhere.

use crate::config::DeepCopyConfig;
use crate::models::ContentNode;
use crate::operations::{CopyParameters, CopyRequest};

/// Whether the command can be invoked for the current selection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandState {
    Enabled,
    Disabled,
}

pub struct DeepCopyCommand {
    pipeline_name: String,
}

impl DeepCopyCommand {
    pub fn new(config: &DeepCopyConfig) -> Self {
        Self {
            pipeline_name: config.pipeline_name.clone(),
        }
    }

    /// Enabled for exactly one selected item that is not read-only.
    ///
    /// Read access is not checked here: `ContentNode` carries no access
    /// rights, so a caller that can see the item is assumed able to read it.
    pub fn query_state(&self, items: &[ContentNode]) -> CommandState {
        match items {
            [item] if !item.read_only => CommandState::Enabled,
            _ => CommandState::Disabled,
        }
    }

    /// Build the pipeline request for `items`.
    ///
    /// `language` may be any language tag; only its primary subtag is sent.
    /// Returns `None` for an empty selection.
    pub fn copy_to(&self, items: &[ContentNode], language: &str) -> Option<CopyRequest> {
        let first = items.first()?;
        let ids = items.iter().map(|item| item.id.clone()).collect();

        tracing::debug!(
            "Starting {} for {} item(s) from {}",
            self.pipeline_name,
            items.len(),
            first.database
        );
        Some(CopyRequest {
            pipeline: self.pipeline_name.clone(),
            parameters: CopyParameters::new(
                first.database.clone(),
                ids,
                two_letter_language(language),
            ),
        })
    }
}

/// Primary subtag of a language tag, lower-cased (`en-US` -> `en`)
fn two_letter_language(tag: &str) -> String {
    tag.split(['-', '_'])
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase()
}
