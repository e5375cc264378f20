//! Copy Operation Types
//!
//! Request and argument types exchanged between the copy command, the copy
//! pipeline and the [`DeepCopyProcessor`](crate::services::DeepCopyProcessor).
//! The pipeline itself is an external collaborator; these types model what it
//! hands over.

pub mod command;

pub use command::{CommandState, DeepCopyCommand};

use crate::models::ContentNode;
use serde::{Deserialize, Serialize};

/// Separator of the `items` parameter
pub const ITEM_SEPARATOR: char = '|';

/// Parameters of a copy request as the pipeline carries them
///
/// `items` is persisted as a single pipe-separated string:
///
/// ```rust
/// # use deepcopy_core::operations::CopyParameters;
/// let params = CopyParameters::new("master", vec!["{A}".into(), "{B}".into()], "en");
/// let json = serde_json::to_value(&params).unwrap();
/// assert_eq!(json["items"], "{A}|{B}");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CopyParameters {
    /// Store the items live in
    pub database: String,

    /// Identifiers of the items to copy, in selection order
    #[serde(with = "pipe_list")]
    pub items: Vec<String>,

    /// Two-letter language of the current user
    pub language: String,

    /// Where the copies are placed; supplied by the pipeline's target picker
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub destination: Option<String>,
}

impl CopyParameters {
    pub fn new(database: impl Into<String>, items: Vec<String>, language: impl Into<String>) -> Self {
        Self {
            database: database.into(),
            items,
            language: language.into(),
            destination: None,
        }
    }
}

/// A request to start the copy pipeline
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CopyRequest {
    pub pipeline: String,
    pub parameters: CopyParameters,
}

/// Arguments the copy pipeline passes to the reference repair step
///
/// `copies` holds the copy roots the pipeline's copy step produced, in the
/// same order as `parameters.items`. The processor drains it once the
/// copies are repaired.
#[derive(Debug, Clone)]
pub struct CopyItemsArgs {
    pub parameters: CopyParameters,
    pub copies: Vec<ContentNode>,
}

impl CopyItemsArgs {
    /// Arguments for a request once the user picked a destination and the
    /// copy step ran
    pub fn from_request(
        request: CopyRequest,
        destination: impl Into<String>,
        copies: Vec<ContentNode>,
    ) -> Self {
        let mut parameters = request.parameters;
        parameters.destination = Some(destination.into());
        Self { parameters, copies }
    }
}

/// Join identifiers into the pipe-separated wire form
pub fn join_items(items: &[String]) -> String {
    items.join(&ITEM_SEPARATOR.to_string())
}

/// Split the pipe-separated wire form, dropping blank entries
pub fn split_items(raw: &str) -> Vec<String> {
    raw.split(ITEM_SEPARATOR)
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}

mod pipe_list {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(items: &[String], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&super::join_items(items))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<String>, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(super::split_items(&raw))
    }
}
