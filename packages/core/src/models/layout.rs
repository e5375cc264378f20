//! Presentation Definition (Layout) Model
//!
//! A node's presentation definition is persisted as a JSON document in its
//! reference field (`__Renderings` by default):
//!
//! ```json
//! {"devices":[{"id":"{DEVICE}","layout":"{LAYOUT}","renderings":[
//!     {"id":"{RENDERING}","placeholder":"main","ds":"/content/home/page/data1"}
//! ]}]}
//! ```
//!
//! Reference-bearing entries always sit at the same depth
//! (`devices[*].renderings[*]`). The datasource attribute is read under both
//! historical spellings, `s:ds` and `ds`, and always written back as `ds`.
//! Anything else in the document is carried through untouched and in order.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Canonical spelling of the datasource attribute
pub const DATASOURCE_ATTRIBUTE: &str = "ds";

/// Legacy, namespaced spelling of the datasource attribute
pub const LEGACY_DATASOURCE_ATTRIBUTE: &str = "s:ds";

/// Parsed presentation definition of one node.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LayoutDefinition {
    #[serde(default)]
    pub devices: Vec<DeviceDefinition>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Renderings bound to one output device.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DeviceDefinition {
    #[serde(default)]
    pub renderings: Vec<RenderingDefinition>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A presentation component placed on the page.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RenderingDefinition {
    #[serde(flatten)]
    pub extra: Map<String, Value>,

    /// Datasource reference: a full path or a node identifier
    #[serde(
        rename = "ds",
        alias = "s:ds",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub datasource: Option<String>,
}

impl LayoutDefinition {
    /// Parse a serialized definition.
    ///
    /// Blank or malformed input yields `None`: there is nothing to remap.
    pub fn parse(raw: &str) -> Option<Self> {
        if raw.trim().is_empty() {
            return None;
        }

        match serde_json::from_str(raw) {
            Ok(definition) => Some(definition),
            Err(e) => {
                tracing::debug!("Ignoring unparsable presentation definition: {}", e);
                None
            }
        }
    }

    /// Serialize back into the persisted field format
    pub fn serialize(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Handles for every rendering that carries a datasource attribute, in
    /// document order.
    pub fn reference_handles(&mut self) -> impl Iterator<Item = ReferenceHandle<'_>> + '_ {
        self.devices
            .iter_mut()
            .flat_map(|device| device.renderings.iter_mut())
            .filter_map(|rendering| rendering.datasource.as_mut())
            .map(|value| ReferenceHandle { value })
    }
}

/// Mutable view on one datasource attribute.
#[derive(Debug)]
pub struct ReferenceHandle<'a> {
    value: &'a mut String,
}

impl ReferenceHandle<'_> {
    pub fn get(&self) -> &str {
        self.value.as_str()
    }

    pub fn is_empty(&self) -> bool {
        self.value.is_empty()
    }

    /// Replace the value. Returns whether it actually changed.
    pub fn set(&mut self, value: &str) -> bool {
        if self.value.as_str() == value {
            return false;
        }
        value.clone_into(self.value);
        true
    }

    /// Empty the reference. Returns whether it actually changed.
    pub fn clear(&mut self) -> bool {
        self.set("")
    }
}
