//! Store Events
//!
//! This module defines the events a content store emits when its tree
//! changes. They follow the observer pattern so reactive services (such as
//! the branch instantiation handler) can subscribe without coupling to the
//! store implementation.
//!
//! # Event Flow
//!
//! 1. The store performs a data operation (create node, commit edit, add version)
//! 2. An event is emitted on a tokio broadcast channel
//! 3. All subscribers receive the event asynchronously

use crate::models::{ContentNode, EditTarget};
use serde::{Deserialize, Serialize};

/// Events emitted by a content store
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "camelCase")]
pub enum StoreEvent {
    /// A new node was created
    NodeCreated(ContentNode),

    /// Staged field writes were committed
    EditCommitted(EditTarget),

    /// A new language version was added to a node
    #[serde(rename_all = "camelCase")]
    VersionAdded {
        node_id: String,
        language: String,
        number: u32,
    },
}

impl StoreEvent {
    /// String representation of the event type, used in log lines
    pub fn event_type(&self) -> &str {
        match self {
            StoreEvent::NodeCreated(_) => "node:created",
            StoreEvent::EditCommitted(_) => "edit:committed",
            StoreEvent::VersionAdded { .. } => "version:added",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Contract test: adjacently-tagged JSON with a camelCase discriminator
    #[test]
    fn test_store_event_serialization_contract() {
        let event = StoreEvent::VersionAdded {
            node_id: "{A}".to_string(),
            language: "fr".to_string(),
            number: 1,
        };

        let parsed: serde_json::Value = serde_json::to_value(&event).unwrap();
        assert_eq!(parsed["type"], "versionAdded");
        assert_eq!(parsed["payload"]["nodeId"], "{A}");
        assert_eq!(parsed["payload"]["number"], 1);
        assert_eq!(event.event_type(), "version:added");
    }

    #[test]
    fn test_edit_committed_round_trip() {
        let event = StoreEvent::EditCommitted(EditTarget::shared("{A}"));
        let json = serde_json::to_string(&event).unwrap();
        let back: StoreEvent = serde_json::from_str(&json).unwrap();
        match back {
            StoreEvent::EditCommitted(target) => assert_eq!(target, EditTarget::shared("{A}")),
            other => panic!("Expected EditCommitted, got {:?}", other),
        }
    }
}
