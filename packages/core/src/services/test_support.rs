//! Shared fixtures for service tests

use crate::config::DeepCopyConfig;
use crate::db::{ContentStore, MemoryStore, NewNode};
use crate::models::ContentNode;
use serde_json::{json, Value};
use std::sync::Arc;

pub(crate) const RENDERINGS: &str = "__Renderings";

/// Serialized presentation definition with one rendering per datasource
pub(crate) fn layout_json(datasources: &[&str]) -> String {
    let renderings: Vec<Value> = datasources
        .iter()
        .enumerate()
        .map(|(i, ds)| json!({"id": format!("{{R{}}}", i), "placeholder": "main", "ds": ds}))
        .collect();
    json!({"devices": [{"id": "{DEFAULT-DEVICE}", "renderings": renderings}]}).to_string()
}

/// Datasource values of a node's presentation definition, in order
pub(crate) async fn datasources(store: &MemoryStore, id: &str) -> Vec<String> {
    let node = store.get_node(id).await.unwrap().unwrap();
    let raw = node.field(RENDERINGS).unwrap_or_default();
    let parsed: Value = serde_json::from_str(raw).unwrap();
    parsed["devices"][0]["renderings"]
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["ds"].as_str().unwrap_or_default().to_string())
        .collect()
}

/// Content tree used across service tests:
///
/// ```text
/// /a/page
/// /a/page/data1
/// /a/page/data2
/// /a/page/data2/text
/// /shared/lib1
/// /b
/// ```
pub(crate) struct Fixture {
    pub store: Arc<MemoryStore>,
    pub page: ContentNode,
    pub data1: ContentNode,
    pub text: ContentNode,
    pub lib1: ContentNode,
    pub b: ContentNode,
}

impl Fixture {
    pub async fn new() -> Self {
        let store = Arc::new(MemoryStore::with_languages("master", &["en", "fr", "de"]));
        let a = store.create_root("a", "{FOLDER}").await.unwrap();
        let page = store
            .create_node(&a.id, NewNode::new("page", "{PAGE}"))
            .await
            .unwrap();
        let data1 = store
            .create_node(&page.id, NewNode::new("data1", "{DATA}"))
            .await
            .unwrap();
        let data2 = store
            .create_node(&page.id, NewNode::new("data2", "{FOLDER}"))
            .await
            .unwrap();
        let text = store
            .create_node(&data2.id, NewNode::new("text", "{DATA}"))
            .await
            .unwrap();
        let shared = store.create_root("shared", "{FOLDER}").await.unwrap();
        let lib1 = store
            .create_node(&shared.id, NewNode::new("lib1", "{DATA}"))
            .await
            .unwrap();
        let b = store.create_root("b", "{FOLDER}").await.unwrap();

        Self {
            store,
            page,
            data1,
            text,
            lib1,
            b,
        }
    }

    /// Store the presentation definition on a node and return a fresh snapshot
    pub async fn set_layout(&self, id: &str, datasources: &[&str]) -> ContentNode {
        self.store
            .set_shared_field(id, RENDERINGS, &layout_json(datasources))
            .await
            .unwrap();
        self.node(id).await
    }

    pub async fn node(&self, id_or_path: &str) -> ContentNode {
        self.store.get_node(id_or_path).await.unwrap().unwrap()
    }

    /// Copy `/a/page` to `/b/page2` (fields duplicated verbatim)
    pub async fn copy_page(&self) -> ContentNode {
        self.store
            .copy_subtree(&self.page.id, &self.b.id, Some("page2"))
            .await
            .unwrap()
    }

    pub fn config(&self) -> DeepCopyConfig {
        DeepCopyConfig::default()
    }
}
