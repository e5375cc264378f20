//! Deep Copy Integration Tests
//!
//! Drives the full copy flow the way the copy pipeline does: the command
//! builds the request, the store's copy step duplicates the subtree, and the
//! processor repairs the copies.

#[cfg(test)]
mod deep_copy_tests {
    use anyhow::Result;
    use deepcopy_core::{
        CommandState, ContentNode, ContentStore, CopyItemsArgs, DeepCopyCommand, DeepCopyConfig,
        DeepCopyError, DeepCopyProcessor, LayoutDefinition, MemoryStore, NewNode,
    };
    use serde_json::json;
    use std::sync::Arc;

    const RENDERINGS: &str = "__Renderings";

    fn layout(datasources: &[&str]) -> String {
        let renderings: Vec<_> = datasources
            .iter()
            .map(|ds| json!({"id": "{RENDERING}", "placeholder": "main", "ds": ds, "cache": true}))
            .collect();
        json!({"devices": [{"id": "{DEFAULT}", "layout": "{MAIN}", "renderings": renderings}]})
            .to_string()
    }

    fn datasources(node: &ContentNode) -> Vec<String> {
        let mut definition = LayoutDefinition::parse(node.field(RENDERINGS).unwrap_or_default())
            .expect("definition should parse");
        definition
            .reference_handles()
            .map(|handle| handle.get().to_string())
            .collect()
    }

    /// ```text
    /// /content/a/page                 refs: data/text1, /shared/lib1, /gone
    /// /content/a/page/data            refs: data/text1
    /// /content/a/page/data/text1      refs: /content/a/page/data
    /// /shared/lib1
    /// /content/b
    /// ```
    async fn setup() -> Result<(Arc<MemoryStore>, ContentNode, ContentNode)> {
        let store = Arc::new(MemoryStore::new("master"));
        let content = store.create_root("content", "{FOLDER}").await?;
        let a = store
            .create_node(&content.id, NewNode::new("a", "{FOLDER}"))
            .await?;
        let page = store
            .create_node(
                &a.id,
                NewNode::new("page", "{PAGE}").with_field(
                    RENDERINGS,
                    layout(&["/content/a/page/data/text1", "/shared/lib1", "/gone"]),
                ),
            )
            .await?;
        let data = store
            .create_node(
                &page.id,
                NewNode::new("data", "{FOLDER}")
                    .with_field(RENDERINGS, layout(&["/content/a/page/data/text1"])),
            )
            .await?;
        store
            .create_node(
                &data.id,
                NewNode::new("text1", "{DATA}")
                    .with_field(RENDERINGS, layout(&["/content/a/page/data"])),
            )
            .await?;
        let shared = store.create_root("shared", "{FOLDER}").await?;
        store
            .create_node(&shared.id, NewNode::new("lib1", "{DATA}"))
            .await?;
        let b = store
            .create_node(&content.id, NewNode::new("b", "{FOLDER}"))
            .await?;
        Ok((store, page, b))
    }

    async fn node(store: &MemoryStore, path: &str) -> Result<ContentNode> {
        store
            .get_node(path)
            .await?
            .ok_or_else(|| anyhow::anyhow!("{} not found", path))
    }

    #[tokio::test]
    async fn test_copied_subtree_is_self_consistent() -> Result<()> {
        let (store, page, b) = setup().await?;
        let config = DeepCopyConfig::default();

        let command = DeepCopyCommand::new(&config);
        assert_eq!(command.query_state(&[page.clone()]), CommandState::Enabled);
        let request = command
            .copy_to(&[page.clone()], "en-GB")
            .expect("request for non-empty selection");

        // The pipeline's copy step
        let copy = store.copy_subtree(&page.id, &b.id, Some("page2")).await?;

        let mut args = CopyItemsArgs::from_request(request, &b.path, vec![copy.clone()]);
        let report = DeepCopyProcessor::new(store.clone(), &config)
            .execute(&mut args)
            .await?;

        assert!(args.copies.is_empty());
        assert_eq!(report.pairs, 3);
        assert_eq!(report.nodes_written, 2);
        assert_eq!(report.references_rewritten, 2);
        assert_eq!(report.references_cleared, 1);
        assert_eq!(report.misaligned, 0);

        let lib1 = node(&store, "/shared/lib1").await?;
        let copied_data = node(&store, "/content/b/page2/data").await?;
        let copied_text = node(&store, "/content/b/page2/data/text1").await?;

        let page2 = node(&store, "/content/b/page2").await?;
        assert_eq!(
            datasources(&page2),
            vec![copied_text.id.clone(), "/shared/lib1".to_string(), String::new()]
        );
        assert_eq!(datasources(&copied_data), vec![copied_text.id.clone()]);

        // Each pair is anchored at its own original: text1's parent lies
        // outside text1's subtree, so that reference is kept
        assert_eq!(datasources(&copied_text), vec!["/content/a/page/data".to_string()]);

        // Untouched attributes survive the rewrite
        let raw: serde_json::Value = serde_json::from_str(page2.field(RENDERINGS).unwrap())?;
        assert_eq!(raw["devices"][0]["layout"], "{MAIN}");
        assert_eq!(raw["devices"][0]["renderings"][0]["cache"], true);

        // The originals are untouched, and lib1 was only read
        let page = node(&store, "/content/a/page").await?;
        assert_eq!(page.revision, 0);
        assert_eq!(lib1.revision, 0);
        Ok(())
    }

    #[tokio::test]
    async fn test_second_copy_pass_changes_nothing() -> Result<()> {
        let (store, page, b) = setup().await?;
        let config = DeepCopyConfig::default();
        let processor = DeepCopyProcessor::new(store.clone(), &config);
        let request = DeepCopyCommand::new(&config)
            .copy_to(&[page.clone()], "en")
            .expect("request");
        let copy = store.copy_subtree(&page.id, &b.id, Some("page2")).await?;

        let mut args = CopyItemsArgs::from_request(request.clone(), &b.id, vec![copy.clone()]);
        processor.execute(&mut args).await?;
        let after_first = node(&store, "/content/b/page2").await?;

        let copy = node(&store, "/content/b/page2").await?;
        let mut args = CopyItemsArgs::from_request(request, &b.id, vec![copy]);
        let report = processor.execute(&mut args).await?;

        assert_eq!(report.nodes_written, 0);
        let after_second = node(&store, "/content/b/page2").await?;
        assert_eq!(after_second.revision, after_first.revision);
        assert_eq!(after_second.fields, after_first.fields);
        Ok(())
    }

    #[tokio::test]
    async fn test_missing_destination_fails_before_any_write() -> Result<()> {
        let (store, page, b) = setup().await?;
        let config = DeepCopyConfig::default();
        let request = DeepCopyCommand::new(&config)
            .copy_to(&[page.clone()], "en")
            .expect("request");
        let copy = store.copy_subtree(&page.id, &b.id, Some("page2")).await?;

        let mut args =
            CopyItemsArgs::from_request(request, "/content/nowhere", vec![copy.clone()]);
        let err = DeepCopyProcessor::new(store.clone(), &config)
            .execute(&mut args)
            .await
            .unwrap_err();

        assert!(matches!(err, DeepCopyError::DestinationNotFound { .. }));
        assert_eq!(args.copies.len(), 1);
        assert_eq!(node(&store, "/content/b/page2").await?.revision, copy.revision);
        Ok(())
    }
}
