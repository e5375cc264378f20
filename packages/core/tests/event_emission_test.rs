//! Event Emission Tests
//!
//! Verifies the events `MemoryStore` broadcasts: one event per operation,
//! emitted only after the operation took effect. The branch handler's
//! listener depends on this contract.

#[cfg(test)]
mod event_emission_tests {
    use anyhow::Result;
    use deepcopy_core::{ContentStore, EditTarget, MemoryStore, NewNode, StoreEvent};
    use tokio::sync::broadcast::error::TryRecvError;
    use tokio::time::{timeout, Duration};

    async fn next(rx: &mut tokio::sync::broadcast::Receiver<StoreEvent>) -> StoreEvent {
        timeout(Duration::from_secs(1), rx.recv())
            .await
            .expect("Event should be emitted within 1 second")
            .expect("Should receive event")
    }

    #[tokio::test]
    async fn test_create_node_emits_node_created_event() -> Result<()> {
        let store = MemoryStore::new("master");
        let mut rx = store.subscribe_to_events();

        let root = store.create_root("content", "{FOLDER}").await?;

        match next(&mut rx).await {
            StoreEvent::NodeCreated(created) => {
                assert_eq!(created.id, root.id);
                assert_eq!(created.path, "/content");
                assert_eq!(created.database, "master");
            }
            other => panic!("Expected NodeCreated event, got {:?}", other),
        }
        Ok(())
    }

    #[tokio::test]
    async fn test_copy_emits_one_event_per_node_top_down() -> Result<()> {
        let store = MemoryStore::new("master");
        let a = store.create_root("a", "{FOLDER}").await?;
        let page = store.create_node(&a.id, NewNode::new("page", "{PAGE}")).await?;
        store
            .create_node(&page.id, NewNode::new("data", "{DATA}"))
            .await?;
        let b = store.create_root("b", "{FOLDER}").await?;

        let mut rx = store.subscribe_to_events();
        store.copy_subtree(&page.id, &b.id, None).await?;

        let mut paths = Vec::new();
        for _ in 0..2 {
            match next(&mut rx).await {
                StoreEvent::NodeCreated(node) => paths.push(node.path),
                other => panic!("Expected NodeCreated event, got {:?}", other),
            }
        }
        assert_eq!(paths, vec!["/b/page", "/b/page/data"]);
        assert!(matches!(rx.try_recv(), Err(TryRecvError::Empty)));
        Ok(())
    }

    #[tokio::test]
    async fn test_edit_events_follow_commit_only() -> Result<()> {
        let store = MemoryStore::new("master");
        let node = store.create_root("content", "{FOLDER}").await?;
        let target = EditTarget::shared(&node.id);
        let mut rx = store.subscribe_to_events();

        store.begin_edit(&target).await?;
        store.set_field(&target, "Title", "x").await?;
        assert!(matches!(rx.try_recv(), Err(TryRecvError::Empty)));
        store.cancel_edit(&target).await?;
        assert!(matches!(rx.try_recv(), Err(TryRecvError::Empty)));

        store.begin_edit(&target).await?;
        store.set_field(&target, "Title", "y").await?;
        store.end_edit(&target).await?;

        match next(&mut rx).await {
            StoreEvent::EditCommitted(committed) => assert_eq!(committed, target),
            other => panic!("Expected EditCommitted event, got {:?}", other),
        }
        Ok(())
    }

    #[tokio::test]
    async fn test_add_version_emits_version_added() -> Result<()> {
        let store = MemoryStore::with_languages("master", &["en", "fr"]);
        let node = store.create_root("content", "{FOLDER}").await?;
        let mut rx = store.subscribe_to_events();

        store.add_version(&node.id, "fr").await?;
        store.add_version(&node.id, "fr").await?;

        let mut numbers = Vec::new();
        for _ in 0..2 {
            match next(&mut rx).await {
                StoreEvent::VersionAdded {
                    node_id,
                    language,
                    number,
                } => {
                    assert_eq!(node_id, node.id);
                    assert_eq!(language, "fr");
                    numbers.push(number);
                }
                other => panic!("Expected VersionAdded event, got {:?}", other),
            }
        }
        assert_eq!(numbers, vec![1, 2]);
        Ok(())
    }
}
