//! Path and tree helpers
//!
//! Paths are slash-separated and compared ASCII case-insensitively, matching
//! how stores resolve them. Relative paths keep their leading separator so
//! they can be appended straight onto another root path.

use crate::db::ContentStore;
use crate::models::ContentNode;
use anyhow::Result;

/// Suffix of `descendant` below `ancestor`, including the leading `/`.
///
/// Returns `Some("")` when both paths name the same node and `None` when
/// `descendant` does not live underneath `ancestor`. Matching respects
/// segment boundaries: `/a/page` is not an ancestor of `/a/pages/x`.
///
/// ```rust
/// use deepcopy_core::utils::relative_path;
///
/// assert_eq!(relative_path("/a/page", "/a/page/data/text1"), Some("/data/text1"));
/// assert_eq!(relative_path("/a/page", "/a/page"), Some(""));
/// assert_eq!(relative_path("/a/page", "/shared/lib1"), None);
/// ```
pub fn relative_path<'a>(ancestor: &str, descendant: &'a str) -> Option<&'a str> {
    let ancestor = ancestor.trim_end_matches('/');
    let prefix = descendant.get(..ancestor.len())?;
    if !prefix.eq_ignore_ascii_case(ancestor) {
        return None;
    }

    let rest = &descendant[ancestor.len()..];
    if rest.is_empty() || rest.starts_with('/') {
        Some(rest)
    } else {
        None
    }
}

/// Append a relative path (as returned by [`relative_path`]) to `base`.
pub fn join_path(base: &str, relative: &str) -> String {
    let joined = format!("{}{}", base.trim_end_matches('/'), relative);
    if joined.is_empty() {
        "/".to_string()
    } else {
        joined
    }
}

/// Look a node up by full path. A missing node is `Ok(None)`.
pub async fn resolve_by_path(store: &dyn ContentStore, path: &str) -> Result<Option<ContentNode>> {
    store.get_node(path).await
}

/// Descendants of `root` in document order (depth-first, pre-order), root
/// excluded.
///
/// Positional pairing of an original subtree with its copy depends on both
/// sides being flattened by this same function.
pub async fn flatten_descendants(
    store: &dyn ContentStore,
    root: &ContentNode,
) -> Result<Vec<ContentNode>> {
    store.get_descendants(&root.id).await
}
