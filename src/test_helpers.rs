//! Shared test utilities for the content-nav test suite.
//!
//! Provides fixture loading, lookup helpers that panic with a useful message
//! on a miss, and tree shape assertions.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let tree = build_tree(&load_fixture_pages());
//! let polity = find_tree_node(&tree, "Polity");
//! assert_eq!(polity.children.len(), 2);
//!
//! assert_tree_shape(&tree, &[
//!     ("UPSC Notes", &["Polity", "Economy"]),
//!     ("Blog", &[]),
//! ]);
//! ```

use std::path::{Path, PathBuf};

use crate::hierarchy::TreeNode;
use crate::types::{HeadingEntry, PageNode};

// =========================================================================
// Fixtures
// =========================================================================

pub fn fixture_path(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("fixtures").join(name)
}

/// Read a fixture file as a string. Panics if missing.
pub fn read_fixture(name: &str) -> String {
    let path = fixture_path(name);
    std::fs::read_to_string(&path)
        .unwrap_or_else(|e| panic!("cannot read fixture {}: {e}", path.display()))
}

/// The flat page list in `fixtures/pages.json` (a `{ "data": [...] }` envelope).
pub fn load_fixture_pages() -> Vec<PageNode> {
    #[derive(serde::Deserialize)]
    struct Envelope {
        data: Vec<PageNode>,
    }
    let envelope: Envelope = serde_json::from_str(&read_fixture("pages.json")).unwrap();
    envelope.data
}

// =========================================================================
// Lookups
// =========================================================================

/// Find a tree node by title anywhere in the tree. Panics if not found.
pub fn find_tree_node<'a>(roots: &'a [TreeNode], title: &str) -> &'a TreeNode {
    fn walk<'a>(nodes: &'a [TreeNode], title: &str) -> Option<&'a TreeNode> {
        nodes
            .iter()
            .find_map(|n| (n.page.title == title).then_some(n).or_else(|| walk(&n.children, title)))
    }
    walk(roots, title).unwrap_or_else(|| {
        let titles = root_titles(roots);
        panic!("tree node '{title}' not found. Roots: {titles:?}")
    })
}

/// Find a heading by its text. Panics if not found.
pub fn find_heading<'a>(headings: &'a [HeadingEntry], text: &str) -> &'a HeadingEntry {
    headings.iter().find(|h| h.text == text).unwrap_or_else(|| {
        let texts: Vec<&str> = headings.iter().map(|h| h.text.as_str()).collect();
        panic!("heading '{text}' not found. Available: {texts:?}")
    })
}

/// All heading ids in extraction order.
pub fn heading_ids(headings: &[HeadingEntry]) -> Vec<&str> {
    headings.iter().map(|h| h.id.as_str()).collect()
}

// =========================================================================
// Tree assertions
// =========================================================================

pub fn root_titles(roots: &[TreeNode]) -> Vec<&str> {
    roots.iter().map(|n| n.page.title.as_str()).collect()
}

/// Assert the two top levels of the tree.
///
/// Each entry is `(root title, child titles)`. Use `&[]` for leaves.
pub fn assert_tree_shape(roots: &[TreeNode], expected: &[(&str, &[&str])]) {
    let expected_titles: Vec<&str> = expected.iter().map(|(t, _)| *t).collect();
    assert_eq!(root_titles(roots), expected_titles, "root titles mismatch");

    for (root, (title, children)) in roots.iter().zip(expected) {
        let actual: Vec<&str> = root.children.iter().map(|c| c.page.title.as_str()).collect();
        assert_eq!(actual, children.to_vec(), "children of '{title}' mismatch");
    }
}
