//! Navigation tree derivation.
//!
//! The content API returns pages as a flat list where each record names its
//! parent by id. [`build_tree`] turns that list into a rooted tree in two
//! passes, and [`nav_entries`] flattens the tree back into render-ready rows
//! whose indentation is derived from tree depth alone.
//!
//! ## Construction
//!
//! ```text
//! pass 1:  id → position          (first occurrence wins on duplicate ids)
//! pass 2:  position → parent's children, or roots when the parent is unknown
//! ```
//!
//! Nodes are never re-linked, so construction terminates on any input. A
//! parent cycle (`A → B → A`) would leave its members unreachable from every
//! root; those nodes are promoted to roots in input order so the tree still
//! holds every input node exactly once.
//!
//! Every walk over the tree uses an explicit stack, dropping included, so a
//! parent chain of any length fits in a fixed amount of call stack.

use crate::api::ContentApi;
use crate::types::PageNode;
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use tracing::{debug, info, warn};

/// A page with its derived children.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TreeNode {
    #[serde(flatten)]
    pub page: PageNode,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<TreeNode>,
}

impl Drop for TreeNode {
    fn drop(&mut self) {
        let mut pending = std::mem::take(&mut self.children);
        while let Some(mut node) = pending.pop() {
            pending.append(&mut node.children);
        }
    }
}

/// Build the navigation tree from a flat page list.
///
/// Returns the roots. Order among siblings and among roots follows input
/// order; nothing is sorted.
pub fn build_tree(nodes: &[PageNode]) -> Vec<TreeNode> {
    let mut index: HashMap<&str, usize> = HashMap::with_capacity(nodes.len());
    for (pos, node) in nodes.iter().enumerate() {
        index.entry(node.id.as_str()).or_insert(pos);
    }

    let mut parent: Vec<Option<usize>> = Vec::with_capacity(nodes.len());
    let mut children: Vec<Vec<usize>> = vec![Vec::new(); nodes.len()];
    let mut roots: Vec<usize> = Vec::new();
    for (pos, node) in nodes.iter().enumerate() {
        let resolved = node
            .parent_id
            .as_deref()
            .and_then(|pid| index.get(pid).copied())
            .filter(|&p| p != pos);
        match resolved {
            Some(p) => children[p].push(pos),
            None => roots.push(pos),
        }
        parent.push(resolved);
    }

    promote_unreachable(&parent, &mut children, &mut roots);

    materialize(&roots, nodes, &children)
}

/// Break parent cycles: any node not reachable from a root becomes a root.
fn promote_unreachable(parent: &[Option<usize>], children: &mut [Vec<usize>], roots: &mut Vec<usize>) {
    let mut reached = vec![false; parent.len()];
    let mut stack: Vec<usize> = roots.clone();
    mark_reached(&mut stack, children, &mut reached);

    for pos in 0..parent.len() {
        if reached[pos] {
            continue;
        }
        if let Some(p) = parent[pos] {
            children[p].retain(|&c| c != pos);
        }
        debug!(position = pos, "promoting node in parent cycle to root");
        roots.push(pos);
        stack.push(pos);
        mark_reached(&mut stack, children, &mut reached);
    }
}

fn mark_reached(stack: &mut Vec<usize>, children: &[Vec<usize>], reached: &mut [bool]) {
    while let Some(pos) = stack.pop() {
        if reached[pos] {
            continue;
        }
        reached[pos] = true;
        stack.extend(children[pos].iter().copied());
    }
}

/// Build owned nodes bottom-up. In pre-order every parent precedes its
/// descendants, so walking that order backwards finishes children first.
fn materialize(roots: &[usize], nodes: &[PageNode], children: &[Vec<usize>]) -> Vec<TreeNode> {
    let mut order = Vec::with_capacity(nodes.len());
    let mut stack: Vec<usize> = roots.to_vec();
    while let Some(pos) = stack.pop() {
        order.push(pos);
        stack.extend(children[pos].iter().copied());
    }

    let mut built: Vec<Option<TreeNode>> = vec![None; nodes.len()];
    for &pos in order.iter().rev() {
        let node = TreeNode {
            page: nodes[pos].clone(),
            children: children[pos]
                .iter()
                .filter_map(|&child| built[child].take())
                .collect(),
        };
        built[pos] = Some(node);
    }
    roots.iter().filter_map(|&root| built[root].take()).collect()
}

/// Pre-order walk in sibling order, yielding each node with its depth.
fn walk<'a>(roots: &'a [TreeNode]) -> impl Iterator<Item = (&'a TreeNode, usize)> {
    let mut stack: Vec<(&'a TreeNode, usize)> = roots.iter().rev().map(|n| (n, 0)).collect();
    std::iter::from_fn(move || {
        let (node, depth) = stack.pop()?;
        stack.extend(node.children.iter().rev().map(|c| (c, depth + 1)));
        Some((node, depth))
    })
}

/// Total number of nodes in the tree, roots included.
pub fn tree_size(roots: &[TreeNode]) -> usize {
    walk(roots).count()
}

/// Depth-first search for a node by id.
pub fn find_node<'a>(roots: &'a [TreeNode], id: &str) -> Option<&'a TreeNode> {
    walk(roots).map(|(node, _)| node).find(|node| node.page.id == id)
}

/// Path from a root down to the node with `id`, inclusive. Empty when absent.
pub fn ancestors_of<'a>(roots: &'a [TreeNode], id: &str) -> Vec<&'a TreeNode> {
    let mut path: Vec<&'a TreeNode> = Vec::new();
    for (node, depth) in walk(roots) {
        path.truncate(depth);
        path.push(node);
        if node.page.id == id {
            return path;
        }
    }
    Vec::new()
}

/// A render-ready navigation row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NavEntry {
    pub id: String,
    pub title: String,
    pub href: String,
    /// Distance from a root in the derived tree.
    pub depth: usize,
    pub is_current: bool,
    /// Set on ancestors of the current page.
    pub is_open: bool,
    pub has_children: bool,
}

impl NavEntry {
    /// Left indentation in `rem`.
    pub fn indent_rem(&self) -> f32 {
        self.depth as f32 * 0.75
    }
}

/// Flatten the tree depth-first into navigation rows.
pub fn nav_entries(roots: &[TreeNode], current_page_id: Option<&str>) -> Vec<NavEntry> {
    let open: HashSet<&str> = current_page_id
        .map(|id| {
            let path = ancestors_of(roots, id);
            let ancestors = path.len().saturating_sub(1);
            path.into_iter()
                .take(ancestors)
                .map(|n| n.page.id.as_str())
                .collect()
        })
        .unwrap_or_default();

    walk(roots)
        .map(|(node, depth)| render_node(node, depth, current_page_id, &open))
        .collect()
}

fn render_node(node: &TreeNode, depth: usize, current_page_id: Option<&str>, open: &HashSet<&str>) -> NavEntry {
    let id = node.page.id.as_str();
    NavEntry {
        id: id.to_string(),
        title: node.page.title.clone(),
        href: node.page.href(),
        depth,
        is_current: current_page_id == Some(id),
        is_open: open.contains(&id),
        has_children: !node.children.is_empty(),
    }
}

/// Outcome of loading the navigation tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavState {
    Loaded(Vec<TreeNode>),
    /// The API returned no pages. Renders nothing.
    Empty,
    /// The API call failed. Renders a static placeholder.
    Failed(String),
}

impl NavState {
    pub fn from_pages(pages: &[PageNode]) -> Self {
        if pages.is_empty() {
            NavState::Empty
        } else {
            NavState::Loaded(build_tree(pages))
        }
    }

    pub fn tree(&self) -> &[TreeNode] {
        match self {
            NavState::Loaded(tree) => tree,
            _ => &[],
        }
    }
}

/// Fetch the flat page list and build the tree, folding failures into state.
pub async fn load_navigation<A: ContentApi + ?Sized>(api: &A, base_path: &str) -> NavState {
    match api.navigation(base_path).await {
        Ok(pages) => {
            info!(base_path, pages = pages.len(), "loaded navigation");
            NavState::from_pages(&pages)
        }
        Err(err) => {
            warn!(base_path, error = %err, "failed to load navigation");
            NavState::Failed(err.to_string())
        }
    }
}
