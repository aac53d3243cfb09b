//! Branch-hierarchy resolution.
//!
//! Turns one repository's flat list of open change requests into a single
//! tree rooted at the default branch. Target links between requests may form
//! chains (stacked requests) and even cycles; every walk over them carries
//! its own visited set, and an edge is only committed when it cannot close a
//! loop, so the output is always a tree.
//!
//! Nodes live in a [`NodeArena`] keyed by branch name while edges are being
//! decided, and are only assembled into an owned [`BranchNode`] tree at the
//! very end.

use std::collections::{HashMap, HashSet};

use tracing::debug;

use crate::model::{BranchNode, ChangeRequest, RepoInfo};

/// Knobs for a single resolution pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolveOptions {
    /// Requests carrying any of these labels are not enumerated as nodes of
    /// their own. They still show up as phantom nodes when another request is
    /// stacked on top of them.
    pub hidden_labels: Vec<String>,
    /// Sort every child list by branch name instead of keeping request order.
    pub sort_children: bool,
}

impl ResolveOptions {
    fn is_hidden(&self, pr: &ChangeRequest) -> bool {
        self.hidden_labels.iter().any(|label| pr.has_label(label))
    }
}

/// Branch-name keyed node storage. Insertion is idempotent per branch name.
#[derive(Debug, Default)]
struct NodeArena {
    nodes: Vec<BranchNode>,
    index: HashMap<String, usize>,
}

impl NodeArena {
    /// Insert the node built by `make` unless `branch` already has one.
    /// Returns the slot of the (new or existing) node.
    fn insert_with(&mut self, branch: &str, make: impl FnOnce() -> BranchNode) -> usize {
        if let Some(&idx) = self.index.get(branch) {
            return idx;
        }
        let idx = self.nodes.len();
        self.nodes.push(make());
        self.index.insert(branch.to_string(), idx);
        idx
    }

    fn get(&self, branch: &str) -> Option<usize> {
        self.index.get(branch).copied()
    }

    fn contains(&self, branch: &str) -> bool {
        self.index.contains_key(branch)
    }

    fn len(&self) -> usize {
        self.nodes.len()
    }
}

/// Resolve `requests` of `repo` into a tree rooted at `repo.default_branch`.
///
/// The result holds one node per participating branch plus the root. This is
/// a pure function of its inputs: commit deltas are attached separately by
/// [`super::decorate_commits`].
pub fn resolve_tree(
    repo: &RepoInfo,
    requests: &[ChangeRequest],
    options: &ResolveOptions,
) -> BranchNode {
    let default_branch = repo.default_branch.as_str();

    // First request wins if a source branch ever shows up twice.
    let mut pr_lookup: HashMap<&str, &ChangeRequest> = HashMap::with_capacity(requests.len());
    for pr in requests {
        pr_lookup.entry(pr.head_branch.as_str()).or_insert(pr);
    }

    let mut arena = NodeArena::default();
    let mut seeds: Vec<&str> = Vec::new();
    for pr in requests {
        if options.is_hidden(pr) {
            continue;
        }
        arena.insert_with(&pr.head_branch, || BranchNode::from_request(repo, pr));
        seeds.push(pr.head_branch.as_str());
    }

    for branch in discover_ancestors(&seeds, &pr_lookup, &arena, default_branch) {
        if let Some(pr) = pr_lookup.get(branch) {
            arena.insert_with(branch, || BranchNode::phantom(repo, pr));
        }
    }

    let parents = assign_parents(&mut arena, &pr_lookup, default_branch);
    let mut root = assemble(BranchNode::root(repo), arena.nodes, &parents);

    if options.sort_children {
        sort_children(&mut root);
    }

    debug!(
        repo = %repo.name,
        requests = requests.len(),
        nodes = root.node_count(),
        "resolved branch tree"
    );
    root
}

/// Walk each seed's chain of target branches and collect the intermediate
/// targets that are neither the default branch nor already a node.
///
/// A walk stops at the first target that is not itself a request's source,
/// or at the first branch it has already visited.
fn discover_ancestors<'a>(
    seeds: &[&'a str],
    pr_lookup: &HashMap<&'a str, &'a ChangeRequest>,
    arena: &NodeArena,
    default_branch: &str,
) -> Vec<&'a str> {
    let mut marked = Vec::new();
    let mut seen = HashSet::new();

    for &seed in seeds {
        let mut visited = HashSet::new();
        let mut current = seed;
        while let Some(pr) = pr_lookup.get(current) {
            if !visited.insert(current) {
                break;
            }
            let target = pr.base_branch.as_str();
            if target != default_branch && !arena.contains(target) && seen.insert(target) {
                marked.push(target);
            }
            current = target;
        }
    }
    marked
}

/// Decide the parent of every node.
///
/// `Some(idx)` means "child of arena slot idx", `None` means "child of the
/// root". Every node leaves with a `parent_branch_name`; nodes whose target
/// could not be resolved (plain branch without a request, or an edge that
/// would close a cycle) fall back to the default branch.
fn assign_parents(
    arena: &mut NodeArena,
    pr_lookup: &HashMap<&str, &ChangeRequest>,
    default_branch: &str,
) -> Vec<Option<usize>> {
    let mut parents: Vec<Option<usize>> = vec![None; arena.len()];

    for idx in 0..arena.len() {
        let Some(pr) = pr_lookup.get(arena.nodes[idx].branch.as_str()) else {
            continue;
        };
        let target = pr.base_branch.as_str();

        if let Some(target_idx) = arena.get(target) {
            if target_idx != idx && !reaches(&parents, target_idx, idx) {
                parents[idx] = Some(target_idx);
                arena.nodes[idx].parent_branch_name = Some(target.to_string());
                continue;
            }
            debug!(branch = %arena.nodes[idx].branch, target, "target chain loops, attaching to root");
        } else if target == default_branch {
            arena.nodes[idx].parent_branch_name = Some(default_branch.to_string());
        }
    }

    for (node, parent) in arena.nodes.iter_mut().zip(&parents) {
        if parent.is_none() && node.parent_branch_name.is_none() {
            node.parent_branch_name = Some(default_branch.to_string());
        }
    }

    parents
}

/// Whether walking up from `from` through committed parent edges hits `target`.
fn reaches(parents: &[Option<usize>], from: usize, target: usize) -> bool {
    let mut visited = HashSet::new();
    let mut current = Some(from);
    while let Some(idx) = current {
        if idx == target {
            return true;
        }
        if !visited.insert(idx) {
            return false;
        }
        current = parents[idx];
    }
    false
}

/// Move arena nodes into their parents' child lists, bottom-up.
///
/// Children keep arena order, which is request order followed by phantoms
/// in discovery order.
fn assemble(mut root: BranchNode, nodes: Vec<BranchNode>, parents: &[Option<usize>]) -> BranchNode {
    let mut children: Vec<Vec<usize>> = vec![Vec::new(); nodes.len()];
    let mut top_level = Vec::new();
    for (idx, parent) in parents.iter().enumerate() {
        match parent {
            Some(p) => children[*p].push(idx),
            None => top_level.push(idx),
        }
    }

    // Pre-order from the top-level nodes; reversed, it visits every child
    // before its parent.
    let mut order = Vec::with_capacity(nodes.len());
    let mut stack: Vec<usize> = top_level.iter().rev().copied().collect();
    while let Some(idx) = stack.pop() {
        order.push(idx);
        stack.extend(children[idx].iter().rev().copied());
    }

    let mut slots: Vec<Option<BranchNode>> = nodes.into_iter().map(Some).collect();
    for &idx in order.iter().rev() {
        let kids: Vec<BranchNode> = children[idx]
            .iter()
            .filter_map(|&child| slots[child].take())
            .collect();
        if let Some(node) = slots[idx].as_mut() {
            node.children = kids;
        }
    }
    root.children = top_level
        .iter()
        .filter_map(|&idx| slots[idx].take())
        .collect();

    debug_assert!(slots.iter().all(Option::is_none), "every node has a parent");
    root
}

fn sort_children(root: &mut BranchNode) {
    let mut stack = vec![root];
    while let Some(node) = stack.pop() {
        node.children.sort_by(|a, b| a.branch.cmp(&b.branch));
        stack.extend(node.children.iter_mut());
    }
}
