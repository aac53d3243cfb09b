//! Structural properties of resolved branch trees.
//!
//! Every test resolves a request set and checks that the result is a single
//! rooted tree in which each request's branch appears exactly once.

use std::collections::HashSet;

use branchscope_core::{resolve_tree, BranchNode, ChangeRequest, RepoInfo, ResolveOptions};

fn repo() -> RepoInfo {
    RepoInfo::new("widgets", "acme/widgets", "main")
}

fn pr(number: u64, head: &str, base: &str) -> ChangeRequest {
    ChangeRequest::new(number, format!("Request {number}"), head, base)
}

/// Every non-root branch appears exactly once and the root appears once.
fn assert_partition(root: &BranchNode, expected: &[&str]) {
    let nodes = root.walk();
    let roots: Vec<_> = nodes.iter().filter(|n| n.is_root()).collect();
    assert_eq!(roots.len(), 1, "exactly one root");
    assert!(root.is_root());

    let branches: Vec<&str> = nodes
        .iter()
        .filter(|n| !n.is_root())
        .map(|n| n.branch.as_str())
        .collect();
    let unique: HashSet<&str> = branches.iter().copied().collect();
    assert_eq!(unique.len(), branches.len(), "duplicate node in {branches:?}");
    assert_eq!(unique, expected.iter().copied().collect::<HashSet<_>>());

    for node in nodes.iter().filter(|n| !n.is_root()) {
        assert!(node.parent_branch_name.is_some(), "{} has no parent", node.branch);
    }
}

#[test]
fn test_single_request_on_default_branch() {
    let root = resolve_tree(&repo(), &[pr(1, "X", "main")], &ResolveOptions::default());
    assert_eq!(root.branch, "main");
    assert_eq!(root.child_branches(), vec!["X"]);
    assert_eq!(root.children[0].parent_branch_name.as_deref(), Some("main"));
    assert!(root.children[0].children.is_empty());
}

#[test]
fn test_two_level_chain() {
    let requests = [pr(1, "A", "B"), pr(2, "B", "main")];
    let root = resolve_tree(&repo(), &requests, &ResolveOptions::default());

    assert_partition(&root, &["A", "B"]);
    assert_eq!(root.child_branches(), vec!["B"]);
    let b = &root.children[0];
    assert_eq!(b.child_branches(), vec!["A"]);
    assert_eq!(b.children[0].parent_branch_name.as_deref(), Some("B"));
}

#[test]
fn test_cycle_terminates_and_keeps_both_nodes() {
    let requests = [pr(1, "A", "B"), pr(2, "B", "A")];
    let root = resolve_tree(&repo(), &requests, &ResolveOptions::default());
    assert_partition(&root, &["A", "B"]);
    assert_eq!(root.node_count(), 3);
}

#[test]
fn test_long_cycle_with_tail() {
    let requests = [
        pr(1, "A", "B"),
        pr(2, "B", "C"),
        pr(3, "C", "A"),
        pr(4, "D", "A"),
        pr(5, "E", "main"),
    ];
    let root = resolve_tree(&repo(), &requests, &ResolveOptions::default());
    assert_partition(&root, &["A", "B", "C", "D", "E"]);
    assert_eq!(root.find("D").unwrap().parent_branch_name.as_deref(), Some("A"));
}

#[test]
fn test_target_without_request_attaches_to_root() {
    let root = resolve_tree(
        &repo(),
        &[pr(1, "feature", "release-2024")],
        &ResolveOptions::default(),
    );
    assert_eq!(root.child_branches(), vec!["feature"]);
    assert_eq!(
        root.children[0].parent_branch_name.as_deref(),
        Some("main")
    );
}

#[test]
fn test_stacked_feature_branches() {
    let requests = [pr(10, "feat-a", "main"), pr(11, "feat-b", "feat-a")];
    let root = resolve_tree(&repo(), &requests, &ResolveOptions::default());

    assert_eq!(root.child_branches(), vec!["feat-a"]);
    let a = &root.children[0];
    assert_eq!(a.pr_number, Some(10));
    assert_eq!(a.child_branches(), vec!["feat-b"]);
    assert_eq!(a.children[0].pr_number, Some(11));
}

#[test]
fn test_long_title_truncated_for_display_only() {
    let title = "x".repeat(75);
    let request = ChangeRequest::new(1, title.clone(), "long", "main");
    let root = resolve_tree(&repo(), &[request], &ResolveOptions::default());
    let node = &root.children[0];
    assert_eq!(node.name.chars().count(), 60);
    assert_eq!(node.pr_title.as_deref(), Some(title.as_str()));
}

#[test]
fn test_resolution_is_deterministic() {
    let requests = [
        pr(1, "A", "B"),
        pr(2, "B", "main"),
        pr(3, "C", "A"),
        pr(4, "D", "main"),
    ];
    let options = ResolveOptions::default();
    let first = resolve_tree(&repo(), &requests, &options);
    let second = resolve_tree(&repo(), &requests, &options);
    assert_eq!(first, second);
}

#[test]
fn test_duplicate_source_branch_yields_one_node() {
    let requests = [pr(1, "A", "main"), pr(2, "A", "main")];
    let root = resolve_tree(&repo(), &requests, &ResolveOptions::default());
    assert_partition(&root, &["A"]);
    assert_eq!(root.children[0].pr_number, Some(1));
}

#[test]
fn test_hidden_intermediate_becomes_phantom() {
    let requests = [
        pr(1, "top", "middle"),
        pr(2, "middle", "main").with_labels(["wip"]),
    ];
    let options = ResolveOptions {
        hidden_labels: vec!["wip".to_string()],
        ..ResolveOptions::default()
    };
    let root = resolve_tree(&repo(), &requests, &options);

    assert_partition(&root, &["top", "middle"]);
    let middle = &root.children[0];
    assert_eq!(middle.branch, "middle");
    assert!(middle.pr_author.is_none());
    assert!(middle.name.starts_with('('));
    assert_eq!(middle.child_branches(), vec!["top"]);
}

#[test]
fn test_serialized_node_carries_every_attribute() {
    let root = resolve_tree(&repo(), &[pr(1, "X", "main")], &ResolveOptions::default());
    let raw = serde_json::to_value(&root).unwrap();
    let child = &raw["children"][0];
    for key in &[
        "name",
        "branch",
        "repo_name",
        "pr_number",
        "pr_title",
        "pr_url",
        "pr_author",
        "last_updated",
        "ci_status",
        "github_url",
        "is_draft",
        "labels",
        "commits_from_parent",
        "parent_branch_name",
        "children",
    ] {
        assert!(child.get(*key).is_some(), "missing key: {}", key);
    }
    assert_eq!(child["ci_status"], serde_json::json!("unknown"));
}
