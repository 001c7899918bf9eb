//! Tree integration tests
//!
//! Snapshots, the staging tree and paths, through the public API only.

use std::sync::Arc;

use convergent::{
    PropertyState, PropertyValue, Scalar, ScalarType,
    tree::{NodePath, NodeState, TreeBuilder, TreeError},
};

use crate::helpers::*;

fn sample() -> NodeState {
    NodeState::new()
        .with_property(PropertyState::new("name", "root"))
        .with_child(
            "a",
            NodeState::new()
                .with_property(PropertyState::new("n", 1i64))
                .with_child("b", NodeState::new().with_property(PropertyState::new("deep", true))),
        )
        .with_child("c", NodeState::new())
}

#[test]
fn test_build_without_changes_is_equal() {
    let base = sample();
    let tree = TreeBuilder::new(base.clone());
    assert!(!tree.is_modified());
    assert_eq!(tree.build(), base);
}

#[test]
fn test_staged_edits_do_not_touch_base() {
    let base = sample();
    let mut tree = TreeBuilder::new(base.clone());
    let b = tree.resolve(&path("/a/b")).unwrap();
    tree.set_property(b, PropertyState::new("deep", false));
    let root = tree.root();
    tree.remove_child(root, "c");

    let built = tree.build();
    assert_ne!(built, base);
    assert_eq!(
        built.node_at(&path("/a/b")).unwrap().property("deep"),
        Some(&PropertyState::new("deep", false))
    );
    assert!(!built.has_child("c"));
    assert_eq!(base.node_at(&path("/a/b")).unwrap().property("deep").unwrap().value(), &PropertyValue::from(true));
}

#[test]
fn test_unchanged_subtrees_are_shared() {
    let base = sample();
    let mut tree = TreeBuilder::new(base.clone());
    let root = tree.root();
    tree.set_property(root, PropertyState::new("name", "renamed"));
    let built = tree.build();
    assert_eq!(built.child("a"), base.child("a"));
    assert!(std::ptr::eq(built.child("a").unwrap(), base.child("a").unwrap()));
}

#[test]
fn test_children_iterate_in_name_order() {
    let node = NodeState::new()
        .with_child("zeta", NodeState::new())
        .with_child("alpha", NodeState::new())
        .with_child("mid", NodeState::new());
    let names: Vec<&str> = node.children().map(|(name, _)| name).collect();
    assert_eq!(names, vec!["alpha", "mid", "zeta"]);
}

#[test]
fn test_paths() {
    let p: NodePath = "//a/b/".parse().unwrap();
    assert_eq!(p.as_str(), "/a/b");
    assert_eq!(p.parent(), Some(path("/a")));
    assert_eq!(p.name(), Some("b"));
    assert!(NodePath::root().parent().is_none());
    assert!("relative".parse::<NodePath>().is_err());
    assert!(matches!(
        p.child("x/y"),
        Err(TreeError::InvalidPath { .. })
    ));
}

#[test]
fn test_mixed_arrays_rejected() {
    let err = PropertyValue::array(
        ScalarType::Long,
        vec![Scalar::from(1i64), Scalar::from("two")],
    )
    .unwrap_err();
    assert!(err.is_type_error());
}

#[test]
fn test_snapshot_serde_round_trip() {
    let base = sample().with_property(PropertyState::new("tags", vec!["x", "y"]));
    let json = serde_json::to_string(&base).unwrap();
    let back: NodeState = serde_json::from_str(&json).unwrap();
    assert_eq!(back, base);
    // Snapshots are cheap to share between threads
    let shared = Arc::new(back);
    assert_eq!(shared.child_count(), 2);
}
