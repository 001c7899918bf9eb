//! Rebase integration tests
//!
//! These exercise `merge::rebase` directly and through the store's commit
//! pipeline, covering the conflict categories and the fallback policies.

use std::sync::{
    Arc,
    atomic::{AtomicUsize, Ordering},
};

use convergent::{
    PropertyState, PropertyValue, Result, StoreConfig,
    merge::{self, ConflictHandler, ConflictKind, ConflictPolicy, MergeError, Resolution},
    tree::{NodeBuilder, NodeState},
};

use crate::helpers::*;

fn prop(name: &str, value: &str) -> PropertyState {
    PropertyState::new(name, value)
}

fn doc(props: &[(&str, &str)]) -> NodeState {
    let child = props
        .iter()
        .fold(NodeState::new(), |node, (name, value)| {
            node.with_property(prop(name, value))
        });
    NodeState::new().with_child("doc", child)
}

fn conflicts_of(err: convergent::Error) -> Vec<(String, ConflictKind)> {
    match err {
        convergent::Error::Merge(MergeError::UnresolvedConflicts { conflicts }) => conflicts
            .into_iter()
            .map(|c| (c.name, c.kind))
            .collect(),
        other => panic!("Expected unresolved conflicts, got {other:?}"),
    }
}

#[test]
fn test_disjoint_changes_apply_cleanly() {
    let base = doc(&[("a", "1"), ("b", "1")]);
    let ours = doc(&[("a", "2"), ("b", "1")]);
    let head = doc(&[("a", "1"), ("b", "2"), ("c", "new")]);

    let tree = merge::rebase(&base, &ours, &head, &[], ConflictPolicy::Fail).unwrap();
    assert_eq!(tree.build(), doc(&[("a", "2"), ("b", "2"), ("c", "new")]));
}

#[test]
fn test_identical_changes_are_not_conflicts() {
    let base = doc(&[("a", "1"), ("gone", "x")]);
    let both = doc(&[("a", "2"), ("new", "n")]);
    let tree = merge::rebase(&base, &both, &both, &[], ConflictPolicy::Fail).unwrap();
    assert_eq!(tree.build(), both);
}

#[test]
fn test_property_conflicts_are_reported() {
    let base = doc(&[("changed", "0"), ("deleted", "0"), ("kept", "0")]);
    let ours = doc(&[("changed", "ours"), ("deleted", "ours"), ("added", "ours")]);
    let head = doc(&[("changed", "theirs"), ("kept", "theirs"), ("added", "theirs")]);

    let err = merge::rebase(&base, &ours, &head, &[], ConflictPolicy::Fail).unwrap_err();
    assert!(err.is_conflict());
    let mut found = conflicts_of(err);
    found.sort_by(|a, b| a.0.cmp(&b.0));
    assert_eq!(
        found,
        vec![
            ("added".to_string(), ConflictKind::AddExistingProperty),
            ("changed".to_string(), ConflictKind::ChangeChangedProperty),
            ("deleted".to_string(), ConflictKind::ChangeDeletedProperty),
            ("kept".to_string(), ConflictKind::DeleteChangedProperty),
        ]
    );
}

#[test]
fn test_node_conflicts_are_reported() {
    let leaf = |v: &str| NodeState::new().with_property(prop("v", v));
    let base = NodeState::new()
        .with_child("edited", leaf("0"))
        .with_child("dropped", leaf("0"));
    let ours = NodeState::new()
        .with_child("edited", leaf("ours"))
        .with_child("fresh", leaf("ours"));
    let head = NodeState::new()
        .with_child("dropped", leaf("theirs"))
        .with_child("fresh", leaf("theirs"));

    let err = merge::rebase(&base, &ours, &head, &[], ConflictPolicy::Fail).unwrap_err();
    let mut found = conflicts_of(err);
    found.sort_by(|a, b| a.0.cmp(&b.0));
    assert_eq!(
        found,
        vec![
            ("dropped".to_string(), ConflictKind::DeleteChangedNode),
            ("edited".to_string(), ConflictKind::ChangeDeletedNode),
            ("fresh".to_string(), ConflictKind::AddExistingNode),
        ]
    );
}

#[test]
fn test_delete_deleted_never_fails() {
    let base = doc(&[("x", "1")]).with_child("old", NodeState::new());
    let ours = NodeState::new().with_child("doc", NodeState::new());
    let head = ours.clone();
    let tree = merge::rebase(&base, &ours, &head, &[], ConflictPolicy::Fail).unwrap();
    assert_eq!(tree.build(), ours);
}

#[test]
fn test_policies() {
    let base = doc(&[("title", "0")]);
    let ours = doc(&[("title", "ours")]);
    let head = doc(&[("title", "theirs")]);

    let tree = merge::rebase(&base, &ours, &head, &[], ConflictPolicy::Ours).unwrap();
    assert_eq!(tree.build(), ours);
    let tree = merge::rebase(&base, &ours, &head, &[], ConflictPolicy::Theirs).unwrap();
    assert_eq!(tree.build(), head);
}

/// Resolves every property conflict by writing a fixed value, counting calls.
struct Stamp {
    calls: AtomicUsize,
}

impl ConflictHandler for Stamp {
    fn change_changed_property(
        &self,
        parent: &mut NodeBuilder<'_>,
        ours: &PropertyState,
        _theirs: &PropertyState,
    ) -> Result<Option<Resolution>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        parent.set_property(PropertyState::new(ours.name(), "stamped"));
        Ok(Some(Resolution::Merged))
    }
}

/// Declines everything, counting calls.
struct Decline {
    calls: AtomicUsize,
}

impl ConflictHandler for Decline {
    fn change_changed_property(
        &self,
        _parent: &mut NodeBuilder<'_>,
        _ours: &PropertyState,
        _theirs: &PropertyState,
    ) -> Result<Option<Resolution>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(None)
    }
}

#[test]
fn test_first_resolving_handler_wins() {
    let decline = Arc::new(Decline {
        calls: AtomicUsize::new(0),
    });
    let stamp = Arc::new(Stamp {
        calls: AtomicUsize::new(0),
    });
    let after = Arc::new(Stamp {
        calls: AtomicUsize::new(0),
    });
    let handlers: Vec<Arc<dyn ConflictHandler>> = vec![decline.clone(), stamp.clone(), after.clone()];

    let base = doc(&[("title", "0")]);
    let ours = doc(&[("title", "ours")]);
    let head = doc(&[("title", "theirs")]);
    let tree = merge::rebase(&base, &ours, &head, &handlers, ConflictPolicy::Fail).unwrap();

    assert_eq!(tree.build(), doc(&[("title", "stamped")]));
    assert_eq!(decline.calls.load(Ordering::SeqCst), 1);
    assert_eq!(stamp.calls.load(Ordering::SeqCst), 1);
    assert_eq!(after.calls.load(Ordering::SeqCst), 0);
}

#[test]
fn test_store_conflict_leaves_head_and_session() {
    let store = setup_store();
    let p = path("/doc");
    let mut setup = store.session();
    setup.add_node(&p).unwrap();
    setup.set_property(&p, prop("title", "0")).unwrap();
    setup.save().unwrap();

    let mut a = store.session();
    let mut b = store.session();
    a.set_property(&p, prop("title", "a")).unwrap();
    b.set_property(&p, prop("title", "b")).unwrap();
    a.save().unwrap();
    let head = store.head();

    let err = b.save().unwrap_err();
    assert!(err.is_conflict());
    assert_eq!(store.head(), head);
    assert_eq!(b.property(&p, "title"), Some(prop("title", "b")));

    // After a refresh the writer can retry on the new head
    b.refresh();
    b.set_property(&p, prop("title", "b")).unwrap();
    b.save().unwrap();
    assert_eq!(committed(&store, "/doc", "title"), Some(PropertyValue::from("b")));
}

#[test]
fn test_store_policy_from_config() {
    let store = setup_store_with(StoreConfig::default().with_conflict_policy(ConflictPolicy::Ours));
    let p = path("/doc");
    let mut setup = store.session();
    setup.add_node(&p).unwrap();
    setup.save().unwrap();

    let mut a = store.session();
    let mut b = store.session();
    a.set_property(&p, prop("title", "a")).unwrap();
    b.set_property(&p, prop("title", "b")).unwrap();
    a.save().unwrap();
    b.save().unwrap();
    assert_eq!(committed(&store, "/doc", "title"), Some(PropertyValue::from("b")));
}
