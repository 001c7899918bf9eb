use std::{sync::Arc, thread};

use convergent::{MemoryNodeStore, PropertyState, PropertyValue};

use crate::helpers::*;

#[test]
fn test_changes_invisible_until_saved() {
    let store = setup_store();
    let mut writer = store.session();
    writer.add_node(&path("/a")).unwrap();
    writer
        .set_property(&path("/a"), PropertyState::new("k", "v"))
        .unwrap();

    assert!(!store.head().has_child("a"));
    let reader = store.session();
    assert!(!reader.has_node(&path("/a")));

    let outcome = writer.save().unwrap();
    assert!(outcome.changed);
    assert!(!outcome.rebased);
    assert!(store.head().has_child("a"));
    // Sessions see a fixed snapshot until refreshed
    assert!(!reader.has_node(&path("/a")));
}

#[test]
fn test_session_continues_after_save() {
    let store = setup_store();
    let mut session = store.session();
    session.add_node(&path("/a")).unwrap();
    session.save().unwrap();
    assert_eq!(session.base_revision(), 1);
    assert!(!session.has_pending_changes());

    session
        .set_property(&path("/a"), PropertyState::new("n", 1i64))
        .unwrap();
    session.save().unwrap();
    assert_eq!(store.revision(), 2);
}

#[test]
fn test_remove_node() {
    let store = setup_store();
    let mut session = store.session();
    session.add_node(&path("/a/b")).unwrap();
    session.save().unwrap();

    assert!(session.remove_node(&path("/a/b")).unwrap());
    assert!(!session.remove_node(&path("/a/b")).unwrap());
    session.save().unwrap();
    assert!(!store.head().node_at(&path("/a")).unwrap().has_child("b"));
}

#[test]
fn test_concurrent_disjoint_writers() {
    let store = Arc::new(MemoryNodeStore::new());
    let handles: Vec<_> = (0..8)
        .map(|i| {
            let store = Arc::clone(&store);
            thread::spawn(move || {
                let p = path(&format!("/writer{i}"));
                let mut session = store.session();
                session.add_node(&p).unwrap();
                session
                    .set_property(&p, PropertyState::new("id", i as i64))
                    .unwrap();
                session.save().unwrap();
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(store.revision(), 8);
    assert_eq!(store.head().child_count(), 8);
    assert_eq!(
        committed(&store, "/writer3", "id"),
        Some(PropertyValue::from(3i64))
    );
}
