//! Shared helpers for benchmark tests

use convergent::{MemoryNodeStore, RegisterKind, tree::NodePath};

pub fn path(s: &str) -> NodePath {
    s.parse().expect("Invalid benchmark path")
}

/// Creates a store holding a set at `/set` with `size` Long members.
pub fn setup_set(size: usize) -> MemoryNodeStore {
    let store = MemoryNodeStore::new();
    let p = path("/set");
    let mut session = store.session();
    session.add_node(&p).expect("Failed to add node");
    session
        .add_type(&p, RegisterKind::Set)
        .expect("Failed to add type");
    for i in 0..size {
        session.set_add(&p, i as i64).expect("Failed to stage add");
    }
    session.save().expect("Failed to commit set");
    store
}

/// Creates a store with `width` untouched sibling subtrees next to `/set`.
pub fn setup_wide_tree(width: usize) -> MemoryNodeStore {
    let store = setup_set(10);
    let mut session = store.session();
    for i in 0..width {
        let p = path(&format!("/other/n{i}"));
        session.add_node(&p).expect("Failed to add node");
        session
            .add_type(&p, RegisterKind::Lww)
            .expect("Failed to add type");
    }
    session.save().expect("Failed to commit siblings");
    store
}
