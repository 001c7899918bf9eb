use convergent::{
    MemoryNodeStore, PropertyValue, RegisterKind, Scalar, Session, StoreConfig,
    tree::{NodePath, NodeState},
};

// ==========================
// STORE FACTORIES
// ==========================

/// Parses a node path, panicking on malformed test input.
pub fn path(s: &str) -> NodePath {
    s.parse().expect("Invalid test path")
}

/// Creates a store with the default configuration.
pub fn setup_store() -> MemoryNodeStore {
    MemoryNodeStore::new()
}

/// Creates a store with the given configuration.
pub fn setup_store_with(config: StoreConfig) -> MemoryNodeStore {
    MemoryNodeStore::open(config)
}

/// Commits a node at `at` tagged with `kind`.
pub fn create_register(store: &MemoryNodeStore, at: &str, kind: RegisterKind) {
    let mut session = store.session();
    let p = path(at);
    session.add_node(&p).expect("Failed to add node");
    session.add_type(&p, kind).expect("Failed to add type");
    session.save().expect("Failed to commit register node");
}

/// Creates a store holding one register of `kind` at `at`.
pub fn setup_register(at: &str, kind: RegisterKind) -> MemoryNodeStore {
    let store = setup_store();
    create_register(&store, at, kind);
    store
}

// ==========================
// STATE ACCESS
// ==========================

/// The committed node at `at`.
pub fn node(store: &MemoryNodeStore, at: &str) -> NodeState {
    store
        .head()
        .node_at(&path(at))
        .cloned()
        .unwrap_or_else(|| panic!("Node {at} not found"))
}

/// The committed value of property `name` at `at`, if present.
pub fn committed(store: &MemoryNodeStore, at: &str, name: &str) -> Option<PropertyValue> {
    node(store, at).property(name).map(|p| p.value().clone())
}

/// The committed `values` of the set at `at`, as scalars in set order.
pub fn set_values(store: &MemoryNodeStore, at: &str) -> Vec<Scalar> {
    committed(store, at, "values")
        .map(|v| v.values().to_vec())
        .unwrap_or_default()
}

/// Longs as scalars, for comparing against set contents.
pub fn longs(values: &[i64]) -> Vec<Scalar> {
    values.iter().copied().map(Scalar::from).collect()
}

// ==========================
// OPERATION HELPERS
// ==========================

/// Adds each value to the set at `at` in a session of its own.
pub fn add_all(store: &MemoryNodeStore, at: &str, values: &[i64]) {
    for value in values {
        let mut session = store.session();
        session.set_add(&path(at), *value).expect("Failed to stage add");
        session.save().expect("Failed to commit add");
    }
}

/// Stages the given set operations in `session` without saving.
pub fn stage_set_ops(session: &mut Session<'_>, at: &str, adds: &[i64], removes: &[i64]) {
    let p = path(at);
    for value in adds {
        session.set_add(&p, *value).expect("Failed to stage add");
    }
    for value in removes {
        session.set_remove(&p, *value).expect("Failed to stage remove");
    }
}

/// Asserts that no operation marker survived on the node at `at`.
pub fn assert_no_markers(store: &MemoryNodeStore, at: &str) {
    let state = node(store, at);
    for property in state.properties() {
        let name = property.name();
        assert!(
            !(name.starts_with("add-") && !property.is_array())
                && !(name.starts_with("remove-") && !property.is_array())
                && !name.starts_with("update-")
                && name != "increment",
            "Marker {name} survived the commit at {at}"
        );
    }
}
