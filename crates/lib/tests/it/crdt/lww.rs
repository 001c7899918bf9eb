use convergent::{PropertyState, PropertyValue, RegisterKind};

use crate::helpers::*;

const TITLE: &str = "/doc/title";

#[test]
fn test_sequential_updates() {
    let store = setup_register(TITLE, RegisterKind::Lww);
    let p = path(TITLE);
    for (marker, value) in [("update-1", 1i64), ("update-2", 2)] {
        let mut session = store.session();
        session
            .set_property(&p, PropertyState::new(marker, value))
            .unwrap();
        session.save().unwrap();
    }
    assert_eq!(committed(&store, TITLE, "value"), Some(PropertyValue::from(2i64)));
    assert_no_markers(&store, TITLE);
}

#[test]
fn test_last_staged_update_in_one_session_wins() {
    // Repeated on fresh registers: marker suffixes are random, the winner must not be
    for _ in 0..50 {
        let store = setup_register(TITLE, RegisterKind::Lww);
        let p = path(TITLE);
        let mut session = store.session();
        session.register_update(&p, "first").unwrap();
        session.register_update(&p, "second").unwrap();
        session.save().unwrap();
        assert_eq!(
            committed(&store, TITLE, "value"),
            Some(PropertyValue::from("second"))
        );
        assert_no_markers(&store, TITLE);
    }
}

#[test]
fn test_concurrent_updates_last_commit_wins() {
    let store = setup_register(TITLE, RegisterKind::Lww);
    let p = path(TITLE);
    let mut first = store.session();
    let mut second = store.session();
    first.register_update(&p, "first").unwrap();
    second.register_update(&p, "second").unwrap();

    second.save().unwrap();
    first.save().unwrap();
    assert_eq!(
        committed(&store, TITLE, "value"),
        Some(PropertyValue::from("first"))
    );
    assert_no_markers(&store, TITLE);
}

#[test]
fn test_array_update_replaces_whole_value() {
    let store = setup_register(TITLE, RegisterKind::Lww);
    let p = path(TITLE);
    let mut session = store.session();
    session.register_update(&p, vec!["a", "b"]).unwrap();
    session.save().unwrap();
    session.register_update(&p, vec!["c"]).unwrap();
    session.save().unwrap();
    assert_eq!(
        committed(&store, TITLE, "value"),
        Some(PropertyValue::from(vec!["c"]))
    );
}

#[test]
fn test_type_mismatch_fails_commit() {
    let store = setup_register(TITLE, RegisterKind::Lww);
    let p = path(TITLE);
    let mut session = store.session();
    session.register_update(&p, 10i64).unwrap();
    session.save().unwrap();

    session.register_update(&p, vec!["ten"]).unwrap();
    let err = session.save().unwrap_err();
    assert!(err.is_type_error());
    assert_eq!(committed(&store, TITLE, "value"), Some(PropertyValue::from(10i64)));
}
