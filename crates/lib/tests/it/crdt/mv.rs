use convergent::{PropertyState, PropertyValue, RegisterKind};

use crate::helpers::*;

const CELL: &str = "/cell";

fn write(session: &mut convergent::Session<'_>, value: impl Into<PropertyValue>) {
    session
        .set_property(&path(CELL), PropertyState::new("value", value))
        .unwrap();
}

#[test]
fn test_concurrent_writes_merge_then_overwrite() {
    let store = setup_register(CELL, RegisterKind::Mv);
    let mut a = store.session();
    let mut b = store.session();
    write(&mut a, vec![1i64]);
    write(&mut b, vec![2i64]);
    a.save().unwrap();
    b.save().unwrap();
    assert_eq!(
        committed(&store, CELL, "value"),
        Some(PropertyValue::from(vec![1i64, 2]))
    );

    // A writer that observed the merged state simply overwrites it
    let mut c = store.session();
    write(&mut c, vec![3i64]);
    c.save().unwrap();
    assert_eq!(
        committed(&store, CELL, "value"),
        Some(PropertyValue::from(vec![3i64]))
    );
}

#[test]
fn test_concurrent_changes_of_existing_value() {
    let store = setup_register(CELL, RegisterKind::Mv);
    let mut setup = store.session();
    write(&mut setup, 0i64);
    setup.save().unwrap();

    let mut a = store.session();
    let mut b = store.session();
    write(&mut a, 5i64);
    write(&mut b, 4i64);
    a.save().unwrap();
    b.save().unwrap();
    // Single values merge into an array too
    assert_eq!(
        committed(&store, CELL, "value"),
        Some(PropertyValue::from(vec![4i64, 5]))
    );
}

#[test]
fn test_change_wins_over_concurrent_delete() {
    let store = setup_register(CELL, RegisterKind::Mv);
    let mut setup = store.session();
    write(&mut setup, "x");
    setup.save().unwrap();

    let mut changer = store.session();
    let mut deleter = store.session();
    write(&mut changer, "y");
    deleter.remove_property(&path(CELL), "value").unwrap();

    deleter.save().unwrap();
    changer.save().unwrap();
    assert_eq!(committed(&store, CELL, "value"), Some(PropertyValue::from("y")));

    // And the other way around: the deletion arrives second
    let mut changer = store.session();
    let mut deleter = store.session();
    write(&mut changer, "z");
    deleter.remove_property(&path(CELL), "value").unwrap();
    changer.save().unwrap();
    deleter.save().unwrap();
    assert_eq!(committed(&store, CELL, "value"), Some(PropertyValue::from("z")));
}

#[test]
fn test_untagged_node_still_conflicts() {
    let store = setup_store();
    let mut setup = store.session();
    setup.add_node(&path(CELL)).unwrap();
    setup.save().unwrap();

    let mut a = store.session();
    let mut b = store.session();
    write(&mut a, 1i64);
    write(&mut b, 2i64);
    a.save().unwrap();
    let err = b.save().unwrap_err();
    assert!(err.is_conflict());
    assert_eq!(committed(&store, CELL, "value"), Some(PropertyValue::from(1i64)));
}
