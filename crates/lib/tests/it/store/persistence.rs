use convergent::{MemoryNodeStore, PropertyValue, RegisterKind, StoreConfig};
use tempfile::tempdir;

use crate::helpers::*;

#[test]
fn test_save_and_load_round_trip() {
    let dir = tempdir().unwrap();
    let file = dir.path().join("state.json");

    let store = setup_register("/tags", RegisterKind::Set);
    add_all(&store, "/tags", &[1, 2]);
    store.save_to_file(&file).unwrap();

    let loaded = MemoryNodeStore::load_from_file(&file, StoreConfig::default()).unwrap();
    assert_eq!(loaded.head(), store.head());
    assert_eq!(loaded.revision(), store.revision());

    // The loaded store keeps applying the registers
    add_all(&loaded, "/tags", &[3]);
    assert_eq!(set_values(&loaded, "/tags"), longs(&[1, 2, 3]));
}

#[test]
fn test_missing_file_loads_empty_store() {
    let dir = tempdir().unwrap();
    let store =
        MemoryNodeStore::load_from_file(dir.path().join("absent.json"), StoreConfig::default())
            .unwrap();
    assert_eq!(store.revision(), 0);
    assert_eq!(store.head().child_count(), 0);
}

#[test]
fn test_state_file_format() {
    let dir = tempdir().unwrap();
    let file = dir.path().join("state.json");
    let store = setup_register("/cell", RegisterKind::Lww);
    let mut session = store.session();
    session.register_update(&path("/cell"), 5i64).unwrap();
    session.save().unwrap();
    store.save_to_file(&file).unwrap();

    let json: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&file).unwrap()).unwrap();
    // Version 0 is implied
    assert!(json.get("_v").is_none());
    assert_eq!(json["revision"], 2);
    assert_eq!(
        json["root"]["children"]["cell"]["properties"]["value"],
        serde_json::json!({"single": {"long": 5}})
    );
    assert_eq!(
        committed(&store, "/cell", "value"),
        Some(PropertyValue::from(5i64))
    );
}

#[test]
fn test_unsupported_version_rejected() {
    let dir = tempdir().unwrap();
    let file = dir.path().join("state.json");
    std::fs::write(&file, r#"{"_v": 7, "revision": 1, "root": {}}"#).unwrap();
    let err = MemoryNodeStore::load_from_file(&file, StoreConfig::default()).unwrap_err();
    assert_eq!(err.module(), "store");
    assert!(err.to_string().contains("version 7"));
}

#[test]
fn test_corrupt_file_is_serialization_error() {
    let dir = tempdir().unwrap();
    let file = dir.path().join("state.json");
    std::fs::write(&file, "{ not json").unwrap();
    let err = MemoryNodeStore::load_from_file(&file, StoreConfig::default()).unwrap_err();
    assert!(err.is_serialization_error());
}

#[test]
fn test_mixed_array_in_state_file_rejected() {
    let dir = tempdir().unwrap();
    let file = dir.path().join("state.json");
    std::fs::write(
        &file,
        r#"{"revision": 1, "root": {"properties": {"values": {"array": {"base": "long", "values": [{"long": 1}, {"string": "x"}]}}}}}"#,
    )
    .unwrap();
    let err = MemoryNodeStore::load_from_file(&file, StoreConfig::default()).unwrap_err();
    assert!(err.is_serialization_error());
}

#[test]
fn test_save_into_missing_directory_is_io_error() {
    let dir = tempdir().unwrap();
    let store = setup_store();
    let err = store
        .save_to_file(dir.path().join("nested").join("state.json"))
        .unwrap_err();
    assert!(err.is_io_error());
}
