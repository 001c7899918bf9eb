use std::{sync::Arc, thread};

use convergent::{MemoryNodeStore, PropertyValue, RegisterKind};

use crate::helpers::*;

const HITS: &str = "/stats/hits";

#[test]
fn test_increments_accumulate() {
    let store = setup_register(HITS, RegisterKind::Counter);
    let p = path(HITS);
    for delta in [5, -2, 10] {
        let mut session = store.session();
        session.counter_increment(&p, delta).unwrap();
        session.save().unwrap();
    }
    assert_eq!(committed(&store, HITS, "counter"), Some(PropertyValue::from(13i64)));
    assert_no_markers(&store, HITS);
}

#[test]
fn test_concurrent_increments_compose() {
    let store = setup_register(HITS, RegisterKind::Counter);
    let p = path(HITS);
    let mut a = store.session();
    let mut b = store.session();
    a.counter_increment(&p, 3).unwrap();
    b.counter_increment(&p, 4).unwrap();
    a.save().unwrap();
    b.save().unwrap();
    assert_eq!(committed(&store, HITS, "counter"), Some(PropertyValue::from(7i64)));
}

#[test]
fn test_threads_sum_all_increments() {
    let store: Arc<MemoryNodeStore> = Arc::new(setup_register(HITS, RegisterKind::Counter));
    let handles: Vec<_> = (0..8)
        .map(|_| {
            let store = Arc::clone(&store);
            thread::spawn(move || {
                for _ in 0..25 {
                    let mut session = store.session();
                    session.counter_increment(&path(HITS), 1).unwrap();
                    session.save().unwrap();
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }
    assert_eq!(committed(&store, HITS, "counter"), Some(PropertyValue::from(200i64)));
}
