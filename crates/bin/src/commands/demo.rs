//! Demo command - replays concurrent writer scenarios on a scratch store.
//!
//! Each scenario opens two or three sessions on the same head before any of
//! them saves, then saves them in a fixed order, so the later ones are rebased.

use convergent::{
    MemoryNodeStore, PropertyState, PropertyValue, RegisterKind, Result as StoreResult,
    constants::VALUE, tree::NodePath,
};

use crate::output::{OutputFormat, aligned};

struct Scenario {
    name: &'static str,
    expected: &'static str,
    actual: String,
}

fn register(store: &MemoryNodeStore, at: &str, kind: RegisterKind) -> StoreResult<NodePath> {
    let path: NodePath = at.parse()?;
    let mut session = store.session();
    session.add_node(&path)?;
    session.add_type(&path, kind)?;
    session.save()?;
    Ok(path)
}

fn committed(store: &MemoryNodeStore, path: &NodePath, name: &str) -> String {
    store
        .head()
        .node_at(path)
        .and_then(|node| node.property(name).map(|p| p.value().to_string()))
        .unwrap_or_else(|| "(absent)".to_string())
}

fn set_scenario(store: &MemoryNodeStore) -> StoreResult<Scenario> {
    let path = register(store, "/demo/set", RegisterKind::Set)?;
    let mut a = store.session();
    let mut b = store.session();
    for value in [1i64, 5, 9] {
        a.set_add(&path, value)?;
    }
    b.set_add(&path, 3i64)?;
    b.set_remove(&path, 5i64)?;
    a.save()?;
    b.save()?;
    Ok(Scenario {
        name: "set: A adds 1,5,9; B adds 3, removes 5",
        expected: "[1, 3, 9]",
        actual: committed(store, &path, "values"),
    })
}

fn lww_scenario(store: &MemoryNodeStore) -> StoreResult<Scenario> {
    let path = register(store, "/demo/lww", RegisterKind::Lww)?;
    let mut a = store.session();
    let mut b = store.session();
    a.register_update(&path, 1i64)?;
    b.register_update(&path, 2i64)?;
    a.save()?;
    b.save()?;
    Ok(Scenario {
        name: "lww: A writes 1, B writes 2, B saves last",
        expected: "2",
        actual: committed(store, &path, VALUE),
    })
}

fn mv_scenario(store: &MemoryNodeStore) -> StoreResult<Vec<Scenario>> {
    let path = register(store, "/demo/mv", RegisterKind::Mv)?;
    let mut a = store.session();
    let mut b = store.session();
    a.set_property(&path, PropertyState::new(VALUE, vec![1i64]))?;
    b.set_property(&path, PropertyState::new(VALUE, vec![2i64]))?;
    a.save()?;
    b.save()?;
    let merged = Scenario {
        name: "mv: A writes [1], B writes [2]",
        expected: "[1, 2]",
        actual: committed(store, &path, VALUE),
    };

    let mut c = store.session();
    c.set_property(&path, PropertyState::new(VALUE, PropertyValue::from(vec![3i64])))?;
    c.save()?;
    let overwritten = Scenario {
        name: "mv: C then writes [3]",
        expected: "[3]",
        actual: committed(store, &path, VALUE),
    };
    Ok(vec![merged, overwritten])
}

fn counter_scenario(store: &MemoryNodeStore) -> StoreResult<Scenario> {
    let path = register(store, "/demo/counter", RegisterKind::Counter)?;
    let mut sessions: Vec<_> = (0..3).map(|_| store.session()).collect();
    for (i, session) in sessions.iter_mut().enumerate() {
        session.counter_increment(&path, 10_i64.pow(i as u32))?;
    }
    for session in &mut sessions {
        session.save()?;
    }
    Ok(Scenario {
        name: "counter: three writers add 1, 10, 100",
        expected: "111",
        actual: committed(store, &path, "counter"),
    })
}

/// Run the demo command
pub fn run(format: OutputFormat) -> Result<(), Box<dyn std::error::Error>> {
    let store = MemoryNodeStore::new();
    let mut scenarios = vec![set_scenario(&store)?, lww_scenario(&store)?];
    scenarios.extend(mv_scenario(&store)?);
    scenarios.push(counter_scenario(&store)?);

    match format {
        OutputFormat::Human => {
            let rows = scenarios
                .iter()
                .map(|s| {
                    let status = if s.actual == s.expected { "ok" } else { "MISMATCH" };
                    [
                        s.name.to_string(),
                        s.expected.to_string(),
                        s.actual.clone(),
                        status.to_string(),
                    ]
                })
                .collect();
            for line in aligned(["SCENARIO", "EXPECTED", "CONVERGED", "STATUS"], rows) {
                println!("{line}");
            }
        }
        OutputFormat::Json => {
            let value: Vec<serde_json::Value> = scenarios
                .iter()
                .map(|s| {
                    serde_json::json!({
                        "scenario": s.name,
                        "expected": s.expected,
                        "converged": s.actual,
                    })
                })
                .collect();
            println!("{}", serde_json::to_string(&value)?);
        }
    }

    if scenarios.iter().any(|s| s.actual != s.expected) {
        return Err("some scenarios did not converge as expected".into());
    }
    Ok(())
}
