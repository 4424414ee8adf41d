#![no_main]

use driftgraph_core::{GraphStore, Node, Relationship};
use libfuzzer_sys::fuzz_target;
use serde_json::Value;

fuzz_target!(|data: &[u8]| {
    let Ok(value) = serde_json::from_slice::<Value>(data) else {
        return;
    };

    let mut store = GraphStore::new();
    if let Some(nodes) = value.get("nodes").and_then(Value::as_array) {
        for raw in nodes {
            if let Ok(node) = serde_json::from_value::<Node>(raw.clone()) {
                store.add_node(node);
            }
        }
    }
    if let Some(rels) = value.get("relationships").and_then(Value::as_array) {
        for raw in rels {
            if let Ok(rel) = serde_json::from_value::<Relationship>(raw.clone()) {
                let _ = store.add_relationship(rel);
            }
        }
    }

    assert!(store.verify_indexes().is_ok());
    let _ = store.content_hash();
    let _ = store.to_dot();
});
