#![no_main]

use driftgraph_core::{GraphStore, Node, Relationship, RelationshipType};
use libfuzzer_sys::fuzz_target;

const LABELS: [&str; 3] = ["EC2", "Subnet", "VPC"];

// Each 4-byte chunk is one operation: [op, a, b, c].
fuzz_target!(|data: &[u8]| {
    let mut store = GraphStore::new();

    for chunk in data.chunks_exact(4) {
        let (a, b, c) = (chunk[1] % 16, chunk[2] % 16, chunk[3]);
        match chunk[0] % 4 {
            0 => {
                let labels = LABELS
                    .iter()
                    .enumerate()
                    .filter(|(i, _)| c & (1 << i) != 0)
                    .map(|(_, l)| *l);
                store.add_node(Node::new(format!("n{a}")).with_labels(labels));
            }
            1 | 2 => {
                let known = RelationshipType::KNOWN;
                let rel_type = known[usize::from(c) % known.len()].clone();
                let _ = store.add_relationship(Relationship::new(
                    format!("r{}", c % 32),
                    rel_type,
                    format!("n{a}"),
                    format!("n{b}"),
                ));
            }
            _ => {
                store.delete_node(&format!("n{a}"));
            }
        }

        if let Err(violation) = store.verify_indexes() {
            panic!("{violation}");
        }
    }

    let start = "n0";
    let reach = store.find_impact_radius(start, 3);
    assert!(reach.distances.values().all(|d| *d <= 3));
    let _ = store.find_dependencies(start, 3);
    let _ = store.find_critical_paths(2);
});
