//! Property tests on the universal invariants in spec §8: live-count
//! bookkeeping and get/delete consistency must hold for *any* sequence of
//! inserts and deletes, not just the hand-picked scenarios in the other
//! integration tests.

use nanovec_core::{Engine, EngineConfig, Metric};
use proptest::prelude::*;
use std::collections::HashMap;
use tempfile::tempdir;

const DIMENSION: usize = 4;

#[derive(Debug, Clone)]
enum Op {
    Insert { id: u64, vector: Vec<f32> },
    Delete { id: u64 },
}

fn op_strategy() -> impl Strategy<Value = Op> {
    let id_range = 0u64..16;
    let vector = proptest::collection::vec(-10.0f32..10.0, DIMENSION);
    prop_oneof![
        (id_range.clone(), vector).prop_map(|(id, vector)| Op::Insert { id, vector }),
        id_range.prop_map(|id| Op::Delete { id }),
    ]
}

proptest! {
    /// Replays an arbitrary insert/delete sequence against both a real
    /// `Engine` and a plain `HashMap` model, checking after every step that
    /// the engine's live-count and per-id contents agree with the model.
    #[test]
    fn live_count_and_contents_match_model(ops in proptest::collection::vec(op_strategy(), 0..80)) {
        let dir = tempdir().unwrap();
        let engine = Engine::create(EngineConfig::new(
            "prop",
            dir.path().join("a.nvdb"),
            DIMENSION,
            Metric::Cosine,
        ))
        .unwrap();

        let mut model: HashMap<u64, Vec<f32>> = HashMap::new();

        for op in ops {
            match op {
                Op::Insert { id, vector } => {
                    let result = engine.insert(id, vector.clone());
                    if model.contains_key(&id) {
                        prop_assert!(result.is_err());
                    } else {
                        prop_assert!(result.is_ok());
                        model.insert(id, vector);
                    }
                }
                Op::Delete { id } => {
                    let result = engine.delete(id);
                    if model.remove(&id).is_some() {
                        prop_assert!(result.is_ok());
                    } else {
                        prop_assert!(result.is_err());
                    }
                }
            }

            let stats = engine.stats().unwrap();
            prop_assert_eq!(stats.live_count, model.len() as u64);

            for (&id, vector) in &model {
                let record = engine.get(id).unwrap();
                prop_assert_eq!(&record.vector, vector);
            }
        }
    }

    /// Inserting under a fresh id always succeeds and is immediately
    /// readable back bit-for-bit; deleting it then makes it unreadable.
    #[test]
    fn insert_then_delete_round_trips(id in any::<u64>(), vector in proptest::collection::vec(-100.0f32..100.0, DIMENSION)) {
        let dir = tempdir().unwrap();
        let engine = Engine::create(EngineConfig::new(
            "prop",
            dir.path().join("a.nvdb"),
            DIMENSION,
            Metric::Cosine,
        ))
        .unwrap();

        engine.insert(id, vector.clone()).unwrap();
        let record = engine.get(id).unwrap();
        prop_assert_eq!(record.vector, vector);

        engine.delete(id).unwrap();
        prop_assert!(engine.get(id).is_err());
    }
}
