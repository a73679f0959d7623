//! End-to-end coverage of the public `Engine` API: the full
//! create/insert/get/delete/search/close/drop lifecycle, persistence
//! across a reopen, and concurrent access.

use nanovec_core::{Engine, EngineConfig, Metric};
use std::sync::Arc;
use std::thread;
use tempfile::tempdir;

fn config(dir: &tempfile::TempDir, dimension: usize, metric: Metric) -> EngineConfig {
    EngineConfig::new("it", dir.path().join("store.nvdb"), dimension, metric)
}

#[test]
fn full_lifecycle_create_insert_search_delete_close_drop() {
    let dir = tempdir().unwrap();
    let cfg = config(&dir, 4, Metric::Cosine);
    let engine = Engine::create(cfg.clone()).unwrap();

    engine.insert(1, vec![1.0, 0.0, 0.0, 0.0]).unwrap();
    engine.insert(2, vec![0.0, 1.0, 0.0, 0.0]).unwrap();
    engine.insert(3, vec![0.9, 0.1, 0.0, 0.0]).unwrap();

    let hits = engine.search(&[1.0, 0.0, 0.0, 0.0], 2, 0.0).unwrap();
    assert_eq!(hits.len(), 2);
    assert_eq!(hits[0].id, 1);
    assert_eq!(hits[1].id, 3);

    engine.delete(2).unwrap();
    assert!(engine.get(2).is_err());

    let stats = engine.stats().unwrap();
    assert_eq!(stats.live_count, 2);

    engine.close().unwrap();
    Engine::drop_store(&cfg).unwrap();
    assert!(!cfg.path.exists());
}

#[test]
fn reopen_preserves_live_vectors_and_rebuilds_index() {
    let dir = tempdir().unwrap();
    let cfg = config(&dir, 3, Metric::Dot);
    {
        let engine = Engine::create(cfg.clone()).unwrap();
        engine.insert(10, vec![1.0, 2.0, 3.0]).unwrap();
        engine.insert(11, vec![4.0, 5.0, 6.0]).unwrap();
        engine.delete(10).unwrap();
        engine.close().unwrap();
    }

    let engine = Engine::open(cfg).unwrap();
    assert!(engine.get(10).is_err());
    let v = engine.get(11).unwrap();
    assert_eq!(v.vector, vec![4.0, 5.0, 6.0]);

    let hits = engine.search(&[4.0, 5.0, 6.0], 1, 0.0).unwrap();
    assert_eq!(hits[0].id, 11);
}

#[test]
fn euclidean_orders_nearest_first() {
    let dir = tempdir().unwrap();
    let engine = Engine::create(config(&dir, 2, Metric::Euclidean)).unwrap();
    engine.insert(1, vec![0.0, 0.0]).unwrap();
    engine.insert(2, vec![10.0, 10.0]).unwrap();

    let hits = engine.search(&[1.0, 1.0], 2, 0.0).unwrap();
    assert_eq!(hits[0].id, 1);
    assert_eq!(hits[1].id, 2);
}

#[test]
fn reinsert_after_delete_then_get_returns_new_data() {
    let dir = tempdir().unwrap();
    let engine = Engine::create(config(&dir, 2, Metric::Cosine)).unwrap();
    engine.insert(5, vec![1.0, 0.0]).unwrap();
    engine.delete(5).unwrap();
    engine.insert(5, vec![0.0, 1.0]).unwrap();
    assert_eq!(engine.get(5).unwrap().vector, vec![0.0, 1.0]);
}

#[test]
fn search_on_empty_store_returns_empty_not_error() {
    let dir = tempdir().unwrap();
    let engine = Engine::create(config(&dir, 4, Metric::Cosine)).unwrap();
    let hits = engine.search(&[1.0, 0.0, 0.0, 0.0], 5, 0.0).unwrap();
    assert!(hits.is_empty());
}

#[test]
fn invalid_k_and_bad_min_similarity_are_rejected() {
    let dir = tempdir().unwrap();
    let engine = Engine::create(config(&dir, 4, Metric::Cosine)).unwrap();
    engine.insert(1, vec![1.0, 0.0, 0.0, 0.0]).unwrap();

    assert_eq!(
        engine.search(&[1.0, 0.0, 0.0, 0.0], 0, 0.0).unwrap_err().code(),
        -1
    );
    assert_eq!(
        engine
            .search(&[1.0, 0.0, 0.0, 0.0], 1, 2.0)
            .unwrap_err()
            .code(),
        -1
    );
}

#[test]
fn opening_a_corrupt_file_is_db_corrupt() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("corrupt.nvdb");
    std::fs::write(&path, vec![0xAAu8; 200]).unwrap();
    let err = Engine::open(EngineConfig::new("it", path, 4, Metric::Cosine)).unwrap_err();
    assert_eq!(err.code(), -7);
}

#[test]
fn opening_a_missing_file_is_db_not_found() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("missing.nvdb");
    let err = Engine::open(EngineConfig::new("it", path, 4, Metric::Cosine)).unwrap_err();
    assert_eq!(err.code(), -4);
}

#[test]
fn concurrent_writers_and_readers_stay_consistent() {
    let dir = tempdir().unwrap();
    let engine = Arc::new(Engine::create(config(&dir, 4, Metric::Cosine)).unwrap());

    let writer_engine = Arc::clone(&engine);
    let writer = thread::spawn(move || {
        for id in 0..200u64 {
            writer_engine
                .insert(id, vec![id as f32, 0.0, 0.0, 0.0])
                .unwrap();
        }
    });

    let readers: Vec<_> = (0..4)
        .map(|_| {
            let engine = Arc::clone(&engine);
            thread::spawn(move || {
                for _ in 0..50 {
                    let _ = engine.search(&[0.0, 0.0, 0.0, 0.0], 5, 0.0);
                }
            })
        })
        .collect();

    writer.join().unwrap();
    for r in readers {
        r.join().unwrap();
    }

    assert_eq!(engine.stats().unwrap().live_count, 200);
}
