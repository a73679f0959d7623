use super::*;

#[test]
fn dimension_matches_vector_length() {
    let r = VectorRecord::new(1, vec![1.0, 2.0, 3.0], 0);
    assert_eq!(r.dimension(), 3);
}

#[test]
fn search_hit_carries_id_and_score() {
    let hit = SearchHit::new(42, 0.987);
    assert_eq!(hit.id, 42);
    assert!((hit.score - 0.987).abs() < 1e-6);
}
