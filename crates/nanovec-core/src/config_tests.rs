use super::*;
use tempfile::tempdir;

#[test]
fn rejects_zero_dimension() {
    let cfg = EngineConfig::new("t", "/tmp/does-not-exist-nanovec", 0, Metric::Cosine);
    assert!(cfg.validate_for_create().is_err());
}

#[test]
fn rejects_dimension_over_max() {
    let cfg = EngineConfig::new(
        "t",
        "/tmp/does-not-exist-nanovec",
        MAX_DIMENSION + 1,
        Metric::Cosine,
    );
    assert!(cfg.validate_for_create().is_err());
}

#[test]
fn accepts_boundary_dimensions() {
    let dir = tempdir().unwrap();
    let cfg = EngineConfig::new("t", dir.path().join("a.nvdb"), 1, Metric::Cosine);
    assert!(cfg.validate_for_create().is_ok());
    let cfg = EngineConfig::new("t", dir.path().join("b.nvdb"), MAX_DIMENSION, Metric::Cosine);
    assert!(cfg.validate_for_create().is_ok());
}

#[test]
fn create_rejects_existing_path() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("existing.nvdb");
    std::fs::write(&path, b"x").unwrap();
    let cfg = EngineConfig::new("t", path, 4, Metric::Cosine);
    assert!(cfg.validate_for_create().is_err());
}

#[test]
fn open_rejects_missing_path() {
    let dir = tempdir().unwrap();
    let cfg = EngineConfig::new("t", dir.path().join("missing.nvdb"), 4, Metric::Cosine);
    assert!(cfg.validate_for_open().is_err());
}
