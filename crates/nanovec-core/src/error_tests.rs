//! Tests for `error` module

use super::*;

#[test]
fn codes_match_taxonomy() {
    assert_eq!(Error::InvalidArgs("x".into()).code(), -1);
    assert_eq!(Error::OutOfMemory("x".into()).code(), -2);
    assert_eq!(Error::FileIo(std::io::Error::other("x")).code(), -3);
    assert_eq!(Error::DbNotFound("x".into()).code(), -4);
    assert_eq!(Error::VectorNotFound(7).code(), -5);
    assert_eq!(
        Error::DimensionMismatch {
            expected: 4,
            actual: 3
        }
        .code(),
        -6
    );
    assert_eq!(Error::DbCorrupt("x".into()).code(), -7);
    assert_eq!(CODE_SUCCESS, 0);
}

#[test]
fn codes_are_unique() {
    let errors: Vec<Error> = vec![
        Error::InvalidArgs("x".into()),
        Error::OutOfMemory("x".into()),
        Error::FileIo(std::io::Error::other("x")),
        Error::DbNotFound("x".into()),
        Error::VectorNotFound(1),
        Error::DimensionMismatch {
            expected: 1,
            actual: 2,
        },
        Error::DbCorrupt("x".into()),
    ];
    let mut codes: Vec<i32> = errors.iter().map(Error::code).collect();
    let before = codes.len();
    codes.sort_unstable();
    codes.dedup();
    assert_eq!(codes.len(), before);
}

#[test]
fn code_names_are_stable() {
    assert_eq!(Error::InvalidArgs("x".into()).code_name(), "invalid-args");
    assert_eq!(Error::VectorNotFound(1).code_name(), "vector-not-found");
    assert_eq!(Error::DbCorrupt("x".into()).code_name(), "db-corrupt");
}

#[test]
fn dimension_mismatch_display() {
    let err = Error::DimensionMismatch {
        expected: 768,
        actual: 512,
    };
    let display = format!("{err}");
    assert!(display.contains("768"));
    assert!(display.contains("512"));
}

#[test]
fn from_io_error() {
    let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
    let err: Error = io_err.into();
    assert_eq!(err.code(), -3);
    assert!(format!("{err}").contains("file not found"));
}

#[test]
fn error_is_send_sync() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<Error>();
}
