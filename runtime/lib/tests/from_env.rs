//! Reads the configuration from the process environment, so it lives in its
//! own test binary.

use marshrt::{ConcolicSession, backends::RecordingEngine};

const MAX_SIZE_VAR: &str = "MARSH_MAX_SYMBOLIC_SIZE";

#[test]
fn test_max_symbolic_size_from_env() {
    std::env::remove_var(MAX_SIZE_VAR);
    let session = ConcolicSession::from_env(RecordingEngine::new().with_max_size(10)).unwrap();
    assert_eq!(session.max_symbolic_size(), 10);

    std::env::set_var(MAX_SIZE_VAR, "64");
    let session = ConcolicSession::from_env(RecordingEngine::new().with_max_size(10)).unwrap();
    assert_eq!(session.max_symbolic_size(), 64);

    std::env::set_var(MAX_SIZE_VAR, "0");
    assert!(ConcolicSession::from_env(RecordingEngine::new()).is_err());

    std::env::remove_var(MAX_SIZE_VAR);
}
