//! Global subscriber installation
//!
//! The subscriber is process-wide, so everything that installs it lives in
//! this single test.

use symbind_utils::{init_with_settings, LogFormat, LogLevel, LogSettings, LoggingError};

#[test]
fn test_init_with_file_then_reinit_fails()
{
    let dir = tempfile::tempdir().unwrap();
    let log_dir = dir.path().join("logs").join("nested");

    let settings = LogSettings {
        file: Some(log_dir.join("symbind.log")),
        ..LogSettings::default()
    }
    .with_level(LogLevel::Debug)
    .with_format(LogFormat::Json);

    init_with_settings(&settings).unwrap();
    assert!(log_dir.is_dir());
    tracing::debug!(answer = 42, "logging initialized");

    let err = init_with_settings(&LogSettings::default()).unwrap_err();
    assert!(matches!(err, LoggingError::InitializationFailed(_)));
}
