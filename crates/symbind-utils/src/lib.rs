//! # symbind Utilities
//!
//! Logging and configuration shared by the symbind crates.
//!
//! Library crates only emit `tracing` events; binaries call
//! [`init_logging`] (or [`init_with_settings`]) once at startup.

pub mod config;
pub mod logging;

pub use config::LogSettings;
pub use logging::{init_logging, init_logging_with_level, init_with_settings, LogFormat, LogLevel, LoggingError};
pub use tracing::{debug, error, info, trace, warn};
