//! # Configuration
//!
//! Logging is configured through the environment:
//!
//! - `RUST_LOG`: filter directives (e.g. `debug`, `symbind_core=trace`)
//! - `SYMBIND_LOG_FORMAT`: `pretty` (default) or `json`
//! - `SYMBIND_LOG_FILE`: optional path of a daily-rolling log file
//!
//! [`LogSettings`] gathers these once so callers can override single
//! fields (e.g. from a `--log-level` flag) before installing the subscriber.

use std::env;
use std::path::PathBuf;
use std::str::FromStr;

use crate::logging::{LogFormat, LogLevel, LoggingError};

/// Filter directives variable.
pub const LOG_FILTER_VAR: &str = "RUST_LOG";
/// Output format variable.
pub const LOG_FORMAT_VAR: &str = "SYMBIND_LOG_FORMAT";
/// Log file variable.
pub const LOG_FILE_VAR: &str = "SYMBIND_LOG_FILE";

/// Resolved logging configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogSettings
{
    /// `EnvFilter` directives; `None` means `info`.
    pub filter: Option<String>,
    /// Console and file output format.
    pub format: LogFormat,
    /// Daily-rolling log file, in addition to stderr.
    pub file: Option<PathBuf>,
}

impl Default for LogSettings
{
    fn default() -> Self
    {
        Self {
            filter: None,
            format: LogFormat::Pretty,
            file: None,
        }
    }
}

impl LogSettings
{
    /// Read settings from the process environment.
    ///
    /// ## Errors
    ///
    /// Returns [`LoggingError::InvalidFormat`] if `SYMBIND_LOG_FORMAT` is set
    /// to something other than a known format.
    pub fn from_env() -> Result<Self, LoggingError>
    {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Read settings through `lookup`, which maps a variable name to its value.
    ///
    /// Empty values are treated as unset.
    ///
    /// ## Errors
    ///
    /// Same as [`LogSettings::from_env`].
    pub fn from_lookup<F>(lookup: F) -> Result<Self, LoggingError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let format = match var(LOG_FORMAT_VAR) {
            Some(raw) => LogFormat::from_str(&raw).map_err(LoggingError::InvalidFormat)?,
            None => LogFormat::Pretty,
        };

        Ok(Self {
            filter: var(LOG_FILTER_VAR),
            format,
            file: var(LOG_FILE_VAR).map(PathBuf::from),
        })
    }

    /// Replace the filter with a single level.
    #[must_use]
    pub fn with_level(mut self, level: LogLevel) -> Self
    {
        self.filter = Some(level.as_str().to_string());
        self
    }

    /// Replace the output format.
    #[must_use]
    pub fn with_format(mut self, format: LogFormat) -> Self
    {
        self.format = format;
        self
    }
}

#[cfg(test)]
mod tests
{
    use std::collections::HashMap;

    use super::*;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String>
    {
        let map: HashMap<String, String> = pairs.iter().map(|(k, v)| ((*k).to_string(), (*v).to_string())).collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_when_unset()
    {
        let settings = LogSettings::from_lookup(|_| None).unwrap();
        assert_eq!(settings, LogSettings::default());
    }

    #[test]
    fn test_reads_all_variables()
    {
        let settings = LogSettings::from_lookup(lookup_from(&[
            ("RUST_LOG", "symbind_core=debug"),
            ("SYMBIND_LOG_FORMAT", "json"),
            ("SYMBIND_LOG_FILE", "/var/log/symbind.log"),
        ]))
        .unwrap();

        assert_eq!(settings.filter.as_deref(), Some("symbind_core=debug"));
        assert_eq!(settings.format, LogFormat::Json);
        assert_eq!(settings.file, Some(PathBuf::from("/var/log/symbind.log")));
    }

    #[test]
    fn test_empty_values_are_unset()
    {
        let settings = LogSettings::from_lookup(lookup_from(&[("RUST_LOG", "  "), ("SYMBIND_LOG_FILE", "")])).unwrap();
        assert_eq!(settings.filter, None);
        assert_eq!(settings.file, None);
    }

    #[test]
    fn test_invalid_format()
    {
        let err = LogSettings::from_lookup(lookup_from(&[("SYMBIND_LOG_FORMAT", "xml")])).unwrap_err();
        assert!(matches!(err, LoggingError::InvalidFormat(_)));
        assert!(err.to_string().contains("xml"));
    }

    #[test]
    fn test_overrides()
    {
        let settings = LogSettings::from_lookup(lookup_from(&[("RUST_LOG", "warn")]))
            .unwrap()
            .with_level(LogLevel::Trace)
            .with_format(LogFormat::Json);
        assert_eq!(settings.filter.as_deref(), Some("trace"));
        assert_eq!(settings.format, LogFormat::Json);
    }
}
