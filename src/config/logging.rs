//! Logging directive configuration.
//!
//! Each `[[logging]]` entry names its sinks, a minimum level and a list of
//! log types to include or (with a leading `-`) exclude:
//!
//! ```toml
//! [[logging]]
//! method = "file stdout"
//! filename = "ircd.log"
//! level = "info"
//! type = "* -userinput -useroutput"
//! ```

use serde::Deserialize;
use std::collections::HashSet;
use thiserror::Error;

/// Prefix marking a type as excluded.
const EXCLUDE_MARKER: char = '-';

/// Type name matching every log type.
const WILDCARD_TYPE: &str = "*";

/// Recognised level names. Several spellings map to the same level.
const LEVEL_NAMES: &[(&str, LogLevel)] = &[
    ("debug", LogLevel::Debug),
    ("info", LogLevel::Info),
    ("warn", LogLevel::Warning),
    ("warning", LogLevel::Warning),
    ("warnings", LogLevel::Warning),
    ("error", LogLevel::Error),
    ("errors", LogLevel::Error),
];

/// Logging directive errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LoggingError {
    #[error("logging method 'file' is set but 'filename' is empty")]
    MissingFilename,
    #[error("unrecognised log level {0:?}")]
    UnknownLevel(String),
    #[error("logging type '-' has no type name to exclude")]
    BareExclusion,
    #[error("logging directive has no types to log")]
    NoTypes,
}

/// Raw `[[logging]]` entry as written in the config file.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoggingBlock {
    /// Space-separated sinks: `file`, `stdout`, `stderr`.
    #[serde(default)]
    pub method: String,
    /// Log file path, required when `method` includes `file`.
    #[serde(default)]
    pub filename: String,
    /// Space-separated types; `-name` excludes a type.
    #[serde(default, rename = "type")]
    pub types: String,
    /// Minimum level name.
    #[serde(default)]
    pub level: String,
}

/// Severity of a log line, ordered from least to most severe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum LogLevel {
    Debug,
    Info,
    Warning,
    Error,
}

impl LogLevel {
    /// Look up a level by name, case-insensitively.
    pub fn from_name(name: &str) -> Option<Self> {
        let lowered = name.to_lowercase();
        LEVEL_NAMES
            .iter()
            .find(|(candidate, _)| *candidate == lowered)
            .map(|(_, level)| *level)
    }
}

impl From<LogLevel> for tracing::Level {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Debug => tracing::Level::DEBUG,
            LogLevel::Info => tracing::Level::INFO,
            LogLevel::Warning => tracing::Level::WARN,
            LogLevel::Error => tracing::Level::ERROR,
        }
    }
}

/// Output sinks selected by a directive.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LogMethods {
    pub file: bool,
    pub stdout: bool,
    pub stderr: bool,
}

/// A resolved logging directive, ready for the logging sink.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggingConfig {
    pub methods: LogMethods,
    /// Log file path (empty unless `methods.file` is set).
    pub filename: String,
    pub level: LogLevel,
    pub types: HashSet<String>,
    pub excluded_types: HashSet<String>,
}

impl LoggingConfig {
    /// Whether a line of `log_type` at `level` passes this directive.
    pub fn wants(&self, level: LogLevel, log_type: &str) -> bool {
        level >= self.level
            && !self.excluded_types.contains(log_type)
            && (self.types.contains(WILDCARD_TYPE) || self.types.contains(log_type))
    }
}

impl LoggingBlock {
    /// Normalize the raw method, level and type strings.
    pub fn resolve(&self) -> Result<LoggingConfig, LoggingError> {
        let methods = parse_methods(&self.method);
        if methods.file && self.filename.is_empty() {
            return Err(LoggingError::MissingFilename);
        }

        let level = LogLevel::from_name(&self.level)
            .ok_or_else(|| LoggingError::UnknownLevel(self.level.clone()))?;

        let (types, excluded_types) = parse_types(&self.types)?;

        Ok(LoggingConfig {
            methods,
            filename: self.filename.clone(),
            level,
            types,
            excluded_types,
        })
    }
}

fn parse_methods(raw: &str) -> LogMethods {
    let mut methods = LogMethods::default();
    for token in raw.split_whitespace() {
        match token.to_lowercase().as_str() {
            "file" => methods.file = true,
            "stdout" => methods.stdout = true,
            "stderr" => methods.stderr = true,
            _ => {}
        }
    }
    methods
}

fn parse_types(raw: &str) -> Result<(HashSet<String>, HashSet<String>), LoggingError> {
    let mut included = HashSet::new();
    let mut excluded = HashSet::new();

    for token in raw.split_whitespace() {
        match token.strip_prefix(EXCLUDE_MARKER) {
            Some("") => return Err(LoggingError::BareExclusion),
            Some(name) => {
                excluded.insert(name.to_string());
            }
            None => {
                included.insert(token.to_string());
            }
        }
    }

    if included.is_empty() {
        return Err(LoggingError::NoTypes);
    }
    Ok((included, excluded))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn block(method: &str, filename: &str, level: &str, types: &str) -> LoggingBlock {
        LoggingBlock {
            method: method.to_string(),
            filename: filename.to_string(),
            types: types.to_string(),
            level: level.to_string(),
        }
    }

    fn set(items: &[&str]) -> HashSet<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn resolves_methods_level_and_types() {
        let cfg = block("file stdout", "ircd.log", "info", "server -connect")
            .resolve()
            .unwrap();
        assert_eq!(
            cfg.methods,
            LogMethods {
                file: true,
                stdout: true,
                stderr: false
            }
        );
        assert_eq!(cfg.level, LogLevel::Info);
        assert_eq!(cfg.types, set(&["server"]));
        assert_eq!(cfg.excluded_types, set(&["connect"]));
        assert_eq!(cfg.filename, "ircd.log");
    }

    #[test]
    fn method_tokens_are_case_insensitive_and_unknown_ones_ignored() {
        let cfg = block("  STDERR   syslog ", "", "debug", "*").resolve().unwrap();
        assert_eq!(
            cfg.methods,
            LogMethods {
                file: false,
                stdout: false,
                stderr: true
            }
        );
    }

    #[test]
    fn file_method_requires_filename() {
        let err = block("file", "", "info", "*").resolve().unwrap_err();
        assert_eq!(err, LoggingError::MissingFilename);
    }

    #[test]
    fn level_aliases() {
        assert_eq!(LogLevel::from_name("DEBUG"), Some(LogLevel::Debug));
        assert_eq!(LogLevel::from_name("warn"), Some(LogLevel::Warning));
        assert_eq!(LogLevel::from_name("Warnings"), Some(LogLevel::Warning));
        assert_eq!(LogLevel::from_name("errors"), Some(LogLevel::Error));
        assert_eq!(LogLevel::from_name("verbose"), None);
        assert_eq!(LogLevel::from_name(""), None);
    }

    #[test]
    fn unknown_level_is_rejected() {
        let err = block("stdout", "", "loud", "*").resolve().unwrap_err();
        assert_eq!(err, LoggingError::UnknownLevel("loud".to_string()));
    }

    #[test]
    fn bare_exclusion_is_rejected() {
        let err = block("stdout", "", "info", "server - connect")
            .resolve()
            .unwrap_err();
        assert_eq!(err, LoggingError::BareExclusion);
    }

    #[test]
    fn directive_with_only_exclusions_is_rejected() {
        let err = block("stdout", "", "info", "-server -connect")
            .resolve()
            .unwrap_err();
        assert_eq!(err, LoggingError::NoTypes);

        let err = block("stdout", "", "info", "").resolve().unwrap_err();
        assert_eq!(err, LoggingError::NoTypes);
    }

    #[test]
    fn wants_applies_level_inclusion_and_exclusion() {
        let cfg = block("stdout", "", "warn", "* -userinput").resolve().unwrap();
        assert!(cfg.wants(LogLevel::Error, "server"));
        assert!(cfg.wants(LogLevel::Warning, "opers"));
        assert!(!cfg.wants(LogLevel::Info, "server"));
        assert!(!cfg.wants(LogLevel::Error, "userinput"));

        let cfg = block("stdout", "", "debug", "server").resolve().unwrap();
        assert!(cfg.wants(LogLevel::Debug, "server"));
        assert!(!cfg.wants(LogLevel::Error, "accounts"));
    }

    #[test]
    fn levels_map_onto_tracing() {
        assert_eq!(tracing::Level::from(LogLevel::Debug), tracing::Level::DEBUG);
        assert_eq!(tracing::Level::from(LogLevel::Warning), tracing::Level::WARN);
    }
}
