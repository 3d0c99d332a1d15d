//! Configuration error types

use std::fmt;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ConfigError>;

/// Errors produced while loading a configuration document.
///
/// Every variant except [`ConfigError::MalformedDocument`] and
/// [`ConfigError::Io`] names the dotted path of the offending field, e.g.
/// `sources.ZeroMQSource.s1.endpoint`.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("{path}: missing required field")]
    MissingField { path: String },

    #[error("{path}: expected {expected}, found {found}")]
    TypeMismatch {
        path: String,
        expected: &'static str,
        found: String,
    },

    #[error("{path}: duplicate instance name '{name}'")]
    DuplicateInstanceName { path: String, name: String },

    #[error("{path}: appender '{appender}' is not defined under log4j.appender")]
    DanglingAppenderReference { path: String, appender: String },

    #[error("Malformed document at line {line}, column {column}: {message}")]
    MalformedDocument {
        line: usize,
        column: usize,
        message: String,
    },

    #[error("{path}: unknown field")]
    UnknownField { path: String },

    #[error("{path}: key is defined more than once")]
    DuplicateKey { path: String },

    #[error("{path}: {reason}")]
    InvalidValue { path: String, reason: String },

    #[error("Failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl ConfigError {
    /// Dotted path of the field the error refers to, when there is one.
    pub fn path(&self) -> Option<&str> {
        match self {
            ConfigError::MissingField { path }
            | ConfigError::TypeMismatch { path, .. }
            | ConfigError::DuplicateInstanceName { path, .. }
            | ConfigError::DanglingAppenderReference { path, .. }
            | ConfigError::UnknownField { path }
            | ConfigError::DuplicateKey { path }
            | ConfigError::InvalidValue { path, .. } => Some(path),
            ConfigError::MalformedDocument { .. } | ConfigError::Io { .. } => None,
        }
    }

    pub(crate) fn missing(path: &ConfigPath) -> Self {
        ConfigError::MissingField {
            path: path.to_string(),
        }
    }

    pub(crate) fn type_mismatch(
        path: &ConfigPath,
        expected: &'static str,
        found: impl Into<String>,
    ) -> Self {
        ConfigError::TypeMismatch {
            path: path.to_string(),
            expected,
            found: found.into(),
        }
    }

    pub(crate) fn invalid(path: &ConfigPath, reason: impl Into<String>) -> Self {
        ConfigError::InvalidValue {
            path: path.to_string(),
            reason: reason.into(),
        }
    }

    pub(crate) fn unknown(path: &ConfigPath) -> Self {
        ConfigError::UnknownField {
            path: path.to_string(),
        }
    }

    pub(crate) fn duplicate_key(path: &ConfigPath) -> Self {
        ConfigError::DuplicateKey {
            path: path.to_string(),
        }
    }

    /// Build a syntax error from a byte offset into `source`.
    pub(crate) fn malformed(source: &str, offset: usize, message: impl Into<String>) -> Self {
        let (line, column) = line_column(source, offset);
        ConfigError::MalformedDocument {
            line,
            column,
            message: message.into(),
        }
    }
}

/// Dotted location of a value inside the document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigPath {
    segments: Vec<String>,
}

impl ConfigPath {
    pub fn root() -> Self {
        Self::default()
    }

    pub fn child(&self, segment: impl Into<String>) -> Self {
        let mut segments = self.segments.clone();
        segments.push(segment.into());
        Self { segments }
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }
}

impl fmt::Display for ConfigPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.segments.is_empty() {
            return write!(f, "<root>");
        }
        write!(f, "{}", self.segments.join("."))
    }
}

/// 1-based line and column (in characters) of a byte offset.
pub(crate) fn line_column(source: &str, offset: usize) -> (usize, usize) {
    let mut end = offset.min(source.len());
    while !source.is_char_boundary(end) {
        end -= 1;
    }
    let before = &source[..end];
    let line = before.matches('\n').count() + 1;
    let column = before
        .rsplit('\n')
        .next()
        .map_or(0, |tail| tail.chars().count())
        + 1;
    (line, column)
}
