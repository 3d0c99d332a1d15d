//! Typed configuration model.
//!
//! These types are produced by the loader and never mutated afterwards; share
//! them by reference (`&Config` or `Arc<Config>`).

use serde::{Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;

/// Instances of one kind, keyed by instance name.
pub type Instances<T> = BTreeMap<String, T>;

/// Default `concurrencyLevel` when a source instance omits it.
pub const DEFAULT_CONCURRENCY_LEVEL: u32 = 1;

/// Root of a loaded configuration document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Config {
    /// Source kind (e.g. `ZeroMQSource`) → instance name → instance.
    pub sources: BTreeMap<String, Instances<SourceInstance>>,
    /// Sink kind (e.g. `SqlSink`) → instance name → instance.
    pub sinks: BTreeMap<String, Instances<SinkInstance>>,
    /// The `log4j` section, when present.
    #[serde(rename = "log4j")]
    pub logging: Option<LoggingConfig>,
}

impl Config {
    /// All source instances, ordered by kind then name.
    pub fn source_instances(&self) -> impl Iterator<Item = &SourceInstance> {
        self.sources.values().flat_map(|instances| instances.values())
    }

    /// All sink instances, ordered by kind then name.
    pub fn sink_instances(&self) -> impl Iterator<Item = &SinkInstance> {
        self.sinks.values().flat_map(|instances| instances.values())
    }

    pub fn source(&self, kind: &str, name: &str) -> Option<&SourceInstance> {
        self.sources.get(kind)?.get(name)
    }

    pub fn sink(&self, kind: &str, name: &str) -> Option<&SinkInstance> {
        self.sinks.get(kind)?.get(name)
    }

    pub fn source_count(&self) -> usize {
        self.sources.values().map(BTreeMap::len).sum()
    }

    pub fn sink_count(&self) -> usize {
        self.sinks.values().map(BTreeMap::len).sum()
    }
}

/// A named source the pipeline reads records from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceInstance {
    pub kind: String,
    pub name: String,
    /// Connection URI, e.g. `tcp://eu.host:1234`.
    pub endpoint: String,
    /// Number of concurrent consumers, always >= 1.
    pub concurrency_level: u32,
}

/// A named sink the pipeline writes records to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SinkInstance {
    pub kind: String,
    pub name: String,
    pub connection_string: ConnectionString,
    pub timeout: Timeout,
}

/// Keys whose values are hidden by [`ConnectionString::redacted`].
const SECRET_KEYS: &[&str] = &["pwd", "password"];

/// Credential-bearing connection string.
///
/// `Debug`, `Display` and `Serialize` never show password values; call
/// [`ConnectionString::expose`] to get the raw text.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct ConnectionString(String);

impl ConnectionString {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }

    pub fn redacted(&self) -> String {
        Self::redact(&self.0)
    }

    /// Mask the values of `Pwd=`/`Password=` segments in a `Key=Value;` string.
    pub fn redact(raw: &str) -> String {
        raw.split(';')
            .map(|segment| match segment.split_once('=') {
                Some((key, _)) if is_secret_key(key) => format!("{}=***", key),
                _ => segment.to_string(),
            })
            .collect::<Vec<_>>()
            .join(";")
    }

    /// `Key=Value` pairs in document order, keys and values trimmed.
    pub fn pairs(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.split(';').filter_map(|segment| {
            let (key, value) = segment.split_once('=')?;
            let key = key.trim();
            if key.is_empty() {
                return None;
            }
            Some((key, value.trim()))
        })
    }

    /// Value of the first pair whose key matches case-insensitively.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.pairs()
            .find(|(k, _)| k.eq_ignore_ascii_case(key))
            .map(|(_, v)| v)
    }
}

fn is_secret_key(key: &str) -> bool {
    let key = key.trim();
    SECRET_KEYS.iter().any(|secret| key.eq_ignore_ascii_case(secret))
}

impl fmt::Debug for ConnectionString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ConnectionString")
            .field(&self.redacted())
            .finish()
    }
}

impl fmt::Display for ConnectionString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.redacted())
    }
}

impl Serialize for ConnectionString {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.redacted())
    }
}

/// Sink timeout: a finite duration or explicitly unbounded.
///
/// Document values are milliseconds; the literal `Infinity` means unbounded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Timeout {
    Finite(Duration),
    #[default]
    Unbounded,
}

impl Timeout {
    pub fn is_unbounded(&self) -> bool {
        matches!(self, Timeout::Unbounded)
    }

    pub fn as_duration(&self) -> Option<Duration> {
        match self {
            Timeout::Finite(duration) => Some(*duration),
            Timeout::Unbounded => None,
        }
    }

    /// Convert a non-negative millisecond count (possibly infinite).
    ///
    /// Returns `None` for negative or NaN input, and for finite values too
    /// large to hold as a microsecond count.
    pub fn from_millis_f64(millis: f64) -> Option<Self> {
        if millis.is_nan() || millis < 0.0 {
            return None;
        }
        if millis.is_infinite() {
            return Some(Timeout::Unbounded);
        }
        // Sub-microsecond precision is dropped.
        let micros = (millis * 1000.0).round();
        if micros >= u64::MAX as f64 {
            return None;
        }
        Some(Timeout::Finite(Duration::from_micros(micros as u64)))
    }

    /// Milliseconds as written back to a document (`Infinity` when unbounded).
    pub fn as_millis_f64(&self) -> f64 {
        match self {
            Timeout::Finite(duration) => duration.as_micros() as f64 / 1000.0,
            Timeout::Unbounded => f64::INFINITY,
        }
    }
}

impl fmt::Display for Timeout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Timeout::Finite(duration) => write!(f, "{}ms", duration.as_micros() as f64 / 1000.0),
            Timeout::Unbounded => write!(f, "unbounded"),
        }
    }
}

impl Serialize for Timeout {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Timeout::Finite(_) => serializer.serialize_f64(self.as_millis_f64()),
            Timeout::Unbounded => serializer.serialize_str("unbounded"),
        }
    }
}

/// Severity threshold of the root logger and appenders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Level {
    Debug,
    Info,
    Warn,
    Error,
}

impl Level {
    pub const ALL: [Level; 4] = [Level::Debug, Level::Info, Level::Warn, Level::Error];

    /// Case-insensitive parse of `DEBUG`, `INFO`, `WARN` or `ERROR`.
    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        Self::ALL
            .into_iter()
            .find(|level| level.as_str().eq_ignore_ascii_case(raw))
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Level::Debug => "DEBUG",
            Level::Info => "INFO",
            Level::Warn => "WARN",
            Level::Error => "ERROR",
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The `log4j` section: appenders plus the root logger directive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoggingConfig {
    pub appenders: BTreeMap<String, AppenderConfig>,
    pub root_logger: RootLogger,
}

impl LoggingConfig {
    /// Appenders referenced by the root logger, in reference order.
    pub fn root_appenders(&self) -> impl Iterator<Item = (&str, &AppenderConfig)> {
        self.root_logger
            .appender_refs
            .iter()
            .filter_map(|name| Some((name.as_str(), self.appenders.get(name)?)))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AppenderConfig {
    /// Appender class, written as `__` in the document.
    pub class_name: String,
    /// Output stream for console appenders (`System.out` / `System.err`).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub layout: Option<LayoutConfig>,
    /// Log file for file-based appenders.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
    /// Rotation size in bytes for rolling appenders.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_file_size: Option<u64>,
    /// Number of rotated files kept by rolling appenders.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_backup_index: Option<u32>,
    /// Minimum level this appender accepts, on top of the root level.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub threshold: Option<Level>,
}

impl AppenderConfig {
    pub fn new(class_name: impl Into<String>) -> Self {
        Self {
            class_name: class_name.into(),
            target: None,
            layout: None,
            file: None,
            max_file_size: None,
            max_backup_index: None,
            threshold: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutConfig {
    /// Layout class, written as `__` in the document.
    pub class_name: String,
    /// `ConversionPattern` for pattern layouts.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RootLogger {
    pub level: Level,
    pub appender_refs: Vec<String>,
}

impl fmt::Display for RootLogger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.level)?;
        for appender in &self.appender_refs {
            write!(f, ",{}", appender)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connection_string_redaction() {
        let cs = ConnectionString::new(
            "Server=myWarehouseServerAddress;Database=myDataBase;Uid=myUsername;Pwd=myPassword;",
        );
        assert_eq!(
            cs.redacted(),
            "Server=myWarehouseServerAddress;Database=myDataBase;Uid=myUsername;Pwd=***;"
        );
        assert!(!format!("{:?}", cs).contains("myPassword"));
        assert!(!cs.to_string().contains("myPassword"));
        assert!(cs.expose().contains("myPassword"));
        assert_eq!(
            ConnectionString::redact("host=x; Password = hunter2"),
            "host=x; Password =***"
        );
    }

    #[test]
    fn test_connection_string_pairs() {
        let cs = ConnectionString::new("Server=a; Database = b ;;Uid=c;");
        let pairs: Vec<_> = cs.pairs().collect();
        assert_eq!(pairs, vec![("Server", "a"), ("Database", "b"), ("Uid", "c")]);
        assert_eq!(cs.get("database"), Some("b"));
        assert_eq!(cs.get("pwd"), None);
    }

    #[test]
    fn test_timeout_conversion() {
        assert_eq!(Timeout::from_millis_f64(f64::INFINITY), Some(Timeout::Unbounded));
        assert_eq!(
            Timeout::from_millis_f64(1500.0),
            Some(Timeout::Finite(Duration::from_millis(1500)))
        );
        assert_eq!(
            Timeout::from_millis_f64(0.25),
            Some(Timeout::Finite(Duration::from_micros(250)))
        );
        assert_eq!(Timeout::from_millis_f64(-1.0), None);
        assert_eq!(Timeout::from_millis_f64(f64::NEG_INFINITY), None);
        assert_eq!(Timeout::from_millis_f64(1e300), None);
        assert_eq!(Timeout::from_millis_f64(u64::MAX as f64 / 1000.0), None);
        assert_eq!(Timeout::Finite(Duration::from_micros(250)).as_millis_f64(), 0.25);
        assert!(Timeout::default().is_unbounded());
    }

    #[test]
    fn test_level_parse() {
        assert_eq!(Level::parse("DEBUG"), Some(Level::Debug));
        assert_eq!(Level::parse(" warn "), Some(Level::Warn));
        assert_eq!(Level::parse("TRACE"), None);
        assert!(Level::Debug < Level::Error);
    }

    #[test]
    fn test_serialized_view_hides_credentials() {
        let sink = SinkInstance {
            kind: "SqlSink".into(),
            name: "warehouse".into(),
            connection_string: ConnectionString::new("Server=s;Pwd=secret"),
            timeout: Timeout::Unbounded,
        };
        let json = serde_json::to_value(&sink).unwrap();
        assert_eq!(json["connectionString"], "Server=s;Pwd=***");
        assert_eq!(json["timeout"], "unbounded");
    }
}
