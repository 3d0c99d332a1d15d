//! Schema-on-read decoding of a [`Document`] into a typed [`Config`].
//!
//! Decoding is fail-fast: the first problem found is returned and no partial
//! configuration escapes.

use crate::document::{format_number, Document, Entry, Node, Value};
use crate::error::{ConfigError, ConfigPath, Result};
use crate::loader::{KeyMatching, LoadOptions};
use crate::schema::{
    AppenderConfig, Config, ConnectionString, Instances, LayoutConfig, Level, LoggingConfig,
    RootLogger, SinkInstance, SourceInstance, Timeout, DEFAULT_CONCURRENCY_LEVEL,
};
use std::collections::{BTreeMap, BTreeSet};

pub(crate) mod keys {
    pub const SOURCES: &str = "sources";
    pub const SINKS: &str = "sinks";
    pub const LOG4J: &str = "log4j";

    pub const ENDPOINT: &str = "endpoint";
    pub const CONCURRENCY_LEVEL: &str = "concurrencyLevel";
    pub const CONNECTION_STRING: &str = "connectionString";
    pub const TIMEOUT: &str = "timeout";

    pub const APPENDER: &str = "appender";
    pub const ROOT_LOGGER: &str = "rootLogger";
    pub const CLASS: &str = "__";
    pub const TARGET: &str = "target";
    pub const LAYOUT: &str = "layout";
    pub const FILE: &str = "File";
    pub const MAX_FILE_SIZE: &str = "MaxFileSize";
    pub const MAX_BACKUP_INDEX: &str = "MaxBackupIndex";
    pub const THRESHOLD: &str = "Threshold";
    pub const CONVERSION_PATTERN: &str = "ConversionPattern";
}

const ROOT_FIELDS: &[&str] = &[keys::SOURCES, keys::SINKS, keys::LOG4J];
const SOURCE_FIELDS: &[&str] = &[keys::ENDPOINT, keys::CONCURRENCY_LEVEL];
const SINK_FIELDS: &[&str] = &[keys::CONNECTION_STRING, keys::TIMEOUT];
const LOG4J_FIELDS: &[&str] = &[keys::APPENDER, keys::ROOT_LOGGER];
const APPENDER_FIELDS: &[&str] = &[
    keys::CLASS,
    keys::TARGET,
    keys::LAYOUT,
    keys::FILE,
    keys::MAX_FILE_SIZE,
    keys::MAX_BACKUP_INDEX,
    keys::THRESHOLD,
];
const LAYOUT_FIELDS: &[&str] = &[keys::CLASS, keys::CONVERSION_PATTERN];

pub(crate) fn decode(document: &Document, options: &LoadOptions) -> Result<Config> {
    Decoder {
        matching: options.key_matching,
    }
    .config(&document.root)
}

struct Decoder {
    matching: KeyMatching,
}

/// Fields of one object, resolved against a fixed set of known names.
struct Fields<'a> {
    path: ConfigPath,
    resolved: Vec<(&'static str, &'a Entry)>,
}

impl<'a> Fields<'a> {
    fn get(&self, name: &str) -> Option<(&'a Node, ConfigPath)> {
        self.resolved
            .iter()
            .find(|(canonical, _)| *canonical == name)
            .map(|(_, entry)| (&entry.value, self.path.child(entry.key.as_str())))
    }

    fn required(&self, name: &str) -> Result<(&'a Node, ConfigPath)> {
        self.get(name)
            .ok_or_else(|| ConfigError::missing(&self.path.child(name)))
    }
}

impl Decoder {
    fn fields<'a>(
        &self,
        node: &'a Node,
        path: &ConfigPath,
        known: &[&'static str],
    ) -> Result<Fields<'a>> {
        let entries = expect_object(node, path)?;
        let mut resolved: Vec<(&'static str, &'a Entry)> = Vec::with_capacity(entries.len());

        for entry in entries {
            let entry_path = path.child(entry.key.as_str());
            let canonical = known
                .iter()
                .copied()
                .find(|name| self.matching.matches(name, &entry.key))
                .ok_or_else(|| ConfigError::unknown(&entry_path))?;
            if resolved.iter().any(|(seen, _)| *seen == canonical) {
                return Err(ConfigError::duplicate_key(&entry_path));
            }
            resolved.push((canonical, entry));
        }

        Ok(Fields {
            path: path.clone(),
            resolved,
        })
    }

    fn config(&self, root: &Node) -> Result<Config> {
        let root_path = ConfigPath::root();
        let fields = self.fields(root, &root_path, ROOT_FIELDS)?;

        let sources = match fields.get(keys::SOURCES) {
            Some((node, path)) => self.grouped(node, &path, |kind, name, node, path| {
                self.source(kind, name, node, path)
            })?,
            None => BTreeMap::new(),
        };

        let sinks = match fields.get(keys::SINKS) {
            Some((node, path)) => self.grouped(node, &path, |kind, name, node, path| {
                self.sink(kind, name, node, path)
            })?,
            None => BTreeMap::new(),
        };

        let logging = match fields.get(keys::LOG4J) {
            Some((node, path)) => Some(self.logging(node, &path)?),
            None => None,
        };

        Ok(Config {
            sources,
            sinks,
            logging,
        })
    }

    /// Decode `kind → name → instance` maps shared by sources and sinks.
    fn grouped<T>(
        &self,
        node: &Node,
        path: &ConfigPath,
        decode_instance: impl Fn(&str, &str, &Node, &ConfigPath) -> Result<T>,
    ) -> Result<BTreeMap<String, Instances<T>>> {
        let mut groups = BTreeMap::new();

        for kind_entry in expect_object(node, path)? {
            let kind_path = path.child(kind_entry.key.as_str());
            require_name(&kind_entry.key, &kind_path, "type name")?;
            if groups.contains_key(&kind_entry.key) {
                return Err(ConfigError::duplicate_key(&kind_path));
            }

            let mut instances = Instances::new();
            for instance_entry in expect_object(&kind_entry.value, &kind_path)? {
                let name = instance_entry.key.as_str();
                let instance_path = kind_path.child(name);
                require_name(name, &instance_path, "instance name")?;
                if instances.contains_key(name) {
                    return Err(ConfigError::DuplicateInstanceName {
                        path: instance_path.to_string(),
                        name: name.to_string(),
                    });
                }
                let instance = decode_instance(
                    &kind_entry.key,
                    name,
                    &instance_entry.value,
                    &instance_path,
                )?;
                instances.insert(name.to_string(), instance);
            }

            groups.insert(kind_entry.key.clone(), instances);
        }

        Ok(groups)
    }

    fn source(&self, kind: &str, name: &str, node: &Node, path: &ConfigPath) -> Result<SourceInstance> {
        let fields = self.fields(node, path, SOURCE_FIELDS)?;

        let (endpoint, endpoint_path) = fields.required(keys::ENDPOINT)?;
        let endpoint = expect_non_empty_string(endpoint, &endpoint_path)?;

        let concurrency_level = match fields.get(keys::CONCURRENCY_LEVEL) {
            Some((node, path)) => {
                let level = expect_integer(node, &path, 1, u64::from(u32::MAX))?;
                u32::try_from(level)
                    .map_err(|_| ConfigError::invalid(&path, "concurrency level out of range"))?
            }
            None => DEFAULT_CONCURRENCY_LEVEL,
        };

        Ok(SourceInstance {
            kind: kind.to_string(),
            name: name.to_string(),
            endpoint: endpoint.to_string(),
            concurrency_level,
        })
    }

    fn sink(&self, kind: &str, name: &str, node: &Node, path: &ConfigPath) -> Result<SinkInstance> {
        let fields = self.fields(node, path, SINK_FIELDS)?;

        let (connection, connection_path) = fields.required(keys::CONNECTION_STRING)?;
        let connection = expect_non_empty_string(connection, &connection_path)?;

        let timeout = match fields.get(keys::TIMEOUT) {
            Some((node, path)) => {
                let millis = match &node.value {
                    Value::Number(n) => *n,
                    other => {
                        return Err(ConfigError::type_mismatch(
                            &path,
                            "number of milliseconds or Infinity",
                            other.type_name(),
                        ))
                    }
                };
                Timeout::from_millis_f64(millis).ok_or_else(|| {
                    ConfigError::invalid(
                        &path,
                        format!(
                            "timeout must be a non-negative number of milliseconds (at most 2^64 microseconds) or Infinity, got {}",
                            format_number(millis)
                        ),
                    )
                })?
            }
            None => Timeout::Unbounded,
        };

        Ok(SinkInstance {
            kind: kind.to_string(),
            name: name.to_string(),
            connection_string: ConnectionString::new(connection),
            timeout,
        })
    }

    fn logging(&self, node: &Node, path: &ConfigPath) -> Result<LoggingConfig> {
        let fields = self.fields(node, path, LOG4J_FIELDS)?;

        let mut appenders = BTreeMap::new();
        if let Some((node, appenders_path)) = fields.get(keys::APPENDER) {
            for entry in expect_object(node, &appenders_path)? {
                let appender_path = appenders_path.child(entry.key.as_str());
                require_name(&entry.key, &appender_path, "appender name")?;
                if appenders.contains_key(&entry.key) {
                    return Err(ConfigError::duplicate_key(&appender_path));
                }
                let appender = self.appender(&entry.value, &appender_path)?;
                appenders.insert(entry.key.clone(), appender);
            }
        }

        let (root_node, root_path) = fields.required(keys::ROOT_LOGGER)?;
        let root_logger = parse_root_logger(expect_string(root_node, &root_path)?, &root_path)?;

        for appender in &root_logger.appender_refs {
            if !appenders.contains_key(appender) {
                return Err(ConfigError::DanglingAppenderReference {
                    path: root_path.to_string(),
                    appender: appender.clone(),
                });
            }
        }

        Ok(LoggingConfig {
            appenders,
            root_logger,
        })
    }

    fn appender(&self, node: &Node, path: &ConfigPath) -> Result<AppenderConfig> {
        let fields = self.fields(node, path, APPENDER_FIELDS)?;

        let (class, class_path) = fields.required(keys::CLASS)?;
        let mut appender = AppenderConfig::new(expect_non_empty_string(class, &class_path)?);

        if let Some((node, path)) = fields.get(keys::TARGET) {
            appender.target = Some(expect_string(node, &path)?.to_string());
        }
        if let Some((node, path)) = fields.get(keys::LAYOUT) {
            appender.layout = Some(self.layout(node, &path)?);
        }
        if let Some((node, path)) = fields.get(keys::FILE) {
            appender.file = Some(expect_non_empty_string(node, &path)?.to_string());
        }
        if let Some((node, path)) = fields.get(keys::MAX_FILE_SIZE) {
            appender.max_file_size = Some(expect_byte_size(node, &path)?);
        }
        if let Some((node, path)) = fields.get(keys::MAX_BACKUP_INDEX) {
            let index = expect_integer(node, &path, 0, u64::from(u32::MAX))?;
            appender.max_backup_index = Some(
                u32::try_from(index)
                    .map_err(|_| ConfigError::invalid(&path, "backup index out of range"))?,
            );
        }
        if let Some((node, path)) = fields.get(keys::THRESHOLD) {
            appender.threshold = Some(expect_level(node, &path)?);
        }

        Ok(appender)
    }

    fn layout(&self, node: &Node, path: &ConfigPath) -> Result<LayoutConfig> {
        let fields = self.fields(node, path, LAYOUT_FIELDS)?;

        let (class, class_path) = fields.required(keys::CLASS)?;
        let class_name = expect_non_empty_string(class, &class_path)?.to_string();

        let pattern = match fields.get(keys::CONVERSION_PATTERN) {
            Some((node, path)) => Some(expect_string(node, &path)?.to_string()),
            None => None,
        };

        Ok(LayoutConfig {
            class_name,
            pattern,
        })
    }
}

/// Parse a log4j root logger directive such as `DEBUG,console,file`.
fn parse_root_logger(raw: &str, path: &ConfigPath) -> Result<RootLogger> {
    let mut parts = raw.split(',').map(str::trim);

    let level_text = parts.next().unwrap_or_default();
    if level_text.is_empty() {
        return Err(ConfigError::invalid(path, "root logger level is empty"));
    }
    let level = Level::parse(level_text).ok_or_else(|| {
        ConfigError::invalid(
            path,
            format!(
                "unknown level '{}' (expected DEBUG, INFO, WARN or ERROR)",
                level_text
            ),
        )
    })?;

    let mut seen = BTreeSet::new();
    let mut appender_refs = Vec::new();
    for appender in parts {
        if appender.is_empty() {
            return Err(ConfigError::invalid(path, "empty appender name in root logger"));
        }
        if !seen.insert(appender) {
            return Err(ConfigError::invalid(
                path,
                format!("appender '{}' is listed more than once", appender),
            ));
        }
        appender_refs.push(appender.to_string());
    }

    Ok(RootLogger {
        level,
        appender_refs,
    })
}

fn require_name(name: &str, path: &ConfigPath, what: &str) -> Result<()> {
    if name.trim().is_empty() {
        return Err(ConfigError::invalid(path, format!("{} must not be empty", what)));
    }
    Ok(())
}

fn expect_object<'a>(node: &'a Node, path: &ConfigPath) -> Result<&'a [Entry]> {
    node.value
        .as_object()
        .ok_or_else(|| ConfigError::type_mismatch(path, "object", node.value.type_name()))
}

fn expect_string<'a>(node: &'a Node, path: &ConfigPath) -> Result<&'a str> {
    match &node.value {
        Value::String(s) => Ok(s),
        other => Err(ConfigError::type_mismatch(path, "string", other.type_name())),
    }
}

fn expect_non_empty_string<'a>(node: &'a Node, path: &ConfigPath) -> Result<&'a str> {
    let value = expect_string(node, path)?;
    if value.trim().is_empty() {
        return Err(ConfigError::invalid(path, "value must not be empty"));
    }
    Ok(value)
}

fn expect_integer(node: &Node, path: &ConfigPath, min: u64, max: u64) -> Result<u64> {
    let n = match &node.value {
        Value::Number(n) => *n,
        other => return Err(ConfigError::type_mismatch(path, "integer", other.type_name())),
    };
    if !n.is_finite() || n.fract() != 0.0 || n < min as f64 || n > max as f64 {
        return Err(ConfigError::invalid(
            path,
            format!(
                "expected an integer between {} and {}, got {}",
                min,
                max,
                format_number(n)
            ),
        ));
    }
    Ok(n as u64)
}

fn expect_level(node: &Node, path: &ConfigPath) -> Result<Level> {
    let raw = expect_string(node, path)?;
    Level::parse(raw).ok_or_else(|| {
        ConfigError::invalid(
            path,
            format!("unknown level '{}' (expected DEBUG, INFO, WARN or ERROR)", raw),
        )
    })
}

/// Byte sizes are either a plain number of bytes or a string like `10MB`.
fn expect_byte_size(node: &Node, path: &ConfigPath) -> Result<u64> {
    match &node.value {
        Value::Number(_) => expect_integer(node, path, 1, u64::MAX),
        Value::String(raw) => parse_byte_size(raw).ok_or_else(|| {
            ConfigError::invalid(
                path,
                format!("invalid size '{}' (use e.g. 1024, 512KB, 10MB, 1GB)", raw),
            )
        }),
        other => Err(ConfigError::type_mismatch(path, "size", other.type_name())),
    }
}

/// Parse a log4j-style size: `100`, `512KB`, `10MB`, `1GB` (units are powers of 1024).
pub(crate) fn parse_byte_size(raw: &str) -> Option<u64> {
    let upper = raw.trim().to_ascii_uppercase();
    let split = upper
        .char_indices()
        .find(|(_, c)| c.is_ascii_alphabetic())
        .map_or(upper.len(), |(i, _)| i);
    let (number, unit) = upper.split_at(split);

    let count: u64 = number.trim().parse().ok()?;
    let multiplier: u64 = match unit.trim() {
        "" | "B" => 1,
        "KB" => 1024,
        "MB" => 1024 * 1024,
        "GB" => 1024 * 1024 * 1024,
        _ => return None,
    };
    let bytes = count.checked_mul(multiplier)?;
    (bytes > 0).then_some(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_root_logger() {
        let path = ConfigPath::root().child("log4j").child("rootLogger");
        let root = parse_root_logger("DEBUG,console", &path).unwrap();
        assert_eq!(root.level, Level::Debug);
        assert_eq!(root.appender_refs, vec!["console".to_string()]);

        let root = parse_root_logger(" info , a ,b", &path).unwrap();
        assert_eq!(root.level, Level::Info);
        assert_eq!(root.appender_refs, vec!["a".to_string(), "b".to_string()]);

        let root = parse_root_logger("WARN", &path).unwrap();
        assert!(root.appender_refs.is_empty());
    }

    #[test]
    fn test_parse_root_logger_rejects_bad_input() {
        let path = ConfigPath::root().child("log4j").child("rootLogger");
        for raw in ["", ",console", "VERBOSE,console", "DEBUG,,console", "DEBUG,a,a"] {
            let err = parse_root_logger(raw, &path).unwrap_err();
            assert!(
                matches!(err, ConfigError::InvalidValue { .. }),
                "{raw:?} gave {err:?}"
            );
        }
    }

    #[test]
    fn test_parse_byte_size() {
        assert_eq!(parse_byte_size("100"), Some(100));
        assert_eq!(parse_byte_size("512KB"), Some(512 * 1024));
        assert_eq!(parse_byte_size("10mb"), Some(10 * 1024 * 1024));
        assert_eq!(parse_byte_size("1 GB"), Some(1024 * 1024 * 1024));
        assert_eq!(parse_byte_size("0"), None);
        assert_eq!(parse_byte_size("1.5MB"), None);
        assert_eq!(parse_byte_size("10XB"), None);
    }
}
