//! Flat `key=value` view of a document.
//!
//! Nested objects are joined with `.`, arrays expand to `key.0`, `key.1`, ...
//! and a `__` entry names its parent key, so
//! `appender: { console: { __: 'ConsoleAppender' } }` becomes
//! `appender.console=ConsoleAppender`. Later duplicates overwrite earlier ones.

use crate::document::{format_number, Document, Entry, Value};
use crate::error::{ConfigError, Result};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

const CLASS_KEY: &str = "__";

/// Dotted-key string properties, optionally scoped to a named section.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Properties {
    name: Option<String>,
    values: BTreeMap<String, String>,
}

impl Properties {
    pub fn from_document(document: &Document) -> Self {
        let mut values = BTreeMap::new();
        if let Value::Object(entries) = &document.root.value {
            flatten_object(entries, "", &mut values);
        }
        Self { name: None, values }
    }

    /// Build directly from key/value pairs.
    pub fn from_pairs<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            name: None,
            values: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    /// Keys under `name.` with the prefix stripped. Unknown sections are empty.
    pub fn section(&self, name: &str) -> Properties {
        let prefix = format!("{}.", name);
        let values = self
            .values
            .range(prefix.clone()..)
            .take_while(|(key, _)| key.starts_with(&prefix))
            .map(|(key, value)| (key[prefix.len()..].to_string(), value.clone()))
            .collect();
        Properties {
            name: Some(name.to_string()),
            values,
        }
    }

    /// Name this view was sectioned by, `None` for the document root.
    pub fn section_name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Consecutive `key.0`, `key.1`, ... values; stops at the first gap.
    pub fn get_array(&self, key: &str) -> Vec<&str> {
        (0..)
            .map_while(|i| self.get(&format!("{}.{}", key, i)))
            .collect()
    }

    pub fn get_i32(&self, key: &str, default: i32) -> Result<i32> {
        self.parsed(key, default, "32-bit integer")
    }

    pub fn get_i64(&self, key: &str, default: i64) -> Result<i64> {
        self.parsed(key, default, "64-bit integer")
    }

    pub fn get_f64(&self, key: &str, default: f64) -> Result<f64> {
        match self.get(key) {
            None => Ok(default),
            Some("Infinity") => Ok(f64::INFINITY),
            Some("-Infinity") => Ok(f64::NEG_INFINITY),
            Some(_) => self.parsed(key, default, "number"),
        }
    }

    fn parsed<T: FromStr>(&self, key: &str, default: T, expected: &'static str) -> Result<T> {
        match self.get(key) {
            None => Ok(default),
            Some(raw) => raw.trim().parse().map_err(|_| ConfigError::TypeMismatch {
                path: self.qualified(key),
                expected,
                found: format!("'{}'", raw),
            }),
        }
    }

    fn qualified(&self, key: &str) -> String {
        match &self.name {
            Some(name) => format!("{}.{}", name, key),
            None => key.to_string(),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl fmt::Display for Properties {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (key, value) in &self.values {
            writeln!(f, "{}={}", key, value)?;
        }
        Ok(())
    }
}

fn flatten_object(entries: &[Entry], prefix: &str, out: &mut BTreeMap<String, String>) {
    for entry in entries {
        let key = if entry.key == CLASS_KEY && !prefix.is_empty() {
            prefix.to_string()
        } else {
            join(prefix, &entry.key)
        };
        flatten_value(&entry.value.value, key, out);
    }
}

fn flatten_value(value: &Value, key: String, out: &mut BTreeMap<String, String>) {
    match value {
        Value::Object(entries) => flatten_object(entries, &key, out),
        Value::Array(items) => {
            for (i, item) in items.iter().enumerate() {
                flatten_value(&item.value, join(&key, &i.to_string()), out);
            }
        }
        scalar => {
            out.insert(key, scalar_text(scalar));
        }
    }
}

fn scalar_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => format_number(*n),
        Value::Bool(b) => b.to_string(),
        Value::Null => "null".to_string(),
        Value::Object(_) | Value::Array(_) => String::new(),
    }
}

fn join(prefix: &str, key: &str) -> String {
    if prefix.is_empty() {
        key.to_string()
    } else {
        format!("{}.{}", prefix, key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::parse_document;

    fn props(text: &str) -> Properties {
        Properties::from_document(&parse_document(text).unwrap())
    }

    #[test]
    fn test_flatten_nested_and_class_keys() {
        let p = props(
            "config({ log4j: { appender: { console: { __: 'Console', layout: { __: 'Pattern', ConversionPattern: '%m' } } }, rootLogger: 'DEBUG,console' } });",
        );
        assert_eq!(p.get("log4j.appender.console"), Some("Console"));
        assert_eq!(p.get("log4j.appender.console.layout"), Some("Pattern"));
        assert_eq!(
            p.get("log4j.appender.console.layout.ConversionPattern"),
            Some("%m")
        );
        assert_eq!(p.get("log4j.rootLogger"), Some("DEBUG,console"));
        assert_eq!(p.len(), 4);
    }

    #[test]
    fn test_scalars_render_like_javascript() {
        let p = props("{ a: 2, b: Infinity, c: true, d: null, e: 0.5, f: -0 }");
        assert_eq!(p.get("a"), Some("2"));
        assert_eq!(p.get("b"), Some("Infinity"));
        assert_eq!(p.get("c"), Some("true"));
        assert_eq!(p.get("d"), Some("null"));
        assert_eq!(p.get("e"), Some("0.5"));
        assert_eq!(p.get("f"), Some("0"));

        let p = props("{ big: 1e21, tiny: 1.5e-7, plain: 1e20 }");
        assert_eq!(p.get("big"), Some("1e+21"));
        assert_eq!(p.get("tiny"), Some("1.5e-7"));
        assert_eq!(p.get("plain"), Some("100000000000000000000"));
        assert_eq!(p.get_f64("big", 0.0).unwrap(), 1e21);
    }

    #[test]
    fn test_arrays() {
        let p = props("{ hosts: ['a', 'b', 'c'], nested: [{ x: 1 }] }");
        assert_eq!(p.get_array("hosts"), vec!["a", "b", "c"]);
        assert_eq!(p.get("nested.0.x"), Some("1"));
        assert!(p.get_array("missing").is_empty());
    }

    #[test]
    fn test_section() {
        let p = props("{ sources: { Z: { s1: { endpoint: 'tcp://h:1' } } }, sinks: {} }");
        let sources = p.section("sources");
        assert_eq!(sources.section_name(), Some("sources"));
        assert_eq!(sources.get("Z.s1.endpoint"), Some("tcp://h:1"));
        assert!(p.section_name().is_none());

        let empty = p.section("nothing");
        assert!(empty.is_empty());
        assert_eq!(empty.section_name(), Some("nothing"));
    }

    #[test]
    fn test_section_does_not_match_prefix_of_longer_key() {
        let p = Properties::from_pairs([("source.a", "1"), ("sources.b", "2")]);
        let section = p.section("source");
        assert_eq!(section.len(), 1);
        assert_eq!(section.get("a"), Some("1"));
    }

    #[test]
    fn test_numeric_getters() {
        let p = props("{ s: { n: 2, big: 10000000000, f: 2.5, t: Infinity, word: 'x' } }").section("s");
        assert_eq!(p.get_i32("n", 7).unwrap(), 2);
        assert_eq!(p.get_i32("absent", 7).unwrap(), 7);
        assert_eq!(p.get_i64("big", 0).unwrap(), 10_000_000_000);
        assert_eq!(p.get_f64("f", 0.0).unwrap(), 2.5);
        assert_eq!(p.get_f64("t", 0.0).unwrap(), f64::INFINITY);

        match p.get_i32("big", 0).unwrap_err() {
            ConfigError::TypeMismatch { path, expected, .. } => {
                assert_eq!(path, "s.big");
                assert_eq!(expected, "32-bit integer");
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(p.get_i64("f", 0).is_err());
        assert!(p.get_f64("word", 0.0).is_err());
    }

    #[test]
    fn test_display_lines() {
        let p = Properties::from_pairs([("b", "2"), ("a", "1")]);
        assert_eq!(p.to_string(), "a=1\nb=2\n");
        assert!(p.contains("a"));
        assert!(!p.contains("c"));
    }
}
