//! Canonical rendering of a [`Config`] back into document syntax.
//!
//! The output is accepted by [`crate::load`] and loads to an equal `Config`.

use crate::decode::keys;
use crate::document::{format_number, Entry, Node, Value};
use crate::schema::{
    AppenderConfig, Config, LayoutConfig, LoggingConfig, SinkInstance, SourceInstance,
};
use std::collections::BTreeMap;
use std::fmt::Write;

const INDENT: &str = "    ";

/// Render a configuration as `config({ ... });`.
pub fn render(config: &Config) -> String {
    let mut out = String::from("config(");
    write_value(&mut out, &config_tree(config), 0);
    out.push_str(");\n");
    out
}

fn config_tree(config: &Config) -> Value {
    let mut root = Vec::new();
    root.push(field(keys::SOURCES, grouped(&config.sources, source_tree)));
    root.push(field(keys::SINKS, grouped(&config.sinks, sink_tree)));
    if let Some(logging) = &config.logging {
        root.push(field(keys::LOG4J, logging_tree(logging)));
    }
    object(root)
}

fn grouped<T>(groups: &BTreeMap<String, BTreeMap<String, T>>, instance: fn(&T) -> Value) -> Value {
    object(
        groups
            .iter()
            .map(|(kind, instances)| {
                let entries = instances
                    .iter()
                    .map(|(name, item)| field(name, instance(item)))
                    .collect();
                field(kind, object(entries))
            })
            .collect(),
    )
}

fn source_tree(source: &SourceInstance) -> Value {
    object(vec![
        field(keys::ENDPOINT, Value::String(source.endpoint.clone())),
        field(
            keys::CONCURRENCY_LEVEL,
            Value::Number(f64::from(source.concurrency_level)),
        ),
    ])
}

fn sink_tree(sink: &SinkInstance) -> Value {
    object(vec![
        field(
            keys::CONNECTION_STRING,
            Value::String(sink.connection_string.expose().to_string()),
        ),
        field(keys::TIMEOUT, Value::Number(sink.timeout.as_millis_f64())),
    ])
}

fn logging_tree(logging: &LoggingConfig) -> Value {
    let appenders = logging
        .appenders
        .iter()
        .map(|(name, appender)| field(name, appender_tree(appender)))
        .collect();
    object(vec![
        field(keys::APPENDER, object(appenders)),
        field(
            keys::ROOT_LOGGER,
            Value::String(logging.root_logger.to_string()),
        ),
    ])
}

fn appender_tree(appender: &AppenderConfig) -> Value {
    let mut entries = vec![field(keys::CLASS, Value::String(appender.class_name.clone()))];
    if let Some(target) = &appender.target {
        entries.push(field(keys::TARGET, Value::String(target.clone())));
    }
    if let Some(layout) = &appender.layout {
        entries.push(field(keys::LAYOUT, layout_tree(layout)));
    }
    if let Some(file) = &appender.file {
        entries.push(field(keys::FILE, Value::String(file.clone())));
    }
    if let Some(size) = appender.max_file_size {
        // Sizes beyond 2^53 bytes lose precision as numbers; keep them as text.
        let value = if size <= (1u64 << 53) {
            Value::Number(size as f64)
        } else {
            Value::String(size.to_string())
        };
        entries.push(field(keys::MAX_FILE_SIZE, value));
    }
    if let Some(index) = appender.max_backup_index {
        entries.push(field(keys::MAX_BACKUP_INDEX, Value::Number(f64::from(index))));
    }
    if let Some(threshold) = appender.threshold {
        entries.push(field(keys::THRESHOLD, Value::String(threshold.to_string())));
    }
    object(entries)
}

fn layout_tree(layout: &LayoutConfig) -> Value {
    let mut entries = vec![field(keys::CLASS, Value::String(layout.class_name.clone()))];
    if let Some(pattern) = &layout.pattern {
        entries.push(field(keys::CONVERSION_PATTERN, Value::String(pattern.clone())));
    }
    object(entries)
}

fn field(key: &str, value: Value) -> (String, Value) {
    (key.to_string(), value)
}

/// Object built from rendered pairs; spans are meaningless for generated trees.
fn object(fields: Vec<(String, Value)>) -> Value {
    Value::Object(
        fields
            .into_iter()
            .map(|(key, value)| Entry {
                key,
                key_span: 0..0,
                value: Node { value, span: 0..0 },
            })
            .collect(),
    )
}

fn write_value(out: &mut String, value: &Value, depth: usize) {
    match value {
        Value::Object(entries) if entries.is_empty() => out.push_str("{}"),
        Value::Object(entries) => {
            out.push_str("{\n");
            for (i, entry) in entries.iter().enumerate() {
                push_indent(out, depth + 1);
                write_key(out, &entry.key);
                out.push_str(": ");
                write_value(out, &entry.value.value, depth + 1);
                if i + 1 < entries.len() {
                    out.push(',');
                }
                out.push('\n');
            }
            push_indent(out, depth);
            out.push('}');
        }
        Value::Array(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                write_value(out, &item.value, depth);
            }
            out.push(']');
        }
        Value::String(s) => write_string(out, s),
        Value::Number(n) => out.push_str(&format_number(*n)),
        Value::Bool(b) => out.push_str(if *b { "true" } else { "false" }),
        Value::Null => out.push_str("null"),
    }
}

fn push_indent(out: &mut String, depth: usize) {
    for _ in 0..depth {
        out.push_str(INDENT);
    }
}

fn write_key(out: &mut String, key: &str) {
    if is_identifier(key) {
        out.push_str(key);
    } else {
        write_string(out, key);
    }
}

/// Keys that lex as a bare identifier (keywords excluded).
fn is_identifier(key: &str) -> bool {
    let mut chars = key.chars();
    let starts_ok = chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_' || c == '$');
    starts_ok
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
        && !matches!(key, "true" | "false" | "null" | "Infinity")
}

fn write_string(out: &mut String, s: &str) {
    out.push('\'');
    for ch in s.chars() {
        match ch {
            '\'' => out.push_str("\\'"),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c.is_control() => {
                let _ = write!(out, "\\u{:04x}", c as u32);
            }
            c => out.push(c),
        }
    }
    out.push('\'');
}
