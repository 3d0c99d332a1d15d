//! Loading the reference `config.js` document end to end.

use mojave_config::{
    load, load_file, load_with, parse_document, render, ConfigError, Level, LoadOptions,
    Properties, Timeout,
};
use std::io::Write;

const SAMPLE: &str = include_str!("fixtures/config.js");

#[test]
fn test_sample_sources() {
    let config = load(SAMPLE).expect("sample should load");

    assert_eq!(config.source_count(), 2);
    for name in ["s1", "s2"] {
        let source = config
            .source("ZeroMQSource", name)
            .unwrap_or_else(|| panic!("source {name} missing"));
        assert_eq!(source.concurrency_level, 2, "{name}");
        assert_eq!(source.kind, "ZeroMQSource");
        assert_eq!(source.name, name);
    }
    assert_eq!(
        config.source("ZeroMQSource", "s1").unwrap().endpoint,
        "tcp://eu.host:1234"
    );
    assert_eq!(
        config.source("ZeroMQSource", "s2").unwrap().endpoint,
        "tcp://na.host:1234"
    );
}

#[test]
fn test_sample_sinks() {
    let config = load(SAMPLE).unwrap();

    assert_eq!(config.sink_count(), 2);
    for name in ["warehouse", "archive"] {
        let sink = config.sink("SqlSink", name).unwrap();
        assert_eq!(sink.timeout, Timeout::Unbounded);
        assert_eq!(sink.connection_string.get("Database"), Some("myDataBase"));
        assert!(!format!("{:?}", sink).contains("myPassword"));
    }
    assert!(config
        .sink("SqlSink", "archive")
        .unwrap()
        .connection_string
        .expose()
        .starts_with("Server=myArchiveserverAddress;"));
}

#[test]
fn test_sample_logging() {
    let config = load(SAMPLE).unwrap();
    let logging = config.logging.as_ref().expect("log4j section");

    assert_eq!(logging.root_logger.level, Level::Debug);
    assert_eq!(logging.root_logger.appender_refs, vec!["console".to_string()]);

    let console = &logging.appenders["console"];
    assert_eq!(console.class_name, "org.apache.log4j.ConsoleAppender");
    assert_eq!(console.target.as_deref(), Some("System.out"));
    let layout = console.layout.as_ref().unwrap();
    assert_eq!(layout.class_name, "org.apache.log4j.PatternLayout");
    assert_eq!(layout.pattern.as_deref(), Some("%d (%t) [%p - %l] %m%n"));
}

#[test]
fn test_sample_rejected_with_exact_keys() {
    let err = load_with(SAMPLE, &LoadOptions::exact_keys()).unwrap_err();
    match err {
        ConfigError::UnknownField { path } => {
            assert_eq!(path, "sources.ZeroMQSource.s1.concurrencylevel")
        }
        other => panic!("expected UnknownField, got {other:?}"),
    }
}

#[test]
fn test_sample_renders_and_reloads() {
    let config = load(SAMPLE).unwrap();
    let text = render(&config);
    assert!(text.starts_with("config({\n"));
    assert!(text.contains("timeout: Infinity"));
    assert_eq!(load(&text).unwrap(), config);
    // The canonical form uses schema spelling, so exact matching accepts it.
    assert_eq!(load_with(&text, &LoadOptions::exact_keys()).unwrap(), config);
}

#[test]
fn test_sample_properties() {
    let properties = Properties::from_document(&parse_document(SAMPLE).unwrap());

    assert_eq!(properties.get("log4j.rootLogger"), Some("DEBUG,console"));
    assert_eq!(
        properties.get("log4j.appender.console"),
        Some("org.apache.log4j.ConsoleAppender")
    );
    assert_eq!(
        properties.get("log4j.appender.console.layout"),
        Some("org.apache.log4j.PatternLayout")
    );
    assert_eq!(
        properties.get("sinks.SqlSink.warehouse.timeout"),
        Some("Infinity")
    );

    let source = properties.section("sources").section("ZeroMQSource").section("s2");
    assert_eq!(source.section_name(), Some("s2"));
    assert_eq!(source.get_i32("concurrencyLevel", 1).unwrap(), 2);
    assert_eq!(source.get_i32("concurrencylevel", 1).unwrap(), 1);
}

#[test]
fn test_load_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(SAMPLE.as_bytes()).unwrap();

    let config = load_file(file.path(), &LoadOptions::default()).unwrap();
    assert_eq!(config, load(SAMPLE).unwrap());
}

#[test]
fn test_load_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("absent.js");

    let err = load_file(&path, &LoadOptions::default()).unwrap_err();
    assert!(matches!(err, ConfigError::Io { .. }));
    assert!(err.to_string().contains("absent.js"));
}

#[test]
fn test_config_is_shareable() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<mojave_config::Config>();
}
