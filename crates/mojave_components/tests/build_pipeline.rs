//! Building components from loaded documents.

use mojave_components::{
    Component, ComponentError, ComponentRegistry, ComponentResult, Endpoint, Sink, Source,
    ZeroMqSource,
};
use mojave_config::{load, SourceInstance, Timeout};
use proptest::prelude::*;

const SAMPLE: &str = include_str!("../../mojave_config/tests/fixtures/config.js");

#[test]
fn test_sample_builds() {
    let config = load(SAMPLE).unwrap();
    let pipeline = ComponentRegistry::with_builtins().build(&config).unwrap();

    assert_eq!(pipeline.sources().len(), 2);
    assert_eq!(pipeline.sinks().len(), 2);
    assert_eq!(pipeline.total_concurrency(), 4);

    let names: Vec<_> = pipeline.sinks().iter().map(|s| s.name().to_string()).collect();
    assert_eq!(names, vec!["archive", "warehouse"]);

    let warehouse = pipeline.sink("SqlSink", "warehouse").unwrap();
    assert_eq!(warehouse.timeout(), Timeout::Unbounded);
    assert!(!warehouse.describe().contains("myPassword"));
    assert!(!format!("{:?}", pipeline).contains("myPassword"));
}

#[test]
fn test_unknown_types() {
    let config = load("{ sources: { KafkaSource: { k1: { endpoint: 'kafka://broker:9092' } } } }")
        .unwrap();
    match ComponentRegistry::with_builtins().build(&config).unwrap_err() {
        ComponentError::UnknownSourceType { path, kind } => {
            assert_eq!(path, "sources.KafkaSource");
            assert_eq!(kind, "KafkaSource");
        }
        other => panic!("expected UnknownSourceType, got {other:?}"),
    }

    let config = load("{ sinks: { FileSink: { f: { connectionString: 'Path=/tmp' } } } }").unwrap();
    assert!(matches!(
        ComponentRegistry::with_builtins().build(&config).unwrap_err(),
        ComponentError::UnknownSinkType { .. }
    ));
}

#[test]
fn test_bad_endpoint() {
    let config =
        load("{ sources: { ZeroMQSource: { s1: { endpoint: 'tcp://eu.host' } } } }").unwrap();
    let err = ComponentRegistry::with_builtins().build(&config).unwrap_err();
    assert_eq!(err.path(), Some("sources.ZeroMQSource.s1.endpoint"));
}

#[derive(Debug)]
struct StdinSource {
    name: String,
}

impl Component for StdinSource {
    fn kind(&self) -> &str {
        "StdinSource"
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn describe(&self) -> String {
        format!("StdinSource '{}'", self.name)
    }
}

impl Source for StdinSource {
    fn concurrency_level(&self) -> u32 {
        1
    }
}

fn stdin_source(instance: &SourceInstance) -> ComponentResult<Box<dyn Source>> {
    if instance.endpoint != "-" {
        return Err(ComponentError::invalid(
            format!("sources.StdinSource.{}.endpoint", instance.name),
            "endpoint must be '-'",
        ));
    }
    Ok(Box::new(StdinSource {
        name: instance.name.clone(),
    }))
}

#[test]
fn test_custom_factory() {
    let mut registry = ComponentRegistry::with_builtins();
    registry.register_source("StdinSource", stdin_source).unwrap();
    assert!(registry.register_source("StdinSource", stdin_source).is_err());

    let config = load(
        "{ sources: { StdinSource: { console: { endpoint: '-' } }, ZeroMQSource: { s1: { endpoint: 'inproc://a', concurrencyLevel: 4 } } } }",
    )
    .unwrap();
    let pipeline = registry.build(&config).unwrap();
    assert_eq!(pipeline.total_concurrency(), 5);
    assert_eq!(
        pipeline.source("StdinSource", "console").unwrap().describe(),
        "StdinSource 'console'"
    );
}

proptest! {
    /// Any host and port combination survives a parse/display round trip.
    #[test]
    fn prop_tcp_endpoint_round_trip(host in "[a-z][a-z0-9-]{0,10}(\\.[a-z]{2,5}){0,2}", port in 1u16..) {
        let raw = format!("tcp://{}:{}", host, port);
        let endpoint = Endpoint::parse(&raw).unwrap();
        prop_assert_eq!(endpoint.to_string(), raw);
    }

    #[test]
    fn prop_source_keeps_concurrency(level in 1u32..1000) {
        let source = ZeroMqSource::from_instance(&SourceInstance {
            kind: "ZeroMQSource".into(),
            name: "s".into(),
            endpoint: "inproc://feed".into(),
            concurrency_level: level,
        })
        .unwrap();
        prop_assert_eq!(source.concurrency_level(), level);
    }
}
