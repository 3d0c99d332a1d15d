//! Factory registry that turns a [`Config`] into a [`Pipeline`].

use crate::component::{
    sink_path, source_path, Component, Sink, SinkFactory, Source, SourceFactory,
};
use crate::error::{ComponentError, ComponentResult};
use crate::sql::{SqlSink, SQL_SINK};
use crate::zeromq::{ZeroMqSource, ZEROMQ_SOURCE};
use mojave_config::{Config, SinkInstance, SourceInstance};
use std::collections::BTreeMap;
use std::fmt;
use tracing::{debug, info};

/// Source and sink factories keyed by type name.
#[derive(Default)]
pub struct ComponentRegistry {
    sources: BTreeMap<String, SourceFactory>,
    sinks: BTreeMap<String, SinkFactory>,
}

impl fmt::Debug for ComponentRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComponentRegistry")
            .field("sources", &self.source_kinds().collect::<Vec<_>>())
            .field("sinks", &self.sink_kinds().collect::<Vec<_>>())
            .finish()
    }
}

impl ComponentRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry with `ZeroMQSource` and `SqlSink`.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.sources.insert(
            ZEROMQ_SOURCE.to_string(),
            Box::new(|instance: &SourceInstance| {
                ZeroMqSource::from_instance(instance).map(|s| Box::new(s) as Box<dyn Source>)
            }),
        );
        registry.sinks.insert(
            SQL_SINK.to_string(),
            Box::new(|instance: &SinkInstance| {
                SqlSink::from_instance(instance).map(|s| Box::new(s) as Box<dyn Sink>)
            }),
        );
        registry
    }

    pub fn register_source<F>(&mut self, kind: impl Into<String>, factory: F) -> ComponentResult<()>
    where
        F: Fn(&SourceInstance) -> ComponentResult<Box<dyn Source>> + Send + Sync + 'static,
    {
        let kind = kind.into();
        if self.sources.contains_key(&kind) {
            return Err(ComponentError::AlreadyRegistered { role: "source", kind });
        }
        self.sources.insert(kind, Box::new(factory));
        Ok(())
    }

    pub fn register_sink<F>(&mut self, kind: impl Into<String>, factory: F) -> ComponentResult<()>
    where
        F: Fn(&SinkInstance) -> ComponentResult<Box<dyn Sink>> + Send + Sync + 'static,
    {
        let kind = kind.into();
        if self.sinks.contains_key(&kind) {
            return Err(ComponentError::AlreadyRegistered { role: "sink", kind });
        }
        self.sinks.insert(kind, Box::new(factory));
        Ok(())
    }

    pub fn source_kinds(&self) -> impl Iterator<Item = &str> {
        self.sources.keys().map(String::as_str)
    }

    pub fn sink_kinds(&self) -> impl Iterator<Item = &str> {
        self.sinks.keys().map(String::as_str)
    }

    /// Create one component per configured instance.
    ///
    /// Fails on the first unknown type or invalid parameter; nothing is
    /// connected, so a failed build has no side effects.
    pub fn build(&self, config: &Config) -> ComponentResult<Pipeline> {
        let mut pipeline = Pipeline::default();

        for (kind, instances) in &config.sources {
            let factory = self
                .sources
                .get(kind)
                .ok_or_else(|| ComponentError::UnknownSourceType {
                    path: format!("sources.{}", kind),
                    kind: kind.clone(),
                })?;
            for instance in instances.values() {
                debug!("Creating the source: {}", source_path(instance));
                require_name(&instance.name, &source_path(instance))?;
                pipeline.sources.push(factory(instance)?);
            }
        }

        for (kind, instances) in &config.sinks {
            let factory = self
                .sinks
                .get(kind)
                .ok_or_else(|| ComponentError::UnknownSinkType {
                    path: format!("sinks.{}", kind),
                    kind: kind.clone(),
                })?;
            for instance in instances.values() {
                debug!("Creating the sink: {}", sink_path(instance));
                require_name(&instance.name, &sink_path(instance))?;
                pipeline.sinks.push(factory(instance)?);
            }
        }

        info!(
            "Built pipeline with {} source(s) and {} sink(s)",
            pipeline.sources.len(),
            pipeline.sinks.len()
        );
        Ok(pipeline)
    }
}

fn require_name(name: &str, path: &str) -> ComponentResult<()> {
    if name.trim().is_empty() {
        return Err(ComponentError::invalid(path, "the name is not provided"));
    }
    Ok(())
}

/// Configured components, in configuration order (kind, then name).
#[derive(Debug, Default)]
pub struct Pipeline {
    sources: Vec<Box<dyn Source>>,
    sinks: Vec<Box<dyn Sink>>,
}

impl Pipeline {
    pub fn sources(&self) -> &[Box<dyn Source>] {
        &self.sources
    }

    pub fn sinks(&self) -> &[Box<dyn Sink>] {
        &self.sinks
    }

    pub fn source(&self, kind: &str, name: &str) -> Option<&dyn Source> {
        self.sources
            .iter()
            .find(|s| s.kind() == kind && s.name() == name)
            .map(|s| s.as_ref())
    }

    pub fn sink(&self, kind: &str, name: &str) -> Option<&dyn Sink> {
        self.sinks
            .iter()
            .find(|s| s.kind() == kind && s.name() == name)
            .map(|s| s.as_ref())
    }

    /// Sum of all source concurrency levels.
    pub fn total_concurrency(&self) -> u64 {
        self.sources
            .iter()
            .map(|s| u64::from(s.concurrency_level()))
            .sum()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty() && self.sinks.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_kinds() {
        let registry = ComponentRegistry::with_builtins();
        assert_eq!(registry.source_kinds().collect::<Vec<_>>(), vec!["ZeroMQSource"]);
        assert_eq!(registry.sink_kinds().collect::<Vec<_>>(), vec!["SqlSink"]);
        assert!(ComponentRegistry::new().source_kinds().next().is_none());
    }

    #[test]
    fn test_duplicate_registration() {
        let mut registry = ComponentRegistry::with_builtins();
        let err = registry
            .register_source(ZEROMQ_SOURCE, |instance| {
                ZeroMqSource::from_instance(instance).map(|s| Box::new(s) as Box<dyn Source>)
            })
            .unwrap_err();
        assert!(matches!(err, ComponentError::AlreadyRegistered { role: "source", .. }));
    }

    #[test]
    fn test_empty_config_builds_empty_pipeline() {
        let pipeline = ComponentRegistry::with_builtins()
            .build(&Config::default())
            .unwrap();
        assert!(pipeline.is_empty());
        assert_eq!(pipeline.total_concurrency(), 0);
    }

    #[test]
    fn test_blank_name_is_rejected() {
        let mut config = Config::default();
        config.sources.entry(ZEROMQ_SOURCE.into()).or_default().insert(
            " ".into(),
            SourceInstance {
                kind: ZEROMQ_SOURCE.into(),
                name: " ".into(),
                endpoint: "inproc://x".into(),
                concurrency_level: 1,
            },
        );
        let err = ComponentRegistry::with_builtins().build(&config).unwrap_err();
        assert!(err.to_string().contains("the name is not provided"));
    }

    #[test]
    fn test_pipeline_lookup() {
        let mut config = Config::default();
        config.sources.entry(ZEROMQ_SOURCE.into()).or_default().insert(
            "s1".into(),
            SourceInstance {
                kind: ZEROMQ_SOURCE.into(),
                name: "s1".into(),
                endpoint: "inproc://feed".into(),
                concurrency_level: 3,
            },
        );
        let pipeline = ComponentRegistry::with_builtins().build(&config).unwrap();
        let source = pipeline.source(ZEROMQ_SOURCE, "s1").unwrap();
        assert_eq!(source.name(), "s1");
        assert_eq!(pipeline.total_concurrency(), 3);
        assert!(pipeline.source(ZEROMQ_SOURCE, "s2").is_none());
        assert!(pipeline.sink(SQL_SINK, "s1").is_none());
    }
}
