//! Component traits shared by sources and sinks.

use crate::error::ComponentResult;
use mojave_config::{SinkInstance, SourceInstance, Timeout};
use std::fmt;

/// Anything the pipeline wires up from a configured instance.
pub trait Component: fmt::Debug + Send + Sync {
    /// Type tag, e.g. `ZeroMQSource`.
    fn kind(&self) -> &str;

    /// Instance name, unique within its kind.
    fn name(&self) -> &str;

    /// One-line human description; never contains credentials.
    fn describe(&self) -> String;
}

/// A component the pipeline reads records from.
pub trait Source: Component {
    /// Number of concurrent consumers.
    fn concurrency_level(&self) -> u32;
}

/// A component the pipeline writes records to.
pub trait Sink: Component {
    fn timeout(&self) -> Timeout;
}

pub type SourceFactory =
    Box<dyn Fn(&SourceInstance) -> ComponentResult<Box<dyn Source>> + Send + Sync>;
pub type SinkFactory = Box<dyn Fn(&SinkInstance) -> ComponentResult<Box<dyn Sink>> + Send + Sync>;

/// `sources.<kind>.<name>`
pub(crate) fn source_path(instance: &SourceInstance) -> String {
    format!("sources.{}.{}", instance.kind, instance.name)
}

/// `sinks.<kind>.<name>`
pub(crate) fn sink_path(instance: &SinkInstance) -> String {
    format!("sinks.{}.{}", instance.kind, instance.name)
}
