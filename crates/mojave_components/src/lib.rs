//! Sources and sinks built from a loaded configuration.
//!
//! Each configured instance is handed to the factory registered for its type
//! name, which validates the type-specific parameters (endpoints, connection
//! strings) and returns a described component. No connections are opened.

mod component;
mod error;
mod registry;
mod sql;
mod zeromq;

pub use component::{Component, Sink, SinkFactory, Source, SourceFactory};
pub use error::{ComponentError, ComponentResult, EndpointError};
pub use registry::{ComponentRegistry, Pipeline};
pub use sql::{SqlSink, SQL_SINK};
pub use zeromq::{Endpoint, ZeroMqSource, ZEROMQ_SOURCE};
