//! Mojave configuration loading.
//!
//! A configuration document is a JavaScript object literal, optionally
//! wrapped in `config( ... );`, describing the pipeline's sources, sinks and
//! log4j-style logging:
//!
//! ```text
//! config({
//!     sources: { ZeroMQSource: { s1: { endpoint: 'tcp://eu.host:1234', concurrencyLevel: 2 } } },
//!     sinks:   { SqlSink: { warehouse: { connectionString: 'Server=...;', timeout: Infinity } } },
//!     log4j:   { appender: { console: { __: 'org.apache.log4j.ConsoleAppender' } },
//!                rootLogger: 'DEBUG,console' }
//! });
//! ```
//!
//! [`load`] turns the text into a validated, immutable [`Config`]. The untyped
//! tree is available through [`parse_document`] and flattened through
//! [`Properties`]; [`render`] writes a `Config` back out.

mod decode;
pub mod document;
pub mod error;
pub mod lexer;
mod loader;
pub mod properties;
mod render;
pub mod schema;

pub use document::{parse_document, Document, Node, Value};
pub use error::{ConfigError, ConfigPath, Result};
pub use loader::{load, load_file, load_with, KeyMatching, LoadOptions};
pub use properties::Properties;
pub use render::render;
pub use schema::{
    AppenderConfig, Config, ConnectionString, Instances, LayoutConfig, Level, LoggingConfig,
    RootLogger, SinkInstance, SourceInstance, Timeout, DEFAULT_CONCURRENCY_LEVEL,
};
