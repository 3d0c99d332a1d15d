//! `ZeroMQSource`: a source described by a ZeroMQ endpoint.

use crate::component::{source_path, Component, Source};
use crate::error::{ComponentError, ComponentResult, EndpointError};
use mojave_config::SourceInstance;
use std::fmt;
use url::Url;

pub const ZEROMQ_SOURCE: &str = "ZeroMQSource";

/// A parsed ZeroMQ endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Endpoint {
    /// `tcp://host:port`; host may be `*` when binding.
    Tcp { host: String, port: u16 },
    /// `ipc://path`
    Ipc(String),
    /// `inproc://name`
    Inproc(String),
}

impl Endpoint {
    pub fn parse(raw: &str) -> Result<Self, EndpointError> {
        let raw = raw.trim();
        let url = Url::parse(raw).map_err(|source| EndpointError::Malformed {
            endpoint: raw.to_string(),
            source,
        })?;

        match url.scheme() {
            "tcp" => {
                let host = url
                    .host_str()
                    .filter(|host| !host.is_empty())
                    .ok_or_else(|| EndpointError::MissingHost(raw.to_string()))?;
                let port = url
                    .port()
                    .ok_or_else(|| EndpointError::MissingPort(raw.to_string()))?;
                if !matches!(url.path(), "" | "/") {
                    return Err(EndpointError::UnexpectedPath(raw.to_string()));
                }
                Ok(Endpoint::Tcp {
                    host: host.to_string(),
                    port,
                })
            }
            "ipc" => Ok(Endpoint::Ipc(address_after_scheme(raw)?)),
            "inproc" => Ok(Endpoint::Inproc(address_after_scheme(raw)?)),
            other => Err(EndpointError::UnsupportedTransport(other.to_string())),
        }
    }
}

fn address_after_scheme(raw: &str) -> Result<String, EndpointError> {
    match raw.split_once("://") {
        Some((_, address)) if !address.is_empty() => Ok(address.to_string()),
        _ => Err(EndpointError::MissingAddress(raw.to_string())),
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Endpoint::Tcp { host, port } => write!(f, "tcp://{}:{}", host, port),
            Endpoint::Ipc(path) => write!(f, "ipc://{}", path),
            Endpoint::Inproc(name) => write!(f, "inproc://{}", name),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ZeroMqSource {
    name: String,
    endpoint: Endpoint,
    concurrency_level: u32,
}

impl ZeroMqSource {
    pub fn from_instance(instance: &SourceInstance) -> ComponentResult<Self> {
        let endpoint = Endpoint::parse(&instance.endpoint).map_err(|err| {
            ComponentError::invalid(format!("{}.endpoint", source_path(instance)), err.to_string())
        })?;
        Ok(Self {
            name: instance.name.clone(),
            endpoint,
            concurrency_level: instance.concurrency_level,
        })
    }

    pub fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }
}

impl Component for ZeroMqSource {
    fn kind(&self) -> &str {
        ZEROMQ_SOURCE
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn describe(&self) -> String {
        format!(
            "{} '{}' on {} with {} consumer(s)",
            ZEROMQ_SOURCE, self.name, self.endpoint, self.concurrency_level
        )
    }
}

impl Source for ZeroMqSource {
    fn concurrency_level(&self) -> u32 {
        self.concurrency_level
    }
}
