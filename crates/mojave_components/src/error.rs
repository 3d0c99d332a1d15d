use thiserror::Error;

/// Errors raised while turning configured instances into components.
#[derive(Debug, Error)]
pub enum ComponentError {
    #[error("{path}: unknown source type '{kind}'")]
    UnknownSourceType { path: String, kind: String },

    #[error("{path}: unknown sink type '{kind}'")]
    UnknownSinkType { path: String, kind: String },

    #[error("{path}: {message}")]
    InvalidParameter { path: String, message: String },

    #[error("a {role} factory for '{kind}' is already registered")]
    AlreadyRegistered { role: &'static str, kind: String },
}

/// Why a ZeroMQ endpoint string was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EndpointError {
    #[error("invalid endpoint '{endpoint}': {source}")]
    Malformed {
        endpoint: String,
        source: url::ParseError,
    },

    #[error("endpoint '{0}' is missing a host")]
    MissingHost(String),

    #[error("endpoint '{0}' is missing a port")]
    MissingPort(String),

    #[error("endpoint '{0}' must not have a path")]
    UnexpectedPath(String),

    #[error("endpoint '{0}' is missing an address")]
    MissingAddress(String),

    #[error("unsupported transport '{0}' (expected tcp, ipc or inproc)")]
    UnsupportedTransport(String),
}

pub type ComponentResult<T> = std::result::Result<T, ComponentError>;

impl ComponentError {
    pub fn invalid(path: impl Into<String>, message: impl Into<String>) -> Self {
        ComponentError::InvalidParameter {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Dotted configuration path the error refers to, if any.
    pub fn path(&self) -> Option<&str> {
        match self {
            ComponentError::UnknownSourceType { path, .. }
            | ComponentError::UnknownSinkType { path, .. }
            | ComponentError::InvalidParameter { path, .. } => Some(path),
            ComponentError::AlreadyRegistered { .. } => None,
        }
    }
}
