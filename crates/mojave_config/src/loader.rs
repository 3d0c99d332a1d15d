//! Entry points for loading configuration text into a [`Config`].

use crate::decode::decode;
use crate::document::parse_document;
use crate::error::{ConfigError, Result};
use crate::schema::Config;
use std::path::Path;
use tracing::debug;

/// How field keys in the document are matched against schema field names.
///
/// Only field names are affected; source/sink kinds, instance names and
/// appender names are always compared exactly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum KeyMatching {
    /// `concurrencylevel` and `concurrencyLevel` name the same field.
    #[default]
    CaseInsensitive,
    /// Keys must be spelled exactly as in the schema; anything else is an
    /// unknown field.
    Exact,
}

impl KeyMatching {
    pub fn matches(self, canonical: &str, key: &str) -> bool {
        match self {
            KeyMatching::CaseInsensitive => canonical.eq_ignore_ascii_case(key),
            KeyMatching::Exact => canonical == key,
        }
    }
}

/// Options for [`load_with`] and [`load_file`].
#[derive(Debug, Clone, Default)]
pub struct LoadOptions {
    pub key_matching: KeyMatching,
}

impl LoadOptions {
    pub fn exact_keys() -> Self {
        Self {
            key_matching: KeyMatching::Exact,
        }
    }
}

/// Load a configuration document with default options.
pub fn load(text: &str) -> Result<Config> {
    load_with(text, &LoadOptions::default())
}

/// Parse and validate a configuration document.
///
/// Either every section decodes or an error naming the offending path is
/// returned; no partially populated configuration is ever produced.
pub fn load_with(text: &str, options: &LoadOptions) -> Result<Config> {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    let document = parse_document(text)?;
    let config = decode(&document, options)?;
    debug!(
        "Loaded configuration: {} source(s), {} sink(s), logging {}",
        config.source_count(),
        config.sink_count(),
        if config.logging.is_some() { "configured" } else { "absent" }
    );
    Ok(config)
}

/// Read and load a configuration file.
pub fn load_file(path: impl AsRef<Path>, options: &LoadOptions) -> Result<Config> {
    let path = path.as_ref();
    debug!("Reading configuration from {}", path.display());
    let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    load_with(&text, options)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_matching() {
        assert!(KeyMatching::CaseInsensitive.matches("concurrencyLevel", "concurrencylevel"));
        assert!(KeyMatching::CaseInsensitive.matches("concurrencyLevel", "CONCURRENCYLEVEL"));
        assert!(!KeyMatching::Exact.matches("concurrencyLevel", "concurrencylevel"));
        assert!(KeyMatching::Exact.matches("concurrencyLevel", "concurrencyLevel"));
    }

    #[test]
    fn test_byte_order_mark_is_ignored() {
        let config = load("\u{feff}{ sources: {} }").unwrap();
        assert_eq!(config.source_count(), 0);
    }

    #[test]
    fn test_empty_document_is_empty_config() {
        let config = load("config({});").unwrap();
        assert_eq!(config, Config::default());
    }
}
