//! CLI commands for the `mojave` binary.

pub mod check;
pub mod error;
pub mod fmt;
pub mod output;
pub mod plan;
pub mod properties;
pub mod show;

use anyhow::Result;
use error::HelpfulError;
use mojave_config::{load_file, Config, ConfigError, LoadOptions};
use std::path::Path;
use std::sync::Arc;
use tracing::debug;

pub fn load_options(exact_keys: bool) -> LoadOptions {
    if exact_keys {
        LoadOptions::exact_keys()
    } else {
        LoadOptions::default()
    }
}

/// Load and validate a configuration file, mapping failures to helpful errors.
pub fn load_config(path: &Path, options: &LoadOptions) -> Result<Arc<Config>> {
    if !path.exists() {
        return Err(HelpfulError::file_not_found(path).into());
    }
    debug!("Loading {} ({:?} key matching)", path.display(), options.key_matching);
    let config = load_file(path, options).map_err(|err| describe_load_error(path, err))?;
    Ok(Arc::new(config))
}

fn describe_load_error(path: &Path, err: ConfigError) -> anyhow::Error {
    match err {
        ConfigError::Io { .. } => anyhow::Error::new(err),
        other => HelpfulError::invalid_config(path, &other).into(),
    }
}

/// Read raw document text, without the byte order mark.
pub fn read_document(path: &Path) -> Result<String> {
    if !path.exists() {
        return Err(HelpfulError::file_not_found(path).into());
    }
    let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(text
        .strip_prefix('\u{feff}')
        .map(str::to_string)
        .unwrap_or(text))
}
