//! `mojave fmt`: canonical rendering.
//!
//! The output is a loadable document, so connection strings are written in
//! full, credentials included.

use super::load_config;
use anyhow::{Context, Result};
use mojave_config::{render, Config, LoadOptions};
use std::path::Path;
use tracing::{info, warn};

pub fn run(path: &Path, options: &LoadOptions, write: bool) -> Result<()> {
    let config = load_config(path, options)?;
    let text = render(&config);

    if write {
        std::fs::write(path, &text)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        info!("Rewrote {}", path.display());
    } else {
        if has_credentials(&config) {
            warn!("Output contains connection string credentials");
        }
        print!("{}", text);
    }
    Ok(())
}

fn has_credentials(config: &Config) -> bool {
    config
        .sink_instances()
        .any(|sink| sink.connection_string.redacted() != sink.connection_string.expose())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_has_credentials() {
        let with = mojave_config::load(
            "{ sinks: { SqlSink: { w: { connectionString: 'Server=s;Pwd=hunter2' } } } }",
        )
        .unwrap();
        assert!(has_credentials(&with));

        let without =
            mojave_config::load("{ sinks: { SqlSink: { w: { connectionString: 'Server=s' } } } }")
                .unwrap();
        assert!(!has_credentials(&without));
    }
}
