//! `mojave check`: load a document and summarize it.

use super::load_config;
use anyhow::Result;
use mojave_config::{Config, LoadOptions};
use std::path::Path;
use tracing::info;

pub fn run(path: &Path, options: &LoadOptions) -> Result<()> {
    let config = load_config(path, options)?;
    info!("Configuration {} is valid", path.display());
    println!("OK: {}", path.display());
    println!("{}", summary(&config));
    Ok(())
}

fn summary(config: &Config) -> String {
    let logging = match &config.logging {
        Some(logging) if logging.root_logger.appender_refs.is_empty() => {
            format!("{} with no appenders", logging.root_logger.level)
        }
        Some(logging) => format!(
            "{} -> {}",
            logging.root_logger.level,
            logging.root_logger.appender_refs.join(", ")
        ),
        None => "not configured".to_string(),
    };
    format!(
        "  sources: {} ({} type(s))\n  sinks:   {} ({} type(s))\n  logging: {}",
        config.source_count(),
        config.sources.len(),
        config.sink_count(),
        config.sinks.len(),
        logging
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary() {
        let config = mojave_config::load(
            "{ sources: { Z: { a: { endpoint: 'inproc://a' }, b: { endpoint: 'inproc://b' } } }, log4j: { appender: { c: { __: 'ConsoleAppender' } }, rootLogger: 'WARN,c' } }",
        )
        .unwrap();
        assert_eq!(
            summary(&config),
            "  sources: 2 (1 type(s))\n  sinks:   0 (0 type(s))\n  logging: WARN -> c"
        );
        assert!(summary(&Config::default()).ends_with("logging: not configured"));
    }
}
