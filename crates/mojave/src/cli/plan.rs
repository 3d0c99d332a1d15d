//! `mojave plan`: install the document's logging and build every component.
//!
//! Nothing connects. Each source and sink is constructed and validated by
//! the registry, then described.

use super::load_config;
use super::output::print_table;
use anyhow::{Context, Result};
use mojave_components::{Component, ComponentRegistry, Pipeline};
use mojave_config::LoadOptions;
use mojave_logging::{init_logging, plan_appenders, LogConfig};
use std::path::Path;
use tracing::{debug, info};

pub fn run(path: &Path, options: &LoadOptions, verbose: bool) -> Result<()> {
    let config = load_config(path, options)?;

    init_logging(LogConfig {
        logging: config.logging.as_ref(),
        verbose,
    })
    .context("Failed to initialize logging from the log4j section")?;

    if let Some(logging) = &config.logging {
        for appender in plan_appenders(logging)? {
            debug!(
                "Appender '{}' writes {} at {} and above",
                appender.name, appender.output, appender.level
            );
        }
    }

    let registry = ComponentRegistry::with_builtins();
    let pipeline = registry
        .build(&config)
        .with_context(|| format!("Failed to build components from {}", path.display()))?;

    for source in pipeline.sources() {
        info!("Component ready: {}", source.describe());
    }
    for sink in pipeline.sinks() {
        info!("Component ready: {}", sink.describe());
    }

    print_table(&["ROLE", "TYPE", "NAME", "DETAILS"], rows(&pipeline));
    println!(
        "{} source(s), {} sink(s), {} consumer(s) in total",
        pipeline.sources().len(),
        pipeline.sinks().len(),
        pipeline.total_concurrency()
    );
    Ok(())
}

fn rows(pipeline: &Pipeline) -> Vec<Vec<String>> {
    let sources = pipeline.sources().iter().map(|source| {
        vec![
            "source".to_string(),
            source.kind().to_string(),
            source.name().to_string(),
            format!("{} consumer(s)", source.concurrency_level()),
        ]
    });
    let sinks = pipeline.sinks().iter().map(|sink| {
        vec![
            "sink".to_string(),
            sink.kind().to_string(),
            sink.name().to_string(),
            format!("timeout {}", sink.timeout()),
        ]
    });
    sources.chain(sinks).collect()
}
