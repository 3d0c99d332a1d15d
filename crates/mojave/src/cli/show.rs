//! `mojave show`: the typed configuration as a table or JSON.

use super::load_config;
use super::output::{format_size, print_table};
use anyhow::{Context, Result};
use mojave_config::{AppenderConfig, Config, LoadOptions};
use std::path::Path;

pub fn run(path: &Path, options: &LoadOptions, json: bool) -> Result<()> {
    let config = load_config(path, options)?;

    if json {
        let text =
            serde_json::to_string_pretty(&*config).context("Failed to serialize configuration")?;
        println!("{}", text);
        return Ok(());
    }

    print_table(&["SECTION", "TYPE", "NAME", "SETTINGS"], rows(&config));
    Ok(())
}

fn rows(config: &Config) -> Vec<Vec<String>> {
    let mut rows = Vec::new();

    for source in config.source_instances() {
        rows.push(vec![
            "source".to_string(),
            source.kind.clone(),
            source.name.clone(),
            format!(
                "endpoint={}\nconcurrencyLevel={}",
                source.endpoint, source.concurrency_level
            ),
        ]);
    }

    for sink in config.sink_instances() {
        rows.push(vec![
            "sink".to_string(),
            sink.kind.clone(),
            sink.name.clone(),
            format!(
                "connectionString={}\ntimeout={}",
                sink.connection_string, sink.timeout
            ),
        ]);
    }

    if let Some(logging) = &config.logging {
        for (name, appender) in &logging.appenders {
            rows.push(vec![
                "appender".to_string(),
                appender.class_name.clone(),
                name.clone(),
                appender_settings(appender),
            ]);
        }
        rows.push(vec![
            "rootLogger".to_string(),
            String::new(),
            String::new(),
            logging.root_logger.to_string(),
        ]);
    }

    rows
}

fn appender_settings(appender: &AppenderConfig) -> String {
    let mut settings = Vec::new();
    if let Some(target) = &appender.target {
        settings.push(format!("target={}", target));
    }
    if let Some(file) = &appender.file {
        settings.push(format!("File={}", file));
    }
    if let Some(size) = appender.max_file_size {
        settings.push(format!("MaxFileSize={}", format_size(size)));
    }
    if let Some(index) = appender.max_backup_index {
        settings.push(format!("MaxBackupIndex={}", index));
    }
    if let Some(threshold) = appender.threshold {
        settings.push(format!("Threshold={}", threshold));
    }
    if let Some(layout) = &appender.layout {
        settings.push(format!("layout={}", layout.class_name));
        if let Some(pattern) = &layout.pattern {
            settings.push(format!("ConversionPattern={}", pattern));
        }
    }
    settings.join("\n")
}
