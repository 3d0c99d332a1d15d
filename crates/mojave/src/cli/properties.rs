//! `mojave properties`: flattened `key=value` view of the raw document.

use super::error::HelpfulError;
use super::read_document;
use anyhow::Result;
use mojave_config::{parse_document, ConnectionString, Properties};
use std::path::Path;

const CONNECTION_STRING_KEY: &str = "connectionString";

pub fn run(path: &Path, section: Option<&str>, reveal: bool) -> Result<()> {
    let text = read_document(path)?;
    let document =
        parse_document(&text).map_err(|err| HelpfulError::invalid_config(path, &err))?;

    let mut properties = Properties::from_document(&document);
    if let Some(section) = section {
        properties = properties.section(section);
    }

    for (key, value) in properties.iter() {
        println!("{}={}", key, display_value(key, value, reveal));
    }
    Ok(())
}

fn display_value(key: &str, value: &str, reveal: bool) -> String {
    let last = key.rsplit('.').next().unwrap_or(key);
    if !reveal && last.eq_ignore_ascii_case(CONNECTION_STRING_KEY) {
        ConnectionString::redact(value)
    } else {
        value.to_string()
    }
}
