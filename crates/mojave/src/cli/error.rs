//! Helpful error types for CLI commands
//!
//! Every error includes what went wrong, where, and how to fix it when a fix
//! is obvious.

use mojave_config::ConfigError;
use std::fmt;
use std::path::Path;

/// An error with helpful context and suggestions
#[derive(Debug)]
pub struct HelpfulError {
    pub message: String,
    pub context: Option<String>,
    pub suggestions: Vec<String>,
}

impl HelpfulError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            context: None,
            suggestions: Vec::new(),
        }
    }

    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }

    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestions.push(suggestion.into());
        self
    }

    /// File does not exist
    pub fn file_not_found(path: &Path) -> Self {
        Self::new(format!("File not found: {}", path.display()))
            .with_context("The configuration file does not exist")
            .with_suggestion(format!(
                "TRY: Check if the file exists: ls -la {}",
                path.display()
            ))
    }

    /// The document could not be loaded
    pub fn invalid_config(path: &Path, err: &ConfigError) -> Self {
        let mut helpful = Self::new(format!("Invalid configuration: {}", err))
            .with_context(format!("While loading {}", path.display()));

        match err {
            ConfigError::UnknownField { .. } => {
                helpful = helpful
                    .with_suggestion("TRY: Check the field name for typos")
                    .with_suggestion(
                        "TRY: Drop --exact-keys if the name only differs in letter case",
                    );
            }
            ConfigError::DanglingAppenderReference { appender, .. } => {
                helpful = helpful.with_suggestion(format!(
                    "TRY: Define log4j.appender.{} or remove it from rootLogger",
                    appender
                ));
            }
            ConfigError::MalformedDocument { line, .. } => {
                helpful = helpful.with_suggestion(format!(
                    "TRY: Look for a missing comma, quote or brace near line {}",
                    line
                ));
            }
            _ => {}
        }

        helpful
    }
}

impl fmt::Display for HelpfulError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "ERROR: {}", self.message)?;

        if let Some(ctx) = &self.context {
            writeln!(f, "CONTEXT: {}", ctx)?;
        }

        if !self.suggestions.is_empty() {
            writeln!(f)?;
            for suggestion in &self.suggestions {
                writeln!(f, "  {}", suggestion)?;
            }
        }

        Ok(())
    }
}

impl std::error::Error for HelpfulError {}
