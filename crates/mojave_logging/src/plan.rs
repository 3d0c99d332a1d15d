//! Resolve a `log4j` section into concrete appender outputs.

use crate::layout::{short_class_name, LayoutSpec};
use crate::writer::RollingPolicy;
use anyhow::{bail, Context, Result};
use mojave_config::{AppenderConfig, Level, LoggingConfig};
use std::fmt;
use std::path::{Path, PathBuf};

const CONSOLE_APPENDER: &str = "ConsoleAppender";
const FILE_APPENDER: &str = "FileAppender";
const ROLLING_FILE_APPENDER: &str = "RollingFileAppender";

const SYSTEM_OUT: &str = "System.out";
const SYSTEM_ERR: &str = "System.err";

/// log4j's `RollingFileAppender` defaults.
pub const DEFAULT_MAX_FILE_SIZE: u64 = 10 * 1024 * 1024;
pub const DEFAULT_MAX_BACKUP_INDEX: u32 = 1;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppenderOutput {
    Stdout,
    Stderr,
    File {
        path: PathBuf,
        rolling: Option<RollingPolicy>,
    },
}

impl fmt::Display for AppenderOutput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppenderOutput::Stdout => write!(f, "stdout"),
            AppenderOutput::Stderr => write!(f, "stderr"),
            AppenderOutput::File {
                path,
                rolling: None,
            } => write!(f, "{}", path.display()),
            AppenderOutput::File {
                path,
                rolling: Some(policy),
            } => write!(
                f,
                "{} (rolls at {} bytes, keeps {})",
                path.display(),
                policy.max_file_size,
                policy.max_backup_index
            ),
        }
    }
}

/// One `fmt` layer to install: where it writes, what it prints, and the
/// lowest level it accepts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppenderPlan {
    pub name: String,
    pub output: AppenderOutput,
    pub layout: LayoutSpec,
    pub level: Level,
}

/// Plan every appender the root logger references, resolving relative file
/// paths under [`crate::logs_dir`].
pub fn plan_appenders(logging: &LoggingConfig) -> Result<Vec<AppenderPlan>> {
    let logs = crate::logs_dir()?;
    plan_appenders_in(logging, &logs)
}

/// Same as [`plan_appenders`] with an explicit base directory for relative
/// file paths.
pub fn plan_appenders_in(logging: &LoggingConfig, logs_dir: &Path) -> Result<Vec<AppenderPlan>> {
    let root_level = logging.root_logger.level;
    logging
        .root_appenders()
        .map(|(name, appender)| {
            plan_appender(name, appender, root_level, logs_dir)
                .with_context(|| format!("log4j.appender.{}", name))
        })
        .collect()
}

fn plan_appender(
    name: &str,
    appender: &AppenderConfig,
    root_level: Level,
    logs_dir: &Path,
) -> Result<AppenderPlan> {
    let output = match short_class_name(&appender.class_name) {
        CONSOLE_APPENDER => match appender.target.as_deref().map(str::trim) {
            None | Some(SYSTEM_OUT) => AppenderOutput::Stdout,
            Some(SYSTEM_ERR) => AppenderOutput::Stderr,
            Some(other) => bail!(
                "unsupported console target '{}' (expected {} or {})",
                other,
                SYSTEM_OUT,
                SYSTEM_ERR
            ),
        },
        FILE_APPENDER => AppenderOutput::File {
            path: resolve_file(appender, logs_dir)?,
            rolling: None,
        },
        ROLLING_FILE_APPENDER => AppenderOutput::File {
            path: resolve_file(appender, logs_dir)?,
            rolling: Some(RollingPolicy {
                max_file_size: appender.max_file_size.unwrap_or(DEFAULT_MAX_FILE_SIZE),
                max_backup_index: appender
                    .max_backup_index
                    .unwrap_or(DEFAULT_MAX_BACKUP_INDEX),
            }),
        },
        _ => bail!(
            "unsupported appender '{}' (expected ConsoleAppender, FileAppender or RollingFileAppender)",
            appender.class_name
        ),
    };

    let layout = match &appender.layout {
        Some(layout) => LayoutSpec::from_class(&layout.class_name, layout.pattern.as_deref())?,
        None => LayoutSpec::simple(),
    };

    let level = appender
        .threshold
        .map_or(root_level, |threshold| threshold.max(root_level));

    Ok(AppenderPlan {
        name: name.to_string(),
        output,
        layout,
        level,
    })
}

fn resolve_file(appender: &AppenderConfig, logs_dir: &Path) -> Result<PathBuf> {
    let Some(file) = appender.file.as_deref() else {
        bail!("{} requires a File", appender.class_name);
    };
    let path = Path::new(file);
    Ok(if path.is_absolute() {
        path.to_path_buf()
    } else {
        logs_dir.join(path)
    })
}
