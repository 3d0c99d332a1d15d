//! Logging setup for Mojave binaries.
//!
//! The `log4j` section of a configuration document is mapped onto a
//! `tracing-subscriber` registry with one `fmt` layer per root-logger
//! appender. Without a `log4j` section a single stderr layer is installed.

mod layout;
mod plan;
mod writer;

pub use layout::{parse_conversion_pattern, translate_date_pattern, LayoutSpec, Timestamp};
pub use plan::{
    plan_appenders, plan_appenders_in, AppenderOutput, AppenderPlan, DEFAULT_MAX_BACKUP_INDEX,
    DEFAULT_MAX_FILE_SIZE,
};
pub use writer::{RollingPolicy, SharedFileWriter};

use anyhow::{Context, Result};
use mojave_config::{Level, LoggingConfig};
use std::io::IsTerminal;
use std::path::PathBuf;
use tracing_subscriber::fmt::time::{ChronoLocal, Uptime};
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer, Registry};

const DEFAULT_LOG_FILTER: &str = "mojave=info,mojave_config=info,mojave_components=info";
const VERBOSE_LOG_FILTER: &str = "mojave=debug,mojave_config=debug,mojave_components=debug,mojave_logging=debug";

/// Logging configuration shared by Mojave binaries.
pub struct LogConfig<'a> {
    /// The loaded `log4j` section, if the document has one.
    pub logging: Option<&'a LoggingConfig>,
    /// Lower the root level to DEBUG.
    pub verbose: bool,
}

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync>;

/// Install the global tracing subscriber.
///
/// `RUST_LOG`, when set, replaces the level filter of every layer.
pub fn init_logging(config: LogConfig<'_>) -> Result<()> {
    let mut layers: Vec<BoxedLayer> = Vec::new();
    let mut unsupported = Vec::new();

    match config.logging {
        Some(logging) => {
            let mut logging = logging.clone();
            if config.verbose {
                logging.root_logger.level = Level::Debug;
            }
            for plan in plan_appenders(&logging)? {
                unsupported.extend(
                    plan.layout
                        .unsupported
                        .iter()
                        .map(|conversion| format!("{} in appender '{}'", conversion, plan.name)),
                );
                layers.push(appender_layer(&plan)?);
            }
        }
        None => {
            let default = if config.verbose {
                VERBOSE_LOG_FILTER
            } else {
                DEFAULT_LOG_FILTER
            };
            let filter =
                EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
            layers.push(
                tracing_subscriber::fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_filter(filter)
                    .boxed(),
            );
        }
    }

    let layer_count = layers.len();
    tracing_subscriber::registry()
        .with(layers)
        .try_init()
        .context("Failed to install tracing subscriber")?;

    tracing::debug!("Logging initialized with {} layer(s)", layer_count);
    for conversion in unsupported {
        tracing::warn!("Ignoring unsupported layout conversion {}", conversion);
    }
    Ok(())
}

fn appender_layer(plan: &AppenderPlan) -> Result<BoxedLayer> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(plan.level.as_str().to_ascii_lowercase()));

    Ok(match &plan.output {
        AppenderOutput::Stdout => {
            let ansi = std::io::stdout().is_terminal();
            fmt_layer(std::io::stdout, &plan.layout, ansi, filter)
        }
        AppenderOutput::Stderr => {
            let ansi = std::io::stderr().is_terminal();
            fmt_layer(std::io::stderr, &plan.layout, ansi, filter)
        }
        AppenderOutput::File { path, rolling } => {
            let writer = SharedFileWriter::open(path, *rolling)
                .with_context(|| format!("Failed to open log file {}", path.display()))?;
            fmt_layer(writer, &plan.layout, false, filter)
        }
    })
}

fn fmt_layer<W>(writer: W, layout: &LayoutSpec, ansi: bool, filter: EnvFilter) -> BoxedLayer
where
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    let layer = tracing_subscriber::fmt::layer()
        .with_writer(writer)
        .with_ansi(ansi)
        .with_thread_names(layout.thread_names)
        .with_level(layout.level)
        .with_target(layout.target)
        .with_file(layout.file)
        .with_line_number(layout.line_number);

    match &layout.timestamp {
        Timestamp::Local(format) => layer
            .with_timer(ChronoLocal::new(format.clone()))
            .with_filter(filter)
            .boxed(),
        Timestamp::Uptime => layer.with_timer(Uptime::default()).with_filter(filter).boxed(),
        Timestamp::None => layer.without_time().with_filter(filter).boxed(),
    }
}

/// Get the Mojave home directory: `$MOJAVE_HOME` or `~/.mojave`.
pub fn mojave_home() -> Result<PathBuf> {
    if let Ok(override_path) = std::env::var("MOJAVE_HOME") {
        return Ok(PathBuf::from(override_path));
    }
    dirs::home_dir()
        .map(|home| home.join(".mojave"))
        .context("Could not determine home directory; set MOJAVE_HOME")
}

/// Get the logs directory: `~/.mojave/logs`.
pub fn logs_dir() -> Result<PathBuf> {
    Ok(mojave_home()?.join("logs"))
}
