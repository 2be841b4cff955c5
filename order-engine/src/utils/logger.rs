//! Logging Infrastructure
//!
//! Console output (pretty or JSON) plus an optional daily rolling file.
//! `RUST_LOG` overrides the configured level.

use std::path::Path;

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Log file prefix inside the log directory
const LOG_FILE_PREFIX: &str = "order-engine";

/// Initialize the global subscriber
pub fn init_logger(level: &str, json: bool, log_dir: Option<&str>) -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(level))?;

    let (json_layer, text_layer) = if json {
        (Some(fmt::layer().json().with_target(false)), None)
    } else {
        (None, Some(fmt::layer().with_target(false)))
    };

    let file_layer = match log_dir {
        Some(dir) => {
            std::fs::create_dir_all(Path::new(dir))?;
            let appender = tracing_appender::rolling::daily(dir, LOG_FILE_PREFIX);
            Some(fmt::layer().with_ansi(false).with_writer(appender))
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(json_layer)
        .with(text_layer)
        .with(file_layer)
        .try_init()?;
    Ok(())
}
