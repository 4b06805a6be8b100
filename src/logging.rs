use std::fs::File;
use std::io;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Environment variable naming the log file.
pub const LOG_ENV: &str = "ANSITERM_LOG";

/// Initialize tracing with optional file output.
///
/// Logging is disabled by default: stdout belongs to the terminal.
/// Set `ANSITERM_LOG` to a file path to enable it; `RUST_LOG` picks the filter.
/// Fails when the log file cannot be created.
pub fn init_tracing() -> io::Result<()> {
    let Some(log_path) = std::env::var(LOG_ENV).ok() else {
        return Ok(());
    };

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let file = open_log_file(&log_path)?;

    let file_layer = fmt::layer()
        .with_writer(file)
        .with_ansi(false)
        .with_target(true)
        .with_level(true);

    tracing_subscriber::registry()
        .with(filter)
        .with(file_layer)
        .init();
    Ok(())
}

fn open_log_file(path: &str) -> io::Result<File> {
    File::create(path).map_err(|err| {
        io::Error::new(err.kind(), format!("failed to create log file {path}: {err}"))
    })
}
