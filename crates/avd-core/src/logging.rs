//! Logging init for the service: a log file under the XDG state dir, with a
//! stderr fallback when the file cannot be opened.

use anyhow::Result;
use std::fs::{self, File};
use std::io;
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::EnvFilter;

/// Per-event writer: a clone of the shared log file handle, or stderr when
/// cloning fails.
enum LogSink {
    File(File),
    Stderr,
}

impl io::Write for LogSink {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            LogSink::File(f) => f.write(buf),
            LogSink::Stderr => io::stderr().lock().write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            LogSink::File(f) => f.flush(),
            LogSink::Stderr => io::stderr().lock().flush(),
        }
    }
}

struct FileMakeWriter(File);

impl<'a> MakeWriter<'a> for FileMakeWriter {
    type Writer = LogSink;

    fn make_writer(&'a self) -> Self::Writer {
        self.0
            .try_clone()
            .map(LogSink::File)
            .unwrap_or(LogSink::Stderr)
    }
}

fn init_subscriber(writer: BoxMakeWriter) {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,avd=debug"));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(writer)
        .with_ansi(false)
        .init();
}

/// Initialize structured logging to `~/.local/state/avd/avd.log`.
/// Returns Err when the state dir or log file is unavailable, so the caller
/// can fall back to [`init_logging_stderr`].
pub fn init_logging() -> Result<()> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("avd")?;
    let log_dir = xdg_dirs.get_state_home();
    fs::create_dir_all(&log_dir)?;

    let log_file_path = log_dir.join("avd.log");
    let file = fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_file_path)?;

    init_subscriber(BoxMakeWriter::new(FileMakeWriter(file)));
    tracing::info!("avd logging initialized at {}", log_file_path.display());
    Ok(())
}

/// Initialize logging to stderr only, for when the log file cannot be opened.
pub fn init_logging_stderr() {
    init_subscriber(BoxMakeWriter::new(io::stderr));
}
