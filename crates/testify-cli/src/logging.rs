// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

//! Tracing setup. The interactive UI owns the terminal, so sessions log to a
//! file; one-shot commands (`--check`, `--search`) log to stderr.

use anyhow::{Context, Result, anyhow};
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use tracing::Level;
use tracing_subscriber::{
    EnvFilter,
    fmt::{self, MakeWriter},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

const CRATES: [&str; 3] = ["testify", "testify_app", "testify_tui"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogConfig {
    pub level: Level,
    pub with_ansi: bool,
    pub format: LogFormat,
    /// Written to stderr when unset.
    pub log_file: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    #[default]
    Pretty,
    Compact,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: Level::INFO,
            with_ansi: true,
            format: LogFormat::default(),
            log_file: None,
        }
    }
}

impl LogConfig {
    /// `-v` raises the configured level one step, `-vv` goes to trace.
    #[must_use]
    pub fn from_verbosity(base: Level, verbosity: u8) -> Self {
        let level = match verbosity {
            0 => base,
            1 if base == Level::ERROR => Level::WARN,
            1 if base == Level::WARN => Level::INFO,
            1 if base == Level::INFO => Level::DEBUG,
            _ => Level::TRACE,
        };
        Self {
            level,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_log_file(mut self, path: Option<PathBuf>) -> Self {
        self.with_ansi = path.is_none();
        self.format = if path.is_some() {
            LogFormat::Compact
        } else {
            LogFormat::Pretty
        };
        self.log_file = path;
        self
    }
}

pub fn init_logging(config: &LogConfig) -> Result<()> {
    if let Some(path) = &config.log_file {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)
                .with_context(|| format!("create log directory {}", parent.display()))?;
        }
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .with_context(|| format!("open log file {}", path.display()))?;
        init_with_writer(config, SharedFileWriter::new(file))
    } else {
        init_with_writer(config, io::stderr)
    }
}

fn init_with_writer<W>(config: &LogConfig, writer: W) -> Result<()>
where
    W: for<'writer> MakeWriter<'writer> + Send + Sync + 'static,
{
    let filter = build_env_filter(config.level);
    let result = match config.format {
        LogFormat::Compact => tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .compact()
                    .with_writer(writer)
                    .with_ansi(config.with_ansi),
            )
            .try_init(),
        LogFormat::Pretty => tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_writer(writer)
                    .with_ansi(config.with_ansi)
                    .with_target(false)
                    .without_time(),
            )
            .try_init(),
    };
    result.map_err(|error| anyhow!("install tracing subscriber: {error}"))
}

#[derive(Clone)]
struct SharedFileWriter {
    file: Arc<Mutex<fs::File>>,
}

impl SharedFileWriter {
    fn new(file: fs::File) -> Self {
        Self {
            file: Arc::new(Mutex::new(file)),
        }
    }
}

struct SharedFileGuard {
    file: Arc<Mutex<fs::File>>,
}

impl Write for SharedFileGuard {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let mut guard = self
            .file
            .lock()
            .map_err(|_| io::Error::other("log file lock poisoned"))?;
        guard.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        let mut guard = self
            .file
            .lock()
            .map_err(|_| io::Error::other("log file lock poisoned"))?;
        guard.flush()
    }
}

impl<'a> MakeWriter<'a> for SharedFileWriter {
    type Writer = SharedFileGuard;

    fn make_writer(&'a self) -> Self::Writer {
        SharedFileGuard {
            file: Arc::clone(&self.file),
        }
    }
}

/// `RUST_LOG` wins over the configured level. Other crates stay at warn.
fn build_env_filter(level: Level) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directives(level)))
}

fn default_directives(level: Level) -> String {
    let level = level.as_str().to_lowercase();
    let mut directives = vec!["warn".to_owned()];
    directives.extend(CRATES.iter().map(|name| format!("{name}={level}")));
    directives.join(",")
}

#[cfg(test)]
mod tests {
    use super::{LogConfig, LogFormat, SharedFileWriter, default_directives};
    use anyhow::Result;
    use std::io::Write;
    use std::path::PathBuf;
    use tracing::Level;
    use tracing_subscriber::fmt::MakeWriter;

    #[test]
    fn verbosity_raises_the_base_level() {
        assert_eq!(LogConfig::from_verbosity(Level::INFO, 0).level, Level::INFO);
        assert_eq!(LogConfig::from_verbosity(Level::INFO, 1).level, Level::DEBUG);
        assert_eq!(LogConfig::from_verbosity(Level::WARN, 1).level, Level::INFO);
        assert_eq!(LogConfig::from_verbosity(Level::INFO, 2).level, Level::TRACE);
        assert_eq!(LogConfig::from_verbosity(Level::ERROR, 5).level, Level::TRACE);
    }

    #[test]
    fn file_output_drops_ansi_and_goes_compact() {
        let config = LogConfig::default().with_log_file(Some(PathBuf::from("/tmp/t.log")));
        assert!(!config.with_ansi);
        assert_eq!(config.format, LogFormat::Compact);

        let stderr = LogConfig::default().with_log_file(None);
        assert!(stderr.with_ansi);
        assert_eq!(stderr.format, LogFormat::Pretty);
    }

    #[test]
    fn directives_cover_every_workspace_crate() {
        assert_eq!(
            default_directives(Level::DEBUG),
            "warn,testify=debug,testify_app=debug,testify_tui=debug"
        );
    }

    #[test]
    fn shared_writer_appends_to_the_file() -> Result<()> {
        let temp = tempfile::tempdir()?;
        let path = temp.path().join("out.log");
        let file = std::fs::File::create(&path)?;
        let writer = SharedFileWriter::new(file);

        writer.make_writer().write_all(b"first\n")?;
        let mut second = writer.make_writer();
        second.write_all(b"second\n")?;
        second.flush()?;

        assert_eq!(std::fs::read_to_string(&path)?, "first\nsecond\n");
        Ok(())
    }
}
