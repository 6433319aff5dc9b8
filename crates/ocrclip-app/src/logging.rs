use std::path::{Path, PathBuf};

use anyhow::Context;
use ocrclip_config::Config;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, fmt};

/// Everything the log initialiser needs, resolved up front
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogSettings {
    pub path: PathBuf,
    pub level: String,
    /// Mirror output to stderr
    pub console: bool,
}

impl LogSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            path: config.log.path.clone(),
            level: config.log.level.clone(),
            console: atty::is(atty::Stream::Stderr),
        }
    }
}

/// Where log lines ended up
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogTarget {
    File(PathBuf),
    Stderr,
}

/// Keeps the background log writer alive; buffered lines are flushed when
/// it is dropped
pub struct LogGuard {
    pub target: LogTarget,
    _worker: Option<WorkerGuard>,
}

/// Appender writing exactly `path`, never rotated
fn file_appender(path: &Path) -> anyhow::Result<RollingFileAppender> {
    let file_name = path
        .file_name()
        .with_context(|| format!("log path {} has no file name", path.display()))?;
    let directory = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));

    RollingFileAppender::builder()
        .rotation(Rotation::NEVER)
        .filename_prefix(file_name.to_string_lossy())
        .build(directory)
        .with_context(|| format!("failed to open {}", path.display()))
}

fn env_filter(level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .unwrap_or_else(|_| EnvFilter::new("debug"))
}

/// Install the global subscriber. Only the first call has an effect; hold
/// the returned guard until exit.
pub fn init(settings: &LogSettings) -> LogGuard {
    let filter = env_filter(&settings.level);

    match file_appender(&settings.path) {
        Ok(appender) => {
            let (writer, worker) = tracing_appender::non_blocking(appender);

            let file_layer = fmt::layer()
                .with_writer(writer)
                .with_ansi(false)
                .with_thread_names(true);

            let console_layer = settings.console.then(|| {
                fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_target(false)
                    .with_filter(EnvFilter::new("info"))
            });

            let _ = tracing_subscriber::registry()
                .with(filter)
                .with(file_layer)
                .with(console_layer)
                .try_init();

            LogGuard {
                target: LogTarget::File(settings.path.clone()),
                _worker: Some(worker),
            }
        }
        Err(e) => {
            let _ = tracing_subscriber::registry()
                .with(filter)
                .with(fmt::layer().with_writer(std::io::stderr))
                .try_init();

            tracing::warn!("{:#}, logging to stderr", e);
            LogGuard {
                target: LogTarget::Stderr,
                _worker: None,
            }
        }
    }
}

/// Log panics from any thread before the default hook prints them
pub fn install_panic_hook() {
    let default_hook = std::panic::take_hook();

    std::panic::set_hook(Box::new(move |info| {
        let thread = std::thread::current();
        let name = thread.name().unwrap_or("<unnamed>");
        let location = info
            .location()
            .map(|l| format!("{}:{}", l.file(), l.line()))
            .unwrap_or_else(|| "unknown location".to_string());
        let message = info
            .payload()
            .downcast_ref::<&str>()
            .map(|s| s.to_string())
            .or_else(|| info.payload().downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "non-string panic payload".to_string());

        tracing::error!("Thread '{}' panicked at {}: {}", name, location, message);
        default_hook(info);
    }));
}
