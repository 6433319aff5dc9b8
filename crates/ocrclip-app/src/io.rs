use std::time::Duration;

use ocrclip_config::hotkey::HotkeyConfig;
use ocrclip_ocr::HotkeySource;
use ocrclip_types::{AppEvent, TriggerSource};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

use crate::dispatcher::EventSender;

const HOTKEY_POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Start polling the global capture hotkey.
///
/// `connect` performs the registration and is only ever called when the
/// hotkey is enabled. Returns whether a listener was started.
pub fn spawn_hotkey_listener<C>(
    tasks: &mut JoinSet<()>,
    config: &HotkeyConfig,
    connect: C,
    events: EventSender,
    cancel: CancellationToken,
) -> bool
where
    C: FnOnce(&str) -> anyhow::Result<Box<dyn HotkeySource>> + Send + 'static,
{
    if !config.is_active() {
        tracing::info!("Global hotkey disabled, use the tray trigger to capture");
        return false;
    }

    let spec = config.spec.clone();
    tasks.spawn_blocking(move || {
        let source = match connect(&spec) {
            Ok(source) => source,
            Err(e) => {
                tracing::error!("Failed to register OCR hotkey: {:#}", e);
                return;
            }
        };

        tracing::info!("OCR hotkey registered ({})", spec);

        while !cancel.is_cancelled() {
            if source.poll() {
                tracing::info!("OCR hotkey pressed");
                if !events.send(AppEvent::Trigger(TriggerSource::Hotkey)) {
                    break;
                }
            }

            std::thread::sleep(HOTKEY_POLL_INTERVAL);
        }

        tracing::info!("OCR hotkey listener stopping");
    });

    true
}

/// Actions the tray menu offers
#[derive(Clone)]
pub struct TrayTrigger {
    events: EventSender,
}

impl TrayTrigger {
    pub fn new(events: EventSender) -> Self {
        Self { events }
    }

    pub async fn snip(&self) -> bool {
        self.events
            .send_async(AppEvent::Trigger(TriggerSource::Tray))
            .await
    }

    pub async fn quit(&self) -> bool {
        self.events.send_async(AppEvent::Quit).await
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConsoleCommand {
    Snip,
    Quit,
    Help,
    Unknown(String),
}

pub fn parse_console_command(line: &str) -> ConsoleCommand {
    let line = line.trim();
    match line.to_ascii_lowercase().as_str() {
        "" | "s" | "snip" | "capture" => ConsoleCommand::Snip,
        "q" | "quit" | "exit" => ConsoleCommand::Quit,
        "h" | "help" | "?" => ConsoleCommand::Help,
        _ => ConsoleCommand::Unknown(line.to_string()),
    }
}

/// Terminal stand-in for the tray menu: Enter captures, `q` quits.
pub fn spawn_console_tray(
    tasks: &mut JoinSet<()>,
    tray: TrayTrigger,
    cancel: CancellationToken,
) -> bool {
    if !atty::is(atty::Stream::Stdin) {
        tracing::debug!("Stdin is not a terminal, console tray disabled");
        return false;
    }

    tasks.spawn(async move {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        tracing::info!("Press Enter to capture, 'q' to quit");

        loop {
            let line = tokio::select! {
                line = lines.next_line() => line,
                _ = cancel.cancelled() => break,
            };

            let line = match line {
                Ok(Some(line)) => line,
                Ok(None) => break,
                Err(e) => {
                    tracing::warn!("Console tray read failed: {}", e);
                    break;
                }
            };

            let delivered = match parse_console_command(&line) {
                ConsoleCommand::Snip => tray.snip().await,
                ConsoleCommand::Quit => tray.quit().await,
                ConsoleCommand::Help => {
                    tracing::info!("Commands: <Enter>/s capture, q quit");
                    true
                }
                ConsoleCommand::Unknown(command) => {
                    tracing::warn!("Unknown command '{}'", command);
                    true
                }
            };

            if !delivered {
                break;
            }
        }

        tracing::debug!("Console tray stopping");
    });

    true
}

/// Ctrl+C quits; on Unix SIGUSR1 triggers a capture.
pub fn spawn_signal_listeners(
    tasks: &mut JoinSet<()>,
    events: EventSender,
    cancel: CancellationToken,
) {
    let quit_events = events.clone();
    let quit_cancel = cancel.clone();
    tasks.spawn(async move {
        tokio::select! {
            result = tokio::signal::ctrl_c() => {
                match result {
                    Ok(()) => {
                        tracing::info!("Ctrl+C received");
                        quit_events.send_async(AppEvent::Quit).await;
                    }
                    Err(e) => tracing::error!("Failed to listen for Ctrl+C: {}", e),
                }
            }
            _ = quit_cancel.cancelled() => {}
        }
    });

    #[cfg(unix)]
    tasks.spawn(async move {
        use tokio::signal::unix::{SignalKind, signal};

        let mut usr1 = match signal(SignalKind::user_defined1()) {
            Ok(stream) => stream,
            Err(e) => {
                tracing::error!("Failed to listen for SIGUSR1: {}", e);
                return;
            }
        };

        loop {
            tokio::select! {
                received = usr1.recv() => {
                    if received.is_none() {
                        break;
                    }
                    tracing::info!("SIGUSR1 received");
                    if !events.send_async(AppEvent::Trigger(TriggerSource::Signal)).await {
                        break;
                    }
                }
                _ = cancel.cancelled() => break,
            }
        }
    });

    #[cfg(not(unix))]
    drop((events, cancel));
}
