use ocrclip_config::Config;
use ocrclip_ocr::{HotkeyManager, HotkeySource};
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

use crate::dispatcher::EventSender;
use crate::io::{TrayTrigger, spawn_console_tray, spawn_hotkey_listener, spawn_signal_listeners};

/// Owns the trigger tasks and their shutdown
pub struct AppController {
    tasks: JoinSet<()>,
    cancel_token: CancellationToken,
}

impl AppController {
    pub fn new() -> Self {
        Self {
            tasks: JoinSet::new(),
            cancel_token: CancellationToken::new(),
        }
    }

    /// Must be called from inside the tokio runtime
    pub fn spawn_triggers(&mut self, config: &Config, events: &EventSender) {
        spawn_hotkey_listener(
            &mut self.tasks,
            &config.hotkey,
            connect_global_hotkey,
            events.clone(),
            self.cancel_token.child_token(),
        );

        spawn_console_tray(
            &mut self.tasks,
            TrayTrigger::new(events.clone()),
            self.cancel_token.child_token(),
        );

        spawn_signal_listeners(
            &mut self.tasks,
            events.clone(),
            self.cancel_token.child_token(),
        );

        tracing::debug!("Spawned {} trigger tasks", self.tasks.len());
    }

    pub fn shutdown(&mut self) {
        self.cancel_token.cancel();
        self.tasks.abort_all();
    }
}

impl Default for AppController {
    fn default() -> Self {
        Self::new()
    }
}

fn connect_global_hotkey(spec: &str) -> anyhow::Result<Box<dyn HotkeySource>> {
    Ok(Box::new(HotkeyManager::register(spec)?))
}
