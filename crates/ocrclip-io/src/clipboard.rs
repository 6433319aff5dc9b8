use arboard::Clipboard;

#[derive(Debug, thiserror::Error)]
pub enum ClipboardError {
    #[error("clipboard unavailable: {0}")]
    Unavailable(#[source] arboard::Error),

    #[error("clipboard write failed: {0}")]
    Write(#[source] arboard::Error),
}

/// Destination for recognized text
pub trait ClipboardSink {
    fn set_text(&mut self, text: &str) -> Result<(), ClipboardError>;
}

/// The OS clipboard.
///
/// On X11 and Wayland the selection is served by this process, so the value
/// has to outlive every write; keep it alive on the UI thread for the whole run.
pub struct SystemClipboard {
    clipboard: Option<Clipboard>,
}

impl SystemClipboard {
    /// Connects lazily: a missing clipboard at startup is retried on the
    /// next write instead of failing the app
    pub fn new() -> Self {
        let clipboard = match Clipboard::new() {
            Ok(clipboard) => Some(clipboard),
            Err(e) => {
                tracing::warn!("Clipboard not available yet: {}", e);
                None
            }
        };
        Self { clipboard }
    }

    fn connect(&mut self) -> Result<&mut Clipboard, ClipboardError> {
        if self.clipboard.is_none() {
            self.clipboard = Some(Clipboard::new().map_err(ClipboardError::Unavailable)?);
        }

        self.clipboard
            .as_mut()
            .ok_or(ClipboardError::Unavailable(arboard::Error::ClipboardNotSupported))
    }
}

impl Default for SystemClipboard {
    fn default() -> Self {
        Self::new()
    }
}

impl ClipboardSink for SystemClipboard {
    fn set_text(&mut self, text: &str) -> Result<(), ClipboardError> {
        let result = self.connect()?.set_text(text);

        if let Err(e) = result {
            // the connection may have gone stale, reconnect next time
            self.clipboard = None;
            return Err(ClipboardError::Write(e));
        }

        tracing::debug!("Clipboard set ({} chars)", text.chars().count());
        Ok(())
    }
}
