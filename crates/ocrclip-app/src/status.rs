use std::time::SystemTime;

pub const MSG_CAPTURING: &str = "Select a region to capture";
pub const MSG_COPIED: &str = "Text copied to clipboard";
pub const MSG_NO_TEXT: &str = "No text detected";
pub const MSG_BUSY: &str = "Capture already in progress";
pub const MSG_CANCELLED: &str = "Capture cancelled";
pub const MSG_ENGINE_READY: &str = "OCR engine ready";

/// OCR status as seen by the UI thread
#[derive(Clone, Debug, Default)]
pub struct OcrStatus {
    pub capturing: bool,
    pub engine_ready: bool,
    pub last_capture_time: Option<SystemTime>,
    pub capture_count: u64,
    pub error_count: u64,
    pub rejected_count: u64,
    pub current_message: String,
}

impl OcrStatus {
    pub fn set_message(&mut self, message: impl Into<String>) {
        self.current_message = message.into();
    }

    /// A capture request reached a final state
    pub fn record_capture(&mut self) {
        self.capturing = false;
        self.capture_count += 1;
        self.last_capture_time = Some(SystemTime::now());
    }

    pub fn record_error(&mut self, message: impl Into<String>) {
        self.error_count += 1;
        self.set_message(message);
    }
}

/// User-facing notifications (balloon, toast, ...)
pub trait Notifier {
    fn notify(&mut self, message: &str);
}

/// Writes notifications to the log, which mirrors to the terminal when
/// there is one
#[derive(Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&mut self, message: &str) {
        tracing::info!(target: "ocrclip::notify", "OCR Clip: {}", message);
    }
}
