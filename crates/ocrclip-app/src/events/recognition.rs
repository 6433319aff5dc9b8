use ocrclip_types::RecognitionResult;

use crate::events::UiContext;
use crate::status::{MSG_COPIED, MSG_NO_TEXT};

/// Apply a finished recognition. Runs on the UI thread only.
///
/// Text without visible characters leaves the clipboard as it was.
pub fn handle_recognition(ctx: &mut UiContext, result: RecognitionResult) {
    ctx.status.record_capture();

    if let Err(failure) = &result.outcome {
        tracing::error!(">>> [OCR] Request {} failed: {}", result.request_id, failure);
        ctx.status.error_count += 1;
        ctx.show(format!("Failed: {failure}"));
        return;
    }

    let Some(text) = result.clipboard_text() else {
        tracing::info!(">>> [OCR] Request {}: no text found", result.request_id);
        ctx.show(MSG_NO_TEXT);
        return;
    };

    tracing::debug!(">>> [OCR] Got text: {} chars", text.chars().count());

    match ctx.clipboard.set_text(text) {
        Ok(()) => ctx.show(MSG_COPIED),
        Err(e) => {
            tracing::error!("Failed to set clipboard: {}", e);
            ctx.status.error_count += 1;
            ctx.show(format!("Failed: {e}"));
        }
    }
}
