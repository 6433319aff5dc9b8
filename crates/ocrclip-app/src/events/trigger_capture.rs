use ocrclip_types::TriggerSource;

use crate::events::UiContext;
use crate::status::{MSG_BUSY, MSG_CAPTURING};
use crate::worker::WorkerError;

pub fn handle_capture_trigger(ctx: &mut UiContext, source: TriggerSource) {
    tracing::info!(">>> [OCR] Capture triggered via {}", source);

    match ctx.worker.try_start(source) {
        Ok(()) => {
            ctx.status.capturing = true;
            ctx.status.set_message(MSG_CAPTURING);
        }
        Err(WorkerError::Busy) => {
            tracing::warn!(">>> [OCR] Rejected {} trigger: {}", source, WorkerError::Busy);
            ctx.status.rejected_count += 1;
            ctx.show(MSG_BUSY);
        }
        Err(e) => {
            tracing::error!(">>> [OCR] {}", e);
            ctx.status.record_error(e.to_string());
            ctx.notifier.notify(&e.to_string());
        }
    }
}
