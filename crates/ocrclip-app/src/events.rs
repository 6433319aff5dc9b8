use ocrclip_io::ClipboardSink;
use ocrclip_types::AppEvent;

use crate::dispatcher::UiInbox;
use crate::status::{MSG_CANCELLED, MSG_ENGINE_READY, Notifier, OcrStatus};
use crate::worker::RecognitionWorker;

pub mod recognition;
pub mod trigger_capture;

use recognition::handle_recognition;
use trigger_capture::handle_capture_trigger;

/// State owned by the UI thread. Nothing else reads or writes it.
pub struct UiContext {
    worker: RecognitionWorker,
    clipboard: Box<dyn ClipboardSink>,
    notifier: Box<dyn Notifier>,
    status: OcrStatus,
    /// Leave the loop after the first capture settles
    exit_after_capture: bool,
}

impl UiContext {
    pub fn new(
        worker: RecognitionWorker,
        clipboard: Box<dyn ClipboardSink>,
        notifier: Box<dyn Notifier>,
    ) -> Self {
        Self {
            worker,
            clipboard,
            notifier,
            status: OcrStatus::default(),
            exit_after_capture: false,
        }
    }

    pub fn exit_after_capture(mut self, enabled: bool) -> Self {
        self.exit_after_capture = enabled;
        self
    }

    pub fn engine_ready(mut self, ready: bool) -> Self {
        self.status.engine_ready = ready;
        self
    }

    pub fn status(&self) -> &OcrStatus {
        &self.status
    }

    pub fn worker(&self) -> &RecognitionWorker {
        &self.worker
    }

    fn show(&mut self, message: impl Into<String>) {
        let message = message.into();
        self.notifier.notify(&message);
        self.status.set_message(message);
    }
}

#[derive(Debug, PartialEq, Eq)]
enum Flow {
    Continue,
    Exit,
}

/// UI thread main loop. Returns when asked to quit or when every event
/// source is gone.
pub fn ui_loop(inbox: &UiInbox, ctx: &mut UiContext) -> anyhow::Result<()> {
    tracing::info!("[UI] Event loop started");

    while let Some(event) = inbox.recv() {
        tracing::debug!("[UI] Event: {:?}", std::mem::discriminant(&event));

        if handle_event(ctx, event) == Flow::Exit {
            break;
        }
    }

    tracing::info!("[UI] Event loop finished");
    Ok(())
}

fn handle_event(ctx: &mut UiContext, event: AppEvent) -> Flow {
    let settles_capture = matches!(
        event,
        AppEvent::Recognition(_) | AppEvent::SelectionCancelled | AppEvent::CaptureAborted(_)
    );

    match event {
        AppEvent::Trigger(source) => handle_capture_trigger(ctx, source),
        AppEvent::Recognition(result) => handle_recognition(ctx, result),
        AppEvent::SelectionCancelled => {
            ctx.status.capturing = false;
            ctx.status.set_message(MSG_CANCELLED);
        }
        AppEvent::CaptureAborted(reason) => {
            ctx.status.record_capture();
            ctx.status.error_count += 1;
            ctx.show(format!("Capture failed: {reason}"));
        }
        AppEvent::EngineReady => {
            ctx.status.engine_ready = true;
            ctx.show(MSG_ENGINE_READY);
        }
        AppEvent::EngineFailed(reason) => {
            ctx.status.engine_ready = false;
            ctx.status.error_count += 1;
            ctx.show(format!("OCR engine unavailable: {reason}"));
        }
        AppEvent::Quit => {
            tracing::info!("Shutdown requested");
            return Flow::Exit;
        }
    }

    if settles_capture && ctx.exit_after_capture {
        Flow::Exit
    } else {
        Flow::Continue
    }
}
