use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::sync::atomic::{AtomicU8, AtomicUsize, Ordering};

use ocrclip_ocr::{CaptureSurface, OcrEngine, OcrError, RegionSelector};
use ocrclip_types::{AppEvent, CaptureRequest, RecognitionFailure, RecognitionResult, TriggerSource};

use crate::dispatcher::EventSender;

/// `Idle -> Running -> {Succeeded, Failed} -> Idle`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum WorkerPhase {
    Idle = 0,
    Running = 1,
    Succeeded = 2,
    Failed = 3,
}

impl WorkerPhase {
    fn from_u8(value: u8) -> Self {
        match value {
            1 => WorkerPhase::Running,
            2 => WorkerPhase::Succeeded,
            3 => WorkerPhase::Failed,
            _ => WorkerPhase::Idle,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum WorkerError {
    #[error("a capture is already in progress")]
    Busy,

    #[error("failed to start the OCR worker thread: {0}")]
    Spawn(#[from] std::io::Error),
}

/// Everything a capture job needs, shared between jobs
#[derive(Clone)]
pub struct Pipeline {
    pub selector: Arc<dyn RegionSelector>,
    pub surface: Arc<dyn CaptureSurface>,
    pub engine: Arc<dyn OcrEngine>,
}

/// Runs select, capture and OCR off the UI thread, one job at a time
pub struct RecognitionWorker {
    pipeline: Pipeline,
    events: EventSender,
    phase: Arc<AtomicU8>,
    jobs_started: AtomicUsize,
}

/// Moves the worker back to idle however the job ends
struct IdleGuard(Arc<AtomicU8>);

impl IdleGuard {
    fn finish(&self, phase: WorkerPhase) {
        tracing::debug!("Worker: Running -> {:?}", phase);
        self.0.store(phase as u8, Ordering::SeqCst);
    }
}

impl Drop for IdleGuard {
    fn drop(&mut self) {
        self.0.store(WorkerPhase::Idle as u8, Ordering::SeqCst);
        tracing::debug!("Worker: -> Idle");
    }
}

impl RecognitionWorker {
    pub fn new(pipeline: Pipeline, events: EventSender) -> Self {
        Self {
            pipeline,
            events,
            phase: Arc::new(AtomicU8::new(WorkerPhase::Idle as u8)),
            jobs_started: AtomicUsize::new(0),
        }
    }

    pub fn phase(&self) -> WorkerPhase {
        WorkerPhase::from_u8(self.phase.load(Ordering::SeqCst))
    }

    pub fn jobs_started(&self) -> usize {
        self.jobs_started.load(Ordering::SeqCst)
    }

    /// Start a capture job. Rejected unless the worker is idle.
    pub fn try_start(&self, source: TriggerSource) -> Result<(), WorkerError> {
        self.phase
            .compare_exchange(
                WorkerPhase::Idle as u8,
                WorkerPhase::Running as u8,
                Ordering::SeqCst,
                Ordering::SeqCst,
            )
            .map_err(|_| WorkerError::Busy)?;

        let guard = IdleGuard(self.phase.clone());
        let pipeline = self.pipeline.clone();
        let events = self.events.clone();

        std::thread::Builder::new()
            .name("ocr-worker".into())
            .spawn(move || {
                tracing::debug!("Worker: Idle -> Running ({})", source);
                let event = panic::catch_unwind(AssertUnwindSafe(|| run_job(&pipeline)))
                    .unwrap_or_else(|_| {
                        AppEvent::CaptureAborted("capture pipeline panicked".into())
                    });

                match &event {
                    AppEvent::Recognition(result) if result.outcome.is_ok() => {
                        guard.finish(WorkerPhase::Succeeded)
                    }
                    AppEvent::Recognition(_) | AppEvent::CaptureAborted(_) => {
                        guard.finish(WorkerPhase::Failed)
                    }
                    _ => {}
                }

                // idle before the UI sees the outcome
                drop(guard);
                events.send(event);
            })?;

        self.jobs_started.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

fn run_job(pipeline: &Pipeline) -> AppEvent {
    let region = match pipeline.selector.select() {
        Ok(Some(region)) => region,
        Ok(None) => {
            tracing::info!("Selection cancelled");
            return AppEvent::SelectionCancelled;
        }
        Err(e) => {
            tracing::error!("Region selection failed: {}", e);
            return AppEvent::CaptureAborted(e.to_string());
        }
    };

    let request = match CaptureRequest::new(region) {
        Ok(request) => request,
        Err(e) => {
            tracing::warn!("Ignoring capture: {}", e);
            return AppEvent::CaptureAborted(e.to_string());
        }
    };

    AppEvent::Recognition(recognize(pipeline, &request))
}

/// Capture and OCR one request. Always yields exactly one result.
pub fn recognize(pipeline: &Pipeline, request: &CaptureRequest) -> RecognitionResult {
    let id = request.id();
    tracing::debug!("Capturing {} for request {}", request.region(), id);

    let image = match pipeline.surface.capture(request) {
        Ok(image) => image,
        Err(e) => {
            tracing::error!("Screen capture failed: {}", e);
            return RecognitionResult::failure(id, RecognitionFailure::Capture(e.to_string()));
        }
    };

    let started = std::time::Instant::now();
    let outcome = panic::catch_unwind(AssertUnwindSafe(|| pipeline.engine.recognize(&image)));
    // the bitmap is not needed past inference
    drop(image);

    match outcome {
        Ok(Ok(text)) => {
            tracing::debug!(
                "Recognized {} chars in {:?}",
                text.chars().count(),
                started.elapsed()
            );
            RecognitionResult::success(id, text)
        }
        Ok(Err(e)) => {
            tracing::error!("OCR failed: {}", e);
            RecognitionResult::failure(id, failure_from(e))
        }
        Err(_) => {
            tracing::error!("OCR engine panicked");
            RecognitionResult::failure(id, RecognitionFailure::Panicked)
        }
    }
}

fn failure_from(error: OcrError) -> RecognitionFailure {
    match error {
        OcrError::NotReady => RecognitionFailure::EngineNotReady,
        OcrError::InitFailed(message) => RecognitionFailure::EngineUnavailable(message),
        e @ (OcrError::MissingProgram { .. } | OcrError::Unsupported(_)) => {
            RecognitionFailure::EngineUnavailable(e.to_string())
        }
        e @ (OcrError::Image(_) | OcrError::Engine(_)) => RecognitionFailure::Engine(e.to_string()),
    }
}
