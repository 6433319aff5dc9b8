//! Capture-to-clipboard flow with fake engines, surfaces and sinks

mod trigger_tests;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, mpsc};
use std::thread::ThreadId;
use std::time::Duration;

use ocrclip_io::{ClipboardError, ClipboardSink};
use ocrclip_ocr::{
    CaptureError, CaptureSurface, CapturedImage, FixedRegion, OcrEngine, OcrError, RegionSelector,
};
use ocrclip_types::{AppEvent, CaptureRegion, CaptureRequest};

use crate::dispatcher::UiInbox;
use crate::events::{UiContext, ui_loop};
use crate::status::{Notifier, OcrStatus};
use crate::worker::{Pipeline, RecognitionWorker, WorkerPhase};

pub const WAIT: Duration = Duration::from_secs(5);

pub struct FixedText(pub &'static str);

impl OcrEngine for FixedText {
    fn recognize(&self, _image: &CapturedImage) -> Result<String, OcrError> {
        Ok(self.0.to_string())
    }
}

pub struct FailingEngine;

impl OcrEngine for FailingEngine {
    fn recognize(&self, _image: &CapturedImage) -> Result<String, OcrError> {
        Err(OcrError::Engine("model exploded".into()))
    }
}

pub struct PanickingEngine;

impl OcrEngine for PanickingEngine {
    fn recognize(&self, _image: &CapturedImage) -> Result<String, OcrError> {
        panic!("inference crashed")
    }
}

/// Blocks inside `recognize` until released, counting concurrent calls
pub struct GatedEngine {
    gate: Mutex<mpsc::Receiver<()>>,
    active: AtomicUsize,
    pub max_active: AtomicUsize,
}

impl GatedEngine {
    pub fn new() -> (Arc<Self>, mpsc::Sender<()>) {
        let (tx, rx) = mpsc::channel();
        let engine = Arc::new(Self {
            gate: Mutex::new(rx),
            active: AtomicUsize::new(0),
            max_active: AtomicUsize::new(0),
        });
        (engine, tx)
    }
}

impl OcrEngine for GatedEngine {
    fn recognize(&self, _image: &CapturedImage) -> Result<String, OcrError> {
        let active = self.active.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_active.fetch_max(active, Ordering::SeqCst);

        let released = self.gate.lock().unwrap().recv_timeout(WAIT);
        self.active.fetch_sub(1, Ordering::SeqCst);

        released
            .map(|_| "gated".to_string())
            .map_err(|_| OcrError::Engine("gate never opened".into()))
    }
}

pub struct SolidSurface;

impl CaptureSurface for SolidSurface {
    fn name(&self) -> &str {
        "solid"
    }

    fn capture(&self, request: &CaptureRequest) -> Result<CapturedImage, CaptureError> {
        let r = request.region();
        Ok(CapturedImage::from_rgba(
            r.width,
            r.height,
            vec![255; (r.width * r.height * 4) as usize],
        )?)
    }
}

/// Selector standing in for a user pressing Escape
pub struct CancelledSelection;

impl RegionSelector for CancelledSelection {
    fn select(&self) -> Result<Option<CaptureRegion>, CaptureError> {
        Ok(None)
    }
}

#[derive(Clone, Default)]
pub struct RecordingClipboard {
    pub writes: Arc<Mutex<Vec<(String, ThreadId)>>>,
}

impl RecordingClipboard {
    pub fn texts(&self) -> Vec<String> {
        self.writes
            .lock()
            .unwrap()
            .iter()
            .map(|(text, _)| text.clone())
            .collect()
    }
}

impl ClipboardSink for RecordingClipboard {
    fn set_text(&mut self, text: &str) -> Result<(), ClipboardError> {
        self.writes
            .lock()
            .unwrap()
            .push((text.to_string(), std::thread::current().id()));
        Ok(())
    }
}

pub struct BrokenClipboard;

impl ClipboardSink for BrokenClipboard {
    fn set_text(&mut self, _text: &str) -> Result<(), ClipboardError> {
        Err(ClipboardError::Write(arboard::Error::ContentNotAvailable))
    }
}

pub struct ChannelNotifier(pub mpsc::Sender<String>);

impl Notifier for ChannelNotifier {
    fn notify(&mut self, message: &str) {
        let _ = self.0.send(message.to_string());
    }
}

pub fn pipeline(engine: Arc<dyn OcrEngine>) -> Pipeline {
    Pipeline {
        selector: Arc::new(FixedRegion(CaptureRegion::new(0, 0, 8, 4))),
        surface: Arc::new(SolidSurface),
        engine,
    }
}

/// What the UI thread saw once its loop returned
pub struct UiRun {
    pub status: OcrStatus,
    pub phase: WorkerPhase,
    pub jobs_started: usize,
    pub ui_thread: ThreadId,
}

/// Runs a UI loop on its own thread that quits after the first capture
/// settles. `events` are queued before the loop starts.
pub fn run_ui(
    pipeline: Pipeline,
    clipboard: Box<dyn ClipboardSink + Send>,
    notifier: mpsc::Sender<String>,
    events: Vec<AppEvent>,
) -> std::thread::JoinHandle<UiRun> {
    std::thread::Builder::new()
        .name("ui".into())
        .spawn(move || {
            let (inbox, sender) = UiInbox::new(16);
            for event in events {
                assert!(sender.send(event));
            }

            let worker = RecognitionWorker::new(pipeline, sender);
            let mut ctx = UiContext::new(worker, clipboard, Box::new(ChannelNotifier(notifier)))
                .exit_after_capture(true)
                .engine_ready(true);

            ui_loop(&inbox, &mut ctx).unwrap();

            UiRun {
                status: ctx.status().clone(),
                phase: ctx.worker().phase(),
                jobs_started: ctx.worker().jobs_started(),
                ui_thread: std::thread::current().id(),
            }
        })
        .unwrap()
}
