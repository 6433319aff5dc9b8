use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, Condvar, Mutex, MutexGuard};
use std::time::{Duration, Instant};

use crate::bitmap::CapturedImage;
use crate::engine::{OcrEngine, OcrError};

enum InitState {
    Pending,
    Ready(Arc<dyn OcrEngine>),
    Failed(String),
}

struct Shared {
    state: Mutex<InitState>,
    changed: Condvar,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, InitState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn finish(&self, state: InitState) {
        *self.lock() = state;
        self.changed.notify_all();
    }
}

/// Engine that is built on a background thread.
///
/// Model loading can take seconds; until it is done `recognize` answers
/// [`OcrError::NotReady`] instead of blocking the caller.
#[derive(Clone)]
pub struct LazyEngine {
    shared: Arc<Shared>,
}

impl LazyEngine {
    /// Start building the engine. `on_done` runs on the init thread with the
    /// outcome once the engine is ready or has failed.
    pub fn spawn<F, D>(init: F, on_done: D) -> Self
    where
        F: FnOnce() -> Result<Box<dyn OcrEngine>, OcrError> + Send + 'static,
        D: FnOnce(Result<(), String>) + Send + 'static,
    {
        let shared = Arc::new(Shared {
            state: Mutex::new(InitState::Pending),
            changed: Condvar::new(),
        });

        let thread_shared = shared.clone();
        let spawned = std::thread::Builder::new()
            .name("ocr-init".into())
            .spawn(move || {
                tracing::info!("Initializing OCR engine in background...");
                let started = Instant::now();

                let outcome = panic::catch_unwind(AssertUnwindSafe(init)).unwrap_or_else(|_| {
                    Err(OcrError::Engine("engine initialization panicked".into()))
                });

                match outcome {
                    Ok(engine) => {
                        tracing::info!("OCR engine ready in {:?}", started.elapsed());
                        thread_shared.finish(InitState::Ready(Arc::from(engine)));
                        on_done(Ok(()));
                    }
                    Err(e) => {
                        tracing::error!("OCR engine initialization failed: {}", e);
                        let message = e.to_string();
                        thread_shared.finish(InitState::Failed(message.clone()));
                        on_done(Err(message));
                    }
                }
            });

        if let Err(e) = spawned {
            tracing::error!("Failed to start OCR init thread: {}", e);
            shared.finish(InitState::Failed(format!("init thread: {e}")));
        }

        Self { shared }
    }

    pub fn is_ready(&self) -> bool {
        matches!(*self.shared.lock(), InitState::Ready(_))
    }

    /// Block until initialization finished (either way) or `timeout` passes.
    /// Returns whether the engine is usable.
    pub fn wait_ready(&self, timeout: Duration) -> bool {
        let guard = self.shared.lock();
        let (guard, _) = self
            .shared
            .changed
            .wait_timeout_while(guard, timeout, |state| {
                matches!(state, InitState::Pending)
            })
            .unwrap_or_else(|e| e.into_inner());

        matches!(*guard, InitState::Ready(_))
    }
}

impl OcrEngine for LazyEngine {
    fn recognize(&self, image: &CapturedImage) -> Result<String, OcrError> {
        let engine = match &*self.shared.lock() {
            InitState::Pending => return Err(OcrError::NotReady),
            InitState::Failed(message) => return Err(OcrError::InitFailed(message.clone())),
            InitState::Ready(engine) => engine.clone(),
        };

        engine.recognize(image)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::mpsc;

    use super::*;

    struct Fixed(&'static str);

    impl OcrEngine for Fixed {
        fn recognize(&self, _image: &CapturedImage) -> Result<String, OcrError> {
            Ok(self.0.to_string())
        }
    }

    fn pixel() -> CapturedImage {
        CapturedImage::from_rgba(1, 1, vec![255; 4]).unwrap()
    }

    #[test]
    fn test_not_ready_until_init_finishes() {
        let (release_tx, release_rx) = mpsc::channel::<()>();
        let (done_tx, done_rx) = mpsc::channel();

        let engine = LazyEngine::spawn(
            move || {
                release_rx.recv().ok();
                Ok(Box::new(Fixed("HELLO")) as Box<dyn OcrEngine>)
            },
            move |outcome| {
                done_tx.send(outcome).ok();
            },
        );

        assert!(!engine.is_ready());
        assert_eq!(engine.recognize(&pixel()), Err(OcrError::NotReady));
        assert!(!engine.wait_ready(Duration::from_millis(20)));

        release_tx.send(()).unwrap();
        assert!(engine.wait_ready(Duration::from_secs(5)));
        assert_eq!(done_rx.recv_timeout(Duration::from_secs(5)), Ok(Ok(())));
        assert_eq!(engine.recognize(&pixel()), Ok("HELLO".to_string()));
    }

    #[test]
    fn test_failed_init_reports_unavailable() {
        let (done_tx, done_rx) = mpsc::channel();
        let engine = LazyEngine::spawn(
            || Err(OcrError::MissingProgram {
                program: "tesseract".into(),
            }),
            move |outcome| {
                done_tx.send(outcome).ok();
            },
        );

        assert!(!engine.wait_ready(Duration::from_secs(5)));
        let outcome = done_rx.recv_timeout(Duration::from_secs(5)).unwrap();
        assert_eq!(outcome, Err("tesseract not found on PATH".to_string()));
        assert_eq!(
            engine.recognize(&pixel()),
            Err(OcrError::InitFailed("tesseract not found on PATH".into()))
        );
    }

    #[test]
    fn test_panicking_init_settles_as_failed() {
        let (done_tx, done_rx) = mpsc::channel();
        let engine = LazyEngine::spawn(
            || panic!("model load crashed"),
            move |outcome| {
                done_tx.send(outcome).ok();
            },
        );

        let outcome = done_rx.recv_timeout(Duration::from_secs(5)).unwrap();
        assert!(outcome.is_err());

        let started = Instant::now();
        assert!(!engine.wait_ready(Duration::from_secs(5)));
        assert!(started.elapsed() < Duration::from_secs(1));
        assert!(matches!(
            engine.recognize(&pixel()),
            Err(OcrError::InitFailed(message)) if message.contains("panicked")
        ));
    }
}
