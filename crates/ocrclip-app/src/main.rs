use std::time::Duration;

use clap::Parser;
use ocrclip_app::cli::Args;
use ocrclip_app::controller::AppController;
use ocrclip_app::dispatcher::UiInbox;
use ocrclip_app::events::{UiContext, ui_loop};
use ocrclip_app::logging::{self, LogSettings, LogTarget};
use ocrclip_app::preflight;
use ocrclip_app::state::AppState;
use ocrclip_app::status::LogNotifier;
use ocrclip_app::worker::RecognitionWorker;
use ocrclip_io::SystemClipboard;
use ocrclip_types::{AppEvent, TriggerSource};

const INBOX_CAPACITY: usize = 16;

fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let args = Args::parse();
    let (config, warnings) = args.load_config()?;

    let settings = LogSettings::from_config(&config);
    // flushes buffered log lines on drop
    let log_guard = logging::init(&settings);
    if let LogTarget::File(path) = &log_guard.target {
        tracing::info!("Logging to {}", path.display());
    }
    for warning in &warnings {
        tracing::warn!("{}", warning);
    }
    logging::install_panic_hook();

    tracing::info!("ocrclip {} starting", env!("CARGO_PKG_VERSION"));
    preflight::run(&config);

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .thread_name("ocrclip-rt")
        .build()?;
    let guard = runtime.enter();

    // this thread owns the UI state from here on
    let (inbox, events) = UiInbox::new(INBOX_CAPACITY);

    let engine_events = events.clone();
    let state = AppState::new(config, move |outcome| {
        let event = match outcome {
            Ok(()) => AppEvent::EngineReady,
            Err(message) => AppEvent::EngineFailed(message),
        };
        engine_events.send(event);
    });

    if state.config.ocr.wait_for_engine {
        let timeout = Duration::from_secs(state.config.ocr.wait_seconds);
        tracing::info!("Waiting up to {:?} for the OCR engine", timeout);
        if !state.engine.wait_ready(timeout) {
            tracing::warn!("OCR engine not ready, continuing without it");
        }
    }

    let mut controller = AppController::new();
    controller.spawn_triggers(&state.config, &events);

    if args.once {
        events.send(AppEvent::Trigger(TriggerSource::Startup));
    }

    let worker = RecognitionWorker::new(state.pipeline(), events);
    let mut ctx = UiContext::new(
        worker,
        Box::new(SystemClipboard::new()),
        Box::new(LogNotifier),
    )
    .exit_after_capture(args.once)
    .engine_ready(state.engine.is_ready());

    let result = ui_loop(&inbox, &mut ctx);

    let status = ctx.status();
    tracing::info!(
        "Captures: {}, errors: {}, rejected: {}",
        status.capture_count,
        status.error_count,
        status.rejected_count
    );

    controller.shutdown();
    drop(guard);
    runtime.shutdown_timeout(Duration::from_millis(500));

    result
}
