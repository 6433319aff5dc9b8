use std::sync::Arc;

use ocrclip_config::Config;
use ocrclip_config::capture::SelectorKind;
use ocrclip_config::ocr::EngineKind;
use ocrclip_ocr::{
    ChainSurface, CommandSelector, EngineOptions, FixedRegion, LazyEngine, OcrEngine, OcrError,
    PrimaryMonitor, RegionSelector, TesseractEngine,
};

use crate::preflight;
use crate::worker::Pipeline;

pub struct AppState {
    pub config: Config,
    pub engine: LazyEngine,
    pub selector: Arc<dyn RegionSelector>,
    pub surface: Arc<ChainSurface>,
}

impl AppState {
    /// Starts engine initialization in the background. `on_engine` is called
    /// from the init thread once it finishes.
    pub fn new<D>(config: Config, on_engine: D) -> Self
    where
        D: FnOnce(Result<(), String>) + Send + 'static,
    {
        let options = EngineOptions {
            languages: config.ocr.languages.clone(),
            gpu: config.ocr.gpu,
        };
        let kind = config.ocr.engine;
        let engine = LazyEngine::spawn(move || build_engine(kind, &options), on_engine);

        let selector = build_selector(&config);
        let surface = Arc::new(ChainSurface::platform_default());
        tracing::info!("Capture backends: {}", surface.names().join(", "));

        Self {
            config,
            engine,
            selector,
            surface,
        }
    }

    pub fn pipeline(&self) -> Pipeline {
        Pipeline {
            selector: self.selector.clone(),
            surface: self.surface.clone(),
            engine: Arc::new(self.engine.clone()),
        }
    }
}

fn build_engine(kind: EngineKind, options: &EngineOptions) -> Result<Box<dyn OcrEngine>, OcrError> {
    match kind {
        EngineKind::Tesseract => Ok(Box::new(TesseractEngine::new(options)?)),
        #[cfg(windows)]
        EngineKind::Auto | EngineKind::Winrt => {
            Ok(Box::new(ocrclip_ocr::WinRtEngine::new(options)?))
        }
        #[cfg(not(windows))]
        EngineKind::Auto => Ok(Box::new(TesseractEngine::new(options)?)),
        #[cfg(not(windows))]
        EngineKind::Winrt => Err(OcrError::Unsupported(
            "the winrt engine is only available on Windows".into(),
        )),
    }
}

fn build_selector(config: &Config) -> Arc<dyn RegionSelector> {
    let region = config.capture.region;

    match config.capture.selector {
        SelectorKind::Slurp => Arc::new(CommandSelector::slurp()),
        SelectorKind::Slop => Arc::new(CommandSelector::slop()),
        SelectorKind::Fullscreen => Arc::new(PrimaryMonitor),
        SelectorKind::Fixed => match region {
            Some(region) => Arc::new(FixedRegion(region)),
            None => {
                tracing::warn!("Fixed selector without a region, capturing the primary monitor");
                Arc::new(PrimaryMonitor)
            }
        },
        SelectorKind::Auto => auto_selector(region),
    }
}

fn auto_selector(region: Option<ocrclip_types::CaptureRegion>) -> Arc<dyn RegionSelector> {
    if preflight::is_wayland() {
        let slurp = CommandSelector::slurp();
        if slurp.is_available() {
            tracing::info!("Region selection: slurp");
            return Arc::new(slurp);
        }
    } else if cfg!(all(unix, not(target_os = "macos"))) {
        let slop = CommandSelector::slop();
        if slop.is_available() {
            tracing::info!("Region selection: slop");
            return Arc::new(slop);
        }
    }

    match region {
        Some(region) => {
            tracing::info!("Region selection: fixed {}", region);
            Arc::new(FixedRegion(region))
        }
        None => {
            tracing::info!("Region selection: primary monitor");
            Arc::new(PrimaryMonitor)
        }
    }
}
