use anyhow::{Context, Result};
use windows::{
    Globalization::Language,
    Graphics::Imaging::BitmapDecoder,
    Media::Ocr::OcrEngine as WinOcrEngine,
    Storage::Streams::{DataWriter, InMemoryRandomAccessStream},
    Win32::System::Com::{COINIT_MULTITHREADED, CoInitializeEx, CoUninitialize},
    core::HSTRING,
};

use crate::bitmap::CapturedImage;
use crate::engine::{EngineOptions, OcrEngine, OcrError, normalize_text};

/// Run `f` with the calling thread joined to the multithreaded COM
/// apartment. Init and worker threads are short-lived, so every WinRT call
/// brackets its own COM lifetime.
fn with_com<T>(
    on_error: impl FnOnce(String) -> OcrError,
    f: impl FnOnce() -> Result<T, OcrError>,
) -> Result<T, OcrError> {
    // SAFETY: balanced by CoUninitialize below, on the same thread
    let joined = unsafe { CoInitializeEx(None, COINIT_MULTITHREADED) };
    if let Err(e) = joined.ok() {
        return Err(on_error(format!("COM initialization failed: {e}")));
    }

    let result = f();

    // SAFETY: CoInitializeEx succeeded above
    unsafe { CoUninitialize() };
    result
}

/// Windows.Media.Ocr backend
///
/// The recognizer handles one language at a time; the first requested
/// language Windows has a recognizer for wins, then the user profile
/// languages.
pub struct WinRtEngine {
    engine: WinOcrEngine,
}

impl WinRtEngine {
    pub fn new(options: &EngineOptions) -> Result<Self, OcrError> {
        with_com(OcrError::InitFailed, || {
            if options.gpu {
                tracing::debug!("Windows.Media.Ocr picks its own device, GPU preference ignored");
            }

            for code in &options.languages {
                match create_for_language(code) {
                    Ok(engine) => {
                        tracing::info!("Windows OCR recognizer created for '{}'", code);
                        return Ok(Self { engine });
                    }
                    Err(e) => tracing::warn!("No Windows OCR recognizer for '{}': {:#}", code, e),
                }
            }

            let engine = WinOcrEngine::TryCreateFromUserProfileLanguages().map_err(|e| {
                OcrError::Unsupported(format!("no Windows OCR language pack installed: {e}"))
            })?;
            tracing::info!("Falling back to user profile OCR languages");

            Ok(Self { engine })
        })
    }

    fn recognize_png(&self, png: &[u8]) -> Result<String> {
        let stream = InMemoryRandomAccessStream::new().context("Failed to create stream")?;
        let writer = DataWriter::CreateDataWriter(&stream).context("Failed to create writer")?;

        writer.WriteBytes(png).context("Failed to write image bytes")?;
        writer
            .StoreAsync()
            .context("Failed to store async")?
            .get()
            .context("Failed to store data")?;
        writer.FlushAsync().context("Failed to flush")?.get()?;

        stream.Seek(0).context("Failed to seek")?;

        let decoder = BitmapDecoder::CreateAsync(&stream)
            .context("Failed to create decoder async")?
            .get()
            .context("Failed to get decoder")?;

        let bitmap = decoder
            .GetSoftwareBitmapAsync()
            .context("Failed to get bitmap async")?
            .get()
            .context("Failed to get software bitmap")?;

        let result = self
            .engine
            .RecognizeAsync(&bitmap)
            .context("Failed to recognize async")?
            .get()
            .context("Failed to get OCR result")?;

        let mut lines = Vec::new();
        for line in result.Lines().context("Failed to get lines")? {
            lines.push(line.Text().context("Failed to get line text")?.to_string());
        }

        Ok(lines.join("\n"))
    }
}

fn create_for_language(code: &str) -> Result<WinOcrEngine> {
    let language =
        Language::CreateLanguage(&HSTRING::from(code)).context("Failed to create language")?;

    WinOcrEngine::TryCreateFromLanguage(&language)
        .context("Failed to create OCR engine for language")
}

impl OcrEngine for WinRtEngine {
    fn recognize(&self, image: &CapturedImage) -> Result<String, OcrError> {
        let max = WinOcrEngine::MaxImageDimension().unwrap_or(u32::MAX);
        if image.width() > max || image.height() > max {
            return Err(OcrError::Engine(format!(
                "image {}x{} exceeds the {}px recognizer limit",
                image.width(),
                image.height(),
                max
            )));
        }

        let png = image.encode_png()?;

        with_com(OcrError::Engine, || {
            self.recognize_png(&png)
                .map(|text| normalize_text(&text))
                .map_err(|e| OcrError::Engine(format!("{e:#}")))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_com_can_be_joined_repeatedly() {
        assert_eq!(with_com(OcrError::Engine, || Ok(1)), Ok(1));
        assert_eq!(
            with_com(OcrError::Engine, || with_com(OcrError::Engine, || Ok(2))),
            Ok(2)
        );
    }

    #[test]
    fn test_com_passes_through_errors() {
        let result: Result<(), OcrError> =
            with_com(OcrError::Engine, || Err(OcrError::NotReady));
        assert_eq!(result, Err(OcrError::NotReady));
    }
}
