use rusty_tesseract::{Args, Image, TessError};

use crate::bitmap::CapturedImage;
use crate::engine::{EngineOptions, OcrEngine, OcrError, normalize_text};
use crate::which::find_program;

const PROGRAM: &str = "tesseract";

/// OCR through the `tesseract` command line tool
pub struct TesseractEngine {
    args: Args,
}

impl TesseractEngine {
    pub fn new(options: &EngineOptions) -> Result<Self, OcrError> {
        let program = find_program(PROGRAM).ok_or_else(|| OcrError::MissingProgram {
            program: PROGRAM.to_string(),
        })?;

        if options.gpu {
            tracing::info!("tesseract runs on the CPU, GPU preference ignored");
        }

        let args = Args {
            lang: tesseract_languages(&options.languages),
            ..Args::default()
        };
        tracing::debug!("tesseract at {} with languages {}", program.display(), args.lang);

        Ok(Self { args })
    }

    pub fn languages(&self) -> &str {
        &self.args.lang
    }
}

impl OcrEngine for TesseractEngine {
    fn recognize(&self, image: &CapturedImage) -> Result<String, OcrError> {
        let dynamic = image.to_dynamic_image()?;
        let input = Image::from_dynamic_image(&dynamic).map_err(engine_error)?;

        let text = rusty_tesseract::image_to_string(&input, &self.args).map_err(engine_error)?;
        Ok(normalize_text(&text))
    }
}

/// Keeps tesseract's own diagnostics, which the exit status error only
/// carries in its second field
fn engine_error(error: TessError) -> OcrError {
    match error {
        TessError::TesseractNotFoundError => OcrError::MissingProgram {
            program: PROGRAM.to_string(),
        },
        TessError::CommandExitStatusError(status, stderr) => OcrError::Engine(format!(
            "tesseract exited with {}: {}",
            status.trim(),
            stderr.trim()
        )),
        other => OcrError::Engine(other.to_string()),
    }
}

/// Map short language codes to tesseract traineddata names, joined with `+`.
/// Unknown codes pass through untouched.
pub fn tesseract_languages(codes: &[String]) -> String {
    let mapped: Vec<&str> = codes
        .iter()
        .map(|code| match code.to_ascii_lowercase().as_str() {
            "en" => "eng",
            "ja" => "jpn",
            "de" => "deu",
            "fr" => "fra",
            "es" => "spa",
            "it" => "ita",
            "pt" => "por",
            "nl" => "nld",
            "pl" => "pol",
            "ru" => "rus",
            "uk" => "ukr",
            "tr" => "tur",
            "ar" => "ara",
            "hi" => "hin",
            "ko" => "kor",
            "vi" => "vie",
            "th" => "tha",
            "zh" | "ch_sim" => "chi_sim",
            "ch_tra" => "chi_tra",
            _ => code.as_str(),
        })
        .collect();

    if mapped.is_empty() {
        "eng".to_string()
    } else {
        mapped.join("+")
    }
}
