//! Recognize an image file with the platform engine:
//! `cargo run -p ocrclip-ocr --bin ocr_file -- shot.png en,ja`

use anyhow::{Context, Result};
use ocrclip_ocr::{CapturedImage, EngineOptions, OcrEngine};

fn main() -> Result<()> {
    let mut args = std::env::args().skip(1);
    let path = args
        .next()
        .context("usage: ocr_file <image> [languages]")?;
    let languages = args
        .next()
        .map(|csv| csv.split(',').map(|l| l.trim().to_string()).collect())
        .unwrap_or_else(|| vec!["en".to_string()]);

    let options = EngineOptions {
        languages,
        gpu: false,
    };

    let bytes = std::fs::read(&path).with_context(|| format!("Failed to read {path}"))?;
    let image = CapturedImage::decode(&bytes)?;
    println!("{path}: {}x{}", image.width(), image.height());

    let engine = build_engine(&options)?;
    let start = std::time::Instant::now();
    let text = engine.recognize(&image)?;

    println!("{:?} - {} chars", start.elapsed(), text.chars().count());
    for line in text.lines() {
        println!("> {line}");
    }

    Ok(())
}

#[cfg(windows)]
fn build_engine(options: &EngineOptions) -> Result<Box<dyn OcrEngine>> {
    Ok(Box::new(ocrclip_ocr::WinRtEngine::new(options)?))
}

#[cfg(not(windows))]
fn build_engine(options: &EngineOptions) -> Result<Box<dyn OcrEngine>> {
    Ok(Box::new(ocrclip_ocr::TesseractEngine::new(options)?))
}
