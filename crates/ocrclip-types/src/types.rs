use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone)]
pub enum AppEvent {
    /// A capture was requested by one of the trigger sources
    Trigger(TriggerSource),
    /// The worker finished a capture request
    Recognition(RecognitionResult),
    /// The user dismissed the region selection, no request was created
    SelectionCancelled,
    /// Selection or request setup failed before a request existed
    CaptureAborted(String),
    EngineReady,
    EngineFailed(String),
    Quit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerSource {
    Hotkey,
    Tray,
    Signal,
    Startup,
}

impl fmt::Display for TriggerSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TriggerSource::Hotkey => "hotkey",
            TriggerSource::Tray => "tray",
            TriggerSource::Signal => "signal",
            TriggerSource::Startup => "startup",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaptureRegion {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl CaptureRegion {
    pub fn new(x: i32, y: i32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Convert logical coordinates to device pixels.
    ///
    /// Non-positive or non-finite factors are treated as 1.0. Returns `None`
    /// when the scaled region has no area.
    pub fn scaled(&self, factor: f64) -> Option<CaptureRegion> {
        let factor = if factor.is_finite() && factor > 0.0 {
            factor
        } else {
            1.0
        };

        let region = CaptureRegion {
            x: (self.x as f64 * factor) as i32,
            y: (self.y as f64 * factor) as i32,
            width: (self.width as f64 * factor) as u32,
            height: (self.height as f64 * factor) as u32,
        };

        (!region.is_empty()).then_some(region)
    }
}

impl fmt::Display for CaptureRegion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{} {}x{}", self.x, self.y, self.width, self.height)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid region '{0}', expected x,y,width,height")]
pub struct RegionParseError(pub String);

impl FromStr for CaptureRegion {
    type Err = RegionParseError;

    /// Parses `x,y,width,height`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || RegionParseError(s.to_string());
        let parts: Vec<&str> = s.split(',').map(str::trim).collect();
        let [x, y, width, height] = parts.as_slice() else {
            return Err(err());
        };

        Ok(CaptureRegion {
            x: x.parse().map_err(|_| err())?,
            y: y.parse().map_err(|_| err())?,
            width: width.parse().map_err(|_| err())?,
            height: height.parse().map_err(|_| err())?,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("capture region {0} has zero area")]
pub struct EmptyRegion(pub CaptureRegion);

/// A completed selection waiting to be captured
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CaptureRequest {
    id: Uuid,
    region: CaptureRegion,
}

impl CaptureRequest {
    pub fn new(region: CaptureRegion) -> Result<Self, EmptyRegion> {
        if region.is_empty() {
            return Err(EmptyRegion(region));
        }

        Ok(Self {
            id: Uuid::new_v4(),
            region,
        })
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn region(&self) -> CaptureRegion {
        self.region
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RecognitionFailure {
    #[error("screen capture failed: {0}")]
    Capture(String),

    #[error("OCR failed: {0}")]
    Engine(String),

    #[error("OCR engine is still initializing, try again shortly")]
    EngineNotReady,

    #[error("OCR engine unavailable: {0}")]
    EngineUnavailable(String),

    #[error("OCR worker panicked")]
    Panicked,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecognitionResult {
    pub request_id: Uuid,
    pub outcome: Result<String, RecognitionFailure>,
}

impl RecognitionResult {
    pub fn success(request_id: Uuid, text: String) -> Self {
        Self {
            request_id,
            outcome: Ok(text),
        }
    }

    pub fn failure(request_id: Uuid, failure: RecognitionFailure) -> Self {
        Self {
            request_id,
            outcome: Err(failure),
        }
    }

    /// Text that should reach the clipboard, `None` for failures and
    /// results without any visible characters.
    pub fn clipboard_text(&self) -> Option<&str> {
        match &self.outcome {
            Ok(text) if !text.trim().is_empty() => Some(text),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_region_from_str() {
        let region: CaptureRegion = "10, 20,300,400".parse().unwrap();
        assert_eq!(region, CaptureRegion::new(10, 20, 300, 400));

        assert!("10,20,300".parse::<CaptureRegion>().is_err());
        assert!("a,b,c,d".parse::<CaptureRegion>().is_err());
        assert!("10,20,-3,4".parse::<CaptureRegion>().is_err());
    }

    #[test]
    fn test_region_scaled() {
        let region = CaptureRegion::new(10, 20, 30, 40);
        assert_eq!(region.scaled(2.0), Some(CaptureRegion::new(20, 40, 60, 80)));
        assert_eq!(region.scaled(0.0), Some(region));
        assert_eq!(region.scaled(f64::NAN), Some(region));

        // 1x1 at 0.5 collapses to nothing
        assert_eq!(CaptureRegion::new(0, 0, 1, 1).scaled(0.5), None);
    }

    #[test]
    fn test_request_rejects_empty_region() {
        let empty = CaptureRegion::new(5, 5, 0, 10);
        assert_eq!(CaptureRequest::new(empty), Err(EmptyRegion(empty)));

        let a = CaptureRequest::new(CaptureRegion::new(0, 0, 1, 1)).unwrap();
        let b = CaptureRequest::new(CaptureRegion::new(0, 0, 1, 1)).unwrap();
        assert_ne!(a.id(), b.id());
    }

    #[test]
    fn test_clipboard_text() {
        let id = Uuid::new_v4();
        assert_eq!(
            RecognitionResult::success(id, "HELLO".into()).clipboard_text(),
            Some("HELLO")
        );
        assert_eq!(
            RecognitionResult::success(id, " \n\t".into()).clipboard_text(),
            None
        );
        assert_eq!(
            RecognitionResult::failure(id, RecognitionFailure::Panicked).clipboard_text(),
            None
        );
    }
}
