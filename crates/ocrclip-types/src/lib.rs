pub mod types;

pub use types::{
    AppEvent, CaptureRegion, CaptureRequest, EmptyRegion, RecognitionFailure, RecognitionResult,
    RegionParseError, TriggerSource,
};
