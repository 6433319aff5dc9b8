use std::process::Command;

use ocrclip_types::CaptureRegion;
use xcap::Monitor;

use crate::capture::CaptureError;
use crate::which::find_program;

/// Turns a user gesture into a capture region
pub trait RegionSelector: Send + Sync {
    /// `Ok(None)` means the user dismissed the selection
    fn select(&self) -> Result<Option<CaptureRegion>, CaptureError>;
}

/// Interactive drag-select through an external tool that prints
/// `x,y wxh` on success and exits non-zero when cancelled
pub struct CommandSelector {
    program: String,
    args: Vec<String>,
}

impl CommandSelector {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }

    /// Wayland (wlroots compositors)
    pub fn slurp() -> Self {
        Self::new("slurp", vec!["-f".into(), "%x,%y %wx%h".into()])
    }

    /// X11
    pub fn slop() -> Self {
        Self::new("slop", vec!["-f".into(), "%x,%y %wx%h".into()])
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn is_available(&self) -> bool {
        find_program(&self.program).is_some()
    }
}

impl RegionSelector for CommandSelector {
    fn select(&self) -> Result<Option<CaptureRegion>, CaptureError> {
        let path = find_program(&self.program).ok_or_else(|| CaptureError::MissingProgram {
            program: self.program.clone(),
        })?;

        let output = Command::new(path)
            .args(&self.args)
            .output()
            .map_err(|e| CaptureError::Selection(format!("failed to run {}: {e}", self.program)))?;

        if !output.status.success() {
            tracing::debug!(
                "{} exited with {}: {}",
                self.program,
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            );
            return Ok(None);
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        parse_geometry(&stdout).map(Some).ok_or_else(|| {
            CaptureError::Selection(format!("unexpected output '{}'", stdout.trim()))
        })
    }
}

/// Parse `x,y wxh`
pub fn parse_geometry(text: &str) -> Option<CaptureRegion> {
    let (origin, size) = text.trim().split_once(' ')?;
    let (x, y) = origin.split_once(',')?;
    let (width, height) = size.trim().split_once('x')?;

    Some(CaptureRegion::new(
        x.trim().parse().ok()?,
        y.trim().parse().ok()?,
        width.trim().parse().ok()?,
        height.trim().parse().ok()?,
    ))
}

/// Always the same configured region
pub struct FixedRegion(pub CaptureRegion);

impl RegionSelector for FixedRegion {
    fn select(&self) -> Result<Option<CaptureRegion>, CaptureError> {
        Ok(Some(self.0))
    }
}

/// The whole primary monitor
pub struct PrimaryMonitor;

impl RegionSelector for PrimaryMonitor {
    fn select(&self) -> Result<Option<CaptureRegion>, CaptureError> {
        let monitors = Monitor::all().map_err(|e| CaptureError::Backend {
            backend: "xcap".into(),
            message: format!("no monitors: {e}"),
        })?;

        let monitor = monitors
            .iter()
            .find(|m| m.is_primary())
            .or(monitors.first())
            .ok_or_else(|| CaptureError::Selection("no monitor found".into()))?;

        Ok(Some(CaptureRegion::new(
            monitor.x(),
            monitor.y(),
            monitor.width(),
            monitor.height(),
        )))
    }
}
