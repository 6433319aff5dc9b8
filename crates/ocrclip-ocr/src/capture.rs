use std::path::PathBuf;
use std::process::Command;

use ocrclip_types::{CaptureRegion, CaptureRequest};
use xcap::Monitor;

use crate::bitmap::{CapturedImage, ImageError};
use crate::which::find_program;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CaptureError {
    #[error("{program} not found on PATH")]
    MissingProgram { program: String },

    #[error("{message}")]
    Backend { backend: String, message: String },

    #[error("region {0} is not on any monitor")]
    OutOfBounds(CaptureRegion),

    #[error("captured data is not an image: {0}")]
    Image(#[from] ImageError),

    #[error("no suitable screen capture backend: {}", .0.join(", "))]
    Exhausted(Vec<String>),

    #[error("region selection failed: {0}")]
    Selection(String),
}

/// Produces the bitmap for a capture request
pub trait CaptureSurface: Send + Sync {
    fn name(&self) -> &str;

    fn capture(&self, request: &CaptureRequest) -> Result<CapturedImage, CaptureError>;
}

/// Tries each surface in order and returns the first image
pub struct ChainSurface {
    surfaces: Vec<Box<dyn CaptureSurface>>,
}

impl ChainSurface {
    pub fn new(surfaces: Vec<Box<dyn CaptureSurface>>) -> Self {
        Self { surfaces }
    }

    /// In-process capture first, then whatever external tools the platform
    /// usually ships
    pub fn platform_default() -> Self {
        let mut surfaces: Vec<Box<dyn CaptureSurface>> = vec![Box::new(XcapSurface)];

        if cfg!(target_os = "macos") {
            surfaces.push(Box::new(CliSurface::new(CliTool::ScreenCapture)));
        }
        if cfg!(unix) && !cfg!(target_os = "macos") {
            surfaces.push(Box::new(CliSurface::new(CliTool::Grim)));
            surfaces.push(Box::new(CliSurface::new(CliTool::Maim)));
            surfaces.push(Box::new(CliSurface::new(CliTool::Import)));
        }

        Self::new(surfaces)
    }

    pub fn names(&self) -> Vec<&str> {
        self.surfaces.iter().map(|s| s.name()).collect()
    }
}

impl CaptureSurface for ChainSurface {
    fn name(&self) -> &str {
        "chain"
    }

    fn capture(&self, request: &CaptureRequest) -> Result<CapturedImage, CaptureError> {
        let mut errors = Vec::new();

        for surface in &self.surfaces {
            match surface.capture(request) {
                Ok(image) => {
                    tracing::debug!(
                        "Captured {} via {} ({}x{})",
                        request.region(),
                        surface.name(),
                        image.width(),
                        image.height()
                    );
                    return Ok(image);
                }
                Err(e) => {
                    tracing::debug!("{} capture failed: {}", surface.name(), e);
                    errors.push(format!("{}: {}", surface.name(), e));
                }
            }
        }

        Err(CaptureError::Exhausted(errors))
    }
}

/// Monitor capture through xcap, cropped to the request
pub struct XcapSurface;

impl CaptureSurface for XcapSurface {
    fn name(&self) -> &str {
        "xcap"
    }

    fn capture(&self, request: &CaptureRequest) -> Result<CapturedImage, CaptureError> {
        let region = request.region();
        let backend_err = |message: String| CaptureError::Backend {
            backend: "xcap".into(),
            message,
        };

        let monitors = Monitor::all().map_err(|e| backend_err(format!("no monitors: {e}")))?;
        let bounds: Vec<CaptureRegion> = monitors
            .iter()
            .map(|m| CaptureRegion::new(m.x(), m.y(), m.width(), m.height()))
            .collect();

        let index = monitor_for(&bounds, region).ok_or(CaptureError::OutOfBounds(region))?;
        let monitor = &monitors[index];
        let screen = bounds[index];

        let image = monitor
            .capture_image()
            .map_err(|e| backend_err(format!("failed to capture screen: {e}")))?;

        // the bitmap may be in device pixels while monitor geometry is logical
        let scale = image.width() as f64 / screen.width.max(1) as f64;
        let relative = CaptureRegion::new(
            region.x - screen.x,
            region.y - screen.y,
            region.width,
            region.height,
        );
        let crop = relative
            .scaled(scale)
            .and_then(|r| clamp_to(r, image.width(), image.height()))
            .ok_or(CaptureError::OutOfBounds(region))?;

        let cropped = xcap::image::imageops::crop_imm(
            &image,
            crop.x as u32,
            crop.y as u32,
            crop.width,
            crop.height,
        )
        .to_image();

        let (width, height) = cropped.dimensions();
        Ok(CapturedImage::from_rgba(width, height, cropped.into_raw())?)
    }
}

/// Pick the monitor that fully holds the region, else the one holding its
/// top-left corner
fn monitor_for(monitors: &[CaptureRegion], region: CaptureRegion) -> Option<usize> {
    let contains_point = |m: &CaptureRegion, x: i64, y: i64| {
        x >= m.x as i64
            && y >= m.y as i64
            && x < m.x as i64 + m.width as i64
            && y < m.y as i64 + m.height as i64
    };

    let right = region.x as i64 + region.width as i64 - 1;
    let bottom = region.y as i64 + region.height as i64 - 1;

    monitors
        .iter()
        .position(|m| {
            contains_point(m, region.x as i64, region.y as i64) && contains_point(m, right, bottom)
        })
        .or_else(|| {
            monitors
                .iter()
                .position(|m| contains_point(m, region.x as i64, region.y as i64))
        })
}

/// Intersect a monitor-relative region with the bitmap bounds
fn clamp_to(region: CaptureRegion, width: u32, height: u32) -> Option<CaptureRegion> {
    let left = (region.x as i64).clamp(0, width as i64);
    let top = (region.y as i64).clamp(0, height as i64);
    let right = (region.x as i64 + region.width as i64).clamp(0, width as i64);
    let bottom = (region.y as i64 + region.height as i64).clamp(0, height as i64);

    let clamped = CaptureRegion::new(
        left as i32,
        top as i32,
        (right - left) as u32,
        (bottom - top) as u32,
    );
    (!clamped.is_empty()).then_some(clamped)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CliTool {
    /// Wayland (wlroots)
    Grim,
    /// X11
    Maim,
    /// ImageMagick
    Import,
    /// macOS
    ScreenCapture,
}

impl CliTool {
    pub fn program(&self) -> &'static str {
        match self {
            CliTool::Grim => "grim",
            CliTool::Maim => "maim",
            CliTool::Import => "import",
            CliTool::ScreenCapture => "screencapture",
        }
    }

    /// Arguments writing the region to `out`
    pub fn args(&self, region: CaptureRegion, out: &str) -> Vec<String> {
        let CaptureRegion {
            x,
            y,
            width,
            height,
        } = region;

        match self {
            CliTool::Grim => vec!["-g".into(), format!("{x},{y} {width}x{height}"), out.into()],
            CliTool::Maim => vec!["-g".into(), format!("{width}x{height}+{x}+{y}"), out.into()],
            CliTool::Import => vec![
                "-window".into(),
                "root".into(),
                "-crop".into(),
                format!("{width}x{height}+{x}+{y}"),
                out.into(),
            ],
            CliTool::ScreenCapture => vec![
                "-x".into(),
                "-R".into(),
                format!("{x},{y},{width},{height}"),
                out.into(),
            ],
        }
    }
}

/// Capture by running an external screenshot tool into a temp file
pub struct CliSurface {
    tool: CliTool,
}

impl CliSurface {
    pub fn new(tool: CliTool) -> Self {
        Self { tool }
    }
}

/// Removes the temp file however the capture ends
struct TempPng(PathBuf);

impl TempPng {
    fn new() -> Self {
        Self(std::env::temp_dir().join(format!("ocrclip-capture-{}.png", uuid::Uuid::new_v4())))
    }
}

impl Drop for TempPng {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.0);
    }
}

impl CaptureSurface for CliSurface {
    fn name(&self) -> &str {
        self.tool.program()
    }

    fn capture(&self, request: &CaptureRequest) -> Result<CapturedImage, CaptureError> {
        let program = self.tool.program();
        let path = find_program(program).ok_or_else(|| CaptureError::MissingProgram {
            program: program.to_string(),
        })?;
        let backend_err = |message: String| CaptureError::Backend {
            backend: program.to_string(),
            message,
        };

        let out = TempPng::new();
        let output = Command::new(path)
            .args(self.tool.args(request.region(), &out.0.to_string_lossy()))
            .output()
            .map_err(|e| backend_err(format!("failed to run: {e}")))?;

        if !output.status.success() {
            return Err(backend_err(format!(
                "exited with {}: {}",
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }

        let bytes = std::fs::read(&out.0).map_err(|e| backend_err(format!("no output file: {e}")))?;
        Ok(CapturedImage::decode(&bytes)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Failing(&'static str);

    impl CaptureSurface for Failing {
        fn name(&self) -> &str {
            self.0
        }

        fn capture(&self, _request: &CaptureRequest) -> Result<CapturedImage, CaptureError> {
            Err(CaptureError::Backend {
                backend: self.0.into(),
                message: "denied".into(),
            })
        }
    }

    struct Solid;

    impl CaptureSurface for Solid {
        fn name(&self) -> &str {
            "solid"
        }

        fn capture(&self, request: &CaptureRequest) -> Result<CapturedImage, CaptureError> {
            let r = request.region();
            Ok(CapturedImage::from_rgba(
                r.width,
                r.height,
                vec![0; (r.width * r.height * 4) as usize],
            )?)
        }
    }

    fn request() -> CaptureRequest {
        CaptureRequest::new(CaptureRegion::new(0, 0, 3, 2)).unwrap()
    }

    #[test]
    fn test_chain_falls_through_to_working_surface() {
        let chain = ChainSurface::new(vec![Box::new(Failing("first")), Box::new(Solid)]);
        let image = chain.capture(&request()).unwrap();
        assert_eq!((image.width(), image.height()), (3, 2));
    }

    #[test]
    fn test_chain_reports_every_failure() {
        let chain = ChainSurface::new(vec![Box::new(Failing("a")), Box::new(Failing("b"))]);
        let err = chain.capture(&request()).unwrap_err();
        assert_eq!(
            err.to_string(),
            "no suitable screen capture backend: a: denied, b: denied"
        );
    }

    #[test]
    fn test_monitor_for() {
        let monitors = [
            CaptureRegion::new(0, 0, 1920, 1080),
            CaptureRegion::new(1920, 0, 1280, 1024),
        ];

        assert_eq!(monitor_for(&monitors, CaptureRegion::new(10, 10, 100, 100)), Some(0));
        assert_eq!(monitor_for(&monitors, CaptureRegion::new(2000, 10, 100, 100)), Some(1));
        // straddling: the monitor holding the top-left corner
        assert_eq!(monitor_for(&monitors, CaptureRegion::new(1900, 10, 100, 100)), Some(0));
        assert_eq!(monitor_for(&monitors, CaptureRegion::new(-50, 10, 10, 10)), None);
    }

    #[test]
    fn test_clamp_to() {
        assert_eq!(
            clamp_to(CaptureRegion::new(1900, 1000, 100, 100), 1920, 1080),
            Some(CaptureRegion::new(1900, 1000, 20, 80))
        );
        assert_eq!(clamp_to(CaptureRegion::new(2000, 0, 10, 10), 1920, 1080), None);
    }

    #[test]
    fn test_cli_args() {
        let region = CaptureRegion::new(10, 20, 300, 400);
        assert_eq!(CliTool::Grim.args(region, "/tmp/o.png"), ["-g", "10,20 300x400", "/tmp/o.png"]);
        assert_eq!(CliTool::Maim.args(region, "o.png"), ["-g", "300x400+10+20", "o.png"]);
        assert_eq!(
            CliTool::Import.args(region, "o.png"),
            ["-window", "root", "-crop", "300x400+10+20", "o.png"]
        );
        assert_eq!(
            CliTool::ScreenCapture.args(region, "o.png"),
            ["-x", "-R", "10,20,300,400", "o.png"]
        );
    }
}
