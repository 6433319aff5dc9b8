//! Startup diagnostics: what platform we are on and which helper tools
//! can be found.

use ocrclip_config::Config;
use ocrclip_ocr::find_program;

const TOOLS: &[&str] = &[
    "grim",
    "slurp",
    "maim",
    "slop",
    "import",
    "screencapture",
    "tesseract",
];

pub fn is_wayland() -> bool {
    is_wayland_with(|key| std::env::var(key).ok())
}

fn is_wayland_with(lookup: impl Fn(&str) -> Option<String>) -> bool {
    if let Some(session) = lookup("XDG_SESSION_TYPE") {
        return session.eq_ignore_ascii_case("wayland");
    }
    lookup("WAYLAND_DISPLAY").is_some_and(|display| !display.is_empty())
}

fn display_server() -> &'static str {
    if cfg!(windows) {
        "windows"
    } else if cfg!(target_os = "macos") {
        "quartz"
    } else if is_wayland() {
        "wayland"
    } else {
        "x11"
    }
}

pub fn run(config: &Config) {
    tracing::info!(
        "Platform: {} ({}), display server: {}",
        std::env::consts::OS,
        std::env::consts::ARCH,
        display_server()
    );

    for tool in TOOLS {
        match find_program(tool) {
            Some(path) => tracing::debug!("Found {} at {}", tool, path.display()),
            None => tracing::debug!("{} not found on PATH", tool),
        }
    }

    if is_wayland() && config.hotkey.is_active() {
        tracing::warn!(
            "Global hotkeys may not work on Wayland; bind `pkill -USR1 ocrclip` in your compositor instead"
        );
    }

    if !config.ocr.gpu {
        tracing::info!("GPU inference disabled");
    }
}
