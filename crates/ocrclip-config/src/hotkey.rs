use serde::{Deserialize, Serialize};

fn default_enabled() -> bool {
    true
}

fn default_spec() -> String {
    "ctrl+shift+s".to_string()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum HotkeyBackend {
    /// OS-level registration through the global-hotkey crate
    #[default]
    Global,
    None,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct HotkeyConfig {
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    #[serde(default = "default_spec")]
    pub spec: String,
    pub backend: HotkeyBackend,
}

impl HotkeyConfig {
    /// Whether a registration should be attempted at all
    pub fn is_active(&self) -> bool {
        self.enabled && self.backend != HotkeyBackend::None
    }
}

impl Default for HotkeyConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            spec: default_spec(),
            backend: HotkeyBackend::default(),
        }
    }
}
