use anyhow::{Context, Result};
use global_hotkey::{
    GlobalHotKeyEvent, GlobalHotKeyManager, HotKeyState,
    hotkey::{Code, HotKey, Modifiers},
};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HotkeyError {
    #[error("hotkey '{0}' has no key")]
    MissingKey(String),

    #[error("hotkey '{spec}' has more than one key ('{first}' and '{second}')")]
    MultipleKeys {
        spec: String,
        first: String,
        second: String,
    },

    #[error("unknown key '{token}' in hotkey '{spec}'")]
    UnknownToken { spec: String, token: String },
}

/// Parse a combination such as `ctrl+shift+s`.
///
/// Tokens are case-insensitive; any number of modifiers and exactly one key.
pub fn parse_hotkey(spec: &str) -> Result<HotKey, HotkeyError> {
    let mut modifiers = Modifiers::empty();
    let mut key: Option<(Code, String)> = None;

    for token in spec.split('+').map(str::trim).filter(|t| !t.is_empty()) {
        let lower = token.to_lowercase();

        if let Some(modifier) = parse_modifier(&lower) {
            modifiers |= modifier;
            continue;
        }

        let code = parse_code(&lower).ok_or_else(|| HotkeyError::UnknownToken {
            spec: spec.to_string(),
            token: token.to_string(),
        })?;

        if let Some((_, first)) = &key {
            return Err(HotkeyError::MultipleKeys {
                spec: spec.to_string(),
                first: first.clone(),
                second: token.to_string(),
            });
        }
        key = Some((code, token.to_string()));
    }

    let (code, _) = key.ok_or_else(|| HotkeyError::MissingKey(spec.to_string()))?;
    let modifiers = (!modifiers.is_empty()).then_some(modifiers);
    Ok(HotKey::new(modifiers, code))
}

fn parse_modifier(token: &str) -> Option<Modifiers> {
    match token {
        "ctrl" | "control" => Some(Modifiers::CONTROL),
        "shift" => Some(Modifiers::SHIFT),
        "alt" | "option" => Some(Modifiers::ALT),
        "super" | "meta" | "cmd" | "win" => Some(Modifiers::SUPER),
        _ => None,
    }
}

fn parse_code(token: &str) -> Option<Code> {
    let code = match token {
        "a" => Code::KeyA,
        "b" => Code::KeyB,
        "c" => Code::KeyC,
        "d" => Code::KeyD,
        "e" => Code::KeyE,
        "f" => Code::KeyF,
        "g" => Code::KeyG,
        "h" => Code::KeyH,
        "i" => Code::KeyI,
        "j" => Code::KeyJ,
        "k" => Code::KeyK,
        "l" => Code::KeyL,
        "m" => Code::KeyM,
        "n" => Code::KeyN,
        "o" => Code::KeyO,
        "p" => Code::KeyP,
        "q" => Code::KeyQ,
        "r" => Code::KeyR,
        "s" => Code::KeyS,
        "t" => Code::KeyT,
        "u" => Code::KeyU,
        "v" => Code::KeyV,
        "w" => Code::KeyW,
        "x" => Code::KeyX,
        "y" => Code::KeyY,
        "z" => Code::KeyZ,
        "0" => Code::Digit0,
        "1" => Code::Digit1,
        "2" => Code::Digit2,
        "3" => Code::Digit3,
        "4" => Code::Digit4,
        "5" => Code::Digit5,
        "6" => Code::Digit6,
        "7" => Code::Digit7,
        "8" => Code::Digit8,
        "9" => Code::Digit9,
        "f1" => Code::F1,
        "f2" => Code::F2,
        "f3" => Code::F3,
        "f4" => Code::F4,
        "f5" => Code::F5,
        "f6" => Code::F6,
        "f7" => Code::F7,
        "f8" => Code::F8,
        "f9" => Code::F9,
        "f10" => Code::F10,
        "f11" => Code::F11,
        "f12" => Code::F12,
        "space" => Code::Space,
        "enter" | "return" => Code::Enter,
        "tab" => Code::Tab,
        "esc" | "escape" => Code::Escape,
        "print" | "printscreen" => Code::PrintScreen,
        _ => return None,
    };
    Some(code)
}

/// Something that can be asked whether the capture hotkey fired.
///
/// Created and polled on the same thread.
pub trait HotkeySource {
    /// Non-blocking; true once per key press
    fn poll(&self) -> bool;
}

pub struct HotkeyManager {
    manager: GlobalHotKeyManager,
    hotkey: HotKey,
}

impl HotkeyManager {
    /// Register a global hotkey from its textual form
    pub fn register(spec: &str) -> Result<Self> {
        let hotkey = parse_hotkey(spec)?;
        let manager = GlobalHotKeyManager::new().context("Failed to create hotkey manager")?;

        manager
            .register(hotkey)
            .with_context(|| format!("Failed to register hotkey '{spec}'"))?;

        Ok(Self { manager, hotkey })
    }

    /// Get the hotkey ID for matching events
    pub fn id(&self) -> u32 {
        self.hotkey.id()
    }
}

impl HotkeySource for HotkeyManager {
    fn poll(&self) -> bool {
        let receiver = GlobalHotKeyEvent::receiver();
        while let Ok(event) = receiver.try_recv() {
            if event.id != self.hotkey.id() {
                tracing::trace!("Ignoring hotkey event for id {}", event.id);
                continue;
            }
            if event.state == HotKeyState::Pressed {
                return true;
            }
        }
        false
    }
}

impl Drop for HotkeyManager {
    fn drop(&mut self) {
        let _ = self.manager.unregister(self.hotkey);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_default_hotkey() {
        let hotkey = parse_hotkey("ctrl+shift+s").unwrap();
        assert_eq!(
            hotkey,
            HotKey::new(Some(Modifiers::CONTROL | Modifiers::SHIFT), Code::KeyS)
        );
    }

    #[test]
    fn test_parse_is_case_insensitive() {
        assert_eq!(
            parse_hotkey("Ctrl + Alt + F9").unwrap(),
            HotKey::new(Some(Modifiers::CONTROL | Modifiers::ALT), Code::F9)
        );
        assert_eq!(
            parse_hotkey("PrintScreen").unwrap(),
            HotKey::new(None, Code::PrintScreen)
        );
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!(
            parse_hotkey("ctrl+shift"),
            Err(HotkeyError::MissingKey("ctrl+shift".into()))
        );
        assert_eq!(
            parse_hotkey("ctrl+a+b"),
            Err(HotkeyError::MultipleKeys {
                spec: "ctrl+a+b".into(),
                first: "a".into(),
                second: "b".into(),
            })
        );
        assert_eq!(
            parse_hotkey("ctrl+hyper+s"),
            Err(HotkeyError::UnknownToken {
                spec: "ctrl+hyper+s".into(),
                token: "hyper".into(),
            })
        );
    }
}
