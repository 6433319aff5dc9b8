use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use ocrclip_config::hotkey::{HotkeyBackend, HotkeyConfig};
use ocrclip_ocr::HotkeySource;
use ocrclip_types::{AppEvent, TriggerSource};
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

use super::WAIT;
use crate::dispatcher::UiInbox;
use crate::io::{ConsoleCommand, TrayTrigger, parse_console_command, spawn_hotkey_listener};

/// Fires once on the first poll
struct PressedOnce(AtomicBool);

impl HotkeySource for PressedOnce {
    fn poll(&self) -> bool {
        !self.0.swap(true, Ordering::SeqCst)
    }
}

fn counting_connect(
    calls: Arc<AtomicUsize>,
) -> impl FnOnce(&str) -> anyhow::Result<Box<dyn HotkeySource>> + Send + 'static {
    move |_spec: &str| -> anyhow::Result<Box<dyn HotkeySource>> {
        calls.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(PressedOnce(AtomicBool::new(false))))
    }
}

#[tokio::test]
async fn test_no_hotkey_never_registers() {
    let (_inbox, events) = UiInbox::new(4);
    let mut tasks = JoinSet::new();
    let calls = Arc::new(AtomicUsize::new(0));

    let config = HotkeyConfig {
        enabled: false,
        ..Default::default()
    };
    let spawned = spawn_hotkey_listener(
        &mut tasks,
        &config,
        counting_connect(calls.clone()),
        events,
        CancellationToken::new(),
    );

    assert!(!spawned);
    assert!(tasks.is_empty());
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_backend_none_never_registers() {
    let (_inbox, events) = UiInbox::new(4);
    let mut tasks = JoinSet::new();
    let calls = Arc::new(AtomicUsize::new(0));

    let config = HotkeyConfig {
        backend: HotkeyBackend::None,
        ..Default::default()
    };
    let spawned = spawn_hotkey_listener(
        &mut tasks,
        &config,
        counting_connect(calls.clone()),
        events,
        CancellationToken::new(),
    );

    assert!(!spawned);
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_hotkey_press_becomes_trigger() {
    let (inbox, events) = UiInbox::new(4);
    let mut tasks = JoinSet::new();
    let calls = Arc::new(AtomicUsize::new(0));
    let cancel = CancellationToken::new();

    let spawned = spawn_hotkey_listener(
        &mut tasks,
        &HotkeyConfig::default(),
        counting_connect(calls.clone()),
        events,
        cancel.clone(),
    );
    assert!(spawned);

    // the listener runs on the blocking pool, this thread owns the inbox
    match inbox.recv_timeout(WAIT) {
        Some(AppEvent::Trigger(TriggerSource::Hotkey)) => {}
        other => panic!("expected hotkey trigger, got {other:?}"),
    }

    cancel.cancel();
    while let Some(result) = tasks.join_next().await {
        result.unwrap();
    }
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_failed_registration_keeps_running() {
    let (_inbox, events) = UiInbox::new(4);
    let mut tasks = JoinSet::new();

    let spawned = spawn_hotkey_listener(
        &mut tasks,
        &HotkeyConfig::default(),
        |spec: &str| -> anyhow::Result<Box<dyn HotkeySource>> {
            anyhow::bail!("hotkey {spec} already taken")
        },
        events,
        CancellationToken::new(),
    );
    assert!(spawned);

    let joined = tokio::time::timeout(WAIT, tasks.join_next()).await.unwrap();
    assert!(matches!(joined, Some(Ok(()))));
}

#[tokio::test]
async fn test_tray_actions() {
    let (inbox, events) = UiInbox::new(4);
    let tray = TrayTrigger::new(events);

    assert!(tray.snip().await);
    assert!(tray.quit().await);

    assert!(matches!(
        inbox.recv_timeout(WAIT),
        Some(AppEvent::Trigger(TriggerSource::Tray))
    ));
    assert!(matches!(inbox.recv_timeout(WAIT), Some(AppEvent::Quit)));
}

#[test]
fn test_console_commands() {
    assert_eq!(parse_console_command(""), ConsoleCommand::Snip);
    assert_eq!(parse_console_command(" snip "), ConsoleCommand::Snip);
    assert_eq!(parse_console_command("Q"), ConsoleCommand::Quit);
    assert_eq!(parse_console_command("exit"), ConsoleCommand::Quit);
    assert_eq!(parse_console_command("?"), ConsoleCommand::Help);
    assert_eq!(
        parse_console_command("jump"),
        ConsoleCommand::Unknown("jump".into())
    );
}
