pub mod clipboard;

pub use clipboard::{ClipboardError, ClipboardSink, SystemClipboard};
