use std::marker::PhantomData;
use std::thread::{self, ThreadId};
use std::time::Duration;

use kanal::{Receiver, Sender};
use ocrclip_types::{AppEvent, RecognitionResult};

/// Producer side of the UI inbox, handed to the worker and trigger sources
#[derive(Clone)]
pub struct EventSender {
    tx: Sender<AppEvent>,
}

impl EventSender {
    /// Blocking send, false once the UI loop is gone
    pub fn send(&self, event: AppEvent) -> bool {
        match self.tx.send(event) {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!("UI inbox closed, dropping event: {}", e);
                false
            }
        }
    }

    pub async fn send_async(&self, event: AppEvent) -> bool {
        match self.tx.as_async().send(event).await {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!("UI inbox closed, dropping event: {}", e);
                false
            }
        }
    }

    /// Hand a finished recognition to the UI thread
    pub fn deliver(&self, result: RecognitionResult) -> bool {
        let request_id = result.request_id;
        let delivered = self.send(AppEvent::Recognition(result));
        if !delivered {
            tracing::error!("Result for request {} could not be delivered", request_id);
        }
        delivered
    }
}

/// Consumer side of the UI inbox.
///
/// Not `Send`: it is drained on the thread that created it, which makes that
/// thread the only one ever handling recognition results.
pub struct UiInbox {
    rx: Receiver<AppEvent>,
    owner: ThreadId,
    _not_send: PhantomData<*const ()>,
}

impl UiInbox {
    pub fn new(capacity: usize) -> (Self, EventSender) {
        let (tx, rx) = kanal::bounded(capacity);
        let inbox = UiInbox {
            rx,
            owner: thread::current().id(),
            _not_send: PhantomData,
        };
        (inbox, EventSender { tx })
    }

    /// Next event, `None` once every sender is dropped
    pub fn recv(&self) -> Option<AppEvent> {
        debug_assert_eq!(thread::current().id(), self.owner);
        self.rx.recv().ok()
    }

    pub fn recv_timeout(&self, timeout: Duration) -> Option<AppEvent> {
        debug_assert_eq!(thread::current().id(), self.owner);
        self.rx.recv_timeout(timeout).ok()
    }

    pub fn owner(&self) -> ThreadId {
        self.owner
    }
}
