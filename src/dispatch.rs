//! Serial dispatch queue for listener callbacks.
//!
//! Every event of a connection goes through one unbounded mailbox drained
//! by a single worker task, so a listener never sees two callbacks at once
//! and sees them in the order they were produced. Registering the listener
//! travels through the same mailbox; events queued before registration are
//! replayed to it first.

use std::collections::VecDeque;
use std::sync::Arc;

use tokio::sync::mpsc;

use crate::connection::{ConnectionId, LinkState};
use crate::error::Iec104Error;
use crate::types::Asdu;

/// Receiver of connection events.
///
/// Callbacks run on the dispatch worker of the connection. They must not
/// block; hand heavy work to another task.
pub trait ConnectionEventListener: Send + Sync + 'static {
    /// An ASDU arrived that was not consumed as an application confirmation.
    fn on_asdu(&self, asdu: Asdu);

    /// The connection closed. Delivered exactly once, always last.
    fn on_closed(&self, cause: Iec104Error);

    /// Link state changed between STOPPED and STARTED.
    fn on_state_changed(&self, _state: LinkState) {}
}

/// Events emitted by a connection.
#[derive(Debug, Clone, PartialEq)]
pub enum ConnectionEvent {
    /// ASDU received
    Asdu(Asdu),
    /// Link state changed
    StateChanged(LinkState),
    /// Connection closed with this cause
    Closed(Iec104Error),
}

/// Channel subscription: every callback becomes a [`ConnectionEvent`].
impl ConnectionEventListener for mpsc::UnboundedSender<ConnectionEvent> {
    fn on_asdu(&self, asdu: Asdu) {
        let _ = self.send(ConnectionEvent::Asdu(asdu));
    }

    fn on_closed(&self, cause: Iec104Error) {
        let _ = self.send(ConnectionEvent::Closed(cause));
    }

    fn on_state_changed(&self, state: LinkState) {
        let _ = self.send(ConnectionEvent::StateChanged(state));
    }
}

enum Message {
    Register(Arc<dyn ConnectionEventListener>),
    Event(ConnectionEvent),
}

/// Producer side of the mailbox.
#[derive(Clone)]
pub(crate) struct Dispatcher {
    tx: mpsc::UnboundedSender<Message>,
}

impl Dispatcher {
    /// Spawn the worker task. Must be called inside a tokio runtime.
    pub(crate) fn spawn(id: ConnectionId) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        tokio::spawn(run(id, rx));
        Self { tx }
    }

    pub(crate) fn register(&self, listener: Arc<dyn ConnectionEventListener>) {
        let _ = self.tx.send(Message::Register(listener));
    }

    pub(crate) fn dispatch(&self, event: ConnectionEvent) {
        let _ = self.tx.send(Message::Event(event));
    }
}

async fn run(id: ConnectionId, mut rx: mpsc::UnboundedReceiver<Message>) {
    let mut listener: Option<Arc<dyn ConnectionEventListener>> = None;
    let mut backlog = VecDeque::new();

    while let Some(message) = rx.recv().await {
        match message {
            Message::Register(new_listener) => {
                if listener.is_some() {
                    tracing::debug!(connection = %id, "listener replaced");
                }
                while let Some(event) = backlog.pop_front() {
                    if deliver(new_listener.as_ref(), event) {
                        return;
                    }
                }
                listener = Some(new_listener);
            }
            Message::Event(event) => match &listener {
                Some(listener) => {
                    if deliver(listener.as_ref(), event) {
                        return;
                    }
                }
                None => backlog.push_back(event),
            },
        }
    }
    tracing::trace!(connection = %id, undelivered = backlog.len(), "dispatch worker stopped");
}

/// Returns whether the event was the final `Closed`.
fn deliver(listener: &dyn ConnectionEventListener, event: ConnectionEvent) -> bool {
    match event {
        ConnectionEvent::Asdu(asdu) => listener.on_asdu(asdu),
        ConnectionEvent::StateChanged(state) => listener.on_state_changed(state),
        ConnectionEvent::Closed(cause) => {
            listener.on_closed(cause);
            return true;
        }
    }
    false
}
