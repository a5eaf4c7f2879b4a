//! Broadcast events produced during response routing.

use tokio::sync::broadcast;

/// Connectivity classification, carried by
/// [`NetEvent::ConnectivityChanged`].
///
/// This crate defines the vocabulary; emitting connectivity transitions is
/// the job of an external reachability monitor holding the dispatcher's
/// [`EventBus`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConnectionState {
    /// Reachable over WiFi/ethernet.
    Wifi,
    /// Reachable over a cellular link.
    Mobile,
    /// Not reachable.
    Offline,
    /// Reachable, link type unknown.
    Unknown,
}

/// Events broadcast by the response router (and, for connectivity, by an
/// external monitor). Delivery is fire-and-forget: events sent with no
/// subscriber are dropped.
#[derive(Clone, Debug)]
pub enum NetEvent {
    /// The network link changed state.
    ConnectivityChanged(ConnectionState),
    /// A developer-facing error hint (e.g. a code found in the bundled
    /// error table).
    DebugError {
        /// User-facing message from the error-code table.
        message: String,
    },
    /// A user-facing error that should be surfaced as an alert.
    AlertError {
        /// Message to display.
        message: String,
    },
    /// The server reported that no token was supplied (code 41001).
    TokenMissing {
        /// The business status code.
        code: i64,
        /// Server-supplied message, if any.
        message: Option<String>,
    },
    /// The server rejected the supplied token (code 41002).
    TokenInvalid {
        /// The business status code.
        code: i64,
        /// Server-supplied message, if any.
        message: Option<String>,
    },
    /// The server denied permission for the operation (code 41003).
    PermissionDenied {
        /// The business status code.
        code: i64,
        /// Server-supplied message, if any.
        message: Option<String>,
    },
}

/// Fan-out channel for [`NetEvent`]s, owned by the dispatcher.
#[derive(Clone, Debug)]
pub struct EventBus {
    tx: broadcast::Sender<NetEvent>,
}

impl EventBus {
    pub(crate) fn new() -> Self {
        let (tx, _) = broadcast::channel(64);
        Self { tx }
    }

    /// Subscribe to events emitted from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<NetEvent> {
        self.tx.subscribe()
    }

    /// Broadcast an event. Fire-and-forget: having no subscriber is not an
    /// error.
    pub fn emit(&self, event: NetEvent) {
        let _ = self.tx.send(event);
    }
}
