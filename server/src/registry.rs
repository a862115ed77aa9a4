//! Connection registry tracking every live connection and its player state
//!
//! Each registered connection carries the player identity accumulated over
//! its lifetime: the display name set at login, the score reported at the
//! end of a game, and a back-reference to the session it is currently in.
//! The back-reference is a session id, never an owning handle, so session
//! lifetime stays under the session manager's control.

use crate::session::SessionId;
use log::debug;
use shared::ServerMessage;
use std::collections::HashMap;
use tokio::sync::mpsc;

/// Identifier the transport layer assigns to each accepted connection.
pub type ConnectionId = u32;

/// Outbound handle for one connection.
///
/// Wraps the per-connection channel drained by the transport's writer task,
/// which serializes each message to the wire format. Sends are
/// fire-and-forget: a closed channel (peer already disconnected) is a no-op,
/// never an error surfaced to game logic.
#[derive(Debug, Clone)]
pub struct Outbox {
    sender: mpsc::UnboundedSender<ServerMessage>,
}

impl Outbox {
    pub fn new(sender: mpsc::UnboundedSender<ServerMessage>) -> Self {
        Self { sender }
    }

    pub fn send(&self, message: ServerMessage) {
        let _ = self.sender.send(message);
    }
}

/// A connected player as the engine sees it.
#[derive(Debug)]
pub struct Connection {
    pub id: ConnectionId,
    pub outbox: Outbox,
    /// Display name, set at login. Unset before the first `login`.
    pub name: Option<String>,
    /// Final score for the current session, set by the `end` report.
    pub score: Option<i64>,
    /// Session back-reference. Set while paired, cleared when the session
    /// completes. A connection never sits in the lounge while this is set.
    pub session: Option<SessionId>,
}

impl Connection {
    fn new(id: ConnectionId, outbox: Outbox) -> Self {
        Self {
            id,
            outbox,
            name: None,
            score: None,
            session: None,
        }
    }
}

/// Tracks all live connections indexed by their transport-assigned id.
#[derive(Debug, Default)]
pub struct Registry {
    connections: HashMap<ConnectionId, Connection>,
}

impl Registry {
    pub fn new() -> Self {
        Self {
            connections: HashMap::new(),
        }
    }

    /// Adds a connection with empty name/score/session state.
    ///
    /// Re-registering an id replaces the previous entry, which only happens
    /// if the transport recycles an id after a disconnect raced the engine.
    pub fn register(&mut self, id: ConnectionId, outbox: Outbox) {
        if self.connections.insert(id, Connection::new(id, outbox)).is_some() {
            debug!("Connection {} re-registered, previous entry replaced", id);
        }
    }

    /// Removes a connection, returning its final state for cleanup.
    pub fn unregister(&mut self, id: ConnectionId) -> Option<Connection> {
        self.connections.remove(&id)
    }

    pub fn get(&self, id: ConnectionId) -> Option<&Connection> {
        self.connections.get(&id)
    }

    pub fn set_name(&mut self, id: ConnectionId, name: String) {
        if let Some(conn) = self.connections.get_mut(&id) {
            conn.name = Some(name);
        }
    }

    pub fn set_score(&mut self, id: ConnectionId, points: i64) {
        if let Some(conn) = self.connections.get_mut(&id) {
            conn.score = Some(points);
        }
    }

    /// Binds a connection to a freshly created session and resets its score
    /// so a stale report from a previous game can never satisfy the new one.
    pub fn begin_session(&mut self, id: ConnectionId, session: SessionId) {
        if let Some(conn) = self.connections.get_mut(&id) {
            conn.session = Some(session);
            conn.score = None;
        }
    }

    pub fn clear_session(&mut self, id: ConnectionId) {
        if let Some(conn) = self.connections.get_mut(&id) {
            conn.session = None;
        }
    }

    /// Queues a message on the connection's outbox. Unknown ids are ignored,
    /// matching the fire-and-forget send policy.
    pub fn send(&self, id: ConnectionId, message: ServerMessage) {
        if let Some(conn) = self.connections.get(&id) {
            conn.outbox.send(message);
        }
    }

    pub fn len(&self) -> usize {
        self.connections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.connections.is_empty()
    }
}
