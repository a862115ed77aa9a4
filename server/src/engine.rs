//! The session lifecycle engine: dispatch, matchmaking, and scoring
//!
//! All mutable game state (registry, lounge, session set) lives inside
//! [`Engine`], which is owned by a single task. Transport tasks never touch
//! it directly; they deliver [`EngineEvent`]s over a channel, and the pairing
//! tick calls in from the same loop, so handler invocations, ticks, and
//! outbound sends never preempt each other and no locking is needed.
//!
//! Error policy, by taxonomy:
//! - malformed payloads are dropped with a debug log, the connection stays
//!   open and gets no reply;
//! - unknown message types are silently ignored;
//! - an `end` with no active session is an invalid-state report: dropped
//!   with a warning, never fatal;
//! - a disconnect while queued removes the lounge slot, and a disconnect
//!   mid-session leaves the session permanently stalled rather than
//!   crashing when the survivor later reports.
//!
//! Per-connection failures never terminate the process or affect other
//! connections.

use crate::lounge::Lounge;
use crate::registry::{ConnectionId, Outbox, Registry};
use crate::results;
use crate::session::{IdSource, SessionManager, SessionState};
use log::{debug, info, warn};
use shared::{ClientMessage, ServerMessage};

/// Events delivered from the transport layer to the engine loop.
#[derive(Debug)]
pub enum EngineEvent {
    Connected { id: ConnectionId, outbox: Outbox },
    Disconnected { id: ConnectionId },
    Frame { id: ConnectionId, text: String },
}

/// Owns all matchmaking and session state for the process.
pub struct Engine {
    registry: Registry,
    lounge: Lounge,
    sessions: SessionManager,
}

impl Engine {
    pub fn new(ids: Box<dyn IdSource>) -> Self {
        Self {
            registry: Registry::new(),
            lounge: Lounge::new(),
            sessions: SessionManager::new(ids),
        }
    }

    pub fn handle_event(&mut self, event: EngineEvent) {
        match event {
            EngineEvent::Connected { id, outbox } => self.handle_connect(id, outbox),
            EngineEvent::Disconnected { id } => self.handle_disconnect(id),
            EngineEvent::Frame { id, text } => self.handle_frame(id, &text),
        }
    }

    fn handle_connect(&mut self, id: ConnectionId, outbox: Outbox) {
        info!("Connected socket {}", id);
        self.registry.register(id, outbox);
    }

    fn handle_disconnect(&mut self, id: ConnectionId) {
        if self.lounge.remove(id) {
            debug!("Connection {} left the lounge on disconnect", id);
        }

        let Some(conn) = self.registry.unregister(id) else {
            return;
        };
        info!(
            "Connection {} disconnected ({})",
            id,
            conn.name.as_deref().unwrap_or("never logged in")
        );

        // The session is left in the active set with a dangling participant.
        // It can never complete and is never garbage-collected; the survivor's
        // eventual `end` is absorbed harmlessly.
        if let Some(session_id) = conn.session {
            if let Some(session) = self.sessions.get(&session_id) {
                if session.state == SessionState::Active {
                    warn!(
                        "Session {} stalled: participant {} disconnected mid-game",
                        session_id, id
                    );
                }
            }
        }
    }

    /// Decodes one inbound text frame and dispatches it to its handler.
    fn handle_frame(&mut self, id: ConnectionId, text: &str) {
        let value: serde_json::Value = match serde_json::from_str(text) {
            Ok(value) => value,
            Err(err) => {
                debug!("Dropping malformed frame from connection {}: {}", id, err);
                return;
            }
        };

        match serde_json::from_value::<ClientMessage>(value) {
            Ok(message) => self.handle_message(id, message),
            // Unknown message types are ignored on purpose: the protocol is
            // permissive toward clients speaking a newer dialect.
            Err(_) => debug!("Ignoring unhandled message type from connection {}", id),
        }
    }

    fn handle_message(&mut self, id: ConnectionId, message: ClientMessage) {
        match message {
            ClientMessage::Login { name } => self.on_login(id, name),
            ClientMessage::End { points } => self.on_end(id, points),
        }
    }

    /// Registers the sender's display name, acknowledges it, and queues the
    /// connection for pairing.
    fn on_login(&mut self, id: ConnectionId, name: String) {
        if self.registry.get(id).is_none() {
            warn!("Login from unregistered connection {}", id);
            return;
        }

        info!("logged in {}", name);
        self.registry.set_name(id, name.clone());
        self.registry.send(id, ServerMessage::LoggedIn { name });

        // A repeated login only refreshes the name: re-enqueueing a
        // connection that is already waiting or already playing would let it
        // occupy two lounge slots at once.
        let in_session = self
            .registry
            .get(id)
            .map(|conn| conn.session.is_some())
            .unwrap_or(false);
        if in_session || self.lounge.contains(id) {
            debug!("Connection {} already queued or in a session", id);
            return;
        }

        self.lounge.enqueue(id);
    }

    /// Records the sender's final score and completes the session once both
    /// participants have reported.
    fn on_end(&mut self, id: ConnectionId, points: i64) {
        let conn = match self.registry.get(id) {
            Some(conn) => conn,
            None => {
                warn!("End report from unregistered connection {}", id);
                return;
            }
        };

        let Some(session_id) = conn.session.clone() else {
            warn!("End report from connection {} with no active session", id);
            return;
        };

        if conn.score.is_some() {
            warn!(
                "Duplicate end report from connection {} for session {}",
                id, session_id
            );
            return;
        }

        self.registry.set_score(id, points);
        debug!(
            "Connection {} reported {} points for session {}",
            id, points, session_id
        );

        let completed = match self.sessions.get_mut(&session_id) {
            Some(session) => session.record_report(),
            None => {
                warn!("End report for unknown session {}", session_id);
                return;
            }
        };

        if completed {
            self.finish_session(&session_id);
        }
    }

    /// Aggregates and broadcasts results, then retires the session.
    fn finish_session(&mut self, session_id: &str) {
        let Some(session) = self.sessions.remove(session_id) else {
            return;
        };

        info!("Session {} completed", session_id);
        for (id, message) in results::aggregate(&session.participants, &self.registry) {
            self.registry.send(id, message);
        }
        for participant in session.participants {
            self.registry.clear_session(participant);
        }
    }

    /// Drains the lounge into new sessions, two most-senior entries at a
    /// time, leaving an odd leftover queued. Called at a fixed interval by
    /// the server loop.
    pub fn pairing_tick(&mut self) {
        while let Some((first, second)) = self.lounge.take_pair() {
            let session_id = self.sessions.create(first, second);
            info!(
                "Paired connections {} and {} into session {}",
                first, second, session_id
            );

            for participant in [first, second] {
                self.registry.begin_session(participant, session_id.clone());
                self.registry.send(participant, ServerMessage::Start);
            }
        }
    }

    pub fn connected(&self) -> usize {
        self.registry.len()
    }

    pub fn queued(&self) -> usize {
        self.lounge.len()
    }

    pub fn active_sessions(&self) -> usize {
        self.sessions.len()
    }
}
