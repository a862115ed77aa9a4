//! Game sessions and the manager that owns them
//!
//! A session is a paired two-player game instance. Its state machine is
//! deliberately small: `Active` on creation, `Completed` the instant both
//! participants have reported a score, and `Completed` is terminal. Waiting
//! happens in the lounge before a session exists, so there is no waiting
//! state here.

use crate::registry::ConnectionId;
use std::collections::HashMap;
use uuid::Uuid;

pub type SessionId = String;

/// Source of session ids, injectable so tests can use deterministic ids.
pub trait IdSource: Send {
    fn new_id(&mut self) -> SessionId;
}

/// Default id source backed by random v4 UUIDs.
#[derive(Debug, Default)]
pub struct UuidSource;

impl IdSource for UuidSource {
    fn new_id(&mut self) -> SessionId {
        Uuid::new_v4().to_string()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Active,
    Completed,
}

/// One in-progress game between exactly two participants.
///
/// Participants are referenced by connection id, fixed at creation. The
/// session does not own the connections; a participant may disconnect and
/// vanish from the registry while the session lives on.
#[derive(Debug, Clone)]
pub struct Session {
    pub id: SessionId,
    pub participants: [ConnectionId; 2],
    pub completed_count: usize,
    pub state: SessionState,
}

impl Session {
    pub fn new(id: SessionId, first: ConnectionId, second: ConnectionId) -> Self {
        Self {
            id,
            participants: [first, second],
            completed_count: 0,
            state: SessionState::Active,
        }
    }

    /// Counts one participant's score report. Returns true exactly once,
    /// on the report that completes the session. Reports against an already
    /// completed session are ignored.
    pub fn record_report(&mut self) -> bool {
        if self.state == SessionState::Completed {
            return false;
        }

        self.completed_count += 1;
        if self.completed_count >= self.participants.len() {
            self.state = SessionState::Completed;
            return true;
        }
        false
    }

    pub fn is_participant(&self, id: ConnectionId) -> bool {
        self.participants.contains(&id)
    }
}

/// Owns the set of in-progress sessions and mints their ids.
pub struct SessionManager {
    sessions: HashMap<SessionId, Session>,
    ids: Box<dyn IdSource>,
}

impl SessionManager {
    pub fn new(ids: Box<dyn IdSource>) -> Self {
        Self {
            sessions: HashMap::new(),
            ids,
        }
    }

    /// Creates and registers a new active session for the given pair,
    /// returning its id.
    pub fn create(&mut self, first: ConnectionId, second: ConnectionId) -> SessionId {
        let id = self.ids.new_id();
        let session = Session::new(id.clone(), first, second);
        self.sessions.insert(id.clone(), session);
        id
    }

    pub fn get(&self, id: &str) -> Option<&Session> {
        self.sessions.get(id)
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut Session> {
        self.sessions.get_mut(id)
    }

    /// Removes a session from the active set once its results are out.
    pub fn remove(&mut self, id: &str) -> Option<Session> {
        self.sessions.remove(id)
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

/// Deterministic id source for tests.
#[cfg(test)]
pub(crate) struct SequentialIds(u32);

#[cfg(test)]
impl SequentialIds {
    pub(crate) fn new() -> Self {
        Self(0)
    }
}

#[cfg(test)]
impl IdSource for SequentialIds {
    fn new_id(&mut self) -> SessionId {
        self.0 += 1;
        format!("session-{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_starts_active() {
        let session = Session::new("session-1".to_string(), 1, 2);
        assert_eq!(session.state, SessionState::Active);
        assert_eq!(session.completed_count, 0);
        assert_eq!(session.participants, [1, 2]);
    }

    #[test]
    fn test_completion_on_second_report() {
        let mut session = Session::new("session-1".to_string(), 1, 2);

        assert!(!session.record_report());
        assert_eq!(session.state, SessionState::Active);
        assert_eq!(session.completed_count, 1);

        assert!(session.record_report());
        assert_eq!(session.state, SessionState::Completed);
        assert_eq!(session.completed_count, 2);
    }

    #[test]
    fn test_completed_is_terminal() {
        let mut session = Session::new("session-1".to_string(), 1, 2);
        session.record_report();
        session.record_report();

        // A report after completion must neither re-complete nor
        // over-increment the counter.
        assert!(!session.record_report());
        assert_eq!(session.completed_count, 2);
        assert_eq!(session.state, SessionState::Completed);
    }

    #[test]
    fn test_is_participant() {
        let session = Session::new("session-1".to_string(), 1, 2);
        assert!(session.is_participant(1));
        assert!(session.is_participant(2));
        assert!(!session.is_participant(3));
    }

    #[test]
    fn test_manager_creates_unique_sessions() {
        let mut manager = SessionManager::new(Box::new(SequentialIds::new()));

        let first = manager.create(1, 2);
        let second = manager.create(3, 4);

        assert_ne!(first, second);
        assert_eq!(manager.len(), 2);
        assert_eq!(manager.get(&first).unwrap().participants, [1, 2]);
        assert_eq!(manager.get(&second).unwrap().participants, [3, 4]);
    }

    #[test]
    fn test_manager_remove() {
        let mut manager = SessionManager::new(Box::new(SequentialIds::new()));
        let id = manager.create(1, 2);

        let session = manager.remove(&id).unwrap();
        assert_eq!(session.id, id);
        assert!(manager.is_empty());
        assert!(manager.remove(&id).is_none());
    }

    #[test]
    fn test_uuid_source_yields_distinct_ids() {
        let mut ids = UuidSource;
        assert_ne!(ids.new_id(), ids.new_id());
    }
}
