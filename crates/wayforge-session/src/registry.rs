//! The session registry: at most one running game per participant.
//!
//! # Concurrency note
//!
//! Like every registry in Wayforge, this is a plain `HashMap` with no
//! locking. It is owned by the [`GameManager`](crate::GameManager), which is
//! owned by the engine actor, and only that one task ever touches it.

use std::collections::HashMap;

use wayforge_protocol::ParticipantId;

use crate::{GameError, GameSession};

/// Maps each participant to their running [`GameSession`].
#[derive(Debug, Default)]
pub struct SessionRegistry {
    sessions: HashMap<ParticipantId, GameSession>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, participant: &ParticipantId) -> Option<&GameSession> {
        self.sessions.get(participant)
    }

    pub fn get_mut(&mut self, participant: &ParticipantId) -> Option<&mut GameSession> {
        self.sessions.get_mut(participant)
    }

    /// Adds a session keyed by its participant.
    ///
    /// # Errors
    /// Returns [`GameError::AlreadyInGame`] if the participant already has
    /// one. The existing session is left untouched.
    pub fn insert(&mut self, session: GameSession) -> Result<(), GameError> {
        let participant = session.participant();
        if self.sessions.contains_key(&participant) {
            return Err(GameError::AlreadyInGame(participant));
        }
        self.sessions.insert(participant, session);
        Ok(())
    }

    pub fn remove(&mut self, participant: &ParticipantId) -> Option<GameSession> {
        self.sessions.remove(participant)
    }

    pub fn contains(&self, participant: &ParticipantId) -> bool {
        self.sessions.contains_key(participant)
    }

    /// Participants with a session, in no particular order.
    pub fn participants(&self) -> Vec<ParticipantId> {
        self.sessions.keys().copied().collect()
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use wayforge_protocol::Location;

    use super::*;

    fn session(id: u64) -> GameSession {
        let here = Location::new("world", 0.0, 64.0, 0.0);
        GameSession::new(ParticipantId(id), here.clone(), here.clone(), here, 60)
    }

    #[test]
    fn test_insert_then_get() {
        let mut reg = SessionRegistry::new();
        reg.insert(session(1)).unwrap();

        assert!(reg.contains(&ParticipantId(1)));
        assert_eq!(reg.get(&ParticipantId(1)).unwrap().remaining_secs(), 60);
        assert_eq!(reg.len(), 1);
    }

    #[test]
    fn test_insert_duplicate_returns_already_in_game() {
        let mut reg = SessionRegistry::new();
        reg.insert(session(1)).unwrap();

        let result = reg.insert(session(1));

        assert!(matches!(result, Err(GameError::AlreadyInGame(p)) if p == ParticipantId(1)));
        assert_eq!(reg.len(), 1);
    }

    #[test]
    fn test_remove_twice_returns_none_second_time() {
        let mut reg = SessionRegistry::new();
        reg.insert(session(1)).unwrap();

        assert!(reg.remove(&ParticipantId(1)).is_some());
        assert!(reg.remove(&ParticipantId(1)).is_none());
        assert!(reg.is_empty());
    }

    #[test]
    fn test_participants_lists_every_key() {
        let mut reg = SessionRegistry::new();
        reg.insert(session(1)).unwrap();
        reg.insert(session(2)).unwrap();

        let mut ids = reg.participants();
        ids.sort();
        assert_eq!(ids, vec![ParticipantId(1), ParticipantId(2)]);
    }
}
