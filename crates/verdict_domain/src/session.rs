use std::fmt::Display;

use serde::{Deserialize, Serialize};

use crate::TurnRecord;

/// Identifier of one evaluation conversation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(String);

impl SessionId {
    pub fn new(value: impl ToString) -> Self {
        SessionId(value.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for SessionId {
    fn from(value: String) -> Self {
        SessionId::new(value)
    }
}

impl From<&str> for SessionId {
    fn from(value: &str) -> Self {
        SessionId::new(value)
    }
}

impl Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Ordered turns of one test case's conversation. Appended to once per turn,
/// never mutated afterward.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionRecord {
    pub id: SessionId,
    pub turns: Vec<TurnRecord>,
}

impl SessionRecord {
    pub fn new(id: SessionId) -> Self {
        Self { id, turns: Vec::new() }
    }

    /// Appends a turn and returns its index within the session.
    pub fn push_turn(&mut self, turn: TurnRecord) -> usize {
        self.turns.push(turn);
        self.turns.len() - 1
    }

    pub fn latest_turn(&self) -> Option<&TurnRecord> {
        self.turns.last()
    }
}

/// Ordered list of sessions with an explicit active pointer.
///
/// Extraction must only ever consult the most recently created session; a
/// leak from an older session into a current test case's metrics is a
/// correctness bug. The pointer makes that rule explicit instead of relying
/// on map insertion order.
#[derive(Debug, Clone, Default)]
pub struct SessionStore {
    sessions: Vec<SessionRecord>,
    active: Option<usize>,
    created: usize,
}

impl SessionStore {
    /// Opens a new session, makes it active, and returns its id.
    pub fn begin(&mut self) -> SessionId {
        let id = SessionId::new(format!("eval_session_{}", self.created));
        self.created += 1;
        self.sessions.push(SessionRecord::new(id.clone()));
        self.active = Some(self.sessions.len() - 1);
        id
    }

    pub fn active(&self) -> Option<&SessionRecord> {
        self.active.and_then(|index| self.sessions.get(index))
    }

    pub fn active_mut(&mut self) -> Option<&mut SessionRecord> {
        self.active.and_then(|index| self.sessions.get_mut(index))
    }

    pub fn get(&self, id: &SessionId) -> Option<&SessionRecord> {
        self.sessions.iter().find(|session| &session.id == id)
    }

    /// Appends a turn to the active session. Returns the turn index, or
    /// `None` when no session is active.
    pub fn push_turn(&mut self, turn: TurnRecord) -> Option<usize> {
        self.active_mut().map(|session| session.push_turn(turn))
    }

    /// Drops a session by id. When the active session is removed, the
    /// pointer falls back to the most recently created survivor.
    pub fn remove(&mut self, id: &SessionId) -> bool {
        let Some(position) = self.sessions.iter().position(|s| &s.id == id) else {
            return false;
        };
        self.sessions.remove(position);
        self.active = match self.active {
            Some(active) if active == position => {
                if self.sessions.is_empty() {
                    None
                } else {
                    Some(self.sessions.len() - 1)
                }
            }
            Some(active) if active > position => Some(active - 1),
            other => other,
        };
        true
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
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::TransportKind;

    #[test]
    fn test_begin_activates_latest_session() {
        let mut fixture = SessionStore::default();
        fixture.begin();
        let second = fixture.begin();

        let actual = fixture.active().map(|s| s.id.clone());
        assert_eq!(actual, Some(second));
    }

    #[test]
    fn test_session_ids_stay_unique_after_removal() {
        let mut fixture = SessionStore::default();
        let first = fixture.begin();
        fixture.remove(&first);
        let second = fixture.begin();

        assert_eq!(second == first, false);
    }

    #[test]
    fn test_push_turn_without_active_session() {
        let mut fixture = SessionStore::default();
        let actual = fixture.push_turn(TurnRecord::new("q", TransportKind::Streaming));
        assert_eq!(actual, None);
    }

    #[test]
    fn test_push_turn_appends_in_order() {
        let mut fixture = SessionStore::default();
        fixture.begin();
        fixture.push_turn(TurnRecord::new("first", TransportKind::Streaming));
        let actual = fixture.push_turn(TurnRecord::new("second", TransportKind::Streaming));

        assert_eq!(actual, Some(1));
        assert_eq!(fixture.active().map(|s| s.turns.len()), Some(2));
    }

    #[test]
    fn test_remove_active_falls_back_to_latest_survivor() {
        let mut fixture = SessionStore::default();
        let first = fixture.begin();
        let second = fixture.begin();
        fixture.remove(&second);

        let actual = fixture.active().map(|s| s.id.clone());
        assert_eq!(actual, Some(first));
    }

    #[test]
    fn test_remove_earlier_session_keeps_active_pointer() {
        let mut fixture = SessionStore::default();
        let first = fixture.begin();
        let second = fixture.begin();
        fixture.remove(&first);

        let actual = fixture.active().map(|s| s.id.clone());
        assert_eq!(actual, Some(second.clone()));
        assert_eq!(fixture.get(&first), None);
        assert_eq!(fixture.get(&second).map(|s| s.id.clone()), Some(second));
    }

    #[test]
    fn test_remove_unknown_session() {
        let mut fixture = SessionStore::default();
        fixture.begin();
        let actual = fixture.remove(&SessionId::from("missing"));
        assert_eq!(actual, false);
        assert_eq!(fixture.len(), 1);
    }
}
