use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::{SessionId, ToolName};

/// One detected instance of the agent invoking a named capability.
///
/// `(turn_index, fragment_index)` orders observations chronologically within
/// a session; the largest pair is the agent's final decision.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolObservation {
    pub name: ToolName,
    pub arguments: Map<String, Value>,
    pub session_id: SessionId,
    pub turn_index: usize,
    pub fragment_index: usize,
}

impl ToolObservation {
    pub fn new(name: impl Into<ToolName>, session_id: SessionId) -> Self {
        Self {
            name: name.into(),
            arguments: Map::new(),
            session_id,
            turn_index: 0,
            fragment_index: 0,
        }
    }

    pub fn position(&self) -> (usize, usize) {
        (self.turn_index, self.fragment_index)
    }
}
