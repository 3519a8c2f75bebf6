use lazy_static::lazy_static;
use regex::Regex;
use serde_json::{Map, Value};
use verdict_domain::{SessionRecord, SessionStore, ToolName, ToolObservation};

lazy_static! {
    static ref TOOL_NAME_FIELD: Regex =
        Regex::new(r#"tool_name=(?:'([^']+)'|"([^"]+)")"#).unwrap();
}

/// Recovers tool invocations from a session, in three tiers of descending
/// trust: typed step objects, execution-log markers, and finally bare tool
/// name mentions in the answer text. Each tier is a total fallback; the
/// first tier that yields anything wins.
#[derive(Debug, Clone, Default)]
pub struct ToolCallExtractor {
    known_tools: Vec<ToolName>,
}

impl ToolCallExtractor {
    pub fn new() -> Self {
        Self::default()
    }

    /// The roster drives the plain-text mention tier; an empty roster
    /// disables it.
    pub fn with_roster<I, T>(roster: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<ToolName>,
    {
        Self { known_tools: roster.into_iter().map(Into::into).collect() }
    }

    /// The authoritative call of the store's current session: the
    /// observation with the largest `(turn_index, fragment_index)`. Older
    /// sessions are invisible by construction. `None` is a valid outcome
    /// the caller scores as "no tool detected".
    pub fn latest(&self, store: &SessionStore) -> Option<ToolObservation> {
        self.latest_in(store.active()?)
    }

    pub fn latest_in(&self, session: &SessionRecord) -> Option<ToolObservation> {
        self.observations(session)
            .into_iter()
            .max_by_key(|observation| observation.position())
    }

    /// Every observation in one session, in discovery order (turn, then
    /// fragment within the turn).
    pub fn observations(&self, session: &SessionRecord) -> Vec<ToolObservation> {
        let structured = self.structured_observations(session);
        if !structured.is_empty() {
            return structured;
        }
        let textual = self.textual_observations(session);
        if !textual.is_empty() {
            return textual;
        }
        self.mention_observations(session)
    }

    fn structured_observations(&self, session: &SessionRecord) -> Vec<ToolObservation> {
        let mut found = Vec::new();
        for (turn_index, turn) in session.turns.iter().enumerate() {
            let Some(steps) = &turn.structured_steps else {
                continue;
            };
            for (fragment_index, step) in steps.iter().enumerate() {
                for call in &step.tool_calls {
                    found.push(ToolObservation {
                        name: call.name.clone(),
                        arguments: call.arguments.clone(),
                        session_id: session.id.clone(),
                        turn_index,
                        fragment_index,
                    });
                }
            }
        }
        found
    }

    fn textual_observations(&self, session: &SessionRecord) -> Vec<ToolObservation> {
        let mut found = Vec::new();
        for (turn_index, turn) in session.turns.iter().enumerate() {
            for (fragment_index, fragment) in turn.raw_fragments.iter().enumerate() {
                let parsed = if fragment.contains("tool_name=") {
                    parse_new_marker(fragment)
                } else if fragment.contains("Tool:") {
                    parse_old_marker(fragment)
                } else {
                    None
                };
                if let Some((name, arguments)) = parsed {
                    found.push(ToolObservation {
                        name,
                        arguments,
                        session_id: session.id.clone(),
                        turn_index,
                        fragment_index,
                    });
                }
            }
        }
        found
    }

    fn mention_observations(&self, session: &SessionRecord) -> Vec<ToolObservation> {
        let mut found = Vec::new();
        for (turn_index, turn) in session.turns.iter().enumerate() {
            let haystack = turn.final_output.to_lowercase();
            let mention = self
                .known_tools
                .iter()
                .find(|tool| haystack.contains(&tool.as_str().to_lowercase()));
            if let Some(tool) = mention {
                let mut observation = ToolObservation::new(tool.clone(), session.id.clone());
                observation.turn_index = turn_index;
                found.push(observation);
            }
        }
        found
    }
}

/// Old execution-log format: `Tool:<name> Args:<dict-repr>`. The name is
/// usable even when the argument payload is not.
fn parse_old_marker(fragment: &str) -> Option<(ToolName, Map<String, Value>)> {
    let index = fragment.find("Tool:")?;
    let name = fragment[index + "Tool:".len()..]
        .split_whitespace()
        .next()?
        .to_string();
    if name.is_empty() {
        return None;
    }

    let arguments = match fragment.find("Args:") {
        Some(args_index) => {
            let payload = &fragment[args_index + "Args:".len()..];
            match verdict_args::from_dict_repr(payload) {
                Ok(map) => verdict_args::refine_values(map),
                Err(e) => {
                    tracing::debug!(error = %e, "old-format argument payload unparseable");
                    Map::new()
                }
            }
        }
        None => Map::new(),
    };
    Some((ToolName::new(name), arguments))
}

/// New execution-log format: `call_id='…' tool_name='<name>'
/// arguments='<json>'`, either quote style, payload possibly truncated.
fn parse_new_marker(fragment: &str) -> Option<(ToolName, Map<String, Value>)> {
    let captures = TOOL_NAME_FIELD.captures(fragment)?;
    let name = captures.get(1).or_else(|| captures.get(2))?.as_str();
    let arguments = arguments_payload(fragment)
        .map(|payload| verdict_args::refine_values(verdict_args::from_json_fragment(payload)))
        .unwrap_or_default();
    Some((ToolName::new(name), arguments))
}

/// The quoted span following `arguments=`. Double-quoted payloads that
/// themselves contain JSON double quotes cannot be delimited by quote
/// scanning; those are handed over whole for brace counting to sort out.
fn arguments_payload(fragment: &str) -> Option<&str> {
    let start = fragment.find("arguments=")? + "arguments=".len();
    let rest = fragment.get(start..)?;
    let quote = rest.chars().next()?;
    if quote != '\'' && quote != '"' {
        return None;
    }
    let tail = &rest[1..];
    if quote == '"' && tail.contains('{') {
        return Some(tail);
    }

    let bytes = tail.as_bytes();
    let mut end = tail.len();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == quote as u8 && (i == 0 || bytes[i - 1] != b'\\') {
            end = i;
            break;
        }
        i += 1;
    }
    Some(&tail[..end])
}
