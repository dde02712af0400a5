//! Wire protocol: decoding transport frames into [`StreamEvent`]s.
//!
//! A frame is a JSON object `{"event": <name>, "data": <payload>}`. Event names
//! are matched against a closed set ([`EventKind`]); anything else decodes to
//! [`StreamEvent::Unknown`] so the reducer can skip it without failing.

use serde::{Deserialize, Deserializer};
use strum::{Display, EnumString};

use crate::error::{ReducerError, Result};
use crate::types::{ContentFragment, RunStep, StepKind, ToolCallFragment};

/// Known event kinds. Parses both backend names and short aliases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString)]
pub enum EventKind {
    #[strum(to_string = "on_run_step", serialize = "step_declared")]
    StepDeclared,
    #[strum(to_string = "on_agent_update", serialize = "status_update")]
    StatusUpdate,
    #[strum(to_string = "on_message_delta", serialize = "text_delta")]
    TextDelta,
    #[strum(to_string = "on_reasoning_delta", serialize = "reasoning_delta")]
    ReasoningDelta,
    #[strum(to_string = "on_run_step_delta", serialize = "step_delta")]
    StepDelta,
    #[strum(to_string = "on_run_step_completed", serialize = "step_completed")]
    StepCompleted,
}

/// One decoded protocol event.
#[derive(Debug, Clone, PartialEq)]
pub enum StreamEvent {
    StepDeclared(StepDeclared),
    StatusUpdate(StatusUpdate),
    TextDelta(MessageDelta),
    ReasoningDelta(MessageDelta),
    StepDelta(StepDelta),
    StepCompleted(StepCompleted),
    Unknown { event: String },
}

impl StreamEvent {
    pub fn kind(&self) -> Option<EventKind> {
        match self {
            Self::StepDeclared(_) => Some(EventKind::StepDeclared),
            Self::StatusUpdate(_) => Some(EventKind::StatusUpdate),
            Self::TextDelta(_) => Some(EventKind::TextDelta),
            Self::ReasoningDelta(_) => Some(EventKind::ReasoningDelta),
            Self::StepDelta(_) => Some(EventKind::StepDelta),
            Self::StepCompleted(_) => Some(EventKind::StepCompleted),
            Self::Unknown { .. } => None,
        }
    }

    /// Build an event from its name and raw payload.
    pub fn from_parts(event: &str, data: serde_json::Value) -> Result<Self> {
        let Ok(kind) = event.parse::<EventKind>() else {
            return Ok(Self::Unknown {
                event: event.to_string(),
            });
        };
        let malformed = |e: serde_json::Error| ReducerError::MalformedEvent(format!("{kind}: {e}"));
        let decoded = match kind {
            EventKind::StepDeclared => Self::StepDeclared(serde_json::from_value(data).map_err(malformed)?),
            EventKind::StatusUpdate => Self::StatusUpdate(serde_json::from_value(data).map_err(malformed)?),
            EventKind::TextDelta => Self::TextDelta(serde_json::from_value(data).map_err(malformed)?),
            EventKind::ReasoningDelta => {
                Self::ReasoningDelta(serde_json::from_value(data).map_err(malformed)?)
            }
            EventKind::StepDelta => Self::StepDelta(serde_json::from_value(data).map_err(malformed)?),
            EventKind::StepCompleted => {
                Self::StepCompleted(serde_json::from_value(data).map_err(malformed)?)
            }
        };
        Ok(decoded)
    }
}

#[derive(Deserialize)]
struct Frame {
    event: String,
    #[serde(default)]
    data: serde_json::Value,
}

/// Decode one transport frame.
pub fn decode_frame(raw: &str) -> Result<StreamEvent> {
    let frame: Frame = serde_json::from_str(raw)?;
    StreamEvent::from_parts(&frame.event, frame.data)
}

/// A step announcement: which run it belongs to and which slot it writes.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StepDeclared {
    pub id: String,
    #[serde(default, alias = "run_id")]
    pub run_id: String,
    pub index: usize,
    #[serde(default, alias = "step_details")]
    pub step_details: StepDetails,
}

impl StepDeclared {
    /// A plain (message-creation) step.
    pub fn new(id: impl Into<String>, run_id: impl Into<String>, index: usize) -> Self {
        Self {
            id: id.into(),
            run_id: run_id.into(),
            index,
            step_details: StepDetails::MessageCreation,
        }
    }

    /// Turn this into a tool-call step announcing `tool_calls`.
    pub fn with_tool_calls(mut self, tool_calls: Vec<ToolCallRef>) -> Self {
        self.step_details = StepDetails::ToolCalls { tool_calls };
        self
    }

    pub fn kind(&self) -> StepKind {
        match self.step_details {
            StepDetails::ToolCalls { .. } => StepKind::ToolCalls,
            StepDetails::MessageCreation | StepDetails::Other => StepKind::MessageCreation,
        }
    }

    pub fn tool_calls(&self) -> &[ToolCallRef] {
        match &self.step_details {
            StepDetails::ToolCalls { tool_calls } => tool_calls,
            _ => &[],
        }
    }

    pub fn to_run_step(&self) -> RunStep {
        RunStep::new(self.id.clone(), self.run_id.clone(), self.index, self.kind())
    }
}

/// Step payload details, tagged by `type`.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StepDetails {
    #[default]
    MessageCreation,
    ToolCalls {
        #[serde(default)]
        tool_calls: Vec<ToolCallRef>,
    },
    /// Step types this client does not render specially.
    #[serde(other)]
    Other,
}

/// A tool call announced by a step.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct ToolCallRef {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
}

impl ToolCallRef {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

/// A self-contained status snapshot for a run.
///
/// Accepts `{runId, text}` as well as the same fields nested under
/// `agent_update`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(try_from = "RawStatusUpdate")]
pub struct StatusUpdate {
    pub run_id: String,
    pub text: String,
}

impl StatusUpdate {
    pub fn new(run_id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            run_id: run_id.into(),
            text: text.into(),
        }
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawStatusUpdate {
    #[serde(default, alias = "run_id")]
    run_id: Option<String>,
    #[serde(default)]
    text: Option<String>,
    #[serde(default, alias = "agent_update")]
    agent_update: Option<Box<RawStatusUpdate>>,
}

impl TryFrom<RawStatusUpdate> for StatusUpdate {
    type Error = String;

    fn try_from(raw: RawStatusUpdate) -> std::result::Result<Self, String> {
        let (inner_run, inner_text) = match raw.agent_update {
            Some(inner) => (inner.run_id, inner.text),
            None => (None, None),
        };
        let text = raw
            .text
            .or(inner_text)
            .ok_or_else(|| "status update without `text`".to_string())?;
        Ok(Self {
            run_id: raw.run_id.or(inner_run).unwrap_or_default(),
            text,
        })
    }
}

/// Text or reasoning delta addressed to a step.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct MessageDelta {
    #[serde(alias = "stepRefId")]
    pub id: String,
    pub delta: MessageDeltaBody,
}

impl MessageDelta {
    pub fn new(step_id: impl Into<String>, fragment: ContentFragment) -> Self {
        Self {
            id: step_id.into(),
            delta: MessageDeltaBody {
                content: vec![fragment],
            },
        }
    }

    pub fn text(step_id: impl Into<String>, text: impl Into<String>) -> Self {
        Self::new(step_id, ContentFragment::text(text))
    }

    pub fn think(step_id: impl Into<String>, think: impl Into<String>) -> Self {
        Self::new(step_id, ContentFragment::think(think))
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct MessageDeltaBody {
    /// A single fragment or a list; only the first is applied.
    #[serde(default, deserialize_with = "one_or_many")]
    pub content: Vec<ContentFragment>,
}

/// Tool-call argument streaming for a step.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct StepDelta {
    #[serde(alias = "stepRefId")]
    pub id: String,
    pub delta: StepDeltaBody,
}

impl StepDelta {
    /// Argument fragment for the step's tool call, without an explicit call id.
    pub fn args(step_id: impl Into<String>, args: impl Into<String>) -> Self {
        Self::tool_calls(step_id, vec![ToolCallFragment::args(args)])
    }

    pub fn tool_calls(step_id: impl Into<String>, tool_calls: Vec<ToolCallFragment>) -> Self {
        Self {
            id: step_id.into(),
            delta: StepDeltaBody {
                kind: Some(StepKind::ToolCalls.to_string()),
                tool_calls,
                auth: None,
                expires_at: None,
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct StepDeltaBody {
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub tool_calls: Vec<ToolCallFragment>,
    /// Applies to every call in this delta that carries no auth of its own.
    #[serde(default)]
    pub auth: Option<String>,
    #[serde(default, alias = "expiresAt")]
    pub expires_at: Option<i64>,
}

/// Completion of a tool-call step with its materialized result.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct StepCompleted {
    pub result: StepResult,
}

impl StepCompleted {
    pub fn new(step_id: impl Into<String>, tool_call: ToolCallFragment) -> Self {
        Self {
            result: StepResult {
                id: step_id.into(),
                tool_call,
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct StepResult {
    #[serde(alias = "stepRefId")]
    pub id: String,
    pub tool_call: ToolCallFragment,
}

fn one_or_many<'de, D, T>(deserializer: D) -> std::result::Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany<T> {
        Many(Vec<T>),
        One(T),
    }

    Ok(match OneOrMany::deserialize(deserializer)? {
        OneOrMany::Many(items) => items,
        OneOrMany::One(item) => vec![item],
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn event_kind_parses_backend_names_and_aliases() {
        assert_eq!("on_run_step".parse::<EventKind>().unwrap(), EventKind::StepDeclared);
        assert_eq!("step_delta".parse::<EventKind>().unwrap(), EventKind::StepDelta);
        assert_eq!(EventKind::ReasoningDelta.to_string(), "on_reasoning_delta");
        assert!("on_chain_end".parse::<EventKind>().is_err());
    }

    #[test]
    fn unknown_step_type_is_plain() {
        let step: StepDeclared = serde_json::from_value(serde_json::json!({
            "id": "s1",
            "runId": "r1",
            "index": 0,
            "stepDetails": {"type": "retrieval"}
        }))
        .unwrap();
        assert_eq!(step.kind(), StepKind::MessageCreation);
        assert!(step.tool_calls().is_empty());
    }
}
