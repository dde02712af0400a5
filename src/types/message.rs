//! Message types published to the rendering layer.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// A chat message being reconstructed from a run's event stream.
///
/// `content` is sparse: a slot no step has written yet is `None` and
/// serializes as `null`, the way the renderer expects holes.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub message_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_message_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conversation_id: Option<String>,
    #[serde(default)]
    pub content: Vec<Option<ContentPart>>,
    /// Fields of the source entry this message was cloned from, carried verbatim.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl Message {
    /// Create an empty message with the given id.
    pub fn new(message_id: impl Into<String>) -> Self {
        Self {
            message_id: message_id.into(),
            ..Default::default()
        }
    }

    /// Clone `template` into a fresh message for a run: new id, empty content.
    pub fn from_template(template: &Message, message_id: impl Into<String>) -> Self {
        Self {
            message_id: message_id.into(),
            content: Vec::new(),
            ..template.clone()
        }
    }

    /// The content part at `index`, if that slot has been written.
    pub fn part(&self, index: usize) -> Option<&ContentPart> {
        self.content.get(index).and_then(Option::as_ref)
    }

    /// Iterate over written content parts, skipping holes.
    pub fn parts(&self) -> impl Iterator<Item = &ContentPart> {
        self.content.iter().flatten()
    }

    /// Extract the text content, concatenating all text parts.
    pub fn text(&self) -> String {
        self.parts()
            .filter_map(|part| match part {
                ContentPart::Text { text, .. } => Some(text.as_str()),
                _ => None,
            })
            .collect::<Vec<_>>()
            .join("")
    }

    /// Extract tool calls from this message.
    pub fn tool_calls(&self) -> Vec<&ToolCallPart> {
        self.parts()
            .filter_map(|part| match part {
                ContentPart::ToolCall { tool_call } => Some(tool_call),
                _ => None,
            })
            .collect()
    }
}

/// A single typed slot of message content.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentPart {
    Text {
        text: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        tool_call_ids: Option<Vec<String>>,
    },
    Think {
        think: String,
    },
    ToolCall {
        tool_call: ToolCallPart,
    },
    ImageUrl {
        image_url: ImageUrl,
    },
    Error {
        error: String,
    },
}

impl ContentPart {
    /// Plain text part.
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text {
            text: text.into(),
            tool_call_ids: None,
        }
    }

    /// Reasoning part.
    pub fn think(think: impl Into<String>) -> Self {
        Self::Think {
            think: think.into(),
        }
    }

    /// An empty part of the given kind, used to open a new content stream.
    pub fn blank(kind: ContentKind) -> Self {
        match kind {
            ContentKind::Text => Self::text(""),
            ContentKind::Think => Self::think(""),
            ContentKind::ToolCall => Self::ToolCall {
                tool_call: ToolCallPart::default(),
            },
            ContentKind::ImageUrl => Self::ImageUrl {
                image_url: ImageUrl::default(),
            },
            ContentKind::Error => Self::Error {
                error: String::new(),
            },
        }
    }

    pub fn kind(&self) -> ContentKind {
        match self {
            Self::Text { .. } => ContentKind::Text,
            Self::Think { .. } => ContentKind::Think,
            Self::ToolCall { .. } => ContentKind::ToolCall,
            Self::ImageUrl { .. } => ContentKind::ImageUrl,
            Self::Error { .. } => ContentKind::Error,
        }
    }
}

/// Known content part kinds.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Display, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ContentKind {
    Text,
    #[strum(to_string = "think", serialize = "reasoning")]
    Think,
    ToolCall,
    ImageUrl,
    Error,
}

/// A tool call streamed into a message.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct ToolCallPart {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    /// Raw argument text; only guaranteed to be valid JSON once complete.
    #[serde(default)]
    pub args: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,
    /// 0 while streaming, 1 once the completion event has been applied.
    #[serde(default)]
    pub progress: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auth: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<i64>,
}

impl ToolCallPart {
    /// Whether the completion event has sealed this call.
    pub fn is_complete(&self) -> bool {
        self.progress >= 1.0
    }
}

/// Image reference content.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct ImageUrl {
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}
