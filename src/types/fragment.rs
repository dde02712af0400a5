//! Incoming content fragments carried by delta events.

use serde::{Deserialize, Deserializer};

use super::message::{ContentKind, ImageUrl};

/// One incremental piece of content addressed to a message slot.
///
/// Decoded from `{"type": ..., ...}` objects (`kind` is accepted in place of
/// `type`). Kinds the engine does not know decode to [`ContentFragment::Unknown`]
/// instead of failing, so the reducer can skip them.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(try_from = "RawFragment")]
pub enum ContentFragment {
    Text {
        text: String,
        tool_call_ids: Option<Vec<String>>,
    },
    Think {
        think: String,
    },
    ToolCall(ToolCallFragment),
    ImageUrl {
        image_url: ImageUrl,
    },
    Error {
        error: String,
    },
    Unknown {
        kind: String,
    },
}

impl ContentFragment {
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text {
            text: text.into(),
            tool_call_ids: None,
        }
    }

    pub fn think(think: impl Into<String>) -> Self {
        Self::Think {
            think: think.into(),
        }
    }

    /// The known kind of this fragment, or `None` for [`ContentFragment::Unknown`].
    pub fn kind(&self) -> Option<ContentKind> {
        match self {
            Self::Text { .. } => Some(ContentKind::Text),
            Self::Think { .. } => Some(ContentKind::Think),
            Self::ToolCall(_) => Some(ContentKind::ToolCall),
            Self::ImageUrl { .. } => Some(ContentKind::ImageUrl),
            Self::Error { .. } => Some(ContentKind::Error),
            Self::Unknown { .. } => None,
        }
    }

    /// The wire name of this fragment's kind, including unrecognized ones.
    pub fn kind_name(&self) -> String {
        match self {
            Self::Unknown { kind } => kind.clone(),
            known => known.kind().map(|kind| kind.to_string()).unwrap_or_default(),
        }
    }
}

/// A partial or complete tool call.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ToolCallFragment {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "text_or_json")]
    pub args: Option<String>,
    #[serde(default, deserialize_with = "text_or_json")]
    pub output: Option<String>,
    #[serde(default)]
    pub auth: Option<String>,
    #[serde(default, alias = "expiresAt")]
    pub expires_at: Option<i64>,
}

impl ToolCallFragment {
    /// Argument-only fragment, as streamed while a call is open.
    pub fn args(args: impl Into<String>) -> Self {
        Self {
            args: Some(args.into()),
            ..Default::default()
        }
    }
}

/// Accept a JSON string verbatim, or render any other JSON value as compact text.
pub(crate) fn text_or_json<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        None | Some(serde_json::Value::Null) => None,
        Some(serde_json::Value::String(s)) => Some(s),
        Some(other) => Some(other.to_string()),
    })
}

#[derive(Deserialize)]
struct RawFragment {
    #[serde(rename = "type", alias = "kind", default)]
    kind: String,
    #[serde(default)]
    text: Option<String>,
    #[serde(default)]
    think: Option<String>,
    #[serde(default)]
    tool_call_ids: Option<Vec<String>>,
    #[serde(default)]
    tool_call: Option<ToolCallFragment>,
    #[serde(default)]
    image_url: Option<ImageUrl>,
    #[serde(default)]
    error: Option<String>,
}

impl TryFrom<RawFragment> for ContentFragment {
    type Error = String;

    fn try_from(raw: RawFragment) -> Result<Self, String> {
        let Ok(kind) = raw.kind.parse::<ContentKind>() else {
            return Ok(Self::Unknown { kind: raw.kind });
        };
        let missing = |field: &str| format!("{kind} fragment without `{field}`");
        match kind {
            ContentKind::Text => Ok(Self::Text {
                text: raw.text.ok_or_else(|| missing("text"))?,
                tool_call_ids: raw.tool_call_ids,
            }),
            ContentKind::Think => Ok(Self::Think {
                think: raw
                    .think
                    .or(raw.text)
                    .ok_or_else(|| missing("think"))?,
            }),
            ContentKind::ToolCall => Ok(Self::ToolCall(
                raw.tool_call.ok_or_else(|| missing("tool_call"))?,
            )),
            ContentKind::ImageUrl => Ok(Self::ImageUrl {
                image_url: raw.image_url.ok_or_else(|| missing("image_url"))?,
            }),
            ContentKind::Error => Ok(ContentFragment::Error {
                error: raw.error.unwrap_or_default(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn decodes_kind_alias_and_think_text_fallback() {
        let fragment: ContentFragment =
            serde_json::from_value(json!({"kind": "think", "text": "hmm"})).unwrap();
        assert_eq!(fragment, ContentFragment::think("hmm"));
    }

    #[test]
    fn unknown_kind_is_preserved() {
        let fragment: ContentFragment =
            serde_json::from_value(json!({"type": "video", "url": "x"})).unwrap();
        assert_eq!(
            fragment,
            ContentFragment::Unknown {
                kind: "video".to_string()
            }
        );
        assert_eq!(fragment.kind(), None);
    }

    #[test]
    fn text_fragment_requires_text() {
        let result: Result<ContentFragment, _> = serde_json::from_value(json!({"type": "text"}));
        assert!(result.is_err());
    }

    #[test]
    fn structured_args_render_as_json_text() {
        let fragment: ToolCallFragment =
            serde_json::from_value(json!({"id": "tc1", "args": {"q": "x"}, "output": 42})).unwrap();
        assert_eq!(fragment.args.as_deref(), Some(r#"{"q":"x"}"#));
        assert_eq!(fragment.output.as_deref(), Some("42"));
    }
}
