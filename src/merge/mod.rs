//! Type-specific merging of incoming fragments into message content.
//!
//! Everything here is pure: inputs are borrowed, results are new values.

use crate::error::{ReducerError, Result};
use crate::types::{ContentFragment, ContentPart, Message, ToolCallFragment, ToolCallPart};

/// Highest content slot a step may address.
pub const MAX_CONTENT_INDEX: usize = 1024;

/// Merge `fragment` into the part currently occupying a slot.
///
/// Text and reasoning accumulate by plain concatenation. Tool-call arguments
/// accumulate while streaming and are replaced by the complete payload when
/// `is_final` is set, which also seals the call. Images and errors replace.
///
/// A missing slot, or a slot holding a different kind, starts from a blank
/// part of the fragment's kind.
pub fn merge_part(
    existing: Option<&ContentPart>,
    fragment: &ContentFragment,
    is_final: bool,
) -> Result<ContentPart> {
    let kind = fragment
        .kind()
        .ok_or_else(|| ReducerError::UnrecognizedContentKind(fragment.kind_name()))?;

    // A completed tool call keeps its slot, whatever kind arrives next.
    if let Some(ContentPart::ToolCall { tool_call }) = existing {
        if tool_call.is_complete() {
            return Err(ReducerError::ToolCallSealed {
                tool_call_id: tool_call.id.clone(),
            });
        }
    }

    let base = match existing {
        Some(part) if part.kind() == kind => part.clone(),
        Some(part) => {
            tracing::debug!(
                existing = %part.kind(),
                incoming = %kind,
                "content slot changed kind, starting from blank"
            );
            ContentPart::blank(kind)
        }
        None => ContentPart::blank(kind),
    };

    let merged = match (base, fragment) {
        (
            ContentPart::Text {
                mut text,
                tool_call_ids: prior_ids,
            },
            ContentFragment::Text {
                text: delta,
                tool_call_ids,
            },
        ) => {
            text.push_str(delta);
            ContentPart::Text {
                text,
                tool_call_ids: tool_call_ids.clone().or(prior_ids),
            }
        }
        (ContentPart::Think { mut think }, ContentFragment::Think { think: delta }) => {
            think.push_str(delta);
            ContentPart::Think { think }
        }
        (ContentPart::ToolCall { tool_call }, ContentFragment::ToolCall(incoming)) => {
            ContentPart::ToolCall {
                tool_call: merge_tool_call(Some(&tool_call), incoming, is_final)?,
            }
        }
        (_, ContentFragment::ImageUrl { image_url }) => ContentPart::ImageUrl {
            image_url: image_url.clone(),
        },
        (_, ContentFragment::Error { error }) => ContentPart::Error {
            error: error.clone(),
        },
        (base, fragment) => {
            return Err(ReducerError::MalformedEvent(format!(
                "cannot merge {} fragment into {} part",
                fragment.kind_name(),
                base.kind()
            )));
        }
    };
    Ok(merged)
}

/// Merge one tool-call fragment into the call accumulated so far.
pub fn merge_tool_call(
    existing: Option<&ToolCallPart>,
    incoming: &ToolCallFragment,
    is_final: bool,
) -> Result<ToolCallPart> {
    let current = existing.cloned().unwrap_or_default();
    if current.is_complete() {
        return Err(ReducerError::ToolCallSealed {
            tool_call_id: current.id,
        });
    }

    let args = match (&incoming.args, is_final) {
        (Some(complete), true) => complete.clone(),
        // A completion without args keeps what was streamed.
        (None, true) => current.args,
        (fragment, false) => {
            let mut acc = current.args;
            acc.push_str(fragment.as_deref().unwrap_or_default());
            acc
        }
    };

    let mut merged = ToolCallPart {
        id: non_empty(incoming.id.as_deref()).unwrap_or(current.id),
        name: non_empty(incoming.name.as_deref()).unwrap_or(current.name),
        args,
        output: current.output,
        progress: current.progress,
        auth: incoming.auth.clone().or(current.auth),
        expires_at: incoming.expires_at.or(current.expires_at),
    };
    if is_final {
        merged.progress = 1.0;
        merged.output = incoming.output.clone().or(merged.output);
    }
    Ok(merged)
}

/// Apply `fragment` at `index`, returning the updated copy of `message`.
///
/// Slots between the current end of content and `index` are left as holes.
pub fn merge_into_message(
    message: &Message,
    index: usize,
    fragment: &ContentFragment,
    is_final: bool,
) -> Result<Message> {
    if index > MAX_CONTENT_INDEX {
        return Err(ReducerError::MalformedEvent(format!(
            "content index {index} exceeds {MAX_CONTENT_INDEX}"
        )));
    }
    let merged = merge_part(message.part(index), fragment, is_final)?;
    let mut next = message.clone();
    if next.content.len() <= index {
        next.content.resize(index + 1, None);
    }
    next.content[index] = Some(merged);
    Ok(next)
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value.filter(|v| !v.is_empty()).map(str::to_string)
}
