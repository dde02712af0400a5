//! Per-run in-progress messages.

use std::collections::HashMap;

use crate::error::{ReducerError, Result};
use crate::merge::merge_into_message;
use crate::types::{ContentFragment, ContentPart, Message};

/// Owns the message each active run is building.
///
/// Updates replace the stored value with a merged copy, and only when every
/// fragment of the update merged cleanly.
#[derive(Debug, Default, Clone)]
pub struct MessageAccumulator {
    messages: HashMap<String, Message>,
}

impl MessageAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, run_id: &str) -> Option<&Message> {
        self.messages.get(run_id)
    }

    pub fn contains(&self, run_id: &str) -> bool {
        self.messages.contains_key(run_id)
    }

    pub fn insert(&mut self, run_id: impl Into<String>, message: Message) {
        self.messages.insert(run_id.into(), message);
    }

    /// Merge one fragment into slot `index` of the run's message.
    pub fn apply(
        &mut self,
        run_id: &str,
        index: usize,
        fragment: &ContentFragment,
        is_final: bool,
    ) -> Result<&Message> {
        self.apply_all(run_id, index, std::slice::from_ref(fragment), is_final)
    }

    /// Merge several fragments into the same slot as one update.
    pub fn apply_all(
        &mut self,
        run_id: &str,
        index: usize,
        fragments: &[ContentFragment],
        is_final: bool,
    ) -> Result<&Message> {
        let slot = self
            .messages
            .get_mut(run_id)
            .ok_or_else(|| ReducerError::UnknownRun {
                run_id: run_id.to_string(),
            })?;
        let mut next = slot.clone();
        for fragment in fragments {
            next = merge_into_message(&next, index, fragment, is_final)?;
        }
        *slot = next;
        Ok(&*slot)
    }

    /// Replace the whole content of the run's message.
    pub fn replace_content(&mut self, run_id: &str, content: Vec<ContentPart>) -> Result<&Message> {
        let slot = self
            .messages
            .get_mut(run_id)
            .ok_or_else(|| ReducerError::UnknownRun {
                run_id: run_id.to_string(),
            })?;
        slot.content = content.into_iter().map(Some).collect();
        Ok(&*slot)
    }

    pub fn remove(&mut self, run_id: &str) -> Option<Message> {
        self.messages.remove(run_id)
    }

    pub fn clear(&mut self) {
        self.messages.clear();
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}
