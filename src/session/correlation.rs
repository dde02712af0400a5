//! Step id -> tool-call id correlation.

use std::collections::HashMap;

/// Remembers which tool call a step streams, for deltas that omit the id.
#[derive(Debug, Default, Clone)]
pub struct ToolCallCorrelationTable {
    by_step: HashMap<String, String>,
}

impl ToolCallCorrelationTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Correlate `tool_call_id` with `step_id`.
    ///
    /// The first non-empty id recorded for a step is kept; repeating it is a
    /// no-op. Returns whether the table now maps the step to this id.
    pub fn associate(&mut self, step_id: &str, tool_call_id: &str) -> bool {
        if tool_call_id.is_empty() {
            return false;
        }
        match self.by_step.get(step_id) {
            Some(existing) if existing == tool_call_id => true,
            Some(existing) => {
                tracing::debug!(
                    step_id,
                    existing = %existing,
                    ignored = tool_call_id,
                    "step already correlated with another tool call"
                );
                false
            }
            None => {
                self.by_step
                    .insert(step_id.to_string(), tool_call_id.to_string());
                true
            }
        }
    }

    pub fn resolve(&self, step_id: &str) -> Option<&str> {
        self.by_step.get(step_id).map(String::as_str)
    }

    pub fn forget(&mut self, step_id: &str) -> Option<String> {
        self.by_step.remove(step_id)
    }

    pub fn clear(&mut self) {
        self.by_step.clear();
    }

    pub fn len(&self) -> usize {
        self.by_step.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_step.is_empty()
    }
}
