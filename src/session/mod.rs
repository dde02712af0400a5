//! Caller-owned bookkeeping for the runs of one chat submission.
//!
//! A [`RunSession`] bundles the step registry, the tool-call correlation table,
//! and the message accumulator. It is built per submission and torn down
//! explicitly, per run with [`RunSession::teardown_run`] or wholesale with
//! [`RunSession::dispose`].

pub mod accumulator;
pub mod correlation;
pub mod registry;

pub use accumulator::MessageAccumulator;
pub use correlation::ToolCallCorrelationTable;
pub use registry::StepRegistry;

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::Message;

/// Lifecycle of one run inside a session.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RunState {
    Unstarted,
    Active,
    TornDown,
}

/// The user submission a run answers.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct SubmissionContext {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_message_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conversation_id: Option<String>,
}

/// What a run produced, returned when it is torn down.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RunSummary {
    pub run_id: String,
    pub message: Option<Message>,
    pub steps: usize,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
struct RunRecord {
    state: RunState,
    started_at: DateTime<Utc>,
}

/// Registries and in-flight messages for a submission's runs.
#[derive(Debug, Default, Clone)]
pub struct RunSession {
    steps: StepRegistry,
    correlations: ToolCallCorrelationTable,
    messages: MessageAccumulator,
    runs: HashMap<String, RunRecord>,
    submission: Option<SubmissionContext>,
}

impl RunSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach the submission that new run messages should point back to.
    pub fn with_submission(mut self, submission: SubmissionContext) -> Self {
        self.submission = Some(submission);
        self
    }

    pub fn submission(&self) -> Option<&SubmissionContext> {
        self.submission.as_ref()
    }

    pub fn steps(&self) -> &StepRegistry {
        &self.steps
    }

    pub fn steps_mut(&mut self) -> &mut StepRegistry {
        &mut self.steps
    }

    pub fn correlations(&self) -> &ToolCallCorrelationTable {
        &self.correlations
    }

    pub fn correlations_mut(&mut self) -> &mut ToolCallCorrelationTable {
        &mut self.correlations
    }

    pub fn messages(&self) -> &MessageAccumulator {
        &self.messages
    }

    pub fn messages_mut(&mut self) -> &mut MessageAccumulator {
        &mut self.messages
    }

    pub fn run_state(&self, run_id: &str) -> RunState {
        self.runs
            .get(run_id)
            .map_or(RunState::Unstarted, |record| record.state)
    }

    /// Number of runs currently active.
    pub fn active_runs(&self) -> usize {
        self.runs
            .values()
            .filter(|record| record.state == RunState::Active)
            .count()
    }

    /// Mark a run active with its freshly created message.
    pub fn activate(&mut self, run_id: &str, message: Message) {
        self.runs.insert(
            run_id.to_string(),
            RunRecord {
                state: RunState::Active,
                started_at: Utc::now(),
            },
        );
        self.messages.insert(run_id, message);
    }

    /// Release everything one run holds. Returns `None` unless the run was active.
    pub fn teardown_run(&mut self, run_id: &str) -> Option<RunSummary> {
        let record = self.runs.get_mut(run_id)?;
        if record.state != RunState::Active {
            return None;
        }
        record.state = RunState::TornDown;
        let started_at = record.started_at;

        let step_ids = self.steps.remove_run(run_id);
        for step_id in &step_ids {
            self.correlations.forget(step_id);
        }
        let message = self.messages.remove(run_id);

        tracing::debug!(run_id, steps = step_ids.len(), "run torn down");
        Some(RunSummary {
            run_id: run_id.to_string(),
            message,
            steps: step_ids.len(),
            started_at,
            finished_at: Utc::now(),
        })
    }

    /// Clear all bookkeeping, including the memory of torn-down runs.
    pub fn dispose(&mut self) {
        self.steps.clear();
        self.correlations.clear();
        self.messages.clear();
        self.runs.clear();
    }

    /// Whether the session holds no state at all.
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
            && self.correlations.is_empty()
            && self.messages.is_empty()
            && self.runs.is_empty()
    }
}
