//! The run-state reducer: applies protocol events to the message list.
//!
//! Each call to [`RunStateReducer::handle`] runs to completion synchronously.
//! Failed lookups, unknown kinds, and malformed payloads never panic or
//! propagate: the event is logged and skipped, and the last published list
//! stays as it was.

pub mod handles;

pub use handles::{
    Announcement, AnnouncementSink, MessagesGetter, MessagesSetter, ReducerHandles,
    SubmittingSetter,
};

use crate::config::ReducerConfig;
use crate::error::{ErrorCategory, ReducerError, Result};
use crate::protocol::{
    decode_frame, MessageDelta, StatusUpdate, StepCompleted, StepDeclared, StepDelta,
    StreamEvent,
};
use crate::session::{RunSession, RunState, RunSummary};
use crate::types::{ContentFragment, ContentPart, Message, RunStep, StepKind, ToolCallFragment};
use crate::util::Throttle;

/// Result of handling one event.
#[derive(Debug)]
pub enum Dispatch {
    /// State changed and a new message list was published.
    Published,
    /// State changed, nothing to publish (e.g. another step of an active run).
    Recorded,
    /// The event was dropped; state and the published list are unchanged.
    Skipped(ReducerError),
}

impl Dispatch {
    pub fn is_published(&self) -> bool {
        matches!(self, Self::Published)
    }

    pub fn is_skipped(&self) -> bool {
        matches!(self, Self::Skipped(_))
    }

    pub fn error(&self) -> Option<&ReducerError> {
        match self {
            Self::Skipped(e) => Some(e),
            _ => None,
        }
    }
}

/// Entry point for streamed run events.
pub struct RunStateReducer {
    config: ReducerConfig,
    handles: ReducerHandles,
    session: RunSession,
    throttle: Throttle,
}

impl std::fmt::Debug for RunStateReducer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RunStateReducer")
            .field("config", &self.config)
            .field("session", &self.session)
            .finish_non_exhaustive()
    }
}

impl RunStateReducer {
    pub fn new(config: ReducerConfig, handles: ReducerHandles) -> Self {
        let throttle = Throttle::new(config.announce_interval);
        Self {
            config,
            handles,
            session: RunSession::new(),
            throttle,
        }
    }

    /// Replace the (empty) session, e.g. to attach a submission context.
    pub fn with_session(mut self, session: RunSession) -> Self {
        self.session = session;
        self
    }

    pub fn config(&self) -> &ReducerConfig {
        &self.config
    }

    pub fn session(&self) -> &RunSession {
        &self.session
    }

    pub fn run_state(&self, run_id: &str) -> RunState {
        self.session.run_state(run_id)
    }

    /// Decode and handle one raw transport frame.
    pub fn handle_frame(&mut self, raw: &str) -> Dispatch {
        match decode_frame(raw) {
            Ok(event) => self.handle(event),
            Err(e) => {
                self.announce_composing();
                log_skip("frame", &e);
                Dispatch::Skipped(e)
            }
        }
    }

    /// Handle one decoded event.
    pub fn handle(&mut self, event: StreamEvent) -> Dispatch {
        self.announce_composing();

        let label = event
            .kind()
            .map_or_else(|| "unknown".to_string(), |kind| kind.to_string());
        let outcome = match event {
            StreamEvent::StepDeclared(step) => self.on_step_declared(step),
            StreamEvent::StatusUpdate(update) => self.on_status_update(update),
            StreamEvent::TextDelta(delta) | StreamEvent::ReasoningDelta(delta) => {
                self.on_message_delta(delta)
            }
            StreamEvent::StepDelta(delta) => self.on_step_delta(delta),
            StreamEvent::StepCompleted(completed) => self.on_step_completed(completed),
            StreamEvent::Unknown { event } => Err(ReducerError::UnknownEvent(event)),
        };

        match outcome {
            Ok(dispatch) => dispatch,
            Err(e) => {
                log_skip(&label, &e);
                Dispatch::Skipped(e)
            }
        }
    }

    /// Tear down one run: its steps, correlations, and message are released.
    ///
    /// Lowers the submission flag once no run is active. Idempotent.
    pub fn finish_run(&mut self, run_id: &str) -> Option<RunSummary> {
        let summary = self.session.teardown_run(run_id)?;
        if self.session.active_runs() == 0 {
            self.handles.set_submitting(false);
        }
        tracing::debug!(
            run_id,
            steps = summary.steps,
            elapsed_ms = (summary.finished_at - summary.started_at).num_milliseconds(),
            "run finished"
        );
        Some(summary)
    }

    /// Drop all session state. Idempotent.
    pub fn dispose(&mut self) {
        let had_active = self.session.active_runs() > 0;
        self.session.dispose();
        self.throttle.reset();
        if had_active {
            self.handles.set_submitting(false);
        }
    }

    fn on_step_declared(&mut self, step: StepDeclared) -> Result<Dispatch> {
        if step.run_id.is_empty() {
            return Err(ReducerError::MalformedEvent(format!(
                "step {} without run id",
                step.id
            )));
        }
        let state = self.session.run_state(&step.run_id);
        if state == RunState::TornDown {
            return Err(ReducerError::RunTornDown {
                run_id: step.run_id,
            });
        }

        self.session.steps_mut().record(step.to_run_step());
        if step.kind() == StepKind::ToolCalls {
            for call in step.tool_calls() {
                self.session.correlations_mut().associate(&step.id, &call.id);
            }
        }

        if state == RunState::Active {
            return Ok(Dispatch::Recorded);
        }

        let mut list = self.handles.messages();
        let message = self.open_run_message(list.last(), &step.run_id);
        // Clone the tail into the run's message; keep the tail when it is
        // another run still streaming.
        let replace_tail = list
            .last()
            .is_some_and(|last| !self.session.messages().contains(&last.message_id));
        match list.last_mut() {
            Some(last) if replace_tail => *last = message.clone(),
            _ => list.push(message.clone()),
        }
        self.session.activate(&step.run_id, message);
        self.handles.set_messages(list);
        self.handles.set_submitting(true);

        tracing::debug!(run_id = %step.run_id, step_id = %step.id, "run started");
        Ok(Dispatch::Published)
    }

    fn on_status_update(&mut self, update: StatusUpdate) -> Result<Dispatch> {
        if update.run_id.is_empty() {
            return Err(ReducerError::MalformedEvent(
                "status update without run id".to_string(),
            ));
        }
        let content = vec![ContentPart::text(update.text)];

        if self.session.run_state(&update.run_id) == RunState::Active {
            let message = self
                .session
                .messages_mut()
                .replace_content(&update.run_id, content)?
                .clone();
            self.publish(message);
            return Ok(Dispatch::Published);
        }

        let mut list = self.handles.messages();
        // The tail may only be rewritten when no other run is streaming into it.
        let Some(last) = list
            .last_mut()
            .filter(|last| !self.session.messages().contains(&last.message_id))
        else {
            return Err(ReducerError::UnknownRun {
                run_id: update.run_id,
            });
        };
        last.content = content.into_iter().map(Some).collect();
        self.handles.set_messages(list);
        Ok(Dispatch::Published)
    }

    fn on_message_delta(&mut self, delta: MessageDelta) -> Result<Dispatch> {
        let step = self.resolve_step(&delta.id)?;
        let mut fragments = delta.delta.content.into_iter();
        let Some(fragment) = fragments.next() else {
            return Err(ReducerError::MalformedEvent(format!(
                "delta for step {} without content",
                step.id
            )));
        };
        if fragments.next().is_some() {
            tracing::debug!(step_id = %step.id, "extra content fragments ignored");
        }

        let message = self
            .session
            .messages_mut()
            .apply(&step.run_id, step.index, &fragment, false)?
            .clone();
        self.publish(message);
        Ok(Dispatch::Published)
    }

    fn on_step_delta(&mut self, delta: StepDelta) -> Result<Dispatch> {
        let step = self.resolve_step(&delta.id)?;
        let body = delta.delta;
        if let Some(kind) = body.kind.as_deref() {
            if kind.parse::<StepKind>().ok() != Some(StepKind::ToolCalls) {
                return Err(ReducerError::UnrecognizedContentKind(kind.to_string()));
            }
        }
        if body.tool_calls.is_empty() {
            return Err(ReducerError::MalformedEvent(format!(
                "step delta for {} without tool calls",
                step.id
            )));
        }

        let mut fragments = Vec::with_capacity(body.tool_calls.len());
        for call in body.tool_calls {
            let id = match call.id.filter(|id| !id.is_empty()) {
                Some(id) => {
                    self.session.correlations_mut().associate(&step.id, &id);
                    Some(id)
                }
                None => self.session.correlations().resolve(&step.id).map(str::to_string),
            };
            fragments.push(ContentFragment::ToolCall(ToolCallFragment {
                id,
                name: call.name,
                args: call.args,
                output: None,
                auth: call.auth.or_else(|| body.auth.clone()),
                expires_at: call.expires_at.or(body.expires_at),
            }));
        }

        let message = self
            .session
            .messages_mut()
            .apply_all(&step.run_id, step.index, &fragments, false)?
            .clone();
        self.publish(message);
        Ok(Dispatch::Published)
    }

    fn on_step_completed(&mut self, completed: StepCompleted) -> Result<Dispatch> {
        let step = self.resolve_step(&completed.result.id)?;
        let mut tool_call = completed.result.tool_call;
        if tool_call.id.as_deref().map_or(true, str::is_empty) {
            tool_call.id = self
                .session
                .correlations()
                .resolve(&step.id)
                .map(str::to_string);
        }

        let message = self
            .session
            .messages_mut()
            .apply(
                &step.run_id,
                step.index,
                &ContentFragment::ToolCall(tool_call),
                true,
            )?
            .clone();
        self.publish(message);
        Ok(Dispatch::Published)
    }

    fn resolve_step(&self, step_id: &str) -> Result<RunStep> {
        self.session
            .steps()
            .lookup(step_id)
            .cloned()
            .ok_or_else(|| ReducerError::UnknownStep {
                step_id: step_id.to_string(),
            })
    }

    /// New message for a run, cloned from the current tail of the list.
    fn open_run_message(&self, template: Option<&Message>, run_id: &str) -> Message {
        let mut message = match template {
            Some(template) => Message::from_template(template, run_id),
            None => Message::new(run_id),
        };
        if let Some(submission) = self.session.submission() {
            if submission.parent_message_id.is_some() {
                message.parent_message_id = submission.parent_message_id.clone();
            }
            if submission.conversation_id.is_some() {
                message.conversation_id = submission.conversation_id.clone();
            }
        }
        message
    }

    /// Publish a fresh list with the run's message swapped in by id.
    fn publish(&self, message: Message) {
        let mut list = self.handles.messages();
        match list
            .iter_mut()
            .find(|entry| entry.message_id == message.message_id)
        {
            Some(entry) => *entry = message,
            None => list.push(message),
        }
        self.handles.set_messages(list);
    }

    fn announce_composing(&mut self) {
        if !self.config.announce || !self.throttle.try_fire() {
            return;
        }
        self.handles
            .announce(Announcement::status(self.config.composing_message.clone()));
    }
}

fn log_skip(label: &str, error: &ReducerError) {
    match error.category() {
        ErrorCategory::MissingCorrelation | ErrorCategory::SealedContent => {
            tracing::debug!(event = label, error = %error, "event skipped");
        }
        _ => {
            tracing::warn!(event = label, error = %error, "event skipped");
        }
    }
}
