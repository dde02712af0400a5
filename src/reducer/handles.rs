//! Callbacks the reducer uses to talk to its host.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::types::Message;

/// Returns the host's current message list.
pub type MessagesGetter = Arc<dyn Fn() -> Vec<Message> + Send + Sync>;

/// Receives every newly published message list.
pub type MessagesSetter = Arc<dyn Fn(Vec<Message>) + Send + Sync>;

/// Receives accessibility announcements.
pub type AnnouncementSink = Arc<dyn Fn(Announcement) + Send + Sync>;

/// Told whether a run is currently streaming.
pub type SubmittingSetter = Arc<dyn Fn(bool) + Send + Sync>;

/// A screen-reader announcement.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Announcement {
    pub message: String,
    pub is_status: bool,
}

impl Announcement {
    pub fn status(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            is_status: true,
        }
    }
}

/// Host collaborators, injected by the caller.
#[derive(Clone)]
pub struct ReducerHandles {
    get_messages: MessagesGetter,
    set_messages: MessagesSetter,
    announce: Option<AnnouncementSink>,
    set_submitting: Option<SubmittingSetter>,
}

impl std::fmt::Debug for ReducerHandles {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReducerHandles")
            .field("announce", &self.announce.as_ref().map(|_| ".."))
            .field("set_submitting", &self.set_submitting.as_ref().map(|_| ".."))
            .finish_non_exhaustive()
    }
}

impl ReducerHandles {
    pub fn new(get_messages: MessagesGetter, set_messages: MessagesSetter) -> Self {
        Self {
            get_messages,
            set_messages,
            announce: None,
            set_submitting: None,
        }
    }

    pub fn with_announcer(mut self, sink: AnnouncementSink) -> Self {
        self.announce = Some(sink);
        self
    }

    pub fn with_submitting(mut self, setter: SubmittingSetter) -> Self {
        self.set_submitting = Some(setter);
        self
    }

    pub(crate) fn messages(&self) -> Vec<Message> {
        (self.get_messages)()
    }

    pub(crate) fn set_messages(&self, messages: Vec<Message>) {
        (self.set_messages)(messages);
    }

    pub(crate) fn announce(&self, announcement: Announcement) {
        if let Some(sink) = &self.announce {
            sink(announcement);
        }
    }

    pub(crate) fn set_submitting(&self, submitting: bool) {
        if let Some(setter) = &self.set_submitting {
            setter(submitting);
        }
    }
}
