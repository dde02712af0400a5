//! Shared test harness: an in-memory host that records everything the reducer publishes.

#![allow(dead_code)]

use std::sync::{Arc, Mutex, MutexGuard};

use roci_stream::config::ReducerConfig;
use roci_stream::reducer::{Announcement, ReducerHandles, RunStateReducer};
use roci_stream::types::Message;

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Host state shared with the reducer's callbacks.
#[derive(Clone, Default)]
pub struct Host {
    list: Arc<Mutex<Vec<Message>>>,
    publishes: Arc<Mutex<Vec<Vec<Message>>>>,
    announcements: Arc<Mutex<Vec<Announcement>>>,
    submitting: Arc<Mutex<Vec<bool>>>,
}

impl Host {
    pub fn new(seed: Vec<Message>) -> Self {
        let host = Self::default();
        *lock(&host.list) = seed;
        host
    }

    /// A host whose list holds one empty assistant placeholder.
    pub fn with_placeholder() -> Self {
        Self::new(vec![placeholder()])
    }

    pub fn handles(&self) -> ReducerHandles {
        let list = self.list.clone();
        let get = Arc::new(move || lock(&list).clone());

        let list = self.list.clone();
        let publishes = self.publishes.clone();
        let set = Arc::new(move |next: Vec<Message>| {
            lock(&publishes).push(next.clone());
            *lock(&list) = next;
        });

        let announcements = self.announcements.clone();
        let announce = Arc::new(move |a: Announcement| lock(&announcements).push(a));

        let submitting = self.submitting.clone();
        let set_submitting = Arc::new(move |flag: bool| lock(&submitting).push(flag));

        ReducerHandles::new(get, set)
            .with_announcer(announce)
            .with_submitting(set_submitting)
    }

    pub fn reducer(&self) -> RunStateReducer {
        self.reducer_with(ReducerConfig::default())
    }

    pub fn reducer_with(&self, config: ReducerConfig) -> RunStateReducer {
        RunStateReducer::new(config, self.handles())
    }

    pub fn messages(&self) -> Vec<Message> {
        lock(&self.list).clone()
    }

    pub fn message(&self, id: &str) -> Message {
        self.messages()
            .into_iter()
            .find(|m| m.message_id == id)
            .unwrap_or_else(|| panic!("no message {id}"))
    }

    pub fn publish_count(&self) -> usize {
        lock(&self.publishes).len()
    }

    pub fn publishes(&self) -> Vec<Vec<Message>> {
        lock(&self.publishes).clone()
    }

    pub fn announcements(&self) -> Vec<Announcement> {
        lock(&self.announcements).clone()
    }

    pub fn submitting(&self) -> Vec<bool> {
        lock(&self.submitting).clone()
    }
}

/// The empty assistant entry a client appends when the user submits.
pub fn placeholder() -> Message {
    let mut message = Message::new("placeholder");
    message.parent_message_id = Some("user-1".to_string());
    message.conversation_id = Some("convo-1".to_string());
    message
        .extra
        .insert("sender".to_string(), serde_json::json!("Assistant"));
    message
        .extra
        .insert("isCreatedByUser".to_string(), serde_json::json!(false));
    message
}
