//! roci-stream: streaming run-event reducer
//!
//! Rebuilds the assistant message of an agent run from the partially ordered
//! events a backend streams while the run progresses: step declarations, text
//! and reasoning deltas, tool-call argument deltas, and tool-call completions.
//! Each event is applied synchronously and the updated message list is handed
//! to the host through injected callbacks.
//!
//! # Quick Start
//!
//! ```
//! use std::sync::{Arc, Mutex};
//!
//! use roci_stream::prelude::*;
//! use roci_stream::protocol::{MessageDelta, StepDeclared};
//!
//! let list = Arc::new(Mutex::new(vec![Message::new("placeholder")]));
//! let get = {
//!     let list = list.clone();
//!     Arc::new(move || list.lock().unwrap().clone())
//! };
//! let set = {
//!     let list = list.clone();
//!     Arc::new(move |next: Vec<Message>| *list.lock().unwrap() = next)
//! };
//!
//! let mut reducer = RunStateReducer::new(ReducerConfig::default(), ReducerHandles::new(get, set));
//! reducer.handle(StreamEvent::StepDeclared(StepDeclared::new("s1", "r1", 0)));
//! reducer.handle(StreamEvent::TextDelta(MessageDelta::text("s1", "Hel")));
//! reducer.handle(StreamEvent::TextDelta(MessageDelta::text("s1", "lo")));
//!
//! assert_eq!(list.lock().unwrap()[0].text(), "Hello");
//! ```

pub mod config;
pub mod error;
pub mod merge;
pub mod prelude;
pub mod protocol;
pub mod reducer;
pub mod session;
pub mod stream;
pub mod types;
pub mod util;

#[cfg(feature = "cli")]
pub mod cli;
