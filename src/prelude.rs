//! Convenience re-exports for common use.

pub use crate::config::ReducerConfig;
pub use crate::error::{ReducerError, Result};
pub use crate::protocol::{decode_frame, StreamEvent};
pub use crate::reducer::{Announcement, Dispatch, ReducerHandles, RunStateReducer};
pub use crate::session::{RunSession, RunState, SubmissionContext};
pub use crate::types::{
    ContentFragment, ContentPart, Message, RunStep, StepKind, ToolCallFragment, ToolCallPart,
};
