//! Error types for roci-stream.

pub mod unified;

pub use unified::ErrorCategory;

use thiserror::Error;

/// Primary error type for all reducer operations.
///
/// Inside the reducer every variant is recoverable: the offending event is
/// skipped and the last published state is kept.
#[derive(Error, Debug)]
pub enum ReducerError {
    #[error("Unknown step: {step_id}")]
    UnknownStep { step_id: String },

    #[error("No message for run: {run_id}")]
    UnknownRun { run_id: String },

    #[error("Run already torn down: {run_id}")]
    RunTornDown { run_id: String },

    #[error("Unrecognized content kind: {0}")]
    UnrecognizedContentKind(String),

    #[error("Unknown event: {0}")]
    UnknownEvent(String),

    #[error("Malformed event: {0}")]
    MalformedEvent(String),

    #[error("Tool call {tool_call_id:?} is already complete")]
    ToolCallSealed { tool_call_id: String },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Config file error: {0}")]
    ConfigFile(#[from] toml::de::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ReducerError {
    /// Classify this error into a category.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::UnknownStep { .. } | Self::UnknownRun { .. } | Self::RunTornDown { .. } => {
                ErrorCategory::MissingCorrelation
            }
            Self::UnrecognizedContentKind(_) | Self::UnknownEvent(_) => {
                ErrorCategory::UnrecognizedContentKind
            }
            Self::MalformedEvent(_) | Self::Serialization(_) => ErrorCategory::MalformedEventShape,
            Self::ToolCallSealed { .. } => ErrorCategory::SealedContent,
            Self::ConfigFile(_) => ErrorCategory::Configuration,
            Self::Io(_) => ErrorCategory::Io,
        }
    }

    /// Whether the reducer can keep going after this error (skip the event).
    pub fn is_recoverable(&self) -> bool {
        self.category().is_event_level()
    }
}

/// Convenience alias.
pub type Result<T> = std::result::Result<T, ReducerError>;
