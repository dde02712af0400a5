//! Error classification.

use serde::{Deserialize, Serialize};

/// Broad error category for routing recovery logic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    /// A delta referenced a step, run, or tool call the session does not know.
    MissingCorrelation,
    /// A fragment or event kind outside the known variants.
    UnrecognizedContentKind,
    /// An expected field was absent or had the wrong shape.
    MalformedEventShape,
    /// A mutation targeted a tool call that already completed.
    SealedContent,
    Configuration,
    Io,
}

impl ErrorCategory {
    /// Categories raised while handling a single event.
    pub fn is_event_level(self) -> bool {
        matches!(
            self,
            Self::MissingCorrelation
                | Self::UnrecognizedContentKind
                | Self::MalformedEventShape
                | Self::SealedContent
        )
    }
}
