//! Run step metadata.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// One ordinal slice of a run, writing into content slot `index`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RunStep {
    pub id: String,
    pub run_id: String,
    pub index: usize,
    pub kind: StepKind,
}

impl RunStep {
    pub fn new(
        id: impl Into<String>,
        run_id: impl Into<String>,
        index: usize,
        kind: StepKind,
    ) -> Self {
        Self {
            id: id.into(),
            run_id: run_id.into(),
            index,
            kind,
        }
    }
}

/// Whether a step streams plain content or tool calls.
#[derive(
    Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash, Display, EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum StepKind {
    #[default]
    MessageCreation,
    ToolCalls,
}
