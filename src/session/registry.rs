//! Step id -> step metadata.

use std::collections::HashMap;

use crate::types::RunStep;

/// Registry of declared run steps, keyed by step id.
#[derive(Debug, Default, Clone)]
pub struct StepRegistry {
    steps: HashMap<String, RunStep>,
}

impl StepRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a step, overwriting any previous declaration with the same id.
    pub fn record(&mut self, step: RunStep) {
        if let Some(previous) = self.steps.insert(step.id.clone(), step) {
            tracing::debug!(step_id = %previous.id, "run step redeclared");
        }
    }

    /// Look up a step. A miss is an expected race, not an error.
    pub fn lookup(&self, step_id: &str) -> Option<&RunStep> {
        self.steps.get(step_id)
    }

    /// Remove every step owned by `run_id`, returning their ids.
    pub fn remove_run(&mut self, run_id: &str) -> Vec<String> {
        let owned: Vec<String> = self
            .steps
            .values()
            .filter(|step| step.run_id == run_id)
            .map(|step| step.id.clone())
            .collect();
        for id in &owned {
            self.steps.remove(id);
        }
        owned
    }

    pub fn clear(&mut self) {
        self.steps.clear();
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}
