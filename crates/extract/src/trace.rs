use serde::{Deserialize, Serialize};
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldGroup {
    Personal,
    Marks,
    Summary,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StepOutcome {
    /// Result accepted, later strategies skipped
    Satisfied,
    /// Something found, but not enough to stop the cascade
    Partial,
    Empty,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TraceStep {
    pub group: FieldGroup,
    pub strategy: String,
    pub outcome: StepOutcome,
}

/// What the engine tried for one document, in the order it tried it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractionTrace {
    pub absent: bool,
    pub steps: Vec<TraceStep>,
}

impl ExtractionTrace {
    pub fn record(&mut self, group: FieldGroup, strategy: &str, outcome: StepOutcome) {
        debug!(?group, strategy, ?outcome, "Extraction strategy finished");
        self.steps.push(TraceStep {
            group,
            strategy: strategy.to_string(),
            outcome,
        });
    }

    pub fn mark_absent(&mut self) {
        debug!("Not-found sentinel present, skipping extraction");
        self.absent = true;
    }

    /// Names of the strategies run for `group`, in order.
    pub fn strategies_for(&self, group: FieldGroup) -> Vec<&str> {
        self.steps
            .iter()
            .filter(|s| s.group == group)
            .map(|s| s.strategy.as_str())
            .collect()
    }
}
