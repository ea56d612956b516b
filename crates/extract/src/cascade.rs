//! Ordered strategy lists per field group.
//!
//! A `Cascade` runs its strategies in order and stops at the first result
//! that satisfies the group. When none does, the most recent result that
//! found anything at all is returned whole; results are never merged.

use crate::document::Document;
use crate::schema::{PersonalDetails, ResultSummary, SubjectRow};
use crate::trace::{ExtractionTrace, FieldGroup, StepOutcome};

pub trait Partial: Default {
    /// Good enough to stop trying further strategies.
    fn is_satisfied(&self) -> bool;

    /// Nothing was found at all.
    fn is_blank(&self) -> bool;
}

impl Partial for PersonalDetails {
    // The name alone decides whether the fallback runs.
    fn is_satisfied(&self) -> bool {
        !self.name.is_empty()
    }

    fn is_blank(&self) -> bool {
        PersonalDetails::is_blank(self)
    }
}

impl Partial for Vec<SubjectRow> {
    fn is_satisfied(&self) -> bool {
        !self.is_empty()
    }

    fn is_blank(&self) -> bool {
        self.is_empty()
    }
}

impl Partial for ResultSummary {
    fn is_satisfied(&self) -> bool {
        !self.result.is_empty()
    }

    fn is_blank(&self) -> bool {
        ResultSummary::is_blank(self)
    }
}

type StrategyFn<T> = dyn Fn(&Document<'_>) -> T + Send + Sync;

pub struct Strategy<T> {
    name: &'static str,
    run: Box<StrategyFn<T>>,
}

impl<T> Strategy<T> {
    pub fn new<F>(name: &'static str, run: F) -> Self
    where
        F: Fn(&Document<'_>) -> T + Send + Sync + 'static,
    {
        Self {
            name,
            run: Box::new(run),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn run(&self, doc: &Document<'_>) -> T {
        (self.run)(doc)
    }
}

impl<T> std::fmt::Debug for Strategy<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Strategy").field("name", &self.name).finish()
    }
}

#[derive(Debug)]
pub struct Cascade<T> {
    group: FieldGroup,
    strategies: Vec<Strategy<T>>,
}

impl<T: Partial> Cascade<T> {
    pub fn new(group: FieldGroup) -> Self {
        Self {
            group,
            strategies: Vec::new(),
        }
    }

    pub fn then(mut self, strategy: Strategy<T>) -> Self {
        self.strategies.push(strategy);
        self
    }

    pub fn run(&self, doc: &Document<'_>, trace: &mut ExtractionTrace) -> T {
        let mut kept: Option<T> = None;

        for strategy in &self.strategies {
            let found = strategy.run(doc);

            if found.is_satisfied() {
                trace.record(self.group, strategy.name(), StepOutcome::Satisfied);
                return found;
            }

            if found.is_blank() {
                trace.record(self.group, strategy.name(), StepOutcome::Empty);
            } else {
                trace.record(self.group, strategy.name(), StepOutcome::Partial);
                kept = Some(found);
            }
        }

        kept.unwrap_or_default()
    }
}
