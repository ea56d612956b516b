use tracing::debug;

use crate::document::Document;
use crate::personal;
use crate::schema::{ExtractionResult, PersonalDetails, RecordDetails, ResultSummary, SubjectRow};
use crate::trace::{ExtractionTrace, FieldGroup, StepOutcome};

pub const VISIBLE_TEXT_STRATEGY: &str = "personal.visible_text";

/// Merge the three field groups into one success value. A sparse page is
/// still a success; only transport errors and faults become failures.
pub fn assemble(
    doc: &Document<'_>,
    mut personal_details: PersonalDetails,
    marks_details: Vec<SubjectRow>,
    result_summary: ResultSummary,
    trace: &mut ExtractionTrace,
) -> ExtractionResult {
    let nothing_found = personal_details.name.is_empty()
        && marks_details.is_empty()
        && result_summary.result.is_empty();

    if nothing_found {
        debug!("Every field group came back empty, trying visible text");
        match personal::name_from_visible_text(doc) {
            Some(name) => {
                trace.record(FieldGroup::Personal, VISIBLE_TEXT_STRATEGY, StepOutcome::Satisfied);
                personal_details.name = name;
            }
            None => trace.record(FieldGroup::Personal, VISIBLE_TEXT_STRATEGY, StepOutcome::Empty),
        }
    }

    ExtractionResult::Success(RecordDetails {
        personal_details,
        marks_details,
        result_summary,
    })
}
