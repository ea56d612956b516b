pub mod assemble;
pub mod cascade;
pub mod detect;
pub mod document;
pub mod marks;
pub mod personal;
pub mod schema;
pub mod summary;
pub mod table;
pub mod trace;

pub use cascade::{Cascade, Partial, Strategy};
pub use detect::{DEFAULT_SENTINELS, NotFoundDetector};
pub use document::{Document, DocumentKind, RawDocument};
pub use schema::{
    ABSENT_RECORD_ERROR, BatchEntry, ErrorReport, ExtractionResult, FETCH_FAILED_ERROR,
    PersonalDetails, RecordDetails, ResultSummary, SubjectRow,
};
pub use trace::{ExtractionTrace, FieldGroup, StepOutcome, TraceStep};

use tracing::debug;

/// Result of one extraction together with the steps taken to reach it.
#[derive(Debug, Clone, PartialEq)]
pub struct Extraction {
    pub result: ExtractionResult,
    pub trace: ExtractionTrace,
}

/// Not-found check followed by the personal, marks and summary cascades.
///
/// Stateless between calls, so one instance can serve concurrent requests.
#[derive(Debug)]
pub struct Extractor {
    detector: NotFoundDetector,
    personal: Cascade<PersonalDetails>,
    marks: Cascade<Vec<SubjectRow>>,
    summary: Cascade<ResultSummary>,
}

impl Extractor {
    pub fn new(detector: NotFoundDetector) -> Self {
        Self::with_cascades(
            detector,
            personal::cascade(),
            marks::cascade(),
            summary::cascade(),
        )
    }

    pub fn with_cascades(
        detector: NotFoundDetector,
        personal: Cascade<PersonalDetails>,
        marks: Cascade<Vec<SubjectRow>>,
        summary: Cascade<ResultSummary>,
    ) -> Self {
        Self {
            detector,
            personal,
            marks,
            summary,
        }
    }

    pub fn extract(&self, raw: &RawDocument) -> Extraction {
        let mut trace = ExtractionTrace::default();

        if self.detector.is_absent(raw.content()) {
            trace.mark_absent();
            return Extraction {
                result: ExtractionResult::absent(),
                trace,
            };
        }

        let doc = Document::parse(raw);
        debug!(
            kind = ?doc.kind(),
            tables = doc.tables().len(),
            bytes = raw.content().len(),
            "Parsed document"
        );

        let personal_details = self.personal.run(&doc, &mut trace);
        let marks_details = self.marks.run(&doc, &mut trace);
        let result_summary = self.summary.run(&doc, &mut trace);

        let result = assemble::assemble(
            &doc,
            personal_details,
            marks_details,
            result_summary,
            &mut trace,
        );

        Extraction { result, trace }
    }
}

impl Default for Extractor {
    fn default() -> Self {
        Self::new(NotFoundDetector::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn sample_record() -> RecordDetails {
        RecordDetails {
            personal_details: PersonalDetails {
                name: "RAVI KUMAR".to_string(),
                father_name: "SURESH KUMAR".to_string(),
                gender: "MALE".to_string(),
                course: "B.E.(CSE)".to_string(),
                medium: "ENGLISH".to_string(),
            },
            marks_details: vec![
                SubjectRow {
                    subject_code: "175".to_string(),
                    subject_name: "PROG.FOR PROBLEM SOLVING".to_string(),
                    credits: "3".to_string(),
                    grade_points: "10".to_string(),
                    grade: "S".to_string(),
                },
                SubjectRow {
                    subject_code: "176".to_string(),
                    subject_name: "ENGG CHEMISTRY".to_string(),
                    credits: "4.5".to_string(),
                    grade_points: "9".to_string(),
                    grade: "A".to_string(),
                },
            ],
            result_summary: ResultSummary {
                semester: "1".to_string(),
                result: "PASSED".to_string(),
                sgpa: "8.38".to_string(),
                cgpa: "8.38".to_string(),
            },
        }
    }

    /// Render a record the way the results site lays it out.
    fn render_page(record: &RecordDetails) -> String {
        let p = &record.personal_details;
        let mut html = String::from("<html><body><table>");
        // personal rows deliberately out of order
        for (label, value) in [
            ("Course", &p.course),
            ("Father's Name", &p.father_name),
            ("Medium", &p.medium),
            ("Name", &p.name),
            ("Gender", &p.gender),
        ] {
            html.push_str(&format!("<tr><td>{label}</td><td>{value}</td></tr>"));
        }
        html.push_str("</table><table><tr><th>Sub Code</th><th>Subject Name</th><th>Credits</th><th>Grade Points</th><th>Grade</th></tr>");
        for s in &record.marks_details {
            html.push_str(&format!(
                "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>",
                s.subject_code, s.subject_name, s.credits, s.grade_points, s.grade
            ));
        }
        let r = &record.result_summary;
        html.push_str(&format!(
            "</table><table><tr><th>Semester</th><th>Result</th><th>CGPA</th></tr>\
             <tr><td>{}</td><td>{}-{}</td><td>{}</td></tr></table></body></html>",
            r.semester, r.result, r.sgpa, r.cgpa
        ));
        html
    }

    fn counted<T: Default + 'static>(name: &'static str, calls: &Arc<AtomicUsize>) -> Strategy<T> {
        let calls = calls.clone();
        Strategy::new(name, move |_| {
            calls.fetch_add(1, Ordering::SeqCst);
            T::default()
        })
    }

    #[test]
    fn test_recovers_rendered_record() {
        let record = sample_record();
        let raw = RawDocument::markup(render_page(&record));

        let extraction = Extractor::default().extract(&raw);

        assert_eq!(extraction.result, ExtractionResult::Success(record));
        // primary strategies were enough everywhere
        assert!(extraction.trace.steps.iter().all(|s| s.outcome == StepOutcome::Satisfied));
        assert_eq!(extraction.trace.steps.len(), 3);
    }

    #[test]
    fn test_absent_document_runs_no_strategy() {
        let calls = Arc::new(AtomicUsize::new(0));
        let extractor = Extractor::with_cascades(
            NotFoundDetector::default(),
            Cascade::new(FieldGroup::Personal).then(counted("p", &calls)),
            Cascade::new(FieldGroup::Marks).then(counted("m", &calls)),
            Cascade::new(FieldGroup::Summary).then(counted("s", &calls)),
        );
        let raw = RawDocument::markup("<p>No Records Found</p><table><tr><td>Name</td><td>X</td></tr></table>");

        let extraction = extractor.extract(&raw);

        assert!(extraction.result.is_absent());
        assert!(extraction.trace.absent);
        assert!(extraction.trace.steps.is_empty());
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_present_document_runs_every_cascade() {
        let calls = Arc::new(AtomicUsize::new(0));
        let extractor = Extractor::with_cascades(
            NotFoundDetector::default(),
            Cascade::new(FieldGroup::Personal).then(counted("p", &calls)),
            Cascade::new(FieldGroup::Marks).then(counted("m", &calls)),
            Cascade::new(FieldGroup::Summary).then(counted("s", &calls)),
        );
        let raw = RawDocument::markup("<p>Results</p>");

        assert!(extractor.extract(&raw).result.is_success());
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn test_personal_fallback_runs_once_when_name_missing() {
        let html = r#"<table>
          <tr><td>Gender :-</td><td>MALE</td></tr>
        </table>
        <div><td>Name</td><td>RAVI KUMAR</td></div>"#;
        let raw = RawDocument::markup(html);

        let extraction = Extractor::default().extract(&raw);
        let personal = &extraction.result.record().unwrap().personal_details;

        assert_eq!(
            extraction.trace.strategies_for(FieldGroup::Personal),
            vec!["personal.table_rows", "personal.label_pattern"]
        );
        // the fallback result replaces the primary one whole
        assert_eq!(personal.name, "RAVI KUMAR");
        assert_eq!(personal.gender, "");
    }

    #[test]
    fn test_marks_fallback_on_plain_text() {
        let text = "Hall Ticket No 1005\nName RAVI KUMAR\nFather's Name SURESH\nGender MALE\n\
                    Course B.E.\nMedium ENGLISH\nMarks\n\
                    175 PROG.FOR PROBLEM SOLVING 3 10 S\n176 ENGG CHEMISTRY 4 9 A\n\
                    1 PASSED-8.38 -";
        let raw = RawDocument::plain_text(text);

        let extraction = Extractor::default().extract(&raw);
        let record = extraction.result.record().unwrap();

        assert_eq!(record.marks_details.len(), 2);
        assert_eq!(record.marks_details[0].subject_code, "175");
        assert_eq!(record.marks_details[1].subject_code, "176");
        assert_eq!(record.personal_details.name, "RAVI KUMAR");
        assert_eq!(record.result_summary.sgpa, "8.38");
        assert_eq!(
            extraction.trace.strategies_for(FieldGroup::Marks),
            vec!["marks.code_table", "marks.row_pattern"]
        );
    }

    #[test]
    fn test_custom_sentinels() {
        let extractor = Extractor::new(NotFoundDetector::new(["Result Not Available"]));

        assert!(extractor.extract(&RawDocument::markup("Result Not Available")).result.is_absent());
        assert!(extractor.extract(&RawDocument::markup("Invalid")).result.is_success());
    }
}
