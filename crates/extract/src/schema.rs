use serde::{Deserialize, Serialize};

pub const ABSENT_RECORD_ERROR: &str = "Invalid identifier or no results found";
pub const FETCH_FAILED_ERROR: &str = "Failed to fetch result";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonalDetails {
    pub name: String,
    pub father_name: String,
    pub gender: String,
    pub course: String,
    pub medium: String,
}

impl PersonalDetails {
    pub fn is_blank(&self) -> bool {
        self.name.is_empty()
            && self.father_name.is_empty()
            && self.gender.is_empty()
            && self.course.is_empty()
            && self.medium.is_empty()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubjectRow {
    pub subject_code: String,
    pub subject_name: String,
    // Kept as source text, e.g. "3" or "1.5"
    pub credits: String,
    pub grade_points: String,
    pub grade: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultSummary {
    pub semester: String,
    pub result: String,
    pub sgpa: String,
    pub cgpa: String,
}

impl ResultSummary {
    /// Build a summary from the three source cells, splitting the combined
    /// "RESULT-SGPA" cell on its first `-`.
    pub fn from_cells(semester: &str, combined: &str, cgpa: &str) -> Self {
        let (result, sgpa) = split_result(combined);
        Self {
            semester: semester.trim().to_string(),
            result,
            sgpa,
            cgpa: cgpa.trim().to_string(),
        }
    }

    pub fn is_blank(&self) -> bool {
        self.semester.is_empty()
            && self.result.is_empty()
            && self.sgpa.is_empty()
            && self.cgpa.is_empty()
    }
}

/// Split "PASSED-8.38" into ("PASSED", "8.38"). Without a `-` the whole
/// string is the result and the SGPA is empty.
pub fn split_result(combined: &str) -> (String, String) {
    let combined = combined.trim();
    match combined.split_once('-') {
        Some((result, sgpa)) => (result.trim().to_string(), sgpa.trim().to_string()),
        None => (combined.to_string(), String::new()),
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordDetails {
    pub personal_details: PersonalDetails,
    pub marks_details: Vec<SubjectRow>,
    pub result_summary: ResultSummary,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorReport {
    pub error: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_details: Option<String>,
}

/// Outcome for one identifier: either the extracted record or an error,
/// never both.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ExtractionResult {
    Success(RecordDetails),
    Failure(ErrorReport),
}

impl ExtractionResult {
    pub fn absent() -> Self {
        Self::Failure(ErrorReport {
            error: ABSENT_RECORD_ERROR.to_string(),
            error_details: None,
        })
    }

    pub fn transport_failure(details: impl Into<String>) -> Self {
        Self::fault(details)
    }

    pub fn fault(details: impl Into<String>) -> Self {
        Self::Failure(ErrorReport {
            error: FETCH_FAILED_ERROR.to_string(),
            error_details: Some(details.into()),
        })
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    pub fn is_absent(&self) -> bool {
        matches!(self, Self::Failure(report) if report.error == ABSENT_RECORD_ERROR)
    }

    pub fn record(&self) -> Option<&RecordDetails> {
        match self {
            Self::Success(record) => Some(record),
            Self::Failure(_) => None,
        }
    }

    pub fn error(&self) -> Option<&ErrorReport> {
        match self {
            Self::Success(_) => None,
            Self::Failure(report) => Some(report),
        }
    }
}

/// One entry of a batch response, in the same position as its identifier
/// in the request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchEntry {
    #[serde(rename = "hallTicketNo")]
    pub identifier: String,
    pub result: ExtractionResult,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trace: Option<crate::trace::ExtractionTrace>,
}
