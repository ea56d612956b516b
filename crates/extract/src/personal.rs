//! Personal details: name, father's name, gender, course and medium.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

use crate::cascade::{Cascade, Strategy};
use crate::document::{Document, DocumentKind};
use crate::schema::PersonalDetails;
use crate::table::cell_text;
use crate::trace::FieldGroup;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Name,
    FatherName,
    Gender,
    Course,
    Medium,
}

struct Label {
    field: Field,
    text: &'static str,
    /// Longer labels that contain `text` and must not be mistaken for it.
    conflicts: &'static [&'static str],
    /// Labels that follow this one in PDF text; the value stops at either.
    next: [&'static str; 2],
}

static LABELS: [Label; 5] = [
    Label {
        field: Field::Name,
        text: "Name",
        conflicts: &["Father's Name", "Mother's Name", "Subject Name"],
        next: ["Father's Name", "Gender"],
    },
    Label {
        field: Field::FatherName,
        text: "Father's Name",
        conflicts: &[],
        next: ["Gender", "Course"],
    },
    Label {
        field: Field::Gender,
        text: "Gender",
        conflicts: &[],
        next: ["Course", "Medium"],
    },
    Label {
        field: Field::Course,
        text: "Course",
        conflicts: &[],
        next: ["Medium", "Marks"],
    },
    Label {
        field: Field::Medium,
        text: "Medium",
        conflicts: &[],
        next: ["Marks", "Sub Code"],
    },
];

impl Label {
    fn in_row(&self, row_text: &str) -> bool {
        row_text.contains(self.text) && !self.conflicts.iter().any(|c| row_text.contains(c))
    }

    /// True when the label ending at `end` is really the tail of a
    /// conflicting label, e.g. "Name" inside "Father's Name".
    fn shadowed_at(&self, text: &str, end: usize) -> bool {
        self.conflicts.iter().any(|c| text[..end].ends_with(c))
    }

    fn unshadowed(&self, text: &str, caps: &Captures<'_>) -> bool {
        caps.get(0)
            .is_some_and(|m| !self.shadowed_at(text, m.start() + self.text.len()))
    }

    fn markup_pattern(&self) -> Regex {
        let pattern = format!(
            r"(?i)>\s*{}\s*:?\s*(?:</(?:b|strong|span|font)>\s*)*</t[dh]>\s*<td[^>]*>([^<]+)</td>",
            regex::escape(self.text)
        );
        Regex::new(&pattern).unwrap()
    }

    fn text_pattern(&self) -> Regex {
        let pattern = format!(
            r"(?s){}\s+(.*?)\s+(?:{}|{})",
            regex::escape(self.text),
            regex::escape(self.next[0]),
            regex::escape(self.next[1])
        );
        Regex::new(&pattern).unwrap()
    }
}

fn slot(details: &mut PersonalDetails, field: Field) -> &mut String {
    match field {
        Field::Name => &mut details.name,
        Field::FatherName => &mut details.father_name,
        Field::Gender => &mut details.gender,
        Field::Course => &mut details.course,
        Field::Medium => &mut details.medium,
    }
}

static MARKUP_PATTERNS: Lazy<Vec<Regex>> =
    Lazy::new(|| LABELS.iter().map(Label::markup_pattern).collect());
static TEXT_PATTERNS: Lazy<Vec<Regex>> =
    Lazy::new(|| LABELS.iter().map(Label::text_pattern).collect());
static NAME_LINE: Lazy<Regex> = Lazy::new(|| Regex::new(r"Name[ \t]+([^\n]+)").unwrap());

/// Marker a results page always carries even when its tables are unusable.
pub const HALL_TICKET_MARKER: &str = "Hall Ticket No";

pub fn cascade() -> Cascade<PersonalDetails> {
    Cascade::new(FieldGroup::Personal)
        .then(Strategy::new("personal.table_rows", from_tables))
        .then(Strategy::new("personal.label_pattern", from_patterns))
}

/// Walk every row of every table; the first non-empty value next to each
/// label wins.
pub fn from_tables(doc: &Document<'_>) -> PersonalDetails {
    let mut details = PersonalDetails::default();

    for row in doc.tables().iter().flat_map(|t| t.rows()) {
        for label in &LABELS {
            if !label.in_row(row.text()) {
                continue;
            }
            let field = slot(&mut details, label.field);
            if !field.is_empty() {
                continue;
            }
            if let Some(value) = row.value_after(label.text) {
                *field = value.to_string();
            }
        }
    }

    details
}

/// Label-anchored patterns over the raw text, one field at a time.
pub fn from_patterns(doc: &Document<'_>) -> PersonalDetails {
    let mut details = PersonalDetails::default();
    let text = doc.content();

    for (idx, label) in LABELS.iter().enumerate() {
        let value = match doc.kind() {
            DocumentKind::Markup => MARKUP_PATTERNS[idx]
                .captures(text)
                .map(|caps| cell_text(&caps[1])),
            DocumentKind::PlainText => TEXT_PATTERNS[idx]
                .captures_iter(text)
                .filter(|caps| label.unshadowed(text, caps))
                .map(|caps| caps[1].trim().to_string())
                .find(|v| !v.is_empty()),
        };
        if let Some(value) = value {
            *slot(&mut details, label.field) = value;
        }
    }

    details
}

/// Last resort: a `Name ...` line in the visible text of a page that is
/// recognisably a results page.
pub fn name_from_visible_text(doc: &Document<'_>) -> Option<String> {
    let text = doc.visible_text();
    if !text.contains(HALL_TICKET_MARKER) {
        return None;
    }
    let name = &LABELS[0];

    NAME_LINE
        .captures_iter(text)
        .filter(|caps| name.unshadowed(text, caps))
        .map(|caps| caps[1].trim().to_string())
        .find(|v| !v.is_empty())
}
