//! Subject-wise marks rows.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

use crate::cascade::{Cascade, Strategy};
use crate::document::{Document, DocumentKind};
use crate::schema::SubjectRow;
use crate::table::{Row, Table, cell_text};
use crate::trace::FieldGroup;

const CODE_HEADERS: [&str; 2] = ["Sub Code", "Subject Code"];
const MIN_CELLS: usize = 5;

// e.g. <tr><td>175</td><td>PROG.FOR PROBLEM SOLVING</td><td>3</td><td>10</td><td>S</td>
static MARKUP_ROW: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)<tr[^>]*>\s*<td[^>]*>\s*(\d+[A-Z]?)\s*</td>\s*<td[^>]*>([^<]+?)</td>\s*<td[^>]*>\s*(\d+(?:\.\d+)?)\s*</td>\s*<td[^>]*>\s*(\d+)\s*</td>\s*<td[^>]*>\s*([A-Z])\s*</td>",
    )
    .unwrap()
});

// e.g. 175 PROG.FOR PROBLEM SOLVING 3 10 S
static TEXT_ROW: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(\d+[A-Z]?)\s+([A-Z.\s]+?)\s+(\d+(?:\.\d+)?)\s+(\d+)\s+([A-Z])").unwrap()
});

pub fn cascade() -> Cascade<Vec<SubjectRow>> {
    Cascade::new(FieldGroup::Marks)
        .then(Strategy::new("marks.code_table", from_table))
        .then(Strategy::new("marks.row_pattern", from_patterns))
}

/// The first table whose header names a subject-code column.
pub fn find_marks_table(tables: &[Table]) -> Option<&Table> {
    tables.iter().find(|t| {
        t.header()
            .is_some_and(|h| CODE_HEADERS.iter().any(|label| h.text().contains(label)))
    })
}

pub fn from_table(doc: &Document<'_>) -> Vec<SubjectRow> {
    let Some(table) = find_marks_table(doc.tables()) else {
        return Vec::new();
    };

    table
        .body()
        .iter()
        .filter(|row| row.cells().len() >= MIN_CELLS)
        .map(subject_from_row)
        .filter(|subject| !subject.subject_code.is_empty())
        .collect()
}

fn subject_from_row(row: &Row) -> SubjectRow {
    SubjectRow {
        subject_code: row.cell(0).to_string(),
        subject_name: row.cell(1).to_string(),
        credits: row.cell(2).to_string(),
        grade_points: row.cell(3).to_string(),
        grade: row.cell(4).to_string(),
    }
}

/// Every row-shaped match in the raw text, in document order.
pub fn from_patterns(doc: &Document<'_>) -> Vec<SubjectRow> {
    let (pattern, decode): (&Regex, fn(&str) -> String) = match doc.kind() {
        DocumentKind::Markup => (&*MARKUP_ROW, cell_text),
        DocumentKind::PlainText => (&*TEXT_ROW, |s| s.trim().to_string()),
    };

    pattern
        .captures_iter(doc.content())
        .map(|caps| subject_from_captures(&caps, decode))
        .collect()
}

fn subject_from_captures(caps: &Captures<'_>, decode: fn(&str) -> String) -> SubjectRow {
    let group = |i: usize| caps.get(i).map_or(String::new(), |m| decode(m.as_str()));
    SubjectRow {
        subject_code: group(1),
        subject_name: group(2),
        credits: group(3),
        grade_points: group(4),
        grade: group(5),
    }
}
