//! Semester result summary: semester, result, SGPA and CGPA.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::cascade::{Cascade, Strategy};
use crate::document::{Document, DocumentKind};
use crate::schema::ResultSummary;
use crate::table::{Table, cell_text};
use crate::trace::FieldGroup;

const MIN_CELLS: usize = 3;

// e.g. <tr><td>1</td><td>PASSED-8.38</td><td>-</td></tr>
// The row must end after three cells; `</tr>` itself is optional in HTML.
static MARKUP_ROW: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)<tr[^>]*>\s*<td[^>]*>\s*(\d+)\s*</td>\s*<td[^>]*>([^<]+)</td>\s*<td[^>]*>([^<]+)</td>\s*(?:</tr>|<tr|</table>|$)",
    )
    .unwrap()
});

// e.g. 1 PASSED-8.38 -
static TEXT_ROW: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(\d+)\s+((?:PASSED|FAILED|PROMOTED)(?:\s*-\s*\d+(?:\.\d+)?)?)\s+(-|\d+(?:\.\d+)?)")
        .unwrap()
});

pub fn cascade() -> Cascade<ResultSummary> {
    Cascade::new(FieldGroup::Summary)
        .then(Strategy::new("summary.result_table", from_table))
        .then(Strategy::new("summary.row_pattern", from_patterns))
}

/// The first table whose header mentions both the semester and the result.
pub fn find_summary_table(tables: &[Table]) -> Option<&Table> {
    tables.iter().find(|t| {
        t.header()
            .is_some_and(|h| h.text().contains("Semester") && h.text().contains("Result"))
    })
}

pub fn from_table(doc: &Document<'_>) -> ResultSummary {
    find_summary_table(doc.tables())
        .and_then(|table| table.rows().get(1))
        .filter(|row| row.cells().len() >= MIN_CELLS)
        .map(|row| ResultSummary::from_cells(row.cell(0), row.cell(1), row.cell(2)))
        .unwrap_or_default()
}

/// First three-column result row in the raw text.
pub fn from_patterns(doc: &Document<'_>) -> ResultSummary {
    let (pattern, decode): (&Regex, fn(&str) -> String) = match doc.kind() {
        DocumentKind::Markup => (&*MARKUP_ROW, cell_text),
        DocumentKind::PlainText => (&*TEXT_ROW, |s| s.trim().to_string()),
    };

    pattern
        .captures(doc.content())
        .map(|caps| {
            ResultSummary::from_cells(&decode(&caps[1]), &decode(&caps[2]), &decode(&caps[3]))
        })
        .unwrap_or_default()
}
