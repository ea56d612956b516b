//! Table/row/cell view over parsed markup.
//!
//! Rows and cells belong to their nearest enclosing table only; text inside a
//! nested table is not counted towards the outer row or cell, so layout tables
//! wrapping the real data never shadow it.

use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Node, Selector};

static TABLE: Lazy<Selector> = Lazy::new(|| Selector::parse("table").unwrap());
static ROW: Lazy<Selector> = Lazy::new(|| Selector::parse("tr").unwrap());
static BODY: Lazy<Selector> = Lazy::new(|| Selector::parse("body").unwrap());

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Row {
    text: String,
    cells: Vec<String>,
}

impl Row {
    pub fn new(cells: Vec<String>) -> Self {
        let text = cells.join(" ");
        Self { text, cells }
    }

    /// Whitespace-collapsed text of the whole row.
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn cells(&self) -> &[String] {
        &self.cells
    }

    /// Trimmed text of the cell at `idx`, or "" past the end.
    pub fn cell(&self, idx: usize) -> &str {
        self.cells.get(idx).map(|c| c.trim()).unwrap_or("")
    }

    /// Value of the cell right after the first cell containing `label`.
    pub fn value_after(&self, label: &str) -> Option<&str> {
        let idx = self.cells.iter().position(|c| c.contains(label))?;
        self.cells.get(idx + 1).map(|c| c.trim())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Table {
    rows: Vec<Row>,
}

impl Table {
    pub fn new(rows: Vec<Row>) -> Self {
        Self { rows }
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn header(&self) -> Option<&Row> {
        self.rows.first()
    }

    /// Every row after the header.
    pub fn body(&self) -> &[Row] {
        self.rows.get(1..).unwrap_or(&[])
    }
}

/// Every table in document order, outer tables before the tables they
/// contain.
pub fn collect_tables(html: &Html) -> Vec<Table> {
    html.select(&TABLE)
        .map(|table| Table::new(own_rows(table).map(row_from_element).collect()))
        .collect()
}

/// Text a reader would see, with line breaks kept.
pub fn visible_text(html: &Html) -> String {
    match html.select(&BODY).next() {
        Some(body) => body.text().collect(),
        None => html.root_element().text().collect(),
    }
}

/// Decoded, whitespace-collapsed text of a raw markup snippet, so values a
/// pattern cut out of the source read the same as parsed cells.
pub fn cell_text(snippet: &str) -> String {
    let fragment = Html::parse_fragment(snippet);
    collapse_ws(&fragment.root_element().text().collect::<String>())
}

fn own_rows<'a>(table: ElementRef<'a>) -> impl Iterator<Item = ElementRef<'a>> + 'a {
    table
        .select(&ROW)
        .filter(move |row| nearest_table(*row) == Some(table))
}

fn nearest_table(el: ElementRef<'_>) -> Option<ElementRef<'_>> {
    el.ancestors()
        .filter_map(ElementRef::wrap)
        .find(|e| e.value().name() == "table")
}

fn row_from_element(row: ElementRef<'_>) -> Row {
    let cells = row
        .children()
        .filter_map(ElementRef::wrap)
        .filter(|cell| matches!(cell.value().name(), "td" | "th"))
        .map(own_text)
        .collect();
    Row::new(cells)
}

/// Collapsed text of `el`, skipping anything inside a nested table.
fn own_text(el: ElementRef<'_>) -> String {
    let mut raw = String::new();
    push_text(el, &mut raw);
    collapse_ws(&raw)
}

fn push_text(el: ElementRef<'_>, out: &mut String) {
    for child in el.children() {
        match child.value() {
            Node::Text(text) => out.push_str(text),
            Node::Element(e) if e.name() == "table" => {}
            Node::Element(_) => {
                if let Some(child) = ElementRef::wrap(child) {
                    push_text(child, out);
                }
            }
            _ => {}
        }
    }
}

// nbsp counts as whitespace
fn collapse_ws(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rows_and_cells() {
        let html = Html::parse_document(
            "<table><tr><th>Sub Code</th><th>Subject</th></tr>\
             <tr><td> 101 </td><td>MATHS&nbsp; I</td></tr></table>",
        );
        let tables = collect_tables(&html);

        assert_eq!(tables.len(), 1);
        assert_eq!(tables[0].rows().len(), 2);
        assert_eq!(tables[0].header().unwrap().text(), "Sub Code Subject");
        assert_eq!(tables[0].body()[0].cell(0), "101");
        assert_eq!(tables[0].body()[0].cell(1), "MATHS I");
        assert_eq!(tables[0].body()[0].cell(7), "");
    }

    #[test]
    fn test_nested_table_rows_stay_with_inner_table() {
        let html = Html::parse_document(
            "<table><tr><td>\
               <table><tr><td>Name</td><td>ASHA</td></tr></table>\
             </td></tr></table>",
        );
        let tables = collect_tables(&html);

        assert_eq!(tables.len(), 2);
        // outer row owns one cell whose own text excludes the inner table
        assert_eq!(tables[0].rows().len(), 1);
        assert_eq!(tables[0].rows()[0].cell(0), "");
        assert_eq!(tables[1].rows()[0].value_after("Name"), Some("ASHA"));
    }

    #[test]
    fn test_value_after_last_cell() {
        let row = Row::new(vec!["Gender".to_string()]);
        assert_eq!(row.value_after("Gender"), None);
        assert_eq!(row.value_after("Medium"), None);
    }

    #[test]
    fn test_cell_text_decodes_entities() {
        assert_eq!(cell_text(" RAVI&nbsp;KUMAR "), "RAVI KUMAR");
        assert_eq!(cell_text("SURESH &amp; SONS"), "SURESH & SONS");
        assert_eq!(cell_text("B.E.&nbsp;(CSE)\n"), "B.E. (CSE)");
    }

    #[test]
    fn test_visible_text_keeps_lines() {
        let html = Html::parse_document("<body><p>Hall Ticket No</p>\n<p>Name RAVI</p></body>");
        let text = visible_text(&html);

        assert!(text.contains("Hall Ticket No"));
        assert!(text.contains('\n'));
    }
}
