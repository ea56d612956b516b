use scraper::Html;
use serde::{Deserialize, Serialize};

use crate::table::{self, Table};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DocumentKind {
    Markup,
    PlainText,
}

/// Text fetched for one identifier, tagged with where it came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawDocument {
    kind: DocumentKind,
    content: String,
}

impl RawDocument {
    pub fn new(kind: DocumentKind, content: impl Into<String>) -> Self {
        Self {
            kind,
            content: content.into(),
        }
    }

    pub fn markup(content: impl Into<String>) -> Self {
        Self::new(DocumentKind::Markup, content)
    }

    /// Text recovered from a rendered PDF.
    pub fn plain_text(content: impl Into<String>) -> Self {
        Self::new(DocumentKind::PlainText, content)
    }

    pub fn kind(&self) -> DocumentKind {
        self.kind
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn is_markup(&self) -> bool {
        self.kind == DocumentKind::Markup
    }
}

/// A raw document parsed once and shared by every strategy.
#[derive(Debug)]
pub struct Document<'a> {
    raw: &'a RawDocument,
    tables: Vec<Table>,
    visible_text: Option<String>,
}

impl<'a> Document<'a> {
    pub fn parse(raw: &'a RawDocument) -> Self {
        match raw.kind() {
            DocumentKind::Markup => {
                let html = Html::parse_document(raw.content());
                Self {
                    raw,
                    tables: table::collect_tables(&html),
                    visible_text: Some(table::visible_text(&html)),
                }
            }
            DocumentKind::PlainText => Self {
                raw,
                tables: Vec::new(),
                visible_text: None,
            },
        }
    }

    pub fn kind(&self) -> DocumentKind {
        self.raw.kind()
    }

    /// The fetched text exactly as received.
    pub fn content(&self) -> &str {
        self.raw.content()
    }

    /// Tables in document order; always empty for plain text.
    pub fn tables(&self) -> &[Table] {
        &self.tables
    }

    /// Text with markup stripped; plain text is returned as is.
    pub fn visible_text(&self) -> &str {
        self.visible_text.as_deref().unwrap_or(self.raw.content())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_text_has_no_tables() {
        let raw = RawDocument::plain_text("Name RAVI\nGender MALE");
        let doc = Document::parse(&raw);

        assert!(doc.tables().is_empty());
        assert_eq!(doc.visible_text(), raw.content());
        assert_eq!(doc.kind(), DocumentKind::PlainText);
    }

    #[test]
    fn test_markup_is_parsed_once() {
        let raw =
            RawDocument::markup("<html><body><table><tr><td>x</td></tr></table></body></html>");
        let doc = Document::parse(&raw);

        assert_eq!(doc.tables().len(), 1);
        assert_eq!(doc.visible_text().trim(), "x");
    }

    #[test]
    fn test_kind_serializes_kebab_case() {
        assert_eq!(
            serde_json::to_string(&DocumentKind::PlainText).unwrap(),
            "\"plain-text\""
        );
    }
}
