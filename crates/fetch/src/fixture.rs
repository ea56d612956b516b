use async_trait::async_trait;
use std::path::PathBuf;
use tokio::fs;
use tracing::debug;

use crate::{FetchError, Fetcher};
use extract::{DocumentKind, RawDocument};

/// Serves saved result pages from a directory: `<hall ticket>.html` (or
/// `.htm`) as markup, `<hall ticket>.txt` as text recovered from a PDF.
#[derive(Debug, Clone)]
pub struct FixtureFetcher {
    dir: PathBuf,
}

const EXTENSIONS: [(&str, DocumentKind); 3] = [
    ("html", DocumentKind::Markup),
    ("htm", DocumentKind::Markup),
    ("txt", DocumentKind::PlainText),
];

impl FixtureFetcher {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn candidates(&self, hall_ticket: &str) -> Result<Vec<(PathBuf, DocumentKind)>, FetchError> {
        let unsafe_name = hall_ticket.is_empty()
            || hall_ticket.contains(['/', '\\'])
            || hall_ticket.starts_with('.');
        if unsafe_name {
            return Err(FetchError::UnsafeIdentifier(hall_ticket.to_string()));
        }

        Ok(EXTENSIONS
            .iter()
            .map(|(ext, kind)| (self.dir.join(format!("{hall_ticket}.{ext}")), *kind))
            .collect())
    }
}

#[async_trait]
impl Fetcher for FixtureFetcher {
    async fn fetch(&self, hall_ticket: &str) -> Result<RawDocument, FetchError> {
        for (path, kind) in self.candidates(hall_ticket)? {
            match fs::read_to_string(&path).await {
                Ok(content) => {
                    debug!(hall_ticket, path = %path.display(), "Loaded saved result");
                    return Ok(RawDocument::new(kind, content));
                }
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => continue,
                Err(source) => return Err(FetchError::Io { path, source }),
            }
        }

        Err(FetchError::NotFound {
            hall_ticket: hall_ticket.to_string(),
            dir: self.dir.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_html_and_text_snapshots() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("1001.html"), "<table></table>").unwrap();
        std::fs::write(dir.path().join("1002.txt"), "Name RAVI").unwrap();
        let fetcher = FixtureFetcher::new(dir.path());

        let html = fetcher.fetch("1001").await.unwrap();
        let text = fetcher.fetch("1002").await.unwrap();

        assert_eq!(html.kind(), DocumentKind::Markup);
        assert_eq!(text.kind(), DocumentKind::PlainText);
        assert_eq!(text.content(), "Name RAVI");
    }

    #[tokio::test]
    async fn test_html_preferred_over_text() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("7.txt"), "text").unwrap();
        std::fs::write(dir.path().join("7.html"), "<p>html</p>").unwrap();

        let doc = FixtureFetcher::new(dir.path()).fetch("7").await.unwrap();

        assert!(doc.is_markup());
    }

    #[tokio::test]
    async fn test_missing_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        let err = FixtureFetcher::new(dir.path()).fetch("404").await.unwrap_err();

        assert!(matches!(err, FetchError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_path_like_identifiers_rejected() {
        let fetcher = FixtureFetcher::new("/tmp");

        for id in ["../etc/passwd", "a/b", "", ".hidden"] {
            let err = fetcher.fetch(id).await.unwrap_err();
            assert!(matches!(err, FetchError::UnsafeIdentifier(_)), "{id}");
        }
    }
}
