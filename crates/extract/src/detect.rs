/// Phrases the results site prints instead of a record.
pub const DEFAULT_SENTINELS: [&str; 2] = ["Invalid", "No Records Found"];

/// Decides whether a fetched page means "no such record".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotFoundDetector {
    sentinels: Vec<String>,
}

impl NotFoundDetector {
    pub fn new<I, S>(sentinels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            sentinels: sentinels
                .into_iter()
                .map(Into::into)
                .filter(|s: &String| !s.is_empty())
                .collect(),
        }
    }

    pub fn sentinels(&self) -> &[String] {
        &self.sentinels
    }

    /// Case-sensitive substring match against the whole text.
    pub fn is_absent(&self, text: &str) -> bool {
        self.sentinels.iter().any(|s| text.contains(s.as_str()))
    }
}

impl Default for NotFoundDetector {
    fn default() -> Self {
        Self::new(DEFAULT_SENTINELS)
    }
}
