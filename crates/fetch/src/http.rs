use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info};

use crate::{FetchError, Fetcher, RetryPolicy};
use extract::RawDocument;

/// Where and how to submit the hall ticket form.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpSource {
    pub url: String,
    pub form_field: String,
    pub user_agent: String,
    pub request_timeout_secs: u64,
}

impl Default for HttpSource {
    fn default() -> Self {
        Self {
            url: "https://www.osmania.ac.in/res07/20250403.jsp".to_string(),
            form_field: "htno".to_string(),
            user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
                         (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36"
                .to_string(),
            request_timeout_secs: 30,
        }
    }
}

/// Posts the hall ticket form to the results site and returns the page.
#[derive(Clone)]
pub struct HttpFetcher {
    source: HttpSource,
    retry: RetryPolicy,
    client: reqwest::Client,
}

impl HttpFetcher {
    pub fn new(source: HttpSource, retry: RetryPolicy) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(source.user_agent.clone())
            .timeout(Duration::from_secs(source.request_timeout_secs))
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            source,
            retry,
            client,
        })
    }

    async fn post_once(&self, hall_ticket: &str) -> Result<String, FetchError> {
        let url = &self.source.url;
        let transport = |source| FetchError::Transport {
            url: url.clone(),
            source,
        };

        let response = self
            .client
            .post(url)
            .form(&[(self.source.form_field.as_str(), hall_ticket)])
            .send()
            .await
            .map_err(transport)?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.clone(),
                status: status.as_u16(),
            });
        }

        response.text().await.map_err(transport)
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, hall_ticket: &str) -> Result<RawDocument, FetchError> {
        info!(
            hall_ticket,
            url = %self.source.url,
            max_retries = self.retry.max_retries(),
            "Fetching result"
        );

        let body = self
            .retry
            .retry_when("fetch_result", FetchError::is_retryable, || {
                self.post_once(hall_ticket)
            })
            .await?;

        debug!(hall_ticket, bytes = body.len(), "Response received");
        Ok(RawDocument::markup(body))
    }
}
