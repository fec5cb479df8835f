//! Jina Reader page extraction

use super::traits::*;
use crate::network::{HttpClient, ProviderRequest};
use anyhow::Result;
use async_trait::async_trait;
use std::time::Duration;

/// Jina Reader: fetches web pages and PDFs as markdown
///
/// Works without a key (rate limited); a key lifts the limit.
pub struct Jina {
    client: HttpClient,
    api_key: Option<String>,
    reader_url: String,
    timeout: Duration,
}

impl Jina {
    pub fn new(client: HttpClient, api_key: Option<String>, timeout: Duration) -> Self {
        Self {
            client,
            api_key,
            reader_url: "https://r.jina.ai".to_string(),
            timeout,
        }
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.reader_url = url.into();
        self
    }
}

/// Title taken from a leading `# ` heading
fn extract_title(content: &str) -> String {
    if !content.starts_with("# ") {
        return String::new();
    }
    content
        .lines()
        .next()
        .unwrap_or_default()
        .trim_start_matches('#')
        .trim()
        .to_string()
}

#[async_trait]
impl PageFetcher for Jina {
    async fn fetch(&self, url: &str) -> Result<FetchedPage> {
        let mut request = ProviderRequest::get(format!(
            "{}/{}",
            self.reader_url.trim_end_matches('/'),
            url
        ))
        .header("Accept", "text/markdown");

        if let Some(key) = &self.api_key {
            request = request.header("Authorization", format!("Bearer {}", key));
        }

        let response = self
            .client
            .execute_with_timeout(request, self.timeout)
            .await?
            .error_for_status()?;

        Ok(FetchedPage {
            url: url.to_string(),
            title: extract_title(&response.text),
            content: response.text,
        })
    }
}
