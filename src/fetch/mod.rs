// src/fetch/mod.rs

use anyhow::{Context, Result};
use reqwest::{
    header::{self, HeaderMap, HeaderValue},
    Client,
};
use tracing::debug;
use url::Url;

use crate::config::{ACCEPT_LANGUAGE, REQUEST_TIMEOUT, USER_AGENT};

/// Issues page GETs with the fixed browser-like headers and request timeout.
#[derive(Debug, Clone)]
pub struct PageFetcher {
    client: Client,
}

impl PageFetcher {
    pub fn new() -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(header::USER_AGENT, HeaderValue::from_static(USER_AGENT));
        headers.insert(
            header::ACCEPT_LANGUAGE,
            HeaderValue::from_static(ACCEPT_LANGUAGE),
        );
        let client = Client::builder()
            .default_headers(headers)
            .timeout(REQUEST_TIMEOUT)
            .cookie_store(true)
            .build()
            .context("building HTTP client")?;
        Ok(Self { client })
    }

    /// GET `url` and return the body text; non-2xx statuses are errors.
    pub async fn get_text(&self, url: &Url) -> Result<String> {
        debug!(%url, "fetching page");
        self.client
            .get(url.clone())
            .send()
            .await
            .with_context(|| format!("requesting page {}", url))?
            .error_for_status()
            .with_context(|| format!("page {} answered with an error status", url))?
            .text()
            .await
            .with_context(|| format!("reading body of page {}", url))
    }
}
