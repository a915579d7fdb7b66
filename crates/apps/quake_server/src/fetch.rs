use std::time::Duration;

use formats::{decode_boundaries, BoundaryFeature, EarthquakeFeed, ParseError};
use futures_util::StreamExt;
use reqwest::Client;
use serde_json::Value;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("only http(s) URLs are allowed: {0}")]
    InvalidUrl(String),
    #[error("fetch failed: {0}")]
    Network(#[from] reqwest::Error),
    #[error("upstream HTTP {0}")]
    Status(u16),
    #[error("feed payload too large (max {max} bytes)")]
    TooLarge { max: usize },
    #[error("malformed feed: {0}")]
    Parse(#[from] ParseError),
}

/// One-shot GET + JSON decode of a remote feed. No retries.
#[derive(Debug, Clone)]
pub struct FeedFetcher {
    http: Client,
    max_bytes: usize,
}

impl FeedFetcher {
    pub fn new(timeout: Duration, max_bytes: usize) -> Result<Self, FetchError> {
        let http = Client::builder().timeout(timeout).build()?;
        Ok(Self { http, max_bytes })
    }

    pub async fn fetch_json(&self, url: &str) -> Result<Value, FetchError> {
        let url = url.trim();
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(FetchError::InvalidUrl(url.to_string()));
        }

        let resp = self.http.get(url).send().await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }
        if resp
            .content_length()
            .is_some_and(|len| len > self.max_bytes as u64)
        {
            return Err(FetchError::TooLarge {
                max: self.max_bytes,
            });
        }

        // Content-Length is optional, so the cap is enforced while streaming too.
        let mut body = Vec::new();
        let mut stream = resp.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk?;
            if body.len() + chunk.len() > self.max_bytes {
                return Err(FetchError::TooLarge {
                    max: self.max_bytes,
                });
            }
            body.extend_from_slice(&chunk);
        }
        debug!(url, bytes = body.len(), "feed downloaded");

        let value = serde_json::from_slice(&body).map_err(ParseError::from)?;
        Ok(value)
    }

    pub async fn fetch_earthquakes(&self, url: &str) -> Result<EarthquakeFeed, FetchError> {
        let value = self.fetch_json(url).await?;
        Ok(EarthquakeFeed::from_geojson_value(&value)?)
    }

    pub async fn fetch_boundaries(&self, url: &str) -> Result<Vec<BoundaryFeature>, FetchError> {
        let value = self.fetch_json(url).await?;
        Ok(decode_boundaries(&value)?)
    }
}
