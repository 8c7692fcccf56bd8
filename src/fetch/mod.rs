//! HTTP transport for upstream feeds.

mod basic;
mod client;

pub use basic::BasicClient;
pub use client::{FeedSource, HttpClient};

use anyhow::{Context, Result};
use bytes::Bytes;
use tracing::debug;

/// GETs `url` and returns the body, treating non-2xx statuses as errors.
#[tracing::instrument(skip(client))]
pub async fn fetch_bytes<C: HttpClient + ?Sized>(client: &C, url: &str) -> Result<Bytes> {
    let req = reqwest::Request::new(
        reqwest::Method::GET,
        url.parse().with_context(|| format!("Invalid feed URL '{url}'"))?,
    );

    let resp = client
        .execute(req)
        .await
        .with_context(|| format!("Failed to fetch {url}"))?;

    if !resp.status().is_success() {
        anyhow::bail!("{url} returned error status: {}", resp.status());
    }

    let bytes = resp.bytes().await.context("Failed to read response body")?;
    debug!(bytes = bytes.len(), "Received feed payload");
    Ok(bytes)
}
