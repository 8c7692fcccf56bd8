use anyhow::Result;
use async_trait::async_trait;
use bytes::Bytes;
use reqwest::{Request, Response};

#[async_trait]
pub trait HttpClient: Send + Sync {
    async fn execute(&self, req: Request) -> reqwest::Result<Response>;
}

/// Anything that can hand back the raw body of a feed URL.
///
/// Every [`HttpClient`] is a source; tests substitute canned payloads.
#[async_trait]
pub trait FeedSource: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<Bytes>;
}

#[async_trait]
impl<C: HttpClient> FeedSource for C {
    async fn fetch(&self, url: &str) -> Result<Bytes> {
        super::fetch_bytes(self, url).await
    }
}
