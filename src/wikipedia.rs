use std::collections::BTreeMap;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use crate::error::EnrichmentError;

/// Best-effort illustrative image lookup keyed by disease name
#[async_trait]
pub trait ImageLookup: Send + Sync {
    async fn thumbnail(&self, title: &str) -> Result<Option<String>, EnrichmentError>;
}

#[derive(Deserialize)]
struct QueryResponse {
    #[serde(default)]
    query: Option<QueryPages>,
}

#[derive(Deserialize)]
struct QueryPages {
    #[serde(default)]
    pages: BTreeMap<String, Page>,
}

#[derive(Deserialize)]
struct Page {
    #[serde(default)]
    thumbnail: Option<Thumbnail>,
}

#[derive(Deserialize)]
struct Thumbnail {
    source: String,
}

/// Pull the first page's thumbnail source out of a `prop=pageimages` body
fn first_thumbnail(body: QueryResponse) -> Option<String> {
    body.query?
        .pages
        .into_values()
        .next()?
        .thumbnail
        .map(|t| t.source)
}

#[derive(Clone)]
pub struct WikipediaClient {
    client: Client,
    api_url: String,
    thumbnail_size: u32,
}

impl WikipediaClient {
    pub fn new(api_url: &str, thumbnail_size: u32) -> anyhow::Result<Self> {
        // Wikimedia rejects requests without a User-Agent
        let client = Client::builder()
            .user_agent(concat!("symptom-chat/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            client,
            api_url: api_url.to_string(),
            thumbnail_size,
        })
    }
}

#[async_trait]
impl ImageLookup for WikipediaClient {
    async fn thumbnail(&self, title: &str) -> Result<Option<String>, EnrichmentError> {
        let size = self.thumbnail_size.to_string();
        let response = self
            .client
            .get(&self.api_url)
            .query(&[
                ("action", "query"),
                ("titles", title),
                ("prop", "pageimages"),
                ("format", "json"),
                ("pithumbsize", size.as_str()),
                ("origin", "*"),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(EnrichmentError::Status(response.status().as_u16()));
        }

        let body: QueryResponse = response.json().await?;
        let image = first_thumbnail(body);
        debug!(%title, found = image.is_some(), "image lookup finished");
        Ok(image)
    }
}
