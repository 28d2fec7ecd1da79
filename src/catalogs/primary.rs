use async_trait::async_trait;
use log::debug;
use reqwest::Client;
use serde::Deserialize;

use super::{Catalog, ContentId, SubtitleCandidate, CATALOG_TIMEOUT};
use crate::errors::CatalogError;

/// Primary catalog client: a ranked JSON listing keyed by content id.
///
/// The response is already ordered by descending download count, so the
/// candidates are forwarded in the order received.
#[derive(Debug)]
pub struct PrimaryCatalog {
    /// HTTP client for catalog requests
    client: Client,
    /// Base URL of the catalog service
    endpoint: String,
}

/// Wire shape of the primary catalog response
#[derive(Debug, Deserialize)]
struct PrimaryResponse {
    subtitles: Vec<PrimaryEntry>,
}

#[derive(Debug, Deserialize)]
struct PrimaryEntry {
    id: String,
    url: String,
    lang: String,
}

impl PrimaryCatalog {
    /// Create a new primary catalog client
    pub fn new(client: Client, endpoint: impl Into<String>) -> Self {
        PrimaryCatalog {
            client,
            endpoint: endpoint.into(),
        }
    }

    fn listing_url(&self, content: &ContentId) -> String {
        match (content.season, content.episode) {
            (Some(season), Some(episode)) => format!(
                "{}/subtitles/series/{}:{}:{}.json",
                self.endpoint, content.imdb_id, season, episode
            ),
            _ => format!("{}/subtitles/movie/{}.json", self.endpoint, content.imdb_id),
        }
    }
}

#[async_trait]
impl Catalog for PrimaryCatalog {
    fn name(&self) -> &'static str {
        "primary"
    }

    async fn list(&self, content: &ContentId) -> Result<Vec<SubtitleCandidate>, CatalogError> {
        let url = self.listing_url(content);
        debug!("querying primary catalog: {url}");

        let response = self
            .client
            .get(&url)
            .timeout(CATALOG_TIMEOUT)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(CatalogError::BadStatus {
                status: status.as_u16(),
                message: format!("listing request for {content}"),
            });
        }

        let parsed: PrimaryResponse = response
            .json()
            .await
            .map_err(|e| CatalogError::ResponseParse(e.to_string()))?;

        Ok(parsed
            .subtitles
            .into_iter()
            .map(|entry| SubtitleCandidate {
                id: entry.id,
                url: entry.url,
                lang: entry.lang,
            })
            .collect())
    }
}
