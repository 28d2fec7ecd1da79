/*!
 * Catalog adapters for the upstream subtitle sources.
 *
 * This module contains client implementations for the supported catalogs:
 * - Primary: ranked JSON catalog, no authentication
 * - Fallback: legacy flat-array catalog behind a session cookie
 * - Japanese: specialist catalog queried in addition for Japanese requests
 */

pub mod fallback;
pub mod japanese;
pub mod primary;

use std::fmt;
use std::str::FromStr;

use anyhow::anyhow;
use async_trait::async_trait;

use crate::errors::CatalogError;

/// Catalog query timeout
pub const CATALOG_TIMEOUT: std::time::Duration = std::time::Duration::from_secs(10);

/// The movie or episode a request is about
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentId {
    /// IMDb-style identifier
    pub imdb_id: String,

    /// Season number for series content
    pub season: Option<u32>,

    /// Episode number for series content
    pub episode: Option<u32>,
}

impl ContentId {
    /// Stem used in artifact file names: `tt0111161` or `tt0903747_S1E2`
    pub fn file_stem(&self) -> String {
        match (self.season, self.episode) {
            (Some(season), Some(episode)) => {
                format!("{}_S{}E{}", self.imdb_id, season, episode)
            }
            _ => self.imdb_id.clone(),
        }
    }
}

impl FromStr for ContentId {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.split(':');
        let imdb_id = parts
            .next()
            .filter(|id| !id.is_empty())
            .ok_or_else(|| anyhow!("empty content id"))?
            .to_string();

        let season = parts
            .next()
            .map(|p| p.parse::<u32>())
            .transpose()
            .map_err(|_| anyhow!("invalid season in content id: {}", s))?;
        let episode = parts
            .next()
            .map(|p| p.parse::<u32>())
            .transpose()
            .map_err(|_| anyhow!("invalid episode in content id: {}", s))?;

        if parts.next().is_some() {
            return Err(anyhow!("too many segments in content id: {}", s));
        }

        Ok(ContentId {
            imdb_id,
            season,
            episode,
        })
    }
}

impl fmt::Display for ContentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.season, self.episode) {
            (Some(season), Some(episode)) => {
                write!(f, "{}:{}:{}", self.imdb_id, season, episode)
            }
            _ => write!(f, "{}", self.imdb_id),
        }
    }
}

/// One downloadable subtitle offered by a catalog
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubtitleCandidate {
    /// Catalog-assigned identifier
    pub id: String,

    /// Direct download URL (possibly gzipped)
    pub url: String,

    /// Language code as served by the catalog, usually 3-letter
    pub lang: String,
}

/// A queryable upstream subtitle catalog
#[async_trait]
pub trait Catalog: Send + Sync {
    /// Short name for logs
    fn name(&self) -> &'static str;

    /// All subtitles available for the content, in download-rank order
    async fn list(&self, content: &ContentId) -> Result<Vec<SubtitleCandidate>, CatalogError>;
}
