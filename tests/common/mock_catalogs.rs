/*!
 * Mock catalog adapters for pipeline tests
 */

use async_trait::async_trait;

use dualsub::catalogs::{Catalog, ContentId, SubtitleCandidate};
use dualsub::errors::CatalogError;

/// A catalog serving a fixed candidate list, or failing on demand
pub struct MockCatalog {
    catalog_name: &'static str,
    candidates: Vec<SubtitleCandidate>,
    fail: bool,
}

impl MockCatalog {
    /// A catalog that answers every query with the given candidates
    pub fn serving(catalog_name: &'static str, candidates: Vec<SubtitleCandidate>) -> Self {
        MockCatalog {
            catalog_name,
            candidates,
            fail: false,
        }
    }

    /// A catalog whose every query fails
    pub fn failing(catalog_name: &'static str) -> Self {
        MockCatalog {
            catalog_name,
            candidates: Vec::new(),
            fail: true,
        }
    }
}

#[async_trait]
impl Catalog for MockCatalog {
    fn name(&self) -> &'static str {
        self.catalog_name
    }

    async fn list(&self, _content: &ContentId) -> Result<Vec<SubtitleCandidate>, CatalogError> {
        if self.fail {
            return Err(CatalogError::RequestFailed(
                "mock catalog offline".to_string(),
            ));
        }
        Ok(self.candidates.clone())
    }
}

/// Shorthand candidate constructor
pub fn candidate(id: &str, url: &str, lang: &str) -> SubtitleCandidate {
    SubtitleCandidate {
        id: id.to_string(),
        url: url.to_string(),
        lang: lang.to_string(),
    }
}
