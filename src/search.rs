use crate::error::BackendError;
use async_trait::async_trait;

/// Web search used by the similar-papers aspect. No production provider
/// ships; when none is injected the aspect is reported unavailable.
#[async_trait]
pub trait SearchProvider: Send + Sync {
    async fn search(&self, query: &str) -> Result<String, BackendError>;
}

/// Returns a fixed body for every query. Useful for offline runs and tests.
pub struct StaticSearch {
    body: String,
}

impl StaticSearch {
    pub fn new(body: impl Into<String>) -> Self {
        Self { body: body.into() }
    }
}

#[async_trait]
impl SearchProvider for StaticSearch {
    async fn search(&self, _query: &str) -> Result<String, BackendError> {
        Ok(self.body.clone())
    }
}
