use async_trait::async_trait;
use locus_core::AppResult;
use locus_domain::{Location, LocationId, Page, PageRequest};

/// Port for the remote location collection.
#[async_trait]
pub trait LocationDirectory: Send + Sync {
    /// Fetches one page of the location feed.
    async fn fetch_page(&self, request: &PageRequest) -> AppResult<Page>;

    /// Looks up a single location by id.
    async fn find_location(&self, location_id: &LocationId) -> AppResult<Option<Location>>;
}
