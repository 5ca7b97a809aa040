use async_trait::async_trait;
use shared::{
    domain::WorkId,
    protocol::{Category, CreatorSummary, WorkDetail, WorkSummary},
};

use crate::{
    error::{CatalogError, CatalogResult},
    query::{QueryDescriptor, ResultPage, WorkListQuery},
};

/// The hosted data API: query execution, pattern filtering, embedding and counting.
#[async_trait]
pub trait CatalogApi: Send + Sync {
    /// One page of matching works plus the exact number of matches.
    async fn search_works(&self, descriptor: &QueryDescriptor) -> CatalogResult<ResultPage>;
    /// All categories ordered by name.
    async fn list_categories(&self) -> CatalogResult<Vec<Category>>;
    async fn fetch_work(&self, work_id: WorkId) -> CatalogResult<WorkDetail>;
    async fn list_works(&self, query: &WorkListQuery) -> CatalogResult<Vec<WorkSummary>>;
    async fn update_views(&self, work_id: WorkId, views: u64) -> CatalogResult<()>;
    async fn list_work_ids(&self, exclude: Option<WorkId>, limit: u32)
        -> CatalogResult<Vec<WorkId>>;
    /// Newest creators first. `featured_only = false` embeds each creator's work count.
    async fn list_creators(
        &self,
        featured_only: bool,
        limit: u32,
    ) -> CatalogResult<Vec<CreatorSummary>>;
}

pub struct MissingCatalogApi;

fn unavailable<T>() -> CatalogResult<T> {
    Err(CatalogError::Network("catalog api is unavailable".into()))
}

#[async_trait]
impl CatalogApi for MissingCatalogApi {
    async fn search_works(&self, _descriptor: &QueryDescriptor) -> CatalogResult<ResultPage> {
        unavailable()
    }

    async fn list_categories(&self) -> CatalogResult<Vec<Category>> {
        unavailable()
    }

    async fn fetch_work(&self, _work_id: WorkId) -> CatalogResult<WorkDetail> {
        unavailable()
    }

    async fn list_works(&self, _query: &WorkListQuery) -> CatalogResult<Vec<WorkSummary>> {
        unavailable()
    }

    async fn update_views(&self, _work_id: WorkId, _views: u64) -> CatalogResult<()> {
        unavailable()
    }

    async fn list_work_ids(
        &self,
        _exclude: Option<WorkId>,
        _limit: u32,
    ) -> CatalogResult<Vec<WorkId>> {
        unavailable()
    }

    async fn list_creators(
        &self,
        _featured_only: bool,
        _limit: u32,
    ) -> CatalogResult<Vec<CreatorSummary>> {
        unavailable()
    }
}
