use shared::{
    domain::WorkId,
    protocol::{Category, CreatorSummary, WorkDetail, WorkSummary},
};

use crate::{pagination::PaginationWindow, query::ResultPage, state::QueryState};

/// Area of a page an event (or error) belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    SearchResults,
    WorkDetail,
    RelatedWorks,
    FeaturedWorks,
    FeaturedCreators,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Success,
    Error,
}

/// Everything a renderer needs to know; controllers never render themselves.
#[derive(Debug, Clone)]
pub enum CatalogEvent {
    Loading(View),
    /// Input controls should show this state.
    ControlsSynced(QueryState),
    CategoriesLoaded(Vec<Category>),
    SearchResults {
        page: ResultPage,
        total_pages: u32,
        pagination: Option<PaginationWindow>,
    },
    NoResults,
    WorkLoaded(WorkDetail),
    WorkNotFound(Option<WorkId>),
    RelatedWorks(Vec<WorkSummary>),
    FeaturedWorks(Vec<WorkSummary>),
    FeaturedCreators(Vec<CreatorSummary>),
    Navigate(WorkId),
    Notice {
        level: NoticeLevel,
        message: String,
    },
    Error {
        view: View,
        message: String,
    },
}
