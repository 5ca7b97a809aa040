//! In-memory data API used by the controller tests.

use std::{
    collections::VecDeque,
    sync::{Arc, Mutex, MutexGuard},
    time::Duration,
};

use async_trait::async_trait;
use chrono::{DateTime, Duration as ChronoDuration, TimeZone, Utc};
use shared::{
    domain::{CategoryId, CreatorId, SortField, SortSpec, WorkId},
    protocol::{
        Category, CreatorProfile, CreatorSummary, EmbeddedCount, NamedRef, Related, WorkDetail,
        WorkSummary,
    },
};
use tokio::sync::broadcast;

use crate::{
    api::CatalogApi,
    error::{CatalogError, CatalogResult},
    events::CatalogEvent,
    query::{QueryDescriptor, ResultPage, WorkListQuery},
};

/// How the next search call behaves.
#[derive(Debug, Clone, Default)]
pub(crate) struct SearchPlan {
    pub delay: Duration,
    pub failure: Option<CatalogError>,
}

#[derive(Default)]
pub(crate) struct FakeState {
    pub works: Vec<WorkSummary>,
    pub categories: Vec<Category>,
    pub creators: Vec<CreatorSummary>,
    pub search_plans: VecDeque<SearchPlan>,
    pub searches: Vec<QueryDescriptor>,
    pub list_queries: Vec<WorkListQuery>,
    pub creator_queries: Vec<(bool, u32)>,
    pub view_updates: Vec<(WorkId, u64)>,
    pub fail_categories: Option<CatalogError>,
    pub fail_fetch: Option<CatalogError>,
    pub fail_list_works: Option<CatalogError>,
    pub fail_update_views: Option<CatalogError>,
    pub fail_work_ids: Option<CatalogError>,
    pub fail_creators: Option<CatalogError>,
}

#[derive(Default)]
pub(crate) struct FakeCatalogApi {
    state: Mutex<FakeState>,
}

impl FakeCatalogApi {
    pub fn with_works(works: Vec<WorkSummary>) -> Arc<Self> {
        let api = Self::default();
        api.state().works = works;
        Arc::new(api)
    }

    pub fn state(&self) -> MutexGuard<'_, FakeState> {
        self.state.lock().expect("fake api lock")
    }

    pub fn plan_search(&self, plan: SearchPlan) {
        self.state().search_plans.push_back(plan);
    }

    pub fn searches(&self) -> Vec<QueryDescriptor> {
        self.state().searches.clone()
    }

    pub fn list_queries(&self) -> Vec<WorkListQuery> {
        self.state().list_queries.clone()
    }

    pub fn view_updates(&self) -> Vec<(WorkId, u64)> {
        self.state().view_updates.clone()
    }
}

fn sort_works(works: &mut [WorkSummary], sort: SortSpec) {
    works.sort_by(|a, b| {
        let ordering = match sort.field {
            SortField::CreatedAt => a.created_at.cmp(&b.created_at),
            SortField::Views => a.views.cmp(&b.views),
            SortField::Title => a.title.cmp(&b.title),
        };
        if sort.direction.is_ascending() {
            ordering
        } else {
            ordering.reverse()
        }
    });
}

fn matches_text(work: &WorkSummary, needle: &str) -> bool {
    let needle = needle.to_lowercase();
    work.title.to_lowercase().contains(&needle)
        || work
            .description
            .as_deref()
            .is_some_and(|description| description.to_lowercase().contains(&needle))
}

fn to_detail(work: &WorkSummary) -> WorkDetail {
    WorkDetail {
        id: work.id,
        title: work.title.clone(),
        description: work.description.clone(),
        image_url: work.image_url.clone(),
        creator_id: work.creator_id,
        category_id: work.category_id,
        creator: work
            .creator_id
            .map(|id| CreatorProfile {
                id,
                name: work.creator_name().to_string(),
                avatar_url: None,
                specialty: None,
                bio: None,
            })
            .into(),
        category: work
            .category_id
            .map(|id| Category {
                id,
                name: work.category_name().to_string(),
                description: None,
            })
            .into(),
        views: work.views,
        created_at: work.created_at,
        featured: work.featured,
    }
}

#[async_trait]
impl CatalogApi for FakeCatalogApi {
    async fn search_works(&self, descriptor: &QueryDescriptor) -> CatalogResult<ResultPage> {
        let plan = {
            let mut state = self.state();
            state.searches.push(descriptor.clone());
            state.search_plans.pop_front().unwrap_or_default()
        };
        if !plan.delay.is_zero() {
            tokio::time::sleep(plan.delay).await;
        }
        if let Some(err) = plan.failure {
            return Err(err);
        }

        let mut matching: Vec<WorkSummary> = self
            .state()
            .works
            .iter()
            .filter(|work| {
                descriptor
                    .text
                    .as_deref()
                    .map_or(true, |text| matches_text(work, text))
            })
            .filter(|work| descriptor.category.map_or(true, |c| work.category_id == Some(c)))
            .cloned()
            .collect();
        sort_works(&mut matching, descriptor.sort);

        let total_count = matching.len() as u64;
        let rows = matching
            .into_iter()
            .skip(descriptor.offset as usize)
            .take(descriptor.limit as usize)
            .collect();
        Ok(ResultPage { rows, total_count })
    }

    async fn list_categories(&self) -> CatalogResult<Vec<Category>> {
        let state = self.state();
        match &state.fail_categories {
            Some(err) => Err(err.clone()),
            None => Ok(state.categories.clone()),
        }
    }

    async fn fetch_work(&self, work_id: WorkId) -> CatalogResult<WorkDetail> {
        let state = self.state();
        if let Some(err) = &state.fail_fetch {
            return Err(err.clone());
        }
        state
            .works
            .iter()
            .find(|work| work.id == work_id)
            .map(to_detail)
            .ok_or_else(|| CatalogError::not_found("work", work_id))
    }

    async fn list_works(&self, query: &WorkListQuery) -> CatalogResult<Vec<WorkSummary>> {
        let mut state = self.state();
        state.list_queries.push(query.clone());
        if let Some(err) = &state.fail_list_works {
            return Err(err.clone());
        }
        let mut works: Vec<WorkSummary> = state
            .works
            .iter()
            .filter(|work| query.featured.map_or(true, |featured| work.featured == featured))
            .filter(|work| query.category.map_or(true, |c| work.category_id == Some(c)))
            .filter(|work| query.creator.map_or(true, |c| work.creator_id == Some(c)))
            .filter(|work| query.exclude != Some(work.id))
            .cloned()
            .collect();
        sort_works(&mut works, query.sort);
        works.truncate(query.limit as usize);
        Ok(works)
    }

    async fn update_views(&self, work_id: WorkId, views: u64) -> CatalogResult<()> {
        let mut state = self.state();
        if let Some(err) = &state.fail_update_views {
            return Err(err.clone());
        }
        state.view_updates.push((work_id, views));
        if let Some(work) = state.works.iter_mut().find(|work| work.id == work_id) {
            work.views = views;
        }
        Ok(())
    }

    async fn list_work_ids(
        &self,
        exclude: Option<WorkId>,
        limit: u32,
    ) -> CatalogResult<Vec<WorkId>> {
        let state = self.state();
        if let Some(err) = &state.fail_work_ids {
            return Err(err.clone());
        }
        Ok(state
            .works
            .iter()
            .map(|work| work.id)
            .filter(|id| Some(*id) != exclude)
            .take(limit as usize)
            .collect())
    }

    async fn list_creators(
        &self,
        featured_only: bool,
        limit: u32,
    ) -> CatalogResult<Vec<CreatorSummary>> {
        let mut state = self.state();
        state.creator_queries.push((featured_only, limit));
        if let Some(err) = &state.fail_creators {
            return Err(err.clone());
        }
        Ok(state
            .creators
            .iter()
            .filter(|creator| !featured_only || creator.featured)
            .take(limit as usize)
            .cloned()
            .collect())
    }
}

pub(crate) fn base_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0)
        .single()
        .expect("valid base time")
}

/// A work whose `created_at` grows with its id, so higher ids are newer.
pub(crate) fn work(id: i64, title: &str, category: Option<i64>, views: u64) -> WorkSummary {
    WorkSummary {
        id: WorkId(id),
        title: title.to_string(),
        description: Some(format!("Notes on {title}")),
        image_url: None,
        creator_id: Some(CreatorId(1)),
        category_id: category.map(CategoryId),
        creator: Related::new(NamedRef {
            name: "Ada".to_string(),
        }),
        category: category
            .map(|id| NamedRef {
                name: format!("Category {id}"),
            })
            .into(),
        views,
        created_at: base_time() + ChronoDuration::minutes(id),
        featured: false,
    }
}

/// `count` works titled `Work 1..=count`, alternating between categories 1 and 2.
pub(crate) fn catalog(count: i64) -> Vec<WorkSummary> {
    (1..=count)
        .map(|id| work(id, &format!("Work {id}"), Some(2 - id % 2), id as u64 * 10))
        .collect()
}

pub(crate) fn category(id: i64, name: &str) -> Category {
    Category {
        id: CategoryId(id),
        name: name.to_string(),
        description: None,
    }
}

pub(crate) fn creator(id: i64, name: &str, featured: bool, works: u64) -> CreatorSummary {
    CreatorSummary {
        id: CreatorId(id),
        name: name.to_string(),
        avatar_url: None,
        specialty: None,
        total_views: 0,
        featured,
        works: vec![EmbeddedCount { count: works }],
    }
}

pub(crate) fn drain(events: &mut broadcast::Receiver<CatalogEvent>) -> Vec<CatalogEvent> {
    let mut drained = Vec::new();
    while let Ok(event) = events.try_recv() {
        drained.push(event);
    }
    drained
}
