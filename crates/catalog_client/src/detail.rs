use std::{sync::Arc, time::Duration};

use shared::{
    domain::WorkId,
    error::ErrorCode,
    protocol::{WorkDetail, WorkSummary},
};
use tokio::sync::{broadcast, Mutex};
use tracing::{debug, error, info, warn};
use url::form_urlencoded;

use crate::{
    address_bar::AddressBar,
    api::CatalogApi,
    error::CatalogResult,
    events::{CatalogEvent, View},
    query::WorkListQuery,
    random::{RandomWorkPicker, RANDOM_THROTTLE},
    EVENT_CHANNEL_CAPACITY,
};

pub const PARAM_WORK_ID: &str = "id";
pub const RELATED_LIMIT: u32 = 6;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetailOutcome {
    Loaded(WorkId),
    NotFound,
    Failed(ErrorCode),
}

/// Controller behind the work detail page.
pub struct DetailController {
    api: Arc<dyn CatalogApi>,
    address_bar: Arc<dyn AddressBar>,
    work: Mutex<Option<WorkDetail>>,
    random: RandomWorkPicker,
    events: broadcast::Sender<CatalogEvent>,
}

impl DetailController {
    pub fn new(api: Arc<dyn CatalogApi>, address_bar: Arc<dyn AddressBar>) -> Arc<Self> {
        Self::new_with_random_interval(api, address_bar, RANDOM_THROTTLE)
    }

    pub fn new_with_random_interval(
        api: Arc<dyn CatalogApi>,
        address_bar: Arc<dyn AddressBar>,
        random_interval: Duration,
    ) -> Arc<Self> {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Arc::new(Self {
            random: RandomWorkPicker::new(api.clone(), events.clone(), random_interval),
            api,
            address_bar,
            work: Mutex::new(None),
            events,
        })
    }

    pub fn subscribe_events(&self) -> broadcast::Receiver<CatalogEvent> {
        self.events.subscribe()
    }

    pub async fn work(&self) -> Option<WorkDetail> {
        self.work.lock().await.clone()
    }

    /// The `id` param of the address bar, if it holds a work id.
    pub fn requested_work_id(&self) -> Option<WorkId> {
        let query = self.address_bar.query();
        form_urlencoded::parse(query.trim_start_matches('?').as_bytes())
            .find(|(key, _)| key == PARAM_WORK_ID)
            .and_then(|(_, value)| value.parse::<WorkId>().ok())
    }

    pub async fn initialize(&self) -> DetailOutcome {
        match self.requested_work_id() {
            Some(work_id) => self.load(work_id).await,
            None => {
                info!("detail page opened without a valid work id");
                let _ = self.events.send(CatalogEvent::WorkNotFound(None));
                DetailOutcome::NotFound
            }
        }
    }

    /// Fetches the work, counts the visit and loads related works.
    pub async fn load(&self, work_id: WorkId) -> DetailOutcome {
        let _ = self.events.send(CatalogEvent::Loading(View::WorkDetail));

        let mut work = match self.api.fetch_work(work_id).await {
            Ok(work) => work,
            Err(err) if err.is_not_found() => {
                info!(%work_id, "work not found");
                let _ = self.events.send(CatalogEvent::WorkNotFound(Some(work_id)));
                return DetailOutcome::NotFound;
            }
            Err(err) => {
                error!(%work_id, %err, "failed to load work");
                let _ = self.events.send(CatalogEvent::Error {
                    view: View::WorkDetail,
                    message: err.user_message().to_string(),
                });
                return DetailOutcome::Failed(err.code());
            }
        };

        // The page shows the count including this visit.
        work.views = work.views.saturating_add(1);
        *self.work.lock().await = Some(work.clone());
        let _ = self.events.send(CatalogEvent::WorkLoaded(work.clone()));

        if let Err(err) = self.api.update_views(work_id, work.views).await {
            warn!(%work_id, %err, "failed to record view");
        }

        self.load_related(&work).await;
        DetailOutcome::Loaded(work_id)
    }

    /// Most viewed works sharing the category (or, without one, the creator),
    /// falling back to the newest works. An empty list hides the section.
    pub async fn load_related(&self, work: &WorkDetail) -> Vec<WorkSummary> {
        let _ = self.events.send(CatalogEvent::Loading(View::RelatedWorks));

        let related = match self.fetch_related(work).await {
            Ok(related) => related,
            Err(err) => {
                warn!(work_id = %work.id, %err, "failed to load related works");
                Vec::new()
            }
        };
        let _ = self.events.send(CatalogEvent::RelatedWorks(related.clone()));
        related
    }

    async fn fetch_related(&self, work: &WorkDetail) -> CatalogResult<Vec<WorkSummary>> {
        let mut query = WorkListQuery::most_viewed(RELATED_LIMIT).excluding(work.id);
        if let Some(category) = work.category_id {
            query = query.in_category(category);
        } else if let Some(creator) = work.creator_id {
            query = query.by_creator(creator);
        }

        let related = self.api.list_works(&query).await?;
        if !related.is_empty() {
            return Ok(related);
        }

        debug!(work_id = %work.id, "no related works; falling back to latest");
        let fallback = WorkListQuery::latest(RELATED_LIMIT).excluding(work.id);
        self.api.list_works(&fallback).await
    }

    /// Random work other than the one on display.
    pub async fn random_work(&self) -> Option<WorkId> {
        let current = self.work.lock().await.as_ref().map(|work| work.id);
        self.random
            .pick(current.or_else(|| self.requested_work_id()))
            .await
    }
}

#[cfg(test)]
#[path = "tests/detail_tests.rs"]
mod tests;
