use std::{sync::Arc, time::Duration};

use futures::future::join;
use shared::{
    domain::WorkId,
    protocol::{CreatorSummary, WorkSummary},
};
use tokio::sync::broadcast;
use tracing::{debug, error};

use crate::{
    api::CatalogApi,
    error::CatalogResult,
    events::{CatalogEvent, View},
    query::WorkListQuery,
    random::{RandomWorkPicker, RANDOM_THROTTLE},
    EVENT_CHANNEL_CAPACITY,
};

pub const FEATURED_WORKS_LIMIT: u32 = 6;
pub const FEATURED_CREATORS_LIMIT: u32 = 4;

/// Controller behind the landing page.
pub struct HomeController {
    api: Arc<dyn CatalogApi>,
    random: RandomWorkPicker,
    events: broadcast::Sender<CatalogEvent>,
}

impl HomeController {
    pub fn new(api: Arc<dyn CatalogApi>) -> Arc<Self> {
        Self::new_with_random_interval(api, RANDOM_THROTTLE)
    }

    pub fn new_with_random_interval(api: Arc<dyn CatalogApi>, random_interval: Duration) -> Arc<Self> {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Arc::new(Self {
            random: RandomWorkPicker::new(api.clone(), events.clone(), random_interval),
            api,
            events,
        })
    }

    pub fn subscribe_events(&self) -> broadcast::Receiver<CatalogEvent> {
        self.events.subscribe()
    }

    /// Loads both sections concurrently; each reports its own failure.
    pub async fn initialize(&self) {
        let _ = join(self.load_featured_works(), self.load_featured_creators()).await;
    }

    pub async fn load_featured_works(&self) -> CatalogResult<Vec<WorkSummary>> {
        let _ = self.events.send(CatalogEvent::Loading(View::FeaturedWorks));
        match self.fetch_featured_works().await {
            Ok(works) => {
                let _ = self.events.send(CatalogEvent::FeaturedWorks(works.clone()));
                Ok(works)
            }
            Err(err) => {
                error!(%err, "failed to load featured works");
                self.report(View::FeaturedWorks, err.user_message());
                Err(err)
            }
        }
    }

    async fn fetch_featured_works(&self) -> CatalogResult<Vec<WorkSummary>> {
        let featured = self
            .api
            .list_works(&WorkListQuery::most_viewed(FEATURED_WORKS_LIMIT).featured())
            .await?;
        if !featured.is_empty() {
            return Ok(featured);
        }
        debug!("no featured works; showing latest");
        self.api
            .list_works(&WorkListQuery::latest(FEATURED_WORKS_LIMIT))
            .await
    }

    pub async fn load_featured_creators(&self) -> CatalogResult<Vec<CreatorSummary>> {
        let _ = self.events.send(CatalogEvent::Loading(View::FeaturedCreators));
        match self.fetch_featured_creators().await {
            Ok(creators) => {
                let _ = self
                    .events
                    .send(CatalogEvent::FeaturedCreators(creators.clone()));
                Ok(creators)
            }
            Err(err) => {
                error!(%err, "failed to load featured creators");
                self.report(View::FeaturedCreators, err.user_message());
                Err(err)
            }
        }
    }

    async fn fetch_featured_creators(&self) -> CatalogResult<Vec<CreatorSummary>> {
        let featured = self
            .api
            .list_creators(true, FEATURED_CREATORS_LIMIT)
            .await?;
        if !featured.is_empty() {
            return Ok(featured);
        }
        debug!("no featured creators; showing newest");
        self.api.list_creators(false, FEATURED_CREATORS_LIMIT).await
    }

    pub async fn random_work(&self) -> Option<WorkId> {
        self.random.pick(None).await
    }

    fn report(&self, view: View, message: &str) {
        let _ = self.events.send(CatalogEvent::Error {
            view,
            message: message.to_string(),
        });
    }
}

#[cfg(test)]
#[path = "tests/home_tests.rs"]
mod tests;
