use std::{sync::Arc, time::Duration};

use rand::seq::SliceRandom;
use shared::domain::WorkId;
use tokio::sync::{broadcast, Mutex};
use tracing::{debug, error};

use crate::{
    api::CatalogApi,
    debounce::Throttle,
    events::{CatalogEvent, NoticeLevel},
};

/// Upper bound on ids fetched to pick from.
pub const RANDOM_POOL_LIMIT: u32 = 1000;
pub const RANDOM_THROTTLE: Duration = Duration::from_secs(1);

/// Backs the "surprise me" button on every page.
pub struct RandomWorkPicker {
    api: Arc<dyn CatalogApi>,
    events: broadcast::Sender<CatalogEvent>,
    throttle: Mutex<Throttle>,
}

impl RandomWorkPicker {
    pub fn new(
        api: Arc<dyn CatalogApi>,
        events: broadcast::Sender<CatalogEvent>,
        interval: Duration,
    ) -> Self {
        Self {
            api,
            events,
            throttle: Mutex::new(Throttle::new(interval)),
        }
    }

    /// Emits `Navigate` for a uniformly chosen work other than `exclude`.
    /// Returns `None` when throttled, when there is nothing to pick, or on failure.
    pub async fn pick(&self, exclude: Option<WorkId>) -> Option<WorkId> {
        if !self.throttle.lock().await.try_acquire() {
            debug!("random work request throttled");
            return None;
        }

        let ids = match self.api.list_work_ids(exclude, RANDOM_POOL_LIMIT).await {
            Ok(ids) => ids,
            Err(err) => {
                error!(%err, "failed to fetch work ids for random pick");
                self.notice(NoticeLevel::Error, "Failed to pick a random work");
                return None;
            }
        };

        let picked = ids.choose(&mut rand::thread_rng()).copied();
        match picked {
            Some(work_id) => {
                debug!(%work_id, pool = ids.len(), "picked random work");
                let _ = self.events.send(CatalogEvent::Navigate(work_id));
                Some(work_id)
            }
            None => {
                let message = if exclude.is_some() {
                    "No other works to browse yet"
                } else {
                    "No works to browse yet"
                };
                self.notice(NoticeLevel::Info, message);
                None
            }
        }
    }

    fn notice(&self, level: NoticeLevel, message: &str) {
        let _ = self.events.send(CatalogEvent::Notice {
            level,
            message: message.to_string(),
        });
    }
}
