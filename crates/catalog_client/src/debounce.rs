//! Timer-based rate limiting for high-frequency UI triggers.

use std::{future::Future, time::Duration};

use tokio::{
    sync::mpsc,
    time::{sleep, Instant},
};
use tracing::warn;

pub const SEARCH_QUIET_WINDOW: Duration = Duration::from_millis(500);

/// Collapses bursts of calls into one action that runs with the last value
/// once no call has arrived for the quiet window.
///
/// Actions run one at a time; calls made while an action is running start
/// a new burst. Dropping the debouncer discards a burst that has not fired.
pub struct Debouncer<T> {
    tx: mpsc::UnboundedSender<T>,
}

impl<T: Send + 'static> Debouncer<T> {
    pub fn spawn<F, Fut>(quiet: Duration, mut action: F) -> Self
    where
        F: FnMut(T) -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let (tx, mut rx) = mpsc::unbounded_channel::<T>();
        tokio::spawn(async move {
            while let Some(mut latest) = rx.recv().await {
                loop {
                    tokio::select! {
                        next = rx.recv() => match next {
                            Some(value) => latest = value,
                            None => return,
                        },
                        _ = sleep(quiet) => break,
                    }
                }
                action(latest).await;
            }
        });
        Self { tx }
    }

    pub fn call(&self, value: T) {
        if self.tx.send(value).is_err() {
            warn!("debounced action is no longer running; dropping call");
        }
    }
}

/// Leading-edge throttle: at most one acquisition per interval.
#[derive(Debug)]
pub struct Throttle {
    interval: Duration,
    last_fired: Option<Instant>,
}

impl Throttle {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last_fired: None,
        }
    }

    pub fn try_acquire(&mut self) -> bool {
        let now = Instant::now();
        match self.last_fired {
            Some(last) if now.duration_since(last) < self.interval => false,
            _ => {
                self.last_fired = Some(now);
                true
            }
        }
    }
}
