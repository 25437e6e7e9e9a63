//! Geofence service orchestration.
//!
//! Wires the position feed, the evaluation engine, and the notification
//! dispatcher together:
//!
//! ```text
//! PositionSource ──► PositionFeed ──► processor task ──► NotificationDispatcher
//!                                      (engine.on_sample)
//! ```
//!
//! A single processor task drains the feed and runs each evaluation pass to
//! completion before taking the next update, which serializes all access to
//! the session's entry state no matter how the source delivers samples.
//!
//! Failure policy (per the error taxonomy): transient failures are logged,
//! handed to the optional diagnostics handler, and the watch continues;
//! a permanent failure (permission denied) stops the watch for the session.
//! Entry state is never cleared by a failure; an unknown position is not
//! evidence of an exit.

use std::sync::Arc;

use parking_lot::Mutex;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::engine::GeofenceEngine;
use crate::feed::{FeedConfig, PositionError, PositionFeed, PositionSource, PositionUpdate};
use crate::notify::{NotificationDispatcher, Notifier};
use crate::place::PlaceStore;
use crate::settings::SharedSettings;

/// Diagnostics callback invoked for every sampling failure.
pub type FailureHandler = Arc<dyn Fn(&PositionError) + Send + Sync>;

/// Builder for [`GeofenceService`].
pub struct GeofenceServiceBuilder {
    store: PlaceStore,
    settings: SharedSettings,
    notifier: Arc<dyn Notifier>,
    feed_config: FeedConfig,
    failure_handler: Option<FailureHandler>,
}

impl GeofenceServiceBuilder {
    /// Start a builder from the three external collaborators.
    pub fn new(store: PlaceStore, settings: SharedSettings, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            store,
            settings,
            notifier,
            feed_config: FeedConfig::default(),
            failure_handler: None,
        }
    }

    /// Override the feed configuration.
    pub fn feed_config(mut self, config: FeedConfig) -> Self {
        self.feed_config = config;
        self
    }

    /// Install a diagnostics handler for sampling failures.
    pub fn on_failure(
        mut self,
        handler: impl Fn(&PositionError) + Send + Sync + 'static,
    ) -> Self {
        self.failure_handler = Some(Arc::new(handler));
        self
    }

    /// Spawn the processor task and hand back the running service.
    ///
    /// Must be called within a tokio runtime.
    pub fn build(self) -> GeofenceService {
        let (feed, updates_rx) = PositionFeed::new(self.feed_config);
        let feed = Arc::new(Mutex::new(feed));
        let cancel = CancellationToken::new();

        let engine = GeofenceEngine::new(self.store);
        let dispatcher = NotificationDispatcher::new(self.settings, self.notifier);

        let processor = tokio::spawn(run_processor(
            updates_rx,
            engine,
            dispatcher,
            Arc::clone(&feed),
            self.failure_handler,
            cancel.child_token(),
        ));

        GeofenceService {
            feed,
            cancel,
            processor: Some(processor),
        }
    }
}

/// The running geofence service.
///
/// Holds the feed subscription and the processor task. The engine and its
/// entry state live inside the processor and survive feed restarts within
/// the session: bouncing the watch does not change physical membership.
pub struct GeofenceService {
    feed: Arc<Mutex<PositionFeed>>,
    cancel: CancellationToken,
    processor: Option<JoinHandle<()>>,
}

impl GeofenceService {
    /// Begin building a service.
    pub fn builder(
        store: PlaceStore,
        settings: SharedSettings,
        notifier: Arc<dyn Notifier>,
    ) -> GeofenceServiceBuilder {
        GeofenceServiceBuilder::new(store, settings, notifier)
    }

    /// Start (or restart) watching a position source.
    ///
    /// Idempotent: a prior subscription is torn down first. Entry state is
    /// intentionally kept.
    pub fn start<S: PositionSource>(&self, source: S) {
        self.feed.lock().start(source);
        info!("position watch started");
    }

    /// Stop the position watch. Entry state is kept; evaluation simply
    /// pauses until the next start.
    pub fn stop_watch(&self) {
        self.feed.lock().stop();
    }

    /// Whether a position subscription is currently held.
    pub fn is_watching(&self) -> bool {
        self.feed.lock().is_running()
    }

    /// Shut the service down: stop the watch and end the processor task.
    pub fn shutdown(mut self) {
        self.cancel.cancel();
        self.feed.lock().stop();
        if let Some(processor) = self.processor.take() {
            drop(processor);
        }
        info!("geofence service shut down");
    }
}

impl Drop for GeofenceService {
    fn drop(&mut self) {
        self.cancel.cancel();
        self.feed.lock().stop();
    }
}

/// Drain the feed, evaluating samples and routing failures.
async fn run_processor(
    mut updates_rx: tokio::sync::mpsc::Receiver<PositionUpdate>,
    mut engine: GeofenceEngine,
    dispatcher: NotificationDispatcher,
    feed: Arc<Mutex<PositionFeed>>,
    failure_handler: Option<FailureHandler>,
    cancel: CancellationToken,
) {
    loop {
        tokio::select! {
            biased;

            _ = cancel.cancelled() => break,

            update = updates_rx.recv() => {
                match update {
                    Some(PositionUpdate::Sample(sample)) => {
                        for event in engine.on_sample(&sample) {
                            dispatcher.dispatch(&event);
                        }
                    }
                    Some(PositionUpdate::Failure(error)) => {
                        warn!(error = %error, "position sampling failure");
                        if let Some(handler) = &failure_handler {
                            handler(&error);
                        }
                        if error.is_fatal() {
                            // Permanent for the session: release the
                            // subscription, keep entry state as-is.
                            warn!("stopping position watch after permanent failure");
                            feed.lock().stop();
                        }
                    }
                    None => break,
                }
            }
        }
    }
}
