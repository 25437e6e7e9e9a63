//! Position feed adapter.
//!
//! Wraps a continuous position source into a normalized stream of
//! [`PositionUpdate`]s: either a fresh [`PositionSample`] or a
//! [`PositionError`]. Sources are push-based and run as background tasks;
//! the feed owns the subscription lifecycle and guarantees:
//!
//! - **Idempotent start**: starting while already running tears the prior
//!   subscription down first, so there is never more than one concurrent
//!   watch.
//! - **Idempotent stop**: the underlying subscription is released exactly
//!   once.
//! - **Bounded wait**: a watchdog reports a [`PositionError::Timeout`] when
//!   no sample arrives within [`FeedConfig::sample_timeout`], then keeps
//!   watching. Signal loss is not evidence of movement, so the feed never
//!   touches entry/exit state.

mod replay;
mod udp;

pub use replay::{ReplayPositionSource, TrackParseError, TrackPoint, DEFAULT_REPLAY_INTERVAL};
pub use udp::{UdpPositionSource, DEFAULT_UDP_PORT};

use std::future::Future;
use std::time::Duration;

use chrono::{DateTime, Utc};
use thiserror::Error;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::geo::GeoPoint;

/// Default bounded wait before a missing sample is reported as a timeout.
pub const DEFAULT_SAMPLE_TIMEOUT: Duration = Duration::from_secs(15);

/// A single position fix from the underlying source.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PositionSample {
    /// Latitude in degrees.
    pub latitude: f64,
    /// Longitude in degrees.
    pub longitude: f64,
    /// Reported accuracy in meters. Informational only; evaluation never
    /// consults it.
    pub accuracy_m: f64,
    /// When this sample was considered current. Most recent call wins; no
    /// ordering is enforced beyond that.
    pub timestamp: DateTime<Utc>,
}

impl PositionSample {
    /// Create a sample stamped with the current time.
    pub fn new(latitude: f64, longitude: f64, accuracy_m: f64) -> Self {
        Self {
            latitude,
            longitude,
            accuracy_m,
            timestamp: Utc::now(),
        }
    }

    /// The sample's coordinates as a [`GeoPoint`].
    pub fn point(&self) -> GeoPoint {
        GeoPoint::new(self.latitude, self.longitude)
    }
}

/// Failure modes of a position source.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum PositionError {
    /// The user or environment denied location access. Permanent for the
    /// session: the watch stops rather than retrying indefinitely.
    #[error("location permission denied")]
    PermissionDenied,

    /// The source is temporarily unable to produce fixes.
    #[error("position unavailable: {0}")]
    Unavailable(String),

    /// No sample arrived within the bounded wait.
    #[error("no position sample within {0:?}")]
    Timeout(Duration),

    /// Anything the source could not classify.
    #[error("position source error: {0}")]
    Unknown(String),
}

impl PositionError {
    /// Whether this failure is permanent for the session.
    ///
    /// Transient failures leave the watch running; a fatal one stops it.
    /// Either way, entry/exit state is left untouched: "unknown position"
    /// is distinct from "outside".
    pub fn is_fatal(&self) -> bool {
        matches!(self, PositionError::PermissionDenied)
    }
}

/// One item on the normalized feed stream.
#[derive(Debug, Clone, PartialEq)]
pub enum PositionUpdate {
    /// A fresh position fix.
    Sample(PositionSample),
    /// A sampling failure, surfaced for diagnostics.
    Failure(PositionError),
}

/// Feed configuration.
#[derive(Debug, Clone, Copy)]
pub struct FeedConfig {
    /// Request high-accuracy fixes from sources that distinguish.
    pub high_accuracy: bool,
    /// Maximum acceptable age of a cached fix. `None` means always fresh.
    pub max_sample_age: Option<Duration>,
    /// Bounded wait before the watchdog reports a timeout.
    pub sample_timeout: Duration,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            high_accuracy: true,
            max_sample_age: None,
            sample_timeout: DEFAULT_SAMPLE_TIMEOUT,
        }
    }
}

/// A continuous position source.
///
/// Implementations push updates into `updates` until `cancel` fires, then
/// return. Failures are reported in-band as [`PositionUpdate::Failure`];
/// returning without cancellation means the source is exhausted (e.g. a
/// replay reached its end).
pub trait PositionSource: Send + 'static {
    /// Drive the watch.
    fn watch(
        self,
        updates: mpsc::Sender<PositionUpdate>,
        cancel: CancellationToken,
    ) -> impl Future<Output = ()> + Send;
}

/// A running watch: cancel token plus the two tasks it governs.
struct Subscription {
    cancel: CancellationToken,
    source_task: JoinHandle<()>,
    watchdog_task: JoinHandle<()>,
}

/// Owns the source subscription and normalizes its output.
///
/// Construction hands back the receiving end of the stream; the consumer
/// (the geofence service) drains it serially.
pub struct PositionFeed {
    config: FeedConfig,
    out_tx: mpsc::Sender<PositionUpdate>,
    subscription: Option<Subscription>,
}

impl PositionFeed {
    /// Channel depth between the feed and its consumer.
    const CHANNEL_CAPACITY: usize = 32;

    /// Create a feed and the stream its consumer reads from.
    pub fn new(config: FeedConfig) -> (Self, mpsc::Receiver<PositionUpdate>) {
        let (out_tx, out_rx) = mpsc::channel(Self::CHANNEL_CAPACITY);
        (
            Self {
                config,
                out_tx,
                subscription: None,
            },
            out_rx,
        )
    }

    /// Start watching `source`.
    ///
    /// Any prior subscription is torn down first, so calling this twice
    /// never produces duplicate concurrent watches. Must be called within a
    /// tokio runtime.
    pub fn start<S: PositionSource>(&mut self, source: S) {
        self.stop();

        let cancel = CancellationToken::new();
        let (raw_tx, raw_rx) = mpsc::channel(Self::CHANNEL_CAPACITY);

        let source_task = tokio::spawn(source.watch(raw_tx, cancel.child_token()));
        let watchdog_task = tokio::spawn(run_watchdog(
            raw_rx,
            self.out_tx.clone(),
            self.config.sample_timeout,
            cancel.child_token(),
        ));

        self.subscription = Some(Subscription {
            cancel,
            source_task,
            watchdog_task,
        });
        debug!("position feed started");
    }

    /// Stop watching. Safe to call repeatedly or when never started.
    pub fn stop(&mut self) {
        if let Some(subscription) = self.subscription.take() {
            subscription.cancel.cancel();
            // Tasks observe the token and finish on their own; dropping the
            // handles detaches them.
            drop(subscription.source_task);
            drop(subscription.watchdog_task);
            debug!("position feed stopped");
        }
    }

    /// Whether a subscription is currently active.
    pub fn is_running(&self) -> bool {
        self.subscription.is_some()
    }

    /// The feed configuration.
    pub fn config(&self) -> &FeedConfig {
        &self.config
    }
}

impl Drop for PositionFeed {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Forward source updates downstream, inserting a timeout failure whenever
/// the source goes quiet for longer than `sample_timeout`.
async fn run_watchdog(
    mut raw_rx: mpsc::Receiver<PositionUpdate>,
    out_tx: mpsc::Sender<PositionUpdate>,
    sample_timeout: Duration,
    cancel: CancellationToken,
) {
    loop {
        tokio::select! {
            _ = cancel.cancelled() => break,

            received = tokio::time::timeout(sample_timeout, raw_rx.recv()) => {
                match received {
                    Ok(Some(update)) => {
                        if out_tx.send(update).await.is_err() {
                            debug!("position feed consumer dropped");
                            break;
                        }
                    }
                    Ok(None) => {
                        debug!("position source ended");
                        break;
                    }
                    Err(_) => {
                        let failure =
                            PositionUpdate::Failure(PositionError::Timeout(sample_timeout));
                        if out_tx.send(failure).await.is_err() {
                            break;
                        }
                    }
                }
            }
        }
    }
}
