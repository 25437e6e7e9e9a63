//! Replay position source.
//!
//! Replays a recorded track at a fixed interval, one JSON object per line:
//!
//! ```text
//! {"lat": 37.2471, "lon": 127.0567, "accuracy": 5.0}
//! {"lat": 37.2465, "lon": 127.0567}
//! ```
//!
//! Useful for demos and for exercising the engine without a live source.
//! The subscription ends when the track is exhausted.

use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use super::{PositionSample, PositionSource, PositionUpdate};

/// Default delay between replayed samples.
pub const DEFAULT_REPLAY_INTERVAL: Duration = Duration::from_secs(1);

/// One recorded track point.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct TrackPoint {
    /// Latitude in degrees.
    pub lat: f64,
    /// Longitude in degrees.
    pub lon: f64,
    /// Reported accuracy in meters.
    #[serde(default)]
    pub accuracy: f64,
}

/// Errors parsing a recorded track.
#[derive(Debug, Error)]
pub enum TrackParseError {
    /// A line was not a valid track point.
    #[error("invalid track point on line {line}: {source}")]
    InvalidLine {
        line: usize,
        #[source]
        source: serde_json::Error,
    },
}

/// Position source replaying a fixed list of track points.
#[derive(Debug)]
pub struct ReplayPositionSource {
    points: Vec<TrackPoint>,
    interval: Duration,
}

impl ReplayPositionSource {
    /// Create a replay over the given points.
    pub fn new(points: Vec<TrackPoint>) -> Self {
        Self {
            points,
            interval: DEFAULT_REPLAY_INTERVAL,
        }
    }

    /// Parse a track from JSON-lines text. Blank lines are skipped.
    pub fn from_jsonl(text: &str) -> Result<Self, TrackParseError> {
        let mut points = Vec::new();
        for (idx, line) in text.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            let point = serde_json::from_str(line).map_err(|source| {
                TrackParseError::InvalidLine {
                    line: idx + 1,
                    source,
                }
            })?;
            points.push(point);
        }
        Ok(Self::new(points))
    }

    /// Set the delay between samples.
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Number of points in the track.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Whether the track is empty.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

impl PositionSource for ReplayPositionSource {
    async fn watch(self, updates: mpsc::Sender<PositionUpdate>, cancel: CancellationToken) {
        for point in self.points {
            tokio::select! {
                _ = cancel.cancelled() => {
                    debug!("replay cancelled");
                    return;
                }
                _ = tokio::time::sleep(self.interval) => {
                    let sample = PositionSample::new(point.lat, point.lon, point.accuracy);
                    if updates.send(PositionUpdate::Sample(sample)).await.is_err() {
                        return;
                    }
                }
            }
        }
        debug!("replay track exhausted");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_jsonl_skips_blank_lines() {
        let text = r#"
            {"lat": 37.0, "lon": 127.0, "accuracy": 5.0}

            {"lat": 37.1, "lon": 127.1}
        "#;
        let source = ReplayPositionSource::from_jsonl(text).unwrap();
        assert_eq!(source.len(), 2);
        assert_eq!(source.points[1].accuracy, 0.0);
    }

    #[test]
    fn test_parse_reports_line_number() {
        let text = "{\"lat\": 37.0, \"lon\": 127.0}\nnot json\n";
        let err = ReplayPositionSource::from_jsonl(text).unwrap_err();
        match err {
            TrackParseError::InvalidLine { line, .. } => assert_eq!(line, 2),
        }
    }

    #[tokio::test]
    async fn test_replays_in_order_then_ends() {
        let source = ReplayPositionSource::new(vec![
            TrackPoint {
                lat: 1.0,
                lon: 0.0,
                accuracy: 0.0,
            },
            TrackPoint {
                lat: 2.0,
                lon: 0.0,
                accuracy: 0.0,
            },
        ])
        .with_interval(Duration::from_millis(1));

        let (tx, mut rx) = mpsc::channel(8);
        let cancel = CancellationToken::new();
        let task = tokio::spawn(source.watch(tx, cancel));

        let mut latitudes = Vec::new();
        while let Some(update) = rx.recv().await {
            if let PositionUpdate::Sample(sample) = update {
                latitudes.push(sample.latitude);
            }
        }
        assert_eq!(latitudes, vec![1.0, 2.0]);
        task.await.unwrap();
    }
}
