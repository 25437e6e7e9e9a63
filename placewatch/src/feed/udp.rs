//! UDP position source.
//!
//! Listens for JSON position datagrams from a companion app or simulator:
//!
//! ```text
//! {"lat": 37.2458, "lon": 127.0567, "accuracy": 8.5}
//! ```
//!
//! `accuracy` is optional. Malformed datagrams are logged and skipped;
//! one bad packet must not end the watch.

use serde::Deserialize;
use tokio::net::UdpSocket;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::{PositionError, PositionSample, PositionSource, PositionUpdate};

/// Default UDP port for incoming position datagrams.
pub const DEFAULT_UDP_PORT: u16 = 47800;

/// Wire format of one datagram.
#[derive(Debug, Deserialize)]
struct PositionDatagram {
    lat: f64,
    lon: f64,
    #[serde(default)]
    accuracy: f64,
}

/// Position source reading JSON datagrams from a UDP port.
#[derive(Debug)]
pub struct UdpPositionSource {
    port: u16,
}

impl Default for UdpPositionSource {
    fn default() -> Self {
        Self::new(DEFAULT_UDP_PORT)
    }
}

impl UdpPositionSource {
    /// Create a source listening on the given port.
    pub fn new(port: u16) -> Self {
        Self { port }
    }

    /// The configured port.
    pub fn port(&self) -> u16 {
        self.port
    }
}

impl PositionSource for UdpPositionSource {
    async fn watch(self, updates: mpsc::Sender<PositionUpdate>, cancel: CancellationToken) {
        let socket = match UdpSocket::bind(("0.0.0.0", self.port)).await {
            Ok(socket) => socket,
            Err(e) => {
                warn!(port = self.port, error = %e, "failed to bind position socket");
                let failure = PositionError::Unavailable(format!(
                    "could not bind UDP port {}: {}",
                    self.port, e
                ));
                let _ = updates.send(PositionUpdate::Failure(failure)).await;
                return;
            }
        };

        info!(port = self.port, "listening for position datagrams");
        let mut buf = [0u8; 512];

        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    debug!("udp position source cancelled");
                    break;
                }

                received = socket.recv_from(&mut buf) => {
                    match received {
                        Ok((len, peer)) => {
                            match serde_json::from_slice::<PositionDatagram>(&buf[..len]) {
                                Ok(datagram) => {
                                    let sample = PositionSample::new(
                                        datagram.lat,
                                        datagram.lon,
                                        datagram.accuracy,
                                    );
                                    if updates.send(PositionUpdate::Sample(sample)).await.is_err() {
                                        break;
                                    }
                                }
                                Err(e) => {
                                    warn!(%peer, error = %e, "ignoring malformed position datagram");
                                }
                            }
                        }
                        Err(e) => {
                            warn!(error = %e, "position socket receive error");
                            let failure = PositionError::Unknown(e.to_string());
                            if updates.send(PositionUpdate::Failure(failure)).await.is_err() {
                                break;
                            }
                        }
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_receives_datagrams() {
        // Bind an ephemeral port by probing with a plain socket first.
        let probe = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        let port = probe.local_addr().unwrap().port();
        drop(probe);

        let (tx, mut rx) = mpsc::channel(8);
        let cancel = CancellationToken::new();
        let source = UdpPositionSource::new(port);
        let task = tokio::spawn(source.watch(tx, cancel.clone()));

        // Let the listener come up, then send one good and one bad datagram.
        tokio::time::sleep(std::time::Duration::from_millis(50)).await;
        let sender = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        sender
            .send_to(b"not json", ("127.0.0.1", port))
            .await
            .unwrap();
        sender
            .send_to(
                br#"{"lat": 37.2458, "lon": 127.0567, "accuracy": 8.5}"#,
                ("127.0.0.1", port),
            )
            .await
            .unwrap();

        let update = rx.recv().await.expect("listener should deliver");
        match update {
            PositionUpdate::Sample(sample) => {
                assert!((sample.latitude - 37.2458).abs() < 1e-9);
                assert!((sample.longitude - 127.0567).abs() < 1e-9);
                assert!((sample.accuracy_m - 8.5).abs() < 1e-9);
            }
            other => panic!("expected sample, got {:?}", other),
        }

        cancel.cancel();
        task.await.unwrap();
    }

    #[tokio::test]
    async fn test_missing_accuracy_defaults_to_zero() {
        let datagram: PositionDatagram =
            serde_json::from_str(r#"{"lat": 1.0, "lon": 2.0}"#).unwrap();
        assert_eq!(datagram.accuracy, 0.0);
    }
}
