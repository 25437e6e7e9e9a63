//! Watch command - run the live geofence engine in the terminal.

use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::Args;
use tokio_util::sync::CancellationToken;

use placewatch::feed::{ReplayPositionSource, UdpPositionSource, DEFAULT_UDP_PORT};
use placewatch::notify::{Notifier, NotifyError};
use placewatch::storage::{load_places, load_settings};
use placewatch::{GeofenceService, PlaceStore, SharedSettings};

use super::open_store;
use crate::error::CliError;

/// Arguments for the watch command.
#[derive(Debug, Args)]
pub struct WatchArgs {
    /// UDP port to listen on for position datagrams
    #[arg(long, default_value_t = DEFAULT_UDP_PORT, conflicts_with = "replay")]
    pub port: u16,

    /// Replay a recorded track (JSON lines) instead of listening on UDP
    #[arg(long)]
    pub replay: Option<PathBuf>,

    /// Delay between replayed samples in milliseconds
    #[arg(long, default_value_t = 1000)]
    pub interval_ms: u64,
}

/// Notifier printing to the terminal.
struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    fn notify(&self, title: &str, body: &str) -> Result<(), NotifyError> {
        println!();
        println!(">> {}", title);
        println!("   {}", body);
        Ok(())
    }
}

/// Run the watch command.
pub fn run(args: WatchArgs) -> Result<(), CliError> {
    let store = open_store()?;
    let settings = load_settings(&store)?;
    let places = load_places(&store, settings.default_radius_m)?;

    if places.is_empty() {
        println!("No saved places. Add one first: placewatch places add --name ... --lat ... --lon ...");
        return Ok(());
    }

    println!("Placewatch v{}", placewatch::VERSION);
    println!("================");
    println!();
    println!("Watching {} place(s):", places.len());
    for place in &places {
        println!(
            "  {}  {}  radius {:.0}m",
            place.id, place.name, place.radius_m
        );
    }
    println!();
    println!("Press Ctrl+C to stop");
    println!();

    let place_store = PlaceStore::with_places(places);
    let shared_settings = SharedSettings::with_settings(settings);

    let runtime = tokio::runtime::Runtime::new()
        .map_err(|e| CliError::RuntimeCreation(e.to_string()))?;

    // Signal handler flips a cancellation token the async side waits on.
    let cancel = CancellationToken::new();
    let ctrlc_cancel = cancel.clone();
    ctrlc::set_handler(move || {
        println!();
        println!("Received shutdown signal, stopping watch...");
        ctrlc_cancel.cancel();
    })
    .map_err(|e| CliError::Config(format!("failed to set signal handler: {}", e)))?;

    runtime.block_on(async {
        let service = GeofenceService::builder(
            place_store,
            shared_settings,
            Arc::new(ConsoleNotifier),
        )
        .on_failure(|error| eprintln!("!! position feed: {}", error))
        .build();

        match args.replay {
            Some(path) => {
                let text = fs::read_to_string(&path)?;
                let interval = Duration::from_millis(args.interval_ms);
                let source = ReplayPositionSource::from_jsonl(&text)?.with_interval(interval);
                let sample_count = source.len() as u32;
                println!("Replaying {} samples from {}", sample_count, path.display());

                service.start(source);

                // Run until the track has fully replayed, or Ctrl+C.
                let track_duration = interval * sample_count + Duration::from_millis(500);
                tokio::select! {
                    _ = cancel.cancelled() => {}
                    _ = tokio::time::sleep(track_duration) => {
                        println!("Replay finished.");
                    }
                }
            }
            None => {
                println!("Listening for position datagrams on UDP port {}", args.port);
                service.start(UdpPositionSource::new(args.port));
                cancel.cancelled().await;
            }
        }

        service.shutdown();
        Ok::<(), CliError>(())
    })?;

    println!("Watch stopped.");
    Ok(())
}
