pub mod auth;
pub mod catalog;
pub mod device;
pub mod drive;
pub mod error;
pub mod models;
pub mod normalizer;
pub mod playback;
pub mod queue;

pub use auth::AuthSession;
pub use catalog::{CatalogStore, RequestGuard, RequestId};
pub use device::{device_channel, AudioDevice, DeviceEvent, DeviceEventReceiver};
pub use drive::DriveClient;
pub use error::PlayerError;
pub use models::{
    CatalogSnapshot, PlaybackSnapshot, PlaybackStatus, QueueSnapshot, RawFile, SortKey, Track,
};
pub use playback::{EngineEvent, PlaybackEngine};
pub use queue::PlayQueue;

use std::time::Duration;
use tracing::{debug, info};

/// Initialize structured logging. Call once per process, from the host.
pub fn init_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("cloudtune=info,warn")),
        )
        .with_target(false)
        .init();
}

/// One player session: the catalog, the play queue, and the playback engine
/// behind every user intent the presentation layer can dispatch. Construct
/// exactly one per application session and inject it; there are no hidden
/// globals.
///
/// Single-threaded and event-driven: intents and `process_device_events`
/// calls must be serialized by the host, never run concurrently.
pub struct Player<D: AudioDevice> {
    auth: AuthSession,
    drive: DriveClient,
    catalog: CatalogStore,
    requests: RequestGuard,
    queue: PlayQueue,
    engine: PlaybackEngine<D>,
}

impl<D: AudioDevice> Player<D> {
    /// Wire a session around a device and the receiving half of its event
    /// channel (see [`device_channel`]).
    pub fn new(device: D, events: DeviceEventReceiver) -> Result<Self, PlayerError> {
        Ok(Player::with_drive_client(device, events, DriveClient::new()?))
    }

    pub fn with_drive_client(
        device: D,
        events: DeviceEventReceiver,
        drive: DriveClient,
    ) -> Self {
        Player {
            auth: AuthSession::new(),
            drive,
            catalog: CatalogStore::new(),
            requests: RequestGuard::default(),
            queue: PlayQueue::new(),
            engine: PlaybackEngine::new(device, events),
        }
    }

    // --- credentials -----------------------------------------------------

    pub fn sign_in(&mut self, access_token: impl Into<String>, expires_in: Option<Duration>) {
        self.auth.sign_in(access_token, expires_in);
    }

    pub fn sign_out(&mut self) {
        self.auth.sign_out();
    }

    pub fn is_authenticated(&self) -> bool {
        self.auth.is_authenticated()
    }

    // --- catalog ---------------------------------------------------------

    /// Fetch the full remote listing and rebuild the catalog. On transport
    /// failure the previous snapshot is preserved so the UI can keep
    /// showing the last good list.
    pub async fn load_catalog(&mut self) -> Result<CatalogSnapshot, PlayerError> {
        let token = self.auth.bearer_token()?.to_string();
        let request = self.begin_listing();
        let files = self.drive.list_music_files(&token).await?;
        self.apply_listing(request, files);
        Ok(self.catalog.snapshot())
    }

    /// Server-side search. An empty term falls back to the full listing.
    pub async fn search(&mut self, term: &str) -> Result<CatalogSnapshot, PlayerError> {
        if term.trim().is_empty() {
            return self.load_catalog().await;
        }

        let token = self.auth.bearer_token()?.to_string();
        let request = self.begin_listing();
        let files = self.drive.search_music_files(term, &token).await?;
        self.apply_listing(request, files);
        Ok(self.catalog.snapshot())
    }

    /// Reserve a sequence slot for a listing fetch. Split from
    /// [`apply_listing`] so results arriving out of order can be rejected.
    pub fn begin_listing(&mut self) -> RequestId {
        self.requests.begin()
    }

    /// Normalize and apply a listing result, unless a newer request already
    /// replaced the catalog. Returns whether the result was applied.
    pub fn apply_listing(&mut self, request: RequestId, files: Vec<RawFile>) -> bool {
        if !self.requests.try_apply(request) {
            debug!("listing result superseded; keeping current catalog");
            return false;
        }

        let tracks = normalizer::normalize(files);
        info!(tracks = tracks.len(), "catalog rebuilt from listing");
        self.catalog.replace_all(tracks);
        true
    }

    pub fn catalog_snapshot(&self) -> CatalogSnapshot {
        self.catalog.snapshot()
    }

    pub fn sorted_catalog(&self, key: SortKey) -> Vec<Track> {
        self.catalog.sorted_by(key)
    }

    pub fn filtered_catalog(&self, term: &str) -> Vec<Track> {
        self.catalog.filter(term)
    }

    // --- playback --------------------------------------------------------

    pub fn play_track(&mut self, track: &Track) -> Result<(), PlayerError> {
        self.engine.play(Some(track))
    }

    pub fn pause_current(&mut self) {
        self.engine.pause();
    }

    pub fn toggle_play(&mut self) -> Result<(), PlayerError> {
        self.engine.toggle()
    }

    pub fn seek(&mut self, seconds: f64) {
        self.engine.seek(seconds);
    }

    pub fn set_volume(&mut self, volume: f32) {
        self.engine.set_volume(volume);
    }

    pub fn playback_snapshot(&self) -> PlaybackSnapshot {
        self.engine.snapshot()
    }

    // --- queue -----------------------------------------------------------

    pub fn enqueue(&mut self, track: Track) -> bool {
        self.queue.enqueue(track)
    }

    pub fn dequeue(&mut self, track_id: &str) {
        self.queue.dequeue(track_id, &mut self.engine);
    }

    pub fn clear_queue(&mut self) {
        self.queue.clear(&mut self.engine);
    }

    /// Replace the queue with the catalog as currently sorted and filtered,
    /// and start playback at the top. Sorting is applied before filtering,
    /// matching what the track list shows.
    pub fn play_all_filtered(&mut self, key: SortKey, term: &str) -> Result<(), PlayerError> {
        let view = catalog::filter_tracks(&self.catalog.sorted_by(key), term);
        self.queue.play_all(view, 0, &mut self.engine)
    }

    pub fn play_all(&mut self, tracks: Vec<Track>, start_index: usize) -> Result<(), PlayerError> {
        self.queue.play_all(tracks, start_index, &mut self.engine)
    }

    pub fn skip_next(&mut self) -> Result<(), PlayerError> {
        self.queue.advance(&mut self.engine)
    }

    pub fn skip_previous(&mut self) -> Result<(), PlayerError> {
        self.queue.retreat(&mut self.engine)
    }

    pub fn queue_snapshot(&self) -> QueueSnapshot {
        self.queue.snapshot()
    }

    // --- device events ---------------------------------------------------

    /// Drain pending device events, auto-advancing the queue when a track
    /// finishes. Returns the non-fatal playback failures to surface. Call
    /// from the host's event loop.
    pub fn process_device_events(&mut self) -> Vec<PlayerError> {
        let mut notices = Vec::new();

        for outcome in self.engine.pump_events() {
            match outcome {
                EngineEvent::TrackFinished => {
                    if let Err(err) = self.queue.advance(&mut self.engine) {
                        notices.push(err);
                    }
                }
                EngineEvent::PlaybackFailed(message) => {
                    notices.push(PlayerError::Playback(message));
                }
            }
        }

        notices
    }
}
