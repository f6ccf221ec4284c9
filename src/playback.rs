use crate::device::{AudioDevice, DeviceEvent, DeviceEventReceiver};
use crate::error::PlayerError;
use crate::models::{PlaybackSnapshot, PlaybackStatus, Track};
use tracing::{debug, warn};

/// Outcomes of pumping device events that the session must act on.
#[derive(Debug, Clone, PartialEq)]
pub enum EngineEvent {
    /// Emitted exactly once per completed track; the queue reacts by
    /// auto-advancing.
    TrackFinished,
    /// Non-fatal device failure, surfaced as a notice.
    PlaybackFailed(String),
}

/// Single active-track state machine wrapping the audio device.
///
/// States: Idle -> Loading -> Playing <-> Paused -> Idle, with Loading
/// falling back to Idle on load failure. Mid-stream rebuffering while
/// audible is tracked by the `buffering` sub-flag, never by reverting
/// `status` out of Playing.
pub struct PlaybackEngine<D: AudioDevice> {
    device: D,
    events: DeviceEventReceiver,
    current_track: Option<Track>,
    status: PlaybackStatus,
    position_seconds: f64,
    duration_seconds: Option<f64>,
    volume: f32,
    buffering: bool,
}

impl<D: AudioDevice> PlaybackEngine<D> {
    pub fn new(device: D, events: DeviceEventReceiver) -> Self {
        PlaybackEngine {
            device,
            events,
            current_track: None,
            status: PlaybackStatus::Idle,
            position_seconds: 0.0,
            duration_seconds: None,
            volume: 1.0,
            buffering: false,
        }
    }

    /// Point the device at `track`. No-op when the track is already the
    /// loaded one, so repeated play intents never reload mid-track. On
    /// device rejection nothing changes.
    pub fn load(&mut self, track: &Track) -> Result<(), PlayerError> {
        if self
            .current_track
            .as_ref()
            .is_some_and(|current| current.id == track.id)
        {
            return Ok(());
        }

        self.device.load(&track.media_locator)?;

        debug!(track = %track.display_name, "track loaded");
        self.position_seconds = 0.0;
        // Duration belongs to the loaded media; never carried across tracks
        self.duration_seconds = None;
        self.buffering = false;
        self.status = PlaybackStatus::Loading;
        self.current_track = Some(track.clone());
        Ok(())
    }

    /// Start playback, loading `track` first when given. With no argument,
    /// resumes the current track; a no-op when nothing is loaded. On device
    /// rejection the status stays at its last known-good value.
    pub fn play(&mut self, track: Option<&Track>) -> Result<(), PlayerError> {
        if let Some(track) = track {
            self.load(track)?;
        }

        if self.current_track.is_none() {
            return Ok(());
        }

        self.device.play()?;
        self.status = PlaybackStatus::Playing;
        Ok(())
    }

    /// No-op when already paused or idle.
    pub fn pause(&mut self) {
        match self.status {
            PlaybackStatus::Playing | PlaybackStatus::Loading => {
                self.device.pause();
                self.status = PlaybackStatus::Paused;
            }
            PlaybackStatus::Paused | PlaybackStatus::Idle => {}
        }
    }

    pub fn toggle(&mut self) -> Result<(), PlayerError> {
        if self.status == PlaybackStatus::Playing {
            self.pause();
            Ok(())
        } else {
            self.play(None)
        }
    }

    /// Optimistic seek: the position updates immediately and the device's
    /// next position event corrects it. Clamped to `[0, duration]` once the
    /// duration is known.
    pub fn seek(&mut self, seconds: f64) {
        let target = match self.duration_seconds {
            Some(duration) => seconds.clamp(0.0, duration),
            None => seconds.max(0.0),
        };
        self.device.seek(target);
        self.position_seconds = target;
    }

    /// Clamped to `[0, 1]`. The device keeps the value across loads.
    pub fn set_volume(&mut self, volume: f32) {
        let volume = volume.clamp(0.0, 1.0);
        self.device.set_volume(volume);
        self.volume = volume;
    }

    /// Drop the loaded track, used when it is removed from under playback.
    pub fn clear(&mut self) {
        self.pause();
        self.current_track = None;
        self.status = PlaybackStatus::Idle;
        self.position_seconds = 0.0;
        self.duration_seconds = None;
        self.buffering = false;
    }

    pub fn current_track(&self) -> Option<&Track> {
        self.current_track.as_ref()
    }

    pub fn status(&self) -> PlaybackStatus {
        self.status
    }

    pub fn snapshot(&self) -> PlaybackSnapshot {
        PlaybackSnapshot {
            current_track: self.current_track.clone(),
            status: self.status,
            position_seconds: self.position_seconds,
            duration_seconds: self.duration_seconds,
            volume: self.volume,
            buffering: self.buffering,
        }
    }

    /// Drain pending device events into state transitions. Returns the
    /// outcomes the session must route onward (auto-advance, notices).
    pub fn pump_events(&mut self) -> Vec<EngineEvent> {
        let mut outcomes = Vec::new();

        while let Ok(event) = self.events.try_recv() {
            match event {
                DeviceEvent::PositionUpdate(position) => {
                    self.position_seconds = position;
                }
                DeviceEvent::DurationKnown(duration) => {
                    self.duration_seconds = Some(duration);
                    if let Some(track) = &mut self.current_track {
                        track.duration_seconds = Some(duration);
                    }
                }
                DeviceEvent::LoadStarted => {
                    if self.status == PlaybackStatus::Playing {
                        // Mid-stream rebuffering must not visibly pause the UI
                        self.buffering = true;
                    } else if self.current_track.is_some() {
                        self.status = PlaybackStatus::Loading;
                        self.buffering = true;
                    }
                }
                DeviceEvent::Ready => {
                    self.buffering = false;
                }
                DeviceEvent::Ended => {
                    self.status = PlaybackStatus::Idle;
                    self.buffering = false;
                    outcomes.push(EngineEvent::TrackFinished);
                }
                DeviceEvent::Failed(message) => {
                    warn!(error = %message, "device reported playback failure");
                    if self.status == PlaybackStatus::Loading {
                        self.status = PlaybackStatus::Idle;
                    }
                    self.buffering = false;
                    outcomes.push(EngineEvent::PlaybackFailed(message));
                }
            }
        }

        outcomes
    }
}
