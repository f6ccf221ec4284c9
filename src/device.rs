use crate::error::PlayerError;
use tokio::sync::mpsc;

/// Notifications the audio device pushes while a track is loaded. Position
/// and duration are in seconds.
#[derive(Debug, Clone, PartialEq)]
pub enum DeviceEvent {
    PositionUpdate(f64),
    DurationKnown(f64),
    /// Fetching/buffering began, either on a fresh load or mid-stream.
    LoadStarted,
    /// Enough media is buffered to play.
    Ready,
    /// The loaded track played to completion.
    Ended,
    /// The device rejected the loaded media (bad codec, revoked access, ...).
    Failed(String),
}

pub type DeviceEventSender = mpsc::UnboundedSender<DeviceEvent>;
pub type DeviceEventReceiver = mpsc::UnboundedReceiver<DeviceEvent>;

/// Channel a device uses to report events. The playback engine owns the
/// receiving half; dropping the engine tears the subscription down.
pub fn device_channel() -> (DeviceEventSender, DeviceEventReceiver) {
    mpsc::unbounded_channel()
}

/// Single-stream decoder/renderer driven by one media locator at a time.
/// Exactly one live instance per playback session. `load` must complete or
/// fail before a subsequent `play`/`pause`/`seek` is meaningful; the
/// playback engine serializes calls per track transition.
pub trait AudioDevice {
    /// Point the device at a new media locator, replacing whatever was
    /// loaded before.
    fn load(&mut self, locator: &str) -> Result<(), PlayerError>;

    /// Start or resume rendering the loaded media.
    fn play(&mut self) -> Result<(), PlayerError>;

    fn pause(&mut self);

    fn seek(&mut self, seconds: f64);

    /// Volume in `[0, 1]`. Persists across loads.
    fn set_volume(&mut self, volume: f32);
}
