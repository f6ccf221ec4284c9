use serde::{Deserialize, Serialize};

/// One record from the remote file-listing service, as it arrives on the
/// wire. Anything beyond `id` and `name` is optional; `size` is a numeric
/// string on this API and is parsed during normalization.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawFile {
    pub id: Option<String>,
    pub name: Option<String>,
    pub size: Option<String>,
    pub mime_type: Option<String>,
    pub created_time: Option<String>,
    pub modified_time: Option<String>,
}

/// Normalized metadata for one playable audio item. Immutable once built,
/// except for `duration_seconds`, which is filled in lazily when the device
/// reports it for the currently loaded track.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Track {
    pub id: String,
    /// Filename with the extension stripped.
    pub display_name: String,
    /// Untouched source filename, kept for diagnostics.
    pub original_name: String,
    pub byte_size: u64,
    pub mime_type: Option<String>,
    pub created_at: Option<String>,
    pub modified_at: Option<String>,
    /// Opaque reference the audio device can open; derived from `id`.
    pub media_locator: String,
    pub artist: String,
    pub title: String,
    pub duration_seconds: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortKey {
    Name,
    Artist,
    Size,
    Date,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlaybackStatus {
    Idle,
    Loading,
    Playing,
    Paused,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogSnapshot {
    pub tracks: Vec<Track>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueueSnapshot {
    pub tracks: Vec<Track>,
    /// `None` means no active position.
    pub current_index: Option<usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaybackSnapshot {
    pub current_track: Option<Track>,
    pub status: PlaybackStatus,
    pub position_seconds: f64,
    pub duration_seconds: Option<f64>,
    pub volume: f32,
    /// Mid-stream rebuffering while `status` is still `Playing`.
    pub buffering: bool,
}

const SIZE_UNITS: [&str; 4] = ["Bytes", "KB", "MB", "GB"];

/// Human-readable file size: `0 Bytes`, `1.5 KB`, `3.42 MB`.
/// Values round to two decimals with trailing zeros trimmed.
pub fn format_file_size(bytes: u64) -> String {
    if bytes == 0 {
        return "0 Bytes".to_string();
    }

    let exp = ((bytes as f64).ln() / 1024f64.ln()).floor() as usize;
    let exp = exp.min(SIZE_UNITS.len() - 1);
    let value = bytes as f64 / 1024f64.powi(exp as i32);
    let rounded = (value * 100.0).round() / 100.0;

    format!("{} {}", rounded, SIZE_UNITS[exp])
}

/// Clock display for a position or duration, `m:ss`. Non-finite or
/// negative input renders as `0:00`.
pub fn format_time(seconds: f64) -> String {
    if !seconds.is_finite() || seconds < 0.0 {
        return "0:00".to_string();
    }

    let total = seconds.floor() as u64;
    format!("{}:{:02}", total / 60, total % 60)
}
