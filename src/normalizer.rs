use crate::drive;
use crate::models::{RawFile, Track};
use regex::Regex;
use std::cmp::Ordering;
use std::collections::HashSet;
use tracing::debug;

pub const SUPPORTED_EXTENSIONS: [&str; 6] = ["mp3", "wav", "ogg", "flac", "m4a", "aac"];

/// Separator patterns for `Artist <sep> Title` filenames, tried in order;
/// the first match wins. The precedence is a contract: a name matching more
/// than one style splits on the earliest pattern listed here.
const SEPARATOR_PATTERNS: [&str; 3] = [
    r"^(.+?)\s*-\s*(.+)$",    // "Artist - Title"
    r"^(.+?)\s*[–—]\s*(.+)$", // "Artist – Title" (en/em dash)
    r"^(.+?)\s*_\s*(.+)$",    // "Artist _ Title"
];

/// Turn a raw remote listing into the catalog: filter to music files, derive
/// display metadata, sort by display name, and drop duplicate ids (first
/// occurrence in sorted order wins). Pure; no I/O.
pub fn normalize(raw_files: Vec<RawFile>) -> Vec<Track> {
    let mut tracks: Vec<Track> = raw_files.into_iter().filter_map(normalize_file).collect();

    tracks.sort_by(|a, b| locale_cmp(&a.display_name, &b.display_name));

    let mut seen = HashSet::new();
    tracks.retain(|track| seen.insert(track.id.clone()));

    tracks
}

fn normalize_file(raw: RawFile) -> Option<Track> {
    let id = match raw.id.filter(|id| !id.is_empty()) {
        Some(id) => id,
        None => {
            debug!("dropping listing record without id");
            return None;
        }
    };
    let name = match raw.name.filter(|name| !name.is_empty()) {
        Some(name) => name,
        None => {
            debug!(id = %id, "dropping listing record without name");
            return None;
        }
    };

    if !is_music_file(&name, raw.mime_type.as_deref()) {
        return None;
    }

    let display_name = strip_extension(&name).to_string();
    let (artist, title) = split_artist_title(&display_name);
    let byte_size = parse_size(raw.size.as_deref());

    Some(Track {
        media_locator: drive::media_locator(&id),
        id,
        display_name,
        original_name: name,
        byte_size,
        mime_type: raw.mime_type,
        created_at: raw.created_time,
        modified_at: raw.modified_time,
        artist,
        title,
        duration_seconds: None,
    })
}

/// A record is kept when either its extension is in the supported set or
/// its MIME type starts with `audio/`. One passing test is enough, so a
/// supported extension survives an unrecognized MIME type and vice versa.
fn is_music_file(name: &str, mime_type: Option<&str>) -> bool {
    let extension = name.rsplit('.').next().unwrap_or("").to_lowercase();
    let supported_extension = SUPPORTED_EXTENSIONS.contains(&extension.as_str());
    let supported_mime = mime_type.is_some_and(|mime| mime.starts_with("audio/"));

    supported_extension || supported_mime
}

/// Strip the last dot-delimited extension segment, if any.
fn strip_extension(name: &str) -> &str {
    match name.rfind('.') {
        Some(pos) if pos + 1 < name.len() && !name[pos + 1..].contains('/') => &name[..pos],
        _ => name,
    }
}

/// Unknown sizes (absent or non-numeric) normalize to 0.
fn parse_size(size: Option<&str>) -> u64 {
    let Some(size) = size else { return 0 };
    let size = size.trim();
    if let Ok(parsed) = size.parse::<u64>() {
        return parsed;
    }
    match size.parse::<f64>() {
        Ok(parsed) if parsed.is_finite() && parsed >= 0.0 => parsed.floor() as u64,
        _ => 0,
    }
}

/// Artist heuristic over the extension-stripped filename. Total: any input
/// yields a non-empty artist, falling back to `"Unknown Artist"`.
pub fn extract_artist(file_name: &str) -> String {
    split_artist_title(strip_extension(file_name)).0
}

/// Title heuristic over the extension-stripped filename. Total: when no
/// separator pattern matches, the title is the full display name.
pub fn extract_title(file_name: &str) -> String {
    split_artist_title(strip_extension(file_name)).1
}

fn split_artist_title(display_name: &str) -> (String, String) {
    for pattern in SEPARATOR_PATTERNS {
        if let Ok(re) = Regex::new(pattern) {
            if let Some(caps) = re.captures(display_name) {
                if let (Some(artist), Some(title)) = (caps.get(1), caps.get(2)) {
                    return (
                        artist.as_str().trim().to_string(),
                        title.as_str().trim().to_string(),
                    );
                }
            }
        }
    }

    ("Unknown Artist".to_string(), display_name.to_string())
}

/// Locale-aware ordering: case-insensitive Unicode comparison with a
/// case-sensitive tiebreak, so equal keys stay deterministic under stable
/// sorts.
pub(crate) fn locale_cmp(a: &str, b: &str) -> Ordering {
    match a.to_lowercase().cmp(&b.to_lowercase()) {
        Ordering::Equal => a.cmp(b),
        unequal => unequal,
    }
}
