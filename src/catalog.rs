use crate::models::{CatalogSnapshot, SortKey, Track};
use crate::normalizer::locale_cmp;
use tracing::debug;

/// In-memory store for the current catalog snapshot. Replaced wholesale on
/// each successful fetch or search; never partially merged.
#[derive(Debug, Default)]
pub struct CatalogStore {
    tracks: Vec<Track>,
}

impl CatalogStore {
    pub fn new() -> Self {
        CatalogStore::default()
    }

    pub fn replace_all(&mut self, tracks: Vec<Track>) {
        debug!(count = tracks.len(), "catalog replaced");
        self.tracks = tracks;
    }

    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    /// Case-insensitive substring match against display name, artist, and
    /// title. An empty term returns the full catalog unchanged in order.
    pub fn filter(&self, term: &str) -> Vec<Track> {
        filter_tracks(&self.tracks, term)
    }

    /// New ordering over a copy of the catalog; stored order is untouched.
    /// Equal keys keep their relative order (stable sort), so sorting and
    /// filtering compose in either direction.
    pub fn sorted_by(&self, key: SortKey) -> Vec<Track> {
        sort_tracks(self.tracks.clone(), key)
    }

    pub fn snapshot(&self) -> CatalogSnapshot {
        CatalogSnapshot {
            tracks: self.tracks.clone(),
        }
    }
}

pub fn filter_tracks(tracks: &[Track], term: &str) -> Vec<Track> {
    let term = term.trim().to_lowercase();
    if term.is_empty() {
        return tracks.to_vec();
    }

    tracks
        .iter()
        .filter(|track| {
            track.display_name.to_lowercase().contains(&term)
                || track.artist.to_lowercase().contains(&term)
                || track.title.to_lowercase().contains(&term)
        })
        .cloned()
        .collect()
}

pub fn sort_tracks(mut tracks: Vec<Track>, key: SortKey) -> Vec<Track> {
    match key {
        SortKey::Name => tracks.sort_by(|a, b| locale_cmp(&a.display_name, &b.display_name)),
        SortKey::Artist => tracks.sort_by(|a, b| locale_cmp(&a.artist, &b.artist)),
        SortKey::Size => tracks.sort_by(|a, b| b.byte_size.cmp(&a.byte_size)),
        // RFC 3339 timestamps compare chronologically as strings; a missing
        // timestamp sorts as earliest, so it lands last in descending order
        SortKey::Date => tracks.sort_by(|a, b| b.modified_at.cmp(&a.modified_at)),
    }
    tracks
}

/// Handle for one in-flight listing fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestId(u64);

/// Monotonic guard against the stale-fetch race: a superseded request's
/// result is discarded instead of clobbering a fresher snapshot.
#[derive(Debug, Default)]
pub struct RequestGuard {
    next: u64,
    last_applied: u64,
}

impl RequestGuard {
    pub fn begin(&mut self) -> RequestId {
        self.next += 1;
        RequestId(self.next)
    }

    /// True when `id` is newer than everything applied so far; records it
    /// as applied. False means the caller must drop the result.
    pub fn try_apply(&mut self, id: RequestId) -> bool {
        if id.0 > self.last_applied {
            self.last_applied = id.0;
            true
        } else {
            debug!(request = id.0, "stale listing result discarded");
            false
        }
    }
}
