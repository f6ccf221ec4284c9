use crate::device::AudioDevice;
use crate::error::PlayerError;
use crate::models::{QueueSnapshot, Track};
use crate::playback::PlaybackEngine;
use tracing::debug;

/// The user-curated play queue plus its current-position pointer.
///
/// Operations that start or stop audio borrow the playback engine; the
/// queue never owns it. `current_index == None` means no active position;
/// otherwise it is always a valid index into the queue.
#[derive(Debug, Default)]
pub struct PlayQueue {
    tracks: Vec<Track>,
    current_index: Option<usize>,
}

impl PlayQueue {
    pub fn new() -> Self {
        PlayQueue::default()
    }

    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    pub fn current_index(&self) -> Option<usize> {
        self.current_index
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    pub fn snapshot(&self) -> QueueSnapshot {
        QueueSnapshot {
            tracks: self.tracks.clone(),
            current_index: self.current_index,
        }
    }

    /// Append unless an entry with the same id already exists. Returns
    /// whether the track was added.
    pub fn enqueue(&mut self, track: Track) -> bool {
        if self.tracks.iter().any(|queued| queued.id == track.id) {
            return false;
        }
        debug!(track = %track.display_name, "enqueued");
        self.tracks.push(track);
        true
    }

    /// Remove every entry matching `track_id`. If the removed track is the
    /// one loaded in the engine, playback is paused and cleared. The
    /// position pointer is revalidated: it follows its entry, falls to the
    /// next surviving entry (clamped) when that entry is removed, and
    /// resets when the queue empties.
    pub fn dequeue<D: AudioDevice>(&mut self, track_id: &str, engine: &mut PlaybackEngine<D>) {
        let old_index = self.current_index;
        let mut kept = Vec::with_capacity(self.tracks.len());
        let mut pointer_kept_at = None;
        let mut pointer_removed_at = None;

        for (index, track) in self.tracks.drain(..).enumerate() {
            if track.id == track_id {
                if old_index == Some(index) {
                    pointer_removed_at = Some(kept.len());
                }
                continue;
            }
            if old_index == Some(index) {
                pointer_kept_at = Some(kept.len());
            }
            kept.push(track);
        }

        self.tracks = kept;
        self.current_index = if self.tracks.is_empty() {
            None
        } else if pointer_kept_at.is_some() {
            pointer_kept_at
        } else {
            pointer_removed_at.map(|at| at.min(self.tracks.len() - 1))
        };

        if engine
            .current_track()
            .is_some_and(|current| current.id == track_id)
        {
            engine.clear();
        }
    }

    /// Empty the queue and stop whatever is playing.
    pub fn clear<D: AudioDevice>(&mut self, engine: &mut PlaybackEngine<D>) {
        self.tracks.clear();
        self.current_index = None;
        engine.clear();
    }

    /// Atomically replace the queue and start playing at `start_index`
    /// (clamped to the last entry). An empty list leaves queue and playback
    /// untouched.
    pub fn play_all<D: AudioDevice>(
        &mut self,
        tracks: Vec<Track>,
        start_index: usize,
        engine: &mut PlaybackEngine<D>,
    ) -> Result<(), PlayerError> {
        if tracks.is_empty() {
            return Ok(());
        }

        let start = start_index.min(tracks.len() - 1);
        self.tracks = tracks;
        self.current_index = Some(start);

        let track = self.tracks[start].clone();
        engine.play(Some(&track))
    }

    /// Move to the next entry and play it. Does nothing at the last entry:
    /// the queue does not loop. With no active position and a non-empty
    /// queue, enters at index 0.
    pub fn advance<D: AudioDevice>(
        &mut self,
        engine: &mut PlaybackEngine<D>,
    ) -> Result<(), PlayerError> {
        let next = match self.current_index {
            None if !self.tracks.is_empty() => 0,
            Some(index) if index + 1 < self.tracks.len() => index + 1,
            _ => return Ok(()),
        };

        self.current_index = Some(next);
        let track = self.tracks[next].clone();
        engine.play(Some(&track))
    }

    /// Manual "previous": no-op unless the pointer can move left.
    pub fn retreat<D: AudioDevice>(
        &mut self,
        engine: &mut PlaybackEngine<D>,
    ) -> Result<(), PlayerError> {
        match self.current_index {
            Some(index) if index > 0 => {
                self.current_index = Some(index - 1);
                let track = self.tracks[index - 1].clone();
                engine.play(Some(&track))
            }
            _ => Ok(()),
        }
    }
}
