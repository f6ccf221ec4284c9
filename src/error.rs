use thiserror::Error;

#[derive(Debug, Error)]
pub enum PlayerError {
    /// Listing or search fetch failed: network trouble or a non-success
    /// status. Retryable; the previous catalog snapshot is kept.
    #[error("transport error: {0}")]
    Transport(String),

    /// The audio device rejected a load or play. Non-fatal; playback of
    /// other tracks remains possible.
    #[error("playback error: {0}")]
    Playback(String),

    /// Malformed raw record. Normalization drops these silently; the
    /// variant exists for callers that validate records individually.
    #[error("invalid file record: {0}")]
    InvalidRecord(String),

    /// No valid bearer credential for the remote store.
    #[error("not signed in")]
    NotAuthenticated,
}

impl From<reqwest::Error> for PlayerError {
    fn from(err: reqwest::Error) -> Self {
        PlayerError::Transport(err.to_string())
    }
}

// Convert to String for embedding layers that surface plain messages
impl From<PlayerError> for String {
    fn from(err: PlayerError) -> Self {
        err.to_string()
    }
}
