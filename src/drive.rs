use crate::error::PlayerError;
use crate::models::RawFile;
use crate::normalizer::SUPPORTED_EXTENSIONS;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

const DEFAULT_BASE_URL: &str = "https://www.googleapis.com/drive/v3";
const LISTING_FIELDS: &str = "files(id,name,size,mimeType,createdTime,modifiedTime)";

/// MIME types the remote store reports for audio uploads. The listing query
/// matches on these OR on filename extension, so files with a generic MIME
/// type still show up.
const AUDIO_MIME_TYPES: [&str; 8] = [
    "audio/mpeg",
    "audio/wav",
    "audio/ogg",
    "audio/flac",
    "audio/mp4",
    "audio/aac",
    "audio/x-wav",
    "audio/x-flac",
];

#[derive(Debug, Default, Deserialize)]
struct FileListResponse {
    #[serde(default)]
    files: Vec<RawFile>,
}

/// Client for the remote file-listing service. Owns one connection-pooled
/// HTTP client per session; the bearer token is supplied per call.
pub struct DriveClient {
    client: reqwest::Client,
    base_url: String,
}

impl DriveClient {
    pub fn new() -> Result<Self, PlayerError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(15))
            .pool_max_idle_per_host(2)
            .user_agent(format!("cloudtune/{}", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(DriveClient {
            client,
            base_url: DEFAULT_BASE_URL.to_string(),
        })
    }

    /// Point the client at a different endpoint. Used by tests and by hosts
    /// that proxy the remote store.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Fetch the full music listing for the account behind `access_token`.
    pub async fn list_music_files(&self, access_token: &str) -> Result<Vec<RawFile>, PlayerError> {
        let url = format!(
            "{}/files?q={}&fields={}&pageSize=1000",
            self.base_url,
            urlencoding::encode(&build_music_query()),
            LISTING_FIELDS,
        );
        self.fetch_listing(&url, access_token).await
    }

    /// Server-side filename search, restricted to the same music query as
    /// the full listing.
    pub async fn search_music_files(
        &self,
        term: &str,
        access_token: &str,
    ) -> Result<Vec<RawFile>, PlayerError> {
        let url = format!(
            "{}/files?q={}&fields={}&pageSize=100",
            self.base_url,
            urlencoding::encode(&build_search_query(term)),
            LISTING_FIELDS,
        );
        self.fetch_listing(&url, access_token).await
    }

    async fn fetch_listing(&self, url: &str, access_token: &str) -> Result<Vec<RawFile>, PlayerError> {
        let response = self
            .client
            .get(url)
            .bearer_auth(access_token)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(PlayerError::Transport(format!(
                "listing request failed with status {}",
                status
            )));
        }

        let listing: FileListResponse = response.json().await?;
        debug!(files = listing.files.len(), "listing fetched");
        Ok(listing.files)
    }
}

/// Deterministic media locator for a track id. The audio device resolves it
/// directly; nothing is fetched or validated here.
pub fn media_locator(id: &str) -> String {
    format!("{}/files/{}?alt=media", DEFAULT_BASE_URL, id)
}

/// Query matching any supported MIME type or filename extension, excluding
/// trashed files.
pub fn build_music_query() -> String {
    let mime_query = AUDIO_MIME_TYPES
        .iter()
        .map(|mime| format!("mimeType='{}'", mime))
        .collect::<Vec<_>>()
        .join(" or ");

    let extension_query = SUPPORTED_EXTENSIONS
        .iter()
        .map(|ext| format!("name contains '.{}'", ext))
        .collect::<Vec<_>>()
        .join(" or ");

    format!("({} or {}) and trashed=false", mime_query, extension_query)
}

pub fn build_search_query(term: &str) -> String {
    // Single quotes delimit strings in the query language
    let escaped = term.replace('\\', "\\\\").replace('\'', "\\'");
    format!("name contains '{}' and ({})", escaped, build_music_query())
}
