use crate::error::PlayerError;
use std::time::{Duration, Instant};
use tracing::info;

/// Session-scoped holder for the opaque bearer credential supplied by the
/// identity provider. The core never interprets the token; it only checks
/// validity and attaches the value to listing requests. Nothing here is
/// persisted past the session.
#[derive(Debug, Default)]
pub struct AuthSession {
    access_token: Option<String>,
    expires_at: Option<Instant>,
}

impl AuthSession {
    pub fn new() -> Self {
        AuthSession::default()
    }

    /// Store a fresh credential. `expires_in` is optional because some
    /// identity flows only hand over a token and revoke it out of band.
    pub fn sign_in(&mut self, access_token: impl Into<String>, expires_in: Option<Duration>) {
        self.access_token = Some(access_token.into());
        self.expires_at = expires_in.map(|ttl| Instant::now() + ttl);
        info!("session credential stored");
    }

    /// Drop the credential. Safe to call when already signed out.
    pub fn sign_out(&mut self) {
        if self.access_token.take().is_some() {
            info!("session credential cleared");
        }
        self.expires_at = None;
    }

    pub fn is_authenticated(&self) -> bool {
        match (&self.access_token, self.expires_at) {
            (Some(_), Some(deadline)) => Instant::now() < deadline,
            (Some(_), None) => true,
            (None, _) => false,
        }
    }

    /// Token value to attach to requests, or `NotAuthenticated` when the
    /// credential is missing or expired.
    pub fn bearer_token(&self) -> Result<&str, PlayerError> {
        if !self.is_authenticated() {
            return Err(PlayerError::NotAuthenticated);
        }
        self.access_token
            .as_deref()
            .ok_or(PlayerError::NotAuthenticated)
    }
}
