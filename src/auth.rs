//! Cached-credential management for the injected cloud capability.
//!
//! The drive client needs an authorized token, but the interactive browser
//! consent flow is an application concern, not ours: it enters this module
//! only as the [`AuthFlow`] trait. What lives here is the caching decision
//! tree around it:
//!
//! - cached credentials on disk and still valid → use them
//! - cached but expired, with a refresh token → refresh, re-store, use
//! - anything else → run the full authorization flow and store the result
//!
//! Credentials are stored as JSON in the configured secrets directory.

use crate::error::UploadResult;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Tokens as persisted in the secrets directory.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredCredentials {
    pub access_token: String,
    pub refresh_token: Option<String>,
    /// Absent means the token never expires (or the flow did not report it).
    pub expires_at: Option<DateTime<Utc>>,
}

impl StoredCredentials {
    pub fn is_expired(&self) -> bool {
        matches!(self.expires_at, Some(t) if t <= Utc::now())
    }
}

/// The interactive authorization capability, supplied by the application.
///
/// Implementations typically open a browser for consent (`authorize`) or call
/// the token endpoint (`refresh`); neither happens inside this crate.
pub trait AuthFlow {
    /// Run the full consent flow and return fresh credentials.
    fn authorize(&self) -> UploadResult<StoredCredentials>;

    /// Exchange the refresh token in `current` for fresh credentials.
    fn refresh(&self, current: &StoredCredentials) -> UploadResult<StoredCredentials>;
}

/// On-disk JSON store for [`StoredCredentials`].
#[derive(Debug, Clone)]
pub struct CredentialCache {
    path: PathBuf,
}

impl CredentialCache {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Conventional cache location inside a secrets directory.
    pub fn in_secrets_dir(secrets_dir: &Path) -> Self {
        Self::new(secrets_dir.join("drive_saved_creds.json"))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load cached credentials. A missing file is not an error, a corrupt
    /// one is.
    pub fn load(&self) -> UploadResult<Option<StoredCredentials>> {
        if !self.path.exists() {
            return Ok(None);
        }
        let json = fs::read_to_string(&self.path)?;
        let creds = serde_json::from_str(&json)?;
        Ok(Some(creds))
    }

    /// Persist credentials, creating the secrets directory if needed.
    pub fn store(&self, creds: &StoredCredentials) -> UploadResult<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(creds)?;
        fs::write(&self.path, json)?;
        Ok(())
    }
}

/// Ties the cache and the injected flow together.
pub struct Authenticator<F: AuthFlow> {
    cache: CredentialCache,
    flow: F,
}

impl<F: AuthFlow> Authenticator<F> {
    pub fn new(cache: CredentialCache, flow: F) -> Self {
        Self { cache, flow }
    }

    /// Return usable credentials, consulting the cache before the flow.
    ///
    /// Any credentials obtained from the flow are written back to the cache
    /// before being returned.
    pub fn credentials(&self) -> UploadResult<StoredCredentials> {
        match self.cache.load()? {
            Some(creds) if !creds.is_expired() => {
                tracing::debug!(path = %self.cache.path().display(), "using cached credentials");
                Ok(creds)
            }
            Some(creds) if creds.refresh_token.is_some() => {
                tracing::info!("cached credentials expired, refreshing");
                let fresh = self.flow.refresh(&creds)?;
                self.cache.store(&fresh)?;
                Ok(fresh)
            }
            _ => {
                tracing::info!("no usable cached credentials, running authorization flow");
                let fresh = self.flow.authorize()?;
                self.cache.store(&fresh)?;
                Ok(fresh)
            }
        }
    }
}
