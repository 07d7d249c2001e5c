use crate::error::EeError;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default OAuth 2.0 token endpoint for Google service accounts
pub const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";

/// OAuth scopes requested for Earth Engine access
pub const EARTH_ENGINE_SCOPES: &str =
    "https://www.googleapis.com/auth/earthengine https://www.googleapis.com/auth/cloud-platform";

/// The subset of a Google service-account key file used by the private-key flow.
#[derive(Clone, Serialize, Deserialize, PartialEq)]
pub struct ServiceAccountCredentials {
    pub client_email: String,
    pub private_key: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub private_key_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_uri: Option<String>,
}

impl ServiceAccountCredentials {
    /// Reads a service-account JSON key file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, EeError> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content).map_err(|e| {
            EeError::DeserializationError(format!("Invalid service account key file: {}", e))
        })
    }

    pub fn token_uri(&self) -> &str {
        self.token_uri.as_deref().unwrap_or(DEFAULT_TOKEN_URI)
    }
}

impl std::fmt::Debug for ServiceAccountCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceAccountCredentials")
            .field("client_email", &self.client_email)
            .field("private_key_id", &self.private_key_id)
            .field("token_uri", &self.token_uri)
            // Never print the key itself
            .finish_non_exhaustive()
    }
}

/// An access token installed on a client session
#[derive(Clone, PartialEq)]
pub struct AccessToken {
    pub scheme: String,
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

impl AccessToken {
    /// Creates a token expiring `expires_in_secs` seconds after `now`.
    /// Negative lifetimes produce a token that is already expired. Lifetimes
    /// beyond the representable range are clamped to the earliest or latest instant.
    pub fn new(scheme: &str, token: &str, expires_in_secs: f64, now: DateTime<Utc>) -> Self {
        // Float to int casts saturate, NaN becomes 0
        let millis = (expires_in_secs * 1000.0).round() as i64;
        let expires_at = Duration::try_milliseconds(millis)
            .and_then(|lifetime| now.checked_add_signed(lifetime))
            .unwrap_or(if millis < 0 {
                DateTime::<Utc>::MIN_UTC
            } else {
                DateTime::<Utc>::MAX_UTC
            });
        Self {
            scheme: scheme.to_string(),
            token: token.to_string(),
            expires_at,
        }
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }

    /// Value of the `Authorization` header for this token
    pub fn authorization(&self) -> String {
        format!("{} {}", self.scheme, self.token)
    }
}

impl std::fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccessToken")
            .field("scheme", &self.scheme)
            .field("expires_at", &self.expires_at)
            .finish_non_exhaustive()
    }
}
