use gee_client::ServiceAccountCredentials;
use http::HeaderMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::sync::Arc;
use thiserror::Error;

/// Header carrying the JSON encoded identity of the calling user
pub const SEPAL_USER_HEADER: &str = "sepal-user";

/// Read-only view of an inbound request
#[derive(Debug, Clone, Default)]
pub struct RequestContext {
    headers: HeaderMap,
}

impl RequestContext {
    pub fn new(headers: HeaderMap) -> Self {
        Self { headers }
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }
}

/// Google OAuth tokens delegated by the user
#[derive(Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GoogleTokens {
    pub access_token: String,
    /// Expiry as milliseconds since the epoch
    pub access_token_expiry_date: i64,
}

impl std::fmt::Debug for GoogleTokens {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GoogleTokens")
            .field("access_token_expiry_date", &self.access_token_expiry_date)
            .finish_non_exhaustive()
    }
}

/// Identity of the calling user; an empty object when the caller is anonymous
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SepalUser {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub google_tokens: Option<GoogleTokens>,
    /// Every other field, kept verbatim
    #[serde(flatten)]
    pub attributes: Map<String, Value>,
}

impl SepalUser {
    pub fn username(&self) -> Option<&str> {
        self.attributes.get("username").and_then(Value::as_str)
    }
}

/// Credentials derived for a single request
#[derive(Debug, Clone)]
pub struct Credentials {
    pub sepal_user: SepalUser,
    pub service_account_credentials: Option<Arc<ServiceAccountCredentials>>,
}

/// How a request authenticates against Earth Engine
#[derive(Debug, Clone)]
pub enum AuthMethod {
    /// The user's own Google tokens
    UserDelegated(GoogleTokens),
    /// The service account configured for the process
    ServiceAccount(Option<Arc<ServiceAccountCredentials>>),
}

impl Credentials {
    pub fn auth_method(&self) -> AuthMethod {
        match &self.sepal_user.google_tokens {
            Some(tokens) => AuthMethod::UserDelegated(tokens.clone()),
            None => AuthMethod::ServiceAccount(self.service_account_credentials.clone()),
        }
    }
}

#[derive(Debug, Error)]
pub enum MalformedCredentialsError {
    #[error("'sepal-user' header is not valid UTF-8")]
    Encoding(#[from] http::header::ToStrError),
    #[error("'sepal-user' header is not a valid user object: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Resolves the credentials of a request.
///
/// A missing `sepal-user` header yields an anonymous user; a header that is
/// present but cannot be parsed is an error.
pub fn resolve(
    request: &RequestContext,
    service_account: Option<Arc<ServiceAccountCredentials>>,
) -> Result<Credentials, MalformedCredentialsError> {
    let sepal_user = match request.headers().get(SEPAL_USER_HEADER) {
        Some(value) => serde_json::from_str::<SepalUser>(value.to_str()?)?,
        None => SepalUser::default(),
    };
    Ok(Credentials {
        sepal_user,
        service_account_credentials: service_account,
    })
}
