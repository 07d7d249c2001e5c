use crate::credentials::{resolve, AuthMethod, Credentials, GoogleTokens, RequestContext};
use crate::jobs::{JobError, PreStep};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use gee_client::{EarthEngine, EeError, ServiceAccountCredentials};
use log::{debug, info};
use std::sync::Arc;
use thiserror::Error;

/// Errors of the two authentication steps
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Earth Engine authentication failed: {0}")]
    Authentication(#[source] EeError),
    #[error("Earth Engine initialization failed: {0}")]
    Initialization(#[source] EeError),
}

/// Seconds until a token expiring at `expiry_date_millis` expires; negative once expired
pub fn seconds_to_expiration(expiry_date_millis: i64, now: DateTime<Utc>) -> f64 {
    (expiry_date_millis as f64 - now.timestamp_millis() as f64) / 1000.0
}

/// Authenticates the engine session and initializes it
pub async fn authenticate(
    engine: &dyn EarthEngine,
    credentials: &Credentials,
) -> Result<(), AuthError> {
    authenticate_at(engine, credentials, Utc::now()).await
}

/// Same as [`authenticate`], computing token lifetimes relative to `now`.
///
/// Initialization only starts once authentication succeeded.
pub async fn authenticate_at(
    engine: &dyn EarthEngine,
    credentials: &Credentials,
    now: DateTime<Utc>,
) -> Result<(), AuthError> {
    info!("Running EE authentication");
    let authenticated = match credentials.auth_method() {
        AuthMethod::UserDelegated(tokens) => authenticate_user_account(engine, &tokens, now).await,
        AuthMethod::ServiceAccount(service_account) => {
            authenticate_service_account(engine, service_account.as_deref()).await
        }
    };
    authenticated.map_err(AuthError::Authentication)?;

    debug!("Initializing library");
    engine.initialize().await.map_err(AuthError::Initialization)
}

async fn authenticate_user_account(
    engine: &dyn EarthEngine,
    tokens: &GoogleTokens,
    now: DateTime<Utc>,
) -> Result<(), EeError> {
    debug!("Authenticating user account");
    let seconds = seconds_to_expiration(tokens.access_token_expiry_date, now);
    engine
        .set_auth_token("Bearer", &tokens.access_token, seconds)
        .await
}

async fn authenticate_service_account(
    engine: &dyn EarthEngine,
    credentials: Option<&ServiceAccountCredentials>,
) -> Result<(), EeError> {
    debug!("Authenticating service account");
    let credentials = credentials.ok_or_else(|| {
        EeError::Other("No service account credentials configured".to_string())
    })?;
    engine.authenticate_via_private_key(credentials).await
}

/// Pre-step authenticating the job's Earth Engine session with the caller's credentials
pub struct EeAuth {
    service_account: Option<Arc<ServiceAccountCredentials>>,
}

impl EeAuth {
    pub fn new(service_account: Option<Arc<ServiceAccountCredentials>>) -> Self {
        Self { service_account }
    }
}

#[async_trait]
impl PreStep for EeAuth {
    fn name(&self) -> &'static str {
        "EE authentication"
    }

    async fn run(&self, request: &RequestContext, engine: &dyn EarthEngine) -> Result<(), JobError> {
        let credentials = resolve(request, self.service_account.clone())?;
        debug!(
            "Resolved credentials of {}",
            credentials.sepal_user.username().unwrap_or("anonymous user")
        );
        authenticate(engine, &credentials).await?;
        Ok(())
    }
}
