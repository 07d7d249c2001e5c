use crate::credentials::{AccessToken, EARTH_ENGINE_SCOPES, ServiceAccountCredentials};
use crate::error::EeError;
use crate::expression::Image;
use crate::map::{MapResult, VisParams};
use crate::EarthEngine;

use async_trait::async_trait;
use chrono::Utc;
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use log::{debug, info};
use reqwest::header::AUTHORIZATION;
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use url::Url;

/// Lifetime requested for service-account assertions
const ASSERTION_LIFETIME_SECS: i64 = 3600;

const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";

/// `HttpEarthEngine` talks to the Earth Engine REST API.
/// Clones share both the HTTP client and the session; use
/// [`EarthEngine::fresh_session`] for an independent session.
#[derive(Clone)]
pub struct HttpEarthEngine {
    client: Client,
    api_url: String,
    project: String,
    session: Arc<RwLock<Option<AccessToken>>>,
}

impl std::fmt::Debug for HttpEarthEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpEarthEngine")
            .field("api_url", &self.api_url)
            .field("project", &self.project)
            // Skip client and session, the session holds a secret
            .finish_non_exhaustive()
    }
}

#[derive(Serialize)]
struct AssertionClaims<'a> {
    iss: &'a str,
    scope: &'a str,
    aud: &'a str,
    iat: i64,
    exp: i64,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: i64,
    #[serde(default)]
    token_type: Option<String>,
}

#[derive(Deserialize)]
struct MapResponse {
    name: String,
}

impl HttpEarthEngine {
    pub fn new(api_url: &str, project: &str, timeout: Duration) -> Result<Self, EeError> {
        // Validate early so requests never fail on a malformed base URL
        Url::parse(api_url)?;

        let client = Client::builder()
            .timeout(timeout)
            .connect_timeout(Duration::from_secs(5))
            .pool_max_idle_per_host(10)
            .build()?;

        Ok(Self {
            client,
            api_url: api_url.trim_end_matches('/').to_string(),
            project: project.to_string(),
            session: Arc::new(RwLock::new(None)),
        })
    }

    fn project_url(&self, resource: &str) -> String {
        format!("{}/v1/projects/{}/{}", self.api_url, self.project, resource)
    }

    /// Returns the installed token, failing if none was installed
    async fn access_token(&self) -> Result<AccessToken, EeError> {
        let session = self.session.read().await;
        let token = session.clone().ok_or(EeError::NotAuthenticated)?;
        if token.is_expired(Utc::now()) {
            // The server decides whether to accept it
            debug!("Using an access token that expired at {}", token.expires_at);
        }
        Ok(token)
    }

    async fn install_token(&self, token: AccessToken) {
        *self.session.write().await = Some(token);
    }

    fn sign_assertion(&self, credentials: &ServiceAccountCredentials) -> Result<String, EeError> {
        let now = Utc::now().timestamp();
        let claims = AssertionClaims {
            iss: &credentials.client_email,
            scope: EARTH_ENGINE_SCOPES,
            aud: credentials.token_uri(),
            iat: now,
            exp: now + ASSERTION_LIFETIME_SECS,
        };
        let mut header = Header::new(Algorithm::RS256);
        header.kid = credentials.private_key_id.clone();
        let key = EncodingKey::from_rsa_pem(credentials.private_key.as_bytes())?;
        Ok(jsonwebtoken::encode(&header, &claims, &key)?)
    }

    /// Send a request and parse the response
    async fn send<R>(&self, request: RequestBuilder) -> Result<R, EeError>
    where
        R: DeserializeOwned,
    {
        let response = request
            .send()
            .await
            .map_err(|e| EeError::RequestFailed(format!("Failed to send request: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(EeError::ResponseError(status.as_u16(), body));
        }

        response.json::<R>().await.map_err(|e| {
            EeError::DeserializationError(format!("Failed to deserialize response: {}", e))
        })
    }
}

#[async_trait]
impl EarthEngine for HttpEarthEngine {
    async fn authenticate_via_private_key(
        &self,
        credentials: &ServiceAccountCredentials,
    ) -> Result<(), EeError> {
        let assertion = self.sign_assertion(credentials)?;
        debug!(
            "Exchanging service account assertion for {} at {}",
            credentials.client_email,
            credentials.token_uri()
        );

        let request = self
            .client
            .post(credentials.token_uri())
            .form(&[("grant_type", JWT_BEARER_GRANT), ("assertion", assertion.as_str())]);
        let response: TokenResponse = self.send(request).await?;

        let scheme = response.token_type.unwrap_or_else(|| "Bearer".to_string());
        let token = AccessToken::new(
            &scheme,
            &response.access_token,
            response.expires_in as f64,
            Utc::now(),
        );
        self.install_token(token).await;
        info!("Authenticated service account {}", credentials.client_email);
        Ok(())
    }

    async fn set_auth_token(
        &self,
        scheme: &str,
        token: &str,
        expires_in_secs: f64,
    ) -> Result<(), EeError> {
        if token.is_empty() {
            return Err(EeError::Other("Access token is empty".to_string()));
        }
        self.install_token(AccessToken::new(scheme, token, expires_in_secs, Utc::now()))
            .await;
        debug!("Installed {} token expiring in {}s", scheme, expires_in_secs);
        Ok(())
    }

    async fn initialize(&self) -> Result<(), EeError> {
        let token = self.access_token().await?;
        let request = self
            .client
            .get(self.project_url("algorithms"))
            .header(AUTHORIZATION, token.authorization());

        let algorithms: serde_json::Value = self.send(request).await?;
        debug!(
            "Initialized with {} algorithms",
            algorithms["algorithms"]
                .as_array()
                .map(Vec::len)
                .unwrap_or_default()
        );
        Ok(())
    }

    async fn get_map(&self, image: &Image, vis_params: &VisParams) -> Result<MapResult, EeError> {
        let token = self.access_token().await?;
        let body = vis_params.to_map_request(image.to_expression());
        let request = self
            .client
            .post(self.project_url("maps"))
            .header(AUTHORIZATION, token.authorization())
            .json(&body);

        let response: MapResponse = self.send(request).await?;
        debug!("Created map {}", response.name);
        Ok(MapResult::new(&self.api_url, response.name))
    }

    fn fresh_session(&self) -> Self {
        Self {
            client: self.client.clone(),
            api_url: self.api_url.clone(),
            project: self.project.clone(),
            session: Arc::new(RwLock::new(None)),
        }
    }
}
