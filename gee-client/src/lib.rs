//! # gee-client
//!
//! A crate for talking to the Earth Engine API on behalf of a job.
//!
//! ## Components
//!
//! - **Engine:** The [`EarthEngine`] trait, the authentication and query surface consumed by jobs.
//! - **HTTP engine:** Implementation over the Earth Engine REST API.
//! - **Mock engine:** Call-recording implementation for tests and local development.
//! - **Expressions:** Typed images and collections, encoded into the Earth Engine expression graph.

pub mod credentials;
pub mod error;
pub mod expression;
pub mod http_engine;
pub mod map;
pub mod mock_engine;

use async_trait::async_trait;

pub use crate::credentials::{AccessToken, ServiceAccountCredentials};
pub use crate::error::EeError;
pub use crate::expression::{Collection, Filter, Geometry, Image};
pub use crate::http_engine::HttpEarthEngine;
pub use crate::map::{MapResult, VisParams};
pub use crate::mock_engine::{EngineCall, MockEarthEngine, MockStep};

/// Trait defining the Earth Engine operations a job depends on.
///
/// Authentication state lives inside the implementation: one of the two
/// authentication methods must succeed before [`EarthEngine::initialize`]
/// and [`EarthEngine::get_map`] are called.
#[async_trait]
pub trait EarthEngine: Send + Sync {
    /// Authenticates with a service-account private key
    async fn authenticate_via_private_key(
        &self,
        credentials: &ServiceAccountCredentials,
    ) -> Result<(), EeError>;

    /// Installs an access token obtained elsewhere, valid for `expires_in_secs` seconds
    async fn set_auth_token(
        &self,
        scheme: &str,
        token: &str,
        expires_in_secs: f64,
    ) -> Result<(), EeError>;

    /// Initializes the client library for the authenticated session
    async fn initialize(&self) -> Result<(), EeError>;

    /// Creates a map of the image with the given visualization
    async fn get_map(&self, image: &Image, vis_params: &VisParams) -> Result<MapResult, EeError>;

    /// Returns a handle sharing the transport but with its own, unauthenticated session
    fn fresh_session(&self) -> Self
    where
        Self: Sized;
}

#[derive(Clone, Debug)]
pub enum EngineType {
    /// Engine backed by the Earth Engine REST API
    Http(HttpEarthEngine),
    /// Engine recording calls without any network access
    Mock(MockEarthEngine),
}

#[async_trait]
impl EarthEngine for EngineType {
    async fn authenticate_via_private_key(
        &self,
        credentials: &ServiceAccountCredentials,
    ) -> Result<(), EeError> {
        match self {
            EngineType::Http(e) => e.authenticate_via_private_key(credentials).await,
            EngineType::Mock(e) => e.authenticate_via_private_key(credentials).await,
        }
    }

    async fn set_auth_token(
        &self,
        scheme: &str,
        token: &str,
        expires_in_secs: f64,
    ) -> Result<(), EeError> {
        match self {
            EngineType::Http(e) => e.set_auth_token(scheme, token, expires_in_secs).await,
            EngineType::Mock(e) => e.set_auth_token(scheme, token, expires_in_secs).await,
        }
    }

    async fn initialize(&self) -> Result<(), EeError> {
        match self {
            EngineType::Http(e) => e.initialize().await,
            EngineType::Mock(e) => e.initialize().await,
        }
    }

    async fn get_map(&self, image: &Image, vis_params: &VisParams) -> Result<MapResult, EeError> {
        match self {
            EngineType::Http(e) => e.get_map(image, vis_params).await,
            EngineType::Mock(e) => e.get_map(image, vis_params).await,
        }
    }

    fn fresh_session(&self) -> Self {
        match self {
            EngineType::Http(e) => EngineType::Http(e.fresh_session()),
            EngineType::Mock(e) => EngineType::Mock(e.fresh_session()),
        }
    }
}
