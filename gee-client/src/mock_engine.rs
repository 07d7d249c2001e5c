use crate::EarthEngine;
use crate::credentials::ServiceAccountCredentials;
use crate::error::EeError;
use crate::expression::Image;
use crate::map::{MapResult, VisParams};

use async_trait::async_trait;
use log::debug;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

const MOCK_API_URL: &str = "https://earthengine.mock";

/// A call received by [`MockEarthEngine`]
#[derive(Debug, Clone, PartialEq)]
pub enum EngineCall {
    AuthenticateViaPrivateKey {
        client_email: String,
    },
    SetAuthToken {
        scheme: String,
        token: String,
        expires_in_secs: f64,
    },
    Initialize,
    GetMap {
        image: Image,
        vis_params: VisParams,
    },
}

/// Operations of the mock that can be made to fail
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MockStep {
    AuthenticateViaPrivateKey,
    SetAuthToken,
    Initialize,
    GetMap,
}

/// An in-memory EarthEngine that records every call in order.
/// Sessions created with `fresh_session` share the call log and configured failures.
#[derive(Clone, Debug, Default)]
pub struct MockEarthEngine {
    calls: Arc<Mutex<Vec<EngineCall>>>,
    failures: Arc<Mutex<HashMap<MockStep, String>>>,
}

impl MockEarthEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every later invocation of `step` fail with `message`
    pub fn fail_on(&self, step: MockStep, message: &str) {
        lock(&self.failures).insert(step, message.to_string());
    }

    /// Returns the calls received so far
    pub fn calls(&self) -> Vec<EngineCall> {
        lock(&self.calls).clone()
    }

    fn record(&self, step: MockStep, call: EngineCall) -> Result<(), EeError> {
        debug!("Mock engine received {:?}", step);
        lock(&self.calls).push(call);
        match lock(&self.failures).get(&step) {
            Some(message) => Err(EeError::Other(message.clone())),
            None => Ok(()),
        }
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    // A panicking test must not hide the calls it recorded
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[async_trait]
impl EarthEngine for MockEarthEngine {
    async fn authenticate_via_private_key(
        &self,
        credentials: &ServiceAccountCredentials,
    ) -> Result<(), EeError> {
        self.record(
            MockStep::AuthenticateViaPrivateKey,
            EngineCall::AuthenticateViaPrivateKey {
                client_email: credentials.client_email.clone(),
            },
        )
    }

    async fn set_auth_token(
        &self,
        scheme: &str,
        token: &str,
        expires_in_secs: f64,
    ) -> Result<(), EeError> {
        self.record(
            MockStep::SetAuthToken,
            EngineCall::SetAuthToken {
                scheme: scheme.to_string(),
                token: token.to_string(),
                expires_in_secs,
            },
        )
    }

    async fn initialize(&self) -> Result<(), EeError> {
        self.record(MockStep::Initialize, EngineCall::Initialize)
    }

    async fn get_map(&self, image: &Image, vis_params: &VisParams) -> Result<MapResult, EeError> {
        self.record(
            MockStep::GetMap,
            EngineCall::GetMap {
                image: image.clone(),
                vis_params: vis_params.clone(),
            },
        )?;
        let map_id = format!("projects/mock/maps/{}", lock(&self.calls).len());
        Ok(MapResult::new(MOCK_API_URL, map_id))
    }

    fn fresh_session(&self) -> Self {
        self.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_records_calls_in_order() {
        let engine = MockEarthEngine::new();
        engine.set_auth_token("Bearer", "token", 10.0).await.unwrap();
        engine.initialize().await.unwrap();

        assert_eq!(
            engine.calls(),
            vec![
                EngineCall::SetAuthToken {
                    scheme: "Bearer".to_string(),
                    token: "token".to_string(),
                    expires_in_secs: 10.0,
                },
                EngineCall::Initialize,
            ]
        );
    }

    #[tokio::test]
    async fn test_configured_failure() {
        let engine = MockEarthEngine::new();
        engine.fail_on(MockStep::Initialize, "not ready");

        let err = engine.initialize().await.unwrap_err();
        assert_eq!(err.to_string(), "not ready");
        assert_eq!(engine.calls(), vec![EngineCall::Initialize]);
    }

    #[tokio::test]
    async fn test_fresh_session_shares_call_log() {
        let engine = MockEarthEngine::new();
        engine.fresh_session().initialize().await.unwrap();
        assert_eq!(engine.calls().len(), 1);
    }
}
