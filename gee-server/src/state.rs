use crate::config::GeeConfig;
use crate::jobs::preview::{preview_job, PreviewWorker};
use crate::jobs::Job;
use gee_client::{EeError, EngineType, HttpEarthEngine, ServiceAccountCredentials};
use log::{info, warn};
use std::sync::Arc;
use std::time::Duration;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<GeeConfig>,
    pub engine: Arc<EngineType>,
    pub preview: Arc<Job<PreviewWorker>>,
}

impl AppState {
    /// Loads the service-account key and creates the Earth Engine client
    pub fn new(config: GeeConfig) -> Result<Self, EeError> {
        let service_account = match &config.service_account_key_file {
            Some(path) => {
                let credentials = ServiceAccountCredentials::from_file(path)?;
                info!("Loaded service account {}", credentials.client_email);
                Some(Arc::new(credentials))
            }
            None => {
                warn!("No service account configured, requests without Google tokens will fail");
                None
            }
        };

        let ee = &config.earth_engine;
        let engine = HttpEarthEngine::new(
            &ee.api_url,
            &ee.project,
            Duration::from_secs(ee.query_timeout),
        )?;

        Ok(Self::with_engine(config, EngineType::Http(engine), service_account))
    }

    pub fn with_engine(
        config: GeeConfig,
        engine: EngineType,
        service_account: Option<Arc<ServiceAccountCredentials>>,
    ) -> Self {
        let preview = preview_job(service_account, &config.earth_engine.country_table);
        info!(
            "Registered job '{}' ({}) running {:?} first",
            preview.name(),
            preview.path(),
            preview.pre_steps().collect::<Vec<_>>()
        );
        Self {
            config: Arc::new(config),
            engine: Arc::new(engine),
            preview: Arc::new(preview),
        }
    }
}
