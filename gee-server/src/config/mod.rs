use crate::config::earth_engine::EarthEngineConfig;
use confique::Config;
use std::path::PathBuf;

pub mod earth_engine;

/// Optional configuration file, environment variables take precedence
const CONFIG_FILE: &str = "gee-server.toml";

/// Main configuration structure for the preview server
#[derive(Debug, Config, Clone)]
pub struct GeeConfig {
    /// The port the server will listen to (default: 5001)
    #[config(env = "GEE_PORT", default = 5001)]
    pub port: u16,

    /// Google service-account JSON key, used for callers without Google tokens
    #[config(env = "GEE_SERVICE_ACCOUNT_KEY_FILE")]
    pub service_account_key_file: Option<PathBuf>,

    /// Earth Engine API configuration
    #[config(nested)]
    pub earth_engine: EarthEngineConfig,
}

impl GeeConfig {
    /// Loads the configuration from environment variables and the optional config file
    pub fn new() -> Result<Self, confique::Error> {
        Self::builder().env().file(CONFIG_FILE).load()
    }

    #[cfg(test)]
    pub fn for_test_with_mock(earth_engine_mock: &wiremock::MockServer) -> Self {
        Self {
            port: 0, // Let the OS choose a port
            service_account_key_file: None,
            earth_engine: EarthEngineConfig {
                api_url: earth_engine_mock.uri(),
                project: "test-project".to_string(),
                query_timeout: 5,
                country_table: "test/countries".to_string(),
            },
        }
    }
}
