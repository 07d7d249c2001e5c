//! Earth Engine API configuration

use confique::Config;

/// Earth Engine API configuration
#[derive(Debug, Config, Clone)]
pub struct EarthEngineConfig {
    /// Base URL of the Earth Engine REST API
    /// (default: https://earthengine.googleapis.com)
    #[config(env = "GEE_API_URL", default = "https://earthengine.googleapis.com")]
    pub api_url: String,

    /// Cloud project the requests are billed to (default: earthengine-legacy)
    #[config(env = "GEE_PROJECT", default = "earthengine-legacy")]
    pub project: String,

    /// Timeout for Earth Engine requests in seconds (default: 60)
    #[config(env = "GEE_QUERY_TIMEOUT", default = 60)]
    pub query_timeout: u64,

    /// Table holding country and area boundaries, keyed by `id`
    #[config(env = "GEE_COUNTRY_TABLE", default = "users/wiell/SepalResources/gaul")]
    pub country_table: String,
}
