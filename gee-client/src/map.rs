use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

/// Visualization parameters for a map request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VisParams {
    pub bands: Vec<String>,
    pub min: f64,
    pub max: f64,
    pub gamma: f64,
}

impl VisParams {
    /// Body of a `maps.create` request for the given expression
    pub fn to_map_request(&self, expression: Value) -> Value {
        json!({
            "expression": expression,
            "fileFormat": "AUTO_JPEG_PNG",
            "bandIds": self.bands,
            "visualizationOptions": {
                "ranges": [{ "min": self.min, "max": self.max }],
                "gamma": { "value": self.gamma },
            },
        })
    }
}

/// Reference to a map created by Earth Engine, usable to fetch tiles
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MapResult {
    pub map_id: String,
    /// Tile URL template with `{z}`, `{x}` and `{y}` placeholders
    pub url_format: String,
}

impl MapResult {
    pub fn new(api_url: &str, map_id: String) -> Self {
        let url_format = format!(
            "{}/v1/{}/tiles/{{z}}/{{x}}/{{y}}",
            api_url.trim_end_matches('/'),
            map_id
        );
        Self { map_id, url_format }
    }
}
