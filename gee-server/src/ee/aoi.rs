use crate::ee::QueryError;
use crate::models::Aoi;
use gee_client::Geometry;
use serde_json::Value;

/// Column of the country table holding country and area codes
const COUNTRY_KEY_COLUMN: &str = "id";

/// Geometry of an area of interest.
///
/// Countries resolve to their feature in `country_table`, or to the feature of
/// the area within the country when an area code is given.
pub fn to_geometry(aoi: &Aoi, country_table: &str) -> Result<Geometry, QueryError> {
    match aoi {
        Aoi::Polygon { path } => {
            if path.len() < 3 {
                return Err(QueryError::InvalidRequest(format!(
                    "Polygon needs at least 3 points, got {}",
                    path.len()
                )));
            }
            Ok(Geometry::Polygon {
                coordinates: vec![path.clone()],
            })
        }
        Aoi::Country {
            country_code,
            area_code,
        } => {
            let key = area_code.as_deref().unwrap_or(country_code);
            Ok(Geometry::TableFeature {
                table_id: country_table.to_string(),
                key_column: COUNTRY_KEY_COLUMN.to_string(),
                key: Value::String(key.to_string()),
            })
        }
        Aoi::EeTable {
            id,
            key_column,
            key,
        } => Ok(Geometry::TableFeature {
            table_id: id.clone(),
            key_column: key_column.clone(),
            key: key.clone(),
        }),
    }
}
