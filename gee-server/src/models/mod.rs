use chrono::NaiveDate;
use serde::de::{MapAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use utoipa::ToSchema;

/// Input of the preview job
#[derive(Debug, Serialize, Deserialize, ToSchema, Clone, PartialEq)]
pub struct PreviewRequest {
    pub recipe: Recipe,
}

#[derive(Debug, Serialize, Deserialize, ToSchema, Clone, PartialEq)]
pub struct Recipe {
    pub model: MosaicModel,
}

/// The mosaic recipe model as edited in the GUI
#[derive(Debug, Serialize, Deserialize, ToSchema, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MosaicModel {
    /// Area of interest
    pub aoi: Aoi,
    /// Data sets per source group, e.g. `{"LANDSAT": ["LANDSAT_8", "LANDSAT_TM"]}`
    #[schema(value_type = Object)]
    pub sources: Sources,
    pub composite_options: CompositeOptions,
    pub dates: Dates,
    pub scene_selection_options: SceneSelectionOptions,
    /// Selected scenes per scene area, used unless all scenes are selected
    #[serde(default)]
    #[schema(value_type = Object)]
    pub scenes: Scenes,
}

/// Area of interest, tagged by `type`
#[derive(Debug, Serialize, Deserialize, ToSchema, Clone, PartialEq)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Aoi {
    /// Polygon of `[longitude, latitude]` points
    Polygon {
        #[schema(value_type = Vec<Vec<f64>>)]
        path: Vec<[f64; 2]>,
    },
    /// A country, or an area within it
    #[serde(rename_all = "camelCase")]
    Country {
        country_code: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        area_code: Option<String>,
    },
    /// Features of an Earth Engine table
    #[serde(rename_all = "camelCase")]
    EeTable {
        id: String,
        key_column: String,
        #[schema(value_type = Object)]
        key: serde_json::Value,
    },
}

#[derive(Debug, Serialize, Deserialize, ToSchema, Clone, PartialEq, Default)]
pub struct CompositeOptions {
    /// Corrections to apply, e.g. `SR` or `BRDF`
    #[serde(default)]
    pub corrections: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Dates {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<String>, format = Date)]
    pub target_date: Option<NaiveDate>,
    #[schema(value_type = String, format = Date)]
    pub season_start: NaiveDate,
    #[schema(value_type = String, format = Date)]
    pub season_end: NaiveDate,
    #[serde(default)]
    pub years_before: u32,
    #[serde(default)]
    pub years_after: u32,
}

impl Dates {
    /// The acquisition date range `[start, end)` covering all seasons, or `None`
    /// when it falls outside the representable dates
    pub fn range(&self) -> Option<(NaiveDate, NaiveDate)> {
        let start = self
            .season_start
            .checked_sub_months(chrono::Months::new(self.years_before.checked_mul(12)?))?;
        let end = self
            .season_end
            .checked_add_months(chrono::Months::new(self.years_after.checked_mul(12)?))?;
        Some((start, end))
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema, Clone, PartialEq)]
pub struct SceneSelectionOptions {
    /// `ALL` selects every scene matching the filters, anything else the listed scenes
    #[serde(rename = "type")]
    pub selection_type: String,
}

impl SceneSelectionOptions {
    pub fn use_all_scenes(&self) -> bool {
        self.selection_type == "ALL"
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Scene {
    pub id: String,
    pub data_set: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<String>, format = Date)]
    pub date: Option<NaiveDate>,
}

/// Data-set identifiers per source group, in the order the groups were given
pub type Sources = OrderedGroups<String>;

/// Scenes per scene area, in the order the areas were given
pub type Scenes = OrderedGroups<Scene>;

/// A JSON object of lists that keeps the key order of the document
#[derive(Debug, Clone, PartialEq)]
pub struct OrderedGroups<T>(pub Vec<(String, Vec<T>)>);

impl<T> Default for OrderedGroups<T> {
    fn default() -> Self {
        Self(Vec::new())
    }
}

impl<T> OrderedGroups<T> {
    /// All values, group by group
    pub fn values(&self) -> impl Iterator<Item = &T> {
        self.0.iter().flat_map(|(_, values)| values.iter())
    }
}

impl<T: Serialize> Serialize for OrderedGroups<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(self.0.iter().map(|(key, values)| (key, values)))
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for OrderedGroups<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct GroupsVisitor<T>(std::marker::PhantomData<T>);

        impl<'de, T: Deserialize<'de>> Visitor<'de> for GroupsVisitor<T> {
            type Value = OrderedGroups<T>;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("an object of lists")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
                let mut groups = Vec::with_capacity(map.size_hint().unwrap_or_default());
                while let Some((key, values)) = map.next_entry::<String, Vec<T>>()? {
                    groups.push((key, values));
                }
                Ok(OrderedGroups(groups))
            }
        }

        deserializer.deserialize_map(GroupsVisitor(std::marker::PhantomData))
    }
}
