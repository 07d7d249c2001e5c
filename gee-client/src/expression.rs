//! Typed image and collection expressions, and their encoding into the Earth Engine
//! expression graph (`{"result": id, "values": {id: ValueNode}}`).

use chrono::NaiveDate;
use serde::Serialize;
use serde_json::{Map, Value, json};

#[derive(Debug, Clone, PartialEq)]
pub enum Geometry {
    /// Polygon given as rings of `[longitude, latitude]` pairs
    Polygon { coordinates: Vec<Vec<[f64; 2]>> },
    /// Geometry of the features in a table whose `key_column` equals `key`
    TableFeature {
        table_id: String,
        key_column: String,
        key: Value,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    /// Images intersecting the geometry
    Bounds(Geometry),
    /// Images acquired within `[start, end)`
    DateRange { start: NaiveDate, end: NaiveDate },
    /// Images whose `field` is one of `values`
    InList { field: String, values: Vec<String> },
    And(Vec<Filter>),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Collection {
    Load(String),
    Filter {
        collection: Box<Collection>,
        filter: Filter,
    },
    /// Selects `bands` from every image, renaming them to `names`, optionally multiplying by `scale`
    Select {
        collection: Box<Collection>,
        bands: Vec<String>,
        names: Vec<String>,
        scale: Option<f64>,
    },
    Merge(Vec<Collection>),
}

impl Collection {
    pub fn load(id: impl Into<String>) -> Self {
        Collection::Load(id.into())
    }

    pub fn filter(self, filter: Filter) -> Self {
        Collection::Filter {
            collection: Box::new(self),
            filter,
        }
    }

    pub fn select<S: ToString>(self, bands: &[S], names: &[S], scale: Option<f64>) -> Self {
        Collection::Select {
            collection: Box::new(self),
            bands: bands.iter().map(ToString::to_string).collect(),
            names: names.iter().map(ToString::to_string).collect(),
            scale,
        }
    }

    /// Merges collections, collapsing a single collection to itself
    pub fn merge(mut collections: Vec<Collection>) -> Self {
        if collections.len() == 1 {
            collections.remove(0)
        } else {
            Collection::Merge(collections)
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Image {
    /// Per-pixel median of a collection
    Median(Collection),
    Clip { image: Box<Image>, geometry: Geometry },
}

impl Image {
    pub fn median(collection: Collection) -> Self {
        Image::Median(collection)
    }

    pub fn clip(self, geometry: Geometry) -> Self {
        Image::Clip {
            image: Box::new(self),
            geometry,
        }
    }

    /// Encodes the image as an Earth Engine expression graph
    pub fn to_expression(&self) -> Value {
        let mut encoder = Encoder::default();
        let root = encoder.image(self);
        let result = encoder.define(root);
        json!({
            "result": result,
            "values": Value::Object(encoder.values),
        })
    }
}

#[derive(Default)]
struct Encoder {
    values: Map<String, Value>,
    next_id: usize,
    next_var: usize,
}

impl Encoder {
    /// Registers a named value and returns its id
    fn define(&mut self, value: Value) -> String {
        let id = self.next_id.to_string();
        self.next_id += 1;
        self.values.insert(id.clone(), value);
        id
    }

    fn image(&mut self, image: &Image) -> Value {
        match image {
            Image::Median(collection) => invoke(
                "reduce.median",
                json!({ "collection": self.collection(collection) }),
            ),
            Image::Clip { image, geometry } => invoke(
                "Image.clip",
                json!({
                    "input": self.image(image),
                    "geometry": self.geometry(geometry),
                }),
            ),
        }
    }

    fn collection(&mut self, collection: &Collection) -> Value {
        match collection {
            Collection::Load(id) => invoke("ImageCollection.load", json!({ "id": constant(id) })),
            Collection::Filter { collection, filter } => invoke(
                "Collection.filter",
                json!({
                    "collection": self.collection(collection),
                    "filter": self.filter(filter),
                }),
            ),
            Collection::Select {
                collection,
                bands,
                names,
                scale,
            } => {
                let input = self.collection(collection);
                let var = format!("_MAPPING_VAR_{}_0", self.next_var);
                self.next_var += 1;

                let mut body = invoke(
                    "Image.select",
                    json!({
                        "input": { "argumentReference": var },
                        "bandSelectors": constant(bands),
                        "newNames": constant(names),
                    }),
                );
                if let Some(scale) = scale {
                    body = invoke(
                        "Image.multiply",
                        json!({
                            "image1": body,
                            "image2": invoke("Image.constant", json!({ "value": constant(scale) })),
                        }),
                    );
                }
                let body = self.define(body);

                invoke(
                    "Collection.map",
                    json!({
                        "collection": input,
                        "baseAlgorithm": {
                            "functionDefinitionValue": {
                                "argumentNames": [var],
                                "body": body,
                            }
                        },
                    }),
                )
            }
            Collection::Merge(collections) => {
                let mut encoded = collections.iter().map(|c| self.collection(c));
                match encoded.next() {
                    Some(first) => encoded.fold(first, |merged, next| {
                        invoke(
                            "ImageCollection.merge",
                            json!({ "collection1": merged, "collection2": next }),
                        )
                    }),
                    None => invoke(
                        "ImageCollection.fromImages",
                        json!({ "images": { "arrayValue": { "values": [] } } }),
                    ),
                }
            }
        }
    }

    fn filter(&mut self, filter: &Filter) -> Value {
        match filter {
            Filter::Bounds(geometry) => invoke(
                "Filter.intersects",
                json!({
                    "leftField": constant(".all"),
                    "rightValue": self.geometry(geometry),
                }),
            ),
            Filter::DateRange { start, end } => invoke(
                "Filter.dateRangeContains",
                json!({
                    "leftValue": invoke("DateRange", json!({
                        "start": date(start),
                        "end": date(end),
                    })),
                    "rightField": constant("system:time_start"),
                }),
            ),
            Filter::InList { field, values } => invoke(
                "Filter.listContains",
                json!({
                    "leftValue": constant(values),
                    "rightField": constant(field),
                }),
            ),
            Filter::And(filters) => {
                let values: Vec<Value> = filters.iter().map(|f| self.filter(f)).collect();
                invoke(
                    "Filter.and",
                    json!({ "filters": { "arrayValue": { "values": values } } }),
                )
            }
        }
    }

    fn geometry(&mut self, geometry: &Geometry) -> Value {
        match geometry {
            Geometry::Polygon { coordinates } => invoke(
                "GeometryConstructors.Polygon",
                json!({
                    "coordinates": constant(coordinates),
                    "evenOdd": constant(&true),
                }),
            ),
            Geometry::TableFeature {
                table_id,
                key_column,
                key,
            } => {
                let table = invoke(
                    "Collection.loadTable",
                    json!({ "tableId": constant(table_id) }),
                );
                let filtered = invoke(
                    "Collection.filter",
                    json!({
                        "collection": table,
                        "filter": invoke("Filter.equals", json!({
                            "leftField": constant(key_column),
                            "rightValue": constant(key),
                        })),
                    }),
                );
                invoke("Collection.geometry", json!({ "collection": filtered }))
            }
        }
    }
}

fn invoke(function_name: &str, arguments: Value) -> Value {
    json!({
        "functionInvocationValue": {
            "functionName": function_name,
            "arguments": arguments,
        }
    })
}

fn constant<T: Serialize + ?Sized>(value: &T) -> Value {
    json!({ "constantValue": value })
}

fn date(value: &NaiveDate) -> Value {
    invoke(
        "Date",
        json!({ "value": constant(&value.format("%Y-%m-%d").to_string()) }),
    )
}
