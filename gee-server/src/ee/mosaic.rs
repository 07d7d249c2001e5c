use gee_client::{Collection, Geometry, Image};

/// Median composite of the collection, clipped to the region
pub fn to_mosaic(region: &Geometry, collection: Collection) -> Image {
    Image::median(collection).clip(region.clone())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mosaic_is_clipped_median() {
        let region = Geometry::Polygon {
            coordinates: vec![vec![[0.0, 0.0], [1.0, 0.0], [1.0, 1.0]]],
        };
        let collection = Collection::load("COPERNICUS/S2");

        assert_eq!(
            to_mosaic(&region, collection.clone()),
            Image::Clip {
                image: Box::new(Image::Median(collection)),
                geometry: region,
            }
        );
    }
}
