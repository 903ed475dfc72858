//! Decoding of GeoJSON (`f=geojson`) area responses: one point feature per
//! grid point and step, variable values and `step` (seconds) in properties.

use crate::edr::error::ResponseError;
use crate::types::area::{AreaResult, AreaSample};
use crate::types::geo::LngLat;
use crate::types::variable::Variable;
use crate::units::RawValue;
use log::{info, warn};
use serde::Deserialize;
use serde_json::{Map, Value};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Deserialize)]
pub struct FeatureCollection {
    #[serde(default)]
    pub features: Vec<Feature>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Feature {
    #[serde(default)]
    pub geometry: Option<Value>,
    #[serde(default)]
    pub properties: Option<Map<String, Value>>,
}

fn decode_feature(
    index: usize,
    feature: &Feature,
    variables: &[Variable],
) -> Result<AreaSample, ResponseError> {
    let position = feature
        .geometry
        .as_ref()
        .filter(|g| g.get("type").and_then(Value::as_str) == Some("Point"))
        .and_then(|g| g.get("coordinates"))
        .and_then(|c| LngLat::from_position(c).ok())
        .ok_or(ResponseError::InvalidFeatureGeometry { index })?;

    let empty = Map::new();
    let properties = feature.properties.as_ref().unwrap_or(&empty);
    let step_seconds = properties
        .get("step")
        .and_then(Value::as_f64)
        .ok_or(ResponseError::MissingStep { index })?;

    let values = variables
        .iter()
        .map(|variable| {
            let raw = RawValue::new(properties.get(variable.code()).and_then(Value::as_f64));
            (variable.clone(), variable.conversion().apply(raw))
        })
        .collect::<BTreeMap<_, _>>();

    Ok(AreaSample {
        position,
        step_seconds,
        values,
    })
}

/// Converts every usable feature into an [`AreaSample`] in display units.
///
/// Features without a point geometry or a numeric step cannot be placed on the
/// map or in a step band; they are skipped with a warning. Missing variable
/// values become "not available".
pub fn decode_area(collection: &FeatureCollection, variables: &[Variable]) -> AreaResult {
    let mut samples = Vec::with_capacity(collection.features.len());
    for (index, feature) in collection.features.iter().enumerate() {
        match decode_feature(index, feature, variables) {
            Ok(sample) => samples.push(sample),
            Err(e) => warn!("Skipping area feature: {}", e),
        }
    }
    info!(
        "Decoded {} of {} area features",
        samples.len(),
        collection.features.len()
    );
    AreaResult::new(variables.to_vec(), samples)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::units::DisplayValue;
    use serde_json::json;

    fn collection() -> FeatureCollection {
        serde_json::from_value(json!({
            "type": "FeatureCollection",
            "features": [
                {
                    "type": "Feature",
                    "geometry": { "type": "Point", "coordinates": [237.6, 47.6] },
                    "properties": { "step": 3600, "t2m": 283.15, "prate": 0.0002778, "gust": 9.5 }
                },
                {
                    "type": "Feature",
                    "geometry": { "type": "Point", "coordinates": [237.7, 47.6] },
                    "properties": { "step": 3600.0, "t2m": null, "gust": 4.0 }
                },
                {
                    "type": "Feature",
                    "geometry": { "type": "Point", "coordinates": [237.7, 47.6] },
                    "properties": { "t2m": 280.0 }
                },
                {
                    "type": "Feature",
                    "geometry": null,
                    "properties": { "step": 7200 }
                }
            ]
        }))
        .unwrap()
    }

    fn all_vars() -> Vec<Variable> {
        vec![
            Variable::Temperature2m,
            Variable::PrecipitationRate,
            Variable::WindGust,
        ]
    }

    #[test]
    fn converts_each_value_once() {
        let result = decode_area(&collection(), &all_vars());
        let first = &result.samples()[0];

        assert_eq!(first.step_seconds, 3600.0);
        assert_eq!(first.position, LngLat { lng: 237.6, lat: 47.6 });
        assert!((first.value(&Variable::Temperature2m).value().unwrap() - 10.0).abs() < 1e-9);
        assert!((first.value(&Variable::PrecipitationRate).value().unwrap() - 1.0).abs() < 1e-3);
        assert_eq!(first.value(&Variable::WindGust), DisplayValue::Value(9.5));
    }

    #[test]
    fn missing_values_become_not_available() {
        let result = decode_area(&collection(), &all_vars());
        let second = &result.samples()[1];
        assert_eq!(second.value(&Variable::Temperature2m), DisplayValue::NotAvailable);
        assert_eq!(second.value(&Variable::PrecipitationRate), DisplayValue::NotAvailable);
        assert_eq!(second.value(&Variable::WindGust), DisplayValue::Value(4.0));
    }

    #[test]
    fn features_without_step_or_geometry_are_skipped() {
        let result = decode_area(&collection(), &all_vars());
        assert_eq!(result.len(), 2);
        assert_eq!(result.variables(), all_vars().as_slice());
    }

    #[test]
    fn decode_feature_reports_reason() {
        let collection = collection();
        assert_eq!(
            decode_feature(2, &collection.features[2], &all_vars()).unwrap_err(),
            ResponseError::MissingStep { index: 2 }
        );
        assert_eq!(
            decode_feature(3, &collection.features[3], &all_vars()).unwrap_err(),
            ResponseError::InvalidFeatureGeometry { index: 3 }
        );
    }

    #[test]
    fn empty_collection_is_empty_result() {
        let empty: FeatureCollection =
            serde_json::from_value(json!({"type": "FeatureCollection", "features": []})).unwrap();
        assert!(decode_area(&empty, &all_vars()).is_empty());
    }
}
