//! Route identifier and label extraction from GeoJSON feature properties
//!
//! Transit datasets disagree on field names: GTFS-derived exports use `route_id` /
//! `route_short_name` / `route_long_name`, while the legacy STM shapefile export uses
//! `NO_LIG` / `NOM_LIG`. Each extractor walks a fixed priority list and keeps the first
//! populated value.

use serde_json::Value;

/// GeoJSON property object
pub type JsonObject = serde_json::Map<String, Value>;

/// Accessor for one optional text field of [`RouteProperties`]
type FieldAccessor = fn(&RouteProperties) -> Option<&str>;

/// Route id fields, highest priority first
const ID_FIELDS: [FieldAccessor; 3] = [
    |p| p.route_id.as_deref(),
    |p| p.route_short_name.as_deref(),
    |p| p.no_lig.as_deref(),
];

/// Route label fields, highest priority first
const LABEL_FIELDS: [FieldAccessor; 3] = [
    |p| p.route_long_name.as_deref(),
    |p| p.route_name.as_deref(),
    |p| p.nom_lig.as_deref(),
];

/// The route-related subset of a feature's properties
///
/// Every field is optional. A field holds a value only when the source property was a
/// non-empty string or a non-zero number.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RouteProperties {
    pub route_id: Option<String>,
    pub route_short_name: Option<String>,
    /// Legacy route number (`NO_LIG`)
    pub no_lig: Option<String>,
    pub route_long_name: Option<String>,
    pub route_name: Option<String>,
    /// Legacy route name (`NOM_LIG`)
    pub nom_lig: Option<String>,
}

impl RouteProperties {
    /// Pick the known fields out of a property object
    pub fn from_json(properties: &JsonObject) -> Self {
        let field = |key: &str| properties.get(key).and_then(scalar_text);
        Self {
            route_id: field("route_id"),
            route_short_name: field("route_short_name"),
            no_lig: field("NO_LIG"),
            route_long_name: field("route_long_name"),
            route_name: field("route_name"),
            nom_lig: field("NOM_LIG"),
        }
    }

    /// Properties of a feature, treating a missing property object as empty
    pub fn from_feature(feature: &geojson::Feature) -> Self {
        feature
            .properties
            .as_ref()
            .map(Self::from_json)
            .unwrap_or_default()
    }

    /// Route identifier, or `""` when no id field is populated
    pub fn route_id(&self) -> &str {
        first_populated(self, &ID_FIELDS)
    }

    /// Human-readable route name, or `""` when no label field is populated
    pub fn route_label(&self) -> &str {
        first_populated(self, &LABEL_FIELDS)
    }
}

fn first_populated<'a>(properties: &'a RouteProperties, fields: &[FieldAccessor]) -> &'a str {
    fields
        .iter()
        .find_map(|field| field(properties).filter(|value| !value.is_empty()))
        .unwrap_or("")
}

/// Text of a scalar property; empty strings, zero, null and non-scalars count as absent
fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) if n.as_f64() != Some(0.0) => Some(number_text(n)),
        _ => None,
    }
}

/// Largest magnitude below which every integral `f64` is exact
const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_991.0;

/// Integral values print without a fraction whatever their encoding, so `51` and `51.0`
/// name the same route
fn number_text(n: &serde_json::Number) -> String {
    match n.as_f64() {
        Some(f) if n.is_f64() && f.fract() == 0.0 && f.abs() <= MAX_SAFE_INTEGER => {
            format!("{}", f as i64)
        }
        _ => n.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn props(value: Value) -> RouteProperties {
        match value {
            Value::Object(map) => RouteProperties::from_json(&map),
            _ => panic!("test properties must be an object"),
        }
    }

    #[test]
    fn test_canonical_id_wins() {
        let p = props(json!({"route_id": "10", "route_short_name": "10A", "NO_LIG": "99"}));
        assert_eq!(p.route_id(), "10");
    }

    #[test]
    fn test_id_priority_over_all_field_combinations() {
        let fields = [("route_id", "10"), ("route_short_name", "24"), ("NO_LIG", "51")];

        for mask in 0u8..8 {
            let mut map = JsonObject::new();
            for (bit, (key, value)) in fields.iter().enumerate() {
                if mask & (1 << bit) != 0 {
                    map.insert(key.to_string(), json!(value));
                }
            }
            map.insert("route_long_name".to_string(), json!("Crémazie"));

            let expected = fields
                .iter()
                .enumerate()
                .find(|(bit, _)| mask & (1 << bit) != 0)
                .map(|(_, (_, value))| *value)
                .unwrap_or("");
            assert_eq!(
                RouteProperties::from_json(&map).route_id(),
                expected,
                "fields present: {mask:03b}"
            );
        }
    }

    #[test]
    fn test_empty_fields_fall_through() {
        let p = props(json!({"route_id": "", "NO_LIG": "99"}));
        assert_eq!(p.route_id(), "99");

        let p = props(json!({"route_id": null, "route_short_name": "", "NO_LIG": "7"}));
        assert_eq!(p.route_id(), "7");
    }

    #[test]
    fn test_no_id_fields_yields_empty() {
        assert_eq!(props(json!({})).route_id(), "");
        assert_eq!(props(json!({"route_long_name": "Crémazie"})).route_id(), "");
        assert_eq!(RouteProperties::default().route_label(), "");
    }

    #[test]
    fn test_legacy_fields() {
        let p = props(json!({"NO_LIG": "51", "NOM_LIG": "Edouard-Montpetit"}));
        assert_eq!(p.route_id(), "51");
        assert_eq!(p.route_label(), "Edouard-Montpetit");
    }

    #[test]
    fn test_label_priority() {
        let p = props(json!({"route_long_name": "Crémazie", "route_name": "X", "NOM_LIG": "Y"}));
        assert_eq!(p.route_label(), "Crémazie");

        let p = props(json!({"route_name": "Sherbrooke", "NOM_LIG": "Y"}));
        assert_eq!(p.route_label(), "Sherbrooke");
    }

    #[test]
    fn test_numeric_values() {
        let p = props(json!({"NO_LIG": 51}));
        assert_eq!(p.route_id(), "51");

        let p = props(json!({"route_id": 0, "NO_LIG": 80}));
        assert_eq!(p.route_id(), "80");

        let p = props(json!({"route_id": true, "route_short_name": ["1"]}));
        assert_eq!(p.route_id(), "");
    }

    #[test]
    fn test_integral_floats_match_integers() {
        assert_eq!(props(json!({"NO_LIG": 51.0})).route_id(), "51");
        assert_eq!(props(json!({"NO_LIG": -3.0})).route_id(), "-3");
        assert_eq!(props(json!({"NO_LIG": 0.0, "route_short_name": 7})).route_id(), "7");
        assert_eq!(props(json!({"NO_LIG": 51.5})).route_id(), "51.5");
    }

    #[test]
    fn test_feature_without_properties() {
        let feature = geojson::Feature {
            bbox: None,
            geometry: None,
            id: None,
            properties: None,
            foreign_members: None,
        };
        assert_eq!(RouteProperties::from_feature(&feature), RouteProperties::default());
    }
}
