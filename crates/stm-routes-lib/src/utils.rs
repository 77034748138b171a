//! Geometry helpers for turning GeoJSON features into drawable lines

use geo::{BoundingRect, Coord, LineString, Rect};

/// Flatten a feature's geometry into polylines (lon/lat coordinates).
///
/// Points become single-coordinate lines, polygon rings become closed lines and
/// geometry collections are flattened recursively. Features without geometry yield
/// nothing.
pub fn feature_lines(feature: &geojson::Feature) -> Vec<LineString<f64>> {
    let mut lines = Vec::new();
    if let Some(geometry) = &feature.geometry {
        collect_lines(&geometry.value, &mut lines);
    }
    lines
}

fn collect_lines(value: &geojson::Value, lines: &mut Vec<LineString<f64>>) {
    use geojson::Value;

    match value {
        Value::Point(position) => lines.extend(to_line(std::slice::from_ref(position))),
        Value::MultiPoint(positions) => lines.extend(
            positions
                .iter()
                .filter_map(|p| to_line(std::slice::from_ref(p))),
        ),
        Value::LineString(positions) => lines.extend(to_line(positions)),
        Value::MultiLineString(parts) | Value::Polygon(parts) => {
            lines.extend(parts.iter().filter_map(|p| to_line(p)));
        }
        Value::MultiPolygon(polygons) => lines.extend(
            polygons
                .iter()
                .flat_map(|rings| rings.iter().filter_map(|r| to_line(r))),
        ),
        Value::GeometryCollection(geometries) => {
            for geometry in geometries {
                collect_lines(&geometry.value, lines);
            }
        }
    }
}

/// Convert GeoJSON positions to a line, dropping malformed positions
fn to_line(positions: &[Vec<f64>]) -> Option<LineString<f64>> {
    let coords: Vec<Coord<f64>> = positions
        .iter()
        .filter(|p| p.len() >= 2 && p[0].is_finite() && p[1].is_finite())
        .map(|p| Coord { x: p[0], y: p[1] })
        .collect();

    if coords.is_empty() {
        None
    } else {
        Some(LineString::new(coords))
    }
}

/// Bounding box (lon/lat) of a set of lines
pub fn lines_bounds(lines: &[LineString<f64>]) -> Option<Rect<f64>> {
    lines
        .iter()
        .filter_map(|line| line.bounding_rect())
        .reduce(union)
}

/// Smallest rectangle containing both inputs
pub fn union(a: Rect<f64>, b: Rect<f64>) -> Rect<f64> {
    Rect::new(
        Coord {
            x: a.min().x.min(b.min().x),
            y: a.min().y.min(b.min().y),
        },
        Coord {
            x: a.max().x.max(b.max().x),
            y: a.max().y.max(b.max().y),
        },
    )
}
