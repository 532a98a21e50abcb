//! Compact text format for geometry fixtures.
//!
//! Points are `lat:lng` in degrees, separated by commas. An index is written as
//! three `#`-separated sections, points, polylines and polygons, where each
//! section holds `|`-separated items:
//!
//! ```text
//! 0:0 | 1:0 # 0:0, 0:10 # 0:0, 0:10, 10:10; 1:1, 2:1, 2:2
//! ```
//!
//! All points of the first section form a single point-set shape. Each polyline
//! and each polygon becomes its own shape; polygon loops are separated by `;`.
//! The `make_*` helpers panic on malformed input and are meant for tests.

use glam::DVec3;

use s2_index::{LatLng, Shape, ShapeIndex};

use crate::error::{ParseError, Result};

fn parse_coordinate(text: &str, context: &str) -> Result<f64> {
    text.trim().parse::<f64>().map_err(|_| ParseError::InvalidNumber {
        text: text.trim().to_string(),
        context: context.to_string(),
    })
}

/// Parse one `lat:lng` pair.
pub fn parse_latlng(text: &str) -> Result<LatLng> {
    let (lat, lng) = text
        .split_once(':')
        .ok_or_else(|| ParseError::MalformedLatLng(text.trim().to_string()))?;
    let lat = parse_coordinate(lat, text)?;
    let lng = parse_coordinate(lng, text)?;
    let latlng = LatLng::from_degrees(lat, lng);
    if !latlng.is_valid() {
        return Err(ParseError::OutOfRange(text.trim().to_string()));
    }
    Ok(latlng)
}

/// Parse a comma-separated list of points. Blank input is an empty list.
pub fn parse_points(text: &str) -> Result<Vec<DVec3>> {
    text.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| parse_latlng(s).map(LatLng::to_point))
        .collect()
}

pub fn parse_point(text: &str) -> Result<DVec3> {
    let mut points = parse_points(text)?;
    if points.len() != 1 {
        return Err(ParseError::NotOnePoint(points.len()));
    }
    Ok(points.remove(0))
}

pub fn parse_polyline(text: &str) -> Result<Shape> {
    let vertices = parse_points(text)?;
    if vertices.len() < 2 {
        return Err(ParseError::ShortPolyline(vertices.len()));
    }
    Ok(Shape::Polyline(vertices))
}

/// Loops separated by `;`; the first is the shell. `empty` is a polygon with no
/// loops.
pub fn parse_polygon(text: &str) -> Result<Shape> {
    if text.trim() == "empty" {
        return Ok(Shape::polygon(Vec::new()));
    }
    let loops = text
        .split(';')
        .map(parse_points)
        .collect::<Result<Vec<_>>>()?;
    Ok(Shape::polygon(loops))
}

/// Split a section into its non-blank `|`-separated items.
fn items(section: &str) -> impl Iterator<Item = &str> {
    section.split('|').map(str::trim).filter(|s| !s.is_empty())
}

/// Parse the shapes of an index in shape id order.
pub fn parse_shapes(text: &str) -> Result<Vec<Shape>> {
    let sections: Vec<&str> = text.split('#').collect();
    if sections.len() != 3 {
        return Err(ParseError::SectionCount(sections.len()));
    }
    let mut shapes = Vec::new();

    let mut points = Vec::new();
    for item in items(sections[0]) {
        points.extend(parse_points(item)?);
    }
    if !points.is_empty() {
        shapes.push(Shape::Points(points));
    }
    for item in items(sections[1]) {
        shapes.push(parse_polyline(item)?);
    }
    for item in items(sections[2]) {
        shapes.push(parse_polygon(item)?);
    }
    Ok(shapes)
}

pub fn parse_index(text: &str) -> Result<ShapeIndex> {
    let shapes = parse_shapes(text)?;
    log::debug!("parsed {} shapes", shapes.len());
    Ok(ShapeIndex::new(shapes))
}

/// Panics if `text` is not exactly one point.
pub fn make_point(text: &str) -> DVec3 {
    parse_point(text).unwrap_or_else(|e| panic!("bad point {text:?}: {e}"))
}

pub fn make_polyline(text: &str) -> Shape {
    parse_polyline(text).unwrap_or_else(|e| panic!("bad polyline {text:?}: {e}"))
}

pub fn make_polygon(text: &str) -> Shape {
    parse_polygon(text).unwrap_or_else(|e| panic!("bad polygon {text:?}: {e}"))
}

pub fn make_index(text: &str) -> ShapeIndex {
    parse_index(text).unwrap_or_else(|e| panic!("bad index {text:?}: {e}"))
}

/// Format a point back as `lat:lng` in degrees.
pub fn format_point(p: DVec3) -> String {
    let ll = LatLng::from_point(p);
    format!("{}:{}", ll.lat.degrees(), ll.lng.degrees())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_points() {
        let points = parse_points(" 0:0, 10:20 ,-5.5:170").unwrap();
        assert_eq!(points.len(), 3);
        assert!((points[0] - DVec3::X).length() < 1e-15);
        assert!(parse_points("  ").unwrap().is_empty());
    }

    #[test]
    fn test_point_round_trip() {
        for text in ["0:0", "45:90", "-30:-120", "12.5:33.25"] {
            let p = make_point(text);
            let back = parse_latlng(&format_point(p)).unwrap();
            let orig = parse_latlng(text).unwrap();
            assert!((back.lat.degrees() - orig.lat.degrees()).abs() < 1e-12);
            assert!((back.lng.degrees() - orig.lng.degrees()).abs() < 1e-12);
        }
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!(
            parse_latlng("10"),
            Err(ParseError::MalformedLatLng("10".to_string()))
        );
        assert!(matches!(
            parse_latlng("a:1"),
            Err(ParseError::InvalidNumber { .. })
        ));
        assert_eq!(
            parse_latlng("91:0"),
            Err(ParseError::OutOfRange("91:0".to_string()))
        );
        assert_eq!(parse_point("0:0, 1:1"), Err(ParseError::NotOnePoint(2)));
        assert_eq!(parse_polyline("0:0"), Err(ParseError::ShortPolyline(1)));
        assert!(matches!(parse_shapes("0:0 # # # "), Err(ParseError::SectionCount(4))));
    }

    #[test]
    fn test_index_layout() {
        let index = make_index("0:0 | 1:0 | 2:0 | 3:0 # 0:0, 0:5, 0:10 # 0:0, 0:10, 10:10; 1:1, 2:1, 2:2");
        assert_eq!(index.num_shapes(), 3);
        assert_eq!(index.shape(0).num_edges(), 4);
        assert_eq!(index.shape(1).num_edges(), 2);
        assert_eq!(index.shape(2).dimension(), 2);
        assert_eq!(index.shape(2).num_edges(), 6);
        assert_eq!(index.num_edges(), 12);
    }

    #[test]
    fn test_empty_sections() {
        let index = make_index("# #");
        assert_eq!(index.num_shapes(), 0);
        let index = make_index("# # empty");
        assert_eq!(index.num_shapes(), 1);
        assert_eq!(index.num_edges(), 0);
    }
}
