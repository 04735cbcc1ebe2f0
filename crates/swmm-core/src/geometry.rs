//! Layer geometry on top of `geo`.
//!
//! Only what the coordinate adapter needs: assembling points, lines and
//! polygons from vertex lists and reading vertex lists back out.

use std::f64::consts::FRAC_PI_2;

pub use geo::{
    coord, Coord, Geometry, GeometryCollection, LineString, MultiLineString, MultiPoint,
    MultiPolygon, Point, Polygon,
};
use serde::{Deserialize, Serialize};

/// Geometry kind declared for a section's layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GeometryKind {
    Point,
    LineString,
    Polygon,
}

impl GeometryKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            GeometryKind::Point => "Point",
            GeometryKind::LineString => "LineString",
            GeometryKind::Polygon => "Polygon",
        }
    }

    /// Layer kind a geometry belongs to; `None` for mixed collections.
    pub fn of(geometry: &Geometry) -> Option<Self> {
        match geometry {
            Geometry::Point(_) | Geometry::MultiPoint(_) => Some(GeometryKind::Point),
            Geometry::Line(_) | Geometry::LineString(_) | Geometry::MultiLineString(_) => {
                Some(GeometryKind::LineString)
            }
            Geometry::Polygon(_)
            | Geometry::MultiPolygon(_)
            | Geometry::Rect(_)
            | Geometry::Triangle(_) => Some(GeometryKind::Polygon),
            Geometry::GeometryCollection(_) => None,
        }
    }
}

/// Flat vertex list of a geometry, in drawing order.
pub trait Vertices {
    /// Multi-part geometries are flattened part after part. Polygons
    /// contribute their exterior ring, closing vertex included.
    fn vertices(&self) -> Vec<Coord>;
}

impl Vertices for Geometry {
    fn vertices(&self) -> Vec<Coord> {
        match self {
            Geometry::Point(p) => vec![p.0],
            Geometry::MultiPoint(points) => points.iter().map(|p| p.0).collect(),
            Geometry::Line(line) => vec![line.start, line.end],
            Geometry::LineString(line) => line.0.clone(),
            Geometry::MultiLineString(parts) => {
                parts.iter().flat_map(|l| l.0.iter().copied()).collect()
            }
            Geometry::Polygon(polygon) => polygon.exterior().0.clone(),
            Geometry::MultiPolygon(polygons) => polygons
                .iter()
                .flat_map(|p| p.exterior().0.iter().copied())
                .collect(),
            Geometry::Rect(rect) => rect.to_polygon().exterior().0.clone(),
            Geometry::Triangle(triangle) => triangle.to_polygon().exterior().0.clone(),
            Geometry::GeometryCollection(items) => items.iter().flat_map(|g| g.vertices()).collect(),
        }
    }
}

/// Number of distinct ring vertices, ignoring a closing duplicate.
pub fn ring_len(ring: &[Coord]) -> usize {
    match (ring.first(), ring.last()) {
        (Some(first), Some(last)) if ring.len() > 1 && first == last => ring.len() - 1,
        _ => ring.len(),
    }
}

/// Close `vertices` into a polygon. Fewer than three distinct vertices
/// cannot span an area, so the result is a circular buffer around the first
/// vertex instead. Returns `None` only for an empty vertex list.
pub fn polygon_from_vertices(
    vertices: &[Coord],
    buffer_radius: f64,
    segments_per_quarter: u32,
) -> Option<Geometry> {
    let first = *vertices.first()?;
    let polygon = if ring_len(vertices) < 3 {
        buffer_point(first, buffer_radius, segments_per_quarter)
    } else {
        Polygon::new(LineString::from(vertices.to_vec()), vec![])
    };
    Some(Geometry::Polygon(polygon))
}

/// Regular polygon approximating a circle of `radius` around `center`.
pub fn buffer_point(center: Coord, radius: f64, segments_per_quarter: u32) -> Polygon {
    let segments = segments_per_quarter.max(1);
    let step = FRAC_PI_2 / segments as f64;
    let ring: Vec<Coord> = (0..4 * segments)
        .map(|i| {
            let angle = step * i as f64;
            coord! {
                x: center.x + radius * angle.cos(),
                y: center.y + radius * angle.sin()
            }
        })
        .collect();
    Polygon::new(LineString::from(ring), vec![])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_vertex_polygon_becomes_buffer() {
        let geom = polygon_from_vertices(&[coord! { x: 10.0, y: 20.0 }], 5.0, 5).unwrap();
        let ring = geom.vertices();
        assert_eq!(ring.len(), 21);
        assert_eq!(ring.first(), ring.last());
        for c in &ring {
            let d = ((c.x - 10.0).powi(2) + (c.y - 20.0).powi(2)).sqrt();
            assert!((d - 5.0).abs() < 1e-9);
        }
    }

    #[test]
    fn test_polygon_is_closed_once() {
        let pts = [
            coord! { x: 0.0, y: 0.0 },
            coord! { x: 1.0, y: 0.0 },
            coord! { x: 1.0, y: 1.0 },
        ];
        let open = polygon_from_vertices(&pts, 5.0, 5).unwrap();
        assert_eq!(open.vertices().len(), 4);

        let mut closed = pts.to_vec();
        closed.push(pts[0]);
        assert_eq!(polygon_from_vertices(&closed, 5.0, 5).unwrap(), open);
    }

    #[test]
    fn test_closed_two_vertex_ring_is_buffered() {
        let pts = [
            coord! { x: 0.0, y: 0.0 },
            coord! { x: 1.0, y: 0.0 },
            coord! { x: 0.0, y: 0.0 },
        ];
        assert_eq!(ring_len(&pts), 2);
        let geom = polygon_from_vertices(&pts, 5.0, 5).unwrap();
        assert_eq!(geom.vertices().len(), 21);
    }

    #[test]
    fn test_multiline_vertices_are_flattened() {
        let geom = Geometry::MultiLineString(MultiLineString::new(vec![
            LineString::from(vec![(0.0, 0.0), (1.0, 1.0)]),
            LineString::from(vec![(2.0, 2.0)]),
        ]));
        assert_eq!(geom.vertices().len(), 3);
        assert_eq!(GeometryKind::of(&geom), Some(GeometryKind::LineString));
    }
}
