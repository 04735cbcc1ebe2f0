//! Geometry coordinate adapter.
//!
//! Import: node coordinates, link vertices and polygon vertices are read from
//! their coordinate sections and assembled into one geometry per object.
//! Export: the vertex list of each geometry is flattened back into rows of
//! the coordinate sections, with link endpoints left implicit and polygon
//! rings written closed.

use std::collections::HashMap;

use swmm_core::geometry::{polygon_from_vertices, LineString};
use swmm_core::{
    Coord, Geometry, GeometryKind, SwmmError, SwmmResult, Table, Value, Vertices, NAME,
};
use tracing::warn;

use crate::diagnostics::Diagnostics;

/// Vertex lists per object name, in file order.
#[derive(Debug, Default)]
pub struct VertexIndex {
    vertices: HashMap<String, Vec<Coord>>,
}

impl VertexIndex {
    /// Group the rows of a `Name X_Coord Y_Coord` table by name. Rows with
    /// a missing coordinate are skipped.
    pub fn from_table(table: &Table) -> Self {
        let mut vertices: HashMap<String, Vec<Coord>> = HashMap::new();
        for i in 0..table.len() {
            let Some(name) = table.value(i, NAME).key() else {
                continue;
            };
            let x = table.value(i, "X_Coord").as_f64();
            let y = table.value(i, "Y_Coord").as_f64();
            if let (Some(x), Some(y)) = (x, y) {
                vertices.entry(name).or_default().push(Coord { x, y });
            }
        }
        Self { vertices }
    }

    pub fn all(&self, name: &str) -> &[Coord] {
        self.vertices.get(name).map(Vec::as_slice).unwrap_or_default()
    }

    /// First coordinate recorded for `name`.
    pub fn first(&self, name: &str) -> Option<Coord> {
        self.all(name).first().copied()
    }
}

/// Parameters of the polygon fallback for objects with fewer than 3 vertices.
#[derive(Debug, Clone, Copy)]
pub struct BufferParams {
    pub radius: f64,
    pub segments_per_quarter: u32,
}

/// One geometry per row of `table`.
///
/// Points come from `coords`. Lines are `FromNode` + `vertices` + `ToNode`,
/// with both endpoints taken from `coords`; an endpoint without coordinates
/// is fatal since the line cannot be drawn. Polygons come from `vertices`.
/// Points and polygons without any coordinates get no geometry.
pub fn attach(
    section: &str,
    kind: GeometryKind,
    table: &Table,
    coords: &VertexIndex,
    vertices: &VertexIndex,
    buffer: BufferParams,
    diagnostics: &mut Diagnostics,
) -> SwmmResult<Vec<Option<Geometry>>> {
    let mut out = Vec::with_capacity(table.len());
    for i in 0..table.len() {
        let name = table.value(i, NAME).to_string();
        let geometry = match kind {
            GeometryKind::Point => coords.first(&name).map(|c| Geometry::Point(c.into())),
            GeometryKind::LineString => {
                let from = endpoint(section, &name, table.value(i, "FromNode"), coords)?;
                let to = endpoint(section, &name, table.value(i, "ToNode"), coords)?;
                let mut line = Vec::with_capacity(vertices.all(&name).len() + 2);
                line.push(from);
                line.extend_from_slice(vertices.all(&name));
                line.push(to);
                Some(Geometry::LineString(LineString::from(line)))
            }
            GeometryKind::Polygon => polygon_from_vertices(
                vertices.all(&name),
                buffer.radius,
                buffer.segments_per_quarter,
            ),
        };
        if geometry.is_none() {
            warn!(section, object = %name, "no coordinates, feature has no geometry");
            diagnostics.add_object_warning("geometry", section, &name, "no coordinates");
        }
        out.push(geometry);
    }
    Ok(out)
}

fn endpoint(section: &str, object: &str, node: &Value, coords: &VertexIndex) -> SwmmResult<Coord> {
    let reference = node.key().unwrap_or_default();
    coords
        .first(&reference)
        .ok_or_else(|| SwmmError::UnresolvedJoinReference {
            section: section.to_string(),
            object: object.to_string(),
            reference,
        })
}

/// Coordinate-section rows of one feature of a `kind` layer on export.
///
/// Points yield their single vertex. Lines with more than 2 vertices drop
/// the first and last (the endpoints are implied by the node references);
/// two-vertex lines yield nothing. Polygons yield their closed exterior ring,
/// replaced by a buffer ring when fewer than 3 distinct vertices are supplied.
pub fn vertex_rows(
    name: &str,
    kind: GeometryKind,
    geometry: &Geometry,
    buffer: BufferParams,
) -> Vec<[String; 3]> {
    let vertices = match kind {
        GeometryKind::Point => geometry.vertices().into_iter().take(1).collect(),
        GeometryKind::LineString => {
            let line = geometry.vertices();
            if line.len() > 2 {
                line[1..line.len() - 1].to_vec()
            } else {
                Vec::new()
            }
        }
        GeometryKind::Polygon => polygon_from_vertices(
            &geometry.vertices(),
            buffer.radius,
            buffer.segments_per_quarter,
        )
        .map(|p| p.vertices())
        .unwrap_or_default(),
    };
    vertices
        .into_iter()
        .map(|c| [name.to_string(), c.x.to_string(), c.y.to_string()])
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use swmm_core::geometry::coord;

    fn coord_table(rows: &[(&str, f64, f64)]) -> Table {
        let mut t = Table::from_specs(
            swmm_core::registry()
                .unwrap()
                .get("COORDINATES")
                .unwrap()
                .columns
                .unwrap(),
        );
        for (n, x, y) in rows {
            t.push_row(vec![Value::from(*n), Value::from(*x), Value::from(*y)]);
        }
        t
    }

    fn links(rows: &[(&str, &str, &str)]) -> Table {
        let mut t = Table::from_names(&["Name", "FromNode", "ToNode"]);
        for (n, a, b) in rows {
            t.push_row(vec![Value::from(*n), Value::from(*a), Value::from(*b)]);
        }
        t
    }

    const BUFFER: BufferParams = BufferParams {
        radius: 5.0,
        segments_per_quarter: 5,
    };

    #[test]
    fn test_line_endpoints_come_from_nodes() {
        let coords = VertexIndex::from_table(&coord_table(&[("J1", 0.0, 0.0), ("J2", 3.0, 0.0)]));
        let verts = VertexIndex::from_table(&coord_table(&[("C1", 1.0, 1.0), ("C1", 2.0, 1.0)]));
        let mut diag = Diagnostics::new();
        let geoms = attach(
            "CONDUITS",
            GeometryKind::LineString,
            &links(&[("C1", "J1", "J2")]),
            &coords,
            &verts,
            BUFFER,
            &mut diag,
        )
        .unwrap();
        let line = geoms[0].as_ref().unwrap().vertices();
        assert_eq!(line.len(), 4);
        assert_eq!(line[0], coord! { x: 0.0, y: 0.0 });
        assert_eq!(line[3], coord! { x: 3.0, y: 0.0 });

        let rows = vertex_rows("C1", GeometryKind::LineString, geoms[0].as_ref().unwrap(), BUFFER);
        assert_eq!(
            rows,
            vec![
                ["C1".to_string(), "1".to_string(), "1".to_string()],
                ["C1".to_string(), "2".to_string(), "1".to_string()],
            ]
        );
    }

    #[test]
    fn test_unresolved_endpoint_is_fatal() {
        let coords = VertexIndex::from_table(&coord_table(&[("J1", 0.0, 0.0)]));
        let err = attach(
            "PUMPS",
            GeometryKind::LineString,
            &links(&[("P1", "J1", "J404")]),
            &coords,
            &VertexIndex::default(),
            BUFFER,
            &mut Diagnostics::new(),
        )
        .unwrap_err();
        assert!(matches!(
            err,
            SwmmError::UnresolvedJoinReference { ref reference, .. } if reference == "J404"
        ));
    }

    #[test]
    fn test_missing_point_is_a_warning() {
        let mut diag = Diagnostics::new();
        let mut table = Table::from_names(&["Name"]);
        table.push_row(vec![Value::from("J9")]);
        let geoms = attach(
            "JUNCTIONS",
            GeometryKind::Point,
            &table,
            &VertexIndex::default(),
            &VertexIndex::default(),
            BUFFER,
            &mut diag,
        )
        .unwrap();
        assert!(geoms[0].is_none());
        assert_eq!(diag.warning_count(), 1);
    }

    #[test]
    fn test_two_vertex_line_writes_no_vertices() {
        let line = Geometry::LineString(LineString::from(vec![(0.0, 0.0), (1.0, 1.0)]));
        assert!(vertex_rows("C1", GeometryKind::LineString, &line, BUFFER).is_empty());
    }

    #[test]
    fn test_polygon_ring_is_written_closed() {
        let poly = polygon_from_vertices(
            &[
                coord! { x: 0.0, y: 0.0 },
                coord! { x: 1.0, y: 0.0 },
                coord! { x: 1.0, y: 1.0 },
            ],
            5.0,
            5,
        )
        .unwrap();
        let rows = vertex_rows("S1", GeometryKind::Polygon, &poly, BUFFER);
        assert_eq!(rows.len(), 4);
        assert_eq!(rows[0], rows[3]);
    }

    #[test]
    fn test_closed_ring_rows_round_trip() {
        let input = [
            ("S1", 0.0, 0.0),
            ("S1", 1.0, 0.0),
            ("S1", 1.0, 1.0),
            ("S1", 0.0, 0.0),
        ];
        let mut names = Table::from_names(&["Name"]);
        names.push_row(vec![Value::from("S1")]);
        let verts = VertexIndex::from_table(&coord_table(&input));
        let geoms = attach(
            "SUBCATCHMENTS",
            GeometryKind::Polygon,
            &names,
            &VertexIndex::default(),
            &verts,
            BUFFER,
            &mut Diagnostics::new(),
        )
        .unwrap();
        let rows = vertex_rows("S1", GeometryKind::Polygon, geoms[0].as_ref().unwrap(), BUFFER);
        let expected: Vec<[String; 3]> = input
            .iter()
            .map(|(n, x, y)| [n.to_string(), x.to_string(), y.to_string()])
            .collect();
        assert_eq!(rows, expected);
    }

    #[test]
    fn test_single_vertex_polygon_is_buffered_on_export() {
        let point = Geometry::Point((10.0, 20.0).into());
        let rows = vertex_rows("S1", GeometryKind::Polygon, &point, BUFFER);
        assert_eq!(rows.len(), 21);
        assert_eq!(rows[0], rows[20]);
        assert_eq!(rows[0][1], "15");
        assert_eq!(rows[0][2], "20");
    }
}
