//! Core data model for SWMM model conversion.
//!
//! - [`value`]: typed cells and per-column coercion
//! - [`table`]: column-ordered tables with left joins on object name
//! - [`geometry`]: points, lines and polygons built from vertex lists
//! - [`schema`]: the section registry and its dependency graph
//! - [`error`]: the unified [`SwmmError`]

pub mod error;
pub mod geometry;
pub mod schema;
pub mod table;
pub mod value;

pub use error::{SwmmError, SwmmResult};
pub use geometry::{Coord, Geometry, GeometryKind, Vertices};
pub use schema::{
    registry, ColumnSpec, JoinStyle, ProcessingStatus, Reshape, RowLayout, SchemaRegistry,
    SectionSpec,
};
pub use table::{Column, Table, NAME};
pub use value::{ColumnKind, Value};
