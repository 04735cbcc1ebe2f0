//! Run options for the import and export orchestrators.

use serde::{Deserialize, Serialize};

/// Options for reading an input file into layers and sheets.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportOptions {
    /// Column carrying object annotations on geometric layers
    #[serde(default = "default_annotation_field")]
    pub annotation_field: String,
    /// Infiltration method assumed when OPTIONS does not declare one
    #[serde(default = "default_infiltration")]
    pub default_infiltration: String,
    /// Radius of the circle drawn for subcatchments with fewer than 3 vertices
    #[serde(default = "default_buffer_radius")]
    pub polygon_buffer_radius: f64,
    /// Segments per quarter circle of that buffer
    #[serde(default = "default_buffer_segments")]
    pub polygon_buffer_segments: u32,
    /// CRS recorded on the produced layers
    #[serde(default = "default_crs")]
    pub crs: String,
}

impl Default for ImportOptions {
    fn default() -> Self {
        Self {
            annotation_field: default_annotation_field(),
            default_infiltration: default_infiltration(),
            polygon_buffer_radius: default_buffer_radius(),
            polygon_buffer_segments: default_buffer_segments(),
            crs: default_crs(),
        }
    }
}

/// Options for writing layers and sheets back to an input file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportOptions {
    #[serde(default = "default_annotation_field")]
    pub annotation_field: String,
    #[serde(default = "default_infiltration")]
    pub default_infiltration: String,
    #[serde(default = "default_buffer_radius")]
    pub polygon_buffer_radius: f64,
    #[serde(default = "default_buffer_segments")]
    pub polygon_buffer_segments: u32,
    /// Minimum width of every column but the last in the written file
    #[serde(default = "default_column_width")]
    pub column_width: usize,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            annotation_field: default_annotation_field(),
            default_infiltration: default_infiltration(),
            polygon_buffer_radius: default_buffer_radius(),
            polygon_buffer_segments: default_buffer_segments(),
            column_width: default_column_width(),
        }
    }
}

fn default_annotation_field() -> String {
    "Description".to_string()
}

fn default_infiltration() -> String {
    "HORTON".to_string()
}

fn default_buffer_radius() -> f64 {
    5.0
}

fn default_buffer_segments() -> u32 {
    5
}

fn default_column_width() -> usize {
    17
}

fn default_crs() -> String {
    "EPSG:25833".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_toml_uses_defaults() {
        let opts: ImportOptions = toml::from_str("crs = \"EPSG:4326\"").unwrap();
        assert_eq!(opts.crs, "EPSG:4326");
        assert_eq!(opts.annotation_field, "Description");
        assert_eq!(opts.polygon_buffer_segments, 5);

        let opts: ExportOptions = toml::from_str("").unwrap();
        assert_eq!(opts.column_width, 17);
        assert_eq!(opts.default_infiltration, "HORTON");
    }
}
