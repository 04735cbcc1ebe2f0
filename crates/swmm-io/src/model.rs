//! Layers, sheets and verbatim sections exchanged with external writers.
//!
//! Import produces a [`Model`]; export consumes one. Nothing here knows how
//! the host persists layers or sheets.

use swmm_core::{Geometry, GeometryKind, Table};

/// Workbook and sheet names of the auxiliary tables.
pub mod workbooks {
    pub const OPTIONS: &str = "options";
    pub const INFLOWS: &str = "inflows";
    pub const CURVES: &str = "curves";
    pub const PATTERNS: &str = "patterns";
    pub const TIMESERIES: &str = "timeseries";
    pub const QUALITY: &str = "quality";
    pub const TRANSECTS: &str = "transects";
    pub const STREETS: &str = "streets";

    pub const ALL: &[&str] = &[
        OPTIONS, INFLOWS, CURVES, PATTERNS, TIMESERIES, QUALITY, TRANSECTS, STREETS,
    ];

    pub const INFLOWS_DIRECT: &str = "Direct";
    pub const INFLOWS_DRY_WEATHER: &str = "Dry_Weather";
    pub const TIMESERIES_SHEET: &str = "Table1";
    pub const TRANSECTS_DATA: &str = "Data";
    pub const TRANSECTS_XSECTIONS: &str = "XSections";
}

/// One geometric section: attribute table plus one geometry per row.
#[derive(Debug, Clone, PartialEq)]
pub struct Layer {
    pub section: String,
    pub name: String,
    pub kind: GeometryKind,
    pub table: Table,
    pub geometries: Vec<Option<Geometry>>,
}

impl Layer {
    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Sheet {
    pub name: String,
    pub table: Table,
}

/// Named collection of sheets, persisted as one file by the host.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Workbook {
    pub name: String,
    pub sheets: Vec<Sheet>,
}

impl Workbook {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            sheets: Vec::new(),
        }
    }

    pub fn push(&mut self, name: &str, table: Table) {
        self.sheets.push(Sheet {
            name: name.to_string(),
            table,
        });
    }

    pub fn sheet(&self, name: &str) -> Option<&Table> {
        self.sheets.iter().find(|s| s.name == name).map(|s| &s.table)
    }

    pub fn is_empty(&self) -> bool {
        self.sheets.iter().all(|s| s.table.is_empty())
    }
}

/// Free-form section carried through unchanged.
#[derive(Debug, Clone, PartialEq)]
pub struct VerbatimSection {
    pub section: String,
    pub lines: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Model {
    pub crs: String,
    pub layers: Vec<Layer>,
    pub workbooks: Vec<Workbook>,
    pub verbatim: Vec<VerbatimSection>,
}

impl Model {
    pub fn layer(&self, section: &str) -> Option<&Layer> {
        self.layers.iter().find(|l| l.section == section)
    }

    pub fn workbook(&self, name: &str) -> Option<&Workbook> {
        self.workbooks.iter().find(|w| w.name == name)
    }

    pub fn sheet(&self, workbook: &str, sheet: &str) -> Option<&Table> {
        self.workbook(workbook).and_then(|w| w.sheet(sheet))
    }

    pub fn verbatim(&self, section: &str) -> Option<&[String]> {
        self.verbatim
            .iter()
            .find(|v| v.section == section)
            .map(|v| v.lines.as_slice())
    }
}
