//! Export orchestrator: layers, sheets and verbatim sections back to input
//! file text.

use std::collections::{HashMap, HashSet};
use std::path::Path;

use swmm_core::{
    registry, Column, ColumnKind, ColumnSpec, GeometryKind, RowLayout, SchemaRegistry,
    SectionSpec, SwmmError, SwmmResult, Table, Value, NAME,
};
use tracing::{debug, info, warn};

use crate::diagnostics::Diagnostics;
use crate::feedback::{percent, Feedback};
use crate::inp::composite::{self, object_rows, CURVE_TYPES, PATTERN_TYPES};
use crate::inp::geometry::{vertex_rows, BufferParams};
use crate::inp::layouts::{export_row, InfiltrationMethod, LayoutContext};
use crate::inp::quality;
use crate::inp::writer::{InpDocument, OutRow};
use crate::model::{workbooks, Layer, Model};
use crate::options::ExportOptions;

#[derive(Debug)]
pub struct ExportResult {
    pub text: String,
    pub diagnostics: Diagnostics,
}

/// Fail with [`SwmmError::SchemaViolation`] when `table` lacks any of
/// `required`.
pub fn check_columns(source_name: &str, table: &Table, required: &[&str]) -> SwmmResult<()> {
    let missing = table.missing_columns(required);
    if missing.is_empty() {
        Ok(())
    } else {
        Err(SwmmError::schema(source_name, missing))
    }
}

/// Export and write the result to `path`. Nothing is written when the
/// conversion fails.
pub fn write_inp_file(
    model: &Model,
    path: &Path,
    options: &ExportOptions,
    feedback: &mut dyn Feedback,
) -> SwmmResult<Diagnostics> {
    let result = export_inp(model, options, feedback)?;
    std::fs::write(path, result.text).map_err(|e| SwmmError::OutputTargetUnavailable {
        path: path.display().to_string(),
        reason: e.to_string(),
    })?;
    info!(path = %path.display(), "input file written");
    Ok(result.diagnostics)
}

/// Convert a model into input file text.
pub fn export_inp(
    model: &Model,
    options: &ExportOptions,
    feedback: &mut dyn Feedback,
) -> SwmmResult<ExportResult> {
    let registry = registry()?;
    let mut exporter = Exporter {
        registry,
        model,
        options,
        feedback,
        doc: InpDocument::new(registry),
        diagnostics: Diagnostics::new(),
        ctx: LayoutContext::default(),
    };
    exporter.run()?;
    let text = exporter.doc.render(options.column_width);
    exporter.diagnostics.stats.sections = exporter.doc.section_names().len();
    Ok(ExportResult {
        text,
        diagnostics: exporter.diagnostics,
    })
}

struct Exporter<'a> {
    registry: &'a SchemaRegistry,
    model: &'a Model,
    options: &'a ExportOptions,
    feedback: &'a mut dyn Feedback,
    doc: InpDocument<'a>,
    diagnostics: Diagnostics,
    ctx: LayoutContext,
}

impl<'a> Exporter<'a> {
    fn run(&mut self) -> SwmmResult<()> {
        let registry = self.registry;
        let model = self.model;
        self.options_section()?;

        let layers: Vec<&SectionSpec> = registry.layers().collect();
        let total = layers.len() + workbooks::ALL.len();
        for (step, spec) in layers.iter().enumerate() {
            if let Some(layer) = model.layer(spec.name) {
                self.step(&format!("[{}] section", spec.name))?;
                self.layer(spec, layer)?;
                self.diagnostics.stats.layers += 1;
                self.diagnostics.stats.objects += layer.len();
            }
            self.feedback.set_progress(percent(step + 1, total));
        }

        let nodes = self.node_names();
        for (step, name) in workbooks::ALL.iter().enumerate() {
            if let Some(book) = model.workbook(name) {
                self.step(&format!("Reading workbook \"{name}\""))?;
                self.diagnostics.stats.sheets += book.sheets.len();
            }
            match *name {
                workbooks::OPTIONS => {}
                workbooks::INFLOWS => self.inflows(&nodes)?,
                workbooks::CURVES => self.curves()?,
                workbooks::PATTERNS => self.patterns()?,
                workbooks::TIMESERIES => self.timeseries()?,
                workbooks::QUALITY => self.quality()?,
                workbooks::TRANSECTS => self.transects()?,
                workbooks::STREETS => {
                    for section in ["STREETS", "INLETS", "INLET_USAGE"] {
                        self.sheet_section(workbooks::STREETS, section, section, None)?;
                    }
                }
                _ => {}
            }
            self.feedback
                .set_progress(percent(layers.len() + step + 1, total));
        }

        for section in &model.verbatim {
            self.doc.push_lines(&section.section, &section.lines)?;
        }
        Ok(())
    }

    fn step(&mut self, text: &str) -> SwmmResult<()> {
        if self.feedback.is_canceled() {
            return Err(SwmmError::Canceled);
        }
        self.feedback.set_progress_text(text);
        Ok(())
    }

    fn columns(&self, section: &str) -> SwmmResult<&'static [ColumnSpec]> {
        self.registry
            .require(section)?
            .columns
            .ok_or_else(|| SwmmError::Other(format!("[{section}] has no columns")))
    }

    /// OPTIONS rows, and the main infiltration method for all later rows.
    fn options_section(&mut self) -> SwmmResult<()> {
        let mut method = None;
        let model = self.model;
        if let Some(sheet) = model.sheet(workbooks::OPTIONS, "OPTIONS") {
            check_columns("options/OPTIONS", sheet, &["Option", "Value"])?;
            let table = sheet.project(self.columns("OPTIONS")?, "OPTIONS")?;
            for i in object_rows(&table, "Option") {
                let is_infiltration = table
                    .value(i, "Option")
                    .as_str()
                    .is_some_and(|o| o.eq_ignore_ascii_case("INFILTRATION"));
                if is_infiltration {
                    method = table.value(i, "Value").key();
                }
            }
            self.sheet_section(workbooks::OPTIONS, "OPTIONS", "OPTIONS", None)?;
        }
        let method = method.unwrap_or_else(|| self.options.default_infiltration.clone());
        self.ctx.main_infiltration = method.parse::<InfiltrationMethod>()?;
        debug!(method = %self.ctx.main_infiltration, "main infiltration method");
        Ok(())
    }

    fn layer(&mut self, spec: &SectionSpec, layer: &Layer) -> SwmmResult<()> {
        let layer_columns = self.registry.layer_columns(spec.name)?;
        let required: Vec<&str> = layer_columns.iter().map(|c| c.name).collect();
        check_columns(&layer.name, &layer.table, &required)?;

        let mut table = layer.table.project(&layer_columns, spec.name)?;
        if spec.name == "JUNCTIONS" {
            fill_null(&mut table, &["MaxDepth", "InitDepth", "SurDepth", "Aponded"]);
        }
        let annotations: Vec<Option<String>> = (0..layer.table.len())
            .map(|i| layer.table.value(i, &self.options.annotation_field).to_token())
            .collect();
        let rows = object_rows(&table, NAME);
        if rows.len() < table.len() {
            warn!(layer = %layer.name, skipped = table.len() - rows.len(), "features without name");
            self.diagnostics
                .add_warning("reference", &format!("{}: features without name skipped", layer.name));
        }

        let primary = table.project(self.columns(spec.name)?, spec.name)?;
        let mut out = Vec::with_capacity(rows.len());
        for &i in &rows {
            let fields = export_row(spec.layout, &primary, i, &self.ctx)?;
            out.push(OutRow::annotated(fields, annotations[i].clone()));
        }
        self.doc.push_rows(spec.name, out)?;

        for satellite in spec.joins {
            self.satellite(spec, satellite, &table, &rows)?;
        }
        self.geometry(spec, layer, &table, &rows)
    }

    /// Rows of a satellite section recovered from the joined layer table.
    fn satellite(
        &mut self,
        spec: &SectionSpec,
        satellite: &str,
        table: &Table,
        rows: &[usize],
    ) -> SwmmResult<()> {
        let registry = self.registry;
        let sat_spec = registry.require(satellite)?;
        let mut source = table.clone();
        if let Some(reshape) = spec.reshape {
            let reverse: Vec<(&str, &str)> = reshape.rename.iter().map(|&(a, b)| (b, a)).collect();
            source.rename_columns(&reverse);
        }
        if spec.name == "WEIRS" && satellite == "XSECTIONS" {
            weir_cross_sections(&mut source);
        }
        if spec.name == "ORIFICES" && satellite == "XSECTIONS" {
            orifice_cross_sections(&mut source);
        }
        let sat_table = source.project(self.columns(satellite)?, satellite)?;

        let mut out = Vec::new();
        for &i in rows {
            if !satellite_row_present(satellite, &sat_table, i) {
                continue;
            }
            out.push(OutRow::new(export_row(sat_spec.layout, &sat_table, i, &self.ctx)?));
        }
        self.doc.push_rows(satellite, out)
    }

    fn geometry(
        &mut self,
        spec: &SectionSpec,
        layer: &Layer,
        table: &Table,
        rows: &[usize],
    ) -> SwmmResult<()> {
        let Some(kind) = spec.geometry else {
            return Ok(());
        };
        let target = match kind {
            GeometryKind::Point => spec.geometry_sources.first().copied().unwrap_or("COORDINATES"),
            GeometryKind::LineString => "VERTICES",
            GeometryKind::Polygon => "Polygons",
        };
        let buffer = BufferParams {
            radius: self.options.polygon_buffer_radius,
            segments_per_quarter: self.options.polygon_buffer_segments,
        };
        let mut out = Vec::new();
        for &i in rows {
            let name = table.value(i, NAME).to_string();
            match layer.geometries.get(i).and_then(Option::as_ref) {
                Some(geometry) => out.extend(
                    vertex_rows(&name, kind, geometry, buffer)
                        .into_iter()
                        .map(OutRow::tokens),
                ),
                None => {
                    warn!(section = spec.name, object = %name, "feature has no geometry");
                    self.diagnostics.add_object_warning(
                        "geometry",
                        spec.name,
                        &name,
                        "feature has no geometry",
                    );
                }
            }
        }
        self.doc.push_rows(target, out)
    }

    /// Names of every node in the node layers.
    fn node_names(&self) -> HashSet<String> {
        self.registry
            .layers()
            .filter(|s| s.geometry == Some(GeometryKind::Point) && s.name != "RAINGAGES")
            .filter_map(|s| self.model.layer(s.name))
            .flat_map(|l| l.table.names())
            .collect()
    }

    /// Sheet rows written one-to-one as rows of `section`. With `nodes`,
    /// rows whose `Name` is not a known node are dropped.
    fn sheet_section(
        &mut self,
        workbook: &str,
        sheet: &str,
        section: &str,
        nodes: Option<&HashSet<String>>,
    ) -> SwmmResult<()> {
        let model = self.model;
        let Some(source) = model.sheet(workbook, sheet) else {
            return Ok(());
        };
        let registry = self.registry;
        let spec = registry.require(section)?;
        let columns = self.columns(section)?;
        let required: Vec<&str> = columns.iter().map(|c| c.name).collect();
        check_columns(&format!("{workbook}/{sheet}"), source, &required)?;
        let table = source.project(columns, section)?;
        let key = columns[0].name;

        let mut out = Vec::new();
        for i in object_rows(&table, key) {
            if let Some(nodes) = nodes {
                let name = table.value(i, key).to_string();
                if !nodes.contains(&name) {
                    warn!(section, node = %name, "dropping record for unknown node");
                    self.diagnostics
                        .add_dropped(section, &name, "node not present in any node layer");
                    continue;
                }
            }
            out.push(OutRow::new(export_row(spec.layout, &table, i, &self.ctx)?));
        }
        self.doc.push_rows(section, out)
    }

    fn inflows(&mut self, nodes: &HashSet<String>) -> SwmmResult<()> {
        self.sheet_section(workbooks::INFLOWS, workbooks::INFLOWS_DIRECT, "INFLOWS", Some(nodes))?;
        self.sheet_section(
            workbooks::INFLOWS,
            workbooks::INFLOWS_DRY_WEATHER,
            "DWF",
            Some(nodes),
        )
    }

    fn curves(&mut self) -> SwmmResult<()> {
        let model = self.model;
        for &(kind, x, y) in CURVE_TYPES {
            let Some(sheet) = model.sheet(workbooks::CURVES, kind) else {
                continue;
            };
            check_columns(&format!("{}/{kind}", workbooks::CURVES), sheet, &[NAME, x, y])?;
            let table = sheet.project(&composite::curve_columns(x, y), "CURVES")?;
            self.doc.push_rows("CURVES", composite::curves_out(kind, &table))?;
        }
        Ok(())
    }

    fn patterns(&mut self) -> SwmmResult<()> {
        let model = self.model;
        for &(kind, label, _) in PATTERN_TYPES {
            let Some(sheet) = model.sheet(workbooks::PATTERNS, kind) else {
                continue;
            };
            check_columns(
                &format!("{}/{kind}", workbooks::PATTERNS),
                sheet,
                &[NAME, label, "Factor"],
            )?;
            let table = sheet.project(&composite::pattern_columns(label), "PATTERNS")?;
            self.doc.push_rows("PATTERNS", composite::patterns_out(kind, &table))?;
        }
        Ok(())
    }

    fn timeseries(&mut self) -> SwmmResult<()> {
        let model = self.model;
        let Some(sheet) = model.sheet(workbooks::TIMESERIES, workbooks::TIMESERIES_SHEET)
        else {
            return Ok(());
        };
        check_columns(
            &format!("{}/{}", workbooks::TIMESERIES, workbooks::TIMESERIES_SHEET),
            sheet,
            &[NAME, "Date", "Time", "Value"],
        )?;
        let table = sheet.project(composite::TIMESERIES_COLUMNS, "TIMESERIES")?;
        let gage_descriptions = self.gage_descriptions();
        self.doc
            .push_rows("TIMESERIES", composite::timeseries_out(&table, &gage_descriptions))
    }

    /// Gage description per series name, for gages reading a series.
    fn gage_descriptions(&self) -> HashMap<String, String> {
        let mut out = HashMap::new();
        let Some(gages) = self.model.layer("RAINGAGES") else {
            return out;
        };
        let t = &gages.table;
        for i in 0..t.len() {
            let reads_series = t
                .value(i, "DataSource")
                .as_str()
                .is_some_and(|s| s.eq_ignore_ascii_case("TIMESERIES"));
            let series = t.value(i, "SeriesName").key();
            let description = t.value(i, &self.options.annotation_field).key();
            if let (true, Some(series), Some(description)) = (reads_series, series, description) {
                out.entry(series).or_insert(description);
            }
        }
        out
    }

    fn quality(&mut self) -> SwmmResult<()> {
        self.sheet_section(workbooks::QUALITY, "POLLUTANTS", "POLLUTANTS", None)?;
        let model = self.model;
        if let Some(sheet) = model.sheet(workbooks::QUALITY, "LANDUSES") {
            let mut required: Vec<&str> = self.columns("LANDUSES")?.iter().map(|c| c.name).collect();
            required.push("Pollutant");
            check_columns(&format!("{}/LANDUSES", workbooks::QUALITY), sheet, &required)?;
            let (landuses, buildup, washoff) = quality::split_landuses(
                sheet,
                self.columns("LANDUSES")?,
                self.columns("BUILDUP")?,
                self.columns("WASHOFF")?,
            )?;
            for (section, table) in [
                ("LANDUSES", landuses),
                ("BUILDUP", buildup),
                ("WASHOFF", washoff),
            ] {
                let rows = (0..table.len())
                    .map(|i| export_row(RowLayout::Direct, &table, i, &self.ctx))
                    .map(|r| r.map(OutRow::new))
                    .collect::<SwmmResult<Vec<_>>>()?;
                self.doc.push_rows(section, rows)?;
            }
        }
        self.sheet_section(workbooks::QUALITY, "COVERAGES", "COVERAGES", None)?;
        self.sheet_section(workbooks::QUALITY, "LOADINGS", "LOADINGS", None)
    }

    fn transects(&mut self) -> SwmmResult<()> {
        let model = self.model;
        let data = model.sheet(workbooks::TRANSECTS, workbooks::TRANSECTS_DATA);
        let points = model.sheet(workbooks::TRANSECTS, workbooks::TRANSECTS_XSECTIONS);
        let (Some(data), Some(points)) = (data, points) else {
            return Ok(());
        };
        for (sheet, table, columns) in [
            (workbooks::TRANSECTS_DATA, data, composite::TRANSECT_DATA_COLUMNS),
            (workbooks::TRANSECTS_XSECTIONS, points, composite::TRANSECT_POINT_COLUMNS),
        ] {
            let required: Vec<&str> = columns.iter().map(|c| c.name).collect();
            check_columns(&format!("{}/{sheet}", workbooks::TRANSECTS), table, &required)?;
        }
        let data = data.project(composite::TRANSECT_DATA_COLUMNS, "TRANSECTS")?;
        let points = points.project(composite::TRANSECT_POINT_COLUMNS, "TRANSECTS")?;
        self.doc
            .push_rows("TRANSECTS", composite::transects_out(&data, &points))
    }
}

fn fill_null(table: &mut Table, columns: &[&str]) {
    for i in 0..table.len() {
        for column in columns {
            if table.value(i, column).is_null() {
                table.set(i, column, Value::Double(0.0));
            }
        }
    }
}

/// Cross-section shape and side slopes of a weir, from its type.
fn weir_cross_sections(table: &mut Table) {
    let mut shapes = Vec::with_capacity(table.len());
    for i in 0..table.len() {
        let kind = table
            .value(i, "Type")
            .as_str()
            .map(str::to_ascii_uppercase)
            .unwrap_or_default();
        let shape = match kind.as_str() {
            "TRANSVERSE" | "SIDEFLOW" | "ROADWAY" => Value::text("RECT_OPEN"),
            "V-NOTCH" => Value::text("TRIANGULAR"),
            "TRAPEZOIDAL" => Value::text("TRAPEZOIDAL"),
            _ => Value::Null,
        };
        let slope = match table.value(i, "Geom3") {
            Value::Null => Value::Double(0.0),
            v => v.clone(),
        };
        let geom4 = if kind == "TRAPEZOIDAL" {
            slope.clone()
        } else {
            Value::Double(0.0)
        };
        table.set(i, "Geom3", slope);
        shapes.push((shape, geom4));
    }
    let (shape, geom4): (Vec<Value>, Vec<Value>) = shapes.into_iter().unzip();
    table.add_column(Column::new("Shape", ColumnKind::String), shape);
    table.add_column(Column::new("Geom4", ColumnKind::Double), geom4);
}

/// Orifice openings have no third or fourth dimension, but every shaped
/// cross-section line carries all four slots.
fn orifice_cross_sections(table: &mut Table) {
    for column in ["Geom3", "Geom4"] {
        if !table.has_column(column) {
            let empty = vec![Value::Null; table.len()];
            table.add_column(Column::new(column, ColumnKind::Double), empty);
        }
        for i in 0..table.len() {
            if !table.value(i, "Shape").is_null() && table.value(i, column).is_null() {
                table.set(i, column, Value::Double(0.0));
            }
        }
    }
}

/// Whether row `i` of a satellite table carries data worth a line.
fn satellite_row_present(section: &str, table: &Table, i: usize) -> bool {
    if section == "LOSSES" {
        let coefficients = ["Kentry", "Kexit", "Kavg", "Seepage"]
            .iter()
            .any(|c| !table.value(i, c).is_null());
        return coefficients || table.value(i, "FlapGate").as_bool() == Some(true);
    }
    table.rows()[i].iter().skip(1).any(|v| !v.is_null())
}
