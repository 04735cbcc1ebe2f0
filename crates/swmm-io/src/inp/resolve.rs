//! Memoized, dependency-driven section resolution.
//!
//! [`Resolver::resolve`] brings one section to a target status, first
//! resolving every section it reads. A section already at or past the target
//! is returned from the store untouched, so sibling sections that share a
//! satellite (XSECTIONS for conduits, weirs and orifices) process it once.

use std::collections::HashMap;

use swmm_core::{
    JoinStyle, ProcessingStatus, RowLayout, SchemaRegistry, SectionSpec, SwmmError, SwmmResult,
    Table,
};
use tracing::debug;

use super::composite::{self, GageSeries};
use super::geometry::{self, BufferParams, VertexIndex};
use super::layouts::{self, InfiltrationMethod, LayoutContext};
use super::quality;
use super::records::{build_table, AnnotationColumn};
use super::store::{SectionState, SectionStore};
use crate::diagnostics::Diagnostics;
use crate::feedback::Feedback;
use crate::model::{workbooks, Sheet};
use crate::options::ImportOptions;

pub struct Resolver<'a> {
    registry: &'a SchemaRegistry,
    store: SectionStore,
    options: &'a ImportOptions,
    feedback: &'a mut dyn Feedback,
    diagnostics: Diagnostics,
    in_flight: Vec<&'static str>,
}

impl<'a> Resolver<'a> {
    pub fn new(
        registry: &'a SchemaRegistry,
        store: SectionStore,
        options: &'a ImportOptions,
        feedback: &'a mut dyn Feedback,
    ) -> Self {
        Self {
            registry,
            store,
            options,
            feedback,
            diagnostics: Diagnostics::new(),
            in_flight: Vec::new(),
        }
    }

    pub fn store(&self) -> &SectionStore {
        &self.store
    }

    pub fn feedback(&mut self) -> &mut dyn Feedback {
        &mut *self.feedback
    }

    pub fn diagnostics_mut(&mut self) -> &mut Diagnostics {
        &mut self.diagnostics
    }

    pub fn into_diagnostics(self) -> Diagnostics {
        self.diagnostics
    }

    /// Bring `name` to `target` and return its state.
    ///
    /// Sections without geometry top out at PROCESSED. Re-entering a section
    /// that is still being resolved is a [`SwmmError::DependencyCycle`].
    pub fn resolve(&mut self, name: &str, target: ProcessingStatus) -> SwmmResult<&SectionState> {
        let registry = self.registry;
        let spec = registry.require(name)?;
        let target = if spec.geometry.is_some() {
            target
        } else {
            target.min(ProcessingStatus::Processed)
        };
        if self.store.status(spec.name) < target {
            if self.in_flight.contains(&spec.name) {
                return Err(SwmmError::DependencyCycle(format!(
                    "{} -> {}",
                    self.in_flight.join(" -> "),
                    spec.name
                )));
            }
            if self.feedback.is_canceled() {
                return Err(SwmmError::Canceled);
            }
            self.in_flight.push(spec.name);
            let result = self.advance(spec, target);
            self.in_flight.pop();
            result?;
        }
        Ok(self.store.entry(spec.name))
    }

    fn advance(&mut self, spec: &SectionSpec, target: ProcessingStatus) -> SwmmResult<()> {
        if self.store.status(spec.name) < ProcessingStatus::Processed {
            self.feedback
                .set_progress_text(&format!("Preparing section \"{}\"", spec.name));
            for dep in spec.joins.iter().chain(spec.requires) {
                self.resolve(dep, ProcessingStatus::Processed)?;
            }
            self.process(spec)?;
            self.store.entry(spec.name).advance(ProcessingStatus::Processed);
            debug!(section = spec.name, "section processed");
        }

        if target == ProcessingStatus::GeomReady {
            for dep in spec.geometry_sources {
                self.resolve(dep, ProcessingStatus::Processed)?;
            }
            self.attach_geometry(spec)?;
            self.store.entry(spec.name).advance(ProcessingStatus::GeomReady);
            debug!(section = spec.name, "geometry attached");
        }
        Ok(())
    }

    fn process(&mut self, spec: &SectionSpec) -> SwmmResult<()> {
        match spec.layout {
            RowLayout::Verbatim => {}
            RowLayout::Curve => {
                let sheets = composite::curves_in(&self.store.entry(spec.name).raw.data)?;
                self.store.entry(spec.name).sheets = sheets;
            }
            RowLayout::Pattern => {
                let sheets = composite::patterns_in(&self.store.entry(spec.name).raw.data)?;
                self.store.entry(spec.name).sheets = sheets;
            }
            RowLayout::TimeSeries => {
                let gages = self.gage_series();
                let raw = &self.store.entry(spec.name).raw;
                let table = composite::timeseries_in(&raw.data, &raw.annotations, &gages)?;
                self.store.entry(spec.name).sheets = vec![Sheet {
                    name: workbooks::TIMESERIES_SHEET.to_string(),
                    table,
                }];
            }
            RowLayout::Transect => {
                let (data, points) = composite::transects_in(&self.store.entry(spec.name).raw.data)?;
                self.store.entry(spec.name).sheets = vec![
                    Sheet {
                        name: workbooks::TRANSECTS_DATA.to_string(),
                        table: data,
                    },
                    Sheet {
                        name: workbooks::TRANSECTS_XSECTIONS.to_string(),
                        table: points,
                    },
                ];
            }
            _ => {
                let table = self.build_flat(spec)?;
                self.store.entry(spec.name).table = Some(table);
            }
        }
        Ok(())
    }

    fn build_flat(&mut self, spec: &SectionSpec) -> SwmmResult<Table> {
        let ctx = self.layout_context()?;
        let columns = spec.columns.unwrap_or_default();
        let field = self.options.annotation_field.as_str();
        let state = self.store.entry(spec.name);
        let rows = layouts::import_rows(spec.name, spec.layout, &state.raw.data, &ctx)?;
        let annotation = spec.geometry.map(|_| AnnotationColumn {
            field,
            annotations: &state.raw.annotations,
        });
        let mut table = build_table(spec.name, columns, rows, annotation)?;
        if state.raw.dangling_annotations > 0 {
            self.diagnostics.add_warning(
                "annotation",
                &format!("[{}] ends with a comment that belongs to no object", spec.name),
            );
        }

        match spec.join_style {
            JoinStyle::ByName => {
                for dep in spec.joins {
                    let satellite = self.processed_table(dep)?;
                    table = table.left_join(satellite)?;
                    debug!(section = spec.name, satellite = dep, "joined satellite");
                }
            }
            JoinStyle::Pollutant => {
                if let [buildup, washoff] = spec.joins {
                    table = quality::join_landuses(
                        &table,
                        self.processed_table(buildup)?,
                        self.processed_table(washoff)?,
                    )?;
                }
            }
        }
        if let Some(reshape) = spec.reshape {
            table.drop_columns(reshape.drop);
            table.rename_columns(reshape.rename);
        }
        Ok(table)
    }

    fn processed_table(&self, name: &str) -> SwmmResult<&Table> {
        self.store
            .table(name)
            .ok_or_else(|| SwmmError::Other(format!("[{name}] was not processed")))
    }

    fn attach_geometry(&mut self, spec: &SectionSpec) -> SwmmResult<()> {
        let Some(kind) = spec.geometry else {
            return Ok(());
        };
        let empty = Table::default();
        let index = |name: Option<&&str>| {
            name.and_then(|n| self.store.table(n))
                .map(VertexIndex::from_table)
                .unwrap_or_else(|| VertexIndex::from_table(&empty))
        };
        // links read endpoints from the first source and vertices from the second
        let sources = spec.geometry_sources;
        let coords = index(sources.first());
        let vertices = index(sources.get(1).or(sources.first()));
        let buffer = BufferParams {
            radius: self.options.polygon_buffer_radius,
            segments_per_quarter: self.options.polygon_buffer_segments,
        };
        let table = self.processed_table(spec.name)?.clone();
        let geometries = geometry::attach(
            spec.name,
            kind,
            &table,
            &coords,
            &vertices,
            buffer,
            &mut self.diagnostics,
        )?;
        self.store.entry(spec.name).geometries = geometries;
        Ok(())
    }

    /// Main infiltration method: OPTIONS `INFILTRATION`, else the configured
    /// default.
    fn layout_context(&self) -> SwmmResult<LayoutContext> {
        let declared = self.store.table("OPTIONS").and_then(|options| {
            (0..options.len())
                .find(|&i| {
                    options
                        .value(i, "Option")
                        .as_str()
                        .is_some_and(|o| o.eq_ignore_ascii_case("INFILTRATION"))
                })
                .and_then(|i| options.value(i, "Value").key())
        });
        let method = declared.unwrap_or_else(|| self.options.default_infiltration.clone());
        Ok(LayoutContext {
            main_infiltration: method.parse::<InfiltrationMethod>()?,
        })
    }

    /// Format and description of every rain gage reading a time series,
    /// keyed by series name.
    fn gage_series(&self) -> HashMap<String, GageSeries> {
        let mut out = HashMap::new();
        let Some(gages) = self.store.table("RAINGAGES") else {
            return out;
        };
        let description = self.options.annotation_field.as_str();
        for i in 0..gages.len() {
            let reads_series = gages
                .value(i, "DataSource")
                .as_str()
                .is_some_and(|s| s.eq_ignore_ascii_case("TIMESERIES"));
            if let (true, Some(series)) = (reads_series, gages.value(i, "SeriesName").key()) {
                out.entry(series).or_insert_with(|| GageSeries {
                    format: gages.value(i, "Format").key(),
                    description: gages.value(i, description).key(),
                });
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feedback::testing::RecordingFeedback;
    use swmm_core::Value;
    use crate::inp::lexer::lex_document;
    use swmm_core::registry;

    const MODEL: &str = "\
[JUNCTIONS]
J1 10
J2 9

[CONDUITS]
C1 J1 J2 100 0.01
W0 J1 J2 50 0.01

[XSECTIONS]
C1 CIRCULAR 1

[COORDINATES]
J1 0 0
J2 10 0
";

    fn resolver<'a>(
        text: &str,
        options: &'a ImportOptions,
        feedback: &'a mut RecordingFeedback,
    ) -> Resolver<'a> {
        let reg = registry().unwrap();
        let store = SectionStore::from_document(lex_document(text, reg));
        Resolver::new(reg, store, options, feedback)
    }

    #[test]
    fn test_join_totality_and_memoization() {
        let options = ImportOptions::default();
        let mut feedback = RecordingFeedback::default();
        let mut r = resolver(MODEL, &options, &mut feedback);

        let conduits = r.resolve("CONDUITS", ProcessingStatus::GeomReady).unwrap();
        let table = conduits.table.clone().unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.value(0, "Shape"), &Value::text("CIRCULAR"));
        assert!(table.value(1, "Shape").is_null());
        assert!(table.value(1, "Kentry").is_null());
        assert_eq!(conduits.geometries.len(), 2);
        assert_eq!(conduits.passes(), 2);

        let xsections_passes = r.store().get("XSECTIONS").unwrap().passes();
        r.resolve("CONDUITS", ProcessingStatus::GeomReady).unwrap();
        r.resolve("XSECTIONS", ProcessingStatus::Processed).unwrap();
        assert_eq!(r.store().get("CONDUITS").unwrap().passes(), 2);
        assert_eq!(r.store().get("XSECTIONS").unwrap().passes(), xsections_passes);
        assert_eq!(r.store().get("CONDUITS").unwrap().table.as_ref(), Some(&table));
    }

    #[test]
    fn test_non_geometric_sections_stop_at_processed() {
        let options = ImportOptions::default();
        let mut feedback = RecordingFeedback::default();
        let mut r = resolver(MODEL, &options, &mut feedback);
        let state = r.resolve("XSECTIONS", ProcessingStatus::GeomReady).unwrap();
        assert_eq!(state.status, ProcessingStatus::Processed);
    }

    #[test]
    fn test_infiltration_follows_options() {
        let text = "[OPTIONS]\nINFILTRATION GREEN_AMPT\n\n[INFILTRATION]\nS1 3.5 0.5 0.25\n";
        let options = ImportOptions::default();
        let mut feedback = RecordingFeedback::default();
        let mut r = resolver(text, &options, &mut feedback);
        let table = r
            .resolve("INFILTRATION", ProcessingStatus::Processed)
            .unwrap()
            .table
            .clone()
            .unwrap();
        assert_eq!(table.value(0, "InfMethod"), &Value::text("GREEN_AMPT"));
        assert_eq!(table.value(0, "SuctHead"), &Value::Double(3.5));
        assert!(table.value(0, "MaxRate").is_null());
    }

    #[test]
    fn test_cancellation_between_sections() {
        let options = ImportOptions::default();
        let mut feedback = RecordingFeedback {
            cancel_after: Some(1),
            ..Default::default()
        };
        let mut r = resolver(MODEL, &options, &mut feedback);
        let err = r.resolve("CONDUITS", ProcessingStatus::GeomReady).unwrap_err();
        assert!(matches!(err, SwmmError::Canceled));
    }

    #[test]
    fn test_progress_text_names_section() {
        let options = ImportOptions::default();
        let mut feedback = RecordingFeedback::default();
        {
            let mut r = resolver(MODEL, &options, &mut feedback);
            r.resolve("JUNCTIONS", ProcessingStatus::GeomReady).unwrap();
        }
        assert!(feedback.texts.contains(&"Preparing section \"JUNCTIONS\"".to_string()));
    }
}
