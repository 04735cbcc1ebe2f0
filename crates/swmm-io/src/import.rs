//! Import orchestrator: input file text to layers, sheets and verbatim
//! sections.

use std::path::Path;

use swmm_core::{registry, ProcessingStatus, SwmmError, SwmmResult, Table};
use tracing::{info, warn};

use crate::diagnostics::Diagnostics;
use crate::feedback::{percent, Feedback};
use crate::inp::lexer::lex_document;
use crate::inp::resolve::Resolver;
use crate::inp::store::SectionStore;
use crate::model::{workbooks, Layer, Model, Sheet, VerbatimSection, Workbook};
use crate::options::ImportOptions;

/// Result of an import: the model plus everything that was not fatal.
#[derive(Debug)]
pub struct ImportResult {
    pub model: Model,
    pub diagnostics: Diagnostics,
}

/// Read an input file from disk and import it.
pub fn import_inp_file(
    path: &Path,
    options: &ImportOptions,
    feedback: &mut dyn Feedback,
) -> SwmmResult<ImportResult> {
    let text = std::fs::read_to_string(path)?;
    import_inp(&text, options, feedback)
}

/// Convert input file text into layers and sheets.
///
/// Every geometric section present in the text becomes a layer. All
/// auxiliary workbooks are produced, with empty sheets where the text has no
/// data, so that a host can hand them back unchanged on export.
pub fn import_inp(
    text: &str,
    options: &ImportOptions,
    feedback: &mut dyn Feedback,
) -> SwmmResult<ImportResult> {
    let registry = registry()?;
    let doc = lex_document(text, registry);

    let mut lexed = Diagnostics::new();
    for name in &doc.unknown_sections {
        lexed.add_warning("section", &format!("unknown section [{name}] skipped"));
    }
    let n_sections = doc.sections.len();
    let n_objects: usize = doc.sections.iter().map(|s| s.n_objects()).sum();
    info!(sections = n_sections, objects = n_objects, "importing model");

    let store = SectionStore::from_document(doc);
    let mut resolver = Resolver::new(registry, store, options, feedback);
    let layer_specs: Vec<_> = registry
        .layers()
        .filter(|spec| resolver.store().contains(spec.name))
        .collect();
    let total_steps = layer_specs.len() + workbooks::ALL.len();

    let mut layers = Vec::new();
    for (step, spec) in layer_specs.iter().enumerate() {
        let state = resolver.resolve(spec.name, ProcessingStatus::GeomReady)?;
        let (Some(kind), Some(table)) = (spec.geometry, state.table.clone()) else {
            continue;
        };
        layers.push(Layer {
            section: spec.name.to_string(),
            name: spec.layer_name.unwrap_or(spec.name).to_string(),
            kind,
            table,
            geometries: state.geometries.clone(),
        });
        resolver.feedback().set_progress(percent(step + 1, total_steps));
    }

    let mut books = Vec::new();
    for (step, name) in workbooks::ALL.iter().enumerate() {
        if resolver.feedback().is_canceled() {
            return Err(SwmmError::Canceled);
        }
        resolver
            .feedback()
            .set_progress_text(&format!("Writing workbook \"{name}\""));
        books.push(build_workbook(&mut resolver, name)?);
        resolver
            .feedback()
            .set_progress(percent(layer_specs.len() + step + 1, total_steps));
    }

    let verbatim = registry
        .iter()
        .filter(|spec| spec.is_free_form())
        .filter_map(|spec| resolver.store().get(spec.name).filter(|s| s.present))
        .map(|state| VerbatimSection {
            section: state.raw.name.clone(),
            lines: state.raw.lines.clone(),
        })
        .collect();

    let mut diagnostics = lexed;
    diagnostics.merge(resolver.into_diagnostics());
    diagnostics.stats.sections = n_sections;
    diagnostics.stats.objects = n_objects;
    diagnostics.stats.layers = layers.len();
    diagnostics.stats.sheets = books.iter().map(|b: &Workbook| b.sheets.len()).sum();
    if diagnostics.has_issues() {
        warn!(issues = diagnostics.warning_count(), "import finished with warnings");
    }

    Ok(ImportResult {
        model: Model {
            crs: options.crs.clone(),
            layers,
            workbooks: books,
            verbatim,
        },
        diagnostics,
    })
}

fn processed_table(resolver: &mut Resolver<'_>, section: &str) -> SwmmResult<Table> {
    let state = resolver.resolve(section, ProcessingStatus::Processed)?;
    Ok(state.table.clone().unwrap_or_default())
}

fn processed_sheets(resolver: &mut Resolver<'_>, section: &str) -> SwmmResult<Vec<Sheet>> {
    Ok(resolver
        .resolve(section, ProcessingStatus::Processed)?
        .sheets
        .clone())
}

fn build_workbook(resolver: &mut Resolver<'_>, name: &str) -> SwmmResult<Workbook> {
    let mut book = Workbook::new(name);
    // sheet name, section
    let flat: &[(&str, &str)] = match name {
        workbooks::OPTIONS => &[("OPTIONS", "OPTIONS")],
        workbooks::INFLOWS => &[
            (workbooks::INFLOWS_DIRECT, "INFLOWS"),
            (workbooks::INFLOWS_DRY_WEATHER, "DWF"),
        ],
        workbooks::QUALITY => &[
            ("POLLUTANTS", "POLLUTANTS"),
            ("LANDUSES", "LANDUSES"),
            ("COVERAGES", "COVERAGES"),
            ("LOADINGS", "LOADINGS"),
        ],
        workbooks::STREETS => &[
            ("STREETS", "STREETS"),
            ("INLETS", "INLETS"),
            ("INLET_USAGE", "INLET_USAGE"),
        ],
        _ => &[],
    };
    for (sheet, section) in flat {
        let table = processed_table(resolver, section)?;
        book.push(sheet, table);
    }

    let composite = match name {
        workbooks::CURVES => Some("CURVES"),
        workbooks::PATTERNS => Some("PATTERNS"),
        workbooks::TIMESERIES => Some("TIMESERIES"),
        workbooks::TRANSECTS => Some("TRANSECTS"),
        _ => None,
    };
    if let Some(section) = composite {
        book.sheets.extend(processed_sheets(resolver, section)?);
    }
    Ok(book)
}
