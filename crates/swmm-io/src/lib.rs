//! # swmm-io: SWMM input file conversion
//!
//! Converts a SWMM 5 input file into georeferenced layers plus auxiliary
//! sheets, and writes such a model back to input file text.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::path::Path;
//! use swmm_io::{export_inp, import_inp_file, ExportOptions, ImportOptions, LogFeedback};
//!
//! fn main() -> anyhow::Result<()> {
//!     let mut feedback = LogFeedback::new();
//!     let imported = import_inp_file(Path::new("model.inp"), &ImportOptions::default(), &mut feedback)?;
//!     for layer in &imported.model.layers {
//!         println!("{}: {} features", layer.name, layer.len());
//!     }
//!
//!     let exported = export_inp(&imported.model, &ExportOptions::default(), &mut feedback)?;
//!     std::fs::write("roundtrip.inp", exported.text)?;
//!     Ok(())
//! }
//! ```
//!
//! ## Module Overview
//!
//! - [`import`]: input text → [`Model`] (layers, workbooks, verbatim sections)
//! - [`export`]: [`Model`] → input text
//! - [`inp`]: lexer, section store, dependency resolver, row layouts, writer
//! - [`model`]: the exchange types handed to and from the host
//! - [`feedback`]: progress and cancellation seam
//! - [`diagnostics`]: non-fatal issues and run statistics
//!
//! ## Error Handling
//!
//! Fatal problems surface as [`swmm_core::SwmmError`]; the run aborts and
//! nothing is written. Everything else (dangling annotations, features
//! without coordinates, records for unknown nodes) is logged through
//! `tracing` and collected in [`Diagnostics`].

pub mod diagnostics;
pub mod export;
pub mod feedback;
pub mod import;
pub mod inp;
pub mod model;
pub mod options;


pub use diagnostics::{ConversionIssue, ConversionStats, Diagnostics};
pub use export::{export_inp, write_inp_file, ExportResult};
pub use feedback::{Feedback, LogFeedback, SilentFeedback};
pub use import::{import_inp, import_inp_file, ImportResult};
pub use model::{workbooks, Layer, Model, Sheet, VerbatimSection, Workbook};
pub use options::{ExportOptions, ImportOptions};
