//! Per-run section state.
//!
//! The store owns every section of one import run. Each section moves
//! forward through RAW → PROCESSED → GEOM_READY and caches what it produced
//! at each step, so repeated requests from sibling sections reuse it.

use std::collections::HashMap;

use swmm_core::{Geometry, ProcessingStatus, Table};

use super::lexer::{LexedDocument, RawSection};
use crate::model::Sheet;

#[derive(Debug, Clone)]
pub struct SectionState {
    pub raw: RawSection,
    pub status: ProcessingStatus,
    /// Typed, joined table once PROCESSED (flat sections).
    pub table: Option<Table>,
    /// Grouped sub-tables once PROCESSED (composite sections).
    pub sheets: Vec<Sheet>,
    /// One geometry per table row once GEOM_READY.
    pub geometries: Vec<Option<Geometry>>,
    /// Whether the section header appeared in the document.
    pub present: bool,
    passes: usize,
}

impl SectionState {
    fn new(raw: RawSection, present: bool) -> Self {
        Self {
            raw,
            status: ProcessingStatus::Raw,
            table: None,
            sheets: Vec::new(),
            geometries: Vec::new(),
            present,
            passes: 0,
        }
    }

    /// Move to `status`; earlier states are never restored.
    pub fn advance(&mut self, status: ProcessingStatus) {
        if status > self.status {
            self.status = status;
            self.passes += 1;
        }
    }

    /// Number of forward transitions taken.
    pub fn passes(&self) -> usize {
        self.passes
    }
}

#[derive(Debug, Default)]
pub struct SectionStore {
    sections: HashMap<String, SectionState>,
    document_order: Vec<String>,
}

impl SectionStore {
    pub fn from_document(doc: LexedDocument) -> Self {
        let mut store = Self::default();
        for raw in doc.sections {
            store.document_order.push(raw.name.clone());
            store
                .sections
                .insert(raw.name.clone(), SectionState::new(raw, true));
        }
        store
    }

    /// Whether the document contained this section.
    pub fn contains(&self, name: &str) -> bool {
        self.sections.get(name).map(|s| s.present).unwrap_or(false)
    }

    pub fn get(&self, name: &str) -> Option<&SectionState> {
        self.sections.get(name)
    }

    /// State of `name`, created empty when the document lacks the section.
    pub fn entry(&mut self, name: &str) -> &mut SectionState {
        self.sections
            .entry(name.to_string())
            .or_insert_with(|| SectionState::new(RawSection::empty(name), false))
    }

    pub fn status(&self, name: &str) -> ProcessingStatus {
        self.sections
            .get(name)
            .map(|s| s.status)
            .unwrap_or(ProcessingStatus::Raw)
    }

    pub fn table(&self, name: &str) -> Option<&Table> {
        self.sections.get(name).and_then(|s| s.table.as_ref())
    }

    /// Section names in the order the document declared them.
    pub fn document_order(&self) -> &[String] {
        &self.document_order
    }
}
