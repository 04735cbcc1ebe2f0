use serde::Serialize;

/// Non-fatal issues collected while converting. Anything fatal is a
/// `SwmmError` instead and aborts the run.
#[derive(Debug, Clone, Serialize)]
pub struct ConversionIssue {
    pub category: String, // "annotation", "reference", "geometry", "section"
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub section: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub object: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ConversionStats {
    pub sections: usize,
    pub objects: usize,
    pub layers: usize,
    pub sheets: usize,
    pub dropped_records: usize,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct Diagnostics {
    pub stats: ConversionStats,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub issues: Vec<ConversionIssue>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_warning(&mut self, category: &str, message: &str) {
        self.issues.push(ConversionIssue {
            category: category.to_string(),
            message: message.to_string(),
            section: None,
            object: None,
        });
    }

    /// Warning about one object of one section.
    pub fn add_object_warning(&mut self, category: &str, section: &str, object: &str, message: &str) {
        self.issues.push(ConversionIssue {
            category: category.to_string(),
            message: message.to_string(),
            section: Some(section.to_string()),
            object: Some(object.to_string()),
        });
    }

    /// Record a dropped input record (counts towards `dropped_records`).
    pub fn add_dropped(&mut self, section: &str, object: &str, message: &str) {
        self.add_object_warning("reference", section, object, message);
        self.stats.dropped_records += 1;
    }

    pub fn warning_count(&self) -> usize {
        self.issues.len()
    }

    pub fn has_issues(&self) -> bool {
        !self.issues.is_empty()
    }

    pub fn merge(&mut self, other: Diagnostics) {
        self.issues.extend(other.issues);
        self.stats.dropped_records += other.stats.dropped_records;
    }
}
