//! Line extraction for the sectioned input format.
//!
//! Splits a document into sections at `[NAME]` headers, drops blank lines
//! and `;;` header comments, attaches `;` comment blocks to the object named
//! on the following line, and tokenizes data lines with `"`-quoting.

use std::collections::HashMap;

use swmm_core::SchemaRegistry;
use tracing::{debug, warn};

/// One section as found in the document, before any typing.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawSection {
    pub name: String,
    /// Content lines as written (comments included), for free-form sections.
    pub lines: Vec<String>,
    /// Token rows of the data lines.
    pub data: Vec<Vec<String>>,
    /// Object name to annotation text.
    pub annotations: HashMap<String, String>,
    /// Comment blocks that had no data line after them.
    pub dangling_annotations: usize,
}

impl RawSection {
    pub fn empty(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Self::default()
        }
    }

    pub fn n_objects(&self) -> usize {
        self.data.len()
    }
}

/// Sections in document order, plus headers the registry does not know.
#[derive(Debug, Default)]
pub struct LexedDocument {
    pub sections: Vec<RawSection>,
    pub unknown_sections: Vec<String>,
}

/// Split `text` into raw sections. Header names are matched against the
/// registry case-insensitively and normalised to the registered spelling;
/// a repeated header continues the earlier section.
pub fn lex_document(text: &str, registry: &SchemaRegistry) -> LexedDocument {
    let mut doc = LexedDocument::default();
    let mut by_name: HashMap<String, Vec<String>> = HashMap::new();
    let mut order: Vec<String> = Vec::new();
    let mut current: Option<String> = None;

    for line in text.lines() {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with(";;") {
            continue;
        }
        if let Some(header) = section_header(trimmed) {
            current = registry
                .iter()
                .find(|s| s.name.eq_ignore_ascii_case(header))
                .map(|s| s.name.to_string());
            match &current {
                Some(name) if !by_name.contains_key(name) => {
                    order.push(name.clone());
                    by_name.insert(name.clone(), Vec::new());
                }
                Some(_) => {}
                None => {
                    warn!(section = header, "skipping unknown section");
                    doc.unknown_sections.push(header.to_string());
                }
            }
            continue;
        }
        if let Some(lines) = current.as_ref().and_then(|name| by_name.get_mut(name)) {
            lines.push(line.trim_end().to_string());
        }
    }

    for name in order {
        let lines = by_name.remove(&name).unwrap_or_default();
        let section = extract_section(&name, lines);
        debug!(
            section = %section.name,
            objects = section.n_objects(),
            annotations = section.annotations.len(),
            "extracted section"
        );
        doc.sections.push(section);
    }
    doc
}

fn section_header(line: &str) -> Option<&str> {
    line.strip_prefix('[')
        .and_then(|rest| rest.strip_suffix(']'))
        .map(str::trim)
}

/// Tokenize the lines of one section and collect its annotations.
pub fn extract_section(name: &str, lines: Vec<String>) -> RawSection {
    let mut section = RawSection::empty(name);
    let mut block: Vec<&str> = Vec::new();

    for line in &lines {
        let trimmed = line.trim();
        if let Some(comment) = trimmed.strip_prefix(';') {
            block.push(comment.trim());
            continue;
        }
        let tokens = tokenize(trimmed);
        if tokens.is_empty() {
            continue;
        }
        if !block.is_empty() {
            let text = block
                .iter()
                .filter(|s| !s.is_empty())
                .copied()
                .collect::<Vec<_>>()
                .join(" ");
            if !text.is_empty() {
                section.annotations.insert(tokens[0].clone(), text);
            }
            block.clear();
        }
        section.data.push(tokens);
    }
    if !block.is_empty() {
        section.dangling_annotations += 1;
    }
    section.lines = lines;
    section
}

/// Whitespace tokens of a data line. A token starting with `;` ends the
/// line; `"`-quoted runs are re-joined with single spaces.
pub fn tokenize(line: &str) -> Vec<String> {
    let mut tokens: Vec<&str> = Vec::new();
    let mut quoted = false;
    for token in line.split_whitespace() {
        if !quoted && token.starts_with(';') {
            break;
        }
        tokens.push(token);
        if quoted {
            quoted = !token.ends_with('"');
        } else if token.starts_with('"') {
            quoted = token.len() == 1 || !token.ends_with('"');
        }
    }
    concat_quoted(&tokens)
}

/// Re-join tokens that belong to one quoted field.
fn concat_quoted(tokens: &[&str]) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    let mut open = false;
    for &token in tokens {
        if open {
            if let Some(last) = out.last_mut() {
                last.push(' ');
                last.push_str(token);
            }
            if token.ends_with('"') {
                open = false;
            }
        } else {
            out.push(token.to_string());
            if token.starts_with('"') && (token.len() == 1 || !token.ends_with('"')) {
                open = true;
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use swmm_core::registry;

    fn lines(text: &str) -> Vec<String> {
        text.lines().map(String::from).collect()
    }

    #[test]
    fn test_annotation_block_attaches_to_next_object() {
        let raw = extract_section("JUNCTIONS", lines(";desc line1\n;desc line2\nOBJ1 10 20"));
        assert_eq!(raw.annotations["OBJ1"], "desc line1 desc line2");
        assert_eq!(raw.data, vec![vec!["OBJ1", "10", "20"]]);
        assert_eq!(raw.n_objects(), 1);
    }

    #[test]
    fn test_trailing_and_blank_annotations_are_dropped() {
        let raw = extract_section("JUNCTIONS", lines(";\nJ1 1\nJ2 2\n;orphan"));
        assert!(raw.annotations.is_empty());
        assert_eq!(raw.dangling_annotations, 1);
    }

    #[test]
    fn test_quoted_tokens_are_rejoined() {
        assert_eq!(
            tokenize("TS1 FILE \"C:/my data/rain.dat\""),
            vec!["TS1", "FILE", "\"C:/my data/rain.dat\""]
        );
        assert_eq!(tokenize("J1 FLOW \"\" FLOW 1"), vec!["J1", "FLOW", "\"\"", "FLOW", "1"]);
        assert_eq!(tokenize("A \" b \" c"), vec!["A", "\" b \"", "c"]);
    }

    #[test]
    fn test_inline_comment_ends_line() {
        assert_eq!(tokenize("J1 10 ;note"), vec!["J1", "10"]);
    }

    #[test]
    fn test_lex_document_splits_sections() {
        let text = "[TITLE]\nDemo model\n\n[JUNCTIONS]\n;;Name Elev\nJ1 10\n[polygons]\nS1 0 0\n[NOPE]\nx y\n";
        let doc = lex_document(text, registry().unwrap());
        let names: Vec<_> = doc.sections.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["TITLE", "JUNCTIONS", "Polygons"]);
        assert_eq!(doc.sections[0].lines, vec!["Demo model"]);
        assert_eq!(doc.sections[1].data, vec![vec!["J1", "10"]]);
        assert_eq!(doc.unknown_sections, vec!["NOPE"]);
    }

    #[test]
    fn test_empty_section_has_no_objects() {
        let doc = lex_document("[CONDUITS]\n;;header only\n", registry().unwrap());
        assert_eq!(doc.sections.len(), 1);
        assert_eq!(doc.sections[0].n_objects(), 0);
    }
}
