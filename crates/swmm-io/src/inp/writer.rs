//! Text emitter for the sectioned input format.

use std::collections::BTreeMap;
use std::fmt::Write as _;

use swmm_core::{SchemaRegistry, SwmmResult};

use super::records::Fields;

/// One data line plus the annotation written above it.
#[derive(Debug, Clone, PartialEq)]
pub struct OutRow {
    pub annotation: Option<String>,
    pub fields: Fields,
}

impl OutRow {
    pub fn new(fields: Fields) -> Self {
        Self {
            annotation: None,
            fields,
        }
    }

    pub fn annotated(fields: Fields, annotation: Option<String>) -> Self {
        Self { annotation, fields }
    }

    /// Row of already rendered tokens.
    pub fn tokens<I, S>(tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(tokens.into_iter().map(|t| Some(t.into())).collect())
    }
}

#[derive(Debug)]
enum Body {
    Rows(Vec<OutRow>),
    Lines(Vec<String>),
}

#[derive(Debug)]
struct OutSection {
    name: &'static str,
    header: Vec<&'static str>,
    body: Body,
}

impl OutSection {
    fn is_empty(&self) -> bool {
        match &self.body {
            Body::Rows(rows) => rows.is_empty(),
            Body::Lines(lines) => lines.iter().all(|l| l.trim().is_empty()),
        }
    }
}

/// Sections collected for writing, kept in canonical order.
#[derive(Debug)]
pub struct InpDocument<'r> {
    registry: &'r SchemaRegistry,
    sections: BTreeMap<usize, OutSection>,
}

impl<'r> InpDocument<'r> {
    pub fn new(registry: &'r SchemaRegistry) -> Self {
        Self {
            registry,
            sections: BTreeMap::new(),
        }
    }

    fn section_mut(&mut self, name: &str, lines: bool) -> SwmmResult<&mut OutSection> {
        let spec = self.registry.require(name)?;
        let rank = self.registry.rank(spec.name).unwrap_or(usize::MAX);
        Ok(self.sections.entry(rank).or_insert_with(|| OutSection {
            name: spec.name,
            header: header_for(spec.name, spec.column_names()),
            body: if lines {
                Body::Lines(Vec::new())
            } else {
                Body::Rows(Vec::new())
            },
        }))
    }

    /// Append data rows to `section`.
    pub fn push_rows<I>(&mut self, section: &str, rows: I) -> SwmmResult<()>
    where
        I: IntoIterator<Item = OutRow>,
    {
        if let Body::Rows(existing) = &mut self.section_mut(section, false)?.body {
            existing.extend(rows);
        }
        Ok(())
    }

    /// Append raw lines to a free-form section.
    pub fn push_lines(&mut self, section: &str, lines: &[String]) -> SwmmResult<()> {
        if let Body::Lines(existing) = &mut self.section_mut(section, true)?.body {
            existing.extend(lines.iter().cloned());
        }
        Ok(())
    }

    /// Non-empty sections in write order.
    pub fn section_names(&self) -> Vec<&'static str> {
        self.sections
            .values()
            .filter(|s| !s.is_empty())
            .map(|s| s.name)
            .collect()
    }

    /// Render all non-empty sections. Every field but the last of a line is
    /// left-aligned to `column_width`.
    pub fn render(&self, column_width: usize) -> String {
        let mut out = String::new();
        for section in self.sections.values().filter(|s| !s.is_empty()) {
            if !out.is_empty() {
                out.push('\n');
            }
            let _ = writeln!(out, "[{}]", section.name);
            match &section.body {
                Body::Lines(lines) => {
                    for line in lines {
                        let _ = writeln!(out, "{line}");
                    }
                }
                Body::Rows(rows) => {
                    if !section.header.is_empty() {
                        let header: Vec<String> =
                            section.header.iter().map(|h| h.to_string()).collect();
                        let _ = writeln!(out, ";;{}", pad_line(&header, column_width));
                    }
                    for row in rows {
                        for note in annotation_lines(row.annotation.as_deref()) {
                            let _ = writeln!(out, ";{note}");
                        }
                        let _ = writeln!(out, "{}", pad_line(&line_tokens(&row.fields), column_width));
                    }
                }
            }
        }
        out
    }
}

/// Comment lines of an annotation, one per non-blank line of the text.
fn annotation_lines(annotation: Option<&str>) -> impl Iterator<Item = &str> {
    annotation
        .into_iter()
        .flat_map(|text| text.split(['\r', '\n']))
        .map(str::trim)
        .filter(|line| !line.is_empty())
}

/// Tokens of one line: trailing empty slots are dropped, interior ones
/// become `*`.
pub fn line_tokens(fields: &Fields) -> Vec<String> {
    let end = fields
        .iter()
        .rposition(|f| f.as_deref().is_some_and(|s| !s.is_empty()))
        .map(|i| i + 1)
        .unwrap_or(0);
    fields[..end]
        .iter()
        .map(|f| match f.as_deref() {
            Some(s) if !s.is_empty() => quote(s),
            _ => "*".to_string(),
        })
        .collect()
}

fn quote(token: &str) -> String {
    if token.contains(char::is_whitespace) && !token.starts_with('"') {
        format!("\"{token}\"")
    } else {
        token.to_string()
    }
}

fn pad_line(tokens: &[String], width: usize) -> String {
    let mut line = String::new();
    let last = tokens.len().saturating_sub(1);
    for (i, token) in tokens.iter().enumerate() {
        if i == last {
            line.push_str(token);
        } else {
            let _ = write!(line, "{token:<width$} ");
        }
    }
    line
}

fn header_for(section: &str, columns: Vec<&'static str>) -> Vec<&'static str> {
    match section {
        "CURVES" => vec!["Name", "Type", "X-Value", "Y-Value"],
        "TIMESERIES" => vec!["Name", "Date", "Time", "Value"],
        "PATTERNS" => vec!["Name", "Type", "Multipliers"],
        "TRANSECTS" => Vec::new(),
        "RAINGAGES" => vec!["Name", "Format", "Interval", "SCF", "Source"],
        _ => columns,
    }
}
