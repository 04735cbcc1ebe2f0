//! Typed, column-ordered tables keyed by object name.
//!
//! A [`Table`] is the unit every stage of the pipeline hands to the next:
//! the record builder produces one per section, the join engine merges them,
//! and external writers persist them as layer attributes or sheets.

use std::collections::HashMap;

use crate::error::{SwmmError, SwmmResult};
use crate::schema::ColumnSpec;
use crate::value::{ColumnKind, Value};

/// Key column shared by every object section.
pub const NAME: &str = "Name";

#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub name: String,
    pub kind: ColumnKind,
}

impl Column {
    pub fn new(name: impl Into<String>, kind: ColumnKind) -> Self {
        Self {
            name: name.into(),
            kind,
        }
    }
}

impl From<&ColumnSpec> for Column {
    fn from(spec: &ColumnSpec) -> Self {
        Column::new(spec.name, spec.kind)
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Table {
    columns: Vec<Column>,
    rows: Vec<Vec<Value>>,
}

impl Table {
    pub fn new(columns: Vec<Column>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    pub fn from_specs(specs: &[ColumnSpec]) -> Self {
        Self::new(specs.iter().map(Column::from).collect())
    }

    /// Untyped table: every column is a string.
    pub fn from_names<S: AsRef<str>>(names: &[S]) -> Self {
        Self::new(
            names
                .iter()
                .map(|n| Column::new(n.as_ref(), ColumnKind::String))
                .collect(),
        )
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name == name)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column_index(name).is_some()
    }

    pub fn rows(&self) -> &[Vec<Value>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Append a row; short rows are padded with `Null`, long rows truncated.
    pub fn push_row(&mut self, mut row: Vec<Value>) {
        row.resize(self.columns.len(), Value::Null);
        self.rows.push(row);
    }

    /// Cell by row index and column name; `Null` when either is absent.
    pub fn value(&self, row: usize, column: &str) -> &Value {
        const NULL: Value = Value::Null;
        self.column_index(column)
            .and_then(|c| self.rows.get(row).and_then(|r| r.get(c)))
            .unwrap_or(&NULL)
    }

    pub fn set(&mut self, row: usize, column: &str, value: Value) {
        if let Some(c) = self.column_index(column) {
            if let Some(r) = self.rows.get_mut(row) {
                r[c] = value;
            }
        }
    }

    /// Values of the `Name` column, in row order.
    pub fn names(&self) -> Vec<String> {
        (0..self.len())
            .map(|i| self.value(i, NAME).to_string())
            .collect()
    }

    /// First row whose `key` column renders as `key_value`.
    pub fn find(&self, key: &str, key_value: &str) -> Option<usize> {
        let c = self.column_index(key)?;
        self.rows
            .iter()
            .position(|r| r[c].key().as_deref() == Some(key_value))
    }

    pub fn add_column(&mut self, column: Column, values: Vec<Value>) {
        self.columns.push(column);
        let mut values = values.into_iter();
        for row in &mut self.rows {
            row.push(values.next().unwrap_or(Value::Null));
        }
    }

    pub fn drop_columns(&mut self, names: &[&str]) {
        let keep: Vec<bool> = self
            .columns
            .iter()
            .map(|c| !names.contains(&c.name.as_str()))
            .collect();
        let mut flags = keep.iter();
        self.columns.retain(|_| *flags.next().unwrap_or(&true));
        for row in &mut self.rows {
            let mut flags = keep.iter();
            row.retain(|_| *flags.next().unwrap_or(&true));
        }
    }

    pub fn rename_columns(&mut self, pairs: &[(&str, &str)]) {
        for column in &mut self.columns {
            if let Some((_, to)) = pairs.iter().find(|(from, _)| *from == column.name) {
                column.name = to.to_string();
            }
        }
    }

    /// Column names from `required` that this table lacks.
    pub fn missing_columns(&self, required: &[&str]) -> Vec<String> {
        required
            .iter()
            .filter(|name| !self.has_column(name))
            .map(|name| name.to_string())
            .collect()
    }

    /// Project onto `specs`, coercing each cell to the declared kind.
    /// Columns absent from this table come out as `Null`.
    pub fn project(&self, specs: &[ColumnSpec], section: &str) -> SwmmResult<Table> {
        let mut out = Table::from_specs(specs);
        let sources: Vec<Option<usize>> =
            specs.iter().map(|s| self.column_index(s.name)).collect();
        for row in &self.rows {
            let mut projected = Vec::with_capacity(specs.len());
            for (spec, source) in specs.iter().zip(&sources) {
                let value = match source {
                    Some(c) => spec
                        .kind
                        .coerce_value(&row[*c])
                        .map_err(|msg| SwmmError::parse(section, format!("{}: {msg}", spec.name)))?,
                    None => Value::Null,
                };
                projected.push(value);
            }
            out.rows.push(projected);
        }
        Ok(out)
    }

    /// Left join on `Name`. Every row of `self` appears exactly once; rows
    /// without a partner get `Null` in the joined columns.
    pub fn left_join(&self, other: &Table) -> SwmmResult<Table> {
        self.left_join_on(other, &[NAME])
    }

    /// Left join on a composite key (e.g. `Name` + `Pollutant`). When the
    /// satellite holds several rows for one key, the first one wins.
    pub fn left_join_on(&self, other: &Table, keys: &[&str]) -> SwmmResult<Table> {
        let left_keys = self.key_indices(keys)?;
        let right_keys = other.key_indices(keys)?;
        let appended: Vec<usize> = (0..other.columns.len())
            .filter(|i| !right_keys.contains(i))
            .collect();
        for &i in &appended {
            let name = &other.columns[i].name;
            if self.has_column(name) {
                return Err(SwmmError::Other(format!(
                    "join would duplicate column '{name}'"
                )));
            }
        }

        let mut index: HashMap<Vec<String>, usize> = HashMap::new();
        for (i, row) in other.rows.iter().enumerate() {
            if let Some(key) = composite_key(row, &right_keys) {
                index.entry(key).or_insert(i);
            }
        }

        let mut columns = self.columns.clone();
        columns.extend(appended.iter().map(|&i| other.columns[i].clone()));
        let mut joined = Table::new(columns);
        for row in &self.rows {
            let partner = composite_key(row, &left_keys).and_then(|k| index.get(&k));
            let mut out = row.clone();
            for &i in &appended {
                out.push(match partner {
                    Some(&p) => other.rows[p][i].clone(),
                    None => Value::Null,
                });
            }
            joined.rows.push(out);
        }
        Ok(joined)
    }

    fn key_indices(&self, keys: &[&str]) -> SwmmResult<Vec<usize>> {
        keys.iter()
            .map(|k| {
                self.column_index(k)
                    .ok_or_else(|| SwmmError::Other(format!("join key '{k}' not in table")))
            })
            .collect()
    }

    /// Rows whose `column` renders as `value`, as a new table.
    pub fn filter_eq(&self, column: &str, value: &str) -> Table {
        let mut out = Table::new(self.columns.clone());
        if let Some(c) = self.column_index(column) {
            out.rows = self
                .rows
                .iter()
                .filter(|r| r[c].key().as_deref() == Some(value))
                .cloned()
                .collect();
        }
        out
    }

    /// Distinct rendered values of `column`, first-seen order.
    pub fn distinct(&self, column: &str) -> Vec<String> {
        let mut seen = Vec::new();
        for i in 0..self.len() {
            if let Some(k) = self.value(i, column).key() {
                if !seen.contains(&k) {
                    seen.push(k);
                }
            }
        }
        seen
    }
}

fn composite_key(row: &[Value], indices: &[usize]) -> Option<Vec<String>> {
    indices.iter().map(|&i| row[i].key()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(cols: &[&str], rows: &[&[&str]]) -> Table {
        let mut t = Table::from_names(cols);
        for r in rows {
            t.push_row(r.iter().map(|s| Value::from(*s)).collect());
        }
        t
    }

    #[test]
    fn test_left_join_keeps_every_primary_row_once() {
        let conduits = table(&["Name", "FromNode"], &[&["C1", "J1"], &["C2", "J2"]]);
        let xsect = table(
            &["Name", "Shape"],
            &[&["C1", "CIRCULAR"], &["C1", "RECT_OPEN"], &["X9", "DUMMY"]],
        );
        let joined = conduits.left_join(&xsect).unwrap();
        assert_eq!(joined.len(), 2);
        assert_eq!(joined.value(0, "Shape"), &Value::from("CIRCULAR"));
        assert_eq!(joined.value(1, "Shape"), &Value::Null);
    }

    #[test]
    fn test_join_on_composite_key() {
        let buildup = table(
            &["Name", "Pollutant", "C1"],
            &[&["Res", "TSS", "0.5"], &["Res", "Lead", "0.1"]],
        );
        let washoff = table(&["Name", "Pollutant", "WC1"], &[&["Res", "Lead", "2"]]);
        let joined = buildup.left_join_on(&washoff, &["Name", "Pollutant"]).unwrap();
        assert_eq!(joined.value(0, "WC1"), &Value::Null);
        assert_eq!(joined.value(1, "WC1"), &Value::from("2"));
    }

    #[test]
    fn test_join_rejects_duplicate_columns() {
        let a = table(&["Name", "X"], &[&["A", "1"]]);
        let b = table(&["Name", "X"], &[&["A", "2"]]);
        assert!(a.left_join(&b).is_err());
    }

    #[test]
    fn test_drop_and_rename() {
        let mut t = table(&["Name", "Geom1", "Geom4"], &[&["W1", "1.5", "0"]]);
        t.drop_columns(&["Geom4"]);
        t.rename_columns(&[("Geom1", "Height")]);
        assert_eq!(t.column_names(), vec!["Name", "Height"]);
        assert_eq!(t.rows()[0].len(), 2);
    }

    #[test]
    fn test_push_row_pads_with_null() {
        let mut t = Table::from_names(&["Name", "A", "B"]);
        t.push_row(vec![Value::from("N")]);
        assert_eq!(t.rows()[0], vec![Value::from("N"), Value::Null, Value::Null]);
    }
}
