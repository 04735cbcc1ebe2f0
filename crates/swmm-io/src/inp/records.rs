//! Record builder: token rows to typed tables.

use std::collections::HashMap;

use swmm_core::{Column, ColumnKind, ColumnSpec, SwmmError, SwmmResult, Table, Value, NAME};

/// One row of positional fields; `None` is a slot with no value.
pub type Fields = Vec<Option<String>>;

pub fn fields(tokens: &[String]) -> Fields {
    tokens.iter().cloned().map(Some).collect()
}

/// Annotation column appended to the built table.
pub struct AnnotationColumn<'a> {
    pub field: &'a str,
    pub annotations: &'a HashMap<String, String>,
}

/// Build the typed table for `section` from layout-shaped rows.
///
/// Rows shorter than `columns` are padded with `Null` in the trailing slots.
/// Surplus fields are folded into a trailing text column, and are an error
/// otherwise. Each cell is coerced to its column kind.
pub fn build_table(
    section: &str,
    columns: &[ColumnSpec],
    rows: Vec<Fields>,
    annotation: Option<AnnotationColumn<'_>>,
) -> SwmmResult<Table> {
    let mut table = Table::from_specs(columns);
    for mut row in rows {
        if row.len() > columns.len() {
            fold_surplus(section, columns, &mut row)?;
        }
        let mut values = Vec::with_capacity(columns.len());
        for (i, spec) in columns.iter().enumerate() {
            let value = match row.get(i).and_then(|f| f.as_deref()) {
                Some(token) => spec.kind.coerce(token).map_err(|msg| {
                    let object = row.first().cloned().flatten().unwrap_or_default();
                    SwmmError::parse(section, format!("{} of '{object}': {msg}", spec.name))
                })?,
                None => Value::Null,
            };
            values.push(value);
        }
        table.push_row(values);
    }

    if let Some(annotation) = annotation {
        let key = if table.has_column(NAME) { NAME } else { columns[0].name };
        let values = (0..table.len())
            .map(|i| {
                table
                    .value(i, key)
                    .key()
                    .and_then(|name| annotation.annotations.get(&name))
                    .map(|text| Value::text(text.as_str()))
                    .unwrap_or_default()
            })
            .collect();
        table.add_column(Column::new(annotation.field, ColumnKind::String), values);
    }
    Ok(table)
}

fn fold_surplus(section: &str, columns: &[ColumnSpec], row: &mut Fields) -> SwmmResult<()> {
    let last = columns.len().saturating_sub(1);
    match columns.last() {
        Some(spec) if spec.kind == ColumnKind::String => {
            let joined = row
                .drain(last..)
                .flatten()
                .collect::<Vec<_>>()
                .join(" ");
            row.push(Some(joined));
            Ok(())
        }
        _ => Err(SwmmError::parse(
            section,
            format!(
                "'{}' has {} fields, expected at most {}",
                row.first().cloned().flatten().unwrap_or_default(),
                row.len(),
                columns.len()
            ),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use swmm_core::registry;

    fn junction_columns() -> &'static [ColumnSpec] {
        registry().unwrap().get("JUNCTIONS").unwrap().columns.unwrap()
    }

    fn row(tokens: &[&str]) -> Fields {
        tokens.iter().map(|t| Some(t.to_string())).collect()
    }

    #[test]
    fn test_padding_law() {
        let table = build_table("JUNCTIONS", junction_columns(), vec![row(&["J1", "10"])], None)
            .unwrap();
        let cells = &table.rows()[0];
        assert_eq!(cells[1], Value::Double(10.0));
        // 6 declared columns, 2 tokens: exactly 4 nulls
        assert_eq!(cells.iter().filter(|v| v.is_null()).count(), 4);
        assert!(cells[2..].iter().all(Value::is_null));
    }

    #[test]
    fn test_star_is_null_not_zero() {
        let table = build_table(
            "JUNCTIONS",
            junction_columns(),
            vec![row(&["J1", "10", "*", "0"])],
            None,
        )
        .unwrap();
        assert_eq!(table.value(0, "MaxDepth"), &Value::Null);
        assert_eq!(table.value(0, "InitDepth"), &Value::Double(0.0));
    }

    #[test]
    fn test_annotation_column() {
        let mut notes = HashMap::new();
        notes.insert("J2".to_string(), "manhole".to_string());
        let table = build_table(
            "JUNCTIONS",
            junction_columns(),
            vec![row(&["J1", "1"]), row(&["J2", "2"])],
            Some(AnnotationColumn {
                field: "Description",
                annotations: &notes,
            }),
        )
        .unwrap();
        assert_eq!(table.value(0, "Description"), &Value::Null);
        assert_eq!(table.value(1, "Description"), &Value::text("manhole"));
    }

    #[test]
    fn test_malformed_number_is_parse_error() {
        let err = build_table("JUNCTIONS", junction_columns(), vec![row(&["J1", "abc"])], None)
            .unwrap_err();
        assert!(err.to_string().contains("[JUNCTIONS]"));
        assert!(err.to_string().contains("Elevation"));
    }

    #[test]
    fn test_surplus_folds_into_text_column() {
        let options = registry().unwrap().get("OPTIONS").unwrap().columns.unwrap();
        let table = build_table(
            "OPTIONS",
            options,
            vec![row(&["TEMPDIR", "C:/a", "b"])],
            None,
        )
        .unwrap();
        assert_eq!(table.value(0, "Value"), &Value::text("C:/a b"));
    }
}
