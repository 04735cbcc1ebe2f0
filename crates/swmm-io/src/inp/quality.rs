//! Land uses with their per-pollutant buildup and washoff functions.
//!
//! The `LANDUSES` sheet carries one row per land use and pollutant. Land
//! uses without any pollutant function keep a single row with empty
//! pollutant fields.

use swmm_core::{Column, ColumnSpec, SwmmResult, Table, Value, NAME};

const POLLUTANT: &str = "Pollutant";

/// Fan land uses out over the pollutants named in BUILDUP or WASHOFF, then
/// attach both function sets by `Name` + `Pollutant`.
pub fn join_landuses(landuses: &Table, buildup: &Table, washoff: &Table) -> SwmmResult<Table> {
    let mut columns: Vec<Column> = landuses.columns().to_vec();
    columns.push(Column::new(POLLUTANT, swmm_core::ColumnKind::String));
    let mut fanned = Table::new(columns);
    for i in 0..landuses.len() {
        let name = landuses.value(i, NAME).key().unwrap_or_default();
        let mut pollutants = buildup.filter_eq(NAME, &name).distinct(POLLUTANT);
        for p in washoff.filter_eq(NAME, &name).distinct(POLLUTANT) {
            if !pollutants.contains(&p) {
                pollutants.push(p);
            }
        }
        let base = landuses.rows()[i].clone();
        if pollutants.is_empty() {
            fanned.push_row(base);
            continue;
        }
        for p in pollutants {
            let mut row = base.clone();
            row.push(Value::text(p));
            fanned.push_row(row);
        }
    }
    let keys = [NAME, POLLUTANT];
    fanned.left_join_on(buildup, &keys)?.left_join_on(washoff, &keys)
}

/// Split the joined sheet back into LANDUSES, BUILDUP and WASHOFF tables.
/// Only rows carrying a buildup (or washoff) function produce a BUILDUP
/// (or WASHOFF) row.
pub fn split_landuses(
    sheet: &Table,
    landuses: &[ColumnSpec],
    buildup: &[ColumnSpec],
    washoff: &[ColumnSpec],
) -> SwmmResult<(Table, Table, Table)> {
    let mut first_rows = Table::new(sheet.columns().to_vec());
    let mut seen: Vec<String> = Vec::new();
    for (i, row) in sheet.rows().iter().enumerate() {
        let Some(name) = sheet.value(i, NAME).key().filter(|n| n != ";") else {
            continue;
        };
        if !seen.contains(&name) {
            seen.push(name);
            first_rows.push_row(row.clone());
        }
    }
    let with_function = |column: &str| {
        let mut out = Table::new(sheet.columns().to_vec());
        for (i, row) in sheet.rows().iter().enumerate() {
            let named = sheet.value(i, NAME).key().is_some_and(|n| n != ";");
            let has_pollutant = !sheet.value(i, POLLUTANT).is_null();
            if named && has_pollutant && !sheet.value(i, column).is_null() {
                out.push_row(row.clone());
            }
        }
        out
    };
    Ok((
        first_rows.project(landuses, "LANDUSES")?,
        with_function("BuildupFunc").project(buildup, "BUILDUP")?,
        with_function("WashoffFunc").project(washoff, "WASHOFF")?,
    ))
}
