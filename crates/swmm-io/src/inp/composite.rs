//! Composite sections: curves, patterns, time series and transects.
//!
//! Each of these spreads one object over several lines. On import the lines
//! are grouped by object into sheets; on export the sheets are grouped by
//! object again and written back line by line.

use std::collections::HashMap;

use swmm_core::schema::col;
use swmm_core::{ColumnKind, ColumnSpec, SwmmError, SwmmResult, Table, Value};

use super::records::{build_table, Fields};
use super::writer::OutRow;
use crate::model::Sheet;

const D: ColumnKind = ColumnKind::Double;
const S: ColumnKind = ColumnKind::String;

/// Curve sheets and the meaning of their x and y columns.
pub const CURVE_TYPES: &[(&str, &str, &str)] = &[
    ("Pump1", "Volume", "Flow"),
    ("Pump2", "Depth", "Flow"),
    ("Pump3", "Head", "Flow"),
    ("Pump4", "Depth", "Flow"),
    ("Storage", "Depth", "Area"),
    ("Rating", "Head/Depth", "Outflow"),
    ("Tidal", "Hour_of_Day", "Stage"),
    ("Control", "Value", "Setting"),
    ("Diversion", "Inflow", "Outflow"),
    ("Shape", "Depth", "Width"),
    ("Weir", "Head", "Coefficient"),
];

/// Pattern sheets, the label column and the positional labels.
pub const PATTERN_TYPES: &[(&str, &str, &[&str])] = &[
    ("HOURLY", "Time", HOURS),
    ("DAILY", "Day", &["So", "Mo", "Tu", "We", "Th", "Fr", "Sa"]),
    (
        "MONTHLY",
        "Month",
        &[
            "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
        ],
    ),
    ("WEEKEND", "Time", HOURS),
];

const HOURS: &[&str] = &[
    "0:00", "1:00", "2:00", "3:00", "4:00", "5:00", "6:00", "7:00", "8:00", "9:00", "10:00",
    "11:00", "12:00", "13:00", "14:00", "15:00", "16:00", "17:00", "18:00", "19:00", "20:00",
    "21:00", "22:00", "23:00",
];

pub const TIMESERIES_COLUMNS: &[ColumnSpec] = &[
    col("Name", S),
    col("Type", S),
    col("Date", ColumnKind::Date),
    col("Time", ColumnKind::Time),
    col("Value", D),
    col("Format", S),
    col("Description", S),
    col("File_Name", S),
];

pub const TRANSECT_DATA_COLUMNS: &[ColumnSpec] = &[
    col("TransectName", S),
    col("RoughnessLeftBank", D),
    col("RoughnessRightBank", D),
    col("RoughnessChannel", D),
    col("BankStationLeft", D),
    col("BankStationRight", D),
    col("ModifierStations", D),
    col("ModifierElevations", D),
    col("ModifierMeander", D),
];

pub const TRANSECT_POINT_COLUMNS: &[ColumnSpec] = &[
    col("TransectName", S),
    col("Station", D),
    col("Elevation", D),
];

/// Type tag for a series referenced by a rain gage.
pub const RAIN_GAGE_SERIES: &str = "rain_gage";

const FACTORS_PER_LINE: usize = 6;
const PAIRS_PER_GR_LINE: usize = 5;

pub fn curve_columns(x: &'static str, y: &'static str) -> [ColumnSpec; 4] {
    [col("Name", S), col(x, D), col(y, D), col("Notes", S)]
}

pub fn pattern_columns(label: &'static str) -> [ColumnSpec; 3] {
    [col("Name", S), col(label, S), col("Factor", D)]
}

fn curve_type(token: &str) -> Option<&'static str> {
    CURVE_TYPES
        .iter()
        .map(|(name, _, _)| *name)
        .find(|name| name.eq_ignore_ascii_case(token))
}

fn pattern_type(token: &str) -> Option<&'static str> {
    PATTERN_TYPES
        .iter()
        .map(|(name, _, _)| *name)
        .find(|name| name.eq_ignore_ascii_case(token))
}

/// Rows of a sheet that describe an object: the key column is set and not
/// a bare `;` placeholder.
pub fn object_rows(table: &Table, key: &str) -> Vec<usize> {
    (0..table.len())
        .filter(|&i| match table.value(i, key).key() {
            Some(k) => k != ";",
            None => false,
        })
        .collect()
}

/// Row indices grouped by key value, groups in first-seen order.
fn grouped(table: &Table, key: &str) -> Vec<(String, Vec<usize>)> {
    let mut groups: Vec<(String, Vec<usize>)> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();
    for i in object_rows(table, key) {
        let name = table.value(i, key).to_string();
        match index.get(&name) {
            Some(&g) => groups[g].1.push(i),
            None => {
                index.insert(name.clone(), groups.len());
                groups.push((name, vec![i]));
            }
        }
    }
    groups
}

fn positional_token(table: &Table, row: usize, column: usize) -> Option<String> {
    table.rows()[row].get(column).and_then(Value::to_token)
}

/// CURVES lines into one sheet per curve type.
pub fn curves_in(rows: &[Vec<String>]) -> SwmmResult<Vec<Sheet>> {
    let mut types: HashMap<&str, &'static str> = HashMap::new();
    for tokens in rows {
        if let (Some(name), Some(kind)) = (tokens.first(), tokens.get(1).and_then(|t| curve_type(t)))
        {
            types.entry(name.as_str()).or_insert(kind);
        }
    }

    let mut by_type: HashMap<&'static str, Vec<Fields>> = HashMap::new();
    for tokens in rows {
        let Some(name) = tokens.first() else { continue };
        let kind = types.get(name.as_str()).copied().ok_or_else(|| {
            SwmmError::parse("CURVES", format!("curve '{name}' has no declared type"))
        })?;
        let skip = if tokens.get(1).and_then(|t| curve_type(t)).is_some() { 2 } else { 1 };
        let values = &tokens[skip.min(tokens.len())..];
        if values.len() % 2 != 0 {
            return Err(SwmmError::parse(
                "CURVES",
                format!("curve '{name}' has an unpaired value"),
            ));
        }
        let target = by_type.entry(kind).or_default();
        for pair in values.chunks(2) {
            target.push(vec![Some(name.clone()), Some(pair[0].clone()), Some(pair[1].clone())]);
        }
    }

    CURVE_TYPES
        .iter()
        .map(|&(kind, x, y)| {
            let rows = by_type.remove(kind).unwrap_or_default();
            Ok(Sheet {
                name: kind.to_string(),
                table: build_table("CURVES", &curve_columns(x, y), rows, None)?,
            })
        })
        .collect()
}

/// One curve sheet back into CURVES lines: `Name Type x y`, then `Name x y`.
pub fn curves_out(kind: &str, table: &Table) -> Vec<OutRow> {
    let mut out = Vec::new();
    for (name, rows) in grouped(table, "Name") {
        for (n, &i) in rows.iter().enumerate() {
            let mut fields: Fields = vec![Some(name.clone())];
            if n == 0 {
                fields.push(Some(kind.to_string()));
            }
            fields.push(positional_token(table, i, 1));
            fields.push(positional_token(table, i, 2));
            out.push(OutRow::new(fields));
        }
    }
    out
}

/// PATTERNS lines into one sheet per pattern type, labelling factors by
/// position.
pub fn patterns_in(rows: &[Vec<String>]) -> SwmmResult<Vec<Sheet>> {
    let mut types: HashMap<&str, &'static str> = HashMap::new();
    let mut factors: Vec<(&str, Vec<String>)> = Vec::new();
    for tokens in rows {
        let Some(name) = tokens.first() else { continue };
        let mut rest = &tokens[1..];
        if let Some(kind) = rest.first().and_then(|t| pattern_type(t)) {
            types.entry(name.as_str()).or_insert(kind);
            rest = &rest[1..];
        }
        match factors.iter_mut().find(|(n, _)| *n == name.as_str()) {
            Some((_, values)) => values.extend(rest.iter().cloned()),
            None => factors.push((name.as_str(), rest.to_vec())),
        }
    }

    let mut by_type: HashMap<&'static str, Vec<Fields>> = HashMap::new();
    for (name, values) in factors {
        let kind = types.get(name).copied().ok_or_else(|| {
            SwmmError::parse("PATTERNS", format!("pattern '{name}' has no declared type"))
        })?;
        let labels = PATTERN_TYPES
            .iter()
            .find(|(k, _, _)| *k == kind)
            .map(|(_, _, labels)| *labels)
            .unwrap_or(HOURS);
        if values.len() > labels.len() {
            return Err(SwmmError::parse(
                "PATTERNS",
                format!(
                    "{kind} pattern '{name}' has {} factors, at most {} allowed",
                    values.len(),
                    labels.len()
                ),
            ));
        }
        let target = by_type.entry(kind).or_default();
        for (label, factor) in labels.iter().zip(values) {
            target.push(vec![Some(name.to_string()), Some(label.to_string()), Some(factor)]);
        }
    }

    PATTERN_TYPES
        .iter()
        .map(|&(kind, label, _)| {
            let rows = by_type.remove(kind).unwrap_or_default();
            Ok(Sheet {
                name: kind.to_string(),
                table: build_table("PATTERNS", &pattern_columns(label), rows, None)?,
            })
        })
        .collect()
}

/// One pattern sheet back into PATTERNS lines, six factors per line.
pub fn patterns_out(kind: &str, table: &Table) -> Vec<OutRow> {
    let mut out = Vec::new();
    for (name, rows) in grouped(table, "Name") {
        let factors: Vec<Option<String>> =
            rows.iter().map(|&i| table.value(i, "Factor").to_token()).collect();
        for (n, chunk) in factors.chunks(FACTORS_PER_LINE).enumerate() {
            let mut fields: Fields = vec![Some(name.clone())];
            if n == 0 {
                fields.push(Some(kind.to_string()));
            }
            fields.extend(chunk.iter().map(|f| f.clone().or_else(|| Some("*".to_string()))));
            out.push(OutRow::new(fields));
        }
    }
    out
}

/// Rain gage fields attached to the series it reads.
#[derive(Debug, Clone, Default)]
pub struct GageSeries {
    pub format: Option<String>,
    pub description: Option<String>,
}

/// TIMESERIES lines into the single series sheet.
///
/// `Name FILE path` references an external file. Otherwise a line is an
/// optional date followed by one or more time/value pairs, each pair
/// becoming one row.
pub fn timeseries_in(
    rows: &[Vec<String>],
    annotations: &HashMap<String, String>,
    gages: &HashMap<String, GageSeries>,
) -> SwmmResult<Table> {
    let mut out: Vec<Fields> = Vec::new();
    for tokens in rows {
        let Some(name) = tokens.first() else { continue };
        let gage = gages.get(name);
        let series_type = gage.map(|_| RAIN_GAGE_SERIES.to_string());
        let format = gage.and_then(|g| g.format.clone());
        let description = annotations
            .get(name)
            .cloned()
            .or_else(|| gage.and_then(|g| g.description.clone()));
        let row = |date: Option<String>, time: Option<String>, value: Option<String>, file| {
            vec![
                Some(name.clone()),
                series_type.clone(),
                date,
                time,
                value,
                format.clone(),
                description.clone(),
                file,
            ]
        };

        if tokens.get(1).is_some_and(|t| t.eq_ignore_ascii_case("FILE")) {
            out.push(row(None, None, None, tokens.get(2).cloned()));
            continue;
        }
        let mut rest = &tokens[1..];
        let mut date = None;
        if rest.first().is_some_and(|t| t.contains('/')) {
            date = Some(rest[0].clone());
            rest = &rest[1..];
        }
        if rest.is_empty() || rest.len() % 2 != 0 {
            return Err(SwmmError::parse(
                "TIMESERIES",
                format!("series '{name}' has an incomplete time/value pair"),
            ));
        }
        for pair in rest.chunks(2) {
            out.push(row(date.clone(), Some(pair[0].clone()), Some(pair[1].clone()), None));
        }
    }
    build_table("TIMESERIES", TIMESERIES_COLUMNS, out, None)
}

/// The series sheet back into TIMESERIES lines. The description is written
/// as annotation of the series' first line unless it merely repeats the
/// description of the gage that reads the series.
pub fn timeseries_out(table: &Table, gage_descriptions: &HashMap<String, String>) -> Vec<OutRow> {
    let mut out = Vec::new();
    for (name, rows) in grouped(table, "Name") {
        let first = rows[0];
        let annotation = table
            .value(first, "Description")
            .to_token()
            .filter(|d| gage_descriptions.get(&name) != Some(d));
        if let Some(file) = rows
            .iter()
            .find_map(|&i| table.value(i, "File_Name").to_token())
        {
            out.push(OutRow::annotated(
                vec![Some(name.clone()), Some("FILE".to_string()), Some(file)],
                annotation,
            ));
            continue;
        }
        for (n, &i) in rows.iter().enumerate() {
            let mut fields: Fields = vec![Some(name.clone())];
            if let Some(date) = table.value(i, "Date").to_token() {
                fields.push(Some(date));
            }
            fields.push(table.value(i, "Time").to_token());
            fields.push(table.value(i, "Value").to_token());
            let note = if n == 0 { annotation.clone() } else { None };
            out.push(OutRow::annotated(fields, note));
        }
    }
    out
}

struct Transect {
    roughness: Vec<Option<String>>,
    header: Vec<String>,
    declared: usize,
    /// Interleaved elevation/station values of all `GR` lines. A pair may
    /// straddle two lines.
    values: Vec<String>,
}

/// TRANSECTS lines (`NC`, `X1`, `GR`) into the `Data` and `XSections`
/// sheets.
pub fn transects_in(rows: &[Vec<String>]) -> SwmmResult<(Table, Table)> {
    let err = |msg: String| SwmmError::parse("TRANSECTS", msg);
    let mut roughness: Vec<Option<String>> = vec![None; 3];
    let mut transects: Vec<Transect> = Vec::new();

    for tokens in rows {
        let keyword = tokens.first().map(|t| t.to_ascii_uppercase()).unwrap_or_default();
        match keyword.as_str() {
            "NC" => roughness = (1..4).map(|i| tokens.get(i).cloned()).collect(),
            "X1" => {
                let name = tokens.get(1).ok_or_else(|| err("X1 line without name".into()))?;
                let declared = tokens
                    .get(2)
                    .and_then(|n| n.parse::<f64>().ok())
                    .map(|n| n as usize)
                    .ok_or_else(|| err(format!("transect '{name}' has no station count")))?;
                transects.push(Transect {
                    roughness: roughness.clone(),
                    header: tokens.clone(),
                    declared,
                    values: Vec::new(),
                });
            }
            "GR" => {
                let current = transects
                    .last_mut()
                    .ok_or_else(|| err("GR line before any X1 line".into()))?;
                current.values.extend(tokens[1..].iter().cloned());
            }
            other => return Err(err(format!("unexpected line type '{other}'"))),
        }
    }

    let mut data: Vec<Fields> = Vec::new();
    let mut points: Vec<Fields> = Vec::new();
    for t in transects {
        let name = t.header[1].clone();
        if t.values.len() < 2 * t.declared {
            return Err(err(format!(
                "transect '{name}' declares {} stations but has {}",
                t.declared,
                t.values.len() / 2
            )));
        }
        let at = |i: usize| t.header.get(i).cloned();
        let mut row: Fields = vec![Some(name.clone())];
        row.extend(t.roughness.iter().cloned());
        // bank stations, then modifiers: stations, elevations, meander
        row.extend([at(3), at(4), at(8), at(9), at(7)]);
        data.push(row);
        for pair in t.values.chunks_exact(2).take(t.declared) {
            points.push(vec![
                Some(name.clone()),
                Some(pair[1].clone()),
                Some(pair[0].clone()),
            ]);
        }
    }
    Ok((
        build_table("TRANSECTS", TRANSECT_DATA_COLUMNS, data, None)?,
        build_table("TRANSECTS", TRANSECT_POINT_COLUMNS, points, None)?,
    ))
}

/// The two transect sheets back into `NC`/`X1`/`GR` lines.
pub fn transects_out(data: &Table, points: &Table) -> Vec<OutRow> {
    let grouped_points = grouped(points, "TransectName");
    let zero = || Some("0".to_string());
    let mut out = Vec::new();
    for i in object_rows(data, "TransectName") {
        let name = data.value(i, "TransectName").to_string();
        let cell = |c: &str| data.value(i, c).to_token().or_else(zero);
        out.push(OutRow::new(vec![
            Some("NC".to_string()),
            cell("RoughnessLeftBank"),
            cell("RoughnessRightBank"),
            cell("RoughnessChannel"),
        ]));

        let rows = grouped_points
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, rows)| rows.as_slice())
            .unwrap_or_default();
        out.push(OutRow::new(vec![
            Some("X1".to_string()),
            Some(name.clone()),
            Some(rows.len().to_string()),
            cell("BankStationLeft"),
            cell("BankStationRight"),
            zero(),
            zero(),
            cell("ModifierMeander"),
            cell("ModifierStations"),
            cell("ModifierElevations"),
        ]));
        for chunk in rows.chunks(PAIRS_PER_GR_LINE) {
            let mut fields: Fields = vec![Some("GR".to_string())];
            for &p in chunk {
                fields.push(points.value(p, "Elevation").to_token().or_else(zero));
                fields.push(points.value(p, "Station").to_token().or_else(zero));
            }
            out.push(OutRow::new(fields));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inp::writer::line_tokens;

    fn lines(text: &str) -> Vec<Vec<String>> {
        text.lines()
            .map(|l| l.split_whitespace().map(String::from).collect())
            .collect()
    }

    fn sheet<'a>(sheets: &'a [Sheet], name: &str) -> &'a Table {
        &sheets.iter().find(|s| s.name == name).unwrap().table
    }

    fn rendered(rows: &[OutRow]) -> Vec<String> {
        rows.iter().map(|r| line_tokens(&r.fields).join(" ")).collect()
    }

    #[test]
    fn test_pump2_curve_scenario() {
        let sheets = curves_in(&lines("PUMP1 Pump2 0 0\nPUMP1 1 5")).unwrap();
        assert_eq!(sheets.len(), CURVE_TYPES.len());
        let pump2 = sheet(&sheets, "Pump2");
        assert_eq!(pump2.column_names(), vec!["Name", "Depth", "Flow", "Notes"]);
        assert_eq!(pump2.len(), 2);
        assert_eq!(pump2.value(1, "Flow"), &Value::Double(5.0));
        assert!(sheet(&sheets, "Storage").is_empty());

        assert_eq!(
            rendered(&curves_out("Pump2", pump2)),
            vec!["PUMP1 Pump2 0 0", "PUMP1 1 5"]
        );
    }

    #[test]
    fn test_curve_type_is_case_insensitive() {
        let sheets = curves_in(&lines("C1 STORAGE 0 10\nC1 2 20")).unwrap();
        assert_eq!(sheet(&sheets, "Storage").len(), 2);
    }

    #[test]
    fn test_undeclared_curve_type_is_an_error() {
        assert!(curves_in(&lines("C9 1 2")).is_err());
    }

    #[test]
    fn test_daily_pattern_labels() {
        let sheets = patterns_in(&lines("P1 DAILY 1 1 1 1\nP1 1.2 1.2 0.8")).unwrap();
        let daily = sheet(&sheets, "DAILY");
        assert_eq!(daily.len(), 7);
        assert_eq!(daily.value(0, "Day"), &Value::text("So"));
        assert_eq!(daily.value(6, "Day"), &Value::text("Sa"));
        assert_eq!(daily.value(6, "Factor"), &Value::Double(0.8));
        assert_eq!(
            rendered(&patterns_out("DAILY", daily)),
            vec!["P1 DAILY 1 1 1 1 1.2 1.2", "P1 0.8"]
        );
    }

    #[test]
    fn test_hourly_and_weekend_pattern_labels() {
        let factors = vec!["1"; 24].join(" ");
        let text = format!("H1 HOURLY {factors}\nW1 WEEKEND {factors}");
        let sheets = patterns_in(&lines(&text)).unwrap();
        for kind in ["HOURLY", "WEEKEND"] {
            let table = sheet(&sheets, kind);
            assert_eq!(table.len(), 24);
            assert_eq!(table.value(0, "Time"), &Value::text("0:00"));
            assert_eq!(table.value(13, "Time"), &Value::text("13:00"));
            assert_eq!(table.value(23, "Time"), &Value::text("23:00"));
        }
    }

    #[test]
    fn test_monthly_pattern_labels() {
        let sheets = patterns_in(&lines(
            "M1 MONTHLY 1 2 3 4 5 6\nM1 7 8 9 10 11 12",
        ))
        .unwrap();
        let monthly = sheet(&sheets, "MONTHLY");
        assert_eq!(monthly.len(), 12);
        assert_eq!(monthly.value(0, "Month"), &Value::text("Jan"));
        assert_eq!(monthly.value(6, "Month"), &Value::text("Jul"));
        assert_eq!(monthly.value(6, "Factor"), &Value::Double(7.0));
        assert_eq!(monthly.value(11, "Month"), &Value::text("Dec"));
        assert!(sheet(&sheets, "HOURLY").is_empty());
    }

    #[test]
    fn test_pattern_with_too_many_factors_is_rejected() {
        let err = patterns_in(&lines("P1 DAILY 1 1 1 1 1 1\nP1 1 1")).unwrap_err();
        assert!(matches!(err, SwmmError::Parse { .. }));
        assert!(err.to_string().contains("8 factors"));
    }

    #[test]
    fn test_timeseries_pairs_and_files() {
        let mut notes = HashMap::new();
        notes.insert("TS1".to_string(), "storm".to_string());
        let mut gages = HashMap::new();
        gages.insert(
            "TS1".to_string(),
            GageSeries {
                format: Some("INTENSITY".into()),
                description: Some("gauge at plant".into()),
            },
        );
        let table = timeseries_in(
            &lines("TS1 01/01/2020 0:00 0.0 1:00 2.5\nTS2 FILE rain.dat"),
            &notes,
            &gages,
        )
        .unwrap();
        assert_eq!(table.len(), 3);
        assert_eq!(table.value(1, "Value"), &Value::Double(2.5));
        assert_eq!(table.value(0, "Type"), &Value::text(RAIN_GAGE_SERIES));
        assert_eq!(table.value(0, "Format"), &Value::text("INTENSITY"));
        assert_eq!(table.value(0, "Description"), &Value::text("storm"));
        assert_eq!(table.value(2, "File_Name"), &Value::text("rain.dat"));
        assert!(table.value(2, "Type").is_null());

        let out = timeseries_out(&table, &HashMap::new());
        assert_eq!(
            rendered(&out),
            vec!["TS1 01/01/2020 00:00 0", "TS1 01/01/2020 01:00 2.5", "TS2 FILE rain.dat"]
        );
        assert_eq!(out[0].annotation.as_deref(), Some("storm"));
        assert_eq!(out[1].annotation, None);
    }

    #[test]
    fn test_incomplete_time_value_pair() {
        let err = timeseries_in(&lines("TS1 0:00"), &HashMap::new(), &HashMap::new());
        assert!(err.is_err());
    }

    #[test]
    fn test_transects_regroup() {
        let text = "NC 0.1 0.2 0.03\nX1 T1 3 10 20 0 0 0 1.5 1 0\nGR 100 0 95 10 100\nGR 20";
        let (data, points) = transects_in(&lines(text)).unwrap();
        assert_eq!(data.len(), 1);
        assert_eq!(data.value(0, "RoughnessChannel"), &Value::Double(0.03));
        assert_eq!(data.value(0, "ModifierStations"), &Value::Double(1.5));
        assert_eq!(points.len(), 3);
        assert_eq!(points.value(1, "Station"), &Value::Double(10.0));
        assert_eq!(points.value(1, "Elevation"), &Value::Double(95.0));

        let out = rendered(&transects_out(&data, &points));
        assert_eq!(out[0], "NC 0.1 0.2 0.03");
        assert_eq!(out[1], "X1 T1 3 10 20 0 0 0 1.5 1");
        assert_eq!(out[2], "GR 100 0 95 10 100 20");
    }

    #[test]
    fn test_gr_pair_continues_on_next_line() {
        let text = "NC 0.1 0.2 0.03\nX1 T1 3 0 20\nGR 100 0 95\nGR 10 100 20";
        let (_, points) = transects_in(&lines(text)).unwrap();
        assert_eq!(points.len(), 3);
        assert_eq!(points.value(1, "Elevation"), &Value::Double(95.0));
        assert_eq!(points.value(1, "Station"), &Value::Double(10.0));
        assert_eq!(points.value(2, "Station"), &Value::Double(20.0));
    }

    #[test]
    fn test_transect_with_missing_stations() {
        let text = "NC 0.1 0.2 0.03\nX1 T1 4 10 20\nGR 100 0 95 10";
        assert!(transects_in(&lines(text)).is_err());
    }
}
