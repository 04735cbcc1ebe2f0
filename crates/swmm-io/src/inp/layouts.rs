//! Keyword-conditional row layouts.
//!
//! Several sections change the meaning of their trailing fields depending on
//! a keyword in the row. On import the token row is reshaped so that every
//! value lands in a fixed column of the section's table; on export the
//! inverse reshape writes only the fields that keyword expects.

use std::fmt;
use std::str::FromStr;

use swmm_core::{RowLayout, SwmmError, SwmmResult, Table};

use super::records::{fields, Fields};

/// Infiltration models and their parameter layouts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InfiltrationMethod {
    Horton,
    ModifiedHorton,
    GreenAmpt,
    ModifiedGreenAmpt,
    CurveNumber,
}

impl InfiltrationMethod {
    pub const ALL: [InfiltrationMethod; 5] = [
        InfiltrationMethod::Horton,
        InfiltrationMethod::ModifiedHorton,
        InfiltrationMethod::GreenAmpt,
        InfiltrationMethod::ModifiedGreenAmpt,
        InfiltrationMethod::CurveNumber,
    ];

    pub fn keyword(&self) -> &'static str {
        match self {
            InfiltrationMethod::Horton => "HORTON",
            InfiltrationMethod::ModifiedHorton => "MODIFIED_HORTON",
            InfiltrationMethod::GreenAmpt => "GREEN_AMPT",
            InfiltrationMethod::ModifiedGreenAmpt => "MODIFIED_GREEN_AMPT",
            InfiltrationMethod::CurveNumber => "CURVE_NUMBER",
        }
    }

    /// Layer columns holding this method's parameters, in file order.
    pub fn parameter_columns(&self) -> &'static [&'static str] {
        match self {
            InfiltrationMethod::Horton | InfiltrationMethod::ModifiedHorton => {
                &["MaxRate", "MinRate", "Decay", "DryTime", "MaxInf"]
            }
            InfiltrationMethod::GreenAmpt | InfiltrationMethod::ModifiedGreenAmpt => {
                &["SuctHead", "Conductiv", "InitDef"]
            }
            InfiltrationMethod::CurveNumber => &["CurveNum", "Conductiv", "DryTime"],
        }
    }
}

impl FromStr for InfiltrationMethod {
    type Err = SwmmError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        InfiltrationMethod::ALL
            .into_iter()
            .find(|m| m.keyword().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| SwmmError::parse("INFILTRATION", format!("unknown method '{s}'")))
    }
}

impl fmt::Display for InfiltrationMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

/// Model-wide settings some layouts depend on.
#[derive(Debug, Clone, Copy)]
pub struct LayoutContext {
    pub main_infiltration: InfiltrationMethod,
}

impl Default for LayoutContext {
    fn default() -> Self {
        Self {
            main_infiltration: InfiltrationMethod::Horton,
        }
    }
}

/// Reshape the token rows of a flat-table section for import.
pub fn import_rows(
    section: &str,
    layout: RowLayout,
    rows: &[Vec<String>],
    ctx: &LayoutContext,
) -> SwmmResult<Vec<Fields>> {
    let mut out = Vec::with_capacity(rows.len());
    for tokens in rows {
        match layout {
            RowLayout::Raingage => out.push(raingage_in(tokens)),
            RowLayout::Outfall => out.push(outfall_in(tokens)),
            RowLayout::Divider => out.push(divider_in(tokens)),
            RowLayout::Storage => out.push(storage_in(tokens)),
            RowLayout::Outlet => out.push(outlet_in(section, tokens)?),
            RowLayout::CrossSection => out.push(xsection_in(tokens)),
            RowLayout::Infiltration => out.push(infiltration_in(tokens, ctx)?),
            RowLayout::PairList => out.extend(pairs_in(section, tokens)?),
            _ => out.push(fields(tokens)),
        }
    }
    Ok(out)
}

/// Fields of one table row as written to the file.
pub fn export_row(
    layout: RowLayout,
    table: &Table,
    row: usize,
    ctx: &LayoutContext,
) -> SwmmResult<Fields> {
    let cell = |column: &str| table.value(row, column).to_token();
    let keyword = |column: &str| cell(column).map(|s| s.to_ascii_uppercase()).unwrap_or_default();
    let pick = |columns: &[&str]| columns.iter().map(|c| cell(*c)).collect::<Fields>();

    let line = match layout {
        RowLayout::Raingage => {
            let mut line = pick(&["Name", "Format", "Interval", "SCF"]);
            if keyword("DataSource") == "FILE" {
                line.push(Some("FILE".to_string()));
                line.extend(pick(&["FileName", "StationID", "RainUnits"]));
            } else {
                line.push(Some("TIMESERIES".to_string()));
                line.push(cell("SeriesName"));
            }
            line
        }
        RowLayout::Outfall => {
            let mut line = pick(&["Name", "Elevation", "Type"]);
            match keyword("Type").as_str() {
                "FIXED" => line.push(cell("FixedStage")),
                "TIDAL" | "TIMESERIES" => line.push(cell("Curve_TS")),
                _ => {}
            }
            line.push(cell("FlapGate").or_else(|| Some("NO".to_string())));
            line.push(cell("RouteTo"));
            line
        }
        RowLayout::Divider => {
            let mut line = pick(&["Name", "Elevation", "DivertLink", "Type"]);
            match keyword("Type").as_str() {
                "CUTOFF" => line.push(cell("CutoffFlow")),
                "TABULAR" => line.push(cell("Curve")),
                "WEIR" => line.extend(pick(&["WeirMinFlo", "WeirMaxDep", "WeirCoeff"])),
                _ => {}
            }
            line.extend(pick(&["MaxDepth", "InitDepth", "SurDepth", "Aponded"]));
            line
        }
        RowLayout::Storage => {
            let mut line = pick(&["Name", "Elevation", "MaxDepth", "InitDepth", "Type"]);
            if keyword("Type") == "TABULAR" {
                line.push(cell("Curve"));
            } else {
                line.extend(pick(&["Coeff", "Exponent", "Constant"]));
            }
            line.extend(pick(&["SurDepth", "Fevap", "Psi", "Ksat", "IMD"]));
            line
        }
        RowLayout::Outlet => {
            let mut line = pick(&["Name", "FromNode", "ToNode", "InOffset", "RateCurve"]);
            if keyword("RateCurve").starts_with("TABULAR") {
                line.push(cell("CurveName"));
            } else {
                line.extend(pick(&["Qcoeff", "Qexpon"]));
            }
            line.push(cell("FlapGate").or_else(|| Some("NO".to_string())));
            line
        }
        RowLayout::CrossSection => {
            let mut line = pick(&["Name", "Shape"]);
            match keyword("Shape").as_str() {
                "IRREGULAR" | "STREET" => line.push(cell("Shp_Trnsct")),
                "CUSTOM" => {
                    line.push(cell("Geom1"));
                    line.push(cell("Shp_Trnsct"));
                    line.push(cell("Barrels"));
                }
                _ => line.extend(pick(&["Geom1", "Geom2", "Geom3", "Geom4", "Barrels", "Culvert"])),
            }
            line
        }
        RowLayout::Infiltration => {
            let method = match cell("InfMethod") {
                Some(m) => m.parse::<InfiltrationMethod>()?,
                None => ctx.main_infiltration,
            };
            let mut line = pick(&["Name"]);
            line.extend(pick(method.parameter_columns()));
            if method != ctx.main_infiltration {
                line.push(Some(method.keyword().to_string()));
            }
            line
        }
        _ => (0..table.columns().len())
            .map(|c| table.rows()[row][c].to_token())
            .collect(),
    };
    Ok(line)
}

fn at(tokens: &[String], i: usize) -> Option<String> {
    tokens.get(i).cloned()
}

fn upper(tokens: &[String], i: usize) -> String {
    tokens
        .get(i)
        .map(|s| s.to_ascii_uppercase())
        .unwrap_or_default()
}

fn raingage_in(tokens: &[String]) -> Fields {
    let mut row: Fields = (0..5).map(|i| at(tokens, i)).collect();
    match upper(tokens, 4).as_str() {
        "FILE" => {
            row.push(None);
            row.extend((5..8).map(|i| at(tokens, i)));
        }
        _ => row.push(at(tokens, 5)),
    }
    row
}

fn outfall_in(tokens: &[String]) -> Fields {
    let mut row = fields(tokens);
    let insert_at = |row: &mut Fields, pos: usize, n: usize| {
        let pos = pos.min(row.len());
        row.splice(pos..pos, std::iter::repeat(None).take(n));
    };
    match upper(tokens, 2).as_str() {
        "FREE" | "NORMAL" => insert_at(&mut row, 3, 2),
        "FIXED" => insert_at(&mut row, 4, 1),
        _ => insert_at(&mut row, 3, 1),
    }
    row
}

fn divider_in(tokens: &[String]) -> Fields {
    let mut row: Fields = (0..4).map(|i| at(tokens, i)).collect();
    // CutoffFlow, Curve, WeirMinFlo, WeirMaxDep, WeirCoeff
    let mut params: Fields = vec![None; 5];
    let consumed = match upper(tokens, 3).as_str() {
        "CUTOFF" => {
            params[0] = at(tokens, 4);
            1
        }
        "TABULAR" => {
            params[1] = at(tokens, 4);
            1
        }
        "WEIR" => {
            for (k, slot) in params[2..5].iter_mut().enumerate() {
                *slot = at(tokens, 4 + k);
            }
            3
        }
        _ => 0,
    };
    row.extend(params);
    row.extend(tokens.iter().skip(4 + consumed).cloned().map(Some));
    row
}

fn storage_in(tokens: &[String]) -> Fields {
    let mut row: Fields = (0..5).map(|i| at(tokens, i)).collect();
    if upper(tokens, 4) == "TABULAR" {
        row.push(at(tokens, 5));
        row.extend([None, None, None]);
        row.extend(tokens.iter().skip(6).cloned().map(Some));
    } else {
        row.push(None);
        row.extend((5..8).map(|i| at(tokens, i)));
        row.extend(tokens.iter().skip(8).cloned().map(Some));
    }
    row
}

/// Tabular rating curves: `Name From To Offset TABULAR/x Curve Gate` becomes
/// `[.., TABULAR/x, null, null, Gate, Curve]`; other rows gain a null
/// curve name.
fn outlet_in(section: &str, tokens: &[String]) -> SwmmResult<Fields> {
    if tokens.len() < 5 {
        return Err(SwmmError::parse(
            section,
            format!("'{}' needs at least 5 fields", tokens.join(" ")),
        ));
    }
    let mut row = fields(&tokens[..5]);
    if upper(tokens, 4).starts_with("TABULAR") {
        row.extend([None, None, at(tokens, 6), at(tokens, 5)]);
    } else {
        row.extend(tokens[5..].iter().cloned().map(Some));
        row.resize(8, None);
        row.push(None);
    }
    Ok(row)
}

fn xsection_in(tokens: &[String]) -> Fields {
    let name_only = |slot: Option<String>| {
        let mut row: Fields = vec![at(tokens, 0), at(tokens, 1)];
        row.extend(vec![None; 6]);
        row.push(slot);
        row
    };
    match upper(tokens, 1).as_str() {
        "IRREGULAR" | "STREET" => name_only(at(tokens, 2)),
        "CUSTOM" => {
            let mut row = name_only(at(tokens, 3));
            row[2] = at(tokens, 2);
            row[6] = at(tokens, 4);
            row
        }
        _ => fields(tokens),
    }
}

fn infiltration_in(tokens: &[String], ctx: &LayoutContext) -> SwmmResult<Fields> {
    let mut params: Vec<String> = tokens.iter().skip(1).cloned().collect();
    let method = match params.last().map(|t| t.parse::<InfiltrationMethod>()) {
        Some(Ok(method)) => {
            params.pop();
            method
        }
        _ => ctx.main_infiltration,
    };
    // Name, InfMethod, MaxRate, MinRate, Decay, DryTime, MaxInf,
    // SuctHead, Conductiv, InitDef, CurveNum
    const LAYER: [&str; 9] = [
        "MaxRate", "MinRate", "Decay", "DryTime", "MaxInf", "SuctHead", "Conductiv", "InitDef",
        "CurveNum",
    ];
    let mut row: Fields = vec![at(tokens, 0), Some(method.keyword().to_string())];
    row.extend(vec![None; LAYER.len()]);
    for (param, column) in params.into_iter().zip(method.parameter_columns()) {
        if let Some(pos) = LAYER.iter().position(|c| c == column) {
            row[2 + pos] = Some(param);
        }
    }
    Ok(row)
}

/// `Key A 1 B 2` becomes `[Key, A, 1]`, `[Key, B, 2]`.
fn pairs_in(section: &str, tokens: &[String]) -> SwmmResult<Vec<Fields>> {
    let Some((key, rest)) = tokens.split_first() else {
        return Ok(Vec::new());
    };
    if rest.len() % 2 != 0 {
        return Err(SwmmError::parse(
            section,
            format!("'{key}' has an unpaired value"),
        ));
    }
    Ok(rest
        .chunks(2)
        .map(|pair| vec![Some(key.clone()), Some(pair[0].clone()), Some(pair[1].clone())])
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use swmm_core::{registry, Value};

    use crate::inp::records::build_table;

    fn toks(line: &str) -> Vec<String> {
        line.split_whitespace().map(String::from).collect()
    }

    fn build(section: &str, lines: &[&str], ctx: &LayoutContext) -> Table {
        let spec = registry().unwrap().get(section).unwrap();
        let rows: Vec<_> = lines.iter().map(|l| toks(l)).collect();
        let shaped = import_rows(section, spec.layout, &rows, ctx).unwrap();
        build_table(section, spec.columns.unwrap(), shaped, None).unwrap()
    }

    fn written(section: &str, table: &Table, ctx: &LayoutContext) -> Vec<String> {
        let spec = registry().unwrap().get(section).unwrap();
        (0..table.len())
            .map(|r| export_row(spec.layout, table, r, ctx).unwrap())
            .map(|mut f| {
                while matches!(f.last(), Some(None)) {
                    f.pop();
                }
                f.into_iter()
                    .map(|t| t.unwrap_or_else(|| "*".into()))
                    .collect::<Vec<_>>()
                    .join(" ")
            })
            .collect()
    }

    #[test]
    fn test_outlet_tabular_field_shift() {
        let ctx = LayoutContext::default();
        let t = build(
            "OUTLETS",
            &["O1 J1 J2 0 TABULAR/DEPTH curveA NO", "O2 J1 J2 0 FUNCTIONAL/DEPTH 10 0.5 YES"],
            &ctx,
        );
        assert_eq!(t.value(0, "Qcoeff"), &Value::Null);
        assert_eq!(t.value(0, "Qexpon"), &Value::Null);
        assert_eq!(t.value(0, "FlapGate"), &Value::Bool(false));
        assert_eq!(t.value(0, "CurveName"), &Value::text("curveA"));
        assert_eq!(t.value(1, "Qcoeff"), &Value::Double(10.0));
        assert_eq!(t.value(1, "FlapGate"), &Value::Bool(true));
        assert_eq!(t.value(1, "CurveName"), &Value::Null);

        assert_eq!(
            written("OUTLETS", &t, &ctx),
            vec![
                "O1 J1 J2 0 TABULAR/DEPTH curveA NO",
                "O2 J1 J2 0 FUNCTIONAL/DEPTH 10 0.5 YES"
            ]
        );
    }

    #[test]
    fn test_outfall_layouts() {
        let ctx = LayoutContext::default();
        let t = build(
            "OUTFALLS",
            &["Out1 0 FREE NO", "Out2 1 FIXED 2.5 YES", "Out3 2 TIMESERIES ts1 NO J4"],
            &ctx,
        );
        assert_eq!(t.value(0, "FlapGate"), &Value::Bool(false));
        assert_eq!(t.value(1, "FixedStage"), &Value::Double(2.5));
        assert_eq!(t.value(2, "Curve_TS"), &Value::text("ts1"));
        assert_eq!(t.value(2, "RouteTo"), &Value::text("J4"));
        assert_eq!(
            written("OUTFALLS", &t, &ctx),
            vec!["Out1 0 FREE NO", "Out2 1 FIXED 2.5 YES", "Out3 2 TIMESERIES ts1 NO J4"]
        );
    }

    #[test]
    fn test_storage_and_divider_layouts() {
        let ctx = LayoutContext::default();
        let s = build(
            "STORAGE",
            &["SU1 10 4 0 TABULAR curve1 0 0", "SU2 10 4 0 FUNCTIONAL 1000 0 0 0 0"],
            &ctx,
        );
        assert_eq!(s.value(0, "Curve"), &Value::text("curve1"));
        assert_eq!(s.value(0, "SurDepth"), &Value::Double(0.0));
        assert_eq!(s.value(1, "Coeff"), &Value::Double(1000.0));
        assert_eq!(s.value(1, "Curve"), &Value::Null);

        let d = build("DIVIDERS", &["D1 5 C3 WEIR 0.5 1 3.3 2 0"], &ctx);
        assert_eq!(d.value(0, "WeirCoeff"), &Value::Double(3.3));
        assert_eq!(d.value(0, "MaxDepth"), &Value::Double(2.0));
        assert_eq!(written("DIVIDERS", &d, &ctx), vec!["D1 5 C3 WEIR 0.5 1 3.3 2 0"]);
    }

    #[test]
    fn test_raingage_sources() {
        let ctx = LayoutContext::default();
        let t = build(
            "RAINGAGES",
            &[
                "RG1 INTENSITY 0:15 1.0 TIMESERIES TS1",
                "RG2 VOLUME 1:00 1.0 FILE rain.dat STA1 MM",
            ],
            &ctx,
        );
        assert_eq!(t.value(0, "SeriesName"), &Value::text("TS1"));
        assert_eq!(t.value(0, "FileName"), &Value::Null);
        assert_eq!(t.value(1, "StationID"), &Value::text("STA1"));
        assert_eq!(t.value(1, "SeriesName"), &Value::Null);
    }

    #[test]
    fn test_xsection_shapes() {
        let ctx = LayoutContext::default();
        let t = build(
            "XSECTIONS",
            &["C1 CIRCULAR 1 0 0 0 1", "C2 IRREGULAR T1", "C3 CUSTOM 2 shapeA 2"],
            &ctx,
        );
        assert_eq!(t.value(1, "Shp_Trnsct"), &Value::text("T1"));
        assert_eq!(t.value(1, "Geom1"), &Value::Null);
        assert_eq!(t.value(2, "Geom1"), &Value::Double(2.0));
        assert_eq!(t.value(2, "Barrels"), &Value::Int(2));
        assert_eq!(
            written("XSECTIONS", &t, &ctx),
            vec!["C1 CIRCULAR 1 0 0 0 1", "C2 IRREGULAR T1", "C3 CUSTOM 2 shapeA 2"]
        );
    }

    #[test]
    fn test_infiltration_methods() {
        let ctx = LayoutContext {
            main_infiltration: InfiltrationMethod::Horton,
        };
        let t = build(
            "INFILTRATION",
            &["S1 3.0 0.5 4 7 0", "S2 3.5 0.5 0.25 GREEN_AMPT"],
            &ctx,
        );
        assert_eq!(t.value(0, "InfMethod"), &Value::text("HORTON"));
        assert_eq!(t.value(0, "DryTime"), &Value::Double(7.0));
        assert_eq!(t.value(1, "InfMethod"), &Value::text("GREEN_AMPT"));
        assert_eq!(t.value(1, "Conductiv"), &Value::Double(0.5));
        assert_eq!(t.value(1, "MaxRate"), &Value::Null);
        assert_eq!(
            written("INFILTRATION", &t, &ctx),
            vec!["S1 3 0.5 4 7 0", "S2 3.5 0.5 0.25 GREEN_AMPT"]
        );
    }

    #[test]
    fn test_pair_lists_are_unzipped() {
        let ctx = LayoutContext::default();
        let t = build("COVERAGES", &["S1 Residential 60 Commercial 40"], &ctx);
        assert_eq!(t.len(), 2);
        assert_eq!(t.value(1, "Landuse"), &Value::text("Commercial"));

        let spec = registry().unwrap().get("COVERAGES").unwrap();
        let rows = vec![toks("S1 Residential 60 Commercial")];
        assert!(import_rows("COVERAGES", spec.layout, &rows, &ctx).is_err());
    }
}
