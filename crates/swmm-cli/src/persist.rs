//! On-disk layout of an imported model.
//!
//! - `<dir>/<layer>.geojson`: one FeatureCollection per layer, CRS recorded
//! - `<dir>/<workbook>/<sheet>.csv`: one CSV file per sheet
//! - `<dir>/verbatim/<SECTION>.txt`: free-form sections
//!
//! Layer properties are coerced to the registry's column kinds on read.
//! Sheet cells come back as text; the export projection types them.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use serde_json::{json, Map, Value as Json};
use swmm_core::geometry::{
    GeometryCollection, LineString, MultiLineString, MultiPoint, MultiPolygon, Point, Polygon,
};
use swmm_core::{
    registry, Column, ColumnKind, Coord, Geometry, GeometryKind, SwmmError, Table, Value,
};
use swmm_io::{workbooks, Layer, Model, VerbatimSection, Workbook};
use tracing::{debug, info};

const VERBATIM_DIR: &str = "verbatim";

fn unavailable(path: &Path, reason: impl ToString) -> SwmmError {
    SwmmError::OutputTargetUnavailable {
        path: path.display().to_string(),
        reason: reason.to_string(),
    }
}

fn create_dir(path: &Path) -> Result<()> {
    fs::create_dir_all(path).map_err(|e| unavailable(path, e))?;
    Ok(())
}

fn write_file(path: &Path, contents: &str) -> Result<()> {
    fs::write(path, contents).map_err(|e| unavailable(path, e))?;
    Ok(())
}

/// Persist every layer, workbook and verbatim section of `model` under `dir`.
pub fn write_model(model: &Model, dir: &Path) -> Result<()> {
    create_dir(dir)?;
    for layer in &model.layers {
        let path = dir.join(format!("{}.geojson", layer.name));
        let text = serde_json::to_string_pretty(&layer_to_geojson(layer, &model.crs))?;
        write_file(&path, &text)?;
        debug!(layer = %layer.name, features = layer.len(), "layer written");
    }
    for book in &model.workbooks {
        let book_dir = dir.join(&book.name);
        create_dir(&book_dir)?;
        for sheet in &book.sheets {
            write_sheet(&book_dir.join(format!("{}.csv", sheet.name)), &sheet.table)?;
        }
    }
    if !model.verbatim.is_empty() {
        let verbatim_dir = dir.join(VERBATIM_DIR);
        create_dir(&verbatim_dir)?;
        for section in &model.verbatim {
            let mut text = section.lines.join("\n");
            text.push('\n');
            write_file(&verbatim_dir.join(format!("{}.txt", section.section)), &text)?;
        }
    }
    info!(
        dir = %dir.display(),
        layers = model.layers.len(),
        workbooks = model.workbooks.len(),
        "model persisted"
    );
    Ok(())
}

/// Read a directory written by [`write_model`]. Missing files are simply
/// absent from the model.
pub fn read_model(dir: &Path) -> Result<Model> {
    if !dir.is_dir() {
        return Err(anyhow!("{} is not a directory", dir.display()));
    }
    let registry = registry()?;
    let mut model = Model::default();

    let mut crs = None;
    for spec in registry.layers() {
        let (Some(kind), Some(layer_name)) = (spec.geometry, spec.layer_name) else {
            continue;
        };
        let path = dir.join(format!("{layer_name}.geojson"));
        if !path.exists() {
            continue;
        }
        let (layer, layer_crs) = read_layer(&path, spec.name, layer_name, kind)?;
        crs = crs.or(layer_crs);
        model.layers.push(layer);
    }
    model.crs = crs.unwrap_or_default();

    for &name in workbooks::ALL {
        let book_dir = dir.join(name);
        if !book_dir.is_dir() {
            continue;
        }
        let mut paths: Vec<PathBuf> = fs::read_dir(&book_dir)
            .with_context(|| format!("Failed to list {}", book_dir.display()))?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|p| p.extension().is_some_and(|ext| ext == "csv"))
            .collect();
        paths.sort();
        let mut book = Workbook::new(name);
        for path in paths {
            let Some(sheet) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            book.push(sheet, read_sheet(&path)?);
        }
        model.workbooks.push(book);
    }

    let verbatim_dir = dir.join(VERBATIM_DIR);
    for spec in registry.iter().filter(|s| s.is_free_form()) {
        let path = verbatim_dir.join(format!("{}.txt", spec.name));
        if !path.exists() {
            continue;
        }
        let text = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        model.verbatim.push(VerbatimSection {
            section: spec.name.to_string(),
            lines: text.lines().map(String::from).collect(),
        });
    }
    Ok(model)
}

fn write_sheet(path: &Path, table: &Table) -> Result<()> {
    let mut writer = csv::Writer::from_path(path).map_err(|e| unavailable(path, e))?;
    writer.write_record(table.column_names())?;
    for row in table.rows() {
        writer.write_record(row.iter().map(|v| v.to_token().unwrap_or_default()))?;
    }
    writer.flush()?;
    Ok(())
}

fn read_sheet(path: &Path) -> Result<Table> {
    let mut reader = csv::Reader::from_path(path)
        .with_context(|| format!("Failed to open {}", path.display()))?;
    let headers: Vec<String> = reader.headers()?.iter().map(String::from).collect();
    let mut table = Table::from_names(&headers);
    for record in reader.records() {
        let record = record.with_context(|| format!("Invalid CSV in {}", path.display()))?;
        table.push_row(
            record
                .iter()
                .map(|field| match field {
                    "" => Value::Null,
                    text => Value::text(text),
                })
                .collect(),
        );
    }
    Ok(table)
}

fn value_to_json(value: &Value) -> Json {
    match value {
        Value::Null => Json::Null,
        Value::Bool(b) => json!(b),
        Value::Int(i) => json!(i),
        Value::Double(v) => serde_json::Number::from_f64(*v)
            .map(Json::Number)
            .unwrap_or(Json::Null),
        other => Json::String(other.to_string()),
    }
}

fn value_from_json(json: &Json, kind: ColumnKind) -> Result<Value, String> {
    match json {
        Json::Null => Ok(Value::Null),
        Json::Bool(b) => kind.coerce_value(&Value::Bool(*b)),
        Json::String(s) => kind.coerce(s),
        other => kind.coerce(&other.to_string()),
    }
}

fn coords(line: &LineString) -> Vec<[f64; 2]> {
    line.coords().map(|c| [c.x, c.y]).collect()
}

fn rings(polygon: &Polygon) -> Vec<Vec<[f64; 2]>> {
    std::iter::once(polygon.exterior())
        .chain(polygon.interiors())
        .map(coords)
        .collect()
}

fn geometry_to_json(geometry: &Geometry) -> Json {
    match geometry {
        Geometry::Point(p) => json!({ "type": "Point", "coordinates": [p.x(), p.y()] }),
        Geometry::MultiPoint(points) => json!({
            "type": "MultiPoint",
            "coordinates": points.iter().map(|p| [p.x(), p.y()]).collect::<Vec<_>>(),
        }),
        Geometry::Line(line) => json!({
            "type": "LineString",
            "coordinates": [[line.start.x, line.start.y], [line.end.x, line.end.y]],
        }),
        Geometry::LineString(line) => json!({ "type": "LineString", "coordinates": coords(line) }),
        Geometry::MultiLineString(parts) => json!({
            "type": "MultiLineString",
            "coordinates": parts.iter().map(coords).collect::<Vec<_>>(),
        }),
        Geometry::Polygon(polygon) => json!({ "type": "Polygon", "coordinates": rings(polygon) }),
        Geometry::MultiPolygon(polygons) => json!({
            "type": "MultiPolygon",
            "coordinates": polygons.iter().map(rings).collect::<Vec<_>>(),
        }),
        Geometry::Rect(rect) => json!({ "type": "Polygon", "coordinates": rings(&rect.to_polygon()) }),
        Geometry::Triangle(triangle) => json!({
            "type": "Polygon",
            "coordinates": rings(&triangle.to_polygon()),
        }),
        Geometry::GeometryCollection(items) => json!({
            "type": "GeometryCollection",
            "geometries": items.iter().map(geometry_to_json).collect::<Vec<_>>(),
        }),
    }
}

fn array(json: &Json) -> Result<&Vec<Json>> {
    json.as_array()
        .ok_or_else(|| anyhow!("expected a coordinate array, got {json}"))
}

fn coord(json: &Json) -> Result<Coord> {
    let pair = array(json)?;
    match (
        pair.first().and_then(Json::as_f64),
        pair.get(1).and_then(Json::as_f64),
    ) {
        (Some(x), Some(y)) => Ok(Coord { x, y }),
        _ => Err(anyhow!("invalid coordinate {json}")),
    }
}

fn nested<T>(json: &Json, item: impl Fn(&Json) -> Result<T>) -> Result<Vec<T>> {
    array(json)?.iter().map(item).collect()
}

fn line(json: &Json) -> Result<LineString> {
    Ok(LineString::from(nested(json, coord)?))
}

fn polygon(json: &Json) -> Result<Polygon> {
    let mut rings = nested(json, line)?.into_iter();
    let exterior = rings.next().unwrap_or_else(|| LineString::new(Vec::new()));
    Ok(Polygon::new(exterior, rings.collect()))
}

fn geometry_from_json(json: &Json) -> Result<Option<Geometry>> {
    if json.is_null() {
        return Ok(None);
    }
    let kind = json
        .get("type")
        .and_then(Json::as_str)
        .ok_or_else(|| anyhow!("geometry without type"))?;
    if kind == "GeometryCollection" {
        let items = json
            .get("geometries")
            .and_then(Json::as_array)
            .ok_or_else(|| anyhow!("GeometryCollection without geometries"))?;
        let geometries = items
            .iter()
            .filter_map(|item| geometry_from_json(item).transpose())
            .collect::<Result<Vec<_>>>()?;
        return Ok(Some(Geometry::GeometryCollection(GeometryCollection::new_from(
            geometries,
        ))));
    }
    let coordinates = json
        .get("coordinates")
        .ok_or_else(|| anyhow!("{kind} without coordinates"))?;
    let geometry = match kind {
        "Point" => Geometry::Point(coord(coordinates)?.into()),
        "MultiPoint" => Geometry::MultiPoint(MultiPoint::new(
            nested(coordinates, coord)?.into_iter().map(Point::from).collect(),
        )),
        "LineString" => Geometry::LineString(line(coordinates)?),
        "MultiLineString" => {
            Geometry::MultiLineString(MultiLineString::new(nested(coordinates, line)?))
        }
        "Polygon" => Geometry::Polygon(polygon(coordinates)?),
        "MultiPolygon" => Geometry::MultiPolygon(MultiPolygon::new(nested(coordinates, polygon)?)),
        other => return Err(anyhow!("unsupported geometry type '{other}'")),
    };
    Ok(Some(geometry))
}

fn layer_to_geojson(layer: &Layer, crs: &str) -> Json {
    let columns = layer.table.columns();
    let features: Vec<Json> = layer
        .table
        .rows()
        .iter()
        .enumerate()
        .map(|(i, row)| {
            let properties: Map<String, Json> = columns
                .iter()
                .zip(row)
                .map(|(c, v)| (c.name.clone(), value_to_json(v)))
                .collect();
            let geometry = layer
                .geometries
                .get(i)
                .and_then(Option::as_ref)
                .map(geometry_to_json)
                .unwrap_or(Json::Null);
            json!({ "type": "Feature", "properties": properties, "geometry": geometry })
        })
        .collect();
    json!({
        "type": "FeatureCollection",
        "name": layer.name,
        "crs": { "type": "name", "properties": { "name": crs } },
        "features": features,
    })
}

/// Read one layer file. Registry columns keep their declared order and kind;
/// other properties (such as the annotation column) follow as text.
fn read_layer(
    path: &Path,
    section: &str,
    layer_name: &str,
    kind: GeometryKind,
) -> Result<(Layer, Option<String>)> {
    let text =
        fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
    let doc: Json = serde_json::from_str(&text)
        .with_context(|| format!("Invalid GeoJSON in {}", path.display()))?;
    let crs = doc
        .pointer("/crs/properties/name")
        .and_then(Json::as_str)
        .map(String::from);
    let features = doc
        .get("features")
        .and_then(Json::as_array)
        .ok_or_else(|| anyhow!("{} has no features array", path.display()))?;

    let mut keys: Vec<String> = Vec::new();
    for feature in features {
        if let Some(properties) = feature.get("properties").and_then(Json::as_object) {
            for key in properties.keys() {
                if !keys.contains(key) {
                    keys.push(key.clone());
                }
            }
        }
    }
    let declared = registry()?.layer_columns(section)?;
    let mut columns: Vec<Column> = declared
        .iter()
        .filter(|c| keys.iter().any(|k| k.as_str() == c.name))
        .map(Column::from)
        .collect();
    for key in &keys {
        if !declared.iter().any(|c| c.name == key.as_str()) {
            columns.push(Column::new(key.as_str(), ColumnKind::String));
        }
    }

    let mut table = Table::new(columns.clone());
    let mut geometries = Vec::with_capacity(features.len());
    for feature in features {
        let properties = feature.get("properties").and_then(Json::as_object);
        let row = columns
            .iter()
            .map(|c| {
                let json = properties.and_then(|p| p.get(&c.name)).unwrap_or(&Json::Null);
                value_from_json(json, c.kind)
                    .map_err(|msg| anyhow!("{}: {}: {msg}", path.display(), c.name))
            })
            .collect::<Result<Vec<_>>>()?;
        table.push_row(row);
        let geometry = geometry_from_json(feature.get("geometry").unwrap_or(&Json::Null))
            .with_context(|| format!("Invalid geometry in {}", path.display()))?;
        geometries.push(geometry);
    }

    Ok((
        Layer {
            section: section.to_string(),
            name: layer_name.to_string(),
            kind,
            table,
            geometries,
        },
        crs,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use swmm_io::{export_inp, import_inp, ExportOptions, ImportOptions, SilentFeedback};

    const SIMPLE: &str = include_str!("../../../test_data/swmm/simple.inp");

    fn imported() -> Model {
        import_inp(SIMPLE, &ImportOptions::default(), &mut SilentFeedback)
            .unwrap()
            .model
    }

    fn exported(model: &Model) -> String {
        export_inp(model, &ExportOptions::default(), &mut SilentFeedback)
            .unwrap()
            .text
    }

    #[test]
    fn test_layout_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        write_model(&imported(), dir.path()).unwrap();

        assert!(dir.path().join("SWMM_junctions.geojson").exists());
        assert!(dir.path().join("curves").join("Rating.csv").exists());
        assert!(dir.path().join("inflows").join("Direct.csv").exists());
        assert!(dir.path().join("verbatim").join("MAP.txt").exists());
        assert!(!dir.path().join("SWMM_storages.geojson").exists());

        let text = fs::read_to_string(dir.path().join("SWMM_conduits.geojson")).unwrap();
        let doc: Json = serde_json::from_str(&text).unwrap();
        assert_eq!(doc.pointer("/crs/properties/name"), Some(&json!("EPSG:25833")));
        assert_eq!(doc["features"][0]["properties"]["FlapGate"], json!(true));
        assert_eq!(doc["features"][0]["geometry"]["coordinates"][1], json!([5.0, 5.0]));
    }

    #[test]
    fn test_persisted_model_exports_identically() {
        let model = imported();
        let dir = tempfile::tempdir().unwrap();
        write_model(&model, dir.path()).unwrap();
        let restored = read_model(dir.path()).unwrap();

        assert_eq!(restored.crs, model.crs);
        assert_eq!(restored.layers.len(), model.layers.len());
        for (back, original) in restored.layers.iter().zip(&model.layers) {
            assert_eq!(back.name, original.name);
            assert_eq!(back.geometries, original.geometries);
            assert_eq!(back.table.names(), original.table.names());
        }
        assert_eq!(restored.verbatim, model.verbatim);
        assert_eq!(exported(&restored), exported(&model));
    }

    #[test]
    fn test_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        assert!(read_model(&dir.path().join("absent")).is_err());
    }

    #[test]
    fn test_unwritable_target() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("plain.txt");
        fs::write(&file, "x").unwrap();
        let err = write_model(&imported(), &file.join("out")).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<SwmmError>(),
            Some(SwmmError::OutputTargetUnavailable { .. })
        ));
    }
}
