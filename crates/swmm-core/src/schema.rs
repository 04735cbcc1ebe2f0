//! Section schema registry.
//!
//! Every section of the input format is registered once, in canonical write
//! order, with its column schema, geometry kind, row layout handler and the
//! sections it depends on. The dependency graph is checked for cycles when
//! the registry is built.

use std::collections::HashMap;

use once_cell::sync::Lazy;
use petgraph::algo::toposort;
use petgraph::graph::{DiGraph, NodeIndex};
use serde::Serialize;

use crate::error::{SwmmError, SwmmResult};
use crate::geometry::GeometryKind;
use crate::value::ColumnKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnSpec {
    pub name: &'static str,
    pub kind: ColumnKind,
}

pub const fn col(name: &'static str, kind: ColumnKind) -> ColumnSpec {
    ColumnSpec { name, kind }
}

/// Per-section processing state. Only ever advances.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum ProcessingStatus {
    Raw,
    Processed,
    GeomReady,
}

/// How raw token rows of a section map onto its typed columns, and back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowLayout {
    /// Tokens map positionally onto the columns.
    Direct,
    /// `TIMESERIES <series>` or `FILE <file> <station> <units>` source.
    Raingage,
    /// Stage data slot depends on the outfall type.
    Outfall,
    /// Parameter slots depend on the divider type.
    Divider,
    /// Tabular curve vs. functional coefficients.
    Storage,
    /// Tabular rating curves move the curve name behind the flap gate.
    Outlet,
    /// IRREGULAR, CUSTOM and STREET shapes carry a name instead of numbers.
    CrossSection,
    /// Parameter meaning depends on the infiltration method.
    Infiltration,
    /// `key (name value)+` rows unzipped into one row per pair.
    PairList,
    Curve,
    Pattern,
    TimeSeries,
    Transect,
    /// Free-form section carried as raw lines.
    Verbatim,
}

impl RowLayout {
    /// Composite sections build grouped sub-tables instead of one table.
    pub fn is_composite(&self) -> bool {
        matches!(
            self,
            RowLayout::Curve | RowLayout::Pattern | RowLayout::TimeSeries | RowLayout::Transect
        )
    }
}

/// How satellite tables are merged onto the primary table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinStyle {
    /// Left join on `Name`, one satellite after the other.
    ByName,
    /// Land uses fanned out per pollutant over BUILDUP, then WASHOFF
    /// joined on `Name` + `Pollutant`.
    Pollutant,
}

/// Column adjustments applied after the joins.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Reshape {
    pub drop: &'static [&'static str],
    pub rename: &'static [(&'static str, &'static str)],
}

#[derive(Debug, Clone)]
pub struct SectionSpec {
    pub name: &'static str,
    /// Typed columns after the row layout is applied; `None` for sections
    /// that are not a single flat table.
    pub columns: Option<&'static [ColumnSpec]>,
    pub geometry: Option<GeometryKind>,
    /// Layer name used by external writers for geometric sections.
    pub layer_name: Option<&'static str>,
    pub layout: RowLayout,
    /// Satellite sections whose columns are joined onto this one.
    pub joins: &'static [&'static str],
    pub join_style: JoinStyle,
    pub reshape: Option<Reshape>,
    /// Sections providing vertex coordinates.
    pub geometry_sources: &'static [&'static str],
    /// Sections read during processing without being joined.
    pub requires: &'static [&'static str],
}

impl SectionSpec {
    fn new(name: &'static str, layout: RowLayout) -> Self {
        Self {
            name,
            columns: None,
            geometry: None,
            layer_name: None,
            layout,
            joins: &[],
            join_style: JoinStyle::ByName,
            reshape: None,
            geometry_sources: &[],
            requires: &[],
        }
    }

    fn verbatim(name: &'static str) -> Self {
        Self::new(name, RowLayout::Verbatim)
    }

    fn table(name: &'static str, layout: RowLayout, columns: &'static [ColumnSpec]) -> Self {
        Self {
            columns: Some(columns),
            ..Self::new(name, layout)
        }
    }

    fn layer(
        mut self,
        kind: GeometryKind,
        layer_name: &'static str,
        sources: &'static [&'static str],
    ) -> Self {
        self.geometry = Some(kind);
        self.layer_name = Some(layer_name);
        self.geometry_sources = sources;
        self
    }

    fn joining(mut self, joins: &'static [&'static str]) -> Self {
        self.joins = joins;
        self
    }

    fn requiring(mut self, requires: &'static [&'static str]) -> Self {
        self.requires = requires;
        self
    }

    fn reshaped(
        mut self,
        drop: &'static [&'static str],
        rename: &'static [(&'static str, &'static str)],
    ) -> Self {
        self.reshape = Some(Reshape { drop, rename });
        self
    }

    pub fn is_free_form(&self) -> bool {
        self.layout == RowLayout::Verbatim
    }

    pub fn column_names(&self) -> Vec<&'static str> {
        self.columns
            .map(|cols| cols.iter().map(|c| c.name).collect())
            .unwrap_or_default()
    }

    /// Every section this one reads while being processed.
    pub fn dependencies(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.joins
            .iter()
            .chain(self.geometry_sources)
            .chain(self.requires)
            .copied()
    }
}

const D: ColumnKind = ColumnKind::Double;
const I: ColumnKind = ColumnKind::Int;
const S: ColumnKind = ColumnKind::String;
const B: ColumnKind = ColumnKind::Bool;

const OPTIONS: &[ColumnSpec] = &[col("Option", S), col("Value", S)];

const RAINGAGES: &[ColumnSpec] = &[
    col("Name", S),
    col("Format", S),
    col("Interval", S),
    col("SCF", D),
    col("DataSource", S),
    col("SeriesName", S),
    col("FileName", S),
    col("StationID", S),
    col("RainUnits", S),
];

const SUBCATCHMENTS: &[ColumnSpec] = &[
    col("Name", S),
    col("RainGage", S),
    col("Outlet", S),
    col("Area", D),
    col("Imperv", D),
    col("Width", D),
    col("Slope", D),
    col("CurbLen", D),
    col("SnowPack", S),
];

const SUBAREAS: &[ColumnSpec] = &[
    col("Name", S),
    col("N_Imperv", D),
    col("N_Perv", D),
    col("S_Imperv", D),
    col("S_Perv", D),
    col("PctZero", D),
    col("RouteTo", S),
    col("PctRouted", D),
];

const INFILTRATION: &[ColumnSpec] = &[
    col("Name", S),
    col("InfMethod", S),
    col("MaxRate", D),
    col("MinRate", D),
    col("Decay", D),
    col("DryTime", D),
    col("MaxInf", D),
    col("SuctHead", D),
    col("Conductiv", D),
    col("InitDef", D),
    col("CurveNum", D),
];

const JUNCTIONS: &[ColumnSpec] = &[
    col("Name", S),
    col("Elevation", D),
    col("MaxDepth", D),
    col("InitDepth", D),
    col("SurDepth", D),
    col("Aponded", D),
];

const OUTFALLS: &[ColumnSpec] = &[
    col("Name", S),
    col("Elevation", D),
    col("Type", S),
    col("FixedStage", D),
    col("Curve_TS", S),
    col("FlapGate", B),
    col("RouteTo", S),
];

const DIVIDERS: &[ColumnSpec] = &[
    col("Name", S),
    col("Elevation", D),
    col("DivertLink", S),
    col("Type", S),
    col("CutoffFlow", D),
    col("Curve", S),
    col("WeirMinFlo", D),
    col("WeirMaxDep", D),
    col("WeirCoeff", D),
    col("MaxDepth", D),
    col("InitDepth", D),
    col("SurDepth", D),
    col("Aponded", D),
];

const STORAGE: &[ColumnSpec] = &[
    col("Name", S),
    col("Elevation", D),
    col("MaxDepth", D),
    col("InitDepth", D),
    col("Type", S),
    col("Curve", S),
    col("Coeff", D),
    col("Exponent", D),
    col("Constant", D),
    col("SurDepth", D),
    col("Fevap", D),
    col("Psi", D),
    col("Ksat", D),
    col("IMD", D),
];

const CONDUITS: &[ColumnSpec] = &[
    col("Name", S),
    col("FromNode", S),
    col("ToNode", S),
    col("Length", D),
    col("Roughness", D),
    col("InOffset", D),
    col("OutOffset", D),
    col("InitFlow", D),
    col("MaxFlow", D),
];

const PUMPS: &[ColumnSpec] = &[
    col("Name", S),
    col("FromNode", S),
    col("ToNode", S),
    col("PumpCurve", S),
    col("Status", S),
    col("Startup", D),
    col("Shutoff", D),
];

const ORIFICES: &[ColumnSpec] = &[
    col("Name", S),
    col("FromNode", S),
    col("ToNode", S),
    col("Type", S),
    col("InOffset", D),
    col("Qcoeff", D),
    col("FlapGate", B),
    col("CloseTime", D),
];

const WEIRS: &[ColumnSpec] = &[
    col("Name", S),
    col("FromNode", S),
    col("ToNode", S),
    col("Type", S),
    col("CrestHeigh", D),
    col("Qcoeff", D),
    col("FlapGate", B),
    col("EndContrac", D),
    col("EndCoeff", D),
    col("Surcharge", B),
    col("RoadWidth", D),
    col("RoadSurf", S),
    col("CoeffCurve", S),
];

const OUTLETS: &[ColumnSpec] = &[
    col("Name", S),
    col("FromNode", S),
    col("ToNode", S),
    col("InOffset", D),
    col("RateCurve", S),
    col("Qcoeff", D),
    col("Qexpon", D),
    col("FlapGate", B),
    col("CurveName", S),
];

const XSECTIONS: &[ColumnSpec] = &[
    col("Name", S),
    col("Shape", S),
    col("Geom1", D),
    col("Geom2", D),
    col("Geom3", D),
    col("Geom4", D),
    col("Barrels", I),
    col("Culvert", I),
    col("Shp_Trnsct", S),
];

const STREETS: &[ColumnSpec] = &[
    col("Name", S),
    col("Tcrown", D),
    col("Hcurb", D),
    col("Sx", D),
    col("nRoad", D),
    col("a", D),
    col("W", D),
    col("Sides", I),
    col("Tback", D),
    col("Sback", D),
    col("nBack", D),
];

const INLETS: &[ColumnSpec] = &[
    col("Name", S),
    col("Type", S),
    col("Param1", S),
    col("Param2", S),
    col("Param3", S),
    col("Param4", S),
    col("Param5", S),
];

const INLET_USAGE: &[ColumnSpec] = &[
    col("Name", S),
    col("Inlet", S),
    col("Node", S),
    col("Number", I),
    col("PercentClogged", D),
    col("MaxFlow", D),
    col("hDStore", D),
    col("wDStore", D),
    col("Placement", S),
];

const LOSSES: &[ColumnSpec] = &[
    col("Name", S),
    col("Kentry", D),
    col("Kexit", D),
    col("Kavg", D),
    col("FlapGate", B),
    col("Seepage", D),
];

const POLLUTANTS: &[ColumnSpec] = &[
    col("Name", S),
    col("Units", S),
    col("Crain", D),
    col("Cgw", D),
    col("Crdii", D),
    col("Kdecay", D),
    col("SnowOnly", B),
    col("CoPollut", S),
    col("CoFrac", D),
    col("Cdwf", D),
    col("Cinit", D),
];

const LANDUSES: &[ColumnSpec] = &[
    col("Name", S),
    col("SweepingInterval", D),
    col("Availability", D),
    col("LastSweep", D),
];

const COVERAGES: &[ColumnSpec] = &[
    col("Subcatchment", S),
    col("Landuse", S),
    col("Percent", D),
];

const LOADINGS: &[ColumnSpec] = &[
    col("Subcatchment", S),
    col("Pollutant", S),
    col("InitBuildup", D),
];

const BUILDUP: &[ColumnSpec] = &[
    col("Name", S),
    col("Pollutant", S),
    col("BuildupFunc", S),
    col("C1", D),
    col("C2", D),
    col("C3", D),
    col("PerUnit", S),
];

const WASHOFF: &[ColumnSpec] = &[
    col("Name", S),
    col("Pollutant", S),
    col("WashoffFunc", S),
    col("WC1", D),
    col("WC2", D),
    col("SweepRmvl", D),
    col("BmpRmvl", D),
];

const INFLOWS: &[ColumnSpec] = &[
    col("Name", S),
    col("Constituent", S),
    col("Time_Series", S),
    col("Type", S),
    col("Mfactor", D),
    col("Sfactor", D),
    col("Baseline", D),
    col("Pattern", S),
];

const DWF: &[ColumnSpec] = &[
    col("Name", S),
    col("Constituent", S),
    col("Baseline", D),
    col("Pattern1", S),
    col("Pattern2", S),
    col("Pattern3", S),
    col("Pattern4", S),
];

const VERTEX: &[ColumnSpec] = &[col("Name", S), col("X_Coord", D), col("Y_Coord", D)];

const NODE_COORDS: &[&str] = &["COORDINATES"];
const LINK_COORDS: &[&str] = &["COORDINATES", "VERTICES"];

fn builtin_sections() -> Vec<SectionSpec> {
    use GeometryKind::{LineString, Point, Polygon};
    use RowLayout as L;

    vec![
        SectionSpec::verbatim("TITLE"),
        SectionSpec::table("OPTIONS", L::Direct, OPTIONS),
        SectionSpec::verbatim("EVAPORATION"),
        SectionSpec::verbatim("TEMPERATURE"),
        SectionSpec::verbatim("ADJUSTMENTS"),
        SectionSpec::table("RAINGAGES", L::Raingage, RAINGAGES).layer(
            Point,
            "SWMM_raingages",
            &["SYMBOLS"],
        ),
        SectionSpec::table("SUBCATCHMENTS", L::Direct, SUBCATCHMENTS)
            .layer(Polygon, "SWMM_subcatchments", &["Polygons"])
            .joining(&["SUBAREAS", "INFILTRATION"]),
        SectionSpec::table("SUBAREAS", L::Direct, SUBAREAS),
        SectionSpec::table("INFILTRATION", L::Infiltration, INFILTRATION).requiring(&["OPTIONS"]),
        SectionSpec::verbatim("LID_CONTROLS"),
        SectionSpec::verbatim("LID_USAGE"),
        SectionSpec::verbatim("AQUIFERS"),
        SectionSpec::verbatim("GROUNDWATER"),
        SectionSpec::verbatim("GWF"),
        SectionSpec::verbatim("SNOWPACKS"),
        SectionSpec::table("JUNCTIONS", L::Direct, JUNCTIONS).layer(
            Point,
            "SWMM_junctions",
            NODE_COORDS,
        ),
        SectionSpec::table("OUTFALLS", L::Outfall, OUTFALLS).layer(
            Point,
            "SWMM_outfalls",
            NODE_COORDS,
        ),
        SectionSpec::table("DIVIDERS", L::Divider, DIVIDERS).layer(
            Point,
            "SWMM_dividers",
            NODE_COORDS,
        ),
        SectionSpec::table("STORAGE", L::Storage, STORAGE).layer(
            Point,
            "SWMM_storages",
            NODE_COORDS,
        ),
        SectionSpec::table("CONDUITS", L::Direct, CONDUITS)
            .layer(LineString, "SWMM_conduits", LINK_COORDS)
            .joining(&["XSECTIONS", "LOSSES"]),
        SectionSpec::table("PUMPS", L::Direct, PUMPS).layer(
            LineString,
            "SWMM_pumps",
            LINK_COORDS,
        ),
        SectionSpec::table("ORIFICES", L::Direct, ORIFICES)
            .layer(LineString, "SWMM_orifices", LINK_COORDS)
            .joining(&["XSECTIONS"])
            .reshaped(
                &["Geom3", "Geom4", "Barrels", "Culvert", "Shp_Trnsct"],
                &[("Geom1", "Height"), ("Geom2", "Width")],
            ),
        SectionSpec::table("WEIRS", L::Direct, WEIRS)
            .layer(LineString, "SWMM_weirs", LINK_COORDS)
            .joining(&["XSECTIONS"])
            .reshaped(
                &["Shape", "Geom4", "Barrels", "Culvert", "Shp_Trnsct"],
                &[
                    ("Geom1", "Height"),
                    ("Geom2", "Length"),
                    ("Geom3", "SideSlope"),
                ],
            ),
        SectionSpec::table("OUTLETS", L::Outlet, OUTLETS).layer(
            LineString,
            "SWMM_outlets",
            LINK_COORDS,
        ),
        SectionSpec::table("XSECTIONS", L::CrossSection, XSECTIONS),
        SectionSpec::new("TRANSECTS", L::Transect),
        SectionSpec::table("STREETS", L::Direct, STREETS),
        SectionSpec::table("INLETS", L::Direct, INLETS),
        SectionSpec::table("INLET_USAGE", L::Direct, INLET_USAGE),
        SectionSpec::table("LOSSES", L::Direct, LOSSES),
        SectionSpec::verbatim("CONTROLS"),
        SectionSpec::table("POLLUTANTS", L::Direct, POLLUTANTS),
        SectionSpec {
            join_style: JoinStyle::Pollutant,
            ..SectionSpec::table("LANDUSES", L::Direct, LANDUSES).joining(&["BUILDUP", "WASHOFF"])
        },
        SectionSpec::table("COVERAGES", L::PairList, COVERAGES),
        SectionSpec::table("LOADINGS", L::PairList, LOADINGS),
        SectionSpec::table("BUILDUP", L::Direct, BUILDUP),
        SectionSpec::table("WASHOFF", L::Direct, WASHOFF),
        SectionSpec::verbatim("TREATMENT"),
        SectionSpec::table("INFLOWS", L::Direct, INFLOWS),
        SectionSpec::table("DWF", L::Direct, DWF),
        SectionSpec::verbatim("RDII"),
        SectionSpec::verbatim("HYDROGRAPHS"),
        SectionSpec::new("CURVES", L::Curve),
        SectionSpec::new("TIMESERIES", L::TimeSeries).requiring(&["RAINGAGES"]),
        SectionSpec::new("PATTERNS", L::Pattern),
        SectionSpec::verbatim("REPORT"),
        SectionSpec::verbatim("TAGS"),
        SectionSpec::verbatim("MAP"),
        SectionSpec::table("COORDINATES", L::Direct, VERTEX),
        SectionSpec::table("VERTICES", L::Direct, VERTEX),
        SectionSpec::table("Polygons", L::Direct, VERTEX),
        SectionSpec::table("SYMBOLS", L::Direct, VERTEX),
        SectionSpec::verbatim("LABELS"),
        SectionSpec::verbatim("BACKDROP"),
        SectionSpec::verbatim("PROFILES"),
        SectionSpec::verbatim("FILES"),
    ]
}

/// Lookup table over all registered sections, in canonical write order.
#[derive(Debug)]
pub struct SchemaRegistry {
    sections: Vec<SectionSpec>,
    index: HashMap<&'static str, usize>,
    /// Dependencies before dependents.
    resolution_order: Vec<&'static str>,
}

static REGISTRY: Lazy<SwmmResult<SchemaRegistry>> =
    Lazy::new(|| SchemaRegistry::new(builtin_sections()));

/// The built-in registry.
pub fn registry() -> SwmmResult<&'static SchemaRegistry> {
    REGISTRY.as_ref().map_err(reissue)
}

/// Copy of a construction error held by the shared registry. A cycle keeps
/// its variant, anything else is carried through `Other`.
fn reissue(err: &SwmmError) -> SwmmError {
    match err {
        SwmmError::DependencyCycle(section) => SwmmError::DependencyCycle(section.clone()),
        other => SwmmError::Other(other.to_string()),
    }
}

impl SchemaRegistry {
    /// Build a registry; fails when a dependency is unknown or the
    /// dependency graph has a cycle.
    pub fn new(sections: Vec<SectionSpec>) -> SwmmResult<Self> {
        let index: HashMap<&'static str, usize> = sections
            .iter()
            .enumerate()
            .map(|(i, s)| (s.name, i))
            .collect();

        let mut graph: DiGraph<&'static str, ()> = DiGraph::new();
        let nodes: Vec<NodeIndex> = sections.iter().map(|s| graph.add_node(s.name)).collect();
        for (i, spec) in sections.iter().enumerate() {
            for dep in spec.dependencies() {
                let j = *index.get(dep).ok_or_else(|| {
                    SwmmError::Other(format!("[{}] depends on unknown section [{dep}]", spec.name))
                })?;
                graph.add_edge(nodes[j], nodes[i], ());
            }
        }
        let resolution_order = toposort(&graph, None)
            .map_err(|cycle| SwmmError::DependencyCycle(graph[cycle.node_id()].to_string()))?
            .into_iter()
            .map(|n| graph[n])
            .collect();

        Ok(Self {
            sections,
            index,
            resolution_order,
        })
    }

    pub fn get(&self, name: &str) -> Option<&SectionSpec> {
        self.index.get(name).map(|&i| &self.sections[i])
    }

    pub fn require(&self, name: &str) -> SwmmResult<&SectionSpec> {
        self.get(name)
            .ok_or_else(|| SwmmError::Other(format!("unknown section [{name}]")))
    }

    /// Sections in canonical write order.
    pub fn iter(&self) -> impl Iterator<Item = &SectionSpec> {
        self.sections.iter()
    }

    pub fn canonical_order(&self) -> Vec<&'static str> {
        self.sections.iter().map(|s| s.name).collect()
    }

    pub fn resolution_order(&self) -> &[&'static str] {
        &self.resolution_order
    }

    /// Position in canonical write order.
    pub fn rank(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    pub fn layers(&self) -> impl Iterator<Item = &SectionSpec> {
        self.sections.iter().filter(|s| s.geometry.is_some())
    }

    pub fn by_layer_name(&self, layer_name: &str) -> Option<&SectionSpec> {
        self.layers().find(|s| s.layer_name == Some(layer_name))
    }

    /// Attribute columns of a section after its satellites are joined and
    /// reshaped. The annotation column is not included.
    pub fn layer_columns(&self, name: &str) -> SwmmResult<Vec<ColumnSpec>> {
        let spec = self.require(name)?;
        let mut columns: Vec<ColumnSpec> = spec.columns.unwrap_or_default().to_vec();
        if spec.join_style == JoinStyle::ByName {
            for dep in spec.joins {
                let satellite = self.require(dep)?;
                columns.extend(satellite.columns.unwrap_or_default().iter().skip(1));
            }
        }
        if let Some(reshape) = spec.reshape {
            columns.retain(|c| !reshape.drop.contains(&c.name));
            for c in &mut columns {
                if let Some((_, to)) = reshape.rename.iter().find(|(from, _)| *from == c.name) {
                    c.name = to;
                }
            }
        }
        Ok(columns)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_registry_is_acyclic() {
        let reg = registry().unwrap();
        let order = reg.resolution_order();
        let pos = |n: &str| order.iter().position(|s| *s == n).unwrap();
        assert!(pos("XSECTIONS") < pos("CONDUITS"));
        assert!(pos("OPTIONS") < pos("INFILTRATION"));
        assert!(pos("INFILTRATION") < pos("SUBCATCHMENTS"));
        assert!(pos("RAINGAGES") < pos("TIMESERIES"));
    }

    #[test]
    fn test_cycle_is_reported() {
        let a = SectionSpec::new("A", RowLayout::Direct).requiring(&["B"]);
        let b = SectionSpec::new("B", RowLayout::Direct).requiring(&["A"]);
        let err = SchemaRegistry::new(vec![a, b]).unwrap_err();
        assert!(matches!(err, SwmmError::DependencyCycle(_)));
    }

    #[test]
    fn test_unknown_dependency_is_not_a_cycle() {
        let a = SectionSpec::new("A", RowLayout::Direct).requiring(&["MISSING"]);
        let err = SchemaRegistry::new(vec![a]).unwrap_err();
        assert!(matches!(err, SwmmError::Other(_)));

        let shared = reissue(&err);
        assert!(matches!(shared, SwmmError::Other(_)));
        assert!(shared.to_string().contains("unknown section [MISSING]"));
    }

    #[test]
    fn test_shared_cycle_error_keeps_its_variant() {
        let shared = reissue(&SwmmError::DependencyCycle("A".into()));
        assert!(matches!(shared, SwmmError::DependencyCycle(ref s) if s == "A"));
    }

    #[test]
    fn test_canonical_order_starts_with_title() {
        let reg = registry().unwrap();
        let order = reg.canonical_order();
        assert_eq!(order[0], "TITLE");
        assert!(reg.rank("JUNCTIONS") < reg.rank("CONDUITS"));
        assert!(reg.rank("CURVES") < reg.rank("COORDINATES"));
    }

    #[test]
    fn test_weir_layer_columns_are_renamed() {
        let reg = registry().unwrap();
        let names: Vec<_> = reg
            .layer_columns("WEIRS")
            .unwrap()
            .iter()
            .map(|c| c.name)
            .collect();
        assert!(names.contains(&"Height"));
        assert!(names.contains(&"SideSlope"));
        assert!(!names.contains(&"Shape"));
        assert!(!names.contains(&"Geom4"));
    }

    #[test]
    fn test_conduit_layer_columns_include_satellites() {
        let reg = registry().unwrap();
        let cols = reg.layer_columns("CONDUITS").unwrap();
        assert_eq!(cols.iter().filter(|c| c.name == "Name").count(), 1);
        assert!(cols.iter().any(|c| c.name == "Kentry"));
        assert!(cols.iter().any(|c| c.name == "Geom1"));
    }

    #[test]
    fn test_layer_lookup() {
        let reg = registry().unwrap();
        assert_eq!(reg.by_layer_name("SWMM_storages").unwrap().name, "STORAGE");
        assert!(reg.get("XSECTIONS").unwrap().geometry.is_none());
    }
}
