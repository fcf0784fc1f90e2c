use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::fmt;

/// OpenStreetMap node id.
pub type NodeId = i64;

pub const DEFAULT_CRS: &str = "epsg:4326";

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub lon: f64,
    pub lat: f64,
}

impl Coordinate {
    pub fn new(lon: f64, lat: f64) -> Self {
        Self { lon, lat }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min_lon: f64,
    pub min_lat: f64,
    pub max_lon: f64,
    pub max_lat: f64,
}

impl BoundingBox {
    pub fn new(min_lon: f64, min_lat: f64, max_lon: f64, max_lat: f64) -> Self {
        Self {
            min_lon,
            min_lat,
            max_lon,
            max_lat,
        }
    }

    /// Inclusive on every side.
    pub fn contains(&self, lon: f64, lat: f64) -> bool {
        self.min_lon <= lon && lon <= self.max_lon && self.min_lat <= lat && lat <= self.max_lat
    }

    pub fn union(&self, other: &BoundingBox) -> BoundingBox {
        BoundingBox {
            min_lon: self.min_lon.min(other.min_lon),
            min_lat: self.min_lat.min(other.min_lat),
            max_lon: self.max_lon.max(other.max_lon),
            max_lat: self.max_lat.max(other.max_lat),
        }
    }

    pub fn is_valid(&self) -> bool {
        let values = [self.min_lon, self.min_lat, self.max_lon, self.max_lat];
        values.iter().all(|v| v.is_finite())
            && self.min_lon <= self.max_lon
            && self.min_lat <= self.max_lat
            && (-180.0..=180.0).contains(&self.min_lon)
            && (-180.0..=180.0).contains(&self.max_lon)
            && (-90.0..=90.0).contains(&self.min_lat)
            && (-90.0..=90.0).contains(&self.max_lat)
    }
}

impl fmt::Display for BoundingBox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "({}, {}, {}, {})",
            self.min_lon, self.min_lat, self.max_lon, self.max_lat
        )
    }
}

/// Node attributes. `x` is longitude and `y` latitude; both may be absent in
/// graph files produced by other tools.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Node {
    #[serde(default)]
    pub x: Option<f64>,
    #[serde(default)]
    pub y: Option<f64>,
}

impl Node {
    pub fn at(lon: f64, lat: f64) -> Self {
        Self {
            x: Some(lon),
            y: Some(lat),
        }
    }

    pub fn coordinate(&self) -> Option<Coordinate> {
        match (self.x, self.y) {
            (Some(x), Some(y)) => Some(Coordinate::new(x, y)),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Edge {
    pub source: NodeId,
    pub target: NodeId,
    pub highway: String,
    /// Polyline starting at `source`. Empty when the geometry is unknown.
    #[serde(default)]
    pub geometry: Vec<Coordinate>,
    /// Length in metres.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distance: Option<f64>,
}

/// Directed road multigraph; parallel edges are allowed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoadGraph {
    pub crs: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    pub nodes: BTreeMap<NodeId, Node>,
    pub edges: Vec<Edge>,
}

impl Default for RoadGraph {
    fn default() -> Self {
        Self::new()
    }
}

impl RoadGraph {
    pub fn new() -> Self {
        Self {
            crs: DEFAULT_CRS.to_string(),
            created_at: None,
            nodes: BTreeMap::new(),
            edges: Vec::new(),
        }
    }

    pub fn add_node(&mut self, id: NodeId, node: Node) {
        self.nodes.insert(id, node);
    }

    /// Endpoints missing from `nodes` are added without coordinates.
    pub fn add_edge(&mut self, edge: Edge) {
        self.nodes.entry(edge.source).or_default();
        self.nodes.entry(edge.target).or_default();
        self.edges.push(edge);
    }

    pub fn contains_node(&self, id: NodeId) -> bool {
        self.nodes.contains_key(&id)
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Copy restricted to `keep` and every edge with both endpoints in it.
    pub fn subgraph(&self, keep: &HashSet<NodeId>) -> RoadGraph {
        let nodes = self
            .nodes
            .iter()
            .filter(|(id, _)| keep.contains(id))
            .map(|(id, node)| (*id, *node))
            .collect();
        let edges = self
            .edges
            .iter()
            .filter(|e| keep.contains(&e.source) && keep.contains(&e.target))
            .cloned()
            .collect();

        RoadGraph {
            crs: self.crs.clone(),
            created_at: self.created_at,
            nodes,
            edges,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationReport {
    pub node_count: usize,
    pub edge_count: usize,
    pub nodes_missing_coordinates: Vec<NodeId>,
    pub edges_missing_geometry: usize,
    pub edges_with_unknown_nodes: usize,
    pub component_count: usize,
}

impl ValidationReport {
    pub fn is_connected(&self) -> bool {
        self.component_count == 1
    }

    pub fn is_clean(&self) -> bool {
        self.nodes_missing_coordinates.is_empty()
            && self.edges_missing_geometry == 0
            && self.edges_with_unknown_nodes == 0
            && self.is_connected()
    }
}

#[derive(Debug, Clone)]
pub struct TransformResult {
    pub graph: RoadGraph,
    pub distances_added: usize,
    pub report: Option<ValidationReport>,
}
