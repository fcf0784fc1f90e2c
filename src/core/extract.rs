use crate::core::components::weakly_connected_components;
use crate::core::osm::OsmHandler;
use crate::core::road_types::RoadTypes;
use crate::domain::model::{BoundingBox, Coordinate, Edge, Node, NodeId, RoadGraph};
use std::collections::{HashMap, HashSet};

/// Builds a car-road graph from streamed OSM elements.
///
/// Nodes outside the bounding box are dropped, so way segments leaving the box
/// are cut. Every kept segment becomes a directed edge with a two-point
/// geometry; two-way roads get a second edge in the opposite direction.
pub struct RoadGraphExtractor {
    bbox: BoundingBox,
    road_types: RoadTypes,
    nodes: HashMap<NodeId, Coordinate>,
    edges: Vec<Edge>,
    skipped_ways: usize,
}

impl RoadGraphExtractor {
    pub fn new(bbox: BoundingBox, road_types: RoadTypes) -> Self {
        Self {
            bbox,
            road_types,
            nodes: HashMap::new(),
            edges: Vec::new(),
            skipped_ways: 0,
        }
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn into_graph(self) -> RoadGraph {
        tracing::debug!(
            "Extractor kept {} nodes, {} edges; skipped {} highway ways of other types",
            self.nodes.len(),
            self.edges.len(),
            self.skipped_ways
        );

        let mut graph = RoadGraph::new();
        graph.created_at = Some(chrono::Utc::now());
        for (id, coord) in self.nodes {
            graph.add_node(id, Node::at(coord.lon, coord.lat));
        }
        for edge in self.edges {
            graph.add_edge(edge);
        }
        graph
    }
}

fn is_oneway(tags: &[(&str, &str)]) -> bool {
    let value = tags
        .iter()
        .find(|(k, _)| *k == "oneway")
        .map(|(_, v)| v.to_lowercase())
        .unwrap_or_else(|| "no".to_string());
    matches!(value.as_str(), "yes" | "true" | "1")
}

impl OsmHandler for RoadGraphExtractor {
    fn node(&mut self, id: NodeId, lon: f64, lat: f64) {
        if self.bbox.contains(lon, lat) {
            self.nodes.insert(id, Coordinate::new(lon, lat));
        }
    }

    fn way(&mut self, _id: i64, tags: &[(&str, &str)], refs: &[NodeId]) {
        let Some(&(_, road_type)) = tags.iter().find(|(k, _)| *k == "highway") else {
            return;
        };
        if !self.road_types.contains(road_type) {
            self.skipped_ways += 1;
            return;
        }
        let oneway = is_oneway(tags);

        for pair in refs.windows(2) {
            let (start, end) = (pair[0], pair[1]);
            let (Some(&a), Some(&b)) = (self.nodes.get(&start), self.nodes.get(&end)) else {
                continue;
            };

            self.edges.push(Edge {
                source: start,
                target: end,
                highway: road_type.to_string(),
                geometry: vec![a, b],
                distance: None,
            });
            if !oneway {
                self.edges.push(Edge {
                    source: end,
                    target: start,
                    highway: road_type.to_string(),
                    geometry: vec![b, a],
                    distance: None,
                });
            }
        }
    }
}

/// Subgraph spanning the largest weakly connected component.
pub fn extract_largest_subgraph(graph: &RoadGraph) -> RoadGraph {
    tracing::info!("Extracting largest weakly connected subgraph");
    let components = weakly_connected_components(graph);
    let Some(largest) = components.first() else {
        return graph.clone();
    };

    let keep: HashSet<NodeId> = largest.iter().copied().collect();
    let subgraph = graph.subgraph(&keep);
    tracing::info!(
        "Largest subgraph has {} nodes and {} edges ({} components in total)",
        subgraph.node_count(),
        subgraph.edge_count(),
        components.len()
    );
    subgraph
}
