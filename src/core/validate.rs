use crate::core::components::weakly_connected_components;
use crate::domain::model::{RoadGraph, ValidationReport};

/// Checks node coordinates, edge geometry, edge endpoints and connectivity.
/// Problems are logged as warnings and counted in the report; nothing fails.
pub fn validate_graph(graph: &RoadGraph) -> ValidationReport {
    tracing::info!("Validating graph attributes and connectivity");
    let mut report = ValidationReport {
        node_count: graph.node_count(),
        edge_count: graph.edge_count(),
        ..Default::default()
    };

    for (id, node) in &graph.nodes {
        if node.coordinate().is_none() {
            tracing::warn!("Node {} is missing x and y attributes", id);
            report.nodes_missing_coordinates.push(*id);
        }
    }

    for edge in &graph.edges {
        if edge.geometry.is_empty() {
            tracing::warn!("Edge {} -> {} is missing geometry", edge.source, edge.target);
            report.edges_missing_geometry += 1;
        }
        if !graph.contains_node(edge.source) || !graph.contains_node(edge.target) {
            tracing::warn!(
                "Edge {} -> {} references an unknown node",
                edge.source,
                edge.target
            );
            report.edges_with_unknown_nodes += 1;
        }
    }

    report.component_count = weakly_connected_components(graph).len();
    if report.is_connected() {
        tracing::info!("Graph is connected");
    } else {
        tracing::warn!(
            "Graph has {} disconnected components",
            report.component_count
        );
    }

    report
}
