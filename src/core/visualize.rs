use crate::domain::model::RoadGraph;
use serde::{Deserialize, Serialize};

/// Kuala Lumpur city centre as (lat, lon).
pub const DEFAULT_MAP_CENTER: (f64, f64) = (3.139, 101.686);
pub const DEFAULT_MAP_ZOOM: u8 = 11;
pub const DEFAULT_MAX_MAP_EDGES: usize = 300_000;

const LEAFLET_VERSION: &str = "1.9.4";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapOptions {
    /// (lat, lon)
    pub center: (f64, f64),
    pub zoom: u8,
    pub max_edges: usize,
    pub color: String,
    pub weight: u32,
}

impl Default for MapOptions {
    fn default() -> Self {
        Self {
            center: DEFAULT_MAP_CENTER,
            zoom: DEFAULT_MAP_ZOOM,
            max_edges: DEFAULT_MAX_MAP_EDGES,
            color: "blue".to_string(),
            weight: 2,
        }
    }
}

/// Leaflet wants `[lat, lon]` pairs.
fn edge_polylines(graph: &RoadGraph, max_edges: usize) -> Vec<Vec<[f64; 2]>> {
    graph
        .edges
        .iter()
        .take(max_edges)
        .filter(|edge| !edge.geometry.is_empty())
        .map(|edge| edge.geometry.iter().map(|c| [c.lat, c.lon]).collect())
        .collect()
}

/// JSON string literal that cannot close the surrounding `<script>` element.
fn script_string(value: &str) -> String {
    serde_json::to_string(value)
        .map(|json| json.replace('<', "\\u003c"))
        .unwrap_or_else(|_| "\"blue\"".to_string())
}

/// Renders a standalone HTML page drawing the first `max_edges` edges.
pub fn render_map_html(graph: &RoadGraph, options: &MapOptions) -> String {
    let polylines = edge_polylines(graph, options.max_edges);
    tracing::info!(
        "Rendering {} of {} edges on the map",
        polylines.len(),
        graph.edge_count()
    );

    // Numbers only, so the JSON is safe to inline in a <script> block.
    let lines_json = serde_json::to_string(&polylines).unwrap_or_else(|_| "[]".to_string());
    let color = script_string(&options.color);
    let (lat, lon) = options.center;

    format!(
        r#"<!DOCTYPE html>
<html>
<head>
<meta charset="utf-8" />
<meta name="viewport" content="width=device-width, initial-scale=1.0" />
<title>Road network ({edges} edges)</title>
<link rel="stylesheet" href="https://unpkg.com/leaflet@{leaflet}/dist/leaflet.css" />
<script src="https://unpkg.com/leaflet@{leaflet}/dist/leaflet.js"></script>
<style>html, body, #map {{ height: 100%; margin: 0; }}</style>
</head>
<body>
<div id="map"></div>
<script>
const map = L.map("map", {{ preferCanvas: true }}).setView([{lat}, {lon}], {zoom});
L.tileLayer("https://{{s}}.tile.openstreetmap.org/{{z}}/{{x}}/{{y}}.png", {{
  maxZoom: 19,
  attribution: "&copy; OpenStreetMap contributors"
}}).addTo(map);
const lines = {lines};
L.polyline(lines, {{ color: {color}, weight: {weight} }}).addTo(map);
</script>
</body>
</html>
"#,
        edges = polylines.len(),
        leaflet = LEAFLET_VERSION,
        lat = lat,
        lon = lon,
        zoom = options.zoom,
        lines = lines_json,
        color = color,
        weight = options.weight,
    )
}
