use crate::domain::model::{Coordinate, RoadGraph};
use crate::utils::error::Result;
use std::io::Write;
use zip::write::{SimpleFileOptions, ZipWriter};

pub const NODES_CSV: &str = "nodes.csv";
pub const EDGES_CSV: &str = "edges.csv";

fn wkt_linestring(geometry: &[Coordinate]) -> String {
    if geometry.is_empty() {
        return String::new();
    }
    let points: Vec<String> = geometry
        .iter()
        .map(|c| format!("{} {}", c.lon, c.lat))
        .collect();
    format!("LINESTRING ({})", points.join(", "))
}

fn nodes_csv(graph: &RoadGraph) -> Result<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(["id", "x", "y"])?;
    for (id, node) in &graph.nodes {
        writer.write_record([
            id.to_string(),
            node.x.map(|v| v.to_string()).unwrap_or_default(),
            node.y.map(|v| v.to_string()).unwrap_or_default(),
        ])?;
    }
    writer
        .into_inner()
        .map_err(|e| std::io::Error::other(e.to_string()).into())
}

fn edges_csv(graph: &RoadGraph) -> Result<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(["source", "target", "highway", "distance", "geometry"])?;
    for edge in &graph.edges {
        writer.write_record([
            edge.source.to_string(),
            edge.target.to_string(),
            edge.highway.clone(),
            edge.distance.map(|d| format!("{:.3}", d)).unwrap_or_default(),
            wkt_linestring(&edge.geometry),
        ])?;
    }
    writer
        .into_inner()
        .map_err(|e| std::io::Error::other(e.to_string()).into())
}

/// ZIP archive with `nodes.csv` and `edges.csv` tables of the graph.
pub fn export_tables(graph: &RoadGraph) -> Result<Vec<u8>> {
    let nodes = nodes_csv(graph)?;
    let edges = edges_csv(graph)?;

    let mut zip = ZipWriter::new(std::io::Cursor::new(Vec::new()));
    zip.start_file(NODES_CSV, SimpleFileOptions::default())?;
    zip.write_all(&nodes)?;

    zip.start_file(EDGES_CSV, SimpleFileOptions::default())?;
    zip.write_all(&edges)?;

    let cursor = zip.finish()?;
    let data = cursor.into_inner();
    tracing::debug!(
        "Exported {} nodes and {} edges ({} bytes zipped)",
        graph.node_count(),
        graph.edge_count(),
        data.len()
    );
    Ok(data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::{Edge, Node};
    use std::io::Read;

    fn read_entry(archive: &mut zip::ZipArchive<std::io::Cursor<Vec<u8>>>, name: &str) -> String {
        let mut file = archive.by_name(name).unwrap();
        let mut content = String::new();
        file.read_to_string(&mut content).unwrap();
        content
    }

    #[test]
    fn test_export_tables() {
        let mut graph = RoadGraph::new();
        graph.add_node(1, Node::at(101.5, 3.25));
        graph.add_node(2, Node::at(101.75, 3.5));
        graph.add_edge(Edge {
            source: 1,
            target: 2,
            highway: "motorway".to_string(),
            geometry: vec![Coordinate::new(101.5, 3.25), Coordinate::new(101.75, 3.5)],
            distance: Some(39_123.4567),
        });
        graph.add_edge(Edge {
            source: 2,
            target: 3,
            highway: "service".to_string(),
            geometry: Vec::new(),
            distance: None,
        });

        let data = export_tables(&graph).unwrap();
        let mut archive = zip::ZipArchive::new(std::io::Cursor::new(data)).unwrap();
        assert_eq!(archive.len(), 2);

        let nodes = read_entry(&mut archive, NODES_CSV);
        assert_eq!(nodes, "id,x,y\n1,101.5,3.25\n2,101.75,3.5\n3,,\n");

        let edges = read_entry(&mut archive, EDGES_CSV);
        let lines: Vec<&str> = edges.lines().collect();
        assert_eq!(lines[0], "source,target,highway,distance,geometry");
        assert_eq!(
            lines[1],
            "1,2,motorway,39123.457,\"LINESTRING (101.5 3.25, 101.75 3.5)\""
        );
        assert_eq!(lines[2], "2,3,service,,");
    }
}
