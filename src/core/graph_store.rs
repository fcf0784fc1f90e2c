use crate::core::Storage;
use crate::domain::model::RoadGraph;
use crate::utils::error::Result;

pub async fn load_graph<S: Storage>(storage: &S, path: &str) -> Result<RoadGraph> {
    tracing::info!("Loading graph from {}", path);
    let data = storage.read_file(path).await?;
    let graph: RoadGraph = serde_json::from_slice(&data)?;
    tracing::info!(
        "Graph loaded with {} nodes and {} edges",
        graph.node_count(),
        graph.edge_count()
    );
    Ok(graph)
}

pub async fn save_graph<S: Storage>(storage: &S, path: &str, graph: &RoadGraph) -> Result<()> {
    tracing::info!("Saving graph to {}", path);
    let data = serde_json::to_vec_pretty(graph)?;
    storage.write_file(path, &data).await?;
    tracing::info!(
        "Graph saved ({} nodes, {} edges, {} bytes)",
        graph.node_count(),
        graph.edge_count(),
        data.len()
    );
    Ok(())
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::domain::model::{Coordinate, Edge, Node};
    use crate::utils::error::RoadnetError;
    use std::collections::HashMap;
    use std::sync::Arc;
    use tokio::sync::Mutex;

    #[derive(Clone, Default)]
    pub(crate) struct MockStorage {
        files: Arc<Mutex<HashMap<String, Vec<u8>>>>,
    }

    impl MockStorage {
        pub(crate) fn new() -> Self {
            Self::default()
        }

        pub(crate) async fn get_file(&self, path: &str) -> Option<Vec<u8>> {
            let files = self.files.lock().await;
            files.get(path).cloned()
        }
    }

    impl Storage for MockStorage {
        async fn read_file(&self, path: &str) -> Result<Vec<u8>> {
            let files = self.files.lock().await;
            files.get(path).cloned().ok_or_else(|| {
                RoadnetError::IoError(std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    format!("File not found: {}", path),
                ))
            })
        }

        async fn write_file(&self, path: &str, data: &[u8]) -> Result<()> {
            let mut files = self.files.lock().await;
            files.insert(path.to_string(), data.to_vec());
            Ok(())
        }
    }

    fn sample_graph() -> RoadGraph {
        let mut graph = RoadGraph::new();
        graph.add_node(1, Node::at(101.6, 3.1));
        graph.add_node(2, Node::at(101.61, 3.11));
        graph.add_edge(Edge {
            source: 1,
            target: 2,
            highway: "primary".to_string(),
            geometry: vec![Coordinate::new(101.6, 3.1), Coordinate::new(101.61, 3.11)],
            distance: Some(1_560.2),
        });
        graph
    }

    #[test]
    fn test_save_then_load() {
        let storage = MockStorage::new();
        let graph = sample_graph();

        tokio_test::block_on(save_graph(&storage, "road_network.json", &graph)).unwrap();
        let loaded = tokio_test::block_on(load_graph(&storage, "road_network.json")).unwrap();

        assert_eq!(loaded, graph);
    }

    #[tokio::test]
    async fn test_load_missing_file() {
        let storage = MockStorage::new();
        let err = load_graph(&storage, "missing.json").await.unwrap_err();
        assert!(matches!(err, RoadnetError::IoError(_)));
    }

    #[tokio::test]
    async fn test_load_corrupt_file() {
        let storage = MockStorage::new();
        storage.write_file("broken.json", b"{\"crs\": 4326").await.unwrap();
        let err = load_graph(&storage, "broken.json").await.unwrap_err();
        assert!(matches!(err, RoadnetError::SerializationError(_)));
    }

    #[tokio::test]
    async fn test_saved_file_is_readable_json() {
        let storage = MockStorage::new();
        save_graph(&storage, "g.json", &sample_graph()).await.unwrap();

        let raw = storage.get_file("g.json").await.unwrap();
        let value: serde_json::Value = serde_json::from_slice(&raw).unwrap();
        assert_eq!(value["crs"], "epsg:4326");
        assert_eq!(value["edges"][0]["highway"], "primary");
        assert_eq!(value["nodes"]["1"]["x"], 101.6);
    }
}
