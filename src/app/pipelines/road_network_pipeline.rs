use crate::core::boundary::{retrieve_boundary, BoundaryProvider, NominatimClient};
use crate::core::export::export_tables;
use crate::core::extract::{extract_largest_subgraph, RoadGraphExtractor};
use crate::core::geodesic::add_edge_distances;
use crate::core::graph_store::save_graph;
use crate::core::osm::{OsmSource, PbfSource};
use crate::core::road_types::RoadTypes;
use crate::core::validate::validate_graph;
use crate::core::visualize::render_map_html;
use crate::core::{ConfigProvider, Pipeline, RoadGraph, Storage, TransformResult};
use crate::domain::model::BoundingBox;
use crate::utils::error::{Result, RoadnetError};
use std::sync::Arc;

pub const VALIDATION_REPORT_FILENAME: &str = "validation_report.json";

/// OSM extract -> largest drivable component -> weighted graph files.
pub struct RoadNetworkPipeline<S, C, O, B>
where
    S: Storage,
    C: ConfigProvider,
    O: OsmSource + 'static,
    B: BoundaryProvider,
{
    pub(crate) storage: S,
    pub(crate) config: C,
    pub(crate) source: Arc<O>,
    pub(crate) boundary: B,
}

impl<S, C, O, B> RoadNetworkPipeline<S, C, O, B>
where
    S: Storage,
    C: ConfigProvider,
    O: OsmSource + 'static,
    B: BoundaryProvider,
{
    pub fn new(storage: S, config: C, source: O, boundary: B) -> Self {
        Self {
            storage,
            config,
            source: Arc::new(source),
            boundary,
        }
    }

    async fn resolve_bbox(&self) -> Result<BoundingBox> {
        match self.config.bbox() {
            Some(bbox) => {
                tracing::info!("Using configured bounding box {}", bbox);
                Ok(bbox)
            }
            None => retrieve_boundary(&self.boundary, self.config.regions()).await,
        }
    }

    fn road_types(&self) -> Result<RoadTypes> {
        match self.config.road_types_file() {
            Some(path) => RoadTypes::from_file(path),
            None => Ok(RoadTypes::default()),
        }
    }
}

impl<S, C> RoadNetworkPipeline<S, C, PbfSource, NominatimClient>
where
    S: Storage,
    C: ConfigProvider,
{
    /// Reads `osm_file` from disk and geocodes regions with Nominatim.
    pub fn from_config(storage: S, config: C) -> Self {
        let source = PbfSource::new(config.osm_file());
        let mut boundary =
            NominatimClient::new(config.geocoder_endpoint(), config.request_timeout());
        if let Some(agent) = config.user_agent() {
            boundary = boundary.with_user_agent(agent);
        }
        Self::new(storage, config, source, boundary)
    }
}

#[async_trait::async_trait]
impl<S, C, O, B> Pipeline for RoadNetworkPipeline<S, C, O, B>
where
    S: Storage,
    C: ConfigProvider,
    O: OsmSource + 'static,
    B: BoundaryProvider,
{
    async fn extract(&self) -> Result<RoadGraph> {
        let bbox = self.resolve_bbox().await?;
        let road_types = self.road_types()?;
        tracing::info!("Keeping {} road types", road_types.len());

        // PBF decoding is CPU-bound; keep it off the async workers.
        let source = Arc::clone(&self.source);
        let extractor = tokio::task::spawn_blocking(move || -> Result<RoadGraphExtractor> {
            let mut extractor = RoadGraphExtractor::new(bbox, road_types);
            source.read(&mut extractor)?;
            tracing::debug!(
                "Kept {} nodes inside the box and {} road edges",
                extractor.node_count(),
                extractor.edge_count()
            );
            Ok(extractor)
        })
        .await
        .map_err(|e| RoadnetError::processing(format!("extraction task failed: {}", e)))??;

        let graph = extractor.into_graph();
        tracing::info!(
            "Raw road graph has {} nodes and {} edges",
            graph.node_count(),
            graph.edge_count()
        );
        if graph.edge_count() == 0 {
            return Err(RoadnetError::processing(format!(
                "no drivable road segments found inside {}",
                bbox
            )));
        }

        if self.config.largest_component_only() {
            Ok(extract_largest_subgraph(&graph))
        } else {
            Ok(graph)
        }
    }

    async fn transform(&self, mut graph: RoadGraph) -> Result<TransformResult> {
        let distances_added = if self.config.add_distances() {
            add_edge_distances(&mut graph)
        } else {
            0
        };

        let report = self
            .config
            .validate_graph()
            .then(|| validate_graph(&graph));

        Ok(TransformResult {
            graph,
            distances_added,
            report,
        })
    }

    async fn load(&self, result: TransformResult) -> Result<String> {
        let graph_file = self.config.graph_filename();
        save_graph(&self.storage, graph_file, &result.graph).await?;

        if let Some(map_file) = self.config.map_filename() {
            let html = render_map_html(&result.graph, &self.config.map_options());
            self.storage.write_file(map_file, html.as_bytes()).await?;
            tracing::info!("Interactive map saved to {}", map_file);
        }

        if let Some(export_file) = self.config.export_filename() {
            let zip_data = export_tables(&result.graph)?;
            tracing::debug!("Writing CSV bundle ({} bytes)", zip_data.len());
            self.storage.write_file(export_file, &zip_data).await?;
            tracing::info!("CSV tables saved to {}", export_file);
        }

        if let Some(report) = &result.report {
            let json = serde_json::to_vec_pretty(report)?;
            self.storage
                .write_file(VALIDATION_REPORT_FILENAME, &json)
                .await?;
        }

        Ok(format!("{}/{}", self.config.output_path(), graph_file))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::graph_store::tests::MockStorage;
    use crate::core::osm::MemoryOsmSource;
    use crate::core::visualize::MapOptions;
    use crate::domain::model::ValidationReport;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    struct MockConfig {
        regions: Vec<String>,
        bbox: Option<BoundingBox>,
        largest_component_only: bool,
        add_distances: bool,
        map_filename: Option<String>,
        export_filename: Option<String>,
    }

    impl MockConfig {
        fn new() -> Self {
            Self {
                regions: vec!["Kuala Lumpur, Malaysia".to_string()],
                bbox: None,
                largest_component_only: true,
                add_distances: true,
                map_filename: None,
                export_filename: None,
            }
        }
    }

    impl ConfigProvider for MockConfig {
        fn osm_file(&self) -> &str {
            "unused.osm.pbf"
        }
        fn regions(&self) -> &[String] {
            &self.regions
        }
        fn bbox(&self) -> Option<BoundingBox> {
            self.bbox
        }
        fn road_types_file(&self) -> Option<&str> {
            None
        }
        fn output_path(&self) -> &str {
            "test_output"
        }
        fn graph_filename(&self) -> &str {
            "road_network.json"
        }
        fn largest_component_only(&self) -> bool {
            self.largest_component_only
        }
        fn add_distances(&self) -> bool {
            self.add_distances
        }
        fn validate_graph(&self) -> bool {
            true
        }
        fn map_filename(&self) -> Option<&str> {
            self.map_filename.as_deref()
        }
        fn map_options(&self) -> MapOptions {
            MapOptions::default()
        }
        fn export_filename(&self) -> Option<&str> {
            self.export_filename.as_deref()
        }
        fn geocoder_endpoint(&self) -> &str {
            "http://localhost"
        }
        fn request_timeout(&self) -> Duration {
            Duration::from_secs(1)
        }
    }

    #[derive(Default)]
    struct CountingBoundary {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl BoundaryProvider for CountingBoundary {
        async fn region_bounds(&self, _region: &str) -> Result<BoundingBox> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(BoundingBox::new(101.6, 3.0, 101.8, 3.3))
        }
    }

    fn city_source() -> MemoryOsmSource {
        MemoryOsmSource::new()
            .with_node(1, 101.70, 3.10)
            .with_node(2, 101.71, 3.11)
            .with_node(3, 101.72, 3.12)
            .with_node(4, 101.75, 3.15)
            .with_node(5, 101.76, 3.16)
            .with_node(6, 102.50, 3.16) // outside
            .with_way(1, &[("highway", "primary")], &[1, 2, 3])
            .with_way(2, &[("highway", "residential"), ("oneway", "yes")], &[4, 5, 6])
            .with_way(3, &[("highway", "footway")], &[3, 4])
    }

    fn pipeline(
        config: MockConfig,
        source: MemoryOsmSource,
    ) -> RoadNetworkPipeline<MockStorage, MockConfig, MemoryOsmSource, CountingBoundary> {
        RoadNetworkPipeline::new(
            MockStorage::new(),
            config,
            source,
            CountingBoundary::default(),
        )
    }

    #[tokio::test]
    async fn test_extract_keeps_largest_component() {
        let pipeline = pipeline(MockConfig::new(), city_source());
        let graph = pipeline.extract().await.unwrap();

        assert_eq!(pipeline.boundary.calls.load(Ordering::SeqCst), 1);
        assert_eq!(graph.node_count(), 3);
        assert_eq!(graph.edge_count(), 4);
        assert!(graph.edges.iter().all(|e| e.highway == "primary"));
    }

    #[tokio::test]
    async fn test_extract_without_component_filter() {
        let config = MockConfig {
            largest_component_only: false,
            ..MockConfig::new()
        };
        let pipeline = pipeline(config, city_source());
        let graph = pipeline.extract().await.unwrap();

        assert_eq!(graph.node_count(), 5);
        assert_eq!(graph.edge_count(), 5);
    }

    #[tokio::test]
    async fn test_configured_bbox_skips_geocoding() {
        let config = MockConfig {
            bbox: Some(BoundingBox::new(101.74, 3.14, 101.77, 3.17)),
            ..MockConfig::new()
        };
        let pipeline = pipeline(config, city_source());
        let graph = pipeline.extract().await.unwrap();

        assert_eq!(pipeline.boundary.calls.load(Ordering::SeqCst), 0);
        assert_eq!(graph.node_count(), 2);
        assert_eq!(graph.edge_count(), 1);
    }

    #[tokio::test]
    async fn test_extract_without_roads_fails() {
        let source = MemoryOsmSource::new()
            .with_node(1, 101.70, 3.10)
            .with_node(2, 101.71, 3.11)
            .with_way(1, &[("highway", "cycleway")], &[1, 2]);
        let pipeline = pipeline(MockConfig::new(), source);

        let err = pipeline.extract().await.unwrap_err();
        assert!(matches!(err, RoadnetError::ProcessingError { .. }));
    }

    #[tokio::test]
    async fn test_transform_adds_distances_and_report() {
        let pipeline = pipeline(MockConfig::new(), city_source());
        let graph = pipeline.extract().await.unwrap();
        let result = pipeline.transform(graph).await.unwrap();

        assert_eq!(result.distances_added, 4);
        assert!(result.graph.edges.iter().all(|e| e.distance.is_some()));
        let report = result.report.unwrap();
        assert!(report.is_clean());
    }

    #[tokio::test]
    async fn test_transform_can_skip_distances() {
        let config = MockConfig {
            add_distances: false,
            ..MockConfig::new()
        };
        let pipeline = pipeline(config, city_source());
        let graph = pipeline.extract().await.unwrap();
        let result = pipeline.transform(graph).await.unwrap();

        assert_eq!(result.distances_added, 0);
        assert!(result.graph.edges.iter().all(|e| e.distance.is_none()));
    }

    #[tokio::test]
    async fn test_load_writes_all_outputs() {
        let config = MockConfig {
            map_filename: Some("map.html".to_string()),
            export_filename: Some("tables.zip".to_string()),
            ..MockConfig::new()
        };
        let pipeline = pipeline(config, city_source());
        let graph = pipeline.extract().await.unwrap();
        let result = pipeline.transform(graph).await.unwrap();
        let output = pipeline.load(result).await.unwrap();

        assert_eq!(output, "test_output/road_network.json");
        let storage = &pipeline.storage;
        assert!(storage.get_file("road_network.json").await.is_some());

        let html = storage.get_file("map.html").await.unwrap();
        assert!(String::from_utf8(html).unwrap().contains("L.polyline"));

        let zip_data = storage.get_file("tables.zip").await.unwrap();
        let archive = zip::ZipArchive::new(std::io::Cursor::new(zip_data)).unwrap();
        assert_eq!(archive.len(), 2);

        let report = storage.get_file(VALIDATION_REPORT_FILENAME).await.unwrap();
        let report: ValidationReport = serde_json::from_slice(&report).unwrap();
        assert_eq!(report.component_count, 1);
    }

    #[tokio::test]
    async fn test_load_graph_only() {
        let pipeline = pipeline(MockConfig::new(), city_source());
        let result = TransformResult {
            graph: RoadGraph::new(),
            distances_added: 0,
            report: None,
        };
        pipeline.load(result).await.unwrap();

        assert!(pipeline.storage.get_file("road_network.json").await.is_some());
        assert!(pipeline.storage.get_file("map.html").await.is_none());
        assert!(pipeline
            .storage
            .get_file(VALIDATION_REPORT_FILENAME)
            .await
            .is_none());
    }
}
