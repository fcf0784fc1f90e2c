use httpmock::prelude::*;
use roadnet_etl::core::boundary::NominatimClient;
use roadnet_etl::core::graph_store::load_graph;
use roadnet_etl::core::osm::MemoryOsmSource;
use roadnet_etl::utils::validation::Validate;
use roadnet_etl::{EtlEngine, LocalStorage, RoadNetworkPipeline, RoadnetError, TomlConfig};
use std::io::Read;
use std::time::Duration;
use tempfile::TempDir;

/// A small slice of Kuala Lumpur: a two-way loop, a one-way spur and a
/// disconnected cul-de-sac, plus a footpath that must be ignored.
fn kl_source() -> MemoryOsmSource {
    MemoryOsmSource::new()
        .with_node(10, 101.6950, 3.1390)
        .with_node(11, 101.6965, 3.1398)
        .with_node(12, 101.6980, 3.1385)
        .with_node(13, 101.6962, 3.1375)
        .with_node(14, 101.7000, 3.1400)
        .with_node(20, 101.7200, 3.1600)
        .with_node(21, 101.7210, 3.1610)
        .with_node(30, 101.6970, 3.1390)
        .with_node(99, 103.8198, 1.3521) // Singapore, outside the box
        .with_way(1, &[("highway", "primary")], &[10, 11, 12, 13, 10])
        .with_way(2, &[("highway", "primary_link"), ("oneway", "yes")], &[12, 14])
        .with_way(3, &[("highway", "residential")], &[20, 21])
        .with_way(4, &[("highway", "footway")], &[13, 30])
        .with_way(5, &[("highway", "motorway")], &[14, 99])
}

fn config_toml(output_path: &str, extra: &str) -> TomlConfig {
    let content = format!(
        r#"
[pipeline]
name = "kl-test"
version = "0.1"

[source]
osm_file = "kl.osm.pbf"
regions = ["Kuala Lumpur, Malaysia"]

[load]
output_path = "{}"

[load.map]
enabled = true
filename = "map.html"

[load.export]
enabled = true
filename = "tables.zip"
{}
"#,
        output_path.replace('\\', "/"),
        extra
    );
    TomlConfig::from_toml_str(&content).unwrap()
}

#[tokio::test]
async fn test_end_to_end_with_geocoder() {
    let temp_dir = TempDir::new().unwrap();
    let output_path = temp_dir.path().to_str().unwrap().to_string();

    let server = MockServer::start();
    let geocoder = server.mock(|when, then| {
        when.method(GET)
            .path("/search")
            .query_param("q", "Kuala Lumpur, Malaysia");
        then.status(200)
            .header("Content-Type", "application/json")
            .json_body(serde_json::json!([{
                "display_name": "Kuala Lumpur, Malaysia",
                "boundingbox": ["3.0327", "3.2447", "101.6152", "101.7585"]
            }]));
    });

    let config = config_toml(&output_path, "");
    config.validate().unwrap();

    let storage = LocalStorage::new(&output_path);
    let boundary = NominatimClient::new(server.base_url(), Duration::from_secs(5));
    let pipeline = RoadNetworkPipeline::new(storage, config, kl_source(), boundary);
    let engine = EtlEngine::new(pipeline);

    let result = engine.run().await.unwrap();
    geocoder.assert();
    assert!(result.ends_with("road_network.json"));

    let storage = LocalStorage::new(&output_path);
    let graph = load_graph(&storage, "road_network.json").await.unwrap();

    // Loop of 4 two-way segments plus the one-way link; the cul-de-sac is dropped.
    assert_eq!(graph.node_count(), 5);
    assert_eq!(graph.edge_count(), 9);
    assert!(!graph.contains_node(20));
    assert!(!graph.contains_node(30));
    assert!(!graph.contains_node(99));
    assert!(graph.edges.iter().all(|e| e.distance.unwrap() > 100.0));
    assert!(graph
        .edges
        .iter()
        .any(|e| e.source == 12 && e.target == 14 && e.highway == "primary_link"));
    assert!(!graph.edges.iter().any(|e| e.source == 14 && e.target == 12));

    let html = std::fs::read_to_string(temp_dir.path().join("map.html")).unwrap();
    assert!(html.contains("L.polyline"));
    assert!(html.contains("[3.139,101.695]"));

    let zip_data = std::fs::read(temp_dir.path().join("tables.zip")).unwrap();
    let mut archive = zip::ZipArchive::new(std::io::Cursor::new(zip_data)).unwrap();
    let mut nodes = String::new();
    archive
        .by_name("nodes.csv")
        .unwrap()
        .read_to_string(&mut nodes)
        .unwrap();
    assert_eq!(nodes.lines().count(), 6);

    let report: serde_json::Value = serde_json::from_slice(
        &std::fs::read(temp_dir.path().join("validation_report.json")).unwrap(),
    )
    .unwrap();
    assert_eq!(report["component_count"], 1);
}

#[tokio::test]
async fn test_end_to_end_with_fixed_bbox_skips_geocoder() {
    let temp_dir = TempDir::new().unwrap();
    let output_path = temp_dir.path().to_str().unwrap().to_string();

    let server = MockServer::start();
    let geocoder = server.mock(|when, then| {
        when.method(GET).path("/search");
        then.status(500);
    });

    let mut config = config_toml(&output_path, "");
    config.source.bbox = Some(roadnet_etl::BoundingBox::new(101.719, 3.159, 101.722, 3.162));
    config.load.map = None;
    config.load.export = None;

    let pipeline = RoadNetworkPipeline::new(
        LocalStorage::new(&output_path),
        config,
        kl_source(),
        NominatimClient::new(server.base_url(), Duration::from_secs(5)),
    );
    EtlEngine::new(pipeline).run().await.unwrap();

    geocoder.assert_hits(0);
    let graph = load_graph(&LocalStorage::new(&output_path), "road_network.json")
        .await
        .unwrap();
    assert_eq!(graph.node_count(), 2);
    assert_eq!(graph.edge_count(), 2);
    assert!(!temp_dir.path().join("map.html").exists());
}

#[tokio::test]
async fn test_end_to_end_with_geocoder_failure() {
    let temp_dir = TempDir::new().unwrap();
    let output_path = temp_dir.path().to_str().unwrap().to_string();

    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/search");
        then.status(503);
    });

    let pipeline = RoadNetworkPipeline::new(
        LocalStorage::new(&output_path),
        config_toml(&output_path, ""),
        kl_source(),
        NominatimClient::new(server.base_url(), Duration::from_secs(5)),
    );
    let err = EtlEngine::new(pipeline).run().await.unwrap_err();

    assert!(matches!(err, RoadnetError::GeocodingError { .. }));
    assert_eq!(err.severity().exit_code(), 2);
    assert!(!temp_dir.path().join("road_network.json").exists());
}

#[tokio::test]
async fn test_end_to_end_with_custom_road_types() {
    let temp_dir = TempDir::new().unwrap();
    let output_path = temp_dir.path().to_str().unwrap().to_string();
    let road_types_path = temp_dir.path().join("road_types.txt");
    std::fs::write(&road_types_path, "residential\n").unwrap();

    let extra = format!(
        "\n[extract]\nroad_types_file = \"{}\"\n\n[transform]\nadd_distances = false\n",
        road_types_path.to_str().unwrap().replace('\\', "/")
    );
    let mut config = config_toml(&output_path, &extra);
    config.source.bbox = Some(roadnet_etl::BoundingBox::new(101.6, 3.0, 101.8, 3.3));

    let pipeline = RoadNetworkPipeline::new(
        LocalStorage::new(&output_path),
        config,
        kl_source(),
        NominatimClient::new("http://127.0.0.1:9", Duration::from_secs(1)),
    );
    EtlEngine::new(pipeline).run().await.unwrap();

    let graph = load_graph(&LocalStorage::new(&output_path), "road_network.json")
        .await
        .unwrap();
    assert_eq!(graph.node_count(), 2);
    assert!(graph.edges.iter().all(|e| e.highway == "residential"));
    assert!(graph.edges.iter().all(|e| e.distance.is_none()));
}
