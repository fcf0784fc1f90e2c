use crate::core::visualize::MapOptions;
use crate::domain::model::{BoundingBox, RoadGraph, TransformResult};
use crate::utils::error::Result;
use async_trait::async_trait;
use std::time::Duration;

pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

pub trait ConfigProvider: Send + Sync {
    fn osm_file(&self) -> &str;
    fn regions(&self) -> &[String];
    /// Explicit extraction box; when set, regions are not geocoded.
    fn bbox(&self) -> Option<BoundingBox>;
    fn road_types_file(&self) -> Option<&str>;
    fn output_path(&self) -> &str;
    fn graph_filename(&self) -> &str;
    fn largest_component_only(&self) -> bool;
    fn add_distances(&self) -> bool;
    fn validate_graph(&self) -> bool;
    /// `None` disables the HTML map.
    fn map_filename(&self) -> Option<&str>;
    fn map_options(&self) -> MapOptions;
    /// `None` disables the CSV bundle.
    fn export_filename(&self) -> Option<&str>;
    fn geocoder_endpoint(&self) -> &str;
    fn user_agent(&self) -> Option<&str> {
        None
    }
    fn request_timeout(&self) -> Duration;
}

#[async_trait]
pub trait Pipeline: Send + Sync {
    async fn extract(&self) -> Result<RoadGraph>;
    async fn transform(&self, graph: RoadGraph) -> Result<TransformResult>;
    async fn load(&self, result: TransformResult) -> Result<String>;
}
