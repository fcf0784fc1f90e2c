use crate::core::Pipeline;
use crate::utils::error::Result;
use crate::utils::monitor::SystemMonitor;
use std::time::Instant;

pub struct EtlEngine<P: Pipeline> {
    pipeline: P,
    monitor: SystemMonitor,
}

impl<P: Pipeline> EtlEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self::new_with_monitoring(pipeline, false)
    }

    pub fn new_with_monitoring(pipeline: P, monitor_enabled: bool) -> Self {
        Self {
            pipeline,
            monitor: SystemMonitor::new(monitor_enabled),
        }
    }

    pub async fn run(&self) -> Result<String> {
        let started = Instant::now();
        tracing::info!("🚀 Starting road network ETL");

        tracing::info!("📥 Extracting road graph...");
        let graph = self.pipeline.extract().await?;
        tracing::info!(
            "Extracted {} nodes and {} edges",
            graph.node_count(),
            graph.edge_count()
        );
        self.monitor.log_stats("Extract");

        tracing::info!("🔄 Transforming road graph...");
        let result = self.pipeline.transform(graph).await?;
        tracing::info!(
            "Transformed graph: {} nodes, {} edges, {} distances",
            result.graph.node_count(),
            result.graph.edge_count(),
            result.distances_added
        );
        self.monitor.log_stats("Transform");

        tracing::info!("💾 Loading outputs...");
        let output_path = self.pipeline.load(result).await?;
        self.monitor.log_stats("Load");

        tracing::info!(
            "Output saved to {} in {:.1?}",
            output_path,
            started.elapsed()
        );
        self.monitor.log_final_stats();
        Ok(output_path)
    }
}
