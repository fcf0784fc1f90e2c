pub mod road_network_pipeline;

pub use road_network_pipeline::RoadNetworkPipeline;
