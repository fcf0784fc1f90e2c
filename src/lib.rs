pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::{Cli, Command, ExtractArgs, LogFormat};

pub use app::pipelines::RoadNetworkPipeline;
pub use config::{cli::LocalStorage, toml_config::TomlConfig};
pub use core::etl::EtlEngine;
pub use domain::model::{BoundingBox, Coordinate, Edge, Node, NodeId, RoadGraph};
pub use utils::error::{Result, RoadnetError};
