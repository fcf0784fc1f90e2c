pub mod boundary;
pub mod components;
pub mod etl;
pub mod export;
pub mod extract;
pub mod geodesic;
pub mod graph_store;
pub mod osm;
pub mod road_types;
pub mod validate;
pub mod visualize;

pub use crate::domain::model::{RoadGraph, TransformResult};
pub use crate::domain::ports::{ConfigProvider, Pipeline, Storage};
pub use crate::utils::error::Result;
