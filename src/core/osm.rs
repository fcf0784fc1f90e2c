//! Streaming access to OpenStreetMap data.
//!
//! Sources push elements into an [`OsmHandler`] in file order. Sorted PBF
//! extracts store every node before the first way, which the extractor
//! relies on.

use crate::domain::model::NodeId;
use crate::utils::error::Result;
use osmpbf::{Element, ElementReader};
use std::path::{Path, PathBuf};

pub trait OsmHandler {
    fn node(&mut self, id: NodeId, lon: f64, lat: f64);
    fn way(&mut self, id: i64, tags: &[(&str, &str)], refs: &[NodeId]);
}

pub trait OsmSource: Send + Sync {
    fn read(&self, handler: &mut dyn OsmHandler) -> Result<()>;
}

#[derive(Debug, Clone)]
pub struct PbfSource {
    path: PathBuf,
}

impl PbfSource {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }
}

impl OsmSource for PbfSource {
    fn read(&self, handler: &mut dyn OsmHandler) -> Result<()> {
        tracing::info!("Reading OSM extract {}", self.path.display());
        let reader = ElementReader::from_path(&self.path)?;

        let mut refs: Vec<NodeId> = Vec::new();
        let (mut nodes, mut ways) = (0u64, 0u64);

        reader.for_each(|element| match element {
            Element::Node(node) => {
                nodes += 1;
                handler.node(node.id(), node.lon(), node.lat());
            }
            Element::DenseNode(node) => {
                nodes += 1;
                handler.node(node.id(), node.lon(), node.lat());
            }
            Element::Way(way) => {
                ways += 1;
                let tags: Vec<(&str, &str)> = way.tags().collect();
                refs.clear();
                refs.extend(way.refs());
                handler.way(way.id(), &tags, &refs);
            }
            Element::Relation(_) => {}
        })?;

        tracing::info!("Scanned {} nodes and {} ways", nodes, ways);
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct OsmWay {
    pub id: i64,
    pub tags: Vec<(String, String)>,
    pub refs: Vec<NodeId>,
}

impl OsmWay {
    pub fn new(id: i64, tags: &[(&str, &str)], refs: &[NodeId]) -> Self {
        Self {
            id,
            tags: tags
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            refs: refs.to_vec(),
        }
    }
}

/// Already-decoded OSM data, replayed nodes first.
#[derive(Debug, Clone, Default)]
pub struct MemoryOsmSource {
    pub nodes: Vec<(NodeId, f64, f64)>,
    pub ways: Vec<OsmWay>,
}

impl MemoryOsmSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_node(mut self, id: NodeId, lon: f64, lat: f64) -> Self {
        self.nodes.push((id, lon, lat));
        self
    }

    pub fn with_way(mut self, id: i64, tags: &[(&str, &str)], refs: &[NodeId]) -> Self {
        self.ways.push(OsmWay::new(id, tags, refs));
        self
    }
}

impl OsmSource for MemoryOsmSource {
    fn read(&self, handler: &mut dyn OsmHandler) -> Result<()> {
        for &(id, lon, lat) in &self.nodes {
            handler.node(id, lon, lat);
        }
        for way in &self.ways {
            let tags: Vec<(&str, &str)> = way
                .tags
                .iter()
                .map(|(k, v)| (k.as_str(), v.as_str()))
                .collect();
            handler.way(way.id, &tags, &way.refs);
        }
        Ok(())
    }
}
