use crate::utils::error::Result;
use std::collections::HashSet;
use std::path::Path;

/// `highway=*` values that cars may drive on.
pub const DEFAULT_ROAD_TYPES: &[&str] = &[
    "motorway",
    "motorway_link",
    "trunk",
    "trunk_link",
    "primary",
    "primary_link",
    "secondary",
    "secondary_link",
    "tertiary",
    "tertiary_link",
    "unclassified",
    "residential",
    "living_street",
    "service",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoadTypes {
    types: HashSet<String>,
}

impl RoadTypes {
    /// One road type per line; surrounding whitespace and blank lines are ignored.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)?;
        let road_types = Self::parse(&content);
        tracing::debug!(
            "Loaded {} road types from {}",
            road_types.len(),
            path.as_ref().display()
        );
        Ok(road_types)
    }

    pub fn parse(content: &str) -> Self {
        content
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .collect()
    }

    pub fn contains(&self, road_type: &str) -> bool {
        self.types.contains(road_type)
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

impl Default for RoadTypes {
    fn default() -> Self {
        DEFAULT_ROAD_TYPES.iter().copied().collect()
    }
}

impl<S: Into<String>> FromIterator<S> for RoadTypes {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self {
            types: iter.into_iter().map(Into::into).collect(),
        }
    }
}
