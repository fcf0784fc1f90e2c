use crate::core::boundary::DEFAULT_GEOCODER_ENDPOINT;
use crate::core::visualize::{MapOptions, DEFAULT_MAP_CENTER, DEFAULT_MAP_ZOOM, DEFAULT_MAX_MAP_EDGES};
use crate::core::ConfigProvider;
use crate::domain::model::BoundingBox;
use crate::utils::error::{Result, RoadnetError};
use crate::utils::validation::{self, Validate};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::OnceLock;
use std::time::Duration;

const DEFAULT_TIMEOUT_SECONDS: u64 = 30;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TomlConfig {
    pub pipeline: PipelineConfig,
    pub source: SourceConfig,
    #[serde(default)]
    pub extract: ExtractConfig,
    #[serde(default)]
    pub transform: TransformConfig,
    pub load: LoadConfig,
    pub monitoring: Option<MonitoringConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    pub name: String,
    pub description: Option<String>,
    pub version: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    pub osm_file: String,
    #[serde(default)]
    pub regions: Vec<String>,
    pub bbox: Option<BoundingBox>,
    pub geocoder_endpoint: Option<String>,
    pub user_agent: Option<String>,
    pub timeout_seconds: Option<u64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExtractConfig {
    pub road_types_file: Option<String>,
    pub largest_component_only: Option<bool>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TransformConfig {
    pub add_distances: Option<bool>,
    pub validate: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoadConfig {
    pub output_path: String,
    pub graph_filename: Option<String>,
    pub map: Option<MapConfig>,
    pub export: Option<ExportConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MapConfig {
    pub enabled: bool,
    pub filename: Option<String>,
    pub max_edges: Option<usize>,
    /// [lat, lon]
    pub center: Option<(f64, f64)>,
    pub zoom: Option<u8>,
    pub color: Option<String>,
    pub weight: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportConfig {
    pub enabled: bool,
    pub filename: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitoringConfig {
    pub enabled: bool,
}

impl TomlConfig {
    /// Loads the configuration from a TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(RoadnetError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// Parses configuration text; `${VAR}` references are replaced first.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content);

        toml::from_str(&processed_content).map_err(|e| RoadnetError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    fn substitute_env_vars(content: &str) -> String {
        Self::substitute_vars(content, |name| std::env::var(name).ok())
    }

    /// Unresolved variables are left as written.
    fn substitute_vars<F>(content: &str, lookup: F) -> String
    where
        F: Fn(&str) -> Option<String>,
    {
        static ENV_VAR: OnceLock<regex::Regex> = OnceLock::new();
        let re = ENV_VAR.get_or_init(|| {
            regex::Regex::new(r"\$\{([^}]+)\}").expect("environment variable pattern is valid")
        });

        re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            lookup(var_name).unwrap_or_else(|| format!("${{{}}}", var_name))
        })
        .into_owned()
    }

    pub fn validate_config(&self) -> Result<()> {
        validation::validate_non_empty_string("pipeline.name", &self.pipeline.name)?;
        validation::validate_path("source.osm_file", &self.source.osm_file)?;
        validation::validate_file_extensions(
            "source.osm_file",
            std::slice::from_ref(&self.source.osm_file),
            &["pbf"],
        )?;

        match &self.source.bbox {
            Some(bbox) => validation::validate_bbox("source.bbox", bbox)?,
            None => {
                if self.source.regions.is_empty() {
                    return Err(RoadnetError::MissingConfigError {
                        field: "source.regions (or source.bbox)".to_string(),
                    });
                }
                for region in &self.source.regions {
                    validation::validate_non_empty_string("source.regions", region)?;
                }
                validation::validate_url("source.geocoder_endpoint", self.geocoder_endpoint())?;
            }
        }

        if let Some(timeout) = self.source.timeout_seconds {
            validation::validate_positive_number("source.timeout_seconds", timeout as usize, 1)?;
        }

        if let Some(file) = &self.extract.road_types_file {
            validation::validate_path("extract.road_types_file", file)?;
        }

        validation::validate_path("load.output_path", &self.load.output_path)?;
        validation::validate_file_extensions(
            "load.graph_filename",
            &[self.graph_filename().to_string()],
            &["json"],
        )?;

        if let Some(map) = self.load.map.as_ref().filter(|m| m.enabled) {
            if let Some(max_edges) = map.max_edges {
                validation::validate_positive_number("load.map.max_edges", max_edges, 1)?;
            }
            if let Some(zoom) = map.zoom {
                validation::validate_range("load.map.zoom", zoom, 0, 19)?;
            }
            if let Some((lat, lon)) = map.center {
                validation::validate_range("load.map.center.lat", lat, -90.0, 90.0)?;
                validation::validate_range("load.map.center.lon", lon, -180.0, 180.0)?;
            }
        }

        Ok(())
    }

    pub fn monitoring_enabled(&self) -> bool {
        self.monitoring.as_ref().map(|m| m.enabled).unwrap_or(false)
    }
}

impl ConfigProvider for TomlConfig {
    fn osm_file(&self) -> &str {
        &self.source.osm_file
    }

    fn regions(&self) -> &[String] {
        &self.source.regions
    }

    fn bbox(&self) -> Option<BoundingBox> {
        self.source.bbox
    }

    fn road_types_file(&self) -> Option<&str> {
        self.extract.road_types_file.as_deref()
    }

    fn output_path(&self) -> &str {
        &self.load.output_path
    }

    fn graph_filename(&self) -> &str {
        self.load
            .graph_filename
            .as_deref()
            .unwrap_or("road_network.json")
    }

    fn largest_component_only(&self) -> bool {
        self.extract.largest_component_only.unwrap_or(true)
    }

    fn add_distances(&self) -> bool {
        self.transform.add_distances.unwrap_or(true)
    }

    fn validate_graph(&self) -> bool {
        self.transform.validate.unwrap_or(true)
    }

    fn map_filename(&self) -> Option<&str> {
        self.load
            .map
            .as_ref()
            .filter(|m| m.enabled)
            .map(|m| m.filename.as_deref().unwrap_or("road_network_map.html"))
    }

    fn map_options(&self) -> MapOptions {
        let defaults = MapOptions::default();
        match &self.load.map {
            Some(map) => MapOptions {
                center: map.center.unwrap_or(DEFAULT_MAP_CENTER),
                zoom: map.zoom.unwrap_or(DEFAULT_MAP_ZOOM),
                max_edges: map.max_edges.unwrap_or(DEFAULT_MAX_MAP_EDGES),
                color: map.color.clone().unwrap_or(defaults.color),
                weight: map.weight.unwrap_or(defaults.weight),
            },
            None => defaults,
        }
    }

    fn export_filename(&self) -> Option<&str> {
        self.load
            .export
            .as_ref()
            .filter(|e| e.enabled)
            .map(|e| e.filename.as_deref().unwrap_or("road_network_tables.zip"))
    }

    fn geocoder_endpoint(&self) -> &str {
        self.source
            .geocoder_endpoint
            .as_deref()
            .unwrap_or(DEFAULT_GEOCODER_ENDPOINT)
    }

    fn user_agent(&self) -> Option<&str> {
        self.source.user_agent.as_deref()
    }

    fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.source.timeout_seconds.unwrap_or(DEFAULT_TIMEOUT_SECONDS))
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}
