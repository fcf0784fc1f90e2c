pub mod cli;
pub mod toml_config;

#[cfg(feature = "cli")]
pub use args::{Cli, Command, ExtractArgs, LogFormat};

#[cfg(feature = "cli")]
mod args {
    use crate::core::boundary::DEFAULT_GEOCODER_ENDPOINT;
    use crate::core::visualize::MapOptions;
    use crate::core::ConfigProvider;
    use crate::domain::model::BoundingBox;
    use crate::utils::error::Result;
    use crate::utils::validation::{self, Validate};
    use clap::{Args, Parser, Subcommand, ValueEnum};
    use std::time::Duration;

    #[derive(Debug, Parser)]
    #[command(name = "roadnet")]
    #[command(about = "Builds a car-drivable road network graph from OpenStreetMap extracts")]
    pub struct Cli {
        #[command(subcommand)]
        pub command: Command,

        /// Enable verbose output
        #[arg(short, long, global = true)]
        pub verbose: bool,

        /// Log CPU and memory usage after each stage
        #[arg(long, global = true)]
        pub monitor: bool,

        #[arg(long, value_enum, default_value_t = LogFormat::Compact, global = true)]
        pub log_format: LogFormat,
    }

    #[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
    pub enum LogFormat {
        Compact,
        Json,
    }

    #[derive(Debug, Subcommand)]
    pub enum Command {
        /// Run the whole pipeline from a TOML configuration file
        Run {
            #[arg(short, long, default_value = "roadnet.toml")]
            config: String,

            /// Override monitoring setting from config
            #[arg(long)]
            monitor_override: Option<bool>,

            /// Show what would be processed without executing
            #[arg(long)]
            dry_run: bool,
        },
        /// Extract the largest drivable component from an OSM PBF extract
        Extract(ExtractArgs),
        /// Add geodesic edge lengths to a saved graph
        Distances {
            #[arg(long, default_value = "data/processed/road_network.json")]
            input: String,
            #[arg(long, default_value = "data/processed/road_network_distance.json")]
            output: String,
        },
        /// Check node coordinates, edge geometry and connectivity of a saved graph
        Validate {
            #[arg(long, default_value = "data/processed/road_network.json")]
            input: String,
            /// Exit with an error when any problem is found
            #[arg(long)]
            strict: bool,
        },
        /// Render a saved graph as an interactive HTML map
        Visualize {
            #[arg(long, default_value = "data/processed/road_network_distance.json")]
            input: String,
            #[arg(
                long,
                default_value = "data/processed/interactive_road_network_map_distance.html"
            )]
            output: String,
            #[arg(long, default_value_t = crate::core::visualize::DEFAULT_MAX_MAP_EDGES)]
            max_edges: usize,
            #[arg(long, default_value_t = crate::core::visualize::DEFAULT_MAP_ZOOM)]
            zoom: u8,
        },
        /// Write node and edge CSV tables of a saved graph into a ZIP archive
        Export {
            #[arg(long, default_value = "data/processed/road_network_distance.json")]
            input: String,
            #[arg(long, default_value = "data/processed/road_network_tables.zip")]
            output: String,
        },
    }

    fn parse_bbox(value: &str) -> std::result::Result<BoundingBox, String> {
        let parts = value
            .split(',')
            .map(|p| p.trim().parse::<f64>())
            .collect::<std::result::Result<Vec<f64>, _>>()
            .map_err(|e| format!("invalid number in bbox: {}", e))?;
        match parts.as_slice() {
            [min_lon, min_lat, max_lon, max_lat] => {
                Ok(BoundingBox::new(*min_lon, *min_lat, *max_lon, *max_lat))
            }
            _ => Err("expected min_lon,min_lat,max_lon,max_lat".to_string()),
        }
    }

    #[derive(Debug, Clone, Args)]
    pub struct ExtractArgs {
        #[arg(long, default_value = "data/raw/malaysia-singapore-brunei-latest.osm.pbf")]
        pub osm_file: String,

        /// Region to geocode; repeat for several regions
        #[arg(
            long = "region",
            default_values = ["Selangor, Malaysia", "Kuala Lumpur, Malaysia"]
        )]
        pub regions: Vec<String>,

        /// Explicit box as min_lon,min_lat,max_lon,max_lat; skips geocoding
        #[arg(long, value_parser = parse_bbox, allow_hyphen_values = true)]
        pub bbox: Option<BoundingBox>,

        /// File listing accepted highway types, one per line
        #[arg(long)]
        pub road_types: Option<String>,

        #[arg(long, default_value = "data/processed")]
        pub output_dir: String,

        #[arg(long, default_value = "road_network.json")]
        pub output: String,

        /// Keep every component instead of only the largest one
        #[arg(long)]
        pub keep_all_components: bool,

        /// Also compute edge lengths
        #[arg(long)]
        pub with_distances: bool,

        #[arg(long, default_value = DEFAULT_GEOCODER_ENDPOINT)]
        pub geocoder: String,

        #[arg(long, default_value_t = 30)]
        pub timeout_seconds: u64,
    }

    impl ConfigProvider for ExtractArgs {
        fn osm_file(&self) -> &str {
            &self.osm_file
        }

        fn regions(&self) -> &[String] {
            &self.regions
        }

        fn bbox(&self) -> Option<BoundingBox> {
            self.bbox
        }

        fn road_types_file(&self) -> Option<&str> {
            self.road_types.as_deref()
        }

        fn output_path(&self) -> &str {
            &self.output_dir
        }

        fn graph_filename(&self) -> &str {
            &self.output
        }

        fn largest_component_only(&self) -> bool {
            !self.keep_all_components
        }

        fn add_distances(&self) -> bool {
            self.with_distances
        }

        fn validate_graph(&self) -> bool {
            false
        }

        fn map_filename(&self) -> Option<&str> {
            None
        }

        fn map_options(&self) -> MapOptions {
            MapOptions::default()
        }

        fn export_filename(&self) -> Option<&str> {
            None
        }

        fn geocoder_endpoint(&self) -> &str {
            &self.geocoder
        }

        fn request_timeout(&self) -> Duration {
            Duration::from_secs(self.timeout_seconds)
        }
    }

    impl Validate for ExtractArgs {
        fn validate(&self) -> Result<()> {
            validation::validate_path("osm_file", &self.osm_file)?;
            validation::validate_file_extensions(
                "osm_file",
                std::slice::from_ref(&self.osm_file),
                &["pbf"],
            )?;
            match &self.bbox {
                Some(bbox) => validation::validate_bbox("bbox", bbox)?,
                None => validation::validate_url("geocoder", &self.geocoder)?,
            }
            validation::validate_path("output_dir", &self.output_dir)?;
            validation::validate_positive_number(
                "timeout_seconds",
                self.timeout_seconds as usize,
                1,
            )?;
            Ok(())
        }
    }

}
