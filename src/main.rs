use clap::Parser;
use roadnet_etl::core::export::export_tables;
use roadnet_etl::core::geodesic::add_edge_distances;
use roadnet_etl::core::graph_store::{load_graph, save_graph};
use roadnet_etl::core::validate::validate_graph;
use roadnet_etl::core::visualize::{render_map_html, MapOptions};
use roadnet_etl::core::{ConfigProvider, Storage};
use roadnet_etl::utils::{logger, validation::Validate};
use roadnet_etl::{
    Cli, Command, EtlEngine, LocalStorage, LogFormat, RoadNetworkPipeline, RoadnetError,
    TomlConfig,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.log_format {
        LogFormat::Compact => logger::init_cli_logger(cli.verbose),
        LogFormat::Json => logger::init_json_logger(cli.verbose),
    }
    tracing::debug!("CLI arguments: {:?}", cli);

    let result = match cli.command {
        Command::Run {
            config,
            monitor_override,
            dry_run,
        } => {
            tracing::info!("📁 Loading configuration from: {}", config);
            let toml = match TomlConfig::from_file(&config) {
                Ok(toml) => toml,
                Err(e) => fail("Configuration loading", &e),
            };

            if let Err(e) = toml.validate() {
                fail("Configuration validation", &e);
            }
            tracing::info!("✅ Configuration loaded and validated");
            display_config_summary(&toml);

            if dry_run {
                perform_dry_run(&toml);
                return Ok(());
            }

            let monitor = monitor_override.unwrap_or(cli.monitor || toml.monitoring_enabled());
            let storage = LocalStorage::new(toml.output_path());
            tracing::info!("💾 Writing outputs under {}", storage.base_path().display());
            let pipeline = RoadNetworkPipeline::from_config(storage, toml);
            run_pipeline(EtlEngine::new_with_monitoring(pipeline, monitor)).await
        }
        Command::Extract(args) => {
            if let Err(e) = args.validate() {
                fail("Argument validation", &e);
            }
            let storage = LocalStorage::new(args.output_path());
            let pipeline = RoadNetworkPipeline::from_config(storage, args);
            run_pipeline(EtlEngine::new_with_monitoring(pipeline, cli.monitor)).await
        }
        Command::Distances { input, output } => distances(&input, &output).await,
        Command::Validate { input, strict } => validate(&input, strict).await,
        Command::Visualize {
            input,
            output,
            max_edges,
            zoom,
        } => {
            let options = MapOptions {
                max_edges,
                zoom,
                ..Default::default()
            };
            visualize(&input, &output, &options).await
        }
        Command::Export { input, output } => export(&input, &output).await,
    };

    if let Err(e) = result {
        fail("Command", &e);
    }
    Ok(())
}

fn fail(stage: &str, e: &RoadnetError) -> ! {
    tracing::error!(
        "❌ {} failed: {} (Category: {:?}, Severity: {:?})",
        stage,
        e,
        e.category(),
        e.severity()
    );
    tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());
    eprintln!("❌ {}", e.user_friendly_message());
    eprintln!("💡 Suggestion: {}", e.recovery_suggestion());
    std::process::exit(e.exit_code());
}

async fn run_pipeline<P: roadnet_etl::core::Pipeline>(
    engine: EtlEngine<P>,
) -> roadnet_etl::Result<()> {
    let output_path = engine.run().await?;
    tracing::info!("✅ Road network ETL completed");
    println!("✅ Road network ETL completed successfully!");
    println!("📁 Graph saved to: {}", output_path);
    Ok(())
}

fn working_dir() -> LocalStorage {
    LocalStorage::new(".")
}

async fn distances(input: &str, output: &str) -> roadnet_etl::Result<()> {
    let storage = working_dir();
    let mut graph = load_graph(&storage, input).await?;
    let updated = add_edge_distances(&mut graph);
    save_graph(&storage, output, &graph).await?;
    println!("✅ Added distances to {} edges, saved to {}", updated, output);
    Ok(())
}

async fn validate(input: &str, strict: bool) -> roadnet_etl::Result<()> {
    let graph = load_graph(&working_dir(), input).await?;
    let report = validate_graph(&graph);

    println!("📋 Validation Summary:");
    println!("  Nodes: {}", report.node_count);
    println!("  Edges: {}", report.edge_count);
    println!(
        "  Nodes missing coordinates: {}",
        report.nodes_missing_coordinates.len()
    );
    println!("  Edges missing geometry: {}", report.edges_missing_geometry);
    println!(
        "  Edges with unknown endpoints: {}",
        report.edges_with_unknown_nodes
    );
    println!("  Weakly connected components: {}", report.component_count);

    if strict && !report.is_clean() {
        return Err(RoadnetError::ValidationError {
            message: format!("{} failed validation", input),
        });
    }
    Ok(())
}

async fn visualize(input: &str, output: &str, options: &MapOptions) -> roadnet_etl::Result<()> {
    let storage = working_dir();
    let graph = load_graph(&storage, input).await?;
    let html = render_map_html(&graph, options);
    storage.write_file(output, html.as_bytes()).await?;
    tracing::info!("Interactive map saved to {}", output);
    println!("🗺️  Map saved to: {}", output);
    Ok(())
}

async fn export(input: &str, output: &str) -> roadnet_etl::Result<()> {
    let storage = working_dir();
    let graph = load_graph(&storage, input).await?;
    let data = export_tables(&graph)?;
    storage.write_file(output, &data).await?;
    println!("📦 Tables saved to: {}", output);
    Ok(())
}

fn display_config_summary(config: &TomlConfig) {
    println!("📋 Configuration Summary:");
    println!(
        "  Pipeline: {} v{}",
        config.pipeline.name, config.pipeline.version
    );
    if let Some(description) = &config.pipeline.description {
        println!("  Description: {}", description);
    }
    println!("  OSM extract: {}", config.osm_file());
    match config.bbox() {
        Some(bbox) => println!("  Bounding box: {}", bbox),
        None => println!("  Regions: {}", config.regions().join(" | ")),
    }
    println!(
        "  Output: {}/{}",
        config.output_path(),
        config.graph_filename()
    );
    println!();
}

fn perform_dry_run(config: &TomlConfig) {
    println!("🔍 Dry Run Analysis:");
    println!();

    println!("📡 Boundary:");
    match config.bbox() {
        Some(bbox) => println!("  Fixed bounding box {}, no geocoding", bbox),
        None => {
            println!("  Geocoder: {}", config.geocoder_endpoint());
            for region in config.regions() {
                println!("  - {}", region);
            }
        }
    }

    println!();
    println!("⚙️ Extraction:");
    println!(
        "  Road types: {}",
        config.road_types_file().unwrap_or("built-in car road types")
    );
    println!(
        "  Largest component only: {}",
        config.largest_component_only()
    );

    println!();
    println!("🛠️ Transform:");
    println!("  Edge distances: {}", config.add_distances());
    println!("  Validation: {}", config.validate_graph());

    println!();
    println!("💾 Outputs:");
    println!("  Graph: {}", config.graph_filename());
    if let Some(map) = config.map_filename() {
        let options = config.map_options();
        println!("  Map: {} (up to {} edges)", map, options.max_edges);
    }
    if let Some(export) = config.export_filename() {
        println!("  CSV tables: {}", export);
    }

    println!();
    println!("✅ Dry run complete. Use --verbose for more details during the actual run.");
}
