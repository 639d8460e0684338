use clap::{Parser, Subcommand};
use cli::{EvaluationManifest, EvaluationReport, Outcome};
use color_eyre::eyre::{Result, eyre};
use shapes::{DetectionResult, DetectorConfig, Pipeline};
use std::path::{Path, PathBuf};
use tracing::{error, info, warn};
use tracing_subscriber::{self, EnvFilter};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Detect shapes in a single image
    Detect {
        /// Path to the input image
        #[arg(short, long)]
        input: PathBuf,
        /// Detector configuration (.toml or .json)
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Write the detection result as JSON
        #[arg(long)]
        json: Option<PathBuf>,
        /// Write bounding boxes as a GeoJSON FeatureCollection
        #[arg(long)]
        geojson: Option<PathBuf>,
    },
    /// Score detection against a labeled image set
    Evaluate {
        /// Manifest listing image paths and expected shapes (.toml or .json)
        #[arg(short, long)]
        manifest: PathBuf,
        /// Detector configuration (.toml or .json)
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
    /// Print JSON schemas of the detector config and the detection result
    Schema,
}

fn main() -> Result<()> {
    color_eyre::install()?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info"))
        )
        .init();

    let cli = Cli::parse();

    match &cli.command {
        Commands::Detect { input, config, json, geojson } => {
            detect(input, config.as_deref(), json.as_deref(), geojson.as_deref())?;
        }
        Commands::Evaluate { manifest, config } => {
            evaluate(manifest, config.as_deref())?;
        }
        Commands::Schema => {
            print_schemas()?;
        }
    }

    Ok(())
}

fn load_pipeline(config_path: Option<&Path>) -> Result<Pipeline> {
    let config = match config_path {
        Some(path) => {
            let config = DetectorConfig::from_file(path)?;
            info!("Loaded detector config from {:?}", path);
            config
        }
        None => DetectorConfig::default(),
    };
    let pipeline = Pipeline::from_config(&config);
    info!("{}", pipeline.info());
    Ok(pipeline)
}

fn detect(
    input: &Path,
    config_path: Option<&Path>,
    json_output: Option<&Path>,
    geojson_output: Option<&Path>,
) -> Result<()> {
    let pipeline = load_pipeline(config_path)?;
    let result = pipeline.detect_file(input)?;

    report_shapes(input, &result);

    if let Some(path) = json_output {
        std::fs::write(path, result.to_json()?)?;
        info!("📄 Result saved to: {:?}", path);
    }
    if let Some(path) = geojson_output {
        result.save_geojson(path)?;
        info!("🗺️  GeoJSON saved to: {:?}", path);
    }

    Ok(())
}

fn report_shapes(input: &Path, result: &DetectionResult) {
    if result.is_empty() {
        warn!("No shapes found in {:?} ({:.2}ms)", input, result.processing_time);
        return;
    }

    info!(
        "Found {} shapes in {:?} ({}x{}, {:.2}ms)",
        result.shapes.len(),
        input,
        result.image_width,
        result.image_height,
        result.processing_time
    );
    for (i, shape) in result.shapes.iter().enumerate() {
        let bbox = shape.bounding_box;
        info!(
            "  {}. {} ({:.0}% confidence) at ({:.1}, {:.1}), box {}x{}+{}+{}, area {}",
            i + 1,
            shape.kind,
            shape.confidence * 100.0,
            shape.center.x,
            shape.center.y,
            bbox.width,
            bbox.height,
            bbox.x,
            bbox.y,
            shape.area
        );
    }
}

fn evaluate(manifest_path: &Path, config_path: Option<&Path>) -> Result<()> {
    let manifest = EvaluationManifest::from_file(manifest_path)?;
    let pipeline = load_pipeline(config_path)?;
    info!("🧪 Evaluating {} images from {:?}", manifest.images.len(), manifest_path);

    let mut report = EvaluationReport::default();
    for image in &manifest.images {
        let outcome = match pipeline.detect_file(&image.path) {
            Ok(result) => Outcome::score(image, &result),
            Err(e) => {
                error!("Failed to process {:?}: {}", image.path, e);
                Outcome::failed(image)
            }
        };

        let detected = outcome
            .detected
            .map(|kind| kind.to_string())
            .unwrap_or_else(|| "nothing".to_string());
        if outcome.correct {
            info!("✅ {:?}: {}", outcome.path, detected);
        } else {
            warn!("❌ {:?}: expected {}, got {}", outcome.path, outcome.expected, detected);
        }
        report.record(outcome);
    }

    info!(
        "Accuracy: {}/{} ({:.1}%)",
        report.correct(),
        report.outcomes.len(),
        report.accuracy() * 100.0
    );

    if report.correct() == 0 {
        return Err(eyre!("No image in {:?} was classified correctly", manifest_path));
    }
    Ok(())
}

fn print_schemas() -> Result<()> {
    let schemas = serde_json::json!({
        "config": DetectorConfig::schema(),
        "result": DetectionResult::schema(),
    });
    println!("{}", serde_json::to_string_pretty(&schemas)?);
    Ok(())
}
