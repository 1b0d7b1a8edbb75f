use clap::{Parser, Subcommand, ValueEnum};
use cli::{BatchConfig, Target};
use color_eyre::eyre::{eyre, Result};
use footprint::{FootprintCommand, FootprintError, FootprintManager, FootprintReport, WcsOptions};
use std::path::{Path, PathBuf};
use tracing::{error, info};
use tracing_subscriber::{self, EnvFilter};

#[derive(Parser)]
#[command(author, version, about = "Physical size of sources in FITS images", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Table,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Measure length, breadth and diagonal of one FITS image or cube
    Measure {
        /// Path to the FITS file
        #[arg(short, long)]
        input: PathBuf,
        /// Distance to the source in megaparsecs
        #[arg(short, long)]
        distance_mpc: f64,
        /// Save a PNG with the rectangle and diagonal drawn over the image
        #[arg(long)]
        overlay: Option<PathBuf>,
        /// Save the rectangle, diagonal and hull as GeoJSON
        #[arg(long)]
        geojson: Option<PathBuf>,
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Table)]
        format: OutputFormat,
        /// Report non-standard WCS headers as warnings
        #[arg(long)]
        show_wcs_warnings: bool,
    },
    /// Measure every target listed in a TOML or JSON configuration file
    Batch {
        /// Path to the batch configuration file
        #[arg(short, long)]
        config: PathBuf,
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Table)]
        format: OutputFormat,
    },
    /// Print the JSON schema of target operations (or of the whole batch file)
    Schema {
        #[arg(long)]
        batch: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info"))
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Measure {
            input,
            distance_mpc,
            overlay,
            geojson,
            format,
            show_wcs_warnings,
        } => {
            measure(&input, distance_mpc, overlay, geojson, format, show_wcs_warnings)?;
        }
        Commands::Batch { config, format } => {
            batch(&config, format).await?;
        }
        Commands::Schema { batch } => {
            let schema = if batch {
                serde_json::to_string_pretty(&schemars::schema_for!(BatchConfig))?
            } else {
                serde_json::to_string_pretty(&FootprintCommand::schema())?
            };
            println!("{schema}");
        }
    }

    Ok(())
}

fn wcs_options(show_wcs_warnings: bool) -> WcsOptions {
    WcsOptions {
        suppress_fixed_warnings: !show_wcs_warnings,
    }
}

fn measure(
    input: &Path,
    distance_mpc: f64,
    overlay: Option<PathBuf>,
    geojson: Option<PathBuf>,
    format: OutputFormat,
    show_wcs_warnings: bool,
) -> Result<()> {
    let mut manager = FootprintManager::new().with_wcs_options(wcs_options(show_wcs_warnings));
    manager.load_fits(input)?;

    let command = match (&overlay, &geojson) {
        (Some(output), _) => FootprintCommand::MeasureWithOverlay {
            distance_mpc,
            output: output.display().to_string(),
        },
        (None, Some(output)) => FootprintCommand::MeasureWithGeoJson {
            distance_mpc,
            output: output.display().to_string(),
        },
        (None, None) => FootprintCommand::Measure { distance_mpc },
    };
    info!("Running '{}': {}", command, command.description());

    let report = manager.execute(&command)?;
    if let (Some(_), Some(path)) = (&overlay, &geojson) {
        report.save_geojson(path)?;
        info!("Saved GeoJSON to {}", path.display());
    }

    match format {
        OutputFormat::Table => print_table(&input.display().to_string(), &report),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
    }
    Ok(())
}

fn measure_target(target: &Target, options: WcsOptions) -> Result<FootprintReport, FootprintError> {
    let mut manager = FootprintManager::new().with_wcs_options(options);
    manager.load_fits(&target.path)?;
    manager.execute(&target.operation)
}

async fn batch(config_path: &Path, format: OutputFormat) -> Result<()> {
    let config = BatchConfig::from_file(config_path)?;
    let options = wcs_options(config.show_wcs_warnings);
    info!("Measuring {} target(s) from {}", config.targets.len(), config_path.display());

    let handles: Vec<_> = config
        .targets
        .iter()
        .cloned()
        .map(|target| tokio::task::spawn_blocking(move || measure_target(&target, options)))
        .collect();

    let mut failures = 0;
    let mut results = Vec::with_capacity(handles.len());
    for (target, handle) in config.targets.iter().zip(handles) {
        match handle.await? {
            Ok(report) => {
                if format == OutputFormat::Table {
                    print_table(&target.name, &report);
                }
                results.push(serde_json::json!({ "name": target.name, "report": report }));
            }
            Err(err) => {
                failures += 1;
                error!(name = %target.name, path = %target.path, "{err}");
                results.push(serde_json::json!({ "name": target.name, "error": err.to_string() }));
            }
        }
    }

    if format == OutputFormat::Json {
        println!("{}", serde_json::to_string_pretty(&results)?);
    }

    if failures > 0 {
        return Err(eyre!("{failures} of {} target(s) failed", config.targets.len()));
    }
    info!("✅ Batch completed!");
    Ok(())
}

fn print_table(name: &str, report: &FootprintReport) {
    println!(
        "{name}: {} valid pixels, {:.4}\" x {:.4}\" per pixel, {} Mpc",
        report.valid_pixels,
        report.pixel_scale.x_arcsec(),
        report.pixel_scale.y_arcsec(),
        report.distance.megaparsecs()
    );
    println!("{}", report.table);
}
