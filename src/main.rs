use clap::{Parser, Subcommand};
use image::codecs::jpeg::JpegEncoder;
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::mpsc;
use std::thread;
use tessera::batch::{BatchCoordinator, BatchOutcome};
use tessera::buffer::PixelBuffer;
use tessera::config::{self, EngineConfig};
use tessera::engine::FilterEngine;
use tessera::histogram::{compute_histogram, compute_statistics};
use tessera::imaging::FilterSpec;
use tessera::output;
use tessera::tiling::{CancelToken, TileOutcome};
use tracing::{debug, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "tessera")]
#[command(about = "Tile-parallel photo filters")]
#[command(long_about = "\
Tile-parallel photo filters

Filters are written as name[:p1,p2,...]:

  grayscale  sepia  negative  sharpen  edge_detection
  brightness:V   contrast:V   saturation:V      V in -100..100
  blur:R         R in 1..25
  posterize:L    L >= 2
  vignette:I     I in 0..1
  rotate:DEG     flip:true (horizontal) | flip:false (vertical)
  crop:LEFT,TOP,RIGHT,BOTTOM    (clamped to the image)
  resize:SCALE   SCALE > 0

Examples:
  tessera apply photo.jpg blur:5 -o soft.jpg
  tessera pipeline photo.jpg brightness:20 contrast:10 rotate:90 -o out.png
  tessera batch sepia a.jpg b.jpg c.jpg --out-dir sepia/

Run 'tessera gen-config' to generate a documented tessera.toml.")]
#[command(version = env!("TESSERA_VERSION"))]
struct Cli {
    /// Config file (defaults apply when omitted)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log engine activity to stderr (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Apply one filter, tiled across the worker pool
    Apply {
        input: PathBuf,
        filter: FilterSpec,
        /// Output image
        #[arg(short, long)]
        output: PathBuf,
        /// Downsample to the preview size before filtering
        #[arg(long)]
        preview: bool,
    },
    /// Apply several filters in order
    Pipeline {
        input: PathBuf,
        #[arg(required = true)]
        filters: Vec<FilterSpec>,
        /// Output image
        #[arg(short, long)]
        output: PathBuf,
    },
    /// Apply one filter to many images
    Batch {
        filter: FilterSpec,
        #[arg(required = true)]
        inputs: Vec<PathBuf>,
        /// Directory for results (same file names as the inputs)
        #[arg(long)]
        out_dir: PathBuf,
    },
    /// Show channel histograms and statistics
    Histogram {
        input: PathBuf,
        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// Estimate processing time without touching pixels
    Estimate {
        filter: FilterSpec,
        #[arg(required = true)]
        inputs: Vec<PathBuf>,
    },
    /// Print a stock tessera.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    let config_path = cli.config.as_deref();
    let cancel = CancelToken::new();

    match cli.command {
        Command::Apply {
            input,
            filter,
            output: out_path,
            preview,
        } => {
            let (engine_config, engine) = build_engine(config_path)?;
            let source = load_image(&input)?;
            let result = if preview {
                Some(engine.preview(&source, &filter)?)
            } else {
                let label = filter.display_name();
                let (tx, rx) = mpsc::channel();
                let printer = thread::spawn(move || {
                    for event in rx {
                        for line in output::format_progress_event(label, &event) {
                            println!("{}", line);
                        }
                    }
                });
                let outcome = engine.apply_tiled(&source, &filter, &cancel, Some(tx));
                printer.join().map_err(|_| "progress printer panicked")?;
                outcome?.completed()
            };
            if let Some(result) = result {
                save_image(&result, &out_path, &engine_config)?;
                println!("==> Wrote {}", out_path.display());
            }
        }
        Command::Pipeline {
            input,
            filters,
            output: out_path,
        } => {
            let (engine_config, engine) = build_engine(config_path)?;
            let source = Arc::new(load_image(&input)?);
            let (tx, rx) = mpsc::channel();
            let printer = thread::spawn(move || {
                for event in rx {
                    for line in output::format_pipeline_event(&event) {
                        println!("{}", line);
                    }
                }
            });
            let outcome =
                BatchCoordinator::new(&engine).pipeline(&source, &filters, &cancel, Some(tx));
            printer.join().map_err(|_| "progress printer panicked")?;
            if let TileOutcome::Completed(result) = outcome? {
                save_image(&result, &out_path, &engine_config)?;
                println!("Cache: {}", engine.cache_stats());
                println!("==> Wrote {}", out_path.display());
            }
        }
        Command::Batch {
            filter,
            inputs,
            out_dir,
        } => {
            let (engine_config, engine) = build_engine(config_path)?;
            std::fs::create_dir_all(&out_dir)?;
            let sources = inputs
                .iter()
                .map(|path| load_image(path).map(Arc::new))
                .collect::<Result<Vec<_>, _>>()?;
            let names: Vec<String> = inputs.iter().map(|p| file_name(p)).collect();

            let printer_names = names.clone();
            let (tx, rx) = mpsc::channel();
            let printer = thread::spawn(move || {
                for event in rx {
                    for line in output::format_batch_event(&event, &printer_names) {
                        println!("{}", line);
                    }
                }
            });
            let outcome =
                BatchCoordinator::new(&engine).batch(&sources, &filter, &cancel, Some(tx));
            printer.join().map_err(|_| "progress printer panicked")?;
            if let BatchOutcome::Completed(results) = outcome? {
                for (name, result) in names.iter().zip(&results) {
                    save_image(result, &out_dir.join(name), &engine_config)?;
                }
                println!("==> Wrote {} images to {}", results.len(), out_dir.display());
            }
        }
        Command::Histogram { input, json } => {
            let source = load_image(&input)?;
            let histogram = compute_histogram(&source);
            let statistics = compute_statistics(&source);
            if json {
                let value = serde_json::json!({
                    "histogram": histogram,
                    "statistics": statistics,
                    "overall_mean": statistics.overall_mean(),
                });
                println!("{}", serde_json::to_string_pretty(&value)?);
            } else {
                output::print_histogram(&histogram, &statistics);
            }
        }
        Command::Estimate { filter, inputs } => {
            let (_, engine) = build_engine(config_path)?;
            let coordinator = BatchCoordinator::new(&engine);
            let mut all_dims = Vec::with_capacity(inputs.len());
            for path in &inputs {
                let dims = image::image_dimensions(path)?;
                let estimate = coordinator.estimate(dims, &filter);
                println!("{}", output::format_estimate(&file_name(path), estimate));
                all_dims.push(dims);
            }
            if all_dims.len() > 1 {
                let total = coordinator.estimate_batch(&all_dims, &filter);
                println!("{}", output::format_estimate("Total", total));
            }
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

/// Load config (stock defaults when no file is given) and build the engine.
fn build_engine(
    config_path: Option<&Path>,
) -> Result<(EngineConfig, FilterEngine), Box<dyn std::error::Error>> {
    let engine_config = config::load_config(config_path)?;
    debug!(?engine_config, "loaded config");
    let engine = FilterEngine::new(&engine_config)?;
    Ok((engine_config, engine))
}

/// Install the stderr log subscriber. Quiet unless `--verbose` or `RUST_LOG`.
fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "warn" };

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| format!("tessera={}", level).into());

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();
}

fn load_image(path: &Path) -> Result<PixelBuffer, Box<dyn std::error::Error>> {
    let img = image::open(path)?;
    info!(path = %path.display(), width = img.width(), height = img.height(), "decoded");
    Ok(PixelBuffer::from_dynamic_image(img)?)
}

/// Encode by extension. JPEG honours `[output] quality` and drops alpha.
fn save_image(
    buffer: &PixelBuffer,
    path: &Path,
    config: &EngineConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    let img = buffer.clone().into_dynamic_image();
    let is_jpeg = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("jpg") || e.eq_ignore_ascii_case("jpeg"));

    if is_jpeg {
        let quality = config.output.quality.value();
        let writer = BufWriter::new(File::create(path)?);
        let mut encoder = JpegEncoder::new_with_quality(writer, quality);
        encoder.encode_image(&img.to_rgb8())?;
    } else {
        img.save(path)?;
    }
    debug!(path = %path.display(), "encoded");
    Ok(())
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|f| f.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
