use clap::Parser;
use std::path::PathBuf;

use detexport::config::{DEFAULT_CONF_THRESHOLD, DEFAULT_DEVICE, DEFAULT_INPUT_SIZE, DEFAULT_IOU_THRESHOLD};
use detexport::{ExportFlags, RunConfig};

#[derive(Parser)]
#[command(name = "detexport")]
#[command(about = "Run a YOLO model over a folder of images and export the detections")]
struct Cli {
    /// Path to the model weights (.rten)
    #[arg(value_name = "WEIGHTS")]
    weights: PathBuf,

    /// Folder containing the images
    #[arg(value_name = "IMAGES")]
    images: PathBuf,

    /// Output folder (default: inference_results next to the images folder)
    #[arg(short, long, value_name = "DIR")]
    output: Option<PathBuf>,

    /// Save cropped detection images
    #[arg(long)]
    save_crops: bool,

    /// Save detection labels in YOLO format
    #[arg(long)]
    save_labels: bool,

    /// Save images with bounding boxes drawn
    #[arg(long)]
    save_annotated: bool,

    /// Confidence threshold
    #[arg(long, default_value_t = DEFAULT_CONF_THRESHOLD)]
    conf: f32,

    /// Device to run inference on
    #[arg(long, default_value = DEFAULT_DEVICE)]
    device: String,

    /// Class names file, one name per line
    #[arg(long, value_name = "FILE")]
    names: Option<PathBuf>,

    /// IoU threshold for non-maximum suppression
    #[arg(long, default_value_t = DEFAULT_IOU_THRESHOLD)]
    iou: f32,

    /// Model input size in pixels
    #[arg(long, default_value_t = DEFAULT_INPUT_SIZE)]
    imgsz: u32,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> anyhow::Result<()> {
    let args = Cli::parse();

    let default_filter = if args.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter)).init();

    let config = RunConfig::new(args.weights, args.images)
        .with_output_dir(args.output)
        .with_flags(ExportFlags {
            save_crops: args.save_crops,
            save_labels: args.save_labels,
            save_annotated: args.save_annotated,
        })
        .with_conf_threshold(args.conf)
        .with_device(args.device)
        .with_names(args.names)
        .with_iou_threshold(args.iou)
        .with_input_size(args.imgsz);

    let summary = detexport::run(&config)?;

    // the driver already reported the empty folder
    if summary.total_images == 0 {
        return Ok(());
    }

    println!("\nInference completed!");
    println!("{}", summary);

    Ok(())
}
