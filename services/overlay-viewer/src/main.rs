//! Mask overlay viewer.
//!
//! Steps through a range of frames, assembling the overlay of each one from
//! its mask on disk and writing the visible layer as PNG snapshots.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use overlay_common::OverlayVisibility;
use tokio::sync::mpsc;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use overlay_viewer::{
    drive, AssemblerSettings, DirectoryLoader, DriveSummary, FrameEvent, OverlayAssembler,
    SnapshotSink, ViewerConfig,
};

#[derive(Parser, Debug)]
#[command(name = "overlay-viewer")]
#[command(about = "Segmentation mask overlay viewer")]
struct Args {
    /// YAML configuration file
    #[arg(short, long, env = "OVERLAY_CONFIG")]
    config: Option<PathBuf>,

    /// Directory holding `<prefix><index>.png` masks
    #[arg(long)]
    mask_dir: Option<PathBuf>,

    /// Directory snapshots are written to
    #[arg(long)]
    output_dir: Option<PathBuf>,

    /// First frame index
    #[arg(long)]
    start: Option<u32>,

    /// Number of frames to step through.
    ///
    /// Frames are requested as fast as they are produced, so a frame whose
    /// overlay is overtaken by a newer one gets no snapshot. Use
    /// `--sequential` to write a snapshot for every frame.
    #[arg(long)]
    count: Option<u32>,

    /// Wait for each frame's overlay before requesting the next
    #[arg(long)]
    sequential: bool,

    /// JSON contour style replacing the configured one
    #[arg(long)]
    style_file: Option<PathBuf>,

    /// Visible layer: fill, contours or hidden
    #[arg(long)]
    visibility: Option<OverlayVisibility>,

    /// Canvas width in pixels
    #[arg(long)]
    canvas_width: Option<u32>,

    /// Canvas height in pixels
    #[arg(long)]
    canvas_height: Option<u32>,

    /// Log level
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Emit logs as JSON
    #[arg(long)]
    json_logs: bool,
}

impl Args {
    /// Command-line flags take priority over file and environment.
    fn apply_to(&self, config: &mut ViewerConfig) {
        if let Some(dir) = &self.mask_dir {
            config.frames.mask_dir = dir.clone();
        }
        if let Some(dir) = &self.output_dir {
            config.output.dir = dir.clone();
        }
        if let Some(start) = self.start {
            config.frames.start = start;
        }
        if let Some(count) = self.count {
            config.frames.count = count;
        }
        if let Some(visibility) = self.visibility {
            config.visibility = visibility;
        }
        if let Some(width) = self.canvas_width {
            config.canvas.width = width;
        }
        if let Some(height) = self.canvas_height {
            config.canvas.height = height;
        }
        if let Some(path) = &self.style_file {
            config.style_file = Some(path.clone());
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment from .env file if present
    dotenvy::dotenv().ok();

    let args = Args::parse();

    // Initialize tracing
    let level = match args.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let builder = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(true);
    if args.json_logs {
        tracing::subscriber::set_global_default(builder.json().finish())?;
    } else {
        tracing::subscriber::set_global_default(builder.finish())?;
    }

    let mut config = ViewerConfig::load(args.config.as_deref())?;
    args.apply_to(&mut config);
    if args.style_file.is_some() {
        config.load_style_file()?;
    }
    config.validate()?;

    info!(
        mask_dir = %config.frames.mask_dir.display(),
        output_dir = %config.output.dir.display(),
        start = config.frames.start,
        count = config.frames.count,
        canvas = %format!("{}x{}", config.canvas.width, config.canvas.height),
        visibility = config.visibility.as_str(),
        sequential = args.sequential,
        "Starting overlay viewer"
    );

    let settings = AssemblerSettings::from_config(&config).context("Invalid overlay settings")?;
    let loader = DirectoryLoader::new(&config.frames.mask_dir);
    let sink = SnapshotSink::new(&config.output.dir).with_context(|| {
        format!("Failed to create output directory {:?}", config.output.dir)
    })?;

    let assembler = Arc::new(OverlayAssembler::with_visibility(
        loader,
        sink,
        settings,
        config.visibility,
    ));

    let start = config.frames.start;
    let end = start.saturating_add(config.frames.count);

    let summary = if args.sequential {
        let mut summary = DriveSummary::default();
        for frame_index in start..end {
            summary.record(assembler.advance(frame_index).await);
        }
        summary
    } else {
        let (tx, rx) = mpsc::channel::<FrameEvent>(32);
        tokio::spawn(async move {
            for frame_index in start..end {
                if tx.send(FrameEvent { frame_index }).await.is_err() {
                    break;
                }
            }
        });
        drive(assembler.clone(), rx).await
    };

    info!(
        applied = summary.applied,
        superseded = summary.superseded,
        no_overlay = summary.no_overlay,
        rejected = assembler.stats().rejected,
        "Overlay viewer finished"
    );

    Ok(())
}
