//! Reelsmith CLI: render scene manifests into finished videos.
//!
//! Usage:
//!   reelsmith render <MANIFEST> -o <OUT>   Render a manifest to MP4
//!   reelsmith thumbnail <VIDEO> -o <JPG>   Grab a thumbnail frame
//!   reelsmith chapters <MANIFEST>          Print the chapter list
//!   reelsmith validate <MANIFEST>          Validate a manifest
//!   reelsmith check                        Check ffmpeg/ffprobe availability

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use reelsmith_common::config::AppConfig;

mod commands;

#[derive(Parser)]
#[command(
    name = "reelsmith",
    about = "Turn still images and narration into narrated videos",
    version,
    author
)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Config file (defaults to the per-user config location)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render a manifest to an MP4 file
    Render {
        /// Path to the manifest JSON
        manifest: PathBuf,

        /// Output file path
        #[arg(short, long)]
        output: PathBuf,

        /// Directory for intermediate clips (removed afterwards unless given)
        #[arg(long)]
        work_dir: Option<PathBuf>,

        /// Output width (overrides the manifest; requires --height)
        #[arg(long, requires = "height")]
        width: Option<u32>,

        /// Output height (overrides the manifest; requires --width)
        #[arg(long, requires = "width")]
        height: Option<u32>,

        /// Target video bitrate in kbps
        #[arg(long)]
        bitrate_kbps: Option<u32>,

        /// Also write a thumbnail to this path
        #[arg(long)]
        thumbnail: Option<PathBuf>,

        /// Also write chapters to this path (.json or text)
        #[arg(long)]
        chapters: Option<PathBuf>,

        /// Print the render report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Extract a thumbnail frame from a video
    Thumbnail {
        /// Source video
        video: PathBuf,

        /// Output JPEG path
        #[arg(short, long)]
        output: PathBuf,

        /// Timestamp in seconds
        #[arg(long)]
        at: Option<f64>,
    },

    /// Print chapters for a manifest
    Chapters {
        /// Path to the manifest JSON
        manifest: PathBuf,

        /// Realized scene durations (comma separated); nominal durations otherwise
        #[arg(long, value_delimiter = ',')]
        durations: Option<Vec<f64>>,

        /// Print JSON instead of the text list
        #[arg(long)]
        json: bool,
    },

    /// Validate a manifest and its assets
    Validate {
        /// Path to the manifest JSON
        manifest: PathBuf,
    },

    /// Check that ffmpeg and ffprobe are usable
    Check,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => AppConfig::load_from(path),
        None => AppConfig::load(),
    };
    if cli.verbose {
        config.logging.level = "debug".to_string();
    }
    reelsmith_common::logging::init_logging(&config.logging);

    match cli.command {
        Commands::Render {
            manifest,
            output,
            work_dir,
            width,
            height,
            bitrate_kbps,
            thumbnail,
            chapters,
            json,
        } => {
            commands::render::run(
                &config,
                commands::render::RenderArgs {
                    manifest,
                    output,
                    work_dir,
                    size: width.zip(height),
                    bitrate_kbps,
                    thumbnail,
                    chapters,
                    json,
                },
            )
            .await
        }
        Commands::Thumbnail { video, output, at } => {
            commands::thumbnail::run(&config, video, output, at).await
        }
        Commands::Chapters {
            manifest,
            durations,
            json,
        } => commands::chapters::run(manifest, durations, json),
        Commands::Validate { manifest } => commands::validate::run(manifest),
        Commands::Check => commands::check::run(&config),
    }
}
