use std::{fs, path::PathBuf, sync::Arc};

use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use serde_json::json;
use thumbframe::{
    FfmpegLogLevel, ProgressEvent, ProgressListener, ThumbnailRequest, ThumbnailService,
};

const CLI_AFTER_HELP: &str = "Examples:\n  thumbframe thumbnail input.mp4 --out thumb.png --time-ms 5000\n  thumbframe thumbnail input.mp4 --out thumb.png --strategy keyframe --progress\n  thumbframe duration input.mp4\n  thumbframe metadata input.mp4 --json\n  thumbframe completions zsh > _thumbframe";

#[derive(Debug, Parser)]
#[command(
    name = "thumbframe",
    version,
    about = "Extract single-frame thumbnails, durations, and metadata from video files",
    after_help = CLI_AFTER_HELP
)]
struct Cli {
    /// Show a progress bar where supported.
    #[arg(long, global = true)]
    progress: bool,

    /// FFmpeg log level (quiet, panic, fatal, error, warning, info, verbose, debug, trace).
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Extract a single thumbnail frame.
    #[command(
        about = "Extract a thumbnail frame as PNG or raw RGBA",
        after_help = "Examples:\n  thumbframe thumbnail input.mp4 --out thumb.png\n  thumbframe thumbnail input.mp4 --out thumb.rgba --raw --width 320 --height 180"
    )]
    Thumbnail {
        /// Input media path.
        input: String,
        /// Output image path.
        #[arg(long)]
        out: PathBuf,
        /// Fallback width when --width is not given.
        #[arg(long, default_value_t = 720)]
        size: u32,
        /// Output width in pixels.
        #[arg(long)]
        width: Option<u32>,
        /// Output height in pixels (default: width * 9/16).
        #[arg(long)]
        height: Option<u32>,
        /// Target time in milliseconds.
        #[arg(long, default_value_t = 1000)]
        time_ms: u64,
        /// Frame-selection strategy (normal, keyframe, firstFrame).
        #[arg(long, default_value = "normal")]
        strategy: String,
        /// Write the raw RGBA8888 buffer instead of encoding an image.
        #[arg(long)]
        raw: bool,
    },

    /// Print the video duration in milliseconds.
    Duration {
        /// Input media path.
        input: String,
    },

    /// Print video metadata (alias: probe).
    #[command(visible_alias = "probe")]
    Metadata {
        /// Input media path.
        input: String,

        /// Output metadata as machine-readable JSON.
        #[arg(long)]
        json: bool,
    },

    /// Generate shell completions.
    Completions {
        /// Target shell.
        shell: Shell,
    },
}

/// Drives an indicatif bar from the service's progress stream.
struct BarListener {
    bar: ProgressBar,
}

impl ProgressListener for BarListener {
    fn on_progress(&self, event: &ProgressEvent) {
        self.bar.set_position((event.progress * 100.0) as u64);
    }
}

fn parse_log_level(value: &str) -> Option<FfmpegLogLevel> {
    match value.to_ascii_lowercase().as_str() {
        "quiet" => Some(FfmpegLogLevel::Quiet),
        "panic" => Some(FfmpegLogLevel::Panic),
        "fatal" => Some(FfmpegLogLevel::Fatal),
        "error" => Some(FfmpegLogLevel::Error),
        "warning" => Some(FfmpegLogLevel::Warning),
        "info" => Some(FfmpegLogLevel::Info),
        "verbose" => Some(FfmpegLogLevel::Verbose),
        "debug" => Some(FfmpegLogLevel::Debug),
        "trace" => Some(FfmpegLogLevel::Trace),
        _ => None,
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    if let Some(level) = &cli.log_level {
        let parsed =
            parse_log_level(level).ok_or(format!("unsupported --log-level: {level}"))?;
        thumbframe::set_ffmpeg_log_level(parsed);
    }

    match cli.command {
        Commands::Thumbnail {
            input,
            out,
            size,
            width,
            height,
            time_ms,
            strategy,
            raw,
        } => {
            let service = ThumbnailService::with_ffmpeg()?;

            let mut request = ThumbnailRequest::new(&input)
                .with_size(size)
                .with_time_ms(time_ms)
                .with_strategy(&strategy);
            if let Some(width) = width {
                request = request.with_width(width);
            }
            if let Some(height) = height {
                request = request.with_height(height);
            }

            let progress_bar = if cli.progress {
                let pb = ProgressBar::new(100);
                let style = ProgressStyle::with_template(
                    "{spinner:.green} {bar:40.cyan/blue} {pos}% {msg}",
                )?;
                pb.set_style(style.progress_chars("##-"));
                service.progress().register(Arc::new(BarListener { bar: pb.clone() }));
                request = request.with_request_id("cli");
                Some(pb)
            } else {
                None
            };

            let plan = request.normalize()?;
            let rgba = service.extract(&request)?;

            if let Some(pb) = progress_bar {
                pb.finish_with_message("done");
            }

            if raw {
                fs::write(&out, &rgba)?;
            } else {
                let image = image::RgbaImage::from_raw(plan.width, plan.height, rgba)
                    .ok_or("thumbnail buffer had unexpected length")?;
                image.save(&out)?;
            }

            println!(
                "{} {}",
                "saved".green().bold(),
                format!("{} ({}x{})", out.display(), plan.width, plan.height)
            );
        }
        Commands::Duration { input } => {
            let service = ThumbnailService::with_ffmpeg()?;
            let duration_ms = service.duration(&input)?;
            println!("{duration_ms}");
        }
        Commands::Metadata { input, json } => {
            let service = ThumbnailService::with_ffmpeg()?;
            let metadata = service.metadata(&input)?;

            if json {
                let payload = json!({
                    "path": input,
                    "metadata": metadata.to_json(),
                });
                println!("{}", serde_json::to_string_pretty(&payload)?);
            } else {
                println!("{}", input.bold());
                println!("  dimensions: {}x{}", metadata.width, metadata.height);
                println!("  duration:   {} ms", metadata.duration_ms());
                println!("  codec:      {}", metadata.codec);
                println!("  fps:        {:.2}", metadata.frames_per_second);
                if let Some(bit_rate) = metadata.bit_rate {
                    println!("  bit rate:   {bit_rate} b/s");
                }
                if let Some(rotation) = metadata.rotation {
                    println!("  rotation:   {rotation}°");
                }
            }
        }
        Commands::Completions { shell } => {
            let mut command = Cli::command();
            let name = command.get_name().to_string();
            clap_complete::generate(shell, &mut command, name, &mut std::io::stdout());
        }
    }

    Ok(())
}

fn main() {
    if let Err(error) = run() {
        eprintln!("{} {error}", "error:".red().bold());
        std::process::exit(1);
    }
}
