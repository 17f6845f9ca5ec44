use std::{fs, path::PathBuf, process::ExitCode};

use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use colored::Colorize;
use framegrab::{
    ExtractOptions, FfmpegLogLevel, FramegrabError, MediaSource, frame_to_image, probe_metadata,
};
use indicatif::{ProgressBar, ProgressStyle};
use serde_json::json;

const CLI_AFTER_HELP: &str = "Examples:\n  framegrab shape input.mp4 --json\n  framegrab extract input.mp4 --out frames.rgb --start 120 --step 10 --frames 16\n  framegrab extract input.mp4 --out frames/ --format png --progress\n  framegrab completions zsh > _framegrab";

#[derive(Debug, Parser)]
#[command(
    name = "framegrab",
    version,
    about = "Probe video shapes and extract strided frames as flat RGB24",
    after_help = CLI_AFTER_HELP
)]
struct Cli {
    #[command(flatten)]
    global: GlobalOptions,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Parser, Clone, Default)]
struct GlobalOptions {
    /// Show additional output.
    #[arg(long)]
    verbose: bool,

    /// Demux the input from memory instead of by path (reads the whole file
    /// first).
    #[arg(long)]
    in_memory: bool,

    /// I/O buffer size in bytes for in-memory demuxing (0 = default).
    #[arg(long, default_value_t = 0)]
    io_buffer_size: usize,

    /// FFmpeg log level (quiet, panic, fatal, error, warning, info, verbose, debug, trace).
    #[arg(long)]
    log_level: Option<String>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Print the expected extraction shape of a video.
    #[command(
        about = "Print expected shape (frames, height, width)",
        visible_alias = "probe",
        after_help = "Examples:\n  framegrab shape input.mp4\n  framegrab shape input.mp4 --json"
    )]
    Shape {
        /// Input media path or URL.
        input: String,

        /// Output as machine-readable JSON.
        #[arg(long)]
        json: bool,
    },

    /// Extract strided frames to a raw RGB file or a directory of PNGs.
    #[command(
        about = "Extract strided frames",
        after_help = "Examples:\n  framegrab extract input.mp4 --out all.rgb\n  framegrab extract input.mp4 --out thumbs/ --format png --step 30 --progress"
    )]
    Extract {
        /// Input media path or URL.
        input: String,
        /// Output path: a file for raw output, a directory for png.
        #[arg(long)]
        out: PathBuf,
        /// Index of the first frame to extract.
        #[arg(long, default_value_t = 0)]
        start: u64,
        /// Extract every Nth frame.
        #[arg(long, default_value_t = 1)]
        step: u64,
        /// Maximum number of frames to extract.
        #[arg(long)]
        frames: Option<u64>,
        /// Output format: raw | png.
        #[arg(long, default_value = "raw")]
        format: String,
        /// Show a progress bar.
        #[arg(long)]
        progress: bool,
    },

    /// Generate shell completion scripts.
    #[command(about = "Generate shell completions")]
    Completions {
        /// Target shell.
        shell: Shell,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Some(level) = &cli.global.log_level {
        match parse_log_level(level) {
            Some(level) => framegrab::set_ffmpeg_log_level(level),
            None => {
                eprintln!("{} unknown log level '{level}'", "error:".red().bold());
                return ExitCode::FAILURE;
            }
        }
    }

    let result = match cli.command {
        Commands::Shape { ref input, json } => run_shape(&cli.global, input, json),
        Commands::Extract {
            ref input,
            ref out,
            start,
            step,
            frames,
            ref format,
            progress,
        } => run_extract(&cli.global, input, out, start, step, frames, format, progress),
        Commands::Completions { shell } => {
            let mut command = Cli::command();
            clap_complete::generate(shell, &mut command, "framegrab", &mut std::io::stdout());
            Ok(())
        }
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            eprintln!("{} {error}", "error:".red().bold());
            ExitCode::FAILURE
        }
    }
}

/// Read the input up front when demuxing from memory; otherwise borrow the
/// path. The returned blob keeps byte sources alive for the call.
fn load_source(global: &GlobalOptions, input: &str) -> Result<Option<Vec<u8>>, FramegrabError> {
    if global.in_memory {
        Ok(Some(fs::read(input)?))
    } else {
        Ok(None)
    }
}

fn source_for<'a>(input: &str, blob: &'a Option<Vec<u8>>) -> MediaSource<'a> {
    match blob {
        Some(bytes) => MediaSource::bytes(bytes),
        None => MediaSource::path(input),
    }
}

fn run_shape(global: &GlobalOptions, input: &str, json: bool) -> Result<(), FramegrabError> {
    let blob = load_source(global, input)?;
    let source = source_for(input, &blob);
    let metadata = probe_metadata(&source, global.io_buffer_size)?;
    let shape = metadata.shape;

    if json {
        let value = json!({
            "input": input,
            "frame_count": shape.frame_count,
            "height": shape.height,
            "width": shape.width,
            "frames_per_second": metadata.frames_per_second,
            "duration_seconds": metadata.duration.as_secs_f64(),
            "codec": metadata.codec,
            "rgb24_bytes": shape.num_bytes(),
        });
        println!("{}", serde_json::to_string_pretty(&value).unwrap_or_default());
    } else {
        println!("{}", input.bold());
        println!(
            "  shape: {} frames x {} x {} (RGB24, {} bytes)",
            shape.frame_count,
            shape.height,
            shape.width,
            shape.num_bytes(),
        );
        println!(
            "  codec: {}, {:.3} fps, {:.3} s",
            metadata.codec,
            metadata.frames_per_second,
            metadata.duration.as_secs_f64(),
        );
    }
    Ok(())
}

#[allow(clippy::too_many_arguments)]
fn run_extract(
    global: &GlobalOptions,
    input: &str,
    out: &PathBuf,
    start: u64,
    step: u64,
    frames: Option<u64>,
    format: &str,
    progress: bool,
) -> Result<(), FramegrabError> {
    let blob = load_source(global, input)?;
    let source = source_for(input, &blob);

    let metadata = probe_metadata(&source, global.io_buffer_size)?;
    let shape = metadata.shape;
    let frame_bytes = shape.frame_bytes();

    let available = shape.frame_count.saturating_sub(start).div_ceil(step.max(1));
    let expected = frames.map_or(available, |limit| available.min(limit));

    if global.verbose {
        println!(
            "{} {} frames of {}x{} from {input} (start={start}, step={step})",
            "extracting".cyan(),
            expected,
            shape.width,
            shape.height,
        );
    }

    let bar = if progress {
        let bar = ProgressBar::new(expected);
        bar.set_style(
            ProgressStyle::with_template(
                "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} frames",
            )
            .unwrap_or_else(|_| ProgressStyle::default_bar()),
        );
        Some(bar)
    } else {
        None
    };

    let options = ExtractOptions::new()
        .with_start_frame(start)
        .with_step(step)
        .with_io_buffer_size(global.io_buffer_size);
    let mut buffer = vec![0u8; expected as usize * frame_bytes];
    let written = framegrab::extract_into(&source, &options, &mut buffer)?;
    buffer.truncate(written);
    let written_frames = if frame_bytes > 0 { written / frame_bytes } else { 0 };

    if let Some(bar) = &bar {
        bar.set_position(written_frames as u64);
        bar.finish();
    }

    match format {
        "raw" => {
            fs::write(out, &buffer)?;
            println!(
                "{} {written_frames} frames ({written} bytes) -> {}",
                "wrote".green().bold(),
                out.display(),
            );
        }
        "png" => {
            fs::create_dir_all(out)?;
            for (index, frame) in buffer.chunks_exact(frame_bytes).enumerate() {
                let image = frame_to_image(frame, shape.width, shape.height)?;
                let path = out.join(format!("frame_{index:05}.png"));
                image.save(&path)?;
            }
            println!(
                "{} {written_frames} frames -> {}",
                "wrote".green().bold(),
                out.display(),
            );
        }
        other => {
            return Err(FramegrabError::Io(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                format!("unknown output format '{other}' (expected raw or png)"),
            )));
        }
    }

    if written_frames < expected as usize {
        println!(
            "{} input ended after {written_frames} of {expected} expected frames",
            "note:".yellow(),
        );
    }
    Ok(())
}

fn parse_log_level(level: &str) -> Option<FfmpegLogLevel> {
    match level.to_ascii_lowercase().as_str() {
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
