//! FFmpeg internal log-level control.
//!
//! FFmpeg has its own logging system, separate from the Rust
//! [`log`](https://crates.io/crates/log) facade this crate emits
//! diagnostics through. By default FFmpeg prints warnings to stderr, which
//! is noisy during bulk extraction, so `framegrab` quiets it on first open.
//! This module lets callers re-raise (or further silence) that level
//! without importing `ffmpeg-next` themselves.
//!
//! ```no_run
//! use framegrab::FfmpegLogLevel;
//!
//! // Surface FFmpeg errors while debugging a stubborn file.
//! framegrab::set_ffmpeg_log_level(FfmpegLogLevel::Error);
//! ```

use ffmpeg_next::util::log::Level;

/// FFmpeg internal log verbosity, mirroring the `AV_LOG_*` constants.
///
/// Ordering, most verbose first:
/// `Trace` > `Debug` > `Verbose` > `Info` > `Warning` > `Error` > `Fatal` > `Panic` > `Quiet`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FfmpegLogLevel {
    /// Print nothing at all.
    Quiet,
    /// Only conditions that abort the process.
    Panic,
    /// Unrecoverable errors (the context becomes unusable).
    Fatal,
    /// Recoverable errors.
    Error,
    /// Warnings (FFmpeg's own default).
    Warning,
    /// Informational messages.
    Info,
    /// Verbose informational messages.
    Verbose,
    /// Debugging output.
    Debug,
    /// Extremely verbose tracing.
    Trace,
}

impl From<FfmpegLogLevel> for Level {
    fn from(level: FfmpegLogLevel) -> Self {
        match level {
            FfmpegLogLevel::Quiet => Level::Quiet,
            FfmpegLogLevel::Panic => Level::Panic,
            FfmpegLogLevel::Fatal => Level::Fatal,
            FfmpegLogLevel::Error => Level::Error,
            FfmpegLogLevel::Warning => Level::Warning,
            FfmpegLogLevel::Info => Level::Info,
            FfmpegLogLevel::Verbose => Level::Verbose,
            FfmpegLogLevel::Debug => Level::Debug,
            FfmpegLogLevel::Trace => Level::Trace,
        }
    }
}

impl From<Level> for FfmpegLogLevel {
    fn from(level: Level) -> Self {
        match level {
            Level::Quiet => FfmpegLogLevel::Quiet,
            Level::Panic => FfmpegLogLevel::Panic,
            Level::Fatal => FfmpegLogLevel::Fatal,
            Level::Error => FfmpegLogLevel::Error,
            Level::Warning => FfmpegLogLevel::Warning,
            Level::Info => FfmpegLogLevel::Info,
            Level::Verbose => FfmpegLogLevel::Verbose,
            Level::Debug => FfmpegLogLevel::Debug,
            Level::Trace => FfmpegLogLevel::Trace,
        }
    }
}

/// Set FFmpeg's internal log verbosity. Affects FFmpeg's stderr output
/// only, not this crate's `log` records.
pub fn set_ffmpeg_log_level(level: FfmpegLogLevel) {
    ffmpeg_next::util::log::set_level(level.into());
}

/// Current FFmpeg internal log verbosity, if it maps to a known level.
pub fn get_ffmpeg_log_level() -> Option<FfmpegLogLevel> {
    ffmpeg_next::util::log::get_level()
        .ok()
        .map(FfmpegLogLevel::from)
}
