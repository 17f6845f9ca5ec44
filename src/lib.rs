//! # framegrab
//!
//! Sample decoded video frames into flat RGB24 buffers.
//!
//! `framegrab` serves callers — typically an array-processing layer — that
//! want cheap, randomly-seekable access to video content as raw pixel data.
//! It does two things:
//!
//! 1. **Shape probing**: report the expected output shape
//!    `(frame_count, height, width)` from stream metadata, without decoding
//!    a single packet.
//! 2. **Strided extraction**: decode every `step`-th frame starting at
//!    `start_frame` and pack them into a flat caller-owned buffer as RGB24 —
//!    frame-major, row-major, 3 bytes per pixel, no padding.
//!
//! Sources are filesystem paths, URLs (a fixed protocol allow-list applies),
//! or in-memory byte buffers. Decoding is powered by FFmpeg through the
//! [`ffmpeg-next`](https://crates.io/crates/ffmpeg-next) crate.
//!
//! ## Quick Start
//!
//! ### Probe, allocate, extract
//!
//! ```no_run
//! use framegrab::{ExtractOptions, MediaSource, extract_into, probe_shape};
//!
//! let source = MediaSource::path("input.mp4");
//!
//! let shape = probe_shape(&source, 0)?;
//! let mut buffer = vec![0u8; shape.num_bytes()];
//!
//! let written = extract_into(&source, &ExtractOptions::new(), &mut buffer)?;
//! buffer.truncate(written);
//! # Ok::<(), framegrab::FramegrabError>(())
//! ```
//!
//! ### Sample every 30th frame from an in-memory file
//!
//! ```no_run
//! use framegrab::{ExtractOptions, MediaSource, extract};
//!
//! let blob = std::fs::read("input.mp4")?;
//! let options = ExtractOptions::new().with_step(30);
//! let frames = extract(&MediaSource::bytes(&blob), &options, Some(16))?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Semantics worth knowing
//!
//! - Extraction seeks to the nearest keyframe at or before each target
//!   timestamp, then decodes forward until a frame at or past the target
//!   appears. With `step > 1` it re-seeks after every accepted frame
//!   instead of decoding the frames in between.
//! - Output never exceeds the buffer you hand in; writing stops at the
//!   last whole frame that fits.
//! - Running out of input early is success, not an error — check the
//!   returned byte count. A `start_frame` past the end yields `Ok(0)`.
//! - Every call opens and fully releases its own FFmpeg resources; calls
//!   from separate threads share nothing.
//!
//! ## Requirements
//!
//! FFmpeg development libraries must be installed on your system.

pub mod error;
pub mod extract;
pub mod ffmpeg;
pub mod shape;
pub mod source;

mod convert;
mod stream;
mod writer;

pub use error::FramegrabError;
pub use extract::{ExtractOptions, extract, extract_into, frame_to_image};
pub use ffmpeg::{FfmpegLogLevel, get_ffmpeg_log_level, set_ffmpeg_log_level};
pub use shape::{VideoMetadata, VideoShape, probe_metadata, probe_shape};
pub use source::{DEFAULT_IO_BUFFER_SIZE, MediaSource};
