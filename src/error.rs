//! Error types for the `framegrab` crate.
//!
//! This module defines [`FramegrabError`], the unified error type returned by
//! all fallible operations in the crate. Variants carry enough context to
//! diagnose a failure without additional logging at the call site.

use std::io::Error as IoError;

use ffmpeg_next::Error as FfmpegError;
use image::ImageError;
use thiserror::Error;

/// The unified error type for all `framegrab` operations.
///
/// Every public function that can fail returns `Result<T, FramegrabError>`.
/// Nothing is retried internally; retry policy, if any, belongs to the
/// caller. Partial extraction output is *not* an error — running out of
/// input before the output buffer fills returns success with however many
/// frames were written.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum FramegrabError {
    /// The media source could not be opened or its structure could not be
    /// parsed. Covers allocation failures, bad paths, disallowed protocols,
    /// corrupt headers, and stream-info probe failures.
    #[error("Failed to open media source {source_name}: {reason}")]
    Open {
        /// Description of the source (path, URL, or `<memory:N bytes>`).
        source_name: String,
        /// Underlying reason the open failed.
        reason: String,
    },

    /// The input contains no usable video stream. For extraction this also
    /// covers the case where video streams exist but none has a resolvable
    /// decoder.
    #[error("No video stream found in input")]
    NoVideoStream,

    /// The video stream reports a zero or unusable average frame rate, so
    /// frame indices cannot be mapped to timestamps.
    #[error("Video stream reports no usable frame rate")]
    NoFrameRate,

    /// A step (stride) of zero was requested.
    #[error("Step must be greater than zero")]
    InvalidStep,

    /// The decoder reported a genuine error while draining frames. Fatal
    /// for the extraction call.
    #[error("Failed to decode video frame: {0}")]
    Decode(String),

    /// Pixel-format conversion to RGB24 failed.
    #[error("Failed to convert frame to RGB24: {0}")]
    Convert(String),

    /// An error originating from the FFmpeg libraries.
    #[error("FFmpeg error: {0}")]
    Ffmpeg(String),

    /// An I/O error while reading or writing files.
    #[error("I/O error: {0}")]
    Io(#[from] IoError),

    /// An error from the `image` crate while encoding a frame to an image
    /// file.
    #[error("Image processing error: {0}")]
    Image(#[from] ImageError),
}

impl From<FfmpegError> for FramegrabError {
    fn from(error: FfmpegError) -> Self {
        FramegrabError::Ffmpeg(error.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_messages_name_the_condition() {
        assert_eq!(
            FramegrabError::NoVideoStream.to_string(),
            "No video stream found in input",
        );
        assert_eq!(
            FramegrabError::InvalidStep.to_string(),
            "Step must be greater than zero",
        );
        let open = FramegrabError::Open {
            source_name: "clip.mp4".to_string(),
            reason: "No such file or directory".to_string(),
        };
        assert!(open.to_string().contains("clip.mp4"));
        assert!(open.to_string().contains("No such file"));
    }
}
