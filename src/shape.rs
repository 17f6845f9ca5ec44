//! No-decode shape probing.
//!
//! [`probe_shape`] opens a source, reads metadata off the first video
//! stream, and closes it again — no packet is ever decoded. Callers use the
//! result to size the flat output buffer before calling
//! [`extract_into`](crate::extract_into).

use std::time::Duration;

use crate::{
    error::FramegrabError,
    source::{self, MediaSource},
    stream::VideoStreamDescriptor,
};

/// Expected output shape of a full extraction: frame count, then height,
/// then width — the index order of the flat RGB24 layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use]
pub struct VideoShape {
    /// Expected number of frames, `floor(duration_seconds * fps)`.
    pub frame_count: u64,
    /// Frame height in pixels.
    pub height: u32,
    /// Frame width in pixels.
    pub width: u32,
}

impl VideoShape {
    /// Bytes in one tightly-packed RGB24 frame: `height * width * 3`.
    pub fn frame_bytes(&self) -> usize {
        self.height as usize * self.width as usize * 3
    }

    /// Bytes the full shape represents: `frame_count * frame_bytes()`.
    pub fn num_bytes(&self) -> usize {
        self.frame_count as usize * self.frame_bytes()
    }
}

/// Richer stream description for callers that want more than the shape
/// triple.
#[derive(Debug, Clone)]
#[must_use]
pub struct VideoMetadata {
    /// Expected output shape.
    pub shape: VideoShape,
    /// Average frame rate as a float (may be approximate for
    /// variable-frame-rate content).
    pub frames_per_second: f64,
    /// Stream duration, with the container duration as fallback.
    pub duration: Duration,
    /// Codec name (e.g. `"h264"`, `"vp9"`, `"av1"`).
    pub codec: String,
}

/// Probe the expected output shape of a media source without decoding.
///
/// The container is opened, scanned, and closed within this call; probing
/// and extraction share no state.
///
/// `io_buffer_size` is only consulted for byte-span sources; 0 selects
/// [`DEFAULT_IO_BUFFER_SIZE`](crate::DEFAULT_IO_BUFFER_SIZE).
///
/// # Errors
///
/// - [`FramegrabError::Open`] if the source cannot be opened or parsed.
/// - [`FramegrabError::NoVideoStream`] if no video stream exists.
/// - [`FramegrabError::NoFrameRate`] if the stream reports no usable
///   average frame rate.
///
/// # Example
///
/// ```no_run
/// use framegrab::{MediaSource, probe_shape};
///
/// let shape = probe_shape(&MediaSource::path("clip.mp4"), 0)?;
/// println!("{} frames of {}x{}", shape.frame_count, shape.width, shape.height);
/// let mut buffer = vec![0u8; shape.num_bytes()];
/// # Ok::<(), framegrab::FramegrabError>(())
/// ```
pub fn probe_shape(
    source: &MediaSource<'_>,
    io_buffer_size: usize,
) -> Result<VideoShape, FramegrabError> {
    let opened = source::open(source, io_buffer_size)?;
    let descriptor = VideoStreamDescriptor::first_video(&opened.input)?;
    shape_of(&descriptor)
}

/// Probe shape plus frame rate, duration, and codec name.
///
/// Same open/scan/close behavior as [`probe_shape`].
pub fn probe_metadata(
    source: &MediaSource<'_>,
    io_buffer_size: usize,
) -> Result<VideoMetadata, FramegrabError> {
    let opened = source::open(source, io_buffer_size)?;
    let descriptor = VideoStreamDescriptor::first_video(&opened.input)?;
    let frames_per_second = descriptor
        .frames_per_second()
        .ok_or(FramegrabError::NoFrameRate)?;

    Ok(VideoMetadata {
        shape: shape_of(&descriptor)?,
        frames_per_second,
        duration: Duration::from_secs_f64(descriptor.duration_seconds.max(0.0)),
        codec: descriptor.codec_id.name().to_string(),
    })
}

fn shape_of(descriptor: &VideoStreamDescriptor) -> Result<VideoShape, FramegrabError> {
    Ok(VideoShape {
        frame_count: descriptor.frame_count()?,
        height: descriptor.height,
        width: descriptor.width,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shape_byte_arithmetic() {
        let shape = VideoShape {
            frame_count: 300,
            height: 48,
            width: 64,
        };
        assert_eq!(shape.frame_bytes(), 48 * 64 * 3);
        assert_eq!(shape.num_bytes(), 300 * 48 * 64 * 3);
    }

    #[test]
    fn empty_shape_is_zero_bytes() {
        let shape = VideoShape {
            frame_count: 0,
            height: 1080,
            width: 1920,
        };
        assert_eq!(shape.num_bytes(), 0);
    }
}
