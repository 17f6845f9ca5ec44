//! Strided frame extraction into flat RGB24 buffers.
//!
//! This is the core pipeline: open the source, locate a decodable video
//! stream, seek to the start frame's timestamp, then run seek/decode/convert
//! cycles until the output buffer is full or the input runs out. Frames are
//! accepted by a presentation-timestamp test (`pts >= target`), which
//! tolerates backward seeks landing on the nearest prior keyframe: decoding
//! continues from that keyframe and warmup frames below the target are
//! discarded. When striding (`step > 1`), the pipeline re-seeks after every
//! accepted frame instead of decoding the skipped frames — a small constant
//! seek cost that makes sparse sampling over long videos cheap.

use std::os::raw::c_int;

use ffmpeg_next::{
    Error as FfmpegError, Packet, codec::context::Context as CodecContext,
    decoder::Video as VideoDecoder, format::context::Input, frame::Video as VideoFrame,
};
use ffmpeg_sys_next as ffi;
use image::RgbImage;

use crate::{
    convert::RgbConverter,
    error::FramegrabError,
    shape::probe_shape,
    source::{self, DEFAULT_IO_BUFFER_SIZE, MediaSource},
    stream::{SeekPlan, VideoStreamDescriptor},
    writer::FrameWriter,
};

/// Options for an extraction call.
///
/// # Example
///
/// ```no_run
/// use framegrab::{ExtractOptions, MediaSource, extract_into};
///
/// let options = ExtractOptions::new().with_start_frame(120).with_step(10);
/// let mut buffer = vec![0u8; 3 * 1920 * 1080 * 3];
/// let written = extract_into(&MediaSource::path("clip.mp4"), &options, &mut buffer)?;
/// # Ok::<(), framegrab::FramegrabError>(())
/// ```
#[derive(Debug, Clone)]
#[must_use]
pub struct ExtractOptions {
    pub(crate) start_frame: u64,
    pub(crate) step: u64,
    pub(crate) io_buffer_size: usize,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self::new()
    }
}

impl ExtractOptions {
    /// Defaults: start at frame 0, step 1, 64 KiB I/O buffer.
    pub fn new() -> Self {
        Self {
            start_frame: 0,
            step: 1,
            io_buffer_size: DEFAULT_IO_BUFFER_SIZE,
        }
    }

    /// Index of the first frame to extract (0-based).
    pub fn with_start_frame(mut self, start_frame: u64) -> Self {
        self.start_frame = start_frame;
        self
    }

    /// Stride between extracted frames. 1 extracts every frame; a step of
    /// zero is rejected at call time.
    pub fn with_step(mut self, step: u64) -> Self {
        self.step = step;
        self
    }

    /// Size of the intermediate buffer used to pull from byte-span sources.
    /// Ignored for path sources.
    pub fn with_io_buffer_size(mut self, io_buffer_size: usize) -> Self {
        self.io_buffer_size = io_buffer_size;
        self
    }
}

/// Extract strided frames into a caller-owned buffer, returning the number
/// of bytes written.
///
/// Frames land in `output` back to back: frame-major, row-major, 3 bytes
/// per pixel (R, G, B), no padding. The return value is always a whole
/// number of frames; writing stops at the first frame boundary that would
/// exceed `output.len()`.
///
/// Running out of input before the buffer fills is **success** — the caller
/// receives however many frames were written, and a start frame beyond the
/// end of the stream yields `Ok(0)`.
///
/// # Errors
///
/// - [`FramegrabError::InvalidStep`] for a step of zero.
/// - [`FramegrabError::Open`] if the source cannot be opened or parsed.
/// - [`FramegrabError::NoVideoStream`] if no stream has a resolvable
///   decoder.
/// - [`FramegrabError::NoFrameRate`] if frame indices cannot be mapped to
///   timestamps.
/// - [`FramegrabError::Decode`] on a genuine decoder error mid-stream.
pub fn extract_into(
    source: &MediaSource<'_>,
    options: &ExtractOptions,
    output: &mut [u8],
) -> Result<usize, FramegrabError> {
    if options.step == 0 {
        return Err(FramegrabError::InvalidStep);
    }

    let mut opened = source::open(source, options.io_buffer_size)?;
    let descriptor = VideoStreamDescriptor::first_decodable_video(&opened.input)?;
    let plan = SeekPlan::new(options.start_frame, options.step, &descriptor)?;

    let parameters = opened
        .input
        .stream(descriptor.index)
        .ok_or(FramegrabError::NoVideoStream)?
        .parameters();
    let mut decoder = CodecContext::from_parameters(parameters)?
        .decoder()
        .video()?;

    log::debug!(
        "Extracting from stream {} ({:?}, {}x{}): start_frame={}, step={}",
        descriptor.index,
        descriptor.codec_id,
        descriptor.width,
        descriptor.height,
        options.start_frame,
        options.step,
    );

    let mut seek_target = plan.start_ticks;
    seek_backward(&mut opened.input, descriptor.index, seek_target);
    decoder.flush();

    let mut writer = FrameWriter::new(output);
    let mut decoded = VideoFrame::empty();
    let mut rgb = VideoFrame::empty();
    let mut converter = RgbConverter::new();

    loop {
        let mut packet = Packet::empty();
        if packet.read(&mut opened.input).is_err() {
            // End of input (or a read failure) ends extraction early;
            // whatever was written stands.
            break;
        }
        if packet.stream() != descriptor.index {
            continue;
        }

        let drained = drain_packet(
            &mut decoder,
            &packet,
            &mut decoded,
            &mut rgb,
            &mut converter,
            &mut writer,
            seek_target,
            options.step > 1,
        )?;

        if drained.full || writer.remaining() == 0 {
            break;
        }
        if drained.wrote && options.step > 1 {
            // Jump straight to the next sample point rather than decoding
            // every frame in between. The flush discards in-flight state
            // the seek just invalidated.
            seek_target += plan.step_ticks;
            seek_backward(&mut opened.input, descriptor.index, seek_target);
            decoder.flush();
        }
    }

    Ok(writer.bytes_written())
}

/// Extract strided frames into a freshly-allocated buffer.
///
/// Probes the shape first to size the buffer; `max_frames` caps the
/// allocation for long sources. The returned vector is truncated to the
/// bytes actually written, so a short read is visible in its length.
pub fn extract(
    source: &MediaSource<'_>,
    options: &ExtractOptions,
    max_frames: Option<u64>,
) -> Result<Vec<u8>, FramegrabError> {
    if options.step == 0 {
        return Err(FramegrabError::InvalidStep);
    }

    let shape = probe_shape(source, options.io_buffer_size)?;
    let available = shape
        .frame_count
        .saturating_sub(options.start_frame)
        .div_ceil(options.step);
    let frames = match max_frames {
        Some(limit) => available.min(limit),
        None => available,
    };

    let mut output = vec![0u8; frames as usize * shape.frame_bytes()];
    let written = extract_into(source, options, &mut output)?;
    output.truncate(written);
    Ok(output)
}

/// View one extracted frame as an [`image::RgbImage`].
///
/// `frame_bytes` must be exactly `width * height * 3` bytes of RGB24 data,
/// as written by [`extract_into`].
pub fn frame_to_image(
    frame_bytes: &[u8],
    width: u32,
    height: u32,
) -> Result<RgbImage, FramegrabError> {
    RgbImage::from_raw(width, height, frame_bytes.to_vec()).ok_or_else(|| {
        FramegrabError::Convert(
            "frame byte count does not match the given dimensions".to_string(),
        )
    })
}

struct DrainStatus {
    /// At least one frame was accepted and written.
    wrote: bool,
    /// A frame was accepted but did not fit in the remaining capacity.
    full: bool,
}

/// Submit one packet and drain every frame the decoder will emit for it.
///
/// Frames with `pts < target` are decode warmup from the keyframe the seek
/// landed on and are discarded. When `stop_after_first` (striding), at most
/// one frame is written per call — the caller re-seeks and flushes
/// immediately after. Sequential extraction keeps draining so multi-frame
/// emissions are not left buffered.
#[allow(clippy::too_many_arguments)]
fn drain_packet(
    decoder: &mut VideoDecoder,
    packet: &Packet,
    decoded: &mut VideoFrame,
    rgb: &mut VideoFrame,
    converter: &mut RgbConverter,
    writer: &mut FrameWriter<'_>,
    target_ticks: i64,
    stop_after_first: bool,
) -> Result<DrainStatus, FramegrabError> {
    let mut status = DrainStatus {
        wrote: false,
        full: false,
    };

    if let Err(error) = decoder.send_packet(packet) {
        // Damaged packets the decoder refuses are skipped, not fatal.
        log::debug!("Decoder rejected packet: {error}");
        return Ok(status);
    }

    loop {
        match decoder.receive_frame(decoded) {
            Ok(()) => {
                let pts = decoded.pts().unwrap_or(i64::MIN);
                if pts < target_ticks {
                    continue;
                }
                converter.run(decoded, rgb)?;
                if !writer.write_frame(rgb) {
                    status.full = true;
                    return Ok(status);
                }
                status.wrote = true;
                if stop_after_first {
                    return Ok(status);
                }
            }
            Err(FfmpegError::Eof) => return Ok(status),
            Err(FfmpegError::Other { errno }) if errno == ffi::EAGAIN => return Ok(status),
            Err(error) => return Err(FramegrabError::Decode(error.to_string())),
        }
    }
}

/// Backward keyframe seek on the video stream.
///
/// Failures are soft: decoding continues from the current position and the
/// timestamp filter discards anything before the target.
fn seek_backward(input: &mut Input, stream_index: usize, target_ticks: i64) {
    let status = unsafe {
        ffi::av_seek_frame(
            input.as_mut_ptr(),
            stream_index as c_int,
            target_ticks,
            ffi::AVSEEK_FLAG_BACKWARD,
        )
    };
    if status < 0 {
        log::warn!(
            "Backward seek to tick {target_ticks} failed: {}",
            FfmpegError::from(status),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn options_defaults() {
        let options = ExtractOptions::new();
        assert_eq!(options.start_frame, 0);
        assert_eq!(options.step, 1);
        assert_eq!(options.io_buffer_size, DEFAULT_IO_BUFFER_SIZE);
    }

    #[test]
    fn options_builder_chains() {
        let options = ExtractOptions::new()
            .with_start_frame(30)
            .with_step(10)
            .with_io_buffer_size(4096);
        assert_eq!(options.start_frame, 30);
        assert_eq!(options.step, 10);
        assert_eq!(options.io_buffer_size, 4096);
    }

    #[test]
    fn zero_step_is_rejected_before_open() {
        // The source does not exist; the step check must fire first.
        let source = MediaSource::path("does_not_exist.mp4");
        let options = ExtractOptions::new().with_step(0);
        let mut buffer = [0u8; 16];
        assert!(matches!(
            extract_into(&source, &options, &mut buffer),
            Err(FramegrabError::InvalidStep),
        ));
        assert!(matches!(
            extract(&source, &options, None),
            Err(FramegrabError::InvalidStep),
        ));
    }

    #[test]
    fn frame_to_image_checks_dimensions() {
        let bytes = vec![0u8; 2 * 2 * 3];
        assert!(frame_to_image(&bytes, 2, 2).is_ok());
        assert!(frame_to_image(&bytes, 3, 2).is_err());
    }
}
