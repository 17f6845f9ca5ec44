//! Video stream discovery and seek planning.
//!
//! [`VideoStreamDescriptor`] is a read-only view of the first video stream
//! in an opened container: dimensions, frame rate, time base, and duration
//! (with the container clock as fallback). [`SeekPlan`] turns a start frame
//! and step into stream time-base ticks by exact rational rescaling.

use ffmpeg_next::{
    Rational, Rescale, codec,
    format::{context::Input, stream::Stream},
    media::Type,
};
use ffmpeg_sys_next as ffi;

use crate::error::FramegrabError;

/// Read-only description of the selected video stream.
///
/// First video-typed stream in declaration order wins; non-video streams
/// are ignored.
#[derive(Debug, Clone)]
pub(crate) struct VideoStreamDescriptor {
    pub(crate) index: usize,
    pub(crate) width: u32,
    pub(crate) height: u32,
    pub(crate) codec_id: codec::Id,
    pub(crate) avg_frame_rate: Rational,
    pub(crate) time_base: Rational,
    pub(crate) duration_seconds: f64,
}

impl VideoStreamDescriptor {
    /// First video stream, whether or not a decoder is available. Shape
    /// probing reads metadata only and never decodes.
    pub(crate) fn first_video(input: &Input) -> Result<Self, FramegrabError> {
        Self::locate(input, false)
    }

    /// First video stream whose codec id resolves to a decoder. Streams
    /// with unresolvable codecs are skipped, not fatal.
    pub(crate) fn first_decodable_video(input: &Input) -> Result<Self, FramegrabError> {
        Self::locate(input, true)
    }

    fn locate(input: &Input, require_decoder: bool) -> Result<Self, FramegrabError> {
        for stream in input.streams() {
            let parameters = stream.parameters();
            if parameters.medium() != Type::Video {
                continue;
            }
            let codec_id = parameters.id();
            if require_decoder && ffmpeg_next::codec::decoder::find(codec_id).is_none() {
                log::warn!(
                    "Skipping video stream {}: no decoder for codec {:?}",
                    stream.index(),
                    codec_id,
                );
                continue;
            }

            // Dimensions live on the codec parameters; the safe wrapper does
            // not surface them without opening a decoder.
            let (width, height) = unsafe {
                let raw = *parameters.as_ptr();
                (raw.width.max(0) as u32, raw.height.max(0) as u32)
            };

            return Ok(Self {
                index: stream.index(),
                width,
                height,
                codec_id,
                avg_frame_rate: stream.avg_frame_rate(),
                time_base: stream.time_base(),
                duration_seconds: duration_seconds(&stream, input),
            });
        }
        Err(FramegrabError::NoVideoStream)
    }

    /// Average frame rate as a float, or `None` when the container leaves
    /// it unset (zero numerator or denominator).
    pub(crate) fn frames_per_second(&self) -> Option<f64> {
        if self.avg_frame_rate.numerator() <= 0 || self.avg_frame_rate.denominator() <= 0 {
            None
        } else {
            Some(f64::from(self.avg_frame_rate))
        }
    }

    /// Expected frame count: `floor(duration_seconds * fps)`.
    pub(crate) fn frame_count(&self) -> Result<u64, FramegrabError> {
        let fps = self.frames_per_second().ok_or(FramegrabError::NoFrameRate)?;
        let frames = (self.duration_seconds * fps).floor();
        Ok(if frames > 0.0 { frames as u64 } else { 0 })
    }
}

/// Stream duration in seconds, with the container-level duration (in
/// `AV_TIME_BASE` units) as fallback when the stream's own duration is
/// undefined or negative.
fn duration_seconds(stream: &Stream<'_>, input: &Input) -> f64 {
    let own = stream.duration() as f64 * f64::from(stream.time_base());
    if own >= 0.0 {
        own
    } else {
        input.duration() as f64 / f64::from(ffi::AV_TIME_BASE)
    }
}

/// Seek targets for strided sampling, in stream time-base ticks.
///
/// Both values come from exact rational rescaling of frame indices
/// (`index * 1/fps` seconds into time-base ticks), so advancing the target
/// by `step_ticks` many times accumulates no floating-point drift.
#[derive(Debug, Clone, Copy)]
pub(crate) struct SeekPlan {
    pub(crate) start_ticks: i64,
    pub(crate) step_ticks: i64,
}

impl SeekPlan {
    pub(crate) fn new(
        start_frame: u64,
        step: u64,
        descriptor: &VideoStreamDescriptor,
    ) -> Result<Self, FramegrabError> {
        let rate = descriptor.avg_frame_rate;
        if rate.numerator() <= 0 || rate.denominator() <= 0 {
            return Err(FramegrabError::NoFrameRate);
        }
        // Seconds-per-frame as a rational; rescaling against the stream
        // time base is av_rescale_q, which rounds once per conversion.
        let seconds_per_frame = Rational::new(rate.denominator(), rate.numerator());
        Ok(Self {
            start_ticks: (start_frame as i64).rescale(seconds_per_frame, descriptor.time_base),
            step_ticks: (step as i64).rescale(seconds_per_frame, descriptor.time_base),
        })
    }
}
