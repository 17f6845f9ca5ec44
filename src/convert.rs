//! Pixel-format conversion to RGB24.
//!
//! [`RgbConverter`] owns a lazily-created software scaling context keyed by
//! the decoded frame's (pixel format, width, height). The context is reused
//! across frames within one extraction call and rebuilt if the stream
//! changes dimensions or format mid-file.

use ffmpeg_next::{
    format::Pixel,
    frame::Video as VideoFrame,
    software::scaling::{Context as ScalingContext, Flags as ScalingFlags},
};

use crate::error::FramegrabError;

pub(crate) struct RgbConverter {
    context: Option<ScalingContext>,
    format: Pixel,
    width: u32,
    height: u32,
}

impl RgbConverter {
    pub(crate) fn new() -> Self {
        Self {
            context: None,
            format: Pixel::None,
            width: 0,
            height: 0,
        }
    }

    /// Convert `decoded` into `rgb` as tightly-dimensioned RGB24, building
    /// or rebuilding the scaling context as needed.
    pub(crate) fn run(
        &mut self,
        decoded: &VideoFrame,
        rgb: &mut VideoFrame,
    ) -> Result<(), FramegrabError> {
        let (format, width, height) = (decoded.format(), decoded.width(), decoded.height());

        if self.context.is_none()
            || format != self.format
            || width != self.width
            || height != self.height
        {
            let context = ScalingContext::get(
                format,
                width,
                height,
                Pixel::RGB24,
                width,
                height,
                ScalingFlags::BILINEAR,
            )
            .map_err(|error| FramegrabError::Convert(error.to_string()))?;
            self.context = Some(context);
            self.format = format;
            self.width = width;
            self.height = height;
        }

        let Some(context) = self.context.as_mut() else {
            return Err(FramegrabError::Convert(
                "scaling context unavailable".to_string(),
            ));
        };
        context
            .run(decoded, rgb)
            .map_err(|error| FramegrabError::Convert(error.to_string()))
    }
}
