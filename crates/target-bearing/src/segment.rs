//! Colour segmentation: RGBA frame to binary mask.

use image::{GrayImage, RgbImage, RgbaImage};
use target_bearing_core::{rgb_to_hsv_into, rgba_to_rgb_into, FrameBuffer, HsvImage};

#[cfg(feature = "tracing")]
use tracing::instrument;

use crate::params::ColorRange;

pub const MASK_ON: u8 = 255;
pub const MASK_OFF: u8 = 0;

/// Thresholds frames against a fixed HSV range.
#[derive(Clone, Copy, Debug)]
pub struct ColorSegmenter {
    range: ColorRange,
}

impl ColorSegmenter {
    pub fn new(range: ColorRange) -> Self {
        Self { range }
    }

    pub fn range(&self) -> &ColorRange {
        &self.range
    }

    /// Fill `mask` with `MASK_ON` where the HSV value of `frame` lies in range.
    ///
    /// `rgb` and `hsv` are intermediate scratch buffers; all four buffers must
    /// share the frame's dimensions.
    #[cfg_attr(
        feature = "tracing",
        instrument(level = "trace", skip_all, fields(width = frame.width(), height = frame.height()))
    )]
    pub fn segment_into(
        &self,
        frame: &RgbaImage,
        rgb: &mut RgbImage,
        hsv: &mut HsvImage,
        mask: &mut GrayImage,
    ) {
        assert!(
            frame.same_size_as(&*mask),
            "segment_into: mask is {:?}, frame is {:?}",
            mask.dimensions(),
            frame.dimensions()
        );
        rgba_to_rgb_into(frame, rgb);
        rgb_to_hsv_into(rgb, hsv);

        for (m, px) in mask.iter_mut().zip(hsv.as_raw().chunks_exact(3)) {
            *m = if self.range.contains([px[0], px[1], px[2]]) {
                MASK_ON
            } else {
                MASK_OFF
            };
        }
    }
}
