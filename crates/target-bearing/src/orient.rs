//! Display-resolution output with the fixed sensor mounting correction.

use image::{imageops, RgbaImage};
use target_bearing_core::{resize_bilinear_into, FrameSize};

#[cfg(feature = "tracing")]
use tracing::instrument;

/// Upscales to display resolution, then rotates 90 degrees clockwise
/// (a transpose followed by a horizontal mirror).
///
/// Compensates a sensor mounted at 270 degrees relative to the display.
#[derive(Clone, Copy, Debug)]
pub struct OrientationCorrector {
    display: FrameSize,
}

impl OrientationCorrector {
    pub fn new(display: FrameSize) -> Self {
        Self { display }
    }

    pub fn display_size(&self) -> FrameSize {
        self.display
    }

    /// Size of the corrected frame: the display size, transposed.
    pub fn output_size(&self) -> FrameSize {
        self.display.transposed()
    }

    /// `resized` must be display-sized and `output` must be `output_size()`.
    #[cfg_attr(feature = "tracing", instrument(level = "trace", skip_all))]
    pub fn correct_into(&self, working: &RgbaImage, resized: &mut RgbaImage, output: &mut RgbaImage) {
        let (d, o) = (self.display, self.output_size());
        assert_eq!(
            resized.dimensions(),
            (d.width, d.height),
            "correct_into: resize buffer must be {}x{}",
            d.width,
            d.height
        );
        resize_bilinear_into(working, resized);
        let rotated = imageops::rotate90_in(&*resized, output);
        assert!(
            rotated.is_ok(),
            "correct_into: output buffer must be {}x{}",
            o.width,
            o.height
        );
    }
}
