use image::{GrayImage, RgbImage, RgbaImage};

/// Colour space a frame buffer holds.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ColorSpace {
    Rgba,
    Rgb,
    /// 8-bit HSV: hue in half degrees (0..=179), saturation and value 0..=255.
    Hsv,
    /// Single-channel binary mask, 0 = background, 255 = foreground.
    Mask,
}

impl ColorSpace {
    pub fn channels(self) -> usize {
        match self {
            ColorSpace::Rgba => 4,
            ColorSpace::Rgb | ColorSpace::Hsv => 3,
            ColorSpace::Mask => 1,
        }
    }
}

/// A pixel buffer whose colour space is fixed by its type.
pub trait FrameBuffer {
    const COLOR_SPACE: ColorSpace;

    fn frame_width(&self) -> u32;
    fn frame_height(&self) -> u32;

    fn color_space(&self) -> ColorSpace {
        Self::COLOR_SPACE
    }

    fn same_size_as<F: FrameBuffer>(&self, other: &F) -> bool {
        self.frame_width() == other.frame_width() && self.frame_height() == other.frame_height()
    }
}

impl FrameBuffer for RgbaImage {
    const COLOR_SPACE: ColorSpace = ColorSpace::Rgba;

    fn frame_width(&self) -> u32 {
        self.width()
    }

    fn frame_height(&self) -> u32 {
        self.height()
    }
}

impl FrameBuffer for RgbImage {
    const COLOR_SPACE: ColorSpace = ColorSpace::Rgb;

    fn frame_width(&self) -> u32 {
        self.width()
    }

    fn frame_height(&self) -> u32 {
        self.height()
    }
}

impl FrameBuffer for GrayImage {
    const COLOR_SPACE: ColorSpace = ColorSpace::Mask;

    fn frame_width(&self) -> u32 {
        self.width()
    }

    fn frame_height(&self) -> u32 {
        self.height()
    }
}

/// Row-major 3-channel HSV buffer.
///
/// Kept as its own type rather than an `RgbImage` so an HSV buffer can only be
/// produced by an explicit conversion.
#[derive(Clone, Debug)]
pub struct HsvImage {
    width: u32,
    height: u32,
    data: Vec<u8>, // [h, s, v] per pixel, len = w*h*3
}

impl HsvImage {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            data: vec![0; width as usize * height as usize * 3],
        }
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn as_raw(&self) -> &[u8] {
        &self.data
    }

    pub fn as_raw_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    /// HSV triple at `(x, y)`.
    #[inline]
    pub fn get(&self, x: u32, y: u32) -> [u8; 3] {
        assert!(x < self.width && y < self.height, "pixel ({x}, {y}) out of bounds");
        let i = (y as usize * self.width as usize + x as usize) * 3;
        [self.data[i], self.data[i + 1], self.data[i + 2]]
    }
}

impl FrameBuffer for HsvImage {
    const COLOR_SPACE: ColorSpace = ColorSpace::Hsv;

    fn frame_width(&self) -> u32 {
        self.width
    }

    fn frame_height(&self) -> u32 {
        self.height
    }
}

#[derive(thiserror::Error, Debug)]
pub enum FrameError {
    #[error("invalid RGBA buffer length (expected {expected} bytes, got {got})")]
    InvalidBuffer { expected: usize, got: usize },

    #[error("invalid frame dimensions (width={width}, height={height})")]
    InvalidDimensions { width: u32, height: u32 },
}

/// Build an `RgbaImage` from a raw, tightly packed RGBA buffer.
pub fn rgba_frame_from_slice(
    width: u32,
    height: u32,
    pixels: &[u8],
) -> Result<RgbaImage, FrameError> {
    if width == 0 || height == 0 {
        return Err(FrameError::InvalidDimensions { width, height });
    }
    let Some(expected) = (width as usize)
        .checked_mul(height as usize)
        .and_then(|n| n.checked_mul(4))
    else {
        return Err(FrameError::InvalidDimensions { width, height });
    };
    if pixels.len() != expected {
        return Err(FrameError::InvalidBuffer {
            expected,
            got: pixels.len(),
        });
    }
    RgbaImage::from_raw(width, height, pixels.to_vec())
        .ok_or(FrameError::InvalidDimensions { width, height })
}
