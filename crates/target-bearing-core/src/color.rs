//! Colour conversion: RGBA to RGB to 8-bit HSV.

use image::{RgbImage, RgbaImage};

use crate::frame::{FrameBuffer, HsvImage};

/// Largest hue value in the 8-bit half-degree convention.
pub const HUE_MAX: u8 = 179;

/// Drop the alpha channel of `src` into the preallocated `dst`.
pub fn rgba_to_rgb_into(src: &RgbaImage, dst: &mut RgbImage) {
    assert!(
        src.same_size_as(&*dst),
        "rgba_to_rgb_into: size mismatch {:?} vs {:?}",
        src.dimensions(),
        dst.dimensions()
    );
    for (d, s) in dst
        .chunks_exact_mut(3)
        .zip(src.as_raw().chunks_exact(4))
    {
        d.copy_from_slice(&s[..3]);
    }
}

/// Convert `src` into the preallocated HSV buffer `dst`.
pub fn rgb_to_hsv_into(src: &RgbImage, dst: &mut HsvImage) {
    assert!(
        src.same_size_as(&*dst),
        "rgb_to_hsv_into: size mismatch {:?} vs {}x{}",
        src.dimensions(),
        dst.width(),
        dst.height()
    );
    for (d, s) in dst
        .as_raw_mut()
        .chunks_exact_mut(3)
        .zip(src.as_raw().chunks_exact(3))
    {
        d.copy_from_slice(&rgb_to_hsv_pixel([s[0], s[1], s[2]]));
    }
}

/// Convert one RGB pixel to HSV.
///
/// `V = max`, `S = 255 * (max - min) / max`, `H = hue_degrees / 2`, all
/// rounded to nearest; grey pixels get `H = S = 0`.
#[inline]
pub fn rgb_to_hsv_pixel([r, g, b]: [u8; 3]) -> [u8; 3] {
    let (r, g, b) = (r as i32, g as i32, b as i32);
    let v = r.max(g).max(b);
    let vmin = r.min(g).min(b);
    let diff = v - vmin;

    let s = if v == 0 {
        0
    } else {
        ((255 * diff) as f32 / v as f32).round() as i32
    };

    let h = if diff == 0 {
        0
    } else {
        // Sextant-relative numerator; a full turn is 6 * diff.
        let raw = if v == r {
            g - b
        } else if v == g {
            b - r + 2 * diff
        } else {
            r - g + 4 * diff
        };
        let mut h = (raw as f32 * 30.0 / diff as f32).round() as i32;
        if h < 0 {
            h += 180;
        }
        if h > HUE_MAX as i32 {
            h -= 180;
        }
        h
    };

    [h as u8, s as u8, v as u8]
}
