//! Bilinear resampling into preallocated buffers.

use image::{ImageBuffer, Pixel};

type Buf<P> = ImageBuffer<P, Vec<u8>>;

/// Bilinear sample of one channel at `(x, y)`, replicating edge pixels.
#[inline]
pub fn sample_bilinear<P>(src: &Buf<P>, x: f32, y: f32, channel: usize) -> f32
where
    P: Pixel<Subpixel = u8>,
{
    let (x0, x1, fx) = clamp_span(x, src.width());
    let (y0, y1, fy) = clamp_span(y, src.height());
    let ch = P::CHANNEL_COUNT as usize;
    let stride = src.width() as usize * ch;
    let raw = src.as_raw();
    let at = |xi: usize, yi: usize| raw[yi * stride + xi * ch + channel] as f32;

    let a = at(x0, y0) + fx * (at(x1, y0) - at(x0, y0));
    let b = at(x0, y1) + fx * (at(x1, y1) - at(x0, y1));
    a + fy * (b - a)
}

/// Resample `src` into `dst` (whatever size `dst` already has).
///
/// Pixel centers sit at half-integer coordinates, so a 2x downscale averages
/// 2x2 blocks and a same-size resize is an exact copy.
pub fn resize_bilinear_into<P>(src: &Buf<P>, dst: &mut Buf<P>)
where
    P: Pixel<Subpixel = u8>,
{
    let (sw, sh) = src.dimensions();
    let (dw, dh) = dst.dimensions();
    assert!(
        sw > 0 && sh > 0 && dw > 0 && dh > 0,
        "resize_bilinear_into: empty frame ({sw}x{sh} -> {dw}x{dh})"
    );
    if (sw, sh) == (dw, dh) {
        dst.copy_from_slice(src.as_raw());
        return;
    }

    let ch = P::CHANNEL_COUNT as usize;
    let scale_x = sw as f32 / dw as f32;
    let scale_y = sh as f32 / dh as f32;

    for (y, row) in dst.chunks_exact_mut(dw as usize * ch).enumerate() {
        let sy = (y as f32 + 0.5) * scale_y - 0.5;
        for x in 0..dw as usize {
            let sx = (x as f32 + 0.5) * scale_x - 0.5;
            for c in 0..ch {
                let v = sample_bilinear(src, sx, sy, c);
                row[x * ch + c] = v.round().clamp(0.0, 255.0) as u8;
            }
        }
    }
}

#[inline]
fn clamp_span(s: f32, len: u32) -> (usize, usize, f32) {
    let last = len as usize - 1;
    if s <= 0.0 {
        return (0, 0, 0.0);
    }
    let i0 = s.floor() as usize;
    if i0 >= last {
        return (last, last, 0.0);
    }
    (i0, i0 + 1, s - i0 as f32)
}
