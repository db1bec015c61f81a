//! Visual feedback drawn onto the working frame.

use image::{Rgba, RgbaImage};
use imageproc::drawing::{
    draw_filled_rect_mut, draw_hollow_circle_mut, draw_hollow_rect_mut, draw_line_segment_mut,
};
use imageproc::rect::Rect;

use crate::filter::TargetCandidate;
use crate::result::TargetFix;

const MARKER_RADIUS: i32 = 5;
const LABEL_ORIGIN: (i32, i32) = (4, 4);
const GLYPH_W: i32 = 5;
const GLYPH_H: i32 = 7;

/// Draws candidate boxes, the bearing line and coordinate labels.
#[derive(Clone, Copy, Debug)]
pub struct FrameAnnotator {
    color: Rgba<u8>,
    label_scale: u32,
}

impl FrameAnnotator {
    pub fn new(color: [u8; 4]) -> Self {
        Self {
            color: Rgba(color),
            label_scale: 2,
        }
    }

    pub fn with_label_scale(mut self, scale: u32) -> Self {
        self.label_scale = scale.max(1);
        self
    }

    /// Leaves `frame` untouched without a fix, so several candidates look the
    /// same as none.
    pub fn annotate(
        &self,
        frame: &mut RgbaImage,
        candidates: &[TargetCandidate],
        fix: Option<&TargetFix>,
    ) {
        let Some(fix) = fix else {
            return;
        };

        for c in candidates {
            let r = c.rect;
            if r.width > 0 && r.height > 0 {
                let rect = Rect::at(r.x, r.y).of_size(r.width as u32, r.height as u32);
                draw_hollow_rect_mut(frame, rect, self.color);
            }
        }

        let origin = ((frame.width() / 2) as f32, (frame.height() / 2) as f32);
        let target = (fix.center.x as f32, fix.center.y as f32);
        draw_line_segment_mut(frame, origin, target, self.color);
        draw_hollow_circle_mut(
            frame,
            (fix.center.x as i32, fix.center.y as i32),
            MARKER_RADIUS,
            self.color,
        );

        let line_h = (GLYPH_H + 2) * self.label_scale as i32;
        let (x0, y0) = LABEL_ORIGIN;
        self.draw_label(frame, &format!("X:{}", fix.center.x as i64), x0, y0);
        self.draw_label(frame, &format!("Y:{}", fix.center.y as i64), x0, y0 + line_h);
    }

    /// Render `text` with the built-in bitmap font; unknown characters are blank.
    fn draw_label(&self, frame: &mut RgbaImage, text: &str, x: i32, y: i32) {
        let s = self.label_scale as i32;
        for (i, ch) in text.chars().enumerate() {
            let Some(rows) = glyph(ch) else {
                continue;
            };
            let gx = x + i as i32 * (GLYPH_W + 1) * s;
            for (row, bits) in rows.iter().enumerate() {
                for col in 0..GLYPH_W {
                    if bits & (0x10 >> col) != 0 {
                        let px = Rect::at(gx + col * s, y + row as i32 * s)
                            .of_size(self.label_scale, self.label_scale);
                        draw_filled_rect_mut(frame, px, self.color);
                    }
                }
            }
        }
    }
}

/// 5x7 glyphs, one byte per row, bit 4 is the leftmost column.
fn glyph(ch: char) -> Option<[u8; 7]> {
    Some(match ch {
        '0' => [0x0E, 0x11, 0x13, 0x15, 0x19, 0x11, 0x0E],
        '1' => [0x04, 0x0C, 0x04, 0x04, 0x04, 0x04, 0x0E],
        '2' => [0x0E, 0x11, 0x01, 0x02, 0x04, 0x08, 0x1F],
        '3' => [0x1F, 0x02, 0x04, 0x02, 0x01, 0x11, 0x0E],
        '4' => [0x02, 0x06, 0x0A, 0x12, 0x1F, 0x02, 0x02],
        '5' => [0x1F, 0x10, 0x1E, 0x01, 0x01, 0x11, 0x0E],
        '6' => [0x06, 0x08, 0x10, 0x1E, 0x11, 0x11, 0x0E],
        '7' => [0x1F, 0x01, 0x02, 0x04, 0x08, 0x08, 0x08],
        '8' => [0x0E, 0x11, 0x11, 0x0E, 0x11, 0x11, 0x0E],
        '9' => [0x0E, 0x11, 0x11, 0x0F, 0x01, 0x02, 0x0C],
        'X' => [0x11, 0x11, 0x0A, 0x04, 0x0A, 0x11, 0x11],
        'Y' => [0x11, 0x11, 0x0A, 0x04, 0x04, 0x04, 0x04],
        ':' => [0x00, 0x0C, 0x0C, 0x00, 0x0C, 0x0C, 0x00],
        '-' => [0x00, 0x00, 0x00, 0x1F, 0x00, 0x00, 0x00],
        _ => return None,
    })
}
