//! External contour extraction from a binary mask.

use image::GrayImage;
use imageproc::contours::find_contours;
use nalgebra::Point2;

#[cfg(feature = "tracing")]
use tracing::instrument;

/// Closed boundary of one connected foreground region.
///
/// Only the vertices of straight runs are stored; the last point connects
/// back to the first.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Contour {
    pub points: Vec<Point2<i32>>,
}

impl Contour {
    pub fn new(points: Vec<Point2<i32>>) -> Self {
        Self { points }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Absolute polygon area of the vertex chain (shoelace formula).
    pub fn polygon_area(&self) -> f64 {
        polygon_area(&self.points)
    }
}

/// Trace the outermost boundaries of the foreground (non-zero) regions.
///
/// Holes and regions nested inside holes are not reported. The order follows
/// the raster position of each region's first pixel, so identical masks give
/// identical output.
///
/// Every top-level border counts as external: `find_contours` tags the outer
/// border of a region touching column 0 as `BorderType::Hole`.
#[cfg_attr(
    feature = "tracing",
    instrument(level = "trace", skip_all, fields(width = mask.width(), height = mask.height()))
)]
pub fn extract_external_contours(mask: &GrayImage) -> Vec<Contour> {
    find_contours::<i32>(mask)
        .into_iter()
        .filter(|c| c.parent.is_none())
        .map(|c| {
            let points: Vec<Point2<i32>> =
                c.points.iter().map(|p| Point2::new(p.x, p.y)).collect();
            Contour::new(compress_chain(&points))
        })
        .collect()
}

/// Drop every vertex that continues the step direction of its predecessor.
///
/// Boundary chains move in unit 8-connected steps, so this keeps exactly the
/// end points of horizontal, vertical and diagonal runs.
pub fn compress_chain(points: &[Point2<i32>]) -> Vec<Point2<i32>> {
    let mut points = points.to_vec();
    points.dedup();
    while points.len() > 1 && points.first() == points.last() {
        points.pop();
    }
    let n = points.len();
    if n < 3 {
        return points;
    }
    let step = |a: Point2<i32>, b: Point2<i32>| ((b.x - a.x).signum(), (b.y - a.y).signum());

    (0..n)
        .filter(|&i| {
            let prev = points[(i + n - 1) % n];
            let cur = points[i];
            let next = points[(i + 1) % n];
            step(prev, cur) != step(cur, next)
        })
        .map(|i| points[i])
        .collect()
}

pub(crate) fn polygon_area(points: &[Point2<i32>]) -> f64 {
    let n = points.len();
    if n < 3 {
        return 0.0;
    }
    let twice: i64 = (0..n)
        .map(|i| {
            let a = points[i];
            let b = points[(i + 1) % n];
            a.x as i64 * b.y as i64 - b.x as i64 * a.y as i64
        })
        .sum();
    twice.abs() as f64 / 2.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Luma;
    use target_bearing_core::BoundingRect;

    fn fill(mask: &mut GrayImage, x0: u32, y0: u32, w: u32, h: u32) {
        for y in y0..y0 + h {
            for x in x0..x0 + w {
                mask.put_pixel(x, y, Luma([255]));
            }
        }
    }

    #[test]
    fn empty_mask_has_no_contours() {
        let mask = GrayImage::new(32, 32);
        assert!(extract_external_contours(&mask).is_empty());
    }

    #[test]
    fn rectangle_compresses_to_four_corners() {
        let mut mask = GrayImage::new(64, 64);
        fill(&mut mask, 10, 20, 30, 12);
        let contours = extract_external_contours(&mask);
        assert_eq!(contours.len(), 1);

        let c = &contours[0];
        assert_eq!(c.len(), 4);
        for corner in [
            Point2::new(10, 20),
            Point2::new(39, 20),
            Point2::new(39, 31),
            Point2::new(10, 31),
        ] {
            assert!(c.points.contains(&corner), "missing {corner:?}");
        }
        assert_eq!(
            BoundingRect::from_points(&c.points),
            Some(BoundingRect::new(10, 20, 30, 12))
        );
    }

    #[test]
    fn holes_and_nested_regions_are_skipped() {
        let mut mask = GrayImage::new(64, 64);
        fill(&mut mask, 4, 4, 40, 40);
        // carve a hole, then put an island inside it
        for y in 12..36 {
            for x in 12..36 {
                mask.put_pixel(x, y, Luma([0]));
            }
        }
        fill(&mut mask, 20, 20, 6, 6);
        fill(&mut mask, 50, 50, 5, 5);

        let contours = extract_external_contours(&mask);
        assert_eq!(contours.len(), 2);
        let rects: Vec<_> = contours
            .iter()
            .filter_map(|c| BoundingRect::from_points(&c.points))
            .collect();
        assert_eq!(rects[0], BoundingRect::new(4, 4, 40, 40));
        assert_eq!(rects[1], BoundingRect::new(50, 50, 5, 5));
    }

    #[test]
    fn regions_touching_the_frame_border_are_external() {
        let (w, h) = (320u32, 320u32);
        for (x, y) in [
            (0, 0),     // top-left corner
            (0, 150),   // left edge
            (140, 0),   // top edge
            (280, 150), // right edge
            (140, 300), // bottom edge
            (280, 300), // bottom-right corner
        ] {
            let mut mask = GrayImage::new(w, h);
            fill(&mut mask, x, y, 40, 20);
            let contours = extract_external_contours(&mask);
            assert_eq!(contours.len(), 1, "region at ({x}, {y})");
            assert_eq!(
                BoundingRect::from_points(&contours[0].points),
                Some(BoundingRect::new(x as i32, y as i32, 40, 20)),
                "region at ({x}, {y})"
            );
        }
    }

    #[test]
    fn full_frame_region_is_one_contour() {
        let mask = GrayImage::from_pixel(16, 12, Luma([255]));
        let contours = extract_external_contours(&mask);
        assert_eq!(contours.len(), 1);
        assert_eq!(
            BoundingRect::from_points(&contours[0].points),
            Some(BoundingRect::new(0, 0, 16, 12))
        );
    }

    #[test]
    fn extraction_is_deterministic() {
        let mut mask = GrayImage::new(48, 48);
        fill(&mut mask, 30, 2, 8, 4);
        fill(&mut mask, 2, 30, 6, 9);
        fill(&mut mask, 20, 20, 3, 3);
        assert_eq!(
            extract_external_contours(&mask),
            extract_external_contours(&mask)
        );
    }

    #[test]
    fn diagonal_runs_keep_only_end_points() {
        let chain = [
            Point2::new(0, 0),
            Point2::new(1, 1),
            Point2::new(2, 2),
            Point2::new(3, 3),
            Point2::new(2, 3),
            Point2::new(1, 3),
            Point2::new(0, 3),
            Point2::new(0, 2),
            Point2::new(0, 1),
        ];
        assert_eq!(
            compress_chain(&chain),
            vec![Point2::new(0, 0), Point2::new(3, 3), Point2::new(0, 3)]
        );
    }

    #[test]
    fn shoelace_area_of_square() {
        let c = Contour::new(vec![
            Point2::new(0, 0),
            Point2::new(10, 0),
            Point2::new(10, 5),
            Point2::new(0, 5),
        ]);
        assert_eq!(c.polygon_area(), 50.0);
    }
}
