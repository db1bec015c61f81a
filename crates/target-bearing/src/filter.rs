//! Geometric acceptance of contour candidates.

use imageproc::geometry::convex_hull;
use imageproc::point::Point;
use nalgebra::Point2;
use target_bearing_core::{BoundingRect, FrameSize};

#[cfg(feature = "tracing")]
use tracing::instrument;

use crate::contour::{polygon_area, Contour};
use crate::params::{FilterParams, FilterPolicyKind};

/// A contour together with the bounding-rect measures the filter looks at.
#[derive(Clone, Debug, PartialEq)]
pub struct TargetCandidate {
    pub contour: Contour,
    pub rect: BoundingRect,
    /// `rect.width / rect.height`.
    pub aspect_ratio: f64,
    /// `rect.width * rect.height`, not the polygon area.
    pub area: f64,
}

impl TargetCandidate {
    /// `None` for an empty contour.
    pub fn from_contour(contour: Contour) -> Option<Self> {
        let rect = BoundingRect::from_points(&contour.points)?;
        Some(Self {
            aspect_ratio: rect.aspect_ratio(),
            area: rect.area(),
            contour,
            rect,
        })
    }
}

/// Acceptance rule applied to each candidate independently.
pub trait CandidatePolicy: Send + Sync {
    fn accept(&self, candidate: &TargetCandidate) -> bool;
}

impl<F> CandidatePolicy for F
where
    F: Fn(&TargetCandidate) -> bool + Send + Sync,
{
    fn accept(&self, candidate: &TargetCandidate) -> bool {
        self(candidate)
    }
}

/// Accepts wide rectangles: both inequalities are strict.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AspectAreaPolicy {
    pub min_aspect_ratio: f64,
    pub min_area: f64,
}

impl CandidatePolicy for AspectAreaPolicy {
    fn accept(&self, c: &TargetCandidate) -> bool {
        c.aspect_ratio > self.min_aspect_ratio && c.area > self.min_area
    }
}

/// Accepts candidates whose contour fills a bounded fraction of its convex hull.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SolidityPolicy {
    pub min_solidity: f64,
    pub max_solidity: f64,
    pub min_area: f64,
}

impl SolidityPolicy {
    /// Contour polygon area over convex hull area; 0 for degenerate hulls.
    pub fn solidity(contour: &Contour) -> f64 {
        let pts: Vec<Point<i32>> = contour.points.iter().map(|p| Point::new(p.x, p.y)).collect();
        let hull: Vec<Point2<i32>> = convex_hull(pts)
            .into_iter()
            .map(|p| Point2::new(p.x, p.y))
            .collect();
        let hull_area = polygon_area(&hull);
        if hull_area <= 0.0 {
            return 0.0;
        }
        contour.polygon_area() / hull_area
    }
}

impl CandidatePolicy for SolidityPolicy {
    fn accept(&self, c: &TargetCandidate) -> bool {
        if c.area <= self.min_area {
            return false;
        }
        let s = Self::solidity(&c.contour);
        (self.min_solidity..=self.max_solidity).contains(&s)
    }
}

/// Build the configured policy for a given working resolution.
pub fn policy_from_params(params: &FilterParams, working: FrameSize) -> Box<dyn CandidatePolicy> {
    let min_area = params.min_area_for(working);
    match params.policy {
        FilterPolicyKind::AspectArea => Box::new(AspectAreaPolicy {
            min_aspect_ratio: params.min_aspect_ratio,
            min_area,
        }),
        FilterPolicyKind::Solidity => Box::new(SolidityPolicy {
            min_solidity: params.solidity[0],
            max_solidity: params.solidity[1],
            min_area,
        }),
    }
}

/// Keeps the candidates a policy accepts, in input order.
pub struct TargetFilter {
    policy: Box<dyn CandidatePolicy>,
}

impl TargetFilter {
    pub fn new(policy: Box<dyn CandidatePolicy>) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &dyn CandidatePolicy {
        self.policy.as_ref()
    }

    #[cfg_attr(
        feature = "tracing",
        instrument(level = "trace", skip_all, fields(contours = contours.len()))
    )]
    pub fn filter(&self, contours: Vec<Contour>) -> Vec<TargetCandidate> {
        contours
            .into_iter()
            .filter_map(TargetCandidate::from_contour)
            .filter(|c| self.policy.accept(c))
            .collect()
    }
}

impl std::fmt::Debug for TargetFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TargetFilter").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rect_contour(x: i32, y: i32, w: i32, h: i32) -> Contour {
        Contour::new(vec![
            Point2::new(x, y),
            Point2::new(x + w - 1, y),
            Point2::new(x + w - 1, y + h - 1),
            Point2::new(x, y + h - 1),
        ])
    }

    fn measured(aspect_ratio: f64, area: f64) -> TargetCandidate {
        TargetCandidate {
            contour: rect_contour(0, 0, 1, 1),
            rect: BoundingRect::new(0, 0, 1, 1),
            aspect_ratio,
            area,
        }
    }

    fn default_policy() -> AspectAreaPolicy {
        AspectAreaPolicy {
            min_aspect_ratio: 1.0,
            min_area: 400.0,
        }
    }

    #[test]
    fn aspect_and_area_bounds_are_strict() {
        let p = default_policy();
        assert!(!p.accept(&measured(1.0, 10_000.0)));
        assert!(p.accept(&measured(1.0001, 401.0)));
        assert!(!p.accept(&measured(2.0, 400.0)));
        assert!(!p.accept(&measured(0.5, 10_000.0)));
    }

    #[test]
    fn candidate_measures_come_from_bounding_rect() {
        let c = TargetCandidate::from_contour(rect_contour(140, 150, 40, 20)).unwrap();
        assert_eq!(c.rect, BoundingRect::new(140, 150, 40, 20));
        assert_eq!(c.aspect_ratio, 2.0);
        assert_eq!(c.area, 800.0);
        assert!(TargetCandidate::from_contour(Contour::new(Vec::new())).is_none());
    }

    #[test]
    fn filter_preserves_input_order() {
        let filter = TargetFilter::new(Box::new(default_policy()));
        let kept = filter.filter(vec![
            rect_contour(0, 0, 40, 20),  // wide, accepted
            rect_contour(50, 0, 20, 40), // tall, rejected
            rect_contour(0, 50, 5, 2),   // speck, rejected
            rect_contour(100, 100, 60, 10),
        ]);
        let xs: Vec<i32> = kept.iter().map(|c| c.rect.x).collect();
        assert_eq!(xs, vec![0, 100]);
    }

    #[test]
    fn closures_can_replace_the_policy() {
        let filter = TargetFilter::new(Box::new(|c: &TargetCandidate| c.rect.y > 10));
        let kept = filter.filter(vec![rect_contour(0, 0, 4, 4), rect_contour(0, 20, 4, 4)]);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].rect.y, 20);
    }

    #[test]
    fn solidity_of_convex_and_concave_shapes() {
        let square = rect_contour(0, 0, 11, 11);
        approx::assert_relative_eq!(SolidityPolicy::solidity(&square), 1.0);

        // thin L shape fills about a third of its hull
        let l_shape = Contour::new(vec![
            Point2::new(0, 0),
            Point2::new(2, 0),
            Point2::new(2, 18),
            Point2::new(20, 18),
            Point2::new(20, 20),
            Point2::new(0, 20),
        ]);
        let s = SolidityPolicy::solidity(&l_shape);
        assert!(s > 0.0 && s < 0.5, "solidity = {s}");
    }

    #[test]
    fn solidity_policy_uses_bounds_and_area_floor() {
        let p = SolidityPolicy {
            min_solidity: 0.04,
            max_solidity: 0.4,
            min_area: 100.0,
        };
        let square = TargetCandidate::from_contour(rect_contour(0, 0, 30, 30)).unwrap();
        assert!(!p.accept(&square));

        let l_shape = TargetCandidate::from_contour(Contour::new(vec![
            Point2::new(0, 0),
            Point2::new(1, 0),
            Point2::new(1, 38),
            Point2::new(38, 38),
            Point2::new(38, 39),
            Point2::new(0, 39),
        ]))
        .unwrap();
        assert!(p.accept(&l_shape));
    }

    #[test]
    fn params_select_policy_and_scale_area() {
        let params = FilterParams::default();
        let p = policy_from_params(&params, FrameSize::new(160, 160));
        // min area scales to 100 at quarter resolution
        assert!(p.accept(&measured(2.0, 101.0)));
        assert!(!p.accept(&measured(2.0, 100.0)));
    }
}
