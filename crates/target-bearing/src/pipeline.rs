use image::{GrayImage, Rgba, RgbImage, RgbaImage};
use log::{debug, trace};
use target_bearing_core::{resize_bilinear_into, FrameSize, HsvImage};

#[cfg(feature = "tracing")]
use tracing::instrument;

use crate::annotate::FrameAnnotator;
use crate::contour::extract_external_contours;
use crate::error::PipelineError;
use crate::filter::{policy_from_params, CandidatePolicy, TargetFilter};
use crate::locate::{CameraModel, TargetLocator};
use crate::orient::OrientationCorrector;
use crate::params::{PipelineParams, PreviewMode};
use crate::result::FrameReport;
use crate::segment::ColorSegmenter;

/// Buffers reused by every call to [`TargetPipeline::process`].
#[derive(Clone, Debug)]
pub struct FrameScratch {
    /// Input resized to working resolution; annotations are drawn here.
    pub working: RgbaImage,
    pub rgb: RgbImage,
    pub hsv: HsvImage,
    pub mask: GrayImage,
    /// Working frame upscaled to display resolution, before rotation.
    pub display: RgbaImage,
    /// Final, rotated output frame.
    pub output: RgbaImage,
}

impl FrameScratch {
    pub fn new(working: FrameSize, display: FrameSize) -> Self {
        let out = display.transposed();
        Self {
            working: RgbaImage::new(working.width, working.height),
            rgb: RgbImage::new(working.width, working.height),
            hsv: HsvImage::new(working.width, working.height),
            mask: GrayImage::new(working.width, working.height),
            display: RgbaImage::new(display.width, display.height),
            output: RgbaImage::new(out.width, out.height),
        }
    }
}

/// Result of one frame: the corrected display frame and the detection report.
#[derive(Debug)]
pub struct FrameOutput<'a> {
    pub frame: &'a RgbaImage,
    pub report: FrameReport,
}

/// Single-frame target pipeline.
///
/// Stages run in a fixed order: resize, segment, contours, filter, locate,
/// annotate, orientation correction. Nothing but the scratch buffers survives
/// between frames.
pub struct TargetPipeline {
    params: PipelineParams,
    segmenter: ColorSegmenter,
    filter: TargetFilter,
    locator: TargetLocator,
    annotator: FrameAnnotator,
    corrector: OrientationCorrector,
    scratch: FrameScratch,
    frames: u64,
}

impl TargetPipeline {
    /// Validate `params` and allocate all scratch buffers.
    pub fn new(params: PipelineParams) -> Result<Self, PipelineError> {
        params.validate()?;
        let policy = policy_from_params(&params.filter, params.working_size);
        Ok(Self::build(params, policy))
    }

    /// Like [`TargetPipeline::new`] but with a caller-supplied acceptance rule,
    /// overriding `params.filter.policy`.
    pub fn with_policy(
        params: PipelineParams,
        policy: Box<dyn CandidatePolicy>,
    ) -> Result<Self, PipelineError> {
        params.validate()?;
        Ok(Self::build(params, policy))
    }

    fn build(params: PipelineParams, policy: Box<dyn CandidatePolicy>) -> Self {
        let working = params.working_size;
        let camera = CameraModel::new(params.camera.horizontal_fov_deg, working.width);
        debug!(
            "pipeline: working {}x{}, display {}x{}, focal length {:.2}px",
            working.width,
            working.height,
            params.display_size.width,
            params.display_size.height,
            camera.focal_length_px()
        );
        Self {
            segmenter: ColorSegmenter::new(params.color_range),
            filter: TargetFilter::new(policy),
            locator: TargetLocator::new(camera),
            annotator: FrameAnnotator::new(params.highlight),
            corrector: OrientationCorrector::new(params.display_size),
            scratch: FrameScratch::new(working, params.display_size),
            frames: 0,
            params,
        }
    }

    #[inline]
    pub fn params(&self) -> &PipelineParams {
        &self.params
    }

    #[inline]
    pub fn camera(&self) -> &CameraModel {
        self.locator.camera()
    }

    /// Frames processed so far.
    pub fn frames_processed(&self) -> u64 {
        self.frames
    }

    /// Mask of the most recent frame.
    pub fn last_mask(&self) -> &GrayImage {
        &self.scratch.mask
    }

    /// Annotated working-resolution frame of the most recent call.
    pub fn last_working_frame(&self) -> &RgbaImage {
        &self.scratch.working
    }

    /// Process one camera frame of any non-zero size.
    ///
    /// Always returns a full display frame. `report.target` is `None` unless
    /// exactly one candidate passed the filter.
    #[cfg_attr(
        feature = "tracing",
        instrument(level = "debug", skip_all, fields(frame = self.frames, width = input.width(), height = input.height()))
    )]
    pub fn process(&mut self, input: &RgbaImage) -> FrameOutput<'_> {
        assert!(
            input.width() > 0 && input.height() > 0,
            "process: empty input frame"
        );
        let s = &mut self.scratch;

        resize_bilinear_into(input, &mut s.working);
        self.segmenter
            .segment_into(&s.working, &mut s.rgb, &mut s.hsv, &mut s.mask);

        let contours = extract_external_contours(&s.mask);
        let contour_count = contours.len();
        let candidates = self.filter.filter(contours);
        let fix = self.locator.locate(&candidates);

        if self.params.preview == PreviewMode::Mask {
            for (dst, &m) in s.working.pixels_mut().zip(s.mask.iter()) {
                *dst = Rgba([m, m, m, 255]);
            }
        }
        self.annotator
            .annotate(&mut s.working, &candidates, fix.as_ref());
        self.corrector
            .correct_into(&s.working, &mut s.display, &mut s.output);

        match &fix {
            Some(f) => debug!(
                "frame {}: target at ({}, {}), angle {:.3} deg",
                self.frames, f.center.x, f.center.y, f.angle_deg
            ),
            None => trace!(
                "frame {}: no target ({} contours, {} candidates)",
                self.frames,
                contour_count,
                candidates.len()
            ),
        }
        self.frames += 1;

        FrameOutput {
            frame: &self.scratch.output,
            report: FrameReport {
                contours: contour_count,
                candidates: candidates.iter().map(|c| c.rect).collect(),
                target: fix,
            },
        }
    }
}

impl std::fmt::Debug for TargetPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TargetPipeline")
            .field("params", &self.params)
            .field("frames", &self.frames)
            .finish_non_exhaustive()
    }
}
