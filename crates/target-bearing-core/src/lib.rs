//! Core frame types and pixel utilities for the target-bearing pipeline.
//!
//! This crate is intentionally small. It knows about pixel buffers, colour
//! spaces and resampling, but nothing about targets, contours or angles.

mod color;
mod frame;
mod geometry;
mod logger;
mod resize;

pub use color::{rgb_to_hsv_into, rgb_to_hsv_pixel, rgba_to_rgb_into, HUE_MAX};
pub use frame::{rgba_frame_from_slice, ColorSpace, FrameBuffer, FrameError, HsvImage};
pub use geometry::{BoundingRect, FrameSize};
pub use resize::{resize_bilinear_into, sample_bilinear};

#[cfg(feature = "tracing")]
pub use logger::init_tracing;

pub use logger::init_with_level;
