//! Geometric transforms: crop, resize, rotate, flip.

mod crop;
mod resize;
mod rotate;

pub use crop::{crop, CropRegion};
pub use resize::{fit_height, fit_width, fit_within, linked_dimension, resize, resize_with, ResampleFilter};
pub use rotate::{flip, rotate, RotateMode, Transform};
