//! Convolution filters and the compound adjustment stack.

mod adjust;
mod denoise;
mod sharpen;

pub use adjust::{adjust, AdjustParams, MAX_PERCENT};
pub use denoise::{denoise, DENOISE_RADIUS};
pub use sharpen::sharpen;
