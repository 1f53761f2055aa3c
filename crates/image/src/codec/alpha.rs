//! Compositing transparent pixels onto a solid background.

use crate::raster::{RasterBuffer, CHANNELS};

/// Background used when a container cannot store alpha.
pub const WHITE: [u8; 3] = [255, 255, 255];

/// Composite every pixel over `background`, producing a fully opaque raster.
pub fn flatten_alpha(buffer: &RasterBuffer, background: [u8; 3]) -> RasterBuffer {
    let mut out = buffer.clone();
    for px in out.samples_mut().chunks_exact_mut(CHANNELS) {
        let alpha = f32::from(px[3]) / 255.0;
        let inv_alpha = 1.0 - alpha;
        for c in 0..3 {
            let blended = f32::from(px[c]) * alpha + f32::from(background[c]) * inv_alpha;
            px[c] = blended.round().clamp(0.0, 255.0) as u8;
        }
        px[3] = 255;
    }
    out
}

/// Drop the alpha channel of an opaque raster, returning packed RGB.
pub(crate) fn to_rgb_samples(buffer: &RasterBuffer) -> Vec<u8> {
    let mut rgb = Vec::with_capacity(buffer.pixel_count() * 3);
    for px in buffer.samples().chunks_exact(CHANNELS) {
        rgb.extend_from_slice(&px[..3]);
    }
    rgb
}
