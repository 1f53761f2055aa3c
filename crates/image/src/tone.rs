//! Global tone mapping.

use crate::raster::{clamp_channel, RasterBuffer, CHANNELS};

/// Saturation multiplier applied after the luminance stretch.
pub const AUTO_SATURATION_BOOST: f32 = 1.2;

/// Luminance range of a raster, using the unweighted RGB mean per pixel.
pub fn luminance_range(buffer: &RasterBuffer) -> (f32, f32) {
    buffer
        .samples()
        .chunks_exact(CHANNELS)
        .map(luminance)
        .fold((f32::MAX, f32::MIN), |(lo, hi), l| (lo.min(l), hi.max(l)))
}

/// Stretch luminance to the full range, then boost saturation by 1.2x.
///
/// Each channel becomes `(v - min) * 255 / (max - min)` where min/max are the
/// global luminance extremes; when the image has a single luminance the
/// stretch is skipped. Alpha is untouched.
pub fn auto_enhance(buffer: &RasterBuffer) -> RasterBuffer {
    let (min, max) = luminance_range(buffer);
    let range = max - min;

    let mut out = buffer.clone();
    for px in out.samples_mut().chunks_exact_mut(CHANNELS) {
        let mut rgb = [f32::from(px[0]), f32::from(px[1]), f32::from(px[2])];
        if range > 0.0 {
            for v in &mut rgb {
                *v = ((*v - min) * 255.0 / range).clamp(0.0, 255.0);
            }
        }
        let gray = (rgb[0] + rgb[1] + rgb[2]) / 3.0;
        for c in 0..3 {
            px[c] = clamp_channel(gray + (rgb[c] - gray) * AUTO_SATURATION_BOOST);
        }
    }

    tracing::debug!(min, max, dimensions = ?buffer.dimensions(), "auto enhance");
    out
}

#[inline]
fn luminance(px: &[u8]) -> f32 {
    (f32::from(px[0]) + f32::from(px[1]) + f32::from(px[2])) / 3.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_luminance_range() {
        let src = RasterBuffer::from_fn(2, 1, |x, _| if x == 0 { [30, 30, 30, 255] } else { [90, 120, 150, 255] }).unwrap();
        assert_eq!(luminance_range(&src), (30.0, 120.0));
    }

    #[test]
    fn test_stretch_to_full_range() {
        let src = RasterBuffer::from_fn(2, 1, |x, _| {
            let v = if x == 0 { 50 } else { 150 };
            [v, v, v, 255]
        })
        .unwrap();
        let out = auto_enhance(&src);
        assert_eq!(out.pixel(0, 0), [0, 0, 0, 255]);
        assert_eq!(out.pixel(1, 0), [255, 255, 255, 255]);
    }

    #[test]
    fn test_uniform_gray_unchanged() {
        let src = RasterBuffer::filled(3, 3, [77, 77, 77, 255]).unwrap();
        assert_eq!(auto_enhance(&src), src);
    }

    #[test]
    fn test_uniform_color_only_saturates() {
        // min == max, so only the saturation step runs: mean 100, +-20% spread
        let src = RasterBuffer::filled(2, 2, [50, 100, 150, 128]).unwrap();
        let out = auto_enhance(&src);
        assert_eq!(out.pixel(1, 1), [40, 100, 160, 128]);
    }

    #[test]
    fn test_saturation_clamps() {
        let src = RasterBuffer::from_fn(2, 1, |x, _| if x == 0 { [0, 0, 0, 255] } else { [255, 0, 255, 255] }).unwrap();
        let out = auto_enhance(&src);
        // stretch maps lum 170 to 255: channels overflow then clamp
        assert_eq!(out.pixel(1, 0), [255, 0, 255, 255]);
    }
}
