//! Gaussian-weighted spatial smoothing.

use crate::error::{ImageError, Result};
use crate::raster::{RasterBuffer, CHANNELS};

/// Neighborhood radius; the window is `(2r+1) x (2r+1)`.
pub const DENOISE_RADIUS: i64 = 1;

/// Smooth RGB with a 3x3 Gaussian window of sigma `strength`.
///
/// Weights are `exp(-(dx^2 + dy^2) / (2 * strength^2))`. At the borders the
/// window shrinks to the in-bounds neighbors and is renormalized by the
/// weights actually used. Alpha is copied unchanged.
pub fn denoise(buffer: &RasterBuffer, strength: f32) -> Result<RasterBuffer> {
    if !strength.is_finite() || strength <= 0.0 {
        return Err(ImageError::invalid_parameter(format!(
            "denoise strength must be positive, got {strength}"
        )));
    }

    let kernel = gaussian_window(strength);
    let side = (2 * DENOISE_RADIUS + 1) as usize;
    let (w, h) = (i64::from(buffer.width()), i64::from(buffer.height()));
    let src = buffer.samples();
    let mut out = RasterBuffer::zeroed(buffer.width(), buffer.height());
    let dst = out.samples_mut();

    for y in 0..h {
        for x in 0..w {
            let mut acc = [0.0f64; 3];
            let mut weight_sum = 0.0f64;
            for dy in -DENOISE_RADIUS..=DENOISE_RADIUS {
                let ny = y + dy;
                if ny < 0 || ny >= h {
                    continue;
                }
                for dx in -DENOISE_RADIUS..=DENOISE_RADIUS {
                    let nx = x + dx;
                    if nx < 0 || nx >= w {
                        continue;
                    }
                    let weight = kernel[(dy + DENOISE_RADIUS) as usize * side
                        + (dx + DENOISE_RADIUS) as usize];
                    let i = (ny * w + nx) as usize * CHANNELS;
                    for c in 0..3 {
                        acc[c] += weight * f64::from(src[i + c]);
                    }
                    weight_sum += weight;
                }
            }

            let i = (y * w + x) as usize * CHANNELS;
            for c in 0..3 {
                dst[i + c] = (acc[c] / weight_sum).round().clamp(0.0, 255.0) as u8;
            }
            dst[i + 3] = src[i + 3];
        }
    }

    tracing::debug!(strength, dimensions = ?buffer.dimensions(), "denoise");
    Ok(out)
}

/// Window weights in row-major order.
///
/// A sigma too small to square without underflow degenerates to the
/// identity kernel (center 1, neighbors 0).
fn gaussian_window(sigma: f32) -> Vec<f64> {
    let sigma = f64::from(sigma);
    let two_sigma_sq = 2.0 * sigma * sigma;
    let degenerate = !two_sigma_sq.is_normal();
    let mut kernel = Vec::new();
    for dy in -DENOISE_RADIUS..=DENOISE_RADIUS {
        for dx in -DENOISE_RADIUS..=DENOISE_RADIUS {
            let d2 = (dx * dx + dy * dy) as f64;
            let weight = if d2 == 0.0 {
                1.0
            } else if degenerate {
                0.0
            } else {
                (-d2 / two_sigma_sq).exp()
            };
            kernel.push(weight);
        }
    }
    kernel
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_uniform_unchanged() {
        let src = RasterBuffer::filled(5, 4, [100, 150, 200, 255]).unwrap();
        assert_eq!(denoise(&src, 1.0).unwrap(), src);
    }

    #[test]
    fn test_spike_is_spread() {
        let src = RasterBuffer::from_fn(3, 3, |x, y| {
            if (x, y) == (1, 1) { [255, 255, 255, 255] } else { [0, 0, 0, 255] }
        })
        .unwrap();
        let out = denoise(&src, 1.0).unwrap();
        let center = out.pixel(1, 1)[0];
        let edge = out.pixel(0, 1)[0];
        assert!(center < 255 && center > edge && edge > 0);
    }

    #[test]
    fn test_center_weight_matches_formula() {
        // only the center is bright; output there is w(0,0) / sum(w)
        let src = RasterBuffer::from_fn(3, 3, |x, y| {
            let v = if (x, y) == (1, 1) { 255 } else { 0 };
            [v, v, v, 255]
        })
        .unwrap();
        let sigma = 0.8f32;
        let s = f64::from(sigma);
        let w = |d2: f64| (-d2 / (2.0 * s * s)).exp();
        let total = w(0.0) + 4.0 * w(1.0) + 4.0 * w(2.0);
        let expected = (255.0 * w(0.0) / total).round() as u8;
        assert_eq!(denoise(&src, sigma).unwrap().pixel(1, 1)[0], expected);
    }

    #[test]
    fn test_vanishing_strength_is_identity() {
        let src = RasterBuffer::filled(3, 3, [200, 150, 100, 255]).unwrap();
        assert_eq!(denoise(&src, 1e-30).unwrap(), src);
        assert_eq!(denoise(&src, f32::MIN_POSITIVE).unwrap(), src);
        assert_eq!(denoise(&src, 1e-45).unwrap(), src);

        let textured = RasterBuffer::from_fn(4, 4, |x, y| [(x * 50) as u8, (y * 60) as u8, 7, 255]).unwrap();
        assert_eq!(denoise(&textured, 1e-30).unwrap(), textured);
    }

    #[test]
    fn test_alpha_passes_through() {
        let src = RasterBuffer::from_fn(4, 4, |x, y| [x as u8 * 60, 0, 0, (x * 10 + y) as u8]).unwrap();
        let out = denoise(&src, 2.0).unwrap();
        for y in 0..4 {
            for x in 0..4 {
                assert_eq!(out.pixel(x, y)[3], src.pixel(x, y)[3]);
            }
        }
    }

    #[test]
    fn test_single_pixel() {
        let src = RasterBuffer::filled(1, 1, [9, 8, 7, 6]).unwrap();
        assert_eq!(denoise(&src, 1.5).unwrap(), src);
    }

    #[test]
    fn test_rejects_non_positive_strength() {
        let src = RasterBuffer::filled(2, 2, [0, 0, 0, 255]).unwrap();
        assert!(denoise(&src, 0.0).is_err());
        assert!(denoise(&src, -1.0).is_err());
        assert!(denoise(&src, f32::NAN).is_err());
    }

    proptest! {
        #[test]
        fn prop_preserves_dimensions(
            w in 1u32..12, h in 1u32..12,
            strength in 0.1f32..5.0,
            data in proptest::collection::vec(any::<u8>(), 12 * 12 * 4),
        ) {
            let len = (w * h * 4) as usize;
            let src = RasterBuffer::new(w, h, data[..len].to_vec()).unwrap();
            let out = denoise(&src, strength).unwrap();
            prop_assert_eq!(out.dimensions(), src.dimensions());
            prop_assert_eq!(out.samples().len(), len);
        }
    }
}
