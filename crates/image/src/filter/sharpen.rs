//! 3x3 unsharp-mask sharpening.

use crate::error::{ImageError, Result};
use crate::raster::{clamp_channel, RasterBuffer, CHANNELS};

/// Sharpen RGB with the kernel
///
/// ```text
///  0  -a   0
/// -a 1+4a -a
///  0  -a   0
/// ```
///
/// The outermost 1px ring has no full neighborhood and is copied from the
/// source unprocessed, as is alpha. Rasters narrower or shorter than 3px are
/// therefore returned unchanged.
pub fn sharpen(buffer: &RasterBuffer, amount: f32) -> Result<RasterBuffer> {
    if !amount.is_finite() || amount < 0.0 {
        return Err(ImageError::invalid_parameter(format!(
            "sharpen amount must be non-negative, got {amount}"
        )));
    }

    let (w, h) = (buffer.width() as usize, buffer.height() as usize);
    let src = buffer.samples();
    let mut out = buffer.clone();
    if w < 3 || h < 3 || amount == 0.0 {
        return Ok(out);
    }

    let center = 1.0 + 4.0 * amount;
    let stride = w * CHANNELS;
    let dst = out.samples_mut();
    for y in 1..h - 1 {
        for x in 1..w - 1 {
            let i = y * stride + x * CHANNELS;
            for c in 0..3 {
                let neighbors = f32::from(src[i - stride + c])
                    + f32::from(src[i + stride + c])
                    + f32::from(src[i - CHANNELS + c])
                    + f32::from(src[i + CHANNELS + c]);
                dst[i + c] = clamp_channel(center * f32::from(src[i + c]) - amount * neighbors);
            }
        }
    }

    tracing::debug!(amount, dimensions = ?buffer.dimensions(), "sharpen");
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_uniform_unchanged() {
        let src = RasterBuffer::filled(6, 6, [40, 80, 120, 255]).unwrap();
        assert_eq!(sharpen(&src, 1.5).unwrap(), src);
    }

    #[test]
    fn test_zero_amount_is_identity() {
        let src = RasterBuffer::from_fn(5, 5, |x, y| [(x * 40) as u8, (y * 40) as u8, 0, 255]).unwrap();
        assert_eq!(sharpen(&src, 0.0).unwrap(), src);
    }

    #[test]
    fn test_center_value() {
        let src = RasterBuffer::from_fn(3, 3, |x, y| {
            let v = if (x, y) == (1, 1) { 100 } else { 50 };
            [v, v, v, 255]
        })
        .unwrap();
        // (1 + 4*0.5) * 100 - 0.5 * 200 = 200
        assert_eq!(sharpen(&src, 0.5).unwrap().pixel(1, 1), [200, 200, 200, 255]);
    }

    #[test]
    fn test_border_ring_copied() {
        let src = RasterBuffer::from_fn(5, 4, |x, y| [(x * 50) as u8, (y * 60) as u8, 90, 255]).unwrap();
        let out = sharpen(&src, 2.0).unwrap();
        for x in 0..5 {
            assert_eq!(out.pixel(x, 0), src.pixel(x, 0));
            assert_eq!(out.pixel(x, 3), src.pixel(x, 3));
        }
        for y in 0..4 {
            assert_eq!(out.pixel(0, y), src.pixel(0, y));
            assert_eq!(out.pixel(4, y), src.pixel(4, y));
        }
    }

    #[test]
    fn test_small_raster_unchanged() {
        let src = RasterBuffer::from_fn(2, 7, |x, y| [x as u8, y as u8, 3, 4]).unwrap();
        assert_eq!(sharpen(&src, 1.0).unwrap(), src);
    }

    #[test]
    fn test_rejects_negative_amount() {
        let src = RasterBuffer::filled(3, 3, [0, 0, 0, 255]).unwrap();
        assert!(matches!(sharpen(&src, -0.1), Err(ImageError::InvalidParameter(_))));
    }

    proptest! {
        #[test]
        fn prop_preserves_dimensions(
            w in 1u32..12, h in 1u32..12,
            amount in 0.0f32..10.0,
            data in proptest::collection::vec(any::<u8>(), 12 * 12 * 4),
        ) {
            let len = (w * h * 4) as usize;
            let src = RasterBuffer::new(w, h, data[..len].to_vec()).unwrap();
            let out = sharpen(&src, amount).unwrap();
            prop_assert_eq!(out.dimensions(), src.dimensions());
            for y in 0..h {
                for x in 0..w {
                    prop_assert_eq!(out.pixel(x, y)[3], src.pixel(x, y)[3]);
                }
            }
        }
    }
}
