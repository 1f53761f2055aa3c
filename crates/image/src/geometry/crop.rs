//! Rectangular crop.

use crate::error::{ImageError, Result};
use crate::raster::{RasterBuffer, CHANNELS};
use serde::{Deserialize, Serialize};

/// A rectangle inside a source raster, in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CropRegion {
    /// Left edge
    pub x: u32,
    /// Top edge
    pub y: u32,
    /// Region width
    pub width: u32,
    /// Region height
    pub height: u32,
}

impl CropRegion {
    /// Create a region.
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Check the region against source dimensions.
    pub fn validate(&self, source_width: u32, source_height: u32) -> Result<()> {
        if self.width == 0 || self.height == 0 {
            return Err(ImageError::InvalidRegion(format!(
                "region {}x{} is empty",
                self.width, self.height
            )));
        }
        let right = u64::from(self.x) + u64::from(self.width);
        let bottom = u64::from(self.y) + u64::from(self.height);
        if right > u64::from(source_width) || bottom > u64::from(source_height) {
            return Err(ImageError::InvalidRegion(format!(
                "region {}x{}+{}+{} exceeds source {}x{}",
                self.width, self.height, self.x, self.y, source_width, source_height
            )));
        }
        Ok(())
    }
}

/// Copy `region` out of `buffer` into a new raster.
pub fn crop(buffer: &RasterBuffer, region: CropRegion) -> Result<RasterBuffer> {
    region.validate(buffer.width(), buffer.height())?;

    let row_len = region.width as usize * CHANNELS;
    let mut samples = Vec::with_capacity(row_len * region.height as usize);
    let src = buffer.samples();
    for y in region.y..region.y + region.height {
        let start = buffer.offset(region.x, y);
        samples.extend_from_slice(&src[start..start + row_len]);
    }

    tracing::debug!(
        from = ?buffer.dimensions(),
        to = ?(region.width, region.height),
        "crop"
    );
    Ok(RasterBuffer::from_parts(region.width, region.height, samples))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn gradient(width: u32, height: u32) -> RasterBuffer {
        RasterBuffer::from_fn(width, height, |x, y| [x as u8, y as u8, (x + y) as u8, 255]).unwrap()
    }

    #[test]
    fn test_crop_copies_region() {
        let src = gradient(6, 5);
        let out = crop(&src, CropRegion::new(2, 1, 3, 2)).unwrap();
        assert_eq!(out.dimensions(), (3, 2));
        assert_eq!(out.pixel(0, 0), src.pixel(2, 1));
        assert_eq!(out.pixel(2, 1), src.pixel(4, 2));
    }

    #[test]
    fn test_full_crop_is_identity() {
        let src = gradient(4, 4);
        assert_eq!(crop(&src, CropRegion::new(0, 0, 4, 4)).unwrap(), src);
    }

    #[test]
    fn test_out_of_bounds_region() {
        let src = gradient(4, 4);
        assert!(matches!(
            crop(&src, CropRegion::new(2, 0, 3, 1)),
            Err(ImageError::InvalidRegion(_))
        ));
        assert!(matches!(
            crop(&src, CropRegion::new(0, 4, 1, 1)),
            Err(ImageError::InvalidRegion(_))
        ));
    }

    #[test]
    fn test_empty_region() {
        let src = gradient(4, 4);
        assert!(matches!(
            crop(&src, CropRegion::new(0, 0, 0, 2)),
            Err(ImageError::InvalidRegion(_))
        ));
    }

    #[test]
    fn test_overflowing_region() {
        let src = gradient(4, 4);
        assert!(crop(&src, CropRegion::new(u32::MAX, 0, 2, 1)).is_err());
    }

    proptest! {
        #[test]
        fn prop_crop_matches_source(
            w in 1u32..24, h in 1u32..24,
            fx in 0.0f64..1.0, fy in 0.0f64..1.0,
            fw in 0.0f64..1.0, fh in 0.0f64..1.0,
        ) {
            let src = gradient(w, h);
            let x = ((w - 1) as f64 * fx) as u32;
            let y = ((h - 1) as f64 * fy) as u32;
            let rw = 1 + ((w - x - 1) as f64 * fw) as u32;
            let rh = 1 + ((h - y - 1) as f64 * fh) as u32;
            let region = CropRegion::new(x, y, rw, rh);

            let out = crop(&src, region).unwrap();
            prop_assert_eq!(out.dimensions(), (rw, rh));
            for dy in 0..rh {
                for dx in 0..rw {
                    prop_assert_eq!(out.pixel(dx, dy), src.pixel(x + dx, y + dy));
                }
            }
        }
    }
}
