//! Decoded RGBA raster representation.

use crate::error::{ImageError, Result};
use image::RgbaImage;

/// Channels per pixel (R, G, B, A).
pub const CHANNELS: usize = 4;

/// Largest raster any operation will allocate, in pixels (1 GiB of RGBA).
pub const MAX_PIXELS: u64 = 1 << 28;

/// A decoded image: dimensions plus interleaved 8-bit RGBA samples.
///
/// Samples are row-major with a top-left origin. The length of the sample
/// vector is always `width * height * 4`; every operation that changes the
/// dimensions returns a freshly allocated buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RasterBuffer {
    width: u32,
    height: u32,
    samples: Vec<u8>,
}

impl RasterBuffer {
    /// Wrap existing samples, checking dimensions and length.
    pub fn new(width: u32, height: u32, samples: Vec<u8>) -> Result<Self> {
        check_dimensions(width, height)?;
        let expected = sample_len(width, height);
        if samples.len() != expected {
            return Err(ImageError::InvalidParameter(format!(
                "expected {} samples for {}x{}, got {}",
                expected,
                width,
                height,
                samples.len()
            )));
        }
        Ok(Self {
            width,
            height,
            samples,
        })
    }

    /// Create a buffer where every pixel has the same color.
    pub fn filled(width: u32, height: u32, rgba: [u8; 4]) -> Result<Self> {
        check_dimensions(width, height)?;
        let samples = rgba
            .iter()
            .copied()
            .cycle()
            .take(sample_len(width, height))
            .collect();
        Ok(Self {
            width,
            height,
            samples,
        })
    }

    /// Build a buffer by evaluating `f(x, y)` for every pixel.
    pub fn from_fn(width: u32, height: u32, mut f: impl FnMut(u32, u32) -> [u8; 4]) -> Result<Self> {
        check_dimensions(width, height)?;
        let mut samples = Vec::with_capacity(sample_len(width, height));
        for y in 0..height {
            for x in 0..width {
                samples.extend_from_slice(&f(x, y));
            }
        }
        Ok(Self {
            width,
            height,
            samples,
        })
    }

    /// Internal constructor for operations that already sized `samples`.
    pub(crate) fn from_parts(width: u32, height: u32, samples: Vec<u8>) -> Self {
        debug_assert!(width >= 1 && height >= 1);
        debug_assert_eq!(samples.len(), sample_len(width, height));
        Self {
            width,
            height,
            samples,
        }
    }

    /// Width in pixels.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// `(width, height)`
    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Interleaved RGBA samples.
    pub fn samples(&self) -> &[u8] {
        &self.samples
    }

    /// Consume the buffer, returning its samples.
    pub fn into_samples(self) -> Vec<u8> {
        self.samples
    }

    /// Number of pixels.
    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// Byte offset of pixel `(x, y)`.
    #[inline]
    pub fn offset(&self, x: u32, y: u32) -> usize {
        (y as usize * self.width as usize + x as usize) * CHANNELS
    }

    /// RGBA value of pixel `(x, y)`. Panics when out of bounds.
    #[inline]
    pub fn pixel(&self, x: u32, y: u32) -> [u8; 4] {
        let i = self.offset(x, y);
        [
            self.samples[i],
            self.samples[i + 1],
            self.samples[i + 2],
            self.samples[i + 3],
        ]
    }

    /// Whether any pixel is not fully opaque.
    pub fn has_transparency(&self) -> bool {
        self.samples.chunks_exact(CHANNELS).any(|px| px[3] != 255)
    }

    /// Allocate a zeroed buffer of the given size.
    pub(crate) fn zeroed(width: u32, height: u32) -> Self {
        Self::from_parts(width, height, vec![0; sample_len(width, height)])
    }

    pub(crate) fn samples_mut(&mut self) -> &mut [u8] {
        &mut self.samples
    }

    /// Convert into an `image` crate buffer without copying.
    pub(crate) fn into_rgba_image(self) -> RgbaImage {
        let (width, height) = (self.width, self.height);
        RgbaImage::from_raw(width, height, self.samples)
            .unwrap_or_else(|| RgbaImage::new(width, height))
    }

    /// Copy into an `image` crate buffer.
    pub(crate) fn to_rgba_image(&self) -> RgbaImage {
        self.clone().into_rgba_image()
    }

    /// Wrap an `image` crate buffer.
    pub(crate) fn from_rgba_image(img: RgbaImage) -> Result<Self> {
        let (width, height) = img.dimensions();
        Self::new(width, height, img.into_raw())
    }
}

/// Reject zero-sized rasters and rasters over [`MAX_PIXELS`].
pub(crate) fn check_dimensions(width: u32, height: u32) -> Result<()> {
    if width == 0 || height == 0 {
        return Err(ImageError::InvalidParameter(format!(
            "dimensions must be at least 1x1, got {}x{}",
            width, height
        )));
    }
    let pixels = u64::from(width) * u64::from(height);
    if pixels > MAX_PIXELS {
        return Err(ImageError::InvalidParameter(format!(
            "{}x{} is {} pixels, more than the limit of {}",
            width, height, pixels, MAX_PIXELS
        )));
    }
    Ok(())
}

#[inline]
pub(crate) fn sample_len(width: u32, height: u32) -> usize {
    width as usize * height as usize * CHANNELS
}

/// Round and clamp a float channel value into a byte.
#[inline]
pub(crate) fn clamp_channel(value: f32) -> u8 {
    value.round().clamp(0.0, 255.0) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_checks_length() {
        assert!(RasterBuffer::new(2, 2, vec![0; 16]).is_ok());
        assert!(matches!(
            RasterBuffer::new(2, 2, vec![0; 15]),
            Err(ImageError::InvalidParameter(_))
        ));
    }

    #[test]
    fn test_zero_dimensions_rejected() {
        assert!(RasterBuffer::new(0, 4, Vec::new()).is_err());
        assert!(RasterBuffer::filled(3, 0, [0, 0, 0, 255]).is_err());
    }

    #[test]
    fn test_pixel_limit() {
        assert!(check_dimensions(1 << 14, 1 << 14).is_ok());
        assert!(matches!(
            check_dimensions(u32::MAX, u32::MAX),
            Err(ImageError::InvalidParameter(_))
        ));
        assert!(check_dimensions(1 << 15, 1 << 14).is_err());
        assert!(RasterBuffer::filled(u32::MAX, 1, [0; 4]).is_err());
    }

    #[test]
    fn test_filled_and_pixel() {
        let buf = RasterBuffer::filled(3, 2, [10, 20, 30, 40]).unwrap();
        assert_eq!(buf.samples().len(), 24);
        assert_eq!(buf.pixel(2, 1), [10, 20, 30, 40]);
        assert!(buf.has_transparency());
    }

    #[test]
    fn test_from_fn_is_row_major() {
        let buf = RasterBuffer::from_fn(3, 2, |x, y| [x as u8, y as u8, 0, 255]).unwrap();
        assert_eq!(buf.pixel(2, 0), [2, 0, 0, 255]);
        assert_eq!(buf.pixel(0, 1), [0, 1, 0, 255]);
        assert_eq!(buf.offset(0, 1), 12);
        assert!(!buf.has_transparency());
    }

    #[test]
    fn test_rgba_image_conversion() {
        let buf = RasterBuffer::from_fn(4, 3, |x, y| [x as u8, y as u8, 7, 255]).unwrap();
        let img = buf.to_rgba_image();
        assert_eq!(img.dimensions(), (4, 3));
        assert_eq!(RasterBuffer::from_rgba_image(img).unwrap(), buf);
    }

    #[test]
    fn test_clamp_channel() {
        assert_eq!(clamp_channel(-3.0), 0);
        assert_eq!(clamp_channel(254.6), 255);
        assert_eq!(clamp_channel(300.0), 255);
    }
}
