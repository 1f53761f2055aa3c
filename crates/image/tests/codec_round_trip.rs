//! Decode/encode through the reference codec with real container bytes.

use imagecraft_image::{
    auto_enhance, detect_format, probe, rotate, Codec, EncodeRequest, ErrorKind, ImageFormat, RasterBuffer,
    RotateMode, StandardCodec,
};

fn gradient(width: u32, height: u32) -> RasterBuffer {
    RasterBuffer::from_fn(width, height, |x, y| {
        [(x * 255 / width.max(1)) as u8, (y * 255 / height.max(1)) as u8, 96, 255]
    })
    .unwrap()
}

#[test]
fn png_is_lossless() {
    let codec = StandardCodec::new();
    let raster = RasterBuffer::from_fn(7, 5, |x, y| [x as u8 * 30, y as u8 * 40, 7, (x + y) as u8 * 20]).unwrap();
    let bytes = codec
        .encode(&raster, &EncodeRequest::with_default_quality(ImageFormat::Png))
        .unwrap();

    assert_eq!(detect_format(&bytes).unwrap(), ImageFormat::Png);
    assert_eq!(codec.decode(&bytes).unwrap(), raster);
}

#[test]
fn jpeg_keeps_dimensions_with_bounded_error() {
    let codec = StandardCodec::new();
    let raster = RasterBuffer::filled(16, 16, [180, 90, 40, 255]).unwrap();
    let bytes = codec
        .encode(&raster, &EncodeRequest::new(ImageFormat::Jpeg, 0.95).unwrap())
        .unwrap();

    let decoded = codec.decode(&bytes).unwrap();
    assert_eq!(decoded.dimensions(), (16, 16));
    for (a, b) in decoded.samples().iter().zip(raster.samples()) {
        assert!(a.abs_diff(*b) <= 8, "{a} vs {b}");
    }
}

#[test]
fn lower_quality_is_not_larger() {
    let codec = StandardCodec::new();
    let raster = gradient(64, 64);
    let high = codec
        .encode(&raster, &EncodeRequest::new(ImageFormat::Jpeg, 0.95).unwrap())
        .unwrap();
    let low = codec
        .encode(&raster, &EncodeRequest::new(ImageFormat::Jpeg, 0.1).unwrap())
        .unwrap();
    assert!(low.len() <= high.len());
}

#[test]
fn probe_matches_decode() {
    let codec = StandardCodec::new();
    let raster = rotate(&gradient(20, 10), 90.0, RotateMode::ExpandToFit).unwrap();
    let bytes = codec
        .encode(&auto_enhance(&raster), &EncodeRequest::with_default_quality(ImageFormat::WebP))
        .unwrap();

    let meta = probe(&bytes).unwrap();
    assert_eq!((meta.width, meta.height), (10, 20));
    assert_eq!(meta.format, ImageFormat::WebP);
    assert_eq!(meta.size_bytes, bytes.len());
    assert!(meta.is_portrait());
    assert_eq!(codec.decode(&bytes).unwrap().dimensions(), (10, 20));
}

#[test]
fn unknown_bytes_are_rejected() {
    let codec = StandardCodec::new();
    let err = codec.decode(b"definitely not an image").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::UnsupportedFormat);
    let err = codec.decode(&[0x89]).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::CorruptData);
}
