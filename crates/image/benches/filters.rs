//! Benchmarks for the pixel operations.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use imagecraft_image::{auto_enhance, denoise, resize, rotate, sharpen, RasterBuffer, RotateMode};

fn sample(width: u32, height: u32) -> RasterBuffer {
    RasterBuffer::from_fn(width, height, |x, y| {
        [(x % 256) as u8, (y % 256) as u8, ((x ^ y) % 256) as u8, 255]
    })
    .unwrap()
}

fn bench_convolution(c: &mut Criterion) {
    let raster = sample(512, 512);

    c.bench_function("denoise_512", |b| {
        b.iter(|| denoise(black_box(&raster), black_box(1.0)))
    });

    c.bench_function("sharpen_512", |b| {
        b.iter(|| sharpen(black_box(&raster), black_box(0.5)))
    });

    c.bench_function("auto_enhance_512", |b| {
        b.iter(|| auto_enhance(black_box(&raster)))
    });
}

fn bench_geometry(c: &mut Criterion) {
    let raster = sample(512, 512);

    c.bench_function("resize_512_to_300", |b| {
        b.iter(|| resize(black_box(&raster), black_box(300), black_box(300)))
    });

    c.bench_function("rotate_512_30deg", |b| {
        b.iter(|| rotate(black_box(&raster), black_box(30.0), RotateMode::ExpandToFit))
    });
}

criterion_group!(benches, bench_convolution, bench_geometry);
criterion_main!(benches);
