//! End-to-end batch scenarios through the reference codec.

use imagecraft_image::batch::ItemStatus;
use imagecraft_image::{
    BatchCoordinator, BatchItem, BatchStatus, Codec, EncodeRequest, ErrorKind, ImageFormat, Operation, Pipeline,
    Progress, RasterBuffer, StandardCodec,
};

fn encoded_png(width: u32, height: u32, rgba: [u8; 4]) -> Vec<u8> {
    let raster = RasterBuffer::filled(width, height, rgba).unwrap();
    StandardCodec::new()
        .encode(&raster, &EncodeRequest::with_default_quality(ImageFormat::Png))
        .unwrap()
}

fn sharpen_to_webp(name: &str, source: Vec<u8>) -> BatchItem {
    BatchItem::new(
        name,
        source,
        Pipeline::new()
            .then(Operation::Resize { width: Some(6), height: None, filter: Default::default() })
            .then(Operation::Sharpen { amount: 0.5 }),
        EncodeRequest::with_default_quality(ImageFormat::WebP),
    )
}

#[test]
fn corrupt_middle_item_is_isolated() {
    let mut corrupt = encoded_png(8, 8, [0, 0, 0, 255]);
    corrupt.truncate(corrupt.len() / 2);

    let items = vec![
        sharpen_to_webp("first.png", encoded_png(12, 8, [255, 0, 0, 255])),
        sharpen_to_webp("second.png", corrupt),
        sharpen_to_webp("third.png", encoded_png(3, 9, [0, 0, 255, 128])),
    ];

    let mut progress: Vec<Progress> = Vec::new();
    let mut coordinator = BatchCoordinator::new(StandardCodec::new());
    let report = coordinator.run(items, |p| progress.push(p)).unwrap();

    assert_eq!(report.status, BatchStatus::PartiallyFailed);
    assert_eq!(report.items[0].status, ItemStatus::Done);
    assert!(matches!(
        report.items[1].status,
        ItemStatus::Failed { kind: ErrorKind::CorruptData, .. }
    ));
    assert_eq!(report.items[2].status, ItemStatus::Done);

    let codec = StandardCodec::new();
    let first = report.items[0].output.as_ref().unwrap();
    assert_eq!(first.name, "first.webp");
    assert_eq!(codec.decode(&first.bytes).unwrap().dimensions(), (6, 4));
    let third = report.items[2].output.as_ref().unwrap();
    assert_eq!(codec.decode(&third.bytes).unwrap().dimensions(), (6, 18));
    assert!(report.items[1].output.is_none());

    let fractions: Vec<f64> = progress.iter().map(Progress::fraction).collect();
    assert_eq!(progress.len(), 3);
    assert!(fractions.windows(2).all(|w| w[0] < w[1]));
    assert_eq!(progress.last().unwrap().percent(), 100.0);

    assert_eq!(report.archive_entries().len(), 2);
}

#[test]
fn mixed_output_formats() {
    let source = encoded_png(5, 5, [10, 20, 30, 255]);
    let items = vec![
        BatchItem::new("a.png", source.clone(), Pipeline::new(), EncodeRequest::new(ImageFormat::Jpeg, 0.7).unwrap()),
        BatchItem::new("a.png", source.clone(), Pipeline::new(), EncodeRequest::new(ImageFormat::Png, 1.0).unwrap()),
        BatchItem::new("a.png", source, Pipeline::new(), EncodeRequest::new(ImageFormat::Png, 1.0).unwrap()),
    ];

    let report = BatchCoordinator::new(StandardCodec::new()).run(items, |_| {}).unwrap();
    assert_eq!(report.status, BatchStatus::Completed);

    let names: Vec<&str> = report.archive_entries().keys().copied().collect();
    assert_eq!(names, vec!["a-1.png", "a.jpg", "a.png"]);
}

#[test]
fn failing_operation_is_recorded() {
    let items = vec![BatchItem::new(
        "tiny.png",
        encoded_png(2, 2, [1, 1, 1, 255]),
        Pipeline::new().then(Operation::Crop(imagecraft_image::CropRegion::new(0, 0, 5, 5))),
        EncodeRequest::with_default_quality(ImageFormat::Png),
    )];

    let report = BatchCoordinator::new(StandardCodec::new()).run(items, |_| {}).unwrap();
    assert_eq!(report.status, BatchStatus::PartiallyFailed);
    assert!(matches!(
        report.items[0].status,
        ItemStatus::Failed { kind: ErrorKind::InvalidRegion, .. }
    ));
    assert!(report.progress.is_complete());
}

#[test]
fn oversized_resize_fails_only_its_item() {
    let huge = BatchItem::new(
        "huge.png",
        encoded_png(1, 1, [9, 9, 9, 255]),
        Pipeline::new().then(Operation::Resize {
            width: Some(u32::MAX),
            height: Some(u32::MAX),
            filter: Default::default(),
        }),
        EncodeRequest::with_default_quality(ImageFormat::Png),
    );
    let huge_upscale = BatchItem::new(
        "huge-upscale.png",
        encoded_png(4, 4, [9, 9, 9, 255]),
        Pipeline::new().then(Operation::Upscale { factor: 30_000.0, filter: Default::default() }),
        EncodeRequest::with_default_quality(ImageFormat::Png),
    );
    let items = vec![
        sharpen_to_webp("before.png", encoded_png(4, 4, [0, 255, 0, 255])),
        huge,
        huge_upscale,
        sharpen_to_webp("after.png", encoded_png(4, 4, [0, 0, 255, 255])),
    ];

    let report = BatchCoordinator::new(StandardCodec::new()).run(items, |_| {}).unwrap();
    assert_eq!(report.status, BatchStatus::PartiallyFailed);
    for index in [1, 2] {
        assert!(matches!(
            report.items[index].status,
            ItemStatus::Failed { kind: ErrorKind::InvalidParameter, .. }
        ));
    }
    assert_eq!(report.items[0].status, ItemStatus::Done);
    assert_eq!(report.items[3].status, ItemStatus::Done);
}

#[test]
fn every_input_corrupt_fails_the_batch() {
    let mut truncated = encoded_png(6, 6, [1, 2, 3, 255]);
    truncated.truncate(truncated.len() / 2);
    let items = vec![
        sharpen_to_webp("a.png", truncated),
        sharpen_to_webp("b.png", b"not an image at all".to_vec()),
    ];

    let report = BatchCoordinator::new(StandardCodec::new()).run(items, |_| {}).unwrap();
    assert_eq!(report.status, BatchStatus::Failed);
    assert!(report.archive_entries().is_empty());
    assert!(report.progress.is_complete());
}

#[cfg(feature = "parallel")]
#[test]
fn parallel_run_keeps_input_order() {
    let items: Vec<_> = (0..8)
        .map(|i| {
            let source = if i == 3 { b"garbage!".to_vec() } else { encoded_png(4 + i, 4, [i as u8, 0, 0, 255]) };
            sharpen_to_webp(&format!("img{i}.png"), source)
        })
        .collect();

    let mut last = 0;
    let report = BatchCoordinator::new(StandardCodec::new())
        .run_parallel(items, |p| {
            assert!(p.completed > last);
            last = p.completed;
        })
        .unwrap();

    assert_eq!(last, 8);
    assert_eq!(report.status, BatchStatus::PartiallyFailed);
    for (i, item) in report.items.iter().enumerate() {
        assert_eq!(item.index, i);
        assert_eq!(item.source_name, format!("img{i}.png"));
    }
    assert_eq!(report.failed().count(), 1);
}
