use image::{Rgb, RgbImage};
use invoicexpert::invoice::{Annotator, BoundingBox, ExtractionOptions, LabelPalette};
use invoicexpert::utils::{AppConfig, ImageError};

const WHITE: Rgb<u8> = Rgb([255, 255, 255]);

/// Pixels in `[x_range] x [y_range]` that are no longer white.
fn colored_pixels(
    image: &RgbImage,
    x_range: std::ops::Range<u32>,
    y_range: std::ops::Range<u32>,
) -> Vec<Rgb<u8>> {
    y_range
        .flat_map(|y| x_range.clone().map(move |x| (x, y)))
        .map(|(x, y)| *image.get_pixel(x, y))
        .filter(|pixel| *pixel != WHITE)
        .collect()
}

#[test]
fn test_draws_hollow_rectangle_in_label_color() {
    let annotator = Annotator::default().without_font();
    let mut image = RgbImage::from_pixel(50, 50, WHITE);

    annotator.draw(
        &mut image,
        "B-TOTAL",
        "TOTAL",
        &BoundingBox::new(10.0, 10.0, 30.0, 20.0),
    );

    let blue = Rgb([0, 0, 255]);
    assert_eq!(image.get_pixel(10, 10), &blue);
    assert_eq!(image.get_pixel(30, 20), &blue);
    assert_eq!(image.get_pixel(20, 10), &blue);
    assert_eq!(image.get_pixel(20, 15), &WHITE);
    assert_eq!(image.get_pixel(31, 21), &WHITE);
}

#[test]
fn test_custom_palette_color_is_used() {
    let palette = LabelPalette::empty().with_color("B-TOTAL", Rgb([1, 2, 3]));
    let annotator = Annotator::new(palette);
    let mut image = RgbImage::from_pixel(20, 20, WHITE);

    annotator.draw(
        &mut image,
        "B-TOTAL",
        "TOTAL",
        &BoundingBox::new(2.0, 2.0, 8.0, 8.0),
    );

    assert_eq!(image.get_pixel(2, 2), &Rgb([1, 2, 3]));
}

#[test]
fn test_box_outside_image_is_clipped() {
    let annotator = Annotator::default();
    let mut image = RgbImage::from_pixel(20, 20, WHITE);

    annotator.draw(
        &mut image,
        "B-TOTAL",
        "TOTAL",
        &BoundingBox::new(-50.0, -50.0, 500.0, 500.0),
    );
    annotator.draw(
        &mut image,
        "B-TOTAL",
        "TOTAL",
        &BoundingBox::new(100.0, 100.0, 120.0, 120.0),
    );

    assert!(image.pixels().all(|pixel| *pixel == WHITE));
}

#[test]
fn test_default_annotator_has_embedded_font() {
    assert!(Annotator::default().has_font());
    assert!(Annotator::new(LabelPalette::empty()).has_font());
}

#[test]
fn test_caption_drawn_above_box_in_label_color() {
    let options = ExtractionOptions::from_config(&AppConfig::default()).unwrap();
    let mut image = RgbImage::from_pixel(200, 200, WHITE);

    options.annotator.draw(
        &mut image,
        "B-TOTAL",
        "TOTAL",
        &BoundingBox::new(50.0, 100.0, 150.0, 150.0),
    );

    // Caption starts at (60, 90); the band stops short of the top edge.
    let caption = colored_pixels(&image, 60..140, 80..99);
    assert!(!caption.is_empty());
    assert!(caption.iter().any(|pixel| pixel.0[2] > 200 && pixel.0[0] < 100));
    for pixel in &caption {
        let [r, g, b] = pixel.0;
        assert!(r == g && b >= r, "caption pixel {pixel:?} is not blue");
    }

    assert!(colored_pixels(&image, 51..150, 104..150).is_empty());
    assert!(colored_pixels(&image, 0..50, 0..200).is_empty());
}

#[test]
fn test_annotator_without_font_skips_captions() {
    let annotator = Annotator::default().without_font();
    let mut image = RgbImage::from_pixel(200, 200, WHITE);

    annotator.draw(
        &mut image,
        "B-TOTAL",
        "TOTAL",
        &BoundingBox::new(50.0, 100.0, 150.0, 150.0),
    );

    assert!(!annotator.has_font());
    assert!(colored_pixels(&image, 0..200, 0..100).is_empty());
}

#[test]
fn test_font_scale_changes_caption_size() {
    let draw = |annotator: &Annotator| {
        let mut image = RgbImage::from_pixel(300, 200, WHITE);
        annotator.draw(
            &mut image,
            "B-TOTAL",
            "TOTAL",
            &BoundingBox::new(50.0, 100.0, 250.0, 190.0),
        );
        colored_pixels(&image, 0..300, 0..200).len()
    };

    let outline = draw(&Annotator::default().without_font());
    let small = draw(&Annotator::default().with_font_scale(8.0));
    let large = draw(&Annotator::default().with_font_scale(24.0));

    assert!(small > outline);
    assert!(large > small);
}

#[test]
fn test_missing_font_file_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("missing.ttf");

    let result = Annotator::default().with_font_file(&path);

    match result {
        Err(ImageError::FontLoad { path: reported, .. }) => assert_eq!(reported, path),
        other => panic!("expected FontLoad, got {other:?}"),
    }
}

#[test]
fn test_invalid_font_file_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("garbage.ttf");
    std::fs::write(&path, b"not a font").unwrap();

    let result = Annotator::default().with_font_file(&path);

    assert!(matches!(result, Err(ImageError::FontLoad { .. })));
}
