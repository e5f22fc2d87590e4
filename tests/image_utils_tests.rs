use image::{ImageBuffer, Rgb, RgbImage};
use invoicexpert::utils::image_utils::{encode_png, subtract_mean_normalize};
use invoicexpert::utils::ImageError;

#[test]
fn test_subtract_mean_normalize_shape_and_values() {
    let mut img: RgbImage = ImageBuffer::new(3, 2);
    img.put_pixel(0, 0, Rgb([255, 0, 127]));
    img.put_pixel(2, 1, Rgb([0, 255, 255]));

    let mean = [127.5; 3];
    let norm = [1.0 / 127.5; 3];
    let tensor = subtract_mean_normalize(&img, &mean, &norm);

    assert_eq!(tensor.shape(), &[1, 3, 2, 3]);
    assert!((tensor[[0, 0, 0, 0]] - 1.0).abs() < 1e-5);
    assert!((tensor[[0, 1, 0, 0]] + 1.0).abs() < 1e-5);
    assert!(tensor[[0, 2, 0, 0]].abs() < 0.01);
    assert!((tensor[[0, 1, 1, 2]] - 1.0).abs() < 1e-5);
    assert!((tensor[[0, 0, 1, 2]] + 1.0).abs() < 1e-5);
}

#[test]
fn test_subtract_mean_normalize_per_channel() {
    let img: RgbImage = ImageBuffer::from_pixel(1, 1, Rgb([10, 20, 30]));

    let tensor = subtract_mean_normalize(&img, &[10.0, 0.0, 30.0], &[1.0, 2.0, 0.5]);

    assert_eq!(tensor[[0, 0, 0, 0]], 0.0);
    assert_eq!(tensor[[0, 1, 0, 0]], 40.0);
    assert_eq!(tensor[[0, 2, 0, 0]], 0.0);
}

#[test]
fn test_encode_png_round_trips_pixels() {
    let img: RgbImage = ImageBuffer::from_pixel(4, 3, Rgb([12, 34, 56]));

    let bytes = encode_png(&img).unwrap();
    let decoded = image::load_from_memory(&bytes).unwrap().to_rgb8();

    assert_eq!(&bytes[1..4], b"PNG");
    assert_eq!(decoded, img);
}

#[test]
fn test_encode_png_rejects_empty_image() {
    let img: RgbImage = ImageBuffer::new(0, 0);

    assert!(matches!(
        encode_png(&img),
        Err(ImageError::InvalidInput { .. })
    ));
}
