//! Image fixtures for discovery tests.

use std::io::Cursor;

use image::{DynamicImage, GrayImage, ImageFormat, Luma};

/// Working resolution of the comparator; fixtures are built at this size so
/// differing-pixel counts survive normalization exactly.
pub const FIXTURE_SIZE: u32 = 500;

/// An empty, black field.
pub fn dark_field() -> DynamicImage {
    DynamicImage::ImageLuma8(GrayImage::from_pixel(FIXTURE_SIZE, FIXTURE_SIZE, Luma([0])))
}

/// A black field with `count` bright pixels packed into 50-wide rows.
pub fn field_with_new_source(count: u32) -> DynamicImage {
    let mut image = GrayImage::from_pixel(FIXTURE_SIZE, FIXTURE_SIZE, Luma([0]));
    for i in 0..count {
        image.put_pixel(100 + i % 50, 100 + i / 50, Luma([255]));
    }
    DynamicImage::ImageLuma8(image)
}

pub fn png_bytes(image: &DynamicImage) -> Vec<u8> {
    let mut buffer = Cursor::new(Vec::new());
    image
        .write_to(&mut buffer, ImageFormat::Png)
        .expect("PNG encoding of fixture");
    buffer.into_inner()
}
