#![allow(dead_code)]

use eartag::{OcrSettings, RecognitionError, Rect};
use image::{GrayImage, Luma, Rgb, RgbImage};

/// Digit boxes drawn by [`tag_photo`], ascending by x.
pub const DIGITS: [Rect; 3] = [
    Rect::new(60, 70, 50, 80),
    Rect::new(140, 72, 50, 80),
    Rect::new(220, 68, 50, 80),
];

pub fn fill(img: &mut GrayImage, r: Rect, value: u8) {
    for y in r.y..r.bottom() {
        for x in r.x..r.right() {
            img.put_pixel(x, y, Luma([value]));
        }
    }
}

/// 340×220 tag photo: dark backdrop, bright panel, dark digit blocks.
pub fn tag_photo() -> RgbImage {
    let mut gray = GrayImage::from_pixel(340, 220, Luma([12]));
    fill(&mut gray, Rect::new(30, 30, 280, 170), 210);
    for r in DIGITS {
        fill(&mut gray, r, 35);
    }
    RgbImage::from_fn(340, 220, |x, y| {
        let v = gray.get_pixel(x, y)[0];
        Rgb([v, v, v])
    })
}

pub fn constant_engine(
    text: &'static str,
) -> impl Fn(&GrayImage, &OcrSettings) -> Result<String, RecognitionError> + Send + Sync {
    move |_: &GrayImage, _: &OcrSettings| Ok(text.to_string())
}
