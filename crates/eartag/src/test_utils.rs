//! Shared synthetic images and stub engines for unit tests.

use image::{GrayImage, Luma, Rgb, RgbImage};

use crate::config::OcrSettings;
use crate::error::RecognitionError;
use crate::raster::Rect;
use crate::recognize::OcrEngine;

/// Digit blocks of [`synthetic_tag_gray`], ascending by x.
pub(crate) const SYNTHETIC_DIGITS: [Rect; 4] = [
    Rect::new(50, 60, 40, 70),
    Rect::new(110, 60, 40, 70),
    Rect::new(170, 62, 40, 68),
    Rect::new(230, 58, 40, 72),
];

/// Small ink blot on the tag surface that localization must reject.
pub(crate) const SYNTHETIC_SPECK: Rect = Rect::new(280, 150, 6, 6);

/// Bright tag panel on the tag photo.
pub(crate) const SYNTHETIC_PANEL: Rect = Rect::new(20, 20, 280, 160);

pub(crate) fn white(w: u32, h: u32) -> GrayImage {
    GrayImage::from_pixel(w, h, Luma([255]))
}

pub(crate) fn fill_rect(img: &mut GrayImage, r: Rect, value: u8) {
    for y in r.y..r.bottom().min(img.height()) {
        for x in r.x..r.right().min(img.width()) {
            img.put_pixel(x, y, Luma([value]));
        }
    }
}

/// 320×200 photo: dark surroundings (10), tag panel (200), digit blocks and
/// one speck (40).
pub(crate) fn synthetic_tag_gray() -> GrayImage {
    let mut img = GrayImage::from_pixel(320, 200, Luma([10]));
    fill_rect(&mut img, SYNTHETIC_PANEL, 200);
    for r in SYNTHETIC_DIGITS {
        fill_rect(&mut img, r, 40);
    }
    fill_rect(&mut img, SYNTHETIC_SPECK, 40);
    img
}

/// Neutral-gray color version of [`synthetic_tag_gray`].
pub(crate) fn synthetic_tag_rgb() -> RgbImage {
    let gray = synthetic_tag_gray();
    RgbImage::from_fn(gray.width(), gray.height(), |x, y| {
        let v = gray.get_pixel(x, y)[0];
        Rgb([v, v, v])
    })
}

/// Engine that always answers `text`.
pub(crate) fn fixed_engine(text: &'static str) -> Box<dyn OcrEngine> {
    Box::new(
        move |_: &GrayImage, _: &OcrSettings| -> Result<String, RecognitionError> {
            Ok(text.to_string())
        },
    )
}
