//! Ink-region contour tracing on 8-bit rasters.
//!
//! Ink is any pixel darker than pure white. Borders are traced with
//! `imageproc`'s Suzuki–Abe follower, which reports both outer and hole
//! borders together with their nesting.

use image::{GrayImage, Luma};
use imageproc::contours::{find_contours, BorderType, Contour};
use imageproc::drawing::draw_filled_circle_mut;

use crate::raster::Rect;

/// A traced border with its bounding rectangle.
#[derive(Debug, Clone)]
pub(crate) struct InkContour {
    pub contour: Contour<i32>,
    pub rect: Rect,
}

impl InkContour {
    /// Outer border of a top-level ink component.
    pub fn is_external(&self) -> bool {
        self.contour.border_type == BorderType::Outer && self.contour.parent.is_none()
    }
}

/// 255 where `image` holds ink, 0 elsewhere.
pub(crate) fn ink_foreground(image: &GrayImage) -> GrayImage {
    let mut out = GrayImage::new(image.width(), image.height());
    for (src, dst) in image.pixels().zip(out.pixels_mut()) {
        dst.0 = [if src[0] < u8::MAX { u8::MAX } else { 0 }];
    }
    out
}

/// Every outer and hole border of the ink regions, in discovery order.
pub(crate) fn ink_contours(image: &GrayImage) -> Vec<InkContour> {
    find_contours::<i32>(&ink_foreground(image))
        .into_iter()
        .filter_map(|contour| {
            let rect = Rect::bounding(contour.points.iter())?;
            Some(InkContour { contour, rect })
        })
        .collect()
}

/// Only the outer borders of top-level ink components.
pub(crate) fn external_ink_contours(image: &GrayImage) -> Vec<InkContour> {
    ink_contours(image)
        .into_iter()
        .filter(InkContour::is_external)
        .collect()
}

/// Number of ink pixels inside `rect`.
pub(crate) fn ink_pixels_in(image: &GrayImage, rect: &Rect) -> u64 {
    let x1 = rect.right().min(image.width());
    let y1 = rect.bottom().min(image.height());
    let mut count = 0u64;
    for y in rect.y..y1 {
        for x in rect.x..x1 {
            if image.get_pixel(x, y)[0] < u8::MAX {
                count += 1;
            }
        }
    }
    count
}

/// Trace `contour` onto `canvas` in black with the given stroke width.
pub(crate) fn draw_outline(canvas: &mut GrayImage, contour: &Contour<i32>, thickness: u32) {
    let radius = (thickness / 2) as i32;
    for p in &contour.points {
        if radius == 0 {
            if p.x >= 0 && p.y >= 0 && (p.x as u32) < canvas.width() && (p.y as u32) < canvas.height() {
                canvas.put_pixel(p.x as u32, p.y as u32, Luma([0]));
            }
        } else {
            draw_filled_circle_mut(canvas, (p.x, p.y), radius, Luma([0]));
        }
    }
}
