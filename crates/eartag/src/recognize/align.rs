use image::{imageops, GrayImage, Luma};
use imageproc::geometric_transformations::{warp_into, Interpolation, Projection};

use crate::config::AlignConfig;
use crate::error::{ConfigError, DetectionFailure};
use crate::homography::{quad_to_quad, to_projection};
use crate::raster::Rect;

/// First rectangle holding the maximum of `key`.
fn first_max_by_key(rects: &[Rect], key: impl Fn(&Rect) -> u32) -> Option<&Rect> {
    let mut best: Option<&Rect> = None;
    for r in rects {
        if best.map_or(true, |b| key(r) > key(b)) {
            best = Some(r);
        }
    }
    best
}

/// First rectangle holding the minimum of `key`.
fn first_min_by_key(rects: &[Rect], key: impl Fn(&Rect) -> u32) -> Option<&Rect> {
    let mut best: Option<&Rect> = None;
    for r in rects {
        if best.map_or(true, |b| key(r) < key(b)) {
            best = Some(r);
        }
    }
    best
}

/// Crops the digit band and projectively rectifies it to a fixed size.
///
/// The crop spans from the smallest x to the right edge of the rectangle with
/// the largest x, and from the smallest y to the bottom edge of the rectangle
/// with the largest y. The skew reference is the leftmost rectangle's left
/// edge and the rightmost rectangle's right edge.
#[derive(Debug, Clone)]
pub struct PerspectiveAligner {
    width: u32,
    height: u32,
}

impl PerspectiveAligner {
    pub fn new(config: &AlignConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            width: config.width,
            height: config.height,
        })
    }

    pub fn output_size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Crop box in image coordinates, clipped to the image.
    fn crop_box(&self, image: &GrayImage, rects: &[Rect]) -> Result<Rect, DetectionFailure> {
        let (Some(min_x), Some(max_x), Some(min_y), Some(max_y)) = (
            first_min_by_key(rects, |r| r.x),
            first_max_by_key(rects, |r| r.x),
            first_min_by_key(rects, |r| r.y),
            first_max_by_key(rects, |r| r.y),
        ) else {
            return Err(DetectionFailure::EmptyRectangleSet);
        };
        let left = min_x.x;
        let top = min_y.y;
        let right = max_x.right().min(image.width());
        let bottom = max_y.bottom().min(image.height());
        if right <= left || bottom <= top {
            return Err(DetectionFailure::DegenerateQuad);
        }
        Ok(Rect::new(left, top, right - left, bottom - top))
    }

    fn projection(&self, crop: &Rect, rects: &[Rect]) -> Result<Projection, DetectionFailure> {
        let sx = self.width as f32 / crop.width as f32;
        let sy = self.height as f32 / crop.height as f32;
        if rects.len() == 1 {
            return Ok(Projection::scale(sx, sy));
        }

        let local: Vec<Rect> = rects.iter().map(|r| r.translated(crop.x, crop.y)).collect();
        let (Some(l), Some(r)) = (
            first_min_by_key(&local, |r| r.x),
            first_max_by_key(&local, |r| r.x),
        ) else {
            return Err(DetectionFailure::EmptyRectangleSet);
        };
        let src = [
            [f64::from(l.x), f64::from(l.y)],
            [f64::from(r.right()), f64::from(r.y)],
            [f64::from(r.right()), f64::from(r.bottom())],
            [f64::from(l.x), f64::from(l.bottom())],
        ];
        let (w, h) = (f64::from(self.width), f64::from(self.height));
        let dst = [[0.0, 0.0], [w, 0.0], [w, h], [0.0, h]];
        to_projection(&quad_to_quad(&src, &dst)?)
    }

    /// Rectified `width × height` view of the digit band.
    ///
    /// A single rectangle reduces to a plain crop and resize. Samples that
    /// fall outside the crop, including the last row and column the bilinear
    /// sampler cannot reach, read as white background.
    pub fn align(&self, image: &GrayImage, rects: &[Rect]) -> Result<GrayImage, DetectionFailure> {
        let crop_rect = self.crop_box(image, rects)?;
        let crop = imageops::crop_imm(
            image,
            crop_rect.x,
            crop_rect.y,
            crop_rect.width,
            crop_rect.height,
        )
        .to_image();
        let projection = self.projection(&crop_rect, rects)?;

        let mut out = GrayImage::new(self.width, self.height);
        warp_into(&crop, &projection, Interpolation::Bilinear, Luma([255]), &mut out);
        tracing::debug!(crop = ?crop_rect, rects = rects.len(), "digit band rectified");
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{fill_rect, white};

    fn aligner(width: u32, height: u32) -> PerspectiveAligner {
        PerspectiveAligner::new(&AlignConfig { width, height }).unwrap()
    }

    fn gradient(w: u32, h: u32) -> GrayImage {
        GrayImage::from_fn(w, h, |x, y| Luma([((x * 3 + y * 5) % 251) as u8]))
    }

    #[test]
    fn empty_rect_set_is_rejected() {
        let img = white(40, 40);
        assert_eq!(
            aligner(60, 30).align(&img, &[]),
            Err(DetectionFailure::EmptyRectangleSet)
        );
    }

    #[test]
    fn single_rect_equals_crop_and_resize() {
        let img = gradient(80, 60);
        let rect = Rect::new(10, 20, 30, 15);
        let got = aligner(60, 30).align(&img, &[rect]).unwrap();

        let crop = imageops::crop_imm(&img, 10, 20, 30, 15).to_image();
        let mut expected = GrayImage::new(60, 30);
        warp_into(
            &crop,
            &Projection::scale(2.0, 2.0),
            Interpolation::Bilinear,
            Luma([255]),
            &mut expected,
        );
        assert_eq!(got, expected);
    }

    #[test]
    fn crop_box_uses_extreme_rectangles_not_union() {
        let img = white(300, 200);
        // The rectangle with the largest x is narrow; a wider one ends further right.
        let rects = [
            Rect::new(20, 40, 30, 50),
            Rect::new(100, 30, 90, 40),
            Rect::new(150, 45, 10, 60),
        ];
        let aligner = aligner(600, 300);
        let b = aligner.crop_box(&img, &rects).unwrap();
        assert_eq!(b, Rect::new(20, 30, 140, 75));
    }

    #[test]
    fn axis_aligned_band_rectifies_to_full_frame() {
        let mut img = white(200, 100);
        let rects = [Rect::new(20, 30, 20, 40), Rect::new(80, 30, 20, 40)];
        for r in rects {
            fill_rect(&mut img, r, 0);
        }
        let out = aligner(240, 80).align(&img, &rects).unwrap();
        assert_eq!(out.dimensions(), (240, 80));
        // Crop is 80×40 → 3× horizontal, 2× vertical.
        assert_eq!(out.get_pixel(30, 40)[0], 0, "left digit");
        assert!(out.get_pixel(120, 40)[0] > 250, "gap between digits");
        assert_eq!(out.get_pixel(200, 40)[0], 0, "right digit");
    }

    #[test]
    fn stacked_rectangles_still_rectify() {
        let img = white(100, 100);
        // Same x: the first rectangle is both leftmost and rightmost.
        let rects = [Rect::new(10, 10, 20, 20), Rect::new(10, 40, 20, 20)];
        let out = aligner(50, 50).align(&img, &rects).unwrap();
        assert_eq!(out.dimensions(), (50, 50));
    }

    #[test]
    fn level_band_leaves_edges_white() {
        let mut img = white(200, 100);
        let rects = [
            Rect::new(20, 20, 30, 50),
            Rect::new(70, 20, 30, 50),
            Rect::new(120, 20, 30, 50),
        ];
        for r in rects {
            fill_rect(&mut img, r, 0);
        }
        let out = aligner(600, 300).align(&img, &rects).unwrap();
        // Digits touch the bottom and right of the crop; the unreachable
        // border samples must not join them.
        let (w, h) = out.dimensions();
        assert_eq!(out.get_pixel(w / 2 - 90, h - 1)[0], 255, "gap on bottom row");
        assert_eq!(out.get_pixel(w - 1, h / 2)[0], 255, "right column");
        assert_eq!(out.get_pixel(w / 2, h / 2)[0], 0, "middle digit");
    }
}
