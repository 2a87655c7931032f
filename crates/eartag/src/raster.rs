//! Shared raster value types: rectangles, tag masks and grayscale conversion.

use image::{GrayImage, Luma, RgbImage};
use imageproc::point::Point;

/// Axis-aligned integer rectangle, origin top-left.
///
/// Serialized as `[x, y, width, height]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(from = "[u32; 4]", into = "[u32; 4]")]
pub struct Rect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl Rect {
    pub const fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Exclusive right edge.
    pub fn right(&self) -> u32 {
        self.x + self.width
    }

    /// Exclusive bottom edge.
    pub fn bottom(&self) -> u32 {
        self.y + self.height
    }

    pub fn area(&self) -> u64 {
        u64::from(self.width) * u64::from(self.height)
    }

    /// Tight bound of a pixel point set; `None` for an empty set.
    ///
    /// Negative coordinates are clamped to zero.
    pub fn bounding<'a, I>(points: I) -> Option<Self>
    where
        I: IntoIterator<Item = &'a Point<i32>>,
    {
        let mut it = points.into_iter();
        let first = it.next()?;
        let (mut x0, mut y0, mut x1, mut y1) = (first.x, first.y, first.x, first.y);
        for p in it {
            x0 = x0.min(p.x);
            y0 = y0.min(p.y);
            x1 = x1.max(p.x);
            y1 = y1.max(p.y);
        }
        let x0 = x0.max(0);
        let y0 = y0.max(0);
        Some(Self::new(
            x0 as u32,
            y0 as u32,
            (x1 - x0 + 1).max(1) as u32,
            (y1 - y0 + 1).max(1) as u32,
        ))
    }

    /// Same rectangle expressed relative to a new origin.
    pub(crate) fn translated(&self, origin_x: u32, origin_y: u32) -> Self {
        Self::new(
            self.x.saturating_sub(origin_x),
            self.y.saturating_sub(origin_y),
            self.width,
            self.height,
        )
    }
}

impl From<[u32; 4]> for Rect {
    fn from(v: [u32; 4]) -> Self {
        Self::new(v[0], v[1], v[2], v[3])
    }
}

impl From<Rect> for [u32; 4] {
    fn from(r: Rect) -> Self {
        [r.x, r.y, r.width, r.height]
    }
}

/// Boolean tag-region mask; `true` marks pixels on the tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagMask {
    width: u32,
    height: u32,
    data: Vec<bool>,
}

impl TagMask {
    /// Mask of all pixels strictly brighter than zero in `image`.
    pub fn from_foreground(image: &GrayImage) -> Self {
        let (width, height) = image.dimensions();
        Self {
            width,
            height,
            data: image.pixels().map(|p| p[0] > 0).collect(),
        }
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn contains(&self, x: u32, y: u32) -> bool {
        x < self.width && y < self.height && self.data[(y * self.width + x) as usize]
    }

    pub fn count(&self) -> usize {
        self.data.iter().filter(|&&v| v).count()
    }

    /// 0/255 rendering of the mask.
    pub fn to_image(&self) -> GrayImage {
        GrayImage::from_fn(self.width, self.height, |x, y| {
            Luma([if self.contains(x, y) { 255 } else { 0 }])
        })
    }
}

/// Convert a color photograph to 8-bit gray with BT.601 luma weights.
///
/// Fixed-point 14-bit arithmetic with round-half-up.
pub fn to_grayscale(image: &RgbImage) -> GrayImage {
    const R: u32 = 4899;
    const G: u32 = 9617;
    const B: u32 = 1868;
    const SHIFT: u32 = 14;
    let (w, h) = image.dimensions();
    let mut out = GrayImage::new(w, h);
    for (src, dst) in image.pixels().zip(out.pixels_mut()) {
        let [r, g, b] = src.0;
        let v = (R * u32::from(r) + G * u32::from(g) + B * u32::from(b) + (1 << (SHIFT - 1))) >> SHIFT;
        dst.0 = [v.min(255) as u8];
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    #[test]
    fn rect_serializes_as_four_element_array() {
        let r = Rect::new(95, 326, 74, 123);
        let json = serde_json::to_string(&r).unwrap();
        assert_eq!(json, "[95,326,74,123]");
        let back: Rect = serde_json::from_str(&json).unwrap();
        assert_eq!(back, r);
    }

    #[test]
    fn bounding_covers_inclusive_extent() {
        let pts = [Point::new(3, 4), Point::new(7, 4), Point::new(5, 9)];
        let r = Rect::bounding(pts.iter()).unwrap();
        assert_eq!(r, Rect::new(3, 4, 5, 6));
        assert_eq!(r.right(), 8);
        assert_eq!(r.bottom(), 10);
        assert!(Rect::bounding(std::iter::empty::<&Point<i32>>()).is_none());
    }

    #[test]
    fn grayscale_matches_bt601_weights() {
        let mut img = RgbImage::new(4, 1);
        img.put_pixel(0, 0, Rgb([255, 255, 255]));
        img.put_pixel(1, 0, Rgb([255, 0, 0]));
        img.put_pixel(2, 0, Rgb([0, 255, 0]));
        img.put_pixel(3, 0, Rgb([0, 0, 255]));
        let g = to_grayscale(&img);
        assert_eq!(g.get_pixel(0, 0)[0], 255);
        assert_eq!(g.get_pixel(1, 0)[0], 76);
        assert_eq!(g.get_pixel(2, 0)[0], 150);
        assert_eq!(g.get_pixel(3, 0)[0], 29);
    }

    #[test]
    fn mask_round_trips_through_image() {
        let img = GrayImage::from_fn(6, 4, |x, _| Luma([if x < 3 { 0 } else { 255 }]));
        let mask = TagMask::from_foreground(&img);
        assert_eq!(mask.count(), 12);
        assert!(!mask.contains(0, 0));
        assert!(mask.contains(5, 3));
        assert!(!mask.contains(6, 0), "out of bounds is never on the tag");
        assert_eq!(mask.to_image(), img);
    }
}
