use image::GrayImage;

use crate::contour::{ink_contours, ink_pixels_in};
use crate::error::DetectionFailure;
use crate::raster::Rect;

/// Picks digit candidates out of a binary image by contour area.
///
/// Every ink border (outer and hole) is a contour. Its area is the number of
/// ink pixels inside its bounding rectangle. Areas are min-max normalized;
/// contours above the acceptance ratio that sit within a third of the largest
/// object's height from its top edge are kept.
#[derive(Debug, Clone)]
pub struct LargestObjectLocator {
    area_ratio: f64,
}

impl LargestObjectLocator {
    pub(crate) fn new(area_ratio: f64) -> Self {
        Self { area_ratio }
    }

    /// Candidate rectangles in contour-discovery order.
    ///
    /// Zero contours fail with [`DetectionFailure::NoInk`]. A zero area range
    /// (one contour, or all equal) normalizes every area to 1.0.
    pub fn locate(&self, binary: &GrayImage) -> Result<Vec<Rect>, DetectionFailure> {
        let contours = ink_contours(binary);
        if contours.is_empty() {
            return Err(DetectionFailure::NoInk);
        }

        let areas: Vec<u64> = contours
            .iter()
            .map(|c| ink_pixels_in(binary, &c.rect))
            .collect();

        // First occurrence wins ties.
        let mut largest = 0usize;
        for (i, &a) in areas.iter().enumerate() {
            if a > areas[largest] {
                largest = i;
            }
        }
        let big = contours[largest].rect;

        let min_area = areas.iter().copied().min().unwrap_or(0) as f64;
        let max_area = areas[largest] as f64;
        let range = max_area - min_area;
        let tolerance = f64::from(big.height) / 3.0;

        let rects: Vec<Rect> = contours
            .iter()
            .zip(&areas)
            .filter(|(_, &area)| {
                let normalized = if range > 0.0 {
                    (area as f64 - min_area) / range
                } else {
                    1.0
                };
                normalized > self.area_ratio
            })
            .map(|(c, _)| c.rect)
            .filter(|r| (f64::from(r.y) - f64::from(big.y)).abs() < tolerance)
            .collect();

        tracing::debug!(
            contours = contours.len(),
            candidates = rects.len(),
            largest = ?big,
            "digit candidates located"
        );
        Ok(rects)
    }
}
