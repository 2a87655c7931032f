//! Accuracy metrics against ground-truth detections.

use crate::raster::Rect;

/// Intersection over union of two rectangles.
pub fn iou(a: &Rect, b: &Rect) -> f64 {
    let x0 = a.x.max(b.x);
    let y0 = a.y.max(b.y);
    let x1 = a.right().min(b.right());
    let y1 = a.bottom().min(b.bottom());
    let inter = if x1 > x0 && y1 > y0 {
        u64::from(x1 - x0) * u64::from(y1 - y0)
    } else {
        0
    };
    let union = a.area() + b.area() - inter;
    if union == 0 {
        return 0.0;
    }
    inter as f64 / union as f64
}

/// Mean IoU over position-paired rectangles; `None` when the counts differ
/// or both lists are empty.
pub fn mean_iou(predicted: &[Rect], truth: &[Rect]) -> Option<f64> {
    if predicted.len() != truth.len() || truth.is_empty() {
        return None;
    }
    let sum: f64 = predicted.iter().zip(truth).map(|(p, t)| iou(p, t)).sum();
    Some(sum / truth.len() as f64)
}

/// Digit-string tally over a set of tags.
///
/// A read of the right length counts as a true positive when it matches and
/// a false positive otherwise; a length mismatch is a false negative.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize)]
pub struct DigitScore {
    pub true_positives: usize,
    pub false_positives: usize,
    pub false_negatives: usize,
}

impl DigitScore {
    pub fn record(&mut self, predicted: &str, truth: &str) {
        if predicted.chars().count() != truth.chars().count() {
            self.false_negatives += 1;
        } else if predicted == truth {
            self.true_positives += 1;
        } else {
            self.false_positives += 1;
        }
    }

    pub fn total(&self) -> usize {
        self.true_positives + self.false_positives + self.false_negatives
    }

    /// Correct reads among full-length reads.
    pub fn precision(&self) -> Option<f64> {
        let read = self.true_positives + self.false_positives;
        (read > 0).then(|| self.true_positives as f64 / read as f64)
    }

    /// Full-length reads among all tags.
    pub fn read_rate(&self) -> Option<f64> {
        let total = self.total();
        (total > 0).then(|| (self.true_positives + self.false_positives) as f64 / total as f64)
    }
}
