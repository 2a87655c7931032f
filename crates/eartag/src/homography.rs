//! Quadrilateral-to-rectangle homography via DLT with Hartley normalization.

use imageproc::geometric_transformations::Projection;
use nalgebra::{DMatrix, Matrix3, Vector3};

use crate::error::DetectionFailure;

/// Project a 2D point through a 3×3 homography: H * [x, y, 1]^T → [u, v].
pub(crate) fn project(h: &Matrix3<f64>, x: f64, y: f64) -> [f64; 2] {
    let p = h * Vector3::new(x, y, 1.0);
    if p[2].abs() < 1e-15 {
        return [f64::NAN, f64::NAN];
    }
    [p[0] / p[2], p[1] / p[2]]
}

/// Similarity that centres the corners and spreads them to an average
/// radius of sqrt(2), with the corners already mapped through it.
fn normalize_points(pts: &[[f64; 2]]) -> (Matrix3<f64>, Vec<[f64; 2]>) {
    let n = pts.len() as f64;
    let cx: f64 = pts.iter().map(|p| p[0]).sum::<f64>() / n;
    let cy: f64 = pts.iter().map(|p| p[1]).sum::<f64>() / n;

    let mean_dist: f64 = pts
        .iter()
        .map(|p| ((p[0] - cx).powi(2) + (p[1] - cy).powi(2)).sqrt())
        .sum::<f64>()
        / n;

    let s = if mean_dist > 1e-15 {
        std::f64::consts::SQRT_2 / mean_dist
    } else {
        1.0
    };

    let t = Matrix3::new(s, 0.0, -s * cx, 0.0, s, -s * cy, 0.0, 0.0, 1.0);
    let normalized = pts
        .iter()
        .map(|p| [s * (p[0] - cx), s * (p[1] - cy)])
        .collect();
    (t, normalized)
}

/// Homography mapping the four `src` corners onto the four `dst` corners.
///
/// Fails with [`DetectionFailure::DegenerateQuad`] when the solution is not
/// invertible (collinear or coincident corners).
pub(crate) fn quad_to_quad(
    src: &[[f64; 2]; 4],
    dst: &[[f64; 2]; 4],
) -> Result<Matrix3<f64>, DetectionFailure> {
    let (t_src, src_n) = normalize_points(src);
    let (t_dst, dst_n) = normalize_points(dst);

    // Four corners give exactly eight constraints on the nine entries, so the
    // system has a one-dimensional null space.
    let mut a = DMatrix::zeros(8, 9);
    for (i, (s, d)) in src_n.iter().zip(&dst_n).enumerate() {
        let (sx, sy) = (s[0], s[1]);
        let (dx, dy) = (d[0], d[1]);

        // v equation, then u equation, from d × (H s) = 0.
        a[(2 * i, 3)] = -sx;
        a[(2 * i, 4)] = -sy;
        a[(2 * i, 5)] = -1.0;
        a[(2 * i, 6)] = dy * sx;
        a[(2 * i, 7)] = dy * sy;
        a[(2 * i, 8)] = dy;

        a[(2 * i + 1, 0)] = sx;
        a[(2 * i + 1, 1)] = sy;
        a[(2 * i + 1, 2)] = 1.0;
        a[(2 * i + 1, 6)] = -dx * sx;
        a[(2 * i + 1, 7)] = -dx * sy;
        a[(2 * i + 1, 8)] = -dx;
    }

    // Smallest-eigenvalue direction of AᵀA spans that null space.
    let eig = nalgebra::SymmetricEigen::new(a.transpose() * &a);
    let min_idx = eig
        .eigenvalues
        .iter()
        .enumerate()
        .min_by(|(_, x), (_, y)| x.abs().total_cmp(&y.abs()))
        .map(|(i, _)| i)
        .ok_or(DetectionFailure::DegenerateQuad)?;
    let h = eig.eigenvectors.column(min_idx);
    #[rustfmt::skip]
    let h_norm = Matrix3::new(
        h[0], h[1], h[2],
        h[3], h[4], h[5],
        h[6], h[7], h[8],
    );

    let t_dst_inv = t_dst
        .try_inverse()
        .ok_or(DetectionFailure::DegenerateQuad)?;
    let h = t_dst_inv * h_norm * t_src;

    let scale = h[(2, 2)];
    if scale.abs() < 1e-12 || !h.iter().all(|v| v.is_finite()) {
        return Err(DetectionFailure::DegenerateQuad);
    }
    let h = h / scale;
    if h.determinant().abs() < 1e-9 * h.norm().powi(3) {
        return Err(DetectionFailure::DegenerateQuad);
    }
    // Corners must land on their targets; a near-singular system does not.
    for (s, d) in src.iter().zip(dst) {
        let p = project(&h, s[0], s[1]);
        if !((p[0] - d[0]).abs() < 1e-3 && (p[1] - d[1]).abs() < 1e-3) {
            return Err(DetectionFailure::DegenerateQuad);
        }
    }
    Ok(h)
}

/// Convert to an `imageproc` projection for warping.
pub(crate) fn to_projection(h: &Matrix3<f64>) -> Result<Projection, DetectionFailure> {
    let m = [
        h[(0, 0)] as f32,
        h[(0, 1)] as f32,
        h[(0, 2)] as f32,
        h[(1, 0)] as f32,
        h[(1, 1)] as f32,
        h[(1, 2)] as f32,
        h[(2, 0)] as f32,
        h[(2, 1)] as f32,
        h[(2, 2)] as f32,
    ];
    Projection::from_matrix(m).ok_or(DetectionFailure::DegenerateQuad)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn corners(x0: f64, y0: f64, x1: f64, y1: f64) -> [[f64; 2]; 4] {
        [[x0, y0], [x1, y0], [x1, y1], [x0, y1]]
    }

    #[test]
    fn axis_aligned_box_maps_to_pure_scale() {
        let src = corners(0.0, 0.0, 220.0, 70.0);
        let dst = corners(0.0, 0.0, 600.0, 300.0);
        let h = quad_to_quad(&src, &dst).unwrap();
        assert_relative_eq!(h[(0, 0)], 600.0 / 220.0, epsilon = 1e-8);
        assert_relative_eq!(h[(1, 1)], 300.0 / 70.0, epsilon = 1e-8);
        assert_relative_eq!(h[(0, 1)], 0.0, epsilon = 1e-8);
        assert_relative_eq!(h[(2, 0)], 0.0, epsilon = 1e-8);
        let p = project(&h, 110.0, 35.0);
        assert_relative_eq!(p[0], 300.0, epsilon = 1e-7);
        assert_relative_eq!(p[1], 150.0, epsilon = 1e-7);
    }

    #[test]
    fn skewed_quad_corners_hit_targets() {
        let src = [[3.0, 10.0], [210.0, 24.0], [214.0, 96.0], [0.0, 80.0]];
        let dst = corners(0.0, 0.0, 600.0, 300.0);
        let h = quad_to_quad(&src, &dst).unwrap();
        for (s, d) in src.iter().zip(dst.iter()) {
            let p = project(&h, s[0], s[1]);
            assert_relative_eq!(p[0], d[0], epsilon = 1e-6);
            assert_relative_eq!(p[1], d[1], epsilon = 1e-6);
        }
        assert!(to_projection(&h).is_ok());
    }

    #[test]
    fn collapsed_quad_is_degenerate() {
        let src = [[5.0, 5.0], [5.0, 5.0], [5.0, 9.0], [5.0, 9.0]];
        let dst = corners(0.0, 0.0, 600.0, 300.0);
        assert_eq!(
            quad_to_quad(&src, &dst),
            Err(DetectionFailure::DegenerateQuad)
        );
    }
}
