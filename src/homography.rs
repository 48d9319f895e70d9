//! Eight-parameter projective maps between image planes.
//!
//! The maps use the convention of image resamplers which fill each output
//! pixel by reading from the input image: coefficients `c0..c7` take an
//! output position `(x, y)` to the input position
//!
//! ```text
//! x' = (c0*x + c1*y + c2) / (c6*x + c7*y + 1)
//! y' = (c3*x + c4*y + c5) / (c6*x + c7*y + 1)
//! ```

use nalgebra::{Matrix3, Point2, RealField, SMatrix, Vector2};

use itertools::izip;

#[cfg(feature = "serde-serialize")]
use serde::{Deserialize, Serialize};

use crate::{Error, Tolerances};

/// The eight coefficients of a projective map whose bottom-right matrix
/// entry is fixed to one.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub struct PerspectiveCoefficients<R: RealField> {
    coeffs: [R; 8],
}

impl<R: RealField + Copy> PerspectiveCoefficients<R> {
    /// Create a new instance from `c0..c7`.
    #[inline]
    pub fn new(coeffs: [R; 8]) -> Self {
        Self { coeffs }
    }

    /// The map which leaves every point in place.
    pub fn identity() -> Self {
        let (o, z) = (R::one(), R::zero());
        Self::new([o, z, z, z, o, z, z, z])
    }

    /// Create a new instance from a 3x3 homography matrix.
    ///
    /// The matrix is rescaled so its bottom-right entry is one. Returns `None`
    /// if that entry is zero, since such a map has no eight-parameter form.
    pub fn from_matrix(m: &Matrix3<R>) -> Option<Self> {
        let scale = m[(2, 2)];
        let eps = <R as approx::AbsDiffEq>::default_epsilon();
        if !(scale.abs() > eps * m.norm()) {
            return None;
        }
        let m = m / scale;
        #[rustfmt::skip]
        let coeffs = [
            m[(0, 0)], m[(0, 1)], m[(0, 2)],
            m[(1, 0)], m[(1, 1)], m[(1, 2)],
            m[(2, 0)], m[(2, 1)],
        ];
        Some(Self::new(coeffs))
    }

    /// Return the coefficients `c0..c7`.
    #[inline]
    pub fn as_array(&self) -> &[R; 8] {
        &self.coeffs
    }

    /// Return the 3x3 homography matrix.
    #[inline]
    pub fn to_matrix(&self) -> Matrix3<R> {
        let c = &self.coeffs;
        #[rustfmt::skip]
        let m = Matrix3::new(
            c[0], c[1], c[2],
            c[3], c[4], c[5],
            c[6], c[7], R::one(),
        );
        m
    }

    /// Map a point. Returns `None` if it is sent to infinity.
    pub fn apply(&self, pt: &Point2<R>) -> Option<Point2<R>> {
        let c = &self.coeffs;
        let w = c[6] * pt.x + c[7] * pt.y + R::one();
        if w == R::zero() {
            return None;
        }
        Some(Point2::new(
            (c[0] * pt.x + c[1] * pt.y + c[2]) / w,
            (c[3] * pt.x + c[4] * pt.y + c[5]) / w,
        ))
    }

    /// Return the map in the opposite direction.
    ///
    /// Returns `None` if the map is not invertible or its inverse has no
    /// eight-parameter form.
    pub fn inverse(&self) -> Option<Self> {
        self.to_matrix()
            .try_inverse()
            .and_then(|m| Self::from_matrix(&m))
    }
}

/// Similarity moving the centroid of four points to the origin and their
/// mean distance from it to `sqrt(2)`.
struct Normalization<R: RealField> {
    centroid: Vector2<R>,
    scale: R,
}

impl<R: RealField + Copy> Normalization<R> {
    fn new(points: &[Point2<R>; 4]) -> Option<Self> {
        let n: R = nalgebra::convert(4.0);
        // Iter::Sum is not implemented for R.
        let centroid = points
            .iter()
            .fold(Vector2::zeros(), |acc, p| acc + p.coords)
            / n;
        let mean_dist = points
            .iter()
            .fold(R::zero(), |acc, p| acc + (p.coords - centroid).norm())
            / n;
        if !(mean_dist > R::zero()) {
            return None;
        }
        let sqrt2: R = nalgebra::convert::<f64, R>(2.0).sqrt();
        Some(Self {
            centroid,
            scale: sqrt2 / mean_dist,
        })
    }

    #[inline]
    fn apply(&self, pt: &Point2<R>) -> Point2<R> {
        Point2::from((pt.coords - self.centroid) * self.scale)
    }

    fn matrix(&self) -> Matrix3<R> {
        let (s, c) = (self.scale, &self.centroid);
        let (o, z) = (R::one(), R::zero());
        #[rustfmt::skip]
        let m = Matrix3::new(
            s, z, -s * c.x,
            z, s, -s * c.y,
            z, z, o,
        );
        m
    }

    fn inverse_matrix(&self) -> Matrix3<R> {
        let (s, c) = (self.scale, &self.centroid);
        let (o, z) = (R::one(), R::zero());
        #[rustfmt::skip]
        let m = Matrix3::new(
            o / s, z, c.x,
            z, o / s, c.y,
            z, z, o,
        );
        m
    }
}

/// Find the coefficients of the projective map taking each `source` point to
/// the `target` point with the same index.
///
/// Returns [`Error::SingularSystem`](../enum.Error.html) if the
/// correspondences do not determine a unique map, e.g. when the source points
/// are collinear or all points of either set coincide.
pub fn solve<R>(
    source: &[Point2<R>; 4],
    target: &[Point2<R>; 4],
) -> Result<PerspectiveCoefficients<R>, Error>
where
    R: RealField + Copy,
{
    solve_with_tolerance(source, target, Tolerances::default().singular)
}

/// Find the coefficients of the projective map taking `source` to `target`,
/// failing if the second smallest singular value of the system is at most
/// `tolerance` times the largest.
///
/// Both point sets are normalized and the homogeneous system `A h = 0` of the
/// full 3x3 homography is set up. Its solution is the right singular vector of
/// the smallest singular value. The system is singular unless that null space
/// is one-dimensional, which is checked by comparing the second smallest
/// singular value to the largest. The result is denormalized and scaled so its
/// bottom-right entry is one.
pub fn solve_with_tolerance<R>(
    source: &[Point2<R>; 4],
    target: &[Point2<R>; 4],
    tolerance: R,
) -> Result<PerspectiveCoefficients<R>, Error>
where
    R: RealField + Copy,
{
    let src_norm = Normalization::new(source).ok_or(Error::SingularSystem)?;
    let dst_norm = Normalization::new(target).ok_or(Error::SingularSystem)?;

    let one = R::one();
    // Eight equations; the last row stays zero so the SVD yields a full V.
    let mut a = SMatrix::<R, 9, 9>::zeros();

    for (i, p, q) in izip!(0.., source.iter(), target.iter()) {
        let p = src_norm.apply(p);
        let q = dst_norm.apply(q);
        let (x, y) = (p.x, p.y);
        let (u, v) = (q.x, q.y);

        let r0 = 2 * i;
        let r1 = 2 * i + 1;

        a[(r0, 0)] = x;
        a[(r0, 1)] = y;
        a[(r0, 2)] = one;
        a[(r0, 6)] = -u * x;
        a[(r0, 7)] = -u * y;
        a[(r0, 8)] = -u;

        a[(r1, 3)] = x;
        a[(r1, 4)] = y;
        a[(r1, 5)] = one;
        a[(r1, 6)] = -v * x;
        a[(r1, 7)] = -v * y;
        a[(r1, 8)] = -v;
    }

    let eps = <R as approx::AbsDiffEq>::default_epsilon();
    let svd = a.try_svd(false, true, eps, 0).ok_or(Error::SingularSystem)?;
    let v_t = svd.v_t.ok_or(Error::SingularSystem)?;
    let sv = &svd.singular_values;

    let largest = sv.max();
    let smallest = (1..9).fold(0, |k, i| if sv[i] < sv[k] { i } else { k });
    let second = (0..9)
        .filter(|&i| i != smallest)
        .fold(largest, |lo, i| lo.min(sv[i]));
    if !(largest > R::zero()) || !(second > tolerance * largest) {
        return Err(Error::SingularSystem);
    }

    let h = v_t.row(smallest);
    #[rustfmt::skip]
    let normalized = Matrix3::new(
        h[0], h[1], h[2],
        h[3], h[4], h[5],
        h[6], h[7], h[8],
    );
    let m = dst_norm.inverse_matrix() * normalized * src_norm.matrix();

    PerspectiveCoefficients::from_matrix(&m).ok_or(Error::SingularSystem)
}
