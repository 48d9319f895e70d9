use nalgebra::{Point2, RealField, Vector3};

#[cfg(feature = "serde-serialize")]
use serde::{Deserialize, Serialize};

use crate::{Error, Tolerances};

/// An infinite line through two image points.
///
/// The two points must be distinct. A line built from coincident points is
/// accepted here but rejected by [`intersect`](fn.intersect.html).
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub struct Line<R: RealField> {
    /// First point on the line.
    pub a: Point2<R>,
    /// Second point on the line.
    pub b: Point2<R>,
}

impl<R: RealField + Copy> Line<R> {
    /// Create a new line through `a` and `b`.
    #[inline]
    pub fn new(a: Point2<R>, b: Point2<R>) -> Self {
        Self { a, b }
    }

    /// Return the homogeneous representation `(a, b, c)` of the line, such
    /// that `a*x + b*y + c = 0` for every point on it.
    ///
    /// This is the cross product of the two points lifted to `(x, y, 1)`.
    #[inline]
    pub fn homogeneous(&self) -> Vector3<R> {
        self.a.to_homogeneous().cross(&self.b.to_homogeneous())
    }

    /// Return `true` if both points coincide.
    #[inline]
    pub fn is_degenerate(&self) -> bool {
        self.a == self.b
    }
}

/// Find the intersection of two lines.
///
/// Returns [`Error::DegenerateConfiguration`](enum.Error.html) if the lines
/// are parallel, coincident or degenerate.
pub fn intersect<R>(l1: &Line<R>, l2: &Line<R>) -> Result<Point2<R>, Error>
where
    R: RealField + Copy,
{
    intersect_with_tolerance(l1, l2, Tolerances::default().parallel)
}

/// Find the intersection of two lines, treating lines whose angle has a sine
/// of at most `tolerance` as parallel.
pub fn intersect_with_tolerance<R>(
    l1: &Line<R>,
    l2: &Line<R>,
    tolerance: R,
) -> Result<Point2<R>, Error>
where
    R: RealField + Copy,
{
    let n1 = l1.homogeneous();
    let n2 = l2.homogeneous();
    let pt = n1.cross(&n2);

    // The weight equals |n1.xy| * |n2.xy| * sin(angle between the lines).
    let weight = pt.z;
    let scale = n1.xy().norm() * n2.xy().norm();
    if !(weight.abs() > tolerance * scale) {
        return Err(Error::DegenerateConfiguration);
    }

    Ok(Point2::new(pt.x / weight, pt.y / weight))
}
