use nalgebra::{Point3, RealField, Unit, Vector3};

#[cfg(feature = "serde-serialize")]
use serde::{Deserialize, Serialize};

use crate::{Error, Tolerances};

/// A plane defined by its unit normal and one point on it.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub struct Plane<R: RealField> {
    normal: Unit<Vector3<R>>,
    point: Point3<R>,
}

impl<R: RealField + Copy> Plane<R> {
    /// Create a new plane with unit `normal` through `point`.
    #[inline]
    pub fn new(normal: Unit<Vector3<R>>, point: Point3<R>) -> Self {
        Self { normal, point }
    }

    /// Return the plane normal.
    #[inline]
    pub fn normal(&self) -> &Unit<Vector3<R>> {
        &self.normal
    }

    /// Return the point the plane was defined with.
    #[inline]
    pub fn point(&self) -> &Point3<R> {
        &self.point
    }

    /// Return the signed distance of `pt` from the plane, positive on the
    /// side the normal points to.
    #[inline]
    pub fn signed_distance(&self, pt: &Point3<R>) -> R {
        self.normal.dot(&(pt - self.point))
    }
}

/// Project a point onto `plane` along the ray from `sensor` through it.
pub fn project_point<R>(
    pt: &Point3<R>,
    sensor: &Point3<R>,
    plane: &Plane<R>,
) -> Result<Point3<R>, Error>
where
    R: RealField + Copy,
{
    project_point_with_tolerance(pt, sensor, plane, Tolerances::default().projection)
}

/// Project a point onto `plane` along the ray from `sensor` through it.
///
/// Rays whose angle to the plane normal has a cosine of at most `tolerance`
/// are treated as parallel to the plane.
pub fn project_point_with_tolerance<R>(
    pt: &Point3<R>,
    sensor: &Point3<R>,
    plane: &Plane<R>,
    tolerance: R,
) -> Result<Point3<R>, Error>
where
    R: RealField + Copy,
{
    // Force sensor to be the origin, project, then translate back.
    let ray = pt - sensor;
    let denom = plane.normal.dot(&ray);
    if !(denom.abs() > tolerance * ray.norm()) {
        return Err(Error::InvalidGeometry);
    }
    let c = plane.normal.dot(&(plane.point - sensor)) / denom;
    Ok(sensor + ray * c)
}

/// Project points onto `plane` through a common center at `sensor`.
///
/// Returns [`Error::InvalidGeometry`](enum.Error.html) if any ray from the
/// sensor runs parallel to the plane.
pub fn project_to_plane<R, const N: usize>(
    points: &[Point3<R>; N],
    sensor: &Point3<R>,
    plane: &Plane<R>,
) -> Result<[Point3<R>; N], Error>
where
    R: RealField + Copy,
{
    project_to_plane_with_tolerance(points, sensor, plane, Tolerances::default().projection)
}

/// Project points onto `plane` through a common center at `sensor` with an
/// explicit parallel-ray tolerance.
pub fn project_to_plane_with_tolerance<R, const N: usize>(
    points: &[Point3<R>; N],
    sensor: &Point3<R>,
    plane: &Plane<R>,
    tolerance: R,
) -> Result<[Point3<R>; N], Error>
where
    R: RealField + Copy,
{
    let mut projected = *points;
    for pt in projected.iter_mut() {
        *pt = project_point_with_tolerance(pt, sensor, plane, tolerance)?;
    }
    Ok(projected)
}
