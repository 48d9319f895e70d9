use nalgebra::{Point3, RealField, Rotation3, Unit, Vector3};

#[cfg(feature = "serde-serialize")]
use serde::{Deserialize, Serialize};

use crate::{
    orthonormalized, project_to_plane, CorrectionRequest, Error, Line, Plane, Quadrilateral,
    Sensor,
};

/// A rectangle lying on a plane in front of the sensor.
///
/// Useful to generate scenes with a known answer: its image lines can be fed
/// to the corrector, which should recover the rectangle's aspect ratio.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub struct SyntheticTarget<R: RealField> {
    /// Center of the rectangle.
    pub center: Point3<R>,
    /// Normal of the plane holding the rectangle. Need not be unit length.
    pub normal: Vector3<R>,
    /// Extent along the plane's horizontal axis.
    pub width: R,
    /// Extent along the plane's vertical axis.
    pub height: R,
}

impl<R: RealField + Copy> SyntheticTarget<R> {
    /// Create a new target.
    pub fn new(center: Point3<R>, normal: Vector3<R>, width: R, height: R) -> Self {
        Self {
            center,
            normal,
            width,
            height,
        }
    }

    /// Return a copy with the normal rotated by `angle` radians about the
    /// image `x` axis.
    pub fn tilted(&self, angle: R) -> Self {
        let rotation = Rotation3::from_axis_angle(&Vector3::x_axis(), angle);
        Self {
            normal: rotation * self.normal,
            ..*self
        }
    }

    /// Return the width over the height.
    #[inline]
    pub fn aspect_ratio(&self) -> R {
        self.width / self.height
    }

    /// Return the in-plane horizontal and vertical unit axes.
    ///
    /// These are the image `x` and `y` axes made orthogonal to the normal, so
    /// a target facing the sensor has axes aligned with the image.
    pub fn basis(&self) -> Result<(Unit<Vector3<R>>, Unit<Vector3<R>>), Error> {
        let [_, x, y] = orthonormalized([self.normal, Vector3::x(), Vector3::y()])?;
        Ok((Unit::new_unchecked(x), Unit::new_unchecked(y)))
    }

    /// Return the corners in quadrilateral order: top-left, top-right,
    /// bottom-left, bottom-right.
    pub fn corners(&self) -> Result<[Point3<R>; 4], Error> {
        let (x, y) = self.basis()?;
        let two: R = nalgebra::convert(2.0);
        let dx = x.into_inner() * (self.width / two);
        let dy = y.into_inner() * (self.height / two);
        let c = self.center;
        Ok([c - dx - dy, c + dx - dy, c - dx + dy, c + dx + dy])
    }

    /// Return the corners as seen through a pinhole at `sensor` with the
    /// focal plane at `focal_distance`.
    ///
    /// Fails with [`Error::InvalidGeometry`](enum.Error.html) unless every
    /// corner lies strictly in front of the sensor.
    pub fn image_corners(
        &self,
        sensor: &Sensor<R>,
        focal_distance: R,
    ) -> Result<Quadrilateral<R>, Error> {
        if !(focal_distance > R::zero()) {
            return Err(Error::InvalidGeometry);
        }
        let corners = self.corners()?;
        let forward = Sensor::<R>::forward();
        if corners
            .iter()
            .any(|pt| !(forward.dot(&(pt - sensor.center())) > R::zero()))
        {
            return Err(Error::InvalidGeometry);
        }
        let focal_plane = Plane::new(forward, sensor.point_at_depth(focal_distance));
        let projected = project_to_plane(&corners, sensor.center(), &focal_plane)?;
        Ok(projected.map(|pt| pt.xy()))
    }

    /// Return the two horizontal and two vertical edges as image lines.
    ///
    /// The horizontal lines run along the top and bottom edges, the vertical
    /// lines along the left and right edges, so intersecting them rebuilds
    /// [`image_corners`](#method.image_corners) in order.
    pub fn image_lines(
        &self,
        sensor: &Sensor<R>,
        focal_distance: R,
    ) -> Result<([Line<R>; 2], [Line<R>; 2]), Error> {
        let [tl, tr, bl, br] = self.image_corners(sensor, focal_distance)?;
        let horizontal = [Line::new(tl, tr), Line::new(bl, br)];
        let vertical = [Line::new(tl, bl), Line::new(tr, br)];
        Ok((horizontal, vertical))
    }

    /// Return a correction request for the image of this target.
    pub fn request(
        &self,
        sensor: &Sensor<R>,
        focal_distance: R,
    ) -> Result<CorrectionRequest<R>, Error> {
        let (horizontal, vertical) = self.image_lines(sensor, focal_distance)?;
        Ok(CorrectionRequest::new(horizontal, vertical, *sensor))
    }
}
