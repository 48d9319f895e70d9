use nalgebra::{Matrix3, Point2, Point3, RealField, Unit, Vector3};

#[cfg(feature = "serde-serialize")]
use serde::{Deserialize, Serialize};

use crate::{
    focal::focal_distance_with_tolerance, homography::solve_with_tolerance,
    line::intersect_with_tolerance, orthonormal::orthonormalize_with_tolerance,
    plane::project_to_plane_with_tolerance, Error, Line, PerspectiveCoefficients, Plane,
    Quadrilateral, Sensor, Tolerances,
};

/// Where the rectified rectangle is placed in the output image.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub enum Anchor<R: RealField> {
    /// Center the rectangle on the sensor.
    SensorCenter,
    /// Keep the rectangle where the reconstruction puts it.
    Unchanged,
    /// Center the rectangle on the given output position.
    Point(Point2<R>),
}

/// Options for a [`PerspectiveCorrector`](struct.PerspectiveCorrector.html).
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub struct CorrectionOptions<R: RealField> {
    /// Placement of the rectified rectangle.
    pub anchor: Anchor<R>,
    /// Degeneracy thresholds passed to every step.
    pub tolerances: Tolerances<R>,
}

impl<R: RealField> Default for Anchor<R> {
    fn default() -> Self {
        Anchor::SensorCenter
    }
}

impl<R: RealField + Copy> Default for CorrectionOptions<R> {
    fn default() -> Self {
        Self {
            anchor: Anchor::default(),
            tolerances: Tolerances::default(),
        }
    }
}

/// The marked lines of one image together with its sensor.
///
/// The horizontal lines follow one edge direction of the photographed
/// rectangle and the vertical lines the other.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub struct CorrectionRequest<R: RealField> {
    /// Two lines along the horizontal edges.
    pub horizontal: [Line<R>; 2],
    /// Two lines along the vertical edges.
    pub vertical: [Line<R>; 2],
    /// The pinhole position.
    pub sensor: Sensor<R>,
}

impl<R: RealField + Copy> CorrectionRequest<R> {
    /// Create a new request.
    pub fn new(horizontal: [Line<R>; 2], vertical: [Line<R>; 2], sensor: Sensor<R>) -> Self {
        Self {
            horizontal,
            vertical,
            sensor,
        }
    }
}

/// Every intermediate result of a correction.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub struct Reconstruction<R: RealField> {
    /// Intersections of the marked lines, in construction order.
    pub quadrilateral: Quadrilateral<R>,
    /// Vanishing point of the horizontal line family.
    pub horizontal_vanishing_point: Point2<R>,
    /// Vanishing point of the vertical line family.
    pub vertical_vanishing_point: Point2<R>,
    /// Distance from the sensor to the focal plane.
    pub focal_distance: R,
    /// Normal of the photographed plane, pointing away from the sensor.
    pub target_normal: Unit<Vector3<R>>,
    /// The quadrilateral projected onto the target plane.
    pub target_rectangle: [Point3<R>; 4],
    /// The target rectangle rotated parallel to the focal plane.
    pub rotated_rectangle: [Point3<R>; 4],
    /// The rotated rectangle in image coordinates, placed by the anchor.
    pub rectified: Quadrilateral<R>,
    /// Map from `rectified` (output) to `quadrilateral` (input).
    pub coefficients: PerspectiveCoefficients<R>,
}

impl<R: RealField + Copy> Reconstruction<R> {
    /// Return the width over height of the rectified rectangle.
    pub fn aspect_ratio(&self) -> R {
        let [r0, r1, r2, _] = &self.rectified;
        (r1 - r0).norm() / (r2 - r0).norm()
    }
}

/// Computes perspective coefficients from marked lines.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PerspectiveCorrector<R: RealField> {
    options: CorrectionOptions<R>,
}

impl<R: RealField + Copy> Default for PerspectiveCorrector<R> {
    fn default() -> Self {
        Self::new(CorrectionOptions::default())
    }
}

impl<R: RealField + Copy> PerspectiveCorrector<R> {
    /// Create a new corrector.
    #[inline]
    pub fn new(options: CorrectionOptions<R>) -> Self {
        Self { options }
    }

    /// Return the options.
    #[inline]
    pub fn options(&self) -> &CorrectionOptions<R> {
        &self.options
    }

    /// Find the coefficients which undo the perspective of the rectangle
    /// outlined by the request's lines.
    pub fn correct(
        &self,
        request: &CorrectionRequest<R>,
    ) -> Result<PerspectiveCoefficients<R>, Error> {
        Ok(self.reconstruct(request)?.coefficients)
    }

    /// Run the full reconstruction and return every intermediate result.
    pub fn reconstruct(
        &self,
        request: &CorrectionRequest<R>,
    ) -> Result<Reconstruction<R>, Error> {
        let tol = &self.options.tolerances;
        let sensor = &request.sensor;
        let origin = *sensor.center();

        // Quadrilateral from intersecting the horizontal and vertical lines.
        let quadrilateral = quadrilateral(&request.horizontal, &request.vertical, tol.parallel)?;

        // Opposite sides of the quadrilateral meet at the vanishing points.
        let [q0, q1, q2, q3] = quadrilateral;
        let h_vp = intersect_with_tolerance(&Line::new(q0, q1), &Line::new(q2, q3), tol.parallel)?;
        let v_vp = intersect_with_tolerance(&Line::new(q0, q2), &Line::new(q1, q3), tol.parallel)?;
        log::debug!(
            "vanishing points: horizontal ({}, {}), vertical ({}, {})",
            h_vp.x,
            h_vp.y,
            v_vp.x,
            v_vp.y
        );

        let focal_distance =
            focal_distance_with_tolerance(&h_vp, &v_vp, &sensor.xy(), tol.radicand)?;

        // Both vanishing directions lie in the target plane.
        let h_direction = sensor.lift(&h_vp, focal_distance) - origin;
        let v_direction = sensor.lift(&v_vp, focal_distance) - origin;
        let target_normal = forward_normal(&h_direction, &v_direction)?;
        log::debug!(
            "focal distance {}, target normal ({}, {}, {})",
            focal_distance,
            target_normal.x,
            target_normal.y,
            target_normal.z
        );

        // Project the quadrilateral onto the target plane, where it should be
        // a rectangle.
        let target_center = sensor.point_at_depth(focal_distance);
        let target_plane = Plane::new(target_normal, target_center);
        let lifted = quadrilateral.map(|pt| sensor.lift(&pt, focal_distance));
        let target_rectangle =
            project_to_plane_with_tolerance(&lifted, &origin, &target_plane, tol.projection)?;
        log::trace!("target rectangle: {:?}", target_rectangle);

        // Rotate the target plane so its normal points forward and the
        // rectangle aligns with the axes.
        let rotation = alignment(&target_rectangle, &target_normal, tol.basis)?;
        let rotated_rectangle =
            target_rectangle.map(|pt| target_center + rotation * (pt - target_center));
        log::trace!("rotated rectangle: {:?}", rotated_rectangle);

        // Project back onto the focal plane.
        let focal_plane = Plane::new(Sensor::forward(), target_center);
        let reprojected = project_to_plane_with_tolerance(
            &rotated_rectangle,
            &origin,
            &focal_plane,
            tol.projection,
        )?;
        let rectified = self.place(reprojected.map(|pt| pt.xy()), sensor);

        // The resampler maps output to input, so solve from the rectified
        // rectangle to the marked quadrilateral.
        let coefficients = solve_with_tolerance(&rectified, &quadrilateral, tol.singular)?;

        Ok(Reconstruction {
            quadrilateral,
            horizontal_vanishing_point: h_vp,
            vertical_vanishing_point: v_vp,
            focal_distance,
            target_normal,
            target_rectangle,
            rotated_rectangle,
            rectified,
            coefficients,
        })
    }

    fn place(&self, rect: Quadrilateral<R>, sensor: &Sensor<R>) -> Quadrilateral<R> {
        let anchor = match &self.options.anchor {
            Anchor::SensorCenter => sensor.xy(),
            Anchor::Unchanged => return rect,
            Anchor::Point(pt) => *pt,
        };
        let shift = anchor - centroid(&rect);
        rect.map(|pt| pt + shift)
    }
}

/// Find the coefficients which undo the perspective of the rectangle
/// outlined by two horizontal and two vertical lines, with default options.
///
/// See [`PerspectiveCorrector`](struct.PerspectiveCorrector.html).
pub fn correct<R>(
    horizontal: &[Line<R>; 2],
    vertical: &[Line<R>; 2],
    sensor: &Sensor<R>,
) -> Result<PerspectiveCoefficients<R>, Error>
where
    R: RealField + Copy,
{
    let request = CorrectionRequest::new(*horizontal, *vertical, *sensor);
    PerspectiveCorrector::default().correct(&request)
}

fn quadrilateral<R>(
    horizontal: &[Line<R>; 2],
    vertical: &[Line<R>; 2],
    tolerance: R,
) -> Result<Quadrilateral<R>, Error>
where
    R: RealField + Copy,
{
    let [h0, h1] = horizontal;
    let [v0, v1] = vertical;
    Ok([
        intersect_with_tolerance(h0, v0, tolerance)?,
        intersect_with_tolerance(h0, v1, tolerance)?,
        intersect_with_tolerance(h1, v0, tolerance)?,
        intersect_with_tolerance(h1, v1, tolerance)?,
    ])
}

/// Unit normal to both directions with a non-negative forward component.
fn forward_normal<R>(a: &Vector3<R>, b: &Vector3<R>) -> Result<Unit<Vector3<R>>, Error>
where
    R: RealField + Copy,
{
    let n = a.cross(b);
    let n = if n.z < R::zero() { -n } else { n };
    Unit::try_new(n, R::zero()).ok_or(Error::InvalidGeometry)
}

/// Rotation taking `normal` to `+z` and the first rectangle edge to `+x`.
fn alignment<R>(
    rect: &[Point3<R>; 4],
    normal: &Unit<Vector3<R>>,
    tolerance: R,
) -> Result<Matrix3<R>, Error>
where
    R: RealField + Copy,
{
    let mut frame = [normal.into_inner(), rect[1] - rect[0]];
    orthonormalize_with_tolerance(&mut frame, tolerance)?;
    let [n, h] = frame;
    let v = n.cross(&h);
    Ok(Matrix3::from_rows(&[h.transpose(), v.transpose(), n.transpose()]))
}

fn centroid<R>(quad: &Quadrilateral<R>) -> Point2<R>
where
    R: RealField + Copy,
{
    let sum = quad
        .iter()
        .fold(Vector3::zeros(), |acc: Vector3<R>, pt| acc + pt.to_homogeneous());
    Point2::new(sum.x / sum.z, sum.y / sum.z)
}
