use nalgebra::{Point2, RealField};

use crate::{Error, Tolerances};

/// Find the focal distance from two vanishing points of perpendicular
/// directions.
///
/// `vp1` and `vp2` lie on the focal plane and `sensor_xy` is the position of
/// the sensor projected onto it. The rays from the sensor through both
/// vanishing points must be perpendicular, which gives
///
/// ```text
/// d = sqrt(-(dx1*dx2 + dy1*dy2))
/// ```
///
/// with `(dx, dy)` the offsets of the vanishing points from the sensor.
///
/// Returns [`Error::InvalidGeometry`](enum.Error.html) if the radicand is not
/// positive, i.e. the vanishing points cannot come from perpendicular
/// directions.
pub fn focal_distance<R>(
    vp1: &Point2<R>,
    vp2: &Point2<R>,
    sensor_xy: &Point2<R>,
) -> Result<R, Error>
where
    R: RealField + Copy,
{
    focal_distance_with_tolerance(vp1, vp2, sensor_xy, Tolerances::default().radicand)
}

/// Find the focal distance, rejecting configurations where the vanishing
/// points subtend an angle at the sensor whose cosine exceeds `-tolerance`.
pub fn focal_distance_with_tolerance<R>(
    vp1: &Point2<R>,
    vp2: &Point2<R>,
    sensor_xy: &Point2<R>,
    tolerance: R,
) -> Result<R, Error>
where
    R: RealField + Copy,
{
    let d1 = vp1 - sensor_xy;
    let d2 = vp2 - sensor_xy;
    let radicand = -d1.dot(&d2);
    if !(radicand > tolerance * d1.norm() * d2.norm()) {
        return Err(Error::InvalidGeometry);
    }
    Ok(radicand.sqrt())
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::Vector3;

    #[test]
    fn symmetric_vanishing_points() {
        // Directions (1,0,1) and (-1,0,1) are perpendicular.
        let f = 500.0;
        let origin = Point2::new(0.0, 0.0);
        let vp1 = Point2::new(f, 0.0);
        let vp2 = Point2::new(-f, 0.0);
        let actual = focal_distance(&vp1, &vp2, &origin).unwrap();
        approx::assert_relative_eq!(actual, f, epsilon = 1e-12);
    }

    #[test]
    fn vanishing_points_of_rotated_frame() {
        let f = 812.5;
        let sensor_xy = Point2::new(320.0, 240.0);

        // Two perpendicular directions, neither parallel to the focal plane.
        let d1 = Vector3::new(0.8, 0.1, -0.3);
        let d2 = d1.cross(&Vector3::new(0.2, 1.0, 0.4));
        approx::assert_abs_diff_eq!(d1.dot(&d2), 0.0, epsilon = 1e-12);

        let vanish = |d: Vector3<f64>| sensor_xy + d.xy() * (f / d.z);
        let actual = focal_distance(&vanish(d1), &vanish(d2), &sensor_xy).unwrap();
        approx::assert_relative_eq!(actual, f, epsilon = 1e-9);
    }

    #[test]
    fn f32_focal_distance() {
        let origin = Point2::new(10.0f32, 20.0);
        let actual = focal_distance(
            &Point2::new(10.0 + 30.0, 20.0 + 40.0),
            &Point2::new(10.0 - 40.0, 20.0 - 30.0),
            &origin,
        )
        .unwrap();
        approx::assert_relative_eq!(actual, 48.98979, epsilon = 1e-3);
    }

    #[test]
    fn negative_radicand_fails() {
        let origin = Point2::new(0.0, 0.0);
        let result = focal_distance(&Point2::new(1.0, 0.0), &Point2::new(2.0, 0.5), &origin);
        assert_eq!(result, Err(Error::InvalidGeometry));
    }

    #[test]
    fn zero_radicand_fails() {
        let origin = Point2::new(0.0, 0.0);
        let result = focal_distance(&Point2::new(1.0, 0.0), &Point2::new(0.0, 1.0), &origin);
        assert_eq!(result, Err(Error::InvalidGeometry));
    }

    #[test]
    fn nearly_perpendicular_offsets_depend_on_tolerance() {
        // The offsets subtend an angle just over 90 degrees at the sensor.
        let origin = Point2::new(0.0, 0.0);
        let vp1 = Point2::new(1.0, 0.0);
        let vp2 = Point2::new(-1e-6, 1.0);

        let result = focal_distance_with_tolerance(&vp1, &vp2, &origin, 1e-3);
        assert_eq!(result, Err(Error::InvalidGeometry));

        let actual = focal_distance_with_tolerance(&vp1, &vp2, &origin, 1e-9).unwrap();
        approx::assert_relative_eq!(actual, 1e-3, epsilon = 1e-12);
    }

    #[test]
    fn vanishing_point_at_sensor_fails() {
        let origin = Point2::new(3.0, 4.0);
        let result = focal_distance(&origin, &Point2::new(0.0, 1.0), &origin);
        assert_eq!(result, Err(Error::InvalidGeometry));
    }
}
