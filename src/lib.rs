#![cfg_attr(not(feature = "std"), no_std)]
#![deny(rust_2018_idioms, unsafe_code, missing_docs)]
#![cfg_attr(not(doctest), doc = include_str!("../README.md"))]
#![cfg_attr(doc_cfg, feature(doc_cfg))]

//! # Examples
//!
//! ## Example - rectifying a tilted rectangle from its four edges.
//!
//! ```
//! use rectify_geom::*;
//! use nalgebra::{Point3, Vector3};
//!
//! // A 400 by 250 rectangle on a plane tilted away from the camera.
//! let target = SyntheticTarget::new(
//!     Point3::new(360.0, 210.0, 1500.0), // center
//!     Vector3::new(0.3, -0.4, 1.0),      // plane normal
//!     400.0,                             // width
//!     250.0,                             // height
//! );
//!
//! // The pinhole sits over the center of a 640x480 image.
//! let sensor = Sensor::from_image_size(640.0, 480.0);
//!
//! // The lines a user would mark along the rectangle's edges.
//! let (horizontal, vertical) = target.image_lines(&sensor, 500.0).unwrap();
//!
//! // Compute the coefficients for the resampler.
//! let coeffs = correct(&horizontal, &vertical, &sensor).unwrap();
//!
//! // Print the results.
//! println!("{:?}", coeffs.as_array());
//! ```
//!
//! ## Example - intersection of two lines
//!
//! ```
//! use rectify_geom::*;
//! use nalgebra::Point2;
//!
//! let diagonal = Line::new(Point2::new(0.0, 0.0), Point2::new(2.0, 2.0));
//! let anti_diagonal = Line::new(Point2::new(0.0, 2.0), Point2::new(2.0, 0.0));
//!
//! let crossing = intersect(&diagonal, &anti_diagonal).unwrap();
//! approx::assert_abs_diff_eq!(crossing, Point2::new(1.0, 1.0), epsilon = 1e-12);
//! ```

#[cfg(not(feature = "std"))]
extern crate core as std;

#[cfg(feature = "serde-serialize")]
use serde::{Deserialize, Serialize};

use nalgebra::{Point2, Point3, RealField, Unit, Vector3};

mod line;
pub use line::{intersect, intersect_with_tolerance, Line};

mod focal;
pub use focal::{focal_distance, focal_distance_with_tolerance};

mod plane;
pub use plane::{
    project_point, project_point_with_tolerance, project_to_plane,
    project_to_plane_with_tolerance, Plane,
};

mod orthonormal;
pub use orthonormal::{orthonormalize, orthonormalize_with_tolerance, orthonormalized};

pub mod homography;
pub use homography::{solve, solve_with_tolerance, PerspectiveCoefficients};

mod corrector;
pub use corrector::{
    correct, Anchor, CorrectionOptions, CorrectionRequest, PerspectiveCorrector, Reconstruction,
};

mod target;
pub use target::SyntheticTarget;

/// Reading the tabular sample file of marked lines.
#[cfg(feature = "samples")]
#[cfg_attr(doc_cfg, doc(cfg(feature = "samples")))]
pub mod samples;

/// All possible errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum Error {
    /// Two lines are parallel, coincident or defined by a single point, so
    /// their intersection lies at infinity.
    DegenerateConfiguration,
    /// The marked geometry is inconsistent with a pinhole view of a plane,
    /// e.g. the vanishing points do not come from perpendicular directions or
    /// a ray runs parallel to the plane it is projected onto.
    InvalidGeometry,
    /// A vector reduced to zero norm during orthonormalization.
    DegenerateBasis,
    /// The point correspondences do not determine a unique homography.
    SingularSystem,
}

#[cfg(feature = "std")]
impl std::error::Error for Error {}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let msg = match self {
            Error::DegenerateConfiguration => "lines do not intersect at a finite point",
            Error::InvalidGeometry => "geometry is inconsistent with a pinhole view of a plane",
            Error::DegenerateBasis => "basis vectors are linearly dependent",
            Error::SingularSystem => "homography system is singular",
        };
        f.write_str(msg)
    }
}

/// Four image points in construction order.
///
/// Vertex `2*i + j` is the intersection of horizontal line `i` with vertical
/// line `j`, so vertices `{0,1}` and `{2,3}` belong to the horizontal line
/// family and `{0,2}` and `{1,3}` to the vertical one.
pub type Quadrilateral<R> = [Point2<R>; 4];

/// Position of the pinhole.
///
/// All projections are computed with the sensor as origin. The optical axis
/// points along `+z`, image `x` points right and image `y` points down.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub struct Sensor<R: RealField> {
    center: Point3<R>,
}

impl<R: RealField + Copy> Sensor<R> {
    /// Create a new sensor at `center`.
    #[inline]
    pub fn new(center: Point3<R>) -> Self {
        Self { center }
    }

    /// Create a sensor over the middle of an image at depth zero.
    pub fn from_image_size(width: R, height: R) -> Self {
        let two: R = nalgebra::convert(2.0);
        Self::new(Point3::new(width / two, height / two, R::zero()))
    }

    /// Return the sensor position.
    #[inline]
    pub fn center(&self) -> &Point3<R> {
        &self.center
    }

    /// Return the image-plane position of the sensor.
    #[inline]
    pub fn xy(&self) -> Point2<R> {
        self.center.xy()
    }

    /// Return the optical axis.
    #[inline]
    pub fn forward() -> Unit<Vector3<R>> {
        Vector3::z_axis()
    }

    /// Return the point on the optical axis `depth` in front of the sensor.
    #[inline]
    pub fn point_at_depth(&self, depth: R) -> Point3<R> {
        self.center + Self::forward().into_inner() * depth
    }

    /// Lift an image point onto the plane `depth` in front of the sensor.
    #[inline]
    pub fn lift(&self, pt: &Point2<R>, depth: R) -> Point3<R> {
        Point3::new(pt.x, pt.y, self.center.z + depth)
    }
}

/// Thresholds below which a computation counts as degenerate.
///
/// Every value is dimensionless, so the same tolerances work for any image
/// size. Exact zeros always fail regardless of the configured value.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub struct Tolerances<R: RealField> {
    /// Sine of the angle between two lines below which they are parallel.
    pub parallel: R,
    /// Smallest accepted cosine of the angle subtended at the sensor by the
    /// vanishing points (negated, since it must be obtuse).
    pub radicand: R,
    /// Cosine of the angle between a ray and the plane normal below which
    /// the ray is parallel to the plane.
    pub projection: R,
    /// Fraction of its original length below which a vector is considered
    /// dependent on the ones before it.
    pub basis: R,
    /// Ratio of the second smallest to the largest singular value of the
    /// normalized homography system below which it is singular.
    pub singular: R,
}

impl<R: RealField + Copy> Default for Tolerances<R> {
    fn default() -> Self {
        let eps = <R as approx::AbsDiffEq>::default_epsilon() * nalgebra::convert(1024.0);
        Self {
            parallel: eps,
            radicand: eps,
            projection: eps,
            basis: eps,
            singular: eps,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[cfg(not(feature = "std"))]
    compile_error!("tests require std");

    #[test]
    fn sensor_from_image_size() {
        let sensor = Sensor::from_image_size(640.0, 480.0);
        assert_eq!(sensor.center(), &Point3::new(320.0, 240.0, 0.0));
        assert_eq!(sensor.xy(), Point2::new(320.0, 240.0));
        assert_eq!(sensor.point_at_depth(10.0), Point3::new(320.0, 240.0, 10.0));
        assert_eq!(
            sensor.lift(&Point2::new(1.0, 2.0), 10.0),
            Point3::new(1.0, 2.0, 10.0)
        );
    }

    #[test]
    fn default_tolerances_follow_precision() {
        let t64 = Tolerances::<f64>::default();
        let t32 = Tolerances::<f32>::default();
        assert!(t64.parallel < 1e-12);
        assert!(t32.parallel > 1e-6);
        assert!(t32.parallel < 1e-3);
    }

    #[test]
    fn error_display() {
        let msg = format!("{}", Error::SingularSystem);
        assert_eq!(msg, "homography system is singular");
    }

    #[test]
    #[cfg(feature = "serde-serialize")]
    fn test_sensor_serde() {
        let expected = Sensor::from_image_size(640.0, 480.0);
        let buf = serde_json::to_string(&expected).unwrap();
        let actual: Sensor<f64> = serde_json::from_str(&buf).unwrap();
        assert!(expected == actual);
    }
}
