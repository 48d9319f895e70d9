use nalgebra::{Point2, Point3, Vector3};
use rectify_geom::*;

fn aspect_ratio(quad: &Quadrilateral<f64>) -> f64 {
    let [q0, q1, q2, _] = quad;
    (q1 - q0).norm() / (q2 - q0).norm()
}

#[test]
fn inverse_coefficients_undo_the_perspective() {
    let sensor = Sensor::from_image_size(640.0, 480.0);
    let base = SyntheticTarget::new(
        Point3::new(350.0, 220.0, 1200.0),
        Vector3::new(-0.25, 0.0, 1.0),
        300.0,
        200.0,
    );

    for angle in [-0.5, -0.3, 0.2, 0.45].iter() {
        let target = base.tilted(*angle);
        let distorted = target.image_corners(&sensor, 700.0).unwrap();
        let (horizontal, vertical) = target.image_lines(&sensor, 700.0).unwrap();

        let coeffs = correct(&horizontal, &vertical, &sensor).unwrap();
        let forward = coeffs.inverse().unwrap();

        let mut rectified = [Point2::origin(); 4];
        for (out, pt) in rectified.iter_mut().zip(distorted.iter()) {
            *out = forward.apply(pt).unwrap();
        }

        approx::assert_relative_eq!(
            aspect_ratio(&rectified),
            target.aspect_ratio(),
            epsilon = 1e-6
        );

        // Edges are axis aligned after correction.
        let [r0, r1, r2, r3] = rectified;
        approx::assert_abs_diff_eq!(r0.y, r1.y, epsilon = 1e-6);
        approx::assert_abs_diff_eq!(r2.y, r3.y, epsilon = 1e-6);
        approx::assert_abs_diff_eq!(r0.x, r2.x, epsilon = 1e-6);
        approx::assert_abs_diff_eq!(r1.x, r3.x, epsilon = 1e-6);
    }
}

#[test]
fn focal_distance_is_recovered_for_any_tilt() {
    let sensor = Sensor::from_image_size(1024.0, 768.0);
    let target = SyntheticTarget::new(
        Point3::new(600.0, 300.0, 2000.0),
        Vector3::new(0.4, 0.35, 1.0),
        500.0,
        500.0,
    );
    for f in [300.0, 850.0, 2400.0].iter() {
        let request = target.request(&sensor, *f).unwrap();
        let rec = PerspectiveCorrector::default().reconstruct(&request).unwrap();
        approx::assert_relative_eq!(rec.focal_distance, *f, epsilon = 1e-8);
        approx::assert_relative_eq!(rec.aspect_ratio(), 1.0, epsilon = 1e-8);
    }
}

#[test]
fn single_precision_pipeline() {
    let sensor = Sensor::from_image_size(640.0f32, 480.0);
    let target = SyntheticTarget::new(
        Point3::new(360.0f32, 210.0, 1500.0),
        Vector3::new(0.3, -0.4, 1.0),
        400.0,
        250.0,
    );
    let request = target.request(&sensor, 500.0).unwrap();
    let rec = PerspectiveCorrector::default().reconstruct(&request).unwrap();
    approx::assert_relative_eq!(rec.focal_distance, 500.0, epsilon = 1e-2);
    approx::assert_relative_eq!(rec.aspect_ratio(), 1.6, epsilon = 1e-3);
}

#[test]
fn anchor_point_moves_rectangle() {
    let sensor = Sensor::<f64>::from_image_size(640.0, 480.0);
    let target = SyntheticTarget::new(
        Point3::new(300.0, 260.0, 1000.0),
        Vector3::new(0.2, 0.3, 1.0),
        200.0,
        300.0,
    );
    let request = target.request(&sensor, 600.0).unwrap();

    let options = CorrectionOptions {
        anchor: Anchor::Point(Point2::new(0.0, 0.0)),
        ..Default::default()
    };
    let rec = PerspectiveCorrector::new(options).reconstruct(&request).unwrap();
    let sum = rec
        .rectified
        .iter()
        .fold(Vector3::zeros(), |acc, pt| acc + pt.to_homogeneous());
    approx::assert_abs_diff_eq!(sum.x, 0.0, epsilon = 1e-8);
    approx::assert_abs_diff_eq!(sum.y, 0.0, epsilon = 1e-8);

    // The origin of the output image samples the target's center region.
    let center = rec.coefficients.apply(&Point2::origin()).unwrap();
    let [q0, _, _, q3] = rec.quadrilateral;
    assert!(center.x > q0.x.min(q3.x) && center.x < q0.x.max(q3.x));
    assert!(center.y > q0.y.min(q3.y) && center.y < q0.y.max(q3.y));
}

#[test]
fn strict_tolerances_reject_nearly_frontal_views() {
    let sensor = Sensor::from_image_size(640.0, 480.0);
    let target = SyntheticTarget::new(
        Point3::new(330.0, 250.0, 1000.0),
        Vector3::new(1e-4, 1e-4, 1.0),
        200.0,
        100.0,
    );
    let request = target.request(&sensor, 500.0).unwrap();

    let mut options = CorrectionOptions::default();
    options.tolerances.parallel = 1e-3;
    let result = PerspectiveCorrector::new(options).correct(&request);
    assert_eq!(result, Err(Error::DegenerateConfiguration));
}

#[cfg(feature = "samples")]
#[test]
fn sample_rows_through_pipeline() {
    use rectify_geom::samples::read_samples;

    let sensor = Sensor::from_image_size(640.0, 480.0);
    let target = SyntheticTarget::new(
        Point3::new(360.0, 210.0, 1500.0),
        Vector3::new(0.3, -0.4, 1.0),
        400.0,
        250.0,
    );
    let (horizontal, vertical) = target.image_lines(&sensor, 500.0).unwrap();

    let mut row = String::from("tilted.jpg");
    for line in horizontal.iter().chain(vertical.iter()) {
        for pt in [line.a, line.b].iter() {
            row.push_str(&format!(",{},{}", pt.x, pt.y));
        }
    }
    let data = format!(
        "filename,x1,y1,x2,y2,x1,y1,x2,y2,x1,y1,x2,y2,x1,y1,x2,y2\n{}\n",
        row
    );

    let records = read_samples::<f64, _>(data.as_bytes()).unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].filename, "tilted.jpg");

    let rec = PerspectiveCorrector::default()
        .reconstruct(&records[0].request(sensor))
        .unwrap();
    approx::assert_relative_eq!(rec.aspect_ratio(), 1.6, epsilon = 1e-9);
}
