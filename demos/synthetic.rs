// Rectify the image of a synthetic rectangle and compare the recovered aspect
// ratio with the true one. Run with `RUST_LOG=debug` to see the intermediate
// results.

fn main() {
    use nalgebra::{Point3, Vector3};
    use rectify_geom::*;

    pretty_env_logger::init();

    // A 640x480 image with the pinhole over its center.
    let sensor = Sensor::from_image_size(640.0, 480.0);
    let focal_distance = 500.0;

    // A 400 by 250 rectangle, progressively tilted about the image x axis.
    let base = SyntheticTarget::new(
        Point3::new(360.0, 210.0, 1500.0),
        Vector3::new(0.3, 0.0, 1.0),
        400.0,
        250.0,
    );

    for step in 1..=5 {
        let angle = 0.1 * step as f64;
        let target = base.tilted(angle);
        let request = match target.request(&sensor, focal_distance) {
            Ok(request) => request,
            Err(e) => {
                println!("tilt {:.1}: target not visible: {}", angle, e);
                continue;
            }
        };

        match PerspectiveCorrector::default().reconstruct(&request) {
            Ok(rec) => {
                println!(
                    "tilt {:.1}: focal distance {:.3}, aspect ratio {:.4} (expected {:.4})",
                    angle,
                    rec.focal_distance,
                    rec.aspect_ratio(),
                    target.aspect_ratio()
                );
                println!("  coefficients {:?}", rec.coefficients.as_array());
            }
            Err(e) => println!("tilt {:.1}: {}", angle, e),
        }
    }
}
