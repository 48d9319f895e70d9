// Compute perspective coefficients for every row of a sample file.
//
// Usage: rectify-samples <samples.csv> <image width> <image height>
//
// All images are assumed to share the given size.

use rectify_geom::{samples::read_samples_from_path, PerspectiveCorrector, Sensor};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    pretty_env_logger::init();

    let mut args = std::env::args().skip(1);
    let (path, width, height) = match (args.next(), args.next(), args.next()) {
        (Some(path), Some(width), Some(height)) => {
            (path, width.parse::<f64>()?, height.parse::<f64>()?)
        }
        _ => {
            eprintln!("usage: rectify-samples <samples.csv> <image width> <image height>");
            std::process::exit(1);
        }
    };

    let sensor = Sensor::from_image_size(width, height);
    let corrector = PerspectiveCorrector::default();

    for record in read_samples_from_path(&path)? {
        match corrector.correct(&record.request(sensor)) {
            Ok(coeffs) => println!("{}: {:?}", record.filename, coeffs.as_array()),
            Err(e) => println!("{}: {}", record.filename, e),
        }
    }
    Ok(())
}
