use nalgebra::{RealField, SVector};

use crate::{Error, Tolerances};

/// Apply the Gram-Schmidt process to `basis`, in place.
///
/// The vectors are processed in order: each one has its projection onto every
/// earlier (already orthonormal) vector removed and is then normalized. The
/// first vector is only normalized, so it keeps its direction.
///
/// Returns [`Error::DegenerateBasis`](enum.Error.html) if the vectors are
/// linearly dependent. `basis` is left partially processed in that case.
pub fn orthonormalize<R, const D: usize>(basis: &mut [SVector<R, D>]) -> Result<(), Error>
where
    R: RealField + Copy,
{
    orthonormalize_with_tolerance(basis, Tolerances::default().basis)
}

/// Apply the Gram-Schmidt process to `basis`, in place, treating a vector as
/// dependent once its norm drops to `tolerance` times its original norm.
pub fn orthonormalize_with_tolerance<R, const D: usize>(
    basis: &mut [SVector<R, D>],
    tolerance: R,
) -> Result<(), Error>
where
    R: RealField + Copy,
{
    for i in 0..basis.len() {
        let original_norm = basis[i].norm();
        let mut v = basis[i];
        for j in 0..i {
            let e = basis[j];
            v -= e * e.dot(&v);
        }
        let norm = v.norm();
        if !(norm > tolerance * original_norm) {
            return Err(Error::DegenerateBasis);
        }
        basis[i] = v / norm;
    }
    Ok(())
}

/// Return the Gram-Schmidt orthonormalization of `basis`.
///
/// ```
/// use nalgebra::Vector3;
///
/// let [n, x, y] = rectify_geom::orthonormalized([
///     Vector3::new(0.0, 0.0, 2.0),
///     Vector3::new(1.0, 0.0, 1.0),
///     Vector3::new(1.0, 1.0, 1.0),
/// ])
/// .unwrap();
///
/// assert_eq!(n, Vector3::z());
/// assert_eq!(x, Vector3::x());
/// assert_eq!(y, Vector3::y());
/// ```
pub fn orthonormalized<R, const D: usize, const N: usize>(
    mut basis: [SVector<R, D>; N],
) -> Result<[SVector<R, D>; N], Error>
where
    R: RealField + Copy,
{
    orthonormalize(&mut basis)?;
    Ok(basis)
}
