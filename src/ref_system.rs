//! # Celestial reference systems
//!
//! Rotations between the equatorial frames used by the reduction chain:
//!
//! - **Equm**: mean equator and equinox of an epoch (precession only),
//! - **Equt**: true equator and equinox of an epoch (precession + nutation).
//!
//! The anchor frame is the mean equator and equinox of J2000. Every other
//! frame is reached from it by precession, optionally followed by nutation,
//! and arbitrary frame-to-frame rotations are composed through that anchor.

use nalgebra::{Matrix3, Rotation3, Vector3};

use crate::constants::T2000;
use crate::earth_orientation::{nutation_matrix, prec};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RefEpoch {
    J2000,
    /// Arbitrary epoch, as a Modified Julian Date in the TT scale.
    Epoch(f64),
}

impl RefEpoch {
    pub fn date(&self) -> f64 {
        match *self {
            RefEpoch::J2000 => T2000,
            RefEpoch::Epoch(d) => d,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RefSystem {
    /// Equatorial mean: equator and mean equinox of the epoch
    /// (corrected for precession but not for nutation).
    Equm(RefEpoch),
    /// Equatorial true: same as `Equm` but also corrected for nutation.
    Equt(RefEpoch),
}

impl RefSystem {
    pub fn epoch(&self) -> RefEpoch {
        match *self {
            RefSystem::Equm(e) => e,
            RefSystem::Equt(e) => e,
        }
    }

    /// Rotation matrix taking coordinates from the J2000 mean equatorial
    /// frame into this frame.
    fn from_j2000(&self) -> Matrix3<f64> {
        match *self {
            RefSystem::Equm(e) => {
                let tjm = e.date();
                if tjm == T2000 {
                    Matrix3::identity()
                } else {
                    prec(tjm)
                }
            }
            RefSystem::Equt(e) => {
                let tjm = e.date();
                nutation_matrix(tjm) * prec(tjm)
            }
        }
    }
}

/// Elementary rotation matrix about a coordinate axis.
///
/// `k` selects the axis: 0 → X, 1 → Y, 2 → Z. The rotation is active
/// (right-handed, by `alpha` radians).
pub fn rotmt(alpha: f64, k: usize) -> Matrix3<f64> {
    let axis = match k {
        0 => Vector3::x_axis(),
        1 => Vector3::y_axis(),
        2 => Vector3::z_axis(),
        _ => panic!("**** ROTMT: invalid axis index {k} (must be 0,1,2) ****"),
    };

    Rotation3::from_axis_angle(&axis, alpha).into()
}

/// Compute the rotation matrix between two celestial reference systems.
///
/// Both frames are expressed relative to the J2000 mean equator, and the
/// requested rotation is the composition through that anchor:
///
/// ```text
/// R(from → to) = M(to) · M(from)ᵀ
/// ```
///
/// where `M(sys)` rotates J2000 mean coordinates into `sys`. The returned
/// matrix satisfies `x_to = R · x_from`.
pub fn rotpn(from: &RefSystem, to: &RefSystem) -> Matrix3<f64> {
    to.from_j2000() * from.from_j2000().transpose()
}
