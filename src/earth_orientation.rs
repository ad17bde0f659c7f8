use nalgebra::Matrix3;

use crate::{
    constants::{ArcSec, Radian, RADEG, RADSEC, T2000},
    ref_system::rotmt,
};

/// Compute the mean obliquity of the ecliptic at a given epoch (IAU 1976 model).
///
/// Cubic polynomial in Julian centuries since J2000, evaluated with Horner's
/// method. Valid within a few millennia of the J2000 epoch.
///
/// Arguments
/// ---------
/// * `tjm`: Modified Julian Date (TT scale).
///
/// Returns
/// --------
/// * Mean obliquity of the ecliptic in radians.
pub fn obleq(tjm: f64) -> Radian {
    let ob0 = ((23.0 * 3600.0 + 26.0 * 60.0) + 21.448) * RADSEC;
    let ob1 = -46.815 * RADSEC;
    let ob2 = -0.0006 * RADSEC;
    let ob3 = 0.00181 * RADSEC;

    let t = (tjm - T2000) / 36525.0;

    ((ob3 * t + ob2) * t + ob1) * t + ob0
}

/// One periodic term of the IAU 1980 nutation series.
///
/// `d`, `m`, `mp`, `f`, `om` are the integer multipliers of the five
/// fundamental arguments (mean elongation of the Moon, mean anomaly of the
/// Sun, mean anomaly of the Moon, argument of latitude of the Moon, longitude
/// of the ascending node). Coefficients are in units of 0.0001 arcsec, with
/// linear time dependence in Julian centuries.
struct NutationTerm {
    d: i8,
    m: i8,
    mp: i8,
    f: i8,
    om: i8,
    psi: f64,
    psi_t: f64,
    eps: f64,
    eps_t: f64,
}

macro_rules! nut {
    ($d:expr, $m:expr, $mp:expr, $f:expr, $om:expr, $psi:expr, $psi_t:expr, $eps:expr, $eps_t:expr) => {
        NutationTerm {
            d: $d,
            m: $m,
            mp: $mp,
            f: $f,
            om: $om,
            psi: $psi,
            psi_t: $psi_t,
            eps: $eps,
            eps_t: $eps_t,
        }
    };
}

/// Largest terms of the IAU 1980 series, sufficient for milliarcsecond work.
const NUTATION_TERMS: [NutationTerm; 63] = [
    nut!(0, 0, 0, 0, 1, -171996.0, -174.2, 92025.0, 8.9),
    nut!(-2, 0, 0, 2, 2, -13187.0, -1.6, 5736.0, -3.1),
    nut!(0, 0, 0, 2, 2, -2274.0, -0.2, 977.0, -0.5),
    nut!(0, 0, 0, 0, 2, 2062.0, 0.2, -895.0, 0.5),
    nut!(0, 1, 0, 0, 0, 1426.0, -3.4, 54.0, -0.1),
    nut!(0, 0, 1, 0, 0, 712.0, 0.1, -7.0, 0.0),
    nut!(-2, 1, 0, 2, 2, -517.0, 1.2, 224.0, -0.6),
    nut!(0, 0, 0, 2, 1, -386.0, -0.4, 200.0, 0.0),
    nut!(0, 0, 1, 2, 2, -301.0, 0.0, 129.0, -0.1),
    nut!(-2, -1, 0, 2, 2, 217.0, -0.5, -95.0, 0.3),
    nut!(-2, 0, 1, 0, 0, -158.0, 0.0, 0.0, 0.0),
    nut!(-2, 0, 0, 2, 1, 129.0, 0.1, -70.0, 0.0),
    nut!(0, 0, -1, 2, 2, 123.0, 0.0, -53.0, 0.0),
    nut!(2, 0, 0, 0, 0, 63.0, 0.0, 0.0, 0.0),
    nut!(0, 0, 1, 0, 1, 63.0, 0.1, -33.0, 0.0),
    nut!(2, 0, -1, 2, 2, -59.0, 0.0, 26.0, 0.0),
    nut!(0, 0, -1, 0, 1, -58.0, -0.1, 32.0, 0.0),
    nut!(0, 0, 1, 2, 1, -51.0, 0.0, 27.0, 0.0),
    nut!(-2, 0, 2, 0, 0, 48.0, 0.0, 0.0, 0.0),
    nut!(0, 0, -2, 2, 1, 46.0, 0.0, -24.0, 0.0),
    nut!(2, 0, 0, 2, 2, -38.0, 0.0, 16.0, 0.0),
    nut!(0, 0, 2, 2, 2, -31.0, 0.0, 13.0, 0.0),
    nut!(0, 0, 2, 0, 0, 29.0, 0.0, 0.0, 0.0),
    nut!(-2, 0, 1, 2, 2, 29.0, 0.0, -12.0, 0.0),
    nut!(0, 0, 0, 2, 0, 26.0, 0.0, 0.0, 0.0),
    nut!(-2, 0, 0, 2, 0, -22.0, 0.0, 0.0, 0.0),
    nut!(0, 0, -1, 2, 1, 21.0, 0.0, -10.0, 0.0),
    nut!(0, 2, 0, 0, 0, 17.0, -0.1, 0.0, 0.0),
    nut!(2, 0, -1, 0, 1, 16.0, 0.0, -8.0, 0.0),
    nut!(-2, 2, 0, 2, 2, -16.0, 0.1, 7.0, 0.0),
    nut!(0, 1, 0, 0, 1, -15.0, 0.0, 9.0, 0.0),
    nut!(-2, 0, 1, 0, 1, -13.0, 0.0, 7.0, 0.0),
    nut!(0, -1, 0, 0, 1, -12.0, 0.0, 6.0, 0.0),
    nut!(0, 0, 2, -2, 0, 11.0, 0.0, 0.0, 0.0),
    nut!(2, 0, -1, 2, 1, -10.0, 0.0, 5.0, 0.0),
    nut!(2, 0, 1, 2, 2, -8.0, 0.0, 3.0, 0.0),
    nut!(0, 1, 0, 2, 2, 7.0, 0.0, -3.0, 0.0),
    nut!(-2, 1, 1, 0, 0, -7.0, 0.0, 0.0, 0.0),
    nut!(0, -1, 0, 2, 2, -7.0, 0.0, 3.0, 0.0),
    nut!(2, 0, 0, 2, 1, -7.0, 0.0, 3.0, 0.0),
    nut!(2, 0, 1, 0, 0, 6.0, 0.0, 0.0, 0.0),
    nut!(-2, 0, 2, 2, 2, 6.0, 0.0, -3.0, 0.0),
    nut!(-2, 0, 1, 2, 1, 6.0, 0.0, -3.0, 0.0),
    nut!(2, 0, -2, 0, 1, -6.0, 0.0, 3.0, 0.0),
    nut!(2, 0, 0, 0, 1, -6.0, 0.0, 3.0, 0.0),
    nut!(0, -1, 1, 0, 0, 5.0, 0.0, 0.0, 0.0),
    nut!(-2, -1, 0, 2, 1, -5.0, 0.0, 3.0, 0.0),
    nut!(-2, 0, 0, 0, 1, -5.0, 0.0, 3.0, 0.0),
    nut!(0, 0, 2, 2, 1, -5.0, 0.0, 3.0, 0.0),
    nut!(-2, 0, 2, 0, 1, 4.0, 0.0, 0.0, 0.0),
    nut!(-2, 1, 0, 2, 1, 4.0, 0.0, 0.0, 0.0),
    nut!(0, 0, 1, -2, 0, 4.0, 0.0, 0.0, 0.0),
    nut!(-1, 0, 1, 0, 0, -4.0, 0.0, 0.0, 0.0),
    nut!(-2, 1, 0, 0, 0, -4.0, 0.0, 0.0, 0.0),
    nut!(1, 0, 0, 0, 0, -4.0, 0.0, 0.0, 0.0),
    nut!(0, 0, 1, 2, 0, 3.0, 0.0, 0.0, 0.0),
    nut!(0, 0, -2, 2, 2, -3.0, 0.0, 0.0, 0.0),
    nut!(-1, -1, 1, 0, 0, -3.0, 0.0, 0.0, 0.0),
    nut!(0, 1, 1, 0, 0, -3.0, 0.0, 0.0, 0.0),
    nut!(0, -1, 1, 2, 2, -3.0, 0.0, 0.0, 0.0),
    nut!(2, -1, -1, 2, 2, -3.0, 0.0, 0.0, 0.0),
    nut!(0, 0, 3, 2, 2, -3.0, 0.0, 0.0, 0.0),
    nut!(2, -1, 0, 2, 2, -3.0, 0.0, 0.0, 0.0),
];

/// Compute the nutation angles in longitude and obliquity (IAU 1980 model).
///
/// Evaluates the five fundamental lunisolar arguments as polynomials in
/// Julian centuries from J2000 and sums the truncated periodic series above.
/// The truncation keeps every term with amplitude ≥ 0.0003 arcsec, which
/// bounds the error near the milliarcsecond level over several centuries.
///
/// Arguments
/// ---------
/// * `tjm`: Modified Julian Date (TT scale).
///
/// Returns
/// --------
/// * A tuple `(Δψ, Δε)`:
///     - `Δψ`: nutation in longitude \[arcseconds\]
///     - `Δε`: nutation in obliquity \[arcseconds\]
pub fn nutation_angles(tjm: f64) -> (ArcSec, ArcSec) {
    let t = (tjm - T2000) / 36525.0;
    let t2 = t * t;
    let t3 = t2 * t;

    // Fundamental arguments, in radians.
    // Mean elongation of the Moon from the Sun.
    let d = (297.85036 + 445267.111480 * t - 0.0019142 * t2 + t3 / 189474.0) * RADEG;
    // Mean anomaly of the Sun.
    let m = (357.52772 + 35999.050340 * t - 0.0001603 * t2 - t3 / 300000.0) * RADEG;
    // Mean anomaly of the Moon.
    let mp = (134.96298 + 477198.867398 * t + 0.0086972 * t2 + t3 / 56250.0) * RADEG;
    // Argument of latitude of the Moon.
    let f = (93.27191 + 483202.017538 * t - 0.0036825 * t2 + t3 / 327270.0) * RADEG;
    // Longitude of the ascending node of the Moon's mean orbit.
    let om = (125.04452 - 1934.136261 * t + 0.0020708 * t2 + t3 / 450000.0) * RADEG;

    let mut dpsi = 0.0;
    let mut deps = 0.0;

    for term in NUTATION_TERMS.iter() {
        let arg = term.d as f64 * d
            + term.m as f64 * m
            + term.mp as f64 * mp
            + term.f as f64 * f
            + term.om as f64 * om;

        dpsi += (term.psi + term.psi_t * t) * arg.sin();
        deps += (term.eps + term.eps_t * t) * arg.cos();
    }

    // From 0.0001 arcsec to arcsec
    (dpsi * 1e-4, deps * 1e-4)
}

/// Construct the nutation rotation matrix (IAU 1980 model).
///
/// Applies three successive axis rotations: by −ε around X, then Δψ around Z,
/// then ε + Δε around X. The result transforms vectors from the mean equator
/// and equinox of date to the true equator and equinox of date:
/// `x_true = N · x_mean`.
///
/// Arguments
/// ---------
/// * `tjm`: Modified Julian Date (TT scale).
pub fn nutation_matrix(tjm: f64) -> Matrix3<f64> {
    let epsm = obleq(tjm);

    let (mut dpsi, deps) = nutation_angles(tjm);
    dpsi *= RADSEC;
    let epst = epsm + deps * RADSEC;

    let r1 = rotmt(-epsm, 0);
    let r2 = rotmt(dpsi, 2);
    let r3 = rotmt(epst, 0);

    (r3 * r2) * r1
}

/// Compute the equation of the equinoxes in radians.
///
/// The small difference between apparent and mean sidereal time caused by
/// nutation: `Eq_eq = Δψ · cos(ε)`.
///
/// # Arguments
/// * `tjm` - Modified Julian Date (TT scale)
pub fn equequ(tjm: f64) -> Radian {
    let oblm = obleq(tjm);
    let (dpsi, _deps) = nutation_angles(tjm);
    RADSEC * dpsi * oblm.cos()
}

/// Compute the precession matrix from J2000 to the mean equator and equinox
/// of a given epoch (IAU 1976 model).
///
/// The transformation is composed of three successive rotations, around Z by
/// ζ, around Y by −θ, and around Z by z, with the angles time-dependent
/// polynomials in Julian centuries `T` since J2000:
///
/// ```text
/// ζ(T) = (0.6406161 + 0.0000839·T + 0.0000050·T²) · T  [deg]
/// θ(T) = (0.5567530 - 0.0001185·T - 0.0000116·T²) · T  [deg]
/// z(T) = (0.6406161 + 0.0003041·T + 0.0000051·T²) · T  [deg]
/// ```
///
/// The returned matrix satisfies `x_mean(tjm) = P · x_J2000`.
///
/// Arguments
/// ---------
/// * `tjm`: Modified Julian Date in TT scale (epoch of transformation).
pub fn prec(tjm: f64) -> Matrix3<f64> {
    let zed = 0.6406161 * RADEG;
    let zd = 0.6406161 * RADEG;
    let thd = 0.5567530 * RADEG;

    let zedd = 0.0000839 * RADEG;
    let zdd = 0.0003041 * RADEG;
    let thdd = -0.0001185 * RADEG;

    let zeddd = 0.0000050 * RADEG;
    let zddd = 0.0000051 * RADEG;
    let thddd = -0.0000116 * RADEG;

    let t = (tjm - T2000) / 36525.0;

    let zeta = ((zeddd * t + zedd) * t + zed) * t;
    let z = ((zddd * t + zdd) * t + zd) * t;
    let theta = ((thddd * t + thdd) * t + thd) * t;

    let r1 = rotmt(zeta, 2);
    let r2 = rotmt(-theta, 1);
    let r3 = rotmt(z, 2);

    (r3 * r2) * r1
}

#[cfg(test)]
mod test_earth_orientation {
    use super::*;
    use approx::{assert_abs_diff_eq, assert_relative_eq};
    use nalgebra::Matrix3;

    #[test]
    fn test_obliquity() {
        let obl = obleq(T2000);
        assert_eq!(obl, 0.40909280422232897)
    }

    #[test]
    fn test_nutation_angles_j2000() {
        let (dpsi, deps) = nutation_angles(T2000);
        assert_abs_diff_eq!(dpsi, -13.923, epsilon = 0.02);
        assert_abs_diff_eq!(deps, -5.774, epsilon = 0.02);
    }

    #[test]
    fn test_nutation_angles_1987() {
        // 1987 April 10, 0h TT (JDE 2446895.5): Δψ = -3.788", Δε = +9.443"
        let (dpsi, deps) = nutation_angles(46895.0);
        assert_abs_diff_eq!(dpsi, -3.788, epsilon = 0.02);
        assert_abs_diff_eq!(deps, 9.443, epsilon = 0.02);
    }

    #[test]
    fn test_nutation_matrix_orthonormal() {
        let n = nutation_matrix(58000.0);
        let should_be_identity = n * n.transpose();
        for i in 0..3 {
            for j in 0..3 {
                let expected = if i == j { 1.0 } else { 0.0 };
                assert_abs_diff_eq!(should_be_identity[(i, j)], expected, epsilon = 1e-12);
            }
        }
    }

    #[test]
    fn test_nutation_matrix_first_row() {
        // N[0][1] ≈ -Δψ·cos(ε), N[0][2] ≈ -Δψ·sin(ε) for small angles.
        let tjm = T2000;
        let n = nutation_matrix(tjm);
        let (dpsi, _) = nutation_angles(tjm);
        let eps = obleq(tjm);
        assert_abs_diff_eq!(n[(0, 1)], -dpsi * RADSEC * eps.cos(), epsilon = 1e-9);
        assert_abs_diff_eq!(n[(0, 2)], -dpsi * RADSEC * eps.sin(), epsilon = 1e-9);
    }

    #[test]
    fn test_equequ_small_and_consistent() {
        let tjm = 58000.0;
        let eqeq = equequ(tjm);
        let expected = RADSEC * nutation_angles(tjm).0 * obleq(tjm).cos();
        assert_relative_eq!(eqeq, expected, epsilon = 1e-12);

        // The equation of the equinoxes stays within about ±1.2 seconds of
        // time, i.e. ±18 arcsec.
        assert!(eqeq.abs() < 20.0 * RADSEC);
    }

    #[test]
    fn test_prec_identity_at_j2000() {
        let p = prec(T2000);
        assert_eq!(p, Matrix3::identity());
    }

    #[test]
    fn test_prec_magnitude() {
        // General precession is about 50.3"/yr along the ecliptic; over 25
        // years the equinox moves ~0.35 deg, so the J2000 x-axis picks up a
        // y-component of roughly sin(0.35°·cos ε)... just bound it coarsely.
        let p = prec(T2000 + 25.0 * 365.25);
        let x = p * nalgebra::Vector3::new(1.0, 0.0, 0.0);
        let angle = x.dot(&nalgebra::Vector3::new(1.0, 0.0, 0.0)).acos();
        assert!(angle > 0.004 && angle < 0.007, "angle = {angle}");
    }
}
