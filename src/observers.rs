//! # Observer sites
//!
//! Ground-based observing site model: geodetic coordinates, the derived
//! geocentric parallax coefficients, and the site position in the J2000
//! equatorial frame at a given instant.
//!
//! The parallax coefficients `ρ·cos φ'` and `ρ·sin φ'` (geocentric distance
//! in Earth radii times the cosine/sine of the geocentric latitude) are
//! computed once at construction from the WGS84 ellipsoid and reused by
//! every topocentric reduction.

use nalgebra::Vector3;
use ordered_float::NotNan;

use crate::constants::{
    Degree, Meter, EARTH_MAJOR_AXIS, EARTH_MINOR_AXIS, ERAU, MJD, RADEG,
};
use crate::ref_system::{rotmt, rotpn, RefEpoch, RefSystem};
use crate::skypos_errors::SkyposError;
use crate::time::gmst;

/// A ground-based observing site.
///
/// Atmospheric state (pressure, temperature) rides along with the geometry
/// because the horizontal transform needs it for refraction; a pressure of
/// zero disables refraction entirely.
#[derive(Debug, PartialEq, Clone, PartialOrd)]
pub struct Observer {
    /// Geodetic longitude in degrees, positive east, in [-180, 180]
    pub longitude: NotNan<f64>,
    /// Geodetic latitude in degrees, in [-90, 90]
    pub latitude: NotNan<f64>,
    /// Height above the reference ellipsoid in meters
    pub elevation: NotNan<f64>,
    /// Atmospheric pressure at the site in hPa (0 = no refraction)
    pub pressure: NotNan<f64>,
    /// Air temperature at the site in degrees Celsius
    pub temperature: NotNan<f64>,
    /// Geocentric parallax coefficient ρ·cos φ' (Earth radii)
    rho_cos_phi: NotNan<f64>,
    /// Geocentric parallax coefficient ρ·sin φ' (Earth radii)
    rho_sin_phi: NotNan<f64>,
}

impl Observer {
    /// Create a new observer site from geodetic coordinates.
    ///
    /// Arguments
    /// ---------
    /// * `longitude`: geodetic longitude in degrees, positive east
    /// * `latitude`: geodetic latitude in degrees
    /// * `elevation`: height above the WGS84 ellipsoid in meters
    /// * `pressure`: atmospheric pressure in hPa; pass 0 to disable refraction
    /// * `temperature`: air temperature in degrees Celsius
    ///
    /// Return
    /// ------
    /// * The site, or [`SkyposError::InvalidSite`] if a coordinate is out of
    ///   range, or [`SkyposError::NanSiteParameter`] if any input is NaN.
    pub fn new(
        longitude: Degree,
        latitude: Degree,
        elevation: Meter,
        pressure: f64,
        temperature: f64,
    ) -> Result<Observer, SkyposError> {
        if !(-180.0..=180.0).contains(&longitude) {
            return Err(SkyposError::InvalidSite(format!(
                "longitude {longitude} deg outside [-180, 180]"
            )));
        }
        if !(-90.0..=90.0).contains(&latitude) {
            return Err(SkyposError::InvalidSite(format!(
                "latitude {latitude} deg outside [-90, 90]"
            )));
        }
        if !(-500.0..=10_000.0).contains(&elevation) {
            return Err(SkyposError::InvalidSite(format!(
                "elevation {elevation} m outside [-500, 10000]"
            )));
        }
        if pressure < 0.0 {
            return Err(SkyposError::InvalidSite(format!(
                "pressure {pressure} hPa is negative"
            )));
        }

        let (rho_cos_phi, rho_sin_phi) = geodetic_to_parallax(latitude, elevation);

        Ok(Observer {
            longitude: NotNan::new(longitude)?,
            latitude: NotNan::new(latitude)?,
            elevation: NotNan::new(elevation)?,
            pressure: NotNan::new(pressure)?,
            temperature: NotNan::new(temperature)?,
            rho_cos_phi: NotNan::new(rho_cos_phi)?,
            rho_sin_phi: NotNan::new(rho_sin_phi)?,
        })
    }

    pub fn longitude_rad(&self) -> f64 {
        self.longitude.into_inner() * RADEG
    }

    pub fn latitude_rad(&self) -> f64 {
        self.latitude.into_inner() * RADEG
    }

    /// Site position in the body-fixed (Earth-rotating) equatorial frame,
    /// in astronomical units.
    pub fn body_fixed_coord(&self) -> Vector3<f64> {
        let lon = self.longitude_rad();
        let pxy = self.rho_cos_phi.into_inner();
        let pz = self.rho_sin_phi.into_inner();

        Vector3::new(
            ERAU * pxy * lon.cos(),
            ERAU * pxy * lon.sin(),
            ERAU * pz,
        )
    }

    /// Geocentric position of the site in the J2000 mean equatorial frame,
    /// in astronomical units.
    ///
    /// The body-fixed vector is carried to the true equator and equinox of
    /// date through Earth rotation (apparent sidereal time), then rotated
    /// back to J2000 through nutation and precession.
    ///
    /// Arguments
    /// ---------
    /// * `mjd_tt`: epoch as Modified Julian Date, TT scale
    /// * `mjd_ut1`: same epoch on the UT1 axis (UTC is an adequate stand-in)
    pub fn geocentric_position_j2000(&self, mjd_tt: MJD, mjd_ut1: MJD) -> Vector3<f64> {
        let gast = gmst(mjd_ut1) + crate::earth_orientation::equequ(mjd_tt);

        let u_true = rotmt(gast, 2) * self.body_fixed_coord();

        let to_j2000 = rotpn(
            &RefSystem::Equt(RefEpoch::Epoch(mjd_tt)),
            &RefSystem::Equm(RefEpoch::J2000),
        );
        to_j2000 * u_true
    }
}

/// Convert geodetic latitude and height to the geocentric parallax
/// coefficients `(ρ·cos φ', ρ·sin φ')` on the WGS84 ellipsoid.
///
/// Arguments
/// ---------
/// * `lat`: geodetic latitude in degrees
/// * `height`: height above the ellipsoid in meters
pub fn geodetic_to_parallax(lat: Degree, height: Meter) -> (f64, f64) {
    let axis_ratio = EARTH_MINOR_AXIS / EARTH_MAJOR_AXIS;
    let embedded_height = height / EARTH_MAJOR_AXIS;

    let latitude_rad = lat * RADEG;
    let u = (latitude_rad.sin() * axis_ratio).atan2(latitude_rad.cos());

    let rho_sin_phi = axis_ratio * u.sin() + embedded_height * latitude_rad.sin();
    let rho_cos_phi = u.cos() + embedded_height * latitude_rad.cos();

    (rho_cos_phi, rho_sin_phi)
}
