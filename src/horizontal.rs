//! # Horizontal coordinates
//!
//! Transform of a J2000 equatorial place into altitude and azimuth for an
//! observing site: precession and nutation to the true frame of date, the
//! hour angle from apparent sidereal time, then the spherical triangle to
//! the horizon system. Atmospheric refraction (Sæmundsson's formula, scaled
//! by site pressure and temperature) is applied on top when the site carries
//! a nonzero pressure.

use crate::constants::{Degree, Radian, DPI, RADEG};
use crate::earth_orientation::equequ;
use crate::jpl_ephem::BodyPosition;
use crate::observers::Observer;
use crate::ref_system::{rotpn, RefEpoch, RefSystem};
use crate::skypos_errors::SkyposError;
use crate::time::{gmst, TimeInstant};

/// A direction in the horizon system of an observing site.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HorizontalCoordinates {
    /// Azimuth in degrees, from north through east, in \[0, 360)
    pub azimuth: Degree,
    /// Altitude above the horizon in degrees, in \[-90, 90\]
    pub altitude: Degree,
}

/// Apparent sidereal time at the site, in radians.
fn local_apparent_sidereal_time(site: &Observer, instant: &TimeInstant) -> Radian {
    // UTC stands in for UT1; the sub-second difference is negligible here.
    let gast = gmst(instant.mjd_utc()) + equequ(instant.mjd_tt());
    (gast + site.longitude_rad()).rem_euclid(DPI)
}

/// Horizon coordinates from a true-of-date equatorial direction.
fn horizontal_from_of_date(
    ra: Radian,
    dec: Radian,
    site: &Observer,
    last: Radian,
) -> HorizontalCoordinates {
    let hour_angle = last - ra;
    let phi = site.latitude_rad();

    let sin_alt = phi.sin() * dec.sin() + phi.cos() * dec.cos() * hour_angle.cos();
    let altitude = sin_alt.clamp(-1.0, 1.0).asin();

    // Azimuth from north through east.
    let az_y = -dec.cos() * hour_angle.sin();
    let az_x = dec.sin() * phi.cos() - dec.cos() * hour_angle.cos() * phi.sin();
    let azimuth = az_y.atan2(az_x).rem_euclid(DPI);

    HorizontalCoordinates {
        azimuth: azimuth / RADEG,
        altitude: altitude / RADEG,
    }
}

/// Sæmundsson's refraction at a given apparent altitude, in degrees.
///
/// The standard formula holds for 1010 hPa and 10 °C and is scaled linearly
/// in pressure and inversely in absolute temperature. Below -2 degrees the
/// formula diverges and the correction is skipped.
fn refraction_correction(altitude: Degree, pressure: f64, temperature: f64) -> Degree {
    if pressure <= 0.0 || altitude < -2.0 {
        return 0.0;
    }

    let arg = (altitude + 10.3 / (altitude + 5.11)) * RADEG;
    let r_arcmin = 1.02 / arg.tan();

    let scale = (pressure / 1010.0) * (283.0 / (273.0 + temperature));
    r_arcmin * scale / 60.0
}

/// Transform a J2000 equatorial place into horizon coordinates for a site.
///
/// When the site records a nonzero pressure the returned altitude includes
/// atmospheric refraction; azimuth is unaffected by it.
///
/// Arguments
/// ---------
/// * `pos`: J2000 mean-frame place, as produced by the reducer or the
///   ephemeris queries
/// * `site`: the observing site
/// * `instant`: date of observation
pub fn to_horizontal(
    pos: &BodyPosition,
    site: &Observer,
    instant: &TimeInstant,
) -> Result<HorizontalCoordinates, SkyposError> {
    let mut coords = geometric_horizontal(pos, site, instant)?;
    coords.altitude += refraction_correction(
        coords.altitude,
        site.pressure.into_inner(),
        site.temperature.into_inner(),
    );
    Ok(coords)
}

/// Same transform without the refraction term. The event finder searches on
/// this so that the horizon-crossing offsets keep their standard meaning.
pub fn geometric_horizontal(
    pos: &BodyPosition,
    site: &Observer,
    instant: &TimeInstant,
) -> Result<HorizontalCoordinates, SkyposError> {
    let mjd_tt = instant.mjd_tt();

    let to_of_date = rotpn(
        &RefSystem::Equm(RefEpoch::J2000),
        &RefSystem::Equt(RefEpoch::Epoch(mjd_tt)),
    );
    let u = to_of_date * pos.unit_vector();

    let mut ra = u.y.atan2(u.x);
    if ra < 0.0 {
        ra += DPI;
    }
    let dec = u.z.clamp(-1.0, 1.0).asin();

    let last = local_apparent_sidereal_time(site, instant);
    Ok(horizontal_from_of_date(ra, dec, site, last))
}
