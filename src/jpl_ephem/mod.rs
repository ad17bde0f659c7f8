//! # JPL planetary ephemerides
//!
//! Geocentric and topocentric positions of the Sun, Moon and planets from a
//! binary JPL development-ephemeris file (DE4xx).
//!
//! [`de_file`] parses the binary layout, [`de_record`] evaluates the
//! Chebyshev series, [`provision`] installs the dataset into the user data
//! directory, and [`JPLEphem`] ties them together into the body-position
//! queries used by the rest of the crate.

pub mod de_file;
pub mod de_record;
pub mod provision;

use std::str::FromStr;

use camino::Utf8Path;
use log::debug;
use nalgebra::Vector3;

use crate::constants::{Degree, Hour, Radian, DPI, JD, RADEG, RADH, SECONDS_PER_DAY, VLIGHT};
use crate::skypos_errors::SkyposError;

use de_file::DeFile;

/// A solar-system body carried by the ephemeris file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Body {
    Mercury,
    Venus,
    Mars,
    Jupiter,
    Saturn,
    Uranus,
    Neptune,
    Pluto,
    Moon,
    Sun,
}

/// Body slot of the Earth-Moon barycenter in the IPT table.
const EMB_SLOT: usize = 2;
/// Body slot of the geocentric Moon in the IPT table.
const MOON_SLOT: usize = 9;

impl Body {
    /// Slot of this body in the development-ephemeris IPT table.
    ///
    /// Slot 2 (the Earth-Moon barycenter) is skipped: the Earth itself is
    /// derived from it and never queried as a target.
    fn de_slot(&self) -> usize {
        match self {
            Body::Mercury => 0,
            Body::Venus => 1,
            Body::Mars => 3,
            Body::Jupiter => 4,
            Body::Saturn => 5,
            Body::Uranus => 6,
            Body::Neptune => 7,
            Body::Pluto => 8,
            Body::Moon => MOON_SLOT,
            Body::Sun => 10,
        }
    }
}

impl FromStr for Body {
    type Err = SkyposError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "mercury" => Ok(Body::Mercury),
            "venus" => Ok(Body::Venus),
            "mars" => Ok(Body::Mars),
            "jupiter" => Ok(Body::Jupiter),
            "saturn" => Ok(Body::Saturn),
            "uranus" => Ok(Body::Uranus),
            "neptune" => Ok(Body::Neptune),
            "pluto" => Ok(Body::Pluto),
            "moon" => Ok(Body::Moon),
            "sun" => Ok(Body::Sun),
            other => Err(SkyposError::UnsupportedBody(other.to_string())),
        }
    }
}

impl std::fmt::Display for Body {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Body::Mercury => "Mercury",
            Body::Venus => "Venus",
            Body::Mars => "Mars",
            Body::Jupiter => "Jupiter",
            Body::Saturn => "Saturn",
            Body::Uranus => "Uranus",
            Body::Neptune => "Neptune",
            Body::Pluto => "Pluto",
            Body::Moon => "Moon",
            Body::Sun => "Sun",
        };
        write!(f, "{name}")
    }
}

/// An equatorial position in the J2000 mean frame, as produced by the
/// astrometric reducer and the ephemeris queries.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BodyPosition {
    /// Right ascension in hours, in \[0, 24)
    pub right_ascension: Hour,
    /// Declination in degrees, in \[-90, 90\]
    pub declination: Degree,
    /// Julian Date (TT) the position refers to
    pub epoch_jd: JD,
}

impl BodyPosition {
    /// Spherical angles of a direction vector in the J2000 frame.
    pub fn from_vector(u: &Vector3<f64>, epoch_jd: JD) -> Self {
        let mut ra: Radian = u.y.atan2(u.x);
        if ra < 0.0 {
            ra += DPI;
        }
        let dec: Radian = (u.z / u.norm()).asin();

        BodyPosition {
            right_ascension: ra / RADH,
            declination: dec / RADEG,
            epoch_jd,
        }
    }

    /// Unit direction vector of this position.
    pub fn unit_vector(&self) -> Vector3<f64> {
        let ra = self.right_ascension * RADH;
        let dec = self.declination * RADEG;
        Vector3::new(dec.cos() * ra.cos(), dec.cos() * ra.sin(), dec.sin())
    }
}

/// A loaded development ephemeris, ready for position queries.
///
/// All returned vectors are in the ICRF axes, which the rest of the crate
/// treats as the J2000 mean equatorial frame.
#[derive(Debug)]
pub struct JPLEphem {
    file: DeFile,
}

impl JPLEphem {
    /// Load a binary development-ephemeris file.
    pub fn load(path: &Utf8Path) -> Result<Self, SkyposError> {
        let file = DeFile::load(path)?;
        debug!(
            "loaded DE{} ephemeris: JD [{}, {}], step {} d",
            file.header.numde, file.header.start_jd, file.header.end_jd, file.header.step_days
        );
        Ok(JPLEphem { file })
    }

    /// First and last Julian Date covered by the dataset.
    pub fn jd_span(&self) -> (JD, JD) {
        (self.file.header.start_jd, self.file.header.end_jd)
    }

    /// Astronomical unit in km, as recorded in the dataset.
    pub fn au_km(&self) -> f64 {
        self.file.header.au_km
    }

    /// Raw Chebyshev evaluation of one body slot, in km.
    ///
    /// Planets and the Sun come out relative to the solar-system barycenter;
    /// the Moon slot is geocentric by convention of the DE files.
    fn slot_position_km(&self, slot: usize, et_jd: JD) -> Result<Vector3<f64>, SkyposError> {
        let (record, local_tau) = self.file.get_record(slot, et_jd)?;
        Ok(record.position_at(local_tau))
    }

    /// Barycentric position of the Earth's center, in km.
    ///
    /// Derived from the Earth-Moon barycenter and the geocentric Moon
    /// through the mass ratio recorded in the file header.
    pub fn earth_barycentric_km(&self, et_jd: JD) -> Result<Vector3<f64>, SkyposError> {
        let emb = self.slot_position_km(EMB_SLOT, et_jd)?;
        let moon_geo = self.slot_position_km(MOON_SLOT, et_jd)?;
        let emrat = self.file.header.earth_moon_mass_ratio;
        Ok(emb - moon_geo / (1.0 + emrat))
    }

    /// Barycentric position of the Earth's center, in astronomical units.
    pub fn earth_barycentric_au(&self, et_jd: JD) -> Result<Vector3<f64>, SkyposError> {
        Ok(self.earth_barycentric_km(et_jd)? / self.file.header.au_km)
    }

    /// Geocentric position of a body, in km.
    pub fn geocentric_km(&self, body: Body, et_jd: JD) -> Result<Vector3<f64>, SkyposError> {
        if body == Body::Moon {
            return self.slot_position_km(MOON_SLOT, et_jd);
        }
        let body_bary = self.slot_position_km(body.de_slot(), et_jd)?;
        Ok(body_bary - self.earth_barycentric_km(et_jd)?)
    }

    /// Astrometric place of a body for an observer, antedated for light
    /// travel time.
    ///
    /// One light-time iteration: the body is first evaluated at the
    /// reception epoch to estimate the distance, then re-evaluated at the
    /// retarded epoch. A second pass changes the result by far less than
    /// the precision of the reduction chain.
    ///
    /// Arguments
    /// ---------
    /// * `body`: the target body
    /// * `et_jd`: reception epoch, Julian Date in the TT scale (the offset
    ///   between TT and TDB is negligible at this precision)
    /// * `site_offset_au`: geocentric position of the observing site in the
    ///   J2000 frame, in AU; `None` yields the geocentric place
    ///
    /// Return
    /// ------
    /// * J2000 right ascension and declination, and the distance in km.
    pub fn position(
        &self,
        body: Body,
        et_jd: JD,
        site_offset_au: Option<&Vector3<f64>>,
    ) -> Result<(BodyPosition, f64), SkyposError> {
        let site_km = site_offset_au
            .map(|s| s * self.file.header.au_km)
            .unwrap_or_else(Vector3::zeros);

        let p0 = self.geocentric_km(body, et_jd)? - site_km;
        let light_time_days = p0.norm() / VLIGHT / SECONDS_PER_DAY;

        let p1 = self.geocentric_km(body, et_jd - light_time_days)? - site_km;

        Ok((BodyPosition::from_vector(&p1, et_jd), p1.norm()))
    }
}

#[cfg(test)]
mod body_test {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_body_from_str() {
        assert_eq!("moon".parse::<Body>().unwrap(), Body::Moon);
        assert_eq!("Jupiter".parse::<Body>().unwrap(), Body::Jupiter);
        assert!(matches!(
            "vulcan".parse::<Body>(),
            Err(SkyposError::UnsupportedBody(_))
        ));
    }

    #[test]
    fn test_body_position_from_vector() {
        // Direction along +Y: RA = 6h, Dec = 0.
        let pos = BodyPosition::from_vector(&Vector3::new(0.0, 5.0, 0.0), 2451545.0);
        assert_abs_diff_eq!(pos.right_ascension, 6.0, epsilon = 1e-12);
        assert_abs_diff_eq!(pos.declination, 0.0, epsilon = 1e-12);

        // Octant direction: RA = 3h, Dec = 45 deg.
        let u = Vector3::new(0.5, 0.5, std::f64::consts::FRAC_1_SQRT_2);
        let pos = BodyPosition::from_vector(&u, 2451545.0);
        assert_abs_diff_eq!(pos.right_ascension, 3.0, epsilon = 1e-9);
        assert_abs_diff_eq!(pos.declination, 45.0, epsilon = 1e-9);
    }

    #[test]
    fn test_body_position_vector_roundtrip() {
        let pos = BodyPosition {
            right_ascension: 17.5,
            declination: -23.4,
            epoch_jd: 2460676.5,
        };
        let back = BodyPosition::from_vector(&pos.unit_vector(), pos.epoch_jd);
        assert_abs_diff_eq!(back.right_ascension, pos.right_ascension, epsilon = 1e-12);
        assert_abs_diff_eq!(back.declination, pos.declination, epsilon = 1e-12);
    }
}
