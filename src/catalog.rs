//! # Star catalog records and astrometric reduction
//!
//! [`CatalogRecord`] carries the catalog astrometry of a star: position at
//! the J2000 epoch, proper motion, annual parallax and radial velocity.
//! [`CatalogRecord::reduce`] propagates that astrometry to a date of
//! observation: space motion from the catalog epoch, then annual parallax
//! from the Earth's barycentric position, then (optionally) diurnal parallax
//! from the observing site's geocentric position.
//!
//! Right ascension is carried in hours throughout; catalog field sets
//! arriving in degrees are converted on ingestion.

use std::collections::HashMap;

use log::debug;
use nalgebra::Vector3;

use crate::constants::{
    ArcSec, Degree, Hour, AU, DAYS_PER_YEAR, JD2000, RADH, RADSEC, SECONDS_PER_YEAR,
};
use crate::jpl_ephem::{BodyPosition, JPLEphem};
use crate::observers::Observer;
use crate::skypos_errors::SkyposError;
use crate::time::TimeInstant;

/// Catalog astrometry of a single star, referred to the J2000 epoch.
#[derive(Debug, Clone, PartialEq)]
pub struct CatalogRecord {
    /// Catalog designation of the star (e.g. `"* bet Ori"`)
    pub identifier: String,
    /// Name of the catalog the record came from
    pub catalog_name: String,
    /// Right ascension at J2000, in hours
    pub right_ascension: Hour,
    /// Declination at J2000, in degrees
    pub declination: Degree,
    /// Annual parallax, in arcseconds (0 = unknown)
    pub parallax: ArcSec,
    /// Proper motion in right ascension, mas/yr, already multiplied by cos δ
    pub pm_ra: f64,
    /// Proper motion in declination, mas/yr
    pub pm_dec: f64,
    /// Radial velocity, km/s, positive receding (0 = unknown)
    pub radial_velocity: f64,
}

/// Catalog field names accepted by [`CatalogRecord::from_fields`], following
/// the SIMBAD VOTable column convention.
const FIELD_RA_DEG: &str = "RA_d";
const FIELD_DEC_DEG: &str = "DEC_d";
const FIELD_PMRA: &str = "PMRA";
const FIELD_PMDEC: &str = "PMDEC";
const FIELD_PLX: &str = "PLX_VALUE";
const FIELD_RV: &str = "RV_VALUE";

impl CatalogRecord {
    /// Create a record from already-typed astrometric parameters.
    ///
    /// Arguments
    /// ---------
    /// * `identifier`, `catalog_name`: provenance of the record
    /// * `right_ascension`: J2000 right ascension in **hours**
    /// * `declination`: J2000 declination in degrees
    /// * `parallax`: annual parallax in arcseconds, 0 when unknown
    /// * `pm_ra`: proper motion in RA (×cos δ) in mas/yr
    /// * `pm_dec`: proper motion in declination in mas/yr
    /// * `radial_velocity`: km/s, 0 when unknown
    pub fn new(
        identifier: impl Into<String>,
        catalog_name: impl Into<String>,
        right_ascension: Hour,
        declination: Degree,
        parallax: ArcSec,
        pm_ra: f64,
        pm_dec: f64,
        radial_velocity: f64,
    ) -> Result<Self, SkyposError> {
        let record = CatalogRecord {
            identifier: identifier.into(),
            catalog_name: catalog_name.into(),
            right_ascension,
            declination,
            parallax,
            pm_ra,
            pm_dec,
            radial_velocity,
        };

        for (name, value) in [
            ("right_ascension", right_ascension),
            ("declination", declination),
            ("parallax", parallax),
            ("pm_ra", pm_ra),
            ("pm_dec", pm_dec),
            ("radial_velocity", radial_velocity),
        ] {
            if !value.is_finite() {
                return Err(SkyposError::MissingParameter(format!(
                    "{name} of {} is not finite",
                    record.identifier
                )));
            }
        }
        if parallax < 0.0 {
            return Err(SkyposError::InvalidParallax(parallax));
        }
        if !(-90.0..=90.0).contains(&declination) {
            return Err(SkyposError::MissingParameter(format!(
                "declination {declination} deg of {} outside [-90, 90]",
                record.identifier
            )));
        }

        Ok(record)
    }

    /// Build a record from a raw catalog field set.
    ///
    /// The keys follow the SIMBAD VOTable column names; `RA_d`/`DEC_d` are
    /// in degrees, `PMRA`/`PMDEC` in mas/yr, `PLX_VALUE` in mas, `RV_VALUE`
    /// in km/s. Every field must be present: a catalog without a measurement
    /// reports an explicit zero, never an absent key, so a missing key is a
    /// [`SkyposError::MissingParameter`] rather than a silent default. A
    /// present but non-finite value is a [`SkyposError::RetrievalError`].
    ///
    /// `RA_d` is divided by 15 here, and only here: everything downstream
    /// carries right ascension in hours.
    pub fn from_fields(
        identifier: impl Into<String>,
        catalog_name: impl Into<String>,
        fields: &HashMap<String, f64>,
    ) -> Result<Self, SkyposError> {
        let identifier = identifier.into();

        let field = |key: &str| -> Result<f64, SkyposError> {
            let value = fields.get(key).copied().ok_or_else(|| {
                SkyposError::MissingParameter(format!("field {key} absent for {identifier}"))
            })?;
            if !value.is_finite() {
                return Err(SkyposError::RetrievalError(format!(
                    "field {key} of {identifier} is {value}"
                )));
            }
            Ok(value)
        };

        let ra_deg = field(FIELD_RA_DEG)?;
        let dec_deg = field(FIELD_DEC_DEG)?;

        // SIMBAD parallaxes are in mas.
        let plx_arcsec = field(FIELD_PLX)? * 1e-3;

        let pm_ra = field(FIELD_PMRA)?;
        let pm_dec = field(FIELD_PMDEC)?;
        let radial_velocity = field(FIELD_RV)?;

        Self::new(
            identifier,
            catalog_name,
            ra_deg / 15.0,
            dec_deg,
            plx_arcsec,
            pm_ra,
            pm_dec,
            radial_velocity,
        )
    }

    /// Unit direction vector of the catalog position, J2000 frame.
    pub fn unit_vector(&self) -> Vector3<f64> {
        let ra = self.right_ascension * RADH;
        let dec = self.declination.to_radians();
        Vector3::new(dec.cos() * ra.cos(), dec.cos() * ra.sin(), dec.sin())
    }

    /// Local tangent-plane basis at the catalog position: the unit vectors
    /// of increasing right ascension and increasing declination.
    fn tangent_basis(&self) -> (Vector3<f64>, Vector3<f64>) {
        let ra = self.right_ascension * RADH;
        let dec = self.declination.to_radians();

        let e_ra = Vector3::new(-ra.sin(), ra.cos(), 0.0);
        let e_dec = Vector3::new(
            -dec.sin() * ra.cos(),
            -dec.sin() * ra.sin(),
            dec.cos(),
        );
        (e_ra, e_dec)
    }

    /// Propagate the catalog astrometry to a date of observation.
    ///
    /// The reduction applies, in order:
    ///
    /// 1. **space motion**: proper motion (and, when the parallax is known,
    ///    radial velocity) linearly from J2000 to the date,
    /// 2. **annual parallax**: the shift due to the Earth's barycentric
    ///    position, when the catalog parallax is nonzero,
    /// 3. **diurnal parallax**: the further shift due to the observing
    ///    site's geocentric position, when a site is given.
    ///
    /// A record with zero parallax reduces without touching the ephemeris:
    /// the star is treated as infinitely distant and only proper motion
    /// applies. Passing `ephem: None` for a record with nonzero parallax is
    /// an error.
    ///
    /// The result stays in the J2000 mean equatorial frame; precession and
    /// nutation to the frame of date belong to the horizontal transform.
    ///
    /// Arguments
    /// ---------
    /// * `instant`: date of observation
    /// * `ephem`: planetary ephemeris for the Earth's barycentric position
    /// * `site`: observing site for the diurnal-parallax term; `None` yields
    ///   the geocentric place
    pub fn reduce(
        &self,
        instant: &TimeInstant,
        ephem: Option<&JPLEphem>,
        site: Option<&Observer>,
    ) -> Result<BodyPosition, SkyposError> {
        let dt_yr = (instant.jd_tt - JD2000) / DAYS_PER_YEAR;

        if self.parallax == 0.0 && self.pm_ra == 0.0 && self.pm_dec == 0.0 {
            // Fixed infinitely-distant star: the catalog place is the answer.
            return Ok(BodyPosition {
                right_ascension: self.right_ascension,
                declination: self.declination,
                epoch_jd: instant.jd_tt,
            });
        }

        let u0 = self.unit_vector();
        let (e_ra, e_dec) = self.tangent_basis();

        // mas/yr to rad/yr; PMRA is already the great-circle rate (×cos δ).
        let pm_ra_rad = self.pm_ra * 1e-3 * RADSEC;
        let pm_dec_rad = self.pm_dec * 1e-3 * RADSEC;
        let pm_vec = pm_ra_rad * e_ra + pm_dec_rad * e_dec;

        if self.parallax == 0.0 {
            let u = (u0 + dt_yr * pm_vec).normalize();
            return Ok(BodyPosition::from_vector(&u, instant.jd_tt));
        }

        let ephem = ephem.ok_or_else(|| {
            SkyposError::DatasetNotFound(format!(
                "no ephemeris loaded (required for the parallax reduction of {})",
                self.identifier
            ))
        })?;

        // Full space-motion vector, in AU and AU/yr.
        let dist_au = 1.0 / (self.parallax * RADSEC);
        let pos = u0 * dist_au;
        let vel = dist_au * pm_vec + self.radial_velocity * (SECONDS_PER_YEAR / AU) * u0;

        let mut observer_au = ephem.earth_barycentric_au(instant.jd_tt)?;
        if let Some(site) = site {
            observer_au += site.geocentric_position_j2000(instant.mjd_tt(), instant.mjd_utc());
        }

        let p = pos + vel * dt_yr - observer_au;
        debug!(
            "reduced {} to JD {}: parallax path, dist {dist_au:.3} au",
            self.identifier, instant.jd_tt
        );

        Ok(BodyPosition::from_vector(&p, instant.jd_tt))
    }
}
