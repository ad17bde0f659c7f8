//! # Crate entry point
//!
//! [`SkyPos`] bundles the lazily-loaded planetary ephemeris with the current
//! observer location and exposes the end-to-end queries: apparent place of a
//! body or star, its horizontal coordinates, and its rise/set events.
//!
//! The location is a mutable shared state updated from outside (a GPS fix,
//! a settings screen) while computations may run concurrently; an unknown
//! location is a normal state, and the location-dependent queries return
//! `None` instead of failing while it lasts.

use camino::{Utf8Path, Utf8PathBuf};
use log::info;
use once_cell::sync::OnceCell;
use std::sync::Mutex;

use crate::catalog::CatalogRecord;
use crate::constants::{Degree, Meter};
use crate::horizontal::{to_horizontal, HorizontalCoordinates};
use crate::jpl_ephem::{Body, BodyPosition, JPLEphem};
use crate::observers::Observer;
use crate::rise_set::{find_rise_set, RiseSetEvents, RiseSetTarget};
use crate::skypos_errors::SkyposError;
use crate::time::TimeInstant;

/// A snapshot of the observer's whereabouts and local atmosphere.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoLocation {
    /// Geodetic latitude in degrees
    pub latitude: Degree,
    /// Geodetic longitude in degrees, positive east
    pub longitude: Degree,
    /// Height above the ellipsoid in meters
    pub elevation: Meter,
    /// Atmospheric pressure in hPa (0 = no refraction)
    pub pressure: f64,
    /// Air temperature in degrees Celsius
    pub temperature: f64,
}

impl GeoLocation {
    /// A location with the standard atmosphere attached.
    pub fn new(latitude: Degree, longitude: Degree, elevation: Meter) -> Self {
        GeoLocation {
            latitude,
            longitude,
            elevation,
            pressure: 1010.0,
            temperature: 10.0,
        }
    }
}

/// Shared state of the reduction chain.
///
/// The ephemeris is parsed from disk on first use and cached for the
/// lifetime of the value; the observer location may change at any time.
#[derive(Debug)]
pub struct SkyPos {
    ephem_path: Utf8PathBuf,
    jpl_ephem: OnceCell<JPLEphem>,
    location: Mutex<Option<GeoLocation>>,
}

impl SkyPos {
    /// Create the state around an ephemeris dataset path.
    ///
    /// The file is not touched until the first query that needs it; see
    /// [`crate::jpl_ephem::provision::ensure_dataset`] for installing the
    /// dataset in the expected place.
    pub fn new(ephem_path: impl AsRef<Utf8Path>) -> Self {
        SkyPos {
            ephem_path: ephem_path.as_ref().to_owned(),
            jpl_ephem: OnceCell::new(),
            location: Mutex::new(None),
        }
    }

    /// The loaded ephemeris, parsing the dataset on first call.
    pub fn get_jpl_ephem(&self) -> Result<&JPLEphem, SkyposError> {
        self.jpl_ephem
            .get_or_try_init(|| JPLEphem::load(&self.ephem_path))
    }

    /// Record a new observer location.
    pub fn update_location(&self, location: GeoLocation) {
        let mut guard = match self.location.lock() {
            Ok(guard) => guard,
            // A writer panicked mid-update; the slot holds a whole value.
            Err(poisoned) => poisoned.into_inner(),
        };
        *guard = Some(location);
        info!(
            "observer location set to ({:.4}, {:.4}), {} m",
            location.latitude, location.longitude, location.elevation
        );
    }

    /// The last recorded location, if any.
    pub fn location_snapshot(&self) -> Option<GeoLocation> {
        match self.location.lock() {
            Ok(guard) => *guard,
            Err(poisoned) => *poisoned.into_inner(),
        }
    }

    /// The current location as a validated observer site.
    fn observer(&self) -> Result<Option<Observer>, SkyposError> {
        self.location_snapshot()
            .map(|loc| {
                Observer::new(
                    loc.longitude,
                    loc.latitude,
                    loc.elevation,
                    loc.pressure,
                    loc.temperature,
                )
            })
            .transpose()
    }

    /// Place of a body as seen from a given site (or the geocenter).
    ///
    /// The location snapshot is taken once by the public entry points and
    /// passed down, so a concurrent location update cannot land between the
    /// topocentric correction and the horizontal transform.
    fn body_position_at(
        &self,
        body: Body,
        instant: &TimeInstant,
        site: Option<&Observer>,
    ) -> Result<BodyPosition, SkyposError> {
        let ephem = self.get_jpl_ephem()?;
        let site_offset =
            site.map(|obs| obs.geocentric_position_j2000(instant.mjd_tt(), instant.mjd_utc()));

        let (pos, _) = ephem.position(body, instant.jd_tt, site_offset.as_ref())?;
        Ok(pos)
    }

    /// Reduced place of a catalog star for a given site (or the geocenter).
    fn star_position_at(
        &self,
        record: &CatalogRecord,
        instant: &TimeInstant,
        site: Option<&Observer>,
    ) -> Result<BodyPosition, SkyposError> {
        // A zero-parallax star never needs the ephemeris; load lazily.
        let ephem = if record.parallax > 0.0 {
            Some(self.get_jpl_ephem()?)
        } else {
            None
        };
        record.reduce(instant, ephem, site)
    }

    /// Astrometric place of a solar-system body, topocentric when the
    /// observer location is known.
    pub fn body_position(
        &self,
        body: Body,
        instant: &TimeInstant,
    ) -> Result<BodyPosition, SkyposError> {
        let site = self.observer()?;
        self.body_position_at(body, instant, site.as_ref())
    }

    /// Apparent place of a catalog star, with the diurnal-parallax term
    /// when the observer location is known.
    pub fn star_position(
        &self,
        record: &CatalogRecord,
        instant: &TimeInstant,
    ) -> Result<BodyPosition, SkyposError> {
        let site = self.observer()?;
        self.star_position_at(record, instant, site.as_ref())
    }

    /// Horizontal coordinates of a body, or `None` while the observer
    /// location is unknown.
    pub fn body_horizontal(
        &self,
        body: Body,
        instant: &TimeInstant,
    ) -> Result<Option<HorizontalCoordinates>, SkyposError> {
        let Some(site) = self.observer()? else {
            return Ok(None);
        };
        let pos = self.body_position_at(body, instant, Some(&site))?;
        Ok(Some(to_horizontal(&pos, &site, instant)?))
    }

    /// Horizontal coordinates of a catalog star, or `None` while the
    /// observer location is unknown.
    pub fn star_horizontal(
        &self,
        record: &CatalogRecord,
        instant: &TimeInstant,
    ) -> Result<Option<HorizontalCoordinates>, SkyposError> {
        let Some(site) = self.observer()? else {
            return Ok(None);
        };
        let pos = self.star_position_at(record, instant, Some(&site))?;
        Ok(Some(to_horizontal(&pos, &site, instant)?))
    }

    /// Rise and set events of a target over one local day, or `None` while
    /// the observer location is unknown.
    pub fn rise_set(
        &self,
        target: &RiseSetTarget,
        year: i32,
        month: u32,
        day: u32,
        tz_offset_hours: f64,
    ) -> Result<Option<RiseSetEvents>, SkyposError> {
        let Some(site) = self.observer()? else {
            return Ok(None);
        };

        let needs_ephem = match target {
            RiseSetTarget::Body(_) => true,
            RiseSetTarget::Star(record) => record.parallax > 0.0,
        };
        let ephem = if needs_ephem {
            Some(self.get_jpl_ephem()?)
        } else {
            None
        };

        find_rise_set(target, &site, year, month, day, tz_offset_hours, ephem).map(Some)
    }
}

#[cfg(test)]
mod skypos_test {
    use super::*;

    #[test]
    fn test_location_starts_unknown() {
        let state = SkyPos::new("/nonexistent/JPLEPH");
        assert_eq!(state.location_snapshot(), None);

        let instant = TimeInstant::from_civil(2025, 1, 1, 0.0);
        let record =
            CatalogRecord::new("test star", "unit", 5.0, 10.0, 0.0, 0.0, 0.0, 0.0).unwrap();

        // Location-dependent queries skip instead of failing.
        assert_eq!(state.star_horizontal(&record, &instant).unwrap(), None);
        assert_eq!(
            state
                .rise_set(&RiseSetTarget::Star(&record), 2025, 1, 1, 0.0)
                .unwrap(),
            None
        );
    }

    #[test]
    fn test_update_location_roundtrip() {
        let state = SkyPos::new("/nonexistent/JPLEPH");
        let loc = GeoLocation::new(43.6, 1.44, 150.0);
        state.update_location(loc);
        assert_eq!(state.location_snapshot(), Some(loc));

        // Later fixes replace earlier ones.
        let newer = GeoLocation::new(48.85, 2.35, 35.0);
        state.update_location(newer);
        assert_eq!(state.location_snapshot(), Some(newer));
    }

    #[test]
    fn test_zero_parallax_star_needs_no_dataset() {
        // The ephemeris path is bogus, but a fixed star reduces anyway.
        let state = SkyPos::new("/nonexistent/JPLEPH");
        state.update_location(GeoLocation::new(45.0, 0.0, 0.0));

        let record =
            CatalogRecord::new("test star", "unit", 5.0, 10.0, 0.0, 0.0, 0.0, 0.0).unwrap();
        let instant = TimeInstant::from_civil(2025, 1, 1, 3.0);

        let pos = state.star_position(&record, &instant).unwrap();
        assert_eq!(pos.right_ascension, 5.0);
        assert!(state.star_horizontal(&record, &instant).unwrap().is_some());
    }

    #[test]
    fn test_missing_dataset_surfaces_for_bodies() {
        let state = SkyPos::new("/nonexistent/JPLEPH");
        state.update_location(GeoLocation::new(45.0, 0.0, 0.0));
        let instant = TimeInstant::from_civil(2025, 1, 1, 0.0);

        let err = state.body_position(Body::Moon, &instant).unwrap_err();
        assert!(matches!(err, SkyposError::DatasetNotFound(_)));
    }
}
