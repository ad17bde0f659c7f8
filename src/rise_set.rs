//! # Rise and set events
//!
//! Horizon-crossing finder for the Sun, Moon, planets and catalog stars over
//! one local calendar day. The geometric altitude relative to a per-target
//! horizon offset is sampled hourly, and each sign change is refined by
//! bisection down to sub-second precision. A target that never crosses the
//! horizon (circumpolar, or never rising) simply yields no events.

use log::debug;
use smallvec::SmallVec;

use crate::catalog::CatalogRecord;
use crate::constants::{Degree, Hour};
use crate::conversion::hours_of_day_to_hhmmss;
use crate::horizontal::geometric_horizontal;
use crate::jpl_ephem::{Body, JPLEphem};
use crate::observers::Observer;
use crate::skypos_errors::SkyposError;
use crate::time::TimeInstant;

/// What to search horizon crossings for.
#[derive(Debug, Clone, Copy)]
pub enum RiseSetTarget<'a> {
    Body(Body),
    Star(&'a CatalogRecord),
}

/// Horizon crossings of one target over one local day.
///
/// Event times are decimal local hours in \[0, 24). Most days have at most
/// one rise and one set; the Moon occasionally fits two of one kind in a
/// single day, hence the small vectors.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RiseSetEvents {
    pub rises: SmallVec<[Hour; 2]>,
    pub sets: SmallVec<[Hour; 2]>,
}

impl RiseSetEvents {
    pub fn is_empty(&self) -> bool {
        self.rises.is_empty() && self.sets.is_empty()
    }

    /// Rise times rendered as `hh:mm:ss` wall-clock strings.
    pub fn rises_hhmmss(&self) -> Vec<String> {
        self.rises.iter().copied().map(hours_of_day_to_hhmmss).collect()
    }

    /// Set times rendered as `hh:mm:ss` wall-clock strings.
    pub fn sets_hhmmss(&self) -> Vec<String> {
        self.sets.iter().copied().map(hours_of_day_to_hhmmss).collect()
    }
}

/// Altitude of the horizon-crossing reference for a target, in degrees.
///
/// Sun: upper-limb with standard refraction. Moon: refraction against the
/// mean semidiameter-plus-parallax of the geocentric place. Stars and
/// planets: standard refraction at the horizon alone.
fn horizon_offset(target: &RiseSetTarget) -> Degree {
    match target {
        RiseSetTarget::Body(Body::Sun) => -0.8333,
        RiseSetTarget::Body(Body::Moon) => 0.125,
        _ => -0.5667,
    }
}

/// Refinement steps of the bisection; 25 halvings of an hour reach
/// a tenth of a millisecond.
const BISECTION_STEPS: u32 = 25;

/// Find the rise and set events of a target over one local calendar day.
///
/// The day runs from local midnight to the following local midnight, where
/// local time is UTC plus a fixed offset. The search compares the
/// **geometric** altitude of the target against the per-target horizon
/// offset, so refraction near the horizon is folded into the offset rather
/// than evaluated per sample.
///
/// Arguments
/// ---------
/// * `target`: body or catalog star
/// * `site`: the observing site
/// * `year`, `month`, `day`: local calendar date
/// * `tz_offset_hours`: local time minus UTC, in hours
/// * `ephem`: planetary ephemeris; required for body targets and for stars
///   with a nonzero parallax
///
/// Return
/// ------
/// * The events found, possibly none.
pub fn find_rise_set(
    target: &RiseSetTarget,
    site: &Observer,
    year: i32,
    month: u32,
    day: u32,
    tz_offset_hours: f64,
    ephem: Option<&JPLEphem>,
) -> Result<RiseSetEvents, SkyposError> {
    let offset = horizon_offset(target);

    let altitude_above_horizon = |local_hour: Hour| -> Result<f64, SkyposError> {
        let instant = TimeInstant::from_civil(year, month, day, local_hour - tz_offset_hours);
        let pos = match target {
            RiseSetTarget::Body(body) => {
                let ephem = ephem.ok_or_else(|| {
                    SkyposError::DatasetNotFound(format!(
                        "no ephemeris loaded (required for {body} rise/set)"
                    ))
                })?;
                ephem.position(*body, instant.jd_tt, None)?.0
            }
            RiseSetTarget::Star(record) => record.reduce(&instant, ephem, None)?,
        };
        Ok(geometric_horizontal(&pos, site, &instant)?.altitude - offset)
    };

    let mut samples = [0.0; 25];
    for (h, slot) in samples.iter_mut().enumerate() {
        *slot = altitude_above_horizon(h as f64)?;
    }

    let mut events = RiseSetEvents::default();

    for h in 0..24 {
        let (f_lo, f_hi) = (samples[h], samples[h + 1]);
        if f_lo == 0.0 || f_lo.signum() == f_hi.signum() {
            continue;
        }

        let mut lo = h as f64;
        let mut hi = lo + 1.0;
        let mut f_lo = f_lo;
        for _ in 0..BISECTION_STEPS {
            let mid = 0.5 * (lo + hi);
            let f_mid = altitude_above_horizon(mid)?;
            if f_mid == 0.0 {
                lo = mid;
                break;
            }
            if f_lo.signum() == f_mid.signum() {
                lo = mid;
                f_lo = f_mid;
            } else {
                hi = mid;
            }
        }

        let crossing = 0.5 * (lo + hi);
        if samples[h] < 0.0 {
            events.rises.push(crossing);
        } else {
            events.sets.push(crossing);
        }
    }

    debug!(
        "rise/set on {year}-{month:02}-{day:02}: {} rises, {} sets",
        events.rises.len(),
        events.sets.len()
    );

    Ok(events)
}
