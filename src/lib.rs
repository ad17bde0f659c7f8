//! # skypos
//!
//! Apparent places, horizontal coordinates and rise/set events for a
//! ground-based observer, backed by binary JPL planetary ephemerides.
//!
//! The chain runs catalog astrometry (or an ephemeris body) through space
//! motion, annual and diurnal parallax, precession and nutation, sidereal
//! time and refraction, ending in the horizon system of an observing site.
//! [`skypos::SkyPos`] is the entry point tying the pieces together.

pub mod catalog;
pub mod constants;
pub mod conversion;
pub mod earth_orientation;
pub mod horizontal;
pub mod jpl_ephem;
pub mod observers;
pub mod ref_system;
pub mod rise_set;
pub mod skypos;
pub mod skypos_errors;
pub mod time;
