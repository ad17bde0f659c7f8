use hifitime::Epoch;

use crate::constants::{DPI, JD, JDTOMJD, MJD, SECONDS_PER_DAY, T2000};
use crate::skypos_errors::SkyposError;

/// Compute the Julian Date of a civil calendar instant.
///
/// Standard Julian-date algorithm on the proleptic Gregorian calendar,
/// valid for the whole era covered by the Delta-T model.
///
/// Arguments
/// ---------
/// * `year`, `month`, `day`: civil calendar date
/// * `hour`: decimal hour of day (0.0 ..< 24.0)
///
/// Return
/// ------
/// * The Julian Date of that instant (same time scale as the input).
pub fn julian_date(year: i32, month: u32, day: u32, hour: f64) -> JD {
    let (y, m) = if month <= 2 {
        (year - 1, month + 12)
    } else {
        (year, month)
    };

    let a = (y as f64 / 100.0).floor();
    let b = 2.0 - a + (a / 4.0).floor();

    (365.25 * (y as f64 + 4716.0)).floor() + (30.6001 * (m as f64 + 1.0)).floor()
        + day as f64
        + b
        - 1524.5
        + hour / 24.0
}

/// Transformation from Julian Date (JD) to modified Julian Date (MJD)
pub fn jd_to_mjd(jd: JD) -> MJD {
    jd - JDTOMJD
}

/// Transformation from modified Julian Date (MJD) to Julian Date (JD)
pub fn mjd_to_jd(mjd: MJD) -> JD {
    mjd + JDTOMJD
}

/// Current instant as a UTC Julian Date, from the system clock.
pub fn utc_now() -> Result<JD, SkyposError> {
    let epoch = Epoch::now().map_err(|e| SkyposError::ClockError(e.to_string()))?;
    Ok(epoch.to_jde_utc_days())
}

/// Model estimate of Delta-T, the offset between Terrestrial Time and
/// Universal Time, in seconds.
///
/// Piecewise polynomial fits (Espenak & Meeus) keyed on the decimal year of
/// the input epoch. The model is accurate to the second over roughly
/// 1600–2150 and degrades gracefully outside: beyond the fitted range a
/// long-term parabola is used, so the function never fails.
///
/// Strictly the fits estimate TT − UT1; since |UT1 − UTC| < 0.9 s this is
/// used as TT − UTC throughout the crate.
///
/// Arguments
/// ---------
/// * `jd_utc`: UTC Julian Date of the instant.
///
/// Return
/// ------
/// * Delta-T in seconds.
pub fn delta_t(jd_utc: JD) -> f64 {
    let y = 2000.0 + (jd_utc - crate::constants::JD2000) / 365.25;

    if y < -500.0 {
        let u = (y - 1820.0) / 100.0;
        -20.0 + 32.0 * u * u
    } else if y < 500.0 {
        let u = y / 100.0;
        10583.6
            + u * (-1014.41
                + u * (33.78311
                    + u * (-5.952053
                        + u * (-0.1798452 + u * (0.022174192 + u * 0.0090316521)))))
    } else if y < 1600.0 {
        let u = (y - 1000.0) / 100.0;
        1574.2
            + u * (-556.01
                + u * (71.23472
                    + u * (0.319781
                        + u * (-0.8503463 + u * (-0.005050998 + u * 0.0083572073)))))
    } else if y < 1700.0 {
        let t = y - 1600.0;
        120.0 + t * (-0.9808 + t * (-0.01532 + t / 7129.0))
    } else if y < 1800.0 {
        let t = y - 1700.0;
        8.83 + t * (0.1603 + t * (-0.0059285 + t * (0.00013336 - t / 1_174_000.0)))
    } else if y < 1860.0 {
        let t = y - 1800.0;
        13.72
            + t * (-0.332447
                + t * (0.0068612
                    + t * (0.0041116
                        + t * (-0.00037436
                            + t * (0.0000121272
                                + t * (-0.0000001699 + t * 0.000000000875))))))
    } else if y < 1900.0 {
        let t = y - 1860.0;
        7.62 + t * (0.5737 + t * (-0.251754 + t * (0.01680668 + t * (-0.0004473624 + t / 233_174.0))))
    } else if y < 1920.0 {
        let t = y - 1900.0;
        -2.79 + t * (1.494119 + t * (-0.0598939 + t * (0.0061966 - t * 0.000197)))
    } else if y < 1941.0 {
        let t = y - 1920.0;
        21.20 + t * (0.84493 + t * (-0.076100 + t * 0.0020936))
    } else if y < 1961.0 {
        let t = y - 1950.0;
        29.07 + t * (0.407 + t * (-1.0 / 233.0 + t / 2547.0))
    } else if y < 1986.0 {
        let t = y - 1975.0;
        45.45 + t * (1.067 + t * (-1.0 / 260.0 - t / 718.0))
    } else if y < 2005.0 {
        let t = y - 2000.0;
        63.86
            + t * (0.3345
                + t * (-0.060374 + t * (0.0017275 + t * (0.000651814 + t * 0.00002373599))))
    } else if y < 2050.0 {
        let t = y - 2000.0;
        62.92 + t * (0.32217 + t * 0.005589)
    } else if y < 2150.0 {
        let u = (y - 1820.0) / 100.0;
        -20.0 + 32.0 * u * u - 0.5628 * (2150.0 - y)
    } else {
        let u = (y - 1820.0) / 100.0;
        -20.0 + 32.0 * u * u
    }
}

/// A single moment, representable simultaneously on the UTC and TT time axes.
///
/// The TT Julian Date is derived from the UTC one through [`delta_t`], so the
/// pair stays consistent by construction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimeInstant {
    pub jd_utc: JD,
    pub jd_tt: JD,
}

impl TimeInstant {
    /// Build an instant from a civil UTC date and decimal hour.
    pub fn from_civil(year: i32, month: u32, day: u32, hour_utc: f64) -> Self {
        Self::from_jd_utc(julian_date(year, month, day, hour_utc))
    }

    /// Build an instant from a UTC Julian Date.
    pub fn from_jd_utc(jd_utc: JD) -> Self {
        let jd_tt = jd_utc + delta_t(jd_utc) / SECONDS_PER_DAY;
        TimeInstant { jd_utc, jd_tt }
    }

    /// Build an instant for the current system clock time.
    pub fn now() -> Result<Self, SkyposError> {
        Ok(Self::from_jd_utc(utc_now()?))
    }

    /// TT − UTC in seconds for this instant.
    pub fn delta_t_seconds(&self) -> f64 {
        (self.jd_tt - self.jd_utc) * SECONDS_PER_DAY
    }

    pub fn mjd_utc(&self) -> MJD {
        jd_to_mjd(self.jd_utc)
    }

    pub fn mjd_tt(&self) -> MJD {
        jd_to_mjd(self.jd_tt)
    }
}

/// Compute the Greenwich Mean Sidereal Time (GMST) in radians
/// for a given Modified Julian Date (UT1 time scale).
///
/// This function implements the IAU 1982 polynomial formula
/// for the mean sidereal time at 0h UT1, plus the fractional-day
/// correction term due to Earth's rotation rate.
///
/// # Arguments
/// * `tjm` - Modified Julian Date (MJD, UT1 time scale)
///
/// # Returns
/// * GMST angle in radians, normalized to the interval [0, 2π).
pub fn gmst(tjm: MJD) -> f64 {
    // Polynomial coefficients for GMST at 0h UT1 (in seconds)
    const C0: f64 = 24110.54841;
    const C1: f64 = 8640184.812866;
    const C2: f64 = 9.3104e-2;
    const C3: f64 = -6.2e-6;

    // Ratio of sidereal day to solar day
    const RAP: f64 = 1.00273790934;

    // GMST at 0h UT1 from the polynomial, in seconds, converted to radians
    let itjm = tjm.floor();
    let t = (itjm - T2000) / 36525.0;
    let gmst0 = (((C3 * t + C2) * t + C1) * t + C0) * DPI / SECONDS_PER_DAY;

    // Contribution of the fraction of the day, scaled to the sidereal rate
    let h = tjm.fract() * DPI;
    let mut gmst = gmst0 + h * RAP;

    // Normalize to [0, 2π)
    let mut i: i64 = (gmst / DPI).floor() as i64;
    if gmst < 0.0 {
        i -= 1;
    }
    gmst -= i as f64 * DPI;

    gmst
}
