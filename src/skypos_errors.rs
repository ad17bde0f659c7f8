use thiserror::Error;

/// Crate-wide error type.
///
/// The variants fall into three families, each scoped to the single computation
/// that raised them:
/// - parameter errors ([`MissingParameter`](SkyposError::MissingParameter),
///   [`InvalidParallax`](SkyposError::InvalidParallax),
///   [`InvalidSite`](SkyposError::InvalidSite)) — bad catalog or site input,
/// - data availability ([`DatasetNotFound`](SkyposError::DatasetNotFound),
///   [`EphemerisCorrupt`](SkyposError::EphemerisCorrupt),
///   [`EphemerisOutOfRange`](SkyposError::EphemerisOutOfRange)) — the binary
///   ephemeris is missing, unreadable or does not cover the requested instant,
/// - retrieval errors ([`RetrievalError`](SkyposError::RetrievalError)) — a
///   catalog field set handed over by the retrieval layer could not be used.
///
/// An unknown observer location is deliberately **not** an error: it is the
/// `None` state of the location snapshot (see [`crate::skypos::SkyPos::location_snapshot`])
/// and callers skip location-dependent features instead of failing.
#[derive(Error, Debug)]
pub enum SkyposError {
    #[error("Missing astrometric parameter: {0}")]
    MissingParameter(String),

    #[error("Parallax must be non-negative, got {0} arcsec")]
    InvalidParallax(f64),

    #[error("Invalid observer site: {0}")]
    InvalidSite(String),

    #[error("Unsupported ephemeris body: {0}")]
    UnsupportedBody(String),

    #[error("Ephemeris dataset not found at: {0}")]
    DatasetNotFound(String),

    #[error("Invalid ephemeris file structure: {0}")]
    EphemerisCorrupt(String),

    #[error("Epoch JD {jd} outside ephemeris span [{start}, {end}]")]
    EphemerisOutOfRange { jd: f64, start: f64, end: f64 },

    #[error("Catalog retrieval error: {0}")]
    RetrievalError(String),

    #[error("Base dir creation error for the ephemeris dataset: {0}")]
    UnableToCreateBaseDir(String),

    #[error("UTF-8 Path error: {0}")]
    Utf8PathError(String),

    #[error("Unable to perform file operation: {0}")]
    IoError(#[from] std::io::Error),

    #[error("NaN encountered in site parameter: {0}")]
    NanSiteParameter(#[from] ordered_float::FloatIsNan),

    #[error("System clock error: {0}")]
    ClockError(String),
}

impl PartialEq for SkyposError {
    fn eq(&self, other: &Self) -> bool {
        use SkyposError::*;
        match (self, other) {
            (MissingParameter(a), MissingParameter(b)) => a == b,
            (InvalidParallax(a), InvalidParallax(b)) => a == b,
            (InvalidSite(a), InvalidSite(b)) => a == b,
            (UnsupportedBody(a), UnsupportedBody(b)) => a == b,
            (DatasetNotFound(a), DatasetNotFound(b)) => a == b,
            (EphemerisCorrupt(a), EphemerisCorrupt(b)) => a == b,
            (
                EphemerisOutOfRange { jd, start, end },
                EphemerisOutOfRange {
                    jd: jd2,
                    start: start2,
                    end: end2,
                },
            ) => jd == jd2 && start == start2 && end == end2,
            (RetrievalError(a), RetrievalError(b)) => a == b,
            (UnableToCreateBaseDir(a), UnableToCreateBaseDir(b)) => a == b,
            (Utf8PathError(a), Utf8PathError(b)) => a == b,
            (ClockError(a), ClockError(b)) => a == b,

            // Not comparable, equal if same variant
            (IoError(_), IoError(_)) => true,
            (NanSiteParameter(_), NanSiteParameter(_)) => true,

            _ => false,
        }
    }
}
