#![allow(dead_code)] // each test binary uses a different slice of the fixture

//! Shared fixture: a tiny synthetic development-ephemeris file.
//!
//! The file follows the DE binary layout exactly (header record, constants
//! record, data blocks) but carries constant Chebyshev series, so every
//! body sits still at a known position and the interpolated results are
//! exactly predictable. Light-time retardation becomes a no-op on constant
//! positions, which keeps the expected angles closed-form.

use std::io::Write;
use std::sync::OnceLock;

use camino::{Utf8Path, Utf8PathBuf};

/// Bodies are laid out with 16 coefficients, 3 components, 1 sub-interval.
const N_COEFFS: usize = 16;
/// Doubles per body in a data block.
const DOUBLES_PER_BODY: usize = N_COEFFS * 3;
/// recsize = 4 * (4 + 11 * 2 * 16 * 3) bytes.
const RECSIZE: usize = 4 * (4 + 11 * 2 * N_COEFFS * 3);

/// First JD covered by the synthetic file.
pub const EPHEM_START_JD: f64 = 2460640.5; // 2024-11-26
/// Block length in days.
pub const EPHEM_STEP_DAYS: f64 = 32.0;
/// Number of data blocks.
const N_BLOCKS: usize = 4;
/// Last JD covered by the synthetic file.
pub const EPHEM_END_JD: f64 = EPHEM_START_JD + N_BLOCKS as f64 * EPHEM_STEP_DAYS;

pub const AU_KM: f64 = 149_597_870.7;
pub const EMRAT: f64 = 81.30056;

/// Fixed barycentric position of the Earth-Moon barycenter, km.
pub const EMB_KM: [f64; 3] = [AU_KM, 0.0, 0.0];
/// Fixed geocentric position of the Moon, km.
pub const MOON_GEO_KM: [f64; 3] = [384_400.0, 0.0, 0.0];
/// The Sun sits at the solar-system barycenter.
pub const SUN_KM: [f64; 3] = [0.0, 0.0, 0.0];
/// Fixed barycentric position of Mars, km.
pub const MARS_KM: [f64; 3] = [0.0, 2.3e8, 0.0];

/// Barycentric position of the Earth's center implied by the fixture.
pub fn earth_barycentric_km() -> [f64; 3] {
    let f = 1.0 / (1.0 + EMRAT);
    [
        EMB_KM[0] - MOON_GEO_KM[0] * f,
        EMB_KM[1] - MOON_GEO_KM[1] * f,
        EMB_KM[2] - MOON_GEO_KM[2] * f,
    ]
}

/// Constant position of each of the 11 body slots, km.
fn slot_position(slot: usize) -> [f64; 3] {
    match slot {
        2 => EMB_KM,
        3 => MARS_KM,
        9 => MOON_GEO_KM,
        10 => SUN_KM,
        // The other planets are parked on distinct axes so a wrong slot
        // lookup cannot masquerade as a right answer.
        other => [1.0e8 + other as f64 * 1.0e7, -5.0e7, 2.0e7],
    }
}

fn build_file_bytes() -> Vec<u8> {
    let mut header = Vec::with_capacity(RECSIZE);

    // TTL (14*3 CHAR*6) and CNAM (400 CHAR*6), blank-padded.
    header.extend(std::iter::repeat(b' ').take(14 * 3 * 6));
    header.extend(std::iter::repeat(b' ').take(400 * 6));

    // SS: start, end, step.
    for v in [EPHEM_START_JD, EPHEM_END_JD, EPHEM_STEP_DAYS] {
        header.extend_from_slice(&v.to_le_bytes());
    }
    // NCON (<= 400, so no relocated IPT rows), AU, EMRAT.
    header.extend_from_slice(&4i32.to_le_bytes());
    header.extend_from_slice(&AU_KM.to_le_bytes());
    header.extend_from_slice(&EMRAT.to_le_bytes());

    // IPT rows 0..12: contiguous offsets, 16 coefficients, 1 sub-interval.
    assert_eq!(header.len(), 2696);
    for slot in 0..11u32 {
        let offset = 3 + slot * DOUBLES_PER_BODY as u32;
        for v in [offset, N_COEFFS as u32, 1] {
            header.extend_from_slice(&v.to_le_bytes());
        }
    }
    // Nutations and librations absent.
    let past_end = 3 + 11 * DOUBLES_PER_BODY as u32;
    for v in [past_end, 0, 0] {
        header.extend_from_slice(&v.to_le_bytes());
    }
    // DENUM, then LPT (ipt[12]).
    header.extend_from_slice(&440u32.to_le_bytes());
    for v in [past_end, 0, 0] {
        header.extend_from_slice(&v.to_le_bytes());
    }

    header.resize(RECSIZE, 0);

    // Record 2: constant values, unused by the reader.
    let constants = vec![0u8; RECSIZE];

    let mut bytes = header;
    bytes.extend_from_slice(&constants);

    for block in 0..N_BLOCKS {
        let jd0 = EPHEM_START_JD + block as f64 * EPHEM_STEP_DAYS;
        let mut doubles = Vec::with_capacity(RECSIZE / 8);
        doubles.push(jd0);
        doubles.push(jd0 + EPHEM_STEP_DAYS);

        for slot in 0..11 {
            let pos = slot_position(slot);
            for component in pos {
                // Constant series: only the T0 coefficient is nonzero.
                doubles.push(component);
                doubles.extend(std::iter::repeat(0.0).take(N_COEFFS - 1));
            }
        }

        assert_eq!(doubles.len() * 8, RECSIZE);
        for v in doubles {
            bytes.extend_from_slice(&v.to_le_bytes());
        }
    }

    bytes
}

/// Path of the synthetic ephemeris file, written once per test process.
pub fn synthetic_ephemeris_path() -> &'static Utf8Path {
    static PATH: OnceLock<Utf8PathBuf> = OnceLock::new();
    PATH.get_or_init(|| {
        let dir = std::env::temp_dir().join(format!("skypos-test-{}", std::process::id()));
        std::fs::create_dir_all(&dir).expect("create temp dir");
        let path = dir.join("DE440.synthetic");

        let bytes = build_file_bytes();
        let mut file = std::fs::File::create(&path).expect("create synthetic ephemeris");
        file.write_all(&bytes).expect("write synthetic ephemeris");

        Utf8PathBuf::from_path_buf(path).expect("temp dir is not UTF-8")
    })
}

/// Path of a degenerate ephemeris file: a well-formed header whose SS span
/// is shorter than half a step, followed by no data blocks at all.
pub fn blockless_ephemeris_path() -> &'static Utf8Path {
    static PATH: OnceLock<Utf8PathBuf> = OnceLock::new();
    PATH.get_or_init(|| {
        let mut bytes = build_file_bytes();
        // Drop every data block, keeping the two header records.
        bytes.truncate(2 * RECSIZE);
        // SS end sits right after the 252-byte TTL, the 2400-byte CNAM and
        // the SS start double.
        let end = EPHEM_START_JD + 10.0;
        bytes[2660..2668].copy_from_slice(&end.to_le_bytes());

        let dir = std::env::temp_dir().join(format!("skypos-test-{}", std::process::id()));
        std::fs::create_dir_all(&dir).expect("create temp dir");
        let path = dir.join("DE440.blockless");
        std::fs::write(&path, &bytes).expect("write blockless ephemeris");

        Utf8PathBuf::from_path_buf(path).expect("temp dir is not UTF-8")
    })
}
