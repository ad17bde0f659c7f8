//! Binary reader for JPL development-ephemeris files (DE4xx, Horizons
//! binary export format, little-endian).
//!
//! The file layout is two header records followed by data records of a
//! fixed size derived from the IPT table:
//!
//! - record 1: TTL title lines (14×3 CHAR*6), CNAM constant names
//!   (400 CHAR*6), SS start/end/step JDs, NCON, the AU in km, the
//!   Earth/Moon mass ratio, then the IPT layout table,
//! - record 2: the constant values (unused here),
//! - records 3..: data blocks `[jd_start, jd_end, coefficients...]`.

use camino::Utf8Path;
use nom::{
    bytes::complete::take,
    multi::count,
    number::complete::{le_f64, le_i32, le_u32},
    IResult, Parser,
};

use std::{
    fs::File,
    io::{BufReader, Read, Seek},
};

use crate::skypos_errors::SkyposError;

use super::de_record::DeRecord;

/// Per-body layout table from the file header.
///
/// Row index is the body slot (0-14); the three columns are the 1-based
/// offset of the body's first coefficient in a data block, the number of
/// Chebyshev coefficients per component, and the number of sub-intervals.
pub type Ipt = [[u32; 3]; 15];

/// Body slots 0..=10 carry 3-component position series; slot 11 is the
/// 2-component nutation series, 12 the librations, 14 the TT-TDB offsets.
const POSITION_SLOTS: usize = 11;

fn dimension(index: usize) -> usize {
    match index {
        0..=10 => 3,
        11 => 2,
        12 => 3,
        13 => 3,
        14 => 1,
        _ => 0,
    }
}

/// Size in bytes of one data record, from the IPT layout.
pub fn compute_recsize(ipt: &Ipt) -> usize {
    let mut kernel_size = 4; // 32-bit words: jd_start + jd_end

    for (i, row) in ipt.iter().enumerate() {
        let n_coeffs = row[1] as usize;
        let n_subintervals = row[2] as usize;
        kernel_size += 2 * n_coeffs * n_subintervals * dimension(i);
    }

    kernel_size * 4
}

/// Fortran CHAR*6 field.
fn parse_char6(input: &[u8]) -> IResult<&[u8], String> {
    let (rest, raw) = take(6usize)(input)?;
    Ok((rest, String::from_utf8_lossy(raw).trim_end().to_string()))
}

/// The 204-byte IPT region at offset 2696: ipt\[0..12\], the DE number, and
/// the lunar-libration triple that fills ipt\[12\].
fn parse_ipt(input: &[u8]) -> IResult<&[u8], (Ipt, u32)> {
    let mut ipt: Ipt = [[0; 3]; 15];

    let mut remaining = input;
    for i in 0..36 {
        let (rest, val) = le_u32(remaining)?;
        remaining = rest;
        ipt[i / 3][i % 3] = val;
    }

    let (remaining, numde) = le_u32(remaining)?;

    let mut lpt = [0u32; 3];
    let mut remaining = remaining;
    for slot in lpt.iter_mut() {
        let (rest, val) = le_u32(remaining)?;
        *slot = val;
        remaining = rest;
    }
    ipt[12] = lpt;

    Ok((remaining, (ipt, numde)))
}

fn parse_ipt_13_14(input: &[u8]) -> IResult<&[u8], [[u32; 3]; 2]> {
    let mut rows = [[0u32; 3]; 2];
    let mut remaining = input;
    for row in rows.iter_mut() {
        for slot in row.iter_mut() {
            let (rest, val) = le_u32(remaining)?;
            *slot = val;
            remaining = rest;
        }
    }
    Ok((remaining, rows))
}

/// ipt\[13\] and ipt\[14\] live after the 400th constant name when the file
/// defines more than 400 constants (DE440 and later).
fn read_ipt_13_14(
    file: &mut BufReader<File>,
    ncon: u32,
) -> Result<Option<[[u32; 3]; 2]>, SkyposError> {
    if ncon <= 400 {
        return Ok(None);
    }

    const START_401TH_CONSTANT_NAME: u64 = 2856;
    let offset = START_401TH_CONSTANT_NAME + (ncon as u64 - 400) * 6;

    file.seek(std::io::SeekFrom::Start(offset))?;
    let mut buffer = [0u8; 24];
    file.read_exact(&mut buffer)?;

    let (_, rows) = parse_ipt_13_14(&buffer)
        .map_err(|_| SkyposError::EphemerisCorrupt("unreadable ipt[13..15] rows".into()))?;

    Ok(Some(rows))
}

/// Header of a development-ephemeris file, as needed for interpolation.
#[derive(Debug, PartialEq)]
pub struct DeHeader {
    /// DE release number (e.g. 440)
    pub numde: u32,
    pub ipt: Ipt,
    /// First JD covered by the file
    pub start_jd: f64,
    /// Last JD covered by the file
    pub end_jd: f64,
    /// Length of one data block in days
    pub step_days: f64,
    /// Astronomical unit in km, as recorded in the file
    pub au_km: f64,
    /// Earth/Moon mass ratio, as recorded in the file
    pub earth_moon_mass_ratio: f64,
    pub recsize: usize,
}

/// A fully parsed development-ephemeris file.
///
/// `records[block][body][sub]` holds the Chebyshev records of body slot
/// `body` (0-10) over sub-interval `sub` of data block `block`.
#[derive(Debug)]
pub struct DeFile {
    pub header: DeHeader,
    records: Vec<Vec<Vec<DeRecord>>>,
}

impl DeFile {
    /// Parse a development-ephemeris file from disk.
    ///
    /// Return
    /// ------
    /// * The parsed file, [`SkyposError::DatasetNotFound`] if the path does
    ///   not exist, or [`SkyposError::EphemerisCorrupt`] if the layout does
    ///   not match the header.
    pub fn load(path: &Utf8Path) -> Result<Self, SkyposError> {
        let file = File::open(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                SkyposError::DatasetNotFound(path.to_string())
            } else {
                SkyposError::IoError(e)
            }
        })?;
        let mut file = BufReader::new(file);

        let mut head = vec![0u8; 1 << 12];
        file.read_exact(&mut head).map_err(|_| {
            SkyposError::EphemerisCorrupt(format!("{path}: shorter than one header record"))
        })?;

        let corrupt = |what: &str| SkyposError::EphemerisCorrupt(format!("{path}: {what}"));

        let (input, _ttl) = count(parse_char6, 14 * 3)
            .parse(head.as_slice())
            .map_err(|_| corrupt("unreadable TTL titles"))?;
        let (input, _cnam) = count(parse_char6, 400)
            .parse(input)
            .map_err(|_| corrupt("unreadable CNAM names"))?;

        let (input, ss) = count(le_f64::<_, nom::error::Error<_>>, 3)
            .parse(input)
            .map_err(|_| corrupt("unreadable SS epochs"))?;
        let (input, ncon) =
            le_i32::<_, nom::error::Error<_>>(input).map_err(|_| corrupt("unreadable NCON"))?;
        let (input, au_km) =
            le_f64::<_, nom::error::Error<_>>(input).map_err(|_| corrupt("unreadable AU"))?;
        let (_, earth_moon_mass_ratio) = le_f64::<_, nom::error::Error<_>>(input)
            .map_err(|_| corrupt("unreadable Earth-Moon mass ratio"))?;

        if !(ss[0] < ss[1] && ss[2] > 0.0) {
            return Err(corrupt("inconsistent SS epochs"));
        }

        const IPT_OFFSET: u64 = 2696;
        file.seek(std::io::SeekFrom::Start(IPT_OFFSET))?;
        let mut buffer = [0u8; 204];
        file.read_exact(&mut buffer)
            .map_err(|_| corrupt("truncated IPT region"))?;

        let (_, (mut ipt, numde)) =
            parse_ipt(&buffer).map_err(|_| corrupt("unreadable IPT table"))?;

        if let Some(extra) = read_ipt_13_14(&mut file, ncon as u32)? {
            ipt[13] = extra[0];
            ipt[14] = extra[1];
        }

        let recsize = compute_recsize(&ipt);
        let n_doubles = recsize / 8;

        let records = Self::parse_all_blocks(&mut file, path, recsize, n_doubles, &ipt)?;

        // A span shorter than half a step rounds to zero expected blocks, so
        // an emptied file would otherwise pass the count check below and
        // leave every later query with nothing to index.
        if records.is_empty() {
            return Err(corrupt("no data blocks after the two header records"));
        }

        let expected_blocks = ((ss[1] - ss[0]) / ss[2]).round() as usize;
        if records.len() < expected_blocks {
            return Err(corrupt(&format!(
                "{} data blocks found, header announces {expected_blocks}",
                records.len()
            )));
        }

        Ok(DeFile {
            header: DeHeader {
                numde,
                ipt,
                start_jd: ss[0],
                end_jd: ss[1],
                step_days: ss[2],
                au_km,
                earth_moon_mass_ratio,
                recsize,
            },
            records,
        })
    }

    fn parse_all_blocks(
        file: &mut BufReader<File>,
        path: &Utf8Path,
        recsize: usize,
        n_doubles: usize,
        ipt: &Ipt,
    ) -> Result<Vec<Vec<Vec<DeRecord>>>, SkyposError> {
        // The first two records hold the text header and the constants.
        file.seek(std::io::SeekFrom::Start(2 * recsize as u64))?;

        let mut buffer = Vec::new();
        file.read_to_end(&mut buffer)?;

        let n_blocks = buffer.len() / recsize;
        let mut blocks = Vec::with_capacity(n_blocks);

        for i in 0..n_blocks {
            let slice = &buffer[i * recsize..(i + 1) * recsize];
            let (_, block) = count(le_f64::<_, nom::error::Error<_>>, n_doubles)
                .parse(slice)
                .map_err(|_| {
                    SkyposError::EphemerisCorrupt(format!("{path}: unreadable data block {i}"))
                })?;

            let mut per_body = Vec::with_capacity(POSITION_SLOTS);
            for body in 0..POSITION_SLOTS {
                let [offset, n_coeffs, n_subs] = ipt[body];
                let mut subs = Vec::with_capacity(n_subs as usize);
                for sub in 0..n_subs as usize {
                    let rec = DeRecord::from_block(
                        &block,
                        offset as usize,
                        n_coeffs as usize,
                        sub,
                    )
                    .ok_or_else(|| {
                        SkyposError::EphemerisCorrupt(format!(
                            "{path}: block {i} too short for body slot {body}"
                        ))
                    })?;
                    subs.push(rec);
                }
                per_body.push(subs);
            }
            blocks.push(per_body);
        }

        Ok(blocks)
    }

    /// Locate the Chebyshev record of a body slot covering a given instant.
    ///
    /// Arguments
    /// ---------
    /// * `body`: body slot in the IPT table (0-10)
    /// * `et_jd`: Julian Date, TDB scale
    ///
    /// Return
    /// ------
    /// * The record and the normalized time in \[0, 1\] within it, or
    ///   [`SkyposError::EphemerisOutOfRange`] when the file does not cover
    ///   the instant.
    pub fn get_record(&self, body: usize, et_jd: f64) -> Result<(&DeRecord, f64), SkyposError> {
        let (start, end, step) = (
            self.header.start_jd,
            self.header.end_jd,
            self.header.step_days,
        );
        if et_jd < start || et_jd > end {
            return Err(SkyposError::EphemerisOutOfRange {
                jd: et_jd,
                start,
                end,
            });
        }

        let mut nr = ((et_jd - start) / step).floor() as usize;
        if nr >= self.records.len() {
            // Exactly at the final epoch: use the last block.
            nr = self.records.len() - 1;
        }

        let interval_start = start + nr as f64 * step;
        let tau = (et_jd - interval_start) / step;

        let n_subs = self.header.ipt[body][2] as usize;
        if n_subs == 0 {
            return Err(SkyposError::EphemerisCorrupt(format!(
                "body slot {body} has no coefficients in this file"
            )));
        }

        let sub_index = ((tau * n_subs as f64).floor() as usize).min(n_subs - 1);
        let local_tau = tau * n_subs as f64 - sub_index as f64;

        Ok((&self.records[nr][body][sub_index], local_tau))
    }
}
