use nalgebra::Vector3;

/// Chebyshev coefficients of one body over a single sub-interval of a
/// development-ephemeris data block.
///
/// The interval runs from `start_jd` to `end_jd` (Julian Dates, TDB) divided
/// by the number of sub-intervals recorded in the file header; `x`, `y`, `z`
/// hold one coefficient series per spatial component, in km.
#[derive(Debug, PartialEq, Clone)]
pub struct DeRecord {
    pub start_jd: f64,
    pub end_jd: f64,
    pub x: Vec<f64>,
    pub y: Vec<f64>,
    pub z: Vec<f64>,
}

impl DeRecord {
    /// Extract one sub-interval record from the raw doubles of a data block.
    ///
    /// Arguments
    /// ---------
    /// * `block`: one full data record, `[jd_start, jd_end, coefficients...]`
    /// * `offset`: 1-based index of the body's first coefficient in the block
    /// * `n_coeffs`: Chebyshev coefficients per component
    /// * `sub`: sub-interval index within the block
    ///
    /// Return
    /// ------
    /// * The record, or `None` if the block is too short for the header's
    ///   layout (a corrupt file).
    pub fn from_block(block: &[f64], offset: usize, n_coeffs: usize, sub: usize) -> Option<Self> {
        let jd_start = *block.first()?;
        let jd_end = *block.get(1)?;
        let coeffs = &block[2..];

        // The offset counts doubles from the start of the block, 1-based,
        // jd_start/jd_end included.
        let base = offset.checked_sub(3)? + sub * n_coeffs * 3;

        let component = |k: usize| -> Option<Vec<f64>> {
            let lo = base + k * n_coeffs;
            coeffs.get(lo..lo + n_coeffs).map(|s| s.to_vec())
        };

        Some(DeRecord {
            start_jd: jd_start,
            end_jd: jd_end,
            x: component(0)?,
            y: component(1)?,
            z: component(2)?,
        })
    }

    /// Evaluate the Chebyshev series at a normalized time within this
    /// sub-interval.
    ///
    /// Arguments
    /// ---------
    /// * `local_tau`: normalized time in \[0, 1\] over the sub-interval
    ///
    /// Return
    /// ------
    /// * Position vector in km, in the frame of the parent ephemeris (ICRF).
    pub fn position_at(&self, local_tau: f64) -> Vector3<f64> {
        let n_coeff = self.x.len();
        let tc = 2.0 * local_tau - 1.0;

        let mut tcheb = vec![0.0; n_coeff];
        tcheb[0] = 1.0;
        if n_coeff > 1 {
            tcheb[1] = tc;
            let twot = tc + tc;
            for i in 2..n_coeff {
                tcheb[i] = twot * tcheb[i - 1] - tcheb[i - 2];
            }
        }

        let eval = |coeffs: &[f64]| -> f64 {
            coeffs.iter().zip(tcheb.iter()).map(|(c, b)| c * b).sum()
        };

        Vector3::new(eval(&self.x), eval(&self.y), eval(&self.z))
    }
}

#[cfg(test)]
mod de_record_test {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn linear_record() -> DeRecord {
        // f(tc) = c0 + c1·tc with tc = 2·tau − 1
        DeRecord {
            start_jd: 2451536.5,
            end_jd: 2451568.5,
            x: vec![10.0, 2.0],
            y: vec![-4.0, 1.0],
            z: vec![0.5, 0.0],
        }
    }

    #[test]
    fn test_chebyshev_endpoints() {
        let rec = linear_record();
        let p0 = rec.position_at(0.0); // tc = -1
        let p1 = rec.position_at(1.0); // tc = +1
        assert_abs_diff_eq!(p0.x, 8.0);
        assert_abs_diff_eq!(p1.x, 12.0);
        assert_abs_diff_eq!(p0.y, -5.0);
        assert_abs_diff_eq!(p1.y, -3.0);
        assert_abs_diff_eq!(p0.z, 0.5);
        assert_abs_diff_eq!(p1.z, 0.5);
    }

    #[test]
    fn test_chebyshev_midpoint() {
        // tau = 0.5 → tc = 0: every odd polynomial vanishes, T2(0) = -1.
        let rec = DeRecord {
            start_jd: 0.0,
            end_jd: 1.0,
            x: vec![3.0, 7.0, 2.0],
            y: vec![0.0; 3],
            z: vec![0.0; 3],
        };
        let p = rec.position_at(0.5);
        assert_abs_diff_eq!(p.x, 3.0 - 2.0);
    }

    #[test]
    fn test_from_block_layout() {
        // Block: [jd0, jd1, then body at 1-based offset 3, 2 coeffs, 1 sub]
        let block = [100.0, 132.0, 1.0, 2.0, 3.0, 4.0, 5.0, 6.0];
        let rec = DeRecord::from_block(&block, 3, 2, 0).unwrap();
        assert_eq!(rec.x, vec![1.0, 2.0]);
        assert_eq!(rec.y, vec![3.0, 4.0]);
        assert_eq!(rec.z, vec![5.0, 6.0]);
        assert_eq!(rec.start_jd, 100.0);
        assert_eq!(rec.end_jd, 132.0);
    }

    #[test]
    fn test_from_block_out_of_bounds() {
        let block = [100.0, 132.0, 1.0, 2.0];
        assert!(DeRecord::from_block(&block, 3, 2, 1).is_none());
    }
}
