use std::ops::Range;

use super::ValidateCnvSettings;
use crate::candidate_input::CandidateInterval;

/// Reasons a candidate interval is not validated
#[derive(Clone, Copy, Debug, Eq, PartialEq, strum::Display)]
pub enum CandidateSkipReason {
    TooSmall,
    TooLarge,
    UnknownChrom,
    OutOfBounds,
}

/// Depth analysis window around a candidate interval
///
#[derive(Clone, Debug, PartialEq)]
pub struct CandidateWindow {
    /// 1-indexed position of the first window base
    pub left_pos: i64,

    /// 1-indexed position of the last window base
    pub right_pos: i64,

    /// Range of window offsets covering the candidate interval
    pub mid: Range<usize>,
}

impl CandidateWindow {
    /// Number of bases in the window
    pub fn size(&self) -> usize {
        (self.right_pos - self.left_pos + 1) as usize
    }
}

/// Derive the depth analysis window for a candidate
///
/// The window extends the candidate interval on each side by `1 + floor(extend_factor * len)`,
/// clamped to the chromosome bounds.
///
/// # Arguments
/// * `chrom_length` - Length of the candidate chromosome, or None if the chromosome is not
///   found in the reference
///
pub fn get_candidate_window(
    settings: &ValidateCnvSettings,
    candidate: &CandidateInterval,
    chrom_length: Option<u64>,
) -> Result<CandidateWindow, CandidateSkipReason> {
    let chrom_length = match chrom_length {
        Some(x) => x as i64,
        None => {
            return Err(CandidateSkipReason::UnknownChrom);
        }
    };
    if candidate.start < 1 || candidate.start >= chrom_length {
        return Err(CandidateSkipReason::OutOfBounds);
    }

    let sv_len = candidate.len();
    if sv_len < 1 || sv_len < settings.min_sv_size {
        return Err(CandidateSkipReason::TooSmall);
    }
    if sv_len > settings.max_sv_size {
        return Err(CandidateSkipReason::TooLarge);
    }

    // Extensions past the chromosome length are all clamped to the same window
    let extend = 1 + (sv_len as f64 * settings.extend_factor)
        .floor()
        .min(chrom_length as f64) as i64;
    let left_pos = std::cmp::max(1, candidate.start.saturating_sub(extend));
    let right_pos = std::cmp::min(candidate.end.saturating_add(extend), chrom_length);

    let mid_start = (candidate.start - left_pos) as usize;
    let mid_end = (std::cmp::min(candidate.end, right_pos) - left_pos + 1) as usize;
    Ok(CandidateWindow {
        left_pos,
        right_pos,
        mid: mid_start..mid_end,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn get_candidate(start: i64, end: i64) -> CandidateInterval {
        CandidateInterval {
            chrom: "chr1".to_string(),
            start,
            end,
        }
    }

    #[test]
    fn test_get_candidate_window() {
        let settings = ValidateCnvSettings::default();
        let window =
            get_candidate_window(&settings, &get_candidate(1001, 2000), Some(10000)).unwrap();

        // extend is 1 + 500
        assert_eq!(window.left_pos, 500);
        assert_eq!(window.right_pos, 2501);
        assert_eq!(window.size(), 2002);
        assert_eq!(window.mid, 501..1501);
        assert_eq!(window.mid.len(), 1000);
    }

    #[test]
    fn test_get_candidate_window_clamped() {
        let settings = ValidateCnvSettings::default();

        let window = get_candidate_window(&settings, &get_candidate(101, 300), Some(10000)).unwrap();
        assert_eq!(window.left_pos, 1);
        assert_eq!(window.right_pos, 401);
        assert_eq!(window.mid, 100..300);

        // Interval end past the chromosome end
        let window =
            get_candidate_window(&settings, &get_candidate(9901, 10100), Some(10000)).unwrap();
        assert_eq!(window.right_pos, 10000);
        assert_eq!(window.mid.end, window.size());
    }

    #[test]
    fn test_get_candidate_window_large_extend() {
        let settings = ValidateCnvSettings {
            extend_factor: 1e300,
            ..Default::default()
        };
        let window =
            get_candidate_window(&settings, &get_candidate(1001, 2000), Some(10000)).unwrap();
        assert_eq!(window.left_pos, 1);
        assert_eq!(window.right_pos, 10000);
        assert_eq!(window.size(), 10000);
        assert_eq!(window.mid, 1000..2000);
    }

    #[test]
    fn test_candidate_bounds() {
        let settings = ValidateCnvSettings::default();
        assert_eq!(
            get_candidate_window(&settings, &get_candidate(1001, 2000), None),
            Err(CandidateSkipReason::UnknownChrom)
        );
        assert_eq!(
            get_candidate_window(&settings, &get_candidate(10000, 10100), Some(10000)),
            Err(CandidateSkipReason::OutOfBounds)
        );
    }

    #[test]
    fn test_candidate_size_bounds() {
        let settings = ValidateCnvSettings {
            min_sv_size: 50,
            max_sv_size: 1000,
            ..Default::default()
        };
        let chrom_length = Some(100000);

        assert!(get_candidate_window(&settings, &get_candidate(1001, 1050), chrom_length).is_ok());
        assert_eq!(
            get_candidate_window(&settings, &get_candidate(1001, 1049), chrom_length),
            Err(CandidateSkipReason::TooSmall)
        );
        assert!(get_candidate_window(&settings, &get_candidate(1001, 2000), chrom_length).is_ok());
        assert_eq!(
            get_candidate_window(&settings, &get_candidate(1001, 2001), chrom_length),
            Err(CandidateSkipReason::TooLarge)
        );
        assert_eq!(
            get_candidate_window(&settings, &get_candidate(1001, 1000), chrom_length),
            Err(CandidateSkipReason::TooSmall)
        );
    }
}
