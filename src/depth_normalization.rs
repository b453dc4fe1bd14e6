//! Normalization of smoothed depth against the flanking depth baseline
//!

use std::ops::Range;

use crate::run_median::get_median;

/// Median raw depth over the flanks of the window, excluding the candidate interval `mid`
///
/// Returns None if the flanks are empty or their median depth is zero, in which case the sample
/// can't be genotyped.
///
/// `flank` is a scratch buffer used to gather the flanking values.
///
pub fn get_flank_median_depth(
    raw_depth: &[f64],
    mid: &Range<usize>,
    flank: &mut Vec<f64>,
) -> Option<f64> {
    flank.clear();
    flank.extend_from_slice(&raw_depth[..mid.start]);
    flank.extend_from_slice(&raw_depth[mid.end..]);
    get_median(flank).filter(|&x| x > 0.0)
}

/// Normalized depth of the candidate interval
///
/// The smoothed depth is divided by the flank median of the raw depth, and the median of the
/// normalized values over the candidate interval `mid` is returned. Returns None if the
/// flank median is unavailable or zero.
///
/// `scratch` is reused to hold intermediate values.
///
pub fn get_normalized_depth(
    raw_depth: &[f64],
    smoothed_depth: &[f64],
    mid: &Range<usize>,
    scratch: &mut Vec<f64>,
) -> Option<f64> {
    assert_eq!(raw_depth.len(), smoothed_depth.len());
    let flank_median = get_flank_median_depth(raw_depth, mid, scratch)?;

    scratch.clear();
    scratch.extend(smoothed_depth[mid.clone()].iter().map(|x| x / flank_median));
    get_median(scratch)
}
