//! BAM record cigar-processing utilities
//!

use rust_htslib::bam::record::{self, Cigar};

/// Is the cigar element any clip type?
///
pub fn is_clip(c: &Cigar) -> bool {
    matches!(c, Cigar::SoftClip(_) | Cigar::HardClip(_))
}

/// Is the cigar element any of the alignment match types?
///
pub fn is_alignment_match(c: &Cigar) -> bool {
    matches!(c, Cigar::Match(_) | Cigar::Equal(_) | Cigar::Diff(_))
}

pub fn get_cigarseg_ref_offset(c: &Cigar) -> i64 {
    use Cigar::*;
    match c {
        Del(len) | RefSkip(len) | Diff(len) | Equal(len) | Match(len) => *len as i64,
        _ => 0,
    }
}

/// A utility method to track ref positions while iterating through a cigar string
pub fn update_ref_pos(c: &Cigar, ref_pos: &mut i64) {
    *ref_pos += get_cigarseg_ref_offset(c);
}

/// Report the reference offset of the cigar alignment
///
pub fn get_cigar_ref_offset(cigar: &[Cigar]) -> i64 {
    let mut ref_pos = 0;
    for c in cigar.iter() {
        update_ref_pos(c, &mut ref_pos);
    }
    ref_pos
}

/// Report the total size of the soft and hard clipping on the left and right ends of the alignment
///
/// Returns a 2-tuple of (left clip size, right clip size)
///
pub fn get_clip_sizes(cigar: &[Cigar]) -> (usize, usize) {
    let clip_len = |c: &Cigar| match c {
        Cigar::SoftClip(len) | Cigar::HardClip(len) => Some(*len as usize),
        _ => None,
    };
    let left_clip_size = cigar.iter().map_while(clip_len).sum::<usize>();

    // An all-clip cigar is attributed entirely to the left side
    let right_clip_size = if left_clip_size > 0 && cigar.iter().all(is_clip) {
        0
    } else {
        cigar.iter().rev().map_while(clip_len).sum::<usize>()
    };
    (left_clip_size, right_clip_size)
}

/// Return true if the first cigar element is any clip type
pub fn is_left_clipped(cigar: &[Cigar]) -> bool {
    cigar.first().is_some_and(is_clip)
}

/// Return true if the last cigar element is any clip type
pub fn is_right_clipped(cigar: &[Cigar]) -> bool {
    cigar.last().is_some_and(is_clip)
}

/// Convert CIGAR in string format into the format used in the this library
///
/// This is a convenience function so that client code doesn't need to add their own (potentially
/// conflicting) rust-htslib dependency
///
pub fn get_cigar_from_string(cigar_str: &str) -> Vec<Cigar> {
    record::CigarString::try_from(cigar_str.as_bytes())
        .unwrap()
        .into()
}
