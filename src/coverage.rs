//! Per-base read depth over a candidate window
//!

use rust_vc_utils::cigar::{get_cigarseg_ref_offset, is_alignment_match};

use crate::alignment_source::AlignmentRecord;

/// Add the aligned bases of `record` to the per-base depth array `depth`
///
/// `depth[i]` counts the records aligned to 1-indexed position `left_pos + i`. Only cigar
/// segments consuming both read and reference (M/=/X) add depth, so deletions and reference
/// skips leave a gap in the depth contributed by the record. Positions outside the array are
/// ignored.
///
pub fn add_record_depth(left_pos: i64, depth: &mut [f64], record: &AlignmentRecord) {
    let depth_size = depth.len() as i64;
    let mut ref_pos = record.alignment_start();
    for c in record.cigar.iter() {
        let ref_len = get_cigarseg_ref_offset(c);
        if ref_len == 0 {
            continue;
        }
        if is_alignment_match(c) {
            let begin = (ref_pos - left_pos).clamp(0, depth_size);
            let end = (ref_pos + ref_len - left_pos).clamp(0, depth_size);
            for d in depth[begin as usize..end as usize].iter_mut() {
                *d += 1.0;
            }
        }
        ref_pos += ref_len;
    }
}
