//! Detection of clipped reads supporting a candidate's breakpoints
//!

use rust_vc_utils::cigar::{is_left_clipped, is_right_clipped};

use crate::alignment_source::AlignmentRecord;

/// Maximum distance in bases between a read clip and the breakpoint it supports
pub const BREAKPOINT_DISTANCE: i64 = 10;

/// True if the closed ranges `[a_start, a_end]` and `[b_start, b_end]` intersect
fn is_overlapping(a_start: i64, a_end: i64, b_start: i64, b_end: i64) -> bool {
    a_start <= b_end && b_start <= a_end
}

fn is_near_breakpoint(start: i64, end: i64, breakpoint: i64) -> bool {
    is_overlapping(
        start,
        end,
        breakpoint - BREAKPOINT_DISTANCE,
        breakpoint + BREAKPOINT_DISTANCE,
    )
}

/// True if the clipped left end of the record lies near the left breakpoint
pub fn is_left_breakpoint_clip(record: &AlignmentRecord, left_breakpoint: i64) -> bool {
    if !is_left_clipped(&record.cigar) {
        return false;
    }
    let unclipped_start = record.unclipped_start();
    let alignment_start = record.alignment_start();
    unclipped_start < alignment_start
        && is_near_breakpoint(unclipped_start, alignment_start, left_breakpoint)
}

/// True if the clipped right end of the record lies near the right breakpoint
pub fn is_right_breakpoint_clip(record: &AlignmentRecord, right_breakpoint: i64) -> bool {
    if !is_right_clipped(&record.cigar) {
        return false;
    }
    let alignment_end = record.alignment_end();
    let unclipped_end = record.unclipped_end();
    alignment_end < unclipped_end
        && is_near_breakpoint(alignment_end, unclipped_end, right_breakpoint)
}

/// True if the record's clipping supports either breakpoint of the 1-indexed candidate interval
/// `[left_breakpoint, right_breakpoint]`
///
/// A record supports at most one breakpoint, the left breakpoint is checked first.
///
pub fn is_breakpoint_clip_support(
    record: &AlignmentRecord,
    left_breakpoint: i64,
    right_breakpoint: i64,
) -> bool {
    is_left_breakpoint_clip(record, left_breakpoint)
        || is_right_breakpoint_clip(record, right_breakpoint)
}
