//! Miscelanious BAM record processing utilities
//!
use rust_htslib::htslib;

/// Check if the alignment flags mark a record which should be filtered from depth and breakpoint
/// evidence
///
/// Unmapped, secondary, supplementary, QC-failed and duplicate records are all filtered.
///
pub fn filter_out_alignment_flags(flags: u16) -> bool {
    static FLAG_FILTER: u32 = htslib::BAM_FUNMAP
        | htslib::BAM_FSECONDARY
        | htslib::BAM_FSUPPLEMENTARY
        | htslib::BAM_FQCFAIL
        | htslib::BAM_FDUP;

    ((flags as u32) & FLAG_FILTER) != 0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_out_alignment_flags() {
        // Mapped, paired and reverse strand reads are kept
        assert!(!filter_out_alignment_flags(0));
        assert!(!filter_out_alignment_flags(0x1 | 0x2 | 0x10));

        // Unmapped
        assert!(filter_out_alignment_flags(0x4));
        // Secondary
        assert!(filter_out_alignment_flags(0x100));
        // QC fail
        assert!(filter_out_alignment_flags(0x200));
        // Duplicate
        assert!(filter_out_alignment_flags(0x400 | 0x1));
        // Supplementary
        assert!(filter_out_alignment_flags(0x800));
    }
}
