//! Miscelanious BAM-related utilities that don't fit any other modules
//!
use rust_htslib::bam;

/// Extract sample name from bam header
///
/// This uses the sample name from the first read group found in the header, and does not
/// check for additional read groups. If no read group is found, or the read group sample name
/// is blank, `default_name` will be used.
///
pub fn get_sample_name(header: &bam::HeaderView, default_name: &str) -> String {
    let header_text = String::from_utf8_lossy(header.as_bytes());
    for line in header_text.split('\n') {
        for (i, word) in line.split('\t').enumerate() {
            if i == 0 {
                if word != "@RG" {
                    break;
                }
            } else if let Some(sample_name) = word.strip_prefix("SM:")
                && !sample_name.trim().is_empty()
            {
                return sample_name.to_string();
            }
        }
    }
    default_name.to_string()
}
