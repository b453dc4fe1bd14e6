pub use bam_record_utils::*;
pub use util::*;

pub mod bam_record_utils;
pub mod cigar;
pub mod util;
