//! > **Miscellaneous utilities for variant calling**
//!
//! A library of simple components needed for reuse between variant callers/bam processing tools.
//!

pub use crate::bam_utils::*;
pub use crate::chrom_list::*;

pub mod bam_utils;
pub mod chrom_list;
