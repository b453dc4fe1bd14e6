//! Per-sample alignment sources queried for depth and breakpoint clip evidence
//!

use std::collections::HashSet;
use std::fmt;

use camino::{Utf8Path, Utf8PathBuf};
use log::{debug, info};
use rust_htslib::bam::{self, Read, record::Cigar};
use rust_vc_utils::bam_utils::cigar::{get_cigar_ref_offset, get_clip_sizes};
use rust_vc_utils::{filter_out_alignment_flags, get_sample_name};
use simple_error::{SimpleResult, map_err_with};

/// The subset of an alignment record used for depth and clip evidence
///
#[derive(Clone)]
pub struct AlignmentRecord {
    /// Zero-indexed reference position of the left-most aligned base
    pub pos: i64,
    pub cigar: Vec<Cigar>,
    pub flags: u16,
    pub mapq: u8,
}

impl AlignmentRecord {
    pub fn from_bam_record(record: &bam::Record) -> Self {
        Self {
            pos: record.pos(),
            cigar: record.cigar().take().0,
            flags: record.flags(),
            mapq: record.mapq(),
        }
    }

    /// True if the record is unmapped, secondary, supplementary, QC-failed, a duplicate, or has
    /// mapping quality below `min_mapq`
    pub fn filter_out(&self, min_mapq: u32) -> bool {
        filter_out_alignment_flags(self.flags) || (self.mapq as u32) < min_mapq
    }

    /// 1-indexed position of the left-most aligned base
    pub fn alignment_start(&self) -> i64 {
        self.pos + 1
    }

    /// 1-indexed position of the right-most aligned base
    ///
    /// For an alignment which consumes no reference this is one less than `alignment_start`
    ///
    pub fn alignment_end(&self) -> i64 {
        self.pos + get_cigar_ref_offset(&self.cigar)
    }

    /// 1-indexed alignment start extended by any leading soft or hard clip
    pub fn unclipped_start(&self) -> i64 {
        let (left_clip_size, _) = get_clip_sizes(&self.cigar);
        self.alignment_start() - left_clip_size as i64
    }

    /// 1-indexed alignment end extended by any trailing soft or hard clip
    pub fn unclipped_end(&self) -> i64 {
        let (_, right_clip_size) = get_clip_sizes(&self.cigar);
        self.alignment_end() + right_clip_size as i64
    }
}

/// Read access to the alignments of one sample
///
pub trait AlignmentSource {
    fn sample_name(&self) -> &str;

    /// Visit every alignment record overlapping `chrom` over the 1-indexed closed range
    /// `[start, end]`
    ///
    /// A chromosome missing from the alignment file has no overlapping records.
    ///
    fn query(
        &mut self,
        chrom: &str,
        start: i64,
        end: i64,
        visitor: &mut dyn FnMut(&AlignmentRecord),
    ) -> SimpleResult<()>;
}

/// Registration details for one sample's alignment file
///
#[derive(Clone)]
pub struct SampleInfo {
    pub sample_name: String,
    pub bam_filename: Utf8PathBuf,
}

pub struct BamAlignmentSource {
    sample_name: String,
    bam_filename: Utf8PathBuf,
    bam_reader: bam::IndexedReader,
    record: bam::Record,
}

impl BamAlignmentSource {
    pub fn new(
        sample_info: &SampleInfo,
        ref_filename: &Utf8Path,
    ) -> Result<Self, SampleRegistrationError> {
        let bam_reader = open_indexed_bam_reader(&sample_info.bam_filename, ref_filename)?;
        Ok(Self {
            sample_name: sample_info.sample_name.clone(),
            bam_filename: sample_info.bam_filename.clone(),
            bam_reader,
            record: bam::Record::new(),
        })
    }
}

impl AlignmentSource for BamAlignmentSource {
    fn sample_name(&self) -> &str {
        &self.sample_name
    }

    fn query(
        &mut self,
        chrom: &str,
        start: i64,
        end: i64,
        visitor: &mut dyn FnMut(&AlignmentRecord),
    ) -> SimpleResult<()> {
        if self.bam_reader.header().tid(chrom.as_bytes()).is_none() {
            debug!(
                "Chromosome '{chrom}' not found in alignment file '{}'",
                self.bam_filename
            );
            return Ok(());
        }

        map_err_with!(
            self.bam_reader.fetch((chrom, start - 1, end)),
            "Failed to query region {}:{}-{} in alignment file '{}'",
            chrom,
            start,
            end,
            self.bam_filename
        )?;

        while let Some(r) = self.bam_reader.read(&mut self.record) {
            map_err_with!(
                r,
                "Failed to parse alignment record from '{}'",
                self.bam_filename
            )?;
            visitor(&AlignmentRecord::from_bam_record(&self.record));
        }
        Ok(())
    }
}

#[derive(Debug, PartialEq)]
pub enum SampleRegistrationError {
    NoSamples,
    NotFound(String),
    MissingIndex(String),
    DuplicateSampleName(String),
}

impl SampleRegistrationError {
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::NoSamples | Self::NotFound(_) => exitcode::USAGE,
            Self::MissingIndex(_) | Self::DuplicateSampleName(_) => exitcode::DATAERR,
        }
    }
}

impl std::error::Error for SampleRegistrationError {}

impl fmt::Display for SampleRegistrationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoSamples => write!(f, "No alignment files were specified"),
            Self::NotFound(x) => write!(f, "Can't open alignment file: '{x}'"),
            Self::MissingIndex(x) => write!(f, "Alignment file is not indexed: '{x}'"),
            Self::DuplicateSampleName(x) => write!(f, "Sample '{x}' was specified twice"),
        }
    }
}

fn open_indexed_bam_reader(
    bam_filename: &Utf8Path,
    ref_filename: &Utf8Path,
) -> Result<bam::IndexedReader, SampleRegistrationError> {
    if !bam_filename.is_file() {
        return Err(SampleRegistrationError::NotFound(bam_filename.to_string()));
    }
    let mut bam_reader = bam::IndexedReader::from_path(bam_filename)
        .map_err(|_| SampleRegistrationError::MissingIndex(bam_filename.to_string()))?;
    bam_reader
        .set_reference(ref_filename)
        .map_err(|_| SampleRegistrationError::NotFound(ref_filename.to_string()))?;
    Ok(bam_reader)
}

/// Sample name used when the alignment file header has no read group sample
fn get_default_sample_name(bam_filename: &Utf8Path) -> String {
    let filename = bam_filename.file_name().unwrap_or(bam_filename.as_str());
    [".bam", ".cram", ".sam"]
        .iter()
        .find_map(|suffix| filename.strip_suffix(suffix))
        .unwrap_or(filename)
        .to_string()
}

/// Sample names must be unique over all registered alignment files
pub fn check_unique_sample_names<'a>(
    sample_names: impl IntoIterator<Item = &'a str>,
) -> Result<(), SampleRegistrationError> {
    let mut observed = HashSet::new();
    for sample_name in sample_names {
        if !observed.insert(sample_name) {
            return Err(SampleRegistrationError::DuplicateSampleName(
                sample_name.to_string(),
            ));
        }
    }
    Ok(())
}

/// Open each alignment file once to check its index and find its sample name
///
/// Returns sample registration info in the same order as `bam_filenames`
///
pub fn register_samples(
    bam_filenames: &[Utf8PathBuf],
    ref_filename: &Utf8Path,
) -> Result<Vec<SampleInfo>, SampleRegistrationError> {
    if bam_filenames.is_empty() {
        return Err(SampleRegistrationError::NoSamples);
    }

    let mut samples = Vec::new();
    for bam_filename in bam_filenames {
        let bam_reader = open_indexed_bam_reader(bam_filename, ref_filename)?;
        let sample_name = get_sample_name(
            bam_reader.header(),
            &get_default_sample_name(bam_filename),
        );
        info!("Registered sample '{sample_name}' from alignment file '{bam_filename}'");
        samples.push(SampleInfo {
            sample_name,
            bam_filename: bam_filename.clone(),
        });
    }

    check_unique_sample_names(samples.iter().map(|x| x.sample_name.as_str()))?;

    Ok(samples)
}

/// Alignment source backed by an in-memory record list
#[cfg(test)]
#[derive(Clone)]
pub struct TestAlignmentSource {
    pub sample_name: String,
    pub records: Vec<AlignmentRecord>,

    /// Every query fails, as for a truncated alignment file
    pub is_unreadable: bool,
}

#[cfg(test)]
impl AlignmentSource for TestAlignmentSource {
    fn sample_name(&self) -> &str {
        &self.sample_name
    }

    fn query(
        &mut self,
        chrom: &str,
        start: i64,
        end: i64,
        visitor: &mut dyn FnMut(&AlignmentRecord),
    ) -> SimpleResult<()> {
        if self.is_unreadable {
            simple_error::bail!(
                "Failed to query region {chrom}:{start}-{end} for sample '{}'",
                self.sample_name
            );
        }
        for record in self
            .records
            .iter()
            .filter(|x| x.alignment_start() <= end && x.alignment_end() >= start)
        {
            visitor(record);
        }
        Ok(())
    }
}

#[cfg(test)]
pub fn get_test_record(pos: i64, cigar: &str) -> AlignmentRecord {
    AlignmentRecord {
        pos,
        cigar: rust_vc_utils::cigar::get_cigar_from_string(cigar),
        flags: 0,
        mapq: 60,
    }
}
