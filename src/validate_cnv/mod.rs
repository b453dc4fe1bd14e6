//! Read-depth genotyping of candidate deletion and duplication intervals
//!

mod variant_summary;
mod window;

pub use variant_summary::{
    AltAllele, VariantFilter, VariantSummary, is_low_clip_support, summarize_candidate,
};
pub use window::{CandidateSkipReason, CandidateWindow, get_candidate_window};

use rust_vc_utils::ChromList;
use simple_error::SimpleResult;

use crate::alignment_source::{AlignmentRecord, AlignmentSource};
use crate::candidate_input::CandidateInterval;
use crate::clip_evidence::is_breakpoint_clip_support;
use crate::coverage::add_record_depth;
use crate::depth_genotype::{DepthGenotype, classify_norm_depth, get_genotype_quality};
use crate::depth_normalization::get_normalized_depth;
use crate::run_median::run_median_into;

/// Parameters controlling candidate validation
///
#[derive(Clone, Debug)]
pub struct ValidateCnvSettings {
    /// Fraction of the candidate length added as flanking sequence on each side of the window
    pub extend_factor: f64,

    pub min_sv_size: i64,
    pub max_sv_size: i64,

    /// Maximum distance between normalized depth and a genotype's theoretical depth
    pub threshold: f64,

    pub min_mapq: u32,

    /// Minimum breakpoint clip support for a sample SV genotype to pass
    pub min_read_support: usize,
}

impl Default for ValidateCnvSettings {
    fn default() -> Self {
        Self {
            extend_factor: 0.5,
            min_sv_size: 50,
            max_sv_size: 1_000_000,
            threshold: 0.05,
            min_mapq: 20,
            min_read_support: 3,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct SampleDepthScore {
    pub genotype: DepthGenotype,

    /// Median normalized depth over the candidate interval
    pub norm_depth: f64,

    /// Genotype quality in [0, 99]
    pub quality: f64,
}

/// Depth genotype of one sample for one candidate
///
#[derive(Clone, Debug)]
pub struct GenotypeCall {
    pub sample_name: String,

    /// None if the flanking depth can't be used to normalize the sample
    pub score: Option<SampleDepthScore>,

    /// Number of reads with clipping near either candidate breakpoint
    pub clip_support: usize,
}

/// Buffers reused across samples and candidates
///
#[derive(Default)]
pub struct DepthScratch {
    raw_depth: Vec<f64>,
    smoothed_depth: Vec<f64>,
    norm_depth: Vec<f64>,
}

/// Result of validating one candidate interval
pub enum CandidateOutcome {
    Skipped(CandidateSkipReason),

    /// Genotype calls in sample order
    Genotyped(Vec<GenotypeCall>),
}

/// Gather raw window depth and breakpoint clip support from one sample
///
/// Depth is written to `raw_depth`, and the clip support count is returned.
///
fn get_sample_evidence(
    settings: &ValidateCnvSettings,
    candidate: &CandidateInterval,
    window: &CandidateWindow,
    source: &mut impl AlignmentSource,
    raw_depth: &mut Vec<f64>,
) -> SimpleResult<usize> {
    raw_depth.clear();
    raw_depth.resize(window.size(), 0.0);

    let mut clip_support = 0;
    source.query(
        &candidate.chrom,
        window.left_pos,
        window.right_pos,
        &mut |record: &AlignmentRecord| {
            if record.cigar.is_empty() || record.filter_out(settings.min_mapq) {
                return;
            }
            add_record_depth(window.left_pos, raw_depth, record);
            if is_breakpoint_clip_support(record, candidate.start, candidate.end) {
                clip_support += 1;
            }
        },
    )?;
    Ok(clip_support)
}

/// Genotype a sample from the raw depth of the candidate window
///
/// Returns None if the sample's flanking depth can't be used for normalization.
///
fn genotype_sample_depth(
    threshold: f64,
    window: &CandidateWindow,
    scratch: &mut DepthScratch,
) -> Option<SampleDepthScore> {
    run_median_into(&scratch.raw_depth, &mut scratch.smoothed_depth);
    let norm_depth = get_normalized_depth(
        &scratch.raw_depth,
        &scratch.smoothed_depth,
        &window.mid,
        &mut scratch.norm_depth,
    )?;
    let genotype = classify_norm_depth(norm_depth, threshold);
    let quality = get_genotype_quality(genotype, norm_depth);
    Some(SampleDepthScore {
        genotype,
        norm_depth,
        quality,
    })
}

/// Genotype every sample over the window of one candidate
///
/// Calls are returned in the order of `sources`. Any failure to read alignments is returned as
/// an error.
///
pub fn genotype_candidate<S: AlignmentSource>(
    settings: &ValidateCnvSettings,
    candidate: &CandidateInterval,
    window: &CandidateWindow,
    sources: &mut [S],
    scratch: &mut DepthScratch,
) -> SimpleResult<Vec<GenotypeCall>> {
    let mut calls = Vec::with_capacity(sources.len());
    for source in sources.iter_mut() {
        let clip_support =
            get_sample_evidence(settings, candidate, window, source, &mut scratch.raw_depth)?;
        let score = genotype_sample_depth(settings.threshold, window, scratch);
        calls.push(GenotypeCall {
            sample_name: source.sample_name().to_string(),
            score,
            clip_support,
        });
    }
    Ok(calls)
}

/// Check candidate bounds and size, then genotype all samples
///
pub fn validate_candidate<S: AlignmentSource>(
    settings: &ValidateCnvSettings,
    chrom_list: &ChromList,
    candidate: &CandidateInterval,
    sources: &mut [S],
    scratch: &mut DepthScratch,
) -> SimpleResult<CandidateOutcome> {
    let chrom_length = chrom_list.get_chrom_length(&candidate.chrom);
    let window = match get_candidate_window(settings, candidate, chrom_length) {
        Ok(x) => x,
        Err(reason) => {
            return Ok(CandidateOutcome::Skipped(reason));
        }
    };
    let calls = genotype_candidate(settings, candidate, &window, sources, scratch)?;
    Ok(CandidateOutcome::Genotyped(calls))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alignment_source::{TestAlignmentSource, get_test_record};
    use approx::assert_ulps_eq;

    const CHROM_LENGTH: u64 = 10000;

    fn get_test_chrom_list() -> ChromList {
        let mut chrom_list = ChromList::default();
        chrom_list.add_chrom("chr1", CHROM_LENGTH);
        chrom_list
    }

    fn get_test_candidate() -> CandidateInterval {
        CandidateInterval {
            chrom: "chr1".to_string(),
            start: 1001,
            end: 2000,
        }
    }

    /// Tile the chromosome with 10 base reads, at `flank_depth` copies outside the test candidate
    /// and `mid_depth` copies inside
    fn get_tiled_records(flank_depth: usize, mid_depth: usize) -> Vec<AlignmentRecord> {
        let candidate = get_test_candidate();
        let mut records = Vec::new();
        for pos in (0..CHROM_LENGTH as i64).step_by(10) {
            let is_mid = pos + 1 >= candidate.start && pos + 10 <= candidate.end;
            let depth = if is_mid { mid_depth } else { flank_depth };
            for _ in 0..depth {
                records.push(get_test_record(pos, "10M"));
            }
        }
        records
    }

    fn get_test_source(name: &str, records: Vec<AlignmentRecord>) -> TestAlignmentSource {
        TestAlignmentSource {
            sample_name: name.to_string(),
            records,
            is_unreadable: false,
        }
    }

    #[test]
    fn test_get_sample_evidence() {
        let settings = ValidateCnvSettings::default();
        let candidate = get_test_candidate();
        let window = get_candidate_window(&settings, &candidate, Some(CHROM_LENGTH)).unwrap();

        let mut low_mapq = get_test_record(1015, "15S85M");
        low_mapq.mapq = 5;
        let mut duplicate = get_test_record(1015, "15S85M");
        duplicate.flags = 1024;
        let mut no_cigar = get_test_record(1100, "10M");
        no_cigar.cigar.clear();

        let mut source = get_test_source(
            "sample1",
            vec![
                get_test_record(1015, "15S85M"),
                get_test_record(1900, "100M20S"),
                get_test_record(1500, "100M"),
                low_mapq,
                duplicate,
                no_cigar,
            ],
        );

        let mut raw_depth = Vec::new();
        let clip_support =
            get_sample_evidence(&settings, &candidate, &window, &mut source, &mut raw_depth)
                .unwrap();
        assert_eq!(clip_support, 2);
        assert_eq!(raw_depth.len(), window.size());
        assert_eq!(raw_depth.iter().sum::<f64>(), 285.0);

        // Depth at 1-indexed position 1016, the first aligned base of the left clipped read
        assert_eq!(raw_depth[(1016 - window.left_pos) as usize], 1.0);
        assert_eq!(raw_depth[(1015 - window.left_pos) as usize], 0.0);
    }

    #[test]
    fn test_flat_depth_is_not_reported() {
        let settings = ValidateCnvSettings::default();
        let candidate = get_test_candidate();
        let mut sources = vec![get_test_source("sample1", get_tiled_records(30, 30))];
        let mut scratch = DepthScratch::default();

        let outcome = validate_candidate(
            &settings,
            &get_test_chrom_list(),
            &candidate,
            &mut sources,
            &mut scratch,
        )
        .unwrap();
        let calls = match outcome {
            CandidateOutcome::Genotyped(x) => x,
            CandidateOutcome::Skipped(_) => panic!("Unexpected candidate skip"),
        };
        assert_eq!(calls.len(), 1);

        let score = calls[0].score.as_ref().unwrap();
        assert_eq!(score.genotype, DepthGenotype::Ref);
        assert_ulps_eq!(score.norm_depth, 1.0);
        assert_eq!(score.quality as i32, 99);

        assert!(summarize_candidate(&candidate, calls).is_none());
    }

    #[test]
    fn test_half_depth_is_het_del() {
        let settings = ValidateCnvSettings::default();
        let candidate = get_test_candidate();
        let mut sources = vec![get_test_source("sample1", get_tiled_records(30, 15))];
        let mut scratch = DepthScratch::default();

        let window = get_candidate_window(&settings, &candidate, Some(CHROM_LENGTH)).unwrap();
        let calls =
            genotype_candidate(&settings, &candidate, &window, &mut sources, &mut scratch).unwrap();

        let score = calls[0].score.as_ref().unwrap();
        assert_eq!(score.genotype, DepthGenotype::HetDel);
        assert_ulps_eq!(score.norm_depth, 0.5);
        assert_eq!(score.quality as i32, 99);
        assert_eq!(calls[0].clip_support, 0);
        assert!(is_low_clip_support(&calls[0], settings.min_read_support));

        let summary = summarize_candidate(&candidate, calls).unwrap();
        assert_eq!(summary.alt_alleles, [AltAllele::Del]);
        assert_eq!(summary.sv_sample_count, 1);
        assert_eq!(summary.quality.map(|x| x as i32), Some(99));
        assert!(summary.is_pass());
    }

    #[test]
    fn test_multi_sample_genotypes() {
        let settings = ValidateCnvSettings::default();
        let candidate = get_test_candidate();
        let mut sources = vec![
            get_test_source("sample1", get_tiled_records(30, 45)),
            get_test_source("sample2", get_tiled_records(0, 20)),
            get_test_source("sample3", get_tiled_records(20, 0)),
        ];
        let mut scratch = DepthScratch::default();

        let window = get_candidate_window(&settings, &candidate, Some(CHROM_LENGTH)).unwrap();
        let calls =
            genotype_candidate(&settings, &candidate, &window, &mut sources, &mut scratch).unwrap();

        assert_eq!(calls[0].sample_name, "sample1");
        assert_eq!(
            calls[0].score.as_ref().map(|x| x.genotype),
            Some(DepthGenotype::HetDup)
        );

        // No flanking depth
        assert!(calls[1].score.is_none());

        assert_eq!(
            calls[2].score.as_ref().map(|x| x.genotype),
            Some(DepthGenotype::HomDel)
        );

        let summary = summarize_candidate(&candidate, calls).unwrap();
        assert_eq!(summary.alt_alleles, [AltAllele::Del, AltAllele::Dup]);
        assert_eq!(summary.filters, [VariantFilter::HomDel]);
    }

    #[test]
    fn test_alignment_read_error_is_fatal() {
        let settings = ValidateCnvSettings::default();
        let candidate = get_test_candidate();
        let mut unreadable = get_test_source("sample2", get_tiled_records(30, 15));
        unreadable.is_unreadable = true;
        let mut sources = vec![
            get_test_source("sample1", get_tiled_records(30, 15)),
            unreadable,
            get_test_source("sample3", get_tiled_records(30, 15)),
        ];
        let mut scratch = DepthScratch::default();

        let window = get_candidate_window(&settings, &candidate, Some(CHROM_LENGTH)).unwrap();
        let result = genotype_candidate(&settings, &candidate, &window, &mut sources, &mut scratch);
        assert!(result.is_err());

        let result = validate_candidate(
            &settings,
            &get_test_chrom_list(),
            &candidate,
            &mut sources,
            &mut scratch,
        );
        let err = match result {
            Ok(_) => panic!("Expected alignment read error"),
            Err(e) => e,
        };
        assert!(err.to_string().contains("sample2"));

        // A skipped candidate never queries the alignments
        let small_candidate = CandidateInterval {
            chrom: "chr1".to_string(),
            start: 1001,
            end: 1010,
        };
        let outcome = validate_candidate(
            &settings,
            &get_test_chrom_list(),
            &small_candidate,
            &mut sources,
            &mut scratch,
        )
        .unwrap();
        assert!(matches!(
            outcome,
            CandidateOutcome::Skipped(CandidateSkipReason::TooSmall)
        ));
    }

    #[test]
    fn test_skipped_candidates() {
        let settings = ValidateCnvSettings::default();
        let chrom_list = get_test_chrom_list();
        let mut sources = vec![get_test_source("sample1", get_tiled_records(30, 30))];
        let mut scratch = DepthScratch::default();

        let candidate = CandidateInterval {
            chrom: "chr2".to_string(),
            start: 1001,
            end: 2000,
        };
        let outcome =
            validate_candidate(&settings, &chrom_list, &candidate, &mut sources, &mut scratch)
                .unwrap();
        assert!(matches!(
            outcome,
            CandidateOutcome::Skipped(CandidateSkipReason::UnknownChrom)
        ));

        let candidate = CandidateInterval {
            chrom: "chr1".to_string(),
            start: 1001,
            end: 1010,
        };
        let outcome =
            validate_candidate(&settings, &chrom_list, &candidate, &mut sources, &mut scratch)
                .unwrap();
        assert!(matches!(
            outcome,
            CandidateOutcome::Skipped(CandidateSkipReason::TooSmall)
        ));
    }
}
