//! Track stats for the whole validation run
//!

use std::fs::File;

use camino::Utf8Path;
use log::info;
use serde::{Deserialize, Serialize};
use thousands::Separable;
use unwrap::unwrap;

use crate::depth_genotype::DepthGenotype;
use crate::validate_cnv::{CandidateSkipReason, GenotypeCall, is_low_clip_support};

#[derive(Default, Deserialize, Serialize)]
pub struct CandidateStats {
    /// All candidate records read from the input
    pub candidate_input_count: usize,

    /// VCF records which are not simple deletions, duplications or insertions
    pub unsupported_type_count: usize,

    /// Candidates on chromosomes missing from the reference, or starting past the chromosome end
    pub out_of_bounds_count: usize,

    pub too_small_count: usize,
    pub too_large_count: usize,

    /// Genotyped candidates without any deletion or duplication sample genotype
    pub no_alt_allele_count: usize,

    pub vcf_output_record_count: usize,
}

impl CandidateStats {
    pub fn add_skip(&mut self, reason: CandidateSkipReason) {
        match reason {
            CandidateSkipReason::TooSmall => self.too_small_count += 1,
            CandidateSkipReason::TooLarge => self.too_large_count += 1,
            CandidateSkipReason::UnknownChrom | CandidateSkipReason::OutOfBounds => {
                self.out_of_bounds_count += 1
            }
        }
    }
}

/// Counts of sample genotypes over all genotyped candidates
#[derive(Default, Deserialize, Serialize)]
pub struct GenotypeStats {
    pub ref_count: usize,
    pub het_del_count: usize,
    pub hom_del_count: usize,
    pub het_dup_count: usize,
    pub ambiguous_count: usize,

    /// Samples which could not be normalized against their flanking depth
    pub no_call_count: usize,

    /// SV sample genotypes filtered for low breakpoint clip support
    pub low_clip_support_count: usize,
}

impl GenotypeStats {
    pub fn add_calls(&mut self, calls: &[GenotypeCall], min_read_support: usize) {
        for call in calls {
            let score = match &call.score {
                Some(x) => x,
                None => {
                    self.no_call_count += 1;
                    continue;
                }
            };
            match score.genotype {
                DepthGenotype::Ref => self.ref_count += 1,
                DepthGenotype::HetDel => self.het_del_count += 1,
                DepthGenotype::HomDel => self.hom_del_count += 1,
                DepthGenotype::HetDup => self.het_dup_count += 1,
                DepthGenotype::Ambiguous => self.ambiguous_count += 1,
            }
            if is_low_clip_support(call, min_read_support) {
                self.low_clip_support_count += 1;
            }
        }
    }
}

#[derive(Default, Deserialize, Serialize)]
pub struct ValidateRunStats {
    pub candidate_stats: CandidateStats,
    pub genotype_stats: GenotypeStats,
    pub total_validation_time_secs: f64,
}

impl ValidateRunStats {
    pub fn log_summary(&self) {
        let cs = &self.candidate_stats;
        info!(
            "Read {} candidate records, validated {} and wrote {} to the output VCF",
            cs.candidate_input_count.separate_with_commas(),
            (cs.no_alt_allele_count + cs.vcf_output_record_count).separate_with_commas(),
            cs.vcf_output_record_count.separate_with_commas(),
        );
        info!(
            "Skipped candidates: unsupported type {}, out of bounds {}, too small {}, too large {}",
            cs.unsupported_type_count.separate_with_commas(),
            cs.out_of_bounds_count.separate_with_commas(),
            cs.too_small_count.separate_with_commas(),
            cs.too_large_count.separate_with_commas(),
        );

        let gs = &self.genotype_stats;
        info!(
            "Sample genotypes: REF {} HET_DEL {} HOM_DEL {} HET_DUP {} AMBIGUOUS {} no-call {}",
            gs.ref_count.separate_with_commas(),
            gs.het_del_count.separate_with_commas(),
            gs.hom_del_count.separate_with_commas(),
            gs.het_dup_count.separate_with_commas(),
            gs.ambiguous_count.separate_with_commas(),
            gs.no_call_count.separate_with_commas(),
        );
    }
}

/// Write run_stats structure out in json format
pub fn write_validate_run_stats(filename: &Utf8Path, run_stats: &ValidateRunStats) {
    info!("Writing run statistics to file: '{filename}'");

    let f = unwrap!(
        File::create(filename),
        "Unable to create run statistics json file: '{}'",
        filename
    );

    unwrap!(
        serde_json::to_writer_pretty(&f, &run_stats),
        "Unable to write run statistics json file: '{}'",
        filename
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validate_cnv::SampleDepthScore;

    fn get_call(genotype: Option<DepthGenotype>, clip_support: usize) -> GenotypeCall {
        GenotypeCall {
            sample_name: "sample".to_string(),
            score: genotype.map(|genotype| SampleDepthScore {
                genotype,
                norm_depth: genotype.theoretical_depth(),
                quality: 99.0,
            }),
            clip_support,
        }
    }

    #[test]
    fn test_add_calls() {
        let mut stats = GenotypeStats::default();
        stats.add_calls(
            &[
                get_call(Some(DepthGenotype::Ref), 0),
                get_call(Some(DepthGenotype::HetDel), 5),
                get_call(Some(DepthGenotype::HetDel), 1),
                get_call(Some(DepthGenotype::Ambiguous), 0),
                get_call(None, 0),
            ],
            3,
        );
        assert_eq!(stats.ref_count, 1);
        assert_eq!(stats.het_del_count, 2);
        assert_eq!(stats.ambiguous_count, 1);
        assert_eq!(stats.no_call_count, 1);
        assert_eq!(stats.low_clip_support_count, 1);
    }

    #[test]
    fn test_add_skip() {
        let mut stats = CandidateStats::default();
        stats.add_skip(CandidateSkipReason::TooSmall);
        stats.add_skip(CandidateSkipReason::UnknownChrom);
        stats.add_skip(CandidateSkipReason::OutOfBounds);
        assert_eq!(stats.too_small_count, 1);
        assert_eq!(stats.too_large_count, 0);
        assert_eq!(stats.out_of_bounds_count, 2);
    }

    #[test]
    fn test_write_validate_run_stats() {
        let dir = tempfile::tempdir().unwrap();
        let filename = Utf8Path::from_path(dir.path()).unwrap().join("stats.json");

        let mut run_stats = ValidateRunStats::default();
        run_stats.candidate_stats.vcf_output_record_count = 7;
        write_validate_run_stats(&filename, &run_stats);

        let json = std::fs::read_to_string(&filename).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["candidate_stats"]["vcf_output_record_count"], 7);
    }
}
