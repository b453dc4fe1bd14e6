use strum::{EnumCount, IntoEnumIterator};

use super::GenotypeCall;
use crate::candidate_input::CandidateInterval;
use crate::depth_genotype::DepthGenotype;

/// Alternate alleles reported for a validated candidate, in output order
#[derive(Clone, Copy, Debug, Eq, PartialEq, strum::Display, strum::EnumCount, strum::EnumIter)]
#[strum(serialize_all = "UPPERCASE")]
pub enum AltAllele {
    Del,
    Dup,
}

impl AltAllele {
    /// Alternate allele implied by a sample genotype, if any
    pub fn from_genotype(genotype: DepthGenotype) -> Option<Self> {
        if genotype.is_deletion() {
            Some(Self::Del)
        } else if genotype.is_duplication() {
            Some(Self::Dup)
        } else {
            None
        }
    }
}

/// Variant-level filters
#[derive(Clone, Copy, Debug, Eq, PartialEq, strum::Display, strum::EnumIter)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum VariantFilter {
    /// More than one sample, and all are deletions
    AllDel,

    /// More than one sample, and all are duplications
    AllDup,

    /// No sample has a deletion or duplication
    NoSv,

    /// At least one sample has a homozygous deletion
    HomDel,
}

impl VariantFilter {
    pub fn description(&self) -> &'static str {
        match self {
            Self::AllDel => "Number of samples greater than 1 and all are deletions",
            Self::AllDup => "Number of samples greater than 1 and all are duplications",
            Self::NoSv => "There is no DUP or DEL in this variant",
            Self::HomDel => "There is at least one homozygous deletion",
        }
    }
}

/// Summary of all sample genotypes for one candidate interval
///
pub struct VariantSummary {
    pub candidate: CandidateInterval,

    /// Observed alternate alleles in output order
    pub alt_alleles: Vec<AltAllele>,

    /// Genotype calls in sample registration order
    pub calls: Vec<GenotypeCall>,

    /// Number of samples genotyped as deletion or duplication
    pub sv_sample_count: usize,
    pub del_sample_count: usize,
    pub dup_sample_count: usize,

    /// Lowest genotype quality among called samples
    pub quality: Option<f64>,

    pub filters: Vec<VariantFilter>,
}

impl VariantSummary {
    pub fn is_pass(&self) -> bool {
        self.filters.is_empty()
    }

    /// Index of the alternate allele in the output allele list, where the reference allele is 0
    pub fn allele_index(&self, allele: AltAllele) -> Option<usize> {
        self.alt_alleles
            .iter()
            .position(|x| *x == allele)
            .map(|x| x + 1)
    }
}

/// Aggregate sample genotype calls for a candidate into a variant summary
///
/// Returns None if no sample supports an alternate allele.
///
pub fn summarize_candidate(
    candidate: &CandidateInterval,
    calls: Vec<GenotypeCall>,
) -> Option<VariantSummary> {
    let mut allele_observed = [false; AltAllele::COUNT];
    let mut sv_sample_count = 0;
    let mut del_sample_count = 0;
    let mut dup_sample_count = 0;
    let mut is_hom_del = false;
    let mut quality: Option<f64> = None;

    for score in calls.iter().filter_map(|x| x.score.as_ref()) {
        let genotype = score.genotype;
        if let Some(allele) = AltAllele::from_genotype(genotype) {
            allele_observed[allele as usize] = true;
        }
        if genotype.is_sv() {
            sv_sample_count += 1;
        }
        if genotype.is_deletion() {
            del_sample_count += 1;
        }
        if genotype.is_duplication() {
            dup_sample_count += 1;
        }
        if genotype == DepthGenotype::HomDel {
            is_hom_del = true;
        }
        quality = Some(match quality {
            Some(x) => x.min(score.quality),
            None => score.quality,
        });
    }

    let alt_alleles = AltAllele::iter()
        .filter(|x| allele_observed[*x as usize])
        .collect::<Vec<_>>();
    if alt_alleles.is_empty() {
        return None;
    }

    let sample_count = calls.len();
    let mut filters = Vec::new();
    if sample_count > 1 && del_sample_count == sample_count {
        filters.push(VariantFilter::AllDel);
    }
    if sample_count > 1 && dup_sample_count == sample_count {
        filters.push(VariantFilter::AllDup);
    }
    // Unreachable while candidates without an alternate allele return None above
    if sv_sample_count == 0 {
        filters.push(VariantFilter::NoSv);
    }
    if is_hom_del {
        filters.push(VariantFilter::HomDel);
    }

    Some(VariantSummary {
        candidate: candidate.clone(),
        alt_alleles,
        calls,
        sv_sample_count,
        del_sample_count,
        dup_sample_count,
        quality,
        filters,
    })
}

/// True if the sample genotype is an SV lacking the minimum breakpoint clip support
pub fn is_low_clip_support(call: &GenotypeCall, min_read_support: usize) -> bool {
    match &call.score {
        Some(score) => score.genotype.is_sv() && call.clip_support < min_read_support,
        None => false,
    }
}
