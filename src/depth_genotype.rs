//! Genotype classification from normalized read depth
//!

use strum::IntoEnumIterator;

/// Depth-based genotype classes
///
/// Declaration order is the classification priority order.
///
#[derive(Clone, Copy, Debug, Eq, PartialEq, strum::Display, strum::EnumIter)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum DepthGenotype {
    Ref,
    HetDel,
    HomDel,
    HetDup,
    Ambiguous,
}

impl DepthGenotype {
    /// Normalized depth expected for a sample with this genotype
    pub fn theoretical_depth(&self) -> f64 {
        match self {
            Self::Ref => 1.0,
            Self::HetDel => 0.5,
            Self::HomDel => 0.0,
            Self::HetDup => 1.5,
            Self::Ambiguous => 1.0,
        }
    }

    pub fn is_deletion(&self) -> bool {
        matches!(self, Self::HetDel | Self::HomDel)
    }

    pub fn is_duplication(&self) -> bool {
        matches!(self, Self::HetDup)
    }

    pub fn is_sv(&self) -> bool {
        self.is_deletion() || self.is_duplication()
    }
}

/// Classify a normalized depth value
///
/// Each class other than [DepthGenotype::Ambiguous] matches if `norm_depth` is within
/// `threshold` of its theoretical depth. The first matching class in priority order is
/// returned.
///
pub fn classify_norm_depth(norm_depth: f64, threshold: f64) -> DepthGenotype {
    DepthGenotype::iter()
        .filter(|x| *x != DepthGenotype::Ambiguous)
        .find(|x| (norm_depth - x.theoretical_depth()).abs() <= threshold)
        .unwrap_or(DepthGenotype::Ambiguous)
}

/// Quality of the genotype assignment in [0, 99]
///
/// Quality falls quadratically from 99 at the theoretical depth of the genotype to 0 at a
/// distance of 0.5 or more.
///
pub fn get_genotype_quality(genotype: DepthGenotype, norm_depth: f64) -> f64 {
    let d = (genotype.theoretical_depth() - norm_depth).abs().min(0.5);
    99.0 * (1.0 - d * d / 0.25)
}
