use camino::Utf8PathBuf;
use clap::Args;
use simple_error::{SimpleResult, bail};

use super::utils::{check_fasta_index, check_required_filename, unroll_alignment_filenames};
use crate::validate_cnv::ValidateCnvSettings;

#[derive(Args)]
pub struct ValidateSettings {
    /// Candidate deletions and duplications in VCF/BCF format, or BED format if the filename
    /// ends in '.bed' or '.bed.gz'. Use '-' to read VCF from stdin.
    #[arg(value_name = "INPUT", default_value = "-")]
    pub input_filename: Utf8PathBuf,

    /// Output file for validated candidates. Filenames ending in '.vcf.gz' or '.bcf' select
    /// compressed output. Use '-' to write uncompressed VCF to stdout.
    #[arg(short = 'o', long = "output", value_name = "FILE", default_value = "-")]
    pub output_filename: Utf8PathBuf,

    /// Genome reference in FASTA format, with a samtools-style index at '{FILE}.fai'
    #[arg(short = 'R', long = "ref", value_name = "FILE")]
    pub ref_filename: String,

    /// Alignment file for one sample in BAM or CRAM format. This option can be repeated for
    /// multiple samples. A filename ending in '.list' is read as a file of alignment filenames,
    /// one per line.
    #[arg(short = 'B', long = "bam", value_name = "FILE", required = true)]
    pub bam_filenames: Vec<Utf8PathBuf>,

    /// Extend the window around each candidate by this fraction of the candidate length on each
    /// side. The extension provides the flanking depth used to normalize the candidate interval.
    #[arg(short = 'x', long = "extend", default_value_t = 0.5)]
    pub extend_factor: f64,

    /// Minimum candidate length
    #[arg(long = "min", default_value_t = 50)]
    pub min_sv_size: i64,

    /// Maximum candidate length
    #[arg(long = "max", default_value_t = 1_000_000)]
    pub max_sv_size: i64,

    /// Maximum distance between normalized depth and the expected depth of a genotype for the
    /// genotype to be called
    #[arg(short = 't', long = "treshold", default_value_t = 0.05)]
    pub threshold: f64,

    /// Minimum mapping quality for reads to be counted in depth and breakpoint evidence
    #[arg(long = "mapq", default_value_t = 20)]
    pub min_mapq: u32,

    /// Minimum number of reads with clipping near the candidate breakpoints for a sample SV
    /// genotype to pass
    #[arg(long, default_value_t = 3)]
    pub min_read_support: usize,

    /// Write run statistics to this file in json format
    #[arg(long = "stats", value_name = "FILE")]
    pub stats_filename: Option<Utf8PathBuf>,
}

impl ValidateSettings {
    pub fn get_validate_cnv_settings(&self) -> ValidateCnvSettings {
        ValidateCnvSettings {
            extend_factor: self.extend_factor,
            min_sv_size: self.min_sv_size,
            max_sv_size: self.max_sv_size,
            threshold: self.threshold,
            min_mapq: self.min_mapq,
            min_read_support: self.min_read_support,
        }
    }
}

pub fn validate_and_fix_validate_settings(
    mut settings: ValidateSettings,
) -> SimpleResult<ValidateSettings> {
    check_required_filename(&settings.ref_filename, "reference")?;
    check_fasta_index(&settings.ref_filename)?;

    if settings.input_filename.as_str() != "-" {
        check_required_filename(settings.input_filename.as_str(), "candidate input")?;
    }

    settings.bam_filenames = unroll_alignment_filenames(&settings.bam_filenames)?;
    if settings.bam_filenames.is_empty() {
        bail!("Must specify at least one alignment file");
    }

    if settings.extend_factor <= 0.0 {
        bail!(
            "--extend argument must be greater than 0, got: {}",
            settings.extend_factor
        );
    }

    if settings.min_sv_size < 1 {
        bail!("--min argument must be at least 1");
    }
    if settings.min_sv_size > settings.max_sv_size {
        bail!(
            "--min argument ({}) can't be greater than --max argument ({})",
            settings.min_sv_size,
            settings.max_sv_size
        );
    }

    if !(0.0..0.25).contains(&settings.threshold) {
        bail!(
            "--treshold argument must be in [0, 0.25), got: {}",
            settings.threshold
        );
    }

    Ok(settings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Parser)]
    struct TestCli {
        #[command(flatten)]
        settings: ValidateSettings,
    }

    fn get_test_settings(ref_filename: &str, args: &[&str]) -> SimpleResult<ValidateSettings> {
        let mut all_args = vec!["test", "--ref", ref_filename, "--bam", "sample.bam"];
        all_args.extend(args);
        let cli = TestCli::try_parse_from(all_args).unwrap();
        validate_and_fix_validate_settings(cli.settings)
    }

    #[test]
    fn test_validate_settings() {
        let dir = tempfile::tempdir().unwrap();
        let ref_filename = dir.path().join("ref.fa");
        let ref_filename = ref_filename.to_str().unwrap();
        std::fs::write(ref_filename, ">chr1\nACGT\n").unwrap();

        // Missing fasta index
        assert!(get_test_settings(ref_filename, &[]).is_err());

        std::fs::write(format!("{ref_filename}.fai"), "chr1\t4\t6\t4\t5\n").unwrap();
        let settings = get_test_settings(ref_filename, &[]).unwrap();
        assert_eq!(settings.input_filename, "-");
        assert_eq!(settings.output_filename, "-");
        assert_eq!(settings.min_sv_size, 50);
        assert_eq!(settings.max_sv_size, 1_000_000);
        assert_eq!(settings.min_mapq, 20);
        assert_eq!(settings.min_read_support, 3);

        let cnv_settings = settings.get_validate_cnv_settings();
        assert_eq!(cnv_settings.extend_factor, 0.5);
        assert_eq!(cnv_settings.threshold, 0.05);

        assert!(get_test_settings(ref_filename, &["-t", "0.1"]).is_ok());
        assert!(get_test_settings(ref_filename, &["-t", "0.25"]).is_err());
        assert!(get_test_settings(ref_filename, &["-x", "0"]).is_err());
        assert!(get_test_settings(ref_filename, &["--min", "500", "--max", "100"]).is_err());
        assert!(get_test_settings(ref_filename, &["missing_candidates.vcf"]).is_err());
    }
}
