//! VCF output of validated candidate intervals
//!

use camino::Utf8Path;
use log::info;
use rust_htslib::bcf::{self, record::GenotypeAllele, record::Numeric};
use rust_vc_utils::ChromList;
use simple_error::{SimpleResult, map_err_with};
use strum::IntoEnumIterator;

use crate::depth_genotype::DepthGenotype;
use crate::validate_cnv::{AltAllele, GenotypeCall, VariantFilter, VariantSummary, is_low_clip_support};
use crate::vcf_utils;

/// FT value for SV sample genotypes without enough breakpoint clip support
pub const LOW_CLIP_SUPPORT_FILTER: &str = "LowClipSupport";

fn get_validated_cnv_vcf_header(
    ref_filename: &Utf8Path,
    chrom_list: &ChromList,
    sample_names: &[&str],
    min_read_support: usize,
) -> bcf::Header {
    let mut header = vcf_utils::get_basic_vcf_header(ref_filename, chrom_list, sample_names);

    let mut records = Vec::<Vec<u8>>::new();

    records.push(br#"##ALT=<ID=DEL,Description="Deletion">"#.to_vec());
    records.push(br#"##ALT=<ID=DUP,Description="Duplication">"#.to_vec());

    // Note that the `PASS` and `.` FILTER records below are not typically included in the header,
    // but there's an oddity in programatically creating vcfs in htslib that forces these to be present,
    // and specifically ordered before INFO/FORMAT.
    //
    records.push(br#"##FILTER=<ID=PASS,Description="All filters passed">"#.to_vec());
    records.push(br#"##FILTER=<ID=.,Description="Unknown filtration status">"#.to_vec());

    for filter in VariantFilter::iter() {
        records.push(
            format!(
                "##FILTER=<ID={filter},Description=\"{}\">",
                filter.description()
            )
            .into_bytes(),
        );
    }
    records.push(
        format!(
            "##FILTER=<ID={LOW_CLIP_SUPPORT_FILTER},Description=\"Sample genotype has fewer than {min_read_support} reads with clipping near the breakpoints\">"
        )
        .into_bytes(),
    );

    for x in [
        br#"##INFO=<ID=END,Number=1,Type=Integer,Description="End position of the variant described in this record">"#.as_slice(),
        br#"##INFO=<ID=SVLEN,Number=1,Type=Integer,Description="Length of the candidate interval">"#,
        br#"##INFO=<ID=N_SAMPLES,Number=1,Type=Integer,Description="Number of samples with a deletion or duplication genotype">"#,
        br#"##FORMAT=<ID=GT,Number=1,Type=String,Description="Genotype">"#,
        br#"##FORMAT=<ID=GQ,Number=1,Type=Integer,Description="Genotype Quality">"#,
        br#"##FORMAT=<ID=FT,Number=1,Type=String,Description="Genotype filter">"#,
        br#"##FORMAT=<ID=CN,Number=1,Type=Float,Description="Median normalized depth over the candidate interval">"#,
        br#"##FORMAT=<ID=RSD,Number=1,Type=Integer,Description="Number of reads with clipping near either breakpoint">"#,
    ] {
        records.push(x.to_vec());
    }

    for x in records.iter() {
        header.push_record(x);
    }

    header
}

/// Get htslib-encoded GT value for one sample
///
fn get_sample_genotype(summary: &VariantSummary, call: &GenotypeCall) -> Vec<i32> {
    use GenotypeAllele::*;

    let genotype = call.score.as_ref().map(|x| x.genotype);
    let del_index = summary.allele_index(AltAllele::Del).map(|x| x as i32);
    let dup_index = summary.allele_index(AltAllele::Dup).map(|x| x as i32);
    let alleles = match (genotype, del_index, dup_index) {
        (Some(DepthGenotype::Ref), _, _) => Some((0, 0)),
        (Some(DepthGenotype::HetDel), Some(del), _) => Some((0, del)),
        (Some(DepthGenotype::HomDel), Some(del), _) => Some((del, del)),
        (Some(DepthGenotype::HetDup), _, Some(dup)) => Some((0, dup)),
        _ => None,
    };
    match alleles {
        Some((a0, a1)) => vec![i32::from(Unphased(a0)), i32::from(Unphased(a1))],
        None => vec![i32::from(UnphasedMissing), i32::from(UnphasedMissing)],
    }
}

fn get_sample_filter(call: &GenotypeCall, min_read_support: usize) -> &'static [u8] {
    if call.score.is_none() {
        b"."
    } else if is_low_clip_support(call, min_read_support) {
        LOW_CLIP_SUPPORT_FILTER.as_bytes()
    } else {
        b"PASS"
    }
}

fn add_sample_info(
    summary: &VariantSummary,
    min_read_support: usize,
    record: &mut bcf::Record,
) -> SimpleResult<()> {
    let mut gts = Vec::new();
    let mut gqs = Vec::new();
    let mut fts = Vec::new();
    let mut cns = Vec::new();
    let mut rsds = Vec::new();
    for call in summary.calls.iter() {
        gts.extend(get_sample_genotype(summary, call));
        fts.push(get_sample_filter(call, min_read_support));
        match &call.score {
            Some(score) => {
                gqs.push(score.quality as i32);
                cns.push(score.norm_depth as f32);
                rsds.push(call.clip_support as i32);
            }
            None => {
                gqs.push(i32::missing());
                cns.push(f32::missing());
                rsds.push(i32::missing());
            }
        }
    }
    map_err_with!(
        record.push_format_integer(b"GT", &gts),
        "Failed to add GT to VCF record"
    )?;
    map_err_with!(
        record.push_format_integer(b"GQ", &gqs),
        "Failed to add GQ to VCF record"
    )?;
    map_err_with!(
        record.push_format_string(b"FT", &fts),
        "Failed to add FT to VCF record"
    )?;
    map_err_with!(
        record.push_format_float(b"CN", &cns),
        "Failed to add CN to VCF record"
    )?;
    map_err_with!(
        record.push_format_integer(b"RSD", &rsds),
        "Failed to add RSD to VCF record"
    )?;
    Ok(())
}

fn convert_summary_to_vcf_record(
    vcf: &bcf::Writer,
    min_read_support: usize,
    summary: &VariantSummary,
) -> SimpleResult<bcf::Record> {
    let candidate = &summary.candidate;
    let rid = map_err_with!(
        vcf.header().name2rid(candidate.chrom.as_bytes()),
        "Chromosome '{}' is missing from the output VCF header",
        candidate.chrom
    )?;

    let mut record = vcf.empty_record();
    record.set_rid(Some(rid));
    record.set_pos(candidate.start - 1);

    // Set REF and ALT
    let alt_labels = summary
        .alt_alleles
        .iter()
        .map(|x| format!("<{x}>").into_bytes())
        .collect::<Vec<_>>();
    let mut alleles = vec![b"N".as_slice()];
    alleles.extend(alt_labels.iter().map(|x| x.as_slice()));
    map_err_with!(
        record.set_alleles(&alleles),
        "Failed to set VCF record alleles"
    )?;

    record.set_qual(match summary.quality {
        Some(x) => x as f32,
        None => f32::missing(),
    });

    if summary.is_pass() {
        map_err_with!(record.push_filter(b"PASS".as_slice()), "Failed to set VCF filter")?;
    } else {
        for filter in summary.filters.iter() {
            map_err_with!(
                record.push_filter(filter.to_string().as_bytes()),
                "Failed to set VCF filter"
            )?;
        }
    }

    map_err_with!(
        record.push_info_integer(b"END", &[candidate.end as i32]),
        "Failed to add END to VCF record"
    )?;
    map_err_with!(
        record.push_info_integer(b"SVLEN", &[candidate.len() as i32]),
        "Failed to add SVLEN to VCF record"
    )?;
    map_err_with!(
        record.push_info_integer(b"N_SAMPLES", &[summary.sv_sample_count as i32]),
        "Failed to add N_SAMPLES to VCF record"
    )?;

    add_sample_info(summary, min_read_support, &mut record)?;

    Ok(record)
}

/// Writes validated candidates to VCF/BCF as they are summarized
///
pub struct ValidatedCnvWriter {
    vcf: bcf::Writer,
    min_read_support: usize,
}

impl ValidatedCnvWriter {
    /// Open the output VCF and write its header
    ///
    /// A filename of '-' writes uncompressed VCF to stdout
    ///
    pub fn new(
        filename: &Utf8Path,
        ref_filename: &Utf8Path,
        chrom_list: &ChromList,
        sample_names: &[&str],
        min_read_support: usize,
    ) -> SimpleResult<Self> {
        let header =
            get_validated_cnv_vcf_header(ref_filename, chrom_list, sample_names, min_read_support);
        let (uncompressed, format) = vcf_utils::get_vcf_output_format(filename);
        let vcf = if filename.as_str() == "-" {
            info!("Writing validated candidates to stdout");
            map_err_with!(
                bcf::Writer::from_stdout(&header, uncompressed, format),
                "Can't write VCF to stdout"
            )?
        } else {
            info!("Writing validated candidates to file: '{filename}'");
            map_err_with!(
                bcf::Writer::from_path(filename, &header, uncompressed, format),
                "Can't create output VCF file '{}'",
                filename
            )?
        };
        Ok(Self {
            vcf,
            min_read_support,
        })
    }

    pub fn write_summary(&mut self, summary: &VariantSummary) -> SimpleResult<()> {
        let record = convert_summary_to_vcf_record(&self.vcf, self.min_read_support, summary)?;
        map_err_with!(
            self.vcf.write(&record),
            "Failed to write VCF record for candidate {}:{}-{}",
            summary.candidate.chrom,
            summary.candidate.start,
            summary.candidate.end
        )
    }
}
