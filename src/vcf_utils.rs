use camino::Utf8Path;
use rust_htslib::bcf::{self, header::Header};
use rust_htslib::htslib;
use rust_vc_utils::ChromList;

use crate::globals::{PROGRAM_NAME, PROGRAM_VERSION};

/// Get a new bcf header which is actually empty so that we can set our own version number
///
pub fn get_empty_bcf_header() -> Header {
    // Give the incorrect mode to htslib to prevent it from writing the wrong VCF version number.
    // As of 202409 htslib doesn't store the mode argument so this shouldn't break the output.
    //
    let mode = c"r";
    Header {
        inner: unsafe { htslib::bcf_hdr_init(mode.as_ptr()) },
        subset: None,
    }
}

/// Builds common fields into a VCF header, upon which more app specific details can be added
///
pub fn get_basic_vcf_header(
    ref_filename: &Utf8Path,
    chrom_list: &ChromList,
    sample_names: &[&str],
) -> Header {
    let mut header = get_empty_bcf_header();
    header.push_record(b"##fileformat=VCFv4.4");

    let date_string = chrono::Local::now().format("%Y%m%d").to_string();
    header.push_record(format!("##fileDate={date_string}").as_bytes());
    header.push_record(format!("##reference=file://{ref_filename}").as_bytes());
    header.push_record(format!("##source=\"{PROGRAM_NAME} {PROGRAM_VERSION}\"").as_bytes());
    let cmdline = std::env::args().collect::<Vec<_>>().join(" ");
    header.push_record(format!("##{PROGRAM_NAME}_cmdline=\"{cmdline}\"").as_bytes());

    // Add contig records
    for chrom_info in chrom_list.data.iter() {
        let header_contig_line = format!(
            "##contig=<ID={},length={}>",
            chrom_info.label, chrom_info.length
        );
        header.push_record(header_contig_line.as_bytes());
    }

    // Add sample names
    for sample_name in sample_names {
        header.push_sample(sample_name.as_bytes());
    }

    header
}

/// Select VCF output encoding from the output filename
///
/// Returns a 2-tuple of (1) true if output is uncompressed (2) the output format
///
/// A filename ending in '.bcf' selects compressed BCF, '.vcf.gz' selects bgzipped VCF, and
/// anything else, including '-' for stdout, selects uncompressed VCF.
///
pub fn get_vcf_output_format(filename: &Utf8Path) -> (bool, bcf::Format) {
    let filename = filename.as_str();
    if filename.ends_with(".bcf") {
        (false, bcf::Format::Bcf)
    } else if filename.ends_with(".vcf.gz") {
        (false, bcf::Format::Vcf)
    } else {
        (true, bcf::Format::Vcf)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_htslib::bcf::Read;

    #[test]
    fn test_get_vcf_output_format() {
        assert!(matches!(
            get_vcf_output_format(Utf8Path::new("out.bcf")),
            (false, bcf::Format::Bcf)
        ));
        assert!(matches!(
            get_vcf_output_format(Utf8Path::new("out.vcf.gz")),
            (false, bcf::Format::Vcf)
        ));
        assert!(matches!(
            get_vcf_output_format(Utf8Path::new("-")),
            (true, bcf::Format::Vcf)
        ));
    }

    #[test]
    fn test_get_basic_vcf_header() {
        let mut chrom_list = ChromList::default();
        chrom_list.add_chrom("chr1", 10000);
        chrom_list.add_chrom("chr2", 5000);

        let header = get_basic_vcf_header(Utf8Path::new("ref.fa"), &chrom_list, &["s1", "s2"]);

        let dir = tempfile::tempdir().unwrap();
        let filename = dir.path().join("test.vcf");
        {
            let _vcf = bcf::Writer::from_path(&filename, &header, true, bcf::Format::Vcf).unwrap();
        }

        let text = std::fs::read_to_string(&filename).unwrap();
        assert!(text.starts_with("##fileformat=VCFv4.4"));
        assert!(text.contains("##contig=<ID=chr2,length=5000>"));

        let reader = bcf::Reader::from_path(&filename).unwrap();
        assert_eq!(reader.header().sample_count(), 2);
        assert_eq!(reader.header().name2rid(b"chr2").unwrap(), 1);
    }
}
