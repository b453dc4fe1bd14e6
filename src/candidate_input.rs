//! Read candidate SV intervals from VCF/BCF or BED input
//!

use std::io::{BufRead, BufReader, Lines};

use camino::Utf8Path;
use rust_htslib::bcf::{self, Read};
use rust_htslib::bgzf;
use simple_error::{SimpleResult, bail, map_err_with};

/// A candidate SV interval on one chromosome
///
#[derive(Clone, Debug, PartialEq)]
pub struct CandidateInterval {
    pub chrom: String,

    /// 1-indexed start position
    pub start: i64,

    /// 1-indexed inclusive end position
    pub end: i64,
}

impl CandidateInterval {
    pub fn len(&self) -> i64 {
        self.end - self.start + 1
    }
}

/// One entry of the candidate input
#[derive(Debug, PartialEq)]
pub enum CandidateRecord {
    Interval(CandidateInterval),

    /// A VCF record which is not a simple deletion, duplication or insertion
    UnsupportedType,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum CandidateFormat {
    Vcf,
    Bed,
}

/// Candidate input format as inferred from the filename, where '-' is VCF from stdin
pub fn get_candidate_format(filename: &Utf8Path) -> CandidateFormat {
    let filename = filename.as_str();
    if filename.ends_with(".bed") || filename.ends_with(".bed.gz") {
        CandidateFormat::Bed
    } else {
        CandidateFormat::Vcf
    }
}

/// Convert a BED line into a candidate interval
///
/// Returns None for header and empty lines.
///
fn parse_bed_line(line: &str) -> SimpleResult<Option<CandidateInterval>> {
    if line.is_empty()
        || line.starts_with('#')
        || line.starts_with("track")
        || line.starts_with("browser")
    {
        return Ok(None);
    }

    let words = line.split('\t').collect::<Vec<_>>();
    if words.len() < 3 {
        bail!("Expected at least 3 fields in BED line: '{line}'");
    }
    let start = map_err_with!(
        words[1].trim().parse::<i64>(),
        "Can't parse start position in BED line: '{}'",
        line
    )?;
    let end = map_err_with!(
        words[2].trim().parse::<i64>(),
        "Can't parse end position in BED line: '{}'",
        line
    )?;
    Ok(Some(CandidateInterval {
        chrom: words[0].to_string(),
        start: start + 1,
        end,
    }))
}

/// Convert a VCF record into a candidate interval
///
/// Only biallelic records with SVTYPE of DEL, DUP or INS are accepted. The interval spans from
/// POS to the record end, which htslib takes from the INFO END field when it is present.
///
fn get_vcf_candidate(record: &bcf::Record) -> SimpleResult<CandidateRecord> {
    let svtype = match record.info(b"SVTYPE").string() {
        Ok(Some(x)) => x.first().map(|x| x.to_vec()),
        _ => None,
    };
    let is_supported_type = matches!(
        svtype.as_deref(),
        Some(b"DEL") | Some(b"DUP") | Some(b"INS")
    );
    if !is_supported_type || record.allele_count() != 2 {
        return Ok(CandidateRecord::UnsupportedType);
    }

    let rid = match record.rid() {
        Some(x) => x,
        None => bail!("VCF record is missing chromosome"),
    };
    let chrom = map_err_with!(
        record.header().rid2name(rid),
        "Can't find chromosome name of VCF record"
    )?;
    Ok(CandidateRecord::Interval(CandidateInterval {
        chrom: String::from_utf8_lossy(chrom).to_string(),
        start: record.pos() + 1,
        end: record.end(),
    }))
}

enum CandidateSource {
    Vcf {
        reader: Box<bcf::Reader>,
        record: bcf::Record,
    },
    Bed {
        lines: Lines<BufReader<bgzf::Reader>>,
        line_number: usize,
    },
}

/// Streaming reader of candidate intervals from any supported input format
///
pub struct CandidateReader {
    filename: String,
    source: CandidateSource,
}

impl CandidateReader {
    /// Open candidate input, where BED is recognized from the filename extension
    ///
    /// A filename of '-' reads VCF/BCF from stdin
    ///
    pub fn new(filename: &Utf8Path) -> SimpleResult<Self> {
        let source = match get_candidate_format(filename) {
            CandidateFormat::Vcf => {
                let reader = if filename.as_str() == "-" {
                    map_err_with!(bcf::Reader::from_stdin(), "Can't read VCF from stdin")?
                } else {
                    map_err_with!(
                        bcf::Reader::from_path(filename),
                        "Can't open candidate VCF file '{}'",
                        filename
                    )?
                };
                let record = reader.empty_record();
                CandidateSource::Vcf {
                    reader: Box::new(reader),
                    record,
                }
            }
            CandidateFormat::Bed => {
                let reader = map_err_with!(
                    bgzf::Reader::from_path(filename),
                    "Can't open candidate BED file '{}'",
                    filename
                )?;
                CandidateSource::Bed {
                    lines: BufReader::new(reader).lines(),
                    line_number: 0,
                }
            }
        };
        Ok(Self {
            filename: filename.to_string(),
            source,
        })
    }

    /// Get the next candidate record, or None at the end of input
    ///
    pub fn next_candidate(&mut self) -> SimpleResult<Option<CandidateRecord>> {
        match &mut self.source {
            CandidateSource::Vcf { reader, record } => match reader.read(record) {
                None => Ok(None),
                Some(r) => {
                    map_err_with!(
                        r,
                        "Failed to parse VCF record from candidate file '{}'",
                        self.filename
                    )?;
                    Ok(Some(get_vcf_candidate(record)?))
                }
            },
            CandidateSource::Bed { lines, line_number } => {
                for line in lines.by_ref() {
                    *line_number += 1;
                    let line = map_err_with!(
                        line,
                        "Failed to read line {} of candidate BED file '{}'",
                        line_number,
                        self.filename
                    )?;
                    if let Some(interval) = parse_bed_line(&line)? {
                        return Ok(Some(CandidateRecord::Interval(interval)));
                    }
                }
                Ok(None)
            }
        }
    }
}
