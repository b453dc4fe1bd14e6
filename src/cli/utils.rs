use std::io::{BufRead, BufReader};

use camino::{Utf8Path, Utf8PathBuf};
use simple_error::{SimpleResult, bail, map_err_with};

/// Check a required input filename
///
/// Assumes no logger has been configured yet
///
pub fn check_required_filename(filename: &str, label: &str) -> SimpleResult<()> {
    if filename.is_empty() {
        bail!("Must specify {label} file");
    }
    let path = std::path::Path::new(&filename);
    if !path.exists() {
        bail!("Can't find specified {label} file: '{filename}'");
    }
    if !path.is_file() {
        bail!("Specified {label} file path does not appear to be a file: '{filename}'");
    }
    Ok(())
}

/// Check that the fasta index expected by htslib is present next to the reference
///
pub fn check_fasta_index(ref_filename: &str) -> SimpleResult<()> {
    let fai_filename = format!("{ref_filename}.fai");
    if !std::path::Path::new(&fai_filename).is_file() {
        bail!("Can't find index for reference fasta file: '{fai_filename}'");
    }
    Ok(())
}

/// Read alignment filenames from a list file, one path per line
///
fn read_alignment_list_file(list_filename: &Utf8Path) -> SimpleResult<Vec<Utf8PathBuf>> {
    let f = map_err_with!(
        std::fs::File::open(list_filename),
        "Can't open alignment list file: '{}'",
        list_filename
    )?;
    let mut filenames = Vec::new();
    for line in BufReader::new(f).lines() {
        let line = map_err_with!(
            line,
            "Can't read alignment list file: '{}'",
            list_filename
        )?;
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        filenames.push(Utf8PathBuf::from(line));
    }
    Ok(filenames)
}

/// Replace each alignment filename ending in '.list' with the filenames it contains
///
pub fn unroll_alignment_filenames(filenames: &[Utf8PathBuf]) -> SimpleResult<Vec<Utf8PathBuf>> {
    let mut unrolled = Vec::new();
    for filename in filenames {
        if filename.as_str().ends_with(".list") {
            check_required_filename(filename.as_str(), "alignment list")?;
            unrolled.extend(read_alignment_list_file(filename)?);
        } else {
            unrolled.push(filename.clone());
        }
    }
    Ok(unrolled)
}
