use std::collections::HashMap;
use std::path::Path;

use bio::io::fasta;

pub struct ChromInfo {
    pub label: String,
    pub length: u64,
}

/// Ordered list of chromosome names and lengths, with reverse lookup from name to index
///
#[derive(Default)]
pub struct ChromList {
    pub data: Vec<ChromInfo>,
    pub label_to_index: HashMap<String, usize>,
}

impl ChromList {
    pub fn add_chrom(&mut self, label: &str, length: u64) {
        assert!(
            !self.label_to_index.contains_key(label),
            "Duplicate chromosome name '{label}'"
        );
        self.label_to_index
            .insert(label.to_string(), self.data.len());
        self.data.push(ChromInfo {
            label: label.to_string(),
            length,
        });
    }

    /// Return the length of the named chromosome, or None if the chromosome is not in the list
    ///
    pub fn get_chrom_length(&self, label: &str) -> Option<u64> {
        self.label_to_index
            .get(label)
            .map(|&index| self.data[index].length)
    }

    /// Read chromosome names and lengths from the samtools-style index of a fasta file
    ///
    /// The index is expected at `{fasta_filename}.fai`
    ///
    pub fn from_fasta_index<P: AsRef<Path>>(fasta_filename: P) -> std::io::Result<Self> {
        let index = fasta::Index::with_fasta_file(&fasta_filename)
            .map_err(|e| std::io::Error::other(e.to_string()))?;
        let mut chrom_list = Self::default();
        for seq in index.sequences() {
            if chrom_list.label_to_index.contains_key(&seq.name) {
                return Err(std::io::Error::new(
                    std::io::ErrorKind::InvalidData,
                    format!("Duplicate chromosome name '{}' in fasta index", seq.name),
                ));
            }
            chrom_list.add_chrom(&seq.name, seq.len);
        }
        Ok(chrom_list)
    }
}
