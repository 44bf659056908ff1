//! Query sequence input (command line or FASTA file)

use anyhow::{Context, Result};
use needletail::parse_fastx_file;
use std::path::Path;

/// The protein or nucleotide sequence to search with
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query {
    /// Record id when read from FASTA
    pub name: Option<String>,
    pub sequence: String,
}

impl Query {
    /// Build a query from text given on the command line; whitespace is dropped.
    pub fn from_text(text: &str) -> Result<Self> {
        let sequence: String = text.chars().filter(|c| !c.is_whitespace()).collect();
        if sequence.is_empty() {
            anyhow::bail!("Query sequence is empty");
        }
        Ok(Self { name: None, sequence })
    }

    /// Load the first record of a FASTA file (supports gzip compression)
    pub fn from_fasta(path: &Path) -> Result<Self> {
        let mut reader = parse_fastx_file(path)
            .with_context(|| format!("Failed to open FASTA: {}", path.display()))?;

        let (name, sequence) = {
            let record = reader
                .next()
                .with_context(|| format!("No sequence found in {}", path.display()))?
                .with_context(|| format!("Failed to parse record in {}", path.display()))?;
            (
                String::from_utf8_lossy(record.id()).to_string(),
                String::from_utf8_lossy(&record.seq()).to_string(),
            )
        };
        if sequence.is_empty() {
            anyhow::bail!("First record in {} has an empty sequence", path.display());
        }

        if reader.next().is_some() {
            log::warn!(
                "{} holds more than one sequence; only '{}' is searched",
                path.display(),
                name
            );
        }

        Ok(Self {
            name: Some(name),
            sequence,
        })
    }

    pub fn residue_count(&self) -> usize {
        self.sequence.chars().count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_from_text_strips_whitespace() {
        let q = Query::from_text(" MKT AYI\nAKQR \n").unwrap();
        assert_eq!(q.sequence, "MKTAYIAKQR");
        assert_eq!(q.residue_count(), 10);
        assert!(q.name.is_none());
    }

    #[test]
    fn test_empty_text_rejected() {
        assert!(Query::from_text(" \n\t").is_err());
    }

    #[test]
    fn test_from_fasta_takes_first_record() {
        let mut file = tempfile::Builder::new().suffix(".faa").tempfile().unwrap();
        writeln!(file, ">eutE ethanolamine utilization protein").unwrap();
        writeln!(file, "MNQQDIEQVVKAVLLKMKDSSQPASTVHEMGVFASLDDAVAAAK").unwrap();
        writeln!(file, "RAQQGLVTA").unwrap();
        writeln!(file, ">second").unwrap();
        writeln!(file, "MKT").unwrap();
        file.flush().unwrap();

        let q = Query::from_fasta(file.path()).unwrap();
        assert_eq!(q.name.as_deref(), Some("eutE ethanolamine utilization protein"));
        assert_eq!(
            q.sequence,
            "MNQQDIEQVVKAVLLKMKDSSQPASTVHEMGVFASLDDAVAAAKRAQQGLVTA"
        );
    }
}
