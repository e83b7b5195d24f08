//! Sequence serialization. Quality values are plain Phred integers inside
//! the tool; the +33 printable offset is applied here and nowhere else.

use anyhow::Result;
use bio::io::{fasta, fastq};
use std::io::Write;

/// Encodes raw Phred values as printable Phred+33 characters.
pub fn encode_phred33(qual: &[u8]) -> Vec<u8> {
    qual.iter().map(|&q| q.saturating_add(33)).collect()
}

pub fn write_fasta<W: Write>(out: W, id: &str, desc: Option<&str>, seq: &[u8]) -> Result<()> {
    let mut writer = fasta::Writer::new(out);
    writer.write(id, desc, seq)?;
    Ok(())
}

pub fn write_fastq<W: Write>(
    out: W,
    id: &str,
    desc: Option<&str>,
    seq: &[u8],
    qual: &[u8],
) -> Result<()> {
    let mut writer = fastq::Writer::new(out);
    writer.write(id, desc, seq, &encode_phred33(qual))?;
    Ok(())
}
