//! Reader for ABIF capillary-sequencer trace containers (.ab1/.fsa).
//!
//! The format is a tagged directory: a fixed header names a directory of
//! 28-byte entries, each keyed by a four-character tag name plus a tag
//! number and describing one big-endian payload somewhere in the file.
//! Payloads of four bytes or fewer are stored inline in the entry's offset
//! field. Only the tags the tool needs are decoded eagerly; everything else
//! stays raw until asked for.

pub mod value;

use anyhow::{bail, Context, Result};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

pub use value::{type_name, TagValue};

const MAGIC: &[u8; 4] = b"ABIF";
const HEADER_LEN: usize = 6;
const DIR_ENTRY_LEN: usize = 28;

/// One parsed directory entry. `offset_bytes` keeps the raw offset field
/// because short payloads live inside it.
#[derive(Debug, Clone)]
pub struct DirEntry {
    pub name: String,
    pub number: i32,
    pub elem_code: u16,
    pub elem_size: u16,
    pub elem_count: u32,
    pub data_size: u32,
    offset_bytes: [u8; 4],
}

impl DirEntry {
    /// Tag key as conventionally written, e.g. `PBAS2`.
    pub fn key(&self) -> String {
        format!("{}{}", self.name, self.number)
    }

    pub fn data_offset(&self) -> u32 {
        u32::from_be_bytes(self.offset_bytes)
    }
}

/// Serializable row for tag listings (`info --json`).
#[derive(Debug, Serialize)]
pub struct TagInfo {
    pub tag: String,
    pub elem_type: &'static str,
    pub elem_count: u32,
    pub data_size: u32,
    pub value: String,
}

/// A read trace: sample name plus equal-length base calls and qualities.
#[derive(Debug, Clone)]
pub struct TraceRead {
    pub name: String,
    pub seq: Vec<u8>,
    pub qual: Vec<u8>,
}

/// An open ABIF container.
#[derive(Debug)]
pub struct Trace {
    version: u16,
    entries: BTreeMap<String, DirEntry>,
    buf: Vec<u8>,
}

fn read_entry(buf: &[u8], at: usize) -> Result<DirEntry> {
    let raw = buf
        .get(at..at + DIR_ENTRY_LEN)
        .context("directory entry extends past end of file")?;
    let name = String::from_utf8_lossy(&raw[0..4]).into_owned();
    Ok(DirEntry {
        name,
        number: i32::from_be_bytes([raw[4], raw[5], raw[6], raw[7]]),
        elem_code: u16::from_be_bytes([raw[8], raw[9]]),
        elem_size: u16::from_be_bytes([raw[10], raw[11]]),
        elem_count: u32::from_be_bytes([raw[12], raw[13], raw[14], raw[15]]),
        data_size: u32::from_be_bytes([raw[16], raw[17], raw[18], raw[19]]),
        offset_bytes: [raw[20], raw[21], raw[22], raw[23]],
        // bytes 24..28 are the data handle, unused on disk
    })
}

impl Trace {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Trace> {
        let path = path.as_ref();
        let buf = fs::read(path)
            .with_context(|| format!("failed to read trace file {}", path.display()))?;
        Trace::from_bytes(buf)
            .with_context(|| format!("failed to parse trace file {}", path.display()))
    }

    pub fn from_bytes(buf: Vec<u8>) -> Result<Trace> {
        if buf.len() < HEADER_LEN + DIR_ENTRY_LEN {
            bail!("file too short to be an ABIF container");
        }
        if &buf[0..4] != MAGIC {
            bail!("not an ABIF file (bad magic)");
        }
        let version = u16::from_be_bytes([buf[4], buf[5]]);

        // The root entry sits right after the magic and version; its count
        // and offset locate the tag directory.
        let root = read_entry(&buf, HEADER_LEN)?;
        let dir_offset = root.data_offset() as usize;
        let count = root.elem_count as usize;

        let mut entries = BTreeMap::new();
        for k in 0..count {
            let entry = read_entry(&buf, dir_offset + k * DIR_ENTRY_LEN)
                .with_context(|| format!("directory entry {} of {}", k + 1, count))?;
            entries.insert(entry.key(), entry);
        }

        Ok(Trace {
            version,
            entries,
            buf,
        })
    }

    pub fn version(&self) -> u16 {
        self.version
    }

    pub fn entries(&self) -> impl Iterator<Item = &DirEntry> {
        self.entries.values()
    }

    pub fn entry(&self, key: &str) -> Option<&DirEntry> {
        self.entries.get(key)
    }

    /// Raw payload bytes of an entry; short payloads come from the offset
    /// field itself, so the entry must outlive the returned slice.
    pub fn raw_data<'a>(&'a self, entry: &'a DirEntry) -> Result<&'a [u8]> {
        let size = entry.data_size as usize;
        if size <= 4 {
            return Ok(&entry.offset_bytes[..size]);
        }
        let start = entry.data_offset() as usize;
        self.buf
            .get(start..start + size)
            .with_context(|| format!("tag {} payload extends past end of file", entry.key()))
    }

    /// Decoded payload of a tag, e.g. `value("RUND1")`.
    pub fn value(&self, key: &str) -> Result<TagValue> {
        let entry = self
            .entry(key)
            .with_context(|| format!("tag {} not present in trace", key))?;
        value::decode(entry.elem_code, self.raw_data(entry)?)
            .with_context(|| format!("tag {} could not be decoded", key))
    }

    fn first_raw(&self, keys: &[&str]) -> Result<&[u8]> {
        for &key in keys {
            if let Some(entry) = self.entry(key) {
                return self.raw_data(entry);
            }
        }
        bail!("trace has none of the tags {}", keys.join(", "));
    }

    /// Basecalled sequence, preferring the basecaller-edited channel.
    pub fn sequence(&self) -> Result<Vec<u8>> {
        Ok(self.first_raw(&["PBAS2", "PBAS1"])?.to_vec())
    }

    /// Per-base Phred quality values, preferring the edited channel.
    pub fn quality(&self) -> Result<Vec<u8>> {
        Ok(self.first_raw(&["PCON2", "PCON1"])?.to_vec())
    }

    /// Sample name from the SMPL1 tag, or an empty string if absent.
    pub fn sample_name(&self) -> String {
        match self.value("SMPL1") {
            Ok(TagValue::Text(name)) => name,
            _ => String::new(),
        }
    }

    /// Extracts the (name, sequence, quality) triple the merge engine
    /// consumes, rejecting traces whose channels disagree in length.
    pub fn read(&self) -> Result<TraceRead> {
        let seq = self.sequence()?;
        let qual = self.quality()?;
        if seq.len() != qual.len() {
            bail!(
                "malformed trace: {} base calls but {} quality values",
                seq.len(),
                qual.len()
            );
        }
        Ok(TraceRead {
            name: self.sample_name(),
            seq,
            qual,
        })
    }

    /// Listing rows for every directory entry, decoded where possible.
    pub fn tag_table(&self) -> Vec<TagInfo> {
        self.entries()
            .map(|entry| {
                let value = match self
                    .raw_data(entry)
                    .and_then(|data| value::decode(entry.elem_code, data))
                {
                    Ok(v) => v.preview(60),
                    Err(e) => format!("<error: {}>", e),
                };
                TagInfo {
                    tag: entry.key(),
                    elem_type: type_name(entry.elem_code),
                    elem_count: entry.elem_count,
                    data_size: entry.data_size,
                    value,
                }
            })
            .collect()
    }
}
