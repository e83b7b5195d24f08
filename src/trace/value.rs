//! Typed decoding of ABIF directory-entry payloads.

use anyhow::{bail, Result};
use chrono::{NaiveDate, NaiveTime};

/// ABIF element type codes this reader decodes into typed values.
/// Codes >= 1024 are user-defined and kept opaque.
pub const ELEM_BYTE: u16 = 1;
pub const ELEM_CHAR: u16 = 2;
pub const ELEM_WORD: u16 = 3;
pub const ELEM_SHORT: u16 = 4;
pub const ELEM_LONG: u16 = 5;
pub const ELEM_FLOAT: u16 = 7;
pub const ELEM_DOUBLE: u16 = 8;
pub const ELEM_DATE: u16 = 10;
pub const ELEM_TIME: u16 = 11;
pub const ELEM_THUMB: u16 = 12;
pub const ELEM_BOOL: u16 = 13;
pub const ELEM_PSTRING: u16 = 18;
pub const ELEM_CSTRING: u16 = 19;

/// A decoded tag payload.
#[derive(Debug, Clone, PartialEq)]
pub enum TagValue {
    /// char, pString and cString entries (length byte / trailing NUL dropped).
    Text(String),
    /// Raw byte arrays (element type 1).
    Bytes(Vec<u8>),
    Words(Vec<u16>),
    Shorts(Vec<i16>),
    Longs(Vec<i32>),
    Floats(Vec<f32>),
    Doubles(Vec<f64>),
    Date(NaiveDate),
    Time(NaiveTime),
    Bool(bool),
    /// Thumbprints and user-defined element types are not interpreted.
    Unsupported,
}

impl TagValue {
    /// Short human-readable preview for directory listings.
    pub fn preview(&self, max: usize) -> String {
        fn elide(s: String, max: usize) -> String {
            if s.chars().count() > max {
                format!("{}...", s.chars().take(max).collect::<String>())
            } else {
                s
            }
        }
        match self {
            TagValue::Text(s) => elide(s.clone(), max),
            TagValue::Bytes(v) => elide(format!("{:?}", v), max),
            TagValue::Words(v) => elide(format!("{:?}", v), max),
            TagValue::Shorts(v) => elide(format!("{:?}", v), max),
            TagValue::Longs(v) => elide(format!("{:?}", v), max),
            TagValue::Floats(v) => elide(format!("{:?}", v), max),
            TagValue::Doubles(v) => elide(format!("{:?}", v), max),
            TagValue::Date(d) => d.to_string(),
            TagValue::Time(t) => t.to_string(),
            TagValue::Bool(b) => b.to_string(),
            TagValue::Unsupported => "<unsupported>".to_string(),
        }
    }
}

/// Name of an element type code, for listings.
pub fn type_name(elem_code: u16) -> &'static str {
    match elem_code {
        ELEM_BYTE => "byte",
        ELEM_CHAR => "char",
        ELEM_WORD => "word",
        ELEM_SHORT => "short",
        ELEM_LONG => "long",
        ELEM_FLOAT => "float",
        ELEM_DOUBLE => "double",
        ELEM_DATE => "date",
        ELEM_TIME => "time",
        ELEM_THUMB => "thumb",
        ELEM_BOOL => "bool",
        ELEM_PSTRING => "pString",
        ELEM_CSTRING => "cString",
        code if code >= 1024 => "user",
        _ => "unknown",
    }
}

fn chunks<const N: usize>(data: &[u8], what: &str) -> Result<Vec<[u8; N]>> {
    if data.len() % N != 0 {
        bail!("{} payload of {} bytes is not a multiple of {}", what, data.len(), N);
    }
    Ok(data
        .chunks_exact(N)
        .map(|c| {
            let mut arr = [0u8; N];
            arr.copy_from_slice(c);
            arr
        })
        .collect())
}

/// Decodes a raw big-endian payload according to its element type code.
pub fn decode(elem_code: u16, data: &[u8]) -> Result<TagValue> {
    let value = match elem_code {
        ELEM_BYTE => TagValue::Bytes(data.to_vec()),
        ELEM_CHAR => TagValue::Text(String::from_utf8_lossy(data).into_owned()),
        ELEM_WORD => TagValue::Words(
            chunks::<2>(data, "word")?
                .into_iter()
                .map(u16::from_be_bytes)
                .collect(),
        ),
        ELEM_SHORT => TagValue::Shorts(
            chunks::<2>(data, "short")?
                .into_iter()
                .map(i16::from_be_bytes)
                .collect(),
        ),
        ELEM_LONG => TagValue::Longs(
            chunks::<4>(data, "long")?
                .into_iter()
                .map(i32::from_be_bytes)
                .collect(),
        ),
        ELEM_FLOAT => TagValue::Floats(
            chunks::<4>(data, "float")?
                .into_iter()
                .map(f32::from_be_bytes)
                .collect(),
        ),
        ELEM_DOUBLE => TagValue::Doubles(
            chunks::<8>(data, "double")?
                .into_iter()
                .map(f64::from_be_bytes)
                .collect(),
        ),
        ELEM_DATE => {
            if data.len() != 4 {
                bail!("date payload must be 4 bytes, got {}", data.len());
            }
            let year = i16::from_be_bytes([data[0], data[1]]) as i32;
            let (month, day) = (data[2] as u32, data[3] as u32);
            match NaiveDate::from_ymd_opt(year, month, day) {
                Some(d) => TagValue::Date(d),
                None => bail!("invalid date {:04}-{:02}-{:02}", year, month, day),
            }
        }
        ELEM_TIME => {
            if data.len() != 4 {
                bail!("time payload must be 4 bytes, got {}", data.len());
            }
            let (h, m, s, hs) = (data[0], data[1], data[2], data[3]);
            match NaiveTime::from_hms_milli_opt(h as u32, m as u32, s as u32, hs as u32 * 10) {
                Some(t) => TagValue::Time(t),
                None => bail!("invalid time {:02}:{:02}:{:02}.{:02}", h, m, s, hs),
            }
        }
        ELEM_BOOL => {
            if data.is_empty() {
                bail!("bool payload is empty");
            }
            TagValue::Bool(data[0] != 0)
        }
        // pString carries its length in the leading byte.
        ELEM_PSTRING => {
            if data.is_empty() {
                bail!("pString payload is empty");
            }
            TagValue::Text(String::from_utf8_lossy(&data[1..]).into_owned())
        }
        // cString is NUL-terminated.
        ELEM_CSTRING => {
            let end = data.iter().position(|&b| b == 0).unwrap_or(data.len());
            TagValue::Text(String::from_utf8_lossy(&data[..end]).into_owned())
        }
        _ => TagValue::Unsupported,
    };
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_strings() {
        assert_eq!(
            decode(ELEM_CHAR, b"ACGT").unwrap(),
            TagValue::Text("ACGT".to_string())
        );
        assert_eq!(
            decode(ELEM_PSTRING, b"\x04Test").unwrap(),
            TagValue::Text("Test".to_string())
        );
        assert_eq!(
            decode(ELEM_CSTRING, b"KB.bcp\0").unwrap(),
            TagValue::Text("KB.bcp".to_string())
        );
    }

    #[test]
    fn decodes_numbers_big_endian() {
        assert_eq!(
            decode(ELEM_SHORT, &[0x00, 0x10, 0xff, 0xff]).unwrap(),
            TagValue::Shorts(vec![16, -1])
        );
        assert_eq!(
            decode(ELEM_LONG, &[0x00, 0x00, 0x01, 0x00]).unwrap(),
            TagValue::Longs(vec![256])
        );
        assert_eq!(
            decode(ELEM_WORD, &[0xff, 0xfe]).unwrap(),
            TagValue::Words(vec![65534])
        );
    }

    #[test]
    fn decodes_date_and_time() {
        // 2011-03-09
        let d = decode(ELEM_DATE, &[0x07, 0xdb, 3, 9]).unwrap();
        assert_eq!(d, TagValue::Date(NaiveDate::from_ymd_opt(2011, 3, 9).unwrap()));
        let t = decode(ELEM_TIME, &[13, 45, 2, 0]).unwrap();
        assert_eq!(
            t,
            TagValue::Time(NaiveTime::from_hms_opt(13, 45, 2).unwrap())
        );
    }

    #[test]
    fn user_types_are_opaque() {
        assert_eq!(decode(1024, &[1, 2, 3]).unwrap(), TagValue::Unsupported);
        assert_eq!(decode(ELEM_THUMB, &[0; 10]).unwrap(), TagValue::Unsupported);
    }

    #[test]
    fn truncated_payloads_are_rejected() {
        assert!(decode(ELEM_SHORT, &[0x00]).is_err());
        assert!(decode(ELEM_DATE, &[0x07, 0xdb]).is_err());
    }
}
