//! Address parsing and the seven output formats
//!
//! Input side: standard IPv4/IPv6 literals, `0x`-prefixed hex strings and
//! plain decimal strings all converge on a canonical [`IpBytes`] buffer.
//! Output side: a closed [`Format`] enum replaces the original free-form
//! tag strings, with [`FormatSpec`] carrying the suffix-inclusion flag
//! separately.
//!
//! ```
//! use ipkit_core::codec::{self, Format};
//!
//! let ip = codec::parse("0xC0A80001").unwrap();
//! let text = codec::format(&ip, Format::Comp);
//! assert_eq!(text.as_text(), Some("192.168.0.1"));
//! ```

use crate::{arith, IpBytes, IpError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::IpAddr;
use std::str::FromStr;

/// Parse textual or numeric input into a canonical address buffer
///
/// Accepted encodings, tried in order:
/// 1. standard dotted-decimal or colon-hex literal
/// 2. `0x` followed by 1-32 hex digits: up to 8 digits pack to 4 bytes,
///    more pack to 16 bytes
/// 3. decimal digits only: arbitrary-precision conversion, always 16 bytes
///    regardless of magnitude
///
/// Everything else is [`IpError::Parse`].
pub fn parse(text: &str) -> Result<IpBytes> {
    if let Ok(ip) = text.parse::<IpAddr>() {
        return Ok(IpBytes::from_ip(ip));
    }
    if let Some(digits) = text.strip_prefix("0x").or_else(|| text.strip_prefix("0X")) {
        return hex_to_bytes(digits);
    }
    if !text.is_empty() && text.bytes().all(|b| b.is_ascii_digit()) {
        return arith::from_decimal_string(text);
    }
    Err(IpError::Parse(text.to_owned()))
}

/// Pack a hex digit string into an address buffer
///
/// Up to 8 digits are left-padded to 8 and packed to 4 bytes; 9 to 32
/// digits are left-padded to 32 and packed to 16 bytes.
pub fn hex_to_bytes(digits: &str) -> Result<IpBytes> {
    if digits.is_empty()
        || digits.len() > 32
        || !digits.bytes().all(|b| b.is_ascii_hexdigit())
    {
        return Err(IpError::Parse(format!("0x{}", digits)));
    }
    let width = if digits.len() <= 8 { 8 } else { 32 };
    let padded = format!("{:0>width$}", digits, width = width);
    let mut bytes = Vec::with_capacity(width / 2);
    for pair in padded.as_bytes().chunks(2) {
        let hi = hex_value(pair[0]);
        let lo = hex_value(pair[1]);
        bytes.push(hi << 4 | lo);
    }
    IpBytes::from_slice(&bytes)
}

fn hex_value(digit: u8) -> u8 {
    match digit {
        b'0'..=b'9' => digit - b'0',
        b'a'..=b'f' => digit - b'a' + 10,
        _ => digit - b'A' + 10,
    }
}

/// Output format kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Format {
    /// Canonical compressed textual form
    #[default]
    Comp,
    /// String of 0/1 characters, 32 or 128 of them
    Bin,
    /// Arbitrary-precision decimal string
    Dec,
    /// `0x`-prefixed hex, leading zeros stripped (IPv6 keeps at least 9 digits)
    Hex,
    /// The raw byte buffer
    Raw,
    /// IPv6 word form without leading zeros per group; IPv4 passthrough
    Exp,
    /// IPv6 word form with 4-digit groups; IPv4 passthrough
    Full,
}

/// A format request: the kind plus whether to append `/suffix`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormatSpec {
    pub kind: Format,
    pub with_suffix: bool,
}

impl FormatSpec {
    /// Spec for a bare format, no suffix appended
    pub fn new(kind: Format) -> Self {
        Self {
            kind,
            with_suffix: false,
        }
    }

    /// Spec that appends `/suffix` when one is set
    pub fn with_suffix(kind: Format) -> Self {
        Self {
            kind,
            with_suffix: true,
        }
    }
}

impl Default for FormatSpec {
    /// Compressed form with the suffix appended, matching an absent request
    fn default() -> Self {
        Self {
            kind: Format::Comp,
            with_suffix: true,
        }
    }
}

impl FromStr for FormatSpec {
    type Err = IpError;

    /// Parse a textual format request
    ///
    /// Tags match case-insensitively as substrings, in the fixed precedence
    /// order COMP, BIN, DEC, HEX, RAW, EXP, FULL. A `+` anywhere in the
    /// request asks for the suffix to be appended.
    fn from_str(s: &str) -> Result<Self> {
        let upper = s.to_ascii_uppercase();
        let with_suffix = upper.contains('+');
        let kind = if upper.contains("COMP") {
            Format::Comp
        } else if upper.contains("BIN") {
            Format::Bin
        } else if upper.contains("DEC") {
            Format::Dec
        } else if upper.contains("HEX") {
            Format::Hex
        } else if upper.contains("RAW") {
            Format::Raw
        } else if upper.contains("EXP") {
            Format::Exp
        } else if upper.contains("FULL") {
            Format::Full
        } else {
            return Err(IpError::UnknownFormat(s.to_owned()));
        };
        Ok(Self { kind, with_suffix })
    }
}

/// A formatted address: text for the six textual kinds, bytes for `Raw`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Formatted {
    Text(String),
    Raw(Vec<u8>),
}

impl Formatted {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Formatted::Text(s) => Some(s),
            Formatted::Raw(_) => None,
        }
    }

    pub fn into_text(self) -> Option<String> {
        match self {
            Formatted::Text(s) => Some(s),
            Formatted::Raw(_) => None,
        }
    }

    pub fn as_raw(&self) -> Option<&[u8]> {
        match self {
            Formatted::Text(_) => None,
            Formatted::Raw(bytes) => Some(bytes),
        }
    }
}

impl fmt::Display for Formatted {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Formatted::Text(s) => f.write_str(s),
            Formatted::Raw(bytes) => {
                for byte in bytes {
                    write!(f, "\\x{:02x}", byte)?;
                }
                Ok(())
            }
        }
    }
}

/// Render an address buffer in one of the seven output formats
pub fn format(addr: &IpBytes, kind: Format) -> Formatted {
    match kind {
        Format::Comp => Formatted::Text(addr.to_ip().to_string()),
        Format::Bin => {
            let bits = addr
                .as_slice()
                .iter()
                .map(|b| format!("{:08b}", b))
                .collect();
            Formatted::Text(bits)
        }
        Format::Dec => Formatted::Text(arith::to_decimal_string(addr)),
        Format::Hex => Formatted::Text(format_hex(addr)),
        Format::Raw => Formatted::Raw(addr.as_slice().to_vec()),
        Format::Exp => format_words(addr, false),
        Format::Full => format_words(addr, true),
    }
}

/// Hex form: leading zeros stripped, IPv6 re-padded to at least 9 digits
fn format_hex(addr: &IpBytes) -> String {
    let hex: String = addr
        .as_slice()
        .iter()
        .map(|b| format!("{:02x}", b))
        .collect();
    let trimmed = hex.trim_start_matches('0');
    if addr.is_v6() {
        format!("0x{:0>9}", trimmed)
    } else if trimmed.is_empty() {
        "0x0".to_owned()
    } else {
        format!("0x{}", trimmed)
    }
}

/// IPv6 colon/word form; IPv4 passes through to the compressed form
fn format_words(addr: &IpBytes, zero_padded: bool) -> Formatted {
    if addr.is_v4() {
        return Formatted::Text(addr.to_ip().to_string());
    }
    let words: Vec<String> = addr
        .as_slice()
        .chunks(2)
        .map(|pair| {
            let word = u16::from_be_bytes([pair[0], pair[1]]);
            if zero_padded {
                format!("{:04x}", word)
            } else {
                format!("{:x}", word)
            }
        })
        .collect();
    Formatted::Text(words.join(":"))
}

/// Strip up to two leading zeros from each `.`/`:` group of an address
pub fn clean_ip(text: &str) -> String {
    let bytes = text.as_bytes();
    let mut out = String::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        let at_group_start = i == 0 || bytes[i - 1] == b'.' || bytes[i - 1] == b':';
        if at_group_start && bytes[i] == b'0' {
            let zeros = if i + 1 < bytes.len() && bytes[i + 1] == b'0' {
                2
            } else {
                1
            };
            if i + zeros < bytes.len() && bytes[i + zeros].is_ascii_digit() {
                i += zeros;
                continue;
            }
        }
        out.push(bytes[i] as char);
        i += 1;
    }
    out
}
