//! Core types for ipkit
//!
//! This crate provides the foundational pieces used throughout the ipkit
//! workspace:
//! - [`IpBytes`] - canonical big-endian address buffer (4 or 16 bytes)
//! - [`codec`] - text/hex/decimal parsing and the seven output formats
//! - [`arith`] - fixed-width big-endian arithmetic with overflow detection
//! - [`mask`] - CIDR suffix to netmask conversion and validation
//! - [`IpError`] - error taxonomy shared by all operations
//!
//! The address family is never stored: a 4-byte buffer is IPv4, a 16-byte
//! buffer is IPv6, and no other length can be constructed.
//!
//! ```
//! use ipkit_core::codec;
//!
//! let ip = codec::parse("192.168.0.1").unwrap();
//! assert!(ip.is_v4());
//! assert_eq!(ip.to_string(), "192.168.0.1");
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::IpAddr;
use thiserror::Error;

pub mod arith;
pub mod codec;
pub mod mask;

/// Error taxonomy for address operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum IpError {
    /// Input matches no recognized address encoding
    #[error("unrecognized address: {0}")]
    Parse(String),

    /// Suffix outside the valid range for the address family
    #[error("invalid suffix: {suffix} (must be 0-{max})")]
    InvalidSuffix { suffix: u32, max: u32 },

    /// Buffer bit pattern is not a contiguous run of ones then zeros
    #[error("not a valid netmask: {0}")]
    InvalidMask(String),

    /// Increment pushed the value past the fixed byte width
    #[error("address arithmetic overflow")]
    Overflow,

    /// Decrement pushed the value below zero
    #[error("address arithmetic underflow")]
    Underflow,

    /// Operands of different byte lengths where equal length is required
    #[error("address family mismatch: {left}-byte vs {right}-byte operand")]
    FamilyMismatch { left: usize, right: usize },

    /// Format request matched none of the known tags
    #[error("unknown format tag: {0}")]
    UnknownFormat(String),
}

/// Result type alias for ipkit-core operations
pub type Result<T> = std::result::Result<T, IpError>;

/// Canonical big-endian address buffer
///
/// Holds exactly 4 bytes (IPv4) or 16 bytes (IPv6), interpreted as an
/// unsigned big-endian integer. Ordering is lexicographic over the bytes,
/// which for equal lengths is exactly unsigned integer order; comparing
/// across families is meaningless and every combining operation checks
/// lengths first.
///
/// # Examples
///
/// ```
/// use ipkit_core::IpBytes;
///
/// let ip = IpBytes::from_v4([192, 168, 0, 1]);
/// assert!(ip.is_v4());
/// assert_eq!(ip.bit_len(), 32);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct IpBytes {
    bytes: Vec<u8>,
}

impl IpBytes {
    /// Create an IPv4 buffer from its four octets
    pub fn from_v4(octets: [u8; 4]) -> Self {
        Self {
            bytes: octets.to_vec(),
        }
    }

    /// Create an IPv6 buffer from its sixteen octets
    pub fn from_v6(octets: [u8; 16]) -> Self {
        Self {
            bytes: octets.to_vec(),
        }
    }

    /// Create a buffer from a byte slice
    ///
    /// Any length other than 4 or 16 is rejected.
    pub fn from_slice(bytes: &[u8]) -> Result<Self> {
        if bytes.len() != 4 && bytes.len() != 16 {
            return Err(IpError::Parse(format!(
                "address buffer must be 4 or 16 bytes, got {}",
                bytes.len()
            )));
        }
        Ok(Self {
            bytes: bytes.to_vec(),
        })
    }

    /// Create a buffer from a standard library address
    pub fn from_ip(ip: IpAddr) -> Self {
        match ip {
            IpAddr::V4(v4) => Self::from_v4(v4.octets()),
            IpAddr::V6(v6) => Self::from_v6(v6.octets()),
        }
    }

    /// Convert back to a standard library address
    pub fn to_ip(&self) -> IpAddr {
        match self.bytes.len() {
            4 => {
                let mut octets = [0u8; 4];
                octets.copy_from_slice(&self.bytes);
                IpAddr::from(octets)
            }
            _ => {
                let mut octets = [0u8; 16];
                octets.copy_from_slice(&self.bytes);
                IpAddr::from(octets)
            }
        }
    }

    /// Raw big-endian bytes
    pub fn as_slice(&self) -> &[u8] {
        &self.bytes
    }

    /// Byte length: 4 or 16
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Always false; buffers are never empty
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Bit length: 32 or 128
    pub fn bit_len(&self) -> u32 {
        self.bytes.len() as u32 * 8
    }

    /// True for a 4-byte buffer
    pub fn is_v4(&self) -> bool {
        self.bytes.len() == 4
    }

    /// True for a 16-byte buffer
    pub fn is_v6(&self) -> bool {
        self.bytes.len() == 16
    }

    /// Count of leading zero bits
    pub fn leading_zeros(&self) -> u32 {
        let mut count = 0;
        for &byte in &self.bytes {
            if byte == 0 {
                count += 8;
            } else {
                count += byte.leading_zeros();
                break;
            }
        }
        count
    }

    /// Bitwise AND with a same-length buffer
    pub fn and(&self, other: &IpBytes) -> Result<IpBytes> {
        self.check_family(other)?;
        let bytes = self
            .bytes
            .iter()
            .zip(&other.bytes)
            .map(|(a, b)| a & b)
            .collect();
        Ok(IpBytes { bytes })
    }

    /// Bitwise OR with a same-length buffer
    pub fn or(&self, other: &IpBytes) -> Result<IpBytes> {
        self.check_family(other)?;
        let bytes = self
            .bytes
            .iter()
            .zip(&other.bytes)
            .map(|(a, b)| a | b)
            .collect();
        Ok(IpBytes { bytes })
    }

    /// Bitwise XOR with a same-length buffer
    pub fn xor(&self, other: &IpBytes) -> Result<IpBytes> {
        self.check_family(other)?;
        let bytes = self
            .bytes
            .iter()
            .zip(&other.bytes)
            .map(|(a, b)| a ^ b)
            .collect();
        Ok(IpBytes { bytes })
    }

    /// Bitwise complement
    pub fn invert(&self) -> IpBytes {
        IpBytes {
            bytes: self.bytes.iter().map(|b| !b).collect(),
        }
    }

    fn check_family(&self, other: &IpBytes) -> Result<()> {
        if self.bytes.len() != other.bytes.len() {
            return Err(IpError::FamilyMismatch {
                left: self.bytes.len(),
                right: other.bytes.len(),
            });
        }
        Ok(())
    }
}

impl fmt::Display for IpBytes {
    /// Canonical compressed textual form
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_ip())
    }
}

impl From<IpAddr> for IpBytes {
    fn from(ip: IpAddr) -> Self {
        Self::from_ip(ip)
    }
}
