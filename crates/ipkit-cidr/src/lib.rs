//! Subnet ranges and CIDR queries
//!
//! Provides the range layer on top of [`ipkit_core`]:
//! - Derive network/broadcast bounds from an address and suffix
//! - Intersect two ranges, with an explicit empty marker
//! - Compute the minimal common-prefix subnet covering two addresses
//! - Derive a default-gateway candidate
//! - The composed [`IpHandle`] value object
//!
//! # Examples
//!
//! ```
//! use ipkit_cidr::cidr_range;
//!
//! let (low, high) = cidr_range("192.168.1.10/24").unwrap();
//! assert_eq!(low, "192.168.1.0");
//! assert_eq!(high, "192.168.1.255");
//! ```

use ipkit_core::{arith, mask, IpBytes, IpError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::IpAddr;
use thiserror::Error;

mod handle;

pub use handle::IpHandle;

/// CIDR errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CidrError {
    /// Not an `<address>/<suffix>` string
    #[error("invalid CIDR notation: {0}")]
    InvalidNotation(String),

    /// Operation needs a suffix and none is set
    #[error("no suffix set")]
    MissingSuffix,

    /// Underlying address error
    #[error(transparent)]
    Ip(#[from] IpError),
}

/// Result type alias for CIDR operations
pub type Result<T> = std::result::Result<T, CidrError>;

/// Inclusive address interval with `low <= high`, same family on both ends
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IpRange {
    low: IpBytes,
    high: IpBytes,
}

impl IpRange {
    /// Build a range, checking family and ordering
    pub fn new(low: IpBytes, high: IpBytes) -> Result<Self> {
        if low.len() != high.len() {
            return Err(IpError::FamilyMismatch {
                left: low.len(),
                right: high.len(),
            }
            .into());
        }
        if low > high {
            return Err(CidrError::InvalidNotation(format!(
                "range bounds out of order: {} > {}",
                low, high
            )));
        }
        Ok(Self { low, high })
    }

    /// Single-address range
    pub fn singleton(addr: IpBytes) -> Self {
        Self {
            low: addr.clone(),
            high: addr,
        }
    }

    pub fn low(&self) -> &IpBytes {
        &self.low
    }

    pub fn high(&self) -> &IpBytes {
        &self.high
    }

    pub fn bit_len(&self) -> u32 {
        self.low.bit_len()
    }

    /// True when the range covers exactly one address
    pub fn is_singleton(&self) -> bool {
        self.low == self.high
    }

    /// True when `addr` lies inside the range; false across families
    pub fn contains(&self, addr: &IpBytes) -> bool {
        addr.len() == self.low.len() && *addr >= self.low && *addr <= self.high
    }
}

impl fmt::Display for IpRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.low, self.high)
    }
}

/// Derive the network range of an address under a suffix
///
/// `low = addr AND mask`, `high = addr OR NOT mask`. Without a suffix the
/// range is the address itself.
pub fn network_range(addr: &IpBytes, suffix: Option<u32>) -> Result<IpRange> {
    match suffix {
        None => Ok(IpRange::singleton(addr.clone())),
        Some(suffix) => {
            let net_mask = mask::mask_from_suffix(suffix, addr.bit_len())?;
            let low = addr.and(&net_mask)?;
            let high = addr.or(&net_mask.invert())?;
            Ok(IpRange { low, high })
        }
    }
}

/// Intersect two ranges
///
/// Returns `Ok(None)` when the ranges are disjoint; that is an ordinary
/// outcome, not an error. Mixing families is an error.
pub fn intersect(a: &IpRange, b: &IpRange) -> Result<Option<IpRange>> {
    if a.bit_len() != b.bit_len() {
        return Err(IpError::FamilyMismatch {
            left: a.low.len(),
            right: b.low.len(),
        }
        .into());
    }
    let low = a.low.clone().max(b.low.clone());
    let high = a.high.clone().min(b.high.clone());
    if low > high {
        Ok(None)
    } else {
        Ok(Some(IpRange { low, high }))
    }
}

/// Smallest CIDR block containing both addresses
///
/// The suffix is the length of the common bit prefix; the returned address
/// is the first operand masked down to that prefix.
pub fn minimal_subnet(a: &IpBytes, b: &IpBytes) -> Result<(IpBytes, u32)> {
    let diff = a.xor(b)?;
    let suffix = diff.leading_zeros();
    let net_mask = mask::mask_from_suffix(suffix, a.bit_len())?;
    Ok((a.and(&net_mask)?, suffix))
}

/// Default-gateway candidate for a range: `low + 1`
///
/// Valid only when the candidate is strictly below `high`, so /31, /32 and
/// single-host ranges yield `None`.
pub fn default_gateway(range: &IpRange) -> Option<IpBytes> {
    let candidate = arith::add_signed(&range.low, 1).ok()?;
    (candidate < range.high).then_some(candidate)
}

/// Number of addresses covered by a suffix
///
/// `1` without a suffix, otherwise `2^(total_bits - suffix)`. Returned as a
/// float because a /0 IPv6 block has 2^128 addresses.
pub fn hosts_count(suffix: Option<u32>, total_bits: u32) -> Result<f64> {
    match suffix {
        None => Ok(1.0),
        Some(suffix) if suffix <= total_bits => Ok(2f64.powi((total_bits - suffix) as i32)),
        Some(suffix) => Err(IpError::InvalidSuffix {
            suffix,
            max: total_bits,
        }
        .into()),
    }
}

/// Compute the textual bounds of a `"<address>/<suffix>"` block
///
/// Standalone utility; only standard address literals are accepted here and
/// no handle is constructed.
pub fn cidr_range(cidr: &str) -> Result<(String, String)> {
    let (addr_text, suffix_text) = cidr
        .split_once('/')
        .ok_or_else(|| CidrError::InvalidNotation(cidr.to_owned()))?;
    let addr = addr_text
        .parse::<IpAddr>()
        .map(IpBytes::from_ip)
        .map_err(|_| CidrError::Ip(IpError::Parse(addr_text.to_owned())))?;
    let suffix: u32 = suffix_text
        .parse()
        .map_err(|_| CidrError::InvalidNotation(cidr.to_owned()))?;
    let range = network_range(&addr, Some(suffix))?;
    Ok((range.low.to_string(), range.high.to_string()))
}
