//! The composed IP value object
//!
//! An [`IpHandle`] holds a canonical address buffer plus an optional CIDR
//! suffix and answers every query by delegating to the codec, arithmetic,
//! mask and range layers. Handles are immutable: the transforms return a
//! new handle and leave the receiver untouched on failure.

use crate::{
    default_gateway, hosts_count, intersect, minimal_subnet, network_range, CidrError, IpRange,
    Result,
};
use ipkit_core::codec::{self, Format, FormatSpec, Formatted};
use ipkit_core::{arith, mask, IpBytes, IpError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// An address with an optional suffix
///
/// # Examples
///
/// ```
/// use ipkit_cidr::IpHandle;
///
/// let ip = IpHandle::parse("192.168.1.10/24").unwrap();
/// assert!(ip.is_v4());
/// assert_eq!(ip.suffix(), Some(24));
/// assert_eq!(ip.to_string(), "192.168.1.10/24");
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IpHandle {
    bytes: IpBytes,
    suffix: Option<u32>,
    /// Original input, kept for diagnostics only
    source: String,
}

impl IpHandle {
    /// Parse an `"<address>[/<suffix>]"` string
    ///
    /// The suffix only has to be an integer here; its range is validated
    /// lazily wherever it is used, against this address's own bit length.
    pub fn parse(text: &str) -> Result<Self> {
        let (addr_text, suffix) = match text.split_once('/') {
            Some((addr_text, suffix_text)) => {
                let suffix = suffix_text
                    .parse::<u32>()
                    .map_err(|_| CidrError::InvalidNotation(text.to_owned()))?;
                (addr_text, Some(suffix))
            }
            None => (text, None),
        };
        let bytes = codec::parse(addr_text)?;
        Ok(Self {
            bytes,
            suffix,
            source: text.to_owned(),
        })
    }

    /// Interpret a plain non-negative integer as an IPv4 address
    pub fn from_v4_int(value: u32) -> Self {
        Self {
            bytes: IpBytes::from_v4(value.to_be_bytes()),
            suffix: None,
            source: value.to_string(),
        }
    }

    /// Wrap an existing canonical buffer
    pub fn from_bytes(bytes: IpBytes) -> Self {
        let source = bytes.to_string();
        Self {
            bytes,
            suffix: None,
            source,
        }
    }

    /// Log-and-discard construction boundary
    ///
    /// The only place a construction error is swallowed; everything else
    /// propagates. Returns `None` after logging a warning.
    pub fn try_create(text: &str) -> Option<Self> {
        match Self::parse(text) {
            Ok(handle) => Some(handle),
            Err(e) => {
                tracing::warn!(input = text, error = %e, "could not construct ip handle");
                None
            }
        }
    }

    /// Canonical address buffer
    pub fn bytes(&self) -> &IpBytes {
        &self.bytes
    }

    /// The suffix, if one is set
    pub fn suffix(&self) -> Option<u32> {
        self.suffix
    }

    pub fn has_suffix(&self) -> bool {
        self.suffix.is_some()
    }

    /// The original input text
    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn is_v4(&self) -> bool {
        self.bytes.is_v4()
    }

    pub fn is_v6(&self) -> bool {
        self.bytes.is_v6()
    }

    /// True for any well-formed address of either family
    pub fn is_ip(&self) -> bool {
        self.bytes.is_v4() || self.bytes.is_v6()
    }

    pub fn bit_len(&self) -> u32 {
        self.bytes.bit_len()
    }

    /// True when this address itself is usable as a netmask
    pub fn is_netmask(&self) -> bool {
        mask::is_netmask(&self.bytes)
    }

    /// Number of addresses covered by this handle's suffix
    pub fn hosts(&self) -> Result<f64> {
        hosts_count(self.suffix, self.bytes.bit_len())
    }

    /// Render the address per the format spec
    ///
    /// With `with_suffix` set, textual output gets `/suffix` appended when
    /// a suffix exists; raw output never carries a suffix.
    pub fn format(&self, spec: FormatSpec) -> Formatted {
        let formatted = codec::format(&self.bytes, spec.kind);
        match (formatted, spec.with_suffix, self.suffix) {
            (Formatted::Text(text), true, Some(suffix)) => {
                Formatted::Text(format!("{}/{}", text, suffix))
            }
            (formatted, _, _) => formatted,
        }
    }

    /// Render per a textual format request such as `"HEX+"`
    pub fn format_str(&self, request: &str) -> Result<Formatted> {
        let spec = FormatSpec::from_str(request)?;
        Ok(self.format(spec))
    }

    /// The network range implied by the address and suffix
    pub fn range(&self) -> Result<IpRange> {
        network_range(&self.bytes, self.suffix)
    }

    /// Both range bounds rendered in the given format
    pub fn range_formatted(&self, kind: Format) -> Result<(Formatted, Formatted)> {
        let range = self.range()?;
        Ok((
            codec::format(range.low(), kind),
            codec::format(range.high(), kind),
        ))
    }

    /// This handle's netmask, derived from its suffix
    pub fn net_mask(&self, kind: Format) -> Result<Formatted> {
        let suffix = self.suffix.ok_or(CidrError::MissingSuffix)?;
        let net_mask = mask::mask_from_suffix(suffix, self.bytes.bit_len())?;
        Ok(codec::format(&net_mask, kind))
    }

    /// Network address (low bound of the range)
    pub fn net_address(&self, kind: Format) -> Result<Formatted> {
        let range = self.range()?;
        Ok(codec::format(range.low(), kind))
    }

    /// Broadcast address (high bound of the range)
    pub fn broadcast(&self, kind: Format) -> Result<Formatted> {
        let range = self.range()?;
        Ok(codec::format(range.high(), kind))
    }

    /// Default-gateway candidate, `None` when the range is too narrow
    pub fn default_gateway(&self, kind: Format) -> Result<Option<Formatted>> {
        let range = self.range()?;
        Ok(default_gateway(&range).map(|gw| codec::format(&gw, kind)))
    }

    /// Intersection of the two handles' ranges; `Ok(None)` when disjoint
    pub fn intersect_with(&self, other: &IpHandle) -> Result<Option<IpRange>> {
        intersect(&self.range()?, &other.range()?)
    }

    /// True iff the candidate is a single point inside this handle's range
    ///
    /// Intersects the candidate's single-point range with this range and
    /// checks the result is exactly that point.
    pub fn check_gateway(&self, candidate: &IpHandle) -> bool {
        let point = IpRange::singleton(candidate.bytes.clone());
        match self.range().and_then(|own| intersect(&own, &point)) {
            Ok(Some(found)) => found == point,
            _ => false,
        }
    }

    /// New handle with the suffix replaced
    pub fn with_suffix(&self, suffix: u32) -> Result<Self> {
        let max = self.bytes.bit_len();
        if suffix > max {
            return Err(IpError::InvalidSuffix { suffix, max }.into());
        }
        let mut next = self.clone();
        next.suffix = Some(suffix);
        Ok(next)
    }

    /// New handle with the suffix derived from a textual netmask
    pub fn with_suffix_from_netmask(&self, netmask: &str) -> Result<Self> {
        let mask_bytes = codec::parse(netmask)?;
        let suffix = mask::suffix_from_mask(&mask_bytes)?;
        self.with_suffix(suffix)
    }

    /// New handle shifted by a signed offset; the suffix is kept
    pub fn with_offset(&self, delta: i64) -> Result<Self> {
        let bytes = arith::add_signed(&self.bytes, delta)?;
        Ok(Self {
            bytes,
            suffix: self.suffix,
            source: self.source.clone(),
        })
    }

    /// New handle narrowed to the minimal subnet containing both addresses
    ///
    /// Replaces the address with the masked common prefix and the suffix
    /// with the prefix length.
    pub fn min_subnet_with(&self, other: &IpHandle) -> Result<Self> {
        let (bytes, suffix) = minimal_subnet(&self.bytes, &other.bytes)?;
        Ok(Self {
            bytes,
            suffix: Some(suffix),
            source: self.source.clone(),
        })
    }
}

/// Equality ignores the diagnostic source text
impl PartialEq for IpHandle {
    fn eq(&self, other: &Self) -> bool {
        self.bytes == other.bytes && self.suffix == other.suffix
    }
}

impl Eq for IpHandle {}

impl FromStr for IpHandle {
    type Err = CidrError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for IpHandle {
    /// Compressed form with the suffix appended when present
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.bytes)?;
        if let Some(suffix) = self.suffix {
            write!(f, "/{}", suffix)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_with_suffix() {
        let ip = IpHandle::parse("192.168.1.10/24").unwrap();
        assert!(ip.is_v4());
        assert!(ip.is_ip());
        assert_eq!(ip.suffix(), Some(24));
        assert_eq!(ip.source(), "192.168.1.10/24");
    }

    #[test]
    fn test_parse_without_suffix() {
        let ip = IpHandle::parse("2001:db8::1").unwrap();
        assert!(ip.is_v6());
        assert!(!ip.has_suffix());
    }

    #[test]
    fn test_parse_suffix_not_validated_eagerly() {
        // 99 is out of range for IPv4 but only range queries notice
        let ip = IpHandle::parse("10.0.0.1/99").unwrap();
        assert_eq!(ip.suffix(), Some(99));
        assert!(ip.range().is_err());
        assert!(ip.net_mask(Format::Comp).is_err());
    }

    #[test]
    fn test_parse_rejects_non_integer_suffix() {
        assert!(IpHandle::parse("10.0.0.1/abc").is_err());
        assert!(IpHandle::parse("10.0.0.1/-1").is_err());
    }

    #[test]
    fn test_from_v4_int() {
        let ip = IpHandle::from_v4_int(3232235521);
        assert!(ip.is_v4());
        assert_eq!(ip.to_string(), "192.168.0.1");
    }

    #[test]
    fn test_from_bytes() {
        let ip = IpHandle::from_bytes(IpBytes::from_v4([10, 0, 0, 1]));
        assert_eq!(ip.to_string(), "10.0.0.1");
        assert_eq!(ip.source(), "10.0.0.1");
    }

    #[test]
    fn test_try_create() {
        assert!(IpHandle::try_create("10.0.0.1/8").is_some());
        assert!(IpHandle::try_create("definitely not an ip").is_none());
    }

    #[test]
    fn test_display_with_suffix() {
        let ip = IpHandle::parse("192.168.001.010/24");
        assert!(ip.is_err()); // leading zeros are not a valid literal

        let ip = IpHandle::parse("192.168.1.10/24").unwrap();
        assert_eq!(ip.to_string(), "192.168.1.10/24");
    }

    #[test]
    fn test_format_with_suffix_modifier() {
        let ip = IpHandle::parse("192.168.0.1/24").unwrap();
        let out = ip.format_str("HEX+").unwrap();
        assert_eq!(out.as_text(), Some("0xc0a80001/24"));

        let out = ip.format_str("hex").unwrap();
        assert_eq!(out.as_text(), Some("0xc0a80001"));

        assert!(ip.format_str("bogus").is_err());
    }

    #[test]
    fn test_format_default_appends_suffix() {
        let ip = IpHandle::parse("10.0.0.1/8").unwrap();
        let out = ip.format(FormatSpec::default());
        assert_eq!(out.as_text(), Some("10.0.0.1/8"));
    }

    #[test]
    fn test_format_raw_never_carries_suffix() {
        let ip = IpHandle::parse("10.0.0.1/8").unwrap();
        let out = ip.format(FormatSpec::with_suffix(Format::Raw));
        assert_eq!(out.as_raw(), Some(&[10, 0, 0, 1][..]));
    }

    #[test]
    fn test_full_format_scenario() {
        let ip = IpHandle::parse("::1").unwrap();
        let out = ip.format(FormatSpec::new(Format::Full));
        assert_eq!(
            out.as_text(),
            Some("0000:0000:0000:0000:0000:0000:0000:0001")
        );
    }

    #[test]
    fn test_net_address_and_broadcast() {
        let ip = IpHandle::parse("192.168.1.10/24").unwrap();
        let low = ip.net_address(Format::Comp).unwrap();
        let high = ip.broadcast(Format::Comp).unwrap();
        assert_eq!(low.as_text(), Some("192.168.1.0"));
        assert_eq!(high.as_text(), Some("192.168.1.255"));
    }

    #[test]
    fn test_net_mask() {
        let ip = IpHandle::parse("192.168.1.10/24").unwrap();
        let mask = ip.net_mask(Format::Comp).unwrap();
        assert_eq!(mask.as_text(), Some("255.255.255.0"));

        let bare = IpHandle::parse("192.168.1.10").unwrap();
        assert_eq!(bare.net_mask(Format::Comp), Err(CidrError::MissingSuffix));
    }

    #[test]
    fn test_default_gateway() {
        let ip = IpHandle::parse("192.168.1.10/24").unwrap();
        let gateway = ip.default_gateway(Format::Comp).unwrap().unwrap();
        assert_eq!(gateway.as_text(), Some("192.168.1.1"));

        let narrow = IpHandle::parse("10.0.0.0/31").unwrap();
        assert_eq!(narrow.default_gateway(Format::Comp), Ok(None));
    }

    #[test]
    fn test_is_netmask_handle() {
        assert!(IpHandle::parse("255.255.255.0").unwrap().is_netmask());
        assert!(!IpHandle::parse("255.0.255.0").unwrap().is_netmask());
        assert!(!IpHandle::parse("192.168.1.1").unwrap().is_netmask());
    }

    #[test]
    fn test_check_gateway() {
        let net = IpHandle::parse("192.168.1.0/24").unwrap();
        let inside = IpHandle::parse("192.168.1.1").unwrap();
        let outside = IpHandle::parse("192.168.2.1").unwrap();
        assert!(net.check_gateway(&inside));
        assert!(!net.check_gateway(&outside));

        let v6 = IpHandle::parse("2001:db8::1").unwrap();
        assert!(!net.check_gateway(&v6));
    }

    #[test]
    fn test_intersect_with() {
        let a = IpHandle::parse("10.0.0.0/8").unwrap();
        let b = IpHandle::parse("10.1.0.0/16").unwrap();
        let both = a.intersect_with(&b).unwrap().unwrap();
        assert_eq!(both.low().to_string(), "10.1.0.0");
        assert_eq!(both.high().to_string(), "10.1.255.255");

        let c = IpHandle::parse("172.16.0.0/12").unwrap();
        assert_eq!(a.intersect_with(&c), Ok(None));
    }

    #[test]
    fn test_hosts() {
        assert_eq!(IpHandle::parse("10.0.0.1").unwrap().hosts(), Ok(1.0));
        assert_eq!(IpHandle::parse("10.0.0.0/24").unwrap().hosts(), Ok(256.0));
        assert!(IpHandle::parse("10.0.0.0/99").unwrap().hosts().is_err());
    }

    #[test]
    fn test_with_suffix() {
        let ip = IpHandle::parse("10.0.0.1").unwrap();
        let with = ip.with_suffix(16).unwrap();
        assert_eq!(with.suffix(), Some(16));
        // receiver untouched
        assert_eq!(ip.suffix(), None);

        assert!(ip.with_suffix(33).is_err());
        assert!(IpHandle::parse("::1").unwrap().with_suffix(33).is_ok());
    }

    #[test]
    fn test_with_suffix_from_netmask() {
        let ip = IpHandle::parse("192.168.1.10").unwrap();
        let with = ip.with_suffix_from_netmask("255.255.255.0").unwrap();
        assert_eq!(with.suffix(), Some(24));

        let err = ip.with_suffix_from_netmask("255.0.255.0");
        assert!(matches!(err, Err(CidrError::Ip(IpError::InvalidMask(_)))));
        assert!(ip.with_suffix_from_netmask("not a mask").is_err());
        // failure leaves the receiver as it was
        assert_eq!(ip.suffix(), None);
    }

    #[test]
    fn test_with_offset() {
        let ip = IpHandle::parse("192.168.1.10/24").unwrap();
        let moved = ip.with_offset(250).unwrap();
        assert_eq!(moved.to_string(), "192.168.2.4/24");
        assert_eq!(ip.to_string(), "192.168.1.10/24");

        let max = IpHandle::parse("255.255.255.255").unwrap();
        assert_eq!(
            max.with_offset(1),
            Err(CidrError::Ip(IpError::Overflow))
        );
        let zero = IpHandle::parse("0.0.0.0").unwrap();
        assert_eq!(
            zero.with_offset(-1),
            Err(CidrError::Ip(IpError::Underflow))
        );
    }

    #[test]
    fn test_min_subnet_with() {
        let a = IpHandle::parse("192.168.0.1").unwrap();
        let b = IpHandle::parse("192.168.0.200").unwrap();
        let net = a.min_subnet_with(&b).unwrap();
        assert_eq!(net.to_string(), "192.168.0.0/24");

        let v6 = IpHandle::parse("::1").unwrap();
        assert_eq!(
            a.min_subnet_with(&v6),
            Err(CidrError::Ip(IpError::FamilyMismatch { left: 4, right: 16 }))
        );
    }

    #[test]
    fn test_equality_ignores_source() {
        let a = IpHandle::parse("0xC0A80001").unwrap();
        let b = IpHandle::parse("192.168.0.1").unwrap();
        assert_eq!(a, b);
        assert_ne!(a.source(), b.source());
    }

    #[test]
    fn test_handle_serialization() {
        let ip = IpHandle::parse("10.1.2.3/16").unwrap();
        let json = serde_json::to_string(&ip).expect("serialization failed");
        let back: IpHandle = serde_json::from_str(&json).expect("deserialization failed");
        assert_eq!(ip, back);
        assert_eq!(back.source(), "10.1.2.3/16");
    }
}
