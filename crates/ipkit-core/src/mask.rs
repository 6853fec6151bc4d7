//! CIDR suffix and netmask conversion
//!
//! A valid netmask is a contiguous run of 1-bits followed by 0-bits with
//! no interleaving.

use crate::{IpBytes, IpError, Result};

/// Build a netmask buffer from a CIDR suffix
///
/// The buffer has `bit_len - suffix` trailing zero bits: full `0xFF` bytes,
/// one partially filled boundary byte, then `0x00` bytes.
///
/// # Examples
///
/// ```
/// use ipkit_core::mask;
///
/// let m = mask::mask_from_suffix(24, 32).unwrap();
/// assert_eq!(m.as_slice(), &[255, 255, 255, 0]);
/// ```
pub fn mask_from_suffix(suffix: u32, bit_len: u32) -> Result<IpBytes> {
    if suffix > bit_len {
        return Err(IpError::InvalidSuffix {
            suffix,
            max: bit_len,
        });
    }
    let len = (bit_len / 8) as usize;
    let mut bytes = vec![0u8; len];
    for (i, byte) in bytes.iter_mut().enumerate() {
        let ones_before = (i * 8) as u32;
        *byte = if suffix >= ones_before + 8 {
            0xff
        } else if suffix <= ones_before {
            0x00
        } else {
            0xffu8 << (8 - (suffix - ones_before))
        };
    }
    IpBytes::from_slice(&bytes)
}

/// Recover the suffix from a netmask buffer
///
/// Fails with [`IpError::InvalidMask`] unless the bit pattern is a run of
/// ones followed by a run of zeros; otherwise returns the count of leading
/// one bits.
pub fn suffix_from_mask(mask: &IpBytes) -> Result<u32> {
    let mut suffix = 0u32;
    let mut seen_zero = false;
    for &byte in mask.as_slice() {
        for shift in (0..8).rev() {
            if byte >> shift & 1 == 1 {
                if seen_zero {
                    return Err(IpError::InvalidMask(mask.to_string()));
                }
                suffix += 1;
            } else {
                seen_zero = true;
            }
        }
    }
    Ok(suffix)
}

/// True when the buffer is usable as a netmask
pub fn is_netmask(mask: &IpBytes) -> bool {
    suffix_from_mask(mask).is_ok()
}
