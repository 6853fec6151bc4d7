//! Fixed-width big-endian arithmetic
//!
//! Treats an address buffer as an unsigned big integer and provides:
//! - signed offset addition with overflow/underflow detection
//! - arbitrary-precision decimal string conversion in both directions
//!
//! A 128-bit value exceeds the native 64-bit range, so the decimal
//! conversions run over base-65536 words with a manual decimal-digit
//! accumulator. The width is always bounded at 16 bytes, so no general
//! big-integer dependency is needed.

use crate::{IpBytes, IpError, Result};

/// Add a signed offset to an address buffer
///
/// The result keeps the byte length of the input. A carry out of the most
/// significant byte is [`IpError::Overflow`]; a borrow past it is
/// [`IpError::Underflow`]. The value never wraps.
///
/// # Examples
///
/// ```
/// use ipkit_core::{arith, IpBytes};
///
/// let ip = IpBytes::from_v4([192, 168, 0, 255]);
/// let next = arith::add_signed(&ip, 1).unwrap();
/// assert_eq!(next.as_slice(), &[192, 168, 1, 0]);
/// ```
pub fn add_signed(addr: &IpBytes, delta: i64) -> Result<IpBytes> {
    let mut out = addr.as_slice().to_vec();
    let magnitude = delta.unsigned_abs().to_be_bytes();
    let first = magnitude
        .iter()
        .position(|&b| b != 0)
        .unwrap_or(magnitude.len());
    let magnitude = &magnitude[first..];

    if magnitude.len() > out.len() {
        return Err(if delta >= 0 {
            IpError::Overflow
        } else {
            IpError::Underflow
        });
    }

    if delta >= 0 {
        ripple_add(&mut out, magnitude)?;
    } else {
        ripple_sub(&mut out, magnitude)?;
    }
    IpBytes::from_slice(&out)
}

/// Byte-wise ripple-carry addition, least significant byte first
fn ripple_add(buf: &mut [u8], add: &[u8]) -> Result<()> {
    let offset = buf.len() - add.len();
    let mut carry = 0u16;
    for i in (0..buf.len()).rev() {
        let a = if i >= offset { add[i - offset] as u16 } else { 0 };
        let sum = buf[i] as u16 + a + carry;
        buf[i] = (sum & 0xff) as u8;
        carry = sum >> 8;
    }
    if carry != 0 {
        return Err(IpError::Overflow);
    }
    Ok(())
}

/// Byte-wise ripple-borrow subtraction, least significant byte first
fn ripple_sub(buf: &mut [u8], sub: &[u8]) -> Result<()> {
    let offset = buf.len() - sub.len();
    let mut borrow = 0i16;
    for i in (0..buf.len()).rev() {
        let s = if i >= offset { sub[i - offset] as i16 } else { 0 };
        let mut diff = buf[i] as i16 - s - borrow;
        borrow = 0;
        if diff < 0 {
            diff += 256;
            borrow = 1;
        }
        buf[i] = diff as u8;
    }
    if borrow != 0 {
        return Err(IpError::Underflow);
    }
    Ok(())
}

/// Convert an address buffer to its decimal string
///
/// Reads the buffer as successive big-endian 16-bit words and folds them
/// into a decimal accumulator: `acc = acc * 65536 + word`.
pub fn to_decimal_string(addr: &IpBytes) -> String {
    let mut digits: Vec<u8> = vec![0];
    for chunk in addr.as_slice().chunks(2) {
        let word = u16::from_be_bytes([chunk[0], chunk[1]]);
        dec_mul_add(&mut digits, 65536, word as u32);
    }
    digits.iter().map(|d| (b'0' + d) as char).collect()
}

/// Convert a decimal string to a 16-byte address buffer
///
/// Peels off `value mod 65536` as the next word via arbitrary-precision
/// division, up to 8 words, and left-pads the result with zero words.
/// The result is always 16 bytes regardless of magnitude; values beyond
/// 128 bits keep only their low 8 words.
pub fn from_decimal_string(decimal: &str) -> Result<IpBytes> {
    if decimal.is_empty() || !decimal.bytes().all(|b| b.is_ascii_digit()) {
        return Err(IpError::Parse(decimal.to_owned()));
    }
    let mut digits: Vec<u8> = decimal.bytes().map(|b| b - b'0').collect();
    let mut out = [0u8; 16];
    let mut pos = out.len();
    for _ in 0..8 {
        if digits.iter().all(|&d| d == 0) {
            break;
        }
        let word = dec_divmod(&mut digits, 65536) as u16;
        pos -= 2;
        out[pos..pos + 2].copy_from_slice(&word.to_be_bytes());
    }
    Ok(IpBytes::from_v6(out))
}

/// `digits = digits * mul + add` over most-significant-first decimal digits
fn dec_mul_add(digits: &mut Vec<u8>, mul: u32, add: u32) {
    let mut carry = add as u64;
    for d in digits.iter_mut().rev() {
        let value = *d as u64 * mul as u64 + carry;
        *d = (value % 10) as u8;
        carry = value / 10;
    }
    while carry > 0 {
        digits.insert(0, (carry % 10) as u8);
        carry /= 10;
    }
    while digits.len() > 1 && digits[0] == 0 {
        digits.remove(0);
    }
}

/// `digits /= div`, returning the remainder
fn dec_divmod(digits: &mut Vec<u8>, div: u32) -> u32 {
    let mut rem = 0u64;
    for d in digits.iter_mut() {
        let current = rem * 10 + *d as u64;
        *d = (current / div as u64) as u8;
        rem = current % div as u64;
    }
    while digits.len() > 1 && digits[0] == 0 {
        digits.remove(0);
    }
    rem as u32
}
