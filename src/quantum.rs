//! The quantum transform.
//!
//! A quantum is 3 bytes on the decoded side and 8 symbols on the encoded
//! side. The 3 bytes form a big-endian 24-bit word that is cut into eight
//! 3-bit groups, most significant group first. A short final quantum is
//! zero-extended before splitting and its unused trailing symbols are
//! replaced with [`PAD`].

use crate::{ALPHABET, PAD, QUANTUM_BYTES, QUANTUM_SYMBOLS};

/// Number of significant symbols for `bytes` input bytes: `ceil(8 * bytes / 3)`.
#[inline]
pub(crate) const fn significant_symbols(bytes: usize) -> usize {
    (QUANTUM_SYMBOLS * bytes + QUANTUM_BYTES - 1) / QUANTUM_BYTES
}

/// Number of bytes carried by `symbols` significant symbols (3, 6 or 8).
#[inline]
pub(crate) const fn carried_bytes(symbols: usize) -> usize {
    symbols * QUANTUM_BYTES / QUANTUM_SYMBOLS
}

/// Split up to 3 bytes into eight 3-bit values. Missing bytes read as zero.
#[inline]
pub(crate) fn split(src: &[u8]) -> [u8; QUANTUM_SYMBOLS] {
    debug_assert!(!src.is_empty() && src.len() <= QUANTUM_BYTES);
    let word = src
        .iter()
        .chain(std::iter::repeat(&0))
        .take(QUANTUM_BYTES)
        .fold(0u32, |acc, &b| (acc << 8) | b as u32);

    let mut values = [0u8; QUANTUM_SYMBOLS];
    for (i, v) in values.iter_mut().enumerate() {
        *v = ((word >> (21 - 3 * i)) & 0x7) as u8;
    }
    values
}

/// Pack eight 3-bit values back into 3 bytes, inverse of [`split`].
#[inline]
pub(crate) fn join(values: &[u8; QUANTUM_SYMBOLS]) -> [u8; QUANTUM_BYTES] {
    let word = values
        .iter()
        .fold(0u32, |acc, &v| (acc << 3) | (v & 0x7) as u32);
    [(word >> 16) as u8, (word >> 8) as u8, word as u8]
}

/// Encode one quantum of 1 to 3 bytes into the first 8 symbols of `dst`,
/// padding a short one.
pub(crate) fn encode_quantum(src: &[u8], dst: &mut [u8]) {
    debug_assert!(dst.len() >= QUANTUM_SYMBOLS);
    let values = split(src);
    let significant = significant_symbols(src.len());
    for (i, (out, v)) in dst.iter_mut().zip(values).enumerate() {
        *out = if i < significant {
            ALPHABET[v as usize]
        } else {
            PAD
        };
    }
}

/// A quantum read from the front of an encoded buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Quantum {
    /// Eight data symbols.
    Full([u8; QUANTUM_SYMBOLS]),
    /// A padded quantum closing the message, with 3 or 6 data symbols.
    Last([u8; QUANTUM_SYMBOLS], usize),
}

impl Quantum {
    /// Write the decoded bytes to `dst` and return how many were written.
    pub(crate) fn write_to(&self, dst: &mut [u8]) -> usize {
        let (values, symbols) = match self {
            Quantum::Full(values) => (values, QUANTUM_SYMBOLS),
            Quantum::Last(values, symbols) => (values, *symbols),
        };
        let n = carried_bytes(symbols);
        dst[..n].copy_from_slice(&join(values)[..n]);
        n
    }
}

/// Map a symbol to its 3-bit value.
#[inline]
fn symbol_value(c: u8) -> Option<u8> {
    let v = c.wrapping_sub(b'0');
    (v < 8).then_some(v)
}

/// Read the quantum at the start of `src`.
///
/// `src` runs from the quantum start to the end of the available input. On
/// failure the returned offset is relative to the start of `src`. Input past
/// the first 8 symbols is never inspected.
pub(crate) fn parse_quantum(src: &[u8]) -> Result<Quantum, usize> {
    let mut values = [0u8; QUANTUM_SYMBOLS];

    for j in 0..QUANTUM_SYMBOLS {
        // Input ran out before the quantum was complete.
        let Some(&c) = src.get(j) else {
            return Err(0);
        };

        if c == PAD && j >= 2 {
            let rest = &src[j + 1..];
            let needed = QUANTUM_SYMBOLS - 1 - j;
            if rest.len() < needed {
                return Err(src.len());
            }
            // Reported one byte before the offending symbol.
            if let Some(k) = rest[..needed].iter().position(|&p| p != PAD) {
                return Err(j + k);
            }
            // Only 2 or 5 padding symbols are meaningful.
            if j != 3 && j != 6 {
                return Err(j);
            }
            return Ok(Quantum::Last(values, j));
        }

        values[j] = symbol_value(c).ok_or(j)?;
    }

    Ok(Quantum::Full(values))
}
