//! Whole-buffer encoding and decoding.
//!
//! These functions apply the quantum transform across a complete in-memory
//! buffer. The final short group is always the last quantum and is padded;
//! for data that arrives in pieces use [`crate::Encoder`] and
//! [`crate::Decoder`] instead.

use crate::error::{Error, Result};
use crate::quantum::{encode_quantum, parse_quantum, Quantum};
use crate::{QUANTUM_BYTES, QUANTUM_SYMBOLS};

/// Length of the base8 encoding of `n` input bytes.
///
/// Exact: every started 3-byte group becomes 8 symbols.
///
/// # Panics
/// Panics if the length does not fit in `usize`, which happens for `n`
/// above `usize::MAX / 8 * 3`. Use [`checked_encoded_len`] for untrusted
/// sizes.
#[inline]
pub const fn encoded_len(n: usize) -> usize {
    match checked_encoded_len(n) {
        Some(len) => len,
        None => panic!("base8 encoded length overflows usize"),
    }
}

/// Length of the base8 encoding of `n` input bytes, or `None` if it does
/// not fit in `usize`.
#[inline]
pub const fn checked_encoded_len(n: usize) -> Option<usize> {
    n.div_ceil(QUANTUM_BYTES).checked_mul(QUANTUM_SYMBOLS)
}

/// Maximum number of bytes decoded from `n` symbols.
///
/// An upper bound; padding in the final quantum may make the real output up
/// to 2 bytes shorter.
#[inline]
pub const fn decoded_len(n: usize) -> usize {
    n / QUANTUM_SYMBOLS * QUANTUM_BYTES
}

/// Encode `src` into `dst`, which must hold `encoded_len(src.len())` bytes.
pub(crate) fn encode_quanta(src: &[u8], dst: &mut [u8]) {
    for (group, out) in src
        .chunks(QUANTUM_BYTES)
        .zip(dst.chunks_exact_mut(QUANTUM_SYMBOLS))
    {
        encode_quantum(group, out);
    }
}

/// Outcome of decoding a run of quanta.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Decoded {
    /// Every quantum decoded; more may follow.
    Progress(usize),
    /// The last quantum was padded and closed the message.
    Terminated(usize),
    /// Malformed input at `offset`, after `written` good bytes.
    Corrupt { offset: usize, written: usize },
}

/// Decode `src` into `dst`, which must hold `decoded_len(src.len())` bytes.
///
/// Offsets are relative to the start of `src`.
pub(crate) fn decode_quanta(src: &[u8], dst: &mut [u8]) -> Decoded {
    let mut written = 0;
    let mut pos = 0;

    while pos < src.len() {
        let quantum = match parse_quantum(&src[pos..]) {
            Ok(quantum) => quantum,
            Err(offset) => {
                return Decoded::Corrupt {
                    offset: pos + offset,
                    written,
                }
            }
        };
        written += quantum.write_to(&mut dst[written..]);
        pos += QUANTUM_SYMBOLS;

        if let Quantum::Last(..) = quantum {
            // Nothing may follow the padded quantum.
            if pos < src.len() {
                return Decoded::Corrupt {
                    offset: pos,
                    written,
                };
            }
            return Decoded::Terminated(written);
        }
    }

    Decoded::Progress(written)
}

/// Encode arbitrary bytes as a base8 string.
///
/// # Example
///
/// ```
/// assert_eq!(base8::encode(b"foo"), "31467557");
/// assert_eq!(base8::encode(b"fo"), "314674==");
/// ```
pub fn encode<T: AsRef<[u8]>>(input: T) -> String {
    let input = input.as_ref();
    let mut buf = vec![0u8; encoded_len(input.len())];
    encode_quanta(input, &mut buf);
    buf.into_iter().map(char::from).collect()
}

/// Encode `input` into `output` and return the number of symbols written.
///
/// # Errors
/// Returns `Error::OutputTooSmall` if `output` is shorter than
/// `encoded_len(input.len())`.
pub fn encode_slice(input: &[u8], output: &mut [u8]) -> Result<usize> {
    let needed = encoded_len(input.len());
    if output.len() < needed {
        return Err(Error::OutputTooSmall {
            needed,
            available: output.len(),
        });
    }
    encode_quanta(input, &mut output[..needed]);
    Ok(needed)
}

/// Decode a base8 string or byte slice.
///
/// # Errors
/// Returns `Error::CorruptInput` with the offset of the first bad symbol and
/// the number of bytes the quanta before it decode to.
///
/// # Example
///
/// ```
/// assert_eq!(base8::decode("31467557304=====").unwrap(), b"foob");
/// assert_eq!(base8::decode("1111====").unwrap_err().corrupt_offset(), Some(4));
///
/// let err = base8::decode("31467557314675573!").unwrap_err();
/// assert_eq!(err.corrupt_offset(), Some(17));
/// assert_eq!(err.decoded_before(), Some(6));
/// ```
pub fn decode<T: AsRef<[u8]>>(input: T) -> Result<Vec<u8>> {
    let input = input.as_ref();
    let mut buf = vec![0u8; decoded_len(input.len())];
    match decode_quanta(input, &mut buf) {
        Decoded::Progress(n) | Decoded::Terminated(n) => {
            buf.truncate(n);
            Ok(buf)
        }
        Decoded::Corrupt { offset, written } => Err(Error::CorruptInput {
            offset: offset as u64,
            decoded: written,
        }),
    }
}

/// Decode `input` into `output` and return the number of bytes written.
///
/// On corruption, the bytes of every quantum before the bad one have already
/// been written to `output`; their count is the error's `decoded` field.
///
/// # Errors
/// Returns `Error::OutputTooSmall` if `output` is shorter than
/// `decoded_len(input.len())`, or `Error::CorruptInput` for malformed input.
pub fn decode_slice(input: &[u8], output: &mut [u8]) -> Result<usize> {
    let needed = decoded_len(input.len());
    if output.len() < needed {
        return Err(Error::OutputTooSmall {
            needed,
            available: output.len(),
        });
    }
    match decode_quanta(input, output) {
        Decoded::Progress(n) | Decoded::Terminated(n) => Ok(n),
        Decoded::Corrupt { offset, written } => Err(Error::CorruptInput {
            offset: offset as u64,
            decoded: written,
        }),
    }
}
