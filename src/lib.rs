//! # Base8
//!
//! *Octal binary-to-text encoding in fixed 3-byte quanta.*
//!
//! ## Intuition First
//!
//! Base64 slices data into 6-bit pieces, base32 into 5-bit pieces. Base8 uses
//! the smallest alphabet that still keeps a whole number of bytes per group:
//! three bytes are 24 bits, and 24 bits are exactly eight octal digits. So
//! every 3 input bytes become 8 characters from `0`-`7`, and nothing ever has
//! to straddle a group boundary.
//!
//! ## The Format
//!
//! ```text
//! bytes    0x66     0x6f     0x6f
//! bits     01100110 01101111 01101111
//! groups   011 001 100 110 111 101 101 111
//! symbols   3   1   4   6   7   5   5   7
//! ```
//!
//! The 24-bit word is big-endian and split most significant group first.
//! A short final group is zero-extended, encoded, and its unused trailing
//! symbols are replaced with `=`:
//!
//! | input bytes | data symbols | padding |
//! |-------------|--------------|---------|
//! | 3           | 8            | 0       |
//! | 2           | 6            | 2       |
//! | 1           | 3            | 5       |
//!
//! Any other padding length is invalid, and nothing may follow a padded
//! quantum. The output is `ceil(n / 3) * 8` characters, an expansion of
//! 8/3 ≈ 2.67x.
//!
//! ## Failure Modes
//!
//! Decoding rejects characters outside the alphabet, padding in the first two
//! positions of a quantum, padding that is not a suffix, padding of the wrong
//! length, data after the final padded quantum, and truncated quanta. Each
//! rejection carries the byte offset where the defect was found and the
//! number of bytes the preceding quanta decoded to ([`Error::CorruptInput`]).
//!
//! ## Implementation Notes
//!
//! This crate provides:
//! - **Whole buffers**: [`encode`], [`decode`], [`encode_slice`],
//!   [`decode_slice`], and the sizing helpers [`encoded_len`] /
//!   [`decoded_len`].
//! - **Streams**: [`Encoder`] wraps any [`std::io::Write`] and [`Decoder`]
//!   wraps any [`std::io::Read`], so chunking of the data does not affect
//!   the result.
//!
//! ```
//! use std::io::{Read, Write};
//!
//! let mut encoder = base8::Encoder::new(Vec::new());
//! encoder.write_all(b"foo\x00bar").unwrap();
//! let encoded = encoder.finish().unwrap();
//! assert_eq!(encoded, b"3146755700061141344=====");
//!
//! let mut decoded = Vec::new();
//! base8::Decoder::new(&encoded[..]).read_to_end(&mut decoded).unwrap();
//! assert_eq!(decoded, b"foo\x00bar");
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod codec;
pub mod decoder;
pub mod encoder;
pub mod error;
mod quantum;

pub use codec::{
    checked_encoded_len, decode, decode_slice, decoded_len, encode, encode_slice, encoded_len,
};
pub use decoder::Decoder;
pub use encoder::Encoder;
pub use error::{Error, Result};

/// The symbol alphabet, indexed by 3-bit value.
pub const ALPHABET: &[u8; 8] = b"01234567";

/// Character filling the unused tail of the final quantum.
pub const PAD: u8 = b'=';

/// Bytes in a decoded quantum.
pub const QUANTUM_BYTES: usize = 3;

/// Symbols in an encoded quantum.
pub const QUANTUM_SYMBOLS: usize = 8;
